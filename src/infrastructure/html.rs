//! Interactive document renderer.
//!
//! Dark-themed figure with tooltips and clickable nodes/edges; the artifact
//! is a single self-contained HTML file embedding the laid-out SVG plus the
//! source text of every cluster, so clicking an edge or node reveals the
//! originating line in an overlay.

use crate::domain::graph::{Cluster, Edge, Node};
use crate::infrastructure::dot::DotWriter;
use crate::infrastructure::layout::{self, LayoutFormat};
use crate::ports::Renderer;
use anyhow::{Context, Result};
use minijinja::{context, Environment};
use std::path::Path;
use tracing::info;

const TEMPLATE: &str = include_str!("../templates/figure.html");

const CLUSTER_FILL: &str = "#454545";

pub struct HtmlRenderer {
    dot: DotWriter,
    cluster_open: bool,
    sources: Vec<(String, String)>,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        let mut dot = DotWriter::new("frames");
        dot.graph_attrs(&[
            ("fontsize", "16"),
            ("fontcolor", "white"),
            ("bgcolor", "#333333"),
            ("rankdir", "BT"),
        ]);
        dot.node_defaults(&[
            ("fontname", "Helvetica"),
            ("shape", "hexagon"),
            ("fontcolor", "white"),
            ("color", "white"),
            ("style", "filled"),
        ]);
        dot.edge_defaults(&[
            ("style", "dashed"),
            ("color", "white"),
            ("arrowhead", "open"),
            ("fontname", "Courier"),
            ("fontsize", "12"),
            ("fontcolor", "white"),
            ("class", "edge"),
        ]);
        Self {
            dot,
            cluster_open: false,
            sources: Vec::new(),
        }
    }

    fn close_open_cluster(&mut self) {
        if self.cluster_open {
            self.dot.close_cluster();
            self.cluster_open = false;
        }
    }

    fn open_file_hook(file: &str, line: u32) -> String {
        format!("javascript:openFile('{}', {});", file, line)
    }
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for HtmlRenderer {
    fn emit_cluster(&mut self, cluster: &Cluster) -> Result<()> {
        self.close_open_cluster();
        let file = cluster.source_file.to_string_lossy().into_owned();
        let source = cluster.source.clone().with_context(|| {
            format!("source text was not embedded for {file}")
        })?;
        self.sources.push((file.clone(), source));

        self.dot.open_cluster(
            &file,
            &[
                ("label", file.as_str()),
                ("tooltip", file.as_str()),
                ("style", "filled"),
                ("color", CLUSTER_FILL),
                ("bgcolor", CLUSTER_FILL),
            ],
        );
        self.cluster_open = true;
        Ok(())
    }

    fn emit_node(&mut self, node: &Node, cluster: &Cluster) -> Result<()> {
        let file = node.source_file.to_string_lossy();
        let url = Self::open_file_hook(&file, node.definition_line);
        self.dot.node(
            node.id.as_str(),
            &[
                ("label", &node.label),
                ("tooltip", &node.label),
                ("fillcolor", &cluster.color.to_hex()),
                ("URL", &url),
            ],
        );
        Ok(())
    }

    fn emit_edge(&mut self, edge: &Edge) -> Result<()> {
        self.close_open_cluster();
        let tooltip = format!("{} -> {}", edge.caller_name, edge.callee_name);
        let caller_file = edge.caller_file.to_string_lossy();
        let url = Self::open_file_hook(&caller_file, edge.call_site_line);
        self.dot.edge(
            edge.from.as_str(),
            edge.to.as_str(),
            &[
                ("label", &edge.label()),
                ("tooltip", &tooltip),
                ("labeltooltip", &tooltip),
                ("labelURL", &url),
            ],
        );
        Ok(())
    }

    fn finalize(&mut self, destination: &Path) -> Result<()> {
        self.close_open_cluster();
        let dot_source = self.dot.finish();

        let svg = layout::render_to_bytes(&dot_source, LayoutFormat::Svg)?;
        let svg = String::from_utf8(svg).context("layout engine produced non-UTF-8 SVG")?;
        // Scrub the layout engine's default root title
        let svg = svg.replace("<title>%3</title>", "<title></title>");

        let mut env = Environment::new();
        env.add_template("figure.html", TEMPLATE)
            .context("Invalid document template")?;
        let template = env.get_template("figure.html")?;
        let document = template
            .render(context! { svg => svg, sources => self.sources.clone() })
            .context("Failed to render document template")?;

        std::fs::write(destination, document)
            .with_context(|| format!("Failed to write document {}", destination.display()))?;
        info!(path = %destination.display(), sources = self.sources.len(), "document written");
        Ok(())
    }
}
