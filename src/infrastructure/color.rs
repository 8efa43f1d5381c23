//! Color-annotated diagram renderer: clusters and their member nodes carry
//! the cluster's resolved color.

use crate::domain::graph::{Cluster, Edge, Node};
use crate::infrastructure::dot::DotWriter;
use crate::infrastructure::layout;
use crate::ports::Renderer;
use anyhow::Result;
use std::path::Path;

pub struct ColorRenderer {
    dot: DotWriter,
    cluster_open: bool,
}

impl ColorRenderer {
    pub fn new() -> Self {
        Self {
            dot: DotWriter::new("frames"),
            cluster_open: false,
        }
    }

    fn close_open_cluster(&mut self) {
        if self.cluster_open {
            self.dot.close_cluster();
            self.cluster_open = false;
        }
    }
}

impl Default for ColorRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for ColorRenderer {
    fn emit_cluster(&mut self, cluster: &Cluster) -> Result<()> {
        self.close_open_cluster();
        let file = cluster.source_file.to_string_lossy();
        let color = cluster.color.to_hex();
        self.dot.open_cluster(
            &file,
            &[("label", file.as_ref()), ("color", &color)],
        );
        self.cluster_open = true;
        Ok(())
    }

    fn emit_node(&mut self, node: &Node, cluster: &Cluster) -> Result<()> {
        let color = cluster.color.to_hex();
        self.dot.node(
            node.id.as_str(),
            &[("label", &node.label), ("color", &color)],
        );
        Ok(())
    }

    fn emit_edge(&mut self, edge: &Edge) -> Result<()> {
        self.close_open_cluster();
        self.dot
            .edge(edge.from.as_str(), edge.to.as_str(), &[("label", &edge.label())]);
        Ok(())
    }

    fn finalize(&mut self, destination: &Path) -> Result<()> {
        self.close_open_cluster();
        let dot_source = self.dot.finish();
        layout::write_artifact(&dot_source, destination)
    }
}
