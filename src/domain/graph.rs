//! Frame graph construction core.
//!
//! Consumes an ordered walk of stack frames and maintains a deduplicated
//! node set, lazy per-file clusters, and sequence-numbered edges. The
//! lifecycle has exactly two states: `GraphBuilder` (building, mutable)
//! consumes itself into `FrameGraph` (finalized, immutable), so a finalized
//! graph can never be mutated again.

use crate::domain::frame::{FrameId, FrameRecord};
use crate::domain::palette::{Palette, Rgb};
use crate::ports::PathClassifier;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Failures raised while building the graph. Everything here is fatal to the
/// current run; there is no partial-graph recovery path.
#[derive(Debug, Error)]
pub enum FigureError {
    /// A cluster's source file could not be read for embedding. Only raised
    /// when the builder is configured to embed sources.
    #[error("cannot read source file {path} for embedding")]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A deduplicated graph node: one per defined function seen in the walk.
/// Created on first encounter, never mutated or removed afterwards.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: FrameId,
    /// `"{definition_line}:{function_name}"`
    pub label: String,
    pub source_file: PathBuf,
    pub definition_line: u32,
    pub function_name: String,
}

/// One caller->callee transition of the walk. Edges are never deduplicated;
/// recursing through the same call site yields one edge per pass, told apart
/// by the run-global sequence number.
#[derive(Debug, Clone)]
pub struct Edge {
    pub from: FrameId,
    pub to: FrameId,
    /// 1-based, strictly increasing across the whole run
    pub sequence: usize,
    /// Line within the caller where the call occurred
    pub call_site_line: u32,
    pub caller_file: PathBuf,
    pub caller_name: String,
    pub callee_name: String,
}

impl Edge {
    /// Display label, e.g. `#3 at 27`.
    pub fn label(&self) -> String {
        format!("#{} at {}", self.sequence, self.call_site_line)
    }
}

/// Rendering group of nodes sharing one originating source file. Created
/// lazily on first reference to the file, never merged or removed.
#[derive(Debug)]
pub struct Cluster {
    pub source_file: PathBuf,
    /// Resolved display color: shared per package token, or the palette
    /// default for local files
    pub color: Rgb,
    /// File contents, read once at cluster creation when the builder embeds
    /// sources
    pub source: Option<String>,
    members: HashSet<FrameId>,
    nodes: Vec<Node>,
}

impl Cluster {
    /// Member nodes in creation order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn contains(&self, id: &FrameId) -> bool {
        self.members.contains(id)
    }
}

/// The finalized, immutable graph handed to a renderer.
#[derive(Debug)]
pub struct FrameGraph {
    clusters: Vec<Cluster>,
    edges: Vec<Edge>,
}

impl FrameGraph {
    /// Clusters in first-seen order.
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    /// Edges in sequence order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.clusters.iter().map(|c| c.nodes.len()).sum()
    }

    pub fn find_cluster(&self, file: &Path) -> Option<&Cluster> {
        self.clusters.iter().find(|c| c.source_file == file)
    }
}

/// Construction options: the path-classification and color collaborators
/// plus whether cluster creation should read and cache source text.
pub struct GraphOptions {
    pub classifier: Box<dyn PathClassifier>,
    pub palette: Palette,
    pub embed_sources: bool,
}

/// Builds a [`FrameGraph`] from an ordered caller->callee walk.
pub struct GraphBuilder {
    clusters: Vec<Cluster>,
    cluster_index: HashMap<PathBuf, usize>,
    edges: Vec<Edge>,
    sequence: usize,
    classifier: Box<dyn PathClassifier>,
    palette: Palette,
    embed_sources: bool,
}

impl GraphBuilder {
    pub fn new(options: GraphOptions) -> Self {
        Self {
            clusters: Vec::new(),
            cluster_index: HashMap::new(),
            edges: Vec::new(),
            sequence: 0,
            classifier: options.classifier,
            palette: options.palette,
            embed_sources: options.embed_sources,
        }
    }

    /// Record one caller->callee transition. Both endpoints are ensured as
    /// nodes before the edge is appended, so every edge always refers to
    /// existing nodes.
    pub fn add_edge(&mut self, from: &FrameRecord, to: &FrameRecord) -> Result<(), FigureError> {
        self.sequence += 1;
        let sequence = self.sequence;

        let from_id = self.ensure_node(from)?;
        let to_id = self.ensure_node(to)?;

        self.edges.push(Edge {
            from: from_id,
            to: to_id,
            sequence,
            call_site_line: from.call_site_line,
            caller_file: from.source_file.clone(),
            caller_name: from.function_name.clone(),
            callee_name: to.function_name.clone(),
        });
        Ok(())
    }

    /// Make sure the record's function exists as a node, creating its
    /// cluster first if this is the first frame from that file. Repeated
    /// records for the same defined function are a no-op.
    pub fn ensure_node(&mut self, record: &FrameRecord) -> Result<FrameId, FigureError> {
        let slot = self.resolve_cluster(&record.source_file)?;
        let id = FrameId::of(record);

        let cluster = &mut self.clusters[slot];
        if cluster.members.contains(&id) {
            return Ok(id);
        }
        cluster.members.insert(id.clone());
        cluster.nodes.push(Node {
            id: id.clone(),
            label: record.label(),
            source_file: record.source_file.clone(),
            definition_line: record.definition_line,
            function_name: record.function_name.clone(),
        });
        Ok(id)
    }

    fn resolve_cluster(&mut self, file: &Path) -> Result<usize, FigureError> {
        if let Some(&slot) = self.cluster_index.get(file) {
            return Ok(slot);
        }

        let token = self.classifier.classify(file);
        let color = self.palette.color_for(token.as_deref());
        let source = if self.embed_sources {
            Some(
                fs::read_to_string(file).map_err(|source| FigureError::SourceRead {
                    path: file.to_path_buf(),
                    source,
                })?,
            )
        } else {
            None
        };
        debug!(file = %file.display(), token = token.as_deref().unwrap_or("<local>"), "new cluster");

        let slot = self.clusters.len();
        self.clusters.push(Cluster {
            source_file: file.to_path_buf(),
            color,
            source,
            members: HashSet::new(),
            nodes: Vec::new(),
        });
        self.cluster_index.insert(file.to_path_buf(), slot);
        Ok(slot)
    }

    /// Finalize. The returned graph exposes read-only views only.
    pub fn finish(self) -> FrameGraph {
        FrameGraph {
            clusters: self.clusters,
            edges: self.edges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::palette::PaletteStyle;
    use crate::ports::ColorSource;

    struct FixedHues(f64);

    impl ColorSource for FixedHues {
        fn next_hue(&mut self) -> f64 {
            let hue = self.0;
            self.0 = (self.0 + 0.25).rem_euclid(1.0);
            hue
        }
    }

    struct MarkerClassifier;

    impl PathClassifier for MarkerClassifier {
        fn classify(&self, path: &Path) -> Option<String> {
            let mut parts = path.iter();
            while let Some(part) = parts.next() {
                if part == "site-packages" {
                    return parts.next().and_then(|p| p.to_str()).map(String::from);
                }
            }
            None
        }
    }

    fn test_builder() -> GraphBuilder {
        GraphBuilder::new(GraphOptions {
            classifier: Box::new(MarkerClassifier),
            palette: Palette::new(PaletteStyle::DIAGRAM, Box::new(FixedHues(0.0))),
            embed_sources: false,
        })
    }

    #[test]
    fn repeated_function_dedups_to_one_node() {
        let mut builder = test_builder();
        let caller = FrameRecord::new("/app/main.py", 1, 5, "main");
        // Same defined function reached from two different call sites
        let first_call = FrameRecord::new("/app/util.py", 10, 12, "helper");
        let second_call = FrameRecord::new("/app/util.py", 10, 30, "helper");

        builder.add_edge(&caller, &first_call).unwrap();
        builder.add_edge(&caller, &second_call).unwrap();
        let graph = builder.finish();

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edges().len(), 2);
        assert_eq!(graph.edges()[0].to, graph.edges()[1].to);
    }

    #[test]
    fn sequence_numbers_are_one_based_and_increasing() {
        let mut builder = test_builder();
        let a = FrameRecord::new("/app/a.py", 1, 2, "a");
        let b = FrameRecord::new("/app/b.py", 1, 2, "b");

        builder.add_edge(&a, &b).unwrap();
        builder.add_edge(&b, &a).unwrap();
        builder.add_edge(&a, &b).unwrap();
        let graph = builder.finish();

        let sequences: Vec<usize> = graph.edges().iter().map(|e| e.sequence).collect();
        assert_eq!(sequences, vec![1, 2, 3]);
    }

    #[test]
    fn edge_carries_caller_call_site() {
        let mut builder = test_builder();
        let caller = FrameRecord::new("/app/main.py", 1, 15, "main");
        let callee = FrameRecord::new("/app/util.py", 20, 99, "helper");

        builder.add_edge(&caller, &callee).unwrap();
        let graph = builder.finish();

        let edge = &graph.edges()[0];
        assert_eq!(edge.call_site_line, 15, "must be the caller's line, not the callee's");
        assert_eq!(edge.label(), "#1 at 15");
    }

    #[test]
    fn clusters_partition_nodes_by_file() {
        let mut builder = test_builder();
        let main = FrameRecord::new("/app/main.py", 1, 5, "main");
        let helper = FrameRecord::new("/app/main.py", 20, 22, "helper");
        let lib_fn = FrameRecord::new("/venv/site-packages/requests/api.py", 5, 8, "get");

        builder.add_edge(&main, &helper).unwrap();
        builder.add_edge(&helper, &lib_fn).unwrap();
        let graph = builder.finish();

        assert_eq!(graph.clusters().len(), 2);
        let app = graph.find_cluster(Path::new("/app/main.py")).unwrap();
        let lib = graph
            .find_cluster(Path::new("/venv/site-packages/requests/api.py"))
            .unwrap();
        assert_eq!(app.nodes().len(), 2);
        assert_eq!(lib.nodes().len(), 1);
        // Local file keeps the fixed default, library file gets a hue
        assert_eq!(app.color, PaletteStyle::DIAGRAM.default_color);
        assert_ne!(lib.color, PaletteStyle::DIAGRAM.default_color);
    }

    #[test]
    fn shared_token_shares_color_across_clusters() {
        let mut builder = test_builder();
        let a = FrameRecord::new("/venv/site-packages/requests/api.py", 1, 2, "get");
        let b = FrameRecord::new("/venv/site-packages/requests/sessions.py", 1, 2, "send");
        let c = FrameRecord::new("/venv/site-packages/urllib3/pool.py", 1, 2, "urlopen");

        builder.add_edge(&a, &b).unwrap();
        builder.add_edge(&b, &c).unwrap();
        let graph = builder.finish();

        let colors: Vec<Rgb> = graph.clusters().iter().map(|cl| cl.color).collect();
        assert_eq!(colors[0], colors[1], "same package, same color");
        assert_ne!(colors[0], colors[2], "different package, different color");
    }

    #[test]
    fn missing_source_is_fatal_when_embedding() {
        let mut builder = GraphBuilder::new(GraphOptions {
            classifier: Box::new(MarkerClassifier),
            palette: Palette::new(PaletteStyle::DOCUMENT, Box::new(FixedHues(0.0))),
            embed_sources: true,
        });
        let record = FrameRecord::new("/nonexistent/definitely_missing.py", 1, 1, "main");
        let err = builder.ensure_node(&record).unwrap_err();
        assert!(matches!(err, FigureError::SourceRead { .. }));
    }
}
