//! Port traits connecting the graph core to its collaborators: path
//! classification, hue sampling, and the presentation strategies.

use crate::domain::graph::{Cluster, Edge, Node};
use anyhow::Result;
use std::path::Path;

/// Maps a source file path to a coarse grouping token, or `None` for files
/// that are part of the user's own project.
pub trait PathClassifier {
    fn classify(&self, path: &Path) -> Option<String>;
}

/// Source of hues for newly seen package tokens. The default implementation
/// samples uniformly at random once per token; tests inject a fixed sequence
/// to make color assignment reproducible.
pub trait ColorSource {
    /// Next hue in `0.0..1.0`.
    fn next_hue(&mut self) -> f64;
}

/// One presentation strategy over a finalized [`FrameGraph`]
/// (plain diagram, color-coded diagram, interactive document).
///
/// The driver walks the graph exactly once and calls, in order:
/// `emit_cluster` for each cluster immediately followed by `emit_node` for
/// each of its members, then `emit_edge` for every edge in sequence order,
/// then `finalize` exactly once. Implementations only decorate; they never
/// restructure the graph.
///
/// [`FrameGraph`]: crate::domain::graph::FrameGraph
pub trait Renderer {
    fn emit_cluster(&mut self, cluster: &Cluster) -> Result<()>;

    /// `cluster` is always the cluster most recently passed to
    /// [`Renderer::emit_cluster`].
    fn emit_node(&mut self, node: &Node, cluster: &Cluster) -> Result<()>;

    fn emit_edge(&mut self, edge: &Edge) -> Result<()>;

    /// Produce the output artifact. A layout-engine or write failure here is
    /// fatal; no partial artifact may be left behind.
    fn finalize(&mut self, destination: &Path) -> Result<()>;
}
