//! Usecase wiring: one walk over the captured stack, one render pass.

use crate::domain::frame::FrameRecord;
use crate::domain::graph::{FigureError, FrameGraph, GraphBuilder, GraphOptions};
use crate::ports::Renderer;
use anyhow::Result;
use std::path::Path;

/// Walk a captured stack and build the finalized graph.
///
/// `frames` is ordered as captured, innermost frame first; the walk reverses
/// it to caller->callee order and records one edge per consecutive pair. A
/// one-frame capture yields a single isolated node; an empty capture yields
/// an empty graph. Both are valid terminal cases.
pub fn build_graph(
    frames: &[FrameRecord],
    options: GraphOptions,
) -> Result<FrameGraph, FigureError> {
    let mut builder = GraphBuilder::new(options);
    let walk: Vec<&FrameRecord> = frames.iter().rev().collect();

    if walk.len() == 1 {
        builder.ensure_node(walk[0])?;
    }
    for pair in walk.windows(2) {
        builder.add_edge(pair[0], pair[1])?;
    }
    Ok(builder.finish())
}

/// Drive a renderer once over a finalized graph: every cluster with its
/// member nodes, then every edge in sequence order, then finalize.
pub fn render_graph(
    graph: &FrameGraph,
    renderer: &mut dyn Renderer,
    destination: &Path,
) -> Result<()> {
    for cluster in graph.clusters() {
        renderer.emit_cluster(cluster)?;
        for node in cluster.nodes() {
            renderer.emit_node(node, cluster)?;
        }
    }
    for edge in graph.edges() {
        renderer.emit_edge(edge)?;
    }
    renderer.finalize(destination)
}

/// End-to-end figure rendering for one captured stack.
pub struct FigureUsecase<'a> {
    pub renderer: &'a mut dyn Renderer,
}

impl<'a> FigureUsecase<'a> {
    pub fn run(
        &mut self,
        frames: &[FrameRecord],
        options: GraphOptions,
        destination: &Path,
    ) -> Result<()> {
        let graph = build_graph(frames, options)?;
        render_graph(&graph, self.renderer, destination)
    }
}
