//! Topological simplification.
//!
//! # Overview
//!
//! Three passes over one precomputed topological order, each a single linear
//! sweep (no fixed-point iteration):
//!
//! 1. **Tip pruning** (reverse topo, sinks first): clear every non-Sample
//!    sink. Sweeping sinks-first lets the clearing cascade up a dead branch
//!    in one pass.
//! 2. **Founder unlinking** (forward topo): a germline vertex whose parents
//!    all exist only to feed it (total degree 1) loses its in-edges; the
//!    finalizer then classifies it as a founder.
//! 3. **Chain bypass** (forward topo): a vertex with one child is bypassed
//!    when the child stays within diploid parentage and matches its ploidy.
//!    Replacement edges are additive in length and OR their kinds.
//!
//! Clearing never removes vertices, so the `NodeIndex` list computed up
//! front stays valid across all three sweeps.

use petgraph::visit::EdgeRef;
use petgraph::Direction;
use tracing::{debug, instrument};

use kindred_core::error::Result;

use crate::graph::model::{
    clear_in_edges, clear_vertex, degree, in_degree, out_degree, topological_order, EdgeData,
    PedigreeGraph, VertexType,
};

/// Simplify `graph` by removing non-informative structure.
///
/// # Errors
///
/// Returns an error if the graph is cyclic (cannot happen after a
/// successful build, which validates acyclicity).
#[instrument(skip(graph))]
pub fn simplify(graph: &mut PedigreeGraph) -> Result<()> {
    let topo = topological_order(graph)?;
    let before = graph.edge_count();

    // Pass 1: clear non-sample sinks, tips first.
    for &v in topo.iter().rev() {
        if out_degree(graph, v) == 0 && graph[v].kind != VertexType::Sample {
            clear_vertex(graph, v);
        }
    }

    // Pass 2: unlink founder parents that feed exactly one child.
    for &v in &topo {
        if graph[v].kind != VertexType::Germline || in_degree(graph, v) == 0 {
            continue;
        }
        let all_dedicated = graph
            .edges_directed(v, Direction::Incoming)
            .all(|e| degree(graph, e.source()) == 1);
        if all_dedicated {
            clear_in_edges(graph, v);
        }
    }

    // Pass 3: bypass single-child pass-through vertices.
    for &v in &topo {
        if in_degree(graph, v) == 0 || out_degree(graph, v) != 1 {
            continue;
        }
        let Some(out_edge) = graph.edges_directed(v, Direction::Outgoing).next() else {
            continue;
        };
        let child = out_edge.target();
        let out_length = out_edge.weight().length;
        let out_kind = out_edge.weight().kind;

        if in_degree(graph, child) + in_degree(graph, v) - 1 > 2 {
            continue;
        }
        if graph[child].ploidy != graph[v].ploidy {
            continue;
        }

        let in_edges: Vec<_> = graph
            .edges_directed(v, Direction::Incoming)
            .map(|e| (e.source(), e.weight().length, e.weight().kind))
            .collect();
        for (grand, length, kind) in in_edges {
            graph.add_edge(
                grand,
                child,
                EdgeData {
                    length: length + out_length,
                    kind: kind | out_kind,
                },
            );
        }
        clear_vertex(graph, v);
    }

    debug!(removed = before.saturating_sub(graph.edge_count()), "simplified");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
