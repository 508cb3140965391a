//! Finalization: stratum reorder, relabel, and re-emission.
//!
//! # Overview
//!
//! Builds a fresh graph whose vertex indices are grouped by stratum —
//! founders, non-founder germline, somatic, samples — with each stratum in
//! topological order (parents before children). Cleared vertices have degree
//! 0 and fall outside every pass, so they are dropped by omission.
//!
//! Labels gain their stratum suffix here: `/z` for founder and germline
//! vertices, `/t` for somatic; sample labels stay as sequenced.

use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use tracing::{debug, instrument};

use kindred_core::error::Result;

use crate::graph::model::{
    degree, in_degree, out_degree, topological_order, PedigreeGraph, VertexType,
};

/// Emit the finalized graph for `input`.
///
/// # Errors
///
/// Returns an error if the graph is cyclic (cannot happen after a
/// successful build).
#[instrument(skip(input))]
pub fn finalize(input: &PedigreeGraph) -> Result<PedigreeGraph> {
    let topo = topological_order(input)?;

    let is_founder = |v: NodeIndex| {
        in_degree(input, v) == 0
            && out_degree(input, v) > 0
            && input[v].kind == VertexType::Germline
    };

    let mut vertex_order: Vec<NodeIndex> = Vec::with_capacity(input.node_count());
    vertex_order.extend(topo.iter().copied().filter(|&v| is_founder(v)));
    vertex_order.extend(topo.iter().copied().filter(|&v| {
        in_degree(input, v) > 0 && input[v].kind == VertexType::Germline
    }));
    vertex_order.extend(topo.iter().copied().filter(|&v| {
        degree(input, v) > 0 && input[v].kind == VertexType::Somatic
    }));
    vertex_order.extend(topo.iter().copied().filter(|&v| {
        degree(input, v) > 0 && input[v].kind == VertexType::Sample
    }));

    let mut output = PedigreeGraph::with_capacity(vertex_order.len(), input.edge_count());
    let mut old_to_new: Vec<Option<NodeIndex>> = vec![None; input.node_count()];

    for &old in &vertex_order {
        let mut data = input[old].clone();
        if is_founder(old) {
            data.kind = VertexType::Founder;
        }
        match data.kind {
            VertexType::Founder | VertexType::Germline => data.label.push_str("/z"),
            VertexType::Somatic => data.label.push_str("/t"),
            VertexType::Sample => {}
        }
        let new = output.add_node(data);
        old_to_new[old.index()] = Some(new);
    }

    for e in input.edge_references() {
        let (Some(src), Some(tgt)) = (
            old_to_new[e.source().index()],
            old_to_new[e.target().index()],
        ) else {
            debug_assert!(false, "edge endpoint outside every stratum pass");
            continue;
        };
        output.add_edge(src, tgt, *e.weight());
    }

    debug!(
        dropped = input.node_count() - output.node_count(),
        vertices = output.node_count(),
        "finalized graph"
    );
    Ok(output)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
