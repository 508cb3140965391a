//! Peeling-plan generation for the finalized relationship graph.
//!
//! # Overview
//!
//! Downstream inference sums latent genotypes out of the joint distribution
//! one variable at a time. This module picks the order and the bookkeeping
//! structure for that:
//!
//! ```text
//! finalized DAG
//!     ↓  eliminate::eliminate()     factor scopes → moral graph →
//!     |                             min-fill-in elimination order
//!     ↓  junction::assemble()       clique tree with intersection nodes
//! PeelingPlan
//! ```
//!
//! The clique-tree construction follows Almond & Kong's Markov-tree
//! recipe: walking the elimination order backwards, each vertex's clique is
//! hung off the clique that contains its separator.

pub mod eliminate;
pub mod junction;

use petgraph::graph::NodeIndex;

use crate::graph::model::PedigreeGraph;

pub use eliminate::Elimination;
pub use junction::{CliqueNode, JunctionTree};

/// The compiler's second artifact: an elimination order over the finalized
/// vertices and the junction tree of cliques it induces.
#[derive(Debug, Clone)]
pub struct PeelingPlan {
    /// Vertices in elimination order.
    pub elimination_order: Vec<NodeIndex>,
    /// Junction tree of cliques, running-intersection by construction.
    pub junction_tree: JunctionTree,
}

/// Compute the peeling plan for a finalized graph.
#[must_use]
pub fn plan(graph: &PedigreeGraph) -> PeelingPlan {
    let elimination = eliminate::eliminate(graph);
    let junction_tree = junction::assemble(&elimination.order, &elimination.separators);
    PeelingPlan {
        elimination_order: elimination
            .order
            .iter()
            .map(|&v| NodeIndex::new(v))
            .collect(),
        junction_tree,
    }
}
