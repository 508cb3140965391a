//! Pedigree relationship graph: model and transformation passes.
//!
//! # Overview
//!
//! The graph is a petgraph [`DiGraph`](petgraph::graph::DiGraph) with typed
//! vertex and edge weights. Construction and every transformation pass mutate
//! one shared graph value; only the finalizer produces a fresh graph.
//!
//! ## Pipeline
//!
//! ```text
//! Pedigree
//!     ↓  build::build_pedigree_graph()      members → vertices, parentage →
//!     |                                     germline edges, Newick samples →
//!     |                                     somatic subtrees
//!     ↓  build::apply_mutation_rates()      edge lengths × mutation rate
//!     ↓  prune::prune()                     inheritance-model edge removal,
//!     |                                     ploidy normalization, clearing
//!     ↓  simplify::simplify()               tip pruning, founder unlinking,
//!     |                                     chain bypass
//!     ↓  finalize::finalize()               stratum reorder, /z /t relabel
//! finalized PedigreeGraph (input to the peeling planner)
//! ```
//!
//! Vertices are never removed before finalization: a vertex is *cleared*
//! (edges dropped, ploidy zeroed) so that `NodeIndex` values stay stable
//! across passes, and the finalizer drops cleared vertices by omission.

pub mod build;
pub mod finalize;
pub mod model;
pub mod prune;
pub mod simplify;

pub use model::{EdgeData, EdgeKind, PedigreeGraph, VertexData, VertexType};
