#![forbid(unsafe_code)]
//! kindred-graph library.
//!
//! The relationship-graph compiler: turns a [`kindred_core::Pedigree`] plus a
//! list of sequenced samples into a finalized inheritance DAG and a peeling
//! (variable-elimination) plan for downstream probabilistic inference.
//!
//! # Pipeline
//!
//! ```text
//! Pedigree + samples
//!        ↓  graph::build        (vertices, parentage edges, somatic grafts)
//!        ↓  graph::build::apply_mutation_rates
//!        ↓  graph::prune        (inheritance-model edge removal)
//!        ↓  graph::simplify     (tips, founder unlinking, chain bypass)
//!        ↓  graph::finalize     (stratum reorder + relabel, new graph)
//! finalized DAG
//!        ↓  peel                (moralize, min-fill elimination, junction tree)
//! PeelingPlan
//! ```
//!
//! [`relationship::RelationshipGraph::construct`] runs the whole pipeline.
//!
//! # Conventions
//!
//! - **Errors**: Typed [`kindred_core::PedigreeError`]; all stages return
//!   [`kindred_core::Result`].
//! - **Logging**: Use `tracing` macros (`debug!`, `trace!`); stage entry
//!   points are `#[instrument]`ed.

pub mod graph;
pub mod peel;
pub mod relationship;

pub use relationship::RelationshipGraph;
