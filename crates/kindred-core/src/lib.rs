#![forbid(unsafe_code)]
//! kindred-core library.
//!
//! Pedigree data model for the kindred relationship-graph compiler: members
//! with sex, parentage, and tag-derived ploidy; the inheritance-model name
//! map; and the Newick parser for per-individual somatic lineage trees.
//!
//! # Conventions
//!
//! - **Errors**: Typed errors via [`error::PedigreeError`]; return
//!   [`error::Result`] from fallible operations.
//! - **Logging**: Use `tracing` macros (`debug!`, `warn!`, `trace!`).

pub mod error;
pub mod inheritance;
pub mod newick;
pub mod pedigree;

pub use error::{PedigreeError, Result};
pub use inheritance::InheritanceModel;
pub use pedigree::{Member, Pedigree, Sex};
