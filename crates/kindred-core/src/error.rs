//! Error type shared by the pedigree model and the graph compiler.

use thiserror::Error;

/// Errors raised while compiling a pedigree into a relationship graph.
///
/// Every violation — structural pedigree problems, inheritance-model
/// constraints, and somatic-data parse failures — is fatal to the current
/// compile and carries a human-readable message. Callers discard any
/// partially built state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PedigreeError {
    /// The pedigree or its somatic data violates a construction rule.
    #[error("invalid pedigree: {0}")]
    InvalidPedigree(String),
}

impl PedigreeError {
    /// Build an [`PedigreeError::InvalidPedigree`] from any message.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidPedigree(message.into())
    }
}

pub type Result<T> = std::result::Result<T, PedigreeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_message() {
        let err = PedigreeError::invalid("the mother of 'x' is male");
        let text = err.to_string();
        assert!(text.contains("invalid pedigree"), "display: {text}");
        assert!(text.contains("mother"), "display: {text}");
    }
}
