//! Inheritance model selection.
//!
//! The model decides which germline edges survive pruning and how ploidy is
//! normalized across the pedigree graph. Parsing accepts the hyphenated and
//! plain spellings of the sex-linked models plus `mitochondrial` as an alias
//! for maternal inheritance.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PedigreeError;

/// Chromosomal inheritance rule governing transmission of genetic material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InheritanceModel {
    Autosomal,
    Maternal,
    Paternal,
    XLinked,
    YLinked,
    WLinked,
    ZLinked,
}

impl InheritanceModel {
    /// Canonical lower-case name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Autosomal => "autosomal",
            Self::Maternal => "maternal",
            Self::Paternal => "paternal",
            Self::XLinked => "x-linked",
            Self::YLinked => "y-linked",
            Self::WLinked => "w-linked",
            Self::ZLinked => "z-linked",
        }
    }
}

impl fmt::Display for InheritanceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for InheritanceModel {
    type Err = PedigreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "autosomal" => Ok(Self::Autosomal),
            "maternal" | "mitochondrial" => Ok(Self::Maternal),
            "paternal" => Ok(Self::Paternal),
            "x-linked" | "xlinked" => Ok(Self::XLinked),
            "y-linked" | "ylinked" => Ok(Self::YLinked),
            "w-linked" | "wlinked" => Ok(Self::WLinked),
            "z-linked" | "zlinked" => Ok(Self::ZLinked),
            other => Err(PedigreeError::invalid(format!(
                "unknown inheritance model '{other}'"
            ))),
        }
    }
}
