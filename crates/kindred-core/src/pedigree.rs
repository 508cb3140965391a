//! Pedigree data model.
//!
//! # Overview
//!
//! A [`Pedigree`] is an ordered list of [`Member`] records plus a name →
//! position map. Members reference their parents by name; positions are the
//! stable 0-based indices the graph builder uses as vertex ids, so insertion
//! order is load-bearing.
//!
//! Ploidy is not a stored field: it is derived from the member's free-form
//! tag list by [`Member::declared_ploidy`], matching tags case-insensitively
//! with explicit ploidy tags taking precedence over `clone`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{PedigreeError, Result};

// ---------------------------------------------------------------------------
// Sex
// ---------------------------------------------------------------------------

/// Chromosomal sex of a pedigree member.
///
/// `Autosomal` marks individuals modeled without a sexed karyotype (rare in
/// input, but kept distinct from `Unknown`, which means "not recorded").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Autosomal,
    Male,
    Female,
    #[default]
    Unknown,
}

impl Sex {
    /// Lower-case name used by the YAML graph dump.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Autosomal => "autosomal",
            Self::Male => "male",
            Self::Female => "female",
            Self::Unknown => "unknown",
        }
    }
}

// ---------------------------------------------------------------------------
// Member
// ---------------------------------------------------------------------------

/// One pedigree record: an individual with optional parents, free-form tags,
/// and the Newick strings describing its somatic lineage samples.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// Individual identifier, unique within the pedigree.
    pub name: String,
    /// Recorded sex, `Unknown` when absent.
    pub sex: Sex,
    /// Father's name, if recorded.
    pub dad: Option<String>,
    /// Generational distance to the father; `None` defaults to 1.0.
    pub dad_length: Option<f64>,
    /// Mother's name, if recorded.
    pub mom: Option<String>,
    /// Generational distance to the mother; `None` defaults to 1.0.
    pub mom_length: Option<f64>,
    /// Free-form tags (`founder`, `clone`, ploidy markers, ...).
    pub tags: Vec<String>,
    /// Somatic lineage trees in Newick form, one per sequenced tissue.
    pub samples: Vec<String>,
}

impl Member {
    /// Create a member with the given name and sex and no other data.
    pub fn new(name: impl Into<String>, sex: Sex) -> Self {
        Self {
            name: name.into(),
            sex,
            ..Self::default()
        }
    }

    /// Set the father, with an optional branch length.
    #[must_use]
    pub fn with_dad(mut self, name: impl Into<String>, length: Option<f64>) -> Self {
        self.dad = Some(name.into());
        self.dad_length = length;
        self
    }

    /// Set the mother, with an optional branch length.
    #[must_use]
    pub fn with_mom(mut self, name: impl Into<String>, length: Option<f64>) -> Self {
        self.mom = Some(name.into());
        self.mom_length = length;
        self
    }

    /// Append a tag.
    #[must_use]
    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Append a somatic sample tree (Newick text).
    #[must_use]
    pub fn with_sample(mut self, newick: impl Into<String>) -> Self {
        self.samples.push(newick.into());
        self
    }

    /// Case-insensitive tag test.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Ploidy declared by this member's tags.
    ///
    /// Precedence: an explicit ploidy tag (`haploid`, `gamete`, `p=1`,
    /// `ploidy=1`, `diploid`, `p=2`, `ploidy=2`) wins over `clone`; `clone`
    /// alone yields 0, to be resolved from the parent during graph
    /// construction; everything else defaults to 2.
    #[must_use]
    pub fn declared_ploidy(&self) -> u8 {
        const HAPLOID: [&str; 4] = ["haploid", "gamete", "p=1", "ploidy=1"];
        const DIPLOID: [&str; 3] = ["diploid", "p=2", "ploidy=2"];

        for tag in &self.tags {
            if HAPLOID.iter().any(|t| tag.eq_ignore_ascii_case(t)) {
                return 1;
            }
            if DIPLOID.iter().any(|t| tag.eq_ignore_ascii_case(t)) {
                return 2;
            }
        }
        if self.has_tag("clone") {
            return 0;
        }
        2
    }

    /// Whether this member has no recorded parentage to draw edges from.
    #[must_use]
    pub fn is_parentless(&self) -> bool {
        self.dad.is_none() && self.mom.is_none()
    }
}

// ---------------------------------------------------------------------------
// Pedigree
// ---------------------------------------------------------------------------

/// Ordered collection of pedigree members.
///
/// Member positions are stable: the graph builder creates one vertex per
/// member at the same index. Names are unique; [`Pedigree::add_member`]
/// rejects duplicates.
#[derive(Debug, Clone, Default)]
pub struct Pedigree {
    members: Vec<Member>,
    name_to_pos: HashMap<String, usize>,
}

impl Pedigree {
    /// Create an empty pedigree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the pedigree has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// All members in insertion order.
    #[must_use]
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Position of the member named `name`, if present.
    #[must_use]
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.name_to_pos.get(name).copied()
    }

    /// Append a member, returning its position.
    ///
    /// # Errors
    ///
    /// Returns an error if a member with the same name already exists.
    pub fn add_member(&mut self, member: Member) -> Result<usize> {
        if self.name_to_pos.contains_key(&member.name) {
            return Err(PedigreeError::invalid(format!(
                "duplicate member name '{}'",
                member.name
            )));
        }
        let pos = self.members.len();
        self.name_to_pos.insert(member.name.clone(), pos);
        self.members.push(member);
        Ok(pos)
    }

    /// Build a pedigree from an iterator of members.
    ///
    /// # Errors
    ///
    /// Returns an error on duplicate member names.
    pub fn from_members(members: impl IntoIterator<Item = Member>) -> Result<Self> {
        let mut pedigree = Self::new();
        for member in members {
            pedigree.add_member(member)?;
        }
        Ok(pedigree)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
