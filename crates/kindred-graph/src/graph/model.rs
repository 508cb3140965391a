//! Typed vertex/edge model for the pedigree relationship graph.
//!
//! # Overview
//!
//! [`PedigreeGraph`] is a directed multigraph: parallel edges between one
//! pair of vertices are legal (a diploid child has two in-edges, one per
//! parent). Degree helpers therefore count edge instances, not distinct
//! neighbors.
//!
//! Vertex indices double as identifiers across the whole pipeline, so
//! nothing here removes vertices. [`clear_vertex`] drops incident edges and
//! zeroes ploidy instead; the finalizer later omits cleared vertices from
//! its output graph.

use std::ops::{BitOr, BitOrAssign};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use kindred_core::error::{PedigreeError, Result};
use kindred_core::pedigree::Sex;

// ---------------------------------------------------------------------------
// Vertex attributes
// ---------------------------------------------------------------------------

/// Stratum of a vertex in the relationship graph.
///
/// `Founder` is assigned by the finalizer; earlier passes keep founding
/// individuals as `Germline` and recognize them by in-degree 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexType {
    Founder,
    Germline,
    Somatic,
    Sample,
}

/// Attributes of one vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexData {
    /// Unique label; finalized labels carry a `/z` or `/t` suffix.
    pub label: String,
    pub sex: Sex,
    /// 0 = cleared (or unresolved clone), 1 = haploid, 2 = diploid.
    pub ploidy: u8,
    pub kind: VertexType,
}

// ---------------------------------------------------------------------------
// Edge attributes
// ---------------------------------------------------------------------------

/// Bitset of edge kinds.
///
/// Only germline vs non-germline is semantically load-bearing; the somatic
/// and library bits record provenance. Chain collapse ORs the kinds of the
/// merged edges together, so a collapsed edge may carry several bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeKind(u8);

impl EdgeKind {
    /// Meiotic transmission between germline individuals.
    pub const GERM: Self = Self(0b001);
    /// Mitotic transmission inside a somatic lineage tree.
    pub const SOMA: Self = Self(0b010);
    /// Boundary edge into a sequenced sample library.
    pub const LIBRARY: Self = Self(0b100);

    /// Whether every bit of `other` is set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether the germline bit is set.
    #[must_use]
    pub const fn is_germline(self) -> bool {
        self.0 & Self::GERM.0 != 0
    }
}

impl BitOr for EdgeKind {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for EdgeKind {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Attributes of one edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeData {
    /// Generational distance, later scaled by a mutation rate and made
    /// additive along collapsed chains. Non-negative.
    pub length: f64,
    pub kind: EdgeKind,
}

/// The pedigree relationship graph.
pub type PedigreeGraph = DiGraph<VertexData, EdgeData>;

// ---------------------------------------------------------------------------
// Degree and clearing helpers
// ---------------------------------------------------------------------------

/// Number of in-edges of `v`, counting parallel edges separately.
#[must_use]
pub fn in_degree(graph: &PedigreeGraph, v: NodeIndex) -> usize {
    graph.edges_directed(v, Direction::Incoming).count()
}

/// Number of out-edges of `v`, counting parallel edges separately.
#[must_use]
pub fn out_degree(graph: &PedigreeGraph, v: NodeIndex) -> usize {
    graph.edges_directed(v, Direction::Outgoing).count()
}

/// Total degree (in + out) of `v`.
#[must_use]
pub fn degree(graph: &PedigreeGraph, v: NodeIndex) -> usize {
    in_degree(graph, v) + out_degree(graph, v)
}

/// Remove every edge incident to `v` and zero its ploidy.
///
/// The vertex itself stays, keeping all other `NodeIndex` values valid.
/// Edges are removed one at a time because `remove_edge` invalidates the
/// last edge index.
pub fn clear_vertex(graph: &mut PedigreeGraph, v: NodeIndex) {
    loop {
        let next = graph
            .edges_directed(v, Direction::Incoming)
            .map(|e| e.id())
            .chain(graph.edges_directed(v, Direction::Outgoing).map(|e| e.id()))
            .next();
        let Some(edge) = next else { break };
        graph.remove_edge(edge);
    }
    graph[v].ploidy = 0;
}

/// Remove every in-edge of `v`, leaving the vertex and its out-edges intact.
pub fn clear_in_edges(graph: &mut PedigreeGraph, v: NodeIndex) {
    loop {
        let next = graph
            .edges_directed(v, Direction::Incoming)
            .map(|e| e.id())
            .next();
        let Some(edge) = next else { break };
        graph.remove_edge(edge);
    }
}

/// Remove every germline edge whose endpoint sexes satisfy `violates`.
///
/// Non-germline edges are never touched. Used by the inheritance-model
/// pruner, where each model is a predicate over (source sex, target sex).
pub fn remove_germline_edges_where<F>(graph: &mut PedigreeGraph, violates: F)
where
    F: Fn(Sex, Sex) -> bool,
{
    graph.retain_edges(|g, e| {
        if !g[e].kind.is_germline() {
            return true;
        }
        let Some((a, b)) = g.edge_endpoints(e) else {
            return true;
        };
        !violates(g[a].sex, g[b].sex)
    });
}

/// Vertices in topological order, parents before children.
///
/// # Errors
///
/// Returns an error if the graph contains a cycle (an individual listed as
/// its own ancestor).
pub fn topological_order(graph: &PedigreeGraph) -> Result<Vec<NodeIndex>> {
    petgraph::algo::toposort(graph, None)
        .map_err(|_| PedigreeError::invalid("pedigree contains a cycle"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
