//! Moralization and min-fill-in elimination ordering.
//!
//! # Overview
//!
//! The joint probability over the finalized DAG factorizes into one
//! potential per vertex family. Moralizing those factor scopes gives an
//! undirected neighbor structure, and vertices are then eliminated greedily
//! by minimum fill-in: the vertex whose neighborhood needs the fewest extra
//! edges to become a clique goes first, with ties broken toward the larger
//! vertex index — samples and somatic vertices occupy the high indices, so
//! peeling proceeds from the observations up to the founders.
//!
//! Fill-in scores are kept in a binary heap with lazy deletion: entries are
//! re-pushed on update and stale ones skipped at pop time. Scores are
//! recomputed only for the eliminated vertex's neighborhood.

use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap};

use petgraph::visit::EdgeRef;
use petgraph::Direction;
use tracing::debug;

use crate::graph::model::{in_degree, out_degree, PedigreeGraph};

/// Result of the elimination pass.
#[derive(Debug, Clone)]
pub struct Elimination {
    /// Vertex indices in elimination order; a permutation of `0..n`.
    pub order: Vec<usize>,
    /// Per-vertex separator: the moral neighbors still present at the moment
    /// the vertex was eliminated. Indexed by vertex.
    pub separators: Vec<BTreeSet<usize>>,
}

/// Compute a min-fill-in elimination order for `graph`.
#[must_use]
pub fn eliminate(graph: &PedigreeGraph) -> Elimination {
    let n = graph.node_count();
    let mut neighbors = moral_neighbors(graph);

    let mut fill: Vec<usize> = (0..n).map(|v| fill_in(&neighbors, v)).collect();
    let mut heap: BinaryHeap<(Reverse<usize>, usize)> = (0..n)
        .map(|v| (Reverse(fill[v]), v))
        .collect();
    let mut eliminated = vec![false; n];
    let mut order = Vec::with_capacity(n);
    let mut separators = vec![BTreeSet::new(); n];

    while let Some((Reverse(score), v)) = heap.pop() {
        if eliminated[v] || score != fill[v] {
            continue;
        }
        eliminated[v] = true;
        order.push(v);

        let clique: Vec<usize> = neighbors[v].iter().copied().collect();
        separators[v] = neighbors[v].clone();

        // Complete the clique over the remaining neighborhood, then detach v.
        if score > 0 {
            for &a in &clique {
                for &b in &clique {
                    if a != b {
                        neighbors[a].insert(b);
                    }
                }
            }
        }
        for &a in &clique {
            neighbors[a].remove(&v);
        }
        for &a in &clique {
            fill[a] = fill_in(&neighbors, a);
            heap.push((Reverse(fill[a]), a));
        }
    }

    for &v in &order {
        debug!(
            vertex = %graph[petgraph::graph::NodeIndex::new(v)].label,
            separator = ?separators[v],
            "eliminate"
        );
    }

    Elimination { order, separators }
}

// ---------------------------------------------------------------------------
// Moralization
// ---------------------------------------------------------------------------

/// Factor scopes of the finalized DAG, one set of rules per vertex:
/// a singleton for each sink and each source, and the parent-child scope
/// `{v} ∪ parents(v)` for each vertex with parents.
fn potentials(graph: &PedigreeGraph) -> Vec<Vec<usize>> {
    let mut scopes = Vec::with_capacity(graph.node_count() * 2);
    for v in graph.node_indices() {
        if out_degree(graph, v) == 0 {
            scopes.push(vec![v.index()]);
        }
        if in_degree(graph, v) == 0 {
            scopes.push(vec![v.index()]);
        } else {
            let mut scope = vec![v.index()];
            let mut parents: Vec<usize> = graph
                .edges_directed(v, Direction::Incoming)
                .map(|e| e.source().index())
                .collect();
            parents.sort_unstable();
            scope.extend(parents);
            scopes.push(scope);
        }
    }
    scopes
}

/// Undirected neighbor sets from marrying every pair of vertices that
/// co-occur in a potential scope.
fn moral_neighbors(graph: &PedigreeGraph) -> Vec<BTreeSet<usize>> {
    let mut neighbors = vec![BTreeSet::new(); graph.node_count()];
    for scope in potentials(graph) {
        for (i, &a) in scope.iter().enumerate() {
            for &b in &scope[i + 1..] {
                if a != b {
                    neighbors[a].insert(b);
                    neighbors[b].insert(a);
                }
            }
        }
    }
    neighbors
}

/// Number of missing edges among the neighbors of `v`.
fn fill_in(neighbors: &[BTreeSet<usize>], v: usize) -> usize {
    let k: Vec<usize> = neighbors[v].iter().copied().collect();
    let mut fill = 0;
    for (i, &a) in k.iter().enumerate() {
        for &b in &k[i + 1..] {
            if !neighbors[a].contains(&b) {
                fill += 1;
            }
        }
    }
    fill
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
