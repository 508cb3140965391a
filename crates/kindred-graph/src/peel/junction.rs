//! Junction-tree assembly from an elimination order.
//!
//! # Overview
//!
//! Walking the elimination order backwards, each vertex contributes the
//! clique `separator ∪ {vertex}`. The new clique is always emitted last and
//! attached to the existing structure in one of three ways:
//!
//! 1. a clique node equal to the separator exists — mark it as an
//!    intersection node and connect to it;
//! 2. some clique contains the separator strictly — insert a fresh
//!    intersection node equal to the separator between the smallest such
//!    clique and the new clique;
//! 3. otherwise the new clique starts its own component.
//!
//! The result satisfies the running-intersection property by construction;
//! [`JunctionTree::satisfies_running_intersection`] re-checks it for tests
//! and downstream consumers.

use std::collections::{BTreeSet, VecDeque};

use petgraph::graph::{NodeIndex, UnGraph};

// ---------------------------------------------------------------------------
// Tree model
// ---------------------------------------------------------------------------

/// One node of the junction tree: a set of finalized-graph vertices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliqueNode {
    /// Finalized-graph vertex indices in this clique.
    pub members: BTreeSet<usize>,
    /// Whether this node is a separator between larger cliques rather than
    /// an elimination clique of its own.
    pub is_intersection: bool,
}

/// The junction tree of cliques.
#[derive(Debug, Clone, Default)]
pub struct JunctionTree {
    pub graph: UnGraph<CliqueNode, ()>,
}

impl JunctionTree {
    /// Number of clique nodes (intersection nodes included).
    #[must_use]
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Iterate over all clique nodes.
    pub fn cliques(&self) -> impl Iterator<Item = &CliqueNode> {
        self.graph.node_weights()
    }

    /// Whether the whole tree is a single connected component.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.is_empty() || petgraph::algo::connected_components(&self.graph) == 1
    }

    /// Check the running-intersection property: for every vertex, the
    /// clique nodes containing it induce a connected subtree.
    #[must_use]
    pub fn satisfies_running_intersection(&self) -> bool {
        let all_members: BTreeSet<usize> = self
            .cliques()
            .flat_map(|c| c.members.iter().copied())
            .collect();
        all_members.iter().all(|&x| self.vertex_support_connected(x))
    }

    fn vertex_support_connected(&self, x: usize) -> bool {
        let holding: Vec<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|&i| self.graph[i].members.contains(&x))
            .collect();
        let Some(&start) = holding.first() else {
            return true;
        };

        // BFS restricted to clique nodes containing x.
        let mut seen = BTreeSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(node) = queue.pop_front() {
            for next in self.graph.neighbors(node) {
                if self.graph[next].members.contains(&x) && seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        holding.iter().all(|i| seen.contains(i))
    }
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Build the junction tree for an elimination pass.
///
/// `order` is the elimination order; `separators[v]` holds the moral
/// neighbors of `v` at the moment it was eliminated.
#[must_use]
pub fn assemble(order: &[usize], separators: &[BTreeSet<usize>]) -> JunctionTree {
    let mut graph: UnGraph<CliqueNode, ()> = UnGraph::default();

    for &v in order.iter().rev() {
        let separator = &separators[v];
        let exact = graph
            .node_indices()
            .find(|&i| graph[i].members == *separator);
        let parent = if let Some(exact) = exact {
            graph[exact].is_intersection = true;
            Some(exact)
        } else {
            let host = graph
                .node_indices()
                .filter(|&i| separator.is_subset(&graph[i].members))
                .min_by_key(|&i| graph[i].members.len());
            host.map(|host| {
                let intersection = graph.add_node(CliqueNode {
                    members: separator.clone(),
                    is_intersection: true,
                });
                graph.add_edge(host, intersection, ());
                intersection
            })
        };

        let mut members = separator.clone();
        members.insert(v);
        let clique = graph.add_node(CliqueNode {
            members,
            is_intersection: false,
        });
        if let Some(parent) = parent {
            graph.add_edge(parent, clique, ());
        }
    }

    JunctionTree { graph }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
