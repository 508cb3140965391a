//! Pedigree graph construction.
//!
//! # Overview
//!
//! Builds the initial relationship graph from a [`Pedigree`]:
//!
//! 1. One `Germline` vertex per member, at the member's position, with
//!    tag-derived ploidy.
//! 2. Parentage edges, dispatched on the declared ploidy: a clone copies sex
//!    and ploidy from its single parent, a gamete takes one sex-checked
//!    parent, a diploid takes one edge from each of a father and a mother.
//! 3. Somatic lineage subtrees grafted below each sequenced member from its
//!    Newick sample strings, then somatic vertices named in the
//!    sequenced-sample list retyped to `Sample`.
//!
//! The result is validated to be a DAG before any later pass runs.
//!
//! ## Edge direction
//!
//! An edge `A → B` means "B inherits genetic material from A": parents point
//! at children, germline roots point into their somatic trees.

use std::collections::HashSet;

use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use tracing::{debug, instrument};

use kindred_core::error::{PedigreeError, Result};
use kindred_core::newick::{self, SomaticNode};
use kindred_core::pedigree::{Member, Pedigree, Sex};

use crate::graph::model::{self, EdgeData, EdgeKind, PedigreeGraph, VertexData, VertexType};

/// Build the initial relationship graph for `pedigree`.
///
/// `known_samples` lists the labels of sequenced specimens; somatic vertices
/// with a matching label are retyped to [`VertexType::Sample`]. With
/// `normalize_somatic_trees`, each somatic tree is rescaled so its deepest
/// root-to-tip path is 1.0 before grafting.
///
/// # Errors
///
/// Returns [`PedigreeError::InvalidPedigree`] for every construction-rule
/// violation: a clone or gamete with two parents, an unresolvable or
/// sex-inconsistent parent, a diploid with a missing parent, unparseable
/// somatic data, or a cyclic pedigree.
#[instrument(skip_all, fields(members = pedigree.len()))]
pub fn build_pedigree_graph(
    pedigree: &Pedigree,
    known_samples: &[String],
    normalize_somatic_trees: bool,
) -> Result<PedigreeGraph> {
    let mut graph = PedigreeGraph::with_capacity(pedigree.len(), pedigree.len());

    for member in pedigree.members() {
        graph.add_node(VertexData {
            label: member.name.clone(),
            sex: member.sex,
            ploidy: member.declared_ploidy(),
            kind: VertexType::Germline,
        });
    }

    add_parentage_edges(pedigree, &mut graph)?;

    for (pos, member) in pedigree.members().iter().enumerate() {
        for sample in &member.samples {
            attach_somatic_tree(&mut graph, NodeIndex::new(pos), sample, normalize_somatic_trees)
                .map_err(|err| {
                    debug!(%err, member = %member.name, "somatic parse failure");
                    PedigreeError::invalid(format!(
                        "unable to parse somatic data for individual '{}'",
                        member.name
                    ))
                })?;
        }
    }

    retype_known_samples(&mut graph, known_samples);

    // An individual listed as its own ancestor would otherwise corrupt every
    // order-driven pass downstream.
    model::topological_order(&graph)?;

    debug!(
        vertices = graph.node_count(),
        edges = graph.edge_count(),
        "pedigree graph constructed"
    );
    Ok(graph)
}

/// Multiply every edge length by the appropriate mutation rate: `mu_germ`
/// for germline edges, `mu_soma` for everything else.
pub fn apply_mutation_rates(graph: &mut PedigreeGraph, mu_germ: f64, mu_soma: f64) {
    for edge in graph.edge_weights_mut() {
        if edge.kind.is_germline() {
            edge.length *= mu_germ;
        } else {
            edge.length *= mu_soma;
        }
    }
}

// ---------------------------------------------------------------------------
// Parentage edges
// ---------------------------------------------------------------------------

fn add_parentage_edges(pedigree: &Pedigree, graph: &mut PedigreeGraph) -> Result<()> {
    for (pos, member) in pedigree.members().iter().enumerate() {
        if member.has_tag("founder") || member.is_parentless() {
            continue;
        }
        let v = NodeIndex::new(pos);
        match graph[v].ploidy {
            0 => add_clone_edge(pedigree, graph, v, member)?,
            1 => add_gamete_edge(pedigree, graph, v, member)?,
            _ => add_diploid_edges(pedigree, graph, v, member)?,
        }
    }
    Ok(())
}

/// A clone has exactly one parent and copies that parent's ploidy and sex,
/// overwriting its placeholder ploidy of 0.
fn add_clone_edge(
    pedigree: &Pedigree,
    graph: &mut PedigreeGraph,
    v: NodeIndex,
    member: &Member,
) -> Result<()> {
    if member.dad.is_some() && member.mom.is_some() {
        return Err(PedigreeError::invalid(format!(
            "clone '{}' has two parents instead of one",
            member.name
        )));
    }
    let (name, length) = single_parent(member);
    let parent = pedigree.position_of(name).ok_or_else(|| {
        PedigreeError::invalid(format!("the clone parent of '{}' is unknown", member.name))
    })?;
    let p = NodeIndex::new(parent);
    graph.add_edge(p, v, germ_edge(length));

    let (ploidy, sex) = (graph[p].ploidy, graph[p].sex);
    graph[v].ploidy = ploidy;
    graph[v].sex = sex;
    Ok(())
}

/// A gamete has exactly one parent whose sex must be consistent with the
/// parental role it was recorded under.
fn add_gamete_edge(
    pedigree: &Pedigree,
    graph: &mut PedigreeGraph,
    v: NodeIndex,
    member: &Member,
) -> Result<()> {
    if member.dad.is_some() && member.mom.is_some() {
        return Err(PedigreeError::invalid(format!(
            "gamete '{}' has two parents instead of one",
            member.name
        )));
    }
    let (name, length) = single_parent(member);
    let parent = if member.dad.is_some() {
        let parent = lookup_parent(pedigree, name, "father", member)?;
        if graph[parent].sex == Sex::Female {
            return Err(PedigreeError::invalid(format!(
                "the father of '{}' is female",
                member.name
            )));
        }
        parent
    } else {
        let parent = lookup_parent(pedigree, name, "mother", member)?;
        if graph[parent].sex == Sex::Male {
            return Err(PedigreeError::invalid(format!(
                "the mother of '{}' is male",
                member.name
            )));
        }
        parent
    };
    graph.add_edge(parent, v, germ_edge(length));
    Ok(())
}

/// A diploid requires both a father and a mother, each sex-checked, and
/// receives one germline edge from each.
fn add_diploid_edges(
    pedigree: &Pedigree,
    graph: &mut PedigreeGraph,
    v: NodeIndex,
    member: &Member,
) -> Result<()> {
    let dad_name = member.dad.as_deref().ok_or_else(|| {
        PedigreeError::invalid(format!("the father of '{}' is unspecified", member.name))
    })?;
    let mom_name = member.mom.as_deref().ok_or_else(|| {
        PedigreeError::invalid(format!("the mother of '{}' is unspecified", member.name))
    })?;

    let dad = lookup_parent(pedigree, dad_name, "father", member)?;
    let mom = lookup_parent(pedigree, mom_name, "mother", member)?;

    if graph[dad].sex == Sex::Female {
        return Err(PedigreeError::invalid(format!(
            "the father of '{}' is female",
            member.name
        )));
    }
    if graph[mom].sex == Sex::Male {
        return Err(PedigreeError::invalid(format!(
            "the mother of '{}' is male",
            member.name
        )));
    }

    graph.add_edge(dad, v, germ_edge(member.dad_length.unwrap_or(1.0)));
    graph.add_edge(mom, v, germ_edge(member.mom_length.unwrap_or(1.0)));
    Ok(())
}

/// The single recorded parent of a clone or gamete, with its edge length.
///
/// Callers have already rejected the two-parent case, and parentless members
/// never reach the dispatch, so exactly one of dad/mom is set.
fn single_parent(member: &Member) -> (&str, f64) {
    if let Some(dad) = member.dad.as_deref() {
        (dad, member.dad_length.unwrap_or(1.0))
    } else {
        (
            member.mom.as_deref().unwrap_or_default(),
            member.mom_length.unwrap_or(1.0),
        )
    }
}

fn lookup_parent(
    pedigree: &Pedigree,
    name: &str,
    role: &str,
    member: &Member,
) -> Result<NodeIndex> {
    pedigree
        .position_of(name)
        .map(NodeIndex::new)
        .ok_or_else(|| {
            PedigreeError::invalid(format!("the {role} of '{}' is unknown", member.name))
        })
}

fn germ_edge(length: f64) -> EdgeData {
    EdgeData {
        length,
        kind: EdgeKind::GERM,
    }
}

// ---------------------------------------------------------------------------
// Somatic attachment
// ---------------------------------------------------------------------------

/// Graft one somatic lineage tree below the germline vertex `root`.
///
/// Somatic vertices inherit the member's sex and ploidy: the sex-linked
/// pruners inspect the sex of every vertex with descendants, and chain
/// bypass compares ploidies across the germline/somatic boundary.
fn attach_somatic_tree(
    graph: &mut PedigreeGraph,
    root: NodeIndex,
    text: &str,
    normalize: bool,
) -> Result<()> {
    let mut tree = newick::parse(text)?;
    if normalize {
        tree.normalize_depth();
    }
    let sex = graph[root].sex;
    let ploidy = graph[root].ploidy;
    graft(graph, root, &tree.root, sex, ploidy);
    Ok(())
}

fn graft(graph: &mut PedigreeGraph, parent: NodeIndex, node: &SomaticNode, sex: Sex, ploidy: u8) {
    let v = graph.add_node(VertexData {
        label: node.label.clone(),
        sex,
        ploidy,
        kind: VertexType::Somatic,
    });
    graph.add_edge(
        parent,
        v,
        EdgeData {
            length: node.length,
            kind: EdgeKind::SOMA,
        },
    );
    for child in &node.children {
        graft(graph, v, child, sex, ploidy);
    }
}

/// Retype somatic vertices whose label names a sequenced sample, and mark
/// their in-edges with the library bit.
fn retype_known_samples(graph: &mut PedigreeGraph, known_samples: &[String]) {
    let known: HashSet<&str> = known_samples.iter().map(String::as_str).collect();
    let vertices: Vec<NodeIndex> = graph.node_indices().collect();
    for v in vertices {
        if graph[v].kind != VertexType::Somatic || !known.contains(graph[v].label.as_str()) {
            continue;
        }
        graph[v].kind = VertexType::Sample;
        let in_edges: Vec<_> = graph
            .edges_directed(v, Direction::Incoming)
            .map(|e| e.id())
            .collect();
        for edge in in_edges {
            graph[edge].kind |= EdgeKind::LIBRARY;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use kindred_core::pedigree::Member;

    fn node_by_label<'g>(graph: &'g PedigreeGraph, label: &str) -> NodeIndex {
        graph
            .node_indices()
            .find(|&v| graph[v].label == label)
            .unwrap_or_else(|| panic!("no vertex labeled {label}"))
    }

    fn trio() -> Pedigree {
        Pedigree::from_members([
            Member::new("dad", Sex::Male),
            Member::new("mom", Sex::Female),
            Member::new("child", Sex::Unknown)
                .with_dad("dad", None)
                .with_mom("mom", None),
        ])
        .unwrap()
    }

    #[test]
    fn one_vertex_per_member_in_order() {
        let graph = build_pedigree_graph(&trio(), &[], false).unwrap();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph[NodeIndex::new(0)].label, "dad");
        assert_eq!(graph[NodeIndex::new(1)].label, "mom");
        assert_eq!(graph[NodeIndex::new(2)].label, "child");
        assert!(graph
            .node_weights()
            .all(|v| v.kind == VertexType::Germline && v.ploidy == 2));
    }

    #[test]
    fn diploid_child_gets_one_edge_per_parent() {
        let graph = build_pedigree_graph(&trio(), &[], false).unwrap();
        let dad = node_by_label(&graph, "dad");
        let mom = node_by_label(&graph, "mom");
        let child = node_by_label(&graph, "child");

        assert_eq!(graph.edge_count(), 2);
        assert!(graph.contains_edge(dad, child));
        assert!(graph.contains_edge(mom, child));
        assert!(graph.edge_weights().all(|e| e.kind == EdgeKind::GERM));
        assert!(graph.edge_weights().all(|e| (e.length - 1.0).abs() < f64::EPSILON));
    }

    #[test]
    fn recorded_lengths_override_default() {
        let ped = Pedigree::from_members([
            Member::new("dad", Sex::Male),
            Member::new("mom", Sex::Female),
            Member::new("child", Sex::Unknown)
                .with_dad("dad", Some(0.4))
                .with_mom("mom", Some(0.6)),
        ])
        .unwrap();
        let graph = build_pedigree_graph(&ped, &[], false).unwrap();
        let mut lengths: Vec<f64> = graph.edge_weights().map(|e| e.length).collect();
        lengths.sort_by(f64::total_cmp);
        assert_relative_eq!(lengths[0], 0.4);
        assert_relative_eq!(lengths[1], 0.6);
    }

    #[test]
    fn founder_tag_skips_parentage() {
        let ped = Pedigree::from_members([
            Member::new("dad", Sex::Male),
            Member::new("mom", Sex::Female),
            Member::new("child", Sex::Unknown)
                .with_dad("dad", None)
                .with_mom("mom", None)
                .tagged("founder"),
        ])
        .unwrap();
        let graph = build_pedigree_graph(&ped, &[], false).unwrap();
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn clone_inherits_sex_and_ploidy() {
        let ped = Pedigree::from_members([
            Member::new("a", Sex::Male),
            Member::new("b", Sex::Unknown).tagged("clone").with_dad("a", None),
        ])
        .unwrap();
        let graph = build_pedigree_graph(&ped, &[], false).unwrap();
        let b = node_by_label(&graph, "b");
        assert_eq!(graph[b].sex, Sex::Male);
        assert_eq!(graph[b].ploidy, 2);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn clone_of_haploid_parent_is_haploid() {
        let ped = Pedigree::from_members([
            Member::new("a", Sex::Female).tagged("haploid"),
            Member::new("b", Sex::Unknown).tagged("clone").with_mom("a", None),
        ])
        .unwrap();
        let graph = build_pedigree_graph(&ped, &[], false).unwrap();
        let b = node_by_label(&graph, "b");
        assert_eq!(graph[b].ploidy, 1);
        assert_eq!(graph[b].sex, Sex::Female);
    }

    #[test]
    fn clone_with_two_parents_is_an_error() {
        let ped = Pedigree::from_members([
            Member::new("a", Sex::Male),
            Member::new("m", Sex::Female),
            Member::new("b", Sex::Unknown)
                .tagged("clone")
                .with_dad("a", None)
                .with_mom("m", None),
        ])
        .unwrap();
        let err = build_pedigree_graph(&ped, &[], false).unwrap_err();
        assert!(err.to_string().contains("two parents"), "err: {err}");
    }

    #[test]
    fn clone_with_unknown_parent_is_an_error() {
        let ped = Pedigree::from_members([
            Member::new("b", Sex::Unknown).tagged("clone").with_dad("ghost", None),
        ])
        .unwrap();
        let err = build_pedigree_graph(&ped, &[], false).unwrap_err();
        assert!(err.to_string().contains("clone parent"), "err: {err}");
    }

    #[test]
    fn gamete_with_two_parents_is_an_error() {
        let ped = Pedigree::from_members([
            Member::new("a", Sex::Male),
            Member::new("m", Sex::Female),
            Member::new("g", Sex::Unknown)
                .tagged("gamete")
                .with_dad("a", None)
                .with_mom("m", None),
        ])
        .unwrap();
        let err = build_pedigree_graph(&ped, &[], false).unwrap_err();
        assert!(err.to_string().contains("gamete"), "err: {err}");
    }

    #[test]
    fn gamete_father_must_not_be_female() {
        let ped = Pedigree::from_members([
            Member::new("a", Sex::Female),
            Member::new("g", Sex::Unknown).tagged("gamete").with_dad("a", None),
        ])
        .unwrap();
        let err = build_pedigree_graph(&ped, &[], false).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("father") && text.contains("female"), "err: {text}");
    }

    #[test]
    fn gamete_mother_must_not_be_male() {
        let ped = Pedigree::from_members([
            Member::new("a", Sex::Male),
            Member::new("g", Sex::Unknown).tagged("gamete").with_mom("a", None),
        ])
        .unwrap();
        let err = build_pedigree_graph(&ped, &[], false).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("mother") && text.contains("male"), "err: {text}");
    }

    #[test]
    fn diploid_missing_mother_is_an_error() {
        let ped = Pedigree::from_members([
            Member::new("dad", Sex::Male),
            Member::new("child", Sex::Unknown).with_dad("dad", None),
        ])
        .unwrap();
        let err = build_pedigree_graph(&ped, &[], false).unwrap_err();
        assert!(err.to_string().contains("mother"), "err: {err}");
        assert!(err.to_string().contains("unspecified"), "err: {err}");
    }

    #[test]
    fn diploid_mother_declared_male_is_an_error() {
        let ped = Pedigree::from_members([
            Member::new("dad", Sex::Male),
            Member::new("mom", Sex::Male),
            Member::new("child", Sex::Unknown)
                .with_dad("dad", None)
                .with_mom("mom", None),
        ])
        .unwrap();
        let err = build_pedigree_graph(&ped, &[], false).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("mother") && text.contains("male"), "err: {text}");
    }

    #[test]
    fn diploid_unknown_father_is_an_error() {
        let ped = Pedigree::from_members([
            Member::new("mom", Sex::Female),
            Member::new("child", Sex::Unknown)
                .with_dad("ghost", None)
                .with_mom("mom", None),
        ])
        .unwrap();
        let err = build_pedigree_graph(&ped, &[], false).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("father") && text.contains("unknown"), "err: {text}");
    }

    #[test]
    fn somatic_tree_grafts_below_member() {
        let ped = Pedigree::from_members([
            Member::new("a", Sex::Male).with_sample("(t1:0.1,t2:0.2)t0:0.3;"),
        ])
        .unwrap();
        let graph = build_pedigree_graph(&ped, &[], false).unwrap();
        assert_eq!(graph.node_count(), 4);

        let a = node_by_label(&graph, "a");
        let t0 = node_by_label(&graph, "t0");
        let t1 = node_by_label(&graph, "t1");
        assert_eq!(graph[t0].kind, VertexType::Somatic);
        assert_eq!(graph[t0].sex, Sex::Male);
        assert_eq!(graph[t0].ploidy, 2);
        assert!(graph.contains_edge(a, t0));
        assert!(graph.contains_edge(t0, t1));

        let edge = graph.edges_directed(t0, Direction::Incoming).next().unwrap();
        assert_eq!(edge.weight().kind, EdgeKind::SOMA);
        assert_relative_eq!(edge.weight().length, 0.3);
    }

    #[test]
    fn known_samples_are_retyped_with_library_edges() {
        let ped = Pedigree::from_members([
            Member::new("a", Sex::Male).with_sample("(t1:0.1,t2:0.2)t0:0.3;"),
        ])
        .unwrap();
        let graph =
            build_pedigree_graph(&ped, &["t1".to_string()], false).unwrap();

        let t1 = node_by_label(&graph, "t1");
        let t2 = node_by_label(&graph, "t2");
        assert_eq!(graph[t1].kind, VertexType::Sample);
        assert_eq!(graph[t2].kind, VertexType::Somatic);

        let edge = graph.edges_directed(t1, Direction::Incoming).next().unwrap();
        assert!(edge.weight().kind.contains(EdgeKind::LIBRARY));
        assert!(edge.weight().kind.contains(EdgeKind::SOMA));
    }

    #[test]
    fn bad_somatic_data_names_the_member() {
        let ped = Pedigree::from_members([
            Member::new("a", Sex::Male).with_sample("(t1,t2"),
        ])
        .unwrap();
        let err = build_pedigree_graph(&ped, &[], false).unwrap_err();
        let text = err.to_string();
        assert!(
            text.contains("somatic data") && text.contains("'a'"),
            "err: {text}"
        );
    }

    #[test]
    fn normalized_somatic_tree_has_unit_depth() {
        let ped = Pedigree::from_members([
            Member::new("a", Sex::Male).with_sample("(t1:2.0,t2:6.0)t0:2.0;"),
        ])
        .unwrap();
        let graph = build_pedigree_graph(&ped, &[], true).unwrap();

        let t0 = node_by_label(&graph, "t0");
        let t2 = node_by_label(&graph, "t2");
        let root_edge = graph.edges_directed(t0, Direction::Incoming).next().unwrap();
        let deep_edge = graph.edges_directed(t2, Direction::Incoming).next().unwrap();
        assert_relative_eq!(root_edge.weight().length, 0.25);
        assert_relative_eq!(deep_edge.weight().length, 0.75);
    }

    #[test]
    fn ancestral_cycle_is_an_error() {
        // b's parent is c, c's parent is b: members exist, so name lookup
        // succeeds, and only the DAG check can reject it.
        let ped = Pedigree::from_members([
            Member::new("b", Sex::Female).tagged("gamete").with_mom("c", None),
            Member::new("c", Sex::Female).tagged("gamete").with_mom("b", None),
        ])
        .unwrap();
        let err = build_pedigree_graph(&ped, &[], false).unwrap_err();
        assert!(err.to_string().contains("cycle"), "err: {err}");
    }

    #[test]
    fn mutation_rates_scale_by_edge_kind() {
        let ped = Pedigree::from_members([
            Member::new("dad", Sex::Male),
            Member::new("mom", Sex::Female),
            Member::new("child", Sex::Unknown)
                .with_dad("dad", None)
                .with_mom("mom", None)
                .with_sample("t:0.5;"),
        ])
        .unwrap();
        let mut graph = build_pedigree_graph(&ped, &[], false).unwrap();
        apply_mutation_rates(&mut graph, 1e-8, 1e-3);

        for edge in graph.edge_weights() {
            if edge.kind.is_germline() {
                assert_relative_eq!(edge.length, 1e-8);
            } else {
                assert_relative_eq!(edge.length, 0.5e-3);
            }
        }
    }
}
