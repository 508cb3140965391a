//! Inheritance-model pruning.
//!
//! # Overview
//!
//! Each model shares one template: remove the germline edges that violate
//! the model, normalize ploidy, and clear the individuals the model excludes
//! entirely (Y-linked clears females, W-linked clears males). Somatic edges
//! are never model-pruned.
//!
//! The four sex-linked models require a known sex for every individual with
//! descendants; unknown-sex vertices are tolerated only when childless.
//!
//! Paternal inheritance removes edges with a *female* source, the mirror of
//! maternal inheritance.

use petgraph::graph::NodeIndex;
use tracing::{debug, instrument};

use kindred_core::error::{PedigreeError, Result};
use kindred_core::inheritance::InheritanceModel;
use kindred_core::pedigree::Sex;

use crate::graph::model::{
    clear_vertex, out_degree, remove_germline_edges_where, PedigreeGraph,
};

/// Prune `graph` according to the inheritance model.
///
/// # Errors
///
/// For the sex-linked models, returns an error if a vertex of unknown sex
/// has descendants.
#[instrument(skip(graph), fields(model = %model))]
pub fn prune(graph: &mut PedigreeGraph, model: InheritanceModel) -> Result<()> {
    let before = graph.edge_count();
    match model {
        InheritanceModel::Autosomal => {}
        InheritanceModel::YLinked => prune_ylinked(graph)?,
        InheritanceModel::XLinked => prune_xlinked(graph)?,
        InheritanceModel::WLinked => prune_wlinked(graph)?,
        InheritanceModel::ZLinked => prune_zlinked(graph)?,
        InheritanceModel::Maternal => prune_uniparental(graph, Sex::Male),
        InheritanceModel::Paternal => prune_uniparental(graph, Sex::Female),
    }
    debug!(removed = before - graph.edge_count(), "model pruning done");
    Ok(())
}

/// Y chromosome: only male-to-male transmission; females carry nothing.
fn prune_ylinked(graph: &mut PedigreeGraph) -> Result<()> {
    remove_germline_edges_where(graph, |a, b| a == Sex::Female || b == Sex::Female);
    for v in vertices(graph) {
        match graph[v].sex {
            Sex::Female => clear_vertex(graph, v),
            Sex::Male => graph[v].ploidy = 1,
            _ => require_childless(graph, v, "y-linked")?,
        }
    }
    Ok(())
}

/// X chromosome: males are hemizygous and never transmit to sons.
fn prune_xlinked(graph: &mut PedigreeGraph) -> Result<()> {
    remove_germline_edges_where(graph, |a, b| a == Sex::Male && b == Sex::Male);
    for v in vertices(graph) {
        match graph[v].sex {
            Sex::Female => {}
            Sex::Male => graph[v].ploidy = 1,
            _ => require_childless(graph, v, "x-linked")?,
        }
    }
    Ok(())
}

/// W chromosome: only female-to-female transmission; males carry nothing.
fn prune_wlinked(graph: &mut PedigreeGraph) -> Result<()> {
    remove_germline_edges_where(graph, |a, b| a == Sex::Male || b == Sex::Male);
    for v in vertices(graph) {
        match graph[v].sex {
            Sex::Male => clear_vertex(graph, v),
            Sex::Female => graph[v].ploidy = 1,
            _ => require_childless(graph, v, "w-linked")?,
        }
    }
    Ok(())
}

/// Z chromosome: females are hemizygous and never transmit to daughters.
fn prune_zlinked(graph: &mut PedigreeGraph) -> Result<()> {
    remove_germline_edges_where(graph, |a, b| a == Sex::Female && b == Sex::Female);
    for v in vertices(graph) {
        match graph[v].sex {
            Sex::Male => {}
            Sex::Female => graph[v].ploidy = 1,
            _ => require_childless(graph, v, "z-linked")?,
        }
    }
    Ok(())
}

/// Maternal/paternal organelle inheritance: a single transmitting sex and a
/// haploid locus everywhere. `excluded_source` is the sex whose germline
/// out-edges are removed.
fn prune_uniparental(graph: &mut PedigreeGraph, excluded_source: Sex) {
    remove_germline_edges_where(graph, |a, _| a == excluded_source);
    for v in vertices(graph) {
        graph[v].ploidy = 1;
    }
}

fn vertices(graph: &PedigreeGraph) -> Vec<NodeIndex> {
    graph.node_indices().collect()
}

fn require_childless(graph: &PedigreeGraph, v: NodeIndex, model: &str) -> Result<()> {
    if out_degree(graph, v) != 0 {
        return Err(PedigreeError::invalid(format!(
            "{model} inheritance requires every individual to have a known sex"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
