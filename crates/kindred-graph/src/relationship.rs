//! The relationship-graph compiler facade.
//!
//! [`RelationshipGraph::construct`] runs the whole pipeline — build, rate
//! scaling, model pruning, simplification, finalization, peeling — and holds
//! the two artifacts downstream inference consumes: the finalized DAG and
//! the [`PeelingPlan`]. Both are immutable after construction.

use std::io;

use petgraph::visit::EdgeRef;
use petgraph::Direction;
use tracing::instrument;

use kindred_core::error::Result;
use kindred_core::inheritance::InheritanceModel;
use kindred_core::pedigree::Pedigree;

use crate::graph::model::{in_degree, PedigreeGraph, VertexType};
use crate::graph::{build, finalize, prune, simplify};
use crate::peel::{self, PeelingPlan};

/// A compiled pedigree: finalized inheritance DAG plus peeling plan.
#[derive(Debug, Clone)]
pub struct RelationshipGraph {
    model: InheritanceModel,
    graph: PedigreeGraph,
    plan: PeelingPlan,
}

impl RelationshipGraph {
    /// Compile `pedigree` under the given inheritance model.
    ///
    /// `known_samples` names the sequenced specimens; `mu_germ` and
    /// `mu_soma` scale germline and somatic edge lengths. With
    /// `normalize_somatic_trees`, somatic trees are depth-normalized before
    /// grafting.
    ///
    /// # Errors
    ///
    /// Returns [`kindred_core::PedigreeError`] on any pedigree violation;
    /// no partially compiled state survives.
    #[instrument(skip(pedigree, known_samples), fields(members = pedigree.len(), model = %model))]
    pub fn construct(
        pedigree: &Pedigree,
        known_samples: &[String],
        model: InheritanceModel,
        mu_germ: f64,
        mu_soma: f64,
        normalize_somatic_trees: bool,
    ) -> Result<Self> {
        let mut graph =
            build::build_pedigree_graph(pedigree, known_samples, normalize_somatic_trees)?;
        build::apply_mutation_rates(&mut graph, mu_germ, mu_soma);
        prune::prune(&mut graph, model)?;
        simplify::simplify(&mut graph)?;
        let graph = finalize::finalize(&graph)?;
        let plan = peel::plan(&graph);
        Ok(Self { model, graph, plan })
    }

    /// The finalized inheritance DAG.
    #[must_use]
    pub fn graph(&self) -> &PedigreeGraph {
        &self.graph
    }

    /// The elimination order and junction tree.
    #[must_use]
    pub fn peeling_plan(&self) -> &PeelingPlan {
        &self.plan
    }

    /// The inheritance model this graph was compiled under.
    #[must_use]
    pub fn inheritance_model(&self) -> InheritanceModel {
        self.model
    }

    /// Write the finalized graph as a YAML 1.2 document.
    ///
    /// Top-level keys in order: `founding`, `germline`, `somatic`, `sample`.
    /// Each vertex lists its sex, ploidy, and (when it has parents) an
    /// `origin` sequence with one record per in-edge.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from `out`.
    pub fn print_graph<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "%YAML 1.2")?;
        writeln!(out, "---")?;

        writeln!(out, "founding:")?;
        for v in self.graph.node_indices() {
            if in_degree(&self.graph, v) == 0 {
                self.print_vertex(out, v)?;
            }
        }

        writeln!(out, "\ngermline:")?;
        self.print_stratum(out, VertexType::Germline)?;

        writeln!(out, "\nsomatic:")?;
        self.print_stratum(out, VertexType::Somatic)?;

        writeln!(out, "\nsample:")?;
        self.print_stratum(out, VertexType::Sample)?;

        Ok(())
    }

    fn print_stratum<W: io::Write>(&self, out: &mut W, kind: VertexType) -> io::Result<()> {
        for v in self.graph.node_indices() {
            if in_degree(&self.graph, v) > 0 && self.graph[v].kind == kind {
                self.print_vertex(out, v)?;
            }
        }
        Ok(())
    }

    fn print_vertex<W: io::Write>(
        &self,
        out: &mut W,
        v: petgraph::graph::NodeIndex,
    ) -> io::Result<()> {
        let data = &self.graph[v];
        writeln!(out, "  {}:", data.label)?;
        writeln!(out, "    sex: {}", data.sex.as_str())?;
        writeln!(out, "    ploidy: {}", data.ploidy)?;

        let mut in_edges = self
            .graph
            .edges_directed(v, Direction::Incoming)
            .peekable();
        if in_edges.peek().is_none() {
            return Ok(());
        }
        writeln!(out, "    origin:")?;
        for edge in in_edges {
            let parent = &self.graph[edge.source()];
            writeln!(out, "      - label:  {}", parent.label)?;
            writeln!(out, "        length: {}", edge.weight().length)?;
            writeln!(out, "        sex:    {}", parent.sex.as_str())?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
