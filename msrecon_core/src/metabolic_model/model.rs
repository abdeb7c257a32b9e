//! This module provides the Model struct for representing an entire metabolic model
use std::fmt::{Display, Formatter};

use crate::metabolic_model::gene::Gene;
use crate::metabolic_model::metabolite::Metabolite;
use crate::metabolic_model::reaction::Reaction;

use indexmap::IndexMap;

/// Represents a genome-scale metabolic model
#[derive(Clone, Debug)]
pub struct Model {
    /// Used to identify the model
    pub id: String,
    /// Human-readable model name, usually the organism's scientific name
    pub name: Option<String>,
    /// Map of reaction ids to reaction objects
    pub reactions: IndexMap<String, Reaction>,
    /// Map of gene ids to gene objects
    pub genes: IndexMap<String, Gene>,
    /// Map of metabolite ids to metabolite objects
    pub metabolites: IndexMap<String, Metabolite>,
    /// Map of reaction ids to objective function coefficients
    pub objective: IndexMap<String, f64>,
    /// Compartments in the model, {short name: long name}
    pub compartments: IndexMap<String, String>,
    /// Workspace reference of the genome the model was built from
    pub genome_ref: Option<String>,
    /// Workspace reference of the genome-scale template used to build the model
    pub template_ref: Option<String>,
    /// Workspace reference of the core template used for ATP correction
    pub core_template_ref: Option<String>,
    /// Source tag recorded on save
    pub source: Option<String>,
    /// Source id recorded on save
    pub source_id: Option<String>,
    /// Model type tag recorded on save
    pub model_type: Option<String>,
    /// Free-form attributes, e.g. the classified genome class
    pub attributes: IndexMap<String, String>,
}

impl Model {
    pub fn new(id: impl Into<String>, name: Option<String>) -> Self {
        Model {
            id: id.into(),
            name,
            reactions: IndexMap::new(),
            genes: IndexMap::new(),
            metabolites: IndexMap::new(),
            objective: IndexMap::new(),
            compartments: IndexMap::new(),
            genome_ref: None,
            template_ref: None,
            core_template_ref: None,
            source: None,
            source_id: None,
            model_type: None,
            attributes: IndexMap::new(),
        }
    }

    /// Add a reaction to the model, registering any genes referenced by its
    /// GPR that the model does not hold yet
    pub fn add_reaction(&mut self, reaction: Reaction) {
        if let Some(ref gpr) = reaction.gpr {
            for gene_id in gpr.genes() {
                self.ensure_gene(&gene_id);
            }
        }
        let id = reaction.id.clone();
        self.reactions.insert(id, reaction);
    }

    /// Add a gene to the model
    pub fn add_gene(&mut self, gene: Gene) {
        let id = gene.id.clone();
        self.genes.insert(id, gene);
    }

    /// Add a metabolite to the model
    pub fn add_metabolite(&mut self, metabolite: Metabolite) {
        let id = metabolite.id.clone();
        self.metabolites.insert(id, metabolite);
    }

    /// Register a gene id if it is not already present
    pub fn ensure_gene(&mut self, id: &str) {
        if !self.genes.contains_key(id) {
            self.add_gene(Gene::new(id));
        }
    }

    /// Make the given reaction the sole objective with coefficient 1
    pub fn set_objective(&mut self, reaction_id: &str) {
        self.objective.clear();
        self.objective.insert(reaction_id.to_string(), 1.0);
    }

    /// Number of non-exchange reactions, the count reported per model row
    pub fn nonexchange_reaction_count(&self) -> usize {
        self.reactions.values().filter(|r| !r.is_exchange()).count()
    }
}

// region GPR Functionality
/// Representation of a gene reaction rule as an AND/OR tree over gene ids
#[derive(Clone, Debug, PartialEq)]
pub enum Gpr {
    /// Operation on two subtrees (see [`GprOperation`])
    Operation(GprOperation),
    /// A terminal gene node
    GeneNode(String),
}

/// Possible operations in a gene reaction rule
#[derive(Clone, Debug, PartialEq)]
pub enum GprOperation {
    Or { left: Box<Gpr>, right: Box<Gpr> },
    And { left: Box<Gpr>, right: Box<Gpr> },
}

impl Gpr {
    /// Create a new gene node
    pub fn new_gene_node(gene: &str) -> Gpr {
        Gpr::GeneNode(gene.to_string())
    }

    /// Create a new Or node
    pub fn new_or(left: Gpr, right: Gpr) -> Gpr {
        Gpr::Operation(GprOperation::Or {
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    /// Create a new And node
    pub fn new_and(left: Gpr, right: Gpr) -> Gpr {
        Gpr::Operation(GprOperation::And {
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    /// OR-combine a sequence of subtrees into a single rule; None when the
    /// sequence is empty
    pub fn or_combine(nodes: impl IntoIterator<Item = Gpr>) -> Option<Gpr> {
        nodes.into_iter().reduce(Gpr::new_or)
    }

    /// AND-combine a sequence of subtrees into a single rule; None when the
    /// sequence is empty
    pub fn and_combine(nodes: impl IntoIterator<Item = Gpr>) -> Option<Gpr> {
        nodes.into_iter().reduce(Gpr::new_and)
    }

    /// OR-combine a set of gene ids, the shape produced when merging
    /// alternate-ontology annotations
    pub fn or_genes<'a>(genes: impl IntoIterator<Item = &'a str>) -> Option<Gpr> {
        Gpr::or_combine(genes.into_iter().map(Gpr::new_gene_node))
    }

    /// Collect every gene id appearing in the rule, in rule order
    pub fn genes(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_genes(&mut out);
        out
    }

    fn collect_genes(&self, out: &mut Vec<String>) {
        match self {
            Gpr::Operation(GprOperation::Or { left, right })
            | Gpr::Operation(GprOperation::And { left, right }) => {
                left.collect_genes(out);
                right.collect_genes(out);
            }
            Gpr::GeneNode(gene) => {
                if !out.contains(gene) {
                    out.push(gene.clone());
                }
            }
        }
    }

    /// Generate a GPR string with gene ids from the GPR AST
    pub fn to_string_id(&self) -> String {
        match self {
            Gpr::Operation(op) => match op {
                GprOperation::Or { left, right } => {
                    format!("({} or {})", left.to_string_id(), right.to_string_id())
                }
                GprOperation::And { left, right } => {
                    format!("({} and {})", left.to_string_id(), right.to_string_id())
                }
            },
            Gpr::GeneNode(gene) => gene.clone(),
        }
    }
}

impl Display for Gpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_string_id())
    }
}
// endregion GPR Functionality
