//! This module provides the Gene struct for model gene entries
use std::fmt::{Display, Formatter};
use std::hash::Hash;

use derive_builder::Builder;

/// A gene attached to a model, usually mirroring a genome feature id
#[derive(Builder, Clone, Debug, Eq, PartialEq)]
pub struct Gene {
    /// Used to identify the gene
    pub id: String,
    /// Human readable gene name
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Notes about the gene
    #[builder(default = "None")]
    pub notes: Option<String>,
    /// Gene annotations
    #[builder(default = "None")]
    pub annotation: Option<String>,
}

impl Gene {
    pub fn new(id: impl Into<String>) -> Gene {
        GeneBuilder::default()
            .id(id.into())
            .build()
            .expect("gene id is the only required field")
    }
}

impl Display for Gene {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl Hash for Gene {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
