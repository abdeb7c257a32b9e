//! This module provides the metabolite struct representing a metabolite

use std::hash::Hash;

use derive_builder::Builder;

/// Represents a metabolite
#[derive(Builder, Debug, Clone)]
pub struct Metabolite {
    /// Used to identify the metabolite (must be unique)
    pub id: String,
    /// Human readable name of the metabolite
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Which compartment the metabolite is in
    #[builder(default = "None")]
    pub compartment: Option<String>,
    /// Electrical charge of the metabolite
    #[builder(default = "0")]
    pub charge: i32,
    /// Chemical formula of the metabolite
    #[builder(default = "None")]
    pub formula: Option<String>,
    /// Notes about the metabolite
    #[builder(default = "None")]
    pub notes: Option<String>,
    /// Metabolite annotations
    #[builder(default = "None")]
    pub annotation: Option<String>,
}

impl Metabolite {
    /// Bare metabolite carrying only an id, with the compartment inferred
    /// from a trailing `_<compartment>` suffix when one is present.
    ///
    /// Used when instantiating a reaction whose compounds have no template
    /// or biochemistry definition.
    pub fn from_compartmentalized_id(id: &str) -> Metabolite {
        let compartment = id
            .rsplit_once('_')
            .map(|(_, cmp)| cmp.trim_end_matches(|c: char| c.is_ascii_digit()).to_string())
            .filter(|cmp| !cmp.is_empty());
        MetaboliteBuilder::default()
            .id(id.to_string())
            .compartment(compartment)
            .build()
            .expect("metabolite id is the only required field")
    }
}

impl Hash for Metabolite {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        if let Some(ref compartment) = self.compartment {
            compartment.hash(state)
        };
    }
}
