//! This module provides a struct for representing reactions
use crate::configuration::CONFIGURATION;
use crate::metabolic_model::model::Gpr;

use derive_builder::Builder;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Represents a reaction in the metabolic model
#[derive(Builder, Debug, Clone)]
pub struct Reaction {
    /// Used to identify the reaction
    pub id: String,
    /// Metabolite stoichiometry of the reaction
    #[builder(default = "IndexMap::new()")]
    pub metabolites: IndexMap<String, f64>,
    /// Human-readable reaction name
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Gene Protein Reaction rule recording which genes support the reaction
    #[builder(default = "None")]
    pub gpr: Option<Gpr>,
    /// Lower flux bound
    #[builder(default = "CONFIGURATION.read().unwrap().lower_bound")]
    pub lower_bound: f64,
    /// Upper flux bound
    #[builder(default = "CONFIGURATION.read().unwrap().upper_bound")]
    pub upper_bound: f64,
    /// Reaction subsystem
    #[builder(default = "None")]
    pub subsystem: Option<String>,
    /// Notes about the reaction
    #[builder(default = "None")]
    pub notes: Option<String>,
    /// Reaction annotations
    #[builder(default = "None")]
    pub annotation: Option<String>,
    /// Maximum annotation probability observed for this reaction, when one
    /// has been assigned by probabilistic annotation or ontology merging
    #[builder(default = "None")]
    pub probability: Option<f64>,
}

impl Reaction {
    /// Whether the reaction can carry flux in both directions
    pub fn is_reversible(&self) -> bool {
        self.lower_bound < 0.0 && self.upper_bound > 0.0
    }

    /// Whether the reaction is an exchange reaction (single-metabolite
    /// boundary reaction or `EX_` prefixed id)
    pub fn is_exchange(&self) -> bool {
        self.id.starts_with("EX_") || self.metabolites.len() == 1
    }

    /// Widen the bounds so the reaction runs in both directions
    pub fn make_reversible(&mut self) {
        let config = CONFIGURATION.read().unwrap();
        if self.lower_bound >= 0.0 {
            self.lower_bound = config.lower_bound;
        }
        if self.upper_bound <= 0.0 {
            self.upper_bound = config.upper_bound;
        }
    }

    /// Set the bounds from a reaction direction
    pub fn set_direction(&mut self, direction: Direction) {
        let config = CONFIGURATION.read().unwrap();
        let (lower, upper) = direction.bounds(config.lower_bound, config.upper_bound);
        self.lower_bound = lower;
        self.upper_bound = upper;
    }
}

/// Directionality of a reaction definition
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum Direction {
    /// Flux runs left to right only
    #[serde(rename = ">")]
    Forward,
    /// Flux runs right to left only
    #[serde(rename = "<")]
    Reverse,
    /// Flux runs in either direction
    #[default]
    #[serde(rename = "=")]
    Both,
}

impl Direction {
    /// Interpret a direction mark as used in gapfilling solutions; anything
    /// other than `>` or `<` is treated as reversible
    pub fn from_mark(mark: &str) -> Direction {
        match mark {
            ">" => Direction::Forward,
            "<" => Direction::Reverse,
            _ => Direction::Both,
        }
    }

    /// Flux bounds implied by the direction, given the configured extremes
    pub fn bounds(&self, lower: f64, upper: f64) -> (f64, f64) {
        match self {
            Direction::Forward => (0.0, upper),
            Direction::Reverse => (lower, 0.0),
            Direction::Both => (lower, upper),
        }
    }
}
