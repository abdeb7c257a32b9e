//! This module provides templates: reusable catalogs of compartments,
//! compounds, and reactions used to instantiate draft genome-scale models.
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::metabolic_model::reaction::Direction;

/// A model template
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Template {
    /// Used to identify the template
    pub id: String,
    /// Human-readable template name
    #[serde(default)]
    pub name: Option<String>,
    /// Compartments defined by the template, {short name: long name}
    #[serde(default)]
    pub compartments: IndexMap<String, String>,
    /// Compartmentalized template compounds keyed by id
    #[serde(default)]
    pub compounds: IndexMap<String, TemplateCompound>,
    /// Template reactions keyed by id
    #[serde(default)]
    pub reactions: IndexMap<String, TemplateReaction>,
    /// Biomass compositions defined by the template
    #[serde(default)]
    pub biomasses: Vec<TemplateBiomass>,
}

/// A compartmentalized compound definition
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TemplateCompound {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub compartment: String,
    #[serde(default)]
    pub charge: i32,
    #[serde(default)]
    pub formula: Option<String>,
}

/// A template reaction definition
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TemplateReaction {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub direction: Direction,
    /// Stoichiometry over template compound ids
    #[serde(default)]
    pub stoichiometry: IndexMap<String, f64>,
    /// Protein complexes able to catalyze the reaction: an OR-list of
    /// AND-lists of normalized role names
    #[serde(default)]
    pub complexes: Vec<Vec<String>>,
    /// Relative cost of adding the reaction during gapfilling
    #[serde(default = "default_base_cost")]
    pub base_cost: f64,
}

fn default_base_cost() -> f64 {
    1.0
}

/// A biomass composition
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TemplateBiomass {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Stoichiometry over template compound ids
    #[serde(default)]
    pub composition: IndexMap<String, f64>,
}

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("unable to read template file {path}: {source}")]
    UnableToRead {
        path: String,
        source: std::io::Error,
    },
    #[error("unable to parse template file {path}: {source}")]
    UnableToParse {
        path: String,
        source: serde_json::Error,
    },
}

impl Template {
    /// Load a template from a JSON file
    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Template, TemplateError> {
        let path_display = path.as_ref().display().to_string();
        let data = fs::read_to_string(&path).map_err(|source| TemplateError::UnableToRead {
            path: path_display.clone(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| TemplateError::UnableToParse {
            path: path_display,
            source,
        })
    }

    /// Overlay a core template onto this genome-scale template: core
    /// compounds are appended when absent, core reactions replace any
    /// same-id reaction and are appended otherwise
    pub fn overlay_core(&mut self, core: &Template) {
        for (id, compound) in &core.compounds {
            if !self.compounds.contains_key(id) {
                self.compounds.insert(id.clone(), compound.clone());
            }
        }
        for (id, reaction) in &core.reactions {
            self.reactions.insert(id.clone(), reaction.clone());
        }
    }

    /// Drop every reaction whose stoichiometry touches a compound with one
    /// of the excluded id prefixes
    pub fn remove_reactions_with_compounds(&mut self, excluded_prefixes: &[String]) {
        self.reactions.retain(|_, reaction| {
            !reaction.stoichiometry.keys().any(|compound| {
                excluded_prefixes
                    .iter()
                    .any(|prefix| compound.starts_with(prefix.as_str()))
            })
        });
    }
}
