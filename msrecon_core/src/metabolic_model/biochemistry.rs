//! Biochemistry reaction catalog used to resolve ontology terms to
//! reaction definitions when a template has no entry for them.
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::metabolic_model::reaction::Direction;

/// The biochemistry database: a reaction catalog with per-ontology alias
/// tables, loaded once per job from the configured JSON file
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BiochemistryDb {
    /// Reaction definitions keyed by reaction id
    pub reactions: IndexMap<String, BiochemReaction>,
    /// Reverse alias index built on load, {ontology: {term: reaction id}}
    #[serde(skip)]
    alias_index: IndexMap<String, IndexMap<String, String>>,
}

/// A reaction definition in the biochemistry database
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BiochemReaction {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub direction: Direction,
    /// Stoichiometry over compartmentalized compound ids
    #[serde(default)]
    pub stoichiometry: IndexMap<String, f64>,
    /// Alias terms under which the reaction is known, keyed by ontology
    #[serde(default)]
    pub aliases: IndexMap<String, Vec<String>>,
}

#[derive(Debug, Error)]
pub enum BiochemistryError {
    #[error("unable to read biochemistry file {path}: {source}")]
    UnableToRead {
        path: String,
        source: std::io::Error,
    },
    #[error("unable to parse biochemistry file {path}: {source}")]
    UnableToParse {
        path: String,
        source: serde_json::Error,
    },
}

impl BiochemistryDb {
    /// Build a catalog from an in-memory reaction table
    pub fn from_reactions(reactions: IndexMap<String, BiochemReaction>) -> BiochemistryDb {
        let mut db = BiochemistryDb {
            reactions,
            alias_index: IndexMap::new(),
        };
        db.build_alias_index();
        db
    }

    /// Load the catalog from a JSON file and build the alias index
    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<BiochemistryDb, BiochemistryError> {
        let path_display = path.as_ref().display().to_string();
        let data = fs::read_to_string(&path).map_err(|source| BiochemistryError::UnableToRead {
            path: path_display.clone(),
            source,
        })?;
        let mut db: BiochemistryDb =
            serde_json::from_str(&data).map_err(|source| BiochemistryError::UnableToParse {
                path: path_display,
                source,
            })?;
        db.build_alias_index();
        Ok(db)
    }

    fn build_alias_index(&mut self) {
        self.alias_index.clear();
        for (rxn_id, reaction) in &self.reactions {
            for (ontology, terms) in &reaction.aliases {
                let table = self.alias_index.entry(ontology.clone()).or_default();
                for term in terms {
                    // First writer wins so catalog order stays authoritative
                    table.entry(term.clone()).or_insert_with(|| rxn_id.clone());
                }
            }
        }
    }

    /// Resolve an ontology term to a reaction definition: a direct reaction
    /// id match first, the ontology's alias table otherwise
    pub fn resolve(&self, ontology: &str, term: &str) -> Option<&BiochemReaction> {
        if let Some(reaction) = self.reactions.get(term) {
            return Some(reaction);
        }
        let rxn_id = self.alias_index.get(ontology)?.get(term)?;
        self.reactions.get(rxn_id)
    }
}
