//! Genome classification against the classifier's feature artifact.
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::debug;

use crate::engine::{EngineError, GenomeClassifier};
use crate::metabolic_model::genome::Genome;

/// Classifier adapter scoring genomes by overlap with per-class indicator
/// role sets.
///
/// The artifact is the JSON companion of the trained classifier: a map of
/// class code to the indicator roles that vote for it, plus the fallback
/// code reported when no class receives a vote.
pub struct RoleSetClassifier {
    classes: IndexMap<String, Vec<String>>,
    fallback: String,
}

#[derive(Deserialize)]
struct ClassifierArtifact {
    classes: IndexMap<String, Vec<String>>,
    #[serde(default = "default_fallback")]
    fallback: String,
}

fn default_fallback() -> String {
    "--".to_string()
}

impl RoleSetClassifier {
    /// Load the classifier feature artifact from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<RoleSetClassifier, EngineError> {
        let path_display = path.as_ref().display().to_string();
        let raw = fs::read_to_string(&path).map_err(|err| EngineError::Artifact {
            path: path_display.clone(),
            reason: err.to_string(),
        })?;
        let artifact: ClassifierArtifact =
            serde_json::from_str(&raw).map_err(|err| EngineError::Artifact {
                path: path_display,
                reason: err.to_string(),
            })?;
        Ok(RoleSetClassifier {
            classes: artifact.classes,
            fallback: artifact.fallback,
        })
    }

    #[cfg(test)]
    fn from_parts(classes: IndexMap<String, Vec<String>>, fallback: &str) -> RoleSetClassifier {
        RoleSetClassifier {
            classes,
            fallback: fallback.to_string(),
        }
    }
}

impl GenomeClassifier for RoleSetClassifier {
    fn classify(&self, genome: &Genome) -> Result<String, EngineError> {
        let roles = genome.roles("RAST");
        let mut best: Option<(&str, usize)> = None;
        for (code, indicators) in &self.classes {
            let votes = indicators
                .iter()
                .filter(|role| roles.contains(role.as_str()))
                .count();
            debug!(class = code.as_str(), votes, "classifier votes");
            if votes > 0 && best.map(|(_, v)| votes > v).unwrap_or(true) {
                best = Some((code, votes));
            }
        }
        Ok(best
            .map(|(code, _)| code.to_string())
            .unwrap_or_else(|| self.fallback.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metabolic_model::genome::Feature;

    fn genome_with_roles(roles: &[&str]) -> Genome {
        let mut feature = Feature::new("peg.1");
        for role in roles {
            feature.add_ontology_term("RAST", role.to_string());
        }
        Genome {
            id: "g".to_string(),
            scientific_name: String::new(),
            features: vec![feature],
        }
    }

    fn classifier() -> RoleSetClassifier {
        RoleSetClassifier::from_parts(
            [
                (
                    "P".to_string(),
                    vec!["sortasea".to_string(), "teichoicacidsynthase".to_string()],
                ),
                ("N".to_string(), vec!["lipidasynthase".to_string()]),
            ]
            .into_iter()
            .collect(),
            "--",
        )
    }

    #[test]
    fn majority_overlap_wins() {
        let classifier = classifier();
        let genome = genome_with_roles(&["sortasea", "teichoicacidsynthase", "lipidasynthase"]);
        assert_eq!(classifier.classify(&genome).unwrap(), "P");
    }

    #[test]
    fn no_overlap_reports_fallback() {
        let classifier = classifier();
        let genome = genome_with_roles(&["somethingelse"]);
        assert_eq!(classifier.classify(&genome).unwrap(), "--");
    }
}
