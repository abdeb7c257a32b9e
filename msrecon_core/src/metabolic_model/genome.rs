//! This module provides the Genome struct and annotation-role handling
use std::sync::LazyLock;

use indexmap::{IndexMap, IndexSet};
use regex::Regex;
use serde::Deserialize;

/// An annotated genome: identifier, name, and ontology-tagged features
#[derive(Clone, Debug, Default)]
pub struct Genome {
    /// Used to identify the genome
    pub id: String,
    /// Scientific name of the organism
    pub scientific_name: String,
    /// Annotated features (genes)
    pub features: Vec<Feature>,
}

/// A single genome feature with its ontology terms
#[derive(Clone, Debug)]
pub struct Feature {
    /// Used to identify the feature
    pub id: String,
    /// Translated protein sequence, when the source document carries one
    pub protein_sequence: Option<String>,
    /// Map of ontology name to the normalized terms assigned under it
    pub ontology_terms: IndexMap<String, Vec<String>>,
}

impl Feature {
    pub fn new(id: impl Into<String>) -> Self {
        Feature {
            id: id.into(),
            protein_sequence: None,
            ontology_terms: IndexMap::new(),
        }
    }

    /// Record a term under an ontology, skipping exact duplicates
    pub fn add_ontology_term(&mut self, ontology: &str, term: impl Into<String>) {
        let term = term.into();
        let terms = self.ontology_terms.entry(ontology.to_string()).or_default();
        if !terms.contains(&term) {
            terms.push(term);
        }
    }

    /// All terms recorded under the given ontology
    pub fn terms(&self, ontology: &str) -> &[String] {
        self.ontology_terms
            .get(ontology)
            .map(|t| t.as_slice())
            .unwrap_or(&[])
    }
}

impl Genome {
    /// Build a genome from a raw genome document, splitting each feature's
    /// function string into individual roles and normalizing them under the
    /// RAST ontology
    pub fn from_document(doc: GenomeDocument) -> Genome {
        let mut features = Vec::with_capacity(doc.features.len());
        for gene in doc.features {
            let mut feature = Feature::new(gene.id);
            feature.protein_sequence = gene.protein_translation;
            if let Some(function) = gene.function {
                for func in split_function(&function) {
                    feature.add_ontology_term("RAST", normalize_role(func));
                }
            }
            features.push(feature);
        }
        Genome {
            id: doc.id,
            scientific_name: doc.scientific_name,
            features,
        }
    }

    /// The set of all normalized roles present in the genome, in
    /// first-seen order
    pub fn roles(&self, ontology: &str) -> IndexSet<String> {
        let mut roles = IndexSet::new();
        for feature in &self.features {
            for term in feature.terms(ontology) {
                roles.insert(term.clone());
            }
        }
        roles
    }

    /// Map of normalized role to the features annotated with it
    pub fn role_index(&self, ontology: &str) -> IndexMap<String, Vec<String>> {
        let mut index: IndexMap<String, Vec<String>> = IndexMap::new();
        for feature in &self.features {
            for term in feature.terms(ontology) {
                let entries = index.entry(term.clone()).or_default();
                if !entries.contains(&feature.id) {
                    entries.push(feature.id.clone());
                }
            }
        }
        index
    }
}

/// Raw genome document as fetched from the workspace
#[derive(Clone, Debug, Deserialize)]
pub struct GenomeDocument {
    pub id: String,
    pub scientific_name: String,
    #[serde(default)]
    pub features: Vec<FeatureDocument>,
}

/// Raw feature record within a genome document
#[derive(Clone, Debug, Deserialize)]
pub struct FeatureDocument {
    pub id: String,
    #[serde(default)]
    pub function: Option<String>,
    #[serde(default)]
    pub protein_translation: Option<String>,
}

static EC_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\d\-]+\.[\d\-]+\.[\d\-]+\.[\d\-]+").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#.*$").unwrap());
static FUNCTION_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*;\s+|\s+[@/]\s+").unwrap());

/// Normalize an annotation role for comparison: lowercase, EC numbers and
/// whitespace stripped, trailing `#` comments and `(ec)` markers dropped
pub fn normalize_role(role: &str) -> String {
    let role = role.to_lowercase();
    let role = EC_NUMBER.replace_all(&role, "");
    let role = WHITESPACE.replace_all(&role, "");
    let role = COMMENT.replace_all(&role, "");
    role.replace("(ec)", "")
}

/// Split a feature function string into individual role strings on the
/// `;`, ` @ `, and ` / ` separators
pub fn split_function(function: &str) -> Vec<&str> {
    FUNCTION_SEPARATOR
        .split(function)
        .filter(|part| !part.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_ec_and_whitespace() {
        assert_eq!(
            normalize_role("Alcohol dehydrogenase (EC 1.1.1.1)"),
            "alcoholdehydrogenase"
        );
        assert_eq!(
            normalize_role("Phosphatase # duplicated annotation"),
            "phosphatase"
        );
        assert_eq!(normalize_role("ATP synthase"), "atpsynthase");
    }

    #[test]
    fn split_function_handles_multifunction_strings() {
        let parts = split_function("Role one; Role two @ Role three / Role four");
        assert_eq!(parts, vec!["Role one", "Role two", "Role three", "Role four"]);
    }

    #[test]
    fn from_document_records_rast_terms() {
        let doc = GenomeDocument {
            id: "224308.49".to_string(),
            scientific_name: "Bacillus subtilis".to_string(),
            features: vec![FeatureDocument {
                id: "224308.49.peg.1".to_string(),
                function: Some("DNA polymerase III; Exonuclease".to_string()),
                protein_translation: None,
            }],
        };
        let genome = Genome::from_document(doc);
        assert_eq!(genome.features.len(), 1);
        let terms = genome.features[0].terms("RAST");
        assert_eq!(terms, &["dnapolymeraseiii", "exonuclease"]);
    }

    #[test]
    fn role_index_collects_features_per_role() {
        let mut f1 = Feature::new("peg.1");
        f1.add_ontology_term("RAST", "roleb");
        let mut f2 = Feature::new("peg.2");
        f2.add_ontology_term("RAST", "roleb");
        f2.add_ontology_term("RAST", "rolec");
        let genome = Genome {
            id: "g".to_string(),
            scientific_name: String::new(),
            features: vec![f1, f2],
        };
        let index = genome.role_index("RAST");
        assert_eq!(index["roleb"], vec!["peg.1", "peg.2"]);
        assert_eq!(index["rolec"], vec!["peg.2"]);
    }
}
