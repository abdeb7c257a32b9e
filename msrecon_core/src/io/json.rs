//! Module providing JSON IO for models
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::io::gpr_parse::{parse_gpr, GprParseError};
use crate::metabolic_model::gene::Gene;
use crate::metabolic_model::metabolite::Metabolite;
use crate::metabolic_model::model::Model;
use crate::metabolic_model::reaction::{Reaction, ReactionBuilder, ReactionBuilderError};

// region JSON Model
/// Represents a JSON serialized model, used for reading and writing models
/// in the workspace's typed-object convention
#[derive(Serialize, Deserialize)]
struct JsonModel {
    id: String,
    name: Option<String>,
    metabolites: Vec<JsonMetabolite>,
    reactions: Vec<JsonReaction>,
    genes: Vec<JsonGene>,
    compartments: Option<IndexMap<String, String>>,
    genome_ref: Option<String>,
    template_ref: Option<String>,
    core_template_ref: Option<String>,
    source: Option<String>,
    source_id: Option<String>,
    #[serde(rename = "type")]
    model_type: Option<String>,
    #[serde(default)]
    attributes: IndexMap<String, String>,
}

#[derive(Serialize, Deserialize)]
struct JsonMetabolite {
    id: String,
    name: Option<String>,
    compartment: Option<String>,
    charge: Option<i32>,
    formula: Option<String>,
    notes: Option<Value>,
    annotation: Option<Value>,
}

#[derive(Serialize, Deserialize)]
struct JsonReaction {
    id: String,
    name: Option<String>,
    metabolites: IndexMap<String, f64>,
    lower_bound: f64,
    upper_bound: f64,
    gene_reaction_rule: String,
    objective_coefficient: Option<f64>,
    subsystem: Option<String>,
    notes: Option<Value>,
    annotation: Option<Value>,
    probability: Option<f64>,
}

#[derive(Serialize, Deserialize)]
struct JsonGene {
    id: String,
    name: Option<String>,
    notes: Option<Value>,
    annotation: Option<Value>,
}
// endregion JSON Model

// region Conversions
impl From<JsonGene> for Gene {
    fn from(g: JsonGene) -> Self {
        /* Notes and annotations stay as JSON strings; the data is loosely
        structured and only needs to survive a round trip. */
        Self {
            id: g.id,
            name: g.name,
            notes: g.notes.map(|v| v.to_string()),
            annotation: g.annotation.map(|v| v.to_string()),
        }
    }
}

impl From<JsonMetabolite> for Metabolite {
    fn from(m: JsonMetabolite) -> Self {
        Self {
            id: m.id,
            name: m.name,
            compartment: m.compartment,
            charge: m.charge.unwrap_or_default(),
            formula: m.formula,
            notes: m.notes.map(|v| v.to_string()),
            annotation: m.annotation.map(|v| v.to_string()),
        }
    }
}

impl From<Gene> for JsonGene {
    fn from(g: Gene) -> Self {
        Self {
            id: g.id,
            name: g.name,
            notes: g
                .notes
                .map(|n| serde_json::from_str(&n).unwrap_or(Value::String(n))),
            annotation: g
                .annotation
                .map(|a| serde_json::from_str(&a).unwrap_or(Value::String(a))),
        }
    }
}

impl From<Metabolite> for JsonMetabolite {
    fn from(m: Metabolite) -> Self {
        Self {
            id: m.id,
            name: m.name,
            compartment: m.compartment,
            charge: Some(m.charge),
            formula: m.formula,
            notes: m
                .notes
                .map(|n| serde_json::from_str(&n).unwrap_or(Value::String(n))),
            annotation: m
                .annotation
                .map(|a| serde_json::from_str(&a).unwrap_or(Value::String(a))),
        }
    }
}
// endregion Conversions

impl Model {
    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Model, JsonError> {
        let model_str = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) => return Err(JsonError::UnableToRead(format!("{:?}", err))),
        };
        let json_model = match serde_json::from_str::<JsonModel>(&model_str) {
            Ok(model) => model,
            Err(err) => return Err(JsonError::UnableToParse(format!("{:?}", err))),
        };
        Model::from_json(json_model)
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<(), JsonError> {
        let json_model = self.to_json();
        let model_string = serde_json::to_string_pretty(&json_model)?;
        fs::write(path, model_string)?;
        Ok(())
    }

    /// Serialize the model into its workspace document form
    pub fn to_document(&self) -> Result<Value, JsonError> {
        Ok(serde_json::to_value(self.to_json())?)
    }

    /// Deserialize a model from its workspace document form
    pub fn from_document(document: Value) -> Result<Model, JsonError> {
        let json_model = serde_json::from_value::<JsonModel>(document)
            .map_err(|err| JsonError::UnableToParse(format!("{:?}", err)))?;
        Model::from_json(json_model)
    }

    fn from_json(json_model: JsonModel) -> Result<Self, JsonError> {
        let mut model = Model::new(json_model.id, json_model.name);
        json_model.genes.into_iter().for_each(|g| {
            model.add_gene(Gene::from(g));
        });
        json_model.metabolites.into_iter().for_each(|m| {
            model.add_metabolite(Metabolite::from(m));
        });
        /* Now, iterate through the reactions, parsing GPRs, and adding to
        the objective along the way */
        for rxn in json_model.reactions {
            let gpr = if !rxn.gene_reaction_rule.is_empty() {
                Some(parse_gpr(&rxn.gene_reaction_rule)?)
            } else {
                None
            };
            let new_reaction = ReactionBuilder::default()
                .id(rxn.id.clone())
                .metabolites(rxn.metabolites)
                .name(rxn.name)
                .gpr(gpr)
                .lower_bound(rxn.lower_bound)
                .upper_bound(rxn.upper_bound)
                .subsystem(rxn.subsystem)
                .notes(rxn.notes.map(|v| v.to_string()))
                .annotation(rxn.annotation.map(|v| v.to_string()))
                .probability(rxn.probability)
                .build()?;
            model.add_reaction(new_reaction);
            if let Some(coef) = rxn.objective_coefficient {
                model.objective.insert(rxn.id, coef);
            }
        }
        model.compartments = json_model.compartments.unwrap_or_default();
        model.genome_ref = json_model.genome_ref;
        model.template_ref = json_model.template_ref;
        model.core_template_ref = json_model.core_template_ref;
        model.source = json_model.source;
        model.source_id = json_model.source_id;
        model.model_type = json_model.model_type;
        model.attributes = json_model.attributes;
        Ok(model)
    }

    fn to_json(&self) -> JsonModel {
        let json_genes: Vec<JsonGene> = self.genes.values().map(|g| g.clone().into()).collect();
        let json_metabolites: Vec<JsonMetabolite> = self
            .metabolites
            .values()
            .map(|m| m.clone().into())
            .collect();
        let mut json_reactions: Vec<JsonReaction> = Vec::new();
        for r in self.reactions.values() {
            json_reactions.push(JsonReaction {
                id: r.id.clone(),
                name: r.name.clone(),
                metabolites: r.metabolites.clone(),
                lower_bound: r.lower_bound,
                upper_bound: r.upper_bound,
                gene_reaction_rule: r
                    .gpr
                    .clone()
                    .map(|rule| rule.to_string_id())
                    .unwrap_or_default(),
                objective_coefficient: self.objective.get(&r.id).copied(),
                subsystem: r.subsystem.clone(),
                notes: r
                    .notes
                    .clone()
                    .map(|n| serde_json::from_str(&n).unwrap_or(Value::String(n))),
                annotation: r
                    .annotation
                    .clone()
                    .map(|a| serde_json::from_str(&a).unwrap_or(Value::String(a))),
                probability: r.probability,
            });
        }
        JsonModel {
            id: self.id.clone(),
            name: self.name.clone(),
            metabolites: json_metabolites,
            reactions: json_reactions,
            genes: json_genes,
            compartments: if self.compartments.is_empty() {
                None
            } else {
                Some(self.compartments.clone())
            },
            genome_ref: self.genome_ref.clone(),
            template_ref: self.template_ref.clone(),
            core_template_ref: self.core_template_ref.clone(),
            source: self.source.clone(),
            source_id: self.source_id.clone(),
            model_type: self.model_type.clone(),
            attributes: self.attributes.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum JsonError {
    #[error("unable to read model file: {0}")]
    UnableToRead(String),
    #[error("unable to parse model file: {0}")]
    UnableToParse(String),
    #[error("unable to parse gene reaction rule: {0}")]
    GprParse(#[from] GprParseError),
    #[error("invalid reaction entry: {0}")]
    InvalidReaction(#[from] ReactionBuilderError),
    #[error("serialization failure: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("unable to write model file: {0}")]
    UnableToWrite(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metabolic_model::model::Gpr;
    use indexmap::IndexMap;

    fn small_model() -> Model {
        let mut model = Model::new("test_model", Some("Test organism".to_string()));
        model.add_metabolite(Metabolite {
            id: "cpd00027_c0".to_string(),
            name: Some("D-Glucose".to_string()),
            compartment: Some("c".to_string()),
            charge: 0,
            formula: Some("C6H12O6".to_string()),
            notes: None,
            annotation: None,
        });
        model.add_metabolite(Metabolite {
            id: "cpd00079_c0".to_string(),
            name: None,
            compartment: Some("c".to_string()),
            charge: -2,
            formula: None,
            notes: None,
            annotation: None,
        });
        let mut mets = IndexMap::new();
        mets.insert("cpd00027_c0".to_string(), -1.0);
        mets.insert("cpd00079_c0".to_string(), 1.0);
        model.add_reaction(
            ReactionBuilder::default()
                .id("rxn00216_c0".to_string())
                .metabolites(mets)
                .gpr(Some(Gpr::new_and(
                    Gpr::new_gene_node("peg.1"),
                    Gpr::new_gene_node("peg.2"),
                )))
                .build()
                .unwrap(),
        );
        model.set_objective("rxn00216_c0");
        model.genome_ref = Some("/test/genomes/test_genome||".to_string());
        model
    }

    #[test]
    fn file_round_trip_preserves_identifier_sets() {
        let model = small_model();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        model.write_json(&path).unwrap();
        let reloaded = Model::read_json(&path).unwrap();

        let reactions: Vec<&String> = reloaded.reactions.keys().collect();
        let metabolites: Vec<&String> = reloaded.metabolites.keys().collect();
        assert_eq!(reactions, model.reactions.keys().collect::<Vec<_>>());
        assert_eq!(metabolites, model.metabolites.keys().collect::<Vec<_>>());
        assert_eq!(reloaded.genome_ref, model.genome_ref);
        assert_eq!(reloaded.objective.get("rxn00216_c0"), Some(&1.0));
    }

    #[test]
    fn gpr_survives_round_trip() {
        let model = small_model();
        let document = model.to_document().unwrap();
        let reloaded = Model::from_document(document).unwrap();
        let gpr = reloaded.reactions["rxn00216_c0"].gpr.as_ref().unwrap();
        assert_eq!(gpr.genes(), vec!["peg.1", "peg.2"]);
        assert!(reloaded.genes.contains_key("peg.1"));
    }
}
