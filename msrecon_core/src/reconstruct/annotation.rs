//! Annotation extension: merge alternate-ontology gene-to-term mappings
//! into an existing model's reaction set.
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::metabolic_model::biochemistry::BiochemistryDb;
use crate::metabolic_model::model::{Gpr, Model};
use crate::metabolic_model::reaction::ReactionBuilder;
use crate::metabolic_model::template::Template;
use crate::reconstruct::builder::add_template_reaction;
use crate::reconstruct::ReconError;

/// One gene-to-term assignment under an alternate ontology
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OntologyEvent {
    /// Ontology the term belongs to (e.g. `EC`, `KO`)
    pub ontology: String,
    pub gene: String,
    pub term: String,
    /// Annotation probability, when the event carries one
    #[serde(default)]
    pub probability: Option<f64>,
}

/// Result of an annotation-extension pass
#[derive(Clone, Debug, Default)]
pub struct ExtensionReport {
    /// Reactions added to the model
    pub added: Vec<String>,
    /// Existing reactions whose probability was raised
    pub updated: Vec<String>,
    /// Terms that resolved to no reaction definition
    pub unresolved: Vec<String>,
}

/// Candidate reaction assembled while grouping events
#[derive(Debug, Default)]
struct Candidate {
    genes: Vec<String>,
    max_probability: Option<f64>,
}

impl Candidate {
    fn absorb(&mut self, event: &OntologyEvent) {
        if !self.genes.contains(&event.gene) {
            self.genes.push(event.gene.clone());
        }
        if let Some(p) = event.probability {
            self.max_probability = Some(match self.max_probability {
                Some(current) => current.max(p),
                None => p,
            });
        }
    }
}

/// Merge alternate-ontology annotations into the model.
///
/// Each event's term resolves through the biochemistry catalog to a
/// reaction id. Reactions already present only have their probability
/// raised; absent reactions are instantiated from the template (preferred)
/// or the biochemistry definition, with a GPR OR-combining the
/// contributing genes and the maximum observed probability.
pub fn extend_model_with_other_ontologies(
    model: &mut Model,
    events: &[OntologyEvent],
    biochemistry: &BiochemistryDb,
    template: &Template,
) -> Result<ExtensionReport, ReconError> {
    let mut report = ExtensionReport::default();

    // term → reaction join, grouping contributing genes per reaction
    let mut candidates: IndexMap<String, Candidate> = IndexMap::new();
    for event in events {
        let Some(reaction) = biochemistry.resolve(&event.ontology, &event.term) else {
            debug!(
                ontology = event.ontology.as_str(),
                term = event.term.as_str(),
                "term resolves to no reaction"
            );
            if !report.unresolved.contains(&event.term) {
                report.unresolved.push(event.term.clone());
            }
            continue;
        };
        candidates
            .entry(reaction.id.clone())
            .or_default()
            .absorb(event);
    }

    for (rxn_id, candidate) in candidates {
        if let Some(existing) = model.reactions.get_mut(&rxn_id) {
            // Present reactions keep their shape; only a higher observed
            // probability is carried forward
            let improved = match (existing.probability, candidate.max_probability) {
                (Some(current), Some(new)) => new > current,
                (None, Some(_)) => true,
                _ => false,
            };
            if improved {
                existing.probability = candidate.max_probability;
                report.updated.push(rxn_id);
            }
            continue;
        }

        let gpr = Gpr::or_genes(candidate.genes.iter().map(String::as_str));
        if let Some(template_reaction) = template.reactions.get(&rxn_id) {
            add_template_reaction(model, template, template_reaction, gpr)?;
        } else {
            let definition = biochemistry
                .reactions
                .get(&rxn_id)
                .expect("candidate ids come from the catalog");
            add_biochem_reaction(model, definition, gpr)?;
        }
        let reaction = model
            .reactions
            .get_mut(&rxn_id)
            .expect("reaction was just added");
        reaction.probability = candidate.max_probability;
        report.added.push(rxn_id);
    }

    info!(
        added = report.added.len(),
        updated = report.updated.len(),
        unresolved = report.unresolved.len(),
        "annotation extension complete"
    );
    Ok(report)
}

fn add_biochem_reaction(
    model: &mut Model,
    definition: &crate::metabolic_model::biochemistry::BiochemReaction,
    gpr: Option<Gpr>,
) -> Result<(), ReconError> {
    use crate::configuration::CONFIGURATION;
    use crate::metabolic_model::metabolite::Metabolite;

    for compound_id in definition.stoichiometry.keys() {
        if !model.metabolites.contains_key(compound_id) {
            model.add_metabolite(Metabolite::from_compartmentalized_id(compound_id));
        }
    }
    let (lower, upper) = {
        let config = CONFIGURATION.read().unwrap();
        definition
            .direction
            .bounds(config.lower_bound, config.upper_bound)
    };
    let reaction = ReactionBuilder::default()
        .id(definition.id.clone())
        .name(definition.name.clone())
        .metabolites(definition.stoichiometry.clone())
        .gpr(gpr)
        .lower_bound(lower)
        .upper_bound(upper)
        .build()
        .map_err(|err| ReconError::Build(err.to_string()))?;
    model.add_reaction(reaction);
    Ok(())
}
