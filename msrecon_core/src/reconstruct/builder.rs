//! Draft model construction: instantiate a genome-scale template against a
//! genome's annotated roles.
use indexmap::IndexMap;
use tracing::{debug, info};

use crate::configuration::CONFIGURATION;
use crate::metabolic_model::genome::Genome;
use crate::metabolic_model::metabolite::{Metabolite, MetaboliteBuilder};
use crate::metabolic_model::model::{Gpr, Model};
use crate::metabolic_model::reaction::ReactionBuilder;
use crate::metabolic_model::template::{Template, TemplateReaction};
use crate::reconstruct::ReconError;

/// The annotation ontology draft construction reads roles from
const BUILD_ONTOLOGY: &str = "RAST";

/// Build a draft model from a genome and a genome-scale template.
///
/// A template reaction enters the draft when at least one of its complexes
/// is fully covered by the genome's normalized roles; its GPR ORs the
/// per-complex AND groups of contributing features. The template biomass
/// becomes the objective reaction.
pub fn build_draft(
    genome: &Genome,
    template: &Template,
    model_id: &str,
    model_name: &str,
) -> Result<Model, ReconError> {
    let mut model = Model::new(model_id, Some(model_name.to_string()));
    model.compartments = template.compartments.clone();

    let role_index = genome.role_index(BUILD_ONTOLOGY);
    let mut included = 0usize;
    for reaction in template.reactions.values() {
        let Some(gpr) = reaction_gpr(reaction, &role_index) else {
            continue;
        };
        add_template_reaction(&mut model, template, reaction, Some(gpr))?;
        included += 1;
    }
    debug!(
        reactions = included,
        genome = genome.id.as_str(),
        "template reactions matched by annotation"
    );

    add_biomass(&mut model, template)?;
    info!(
        model = model_id,
        reactions = model.reactions.len(),
        genes = model.genes.len(),
        "draft model built"
    );
    Ok(model)
}

/// GPR for a template reaction against the genome's role index, None when
/// no complex is fully covered
fn reaction_gpr(
    reaction: &TemplateReaction,
    role_index: &IndexMap<String, Vec<String>>,
) -> Option<Gpr> {
    let mut complex_nodes = Vec::new();
    'complexes: for complex in &reaction.complexes {
        if complex.is_empty() {
            continue;
        }
        let mut role_nodes = Vec::with_capacity(complex.len());
        for role in complex {
            // Every role of the complex must be annotated in the genome
            let Some(features) = role_index.get(role) else {
                continue 'complexes;
            };
            role_nodes.push(
                Gpr::or_genes(features.iter().map(String::as_str))
                    .expect("role index entries are never empty"),
            );
        }
        complex_nodes.push(Gpr::and_combine(role_nodes).expect("complex is non-empty"));
    }
    Gpr::or_combine(complex_nodes)
}

/// Instantiate a template reaction (and any missing metabolites) into the
/// model
pub fn add_template_reaction(
    model: &mut Model,
    template: &Template,
    reaction: &TemplateReaction,
    gpr: Option<Gpr>,
) -> Result<(), ReconError> {
    for compound_id in reaction.stoichiometry.keys() {
        ensure_metabolite(model, template, compound_id);
    }
    let (lower, upper) = {
        let config = CONFIGURATION.read().unwrap();
        reaction
            .direction
            .bounds(config.lower_bound, config.upper_bound)
    };
    let new_reaction = ReactionBuilder::default()
        .id(reaction.id.clone())
        .name(reaction.name.clone())
        .metabolites(reaction.stoichiometry.clone())
        .gpr(gpr)
        .lower_bound(lower)
        .upper_bound(upper)
        .build()
        .map_err(|err| ReconError::Build(err.to_string()))?;
    model.add_reaction(new_reaction);
    Ok(())
}

fn ensure_metabolite(model: &mut Model, template: &Template, compound_id: &str) {
    if model.metabolites.contains_key(compound_id) {
        return;
    }
    let metabolite = match template.compounds.get(compound_id) {
        Some(compound) => MetaboliteBuilder::default()
            .id(compound.id.clone())
            .name(compound.name.clone())
            .compartment(Some(compound.compartment.clone()))
            .charge(compound.charge)
            .formula(compound.formula.clone())
            .build()
            .expect("template compound carries an id"),
        None => Metabolite::from_compartmentalized_id(compound_id),
    };
    model.add_metabolite(metabolite);
}

/// Add the template's biomass as the objective reaction
fn add_biomass(model: &mut Model, template: &Template) -> Result<(), ReconError> {
    let Some(biomass) = template.biomasses.first() else {
        return Err(ReconError::Build(format!(
            "template {} defines no biomass composition",
            template.id
        )));
    };
    for compound_id in biomass.composition.keys() {
        ensure_metabolite(model, template, compound_id);
    }
    let biomass_id = CONFIGURATION.read().unwrap().biomass_reaction.clone();
    let upper = CONFIGURATION.read().unwrap().upper_bound;
    let reaction = ReactionBuilder::default()
        .id(biomass_id.clone())
        .name(biomass.name.clone().or(Some("Biomass".to_string())))
        .metabolites(biomass.composition.clone())
        .lower_bound(0.0)
        .upper_bound(upper)
        .build()
        .map_err(|err| ReconError::Build(err.to_string()))?;
    model.add_reaction(reaction);
    model.set_objective(&biomass_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metabolic_model::genome::Feature;
    use crate::metabolic_model::reaction::Direction;
    use crate::metabolic_model::template::{TemplateBiomass, TemplateCompound};

    fn test_template() -> Template {
        Template {
            id: "TestTemplate".to_string(),
            name: None,
            compartments: [("c".to_string(), "Cytosol".to_string())]
                .into_iter()
                .collect(),
            compounds: [(
                "cpd00027_c0".to_string(),
                TemplateCompound {
                    id: "cpd00027_c0".to_string(),
                    name: Some("D-Glucose".to_string()),
                    compartment: "c".to_string(),
                    charge: 0,
                    formula: None,
                },
            )]
            .into_iter()
            .collect(),
            reactions: [
                (
                    "rxn00148_c0".to_string(),
                    TemplateReaction {
                        id: "rxn00148_c0".to_string(),
                        name: None,
                        direction: Direction::Forward,
                        stoichiometry: [("cpd00027_c0".to_string(), -1.0)].into_iter().collect(),
                        complexes: vec![vec!["hexokinase".to_string()]],
                        base_cost: 1.0,
                    },
                ),
                (
                    "rxn09999_c0".to_string(),
                    TemplateReaction {
                        id: "rxn09999_c0".to_string(),
                        name: None,
                        direction: Direction::Both,
                        stoichiometry: [("cpd00027_c0".to_string(), 1.0)].into_iter().collect(),
                        complexes: vec![vec![
                            "hexokinase".to_string(),
                            "unannotatedrole".to_string(),
                        ]],
                        base_cost: 1.0,
                    },
                ),
            ]
            .into_iter()
            .collect(),
            biomasses: vec![TemplateBiomass {
                id: "bio1".to_string(),
                name: None,
                composition: [("cpd00027_c0".to_string(), -1.0)].into_iter().collect(),
            }],
        }
    }

    fn test_genome() -> Genome {
        let mut feature = Feature::new("peg.1");
        feature.add_ontology_term("RAST", "hexokinase");
        let mut feature2 = Feature::new("peg.2");
        feature2.add_ontology_term("RAST", "hexokinase");
        Genome {
            id: "g".to_string(),
            scientific_name: "Test organism".to_string(),
            features: vec![feature, feature2],
        }
    }

    #[test]
    fn covered_complexes_enter_the_draft() {
        let model = build_draft(&test_genome(), &test_template(), "draft", "Test organism")
            .unwrap();
        // rxn00148 is fully covered, rxn09999 is missing a role
        assert!(model.reactions.contains_key("rxn00148_c0"));
        assert!(!model.reactions.contains_key("rxn09999_c0"));
        let gpr = model.reactions["rxn00148_c0"].gpr.as_ref().unwrap();
        assert_eq!(format!("{}", gpr), "(peg.1 or peg.2)");
        assert!(model.genes.contains_key("peg.1"));
    }

    #[test]
    fn biomass_becomes_the_objective() {
        let model = build_draft(&test_genome(), &test_template(), "draft", "Test organism")
            .unwrap();
        assert!(model.reactions.contains_key("bio1"));
        assert_eq!(model.objective.get("bio1"), Some(&1.0));
        let bio = &model.reactions["bio1"];
        assert_eq!(bio.lower_bound, 0.0);
    }

    #[test]
    fn directionality_comes_from_the_template() {
        let model = build_draft(&test_genome(), &test_template(), "draft", "Test organism")
            .unwrap();
        let rxn = &model.reactions["rxn00148_c0"];
        assert_eq!(rxn.lower_bound, 0.0);
        assert!(rxn.upper_bound > 0.0);
    }
}
