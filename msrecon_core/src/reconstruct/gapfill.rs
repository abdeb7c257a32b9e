//! Gapfilling orchestration: parameter assembly, the sequential multi-media
//! driver, solution integration, and flux post-processing.
use indexmap::IndexMap;
use tracing::{info, warn};

use crate::configuration::CONFIGURATION;
use crate::engine::{
    FluxAnalyzer, FluxSolution, GapfillEngine, GapfillSolution, GapfillSpec, GrowthTest,
};
use crate::metabolic_model::media::Media;
use crate::metabolic_model::model::Model;
use crate::metabolic_model::reaction::Direction;
use crate::metabolic_model::template::Template;
use crate::reconstruct::builder::add_template_reaction;
use crate::reconstruct::ReconError;

/// Assembled result of a multi-media gapfilling run
#[derive(Clone, Debug, Default)]
pub struct GapfillOutcome {
    /// `media:growth` strings, one per processed media
    pub growth: Vec<String>,
    /// Reactions added or reversed across all media, in integration order
    pub cumulative_gapfilling: Vec<String>,
    /// Per-media solutions, keyed by media id
    pub solutions: IndexMap<String, GapfillSolution>,
    /// The first growing media, when any
    pub first_growth_media: Option<String>,
}

/// Multi-media gapfilling driver holding the per-run parameters
pub struct MultiGapfill<'a> {
    pub template: &'a Template,
    pub spec: GapfillSpec,
}

impl<'a> MultiGapfill<'a> {
    pub fn new(template: &'a Template) -> MultiGapfill<'a> {
        let config = CONFIGURATION.read().unwrap();
        MultiGapfill {
            template,
            spec: GapfillSpec {
                target: config.biomass_reaction.clone(),
                minimum_objective: config.minimum_objective,
                blacklist: Vec::new(),
                tests: Vec::new(),
                reaction_scores: IndexMap::new(),
            },
        }
    }

    /// Run the engine once per media, sequentially, integrating each
    /// solution into the model before the next media is attempted
    pub fn run(
        &self,
        model: &mut Model,
        media_list: &[Media],
        engine: &dyn GapfillEngine,
    ) -> Result<GapfillOutcome, ReconError> {
        let mut outcome = GapfillOutcome::default();
        for media in media_list {
            let solution = engine.gapfill(model, self.template, media, &self.spec)?;
            outcome
                .growth
                .push(format!("{}:{}", media.id, solution.growth));
            if solution.growth > 0.0 {
                let integrated = integrate_solution(model, self.template, &solution)?;
                info!(
                    media = media.id.as_str(),
                    added = integrated.len(),
                    growth = solution.growth,
                    "gapfilling solution integrated"
                );
                outcome.cumulative_gapfilling.extend(integrated);
                if outcome.first_growth_media.is_none() {
                    outcome.first_growth_media = Some(media.id.clone());
                }
            } else {
                warn!(media = media.id.as_str(), "no growth after gapfilling");
            }
            outcome.solutions.insert(media.id.clone(), solution);
        }
        Ok(outcome)
    }
}

/// Build growth-threshold tests from a limiting media list: one test per
/// media, sharing the objective, threshold, and max/min sense
pub fn build_limit_tests(
    objective: &str,
    limit_media: &[Media],
    threshold: f64,
    is_max_threshold: bool,
) -> Vec<GrowthTest> {
    limit_media
        .iter()
        .map(|media| GrowthTest {
            objective: objective.to_string(),
            media_id: media.id.clone(),
            is_max_threshold,
            threshold,
        })
        .collect()
}

/// Add an expression-derived probability term to each gene's reaction
/// score. The term is `v / (v + 1)` for expression magnitude `v`, so
/// unexpressed genes contribute nothing and strongly expressed genes
/// approach one.
pub fn apply_expression_weights(
    reaction_scores: &mut IndexMap<String, IndexMap<String, f64>>,
    expression: &IndexMap<String, f64>,
) {
    for gene_scores in reaction_scores.values_mut() {
        for (gene, score) in gene_scores.iter_mut() {
            if let Some(&magnitude) = expression.get(gene) {
                let magnitude = magnitude.max(0.0);
                *score += magnitude / (magnitude + 1.0);
            }
        }
    }
}

/// Integrate a gapfilling solution: new reactions materialize from the
/// template with their gapfilled direction, reversed reactions get widened
/// bounds. Returns the affected reaction ids in integration order.
pub fn integrate_solution(
    model: &mut Model,
    template: &Template,
    solution: &GapfillSolution,
) -> Result<Vec<String>, ReconError> {
    let mut affected = Vec::new();
    for (rxn_id, mark) in &solution.new {
        if model.reactions.contains_key(rxn_id) {
            continue;
        }
        let Some(template_reaction) = template.reactions.get(rxn_id) else {
            return Err(ReconError::UnknownGapfillReaction(rxn_id.clone()));
        };
        add_template_reaction(model, template, template_reaction, None)?;
        let reaction = model
            .reactions
            .get_mut(rxn_id)
            .expect("reaction was just added");
        reaction.set_direction(Direction::from_mark(mark));
        affected.push(rxn_id.clone());
    }
    for rxn_id in solution.reversed.keys() {
        if let Some(reaction) = model.reactions.get_mut(rxn_id) {
            reaction.make_reversible();
            affected.push(rxn_id.clone());
        }
    }
    Ok(affected)
}

/// Overwrite the reported fluxes of gapfilled reactions: a `>` mark pins
/// the flux to the forward extreme, anything else to the reverse extreme
pub fn apply_solution_fluxes(fba: &mut FluxSolution, solution: &GapfillSolution) {
    for marks in [&solution.new, &solution.reversed] {
        for (rxn_id, mark) in marks {
            let flux = if mark == ">" { 1000.0 } else { -1000.0 };
            fba.fluxes.insert(rxn_id.clone(), flux);
        }
    }
}

/// Probe growth of a gapfilled model on a media and return the solution
/// with gapfilled fluxes pinned
pub fn growth_solution(
    model: &Model,
    media: &Media,
    solution: &GapfillSolution,
    flux: &dyn FluxAnalyzer,
    target: &str,
) -> Result<FluxSolution, ReconError> {
    let mut fba = flux.maximize(model, media, target)?;
    apply_solution_fluxes(&mut fba, solution);
    Ok(fba)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineError;
    use crate::metabolic_model::template::{TemplateCompound, TemplateReaction};
    use std::cell::RefCell;

    fn template_with(reactions: &[(&str, Direction)]) -> Template {
        Template {
            id: "t".to_string(),
            name: None,
            compartments: IndexMap::new(),
            compounds: [(
                "cpd00001_c0".to_string(),
                TemplateCompound {
                    id: "cpd00001_c0".to_string(),
                    name: None,
                    compartment: "c".to_string(),
                    charge: 0,
                    formula: None,
                },
            )]
            .into_iter()
            .collect(),
            reactions: reactions
                .iter()
                .map(|(id, direction)| {
                    (
                        id.to_string(),
                        TemplateReaction {
                            id: id.to_string(),
                            name: None,
                            direction: *direction,
                            stoichiometry: [("cpd00001_c0".to_string(), -1.0)]
                                .into_iter()
                                .collect(),
                            complexes: Vec::new(),
                            base_cost: 1.0,
                        },
                    )
                })
                .collect(),
            biomasses: Vec::new(),
        }
    }

    fn solution(new: &[(&str, &str)], reversed: &[(&str, &str)]) -> GapfillSolution {
        GapfillSolution {
            media_id: "Glucose".to_string(),
            growth: 0.5,
            new: new
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            reversed: reversed
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn flux_postprocessing_pins_both_categories() {
        let mut fba = FluxSolution {
            id: None,
            objective_value: 0.5,
            fluxes: IndexMap::new(),
        };
        let solution = solution(
            &[("rxnA", ">"), ("rxnB", "<")],
            &[("rxnC", ">"), ("rxnD", "=")],
        );
        apply_solution_fluxes(&mut fba, &solution);
        assert_eq!(fba.fluxes["rxnA"], 1000.0);
        assert_eq!(fba.fluxes["rxnB"], -1000.0);
        assert_eq!(fba.fluxes["rxnC"], 1000.0);
        assert_eq!(fba.fluxes["rxnD"], -1000.0);
    }

    #[test]
    fn limit_tests_cover_every_media() {
        let medias = vec![Media::new("m1"), Media::new("m2")];
        let tests = build_limit_tests("bio1", &medias, 0.01, false);
        assert_eq!(tests.len(), 2);
        assert_eq!(tests[0].media_id, "m1");
        assert_eq!(tests[1].media_id, "m2");
        assert!(tests.iter().all(|t| t.objective == "bio1"));
        assert!(tests.iter().all(|t| !t.is_max_threshold));
    }

    #[test]
    fn expression_weights_add_bounded_probability_term() {
        let mut scores: IndexMap<String, IndexMap<String, f64>> = IndexMap::new();
        scores.insert(
            "rxnA".to_string(),
            [("peg.1".to_string(), 1.0), ("peg.2".to_string(), 1.0)]
                .into_iter()
                .collect(),
        );
        let expression: IndexMap<String, f64> =
            [("peg.1".to_string(), 3.0)].into_iter().collect();
        apply_expression_weights(&mut scores, &expression);
        assert!((scores["rxnA"]["peg.1"] - 1.75).abs() < 1e-9);
        // No expression data leaves the score untouched
        assert_eq!(scores["rxnA"]["peg.2"], 1.0);
    }

    #[test]
    fn integration_adds_new_and_reverses_existing() {
        let template = template_with(&[("rxnNew", Direction::Forward)]);
        let mut model = Model::new("m", None);
        add_template_reaction(
            &mut model,
            &template,
            &TemplateReaction {
                id: "rxnOld".to_string(),
                name: None,
                direction: Direction::Forward,
                stoichiometry: [("cpd00001_c0".to_string(), 1.0)].into_iter().collect(),
                complexes: Vec::new(),
                base_cost: 1.0,
            },
            None,
        )
        .unwrap();
        let solution = solution(&[("rxnNew", "<")], &[("rxnOld", "<")]);
        let affected = integrate_solution(&mut model, &template, &solution).unwrap();
        assert_eq!(affected, vec!["rxnNew", "rxnOld"]);
        let new_rxn = &model.reactions["rxnNew"];
        assert!(new_rxn.lower_bound < 0.0 && new_rxn.upper_bound == 0.0);
        assert!(model.reactions["rxnOld"].is_reversible());
    }

    #[test]
    fn unknown_solution_reaction_is_an_error() {
        let template = template_with(&[]);
        let mut model = Model::new("m", None);
        let solution = solution(&[("rxnMissing", ">")], &[]);
        assert!(matches!(
            integrate_solution(&mut model, &template, &solution),
            Err(ReconError::UnknownGapfillReaction(id)) if id == "rxnMissing"
        ));
    }

    struct MockEngine {
        calls: RefCell<Vec<String>>,
    }

    impl GapfillEngine for MockEngine {
        fn gapfill(
            &self,
            _model: &Model,
            _template: &Template,
            media: &Media,
            _spec: &GapfillSpec,
        ) -> Result<GapfillSolution, EngineError> {
            self.calls.borrow_mut().push(media.id.clone());
            Ok(GapfillSolution {
                media_id: media.id.clone(),
                growth: if media.id == "dead" { 0.0 } else { 0.3 },
                new: [("rxnNew".to_string(), ">".to_string())]
                    .into_iter()
                    .collect(),
                reversed: IndexMap::new(),
            })
        }
    }

    #[test]
    fn driver_processes_media_sequentially_and_tracks_growth() {
        let template = template_with(&[("rxnNew", Direction::Both)]);
        let mut model = Model::new("m", None);
        let engine = MockEngine {
            calls: RefCell::new(Vec::new()),
        };
        let gapfill = MultiGapfill::new(&template);
        let medias = vec![Media::new("dead"), Media::new("Glucose")];
        let outcome = gapfill.run(&mut model, &medias, &engine).unwrap();
        assert_eq!(*engine.calls.borrow(), vec!["dead", "Glucose"]);
        assert_eq!(outcome.growth, vec!["dead:0", "Glucose:0.3"]);
        assert_eq!(outcome.first_growth_media.as_deref(), Some("Glucose"));
        assert_eq!(outcome.cumulative_gapfilling, vec!["rxnNew"]);
        assert!(model.reactions.contains_key("rxnNew"));
    }
}
