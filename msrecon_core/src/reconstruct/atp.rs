//! ATP-consistency correction: probe ATP production on each test media and
//! gapfill against the core template where it is absent, recording how many
//! gapfilling cycles were required.
use tracing::{debug, info};

use crate::configuration::CONFIGURATION;
use crate::engine::{FluxAnalyzer, GapfillEngine, GapfillSpec, GrowthTest};
use crate::metabolic_model::media::Media;
use crate::metabolic_model::model::Model;
use crate::metabolic_model::template::Template;
use crate::reconstruct::gapfill::integrate_solution;
use crate::reconstruct::ReconError;

/// ATP correction run over a core template and a set of ATP test media
pub struct AtpCorrection<'a> {
    core_template: &'a Template,
    media: Vec<Media>,
    target: String,
    threshold: f64,
    max_gapfilling: usize,
}

/// Outcome of an ATP correction run
#[derive(Clone, Debug, Default)]
pub struct AtpReport {
    /// Media on which the model produces ATP after correction
    pub accepted_media: Vec<String>,
    /// ATP production measured per accepted media, used for the test set
    pub thresholds: Vec<(String, f64)>,
    /// Reactions added by core gapfilling, across all cycles
    pub cumulative_core_gapfilling: Vec<String>,
    /// Number of gapfilling cycles that were required
    pub cycles: usize,
}

impl<'a> AtpCorrection<'a> {
    pub fn new(core_template: &'a Template, media: Vec<Media>) -> AtpCorrection<'a> {
        let config = CONFIGURATION.read().unwrap();
        AtpCorrection {
            core_template,
            media,
            target: config.atp_reaction.clone(),
            threshold: config.atp_threshold,
            max_gapfilling: config.max_atp_gapfilling,
        }
    }

    /// Run the correction loop.
    ///
    /// Each test media is probed with the flux analyzer; media without ATP
    /// production trigger a core-template gapfilling cycle, up to the
    /// configured cycle limit. Media that still produce nothing are
    /// dropped rather than failing the run.
    pub fn run(
        &self,
        model: &mut Model,
        flux: &dyn FluxAnalyzer,
        engine: &dyn GapfillEngine,
    ) -> Result<AtpReport, ReconError> {
        let mut report = AtpReport::default();
        for media in &self.media {
            let probe = flux.maximize(model, media, &self.target)?;
            if probe.objective_value >= self.threshold {
                debug!(
                    media = media.id.as_str(),
                    atp = probe.objective_value,
                    "ATP production present"
                );
                report.accepted_media.push(media.id.clone());
                report
                    .thresholds
                    .push((media.id.clone(), probe.objective_value));
                continue;
            }
            if report.cycles >= self.max_gapfilling {
                debug!(
                    media = media.id.as_str(),
                    "gapfilling cycle limit exhausted, dropping media"
                );
                continue;
            }
            let spec = GapfillSpec {
                target: self.target.clone(),
                minimum_objective: self.threshold,
                blacklist: Vec::new(),
                tests: Vec::new(),
                reaction_scores: Default::default(),
            };
            let solution = engine.gapfill(model, self.core_template, media, &spec)?;
            report.cycles += 1;
            if solution.growth >= self.threshold {
                let integrated = integrate_solution(model, self.core_template, &solution)?;
                report.cumulative_core_gapfilling.extend(integrated);
                report.accepted_media.push(media.id.clone());
                report.thresholds.push((media.id.clone(), solution.growth));
            } else {
                debug!(
                    media = media.id.as_str(),
                    "no ATP production even after gapfilling, dropping media"
                );
            }
        }
        info!(
            accepted = report.accepted_media.len(),
            cycles = report.cycles,
            gapfilled = report.cumulative_core_gapfilling.len(),
            "ATP correction complete"
        );
        Ok(report)
    }

    /// ATP-safety tests derived from the correction run: gapfilling must
    /// never push ATP production on an accepted media past what correction
    /// measured
    pub fn atp_tests(&self, report: &AtpReport) -> Vec<GrowthTest> {
        report
            .thresholds
            .iter()
            .map(|(media_id, value)| GrowthTest {
                objective: self.target.clone(),
                media_id: media_id.clone(),
                is_max_threshold: true,
                threshold: *value,
            })
            .collect()
    }
}
