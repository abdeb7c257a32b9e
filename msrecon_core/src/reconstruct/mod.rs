//! Reconstruction orchestration: job-parameter handling, template
//! selection, draft construction, ATP correction, gapfilling, and result
//! serialization.
//!
//! Control flow per genome: config → fetch genome/media/template → select
//! template → build draft → ATP-correct → (optional) gapfill → save model,
//! solution, and report row. Each genome runs to completion before the
//! next begins; per-genome classification failures become comments in the
//! result row, not errors.
use std::fs;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use crate::configuration::CONFIGURATION;
use crate::engine::{
    EngineError, FluxAnalyzer, FluxSolution, GapfillEngine, GenomeClassifier, GrowthTest,
};
use crate::io::atp_media::{read_atp_media, AtpMediaError};
use crate::io::json::JsonError;
use crate::metabolic_model::biochemistry::{BiochemistryDb, BiochemistryError};
use crate::metabolic_model::genome::Genome;
use crate::metabolic_model::media::Media;
use crate::metabolic_model::model::Model;
use crate::metabolic_model::template::{Template, TemplateError};
use crate::reconstruct::atp::AtpCorrection;
use crate::reconstruct::classify::{select_template, template_name, TemplateSelection};
use crate::reconstruct::gapfill::{growth_solution, MultiGapfill};
use crate::reconstruct::params::{
    string_param, validate_args, JobConfig, JobInput, ParamError,
};
use crate::reconstruct::report::{ReconRow, ReportError, ResultTable};
use crate::workspace::{Fetcher, ObjectRef, ObjectStore, Provenance, WorkspaceError};

pub mod annotation;
pub mod atp;
pub mod builder;
pub mod classify;
pub mod gapfill;
pub mod params;
pub mod report;

/// Workspace path under which template objects are published
const TEMPLATE_REF_ROOT: &str = "/public/modelsupport/templates";

#[derive(Debug, Error)]
pub enum ReconError {
    #[error(transparent)]
    Param(#[from] ParamError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    AtpMedia(#[from] AtpMediaError),
    #[error(transparent)]
    Biochemistry(#[from] BiochemistryError),
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Json(#[from] JsonError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error("model construction failure: {0}")]
    Build(String),
    #[error("gapfilling solution names reaction {0} which the template does not define")]
    UnknownGapfillReaction(String),
    #[error("unknown template key {0}")]
    UnknownTemplateKey(String),
    #[error("job input is missing the embedded {0} document")]
    MissingInput(String),
    #[error("io failure: {0}")]
    Io(#[from] std::io::Error),
}

/// The reconstruction orchestrator.
///
/// Holds the job configuration, the object store, the engine seams, and
/// the per-run template caches. Caches are overwritten per job run; the
/// orchestrator is strictly single-threaded.
pub struct ModelReconstruction {
    config: JobConfig,
    store: Box<dyn ObjectStore>,
    flux: Box<dyn FluxAnalyzer>,
    gapfiller: Box<dyn GapfillEngine>,
    classifier: Box<dyn GenomeClassifier>,
    core_template: Option<Template>,
    provenance: Provenance,
    result_table: ResultTable,
}

/// Arguments assembled for a gapfilling run, merged from defaults and
/// caller parameters
#[derive(Clone, Debug)]
pub struct GapfillArgs {
    pub media: Media,
    /// ATP-safety tests carried over from correction
    pub atp_tests: Vec<GrowthTest>,
    /// Media whose growth must stay above the minimum objective
    pub limit_media: Vec<Media>,
    /// Expression magnitudes keyed by gene, reweighting reaction scores
    pub expression: Option<IndexMap<String, f64>>,
    /// Per-reaction, per-gene candidate scores
    pub reaction_scores: IndexMap<String, IndexMap<String, f64>>,
    pub target: String,
    pub minimum_objective: f64,
    pub blacklist: Vec<String>,
}

impl GapfillArgs {
    pub fn new(media: Media) -> GapfillArgs {
        let config = CONFIGURATION.read().unwrap();
        GapfillArgs {
            media,
            atp_tests: Vec::new(),
            limit_media: Vec::new(),
            expression: None,
            reaction_scores: IndexMap::new(),
            target: config.biomass_reaction.clone(),
            minimum_objective: config.minimum_objective,
            blacklist: Vec::new(),
        }
    }
}

/// FBA solution document written next to the model
#[derive(Serialize)]
struct FbaDocument<'a> {
    id: &'a str,
    fbamodel_ref: String,
    media_ref: &'a str,
    objective_value: f64,
    fluxes: &'a IndexMap<String, f64>,
}

impl ModelReconstruction {
    pub fn new(
        config: JobConfig,
        store: Box<dyn ObjectStore>,
        flux: Box<dyn FluxAnalyzer>,
        gapfiller: Box<dyn GapfillEngine>,
        classifier: Box<dyn GenomeClassifier>,
    ) -> ModelReconstruction {
        let job_id = config.scheduler.job_id.clone();
        ModelReconstruction {
            config,
            store,
            flux,
            gapfiller,
            classifier,
            core_template: None,
            provenance: Provenance::new(job_id),
            result_table: ResultTable::default(),
        }
    }

    pub fn result_table(&self) -> &ResultTable {
        &self.result_table
    }

    /// Load a template by key (`gp`, `gn`, …) or by its full name, reading
    /// the JSON file under the configured template directory
    fn get_template(&self, key_or_name: &str) -> Result<Template, ReconError> {
        // References may arrive as full workspace paths
        let reference = ObjectRef::new(key_or_name);
        let segment = reference.last_segment();
        let name = template_name(segment).unwrap_or(segment);
        Ok(Template::read_json(self.config.template_path(name))?)
    }

    /// Core template, cached across operations within a run
    fn core_template(&mut self) -> Result<Template, ReconError> {
        if self.core_template.is_none() {
            self.core_template = Some(self.get_template("core")?);
        }
        Ok(self.core_template.clone().expect("cache was just filled"))
    }

    /// Build, correct, and optionally gapfill one genome's model
    pub fn build_metabolic_models(&mut self, job: &JobInput) -> Result<ReconRow, ReconError> {
        let mut params = job.parameters.clone();
        validate_args(
            &mut params,
            &["fbamodel_output_id", "workspace", "genome_id", "genome_workspace"],
            &[
                ("template_id", json!("auto")),
                ("gapfill", json!(1)),
            ],
        )?;
        let output_id = string_param(&params, "fbamodel_output_id")?;
        let workspace = string_param(&params, "workspace")?;
        let template_id = string_param(&params, "template_id")?;

        let mut row = ReconRow::new(&output_id);

        let media = job
            .media
            .clone()
            .ok_or_else(|| ReconError::MissingInput("media".to_string()))?;
        let genome_doc = job
            .genome
            .clone()
            .ok_or_else(|| ReconError::MissingInput("genome".to_string()))?;
        row.genes = Some(genome_doc.features.len());
        let genome = Genome::from_document(genome_doc);
        row.genome = genome.id.clone();

        let core_template = self.core_template()?;

        // Template selection: explicit key, or classifier in auto mode
        let template_key = if template_id != "auto" {
            if template_name(&template_id).is_none() {
                return Err(ReconError::UnknownTemplateKey(template_id));
            }
            template_id
        } else {
            let class_code = self.classifier.classify(&genome)?;
            match select_template(&class_code) {
                TemplateSelection::Selected { class_name, key } => {
                    row.class_name = Some(class_name);
                    key
                }
                TemplateSelection::Skip {
                    class_name,
                    comment,
                } => {
                    // Per-genome failure: record and continue the batch
                    warn!(
                        genome = genome.id.as_str(),
                        class = class_name.as_str(),
                        "skipping genome"
                    );
                    row.class_name = Some(class_name);
                    row.comments.push(comment);
                    self.result_table.push(row.clone());
                    return Ok(row);
                }
            }
        };
        let mut gs_template = self.get_template(&template_key)?;
        gs_template.overlay_core(&core_template);

        // Draft construction
        let mut model = builder::build_draft(
            &genome,
            &gs_template,
            &output_id,
            &genome.scientific_name,
        )?;
        let genome_workspace = string_param(&params, "genome_workspace")?;
        let genome_id = string_param(&params, "genome_id")?;
        model.genome_ref = Some(format!("{}/{}||", genome_workspace, genome_id));
        model.template_ref = Some(format!(
            "{}/{}||",
            TEMPLATE_REF_ROOT,
            template_name(&template_key).expect("key was validated above")
        ));
        model.core_template_ref = Some(format!("{}/Core-V5.2||", TEMPLATE_REF_ROOT));
        if let Some(ref class_name) = row.class_name {
            model
                .attributes
                .insert("class".to_string(), class_name.clone());
        }

        // ATP-consistency correction against the core template
        let atp_media = read_atp_media(self.config.atp_media_path())?;
        let correction = AtpCorrection::new(&core_template, atp_media);
        let atp_report = correction.run(&mut model, self.flux.as_ref(), self.gapfiller.as_ref())?;
        row.core_gapfill = Some(atp_report.cumulative_core_gapfilling.len().to_string());
        let atp_tests = correction.atp_tests(&atp_report);

        let gapfill_requested = params
            .get("gapfill")
            .and_then(|v| v.as_i64())
            .unwrap_or(0)
            == 1;
        if gapfill_requested {
            let mut args = GapfillArgs::new(media);
            args.atp_tests = atp_tests;
            self.run_gapfilling(&mut model, &gs_template, args, &workspace, &mut row)?;
        } else {
            self.save_model(&mut model, &workspace)?;
            let probe = self.flux.as_ref().maximize(
                &model,
                &media,
                &CONFIGURATION.read().unwrap().biomass_reaction,
            )?;
            row.growth = Some(format!("Complete:{}", probe.objective_value));
        }
        row.reactions = Some(model.nonexchange_reaction_count());
        row.model_genes = Some(model.genes.len());
        self.result_table.push(row.clone());
        Ok(row)
    }

    /// Standalone gapfilling entry: fetches the model (and template) the
    /// internal call would have passed along
    pub fn gapfill_metabolic_models(&mut self, job: &JobInput) -> Result<ReconRow, ReconError> {
        let mut params = job.parameters.clone();
        validate_args(
            &mut params,
            &["fbamodel_id", "fbamodel_output_id", "workspace"],
            &[],
        )?;
        let output_id = string_param(&params, "fbamodel_output_id")?;
        let workspace = string_param(&params, "workspace")?;
        let mut row = ReconRow::new(&output_id);

        let media = job
            .media
            .clone()
            .ok_or_else(|| ReconError::MissingInput("media".to_string()))?;

        let model_ref = ObjectRef::new(&string_param(&params, "fbamodel_id")?);
        let mut fetcher = Fetcher::new(self.store.as_ref(), &self.config.scheduler.job_id);
        let mut model = fetcher.model(&model_ref)?;
        self.provenance
            .input_refs
            .extend(fetcher.provenance().input_refs.iter().cloned());
        model.id = output_id.clone();
        row.genome = model.genome_ref.clone().unwrap_or_default();

        // The template comes off the model's own reference
        let template_ref = model
            .template_ref
            .clone()
            .ok_or_else(|| ReconError::MissingInput("template reference".to_string()))?;
        let core_template = self.core_template()?;
        let mut gs_template = self.get_template(&template_ref)?;
        gs_template.overlay_core(&core_template);

        // ATP safety tests are recomputed for a fetched model
        let atp_media = read_atp_media(self.config.atp_media_path())?;
        let correction = AtpCorrection::new(&core_template, atp_media);
        let atp_report = correction.run(&mut model, self.flux.as_ref(), self.gapfiller.as_ref())?;
        row.core_gapfill = Some(atp_report.cumulative_core_gapfilling.len().to_string());

        let mut args = GapfillArgs::new(media);
        args.atp_tests = correction.atp_tests(&atp_report);
        self.run_gapfilling(&mut model, &gs_template, args, &workspace, &mut row)?;
        row.reactions = Some(model.nonexchange_reaction_count());
        row.model_genes = Some(model.genes.len());
        self.result_table.push(row.clone());
        Ok(row)
    }

    /// Merge alternate-ontology annotation events into a stored model's
    /// reaction set and save the extended model
    pub fn extend_model_with_other_ontologies(
        &mut self,
        job: &JobInput,
    ) -> Result<annotation::ExtensionReport, ReconError> {
        let mut params = job.parameters.clone();
        validate_args(
            &mut params,
            &["fbamodel_id", "fbamodel_output_id", "workspace"],
            &[],
        )?;
        let output_id = string_param(&params, "fbamodel_output_id")?;
        let workspace = string_param(&params, "workspace")?;

        let model_ref = ObjectRef::new(&string_param(&params, "fbamodel_id")?);
        let mut fetcher = Fetcher::new(self.store.as_ref(), &self.config.scheduler.job_id);
        let mut model = fetcher.model(&model_ref)?;
        self.provenance
            .input_refs
            .extend(fetcher.provenance().input_refs.iter().cloned());
        model.id = output_id;

        let template_ref = model
            .template_ref
            .clone()
            .ok_or_else(|| ReconError::MissingInput("template reference".to_string()))?;
        let template = self.get_template(&template_ref)?;
        let biochemistry = BiochemistryDb::read_json(self.config.biochemistry_path())?;

        let report = annotation::extend_model_with_other_ontologies(
            &mut model,
            &job.ontology_events,
            &biochemistry,
            &template,
        )?;
        self.save_model(&mut model, &workspace)?;
        Ok(report)
    }

    /// Assemble the gapfilling contract, run the multi-media driver, and
    /// serialize the gapfilled model and its FBA solution
    fn run_gapfilling(
        &mut self,
        model: &mut Model,
        template: &Template,
        args: GapfillArgs,
        workspace: &str,
        row: &mut ReconRow,
    ) -> Result<(), ReconError> {
        let mut gapfill = MultiGapfill::new(template);
        gapfill.spec.target = args.target.clone();
        gapfill.spec.minimum_objective = args.minimum_objective;
        gapfill.spec.blacklist = args.blacklist.clone();
        gapfill.spec.tests = args.atp_tests.clone();
        gapfill.spec.tests.extend(gapfill::build_limit_tests(
            &args.target,
            &args.limit_media,
            args.minimum_objective,
            false,
        ));
        gapfill.spec.reaction_scores = args.reaction_scores.clone();
        if let Some(ref expression) = args.expression {
            gapfill::apply_expression_weights(&mut gapfill.spec.reaction_scores, expression);
        }

        let media = args.media;
        let outcome = gapfill.run(model, std::slice::from_ref(&media), self.gapfiller.as_ref())?;
        row.growth = Some(outcome.growth.join("<br>"));
        row.gs_gapfill = Some(outcome.cumulative_gapfilling.len().to_string());

        self.save_model(model, workspace)?;
        if let Some(ref media_id) = outcome.first_growth_media {
            let solution = &outcome.solutions[media_id];
            let fba = growth_solution(model, &media, solution, self.flux.as_ref(), &args.target)?;
            let fba_id = format!("{}.{}.gf", model.id, media.id);
            self.save_solution_as_fba(&fba, model, &media, &fba_id, workspace)?;
        }
        Ok(())
    }

    /// Serialize the model into the job directory and the object store,
    /// stamping the save envelope fields
    fn save_model(&self, model: &mut Model, workspace: &str) -> Result<(), ReconError> {
        for reaction in model.reactions.values() {
            if reaction.lower_bound == 0.0 && reaction.upper_bound == 0.0 {
                warn!(reaction = reaction.id.as_str(), "zero flux reaction");
            }
        }
        model.source_id = Some(model.id.clone());
        model.source = Some("ModelSEED".to_string());
        model.model_type = Some("GenomeScale".to_string());

        let output_dir = self.config.job_output_dir();
        fs::create_dir_all(&output_dir)?;
        model.write_json(output_dir.join("output.json"))?;

        let reference = ObjectRef::new(&format!("{}/{}", workspace, model.id));
        let mut metadata = IndexMap::new();
        metadata.insert("job_id".to_string(), self.provenance.job_id.clone());
        metadata.insert(
            "input_refs".to_string(),
            self.provenance.input_refs.join(";"),
        );
        self.store
            .save(&reference, "GenomeScale", metadata, &model.to_document()?)?;
        info!(model = model.id.as_str(), "model saved");
        Ok(())
    }

    /// Serialize an FBA solution for the model into the job directory
    fn save_solution_as_fba(
        &self,
        solution: &FluxSolution,
        model: &Model,
        media: &Media,
        fba_id: &str,
        workspace: &str,
    ) -> Result<(), ReconError> {
        let document = FbaDocument {
            id: fba_id,
            fbamodel_ref: format!("{}/{}", workspace, model.id),
            media_ref: &media.id,
            objective_value: solution.objective_value,
            fluxes: &solution.fluxes,
        };
        let output_dir = self.config.job_output_dir();
        fs::create_dir_all(&output_dir)?;
        fs::write(
            output_dir.join("fba.json"),
            serde_json::to_string_pretty(&document).map_err(JsonError::from)?,
        )?;
        info!(fba = fba_id, "FBA solution saved");
        Ok(())
    }

    /// Write the script output document and the batch result table into
    /// the job directory
    pub fn write_job_outputs(&self, row: &ReconRow) -> Result<(), ReconError> {
        let output_dir = self.config.job_output_dir();
        fs::create_dir_all(&output_dir)?;
        report::write_debug_json(
            output_dir.join("script_output.json"),
            &serde_json::to_value(row).map_err(JsonError::from)?,
        )?;
        self.result_table
            .write_tsv(output_dir.join("result_table.tsv"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::GapfillSolution;
    use crate::metabolic_model::genome::{FeatureDocument, GenomeDocument};
    use crate::metabolic_model::template::{
        TemplateBiomass, TemplateCompound, TemplateReaction,
    };
    use crate::reconstruct::params::{DataConfig, SchedulerConfig, ServiceConfig};
    use crate::workspace::file::FileStore;
    use serde_json::Map;
    use std::path::Path;

    struct GrowingFlux;

    impl FluxAnalyzer for GrowingFlux {
        fn maximize(
            &self,
            _model: &Model,
            _media: &Media,
            _objective: &str,
        ) -> Result<FluxSolution, EngineError> {
            Ok(FluxSolution {
                id: None,
                objective_value: 0.42,
                fluxes: IndexMap::new(),
            })
        }
    }

    struct AddOneGapfill;

    impl GapfillEngine for AddOneGapfill {
        fn gapfill(
            &self,
            model: &Model,
            template: &Template,
            media: &Media,
            _spec: &crate::engine::GapfillSpec,
        ) -> Result<GapfillSolution, EngineError> {
            // Offer the first template reaction the model does not hold yet
            let new: IndexMap<String, String> = template
                .reactions
                .keys()
                .find(|id| !model.reactions.contains_key(*id))
                .map(|id| (id.clone(), ">".to_string()))
                .into_iter()
                .collect();
            Ok(GapfillSolution {
                media_id: media.id.clone(),
                growth: 0.2,
                new,
                reversed: IndexMap::new(),
            })
        }
    }

    struct FixedClassifier(&'static str);

    impl GenomeClassifier for FixedClassifier {
        fn classify(&self, _genome: &Genome) -> Result<String, EngineError> {
            Ok(self.0.to_string())
        }
    }

    fn write_template(path: &Path, id: &str, reaction_id: &str) {
        let template = Template {
            id: id.to_string(),
            name: None,
            compartments: [("c".to_string(), "Cytosol".to_string())]
                .into_iter()
                .collect(),
            compounds: [(
                "cpd00027_c0".to_string(),
                TemplateCompound {
                    id: "cpd00027_c0".to_string(),
                    name: None,
                    compartment: "c".to_string(),
                    charge: 0,
                    formula: None,
                },
            )]
            .into_iter()
            .collect(),
            reactions: [(
                reaction_id.to_string(),
                TemplateReaction {
                    id: reaction_id.to_string(),
                    name: None,
                    direction: crate::metabolic_model::reaction::Direction::Both,
                    stoichiometry: [("cpd00027_c0".to_string(), -1.0)].into_iter().collect(),
                    complexes: vec![vec!["hexokinase".to_string()]],
                    base_cost: 1.0,
                },
            )]
            .into_iter()
            .collect(),
            biomasses: vec![TemplateBiomass {
                id: "bio1".to_string(),
                name: None,
                composition: [("cpd00027_c0".to_string(), -1.0)].into_iter().collect(),
            }],
        };
        std::fs::write(path, serde_json::to_string(&template).unwrap()).unwrap();
    }

    fn job_fixture(dir: &Path, template_id: &str, gapfill: i64) -> JobInput {
        let data_dir = dir.join("data");
        let templates = data_dir.join("templates");
        std::fs::create_dir_all(&templates).unwrap();
        write_template(&templates.join("Core-V5.2.json"), "Core-V5.2", "rxnCORE_c0");
        write_template(
            &templates.join("GramPosModelTemplateV6.json"),
            "GramPosModelTemplateV6",
            "rxn00148_c0",
        );
        std::fs::write(
            data_dir.join("atp_medias.tsv"),
            "media\tcompound\tlower\tupper\nGlc.O2\tcpd00027\t-10\t0\n",
        )
        .unwrap();

        let mut parameters = Map::new();
        parameters.insert("fbamodel_output_id".to_string(), json!("test.model"));
        parameters.insert("workspace".to_string(), json!("/test/home/models"));
        parameters.insert("genome_id".to_string(), json!("224308.49"));
        parameters.insert("genome_workspace".to_string(), json!("/test/home/genomes"));
        parameters.insert("template_id".to_string(), json!(template_id));
        parameters.insert("gapfill".to_string(), json!(gapfill));

        JobInput {
            config: JobConfig {
                scheduler: SchedulerConfig {
                    job_directory: dir.join("jobroot"),
                    job_id: "job1".to_string(),
                },
                data: DataConfig {
                    directory: data_dir,
                    biochemistry: None,
                    classifier: None,
                    atp_media: None,
                },
                services: ServiceConfig::default(),
            },
            parameters,
            genome: Some(GenomeDocument {
                id: "224308.49".to_string(),
                scientific_name: "Bacillus subtilis".to_string(),
                features: vec![FeatureDocument {
                    id: "peg.1".to_string(),
                    function: Some("Hexokinase (EC 2.7.1.1)".to_string()),
                    protein_translation: None,
                }],
            }),
            media: Some(Media::new("Carbon-D-Glucose")),
            ontology_events: Vec::new(),
        }
    }

    fn orchestrator(job: &JobInput, class_code: &'static str) -> ModelReconstruction {
        ModelReconstruction::new(
            job.config.clone(),
            Box::new(FileStore::new(job.config.workspace_root())),
            Box::new(GrowingFlux),
            Box::new(AddOneGapfill),
            Box::new(FixedClassifier(class_code)),
        )
    }

    #[test]
    fn auto_mode_builds_and_gapfills() {
        let dir = tempfile::tempdir().unwrap();
        let job = job_fixture(dir.path(), "auto", 1);
        let mut recon = orchestrator(&job, "P");
        let row = recon.build_metabolic_models(&job).unwrap();
        assert_eq!(row.class_name.as_deref(), Some("Gram Positive"));
        assert_eq!(row.genes, Some(1));
        assert!(row.growth.as_deref().unwrap().starts_with("Carbon-D-Glucose:"));
        assert!(row.comments.is_empty());
        // Model and FBA documents landed in the job directory
        let out_dir = job.config.job_output_dir();
        assert!(out_dir.join("output.json").exists());
        assert!(out_dir.join("fba.json").exists());
        let saved = Model::read_json(out_dir.join("output.json")).unwrap();
        assert_eq!(saved.source.as_deref(), Some("ModelSEED"));
        assert_eq!(saved.model_type.as_deref(), Some("GenomeScale"));
    }

    #[test]
    fn cyanobacteria_skip_is_a_comment_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let job = job_fixture(dir.path(), "auto", 1);
        let mut recon = orchestrator(&job, "C");
        let row = recon.build_metabolic_models(&job).unwrap();
        assert_eq!(row.class_name.as_deref(), Some("Cyanobacteria"));
        assert_eq!(row.comments.len(), 1);
        assert_eq!(recon.result_table().rows().len(), 1);
        // Nothing was built or saved
        assert!(!job.config.job_output_dir().join("output.json").exists());
    }

    #[test]
    fn explicit_template_skips_the_classifier() {
        let dir = tempfile::tempdir().unwrap();
        let job = job_fixture(dir.path(), "gp", 0);
        let mut recon = orchestrator(&job, "X");
        let row = recon.build_metabolic_models(&job).unwrap();
        // No classification happened, growth was probed directly
        assert_eq!(row.class_name, None);
        assert_eq!(row.growth.as_deref(), Some("Complete:0.42"));
    }

    #[test]
    fn missing_required_parameter_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let mut job = job_fixture(dir.path(), "auto", 1);
        job.parameters.remove("workspace");
        let mut recon = orchestrator(&job, "P");
        assert!(matches!(
            recon.build_metabolic_models(&job),
            Err(ReconError::Param(ParamError::MissingRequired(name))) if name == "workspace"
        ));
    }
}
