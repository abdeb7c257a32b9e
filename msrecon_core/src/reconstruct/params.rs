//! Job-parameter document handling: the config section, required/default
//! validation, and path resolution for job data artifacts.
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::metabolic_model::genome::GenomeDocument;
use crate::metabolic_model::media::Media;
use crate::reconstruct::annotation::OntologyEvent;

/// The job-parameter document handed to `ms-recon`
#[derive(Clone, Debug, Deserialize)]
pub struct JobInput {
    pub config: JobConfig,
    /// Caller-supplied parameters, validated per operation
    #[serde(default)]
    pub parameters: Map<String, Value>,
    /// Genome document embedded in the job
    #[serde(default)]
    pub genome: Option<GenomeDocument>,
    /// Media document embedded in the job
    #[serde(default)]
    pub media: Option<Media>,
    /// Alternate-ontology annotation events embedded in the job
    #[serde(default)]
    pub ontology_events: Vec<OntologyEvent>,
}

/// Scheduler and data-layout configuration for a job
#[derive(Clone, Debug, Deserialize)]
pub struct JobConfig {
    pub scheduler: SchedulerConfig,
    pub data: DataConfig,
    #[serde(default)]
    pub services: ServiceConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SchedulerConfig {
    /// Root of the job tree; per-job output lands under `jobs/<job id>`
    pub job_directory: PathBuf,
    pub job_id: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DataConfig {
    /// Root of the reference data tree (templates, biochemistry, classifier)
    pub directory: PathBuf,
    /// Biochemistry catalog; relative paths resolve against `directory`
    #[serde(default)]
    pub biochemistry: Option<PathBuf>,
    /// Classifier feature artifact
    #[serde(default)]
    pub classifier: Option<PathBuf>,
    /// ATP test media table
    #[serde(default)]
    pub atp_media: Option<PathBuf>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ServiceConfig {
    /// Remote workspace endpoint; absent means the local file store
    #[serde(default)]
    pub workspace_url: Option<String>,
    /// Modeling-service endpoint for FBA and gapfilling
    #[serde(default)]
    pub fba_url: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Error)]
pub enum ParamError {
    #[error("Required argument {0} is missing!")]
    MissingRequired(String),
    #[error("argument {name} has the wrong type: {reason}")]
    WrongType { name: String, reason: String },
}

/// Validate a parameter map: error when a required name is absent, then
/// fill defaults for any missing keys. A key already present is never
/// overwritten.
pub fn validate_args(
    params: &mut Map<String, Value>,
    required: &[&str],
    defaults: &[(&str, Value)],
) -> Result<(), ParamError> {
    for item in required {
        if !params.contains_key(*item) {
            return Err(ParamError::MissingRequired(item.to_string()));
        }
    }
    for (key, value) in defaults {
        if !params.contains_key(*key) {
            params.insert(key.to_string(), value.clone());
        }
    }
    Ok(())
}

/// Fetch a required string parameter after validation
pub fn string_param(params: &Map<String, Value>, name: &str) -> Result<String, ParamError> {
    match params.get(name) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(ParamError::WrongType {
            name: name.to_string(),
            reason: format!("expected a string, found {}", other),
        }),
        None => Err(ParamError::MissingRequired(name.to_string())),
    }
}

impl JobConfig {
    /// Per-job output directory: `<job_directory>/jobs/<job id>`
    pub fn job_output_dir(&self) -> PathBuf {
        self.scheduler
            .job_directory
            .join("jobs")
            .join(&self.scheduler.job_id)
    }

    /// Path of a template JSON file by template name
    pub fn template_path(&self, template_name: &str) -> PathBuf {
        self.data
            .directory
            .join("templates")
            .join(format!("{}.json", template_name))
    }

    /// Workspace-file store root for locally mirrored objects
    pub fn workspace_root(&self) -> PathBuf {
        self.data.directory.join("kbws")
    }

    /// Biochemistry catalog path, defaulting under the data directory
    pub fn biochemistry_path(&self) -> PathBuf {
        self.resolve(
            self.data.biochemistry.as_deref(),
            "biochemistry/reactions.json",
        )
    }

    /// Classifier feature-artifact path, defaulting under the data directory
    pub fn classifier_path(&self) -> PathBuf {
        self.resolve(
            self.data.classifier.as_deref(),
            "classifier/class_features.json",
        )
    }

    /// ATP test media table path, defaulting under the data directory
    pub fn atp_media_path(&self) -> PathBuf {
        self.resolve(self.data.atp_media.as_deref(), "atp_medias.tsv")
    }

    fn resolve(&self, configured: Option<&Path>, default_relative: &str) -> PathBuf {
        match configured {
            Some(path) if path.is_absolute() => path.to_path_buf(),
            Some(path) => self.data.directory.join(path),
            None => self.data.directory.join(default_relative),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn missing_required_fails_regardless_of_other_keys() {
        let mut input = params(&[("present", json!("x")), ("extra", json!(1))]);
        let err = validate_args(&mut input, &["present", "absent"], &[]).unwrap_err();
        assert!(matches!(err, ParamError::MissingRequired(name) if name == "absent"));
    }

    #[test]
    fn all_required_present_passes() {
        let mut input = params(&[("a", json!("x")), ("b", json!(2))]);
        assert!(validate_args(&mut input, &["a", "b"], &[]).is_ok());
    }

    #[test]
    fn defaults_fill_only_absent_keys() {
        let mut input = params(&[("template_id", json!("gp"))]);
        validate_args(
            &mut input,
            &[],
            &[("template_id", json!("auto")), ("gapfill", json!(1))],
        )
        .unwrap();
        // Present key untouched, absent key filled
        assert_eq!(input["template_id"], json!("gp"));
        assert_eq!(input["gapfill"], json!(1));
    }

    #[test]
    fn config_paths_resolve_relative_to_data_directory() {
        let config = JobConfig {
            scheduler: SchedulerConfig {
                job_directory: PathBuf::from("/jobs_root"),
                job_id: "job42".to_string(),
            },
            data: DataConfig {
                directory: PathBuf::from("/data"),
                biochemistry: Some(PathBuf::from("biochem/custom.json")),
                classifier: None,
                atp_media: Some(PathBuf::from("/abs/atp.tsv")),
            },
            services: ServiceConfig::default(),
        };
        assert_eq!(
            config.job_output_dir(),
            PathBuf::from("/jobs_root/jobs/job42")
        );
        assert_eq!(
            config.template_path("Core-V5.2"),
            PathBuf::from("/data/templates/Core-V5.2.json")
        );
        assert_eq!(
            config.biochemistry_path(),
            PathBuf::from("/data/biochem/custom.json")
        );
        assert_eq!(
            config.classifier_path(),
            PathBuf::from("/data/classifier/class_features.json")
        );
        assert_eq!(config.atp_media_path(), PathBuf::from("/abs/atp.tsv"));
    }
}
