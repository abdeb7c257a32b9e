//! Trait seams for the external computation this crate orchestrates:
//! constraint-based solving, gapfilling, and genome classification.
//!
//! The orchestration code only ever sees these traits; the shipped
//! implementations ([`http::HttpFluxEngine`], [`classifier::RoleSetClassifier`])
//! are thin adapters with no solver or classifier mathematics of their own.
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::metabolic_model::genome::Genome;
use crate::metabolic_model::media::Media;
use crate::metabolic_model::model::Model;
use crate::metabolic_model::template::Template;

pub mod classifier;
pub mod http;

/// A flux distribution returned by the solver
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FluxSolution {
    #[serde(default)]
    pub id: Option<String>,
    pub objective_value: f64,
    #[serde(default)]
    pub fluxes: IndexMap<String, f64>,
}

/// A gapfilling solution for one media
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GapfillSolution {
    pub media_id: String,
    /// Objective value reached after integrating the solution
    pub growth: f64,
    /// Reactions to add, mapped to their direction mark (`>`/`<`/`=`)
    #[serde(default)]
    pub new: IndexMap<String, String>,
    /// Existing reactions to make reversible, mapped to their direction mark
    #[serde(default)]
    pub reversed: IndexMap<String, String>,
}

/// A growth-threshold test constraining ATP-safe gapfilling
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GrowthTest {
    /// Objective reaction the test measures
    pub objective: String,
    /// Media the test runs under
    pub media_id: String,
    /// Whether the threshold is a maximum (true) or a minimum (false)
    pub is_max_threshold: bool,
    /// The threshold value
    pub threshold: f64,
}

/// Everything the gapfilling engine needs beyond model/template/media
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GapfillSpec {
    /// Objective reaction to restore growth through
    pub target: String,
    /// Minimum objective value a solution must reach
    pub minimum_objective: f64,
    /// Reactions the engine must not add
    #[serde(default)]
    pub blacklist: Vec<String>,
    /// Growth-threshold tests a solution must keep satisfied
    #[serde(default)]
    pub tests: Vec<GrowthTest>,
    /// Per-reaction, per-gene scores biasing candidate selection
    #[serde(default)]
    pub reaction_scores: IndexMap<String, IndexMap<String, f64>>,
}

/// Seam to the constraint-based solver's flux-balance analysis
pub trait FluxAnalyzer {
    /// Maximize the given objective reaction under a media and return the
    /// resulting flux distribution
    fn maximize(
        &self,
        model: &Model,
        media: &Media,
        objective: &str,
    ) -> Result<FluxSolution, EngineError>;
}

/// Seam to the external gapfilling solver
pub trait GapfillEngine {
    /// Find reactions to add/reverse so the model grows on the media
    fn gapfill(
        &self,
        model: &Model,
        template: &Template,
        media: &Media,
        spec: &GapfillSpec,
    ) -> Result<GapfillSolution, EngineError>;
}

/// Seam to the trained genome classifier
pub trait GenomeClassifier {
    /// Map a genome to a single-letter class code (e.g. `P`, `N`, `A`, `C`)
    fn classify(&self, genome: &Genome) -> Result<String, EngineError>;
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine service failure: {0}")]
    Service(String),
    #[error("external command failed: {0}")]
    Command(String),
    #[error("unable to load engine artifact {path}: {reason}")]
    Artifact { path: String, reason: String },
    #[error("io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization failure: {0}")]
    Serialize(#[from] serde_json::Error),
}
