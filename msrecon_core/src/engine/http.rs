//! Adapter delegating flux-balance analysis and gapfilling to a remote
//! modeling service.
use serde::Serialize;
use serde_json::Value;

use crate::engine::{
    EngineError, FluxAnalyzer, FluxSolution, GapfillEngine, GapfillSolution, GapfillSpec,
};
use crate::metabolic_model::media::Media;
use crate::metabolic_model::model::Model;
use crate::metabolic_model::template::Template;

/// Flux/gapfill engine backed by a modeling service exposing `/fba` and
/// `/gapfill` endpoints. The model travels as its workspace document; the
/// service's JSON reply deserializes straight into the solution types.
pub struct HttpFluxEngine {
    url: String,
    client: reqwest::blocking::Client,
}

#[derive(Serialize)]
struct FbaRequest<'a> {
    model: Value,
    media: &'a Media,
    objective: &'a str,
}

#[derive(Serialize)]
struct GapfillRequest<'a> {
    model: Value,
    template: &'a Template,
    media: &'a Media,
    #[serde(flatten)]
    spec: &'a GapfillSpec,
}

impl HttpFluxEngine {
    pub fn new(url: impl Into<String>) -> HttpFluxEngine {
        HttpFluxEngine {
            url: url.into(),
            client: reqwest::blocking::Client::new(),
        }
    }

    fn post<T: Serialize, R: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        request: &T,
    ) -> Result<R, EngineError> {
        let url = format!("{}/{}", self.url.trim_end_matches('/'), endpoint);
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .map_err(|err| EngineError::Service(err.to_string()))?;
        if !response.status().is_success() {
            return Err(EngineError::Service(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }
        response
            .json()
            .map_err(|err| EngineError::Service(err.to_string()))
    }
}

impl FluxAnalyzer for HttpFluxEngine {
    fn maximize(
        &self,
        model: &Model,
        media: &Media,
        objective: &str,
    ) -> Result<FluxSolution, EngineError> {
        let request = FbaRequest {
            model: model.to_document().map_err(|err| {
                EngineError::Service(format!("unable to serialize model: {}", err))
            })?,
            media,
            objective,
        };
        self.post("fba", &request)
    }
}

impl GapfillEngine for HttpFluxEngine {
    fn gapfill(
        &self,
        model: &Model,
        template: &Template,
        media: &Media,
        spec: &GapfillSpec,
    ) -> Result<GapfillSolution, EngineError> {
        let request = GapfillRequest {
            model: model.to_document().map_err(|err| {
                EngineError::Service(format!("unable to serialize model: {}", err))
            })?,
            template,
            media,
            spec,
        };
        self.post("gapfill", &request)
    }
}
