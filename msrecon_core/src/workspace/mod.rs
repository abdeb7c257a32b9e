//! Workspace object plumbing: references, the typed-object envelope, the
//! store trait with file and HTTP backends, and provenance-tagged fetching.
use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::metabolic_model::genome::{Genome, GenomeDocument};
use crate::metabolic_model::media::Media;
use crate::metabolic_model::model::Model;
use crate::metabolic_model::template::Template;

pub mod file;
pub mod http;

/// A workspace object reference.
///
/// Upstream tooling tacks an extraneous `||` delimiter onto the end of
/// references; it is trimmed on construction.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ObjectRef(String);

impl ObjectRef {
    pub fn new(reference: &str) -> ObjectRef {
        ObjectRef(reference.trim().trim_end_matches('|').to_string())
    }

    /// The cleaned reference path
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The last non-empty `/`-separated segment of the reference
    pub fn last_segment(&self) -> &str {
        self.0
            .rsplit('/')
            .find(|segment| !segment.is_empty())
            .unwrap_or(&self.0)
    }
}

impl Display for ObjectRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ObjectRef {
    fn from(reference: &str) -> Self {
        ObjectRef::new(reference)
    }
}

/// Metadata envelope attached to every stored object
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ObjectInfo {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub object_type: String,
    pub path: String,
    #[serde(default)]
    pub metadata: IndexMap<String, String>,
}

impl ObjectInfo {
    /// Synthesize an info record for an object addressed only by reference
    pub fn from_ref(reference: &ObjectRef, object_type: &str) -> ObjectInfo {
        ObjectInfo {
            id: reference.last_segment().to_string(),
            name: None,
            object_type: object_type.to_string(),
            path: reference.as_str().to_string(),
            metadata: IndexMap::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("object not found for reference {0}")]
    NotFound(String),
    #[error("unable to parse object {reference}: {reason}")]
    Parse { reference: String, reason: String },
    #[error("workspace service error: {0}")]
    Service(String),
    #[error("io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization failure: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Storage backend for typed workspace objects
pub trait ObjectStore {
    /// Fetch an object and its metadata by reference
    fn get(&self, reference: &ObjectRef) -> Result<(ObjectInfo, Value), WorkspaceError>;

    /// Store an object at the given reference, overwriting any existing one
    fn save(
        &self,
        reference: &ObjectRef,
        object_type: &str,
        metadata: IndexMap<String, String>,
        data: &Value,
    ) -> Result<ObjectInfo, WorkspaceError>;
}

/// Provenance recorded for a job: which inputs were fetched, and when
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Provenance {
    pub job_id: String,
    pub created: DateTime<Utc>,
    pub input_refs: Vec<String>,
}

impl Provenance {
    pub fn new(job_id: impl Into<String>) -> Provenance {
        Provenance {
            job_id: job_id.into(),
            created: Utc::now(),
            input_refs: Vec::new(),
        }
    }
}

/// Typed object fetcher that records every fetched reference as a
/// job-provenance input
pub struct Fetcher<'a> {
    store: &'a dyn ObjectStore,
    provenance: Provenance,
}

impl<'a> Fetcher<'a> {
    pub fn new(store: &'a dyn ObjectStore, job_id: &str) -> Fetcher<'a> {
        Fetcher {
            store,
            provenance: Provenance::new(job_id),
        }
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    fn fetch(&mut self, reference: &ObjectRef) -> Result<Value, WorkspaceError> {
        let (_, data) = self.store.get(reference)?;
        self.provenance.input_refs.push(reference.to_string());
        Ok(data)
    }

    pub fn genome(&mut self, reference: &ObjectRef) -> Result<Genome, WorkspaceError> {
        let data = self.fetch(reference)?;
        let document: GenomeDocument =
            serde_json::from_value(data).map_err(|err| WorkspaceError::Parse {
                reference: reference.to_string(),
                reason: err.to_string(),
            })?;
        Ok(Genome::from_document(document))
    }

    pub fn media(&mut self, reference: &ObjectRef) -> Result<Media, WorkspaceError> {
        let data = self.fetch(reference)?;
        serde_json::from_value(data).map_err(|err| WorkspaceError::Parse {
            reference: reference.to_string(),
            reason: err.to_string(),
        })
    }

    pub fn template(&mut self, reference: &ObjectRef) -> Result<Template, WorkspaceError> {
        let data = self.fetch(reference)?;
        serde_json::from_value(data).map_err(|err| WorkspaceError::Parse {
            reference: reference.to_string(),
            reason: err.to_string(),
        })
    }

    pub fn model(&mut self, reference: &ObjectRef) -> Result<Model, WorkspaceError> {
        let data = self.fetch(reference)?;
        Model::from_document(data).map_err(|err| WorkspaceError::Parse {
            reference: reference.to_string(),
            reason: err.to_string(),
        })
    }
}
