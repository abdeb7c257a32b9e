//! Local filesystem object store: workspace references resolve to JSON
//! files under a root directory.
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::workspace::{ObjectInfo, ObjectRef, ObjectStore, WorkspaceError};

/// Object store backed by a directory of JSON files.
///
/// A reference like `/chenry/public/modelsupport/media/Carbon-D-Glucose`
/// resolves to `<root>/chenry/public/modelsupport/media/Carbon-D-Glucose.json`.
/// Saved files carry the `{info, data}` envelope; bare JSON documents are
/// accepted on read with an info record synthesized from the reference.
pub struct FileStore {
    root: PathBuf,
}

/// On-disk envelope written by [`FileStore::save`]
#[derive(Serialize, Deserialize)]
struct FileEnvelope {
    info: ObjectInfo,
    data: Value,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(root: P) -> FileStore {
        FileStore {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn object_path(&self, reference: &ObjectRef) -> PathBuf {
        let mut path = self.root.clone();
        for segment in reference.as_str().split('/').filter(|s| !s.is_empty()) {
            path.push(segment);
        }
        // set_extension would clobber dotted object names like "Core-V5.2"
        let file_name = format!("{}.json", reference.last_segment());
        path.set_file_name(file_name);
        path
    }
}

impl ObjectStore for FileStore {
    fn get(&self, reference: &ObjectRef) -> Result<(ObjectInfo, Value), WorkspaceError> {
        let path = self.object_path(reference);
        let raw = fs::read_to_string(&path)
            .map_err(|_| WorkspaceError::NotFound(reference.to_string()))?;
        let value: Value = serde_json::from_str(&raw).map_err(|err| WorkspaceError::Parse {
            reference: reference.to_string(),
            reason: err.to_string(),
        })?;
        match serde_json::from_value::<FileEnvelope>(value.clone()) {
            Ok(envelope) => Ok((envelope.info, envelope.data)),
            Err(_) => Ok((ObjectInfo::from_ref(reference, "unspecified"), value)),
        }
    }

    fn save(
        &self,
        reference: &ObjectRef,
        object_type: &str,
        metadata: IndexMap<String, String>,
        data: &Value,
    ) -> Result<ObjectInfo, WorkspaceError> {
        let mut info = ObjectInfo::from_ref(reference, object_type);
        info.metadata = metadata;
        let envelope = FileEnvelope {
            info: info.clone(),
            data: data.clone(),
        };
        let path = self.object_path(reference);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, serde_json::to_string_pretty(&envelope)?)?;
        Ok(info)
    }
}
