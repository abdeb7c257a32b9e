//! This module provides the Media struct mapping compounds to flux bounds
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A growth media: identifier plus per-compound uptake/excretion bounds
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Media {
    /// Used to identify the media
    pub id: String,
    /// Human-readable media name
    #[serde(default)]
    pub name: Option<String>,
    /// Map of compound ids to their allowed flux bounds
    #[serde(default)]
    pub compounds: IndexMap<String, MediaBound>,
}

/// Flux bounds for a single media compound
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct MediaBound {
    pub lower: f64,
    pub upper: f64,
}

impl Media {
    pub fn new(id: impl Into<String>) -> Media {
        Media {
            id: id.into(),
            name: None,
            compounds: IndexMap::new(),
        }
    }

    /// Allow uptake of a compound with the given bounds
    pub fn add_compound(&mut self, compound: impl Into<String>, lower: f64, upper: f64) {
        self.compounds
            .insert(compound.into(), MediaBound { lower, upper });
    }
}
