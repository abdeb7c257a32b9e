//! Reader for the tab-separated ATP test media table.
//!
//! Each data row defines one compound of one media:
//! `media_id<TAB>compound_id<TAB>lower<TAB>upper`. Rows sharing a media id
//! are grouped, in file order, into [`Media`] objects. A leading header row
//! starting with `media` is skipped.
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use thiserror::Error;

use crate::metabolic_model::media::Media;

#[derive(Debug, Error)]
pub enum AtpMediaError {
    #[error("unable to read ATP media table {path}: {source}")]
    UnableToRead {
        path: String,
        source: std::io::Error,
    },
    #[error("malformed ATP media row at line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },
}

/// Load the default ATP test media from a TSV table
pub fn read_atp_media<P: AsRef<Path>>(path: P) -> Result<Vec<Media>, AtpMediaError> {
    let path_display = path.as_ref().display().to_string();
    let data = fs::read_to_string(&path).map_err(|source| AtpMediaError::UnableToRead {
        path: path_display,
        source,
    })?;
    parse_atp_media(&data)
}

fn parse_atp_media(data: &str) -> Result<Vec<Media>, AtpMediaError> {
    let mut medias: IndexMap<String, Media> = IndexMap::new();
    for (index, row) in data.lines().enumerate() {
        let line = index + 1;
        if row.trim().is_empty() {
            continue;
        }
        if index == 0 && row.to_lowercase().starts_with("media") {
            continue;
        }
        let fields: Vec<&str> = row.split('\t').collect();
        if fields.len() < 4 {
            return Err(AtpMediaError::MalformedRow {
                line,
                reason: format!("expected 4 tab-separated fields, found {}", fields.len()),
            });
        }
        let lower: f64 = fields[2].parse().map_err(|_| AtpMediaError::MalformedRow {
            line,
            reason: format!("invalid lower bound '{}'", fields[2]),
        })?;
        let upper: f64 = fields[3].parse().map_err(|_| AtpMediaError::MalformedRow {
            line,
            reason: format!("invalid upper bound '{}'", fields[3]),
        })?;
        medias
            .entry(fields[0].to_string())
            .or_insert_with(|| Media::new(fields[0]))
            .add_compound(fields[1], lower, upper);
    }
    Ok(medias.into_values().collect())
}
