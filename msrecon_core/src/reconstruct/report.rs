//! Per-genome result rows, the batch result table, and debug/report file
//! output.
use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// One row of the batch result table, mirroring the columns reported per
/// genome
#[derive(Clone, Debug, Default, Serialize)]
pub struct ReconRow {
    #[serde(rename = "Model")]
    pub model: String,
    #[serde(rename = "Genome")]
    pub genome: String,
    #[serde(rename = "Genes")]
    pub genes: Option<usize>,
    #[serde(rename = "Class")]
    pub class_name: Option<String>,
    #[serde(rename = "Model genes")]
    pub model_genes: Option<usize>,
    #[serde(rename = "Reactions")]
    pub reactions: Option<usize>,
    #[serde(rename = "Core GF")]
    pub core_gapfill: Option<String>,
    #[serde(rename = "GS GF")]
    pub gs_gapfill: Option<String>,
    #[serde(rename = "Growth")]
    pub growth: Option<String>,
    #[serde(rename = "Comments")]
    pub comments: Vec<String>,
}

impl ReconRow {
    pub fn new(model: impl Into<String>) -> ReconRow {
        ReconRow {
            model: model.into(),
            ..Default::default()
        }
    }
}

/// Accumulates result rows across a batch and writes the tabular report
#[derive(Clone, Debug, Default)]
pub struct ResultTable {
    rows: Vec<ReconRow>,
}

const TABLE_COLUMNS: [&str; 10] = [
    "Model",
    "Genome",
    "Genes",
    "Class",
    "Model genes",
    "Reactions",
    "Core GF",
    "GS GF",
    "Growth",
    "Comments",
];

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("unable to write report file: {0}")]
    Io(#[from] std::io::Error),
    #[error("unable to serialize report data: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ResultTable {
    pub fn push(&mut self, row: ReconRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[ReconRow] {
        &self.rows
    }

    /// Render the row-per-genome TSV report
    pub fn to_tsv(&self) -> String {
        let mut out = String::new();
        out.push_str(&TABLE_COLUMNS.join("\t"));
        out.push('\n');
        for row in &self.rows {
            let fields = [
                row.model.clone(),
                row.genome.clone(),
                optional_count(row.genes),
                optional_text(&row.class_name),
                optional_count(row.model_genes),
                optional_count(row.reactions),
                optional_text(&row.core_gapfill),
                optional_text(&row.gs_gapfill),
                optional_text(&row.growth),
                row.comments.join("; "),
            ];
            out.push_str(&fields.join("\t"));
            out.push('\n');
        }
        out
    }

    pub fn write_tsv<P: AsRef<Path>>(&self, path: P) -> Result<(), ReportError> {
        fs::write(path, self.to_tsv())?;
        Ok(())
    }
}

fn optional_count(value: Option<usize>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "NA".to_string())
}

fn optional_text(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "NA".to_string())
}

/// Write a JSON debug document into the job directory
pub fn write_debug_json<P: AsRef<Path>>(path: P, data: &Value) -> Result<(), ReportError> {
    if let Some(parent) = path.as_ref().parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(data)?)?;
    Ok(())
}
