//! Reconstruction driver: reads a JSON job-parameter file, builds and
//! gapfills the genome's model, and writes the result documents into the
//! job directory.
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use msrecon_core::engine::classifier::RoleSetClassifier;
use msrecon_core::engine::http::HttpFluxEngine;
use msrecon_core::reconstruct::params::JobInput;
use msrecon_core::reconstruct::ModelReconstruction;
use msrecon_core::workspace::file::FileStore;
use msrecon_core::workspace::http::HttpStore;
use msrecon_core::workspace::ObjectStore;

#[derive(Debug, Parser)]
#[clap(name = "ms-recon")]
#[clap(about = "Genome-scale metabolic model reconstruction and gapfilling driver", long_about = None)]
struct Cli {
    /// JSON file containing input data
    filename: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let cli = Cli::parse();

    let raw = fs::read_to_string(&cli.filename)
        .with_context(|| format!("unable to read job file {}", cli.filename.display()))?;
    let job: JobInput = serde_json::from_str(&raw)
        .with_context(|| format!("unable to parse job file {}", cli.filename.display()))?;

    let store: Box<dyn ObjectStore> = match job.config.services.workspace_url.clone() {
        Some(url) => Box::new(HttpStore::new(url, job.config.services.token.clone())),
        None => Box::new(FileStore::new(job.config.workspace_root())),
    };
    let fba_url = job
        .config
        .services
        .fba_url
        .clone()
        .context("config.services.fba_url is required")?;
    let classifier = RoleSetClassifier::load(job.config.classifier_path())
        .context("unable to load the classifier feature artifact")?;

    let mut recon = ModelReconstruction::new(
        job.config.clone(),
        store,
        Box::new(HttpFluxEngine::new(fba_url.clone())),
        Box::new(HttpFluxEngine::new(fba_url)),
        Box::new(classifier),
    );
    let row = recon.build_metabolic_models(&job)?;
    recon.write_job_outputs(&row)?;
    info!(
        model = row.model.as_str(),
        genome = row.genome.as_str(),
        "reconstruction complete"
    );
    for comment in &row.comments {
        println!("{}", comment);
    }
    Ok(())
}
