//! Probabilistic-annotation driver.
//!
//! Fetches a genome from the workspace, runs the probabilistic annotation
//! pipeline, and stores the resulting rxnprobs object at the target
//! reference. Each phase failure is reported on stderr and terminates the
//! process with a non-zero exit code.
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use msrecon_core::probanno::{run_probanno, save_rxnprobs, CommandWorker};
use msrecon_core::workspace::http::HttpStore;
use msrecon_core::workspace::{Fetcher, ObjectRef};

#[derive(Debug, Parser)]
#[clap(name = "ms-probanno")]
#[clap(about = "Run the probabilistic annotation algorithm for a genome", long_about = None)]
struct Cli {
    /// Reference to the input genome object
    genomeref: String,
    /// Reference where the output rxnprobs object is stored
    rxnprobsref: String,
    /// URL of the workspace service endpoint
    #[clap(long = "ws-url", default_value = "https://p3.theseed.org/services/Workspace")]
    ws_url: String,
    /// Authentication token for the user; the WS_TOKEN environment
    /// variable is used when absent
    #[clap(long)]
    token: Option<String>,
    /// External alignment/scoring executable
    #[clap(long, default_value = "probanno-worker")]
    worker: PathBuf,
    /// Scratch directory root for the worker
    #[clap(long)]
    scratch: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let cli = Cli::parse();
    let token = cli.token.or_else(|| std::env::var("WS_TOKEN").ok());

    let genome_ref = ObjectRef::new(&cli.genomeref);
    let store = HttpStore::new(cli.ws_url, token);
    let mut fetcher = Fetcher::new(&store, "ms-probanno");

    // Get the genome object from the workspace
    let genome = match fetcher.genome(&genome_ref) {
        Ok(genome) => genome,
        Err(err) => {
            eprintln!("Failed to get genome using reference {}: {}", genome_ref, err);
            process::exit(1);
        }
    };

    // Run the probabilistic annotation algorithm; the worker cleans up its
    // scratch space on both paths
    let scratch = cli.scratch.unwrap_or_else(std::env::temp_dir);
    let worker = CommandWorker::new(cli.worker, scratch, &genome.id);
    let probabilities = match run_probanno(&worker, &genome) {
        Ok(probabilities) => probabilities,
        Err(err) => {
            eprintln!("Failed to run probabilistic annotation algorithm: {}", err);
            process::exit(1);
        }
    };

    // Store the rxnprobs object at the target reference
    let rxnprobs_ref = ObjectRef::new(&cli.rxnprobsref);
    if let Err(err) = save_rxnprobs(&store, &rxnprobs_ref, &probabilities) {
        eprintln!(
            "Failed to create rxnprobs object using reference {}: {}",
            rxnprobs_ref, err
        );
        process::exit(1);
    }
}
