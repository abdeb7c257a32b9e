//! Probabilistic annotation: the staged worker seam, the pipeline runner,
//! and the rxnprobs object written back to the workspace.
//!
//! The worker owns the alignment and scoring machinery; this module only
//! sequences the stages and aggregates their tabular outputs.
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::engine::EngineError;
use crate::metabolic_model::genome::{Feature, Genome};
use crate::workspace::{ObjectRef, ObjectStore, WorkspaceError};

/// Probability that a gene carries an entire roleset (a `///`-joined group
/// of roles assigned together)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RolesetProbability {
    pub gene: String,
    pub roleset: String,
    pub probability: f64,
}

/// Probability that a role is present, per gene or genome-wide
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoleProbability {
    /// Gene the probability belongs to; None once totaled over the genome
    pub gene: Option<String>,
    pub role: String,
    pub probability: f64,
}

/// Probability that a protein complex is present
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ComplexProbability {
    pub complex_id: String,
    pub probability: f64,
}

/// Probability that a reaction is catalyzed, the rxnprobs record
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReactionProbability {
    pub reaction: String,
    pub probability: f64,
    #[serde(default)]
    pub complexes: String,
    #[serde(default)]
    pub gpr: String,
}

/// Staged probabilistic-annotation pipeline, mirroring the worker's stage
/// sequence: fasta → alignment → roleset → role → total → complex →
/// reaction probabilities
pub trait ProbAnnotationWorker {
    fn genome_to_fasta(&self, features: &[Feature]) -> Result<PathBuf, EngineError>;
    fn run_alignment(&self, fasta: &Path) -> Result<PathBuf, EngineError>;
    fn roleset_probabilities(&self, alignment: &Path)
        -> Result<Vec<RolesetProbability>, EngineError>;
    fn role_probabilities(
        &self,
        rolesets: &[RolesetProbability],
    ) -> Result<Vec<RoleProbability>, EngineError>;
    fn total_role_probabilities(
        &self,
        roles: &[RoleProbability],
    ) -> Result<Vec<RoleProbability>, EngineError>;
    fn complex_probabilities(
        &self,
        total_roles: &[RoleProbability],
    ) -> Result<Vec<ComplexProbability>, EngineError>;
    fn reaction_probabilities(
        &self,
        complexes: &[ComplexProbability],
    ) -> Result<Vec<ReactionProbability>, EngineError>;
    fn cleanup(&self) -> Result<(), EngineError>;
}

/// Run the full pipeline for a genome, always cleaning up the worker's
/// scratch space
pub fn run_probanno(
    worker: &dyn ProbAnnotationWorker,
    genome: &Genome,
) -> Result<Vec<ReactionProbability>, EngineError> {
    let result = run_stages(worker, genome);
    // Cleanup happens on both paths; a cleanup failure only surfaces when
    // the pipeline itself succeeded
    match worker.cleanup() {
        Ok(()) => result,
        Err(cleanup_err) => result.and(Err(cleanup_err)),
    }
}

fn run_stages(
    worker: &dyn ProbAnnotationWorker,
    genome: &Genome,
) -> Result<Vec<ReactionProbability>, EngineError> {
    info!(genome = genome.id.as_str(), "running probabilistic annotation");
    let fasta = worker.genome_to_fasta(&genome.features)?;
    let alignment = worker.run_alignment(&fasta)?;
    let rolesets = worker.roleset_probabilities(&alignment)?;
    let roles = worker.role_probabilities(&rolesets)?;
    let totals = worker.total_role_probabilities(&roles)?;
    let complexes = worker.complex_probabilities(&totals)?;
    let reactions = worker.reaction_probabilities(&complexes)?;
    debug!(reactions = reactions.len(), "probabilistic annotation complete");
    Ok(reactions)
}

/// Save a rxnprobs object for the given reference, overwriting any
/// existing object
pub fn save_rxnprobs(
    store: &dyn ObjectStore,
    reference: &ObjectRef,
    probabilities: &[ReactionProbability],
) -> Result<(), WorkspaceError> {
    let rows: Vec<_> = probabilities
        .iter()
        .map(|p| {
            json!([
                p.reaction,
                p.probability,
                p.complexes,
                p.gpr,
            ])
        })
        .collect();
    let data = json!({ "reaction_probabilities": rows });
    store.save(reference, "rxnprobs", IndexMap::new(), &data)?;
    Ok(())
}

/// Worker implementation that delegates alignment and scoring to an
/// external executable.
///
/// The executable is invoked as `<exe> <fasta> <scratch dir>` and is
/// expected to leave `alignment.out`, `rolesets.tsv`, `complexes.tsv`, and
/// `rxnprobs.tsv` in the scratch directory; the probability stages parse
/// those tables.
pub struct CommandWorker {
    executable: PathBuf,
    scratch: PathBuf,
    genome_id: String,
}

impl CommandWorker {
    pub fn new(
        executable: impl Into<PathBuf>,
        scratch_root: impl Into<PathBuf>,
        genome_id: &str,
    ) -> CommandWorker {
        let scratch = scratch_root.into().join(format!("probanno-{}", genome_id));
        CommandWorker {
            executable: executable.into(),
            scratch,
            genome_id: genome_id.to_string(),
        }
    }

    fn scratch_file(&self, name: &str) -> PathBuf {
        self.scratch.join(name)
    }

    fn read_table(&self, name: &str) -> Result<Vec<Vec<String>>, EngineError> {
        let path = self.scratch_file(name);
        let raw = fs::read_to_string(&path).map_err(|err| {
            EngineError::Command(format!("missing worker output {}: {}", path.display(), err))
        })?;
        Ok(raw
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| line.split('\t').map(str::to_string).collect())
            .collect())
    }
}

impl ProbAnnotationWorker for CommandWorker {
    fn genome_to_fasta(&self, features: &[Feature]) -> Result<PathBuf, EngineError> {
        fs::create_dir_all(&self.scratch)?;
        let path = self.scratch_file(&format!("{}.fasta", self.genome_id));
        let mut fasta = String::new();
        for feature in features {
            if let Some(ref sequence) = feature.protein_sequence {
                fasta.push_str(&format!(">{}\n{}\n", feature.id, sequence));
            }
        }
        fs::write(&path, fasta)?;
        Ok(path)
    }

    fn run_alignment(&self, fasta: &Path) -> Result<PathBuf, EngineError> {
        let status = Command::new(&self.executable)
            .arg(fasta)
            .arg(&self.scratch)
            .status()
            .map_err(|err| {
                EngineError::Command(format!(
                    "unable to launch {}: {}",
                    self.executable.display(),
                    err
                ))
            })?;
        if !status.success() {
            return Err(EngineError::Command(format!(
                "{} exited with {}",
                self.executable.display(),
                status
            )));
        }
        Ok(self.scratch_file("alignment.out"))
    }

    fn roleset_probabilities(
        &self,
        _alignment: &Path,
    ) -> Result<Vec<RolesetProbability>, EngineError> {
        let mut out = Vec::new();
        for row in self.read_table("rolesets.tsv")? {
            if row.len() < 3 {
                return Err(EngineError::Command(format!(
                    "malformed rolesets row: {:?}",
                    row
                )));
            }
            out.push(RolesetProbability {
                gene: row[0].clone(),
                roleset: row[1].clone(),
                probability: row[2].parse().map_err(|_| {
                    EngineError::Command(format!("invalid probability '{}'", row[2]))
                })?,
            });
        }
        Ok(out)
    }

    fn role_probabilities(
        &self,
        rolesets: &[RolesetProbability],
    ) -> Result<Vec<RoleProbability>, EngineError> {
        // A roleset's probability is split evenly over its member roles
        let mut out = Vec::new();
        for entry in rolesets {
            let roles: Vec<&str> = entry.roleset.split("///").collect();
            let share = entry.probability / roles.len() as f64;
            for role in roles {
                out.push(RoleProbability {
                    gene: Some(entry.gene.clone()),
                    role: role.to_string(),
                    probability: share,
                });
            }
        }
        Ok(out)
    }

    fn total_role_probabilities(
        &self,
        roles: &[RoleProbability],
    ) -> Result<Vec<RoleProbability>, EngineError> {
        // Genome-wide presence probability: per-gene contributions summed,
        // capped at certainty
        let mut totals: IndexMap<String, f64> = IndexMap::new();
        for entry in roles {
            let total = totals.entry(entry.role.clone()).or_insert(0.0);
            *total = (*total + entry.probability).min(1.0);
        }
        Ok(totals
            .into_iter()
            .map(|(role, probability)| RoleProbability {
                gene: None,
                role,
                probability,
            })
            .collect())
    }

    fn complex_probabilities(
        &self,
        _total_roles: &[RoleProbability],
    ) -> Result<Vec<ComplexProbability>, EngineError> {
        let mut out = Vec::new();
        for row in self.read_table("complexes.tsv")? {
            if row.len() < 2 {
                return Err(EngineError::Command(format!(
                    "malformed complexes row: {:?}",
                    row
                )));
            }
            out.push(ComplexProbability {
                complex_id: row[0].clone(),
                probability: row[1].parse().map_err(|_| {
                    EngineError::Command(format!("invalid probability '{}'", row[1]))
                })?,
            });
        }
        Ok(out)
    }

    fn reaction_probabilities(
        &self,
        _complexes: &[ComplexProbability],
    ) -> Result<Vec<ReactionProbability>, EngineError> {
        let mut out = Vec::new();
        for row in self.read_table("rxnprobs.tsv")? {
            if row.len() < 2 {
                return Err(EngineError::Command(format!(
                    "malformed rxnprobs row: {:?}",
                    row
                )));
            }
            out.push(ReactionProbability {
                reaction: row[0].clone(),
                probability: row[1].parse().map_err(|_| {
                    EngineError::Command(format!("invalid probability '{}'", row[1]))
                })?,
                complexes: row.get(2).cloned().unwrap_or_default(),
                gpr: row.get(3).cloned().unwrap_or_default(),
            });
        }
        Ok(out)
    }

    fn cleanup(&self) -> Result<(), EngineError> {
        if self.scratch.exists() {
            fs::remove_dir_all(&self.scratch)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct MockWorker {
        fail_at_alignment: bool,
        cleaned: RefCell<bool>,
    }

    impl MockWorker {
        fn new(fail_at_alignment: bool) -> MockWorker {
            MockWorker {
                fail_at_alignment,
                cleaned: RefCell::new(false),
            }
        }
    }

    impl ProbAnnotationWorker for MockWorker {
        fn genome_to_fasta(&self, _features: &[Feature]) -> Result<PathBuf, EngineError> {
            Ok(PathBuf::from("genome.fasta"))
        }

        fn run_alignment(&self, _fasta: &Path) -> Result<PathBuf, EngineError> {
            if self.fail_at_alignment {
                return Err(EngineError::Command("alignment failed".to_string()));
            }
            Ok(PathBuf::from("alignment.out"))
        }

        fn roleset_probabilities(
            &self,
            _alignment: &Path,
        ) -> Result<Vec<RolesetProbability>, EngineError> {
            Ok(vec![RolesetProbability {
                gene: "peg.1".to_string(),
                roleset: "rolea///roleb".to_string(),
                probability: 0.8,
            }])
        }

        fn role_probabilities(
            &self,
            rolesets: &[RolesetProbability],
        ) -> Result<Vec<RoleProbability>, EngineError> {
            Ok(rolesets
                .iter()
                .map(|r| RoleProbability {
                    gene: Some(r.gene.clone()),
                    role: r.roleset.clone(),
                    probability: r.probability,
                })
                .collect())
        }

        fn total_role_probabilities(
            &self,
            roles: &[RoleProbability],
        ) -> Result<Vec<RoleProbability>, EngineError> {
            Ok(roles.to_vec())
        }

        fn complex_probabilities(
            &self,
            _total_roles: &[RoleProbability],
        ) -> Result<Vec<ComplexProbability>, EngineError> {
            Ok(vec![ComplexProbability {
                complex_id: "cpx.1".to_string(),
                probability: 0.8,
            }])
        }

        fn reaction_probabilities(
            &self,
            _complexes: &[ComplexProbability],
        ) -> Result<Vec<ReactionProbability>, EngineError> {
            Ok(vec![ReactionProbability {
                reaction: "rxn00148".to_string(),
                probability: 0.8,
                complexes: "cpx.1".to_string(),
                gpr: "peg.1".to_string(),
            }])
        }

        fn cleanup(&self) -> Result<(), EngineError> {
            *self.cleaned.borrow_mut() = true;
            Ok(())
        }
    }

    fn genome() -> Genome {
        Genome {
            id: "224308.49".to_string(),
            scientific_name: "Bacillus subtilis".to_string(),
            features: vec![Feature::new("peg.1")],
        }
    }

    #[test]
    fn pipeline_runs_all_stages_and_cleans_up() {
        let worker = MockWorker::new(false);
        let result = run_probanno(&worker, &genome()).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].reaction, "rxn00148");
        assert!(*worker.cleaned.borrow());
    }

    #[test]
    fn pipeline_cleans_up_on_failure() {
        let worker = MockWorker::new(true);
        let result = run_probanno(&worker, &genome());
        assert!(result.is_err());
        assert!(*worker.cleaned.borrow());
    }

    #[test]
    fn roleset_probability_splits_evenly_over_roles() {
        let worker = CommandWorker::new("aligner", std::env::temp_dir(), "g1");
        let roles = worker
            .role_probabilities(&[RolesetProbability {
                gene: "peg.1".to_string(),
                roleset: "rolea///roleb".to_string(),
                probability: 0.8,
            }])
            .unwrap();
        assert_eq!(roles.len(), 2);
        assert!((roles[0].probability - 0.4).abs() < 1e-9);
        assert_eq!(roles[1].role, "roleb");
    }

    #[test]
    fn total_role_probability_is_capped() {
        let worker = CommandWorker::new("aligner", std::env::temp_dir(), "g1");
        let totals = worker
            .total_role_probabilities(&[
                RoleProbability {
                    gene: Some("peg.1".to_string()),
                    role: "rolea".to_string(),
                    probability: 0.7,
                },
                RoleProbability {
                    gene: Some("peg.2".to_string()),
                    role: "rolea".to_string(),
                    probability: 0.6,
                },
            ])
            .unwrap();
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].probability, 1.0);
        assert_eq!(totals[0].gene, None);
    }
}
