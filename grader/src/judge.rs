//! Workspace judging: solution checks and scoring.
//!
//! The judgment records the furthest stage the submission reached and, when
//! it scored, the full scorecard. Written to the results directory as
//! `judgment.json`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use task::core::score::{Scorecard, score_solution};
use task::core::target::TargetSet;
use task::io::config::TaskConfig;
use task::io::target::resolve_truths;
use task::validate::{SolutionCheck, check_solution_file};

/// Judged status of a submitted solution file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SolutionStatus {
    Missing,
    Unreadable { message: String },
    SchemaInvalid { violations: Vec<String> },
    InvariantViolations { violations: Vec<String> },
    Scored,
}

/// Full judgment for one attempt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Judgment {
    pub solution: SolutionStatus,
    pub scorecard: Option<Scorecard>,
}

impl Judgment {
    pub fn passed(&self) -> bool {
        self.scorecard.as_ref().is_some_and(|card| card.passed)
    }
}

/// Judge a workspace: check `solution.json`, then score it against the
/// withheld ground truth (or image centers when there is none).
#[instrument(skip_all, fields(workspace = %workspace_root.display()))]
pub fn judge_workspace(
    workspace_root: &Path,
    cfg: &TaskConfig,
    targets: Option<&TargetSet>,
) -> Result<Judgment> {
    let solution_path = workspace_root.join("solution.json");
    let check = check_solution_file(&solution_path, &cfg.images)?;

    let solution = match check {
        SolutionCheck::Missing => {
            debug!("solution missing");
            return Ok(Judgment {
                solution: SolutionStatus::Missing,
                scorecard: None,
            });
        }
        SolutionCheck::Unreadable { message } => {
            return Ok(Judgment {
                solution: SolutionStatus::Unreadable { message },
                scorecard: None,
            });
        }
        SolutionCheck::SchemaInvalid { violations } => {
            return Ok(Judgment {
                solution: SolutionStatus::SchemaInvalid { violations },
                scorecard: None,
            });
        }
        SolutionCheck::InvariantViolations { violations } => {
            return Ok(Judgment {
                solution: SolutionStatus::InvariantViolations { violations },
                scorecard: None,
            });
        }
        SolutionCheck::Valid { solution } => solution,
    };

    let truths = resolve_truths(&workspace_root.join("input"), &cfg.images, targets)
        .context("resolve ground truth")?;
    let scorecard = score_solution(&truths, &solution, &cfg.criteria());
    debug!(
        num_correct = scorecard.summary.num_correct,
        num_images = scorecard.summary.num_images,
        passed = scorecard.passed,
        "workspace scored"
    );

    Ok(Judgment {
        solution: SolutionStatus::Scored,
        scorecard: Some(scorecard),
    })
}

pub fn write_judgment(path: &Path, judgment: &Judgment) -> Result<()> {
    let contents = serde_json::to_string_pretty(judgment).context("serialize judgment")?;
    fs::write(path, format!("{contents}\n"))
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
