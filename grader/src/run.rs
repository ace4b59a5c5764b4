//! Case execution orchestration.
//!
//! Coordinates workspace creation, solver execution, judging, and result
//! capture.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use task::io::config::TaskConfig;

use crate::case::CaseFile;
use crate::config::apply_case_config;
use crate::harness::{SolverLimits, run_solver};
use crate::hints::{Transcript, write_transcript};
use crate::judge::{judge_workspace, write_judgment};
use crate::outcome::{Outcome, classify_outcome};
use crate::results::{CaptureInput, capture_results, update_outcome};
use crate::workspace::create_workspace;

/// Result of grading a single case.
#[derive(Debug)]
pub struct RunOutcome {
    /// Unique identifier for this grading run.
    pub run_id: String,
    /// Path to the results directory.
    pub results_dir: PathBuf,
    /// Classified outcome.
    pub outcome: Outcome,
}

/// Grade a case end-to-end: workspace creation, solver, judging, capture.
#[instrument(skip_all, fields(case_id = %case.case.id))]
pub fn run_case(repo_root: &Path, case_path: &Path, case: &CaseFile) -> Result<RunOutcome> {
    info!("case run started");

    let cfg = apply_case_config(TaskConfig::default(), case).context("apply case config")?;

    debug!("creating workspace");
    let workspace_base = repo_root.join("grader").join("workspaces");
    let (workspace, targets) =
        create_workspace(&workspace_base, &case.case.id, &cfg, case.case.variant)
            .context("create workspace")?;

    let started_at = Utc::now();
    let run_id = format!("grade-{}", Utc::now().format("%Y%m%d_%H%M%S"));
    let results_dir = crate::results::results_dir(
        &repo_root.join("grader").join("results"),
        &case.case.id,
        &run_id,
    );
    fs::create_dir_all(&results_dir)
        .with_context(|| format!("create {}", results_dir.display()))?;

    let mut harness_failed = false;
    let mut solver_exit_code = None;
    if let Some(solver) = &case.solver {
        debug!(cmd = ?solver.command, "running solver");
        let mut limits = SolverLimits::default_limits();
        if let Some(timeout_secs) = solver.timeout_secs {
            limits.timeout = Duration::from_secs(timeout_secs);
        }
        match run_solver(
            &solver.command,
            &solver.env,
            &workspace.root,
            limits,
            &results_dir.join("solver.log"),
        ) {
            Ok(run) => {
                solver_exit_code = run.exit_code;
                if !run.completed() {
                    warn!(
                        cmd = ?solver.command,
                        exit_code = ?run.exit_code,
                        timed_out = run.timed_out,
                        "solver did not complete"
                    );
                }
                if run.stdout_truncated || run.stderr_truncated {
                    debug!("solver output truncated in solver.log");
                }
            }
            Err(err) => {
                warn!(error = %err, "solver could not be run");
                harness_failed = true;
            }
        }
    }
    let finished_at = Utc::now();

    debug!("judging workspace");
    let judgment =
        judge_workspace(&workspace.root, &cfg, targets.as_ref()).context("judge workspace")?;
    write_judgment(&results_dir.join("judgment.json"), &judgment).context("write judgment")?;

    debug!("capturing results");
    let capture_input = CaptureInput {
        case_id: &case.case.id,
        case_path,
        run_id: &run_id,
        variant: case.case.variant,
        solver_exit_code,
        started_at,
        finished_at,
        workspace_root: &workspace.root,
    };
    capture_results(&results_dir, &capture_input, targets.as_ref()).context("capture results")?;

    // Seed the hint transcript with the case's budget so a human grading
    // session resumes against the right limit.
    write_transcript(
        &results_dir.join("hints.json"),
        &Transcript::new(case.hints.max_prompts),
    )
    .context("seed hint transcript")?;

    let outcome = classify_outcome(harness_failed, &judgment);
    update_outcome(&results_dir, outcome).context("update outcome")?;

    info!(outcome = ?outcome, results_dir = %results_dir.display(), "case run complete");

    Ok(RunOutcome {
        run_id,
        results_dir,
        outcome,
    })
}
