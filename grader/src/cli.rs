//! CLI command implementations.

use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use crate::case::{CaseFile, discover_cases};
use crate::hints::{Hint, HintSession, load_transcript, write_transcript};
use crate::report::aggregate;
use crate::run::run_case;

/// List all available cases.
pub fn list_cases(repo_root: &Path) -> Result<()> {
    let cases_dir = repo_root.join("grader").join("cases");
    let cases = discover_cases(&cases_dir)?;
    for case in cases {
        println!("{}\t{}", case.case.id, case.case.description);
    }
    Ok(())
}

/// Grade a case by id (optionally multiple times).
pub fn run_case_by_id(repo_root: &Path, case_id: &str, runs: u32) -> Result<()> {
    let cases_dir = repo_root.join("grader").join("cases");
    let case_path = cases_dir.join(format!("{case_id}.toml"));
    if !case_path.exists() {
        bail!("case {} not found at {}", case_id, case_path.display());
    }
    let case = CaseFile::load(&case_path).context("load case")?;
    debug!(case_id, runs, "case loaded");

    info!(case_id, runs, "starting runs");
    for run_num in 1..=runs {
        debug!(case_id, run_num, runs, "starting run");
        let outcome = run_case(repo_root, &case_path, &case).context("run case")?;
        println!(
            "run: case={} run_id={} outcome={:?} results={}",
            case_id,
            outcome.run_id,
            outcome.outcome,
            outcome.results_dir.display()
        );
    }
    Ok(())
}

/// Show aggregated results for a case.
pub fn report_case(repo_root: &Path, case_id: &str) -> Result<()> {
    let results_dir = repo_root.join("grader").join("results").join(case_id);
    let (summary, warnings) = aggregate(&results_dir)?;
    println!("report: case={} runs={}", case_id, summary.runs);
    println!(
        "report: success={} fail={} invalid={} error={}",
        summary.success, summary.fail, summary.invalid, summary.error
    );
    if let Some(avg) = summary.avg_duration_secs {
        println!("report: avg_duration_secs={:.2}", avg);
    }
    if let Some(avg) = summary.avg_center_error_px {
        println!("report: avg_center_error_px={:.2}", avg);
    }
    for (image, (passed, total)) in summary.image_pass_rates {
        println!("report: image {} {}/{}", image, passed, total);
    }
    for warning in warnings {
        eprintln!("warning: {}", warning);
    }
    Ok(())
}

/// Remove workspaces and results for a case.
pub fn clean_case(repo_root: &Path, case_id: &str) -> Result<()> {
    let workspaces_dir = repo_root.join("grader").join("workspaces");
    let results_dir = repo_root.join("grader").join("results");

    if workspaces_dir.exists() {
        for entry in std::fs::read_dir(&workspaces_dir)
            .with_context(|| format!("read {}", workspaces_dir.display()))?
        {
            let entry = entry.context("read entry")?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with(case_id) {
                std::fs::remove_dir_all(entry.path())
                    .with_context(|| format!("remove {}", entry.path().display()))?;
            }
        }
    }

    let case_results = results_dir.join(case_id);
    if case_results.exists() {
        std::fs::remove_dir_all(&case_results)
            .with_context(|| format!("remove {}", case_results.display()))?;
    }

    println!(
        "clean: case={} workspaces={} results={}",
        case_id,
        workspaces_dir.display(),
        case_results.display()
    );
    Ok(())
}

/// Issue a hint, appending it to the session transcript.
///
/// A missing transcript starts a fresh session with the given budget; an
/// existing one resumes, so the budget holds across invocations.
pub fn issue_hint(transcript_path: &Path, max_prompts: u32, hint: &Hint) -> Result<()> {
    let mut session = if transcript_path.exists() {
        HintSession::resume(load_transcript(transcript_path)?)
    } else {
        HintSession::new(max_prompts)
    };
    let message = session.issue(hint).context("issue hint")?;
    write_transcript(transcript_path, session.transcript())?;
    info!(remaining = session.remaining(), "hint issued");
    println!("{message}");
    Ok(())
}

/// Audit a session transcript against the prompting rules.
pub fn audit_transcript_file(transcript_path: &Path) -> Result<()> {
    let transcript = load_transcript(transcript_path)?;
    let violations = crate::hints::audit_transcript(&transcript);
    if violations.is_empty() {
        println!(
            "audit: ok prompts={}/{}",
            transcript.prompts.len(),
            transcript.max_prompts
        );
        return Ok(());
    }
    for violation in &violations {
        println!("audit: violation {}", violation);
    }
    bail!("{} hint violations", violations.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hints::{Direction, Magnitude};
    use tempfile::tempdir;

    #[test]
    fn hint_sessions_persist_across_invocations() {
        let temp = tempdir().expect("tempdir");
        let transcript_path = temp.path().join("hints.json");

        for image_index in 1..=2 {
            issue_hint(
                &transcript_path,
                2,
                &Hint::Nudge {
                    image_index,
                    direction: Direction::Left,
                    magnitude: Magnitude::Slightly,
                },
            )
            .expect("issue");
        }

        let err = issue_hint(&transcript_path, 2, &Hint::Confirm { image_index: 1 })
            .expect_err("over budget");
        assert!(format!("{err:#}").contains("budget exhausted"));

        audit_transcript_file(&transcript_path).expect("clean audit");
    }
}
