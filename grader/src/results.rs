//! Result capture and persistence.
//!
//! Captures the attempt's `solution.json`, the withheld ground truth, and
//! run metadata to the results directory for later analysis.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, instrument, warn};

use task::core::target::{TargetSet, Variant};
use task::io::render::write_truth_overlays;
use task::io::target::write_targets;

use crate::outcome::Outcome;

/// Input for capturing results from a completed run.
#[derive(Debug)]
pub struct CaptureInput<'a> {
    pub case_id: &'a str,
    pub case_path: &'a Path,
    pub run_id: &'a str,
    pub variant: Variant,
    pub solver_exit_code: Option<i32>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub workspace_root: &'a Path,
}

/// Metadata for a grading run, persisted to `meta.json`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GradeMeta {
    pub case_id: String,
    pub run_id: String,
    /// SHA-256 hash of the case file for reproducibility tracking.
    pub case_hash: String,
    pub variant: Variant,
    pub outcome: Option<Outcome>,
    pub start_time: String,
    pub end_time: String,
    pub duration_secs: f64,
    pub solver_exit_code: Option<i32>,
    pub workspace: String,
    /// Non-fatal errors encountered during capture.
    pub errors: Vec<String>,
}

/// Capture results from a completed run into `results_dir`.
///
/// Copies the submitted solution, writes the withheld ground truth and its
/// overlays, and records metadata. Capture problems are recorded in
/// `meta.json` rather than failing the run.
#[instrument(skip_all, fields(case_id = %input.case_id, run_id = %input.run_id))]
pub fn capture_results(
    results_dir: &Path,
    input: &CaptureInput<'_>,
    targets: Option<&TargetSet>,
) -> Result<()> {
    fs::create_dir_all(results_dir)
        .with_context(|| format!("create results dir {}", results_dir.display()))?;

    let mut errors = Vec::new();

    let case_hash = match file_sha256(input.case_path) {
        Ok(hash) => hash,
        Err(err) => {
            errors.push(format!("case hash: {err}"));
            String::new()
        }
    };

    copy_if_exists(
        &input.workspace_root.join("solution.json"),
        &results_dir.join("solution.json"),
        "solution.json",
        &mut errors,
    );

    if let Some(targets) = targets {
        if let Err(err) = write_targets(&results_dir.join("targets.json"), targets) {
            errors.push(format!("targets.json: {err}"));
        }
        if let Err(err) =
            write_truth_overlays(&input.workspace_root.join("input"), results_dir, targets)
        {
            errors.push(format!("overlays: {err}"));
        }
    }

    if !errors.is_empty() {
        warn!(errors = ?errors, "artifact capture had errors");
    }

    let duration = input.finished_at - input.started_at;
    let meta = GradeMeta {
        case_id: input.case_id.to_string(),
        run_id: input.run_id.to_string(),
        case_hash,
        variant: input.variant,
        outcome: None,
        start_time: input.started_at.to_rfc3339(),
        end_time: input.finished_at.to_rfc3339(),
        duration_secs: duration.num_milliseconds() as f64 / 1000.0,
        solver_exit_code: input.solver_exit_code,
        workspace: input.workspace_root.display().to_string(),
        errors,
    };

    write_meta(&results_dir.join("meta.json"), &meta)?;
    debug!(results_dir = %results_dir.display(), "results captured");
    Ok(())
}

pub fn update_outcome(results_dir: &Path, outcome: Outcome) -> Result<()> {
    let meta_path = results_dir.join("meta.json");
    let mut meta: GradeMeta = serde_json::from_str(
        &fs::read_to_string(&meta_path).with_context(|| format!("read {}", meta_path.display()))?,
    )
    .context("parse meta")?;
    meta.outcome = Some(outcome);
    write_meta(&meta_path, &meta)?;
    Ok(())
}

pub fn results_dir(base_dir: &Path, case_id: &str, run_id: &str) -> PathBuf {
    base_dir.join(case_id).join(run_id)
}

fn write_meta(path: &Path, meta: &GradeMeta) -> Result<()> {
    let contents = serde_json::to_string_pretty(meta).context("serialize meta")?;
    fs::write(path, format!("{contents}\n"))
        .with_context(|| format!("write meta {}", path.display()))?;
    Ok(())
}

fn file_sha256(path: &Path) -> Result<String> {
    let contents = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let mut hasher = Sha256::new();
    hasher.update(contents);
    let digest = hasher.finalize();
    Ok(hex::encode(digest))
}

fn copy_if_exists(src: &Path, dst: &Path, label: &str, errors: &mut Vec<String>) {
    if !src.exists() {
        errors.push(format!("{label}: missing {}", src.display()));
        return;
    }
    if let Some(parent) = dst.parent()
        && let Err(err) = fs::create_dir_all(parent)
    {
        errors.push(format!("{label}: create dir failed: {err}"));
        return;
    }
    if let Err(err) = fs::copy(src, dst) {
        errors.push(format!("{label}: copy failed: {err}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use task::core::target::Target;
    use tempfile::tempdir;

    fn capture_input<'a>(case_path: &'a Path, workspace: &'a Path) -> CaptureInput<'a> {
        CaptureInput {
            case_id: "case",
            case_path,
            run_id: "grade-1",
            variant: Variant::Crosshair,
            solver_exit_code: Some(0),
            started_at: Utc::now(),
            finished_at: Utc::now(),
            workspace_root: workspace,
        }
    }

    #[test]
    fn results_dir_is_stable() {
        let base = Path::new("/tmp/results");
        let dir = results_dir(base, "case", "grade-1");
        assert_eq!(dir, PathBuf::from("/tmp/results/case/grade-1"));
    }

    #[test]
    fn captures_solution_truth_and_meta() {
        let temp = tempdir().expect("tempdir");
        let workspace = temp.path().join("workspace");
        let results = temp.path().join("results");
        fs::create_dir_all(workspace.join("input")).expect("input dir");
        fs::write(workspace.join("solution.json"), "{\"circles\": []}\n").expect("solution");

        let case_path = temp.path().join("case.toml");
        fs::write(&case_path, "[case]\nid='case'\nvariant='crosshair'\n").expect("case");

        // One real input so the overlay render has a source image.
        task::io::render::blank_image(16, 16)
            .save(workspace.join("input/image_1.png"))
            .expect("input image");
        let targets = TargetSet {
            targets: vec![Target {
                image: "image_1.png".to_string(),
                x: 8.0,
                y: 8.0,
            }],
        };

        let input = capture_input(&case_path, &workspace);
        capture_results(&results, &input, Some(&targets)).expect("capture");

        assert!(results.join("solution.json").is_file());
        assert!(results.join("targets.json").is_file());
        assert!(results.join("image_1_gt.png").is_file());

        let meta: GradeMeta =
            serde_json::from_str(&fs::read_to_string(results.join("meta.json")).expect("meta"))
                .expect("parse meta");
        assert_eq!(meta.case_id, "case");
        assert!(!meta.case_hash.is_empty());
        assert!(meta.errors.is_empty());
    }

    #[test]
    fn missing_solution_is_a_capture_error_not_a_failure() {
        let temp = tempdir().expect("tempdir");
        let workspace = temp.path().join("workspace");
        let results = temp.path().join("results");
        fs::create_dir_all(&workspace).expect("workspace");
        let case_path = temp.path().join("case.toml");
        fs::write(&case_path, "[case]\nid='case'\nvariant='centering'\n").expect("case");

        let input = capture_input(&case_path, &workspace);
        capture_results(&results, &input, None).expect("capture");

        let meta: GradeMeta =
            serde_json::from_str(&fs::read_to_string(results.join("meta.json")).expect("meta"))
                .expect("parse meta");
        assert!(meta.errors.iter().any(|err| err.contains("solution.json")));
    }

    #[test]
    fn update_outcome_rewrites_meta() {
        let temp = tempdir().expect("tempdir");
        let workspace = temp.path().join("workspace");
        fs::create_dir_all(&workspace).expect("workspace");
        let case_path = temp.path().join("case.toml");
        fs::write(&case_path, "[case]\nid='case'\nvariant='centering'\n").expect("case");

        let results = temp.path().join("results");
        let input = capture_input(&case_path, &workspace);
        capture_results(&results, &input, None).expect("capture");
        update_outcome(&results, Outcome::Success).expect("update");

        let meta: GradeMeta =
            serde_json::from_str(&fs::read_to_string(results.join("meta.json")).expect("meta"))
                .expect("parse meta");
        assert_eq!(meta.outcome, Some(Outcome::Success));
    }
}
