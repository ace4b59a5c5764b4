use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::judge::Judgment;
use crate::results::GradeMeta;

#[derive(Debug, Default)]
pub struct ReportSummary {
    pub runs: usize,
    pub success: usize,
    pub fail: usize,
    pub invalid: usize,
    pub error: usize,
    pub avg_duration_secs: Option<f64>,
    /// Mean of per-run average center errors, over runs that scored.
    pub avg_center_error_px: Option<f64>,
    /// Per input image: (correct runs, scored runs).
    pub image_pass_rates: BTreeMap<String, (usize, usize)>,
}

pub fn load_run_dirs(case_results_dir: &Path) -> Result<Vec<PathBuf>> {
    if !case_results_dir.exists() {
        return Ok(Vec::new());
    }
    let mut dirs = Vec::new();
    for entry in fs::read_dir(case_results_dir)
        .with_context(|| format!("read {}", case_results_dir.display()))?
    {
        let entry = entry.context("read entry")?;
        if entry.path().is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

pub fn aggregate(case_results_dir: &Path) -> Result<(ReportSummary, Vec<String>)> {
    let mut summary = ReportSummary::default();
    let mut warnings = Vec::new();
    let mut error_sum = 0.0;
    let mut error_runs = 0usize;

    for run_dir in load_run_dirs(case_results_dir)? {
        let meta_path = run_dir.join("meta.json");
        let judgment_path = run_dir.join("judgment.json");

        let meta: GradeMeta = match fs::read_to_string(&meta_path)
            .with_context(|| format!("read {}", meta_path.display()))
            .and_then(|contents| serde_json::from_str(&contents).context("parse meta"))
        {
            Ok(meta) => meta,
            Err(err) => {
                warnings.push(format!(
                    "skip {}: meta.json invalid ({err})",
                    run_dir.display()
                ));
                continue;
            }
        };

        let judgment: Judgment = match fs::read_to_string(&judgment_path)
            .with_context(|| format!("read {}", judgment_path.display()))
            .and_then(|contents| serde_json::from_str(&contents).context("parse judgment"))
        {
            Ok(judgment) => judgment,
            Err(err) => {
                warnings.push(format!(
                    "skip {}: judgment.json invalid ({err})",
                    run_dir.display()
                ));
                continue;
            }
        };

        summary.runs += 1;
        match meta.outcome {
            Some(crate::outcome::Outcome::Success) => summary.success += 1,
            Some(crate::outcome::Outcome::Fail) => summary.fail += 1,
            Some(crate::outcome::Outcome::Invalid) => summary.invalid += 1,
            Some(crate::outcome::Outcome::Error) | None => summary.error += 1,
        }

        summary.avg_duration_secs = Some(match summary.avg_duration_secs {
            None => meta.duration_secs,
            Some(avg) => {
                let total = avg * (summary.runs as f64 - 1.0) + meta.duration_secs;
                total / summary.runs as f64
            }
        });

        if let Some(card) = &judgment.scorecard {
            if let Some(avg) = card.summary.avg_center_error_px {
                error_sum += avg;
                error_runs += 1;
            }
            for score in &card.per_image {
                let entry = summary
                    .image_pass_rates
                    .entry(score.image.clone())
                    .or_insert((0, 0));
                if score.correct {
                    entry.0 += 1;
                }
                entry.1 += 1;
            }
        }
    }

    if error_runs > 0 {
        summary.avg_center_error_px = Some(error_sum / error_runs as f64);
    }

    Ok((summary, warnings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judge::SolutionStatus;
    use crate::outcome::Outcome;
    use task::core::score::{Criteria, score_solution};
    use task::core::target::Variant;
    use task::test_support::{entry, solution, truths};
    use tempfile::tempdir;

    fn write_meta(path: &Path, outcome: Outcome, duration: f64) {
        let meta = GradeMeta {
            case_id: "case".to_string(),
            run_id: "grade-1".to_string(),
            case_hash: "hash".to_string(),
            variant: Variant::Crosshair,
            outcome: Some(outcome),
            start_time: "now".to_string(),
            end_time: "later".to_string(),
            duration_secs: duration,
            solver_exit_code: Some(0),
            workspace: "/tmp".to_string(),
            errors: Vec::new(),
        };
        let contents = serde_json::to_string_pretty(&meta).expect("meta json");
        fs::write(path, format!("{contents}\n")).expect("write meta");
    }

    fn write_judgment_file(path: &Path, predicted_x: f64) {
        let truth = truths(&[("image_1.png", 0.0, 0.0)]);
        let card = score_solution(
            &truth,
            &solution(vec![entry("image_1.png", predicted_x, 0.0)]),
            &Criteria::default(),
        );
        let judgment = Judgment {
            solution: SolutionStatus::Scored,
            scorecard: Some(card),
        };
        let contents = serde_json::to_string_pretty(&judgment).expect("judgment json");
        fs::write(path, format!("{contents}\n")).expect("write judgment");
    }

    #[test]
    fn aggregates_runs() {
        let temp = tempdir().expect("tempdir");
        let run1 = temp.path().join("run1");
        let run2 = temp.path().join("run2");
        fs::create_dir_all(&run1).expect("run1");
        fs::create_dir_all(&run2).expect("run2");

        write_meta(&run1.join("meta.json"), Outcome::Success, 5.0);
        write_judgment_file(&run1.join("judgment.json"), 0.0);

        write_meta(&run2.join("meta.json"), Outcome::Fail, 15.0);
        write_judgment_file(&run2.join("judgment.json"), 100.0);

        let (summary, warnings) = aggregate(temp.path()).expect("aggregate");
        assert!(warnings.is_empty());
        assert_eq!(summary.runs, 2);
        assert_eq!(summary.success, 1);
        assert_eq!(summary.fail, 1);
        assert_eq!(summary.avg_duration_secs.unwrap(), 10.0);
        assert_eq!(summary.avg_center_error_px, Some(50.0));

        let key = "image_1.png".to_string();
        assert_eq!(summary.image_pass_rates.get(&key), Some(&(1, 2)));
    }

    #[test]
    fn unreadable_runs_are_skipped_with_warning() {
        let temp = tempdir().expect("tempdir");
        let run = temp.path().join("run1");
        fs::create_dir_all(&run).expect("run");
        fs::write(run.join("meta.json"), "not json").expect("bad meta");

        let (summary, warnings) = aggregate(temp.path()).expect("aggregate");
        assert_eq!(summary.runs, 0);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("meta.json invalid"));
    }

    #[test]
    fn empty_results_dir_is_empty_summary() {
        let temp = tempdir().expect("tempdir");
        let (summary, warnings) =
            aggregate(&temp.path().join("does-not-exist")).expect("aggregate");
        assert_eq!(summary.runs, 0);
        assert!(warnings.is_empty());
    }
}
