//! End-to-end: generate inputs, answer from ground truth, validate and score.

use task::core::score::score_solution;
use task::core::solution::{CircleEntry, Solution};
use task::core::target::Variant;
use task::io::config::TaskConfig;
use task::io::solution::write_solution;
use task::io::target::resolve_truths;
use task::test_support::TaskDir;
use task::validate::{SolutionCheck, check_solution_file};

fn perfect_solution(dir: &TaskDir) -> Solution {
    let targets = dir.targets.as_ref().expect("ground truth");
    Solution {
        circles: targets
            .targets
            .iter()
            .map(|target| CircleEntry {
                image: target.image.clone(),
                x: target.x,
                y: target.y,
                radius: 20.0,
            })
            .collect(),
    }
}

#[test]
fn crosshair_solution_from_ground_truth_passes() {
    let cfg = TaskConfig::default();
    let dir = TaskDir::generate(&cfg, Variant::Crosshair, 42).expect("generate");

    let solution = perfect_solution(&dir);
    let solution_path = dir.root().join("solution.json");
    write_solution(&solution_path, &solution).expect("write solution");

    let check = check_solution_file(&solution_path, &cfg.images).expect("check");
    let solution = match check {
        SolutionCheck::Valid { solution } => solution,
        other => panic!("expected valid solution, got {other:?}"),
    };

    let targets = dir.targets.clone();
    let truths =
        resolve_truths(&dir.input_dir(), &cfg.images, targets.as_ref()).expect("resolve");
    let card = score_solution(&truths, &solution, &cfg.criteria());

    assert!(card.passed);
    assert_eq!(card.summary.num_correct, cfg.images.len());
    assert_eq!(card.summary.max_center_error_px, Some(0.0));
}

#[test]
fn centering_solution_at_canvas_center_passes() {
    let cfg = TaskConfig::default();
    let dir = TaskDir::generate(&cfg, Variant::Centering, 42).expect("generate");

    let solution = Solution {
        circles: cfg
            .images
            .iter()
            .map(|image| CircleEntry {
                image: image.clone(),
                x: 256.0,
                y: 256.0,
                radius: 20.0,
            })
            .collect(),
    };
    write_solution(&dir.root().join("solution.json"), &solution).expect("write solution");

    let truths = resolve_truths(&dir.input_dir(), &cfg.images, None).expect("resolve");
    let card = score_solution(&truths, &solution, &cfg.criteria());

    assert!(card.passed);
    assert_eq!(card.summary.avg_center_error_px, Some(0.0));
}

#[test]
fn off_target_solution_fails() {
    let cfg = TaskConfig::default();
    let dir = TaskDir::generate(&cfg, Variant::Crosshair, 42).expect("generate");

    let mut solution = perfect_solution(&dir);
    // Push the first prediction well outside the tolerance.
    solution.circles[0].x += 100.0;
    solution.circles[0].y += 100.0;

    let targets = dir.targets.clone();
    let truths =
        resolve_truths(&dir.input_dir(), &cfg.images, targets.as_ref()).expect("resolve");
    let card = score_solution(&truths, &solution, &cfg.criteria());

    assert!(!card.passed);
    assert_eq!(card.summary.num_correct, cfg.images.len() - 1);
}
