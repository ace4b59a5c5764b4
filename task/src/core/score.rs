//! Scoring of a solution against resolved ground truth.
//!
//! Scoring is pure: the I/O layer resolves each input image to its true
//! target (`crate::io::target::resolve_truths`) and this module turns truths
//! plus a solution into a serializable scorecard.

use serde::{Deserialize, Serialize};

use crate::core::geometry::{Point, center_error, within_tolerance};
use crate::core::solution::Solution;

/// Pass criteria for a scored run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Criteria {
    /// Fixed pixel tolerance for a prediction to count as correct.
    pub pixel_tolerance: f64,
    /// When true, every image must be correct for the run to pass.
    pub require_all_correct: bool,
    /// Fraction threshold applied when `require_all_correct` is false.
    pub min_fraction_correct: f64,
}

impl Default for Criteria {
    fn default() -> Self {
        Self {
            pixel_tolerance: 15.0,
            require_all_correct: true,
            min_fraction_correct: 0.9,
        }
    }
}

/// An input image paired with its resolved true target.
///
/// `target` is `None` when the truth could not be resolved (input image
/// missing or unreadable); such images always score incorrect.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTruth {
    pub image: String,
    pub target: Option<Point>,
}

/// Per-image scoring result. `error_px` is `None` when the image could not
/// be scored (no prediction, or no resolvable truth).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageScore {
    pub image: String,
    pub error_px: Option<f64>,
    pub correct: bool,
}

/// Aggregate metrics over all input images.
///
/// Averages and maxima cover finite errors only, so the scorecard stays
/// JSON-serializable even with unscorable images.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreSummary {
    pub num_images: usize,
    pub num_correct: usize,
    pub avg_center_error_px: Option<f64>,
    pub max_center_error_px: Option<f64>,
    pub tolerance_px: f64,
    /// Input images with no prediction entry.
    pub missing_predictions: Vec<String>,
}

/// Full scoring result for one solution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scorecard {
    pub per_image: Vec<ImageScore>,
    pub summary: ScoreSummary,
    pub passed: bool,
}

/// Score a solution against resolved truths.
///
/// The solution is assumed structurally valid (`Solution::validate` passed);
/// scoring only consults entries by filename.
pub fn score_solution(truths: &[ImageTruth], solution: &Solution, criteria: &Criteria) -> Scorecard {
    let mut per_image = Vec::with_capacity(truths.len());
    let mut missing_predictions = Vec::new();
    let mut errors = Vec::new();
    let mut num_correct = 0;

    for truth in truths {
        let prediction = solution.entry_for(&truth.image);
        if prediction.is_none() {
            missing_predictions.push(truth.image.clone());
        }

        let error_px = match (prediction, truth.target) {
            (Some(entry), Some(target)) => Some(center_error(entry.center(), target)),
            _ => None,
        };

        let correct = error_px
            .map(|error| within_tolerance(error, criteria.pixel_tolerance))
            .unwrap_or(false);
        if correct {
            num_correct += 1;
        }
        if let Some(error) = error_px {
            errors.push(error);
        }

        per_image.push(ImageScore {
            image: truth.image.clone(),
            error_px,
            correct,
        });
    }

    let avg_center_error_px = if errors.is_empty() {
        None
    } else {
        Some(errors.iter().sum::<f64>() / errors.len() as f64)
    };
    let max_center_error_px = errors.iter().copied().fold(None, |max: Option<f64>, err| {
        Some(max.map_or(err, |m| m.max(err)))
    });

    let num_images = truths.len();
    let passed = passes(num_images, num_correct, criteria);

    Scorecard {
        per_image,
        summary: ScoreSummary {
            num_images,
            num_correct,
            avg_center_error_px,
            max_center_error_px,
            tolerance_px: criteria.pixel_tolerance,
            missing_predictions,
        },
        passed,
    }
}

fn passes(num_images: usize, num_correct: usize, criteria: &Criteria) -> bool {
    if num_images == 0 {
        return true;
    }
    if criteria.require_all_correct {
        return num_correct == num_images;
    }
    num_correct as f64 / num_images as f64 >= criteria.min_fraction_correct
}
