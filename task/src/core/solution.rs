//! Solution file data model and semantic invariants.
//!
//! `solution.json` is the only artifact the task grades. The shape is fixed:
//! a `circles` array with one entry per input image. Schema conformance is
//! checked separately (`crate::validate`); this module owns the invariants a
//! schema cannot express.

use serde::{Deserialize, Serialize};

use crate::core::geometry::Point;

/// A parsed `solution.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Solution {
    pub circles: Vec<CircleEntry>,
}

/// One predicted circle. `radius` must be positive but is never graded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CircleEntry {
    /// Input image filename, matching the task's file list exactly.
    pub image: String,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

impl CircleEntry {
    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

impl Solution {
    /// Look up the entry for an input image by exact filename.
    pub fn entry_for(&self, image: &str) -> Option<&CircleEntry> {
        self.circles.iter().find(|entry| entry.image == image)
    }

    /// Check semantic invariants against the task's input file list.
    ///
    /// Returns violation messages; empty means the solution is well-formed.
    pub fn validate(&self, expected_images: &[String]) -> Vec<String> {
        let mut violations = Vec::new();

        for (index, entry) in self.circles.iter().enumerate() {
            if !expected_images.iter().any(|image| *image == entry.image) {
                violations.push(format!(
                    "circles[{}]: unknown image '{}'",
                    index, entry.image
                ));
            }
            if !entry.x.is_finite() || !entry.y.is_finite() {
                violations.push(format!(
                    "circles[{}]: coordinates must be finite",
                    index
                ));
            }
            if !entry.radius.is_finite() || entry.radius <= 0.0 {
                violations.push(format!("circles[{}]: radius must be > 0", index));
            }
        }

        for (index, entry) in self.circles.iter().enumerate() {
            let first = self
                .circles
                .iter()
                .position(|other| other.image == entry.image);
            if first != Some(index) {
                violations.push(format!(
                    "circles[{}]: duplicate entry for '{}'",
                    index, entry.image
                ));
            }
        }

        for image in expected_images {
            if self.entry_for(image).is_none() {
                violations.push(format!("missing entry for '{}'", image));
            }
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{entry, images, solution};

    #[test]
    fn complete_solution_has_no_violations() {
        let expected = images(&["image_1.png", "image_2.png"]);
        let solution = solution(vec![
            entry("image_1.png", 10.0, 20.0),
            entry("image_2.png", 30.0, 40.0),
        ]);
        assert!(solution.validate(&expected).is_empty());
    }

    #[test]
    fn missing_and_unknown_images_are_flagged() {
        let expected = images(&["image_1.png", "image_2.png"]);
        let solution = solution(vec![
            entry("image_1.png", 10.0, 20.0),
            entry("other.png", 1.0, 1.0),
        ]);

        let violations = solution.validate(&expected);
        assert!(violations.iter().any(|v| v.contains("unknown image")));
        assert!(
            violations
                .iter()
                .any(|v| v.contains("missing entry for 'image_2.png'"))
        );
    }

    #[test]
    fn duplicate_entries_are_flagged_once_per_repeat() {
        let expected = images(&["image_1.png"]);
        let solution = solution(vec![
            entry("image_1.png", 10.0, 20.0),
            entry("image_1.png", 11.0, 21.0),
        ]);

        let violations = solution.validate(&expected);
        assert_eq!(
            violations
                .iter()
                .filter(|v| v.contains("duplicate entry"))
                .count(),
            1
        );
    }

    #[test]
    fn non_finite_and_non_positive_values_are_flagged() {
        let expected = images(&["image_1.png"]);
        let mut bad = entry("image_1.png", f64::NAN, 20.0);
        bad.radius = 0.0;
        let solution = solution(vec![bad]);

        let violations = solution.validate(&expected);
        assert!(violations.iter().any(|v| v.contains("finite")));
        assert!(violations.iter().any(|v| v.contains("radius must be > 0")));
    }

    #[test]
    fn unknown_fields_are_rejected_on_parse() {
        let raw = r#"{"circles": [], "extra": 1}"#;
        let err = serde_json::from_str::<Solution>(raw).expect_err("unknown field");
        assert!(err.to_string().contains("extra"));
    }

    #[test]
    fn entry_lookup_is_exact() {
        let solution = solution(vec![entry("image_1.png", 10.0, 20.0)]);
        assert!(solution.entry_for("image_1.png").is_some());
        assert!(solution.entry_for("image_1").is_none());
    }
}
