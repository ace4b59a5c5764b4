//! Solution file validation: JSON Schema conformance plus task invariants.
//!
//! A submission is checked in stages and the first failing stage is
//! reported: file presence, JSON well-formedness, schema conformance
//! (Draft 2020-12), then the semantic invariants of
//! [`crate::core::solution::Solution::validate`].

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use jsonschema::Draft;
use serde_json::Value;

use crate::core::solution::Solution;

const SOLUTION_SCHEMA: &str = include_str!("../../schemas/solution/v1.schema.json");

/// The embedded solution schema, written next to generated inputs so agents
/// can validate locally.
pub fn solution_schema() -> &'static str {
    SOLUTION_SCHEMA
}

/// Result of checking one solution file.
#[derive(Debug, Clone, PartialEq)]
pub enum SolutionCheck {
    /// No file at the expected path.
    Missing,
    /// Not parseable as JSON.
    Unreadable { message: String },
    /// Parseable JSON that does not conform to the schema.
    SchemaInvalid { violations: Vec<String> },
    /// Conformant shape with semantic invariant violations.
    InvariantViolations { violations: Vec<String> },
    /// Fully valid, ready to score.
    Valid { solution: Solution },
}

/// Check a solution file on disk against the schema and the task's image list.
///
/// Errors are reserved for unexpected I/O failures; every judgeable defect is
/// reported through [`SolutionCheck`].
pub fn check_solution_file(path: &Path, expected_images: &[String]) -> Result<SolutionCheck> {
    if !path.exists() {
        return Ok(SolutionCheck::Missing);
    }
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    check_solution_str(&raw, expected_images)
}

/// Check raw solution contents. See [`check_solution_file`].
pub fn check_solution_str(raw: &str, expected_images: &[String]) -> Result<SolutionCheck> {
    let instance: Value = match serde_json::from_str(raw) {
        Ok(instance) => instance,
        Err(err) => {
            return Ok(SolutionCheck::Unreadable {
                message: err.to_string(),
            });
        }
    };

    let violations = validate_schema(&instance)?;
    if !violations.is_empty() {
        return Ok(SolutionCheck::SchemaInvalid { violations });
    }

    let solution: Solution = match serde_json::from_value(instance) {
        Ok(solution) => solution,
        Err(err) => {
            return Ok(SolutionCheck::Unreadable {
                message: err.to_string(),
            });
        }
    };

    let violations = solution.validate(expected_images);
    if !violations.is_empty() {
        return Ok(SolutionCheck::InvariantViolations { violations });
    }

    Ok(SolutionCheck::Valid { solution })
}

/// Validate a JSON instance against the embedded schema (Draft 2020-12).
fn validate_schema(instance: &Value) -> Result<Vec<String>> {
    let schema: Value = serde_json::from_str(SOLUTION_SCHEMA).context("parse solution schema")?;
    let compiled = jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(&schema)
        .context("compile solution schema")?;
    Ok(compiled
        .iter_errors(instance)
        .map(|err| err.to_string())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::images;

    fn expected() -> Vec<String> {
        images(&["image_1.png", "image_2.png"])
    }

    #[test]
    fn valid_solution_parses() {
        let raw = r#"{
            "circles": [
                {"image": "image_1.png", "x": 256.0, "y": 256.0, "radius": 20.0},
                {"image": "image_2.png", "x": 10.0, "y": 12.0, "radius": 5.5}
            ]
        }"#;
        let check = check_solution_str(raw, &expected()).expect("check");
        match check {
            SolutionCheck::Valid { solution } => assert_eq!(solution.circles.len(), 2),
            other => panic!("expected valid, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_reported() {
        let temp = tempfile::tempdir().expect("tempdir");
        let check =
            check_solution_file(&temp.path().join("solution.json"), &expected()).expect("check");
        assert_eq!(check, SolutionCheck::Missing);
    }

    #[test]
    fn malformed_json_is_unreadable() {
        let check = check_solution_str("{not json", &expected()).expect("check");
        assert!(matches!(check, SolutionCheck::Unreadable { .. }));
    }

    #[test]
    fn schema_rejects_missing_fields_and_bad_radius() {
        let raw = r#"{"circles": [{"image": "image_1.png", "x": 1.0, "y": 2.0}]}"#;
        let check = check_solution_str(raw, &expected()).expect("check");
        assert!(matches!(check, SolutionCheck::SchemaInvalid { .. }));

        let raw =
            r#"{"circles": [{"image": "image_1.png", "x": 1.0, "y": 2.0, "radius": 0.0}]}"#;
        let check = check_solution_str(raw, &expected()).expect("check");
        match check {
            SolutionCheck::SchemaInvalid { violations } => {
                assert!(!violations.is_empty());
            }
            other => panic!("expected schema violations, got {other:?}"),
        }
    }

    #[test]
    fn schema_rejects_unknown_fields() {
        let raw = r#"{
            "circles": [
                {"image": "image_1.png", "x": 1.0, "y": 2.0, "radius": 3.0, "score": 1}
            ]
        }"#;
        let check = check_solution_str(raw, &expected()).expect("check");
        assert!(matches!(check, SolutionCheck::SchemaInvalid { .. }));
    }

    #[test]
    fn invariants_catch_incomplete_coverage() {
        let raw = r#"{"circles": [{"image": "image_1.png", "x": 1.0, "y": 2.0, "radius": 3.0}]}"#;
        let check = check_solution_str(raw, &expected()).expect("check");
        match check {
            SolutionCheck::InvariantViolations { violations } => {
                assert!(violations.iter().any(|v| v.contains("image_2.png")));
            }
            other => panic!("expected invariant violations, got {other:?}"),
        }
    }
}
