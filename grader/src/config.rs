//! Task configuration merging.
//!
//! Applies case-specific overrides to the default task configuration.

use anyhow::Result;
use task::io::config::TaskConfig;

use crate::case::CaseFile;

/// Apply case overrides to the base task config.
pub fn apply_case_config(mut base: TaskConfig, case: &CaseFile) -> Result<TaskConfig> {
    if let Some(width) = case.inputs.width {
        base.width = width;
    }
    if let Some(height) = case.inputs.height {
        base.height = height;
    }
    if let Some(margin) = case.inputs.margin {
        base.margin = margin;
    }
    if let Some(images) = &case.inputs.images {
        base.images = images.clone();
    }
    if let Some(pixel_tolerance) = case.criteria.pixel_tolerance {
        base.pixel_tolerance = pixel_tolerance;
    }
    if let Some(require_all_correct) = case.criteria.require_all_correct {
        base.require_all_correct = require_all_correct;
    }
    if let Some(min_fraction_correct) = case.criteria.min_fraction_correct {
        base.min_fraction_correct = min_fraction_correct;
    }
    base.validate()?;
    Ok(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::{CaseMeta, CriteriaOverrides, HintConfig, InputOverrides};
    use task::core::target::Variant;

    fn case_with(inputs: InputOverrides, criteria: CriteriaOverrides) -> CaseFile {
        CaseFile {
            case: CaseMeta {
                id: "case".to_string(),
                variant: Variant::Crosshair,
                description: String::new(),
            },
            inputs,
            criteria,
            hints: HintConfig::default(),
            solver: None,
        }
    }

    #[test]
    fn preserves_defaults_when_no_overrides() {
        let base = TaskConfig::default();
        let case = case_with(InputOverrides::default(), CriteriaOverrides::default());
        let merged = apply_case_config(base.clone(), &case).expect("merge");
        assert_eq!(merged, base);
    }

    #[test]
    fn applies_overrides() {
        let case = case_with(
            InputOverrides {
                width: Some(256),
                height: Some(128),
                ..InputOverrides::default()
            },
            CriteriaOverrides {
                pixel_tolerance: Some(5.0),
                ..CriteriaOverrides::default()
            },
        );
        let merged = apply_case_config(TaskConfig::default(), &case).expect("merge");
        assert_eq!(merged.width, 256);
        assert_eq!(merged.height, 128);
        assert_eq!(merged.pixel_tolerance, 5.0);
    }

    #[test]
    fn rejects_invalid_merged_config() {
        let case = case_with(
            InputOverrides {
                width: Some(4),
                ..InputOverrides::default()
            },
            CriteriaOverrides::default(),
        );
        let err = apply_case_config(TaskConfig::default(), &case).expect_err("invalid merge");
        assert!(err.to_string().contains("margin"));
    }
}
