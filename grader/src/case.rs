//! Case file parsing and validation.
//!
//! Cases are TOML files defining a task variant, input overrides, pass
//! criteria, and the optional solver command. See `grader/cases/` for
//! examples.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;

use task::core::target::Variant;

/// A parsed case file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CaseFile {
    pub case: CaseMeta,
    #[serde(default)]
    pub inputs: InputOverrides,
    #[serde(default)]
    pub criteria: CriteriaOverrides,
    #[serde(default)]
    pub hints: HintConfig,
    pub solver: Option<SolverConfig>,
}

/// Case metadata: identifier, variant, and a short description.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CaseMeta {
    /// Unique identifier (slug format: `[a-z0-9_-]+`).
    pub id: String,
    /// Task variant to generate and grade.
    pub variant: Variant,
    #[serde(default)]
    pub description: String,
}

/// Input generation overrides for the case.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct InputOverrides {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub margin: Option<u32>,
    pub images: Option<Vec<String>>,
}

/// Pass criteria overrides for the case.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct CriteriaOverrides {
    pub pixel_tolerance: Option<f64>,
    pub require_all_correct: Option<bool>,
    pub min_fraction_correct: Option<f64>,
}

/// Hint budget configuration for graded human sessions.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct HintConfig {
    /// Total prompts permitted across the whole session.
    pub max_prompts: u32,
}

impl Default for HintConfig {
    fn default() -> Self {
        Self { max_prompts: 15 }
    }
}

/// External solver command run inside the attempt workspace.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SolverConfig {
    /// Command to run (e.g., `["python3", "solve.py"]`).
    pub command: Vec<String>,
    /// Wall-clock timeout in seconds (default 300).
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl CaseFile {
    /// Load and validate a case file from the given path.
    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("read case {}", path.display()))?;
        let case: CaseFile =
            toml::from_str(&contents).with_context(|| format!("parse case {}", path.display()))?;
        case.validate()
            .with_context(|| format!("validate case {}", path.display()))?;
        Ok(case)
    }

    #[cfg(test)]
    pub fn parse_str(contents: &str) -> Result<Self> {
        let case: CaseFile = toml::from_str(contents).context("parse case")?;
        case.validate()?;
        Ok(case)
    }

    fn validate(&self) -> Result<()> {
        validate_case_id(&self.case.id)?;
        if self.hints.max_prompts == 0 {
            bail!("hints.max_prompts must be > 0");
        }
        if let Some(images) = &self.inputs.images
            && images.is_empty()
        {
            bail!("inputs.images must be non-empty when set");
        }
        if let Some(solver) = &self.solver {
            if solver.command.is_empty() || solver.command[0].trim().is_empty() {
                bail!("solver.command must be a non-empty array");
            }
            if solver.timeout_secs == Some(0) {
                bail!("solver.timeout_secs must be > 0");
            }
            for (key, value) in &solver.env {
                if key.trim().is_empty() {
                    bail!("solver.env key must be non-empty");
                }
                if value.is_empty() {
                    bail!("solver.env {} must be non-empty", key);
                }
            }
        }
        Ok(())
    }
}

/// Discover and load all case files from a directory.
///
/// Returns cases sorted by id. Errors if duplicate ids are found.
pub fn discover_cases(dir: &Path) -> Result<Vec<CaseFile>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut cases = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read cases dir {}", dir.display()))? {
        let entry = entry.context("read case entry")?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("toml") {
            continue;
        }
        cases.push(CaseFile::load(&path)?);
    }
    cases.sort_by(|left, right| left.case.id.cmp(&right.case.id));
    for pair in cases.windows(2) {
        if pair[0].case.id == pair[1].case.id {
            return Err(anyhow!("duplicate case.id {}", pair[0].case.id));
        }
    }
    Ok(cases)
}

fn validate_case_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        bail!("case.id must be non-empty");
    }
    if id.contains('/') || id.contains('\\') {
        bail!("case.id must not contain path separators");
    }
    if id.contains("..") {
        bail!("case.id must not contain '..'");
    }
    if !id
        .chars()
        .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' || ch == '_')
    {
        bail!("case.id must use [a-z0-9_-] only");
    }
    Ok(())
}
