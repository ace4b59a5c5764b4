//! Solution file persistence.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::core::solution::Solution;

pub fn load_solution(path: &Path) -> Result<Solution> {
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parse {}", path.display()))
}

/// Serialize to pretty-printed JSON with trailing newline.
pub fn write_solution(path: &Path, solution: &Solution) -> Result<()> {
    let mut payload = serde_json::to_string_pretty(solution).context("serialize solution")?;
    payload.push('\n');
    fs::write(path, payload).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
