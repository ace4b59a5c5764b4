//! Task configuration stored under `.task/config.toml`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::score::Criteria;

/// Task configuration (TOML).
///
/// This file is intended to be edited by humans and must remain stable and
/// automatable. Missing fields default to the standard three-image task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TaskConfig {
    /// Canvas width in pixels.
    pub width: u32,

    /// Canvas height in pixels.
    pub height: u32,

    /// Minimum distance from each edge when sampling targets.
    pub margin: u32,

    /// Input image filenames, graded in this order.
    pub images: Vec<String>,

    /// Fixed pixel tolerance for a prediction to count as correct.
    pub pixel_tolerance: f64,

    /// When true, every image must be correct for a run to pass.
    pub require_all_correct: bool,

    /// Fraction threshold applied when `require_all_correct` is false.
    pub min_fraction_correct: f64,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            margin: 8,
            images: vec![
                "image_1.png".to_string(),
                "image_2.png".to_string(),
                "image_3.png".to_string(),
            ],
            pixel_tolerance: 15.0,
            require_all_correct: true,
            min_fraction_correct: 0.9,
        }
    }
}

impl TaskConfig {
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(anyhow!("width and height must be > 0"));
        }
        if self.margin > self.width / 2 || self.margin > self.height / 2 {
            return Err(anyhow!(
                "margin {} leaves no room to sample targets on a {}x{} canvas",
                self.margin,
                self.width,
                self.height
            ));
        }
        if self.images.is_empty() {
            return Err(anyhow!("images must be a non-empty list"));
        }
        for (index, image) in self.images.iter().enumerate() {
            if image.trim().is_empty() {
                return Err(anyhow!("images[{index}] must be non-empty"));
            }
            if self.images.iter().position(|other| other == image) != Some(index) {
                return Err(anyhow!("duplicate image '{image}'"));
            }
        }
        if !self.pixel_tolerance.is_finite() || self.pixel_tolerance <= 0.0 {
            return Err(anyhow!("pixel_tolerance must be > 0"));
        }
        if !self.min_fraction_correct.is_finite()
            || self.min_fraction_correct <= 0.0
            || self.min_fraction_correct > 1.0
        {
            return Err(anyhow!("min_fraction_correct must be in (0, 1]"));
        }
        Ok(())
    }

    /// Pass criteria derived from this config.
    pub fn criteria(&self) -> Criteria {
        Criteria {
            pixel_tolerance: self.pixel_tolerance,
            require_all_correct: self.require_all_correct,
            min_fraction_correct: self.min_fraction_correct,
        }
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `TaskConfig::default()`.
pub fn load_config(path: &Path) -> Result<TaskConfig> {
    if !path.exists() {
        let cfg = TaskConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: TaskConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &TaskConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
