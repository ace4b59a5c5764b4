//! Test-only helpers for constructing solutions, truths, and task dirs.

use std::path::Path;

use anyhow::Result;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::core::score::ImageTruth;
use crate::core::solution::{CircleEntry, Solution};
use crate::core::target::{Target, TargetSet, Variant};
use crate::io::config::TaskConfig;
use crate::io::render::generate_inputs;
use crate::io::target::write_targets;

/// Create an entry with a fixed, positive radius.
pub fn entry(image: &str, x: f64, y: f64) -> CircleEntry {
    CircleEntry {
        image: image.to_string(),
        x,
        y,
        radius: 20.0,
    }
}

pub fn solution(circles: Vec<CircleEntry>) -> Solution {
    Solution { circles }
}

pub fn images(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

/// Resolved truths with known targets.
pub fn truths(pairs: &[(&str, f64, f64)]) -> Vec<ImageTruth> {
    pairs
        .iter()
        .map(|(image, x, y)| ImageTruth {
            image: image.to_string(),
            target: Some(crate::core::geometry::Point::new(*x, *y)),
        })
        .collect()
}

pub fn target_set(pairs: &[(&str, f64, f64)]) -> TargetSet {
    TargetSet {
        targets: pairs
            .iter()
            .map(|(image, x, y)| Target {
                image: image.to_string(),
                x: *x,
                y: *y,
            })
            .collect(),
    }
}

/// A temp directory populated with generated inputs for one variant.
///
/// Crosshair dirs also get `input/targets.json`, matching `task generate`.
pub struct TaskDir {
    temp: tempfile::TempDir,
    pub targets: Option<TargetSet>,
}

impl TaskDir {
    pub fn generate(config: &TaskConfig, variant: Variant, seed: u64) -> Result<Self> {
        let temp = tempfile::tempdir()?;
        let input_dir = temp.path().join("input");
        let mut rng = StdRng::seed_from_u64(seed);
        let targets = generate_inputs(&input_dir, config, variant, &mut rng)?;
        if let Some(targets) = &targets {
            write_targets(&input_dir.join("targets.json"), targets)?;
        }
        Ok(Self { temp, targets })
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn input_dir(&self) -> std::path::PathBuf {
        self.temp.path().join("input")
    }
}
