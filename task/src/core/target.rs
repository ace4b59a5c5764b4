//! Ground-truth targets and task variants.

use std::str::FromStr;

use anyhow::{Error, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::geometry::Point;

/// Which version of the task is being run.
///
/// Both variants share the `solution.json` contract; they differ in how the
/// true target is defined and in the rules given to the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Inputs carry a crosshair; the target is its intersection, recorded in
    /// `targets.json`.
    Crosshair,
    /// Inputs are blank; the target is the image center and the agent must
    /// not open the input images.
    Centering,
}

impl Variant {
    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Crosshair => "crosshair",
            Variant::Centering => "centering",
        }
    }
}

impl FromStr for Variant {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "crosshair" => Ok(Variant::Crosshair),
            "centering" => Ok(Variant::Centering),
            other => Err(anyhow!(
                "unknown variant '{other}' (expected 'crosshair' or 'centering')"
            )),
        }
    }
}

/// Ground truth for a set of input images, serialized as `targets.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TargetSet {
    pub targets: Vec<Target>,
}

/// True target point for one input image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Target {
    pub image: String,
    pub x: f64,
    pub y: f64,
}

impl TargetSet {
    pub fn lookup(&self, image: &str) -> Option<Point> {
        self.targets
            .iter()
            .find(|target| target.image == image)
            .map(|target| Point::new(target.x, target.y))
    }
}
