//! Ground-truth persistence and truth resolution for scoring.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::warn;

use crate::core::geometry::Point;
use crate::core::score::ImageTruth;
use crate::core::target::TargetSet;
use crate::io::render::probe_dimensions;

pub fn load_targets(path: &Path) -> Result<TargetSet> {
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parse {}", path.display()))
}

/// Load `targets.json` if present. Centering tasks carry no ground truth
/// file, so a missing file is not an error.
pub fn load_targets_optional(path: &Path) -> Result<Option<TargetSet>> {
    if !path.exists() {
        return Ok(None);
    }
    load_targets(path).map(Some)
}

pub fn write_targets(path: &Path, targets: &TargetSet) -> Result<()> {
    let mut payload = serde_json::to_string_pretty(targets).context("serialize targets")?;
    payload.push('\n');
    fs::write(path, payload).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Resolve the true target for every input image.
///
/// Per image: a recorded ground-truth point wins; otherwise the image center,
/// read from the PNG header. Images missing from disk resolve to `None` and
/// score incorrect rather than failing the run.
pub fn resolve_truths(
    input_dir: &Path,
    images: &[String],
    targets: Option<&TargetSet>,
) -> Result<Vec<ImageTruth>> {
    let mut truths = Vec::with_capacity(images.len());
    for image in images {
        let path = input_dir.join(image);
        if !path.exists() {
            warn!(image, "input image missing; counted incorrect");
            truths.push(ImageTruth {
                image: image.clone(),
                target: None,
            });
            continue;
        }

        let target = match targets.and_then(|set| set.lookup(image)) {
            Some(point) => Some(point),
            None => match probe_dimensions(&path) {
                Ok((width, height)) => Some(Point::canvas_center(width, height)),
                Err(err) => {
                    warn!(image, error = %err, "unreadable input; counted incorrect");
                    None
                }
            },
        };

        truths.push(ImageTruth {
            image: image.clone(),
            target,
        });
    }
    Ok(truths)
}
