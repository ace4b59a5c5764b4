//! Input image generation and overlay rendering.
//!
//! Crosshair inputs are white canvases with one full-length horizontal and
//! one full-length vertical line meeting at the target pixel. Overlays are
//! circle outlines drawn onto a copy of an input: red for ground truth,
//! blue for predictions (the agent-facing self-check rendering).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use image::{Rgb, RgbImage};
use rand::Rng;
use tracing::debug;

use crate::core::geometry::{Point, center_error};
use crate::core::target::{Target, TargetSet, Variant};
use crate::io::config::TaskConfig;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const CROSSHAIR: Rgb<u8> = Rgb([200, 200, 200]);
const TRUTH_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const PREDICTION_COLOR: Rgb<u8> = Rgb([0, 0, 255]);

/// Ground-truth overlay geometry, fixed across variants.
const TRUTH_RADIUS: f64 = 10.0;
const OVERLAY_STROKE: f64 = 3.0;

/// Generate input images under `input_dir` and return the ground truth.
///
/// Crosshair inputs sample one target per image uniformly within the margin;
/// centering inputs are blank and carry no ground truth file.
pub fn generate_inputs<R: Rng>(
    input_dir: &Path,
    cfg: &TaskConfig,
    variant: Variant,
    rng: &mut R,
) -> Result<Option<TargetSet>> {
    cfg.validate()?;
    std::fs::create_dir_all(input_dir)
        .with_context(|| format!("create input dir {}", input_dir.display()))?;

    match variant {
        Variant::Crosshair => {
            let mut targets = Vec::with_capacity(cfg.images.len());
            for image in &cfg.images {
                let tx = rng.gen_range(cfg.margin..=cfg.width - cfg.margin);
                let ty = rng.gen_range(cfg.margin..=cfg.height - cfg.margin);
                let canvas = crosshair_image(cfg.width, cfg.height, tx, ty);
                let path = input_dir.join(image);
                save_png(&canvas, &path)?;
                debug!(image, tx, ty, "wrote crosshair input");
                targets.push(Target {
                    image: image.clone(),
                    x: f64::from(tx),
                    y: f64::from(ty),
                });
            }
            Ok(Some(TargetSet { targets }))
        }
        Variant::Centering => {
            for image in &cfg.images {
                let canvas = blank_image(cfg.width, cfg.height);
                save_png(&canvas, &input_dir.join(image))?;
                debug!(image, "wrote blank input");
            }
            Ok(None)
        }
    }
}

/// Write `_gt` overlays next to `out_dir` for every target.
///
/// Source images are read from `input_dir`; `out_dir` may differ so the
/// harness can withhold overlays from the attempt workspace.
pub fn write_truth_overlays(input_dir: &Path, out_dir: &Path, targets: &TargetSet) -> Result<()> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("create overlay dir {}", out_dir.display()))?;
    for target in &targets.targets {
        let src = input_dir.join(&target.image);
        let dst = out_dir.join(overlay_name(&target.image, "_gt")?);
        circle_overlay(
            &src,
            &dst,
            Point::new(target.x, target.y),
            TRUTH_RADIUS,
            TRUTH_COLOR,
        )?;
    }
    Ok(())
}

/// Write a `_pred` overlay for one predicted circle.
pub fn write_prediction_overlay(
    input_dir: &Path,
    out_dir: &Path,
    image: &str,
    center: Point,
    radius: f64,
) -> Result<PathBuf> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("create overlay dir {}", out_dir.display()))?;
    let src = input_dir.join(image);
    let dst = out_dir.join(overlay_name(image, "_pred")?);
    circle_overlay(&src, &dst, center, radius, PREDICTION_COLOR)?;
    Ok(dst)
}

/// Read image dimensions from the file header without decoding pixels.
pub fn probe_dimensions(path: &Path) -> Result<(u32, u32)> {
    image::image_dimensions(path).with_context(|| format!("probe dimensions {}", path.display()))
}

pub fn crosshair_image(width: u32, height: u32, tx: u32, ty: u32) -> RgbImage {
    let mut canvas = blank_image(width, height);
    for x in 0..width {
        canvas.put_pixel(x, ty, CROSSHAIR);
    }
    for y in 0..height {
        canvas.put_pixel(tx, y, CROSSHAIR);
    }
    canvas
}

pub fn blank_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_pixel(width, height, BACKGROUND)
}

/// Derive an overlay filename: `image_1.png` + `_gt` -> `image_1_gt.png`.
pub fn overlay_name(image: &str, suffix: &str) -> Result<String> {
    let path = Path::new(image);
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| anyhow!("image name '{image}' has no stem"))?;
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("png");
    Ok(format!("{stem}{suffix}.{ext}"))
}

fn circle_overlay(
    src: &Path,
    dst: &Path,
    center: Point,
    radius: f64,
    color: Rgb<u8>,
) -> Result<()> {
    let mut canvas = image::open(src)
        .with_context(|| format!("open {}", src.display()))?
        .to_rgb8();
    draw_circle_outline(&mut canvas, center, radius, OVERLAY_STROKE, color);
    save_png(&canvas, dst)
}

/// Paint pixels within half a stroke of the ideal circle; pixels outside the
/// canvas are clipped.
fn draw_circle_outline(
    canvas: &mut RgbImage,
    center: Point,
    radius: f64,
    stroke: f64,
    color: Rgb<u8>,
) {
    let half = stroke / 2.0;
    let (width, height) = canvas.dimensions();
    let min_x = (center.x - radius - half).floor().max(0.0) as u32;
    let max_x = ((center.x + radius + half).ceil() as i64).min(i64::from(width) - 1);
    let min_y = (center.y - radius - half).floor().max(0.0) as u32;
    let max_y = ((center.y + radius + half).ceil() as i64).min(i64::from(height) - 1);
    if max_x < 0 || max_y < 0 {
        return;
    }

    for y in min_y..=max_y as u32 {
        for x in min_x..=max_x as u32 {
            let distance = center_error(Point::new(f64::from(x), f64::from(y)), center);
            if (distance - radius).abs() <= half {
                canvas.put_pixel(x, y, color);
            }
        }
    }
}

fn save_png(canvas: &RgbImage, path: &Path) -> Result<()> {
    canvas
        .save(path)
        .with_context(|| format!("write {}", path.display()))
}
