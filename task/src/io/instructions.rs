//! Task instruction documents rendered per variant.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use minijinja::{Environment, context};

use crate::core::target::Variant;
use crate::io::config::TaskConfig;

const CROSSHAIR_TEMPLATE: &str = include_str!("templates/instructions_crosshair.md");
const CENTERING_TEMPLATE: &str = include_str!("templates/instructions_centering.md");

/// Template engine wrapper around minijinja.
struct InstructionEngine {
    env: Environment<'static>,
}

impl InstructionEngine {
    fn new() -> Self {
        let mut env = Environment::new();
        env.add_template("crosshair", CROSSHAIR_TEMPLATE)
            .expect("crosshair template should be valid");
        env.add_template("centering", CENTERING_TEMPLATE)
            .expect("centering template should be valid");
        Self { env }
    }

    fn render(&self, cfg: &TaskConfig, variant: Variant) -> Result<String> {
        let template = self.env.get_template(variant.as_str())?;
        let rendered = template.render(context! {
            images => cfg.images.clone(),
            width => cfg.width,
            height => cfg.height,
        })?;
        Ok(rendered)
    }
}

/// Render the instruction document for a variant.
pub fn render_instructions(cfg: &TaskConfig, variant: Variant) -> Result<String> {
    InstructionEngine::new().render(cfg, variant)
}

/// Write `INSTRUCTIONS.md` under `root` and return its path.
pub fn write_instructions(root: &Path, cfg: &TaskConfig, variant: Variant) -> Result<PathBuf> {
    let path = root.join("INSTRUCTIONS.md");
    let mut contents = render_instructions(cfg, variant)?;
    if !contents.ends_with('\n') {
        contents.push('\n');
    }
    fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}
