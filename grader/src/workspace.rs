//! Attempt workspace creation.
//!
//! Each grading run gets an isolated directory seeded with generated inputs
//! and the instruction document. Ground truth is never written here; the
//! harness keeps it and captures it into the results directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use rand::{Rng, distributions::Alphanumeric};
use tracing::debug;

use task::core::target::{TargetSet, Variant};
use task::io::config::{TaskConfig, write_config};
use task::io::instructions::write_instructions;
use task::io::render::generate_inputs;

/// An isolated workspace for grading one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    /// Absolute path to the workspace root.
    pub root: PathBuf,
    /// Workspace directory name (includes case id, timestamp, and random suffix).
    pub name: String,
}

/// Create an attempt workspace for a case.
///
/// The workspace contains `input/` images, `.task/config.toml`,
/// `INSTRUCTIONS.md`, and a `README.txt` with case metadata. The returned
/// ground truth (crosshair variant only) is withheld from the workspace.
pub fn create_workspace(
    base_dir: &Path,
    case_id: &str,
    cfg: &TaskConfig,
    variant: Variant,
) -> Result<(Workspace, Option<TargetSet>)> {
    fs::create_dir_all(base_dir)
        .with_context(|| format!("create workspace dir {}", base_dir.display()))?;

    let timestamp = generate_timestamp();
    let short_id = generate_short_id();
    let name = build_workspace_name(case_id, &timestamp, &short_id);
    let root = base_dir.join(&name);
    fs::create_dir_all(&root)
        .with_context(|| format!("create workspace root {}", root.display()))?;

    let mut rng = rand::thread_rng();
    let targets = generate_inputs(&root.join("input"), cfg, variant, &mut rng)
        .context("generate workspace inputs")?;

    write_config(&root.join(".task").join("config.toml"), cfg).context("write workspace config")?;
    write_instructions(&root, cfg, variant).context("write workspace instructions")?;

    let seed = format!("case_id: {case_id}\ncreated_at: {timestamp}\n");
    fs::write(root.join("README.txt"), seed)
        .with_context(|| format!("write seed {}", root.display()))?;

    debug!(workspace = %root.display(), "workspace created");
    Ok((Workspace { root, name }, targets))
}

pub fn build_workspace_name(case_id: &str, timestamp: &str, short_id: &str) -> String {
    format!("{case_id}_{timestamp}_{short_id}")
}

fn generate_timestamp() -> String {
    Utc::now().format("%Y%m%d_%H%M%S").to_string()
}

fn generate_short_id() -> String {
    let mut rng = rand::thread_rng();
    std::iter::repeat_with(|| rng.sample(Alphanumeric))
        .map(char::from)
        .take(6)
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn workspace_name_uses_expected_format() {
        let name = build_workspace_name("case", "20260806_120000", "abc123");
        assert_eq!(name, "case_20260806_120000_abc123");
    }

    #[test]
    fn creates_seeded_crosshair_workspace_without_ground_truth() {
        let temp = tempdir().expect("tempdir");
        let cfg = TaskConfig::default();

        let (workspace, targets) =
            create_workspace(temp.path(), "case", &cfg, Variant::Crosshair).expect("workspace");

        assert!(workspace.root.join("README.txt").is_file());
        assert!(workspace.root.join("INSTRUCTIONS.md").is_file());
        assert!(workspace.root.join(".task/config.toml").is_file());
        for image in &cfg.images {
            assert!(workspace.root.join("input").join(image).is_file());
        }

        // Ground truth stays with the harness.
        assert!(!workspace.root.join("input/targets.json").exists());
        assert!(targets.is_some());
    }

    #[test]
    fn centering_workspace_has_no_targets() {
        let temp = tempdir().expect("tempdir");
        let cfg = TaskConfig::default();

        let (_, targets) =
            create_workspace(temp.path(), "case", &cfg, Variant::Centering).expect("workspace");
        assert!(targets.is_none());
    }
}
