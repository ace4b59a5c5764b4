//! Solver execution inside the attempt workspace.
//!
//! Runs the case's solver command with a wall-clock timeout and captured,
//! size-limited output. The combined log is written to the results
//! directory; the grader never inspects solver output beyond recording it.

use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::{debug, warn};
use wait_timeout::ChildExt;

/// Limits for solver execution.
#[derive(Debug, Clone, Copy)]
pub struct SolverLimits {
    /// Maximum time before killing the solver.
    pub timeout: Duration,
    /// Maximum bytes to capture from stdout/stderr.
    pub output_limit_bytes: usize,
}

impl SolverLimits {
    /// Default limits: 300s timeout, 100KB output.
    pub fn default_limits() -> Self {
        Self {
            timeout: Duration::from_secs(300),
            output_limit_bytes: 100_000,
        }
    }
}

/// Outcome of one solver run.
#[derive(Debug, Clone)]
pub struct SolverRun {
    pub exit_code: Option<i32>,
    pub timed_out: bool,
    pub stdout_truncated: bool,
    pub stderr_truncated: bool,
}

impl SolverRun {
    pub fn completed(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}

/// Run the solver command in the workspace and write its combined log.
pub fn run_solver(
    cmd: &[String],
    env_overrides: &BTreeMap<String, String>,
    workspace_root: &Path,
    limits: SolverLimits,
    log_path: &Path,
) -> Result<SolverRun> {
    if cmd.is_empty() {
        bail!("solver command must be non-empty");
    }

    let mut command = Command::new(&cmd[0]);
    command
        .args(&cmd[1..])
        .current_dir(workspace_root)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    for (key, value) in env_overrides {
        command.env(key, value);
    }

    let mut child = command
        .spawn()
        .with_context(|| format!("spawn solver {:?}", cmd))?;

    let mut timed_out = false;
    let status = match child.wait_timeout(limits.timeout)? {
        Some(status) => status,
        None => {
            timed_out = true;
            child.kill().ok();
            child.wait().context("wait after kill")?
        }
    };

    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    if let Some(mut out) = child.stdout.take() {
        out.read_to_end(&mut stdout).context("read stdout")?;
    }
    if let Some(mut err) = child.stderr.take() {
        err.read_to_end(&mut stderr).context("read stderr")?;
    }

    let stdout_truncated = truncate_output(&mut stdout, limits.output_limit_bytes);
    let stderr_truncated = truncate_output(&mut stderr, limits.output_limit_bytes);

    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let mut combined = stdout;
    combined.extend_from_slice(&stderr);
    fs::write(log_path, combined)
        .with_context(|| format!("write log {}", log_path.display()))?;

    let exit_code = status.code();
    if timed_out {
        warn!(cmd = ?cmd, "solver timed out");
    } else {
        debug!(cmd = ?cmd, exit_code = ?exit_code, "solver finished");
    }

    Ok(SolverRun {
        exit_code,
        timed_out,
        stdout_truncated,
        stderr_truncated,
    })
}

fn truncate_output(buf: &mut Vec<u8>, limit: usize) -> bool {
    if buf.len() > limit {
        buf.truncate(limit);
        return true;
    }
    false
}
