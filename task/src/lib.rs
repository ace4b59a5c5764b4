//! Center-circle task model and tooling.
//!
//! The task asks an agent to locate a target point in each input image (the
//! crosshair intersection, or the image center) and record one circle per
//! image in `solution.json`. This crate implements both sides of that
//! contract with a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (geometry, solution invariants,
//!   scoring). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (config files, PNG rendering,
//!   solution and ground-truth persistence, instruction documents).
//!
//! [`validate`] coordinates schema and invariant checking of solution files
//! for the CLI and for the grading harness.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod validate;
