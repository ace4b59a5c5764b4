//! Stable exit codes for task CLI commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Command failed due to I/O, config, or other unexpected errors.
pub const ERROR: i32 = 1;
/// `solution.json` is missing, malformed, or violates task invariants.
pub const INVALID_SOLUTION: i32 = 2;
/// `task score` found a valid solution that does not meet the pass criteria.
pub const OUT_OF_TOLERANCE: i32 = 3;
