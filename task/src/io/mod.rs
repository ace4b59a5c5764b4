//! Side-effecting task operations: config files, rendering, persistence.

pub mod config;
pub mod instructions;
pub mod render;
pub mod solution;
pub mod target;
