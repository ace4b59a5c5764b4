//! Pure, deterministic task logic.
//!
//! Modules here must not perform I/O. They define the solution data model,
//! the scoring rules, and the geometry they share.

pub mod geometry;
pub mod score;
pub mod solution;
pub mod target;
