//! Detector support shared by symbol readers
//!
//! Symbol detectors locate a code's corners themselves; this module turns
//! those corners into a rectified grid of modules.

/// Perspective-corrected sampling of module grids
pub mod grid_sampler;

pub use grid_sampler::{DefaultGridSampler, GridSampler, check_and_nudge_points};
