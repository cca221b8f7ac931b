//! Utility functions for image processing
//!
//! - Pixel format conversion (12 packed layouts to luminance)
//! - Geometry (perspective transforms between quadrilaterals)

pub mod geometry;
pub mod grayscale;
