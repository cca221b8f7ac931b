//! Process-wide tunables read once from the environment.

use std::sync::OnceLock;

fn parse_env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

static MULTI_MAX_DEPTH: OnceLock<usize> = OnceLock::new();

/// Maximum recursion depth of the generic multi-barcode reader
pub(crate) fn multi_max_depth() -> usize {
    *MULTI_MAX_DEPTH.get_or_init(|| parse_env_usize("BARCODE_MULTI_MAX_DEPTH", 4).clamp(0, 8))
}

static MULTI_MIN_DIMENSION: OnceLock<usize> = OnceLock::new();

/// Smallest remaining region (in pixels) the multi-barcode reader recurses into
pub(crate) fn multi_min_dimension() -> usize {
    *MULTI_MIN_DIMENSION
        .get_or_init(|| parse_env_usize("BARCODE_MULTI_MIN_DIMENSION", 100).clamp(16, 1024))
}

static SAMPLE_RADIUS: OnceLock<usize> = OnceLock::new();

/// Neighbourhood radius used by `DefaultGridSampler::default()`
pub(crate) fn sample_radius() -> usize {
    *SAMPLE_RADIUS.get_or_init(|| parse_env_usize("BARCODE_SAMPLE_RADIUS", 0).clamp(0, 3))
}
