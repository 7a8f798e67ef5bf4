//! Simulated compression model.
//!
//! No pixels are touched: output sizes are derived arithmetically from the
//! input size and the chosen options.

use serde::Serialize;
use crate::core::{CompressionMode, CompressionOptions, QualityScore};
use crate::utils::{bytes_to_mb, round2};

/// Assumed size of a single image whose byte length is unknown
pub const UNKNOWN_SINGLE_SIZE_MB: f64 = 2.5;
/// Assumed size of a batch item whose byte length is unknown
pub const UNKNOWN_BATCH_SIZE_MB: f64 = 1.0;
/// Fraction of the size kept in lossless mode
pub const LOSSLESS_RETENTION: f64 = 0.7;
/// Smallest compressed size a batch item can report
pub const MIN_COMPRESSED_MB: f64 = 0.01;
pub const MIN_BATCH_RATIO: u8 = 5;
pub const MAX_BATCH_RATIO: u8 = 95;

/// Outcome of compressing one image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Estimate {
    pub original_size_mb: f64,
    pub compressed_size_mb: f64,
    /// Percentage size reduction
    pub compression_ratio: u8,
    pub quality_score: QualityScore,
}

/// Fraction of the original size kept for the given options.
pub fn retention(options: &CompressionOptions) -> f64 {
    match options.mode {
        CompressionMode::Lossy => options.quality_factor(),
        CompressionMode::Lossless => LOSSLESS_RETENTION,
    }
}

fn ratio_of(kept_fraction: f64) -> f64 {
    (100.0 * (1.0 - kept_fraction)).round()
}

/// Single-image flow: unknown sizes count as 2.5 MB and the ratio is not clamped.
pub fn estimate_single(size_bytes: Option<u64>, options: &CompressionOptions) -> Estimate {
    let original = size_bytes.map(bytes_to_mb).unwrap_or(UNKNOWN_SINGLE_SIZE_MB);
    let kept = retention(options);

    Estimate {
        original_size_mb: original,
        compressed_size_mb: round2(original * kept),
        compression_ratio: ratio_of(kept).clamp(0.0, 100.0) as u8,
        quality_score: QualityScore::from_quality(options.quality),
    }
}

/// Batch flow: unknown or zero sizes count as 1 MB, the compressed size is
/// floored at 0.01 MB and the ratio is clamped into 5..=95.
pub fn estimate_batch_item(original_size_mb: Option<f64>, options: &CompressionOptions) -> Estimate {
    let original = original_size_mb
        .filter(|mb| mb.is_finite() && *mb > 0.0)
        .unwrap_or(UNKNOWN_BATCH_SIZE_MB);
    let compressed = (original * retention(options)).max(MIN_COMPRESSED_MB);
    let ratio = ratio_of(compressed / original)
        .clamp(MIN_BATCH_RATIO as f64, MAX_BATCH_RATIO as f64);

    Estimate {
        original_size_mb: original,
        compressed_size_mb: round2(compressed),
        compression_ratio: ratio as u8,
        quality_score: QualityScore::from_quality(options.quality),
    }
}

/// Ratio reported when the measured one is unusable.
pub fn fallback_ratio(quality: u8) -> u8 {
    MIN_BATCH_RATIO.max(100u8.saturating_sub(quality))
}

/// Whole-batch ratio from summed sizes.
///
/// Falls back to [`fallback_ratio`] when the original total is zero or the
/// measured ratio is not positive.
pub fn aggregate_ratio(total_original_mb: f64, total_compressed_mb: f64, quality: u8) -> u8 {
    if total_original_mb <= 0.0 {
        return fallback_ratio(quality);
    }
    let ratio = ratio_of(total_compressed_mb / total_original_mb);
    if ratio <= 0.0 {
        fallback_ratio(quality)
    } else {
        ratio.min(100.0) as u8
    }
}
