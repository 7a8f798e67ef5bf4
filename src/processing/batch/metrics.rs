use std::time::Duration;
use serde::Serialize;
use tracing::debug;
use crate::core::ProcessingItem;
use crate::processing::optimizer::aggregate_ratio;
use crate::utils::{format_duration, format_mb, round2};

/// Aggregate statistics of a finished batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStats {
    /// Items selected for the run
    pub total_count: usize,
    pub completed_count: usize,
    pub total_original_mb: f64,
    pub total_compressed_mb: f64,
    /// Overall percentage size reduction, 0 when nothing completed
    pub compression_ratio: u8,
    pub elapsed: Duration,
}

impl BatchStats {
    /// Sums the completed items of `items`.
    ///
    /// `quality` feeds the ratio fallback when the measured ratio is unusable.
    pub fn collect(items: &[ProcessingItem], quality: u8, elapsed: Duration) -> Self {
        let completed: Vec<&ProcessingItem> = items.iter().filter(|i| i.is_completed()).collect();
        let total_original: f64 = completed.iter().map(|i| i.original_size_mb.unwrap_or(0.0)).sum();
        let total_compressed: f64 = completed.iter().map(|i| i.compressed_size_mb.unwrap_or(0.0)).sum();

        let compression_ratio = if completed.is_empty() {
            0
        } else {
            aggregate_ratio(total_original, total_compressed, quality)
        };

        let stats = Self {
            total_count: items.iter().filter(|i| i.selected).count(),
            completed_count: completed.len(),
            total_original_mb: round2(total_original),
            total_compressed_mb: round2(total_compressed),
            compression_ratio,
            elapsed,
        };
        debug!(
            "Batch stats - {}/{} completed, {} -> {} ({}%) in {}",
            stats.completed_count,
            stats.total_count,
            stats.total_original_label(),
            stats.total_compressed_label(),
            stats.compression_ratio,
            stats.elapsed_label()
        );
        stats
    }

    pub fn total_original_label(&self) -> String {
        format_mb(self.total_original_mb)
    }

    pub fn total_compressed_label(&self) -> String {
        format_mb(self.total_compressed_mb)
    }

    pub fn compression_ratio_label(&self) -> String {
        format!("{}%", self.compression_ratio)
    }

    pub fn elapsed_label(&self) -> String {
        format_duration(self.elapsed)
    }
}
