//! Batch element: one image plus its mutable processing state.

use serde::{Deserialize, Serialize};
use crate::core::ImageDescriptor;
use crate::utils::{bytes_to_mb, format_mb};

/// Shown for result fields that have not been computed
pub const UNSET: &str = "-";
/// Shown for an original size the provider could not supply
pub const UNKNOWN: &str = "Unknown";

/// Processing status of a batch item.
///
/// Moves forward `Pending -> Processing -> Completed | Error`; only a bulk
/// reset sends items back to `Pending`. `Skipped` is assigned to unselected
/// items when a run starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Error,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingItem {
    pub id: String,
    #[serde(flatten)]
    pub image: ImageDescriptor,
    pub selected: bool,
    pub status: ItemStatus,
    #[serde(rename = "originalSizeInMB")]
    pub original_size_mb: Option<f64>,
    #[serde(rename = "compressedSizeInMB")]
    pub compressed_size_mb: Option<f64>,
    pub compression_ratio: Option<u8>,
    pub processed_preview: Option<String>,
    pub thumbnail: Option<String>,
}

impl ProcessingItem {
    /// Wraps a freshly ingested descriptor: selected and pending.
    pub fn new(id: String, image: ImageDescriptor) -> Self {
        let original_size_mb = image.size.map(bytes_to_mb);
        Self {
            id,
            image,
            selected: true,
            status: ItemStatus::Pending,
            original_size_mb,
            compressed_size_mb: None,
            compression_ratio: None,
            processed_preview: None,
            thumbnail: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == ItemStatus::Completed
    }

    /// Back to `Pending` with every result field unset.
    pub fn reset(&mut self) {
        self.status = ItemStatus::Pending;
        self.original_size_mb = self.image.size.map(bytes_to_mb);
        self.compressed_size_mb = None;
        self.compression_ratio = None;
        self.processed_preview = None;
        self.thumbnail = None;
    }

    pub fn original_size_label(&self) -> String {
        self.original_size_mb.map(format_mb).unwrap_or_else(|| UNKNOWN.to_string())
    }

    pub fn compressed_size_label(&self) -> String {
        self.compressed_size_mb.map(format_mb).unwrap_or_else(|| UNSET.to_string())
    }

    pub fn compression_ratio_label(&self) -> String {
        self.compression_ratio
            .map(|r| format!("{}%", r))
            .unwrap_or_else(|| UNSET.to_string())
    }
}
