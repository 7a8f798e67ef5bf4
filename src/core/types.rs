//! Core types for image selection, compression options and results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A source image picked by the user.
///
/// Created by the selection bridge and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDescriptor {
    /// Filesystem path, or an opaque local reference outside a native shell
    pub path: String,
    /// Display filename
    pub name: String,
    /// `data:` URI of the original bytes
    pub preview: String,
    /// Byte length, when the provider knows it
    #[serde(default)]
    pub size: Option<u64>,
}

impl ImageDescriptor {
    pub fn new(
        path: impl Into<String>,
        name: impl Into<String>,
        preview: impl Into<String>,
        size: Option<u64>,
    ) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            preview: preview.into(),
            size,
        }
    }
}

/// Simulated compression mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionMode {
    /// Output size scales with quality
    #[default]
    Lossy,
    /// Fixed 30% reduction
    Lossless,
}

/// Output format of a compressed image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Keep the source format
    #[default]
    Original,
    Jpg,
    Png,
    Webp,
}

impl OutputFormat {
    /// Target extension, `None` for `Original`
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            Self::Original => None,
            Self::Jpg => Some("jpg"),
            Self::Png => Some("png"),
            Self::Webp => Some("webp"),
        }
    }
}

/// Options for one processing run.
///
/// Immutable while a run is in flight; edited between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionOptions {
    /// Quality percentage (0-100)
    pub quality: u8,
    pub mode: CompressionMode,
    pub format: OutputFormat,
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            quality: 75,
            mode: CompressionMode::Lossy,
            format: OutputFormat::Original,
        }
    }
}

impl CompressionOptions {
    /// Starting options of the single-image flow, which defaults to JPG output.
    pub fn single_default() -> Self {
        Self {
            format: OutputFormat::Jpg,
            ..Self::default()
        }
    }

    pub fn quality_factor(&self) -> f64 {
        self.quality as f64 / 100.0
    }
}

/// Qualitative label attached to a single-image result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityScore {
    Excellent,
    Good,
    Fair,
}

impl QualityScore {
    pub fn from_quality(quality: u8) -> Self {
        if quality > 70 {
            Self::Excellent
        } else if quality > 40 {
            Self::Good
        } else {
            Self::Fair
        }
    }
}

/// A finished compression, as recorded in the history list.
///
/// Sizes are in megabytes, rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedResult {
    pub id: String,
    /// Where the output lives; empty when it was never saved
    #[serde(default)]
    pub path: String,
    pub name: String,
    pub preview: String,
    pub thumbnail: String,
    pub original_size: f64,
    pub compressed_size: f64,
    /// Percentage size reduction
    pub compression_ratio: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<QualityScore>,
    pub timestamp: DateTime<Utc>,
}

impl ProcessedResult {
    /// History identity: same id, or same non-empty path.
    pub fn same_image(&self, other: &ProcessedResult) -> bool {
        self.id == other.id || (!self.path.is_empty() && self.path == other.path)
    }
}
