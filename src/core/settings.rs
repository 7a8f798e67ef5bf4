//! User settings.
//!
//! A passive value object: nothing here has behavior beyond defaults and
//! theme resolution. Every field is defaulted so partial documents load.

use serde::{Deserialize, Serialize};
use crate::core::{CompressionMode, CompressionOptions, OutputFormat};

/// Theme preference as stored in settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    #[default]
    Light,
    Dark,
    /// Follow the OS appearance
    System,
}

/// Theme actually applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl ThemePreference {
    pub fn resolve(self, system_prefers_dark: bool) -> Theme {
        match self {
            Self::Light => Theme::Light,
            Self::Dark => Theme::Dark,
            Self::System if system_prefers_dark => Theme::Dark,
            Self::System => Theme::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingPriority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneralSettings {
    pub language: String,
    pub theme: ThemePreference,
    pub cache_path: String,
    pub clear_cache_on_exit: bool,
    pub check_updates_on_start: bool,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        let cache_path = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("ImageCompressor")
            .join("Cache");
        Self {
            language: String::from("zh-CN"),
            theme: ThemePreference::default(),
            cache_path: cache_path.to_string_lossy().to_string(),
            clear_cache_on_exit: false,
            check_updates_on_start: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompressionSettings {
    pub default_quality: u8,
    pub default_mode: CompressionMode,
    pub default_format: OutputFormat,
    pub keep_exif: bool,
    pub auto_save: bool,
    pub add_compressed_suffix: bool,
}

impl Default for CompressionSettings {
    fn default() -> Self {
        Self {
            default_quality: 75,
            default_mode: CompressionMode::Lossy,
            default_format: OutputFormat::Original,
            keep_exif: true,
            auto_save: false,
            add_compressed_suffix: true,
        }
    }
}

impl CompressionSettings {
    pub fn to_options(&self) -> CompressionOptions {
        CompressionOptions {
            quality: self.default_quality.min(100),
            mode: self.default_mode,
            format: self.default_format,
        }
    }
}

/// Performance knobs.
///
/// `parallel_processing` is stored and round-tripped but batch processing is
/// strictly sequential and never reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PerformanceSettings {
    pub parallel_processing: usize,
    /// Memory limit in MB
    pub memory_limit: u32,
    pub processing_priority: ProcessingPriority,
}

impl Default for PerformanceSettings {
    fn default() -> Self {
        Self {
            parallel_processing: 4,
            memory_limit: 500,
            processing_priority: ProcessingPriority::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub general: GeneralSettings,
    pub compression: CompressionSettings,
    pub performance: PerformanceSettings,
}

impl AppSettings {
    /// Restores every section to its default
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
