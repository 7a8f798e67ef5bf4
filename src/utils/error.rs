//! Error types for the image compressor.
//!
//! Provides a hierarchy of error types using `thiserror` for ergonomic error handling.

use std::io;
use thiserror::Error;
use serde::Serialize;

/// Validation errors for options and image descriptors.
#[derive(Error, Debug, Serialize, PartialEq)]
pub enum ValidationError {
    /// Quality outside 0..=100
    #[error("Invalid quality value: {0}. Must be between 0 and 100")]
    Quality(u32),
    /// Descriptor or save target without a path
    #[error("Empty path")]
    EmptyPath,
    /// Index does not address an item in the list
    #[error("Index {index} out of range for {len} items")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Main error type for the compressor.
///
/// Every fallible library operation returns this type. None of the variants
/// are fatal: callers keep their current state and may retry.
#[derive(Error, Debug, Serialize)]
pub enum CompressorError {
    /// Options or input validation failed
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Action not allowed in the current stage
    #[error("Cannot {action} while in {stage} stage")]
    InvalidTransition { stage: &'static str, action: &'static str },

    /// `start` requested with no selected item
    #[error("No images selected for processing")]
    NothingSelected,

    /// `export_all` requested with no completed item
    #[error("No completed images to export")]
    NothingToExport,

    /// File IO error
    #[error("IO error: {0}")]
    Io(String),

    /// Base64 / data-URI decoding failed
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Key-value store failure
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// JSON (de)serialization failure
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Convenience result type for compressor operations.
pub type CompressorResult<T> = Result<T, CompressorError>;

impl CompressorError {
    pub fn transition(stage: &'static str, action: &'static str) -> Self {
        Self::InvalidTransition { stage, action }
    }

    pub fn io<T: Into<String>>(msg: T) -> Self {
        Self::Io(msg.into())
    }

    pub fn encoding<T: Into<String>>(msg: T) -> Self {
        Self::Encoding(msg.into())
    }

    pub fn persistence<T: Into<String>>(msg: T) -> Self {
        Self::Persistence(msg.into())
    }
}

// Convert std::io::Error to CompressorError
impl From<io::Error> for CompressorError {
    fn from(err: io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for CompressorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<base64::DecodeError> for CompressorError {
    fn from(err: base64::DecodeError) -> Self {
        Self::Encoding(err.to_string())
    }
}
