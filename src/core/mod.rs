//! Core application types and state management.
//!
//! This module contains the fundamental types used throughout the application:
//! - [`AppState`]: the application shell (pages, history, settings)
//! - [`ImageDescriptor`]: a picked source image
//! - [`ProcessingItem`]: one batch element and its processing state
//! - [`CompressionOptions`]: quality, mode and output format of a run
//! - [`ProcessedResult`]: a history record
//! - [`Progress`]: progress snapshots emitted by the sessions

mod clock;
mod history;
mod progress;
mod settings;
mod state;
mod task;
mod types;

pub use clock::{Clock, IdGenerator, ManualClock, SequentialIds, SharedClock, SharedIds, SystemClock, UuidIds};
pub use history::{History, MergeOutcome};
pub use progress::{Progress, ProgressType, estimate_remaining};
pub use settings::{
    AppSettings, CompressionSettings, GeneralSettings, PerformanceSettings, ProcessingPriority, Theme,
    ThemePreference,
};
pub use state::{ActiveSession, AppState, Page, SaveMode};
pub use task::{ItemStatus, ProcessingItem, UNKNOWN, UNSET};
pub use types::{CompressionMode, CompressionOptions, ImageDescriptor, OutputFormat, ProcessedResult, QualityScore};
