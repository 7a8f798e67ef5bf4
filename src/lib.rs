// Module declarations in dependency order
pub mod utils;
pub mod core;
pub mod processing;
pub mod bridge;
pub mod store;

// Public exports for external consumers
pub use core::{AppSettings, AppState, CompressionOptions, ImageDescriptor, Page, ProcessedResult, SaveMode};
pub use bridge::{FsBridge, SelectionBridge};
pub use processing::{BatchSession, SingleImageSession, drive};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};
pub use utils::{CompressorError, CompressorResult};

// This library file is used as a public API for consuming this crate as a library.
// The headless entry point is in main.rs.
