//! Image selection bridge.
//!
//! Abstracts native pickers and whole-file reads/writes behind an async
//! interface. A cancelled dialog surfaces as `None` or an empty list, never
//! as an error.

mod dialogs;
mod fs_bridge;
#[cfg(test)]
pub(crate) mod testing;

pub use dialogs::{DialogProvider, FixedDirectoryDialogs, ScriptedDialogs};
pub use fs_bridge::FsBridge;

use crate::core::ImageDescriptor;
use crate::utils::CompressorResult;

#[allow(async_fn_in_trait)]
pub trait SelectionBridge {
    /// Prompts for one image
    async fn select_one(&self) -> CompressorResult<Option<ImageDescriptor>>;

    /// Prompts for any number of images; unreadable files are left out
    async fn select_many(&self) -> CompressorResult<Vec<ImageDescriptor>>;

    async fn select_directory(&self) -> CompressorResult<Option<String>>;

    /// Reads files dropped onto the window, best effort
    async fn read_dropped(&self, paths: &[String]) -> Vec<ImageDescriptor>;

    /// Prompts for a destination and writes the decoded payload there.
    ///
    /// Returns the chosen path, or `None` when the dialog was cancelled.
    async fn save_bytes(&self, base64: &str, suggested_path: &str) -> CompressorResult<Option<String>>;

    /// Writes the decoded payload to `path` without prompting
    async fn write_bytes(&self, base64: &str, path: &str) -> CompressorResult<()>;

    async fn open_externally(&self, path: &str) -> bool;
}
