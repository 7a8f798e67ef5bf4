use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

use crate::core::ImageDescriptor;
use crate::utils::{CompressorError, CompressorResult};

use super::SelectionBridge;

/// In-memory bridge that records writes instead of touching the disk.
#[derive(Default)]
pub struct RecordingBridge {
    directory: Option<String>,
    selections: Mutex<VecDeque<Vec<ImageDescriptor>>>,
    saves: Mutex<VecDeque<Option<String>>>,
    failing: Mutex<HashSet<String>>,
    written: Mutex<Vec<(String, String)>>,
}

impl RecordingBridge {
    pub fn with_directory(directory: &str) -> Self {
        Self {
            directory: Some(directory.to_string()),
            ..Self::default()
        }
    }

    pub fn queue_selection(&self, images: Vec<ImageDescriptor>) {
        self.selections.lock().unwrap().push_back(images);
    }

    pub fn queue_save(&self, target: Option<&str>) {
        self.saves.lock().unwrap().push_back(target.map(str::to_string));
    }

    pub fn fail_writes_to(&self, path: &str) {
        self.failing.lock().unwrap().insert(path.to_string());
    }

    pub fn allow_writes_to(&self, path: &str) {
        self.failing.lock().unwrap().remove(path);
    }

    /// `(path, base64)` pairs in write order
    pub fn written(&self) -> Vec<(String, String)> {
        self.written.lock().unwrap().clone()
    }
}

impl SelectionBridge for RecordingBridge {
    async fn select_one(&self) -> CompressorResult<Option<ImageDescriptor>> {
        Ok(self.selections.lock().unwrap().pop_front().and_then(|v| v.into_iter().next()))
    }

    async fn select_many(&self) -> CompressorResult<Vec<ImageDescriptor>> {
        Ok(self.selections.lock().unwrap().pop_front().unwrap_or_default())
    }

    async fn select_directory(&self) -> CompressorResult<Option<String>> {
        Ok(self.directory.clone())
    }

    async fn read_dropped(&self, _paths: &[String]) -> Vec<ImageDescriptor> {
        self.selections.lock().unwrap().pop_front().unwrap_or_default()
    }

    async fn save_bytes(&self, base64: &str, _suggested_path: &str) -> CompressorResult<Option<String>> {
        let target = self.saves.lock().unwrap().pop_front().flatten();
        match target {
            Some(path) => {
                self.write_bytes(base64, &path).await?;
                Ok(Some(path))
            }
            None => Ok(None),
        }
    }

    async fn write_bytes(&self, base64: &str, path: &str) -> CompressorResult<()> {
        if self.failing.lock().unwrap().contains(path) {
            return Err(CompressorError::io(format!("Permission denied: {}", path)));
        }
        self.written.lock().unwrap().push((path.to_string(), base64.to_string()));
        Ok(())
    }

    async fn open_externally(&self, _path: &str) -> bool {
        true
    }
}
