use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::core::ImageDescriptor;
use crate::utils::{
    CompressorError, CompressorResult, ValidationError, decode_base64, extract_filename, format_from_extension,
    read_file, to_data_uri, write_file,
};

use super::{DialogProvider, SelectionBridge};

/// Selection bridge backed by the local filesystem.
pub struct FsBridge<D> {
    dialogs: D,
}

impl<D: DialogProvider> FsBridge<D> {
    pub fn new(dialogs: D) -> Self {
        Self { dialogs }
    }

    /// Reads one supported image into a descriptor
    pub async fn read_image(&self, path: &Path) -> CompressorResult<ImageDescriptor> {
        let path_str = path.to_string_lossy().to_string();
        format_from_extension(&path_str)?;
        let bytes = read_file(path).await?;

        Ok(ImageDescriptor::new(
            path_str.clone(),
            extract_filename(&path_str),
            to_data_uri(&path_str, &bytes),
            Some(bytes.len() as u64),
        ))
    }

    /// Reads every path, dropping (and logging) the ones that fail
    pub async fn read_all(&self, paths: &[PathBuf]) -> Vec<ImageDescriptor> {
        let mut images = Vec::with_capacity(paths.len());
        for path in paths {
            match self.read_image(path).await {
                Ok(image) => images.push(image),
                Err(e) => warn!("Skipping {}: {}", path.display(), e),
            }
        }
        debug!("Read {} of {} files", images.len(), paths.len());
        images
    }
}

impl<D: DialogProvider> SelectionBridge for FsBridge<D> {
    async fn select_one(&self) -> CompressorResult<Option<ImageDescriptor>> {
        match self.dialogs.pick_file() {
            Some(path) => Ok(Some(self.read_image(&path).await?)),
            None => Ok(None),
        }
    }

    async fn select_many(&self) -> CompressorResult<Vec<ImageDescriptor>> {
        let paths = self.dialogs.pick_files();
        Ok(self.read_all(&paths).await)
    }

    async fn select_directory(&self) -> CompressorResult<Option<String>> {
        Ok(self
            .dialogs
            .pick_directory()
            .map(|dir| dir.to_string_lossy().to_string()))
    }

    async fn read_dropped(&self, paths: &[String]) -> Vec<ImageDescriptor> {
        let paths: Vec<PathBuf> = paths.iter().map(PathBuf::from).collect();
        self.read_all(&paths).await
    }

    async fn save_bytes(&self, base64: &str, suggested_path: &str) -> CompressorResult<Option<String>> {
        let Some(target) = self.dialogs.save_file(Path::new(suggested_path)) else {
            debug!("Save cancelled");
            return Ok(None);
        };
        let target = target.to_string_lossy().to_string();
        self.write_bytes(base64, &target).await?;
        Ok(Some(target))
    }

    async fn write_bytes(&self, base64: &str, path: &str) -> CompressorResult<()> {
        if path.trim().is_empty() {
            return Err(ValidationError::EmptyPath.into());
        }
        let bytes = decode_base64(base64)?;
        write_file(path, &bytes).await?;
        debug!("Wrote {} bytes to {}", bytes.len(), path);
        Ok(())
    }

    async fn open_externally(&self, path: &str) -> bool {
        let target = path.to_string();
        let opened = tokio::task::spawn_blocking(move || open::that(&target))
            .await
            .map_err(|e| CompressorError::io(e.to_string()))
            .and_then(|r| r.map_err(CompressorError::from));

        match opened {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to open {}: {}", path, e);
                false
            }
        }
    }
}
