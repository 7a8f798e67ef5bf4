//! Single-image session: `options -> processing -> result`.

use std::path::Path;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::bridge::SelectionBridge;
use crate::core::{
    AppSettings, CompressionOptions, ImageDescriptor, ProcessedResult, Progress, ProgressType,
    SharedClock, SharedIds,
};
use crate::processing::batch::ProgressConfig;
use crate::processing::optimizer::{Estimate, estimate_single};
use crate::utils::{
    CompressorError, CompressorResult, base64_payload, compressed_file_name, validate_descriptor,
    validate_options,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", rename_all = "lowercase")]
pub enum SingleStage {
    Options,
    Processing { progress: u8 },
    Result,
}

impl SingleStage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Options => "options",
            Self::Processing { .. } => "processing",
            Self::Result => "result",
        }
    }
}

pub struct SingleImageSession {
    image: ImageDescriptor,
    options: CompressionOptions,
    defaults_applied: bool,
    user_edited: bool,
    stage: SingleStage,
    time_remaining: u64,
    outcome: Option<Estimate>,
    save_path: Option<String>,
    result_id: String,
    config: ProgressConfig,
    clock: SharedClock,
}

impl SingleImageSession {
    /// Opens a session in `options`, seeded from `settings` when present.
    pub fn new(
        image: ImageDescriptor,
        settings: Option<&AppSettings>,
        clock: SharedClock,
        ids: SharedIds,
    ) -> CompressorResult<Self> {
        validate_descriptor(&image)?;
        let mut session = Self {
            image,
            options: CompressionOptions::single_default(),
            defaults_applied: false,
            user_edited: false,
            stage: SingleStage::Options,
            time_remaining: 0,
            outcome: None,
            save_path: None,
            result_id: ids.next_id(),
            config: ProgressConfig::single(),
            clock,
        };
        session.apply_defaults(settings);
        Ok(session)
    }

    pub fn with_config(mut self, config: ProgressConfig) -> Self {
        self.config = config;
        self
    }

    pub fn image(&self) -> &ImageDescriptor {
        &self.image
    }

    pub fn options(&self) -> &CompressionOptions {
        &self.options
    }

    pub fn stage(&self) -> SingleStage {
        self.stage
    }

    pub fn config(&self) -> &ProgressConfig {
        &self.config
    }

    pub fn save_path(&self) -> Option<&str> {
        self.save_path.as_deref()
    }

    pub fn outcome(&self) -> Option<&Estimate> {
        self.outcome.as_ref()
    }

    fn require(&self, expected: &'static str, action: &'static str) -> CompressorResult<()> {
        if self.stage.name() != expected {
            return Err(CompressorError::transition(self.stage.name(), action));
        }
        Ok(())
    }

    /// Seeds options from the compression defaults on first entry only.
    pub fn apply_defaults(&mut self, settings: Option<&AppSettings>) {
        match settings {
            Some(settings) if !self.defaults_applied && !self.user_edited => {
                self.options = settings.compression.to_options();
                self.defaults_applied = true;
            }
            Some(_) | None => {}
        }
    }

    pub fn set_options(&mut self, options: CompressionOptions) -> CompressorResult<()> {
        self.require("options", "change options")?;
        validate_options(&options)?;
        self.options = options;
        self.user_edited = true;
        Ok(())
    }

    pub fn start(&mut self) -> CompressorResult<Progress> {
        self.require("options", "start")?;
        validate_options(&self.options)?;
        self.stage = SingleStage::Processing { progress: 0 };
        self.time_remaining = self.remaining_secs(0);
        info!("Compressing {} at quality {}", self.image.name, self.options.quality);

        let mut progress = self.progress();
        progress.progress_type = ProgressType::Start;
        Ok(progress)
    }

    fn remaining_secs(&self, progress: u8) -> u64 {
        let step = self.config.step() as u32;
        let ticks_left = (100 - progress.min(100) as u32).div_ceil(step);
        (self.config.tick_interval * ticks_left).as_secs_f64().round() as u64
    }

    /// Advances the progress counter; at 100 the result is computed.
    pub fn tick(&mut self) -> CompressorResult<Progress> {
        let SingleStage::Processing { progress } = self.stage else {
            return Err(CompressorError::transition(self.stage.name(), "tick"));
        };

        let progress = progress.saturating_add(self.config.step()).min(100);
        self.time_remaining = self.remaining_secs(progress);

        if progress >= 100 {
            let estimate = estimate_single(self.image.size, &self.options);
            debug!(
                "{}: {:.2} MB -> {:.2} MB ({}%)",
                self.image.name, estimate.original_size_mb, estimate.compressed_size_mb, estimate.compression_ratio
            );
            self.outcome = Some(estimate);
            self.stage = SingleStage::Result;
        } else {
            self.stage = SingleStage::Processing { progress };
        }
        Ok(self.progress())
    }

    pub fn progress(&self) -> Progress {
        let (progress_type, current, completed) = match self.stage {
            SingleStage::Options => (ProgressType::Progress, 0, 0),
            SingleStage::Processing { progress } => (ProgressType::Progress, progress, 0),
            SingleStage::Result => (ProgressType::Complete, 100, 1),
        };
        Progress {
            progress_type,
            completed_tasks: completed,
            total_tasks: 1,
            progress_percentage: current as f64,
            current_progress: current,
            current_file: Some(self.image.name.clone()),
            time_remaining: self.time_remaining,
        }
    }

    /// Back to options with the same image; the recorded save path is dropped.
    pub fn recompress(&mut self) -> CompressorResult<()> {
        self.require("result", "recompress")?;
        self.stage = SingleStage::Options;
        self.outcome = None;
        self.save_path = None;
        self.time_remaining = 0;
        Ok(())
    }

    /// Leaves the session from any stage without forwarding a result.
    pub fn discard(self) {
        info!("Discarded {} in {} stage", self.image.name, self.stage.name());
    }

    /// The finalized result as it would be recorded in the history.
    pub fn result(&self) -> CompressorResult<ProcessedResult> {
        self.require("result", "read the result")?;
        let estimate = self
            .outcome
            .ok_or_else(|| CompressorError::transition(self.stage.name(), "read the result"))?;
        Ok(ProcessedResult {
            id: self.result_id.clone(),
            path: self.save_path.clone().unwrap_or_default(),
            name: self.image.name.clone(),
            preview: self.image.preview.clone(),
            thumbnail: self.image.preview.clone(),
            original_size: estimate.original_size_mb,
            compressed_size: estimate.compressed_size_mb,
            compression_ratio: estimate.compression_ratio,
            quality_score: Some(estimate.quality_score),
            timestamp: self.clock.timestamp(),
        })
    }

    fn payload(&self) -> CompressorResult<&str> {
        base64_payload(&self.image.preview)
            .ok_or_else(|| CompressorError::encoding(format!("{} has no embedded image data", self.image.name)))
    }

    fn suggested_path(&self) -> String {
        let name = compressed_file_name(&self.image.name, self.options.format);
        match Path::new(&self.image.path).parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.join(name).to_string_lossy().to_string(),
            Some(_) | None => name,
        }
    }

    /// Prompts for a destination, writes the output and records the path.
    ///
    /// `Ok(None)` when the dialog is cancelled. On error the session stays in
    /// `result` so the save can be retried.
    pub async fn save_as<B: SelectionBridge>(&mut self, bridge: &B) -> CompressorResult<Option<ProcessedResult>> {
        self.require("result", "save")?;
        let payload = self.payload()?;
        let saved = match bridge.save_bytes(payload, &self.suggested_path()).await {
            Ok(saved) => saved,
            Err(e) => {
                warn!("Failed to save {}: {}", self.image.name, e);
                return Err(e);
            }
        };

        let Some(path) = saved else {
            debug!("Save of {} cancelled", self.image.name);
            return Ok(None);
        };
        info!("Saved {} to {}", self.image.name, path);
        self.save_path = Some(path);
        self.result().map(Some)
    }

    /// Overwrites the recorded save path, or prompts like [`Self::save_as`].
    pub async fn save<B: SelectionBridge>(&mut self, bridge: &B) -> CompressorResult<Option<ProcessedResult>> {
        self.require("result", "save")?;
        let Some(path) = self.save_path.clone() else {
            return self.save_as(bridge).await;
        };

        if let Err(e) = bridge.write_bytes(self.payload()?, &path).await {
            warn!("Failed to overwrite {}: {}", path, e);
            return Err(e);
        }
        info!("Overwrote {}", path);
        self.result().map(Some)
    }

    /// Opens the saved output with the system viewer.
    pub async fn open_saved<B: SelectionBridge>(&self, bridge: &B) -> bool {
        match &self.save_path {
            Some(path) => bridge.open_externally(path).await,
            None => false,
        }
    }
}
