//! Batch processing session: `options -> processing -> complete`.
//!
//! Items are processed strictly one after another in list order. The session
//! owns no timer; each call to [`BatchSession::tick`] advances the current
//! item by one step.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::bridge::SelectionBridge;
use crate::core::{
    AppSettings, CompressionOptions, ImageDescriptor, ItemStatus, ProcessedResult,
    ProcessingItem, Progress, ProgressType, SharedClock, SharedIds, estimate_remaining,
};
use crate::processing::optimizer::{estimate_batch_item, fallback_ratio};
use crate::utils::{
    CompressorError, CompressorResult, base64_payload, compressed_file_name, numbered_file_name,
    validate_index, validate_options,
};

use super::config::ProgressConfig;
use super::metrics::BatchStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStage {
    Options,
    Processing,
    Complete,
}

impl BatchStage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Options => "options",
            Self::Processing => "processing",
            Self::Complete => "complete",
        }
    }
}

/// One file that could not be exported
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFailure {
    pub name: String,
    pub error: String,
}

/// Outcome of [`BatchSession::export_all`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportReport {
    pub directory: String,
    pub saved: Vec<String>,
    pub failed: Vec<ExportFailure>,
}

pub struct BatchSession {
    items: Vec<ProcessingItem>,
    options: CompressionOptions,
    defaults_applied: bool,
    user_edited: bool,
    stage: BatchStage,
    paused: bool,
    current_index: Option<usize>,
    current_progress: u8,
    total_progress: f64,
    time_remaining: u64,
    started_at: Option<Duration>,
    finished_at: Option<Duration>,
    results: Vec<ProcessingItem>,
    save_dir: Option<String>,
    config: ProgressConfig,
    clock: SharedClock,
    ids: SharedIds,
}

impl BatchSession {
    /// Ingests `images` and seeds the options from `settings` when present.
    pub fn new(
        images: Vec<ImageDescriptor>,
        settings: Option<&AppSettings>,
        clock: SharedClock,
        ids: SharedIds,
    ) -> Self {
        let mut session = Self {
            items: Vec::with_capacity(images.len()),
            options: CompressionOptions::default(),
            defaults_applied: false,
            user_edited: false,
            stage: BatchStage::Options,
            paused: false,
            current_index: None,
            current_progress: 0,
            total_progress: 0.0,
            time_remaining: 0,
            started_at: None,
            finished_at: None,
            results: Vec::new(),
            save_dir: None,
            config: ProgressConfig::batch(),
            clock,
            ids,
        };
        session.ingest(images);
        session.apply_defaults(settings);
        session
    }

    pub fn with_config(mut self, config: ProgressConfig) -> Self {
        self.config = config;
        self
    }

    // ── Accessors ───────────────────────────────────────────────────────────────────

    pub fn stage(&self) -> BatchStage {
        self.stage
    }

    pub fn options(&self) -> &CompressionOptions {
        &self.options
    }

    pub fn config(&self) -> &ProgressConfig {
        &self.config
    }

    pub fn items(&self) -> &[ProcessingItem] {
        &self.items
    }

    pub fn item(&self, index: usize) -> Option<&ProcessingItem> {
        self.items.get(index)
    }

    /// Items completed by the last run, captured when it finished
    pub fn results(&self) -> &[ProcessingItem] {
        &self.results
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn save_dir(&self) -> Option<&str> {
        self.save_dir.as_deref()
    }

    pub fn selected_count(&self) -> usize {
        self.items.iter().filter(|i| i.selected).count()
    }

    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|i| i.is_completed()).count()
    }

    pub fn all_selected(&self) -> bool {
        !self.items.is_empty() && self.items.iter().all(|i| i.selected)
    }

    fn require(&self, stage: BatchStage, action: &'static str) -> CompressorResult<()> {
        if self.stage != stage {
            return Err(CompressorError::transition(self.stage.name(), action));
        }
        Ok(())
    }

    // ── Options stage ───────────────────────────────────────────────────────────────

    /// Wraps descriptors into pending, selected items and appends them.
    ///
    /// No de-duplication: the same file picked twice becomes two items.
    fn ingest(&mut self, images: Vec<ImageDescriptor>) {
        let ids = self.ids.clone();
        self.items.extend(
            images
                .into_iter()
                .map(|image| ProcessingItem::new(ids.next_id(), image)),
        );
    }

    pub fn add_images(&mut self, images: Vec<ImageDescriptor>) -> CompressorResult<usize> {
        self.require(BatchStage::Options, "add images")?;
        let added = images.len();
        self.ingest(images);
        debug!("Added {} images, {} in batch", added, self.items.len());
        Ok(added)
    }

    /// Picks more images through the bridge and appends them.
    ///
    /// A cancelled picker adds nothing.
    pub async fn add_from_bridge<B: SelectionBridge>(&mut self, bridge: &B) -> CompressorResult<usize> {
        self.require(BatchStage::Options, "add images")?;
        let images = bridge.select_many().await?;
        self.add_images(images)
    }

    pub fn remove(&mut self, index: usize) -> CompressorResult<ProcessingItem> {
        self.require(BatchStage::Options, "remove images")?;
        validate_index(index, self.items.len())?;
        Ok(self.items.remove(index))
    }

    pub fn clear(&mut self) -> CompressorResult<()> {
        self.require(BatchStage::Options, "clear images")?;
        self.items.clear();
        Ok(())
    }

    pub fn toggle_selected(&mut self, index: usize) -> CompressorResult<bool> {
        self.require(BatchStage::Options, "change selection")?;
        validate_index(index, self.items.len())?;
        let item = &mut self.items[index];
        item.selected = !item.selected;
        Ok(item.selected)
    }

    pub fn set_all_selected(&mut self, selected: bool) -> CompressorResult<()> {
        self.require(BatchStage::Options, "change selection")?;
        self.items.iter_mut().for_each(|i| i.selected = selected);
        Ok(())
    }

    pub fn set_options(&mut self, options: CompressionOptions) -> CompressorResult<()> {
        self.require(BatchStage::Options, "change options")?;
        validate_options(&options)?;
        self.options = options;
        self.user_edited = true;
        Ok(())
    }

    /// Seeds options from the compression defaults, once.
    ///
    /// Ignored after the first successful seeding or once the user edited
    /// the options.
    pub fn apply_defaults(&mut self, settings: Option<&AppSettings>) {
        match settings {
            Some(settings) if !self.defaults_applied && !self.user_edited => {
                self.options = settings.compression.to_options();
                self.defaults_applied = true;
                debug!("Batch options seeded from settings: {:?}", self.options);
            }
            Some(_) | None => {}
        }
    }

    // ── Processing ──────────────────────────────────────────────────────────────────

    /// Starts a run over the selected items.
    ///
    /// Unselected items become `Skipped`. Rejected without any state change
    /// when nothing is selected.
    pub fn start(&mut self) -> CompressorResult<Progress> {
        self.require(BatchStage::Options, "start")?;
        let selected = self.selected_count();
        if selected == 0 {
            warn!("Batch start rejected: no images selected");
            return Err(CompressorError::NothingSelected);
        }
        validate_options(&self.options)?;

        for item in self.items.iter_mut() {
            item.reset();
            if !item.selected {
                item.status = ItemStatus::Skipped;
            }
        }

        self.stage = BatchStage::Processing;
        self.paused = false;
        self.started_at = Some(self.clock.elapsed());
        self.finished_at = None;
        self.results.clear();
        self.total_progress = 0.0;
        self.time_remaining = 0;

        info!(
            "Batch started: {} of {} images, quality {}, {:?}",
            selected,
            self.items.len(),
            self.options.quality,
            self.options.mode
        );
        self.advance_from(0);

        let mut progress = self.progress();
        progress.progress_type = ProgressType::Start;
        Ok(progress)
    }

    /// Advances the current item by one step.
    ///
    /// Ignored while paused. When the item reaches 100% its result is
    /// computed and the next selected item starts; after the last one the
    /// session moves to `complete`.
    pub fn tick(&mut self) -> CompressorResult<Progress> {
        self.require(BatchStage::Processing, "tick")?;
        if self.paused {
            return Ok(self.progress());
        }

        let Some(index) = self.current_index else {
            self.complete();
            return Ok(self.progress());
        };

        self.current_progress = self
            .current_progress
            .saturating_add(self.config.step())
            .min(100);

        let selected = self.selected_count().max(1) as f64;
        let fraction = (self.completed_count() as f64 + self.current_progress as f64 / 100.0) / selected;
        self.total_progress = (fraction * 100.0).min(100.0);
        self.time_remaining = estimate_remaining(self.elapsed().as_secs_f64(), fraction);

        if self.current_progress >= 100 {
            self.finish_item(index);
            self.advance_from(index + 1);
        }

        Ok(self.progress())
    }

    /// Moves to the next selected item at or after `index`, or completes.
    fn advance_from(&mut self, index: usize) {
        let next = (index..self.items.len()).find(|&i| self.items[i].status == ItemStatus::Pending && self.items[i].selected);
        match next {
            Some(i) => {
                self.items[i].status = ItemStatus::Processing;
                self.current_index = Some(i);
                self.current_progress = 0;
                debug!("Processing {} ({}/{})", self.items[i].image.name, i + 1, self.items.len());
            }
            None => self.complete(),
        }
    }

    fn finish_item(&mut self, index: usize) {
        let item = &mut self.items[index];
        let estimate = estimate_batch_item(item.original_size_mb, &self.options);

        item.original_size_mb = Some(estimate.original_size_mb);
        item.compressed_size_mb = Some(estimate.compressed_size_mb);
        item.compression_ratio = Some(estimate.compression_ratio);
        item.processed_preview = Some(item.image.preview.clone());
        item.thumbnail = Some(item.image.preview.clone());
        item.status = ItemStatus::Completed;

        debug!(
            "{} compressed: {} -> {} ({}%)",
            item.image.name,
            item.original_size_label(),
            item.compressed_size_label(),
            estimate.compression_ratio
        );
    }

    fn complete(&mut self) {
        self.stage = BatchStage::Complete;
        self.finished_at = Some(self.clock.elapsed());
        self.current_index = None;
        self.current_progress = 0;
        self.total_progress = 100.0;
        self.time_remaining = 0;
        self.results = self.items.iter().filter(|i| i.is_completed()).cloned().collect();
        info!("Batch complete: {} images processed", self.results.len());
    }

    pub fn pause(&mut self) -> CompressorResult<()> {
        self.require(BatchStage::Processing, "pause")?;
        self.paused = true;
        info!("Batch paused");
        Ok(())
    }

    pub fn resume(&mut self) -> CompressorResult<()> {
        self.require(BatchStage::Processing, "resume")?;
        self.paused = false;
        info!("Batch resumed");
        Ok(())
    }

    /// Stops the run and resets every item, completed ones included.
    pub fn cancel(&mut self) -> CompressorResult<()> {
        self.require(BatchStage::Processing, "cancel")?;
        self.reset_run();
        info!("Batch cancelled");
        Ok(())
    }

    /// Back to options with the same images, all reset.
    pub fn reprocess(&mut self) -> CompressorResult<()> {
        self.require(BatchStage::Complete, "reprocess")?;
        self.reset_run();
        info!("Batch reset for reprocessing");
        Ok(())
    }

    /// Leaves the batch without forwarding anything to the history.
    pub fn new_batch(&self) -> CompressorResult<Vec<ProcessedResult>> {
        self.require(BatchStage::Complete, "start a new batch")?;
        Ok(Vec::new())
    }

    fn reset_run(&mut self) {
        self.stage = BatchStage::Options;
        self.paused = false;
        self.current_index = None;
        self.current_progress = 0;
        self.total_progress = 0.0;
        self.time_remaining = 0;
        self.started_at = None;
        self.finished_at = None;
        self.results.clear();
        self.items.iter_mut().for_each(ProcessingItem::reset);
    }

    fn elapsed(&self) -> Duration {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => end.saturating_sub(start),
            (Some(start), None) => self.clock.elapsed().saturating_sub(start),
            _ => Duration::ZERO,
        }
    }

    pub fn progress(&self) -> Progress {
        let progress_type = match self.stage {
            BatchStage::Complete => ProgressType::Complete,
            BatchStage::Options | BatchStage::Processing => ProgressType::Progress,
        };
        Progress {
            progress_type,
            completed_tasks: self.completed_count(),
            total_tasks: self.selected_count(),
            progress_percentage: self.total_progress,
            current_progress: self.current_progress,
            current_file: self
                .current_index
                .and_then(|i| self.items.get(i))
                .map(|i| i.image.name.clone()),
            time_remaining: self.time_remaining,
        }
    }

    // ── Complete stage ──────────────────────────────────────────────────────────────

    pub fn stats(&self) -> BatchStats {
        BatchStats::collect(&self.items, self.options.quality, self.elapsed())
    }

    /// Saves every completed item into a directory picked through the bridge.
    ///
    /// Items whose output names collide get `_2`, `_3`, ... suffixes in list
    /// order, so the same items always export under the same names.
    ///
    /// Returns `Ok(None)` when the picker is cancelled. A file that fails to
    /// save is logged and reported; the remaining files are still saved. A
    /// saved item's path is updated to its new location.
    pub async fn export_all<B: SelectionBridge>(&mut self, bridge: &B) -> CompressorResult<Option<ExportReport>> {
        self.require(BatchStage::Complete, "export")?;
        let Some(directory) = bridge.select_directory().await? else {
            debug!("Export cancelled");
            return Ok(None);
        };

        if self.completed_count() == 0 {
            return Err(CompressorError::NothingToExport);
        }
        self.save_dir = Some(directory.clone());

        let mut report = ExportReport {
            directory: directory.clone(),
            saved: Vec::new(),
            failed: Vec::new(),
        };

        // names are claimed in list order, failed writes included
        let mut taken = HashSet::new();
        for item in self.items.iter_mut().filter(|i| i.is_completed()) {
            let base = compressed_file_name(&item.image.name, self.options.format);
            let mut file_name = base.clone();
            let mut n = 1;
            while !taken.insert(file_name.clone()) {
                n += 1;
                file_name = numbered_file_name(&base, n);
            }
            let target = Path::new(&directory).join(file_name).to_string_lossy().to_string();
            let data = item.processed_preview.as_deref().unwrap_or(&item.image.preview);

            let outcome = match base64_payload(data) {
                Some(payload) => bridge.write_bytes(payload, &target).await,
                None => Err(CompressorError::encoding("no embedded image data")),
            };

            match outcome {
                Ok(()) => {
                    debug!("Exported {} to {}", item.image.name, target);
                    item.image.path = target.clone();
                    report.saved.push(target);
                }
                Err(e) => {
                    warn!("Failed to export {}: {}", item.image.name, e);
                    report.failed.push(ExportFailure {
                        name: item.image.name.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        self.results = self.items.iter().filter(|i| i.is_completed()).cloned().collect();
        info!(
            "Exported {} of {} images to {}",
            report.saved.len(),
            report.saved.len() + report.failed.len(),
            directory
        );
        Ok(Some(report))
    }

    /// Normalized results of every completed item, ready for the history.
    pub fn finish(&self) -> CompressorResult<Vec<ProcessedResult>> {
        self.require(BatchStage::Complete, "finish")?;
        let timestamp = self.clock.timestamp();

        let results: Vec<ProcessedResult> = self
            .items
            .iter()
            .filter(|i| i.is_completed())
            .map(|item| {
                let preview = item
                    .processed_preview
                    .clone()
                    .unwrap_or_else(|| item.image.preview.clone());
                let compression_ratio = match item.compression_ratio {
                    Some(ratio) if ratio > 0 => ratio,
                    Some(_) | None => fallback_ratio(self.options.quality),
                };
                ProcessedResult {
                    id: item.id.clone(),
                    path: item.image.path.clone(),
                    name: item.image.name.clone(),
                    thumbnail: preview.clone(),
                    preview,
                    original_size: item.original_size_mb.unwrap_or(0.0),
                    compressed_size: item.compressed_size_mb.unwrap_or(0.0),
                    compression_ratio,
                    quality_score: None,
                    timestamp,
                }
            })
            .collect();

        if results.is_empty() {
            warn!("Batch finished without completed images");
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use chrono::{DateTime, Utc};
    use crate::bridge::testing::RecordingBridge;
    use crate::core::{CompressionMode, ManualClock, OutputFormat, SequentialIds};

    const MB: u64 = 1024 * 1024;

    fn image(name: &str, size: Option<u64>) -> ImageDescriptor {
        ImageDescriptor::new(format!("/in/{name}"), name, "data:image/jpeg;base64,AAEC", size)
    }

    fn session(images: Vec<ImageDescriptor>) -> (BatchSession, Arc<ManualClock>) {
        let origin = DateTime::parse_from_rfc3339("2024-05-01T08:00:00Z").unwrap().with_timezone(&Utc);
        let clock = Arc::new(ManualClock::new(origin));
        let session = BatchSession::new(images, None, clock.clone(), Arc::new(SequentialIds::new("img")));
        (session, clock)
    }

    fn run_to_end(session: &mut BatchSession, clock: &ManualClock) {
        while session.stage() == BatchStage::Processing {
            clock.advance(session.config().tick_interval);
            session.tick().unwrap();
        }
    }

    fn lossy(quality: u8) -> CompressionOptions {
        CompressionOptions { quality, mode: CompressionMode::Lossy, format: OutputFormat::Original }
    }

    fn statuses(session: &BatchSession) -> Vec<ItemStatus> {
        session.items().iter().map(|i| i.status).collect()
    }

    #[test]
    fn ingestion_assigns_unique_ids() {
        let (session, _) = session(vec![image("a.jpg", None), image("a.jpg", None)]);
        assert_eq!(session.items()[0].id, "img-1");
        assert_eq!(session.items()[1].id, "img-2");
        assert!(session.all_selected());
    }

    #[test]
    fn start_with_nothing_selected_is_rejected() {
        let (mut session, _) = session(vec![image("a.jpg", None)]);
        session.set_all_selected(false).unwrap();
        let err = session.start().unwrap_err();
        assert!(matches!(err, CompressorError::NothingSelected));
        assert_eq!(session.stage(), BatchStage::Options);
        assert_eq!(statuses(&session), vec![ItemStatus::Pending]);
    }

    #[test]
    fn unselected_items_are_skipped() {
        let (mut session, clock) = session(vec![image("a.jpg", None), image("b.jpg", None), image("c.jpg", None)]);
        session.toggle_selected(0).unwrap();
        session.start().unwrap();
        assert_eq!(statuses(&session), vec![ItemStatus::Skipped, ItemStatus::Processing, ItemStatus::Pending]);
        assert_eq!(session.current_index(), Some(1));

        run_to_end(&mut session, &clock);
        assert_eq!(statuses(&session), vec![ItemStatus::Skipped, ItemStatus::Completed, ItemStatus::Completed]);
        assert_eq!(session.results().len(), 2);
    }

    #[test]
    fn at_most_one_item_processing_in_list_order() {
        let (mut session, clock) = session(vec![
            image("a.jpg", Some(MB)),
            image("b.jpg", Some(MB)),
            image("c.jpg", Some(MB)),
            image("d.jpg", Some(MB)),
        ]);
        session.toggle_selected(2).unwrap();
        session.start().unwrap();

        while session.stage() == BatchStage::Processing {
            let items = session.items();
            let processing: Vec<usize> = (0..items.len()).filter(|&i| items[i].status == ItemStatus::Processing).collect();
            assert!(processing.len() <= 1);
            if let Some(&current) = processing.first() {
                assert!(items[..current].iter().all(|i| matches!(i.status, ItemStatus::Completed | ItemStatus::Skipped)));
                assert!(items[current + 1..].iter().all(|i| matches!(i.status, ItemStatus::Pending | ItemStatus::Skipped)));
            }
            clock.advance(Duration::from_millis(100));
            session.tick().unwrap();
        }
    }

    #[test]
    fn total_progress_counts_completed_plus_current() {
        let (mut session, clock) = session(vec![image("a.jpg", None), image("b.jpg", None)]);
        session.start().unwrap();
        for _ in 0..20 {
            clock.advance(Duration::from_millis(100));
            session.tick().unwrap();
        }
        // first item done, second just started
        let progress = session.progress();
        assert_eq!(progress.completed_tasks, 1);
        assert_eq!(progress.progress_percentage, 50.0);

        for _ in 0..10 {
            clock.advance(Duration::from_millis(100));
            session.tick().unwrap();
        }
        let progress = session.progress();
        assert_eq!(progress.current_progress, 50);
        assert_eq!(progress.progress_percentage, 75.0);
        // 3s elapsed at 75% -> 1s left
        assert_eq!(progress.time_remaining, 1);
        assert_eq!(progress.current_file.as_deref(), Some("b.jpg"));
    }

    #[test]
    fn three_image_scenario_totals() {
        let (mut session, clock) = session(vec![
            image("a.jpg", Some(2 * MB)),
            image("b.jpg", Some(4 * MB)),
            image("c.jpg", Some(MB)),
        ]);
        session.set_options(lossy(50)).unwrap();
        session.start().unwrap();
        run_to_end(&mut session, &clock);

        let stats = session.stats();
        assert_eq!(stats.completed_count, 3);
        assert_eq!(stats.total_original_label(), "7.00 MB");
        assert_eq!(stats.total_compressed_label(), "3.50 MB");
        assert_eq!(stats.compression_ratio, 50);
        assert_eq!(stats.elapsed, Duration::from_secs(6));
        assert_eq!(stats.elapsed_label(), "6s");
    }

    #[test]
    fn unknown_size_defaults_to_one_mb() {
        let (mut session, clock) = session(vec![image("a.jpg", None)]);
        session.set_options(lossy(40)).unwrap();
        session.start().unwrap();
        run_to_end(&mut session, &clock);
        let item = &session.items()[0];
        assert_eq!(item.original_size_mb, Some(1.0));
        assert_eq!(item.compressed_size_mb, Some(0.4));
        assert_eq!(item.compression_ratio, Some(60));
    }

    #[test]
    fn cancel_resets_everything() {
        let (mut session, clock) = session(vec![image("a.jpg", Some(MB)), image("b.jpg", None), image("c.jpg", None)]);
        session.toggle_selected(2).unwrap();
        session.start().unwrap();
        for _ in 0..25 {
            clock.advance(Duration::from_millis(100));
            session.tick().unwrap();
        }
        assert_eq!(session.items()[0].status, ItemStatus::Completed);

        session.cancel().unwrap();
        assert_eq!(session.stage(), BatchStage::Options);
        for item in session.items() {
            assert_eq!(item.status, ItemStatus::Pending);
            assert_eq!(item.compressed_size_label(), "-");
            assert_eq!(item.compression_ratio_label(), "-");
            assert!(item.processed_preview.is_none());
        }
        assert_eq!(session.items()[1].original_size_mb, None);
        assert_eq!(session.progress().progress_percentage, 0.0);
    }

    #[test]
    fn paused_session_ignores_ticks() {
        let (mut session, clock) = session(vec![image("a.jpg", None)]);
        session.start().unwrap();
        session.tick().unwrap();
        session.pause().unwrap();
        clock.advance(Duration::from_secs(1));
        assert_eq!(session.tick().unwrap().current_progress, 5);
        session.resume().unwrap();
        assert_eq!(session.tick().unwrap().current_progress, 10);
    }

    #[test]
    fn options_are_frozen_while_processing() {
        let (mut session, _) = session(vec![image("a.jpg", None)]);
        session.start().unwrap();
        assert!(session.set_options(lossy(10)).is_err());
        assert!(session.toggle_selected(0).is_err());
        assert!(session.add_images(vec![image("b.jpg", None)]).is_err());
    }

    #[test]
    fn settings_seed_only_once() {
        let (mut session, _) = session(vec![image("a.jpg", None)]);
        let mut settings = AppSettings::default();
        settings.compression.default_quality = 30;
        session.apply_defaults(Some(&settings));
        assert_eq!(session.options().quality, 30);

        settings.compression.default_quality = 90;
        session.apply_defaults(Some(&settings));
        assert_eq!(session.options().quality, 30);
    }

    #[test]
    fn manual_edits_win_over_settings() {
        let (mut session, _) = session(vec![image("a.jpg", None)]);
        session.set_options(lossy(12)).unwrap();
        session.apply_defaults(Some(&AppSettings::default()));
        assert_eq!(session.options().quality, 12);
    }

    #[test]
    fn reprocess_returns_to_options() {
        let (mut session, clock) = session(vec![image("a.jpg", None)]);
        session.start().unwrap();
        run_to_end(&mut session, &clock);
        session.reprocess().unwrap();
        assert_eq!(session.stage(), BatchStage::Options);
        assert_eq!(statuses(&session), vec![ItemStatus::Pending]);
        assert!(session.results().is_empty());
    }

    #[test]
    fn finish_normalizes_results() {
        let (mut session, clock) = session(vec![image("a.jpg", Some(2 * MB)), image("b.jpg", None)]);
        session.set_options(lossy(100)).unwrap();
        session.start().unwrap();
        run_to_end(&mut session, &clock);

        let results = session.finish().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "img-1");
        assert_eq!(results[0].path, "/in/a.jpg");
        assert_eq!(results[0].compression_ratio, 5);
        assert_eq!(results[0].thumbnail, results[0].preview);
        assert_eq!(results[1].original_size, 1.0);
    }

    #[test]
    fn new_batch_forwards_nothing() {
        let (mut session, clock) = session(vec![image("a.jpg", None)]);
        session.start().unwrap();
        run_to_end(&mut session, &clock);
        assert!(session.new_batch().unwrap().is_empty());
    }

    #[tokio::test]
    async fn export_is_best_effort_and_repeatable() {
        let (mut session, clock) = session(vec![image("a.png", None), image("b.jpg", None), image("c.jpg", None)]);
        session.start().unwrap();
        run_to_end(&mut session, &clock);

        let bridge = RecordingBridge::with_directory("/out");
        bridge.fail_writes_to("/out/compressed_b.jpg");

        let report = session.export_all(&bridge).await.unwrap().unwrap();
        assert_eq!(report.saved, vec!["/out/compressed_a.png", "/out/compressed_c.jpg"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].name, "b.jpg");
        assert_eq!(session.items()[0].image.path, "/out/compressed_a.png");
        assert_eq!(session.items()[1].image.path, "/in/b.jpg");
        assert_eq!(session.save_dir(), Some("/out"));

        let again = session.export_all(&bridge).await.unwrap().unwrap();
        assert_eq!(again.saved, report.saved);
    }

    #[tokio::test]
    async fn export_uses_target_format_extension() {
        let (mut session, clock) = session(vec![image("a.png", None)]);
        session.set_options(CompressionOptions { format: OutputFormat::Webp, ..lossy(60) }).unwrap();
        session.start().unwrap();
        run_to_end(&mut session, &clock);

        let bridge = RecordingBridge::with_directory("/out");
        let report = session.export_all(&bridge).await.unwrap().unwrap();
        assert_eq!(report.saved, vec!["/out/compressed_a.webp"]);
        assert_eq!(bridge.written(), vec![("/out/compressed_a.webp".to_string(), "AAEC".to_string())]);
    }

    #[tokio::test]
    async fn colliding_output_names_get_suffixes() {
        let (mut session, clock) = session(vec![image("a.jpg", None), image("a.png", None), image("b.jpg", None)]);
        session.set_options(CompressionOptions { format: OutputFormat::Webp, ..lossy(60) }).unwrap();
        session.start().unwrap();
        run_to_end(&mut session, &clock);

        let bridge = RecordingBridge::with_directory("/out");
        let report = session.export_all(&bridge).await.unwrap().unwrap();
        assert_eq!(report.saved, vec!["/out/compressed_a.webp", "/out/compressed_a_2.webp", "/out/compressed_b.webp"]);
        assert_eq!(session.items()[0].image.path, "/out/compressed_a.webp");
        assert_eq!(session.items()[1].image.path, "/out/compressed_a_2.webp");

        let again = session.export_all(&bridge).await.unwrap().unwrap();
        assert_eq!(again.saved, report.saved);
    }

    #[test]
    fn zero_step_run_completes() {
        let (session, clock) = session(vec![image("a.jpg", None)]);
        let mut session = session.with_config(ProgressConfig { tick_interval: Duration::from_millis(10), progress_step: 0 });
        session.start().unwrap();
        for _ in 0..100 {
            clock.advance(Duration::from_millis(10));
            session.tick().unwrap();
        }
        assert_eq!(session.stage(), BatchStage::Complete);
    }

    #[tokio::test]
    async fn cancelled_export_picker_is_a_no_op() {
        let (mut session, clock) = session(vec![image("a.jpg", None)]);
        session.start().unwrap();
        run_to_end(&mut session, &clock);

        let bridge = RecordingBridge::default();
        assert!(session.export_all(&bridge).await.unwrap().is_none());
        assert!(bridge.written().is_empty());
        assert_eq!(session.save_dir(), None);
    }

    #[tokio::test]
    async fn add_from_bridge_appends() {
        let (mut session, _) = session(vec![image("a.jpg", None)]);
        let bridge = RecordingBridge::default();
        bridge.queue_selection(vec![image("a.jpg", None), image("z.jpg", None)]);
        assert_eq!(session.add_from_bridge(&bridge).await.unwrap(), 2);
        assert_eq!(session.items().len(), 3);
        assert_eq!(session.items()[2].id, "img-3");
    }
}
