//! Application shell.
//!
//! Owns the current page, the session in flight, the processed-image
//! history and the settings, and routes user actions between them.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::bridge::SelectionBridge;
use crate::core::{
    AppSettings, History, ImageDescriptor, ProcessedResult, SharedClock, SharedIds,
    Theme,
};
use crate::processing::{BatchSession, SingleImageSession};
use crate::store::{self, KeyValueStore};
use crate::utils::{CompressorError, CompressorResult, validate_index};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Page {
    #[default]
    Home,
    SingleProcess,
    BatchProcess,
    Settings,
}

impl Page {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::SingleProcess => "single-process",
            Self::BatchProcess => "batch-process",
            Self::Settings => "settings",
        }
    }
}

/// The processing flow currently open, if any
pub enum ActiveSession {
    Idle,
    Single(SingleImageSession),
    Batch(BatchSession),
}

/// How the single-image result is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// Overwrite the recorded path, prompting only when there is none
    Save,
    /// Always prompt
    SaveAs,
}

pub struct AppState<S> {
    store: S,
    clock: SharedClock,
    ids: SharedIds,
    page: Page,
    session: ActiveSession,
    history: History,
    settings: Option<AppSettings>,
    theme: Theme,
    system_prefers_dark: bool,
}

impl<S: KeyValueStore> AppState<S> {
    /// Restores history and settings from `store`.
    ///
    /// Missing or malformed entries load as an empty history and no settings.
    pub fn load(store: S, clock: SharedClock, ids: SharedIds, system_prefers_dark: bool) -> Self {
        let history = store::load_history(&store);
        let settings = store::load_settings(&store);
        let theme = settings
            .as_ref()
            .map(|s| s.general.theme.resolve(system_prefers_dark))
            .unwrap_or_default();

        info!(
            "State loaded: {} history entries, settings {}",
            history.len(),
            if settings.is_some() { "restored" } else { "absent" }
        );

        Self {
            store,
            clock,
            ids,
            page: Page::Home,
            session: ActiveSession::Idle,
            history,
            settings,
            theme,
            system_prefers_dark,
        }
    }

    // ── Accessors ───────────────────────────────────────────────────────────────────

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn settings(&self) -> Option<&AppSettings> {
        self.settings.as_ref()
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn session(&self) -> &ActiveSession {
        &self.session
    }

    pub fn single(&self) -> Option<&SingleImageSession> {
        match &self.session {
            ActiveSession::Single(session) => Some(session),
            ActiveSession::Idle | ActiveSession::Batch(_) => None,
        }
    }

    pub fn single_mut(&mut self) -> Option<&mut SingleImageSession> {
        match &mut self.session {
            ActiveSession::Single(session) => Some(session),
            ActiveSession::Idle | ActiveSession::Batch(_) => None,
        }
    }

    pub fn batch(&self) -> Option<&BatchSession> {
        match &self.session {
            ActiveSession::Batch(session) => Some(session),
            ActiveSession::Idle | ActiveSession::Single(_) => None,
        }
    }

    pub fn batch_mut(&mut self) -> Option<&mut BatchSession> {
        match &mut self.session {
            ActiveSession::Batch(session) => Some(session),
            ActiveSession::Idle | ActiveSession::Single(_) => None,
        }
    }

    // ── Selection ───────────────────────────────────────────────────────────────────

    /// Routes picked images: one opens the single flow, several the batch
    /// flow, none does nothing.
    pub fn pick_images(&mut self, mut images: Vec<ImageDescriptor>) -> CompressorResult<Page> {
        match images.len() {
            0 => {
                debug!("Empty selection ignored");
                Ok(self.page)
            }
            1 => {
                let image = images.remove(0);
                self.select_image(image)?;
                Ok(self.page)
            }
            _ => {
                self.select_batch(images);
                Ok(self.page)
            }
        }
    }

    pub fn select_image(&mut self, image: ImageDescriptor) -> CompressorResult<()> {
        let session = SingleImageSession::new(image, self.settings.as_ref(), self.clock.clone(), self.ids.clone())?;
        info!("Opening {} for compression", session.image().name);
        self.session = ActiveSession::Single(session);
        self.page = Page::SingleProcess;
        Ok(())
    }

    pub fn select_batch(&mut self, images: Vec<ImageDescriptor>) {
        info!("Opening batch of {} images", images.len());
        let session = BatchSession::new(images, self.settings.as_ref(), self.clock.clone(), self.ids.clone());
        self.session = ActiveSession::Batch(session);
        self.page = Page::BatchProcess;
    }

    /// Picker on the home page
    pub async fn upload<B: SelectionBridge>(&mut self, bridge: &B) -> CompressorResult<Page> {
        let images = bridge.select_many().await?;
        self.pick_images(images)
    }

    /// "Batch upload" always opens the batch flow, even for one image
    pub async fn upload_batch<B: SelectionBridge>(&mut self, bridge: &B) -> CompressorResult<Page> {
        let images = bridge.select_many().await?;
        if !images.is_empty() {
            self.select_batch(images);
        }
        Ok(self.page)
    }

    pub async fn drop_files<B: SelectionBridge>(&mut self, bridge: &B, paths: &[String]) -> CompressorResult<Page> {
        let images = bridge.read_dropped(paths).await;
        self.pick_images(images)
    }

    // ── Completion ──────────────────────────────────────────────────────────────────

    /// Takes the single-image outcome and returns home.
    ///
    /// `None` means the user left without saving.
    pub fn complete_single(&mut self, result: Option<ProcessedResult>) {
        if let Some(result) = result {
            let outcome = self.history.insert(result, self.clock.timestamp());
            debug!("Single result merged: {:?}", outcome);
            self.persist_history();
        }
        self.go_home();
    }

    /// Merges a finished batch into the history and returns home.
    pub fn complete_batch(&mut self, results: Vec<ProcessedResult>) {
        if !results.is_empty() {
            info!("Batch finished with {} results", results.len());
            self.history.merge_batch(results, self.clock.timestamp());
            self.persist_history();
        }
        self.go_home();
    }

    /// Saves the single-image result and, once written, hands it to the history.
    ///
    /// A cancelled dialog keeps the session open. A write failure is returned
    /// and also keeps the session open so the save can be retried.
    pub async fn save_single<B: SelectionBridge>(&mut self, bridge: &B, mode: SaveMode) -> CompressorResult<Option<ProcessedResult>> {
        let page = self.page.name();
        let session = self
            .single_mut()
            .ok_or_else(|| CompressorError::transition(page, "save"))?;

        let saved = match mode {
            SaveMode::Save => session.save(bridge).await?,
            SaveMode::SaveAs => session.save_as(bridge).await?,
        };

        if let Some(result) = &saved {
            self.complete_single(Some(result.clone()));
        }
        Ok(saved)
    }

    pub fn discard_single(&mut self) -> CompressorResult<()> {
        match std::mem::replace(&mut self.session, ActiveSession::Idle) {
            ActiveSession::Single(session) => {
                session.discard();
                self.go_home();
                Ok(())
            }
            other => {
                self.session = other;
                Err(CompressorError::transition(self.page.name(), "discard"))
            }
        }
    }

    /// Forwards every completed batch item to the history.
    pub fn finish_batch(&mut self) -> CompressorResult<usize> {
        let page = self.page.name();
        let results = self
            .batch()
            .ok_or_else(|| CompressorError::transition(page, "finish"))?
            .finish()?;
        let count = results.len();
        self.complete_batch(results);
        Ok(count)
    }

    /// Leaves a completed batch without recording it.
    pub fn start_new_batch(&mut self) -> CompressorResult<()> {
        let page = self.page.name();
        let results = self
            .batch()
            .ok_or_else(|| CompressorError::transition(page, "start a new batch"))?
            .new_batch()?;
        self.complete_batch(results);
        Ok(())
    }

    fn go_home(&mut self) {
        self.session = ActiveSession::Idle;
        self.page = Page::Home;
    }

    fn persist_history(&self) {
        if self.history.is_empty() {
            return;
        }
        if let Err(e) = store::save_history(&self.store, &self.history) {
            warn!("Failed to persist history: {}", e);
        }
    }

    // ── Navigation, settings and history ────────────────────────────────────────────

    /// Back button: drops any open session
    pub fn back_home(&mut self) {
        self.go_home();
    }

    pub fn open_settings(&mut self) {
        self.page = Page::Settings;
    }

    /// Replaces the settings, re-resolves the theme and persists them.
    ///
    /// A store failure is logged; the new settings stay in effect.
    pub fn save_settings(&mut self, settings: AppSettings) {
        self.theme = settings.general.theme.resolve(self.system_prefers_dark);
        if let Err(e) = store::save_settings(&self.store, &settings) {
            warn!("Failed to persist settings: {}", e);
        }
        info!("Settings saved, theme {:?}", self.theme);
        self.settings = Some(settings);
    }

    pub fn restore_default_settings(&mut self) {
        let mut settings = self.settings.clone().unwrap_or_default();
        settings.reset();
        self.save_settings(settings);
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }

    /// Empties the history, on disk too
    pub fn clear_history(&mut self) {
        self.history.clear();
        if let Err(e) = store::save_history(&self.store, &self.history) {
            warn!("Failed to persist cleared history: {}", e);
        }
    }

    /// Opens a history entry's saved file with the system viewer.
    pub async fn open_history_item<B: SelectionBridge>(&self, bridge: &B, index: usize) -> CompressorResult<bool> {
        validate_index(index, self.history.len())?;
        let Some(entry) = self.history.get(index) else {
            return Ok(false);
        };
        if entry.path.is_empty() {
            return Ok(false);
        }
        Ok(bridge.open_externally(&entry.path).await)
    }
}
