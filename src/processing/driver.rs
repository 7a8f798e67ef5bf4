//! Async tick driver.
//!
//! Sessions only move when `tick` is called; this runs those ticks on a
//! fixed tokio interval until the session leaves its processing stage.

use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};
use tracing::debug;

use crate::core::Progress;
use crate::processing::batch::{BatchSession, BatchStage};
use crate::processing::single::{SingleImageSession, SingleStage};
use crate::utils::CompressorResult;

/// A session that advances through discrete progress ticks.
pub trait ProgressSession {
    fn tick(&mut self) -> CompressorResult<Progress>;
    fn is_running(&self) -> bool;
    fn is_paused(&self) -> bool {
        false
    }
    fn tick_interval(&self) -> Duration;
}

impl ProgressSession for BatchSession {
    fn tick(&mut self) -> CompressorResult<Progress> {
        BatchSession::tick(self)
    }

    fn is_running(&self) -> bool {
        self.stage() == BatchStage::Processing
    }

    fn is_paused(&self) -> bool {
        BatchSession::is_paused(self)
    }

    fn tick_interval(&self) -> Duration {
        self.config().tick_interval
    }
}

impl ProgressSession for SingleImageSession {
    fn tick(&mut self) -> CompressorResult<Progress> {
        SingleImageSession::tick(self)
    }

    fn is_running(&self) -> bool {
        matches!(self.stage(), SingleStage::Processing { .. })
    }

    fn tick_interval(&self) -> Duration {
        self.config().tick_interval
    }
}

/// Ticks `session` until it stops running or is paused.
///
/// `progress_callback` receives every snapshot. Returns the last snapshot,
/// or `None` when the session was not running.
pub async fn drive<S: ProgressSession>(
    session: &mut S,
    mut progress_callback: impl FnMut(&Progress),
) -> CompressorResult<Option<Progress>> {
    let mut ticker = interval(session.tick_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // first tick completes immediately
    ticker.tick().await;

    let mut last = None;
    let mut ticks = 0u32;
    while session.is_running() && !session.is_paused() {
        ticker.tick().await;
        let progress = session.tick()?;
        progress_callback(&progress);
        last = Some(progress);
        ticks += 1;
    }

    debug!("Driver stopped after {} ticks", ticks);
    Ok(last)
}
