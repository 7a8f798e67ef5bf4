use std::time::Duration;
use serde::{Deserialize, Serialize};

/// Timing of the simulated progress driver.
///
/// Every tick advances the current item by `progress_step` percent; the
/// async driver waits `tick_interval` between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressConfig {
    pub tick_interval: Duration,
    pub progress_step: u8,
}

impl ProgressConfig {
    /// 100 ms / 5% per batch item
    pub fn batch() -> Self {
        Self {
            tick_interval: Duration::from_millis(100),
            progress_step: 5,
        }
    }

    /// 200 ms / 5% for a single image
    pub fn single() -> Self {
        Self {
            tick_interval: Duration::from_millis(200),
            progress_step: 5,
        }
    }

    /// Percent added per tick; a zero step counts as 1 so a run always ends
    pub fn step(&self) -> u8 {
        self.progress_step.max(1)
    }
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self::batch()
    }
}
