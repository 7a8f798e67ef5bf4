use serde::{Deserialize, Serialize};

/// Progress message type
#[derive(Debug, Deserialize, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ProgressType {
    Start,
    Progress,
    Complete,
}

/// Snapshot emitted after every tick of a processing session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub progress_type: ProgressType,
    /// Items finished so far
    pub completed_tasks: usize,
    /// Items in this run (selected ones for a batch, 1 for a single image)
    pub total_tasks: usize,
    /// Overall percentage (0-100)
    pub progress_percentage: f64,
    /// Percentage of the item currently being processed (0-100)
    pub current_progress: u8,
    /// Name of the item currently being processed
    #[serde(default)]
    pub current_file: Option<String>,
    /// Estimated seconds left
    pub time_remaining: u64,
}

impl Progress {
    pub fn is_complete(&self) -> bool {
        self.progress_type == ProgressType::Complete
    }
}

/// Remaining-time estimate from elapsed seconds and the fraction done.
///
/// `elapsed / fraction - elapsed`, rounded and floored at zero; zero while
/// nothing is done yet.
pub fn estimate_remaining(elapsed_secs: f64, fraction_done: f64) -> u64 {
    if fraction_done <= 0.0 {
        return 0;
    }
    let total = elapsed_secs / fraction_done;
    (total - elapsed_secs).round().max(0.0) as u64
}
