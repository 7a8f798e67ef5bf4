//! Processed-image history and its merge rules.

use std::collections::HashSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::core::ProcessedResult;

/// What a single-result merge did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Replaced,
    Prepended,
}

/// History list, newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    entries: Vec<ProcessedResult>,
}

impl History {
    pub fn from_entries(entries: Vec<ProcessedResult>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[ProcessedResult] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ProcessedResult> {
        self.entries.get(index)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Merges one result, keyed by id and then by non-empty path.
    ///
    /// Matching entries are replaced in place with a refreshed timestamp;
    /// an unmatched result is prepended.
    pub fn insert(&mut self, result: ProcessedResult, now: DateTime<Utc>) -> MergeOutcome {
        let fresh = ProcessedResult { timestamp: now, ..result };
        let mut replaced = false;
        for entry in self.entries.iter_mut() {
            if fresh.same_image(entry) {
                *entry = fresh.clone();
                replaced = true;
            }
        }

        if replaced {
            debug!("History entry {} replaced", fresh.id);
            MergeOutcome::Replaced
        } else {
            debug!("History entry {} added", fresh.id);
            self.entries.insert(0, fresh);
            MergeOutcome::Prepended
        }
    }

    /// Puts a whole batch at the front, in batch order.
    ///
    /// Older entries sharing an id or a non-empty path with any batch item
    /// are dropped first.
    pub fn merge_batch(&mut self, batch: Vec<ProcessedResult>, now: DateTime<Utc>) {
        if batch.is_empty() {
            return;
        }

        let ids: HashSet<String> = batch.iter().map(|r| r.id.clone()).collect();
        let paths: HashSet<String> = batch
            .iter()
            .filter(|r| !r.path.is_empty())
            .map(|r| r.path.clone())
            .collect();

        let previous = std::mem::take(&mut self.entries);
        let added = batch.len();
        self.entries = batch
            .into_iter()
            .map(|r| ProcessedResult { timestamp: now, ..r })
            .collect();
        self.entries.extend(
            previous
                .into_iter()
                .filter(|old| !ids.contains(&old.id) && !(!old.path.is_empty() && paths.contains(&old.path))),
        );

        debug!("History updated: {} batch entries, {} total", added, self.entries.len());
    }
}
