// SPDX-License-Identifier: MIT OR Apache-2.0

//! Match contexts.
//!
//! A context is one match attempt: every live state that started from the
//! same row, the completions committed so far, and the single preserved
//! greedy fallback. Context ids are stamped from a per-matcher monotonic
//! counter and double as the correlation key in the snapshot stream.

use serde::Serialize;

use super::match_state::MatchState;
use super::summary::MatchPath;

#[derive(Debug, Serialize)]
pub struct MatchContext {
    pub id: u64,
    /// Row the attempt started at.
    pub match_start: usize,
    /// Row of the longest committed completion; `None` until one exists.
    pub match_end: Option<usize>,
    /// All live states are gone and at least one completion was committed.
    pub is_completed: bool,
    /// Live wait states.
    pub states: Vec<MatchState>,
    /// Committed completions, deduplicated by variable-id sequence,
    /// insertion-ordered.
    pub completed_paths: Vec<MatchPath>,
    /// Longest deferred completion, waiting for the extension attempt to
    /// resolve.
    pub greedy_fallback: Option<MatchPath>,
}

impl MatchContext {
    pub fn new(id: u64, match_start: usize, states: Vec<MatchState>) -> Self {
        MatchContext {
            id,
            match_start,
            match_end: None,
            is_completed: false,
            states,
            completed_paths: Vec::new(),
            greedy_fallback: None,
        }
    }

    /// Commit a completion, deduplicating by path content; the first seq
    /// for a given content wins.
    pub fn push_completed(&mut self, path: MatchPath) {
        if path.is_empty() {
            return;
        }
        if !self
            .completed_paths
            .iter()
            .any(|existing| existing.steps == path.steps)
        {
            self.completed_paths.push(path);
        }
    }

    /// Recompute `match_end` from the committed completions; path length
    /// counts consumed rows.
    pub fn refresh_match_end(&mut self) {
        if let Some(longest) = self.completed_paths.iter().map(MatchPath::len).max() {
            self.match_end = Some(self.match_start + longest - 1);
        }
    }

    /// No live states and nothing committed: the attempt failed.
    pub fn is_dead(&self) -> bool {
        !self.is_completed && self.states.is_empty() && self.completed_paths.is_empty()
    }

    /// Committed completions ranked lexically: longest first, then
    /// smallest seq.
    pub fn lexically_first_completed(&self) -> Option<&MatchPath> {
        self.completed_paths
            .iter()
            .min_by(|a, b| b.len().cmp(&a.len()).then(a.seq.cmp(&b.seq)))
    }

    /// Committed completions in ascending seq order.
    pub fn completed_in_seq_order(&self) -> Vec<&MatchPath> {
        let mut paths: Vec<&MatchPath> = self.completed_paths.iter().collect();
        paths.sort_by_key(|p| p.seq);
        paths
    }
}
