// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-row diagnostic snapshots.
//!
//! After every row the matcher publishes what happened: the surviving
//! contexts, absorptions, state merges, dead and discarded states, and the
//! emitter's activity. Debuggers and tests consume this stream; it never
//! gates correctness and a production driver is free to drop it.

use serde::Serialize;

use super::context::MatchContext;
use super::emitter::MatchEmission;
use super::match_state::MatchState;
use super::summary::MatchPath;
use crate::core::pattern::Pattern;

/// A state reference inside a snapshot: `element` is `None` once the state
/// has completed the pattern.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateRecord {
    pub context_id: u64,
    pub element: Option<usize>,
    pub counts: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbsorptionRecord {
    pub absorbed: u64,
    pub by: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PathSnapshot {
    pub seq: u64,
    pub path: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StateSnapshot {
    pub element: Option<usize>,
    pub counts: Vec<usize>,
    pub paths: Vec<PathSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContextSnapshot {
    pub id: u64,
    pub match_start: usize,
    pub match_end: Option<usize>,
    pub is_completed: bool,
    pub states: Vec<StateSnapshot>,
    pub completed_paths: Vec<PathSnapshot>,
}

/// Everything observable about one `process_row` call.
#[derive(Debug, Clone, Serialize)]
pub struct RowSnapshot {
    pub row: usize,
    /// The row's true variables as supplied by the driver, unknown names
    /// included.
    pub input: Vec<String>,
    pub contexts: Vec<ContextSnapshot>,
    pub absorptions: Vec<AbsorptionRecord>,
    pub state_merges: Vec<StateRecord>,
    pub discarded_states: Vec<StateRecord>,
    pub dead_states: Vec<StateRecord>,
    pub emitted: Vec<MatchEmission>,
    /// Contexts sitting in the emission queue after this row.
    pub queued: Vec<u64>,
    /// Contexts discarded by the SKIP policy this row.
    pub discarded: Vec<u64>,
    pub logs: Vec<String>,
}

impl RowSnapshot {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("snapshot serializes")
    }
}

/// Accumulates the per-row records while contexts step; drained into the
/// published [`RowSnapshot`] at the end of `process_row`.
#[derive(Debug, Default)]
pub(crate) struct RowTrace {
    pub dead_states: Vec<StateRecord>,
    pub state_merges: Vec<StateRecord>,
    pub discarded_states: Vec<StateRecord>,
    pub logs: Vec<String>,
}

impl RowTrace {
    /// Attribute one context's step records to its id.
    pub fn absorb_step(
        &mut self,
        context_id: u64,
        step_trace: super::transition::StepTrace,
    ) {
        let record = |key: super::match_state::StateKey| StateRecord {
            context_id,
            element: (key.element != super::match_state::COMPLETED).then_some(key.element),
            counts: key.counts,
        };
        self.dead_states
            .extend(step_trace.dead.into_iter().map(&record));
        self.state_merges
            .extend(step_trace.merges.into_iter().map(&record));
        self.discarded_states
            .extend(step_trace.discarded.into_iter().map(&record));
    }
}

pub(crate) fn path_snapshot(path: &MatchPath, pattern: &Pattern) -> PathSnapshot {
    PathSnapshot {
        seq: path.seq,
        path: path
            .steps
            .iter()
            .map(|&id| pattern.variable_name(id).to_string())
            .collect(),
    }
}

pub(crate) fn state_snapshot(state: &MatchState, pattern: &Pattern) -> StateSnapshot {
    StateSnapshot {
        element: (!state.is_completed()).then_some(state.element),
        counts: state.counts.clone(),
        paths: state
            .summaries
            .iter()
            .flat_map(|summary| summary.paths.iter())
            .map(|path| path_snapshot(path, pattern))
            .collect(),
    }
}

pub(crate) fn context_snapshot(context: &MatchContext, pattern: &Pattern) -> ContextSnapshot {
    ContextSnapshot {
        id: context.id,
        match_start: context.match_start,
        match_end: context.match_end,
        is_completed: context.is_completed,
        states: context
            .states
            .iter()
            .map(|state| state_snapshot(state, pattern))
            .collect(),
        completed_paths: context
            .completed_paths
            .iter()
            .map(|path| path_snapshot(path, pattern))
            .collect(),
    }
}
