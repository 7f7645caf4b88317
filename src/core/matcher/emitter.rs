// SPDX-License-Identifier: MIT OR Apache-2.0

//! Emission of completed contexts under the SKIP / OUTPUT policies.
//!
//! Completed contexts queue in `match_start` order (starts are unique: at
//! most one context is created per row) and drain front-to-back each row.
//! An entry whose start reaches the earliest still-active context stops the
//! drain: no match may be emitted past a live earlier attempt, whatever the
//! SKIP mode. `PAST_LAST` additionally discards entries overlapping the
//! last emission; `TO_NEXT` holds entries whose end overlaps the earliest
//! active start until that attempt resolves.

use log::debug;
use serde::Serialize;

use super::context::MatchContext;
use crate::core::config::{MatcherConfig, OutputMode, SkipMode};
use crate::core::pattern::Pattern;

/// One emitted match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchEmission {
    pub context_id: u64,
    pub match_start: usize,
    pub match_end: usize,
    /// Completed paths as variable names. One path under `ONE_ROW`, every
    /// completed path in ascending seq order under `ALL_ROWS`.
    pub paths: Vec<Vec<String>>,
}

/// What the per-row drain produced.
#[derive(Debug, Default)]
pub struct DrainOutcome {
    pub emitted: Vec<MatchEmission>,
    /// Context ids discarded by the `PAST_LAST` overlap rule.
    pub discarded: Vec<u64>,
}

#[derive(Debug, Default)]
pub struct Emitter {
    /// Completed contexts awaiting emission, ordered by `match_start`.
    queue: Vec<MatchContext>,
    /// Largest `match_end` emitted so far.
    last_emitted_end: Option<usize>,
}

impl Emitter {
    pub fn enqueue(&mut self, context: MatchContext) {
        debug_assert!(context.is_completed);
        let at = self
            .queue
            .partition_point(|entry| entry.match_start < context.match_start);
        self.queue.insert(at, context);
    }

    pub fn queued_ids(&self) -> Vec<u64> {
        self.queue.iter().map(|entry| entry.id).collect()
    }

    /// Completed contexts still waiting in the queue.
    pub fn queued_contexts(&self) -> &[MatchContext] {
        &self.queue
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn reset(&mut self) {
        self.queue.clear();
        self.last_emitted_end = None;
    }

    /// Drain the queue in `match_start` order. `active_start` is the
    /// earliest `match_start` among live, non-completed contexts (`None`
    /// when there is none).
    pub fn drain(
        &mut self,
        pattern: &Pattern,
        config: &MatcherConfig,
        active_start: Option<usize>,
    ) -> DrainOutcome {
        let mut outcome = DrainOutcome::default();

        while let Some(entry) = self.queue.first() {
            if active_start.is_some_and(|active| entry.match_start >= active) {
                // An earlier attempt is still alive; nothing later may
                // overtake it.
                break;
            }
            if config.skip_mode == SkipMode::PastLast
                && self
                    .last_emitted_end
                    .is_some_and(|end| entry.match_start <= end)
            {
                let entry = self.queue.remove(0);
                debug!(
                    "context {} discarded: match {}..{} overlaps last emission",
                    entry.id,
                    entry.match_start,
                    entry.match_end.unwrap_or(entry.match_start)
                );
                outcome.discarded.push(entry.id);
                continue;
            }
            let match_end = entry.match_end.expect("completed context has an end");
            if config.skip_mode == SkipMode::ToNext
                && active_start.is_some_and(|active| match_end >= active)
            {
                // Must wait until the overlapping active attempt resolves.
                break;
            }

            let entry = self.queue.remove(0);
            self.last_emitted_end = Some(match_end);
            outcome.emitted.push(emission_for(&entry, pattern, config));
        }

        outcome
    }
}

fn emission_for(
    context: &MatchContext,
    pattern: &Pattern,
    config: &MatcherConfig,
) -> MatchEmission {
    let to_names = |steps: &[usize]| -> Vec<String> {
        steps
            .iter()
            .map(|&id| pattern.variable_name(id).to_string())
            .collect()
    };
    let paths: Vec<Vec<String>> = match config.output_mode {
        OutputMode::OneRow => context
            .lexically_first_completed()
            .into_iter()
            .map(|p| to_names(&p.steps))
            .collect(),
        OutputMode::AllRows => context
            .completed_in_seq_order()
            .into_iter()
            .map(|p| to_names(&p.steps))
            .collect(),
    };
    debug!(
        "emit context {} rows {}..{} ({} path(s))",
        context.id,
        context.match_start,
        context.match_end.expect("completed"),
        paths.len()
    );
    MatchEmission {
        context_id: context.id,
        match_start: context.match_start,
        match_end: context.match_end.expect("completed context has an end"),
        paths,
    }
}
