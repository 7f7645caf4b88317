// SPDX-License-Identifier: MIT OR Apache-2.0

//! # NFA Pattern Matcher
//!
//! The row-driven executor. One matcher instance per partition: it owns the
//! compiled pattern, the live match contexts, the emission queue and both
//! monotonic counters (context ids and path seqs). `process_row` is strictly
//! synchronous and strictly ordered by row index; everything the engine
//! observes about a row happens inside that one call.
//!
//! Per row:
//! 1. try to start a new context (only if some wait position can actually
//!    consume this row);
//! 2. step every existing non-completed context (consume → expand → greedy
//!    deferral);
//! 3. absorb dominated contexts;
//! 4. hand completed contexts to the emitter and drain its queue;
//! 5. publish a diagnostic snapshot and drop dead contexts.

pub mod absorption;
pub mod context;
pub mod emitter;
pub mod match_state;
pub mod snapshot;
pub mod summary;
pub mod transition;

pub use context::MatchContext;
pub use emitter::{Emitter, MatchEmission};
pub use match_state::{MatchState, StateKey, COMPLETED};
pub use snapshot::{AbsorptionRecord, ContextSnapshot, RowSnapshot, StateRecord};
pub use summary::{AggregateValue, Aggregates, MatchPath, SeqGen, Summary};

use std::collections::HashSet;

use log::debug;

use crate::core::config::MatcherConfig;
use crate::core::error::{RowFluxError, RowFluxResult};
use crate::core::pattern::Pattern;
use crate::pattern_compiler;

use absorption::absorb_contexts;
use snapshot::{context_snapshot, RowTrace};
use transition::{dedup_partition, StepTrace, Stepper};

#[derive(Debug)]
pub struct PatternMatcher {
    pattern: Pattern,
    config: MatcherConfig,
    seqs: SeqGen,
    next_context_id: u64,
    next_row: usize,
    /// Live (not yet completed) contexts, sorted by `match_start`.
    contexts: Vec<MatchContext>,
    emitter: Emitter,
    history: Vec<RowSnapshot>,
}

impl PatternMatcher {
    pub fn new(pattern: Pattern, config: MatcherConfig) -> Self {
        PatternMatcher {
            pattern,
            config,
            seqs: SeqGen::default(),
            next_context_id: 0,
            next_row: 0,
            contexts: Vec::new(),
            emitter: Emitter::default(),
            history: Vec::new(),
        }
    }

    /// Compile `pattern` and build a matcher for it.
    pub fn from_pattern_str(pattern: &str, config: MatcherConfig) -> RowFluxResult<Self> {
        let compiled = pattern_compiler::compile(pattern)?;
        Ok(Self::new(compiled, config))
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Live contexts currently retained (absorption keeps this bounded).
    pub fn live_context_count(&self) -> usize {
        self.contexts.len()
    }

    /// Diagnostic history, one snapshot per processed row.
    pub fn snapshots(&self) -> &[RowSnapshot] {
        &self.history
    }

    pub fn take_snapshots(&mut self) -> Vec<RowSnapshot> {
        std::mem::take(&mut self.history)
    }

    /// Drop all runtime state and zero both counters. The next accepted
    /// row index is 0 again.
    pub fn reset(&mut self) {
        self.contexts.clear();
        self.emitter.reset();
        self.history.clear();
        self.seqs.reset();
        self.next_context_id = 0;
        self.next_row = 0;
    }

    /// Process one row. `true_vars` are the variable names whose conditions
    /// hold for this row; names outside the pattern's alphabet are ignored
    /// (drivers may evaluate a superset of conditions). Returns the matches
    /// emitted by this row.
    pub fn process_row<S: AsRef<str>>(
        &mut self,
        row_index: usize,
        true_vars: &[S],
    ) -> RowFluxResult<Vec<MatchEmission>> {
        if row_index != self.next_row {
            return Err(RowFluxError::OutOfOrderRow {
                expected: self.next_row,
                got: row_index,
            });
        }
        self.next_row += 1;

        let input_names: Vec<String> = true_vars
            .iter()
            .map(|name| name.as_ref().to_string())
            .collect();
        let row_vars: HashSet<usize> = input_names
            .iter()
            .filter_map(|name| self.pattern.variable_id(name))
            .collect();

        let mut row_trace = RowTrace::default();

        // 1. A fresh attempt may begin on this row.
        let new_context = self.try_start(row_index, &row_vars, &mut row_trace);

        // 2. Step the attempts already in flight.
        let mut contexts = std::mem::take(&mut self.contexts);
        for ctx in contexts.iter_mut() {
            if ctx.match_start < row_index && !ctx.is_completed {
                self.step_context(ctx, &row_vars, &mut row_trace);
            }
        }
        if let Some(ctx) = new_context {
            contexts.push(ctx);
        }
        self.contexts = contexts;

        // 3. Drop attempts an earlier context dominates.
        let absorptions = absorb_contexts(&mut self.contexts, &self.pattern);

        // 4. Completed contexts leave the live set and queue for emission.
        let mut idx = 0;
        while idx < self.contexts.len() {
            if self.contexts[idx].is_completed {
                let ctx = self.contexts.remove(idx);
                debug!(
                    "context {} completed: rows {}..{}",
                    ctx.id,
                    ctx.match_start,
                    ctx.match_end.expect("completed context has an end")
                );
                self.emitter.enqueue(ctx);
            } else {
                idx += 1;
            }
        }
        let active_start = self
            .contexts
            .iter()
            .filter(|ctx| !ctx.is_dead())
            .map(|ctx| ctx.match_start)
            .min();
        let outcome = self
            .emitter
            .drain(&self.pattern, &self.config, active_start);

        // 5. Snapshot before dead contexts disappear, then drop them.
        let snapshot = self.build_snapshot(
            row_index,
            input_names,
            row_trace,
            absorptions,
            &outcome,
        );
        self.history.push(snapshot);
        self.contexts.retain(|ctx| !ctx.is_dead());

        Ok(outcome.emitted)
    }

    /// Build the initial wait frontier and keep only the states that can
    /// consume this row; if any survive, a new context starts here and
    /// immediately takes its first step.
    fn try_start(
        &mut self,
        row: usize,
        row_vars: &HashSet<usize>,
        row_trace: &mut RowTrace,
    ) -> Option<MatchContext> {
        let initial = MatchState::initial(self.pattern.max_depth, &mut self.seqs);
        let mut scratch = StepTrace::default();
        let mut stepper = Stepper::new(&self.pattern, &mut self.seqs);
        let expansion = stepper.expand(vec![initial], &mut scratch);
        let starters: Vec<MatchState> = expansion
            .frontier
            .into_iter()
            .filter(|state| stepper.state_can_consume(state, row_vars))
            .collect();
        if starters.is_empty() {
            return None;
        }

        let id = self.next_context_id;
        self.next_context_id += 1;
        debug!("context {id} started at row {row}");
        row_trace.logs.push(format!("context {id} started at row {row}"));

        let mut ctx = MatchContext::new(id, row, starters);
        self.step_context(&mut ctx, row_vars, row_trace);
        Some(ctx)
    }

    /// One consumption + expansion step for a context, including the greedy
    /// deferral bookkeeping.
    fn step_context(
        &mut self,
        ctx: &mut MatchContext,
        row_vars: &HashSet<usize>,
        row_trace: &mut RowTrace,
    ) {
        let wait_states = std::mem::take(&mut ctx.states);
        let mut step_trace = StepTrace::default();
        let mut stepper = Stepper::new(&self.pattern, &mut self.seqs);

        // Consumption.
        let mut actives = Vec::new();
        let mut completed = Vec::new();
        for state in wait_states {
            let key = state.key();
            let successors = stepper.consume(state, row_vars);
            if successors.is_empty() {
                step_trace.dead.push(key);
                continue;
            }
            for successor in successors {
                if successor.is_completed() {
                    completed.push(successor);
                } else {
                    actives.push(successor);
                }
            }
        }
        let actives = dedup_partition(actives, &mut step_trace);
        let mut completed = dedup_partition(completed, &mut step_trace);

        // Expansion to the next wait frontier.
        let expansion = stepper.expand(actives, &mut step_trace);
        let mut frontier = expansion.frontier;

        let row_has_pattern_var = !row_vars.is_empty();
        if !row_has_pattern_var {
            frontier.retain(|state| {
                let keep = stepper.wait_state_is_viable(state, row_vars);
                if !keep {
                    step_trace.discarded.push(state.key());
                }
                keep
            });
        }

        // Fold completions reached during expansion into the consumption
        // ones, merging by state hash.
        completed.extend(expansion.completed);
        let completed = dedup_partition(completed, &mut step_trace);

        let live_can_progress = frontier
            .iter()
            .any(|state| stepper.state_can_consume(state, row_vars));

        let candidates: Vec<MatchPath> = completed
            .iter()
            .flat_map(|state| state.summaries.iter())
            .flat_map(|summary| summary.paths.iter())
            .cloned()
            .collect();

        if self.pattern.reluctant {
            // Globally reluctant: the first completion reached is accepted
            // immediately; the attempt does not keep extending past it.
            for path in candidates {
                ctx.push_completed(path);
            }
            if !ctx.completed_paths.is_empty() && !frontier.is_empty() {
                debug!(
                    "context {}: reluctant completion accepted, dropping {} live state(s)",
                    ctx.id,
                    frontier.len()
                );
                for state in frontier.drain(..) {
                    step_trace.discarded.push(state.key());
                }
            }
        } else if !candidates.is_empty()
            && !frontier.is_empty()
            && live_can_progress
            && row_has_pattern_var
        {
            // A longer match is still in play: keep only the best completion
            // as fallback and defer the rest.
            let best = candidates
                .iter()
                .max_by(|a, b| a.len().cmp(&b.len()).then(b.seq.cmp(&a.seq)))
                .cloned()
                .expect("candidates checked non-empty");
            let replace = ctx
                .greedy_fallback
                .as_ref()
                .map_or(true, |fallback| best.len() > fallback.len());
            if replace {
                debug!(
                    "context {}: greedy fallback now length {}",
                    ctx.id,
                    best.len()
                );
                ctx.greedy_fallback = Some(best);
            }
            row_trace.logs.push(format!(
                "context {}: {} completion(s) deferred (greedy_defer)",
                ctx.id,
                candidates.len()
            ));
        } else if frontier.is_empty() || !live_can_progress || !row_has_pattern_var {
            // Extension is over (or never applied): commit the fallback,
            // then this step's completions.
            if let Some(fallback) = ctx.greedy_fallback.take() {
                ctx.push_completed(fallback);
            }
            for path in candidates {
                ctx.push_completed(path);
            }
        }

        ctx.refresh_match_end();
        ctx.states = frontier;
        if ctx.states.is_empty() && !ctx.completed_paths.is_empty() {
            ctx.is_completed = true;
        }

        row_trace.absorb_step(ctx.id, step_trace);
    }

    fn build_snapshot(
        &self,
        row: usize,
        input: Vec<String>,
        row_trace: RowTrace,
        absorptions: Vec<AbsorptionRecord>,
        outcome: &emitter::DrainOutcome,
    ) -> RowSnapshot {
        let contexts = self
            .contexts
            .iter()
            .chain(self.emitter.queued_contexts())
            .map(|ctx| context_snapshot(ctx, &self.pattern))
            .collect();
        RowSnapshot {
            row,
            input,
            contexts,
            absorptions,
            state_merges: row_trace.state_merges,
            discarded_states: row_trace.discarded_states,
            dead_states: row_trace.dead_states,
            emitted: outcome.emitted.clone(),
            queued: self.emitter.queued_ids(),
            discarded: outcome.discarded.clone(),
            logs: row_trace.logs,
        }
    }
}
