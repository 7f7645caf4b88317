// SPDX-License-Identifier: MIT OR Apache-2.0

//! Element-level transitions: row consumption and epsilon expansion.
//!
//! Consumption starts from a wait position (`Var` or `AltStart`) and
//! produces the successor states for one input row, chaining through
//! skippable positions recursively so "skip then immediately match" works
//! within a single row. Expansion then walks the epsilon elements
//! (`GroupEnd`, `Fin`) until every surviving state rests on a wait position
//! again.
//!
//! Branch order is load-bearing everywhere here: at every fork point the
//! clone branch (original seqs) is produced before the fork branch (fresh
//! seqs), and the preference direction (greedy vs reluctant) decides which
//! of stay/advance or repeat/exit is the clone. That ordering, plus FIFO
//! expansion, is what makes lexical match order deterministic.

use std::collections::{HashMap, HashSet, VecDeque};

use log::trace;

use super::match_state::{MatchState, StateKey, COMPLETED};
use super::summary::SeqGen;
use crate::core::pattern::{ElementKind, Pattern};

/// Per-step diagnostic records, keyed back to contexts by the caller.
#[derive(Debug, Default)]
pub struct StepTrace {
    /// Wait states that produced no successor (mismatch).
    pub dead: Vec<StateKey>,
    /// Duplicate states merged away (consumption dedup and expansion
    /// seen-set).
    pub merges: Vec<StateKey>,
    /// Wait states removed by the non-viability filter.
    pub discarded: Vec<StateKey>,
}

/// Result of expanding a consumption step's active successors.
#[derive(Debug, Default)]
pub struct Expansion {
    /// New wait frontier, first-insertion order.
    pub frontier: Vec<MatchState>,
    /// States that reached completion during expansion.
    pub completed: Vec<MatchState>,
}

pub struct Stepper<'a> {
    pattern: &'a Pattern,
    seqs: &'a mut SeqGen,
}

impl<'a> Stepper<'a> {
    pub fn new(pattern: &'a Pattern, seqs: &'a mut SeqGen) -> Self {
        Stepper { pattern, seqs }
    }

    /// Transition one wait state under the row's true variables. An empty
    /// result means the state died on this row.
    pub fn consume(&mut self, state: MatchState, true_vars: &HashSet<usize>) -> Vec<MatchState> {
        self.consume_at(state, true_vars, 0)
    }

    fn consume_at(
        &mut self,
        mut state: MatchState,
        true_vars: &HashSet<usize>,
        depth: usize,
    ) -> Vec<MatchState> {
        // Chained skipping revisits at most every element once on an
        // acyclic walk; anything deeper is an empty group iteration
        // spinning on its own GroupEnd and cannot make progress.
        if depth > self.pattern.elements.len() {
            trace!("skip chain exceeded element count, dropping branch");
            return Vec::new();
        }

        let elem = self.pattern.element(state.element);
        match elem.kind {
            ElementKind::Var(var_id) => {
                let elem_depth = elem.depth;
                let count = state.counts[elem_depth];
                let next = elem.next.expect("non-Fin element has next");
                if true_vars.contains(&var_id) {
                    state.with_match(var_id);
                    let new_count = count + 1;
                    if new_count >= elem.max {
                        // Saturated: advance is forced.
                        state.counts[elem_depth] = 0;
                        state.element = next;
                        vec![state]
                    } else if new_count >= elem.min {
                        if elem.reluctant {
                            let mut advance = state.child_clone();
                            advance.counts[elem_depth] = 0;
                            advance.element = next;
                            let mut stay = state.child_fork(self.seqs);
                            stay.counts[elem_depth] = new_count;
                            vec![advance, stay]
                        } else {
                            let mut advance = state.child_fork(self.seqs);
                            advance.counts[elem_depth] = 0;
                            advance.element = next;
                            let mut stay = state;
                            stay.counts[elem_depth] = new_count;
                            vec![stay, advance]
                        }
                    } else {
                        state.counts[elem_depth] = new_count;
                        vec![state]
                    }
                } else if count >= elem.min {
                    // Mismatch, but the position is satisfied: skip it and
                    // try to consume the same row further along. A skip
                    // that cannot progress into a match must not leave a
                    // waiter behind.
                    state.counts[elem_depth] = 0;
                    state.element = next;
                    self.consume_at(state, true_vars, depth + 1)
                } else {
                    Vec::new()
                }
            }
            ElementKind::AltStart => {
                let alt_index = state.element;
                let mut results = Vec::new();
                for (arm_number, arm_first) in
                    self.pattern.arm_first_indices(alt_index).into_iter().enumerate()
                {
                    let mut branch = if arm_number == 0 {
                        state.child_clone()
                    } else {
                        state.child_fork(self.seqs)
                    };
                    branch.element = arm_first;
                    results.extend(self.consume_at(branch, true_vars, depth + 1));
                }
                if !results.is_empty() {
                    return results;
                }
                // No arm consumed; exit the enclosing group if its minimum
                // iterations are already banked.
                if let Some(group_end) = self.pattern.group_end_for_alt(alt_index) {
                    let ge = self.pattern.element(group_end);
                    if state.counts[ge.depth] >= ge.min {
                        let mut exit = state;
                        exit.counts[ge.depth] = 0;
                        exit.element = ge.next.expect("GroupEnd has next");
                        return self.consume_at(exit, true_vars, depth + 1);
                    }
                }
                Vec::new()
            }
            ElementKind::GroupEnd => {
                // Reached through a skip chain: nothing consumed yet, so
                // apply the iteration branching and keep trying to consume.
                let mut results = Vec::new();
                for branch in self.group_end_branches(state) {
                    results.extend(self.consume_at(branch, true_vars, depth + 1));
                }
                results
            }
            ElementKind::Fin => {
                state.element = COMPLETED;
                vec![state]
            }
        }
    }

    /// The 1-2 successor states of a `GroupEnd`, clone branch first.
    fn group_end_branches(&mut self, state: MatchState) -> Vec<MatchState> {
        let elem = self.pattern.element(state.element);
        let elem_depth = elem.depth;
        let new_count = state.counts[elem_depth] + 1;
        let loop_target = elem.group_start().expect("GroupEnd loops back");
        let next = elem.next.expect("GroupEnd has next");

        // For an unbounded group every count at or above `min` behaves the
        // same (exit stays allowed, the max is never reached), so the
        // counter saturates there. This keeps the state-key space finite:
        // an all-optional body like (A*)+ would otherwise mint a new key
        // per empty iteration and expansion would never converge.
        let stored_count = if elem.is_unbounded() {
            new_count.min(elem.min.max(1))
        } else {
            new_count
        };

        let make_repeat = |mut s: MatchState| {
            s.counts[elem_depth] = stored_count;
            for deeper in elem_depth + 1..s.counts.len() {
                s.counts[deeper] = 0;
            }
            s.element = loop_target;
            s
        };
        let make_exit = |mut s: MatchState| {
            s.counts[elem_depth] = 0;
            s.element = next;
            s
        };

        if new_count < elem.min {
            vec![make_repeat(state)]
        } else if new_count >= elem.max {
            vec![make_exit(state)]
        } else if elem.reluctant {
            let exit = make_exit(state.child_clone());
            let repeat = make_repeat(state.child_fork(self.seqs));
            vec![exit, repeat]
        } else {
            let repeat = make_repeat(state.child_clone());
            let exit = make_exit(state.child_fork(self.seqs));
            vec![repeat, exit]
        }
    }

    /// Expand consumption successors to the next wait frontier. FIFO, with
    /// an ordered seen-set per output partition: a repeated `(element,
    /// counts)` merges its summaries into the earlier entry.
    pub fn expand(&mut self, actives: Vec<MatchState>, step_trace: &mut StepTrace) -> Expansion {
        let mut queue: VecDeque<MatchState> = actives.into();
        let mut expansion = Expansion::default();
        let mut frontier_keys: HashMap<StateKey, usize> = HashMap::new();
        let mut completed_keys: HashMap<StateKey, usize> = HashMap::new();

        while let Some(mut state) = queue.pop_front() {
            if state.is_completed() {
                insert_or_merge(
                    &mut expansion.completed,
                    &mut completed_keys,
                    state,
                    step_trace,
                );
                continue;
            }
            let elem = self.pattern.element(state.element);
            match elem.kind {
                ElementKind::Fin => {
                    state.element = COMPLETED;
                    insert_or_merge(
                        &mut expansion.completed,
                        &mut completed_keys,
                        state,
                        step_trace,
                    );
                }
                ElementKind::Var(_) => {
                    let elem_depth = elem.depth;
                    let count = state.counts[elem_depth];
                    let min = elem.min;
                    let next = elem.next.expect("non-Fin element has next");
                    let skip_source = insert_or_merge(
                        &mut expansion.frontier,
                        &mut frontier_keys,
                        state,
                        step_trace,
                    );
                    // A satisfied optional position also forks a branch
                    // that skips past it without waiting.
                    if let Some(idx) = skip_source {
                        if count >= min {
                            let mut skip = expansion.frontier[idx].child_fork(self.seqs);
                            skip.counts[elem_depth] = 0;
                            skip.element = next;
                            queue.push_back(skip);
                        }
                    }
                }
                ElementKind::AltStart => {
                    let alt_index = state.element;
                    let group_end = self.pattern.group_end_for_alt(alt_index);
                    let inserted = insert_or_merge(
                        &mut expansion.frontier,
                        &mut frontier_keys,
                        state,
                        step_trace,
                    );
                    if let (Some(idx), Some(group_end)) = (inserted, group_end) {
                        let ge = self.pattern.element(group_end);
                        if expansion.frontier[idx].counts[ge.depth] >= ge.min {
                            let mut skip = expansion.frontier[idx].child_fork(self.seqs);
                            skip.counts[ge.depth] = 0;
                            skip.element = ge.next.expect("GroupEnd has next");
                            queue.push_back(skip);
                        }
                    }
                }
                ElementKind::GroupEnd => {
                    for branch in self.group_end_branches(state) {
                        queue.push_back(branch);
                    }
                }
            }
        }

        expansion
    }

    /// Whether a wait state could consume the given input: a matching
    /// variable, or an alternation whose arms (searched through nested
    /// alternations) contain one.
    pub fn state_can_consume(&self, state: &MatchState, true_vars: &HashSet<usize>) -> bool {
        match self.pattern.element(state.element).kind {
            ElementKind::Var(var_id) => true_vars.contains(&var_id),
            ElementKind::AltStart => self.alt_arms_hit(state.element, true_vars),
            _ => false,
        }
    }

    fn alt_arms_hit(&self, alt_index: usize, true_vars: &HashSet<usize>) -> bool {
        self.pattern
            .arm_first_indices(alt_index)
            .into_iter()
            .any(|arm_first| match self.pattern.element(arm_first).kind {
                ElementKind::Var(var_id) => true_vars.contains(&var_id),
                ElementKind::AltStart => self.alt_arms_hit(arm_first, true_vars),
                _ => false,
            })
    }

    /// Non-viability filter for rows with no pattern variable: keep a wait
    /// state only if it could still be skipped past (`Var`) or its group
    /// exited (`AltStart`).
    pub fn wait_state_is_viable(&self, state: &MatchState, true_vars: &HashSet<usize>) -> bool {
        let elem = self.pattern.element(state.element);
        match elem.kind {
            ElementKind::Var(var_id) => {
                true_vars.contains(&var_id) || state.counts[elem.depth] >= elem.min
            }
            ElementKind::AltStart => {
                if self.alt_arms_hit(state.element, true_vars) {
                    return true;
                }
                self.pattern
                    .group_end_for_alt(state.element)
                    .is_some_and(|group_end| {
                        let ge = self.pattern.element(group_end);
                        state.counts[ge.depth] >= ge.min
                    })
            }
            _ => true,
        }
    }
}

/// Push `state` or merge it into the equivalent earlier entry. Returns the
/// index of a newly inserted state, `None` on a merge (a merged state does
/// not fork again: its branches were already generated when the earlier
/// entry was processed).
fn insert_or_merge(
    list: &mut Vec<MatchState>,
    keys: &mut HashMap<StateKey, usize>,
    state: MatchState,
    step_trace: &mut StepTrace,
) -> Option<usize> {
    let key = state.key();
    match keys.get(&key) {
        Some(&idx) => {
            step_trace.merges.push(key);
            list[idx].merge_from(state);
            None
        }
        None => {
            let idx = list.len();
            keys.insert(key, idx);
            list.push(state);
            Some(idx)
        }
    }
}

/// Deduplicate a partition of consumption successors in place, preserving
/// first-insertion order.
pub fn dedup_partition(states: Vec<MatchState>, step_trace: &mut StepTrace) -> Vec<MatchState> {
    let mut deduped = Vec::with_capacity(states.len());
    let mut keys: HashMap<StateKey, usize> = HashMap::new();
    for state in states {
        insert_or_merge(&mut deduped, &mut keys, state, step_trace);
    }
    deduped
}
