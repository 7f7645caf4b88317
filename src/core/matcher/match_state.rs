// SPDX-License-Identifier: MIT OR Apache-2.0

//! Live simulation states.
//!
//! A `MatchState` is one live point of the NFA: the element it waits at,
//! the repetition counter per nesting depth, and the summaries (paths)
//! accumulated on the way there. Two states with equal `(element, counts)`
//! are the same simulation branch and must merge rather than coexist.

use serde::Serialize;

use super::summary::{merge_summaries, SeqGen, Summary};

/// Sentinel `element` value meaning the state has completed the pattern.
pub const COMPLETED: usize = usize::MAX;

/// Equivalence key: `(element, counts)`; summaries are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateKey {
    pub element: usize,
    pub counts: Vec<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchState {
    /// Element index, or [`COMPLETED`].
    pub element: usize,
    /// Repetition count per depth; length `max_depth + 1`.
    pub counts: Vec<usize>,
    /// Non-empty, ordered.
    pub summaries: Vec<Summary>,
}

impl MatchState {
    /// The state every context starts from: element 0, zero counts, one
    /// summary holding a single empty path.
    pub fn initial(max_depth: usize, seqs: &mut SeqGen) -> Self {
        MatchState {
            element: 0,
            counts: vec![0; max_depth + 1],
            summaries: vec![Summary::initial(seqs)],
        }
    }

    pub fn is_completed(&self) -> bool {
        self.element == COMPLETED
    }

    pub fn key(&self) -> StateKey {
        StateKey {
            element: self.element,
            counts: self.counts.clone(),
        }
    }

    /// Branch without allocating new sequence numbers: the preferred branch
    /// of a double-push, a forced move, or the first alternation arm.
    pub fn child_clone(&self) -> MatchState {
        self.clone()
    }

    /// Branch with fresh sequence numbers on every path, in path order: the
    /// non-preferred branch of a double-push, a non-first alternation arm,
    /// or an optional skip.
    pub fn child_fork(&self, seqs: &mut SeqGen) -> MatchState {
        let mut forked = self.clone();
        for summary in &mut forked.summaries {
            for path in &mut summary.paths {
                path.seq = seqs.next_seq();
            }
        }
        forked
    }

    /// Append the matched variable to every path of every summary.
    pub fn with_match(&mut self, var_id: usize) {
        for summary in &mut self.summaries {
            summary.with_match(var_id);
        }
    }

    /// Absorb an equivalent state's summaries.
    pub fn merge_from(&mut self, other: MatchState) {
        debug_assert_eq!(self.key(), other.key());
        merge_summaries(&mut self.summaries, other.summaries);
    }
}
