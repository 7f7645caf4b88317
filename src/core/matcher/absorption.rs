// SPDX-License-Identifier: MIT OR Apache-2.0

//! Context absorption.
//!
//! An earlier context dominates a later one when every live state of the
//! later has a counterpart in the earlier at the same element whose
//! counters are at least as far along (unbounded quantifier) or exactly
//! level (bounded quantifier: the earlier may already have spent capacity
//! the later still has). Every future the later context could reach, the
//! earlier reaches with an equal-or-better path, so the later is dropped.
//! This is what keeps `A+` over an all-A stream at O(1) retained contexts
//! instead of one per row.

use log::debug;

use super::context::MatchContext;
use super::snapshot::AbsorptionRecord;
use crate::core::pattern::Pattern;

/// Remove every live, non-completed context dominated by an earlier one.
/// `contexts` must be sorted by `match_start` ascending.
pub fn absorb_contexts(
    contexts: &mut Vec<MatchContext>,
    pattern: &Pattern,
) -> Vec<AbsorptionRecord> {
    let mut records = Vec::new();
    let mut index = 1;
    while index < contexts.len() {
        let (earlier_slice, later_slice) = contexts.split_at(index);
        let later = &later_slice[0];
        let absorbed_by = if eligible(later) {
            earlier_slice
                .iter()
                .find(|earlier| {
                    eligible(earlier)
                        && earlier.match_start < later.match_start
                        && dominates(earlier, later, pattern)
                })
                .map(|earlier| earlier.id)
        } else {
            None
        };
        match absorbed_by {
            Some(by) => {
                let absorbed = contexts.remove(index);
                debug!(
                    "context {} (start {}) absorbed by context {}",
                    absorbed.id, absorbed.match_start, by
                );
                records.push(AbsorptionRecord {
                    absorbed: absorbed.id,
                    by,
                });
            }
            None => index += 1,
        }
    }
    records
}

fn eligible(context: &MatchContext) -> bool {
    !context.is_completed && !context.states.is_empty()
}

fn dominates(earlier: &MatchContext, later: &MatchContext, pattern: &Pattern) -> bool {
    later.states.iter().all(|later_state| {
        if later_state.is_completed() {
            return false;
        }
        earlier.states.iter().any(|earlier_state| {
            if earlier_state.element != later_state.element {
                return false;
            }
            let elem = pattern.element(later_state.element);
            if elem.is_unbounded() {
                earlier_state
                    .counts
                    .iter()
                    .zip(&later_state.counts)
                    .all(|(e, l)| e >= l)
            } else {
                earlier_state.counts == later_state.counts
            }
        })
    })
}
