// SPDX-License-Identifier: MIT OR Apache-2.0

//! Match paths, summaries and the per-matcher sequence counter.
//!
//! A `Summary` bundles an aggregate map with the paths that produced it;
//! the two merge as one unit. Aggregates are empty in the present engine
//! (reserved for SUM/COUNT/FIRST/LAST/MIN/MAX) but their equality already
//! gates summary merging so the plumbing does not change when they land.

use serde::Serialize;
use std::collections::BTreeMap;

/// Aggregate cell value. Reserved for the MEASURES-facing aggregates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AggregateValue {
    Int(i64),
    Double(f64),
    Str(String),
}

pub type Aggregates = BTreeMap<String, AggregateValue>;

/// One recorded match path: the variable id matched per consumed row, plus
/// the sequence number stamped when the path was materialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchPath {
    pub seq: u64,
    pub steps: Vec<usize>,
}

impl MatchPath {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Monotonic per-matcher sequence counter. One increment per materialized
/// `{seq, path}`; never shared across matcher instances.
#[derive(Debug, Default)]
pub struct SeqGen {
    next: u64,
}

impl SeqGen {
    pub fn next_seq(&mut self) -> u64 {
        let seq = self.next;
        self.next += 1;
        seq
    }

    pub fn reset(&mut self) {
        self.next = 0;
    }
}

/// Aggregates plus the ordered paths that feed them.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub aggregates: Aggregates,
    pub paths: Vec<MatchPath>,
}

impl Summary {
    /// A fresh summary with a single empty path.
    pub fn initial(seqs: &mut SeqGen) -> Self {
        Summary {
            aggregates: Aggregates::new(),
            paths: vec![MatchPath {
                seq: seqs.next_seq(),
                steps: Vec::new(),
            }],
        }
    }

    /// Extend every path by the matched variable.
    pub fn with_match(&mut self, var_id: usize) {
        for path in &mut self.paths {
            path.steps.push(var_id);
        }
    }

    /// Merge `other` into `self`: paths dedup by their exact variable-id
    /// sequence, new paths keep their original seq, insertion order is
    /// preserved.
    pub fn merge_paths(&mut self, other: Summary) {
        for path in other.paths {
            if !self.paths.iter().any(|p| p.steps == path.steps) {
                self.paths.push(path);
            }
        }
    }
}

/// Merge a list of summaries into `target` (§state-merge): summaries pair
/// up by equal aggregates; unmatched ones are appended whole.
pub fn merge_summaries(target: &mut Vec<Summary>, others: Vec<Summary>) {
    for other in others {
        match target
            .iter_mut()
            .find(|mine| mine.aggregates == other.aggregates)
        {
            Some(mine) => mine.merge_paths(other),
            None => target.push(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(seq: u64, steps: &[usize]) -> MatchPath {
        MatchPath {
            seq,
            steps: steps.to_vec(),
        }
    }

    #[test]
    fn test_with_match_extends_every_path() {
        let mut summary = Summary {
            aggregates: Aggregates::new(),
            paths: vec![path(0, &[0]), path(1, &[1])],
        };
        summary.with_match(2);
        assert_eq!(summary.paths[0].steps, vec![0, 2]);
        assert_eq!(summary.paths[1].steps, vec![1, 2]);
    }

    #[test]
    fn test_merge_paths_dedups_by_content_keeping_first_seq() {
        let mut a = Summary {
            aggregates: Aggregates::new(),
            paths: vec![path(0, &[0, 1])],
        };
        let b = Summary {
            aggregates: Aggregates::new(),
            paths: vec![path(5, &[0, 1]), path(6, &[0, 2])],
        };
        a.merge_paths(b);
        assert_eq!(a.paths.len(), 2);
        assert_eq!(a.paths[0].seq, 0);
        assert_eq!(a.paths[1].seq, 6);
    }

    #[test]
    fn test_summaries_with_different_aggregates_never_merge() {
        let mut target = vec![Summary {
            aggregates: Aggregates::new(),
            paths: vec![path(0, &[0])],
        }];
        let mut other_aggregates = Aggregates::new();
        other_aggregates.insert("count".to_string(), AggregateValue::Int(2));
        merge_summaries(
            &mut target,
            vec![Summary {
                aggregates: other_aggregates,
                paths: vec![path(1, &[0])],
            }],
        );
        assert_eq!(target.len(), 2);
        assert_eq!(target[0].paths.len(), 1);
    }

    #[test]
    fn test_seq_gen_monotonic() {
        let mut seqs = SeqGen::default();
        assert_eq!(seqs.next_seq(), 0);
        assert_eq!(seqs.next_seq(), 1);
        seqs.reset();
        assert_eq!(seqs.next_seq(), 0);
    }
}
