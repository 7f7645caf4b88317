use rowflux_rust::core::config::{MatcherConfig, OutputMode, SkipMode};
use rowflux_rust::core::error::RowFluxError;
use rowflux_rust::core::matcher::{MatchEmission, PatternMatcher, RowSnapshot};

fn run_with(
    pattern: &str,
    rows: &[&[&str]],
    config: MatcherConfig,
) -> (Vec<MatchEmission>, Vec<RowSnapshot>) {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut matcher = PatternMatcher::from_pattern_str(pattern, config).expect("pattern compiles");
    let mut emissions = Vec::new();
    for (index, row) in rows.iter().enumerate() {
        emissions.extend(matcher.process_row(index, row).expect("row processed"));
    }
    let snapshots = matcher.take_snapshots();
    (emissions, snapshots)
}

fn run(pattern: &str, rows: &[&[&str]]) -> Vec<MatchEmission> {
    run_with(pattern, rows, MatcherConfig::default()).0
}

/// No two live states of a context may share `(element, counts)` after a
/// processed row.
fn assert_states_deduped(snapshots: &[RowSnapshot]) {
    for snapshot in snapshots {
        for context in &snapshot.contexts {
            let mut seen = Vec::new();
            for state in &context.states {
                let key = (state.element, state.counts.clone());
                assert!(
                    !seen.contains(&key),
                    "duplicate state {key:?} in context {} after row {}",
                    context.id,
                    snapshot.row
                );
                seen.push(key);
            }
        }
    }
}

// ============================================================================
// End-to-end scenarios (ONE_ROW, PAST_LAST)
// ============================================================================

#[test]
fn test_scenario_simple_plus_sequence() {
    // S1: A B+ C over [A], [B], [B], [C]
    let emissions = run("A B+ C", &[&["A"], &["B"], &["B"], &["C"]]);
    assert_eq!(emissions.len(), 1);
    assert_eq!(emissions[0].match_start, 0);
    assert_eq!(emissions[0].match_end, 3);
    assert_eq!(emissions[0].paths, vec![vec!["A", "B", "B", "C"]]);
}

#[test]
fn test_scenario_star_skipped_entirely() {
    // S2: A B* C over [A], [C] - the starred variable matches zero rows.
    let emissions = run("A B* C", &[&["A"], &["C"]]);
    assert_eq!(emissions.len(), 1);
    assert_eq!(emissions[0].match_start, 0);
    assert_eq!(emissions[0].match_end, 1);
    assert_eq!(emissions[0].paths, vec![vec!["A", "C"]]);
}

#[test]
fn test_scenario_bounded_group_iterations() {
    // S3: (A B){2,3} C over [A],[B],[A],[B],[C]
    let emissions = run("(A B){2,3} C", &[&["A"], &["B"], &["A"], &["B"], &["C"]]);
    assert_eq!(emissions.len(), 1);
    assert_eq!(emissions[0].match_start, 0);
    assert_eq!(emissions[0].match_end, 4);
    assert_eq!(emissions[0].paths, vec![vec!["A", "B", "A", "B", "C"]]);
}

#[test]
fn test_scenario_greedy_fallback_after_failed_arm() {
    // S4: (A | B C)+ over [A],[B],[D] - the B C arm fails at D, the
    // deferred single-A completion is restored and emitted.
    let emissions = run("(A | B C)+", &[&["A"], &["B"], &["D"]]);
    assert_eq!(emissions.len(), 1);
    assert_eq!(emissions[0].context_id, 0);
    assert_eq!(emissions[0].match_start, 0);
    assert_eq!(emissions[0].match_end, 0);
    assert_eq!(emissions[0].paths, vec![vec!["A"]]);
}

#[test]
fn test_scenario_lexical_order_prefers_earlier_arm() {
    // S5: A+ (B | A)+ over [A,B] x3 then an empty row. All completions
    // have length 3; the lexically first surviving path took the B arm
    // (the earlier arm of the second group) wherever the group consumed.
    let emissions = run("A+ (B | A)+", &[&["A", "B"], &["A", "B"], &["A", "B"], &[]]);
    assert_eq!(emissions.len(), 1);
    assert_eq!(emissions[0].match_start, 0);
    assert_eq!(emissions[0].match_end, 2);
    assert_eq!(emissions[0].paths.len(), 1);
    let path = &emissions[0].paths[0];
    assert_eq!(path.len(), 3);
    assert_eq!(path[0], "A");
    // The second group's B arm precedes its A arm in lexical order.
    assert_eq!(path[1], "B");
    assert_eq!(path, &vec!["A", "B", "B"]);
}

#[test]
fn test_scenario_absorption_keeps_single_context() {
    // S6: A+ B over [A],[A],[A],[B] - contexts started at rows 1 and 2
    // are absorbed by the row-0 context.
    let mut matcher =
        PatternMatcher::from_pattern_str("A+ B", MatcherConfig::default()).expect("compiles");
    let mut emissions = Vec::new();
    for (index, row) in [&["A"][..], &["A"][..], &["A"][..], &["B"][..]]
        .iter()
        .enumerate()
    {
        emissions.extend(matcher.process_row(index, row).expect("row processed"));
        assert!(
            matcher.live_context_count() <= 1,
            "absorption must keep a single retained context"
        );
    }
    assert_eq!(emissions.len(), 1);
    assert_eq!(emissions[0].match_start, 0);
    assert_eq!(emissions[0].match_end, 3);
    assert_eq!(emissions[0].paths, vec![vec!["A", "A", "A", "B"]]);

    let snapshots = matcher.take_snapshots();
    assert_eq!(snapshots[1].absorptions.len(), 1);
    assert_eq!(snapshots[1].absorptions[0].absorbed, 1);
    assert_eq!(snapshots[1].absorptions[0].by, 0);
    assert_eq!(snapshots[2].absorptions.len(), 1);
    assert_eq!(snapshots[2].absorptions[0].absorbed, 2);
}

// ============================================================================
// Negative cases
// ============================================================================

#[test]
fn test_no_emission_when_required_plus_unmet() {
    let emissions = run("A B+ C", &[&["A"], &["C"]]);
    assert!(emissions.is_empty());
}

#[test]
fn test_no_emission_when_group_min_unmet() {
    let emissions = run("(A B){2,3} C", &[&["A"], &["B"], &["C"]]);
    assert!(emissions.is_empty());
}

#[test]
fn test_and_operator_parse_error() {
    let err = PatternMatcher::from_pattern_str("A & B", MatcherConfig::default()).unwrap_err();
    match err {
        RowFluxError::Compile(compile_err) => {
            assert_eq!(compile_err.offset(), Some(2));
            assert!(compile_err.to_string().contains("AND operator not supported"));
        }
        other => panic!("expected compile error, got {other}"),
    }
}

// ============================================================================
// Greedy vs reluctant
// ============================================================================

#[test]
fn test_greedy_emits_longest_via_fallback() {
    // A{1,3} keeps extending; the unrelated row finalizes the attempt and
    // the longest deferred completion wins.
    let emissions = run("A{1,3}", &[&["A"], &["A"], &["X"]]);
    assert_eq!(emissions.len(), 1);
    assert_eq!(emissions[0].match_start, 0);
    assert_eq!(emissions[0].match_end, 1);
    assert_eq!(emissions[0].paths, vec![vec!["A", "A"]]);
}

#[test]
fn test_reluctant_accepts_first_completion() {
    // A{1,3}? completes on the first A; every later A starts (and
    // completes) a fresh attempt.
    let emissions = run("A{1,3}?", &[&["A"], &["A"]]);
    assert_eq!(emissions.len(), 2);
    assert_eq!(emissions[0].match_start, 0);
    assert_eq!(emissions[0].match_end, 0);
    assert_eq!(emissions[0].paths, vec![vec!["A"]]);
    assert_eq!(emissions[1].match_start, 1);
    assert_eq!(emissions[1].match_end, 1);
}

// ============================================================================
// SKIP / OUTPUT policies
// ============================================================================

#[test]
fn test_skip_past_last_never_overlaps() {
    let config = MatcherConfig::new(SkipMode::PastLast, OutputMode::OneRow);
    let (emissions, _) = run_with("A{1,2} B", &[&["A"], &["A"], &["B"]], config);
    assert_eq!(emissions.len(), 1);
    assert_eq!(emissions[0].match_start, 0);
    assert_eq!(emissions[0].match_end, 2);
    assert_eq!(emissions[0].paths, vec![vec!["A", "A", "B"]]);
}

#[test]
fn test_skip_to_next_emits_overlapping_starts() {
    let config = MatcherConfig::new(SkipMode::ToNext, OutputMode::OneRow);
    let (emissions, _) = run_with("A{1,2} B", &[&["A"], &["A"], &["B"]], config);
    assert_eq!(emissions.len(), 2);
    assert_eq!(emissions[0].match_start, 0);
    assert_eq!(emissions[0].match_end, 2);
    assert_eq!(emissions[1].match_start, 1);
    assert_eq!(emissions[1].match_end, 2);
    assert_eq!(emissions[1].paths, vec![vec!["A", "B"]]);
    // Invariant: starts strictly increase under TO_NEXT.
    assert!(emissions[1].match_start > emissions[0].match_start);
}

#[test]
fn test_past_last_records_discarded_context() {
    let (_, snapshots) = run_with(
        "A{1,2} B",
        &[&["A"], &["A"], &["B"]],
        MatcherConfig::default(),
    );
    let discarded: Vec<u64> = snapshots
        .iter()
        .flat_map(|s| s.discarded.iter().copied())
        .collect();
    assert_eq!(discarded, vec![1]);
}

#[test]
fn test_all_rows_reports_every_completion_in_seq_order() {
    let config = MatcherConfig::new(SkipMode::PastLast, OutputMode::AllRows);
    let (emissions, _) = run_with("A B?", &[&["A"], &["B"]], config);
    assert_eq!(emissions.len(), 1);
    // The longer path was materialized first (smaller seq), the optional
    // skip forked later.
    assert_eq!(
        emissions[0].paths,
        vec![vec!["A".to_string(), "B".to_string()], vec!["A".to_string()]]
    );
}

#[test]
fn test_one_row_reports_single_lexically_first_path() {
    let (emissions, _) = run_with("A B?", &[&["A"], &["B"]], MatcherConfig::default());
    assert_eq!(emissions.len(), 1);
    assert_eq!(emissions[0].paths, vec![vec!["A", "B"]]);
}

// ============================================================================
// Driver contract
// ============================================================================

#[test]
fn test_unknown_variable_names_are_ignored() {
    let emissions = run("A B", &[&["A", "ZENITH"], &["B", "Q", "R"]]);
    assert_eq!(emissions.len(), 1);
    assert_eq!(emissions[0].paths, vec![vec!["A", "B"]]);
}

#[test]
fn test_out_of_order_rows_rejected() {
    let mut matcher =
        PatternMatcher::from_pattern_str("A B", MatcherConfig::default()).expect("compiles");
    matcher.process_row(0, &["A"]).expect("row 0");
    let err = matcher.process_row(2, &["B"]).unwrap_err();
    match err {
        RowFluxError::OutOfOrderRow { expected, got } => {
            assert_eq!(expected, 1);
            assert_eq!(got, 2);
        }
        other => panic!("expected out-of-order error, got {other}"),
    }
    // The rejected call must not have advanced the cursor.
    matcher.process_row(1, &["B"]).expect("row 1 still accepted");
}

#[test]
fn test_reset_restarts_from_row_zero_with_fresh_counters() {
    let mut matcher =
        PatternMatcher::from_pattern_str("A B", MatcherConfig::default()).expect("compiles");
    matcher.process_row(0, &["A"]).expect("row 0");
    let first = matcher.process_row(1, &["B"]).expect("row 1");
    matcher.reset();
    matcher.process_row(0, &["A"]).expect("row 0 after reset");
    let second = matcher.process_row(1, &["B"]).expect("row 1 after reset");
    // Context ids and seq labels restart, so the emissions are identical.
    assert_eq!(first, second);
}

#[test]
fn test_determinism_across_runs() {
    let rows: &[&[&str]] = &[&["A", "B"], &["A", "B"], &["A", "B"], &[]];
    let (first_emissions, first_snapshots) =
        run_with("A+ (B | A)+", rows, MatcherConfig::default());
    let (second_emissions, second_snapshots) =
        run_with("A+ (B | A)+", rows, MatcherConfig::default());
    assert_eq!(first_emissions, second_emissions);
    assert_eq!(first_snapshots.len(), second_snapshots.len());
    for (a, b) in first_snapshots.iter().zip(&second_snapshots) {
        assert_eq!(a.to_json(), b.to_json());
    }
}

// ============================================================================
// Snapshot stream
// ============================================================================

#[test]
fn test_snapshot_shape_and_dead_state_records() {
    let (_, snapshots) = run_with("A B+ C", &[&["A"], &["C"]], MatcherConfig::default());
    assert_eq!(snapshots.len(), 2);
    assert_eq!(snapshots[0].row, 0);
    assert_eq!(snapshots[0].input, vec!["A"]);
    // Row 1 kills the only context: B+ has nothing matched yet.
    assert!(!snapshots[1].dead_states.is_empty());
    assert_eq!(snapshots[1].dead_states[0].context_id, 0);

    let json = snapshots[1].to_json();
    for key in [
        "row",
        "input",
        "contexts",
        "absorptions",
        "state_merges",
        "discarded_states",
        "dead_states",
        "emitted",
        "queued",
        "discarded",
        "logs",
    ] {
        assert!(json.get(key).is_some(), "snapshot missing key {key}");
    }
}

#[test]
fn test_no_duplicate_states_after_any_row() {
    for (pattern, rows) in [
        ("A B+ C", &[&["A"][..], &["B"][..], &["B"][..], &["C"][..]][..]),
        (
            "A+ (B | A)+",
            &[&["A", "B"][..], &["A", "B"][..], &["A", "B"][..], &[][..]][..],
        ),
        (
            "(A | B C)+",
            &[&["A"][..], &["B"][..], &["C"][..], &["A"][..]][..],
        ),
    ] {
        let (_, snapshots) = run_with(pattern, rows, MatcherConfig::default());
        assert_states_deduped(&snapshots);
    }
}

#[test]
fn test_potential_match_keeps_extending() {
    // A context may hold a committed completion and live states at once;
    // completion is only final when the states run out.
    let mut matcher =
        PatternMatcher::from_pattern_str("A B?", MatcherConfig::default()).expect("compiles");
    assert!(matcher.process_row(0, &["A"]).expect("row 0").is_empty());
    // Still live after row 0: B may yet extend the match.
    assert_eq!(matcher.live_context_count(), 1);
    let emissions = matcher.process_row(1, &["B"]).expect("row 1");
    assert_eq!(emissions.len(), 1);
    assert_eq!(emissions[0].paths, vec![vec!["A", "B"]]);
}
