// SPDX-License-Identifier: MIT OR Apache-2.0

//! AST optimizations.
//!
//! Three passes applied in order, each idempotent and semantics-preserving:
//!
//! 1. **Unwrap** — single-item sequences collapse, `( ... )` groups with
//!    `{1,1}` unwrap, nested sequences/alternations flatten.
//! 2. **Dedup alternatives** — an alternative structurally equal to an
//!    earlier one can never win and is dropped.
//! 3. **Quantifier fusion** — runs of an identical `{1,1}` variable fuse to
//!    `{k,k}`; a group around a single quantified node fuses by multiplying
//!    bounds when the combined range stays contiguous (the outer bounds are
//!    fixed, or the inner node is `{1,1}`).

use super::ast::PatternAst;
use crate::core::pattern::UNBOUNDED;

pub fn optimize(ast: PatternAst) -> PatternAst {
    fuse_quantifiers(dedup_alternatives(unwrap(ast)))
}

/// Pass 1: structural unwrapping.
pub fn unwrap(ast: PatternAst) -> PatternAst {
    match ast {
        PatternAst::Var { .. } => ast,
        PatternAst::Group {
            content,
            min,
            max,
            reluctant,
        } => {
            let content = unwrap(*content);
            if (min, max) == (1, 1) {
                content
            } else {
                PatternAst::Group {
                    content: Box::new(content),
                    min,
                    max,
                    reluctant,
                }
            }
        }
        PatternAst::Seq { items } => {
            let mut flat = Vec::new();
            for item in items {
                match unwrap(item) {
                    PatternAst::Seq { items: inner } => flat.extend(inner),
                    other => flat.push(other),
                }
            }
            if flat.len() == 1 {
                flat.pop().expect("one item")
            } else {
                PatternAst::Seq { items: flat }
            }
        }
        PatternAst::Alt { alternatives } => {
            let mut flat = Vec::new();
            for alternative in alternatives {
                match unwrap(alternative) {
                    PatternAst::Alt { alternatives: inner } => flat.extend(inner),
                    other => flat.push(other),
                }
            }
            if flat.len() == 1 {
                flat.pop().expect("one alternative")
            } else {
                PatternAst::Alt { alternatives: flat }
            }
        }
    }
}

/// Pass 2: drop alternatives structurally equal to an earlier one.
pub fn dedup_alternatives(ast: PatternAst) -> PatternAst {
    match ast {
        PatternAst::Var { .. } => ast,
        PatternAst::Group {
            content,
            min,
            max,
            reluctant,
        } => PatternAst::Group {
            content: Box::new(dedup_alternatives(*content)),
            min,
            max,
            reluctant,
        },
        PatternAst::Seq { items } => PatternAst::Seq {
            items: items.into_iter().map(dedup_alternatives).collect(),
        },
        PatternAst::Alt { alternatives } => {
            let mut kept: Vec<PatternAst> = Vec::new();
            for alternative in alternatives.into_iter().map(dedup_alternatives) {
                if !kept.contains(&alternative) {
                    kept.push(alternative);
                }
            }
            if kept.len() == 1 {
                kept.pop().expect("one alternative")
            } else {
                PatternAst::Alt { alternatives: kept }
            }
        }
    }
}

/// Pass 3: quantifier fusion.
pub fn fuse_quantifiers(ast: PatternAst) -> PatternAst {
    match ast {
        PatternAst::Var { .. } => ast,
        PatternAst::Group {
            content,
            min,
            max,
            reluctant,
        } => {
            let content = fuse_quantifiers(*content);
            fuse_group(content, min, max, reluctant)
        }
        PatternAst::Seq { items } => {
            let mut items = fuse_runs(items.into_iter().map(fuse_quantifiers).collect());
            // A fully fused run leaves a single node; keep the tree
            // unwrapped so an enclosing group can fuse with it.
            if items.len() == 1 {
                items.pop().expect("one item")
            } else {
                PatternAst::Seq { items }
            }
        }
        PatternAst::Alt { alternatives } => PatternAst::Alt {
            alternatives: alternatives.into_iter().map(fuse_quantifiers).collect(),
        },
    }
}

/// Collapse runs of an identical `{1,1}` variable into `{k,k}`.
fn fuse_runs(items: Vec<PatternAst>) -> Vec<PatternAst> {
    let mut out: Vec<PatternAst> = Vec::new();
    let mut run: Option<(String, bool, usize)> = None;

    let flush = |run: &mut Option<(String, bool, usize)>, out: &mut Vec<PatternAst>| {
        if let Some((name, reluctant, count)) = run.take() {
            out.push(PatternAst::Var {
                name,
                min: count,
                max: count,
                reluctant,
            });
        }
    };

    for item in items {
        match &item {
            PatternAst::Var {
                name,
                min: 1,
                max: 1,
                reluctant,
            } => {
                match &mut run {
                    Some((run_name, run_rel, count))
                        if run_name == name && run_rel == reluctant =>
                    {
                        *count += 1;
                    }
                    _ => {
                        flush(&mut run, &mut out);
                        run = Some((name.clone(), *reluctant, 1));
                    }
                }
            }
            _ => {
                flush(&mut run, &mut out);
                out.push(item);
            }
        }
    }
    flush(&mut run, &mut out);
    out
}

/// Fuse `Group{outer}` around a single quantified node by multiplying
/// bounds. Only applied when the fused range is contiguous: either the
/// outer bounds are fixed (`{c}` distributes over any inner range), or the
/// inner node is `{1,1}` (the group is just parentheses around one slot).
/// General `{a,b}` over `{c,d}` leaves gaps (e.g. `(A{2}){1,2}` can match 2
/// or 4 rows but never 3) and stays unfused.
fn fuse_group(content: PatternAst, min: usize, max: usize, reluctant: bool) -> PatternAst {
    let outer_fixed = min == max;

    match content {
        PatternAst::Var {
            name,
            min: inner_min,
            max: inner_max,
            reluctant: inner_reluctant,
        } => {
            let inner_unit = (inner_min, inner_max) == (1, 1);
            if outer_fixed || inner_unit {
                PatternAst::Var {
                    name,
                    min: mul_bound(inner_min, min),
                    max: mul_bound(inner_max, max),
                    reluctant: if inner_unit { reluctant } else { inner_reluctant },
                }
            } else {
                PatternAst::Group {
                    content: Box::new(PatternAst::Var {
                        name,
                        min: inner_min,
                        max: inner_max,
                        reluctant: inner_reluctant,
                    }),
                    min,
                    max,
                    reluctant,
                }
            }
        }
        PatternAst::Group {
            content: inner_content,
            min: inner_min,
            max: inner_max,
            reluctant: inner_reluctant,
        } if outer_fixed => PatternAst::Group {
            content: inner_content,
            min: mul_bound(inner_min, min),
            max: mul_bound(inner_max, max),
            reluctant: inner_reluctant,
        },
        other => PatternAst::Group {
            content: Box::new(other),
            min,
            max,
            reluctant,
        },
    }
}

fn mul_bound(a: usize, b: usize) -> usize {
    if a == UNBOUNDED || b == UNBOUNDED {
        UNBOUNDED
    } else {
        a * b
    }
}
