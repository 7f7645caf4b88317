// SPDX-License-Identifier: MIT OR Apache-2.0

//! Flattening: optimized AST → compiled [`Pattern`].
//!
//! The walk emits elements in pattern order and tracks, per construct, the
//! set of *exit* element indices whose `next` must be patched to whatever
//! follows the construct. At the top level the remaining exits are patched
//! to the `Fin` sentinel. This keeps nested alternations correct: an arm
//! ending in another alternation or group propagates its exits outwards
//! instead of falling through to the sibling arm.

use super::ast::PatternAst;
use super::error::CompileError;
use crate::core::pattern::{ElementKind, Pattern, PatternElement};

pub fn flatten(ast: &PatternAst) -> Result<Pattern, CompileError> {
    let mut flattener = Flattener {
        elements: Vec::new(),
        variables: Vec::new(),
    };

    let exits = flattener.walk(ast, 0);
    let fin_index = flattener.elements.len();
    flattener.patch(&exits, fin_index);
    flattener.elements.push(PatternElement {
        kind: ElementKind::Fin,
        depth: 0,
        min: 0,
        max: 0,
        next: None,
        jump: None,
        reluctant: false,
    });

    for (idx, elem) in flattener.elements.iter().enumerate() {
        if !elem.is_fin() && elem.next.is_none() {
            return Err(CompileError::internal(format!(
                "element {idx} left without a next link"
            )));
        }
    }

    let max_depth = flattener
        .elements
        .iter()
        .map(|e| e.depth)
        .max()
        .unwrap_or(0);
    let reluctant = flattener.elements.iter().any(|e| e.reluctant);

    let pattern = Pattern {
        elements: flattener.elements,
        variables: flattener.variables,
        max_depth,
        reluctant,
    };
    pattern.validate().map_err(CompileError::internal)?;
    Ok(pattern)
}

struct Flattener {
    elements: Vec<PatternElement>,
    variables: Vec<String>,
}

impl Flattener {
    fn variable_id(&mut self, name: &str) -> usize {
        match self.variables.iter().position(|v| v == name) {
            Some(id) => id,
            None => {
                self.variables.push(name.to_string());
                self.variables.len() - 1
            }
        }
    }

    fn patch(&mut self, exits: &[usize], target: usize) {
        for &idx in exits {
            self.elements[idx].next = Some(target);
        }
    }

    /// Emit elements for `node` at `depth`; returns the indices whose
    /// `next` must point past this construct.
    fn walk(&mut self, node: &PatternAst, depth: usize) -> Vec<usize> {
        match node {
            PatternAst::Var {
                name,
                min,
                max,
                reluctant,
            } => {
                let var_id = self.variable_id(name);
                let idx = self.elements.len();
                self.elements.push(PatternElement {
                    kind: ElementKind::Var(var_id),
                    depth,
                    min: *min,
                    max: *max,
                    next: None,
                    jump: None,
                    reluctant: *reluctant,
                });
                vec![idx]
            }
            PatternAst::Seq { items } => {
                let mut prev_exits: Vec<usize> = Vec::new();
                for item in items {
                    let first = self.elements.len();
                    if !prev_exits.is_empty() {
                        self.patch(&prev_exits, first);
                    }
                    prev_exits = self.walk(item, depth);
                }
                prev_exits
            }
            PatternAst::Group {
                content,
                min,
                max,
                reluctant,
            } => {
                let first = self.elements.len();
                let content_exits = self.walk(content, depth + 1);
                if (*min, *max) == (1, 1) {
                    // Plain parentheses; no iteration boundary needed.
                    content_exits
                } else {
                    let group_end = self.elements.len();
                    self.patch(&content_exits, group_end);
                    self.elements.push(PatternElement {
                        kind: ElementKind::GroupEnd,
                        depth,
                        min: *min,
                        max: *max,
                        next: None,
                        jump: Some(first),
                        reluctant: *reluctant,
                    });
                    vec![group_end]
                }
            }
            PatternAst::Alt { alternatives } => {
                let alt_index = self.elements.len();
                self.elements.push(PatternElement {
                    kind: ElementKind::AltStart,
                    depth,
                    min: 1,
                    max: 1,
                    next: None,
                    jump: None,
                    reluctant: false,
                });

                let mut arm_firsts = Vec::with_capacity(alternatives.len());
                // The AltStart's own next is patched past the alternation;
                // the executor follows it to find an enclosing GroupEnd.
                let mut exits = vec![alt_index];
                for alternative in alternatives {
                    arm_firsts.push(self.elements.len());
                    let arm_exits = self.walk(alternative, depth + 1);
                    exits.extend(arm_exits);
                }
                for pair in arm_firsts.windows(2) {
                    self.elements[pair[0]].jump = Some(pair[1]);
                }
                exits
            }
        }
    }
}
