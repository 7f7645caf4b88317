// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Compiled Pattern Program
//!
//! The output of the pattern compiler and the input of the NFA executor: a
//! flat, `Fin`-terminated element array plus the variable table mapping
//! variable names to the ids recorded in `Var` elements.

pub mod element;

pub use element::{ElementKind, PatternElement, UNBOUNDED};

use serde::Serialize;
use std::fmt;

/// A compiled pattern program.
///
/// Invariants (checked by [`Pattern::validate`]):
/// - exactly one `Fin` element, at the last position, with no `next`;
/// - every other element's `next` is a valid index;
/// - every `GroupEnd`'s `jump` points strictly earlier, at the group's
///   first element, with `min <= max` and `max >= 1`;
/// - depths are contiguous from zero.
#[derive(Debug, Clone, Serialize)]
pub struct Pattern {
    pub elements: Vec<PatternElement>,
    /// Variable names in order of first appearance; `var_id` = index.
    pub variables: Vec<String>,
    /// Maximum `depth` over all elements.
    pub max_depth: usize,
    /// True iff any element carries a reluctant quantifier.
    pub reluctant: bool,
}

impl Pattern {
    /// Index of the `Fin` sentinel (always the last element).
    pub fn fin_index(&self) -> usize {
        self.elements.len() - 1
    }

    pub fn element(&self, index: usize) -> &PatternElement {
        &self.elements[index]
    }

    /// Resolve a variable name to its id, `None` if it is not in the
    /// pattern's alphabet.
    pub fn variable_id(&self, name: &str) -> Option<usize> {
        self.variables.iter().position(|v| v == name)
    }

    pub fn variable_name(&self, id: usize) -> &str {
        &self.variables[id]
    }

    /// First-element indices of every arm of the alternation starting at
    /// `alt_index`, in arm order. The first arm starts right after the
    /// `AltStart`; subsequent arms are chained through the arm-first
    /// elements' `jump` pointers.
    pub fn arm_first_indices(&self, alt_index: usize) -> Vec<usize> {
        debug_assert!(matches!(
            self.elements[alt_index].kind,
            ElementKind::AltStart
        ));
        let mut arms = vec![alt_index + 1];
        while let Some(next_arm) = self.elements[*arms.last().expect("non-empty")].next_arm() {
            arms.push(next_arm);
        }
        arms
    }

    /// The `GroupEnd` that encloses the alternation at `alt_index`, when the
    /// alternation sits at the tail of a quantified group. Used for the
    /// group-exit and group-skip transitions taken from an `AltStart` wait
    /// position.
    pub fn group_end_for_alt(&self, alt_index: usize) -> Option<usize> {
        let after = self.elements[alt_index].next?;
        let candidate = &self.elements[after];
        match candidate.kind {
            ElementKind::GroupEnd if candidate.jump.is_some_and(|start| start <= alt_index) => {
                Some(after)
            }
            _ => None,
        }
    }

    /// Check the compiled-program invariants. A violation is an internal
    /// compiler fault, never a user error.
    pub fn validate(&self) -> Result<(), String> {
        if self.elements.is_empty() {
            return Err("empty element array".to_string());
        }
        let fin_count = self.elements.iter().filter(|e| e.is_fin()).count();
        if fin_count != 1 || !self.elements[self.fin_index()].is_fin() {
            return Err(format!(
                "expected exactly one trailing Fin, found {fin_count}"
            ));
        }
        if self.elements[self.fin_index()].next.is_some() {
            return Err("Fin must not have a next link".to_string());
        }
        for (idx, elem) in self.elements.iter().enumerate() {
            if elem.is_fin() {
                continue;
            }
            match elem.next {
                Some(next) if next < self.elements.len() => {}
                other => {
                    return Err(format!("element {idx} has unresolved next link {other:?}"));
                }
            }
            if elem.max < elem.min {
                return Err(format!("element {idx} has max < min"));
            }
            if matches!(elem.kind, ElementKind::GroupEnd) {
                match elem.group_start() {
                    Some(start) if start < idx => {}
                    other => {
                        return Err(format!(
                            "GroupEnd {idx} must jump strictly backwards, found {other:?}"
                        ));
                    }
                }
                if elem.max < 1 {
                    return Err(format!("GroupEnd {idx} has max < 1"));
                }
            }
        }
        if self.max_depth != self.elements.iter().map(|e| e.depth).max().unwrap_or(0) {
            return Err("max_depth does not match the element array".to_string());
        }
        for depth in 0..=self.max_depth {
            if !self.elements.iter().any(|e| e.depth == depth) {
                return Err(format!("depth {depth} is not represented"));
            }
        }
        // Chasing next from any element must reach Fin.
        for start in 0..self.elements.len() {
            let mut idx = start;
            let mut hops = 0;
            while !self.elements[idx].is_fin() {
                idx = self.elements[idx].next.expect("checked above");
                hops += 1;
                if hops > self.elements.len() {
                    return Err(format!("next chain from element {start} never reaches Fin"));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "pattern over {:?}", self.variables)?;
        for (idx, elem) in self.elements.iter().enumerate() {
            let kind = match elem.kind {
                ElementKind::Var(id) => format!("Var({})", self.variables[id]),
                ElementKind::AltStart => "AltStart".to_string(),
                ElementKind::GroupEnd => "GroupEnd".to_string(),
                ElementKind::Fin => "Fin".to_string(),
            };
            let max = if elem.is_unbounded() {
                "inf".to_string()
            } else {
                elem.max.to_string()
            };
            writeln!(
                f,
                "  [{idx}] {kind} depth={} min={} max={} next={:?} jump={:?}{}",
                elem.depth,
                elem.min,
                max,
                elem.next,
                elem.jump,
                if elem.reluctant { " reluctant" } else { "" }
            )?;
        }
        Ok(())
    }
}
