// SPDX-License-Identifier: MIT OR Apache-2.0

//! Compiled pattern elements.
//!
//! A compiled pattern is a flat array of `PatternElement` slots terminated by
//! a single `Fin` sentinel. Element kind is an explicit tagged enum rather
//! than the signed-integer encoding sometimes used for NFA programs; the
//! kind-polymorphic `jump` field is reached through accessors so each use
//! site names what it is actually following.

use serde::Serialize;

/// Sentinel for an unbounded repetition upper bound (`*`, `+`, `{n,}`).
pub const UNBOUNDED: usize = usize::MAX;

/// What a program slot does when the simulation reaches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ElementKind {
    /// Consume one row matched by the variable with this id.
    Var(usize),
    /// Entry point of an alternation; arms hang off the `jump` chain.
    AltStart,
    /// Iteration boundary of a quantified group; `jump` loops back to the
    /// group's first element.
    GroupEnd,
    /// Completion sentinel; always the last element.
    Fin,
}

/// One slot in the compiled pattern program.
#[derive(Debug, Clone, Serialize)]
pub struct PatternElement {
    pub kind: ElementKind,
    /// Nesting depth; indexes the per-state repetition counter vector.
    pub depth: usize,
    /// Minimum repetitions (consecutive rows for `Var`, iterations for
    /// `GroupEnd`).
    pub min: usize,
    /// Maximum repetitions; `UNBOUNDED` for `*`/`+`/`{n,}`.
    pub max: usize,
    /// Success / epsilon-exit link. `None` only on `Fin`; every other
    /// element points at a valid index after compilation.
    pub next: Option<usize>,
    /// Kind-polymorphic side pointer, see [`PatternElement::next_arm`] and
    /// [`PatternElement::group_start`].
    pub jump: Option<usize>,
    /// Quantifier was written with the trailing `?` modifier.
    pub reluctant: bool,
}

impl PatternElement {
    /// Variable id when this is a `Var` slot.
    pub fn var_id(&self) -> Option<usize> {
        match self.kind {
            ElementKind::Var(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_fin(&self) -> bool {
        matches!(self.kind, ElementKind::Fin)
    }

    /// True when the upper repetition bound is unbounded.
    pub fn is_unbounded(&self) -> bool {
        self.max == UNBOUNDED
    }

    /// On the first element of a non-last alternation arm: the next arm's
    /// first element.
    pub fn next_arm(&self) -> Option<usize> {
        self.jump
    }

    /// On `GroupEnd`: the first element of the enclosing group (loop target).
    pub fn group_start(&self) -> Option<usize> {
        match self.kind {
            ElementKind::GroupEnd => self.jump,
            _ => None,
        }
    }
}
