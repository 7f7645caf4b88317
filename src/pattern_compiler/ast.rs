// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pattern AST.
//!
//! Four node variants mirror the grammar: quantified variables, quantified
//! groups, ordered concatenation and ordered disjunction. Order inside
//! `Seq` and `Alt` is significant: it is what lexical match order is
//! ultimately derived from.

use crate::core::pattern::UNBOUNDED;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternAst {
    Var {
        name: String,
        min: usize,
        max: usize,
        reluctant: bool,
    },
    Group {
        content: Box<PatternAst>,
        min: usize,
        max: usize,
        reluctant: bool,
    },
    /// Ordered concatenation.
    Seq { items: Vec<PatternAst> },
    /// Ordered disjunction; each alternative is a `Seq`.
    Alt { alternatives: Vec<PatternAst> },
}

impl PatternAst {
    pub fn var(name: &str) -> Self {
        PatternAst::Var {
            name: name.to_string(),
            min: 1,
            max: 1,
            reluctant: false,
        }
    }

    pub fn quantified(self, min: usize, max: usize, reluctant: bool) -> Self {
        match self {
            PatternAst::Var { name, .. } => PatternAst::Var {
                name,
                min,
                max,
                reluctant,
            },
            // A freshly parsed `( ... )` group carries {1,1}; quantifying it
            // sets the bounds in place instead of nesting a second group.
            PatternAst::Group {
                content,
                min: 1,
                max: 1,
                reluctant: false,
            } => PatternAst::Group {
                content,
                min,
                max,
                reluctant,
            },
            other => PatternAst::Group {
                content: Box::new(other),
                min,
                max,
                reluctant,
            },
        }
    }

    /// Render this AST back to pattern text. The result re-parses to a
    /// structurally equal AST (modulo whitespace).
    pub fn to_pattern_string(&self) -> String {
        let mut out = String::new();
        self.write(&mut out);
        out
    }

    fn write(&self, out: &mut String) {
        match self {
            PatternAst::Var {
                name,
                min,
                max,
                reluctant,
            } => {
                out.push_str(name);
                write_quantifier(out, *min, *max, *reluctant);
            }
            PatternAst::Group {
                content,
                min,
                max,
                reluctant,
            } => {
                out.push('(');
                content.write(out);
                out.push(')');
                write_quantifier(out, *min, *max, *reluctant);
            }
            PatternAst::Seq { items } => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    // A bare Alt inside a Seq needs parentheses to keep the
                    // rendered precedence.
                    if matches!(item, PatternAst::Alt { .. }) {
                        out.push('(');
                        item.write(out);
                        out.push(')');
                    } else {
                        item.write(out);
                    }
                }
            }
            PatternAst::Alt { alternatives } => {
                for (i, alt) in alternatives.iter().enumerate() {
                    if i > 0 {
                        out.push_str(" | ");
                    }
                    alt.write(out);
                }
            }
        }
    }
}

fn write_quantifier(out: &mut String, min: usize, max: usize, reluctant: bool) {
    match (min, max) {
        (1, 1) => return,
        (0, 1) => out.push('?'),
        (0, UNBOUNDED) => out.push('*'),
        (1, UNBOUNDED) => out.push('+'),
        (n, UNBOUNDED) => {
            out.push_str(&format!("{{{n},}}"));
        }
        (n, m) if n == m => {
            out.push_str(&format!("{{{n}}}"));
        }
        (n, m) => {
            out.push_str(&format!("{{{n},{m}}}"));
        }
    }
    if reluctant {
        out.push('?');
    }
}

impl fmt::Display for PatternAst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_pattern_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_quantifiers() {
        assert_eq!(PatternAst::var("A").to_pattern_string(), "A");
        assert_eq!(
            PatternAst::var("A").quantified(0, 1, false).to_pattern_string(),
            "A?"
        );
        assert_eq!(
            PatternAst::var("A")
                .quantified(0, UNBOUNDED, true)
                .to_pattern_string(),
            "A*?"
        );
        assert_eq!(
            PatternAst::var("A").quantified(2, 5, false).to_pattern_string(),
            "A{2,5}"
        );
        assert_eq!(
            PatternAst::var("A")
                .quantified(3, UNBOUNDED, false)
                .to_pattern_string(),
            "A{3,}"
        );
        assert_eq!(
            PatternAst::var("A").quantified(4, 4, false).to_pattern_string(),
            "A{4}"
        );
        assert_eq!(
            PatternAst::var("A").quantified(0, 3, false).to_pattern_string(),
            "A{0,3}"
        );
    }

    #[test]
    fn test_render_nested() {
        let ast = PatternAst::Seq {
            items: vec![
                PatternAst::var("A"),
                PatternAst::Group {
                    content: Box::new(PatternAst::Alt {
                        alternatives: vec![
                            PatternAst::var("B"),
                            PatternAst::Seq {
                                items: vec![PatternAst::var("C"), PatternAst::var("D")],
                            },
                        ],
                    }),
                    min: 1,
                    max: UNBOUNDED,
                    reluctant: false,
                },
            ],
        };
        assert_eq!(ast.to_pattern_string(), "A (B | C D)+");
    }
}
