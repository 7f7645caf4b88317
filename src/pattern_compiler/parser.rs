// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recursive-descent parser: token stream → AST.
//!
//! Grammar (lowest precedence first):
//!
//! ```text
//! alternation = sequence ('|' sequence)*
//! sequence    = item+
//! item        = (VAR | '(' alternation ')') QUANT?
//! ```
//!
//! Structural rules rejected here: empty alternation arms (`|` at a
//! boundary, `||`), empty groups `()`, quantifiers that do not follow a
//! variable or group, and unbalanced parentheses.

use super::ast::PatternAst;
use super::error::CompileError;
use super::tokenizer::{Token, TokenKind};

pub fn parse(tokens: &[Token]) -> Result<PatternAst, CompileError> {
    let mut parser = Parser { tokens, pos: 0 };
    let ast = parser.parse_alternation()?;
    match parser.peek() {
        None => Ok(ast),
        Some(token) => match token.kind {
            TokenKind::RParen => Err(CompileError::UnmatchedCloseParen {
                offset: token.offset,
            }),
            // parse_alternation only stops at ')' or end of input.
            _ => Err(CompileError::internal(format!(
                "parser stopped at unexpected token {:?}",
                token.kind
            ))),
        },
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<&'a Token> {
        let token = self.peek()?;
        self.pos += 1;
        Some(token)
    }

    /// Offset to blame when an arm or group turns out to be empty: the
    /// current token, or one past the end of the input.
    fn here(&self) -> usize {
        self.peek().map(|t| t.offset).unwrap_or_else(|| {
            self.tokens
                .last()
                .map(|t| t.offset + 1)
                .unwrap_or(0)
        })
    }

    fn parse_alternation(&mut self) -> Result<PatternAst, CompileError> {
        let mut alternatives = vec![self.parse_sequence()?];
        while let Some(token) = self.peek() {
            if token.kind != TokenKind::Alt {
                break;
            }
            self.bump();
            alternatives.push(self.parse_sequence()?);
        }
        if alternatives.len() == 1 {
            Ok(alternatives.pop().expect("one alternative"))
        } else {
            Ok(PatternAst::Alt { alternatives })
        }
    }

    fn parse_sequence(&mut self) -> Result<PatternAst, CompileError> {
        let mut items: Vec<PatternAst> = Vec::new();
        let mut last_was_quantifier = false;

        loop {
            let Some(token) = self.peek() else { break };
            match &token.kind {
                TokenKind::Alt | TokenKind::RParen => break,
                TokenKind::Var(name) => {
                    let name = name.clone();
                    self.bump();
                    items.push(PatternAst::Var {
                        name,
                        min: 1,
                        max: 1,
                        reluctant: false,
                    });
                    last_was_quantifier = false;
                }
                TokenKind::LParen => {
                    let open_offset = token.offset;
                    self.bump();
                    match self.peek().map(|t| &t.kind) {
                        Some(TokenKind::RParen) => {
                            return Err(CompileError::EmptyGroup {
                                offset: open_offset,
                            });
                        }
                        None => {
                            return Err(CompileError::UnclosedParen {
                                offset: open_offset,
                            });
                        }
                        _ => {}
                    }
                    let content = self.parse_alternation()?;
                    match self.bump() {
                        Some(token) if token.kind == TokenKind::RParen => {}
                        _ => {
                            return Err(CompileError::UnclosedParen {
                                offset: open_offset,
                            })
                        }
                    }
                    items.push(PatternAst::Group {
                        content: Box::new(content),
                        min: 1,
                        max: 1,
                        reluctant: false,
                    });
                    last_was_quantifier = false;
                }
                TokenKind::Quant {
                    min,
                    max,
                    reluctant,
                } => {
                    let (min, max, reluctant) = (*min, *max, *reluctant);
                    let offset = token.offset;
                    if items.is_empty() || last_was_quantifier {
                        return Err(CompileError::MisplacedQuantifier { offset });
                    }
                    self.bump();
                    let target = items.pop().expect("non-empty");
                    items.push(target.quantified(min, max, reluctant));
                    last_was_quantifier = true;
                }
            }
        }

        if items.is_empty() {
            return Err(CompileError::EmptyAlternationArm {
                offset: self.here(),
            });
        }
        if items.len() == 1 {
            Ok(items.pop().expect("one item"))
        } else {
            Ok(PatternAst::Seq { items })
        }
    }
}
