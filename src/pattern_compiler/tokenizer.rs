// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pattern tokenizer.
//!
//! Splits a pattern string into parentheses, alternation bars, variable
//! names and quantifiers. Offsets are 0-based character positions, kept on
//! every token so the parser can report structural errors precisely.
//!
//! Unsupported constructs are rejected here with dedicated errors rather
//! than a generic "invalid character": `PERMUTE`, `&` (AND), `^`/`$`
//! (anchors) and `{- -}` (exclusion) all name the construct they refuse.

use super::error::CompileError;
use crate::core::pattern::UNBOUNDED;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    LParen,
    RParen,
    /// Alternation bar `|`.
    Alt,
    Var(String),
    Quant {
        min: usize,
        max: usize,
        reluctant: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// 0-based character offset of the token's first character.
    pub offset: usize,
}

impl Token {
    fn new(kind: TokenKind, offset: usize) -> Self {
        Self { kind, offset }
    }
}

struct Cursor {
    chars: Vec<char>,
    pos: usize,
}

impl Cursor {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }
}

/// Tokenize a pattern string.
pub fn tokenize(input: &str) -> Result<Vec<Token>, CompileError> {
    let mut cursor = Cursor {
        chars: input.chars().collect(),
        pos: 0,
    };
    let mut tokens = Vec::new();

    while let Some(ch) = cursor.peek() {
        let offset = cursor.pos;
        match ch {
            ' ' | '\t' | '\n' | '\r' => {
                cursor.bump();
            }
            '(' => {
                cursor.bump();
                tokens.push(Token::new(TokenKind::LParen, offset));
            }
            ')' => {
                cursor.bump();
                tokens.push(Token::new(TokenKind::RParen, offset));
            }
            '|' => {
                cursor.bump();
                tokens.push(Token::new(TokenKind::Alt, offset));
            }
            '?' => {
                cursor.bump();
                let reluctant = cursor.eat('?');
                tokens.push(Token::new(
                    TokenKind::Quant {
                        min: 0,
                        max: 1,
                        reluctant,
                    },
                    offset,
                ));
            }
            '*' => {
                cursor.bump();
                let reluctant = cursor.eat('?');
                tokens.push(Token::new(
                    TokenKind::Quant {
                        min: 0,
                        max: UNBOUNDED,
                        reluctant,
                    },
                    offset,
                ));
            }
            '+' => {
                cursor.bump();
                let reluctant = cursor.eat('?');
                tokens.push(Token::new(
                    TokenKind::Quant {
                        min: 1,
                        max: UNBOUNDED,
                        reluctant,
                    },
                    offset,
                ));
            }
            '{' => {
                let (min, max) = braced_quantifier(&mut cursor, offset)?;
                let reluctant = cursor.eat('?');
                tokens.push(Token::new(
                    TokenKind::Quant {
                        min,
                        max,
                        reluctant,
                    },
                    offset,
                ));
            }
            '&' => return Err(CompileError::AndNotSupported { offset }),
            '^' | '$' => return Err(CompileError::AnchorNotSupported { ch, offset }),
            c if c.is_ascii_alphabetic() => {
                let mut name = String::new();
                while let Some(c) = cursor.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        name.push(c);
                        cursor.bump();
                    } else {
                        break;
                    }
                }
                if name.eq_ignore_ascii_case("PERMUTE") {
                    return Err(CompileError::PermuteNotSupported { offset });
                }
                tokens.push(Token::new(TokenKind::Var(name), offset));
            }
            c => return Err(CompileError::InvalidCharacter { ch: c, offset }),
        }
    }

    Ok(tokens)
}

/// Parse the interior of a `{...}` quantifier. The opening brace is at
/// `offset` and has not been consumed yet.
fn braced_quantifier(cursor: &mut Cursor, offset: usize) -> Result<(usize, usize), CompileError> {
    cursor.bump(); // '{'

    if cursor.peek() == Some('-') {
        return Err(CompileError::ExclusionNotSupported { offset });
    }

    let min_digits = read_digits(cursor);
    let has_comma = cursor.eat(',');
    let max_digits = if has_comma { read_digits(cursor) } else { None };

    match cursor.peek() {
        Some('}') => {
            cursor.bump();
        }
        Some(_) => return Err(CompileError::MalformedQuantifier { offset }),
        None => return Err(CompileError::UnclosedBrace { offset }),
    }

    match (min_digits, has_comma, max_digits) {
        // {n}
        (Some(n), false, _) => {
            if n == 0 {
                return Err(CompileError::ZeroQuantifier { offset });
            }
            Ok((n, n))
        }
        // {n,m}
        (Some(n), true, Some(m)) => {
            if m == 0 || n > m {
                return Err(CompileError::InvalidQuantifierRange {
                    min: n,
                    max: m,
                    offset,
                });
            }
            Ok((n, m))
        }
        // {n,}
        (Some(n), true, None) => Ok((n, UNBOUNDED)),
        // {,m}
        (None, true, Some(m)) => {
            if m == 0 {
                return Err(CompileError::InvalidQuantifierRange {
                    min: 0,
                    max: m,
                    offset,
                });
            }
            Ok((0, m))
        }
        // {} or {,}
        _ => Err(CompileError::EmptyQuantifier { offset }),
    }
}

fn read_digits(cursor: &mut Cursor) -> Option<usize> {
    let mut value: Option<usize> = None;
    while let Some(c) = cursor.peek() {
        if let Some(digit) = c.to_digit(10) {
            value = Some(value.unwrap_or(0) * 10 + digit as usize);
            cursor.bump();
        } else {
            break;
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quant(min: usize, max: usize, reluctant: bool) -> TokenKind {
        TokenKind::Quant {
            min,
            max,
            reluctant,
        }
    }

    #[test]
    fn test_basic_tokens() {
        let tokens = tokenize("A (B | C_1)*").expect("tokenizes");
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Var("A".to_string()),
                TokenKind::LParen,
                TokenKind::Var("B".to_string()),
                TokenKind::Alt,
                TokenKind::Var("C_1".to_string()),
                TokenKind::RParen,
                quant(0, UNBOUNDED, false),
            ]
        );
    }

    #[test]
    fn test_offsets_skip_whitespace() {
        let tokens = tokenize("  A\tB").expect("tokenizes");
        assert_eq!(tokens[0].offset, 2);
        assert_eq!(tokens[1].offset, 4);
    }

    #[test]
    fn test_quantifier_forms() {
        for (text, expected) in [
            ("A?", quant(0, 1, false)),
            ("A??", quant(0, 1, true)),
            ("A*", quant(0, UNBOUNDED, false)),
            ("A+?", quant(1, UNBOUNDED, true)),
            ("A{3}", quant(3, 3, false)),
            ("A{2,5}", quant(2, 5, false)),
            ("A{2,}", quant(2, UNBOUNDED, false)),
            ("A{,4}", quant(0, 4, false)),
            ("A{2,5}?", quant(2, 5, true)),
        ] {
            let tokens = tokenize(text).expect(text);
            assert_eq!(tokens[1].kind, expected, "for {text}");
        }
    }

    #[test]
    fn test_and_operator_rejected_with_offset() {
        let err = tokenize("A & B").unwrap_err();
        assert_eq!(err, CompileError::AndNotSupported { offset: 2 });
        assert!(err.to_string().contains("AND operator not supported"));
    }

    #[test]
    fn test_permute_rejected_case_insensitive() {
        let err = tokenize("Permute(A, B)").unwrap_err();
        assert_eq!(err, CompileError::PermuteNotSupported { offset: 0 });
    }

    #[test]
    fn test_permute_prefix_is_a_plain_variable() {
        let tokens = tokenize("PERMUTED").expect("tokenizes");
        assert_eq!(tokens[0].kind, TokenKind::Var("PERMUTED".to_string()));
    }

    #[test]
    fn test_anchors_rejected() {
        assert_eq!(
            tokenize("^A").unwrap_err(),
            CompileError::AnchorNotSupported { ch: '^', offset: 0 }
        );
        assert_eq!(
            tokenize("A$").unwrap_err(),
            CompileError::AnchorNotSupported { ch: '$', offset: 1 }
        );
    }

    #[test]
    fn test_exclusion_rejected() {
        let err = tokenize("A {- B -}").unwrap_err();
        assert_eq!(err, CompileError::ExclusionNotSupported { offset: 2 });
    }

    #[test]
    fn test_bad_quantifiers() {
        assert_eq!(
            tokenize("A{}").unwrap_err(),
            CompileError::EmptyQuantifier { offset: 1 }
        );
        assert_eq!(
            tokenize("A{0}").unwrap_err(),
            CompileError::ZeroQuantifier { offset: 1 }
        );
        assert_eq!(
            tokenize("A{3,2}").unwrap_err(),
            CompileError::InvalidQuantifierRange {
                min: 3,
                max: 2,
                offset: 1
            }
        );
        assert_eq!(
            tokenize("A{1,0}").unwrap_err(),
            CompileError::InvalidQuantifierRange {
                min: 1,
                max: 0,
                offset: 1
            }
        );
        assert_eq!(
            tokenize("A{2").unwrap_err(),
            CompileError::UnclosedBrace { offset: 1 }
        );
        assert_eq!(
            tokenize("A{x}").unwrap_err(),
            CompileError::MalformedQuantifier { offset: 1 }
        );
    }

    #[test]
    fn test_invalid_character() {
        let err = tokenize("A # B").unwrap_err();
        assert_eq!(
            err,
            CompileError::InvalidCharacter { ch: '#', offset: 2 }
        );
    }

    #[test]
    fn test_zero_min_range_is_legal() {
        let tokens = tokenize("A{0,3}").expect("tokenizes");
        assert_eq!(tokens[1].kind, quant(0, 3, false));
    }
}
