// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Pattern Compiler
//!
//! Turns a `MATCH_RECOGNIZE`-style pattern string into a compiled
//! [`Pattern`] program: `string → tokens → AST → optimized AST → flat
//! element array`. All stages are pure; the first error aborts compilation
//! with an offset-carrying [`CompileError`].

pub mod ast;
pub mod error;
pub mod flatten;
pub mod optimizer;
pub mod parser;
pub mod tokenizer;

pub use ast::PatternAst;
pub use error::CompileError;
pub use optimizer::optimize;
pub use tokenizer::{Token, TokenKind};

use crate::core::pattern::Pattern;

/// Compile a pattern string into an executable [`Pattern`].
pub fn compile(input: &str) -> Result<Pattern, CompileError> {
    let tokens = tokenizer::tokenize(input)?;
    let ast = parser::parse(&tokens)?;
    let ast = optimizer::optimize(ast);
    flatten::flatten(&ast)
}

/// Parse a pattern string to its (unoptimized) AST. Mostly useful for
/// tooling and tests; [`compile`] is the production entry point.
pub fn parse_to_ast(input: &str) -> Result<PatternAst, CompileError> {
    let tokens = tokenizer::tokenize(input)?;
    parser::parse(&tokens)
}
