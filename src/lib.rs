// SPDX-License-Identifier: MIT OR Apache-2.0

//! # RowFlux
//!
//! The core of a Row Pattern Recognition engine: the subsystem behind SQL's
//! `MATCH_RECOGNIZE … PATTERN (…)` clause and equivalent CEP operators.
//! A pattern over an alphabet of named *variables* is compiled to a flat
//! NFA program; the matcher then consumes boolean variable assignments one
//! row at a time, tracking every concurrent match attempt, and emits
//! completed matches under the configured SKIP / OUTPUT policies.
//!
//! ```
//! use rowflux_rust::core::config::MatcherConfig;
//! use rowflux_rust::core::matcher::PatternMatcher;
//!
//! let mut matcher =
//!     PatternMatcher::from_pattern_str("A B+ C", MatcherConfig::default()).unwrap();
//! assert!(matcher.process_row(0, &["A"]).unwrap().is_empty());
//! assert!(matcher.process_row(1, &["B"]).unwrap().is_empty());
//! assert!(matcher.process_row(2, &["B"]).unwrap().is_empty());
//! let emissions = matcher.process_row(3, &["C"]).unwrap();
//! assert_eq!(emissions.len(), 1);
//! assert_eq!(emissions[0].paths[0], vec!["A", "B", "B", "C"]);
//! ```
//!
//! What is matched per row is not a character but the *set of variables
//! that are true for that row*; predicate evaluation (`DEFINE`), measures
//! and the surrounding SQL operator live outside this crate.

pub mod core;
pub mod pattern_compiler;

pub use crate::core::config::{MatcherConfig, OutputMode, SkipMode};
pub use crate::core::error::{RowFluxError, RowFluxResult};
pub use crate::core::matcher::{MatchEmission, PatternMatcher};
pub use crate::core::pattern::Pattern;
pub use crate::pattern_compiler::{compile, CompileError};
