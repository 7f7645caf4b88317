// SPDX-License-Identifier: MIT OR Apache-2.0

pub mod config;
pub mod error;
pub mod matcher;
pub mod pattern;

pub use config::{MatcherConfig, OutputMode, SkipMode};
pub use error::{RowFluxError, RowFluxResult};
pub use matcher::{MatchEmission, PatternMatcher, RowSnapshot};
pub use pattern::{ElementKind, Pattern, PatternElement, UNBOUNDED};
