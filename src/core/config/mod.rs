// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Matcher Configuration
//!
//! Construction-time configuration for the NFA executor and emitter. The two
//! policies are independent: SKIP controls which completed contexts are
//! eligible to emit, OUTPUT controls how many completed paths a single
//! emission carries.
//!
//! Configs are plain serde structs and can be loaded from YAML or JSON
//! documents, e.g.
//!
//! ```yaml
//! skip_mode: TO_NEXT
//! output_mode: ALL_ROWS
//! ```

use serde::{Deserialize, Serialize};

use crate::core::error::{RowFluxError, RowFluxResult};

/// When a completed context becomes eligible for emission relative to other
/// contexts and earlier emissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SkipMode {
    /// Emitted matches never overlap: a completed context starting at or
    /// before the last emitted end is discarded.
    #[default]
    #[serde(rename = "PAST_LAST")]
    PastLast,
    /// Match starts are strictly increasing; overlapping matches may all
    /// emit once earlier contexts resolve.
    #[serde(rename = "TO_NEXT")]
    ToNext,
}

/// How many completed paths one emission carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputMode {
    /// Only the lexically first completed path (longest, then smallest seq).
    #[default]
    #[serde(rename = "ONE_ROW")]
    OneRow,
    /// Every completed path, in ascending seq order.
    #[serde(rename = "ALL_ROWS")]
    AllRows,
}

/// Executor + emitter configuration. Defaults: `PAST_LAST`, `ONE_ROW`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    pub skip_mode: SkipMode,
    pub output_mode: OutputMode,
}

impl MatcherConfig {
    pub fn new(skip_mode: SkipMode, output_mode: OutputMode) -> Self {
        Self {
            skip_mode,
            output_mode,
        }
    }

    /// Parse a configuration from a YAML document.
    pub fn from_yaml_str(yaml: &str) -> RowFluxResult<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| RowFluxError::configuration(format!("invalid matcher config: {e}")))
    }
}
