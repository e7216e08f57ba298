//! Structured reporting for one decode run.

use serde::{Deserialize, Serialize};

use crate::normalize::NormalizeTrace;

/// Terminal state of the decode pipeline for one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeOutcome {
    /// Full decode succeeded and shape normalization ran.
    Normalized,
    /// Structural decoding was impossible; targeted recovery ran instead.
    PartiallyRecovered,
}

/// Why the pipeline took the recovery path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// Response text was empty or whitespace-only.
    EmptyInput,
    /// No line matched either grammar form.
    NoRecognizedLines,
    /// The caller reported the generation was cut off, so a full decode
    /// was never attempted.
    TruncatedGeneration,
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "empty_input"),
            Self::NoRecognizedLines => write!(f, "no_recognized_lines"),
            Self::TruncatedGeneration => write!(f, "truncated_generation"),
        }
    }
}

/// Per-response decode report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodeReport {
    pub outcome: DecodeOutcome,
    /// Set when the outcome is [`DecodeOutcome::PartiallyRecovered`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<FallbackReason>,
    /// Non-blank lines seen by the decoder.
    pub relevant_lines: usize,
    /// Lines that matched a grammar form.
    pub recognized_lines: usize,
    /// Lines skipped as noise, in input order.
    pub skipped_lines: Vec<String>,
    /// Field names the shape schema does not declare.
    pub unknown_fields: Vec<String>,
    /// What normalization changed.
    pub normalize_trace: NormalizeTrace,
}

impl DecodeReport {
    /// Report for a recovery-path run.
    pub(crate) fn recovered(reason: FallbackReason) -> Self {
        Self {
            outcome: DecodeOutcome::PartiallyRecovered,
            fallback_reason: Some(reason),
            relevant_lines: 0,
            recognized_lines: 0,
            skipped_lines: Vec::new(),
            unknown_fields: Vec::new(),
            normalize_trace: NormalizeTrace::default(),
        }
    }

    /// Fraction of relevant lines the decoder recognized.
    pub fn coverage(&self) -> f64 {
        if self.relevant_lines == 0 {
            return 0.0;
        }
        self.recognized_lines as f64 / self.relevant_lines as f64
    }
}
