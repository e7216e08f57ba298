//! Tolerant decoding of vision-analysis responses into canonical records.
//!
//! The analysis prompts instruct the vision model to answer in a compact
//! line-oriented notation instead of JSON: `key: value` lines plus
//! `key{columns}:` tables with indented comma-separated rows. Real
//! responses deviate: code fences, count hints, one-row tables where an
//! object was meant, stringified list literals, truncated output. This
//! crate turns that text into one predictable record shape, or into an
//! explicitly degraded record when structure is unrecoverable:
//!
//! - [`preprocess`]: envelope cleanup (fences, header hints, line endings).
//! - [`ToonDecoder`]: the permissive line-grammar decoder.
//! - [`normalize_record`]: per-field shape normalization against a
//!   [`FieldShapeMap`].
//! - [`recovery`]: targeted pattern extraction when decoding fails, so the
//!   caller always receives a usable record.
//! - [`batch`]: parallel decoding of fan-out response sets with request
//!   order restored.
//!
//! The main entry points are [`decode_response`] and
//! [`decode_response_with_report`]; neither ever returns an error.
//!
//! # Example
//!
//! ```
//! use toon_report_core::FieldShapeMap;
//! use toon_report_decode::decode_response;
//!
//! let text = "\
//! percentual_conclusao: 72
//! analise_progresso: \"Fase intermediária\"
//! conformidade{estrutura,dimensoes,acabamento,posicionamento}:
//!   conforme,parcialmente_conforme,não_conforme,conforme
//! ";
//!
//! let record = decode_response(text, &FieldShapeMap::pairwise());
//! assert!(!record.partial);
//! assert_eq!(record.completion_percent(), Some(72.0));
//! // The one-row conformity table arrives as an object.
//! assert!(record.field("conformidade").unwrap().as_object().is_some());
//! ```

pub mod batch;
pub mod decoder;
pub mod normalize;
pub mod preprocess;
pub mod recovery;
pub mod report;

use toon_report_core::{AnalysisRecord, FieldShapeMap};

pub use decoder::{DecodeError, ToonDecoder};
pub use normalize::{AliasMerge, NormalizeTrace, normalize_record};
pub use report::{DecodeOutcome, DecodeReport, FallbackReason};

/// Caller-supplied knowledge about the response.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodePolicy {
    /// Set when the model's finish reason says generation was cut off.
    /// A truncated table still decodes "successfully" into a misleading
    /// record, so a known cut-off goes straight to recovery.
    pub assume_truncated: bool,
}

/// A decoded record together with its run report.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeRun {
    pub record: AnalysisRecord,
    pub report: DecodeReport,
}

/// Decodes one response into a canonical record, falling back to partial
/// recovery when structural decoding fails. Never returns an error; the
/// record's `partial` flag is the sole degraded-confidence signal.
pub fn decode_response(text: &str, schema: &FieldShapeMap) -> AnalysisRecord {
    decode_response_with_report(text, schema, DecodePolicy::default()).record
}

/// Like [`decode_response`], with full line-level and normalization
/// diagnostics.
///
/// # Examples
///
/// ```
/// use toon_report_core::FieldShapeMap;
/// use toon_report_decode::{DecodeOutcome, DecodePolicy, decode_response_with_report};
///
/// let run = decode_response_with_report(
///     "nenhuma estrutura aqui",
///     &FieldShapeMap::pairwise(),
///     DecodePolicy::default(),
/// );
/// assert_eq!(run.report.outcome, DecodeOutcome::PartiallyRecovered);
/// assert!(run.record.partial);
/// ```
pub fn decode_response_with_report(
    text: &str,
    schema: &FieldShapeMap,
    policy: DecodePolicy,
) -> DecodeRun {
    if policy.assume_truncated {
        return DecodeRun {
            record: recovery::extract_partial(text, schema),
            report: DecodeReport::recovered(FallbackReason::TruncatedGeneration),
        };
    }

    let cleaned = preprocess::clean_response_text(text);
    let mut decoder = ToonDecoder::new();
    match decoder.decode(&cleaned) {
        Ok(decoded) => {
            let (normalized, trace) = normalize_record(decoded, schema);
            let report = DecodeReport {
                outcome: DecodeOutcome::Normalized,
                fallback_reason: None,
                relevant_lines: decoder.relevant_lines(),
                recognized_lines: decoder.recognized_lines(),
                skipped_lines: decoder.skipped_lines().to_vec(),
                unknown_fields: trace.unknown_fields.clone(),
                normalize_trace: trace,
            };
            DecodeRun {
                record: AnalysisRecord::new(normalized),
                report,
            }
        }
        Err(error) => {
            let reason = match error {
                DecodeError::EmptyInput => FallbackReason::EmptyInput,
                DecodeError::NoRecognizedLines => FallbackReason::NoRecognizedLines,
            };
            let mut report = DecodeReport::recovered(reason);
            report.relevant_lines = decoder.relevant_lines();
            report.skipped_lines = decoder.skipped_lines().to_vec();
            DecodeRun {
                record: recovery::extract_partial(text, schema),
                report,
            }
        }
    }
}
