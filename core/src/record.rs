//! Canonical analysis record produced by the decode pipeline.

use serde::{Deserialize, Serialize};

use crate::schema::{COMPLETION_PERCENT, PROGRESS_NARRATIVE};
use crate::{Record, Value};

/// A normalized analysis record, immutable after construction.
///
/// `partial` is the sole degraded-confidence marker: it is set when the
/// record came from the recovery path instead of a full decode, so
/// consumers can render a caveat without inferring degradation from
/// sentinel field values.
///
/// # Examples
///
/// ```
/// use toon_report_core::{AnalysisRecord, Record, Scalar, Value};
///
/// let mut fields = Record::new();
/// fields.insert("percentual_conclusao".into(), Value::Scalar(Scalar::Int(72)));
/// fields.insert("analise_progresso".into(), Value::Scalar(Scalar::text("Fase intermediária")));
///
/// let record = AnalysisRecord::new(fields);
/// assert!(!record.partial);
/// assert_eq!(record.completion_percent(), Some(72.0));
/// assert_eq!(record.progress_narrative(), Some("Fase intermediária"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// Normalized field values.
    pub fields: Record,
    /// Set when the record came from the degraded recovery path.
    pub partial: bool,
}

impl AnalysisRecord {
    /// Wraps a fully-decoded, normalized record.
    pub fn new(fields: Record) -> Self {
        Self {
            fields,
            partial: false,
        }
    }

    /// Wraps a degraded record produced by partial recovery.
    pub fn degraded(fields: Record) -> Self {
        Self {
            fields,
            partial: true,
        }
    }

    /// Returns the value for a field, if present.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Completion percentage as a number, widening integers.
    pub fn completion_percent(&self) -> Option<f64> {
        self.fields
            .get(COMPLETION_PERCENT)
            .and_then(|value| value.as_scalar())
            .and_then(|scalar| scalar.as_float())
    }

    /// Short progress narrative text.
    pub fn progress_narrative(&self) -> Option<&str> {
        self.fields
            .get(PROGRESS_NARRATIVE)
            .and_then(|value| value.as_scalar())
            .and_then(|scalar| scalar.as_str())
    }
}
