//! Core value model and field-shape schema for TOON analysis reports.
//!
//! This crate defines the foundational types shared by the decode pipeline
//! and its consumers:
//!
//! - [`Scalar`], [`Value`], [`Record`]: the tagged value model for decoded
//!   report content (scalar, object, array-of-object, array-of-scalar).
//! - [`FieldShapeMap`], [`FieldSpec`], [`FieldShape`]: static per-field
//!   shape declarations for the pairwise and consolidated report schemas.
//! - [`AnalysisRecord`]: the canonical, immutable-after-construction
//!   pipeline output with its degraded-path `partial` flag.
//!
//! Validation ([`validate_record`]) checks a record against its declared
//! shapes. Rendering ([`render_record`], [`render_batch`]) serializes
//! normalized records back to report text for the consolidation pass.
//!
//! # Example
//!
//! ```
//! use toon_report_core::*;
//!
//! let schema = FieldShapeMap::pairwise();
//!
//! let mut fields = Record::new();
//! fields.insert("percentual_conclusao".into(), Value::Scalar(Scalar::Int(72)));
//! fields.insert(
//!     "acoes_recomendadas".into(),
//!     Value::ScalarArray(vec![Scalar::text("refazer escoramento")]),
//! );
//!
//! assert!(validate_record(&fields, &schema).is_empty());
//!
//! let record = AnalysisRecord::new(fields);
//! assert_eq!(record.completion_percent(), Some(72.0));
//! ```

mod record;
mod render;
mod schema;
mod validate;
mod value;

pub use record::AnalysisRecord;
pub use render::{render_batch, render_record};
pub use schema::{
    COMPLETION_PERCENT, CONFORMITY, DETECTED_ISSUES, FieldShape, FieldShapeMap, FieldSpec,
    GENERAL_OBSERVATIONS, INCOMPLETE_ANALYSIS_NOTE, JUSTIFICATION, MISSING_ITEMS,
    NEUTRAL_COMPLETION_PERCENT, NOT_IDENTIFIED, PERCENT_DISTRIBUTION, PRIORITY_RECOMMENDATIONS,
    PROGRESS_NARRATIVE, RECOMMENDED_ACTIONS,
};
pub use validate::{ShapeViolation, validate_record};
pub use value::{Record, Scalar, Value};
