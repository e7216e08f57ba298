//! Shape-contract validation for normalized records.
//!
//! Checks every canonical field present in a record against its declared
//! shape, catching divergences such as a conformity section left as a row
//! array or a non-numeric completion percentage. Off-schema keys are not
//! violations: the field map is a starting point, not a closed list.
//!
//! # Examples
//!
//! ```
//! use toon_report_core::*;
//!
//! let schema = FieldShapeMap::pairwise();
//! let record = schema.sentinel_record();
//! assert!(validate_record(&record, &schema).is_empty());
//!
//! // Conformity left as a one-row table is a shape violation.
//! let mut bad = Record::new();
//! bad.insert("conformidade".into(), Value::ObjectArray(vec![Record::new()]));
//! let violations = validate_record(&bad, &schema);
//! assert!(violations.iter().any(|v| matches!(v, ShapeViolation::WrongShape { .. })));
//! ```

use thiserror::Error;

use crate::schema::{FieldShape, FieldShapeMap};
use crate::value::{Record, Scalar, Value};

/// A divergence between a record field and its declared shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeViolation {
    /// Field value does not have the declared shape.
    #[error("field `{field}` expected {expected} but found {found}")]
    WrongShape {
        field: String,
        expected: &'static str,
        found: &'static str,
    },
    /// Object-shaped field is missing a declared sub-field.
    #[error("object field `{field}` is missing subfield `{subfield}`")]
    MissingSubfield { field: String, subfield: String },
    /// Numeric field holds non-numeric text.
    #[error("field `{field}` must be numeric")]
    NonNumeric { field: String },
}

/// Validates every canonical field present in `record` against `schema`.
///
/// Returns an empty vector for a conforming record. Absent fields are not
/// violations (the normalizer does not invent defaults), and neither are
/// keys the schema does not declare.
pub fn validate_record(record: &Record, schema: &FieldShapeMap) -> Vec<ShapeViolation> {
    let mut violations = Vec::new();

    for (name, value) in record.iter() {
        let Some(spec) = schema.get(name) else {
            continue;
        };

        let matches_shape = matches!(
            (spec.shape, value),
            (FieldShape::Scalar, Value::Scalar(_))
                | (FieldShape::Object, Value::Object(_))
                | (FieldShape::ObjectArray, Value::ObjectArray(_))
                | (FieldShape::ScalarArray, Value::ScalarArray(_))
        );
        if !matches_shape {
            violations.push(ShapeViolation::WrongShape {
                field: name.to_string(),
                expected: spec.shape.label(),
                found: value.shape_label(),
            });
            continue;
        }

        if let Value::Object(object) = value {
            for subfield in spec.subfields {
                if !object.contains_key(subfield) {
                    violations.push(ShapeViolation::MissingSubfield {
                        field: name.to_string(),
                        subfield: (*subfield).to_string(),
                    });
                }
            }
        }

        if spec.numeric && matches!(value, Value::Scalar(Scalar::Text(_))) {
            violations.push(ShapeViolation::NonNumeric {
                field: name.to_string(),
            });
        }
    }

    violations
}
