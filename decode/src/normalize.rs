//! Shape normalization for decoded records.
//!
//! The model alternates between one-row and multi-row tables for sections
//! that are conceptually a single object, wraps bare lists in single-field
//! rows, and sometimes emits a list as a stringified bracket literal. This
//! pass collapses that ambiguity into the one declared shape per field, so
//! consumers never need conditional shape checks. It is total: whatever is
//! present passes through, fixed or not, and nothing is invented for
//! absent fields.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use toon_report_core::{FieldShape, FieldShapeMap, FieldSpec, Record, Scalar, Value};

use crate::decoder::coerce_scalar;

/// One alias key folded into its canonical field name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasMerge {
    /// Alternate spelling found in the response.
    pub alias: String,
    /// Canonical field name it was merged into.
    pub canonical: String,
}

/// What the normalizer changed, for diagnostics and reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizeTrace {
    /// One-row tables collapsed into objects.
    pub collapsed_objects: Vec<String>,
    /// Single-field row arrays projected down to scalar lists.
    pub projected_lists: Vec<String>,
    /// Bracket-literal strings parsed into scalar lists.
    pub parsed_bracket_literals: Vec<String>,
    /// Alias keys merged into canonical names.
    pub merged_aliases: Vec<AliasMerge>,
    /// Fields dropped because no usable value remained.
    pub dropped_fields: Vec<String>,
    /// Field names the schema does not declare, passed through untouched.
    pub unknown_fields: Vec<String>,
}

impl NormalizeTrace {
    /// Returns `true` when no rule fired and no unknown key was seen.
    pub fn is_clean(&self) -> bool {
        self.collapsed_objects.is_empty()
            && self.projected_lists.is_empty()
            && self.parsed_bracket_literals.is_empty()
            && self.merged_aliases.is_empty()
            && self.dropped_fields.is_empty()
            && self.unknown_fields.is_empty()
    }
}

/// Normalizes a decoded record against the field-shape schema.
///
/// Applied per field present in the input:
///
/// 1. declared `object` but decoded as a row array: the first row becomes
///    the object (an empty row array drops the field);
/// 2. declared `array-of-scalar` but decoded as single-field rows: each row
///    is projected down to its one value, blank results dropped;
/// 3. declared `array-of-scalar` but decoded as a bracket-literal string:
///    brackets stripped, comma-split, per-element unquoting and numeric
///    coercion;
/// 4. alias keys fold into the canonical name when the canonical key is
///    absent, and are removed either way;
/// 5. absent fields stay absent.
///
/// Normalizing an already-normalized record is a no-op.
pub fn normalize_record(record: Record, schema: &FieldShapeMap) -> (Record, NormalizeTrace) {
    let mut trace = NormalizeTrace::default();
    let mut normalized = Record::new();

    // Canonical keys present anywhere in the input, so an alias appearing
    // before its canonical spelling still loses to it.
    let canonical_present: HashSet<String> = record
        .keys()
        .filter(|key| schema.get(key).is_some())
        .map(str::to_string)
        .collect();

    for (key, value) in record {
        let (name, spec) = match schema.get(&key) {
            Some(spec) => (key, spec),
            None => match schema.resolve(&key) {
                Some(spec) => {
                    if canonical_present.contains(spec.name) {
                        // The canonical key wins; the alias is dropped.
                        trace.dropped_fields.push(key);
                        continue;
                    }
                    trace.merged_aliases.push(AliasMerge {
                        alias: key,
                        canonical: spec.name.to_string(),
                    });
                    (spec.name.to_string(), spec)
                }
                None => {
                    warn!(field = key.as_str(), "field name absent from shape schema");
                    trace.unknown_fields.push(key.clone());
                    normalized.insert(key, value);
                    continue;
                }
            },
        };

        match apply_shape(&name, spec, value, &mut trace) {
            Some(fixed) => normalized.insert(name, fixed),
            None => trace.dropped_fields.push(name),
        }
    }

    (normalized, trace)
}

fn apply_shape(
    name: &str,
    spec: &FieldSpec,
    value: Value,
    trace: &mut NormalizeTrace,
) -> Option<Value> {
    match (spec.shape, value) {
        (FieldShape::Object, Value::ObjectArray(rows)) => {
            trace.collapsed_objects.push(name.to_string());
            rows.into_iter().next().map(Value::Object)
        }
        (FieldShape::ScalarArray, Value::ObjectArray(rows))
            if rows.iter().all(|row| row.len() <= 1) =>
        {
            trace.projected_lists.push(name.to_string());
            let items: Vec<Scalar> = rows
                .into_iter()
                .filter_map(|row| row.into_iter().next())
                .filter_map(|(_, cell)| match cell {
                    Value::Scalar(scalar) if !scalar.is_empty_text() => Some(scalar),
                    _ => None,
                })
                .collect();
            Some(Value::ScalarArray(items))
        }
        (FieldShape::ScalarArray, Value::Scalar(Scalar::Text(text)))
            if looks_like_bracket_literal(&text) =>
        {
            trace.parsed_bracket_literals.push(name.to_string());
            Some(Value::ScalarArray(parse_bracket_literal(&text)))
        }
        (_, value) => Some(value),
    }
}

fn looks_like_bracket_literal(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.starts_with('[') && trimmed.ends_with(']') && trimmed.len() >= 2
}

fn parse_bracket_literal(text: &str) -> Vec<Scalar> {
    let trimmed = text.trim();
    let inner = &trimmed[1..trimmed.len() - 1];
    inner
        .split(',')
        .map(str::trim)
        .filter(|element| !element.is_empty())
        .map(coerce_scalar)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use toon_report_core::{
        CONFORMITY, GENERAL_OBSERVATIONS, MISSING_ITEMS, RECOMMENDED_ACTIONS, validate_record,
    };

    fn scalar(text: &str) -> Value {
        Value::Scalar(Scalar::text(text))
    }

    #[test]
    fn test_one_row_table_collapses_to_object() {
        let mut row = Record::new();
        row.insert("estrutura".into(), scalar("conforme"));
        row.insert("dimensoes".into(), scalar("parcialmente_conforme"));
        row.insert("acabamento".into(), scalar("não_conforme"));
        row.insert("posicionamento".into(), scalar("conforme"));

        let mut record = Record::new();
        record.insert(CONFORMITY.into(), Value::ObjectArray(vec![row.clone()]));

        let (normalized, trace) = normalize_record(record, &FieldShapeMap::pairwise());
        assert_eq!(normalized.get(CONFORMITY), Some(&Value::Object(row)));
        assert_eq!(trace.collapsed_objects, [CONFORMITY]);
    }

    #[test]
    fn test_empty_row_array_under_object_schema_is_dropped() {
        let mut record = Record::new();
        record.insert(CONFORMITY.into(), Value::ObjectArray(Vec::new()));

        let (normalized, trace) = normalize_record(record, &FieldShapeMap::pairwise());
        assert!(normalized.get(CONFORMITY).is_none());
        assert_eq!(trace.dropped_fields, [CONFORMITY]);
    }

    #[test]
    fn test_single_field_rows_project_to_scalar_list() {
        let rows: Vec<Record> = ["vergalhão", "", "guarda-corpo"]
            .iter()
            .map(|item| {
                let mut row = Record::new();
                row.insert("item".into(), scalar(item));
                row
            })
            .collect();

        let mut record = Record::new();
        record.insert(MISSING_ITEMS.into(), Value::ObjectArray(rows));

        let (normalized, trace) = normalize_record(record, &FieldShapeMap::pairwise());
        assert_eq!(
            normalized.get(MISSING_ITEMS),
            Some(&Value::ScalarArray(vec![
                Scalar::text("vergalhão"),
                Scalar::text("guarda-corpo"),
            ]))
        );
        assert_eq!(trace.projected_lists, [MISSING_ITEMS]);
    }

    #[test]
    fn test_bracket_literal_recovers_numeric_list() {
        let mut record = Record::new();
        record.insert(MISSING_ITEMS.into(), scalar("[1, 2, 3]"));

        let (normalized, _) = normalize_record(record, &FieldShapeMap::pairwise());
        assert_eq!(
            normalized.get(MISSING_ITEMS),
            Some(&Value::ScalarArray(vec![Scalar::Int(1), Scalar::Int(2), Scalar::Int(3)]))
        );
    }

    #[test]
    fn test_bracket_literal_recovers_string_list() {
        let mut record = Record::new();
        record.insert(RECOMMENDED_ACTIONS.into(), scalar("[\"a\",\"b\"]"));

        let (normalized, _) = normalize_record(record, &FieldShapeMap::pairwise());
        assert_eq!(
            normalized.get(RECOMMENDED_ACTIONS),
            Some(&Value::ScalarArray(vec![Scalar::text("a"), Scalar::text("b")]))
        );
    }

    #[test]
    fn test_alias_merges_only_when_canonical_absent() {
        let mut record = Record::new();
        record.insert("observacoes".into(), scalar("sem ressalvas"));

        let (normalized, trace) = normalize_record(record, &FieldShapeMap::pairwise());
        assert_eq!(normalized.get(GENERAL_OBSERVATIONS), Some(&scalar("sem ressalvas")));
        assert!(!normalized.contains_key("observacoes"));
        assert_eq!(trace.merged_aliases.len(), 1);

        let mut both = Record::new();
        both.insert(GENERAL_OBSERVATIONS.into(), scalar("canônico"));
        both.insert("observacoes".into(), scalar("legado"));

        let (normalized, trace) = normalize_record(both, &FieldShapeMap::pairwise());
        assert_eq!(normalized.get(GENERAL_OBSERVATIONS), Some(&scalar("canônico")));
        assert!(!normalized.contains_key("observacoes"));
        assert_eq!(trace.dropped_fields, ["observacoes"]);
    }

    #[test]
    fn test_alias_before_canonical_still_loses() {
        let mut record = Record::new();
        record.insert("observacoes".into(), scalar("legado"));
        record.insert(GENERAL_OBSERVATIONS.into(), scalar("canônico"));

        let (normalized, trace) = normalize_record(record, &FieldShapeMap::pairwise());
        assert_eq!(normalized.get(GENERAL_OBSERVATIONS), Some(&scalar("canônico")));
        assert_eq!(trace.dropped_fields, ["observacoes"]);
        assert!(trace.merged_aliases.is_empty());
    }

    #[test]
    fn test_unknown_fields_pass_through_and_are_flagged() {
        let mut record = Record::new();
        record.insert("campo_surpresa".into(), scalar("valor"));

        let (normalized, trace) = normalize_record(record, &FieldShapeMap::pairwise());
        assert_eq!(normalized.get("campo_surpresa"), Some(&scalar("valor")));
        assert_eq!(trace.unknown_fields, ["campo_surpresa"]);
    }

    #[test]
    fn test_absent_fields_stay_absent() {
        let (normalized, trace) = normalize_record(Record::new(), &FieldShapeMap::pairwise());
        assert!(normalized.is_empty());
        assert!(trace.is_clean());
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let schema = FieldShapeMap::pairwise();

        let mut row = Record::new();
        row.insert("estrutura".into(), scalar("conforme"));
        row.insert("dimensoes".into(), scalar("conforme"));
        row.insert("acabamento".into(), scalar("conforme"));
        row.insert("posicionamento".into(), scalar("conforme"));

        let mut record = Record::new();
        record.insert("percentual_conclusao".into(), Value::Scalar(Scalar::Int(60)));
        record.insert(CONFORMITY.into(), Value::ObjectArray(vec![row]));
        record.insert(MISSING_ITEMS.into(), scalar("[1, 2]"));

        let (once, _) = normalize_record(record, &schema);
        assert!(validate_record(&once, &schema).is_empty());

        let (twice, trace) = normalize_record(once.clone(), &schema);
        assert_eq!(twice, once);
        assert!(trace.is_clean());
    }
}
