//! Rendering normalized records back to line-oriented report text.
//!
//! The consolidation pass feeds previously-decoded records to a second
//! model call as plain text. The renderer emits the same notation the
//! decoder reads, so rendered output survives a decode/normalize round
//! trip: scalars as `key: value` lines, object-shaped fields as one-row
//! tables, record arrays as multi-row tables, and scalar arrays as bracket
//! literals.

use crate::record::AnalysisRecord;
use crate::schema::FieldShapeMap;
use crate::value::{Record, Scalar, Value};

/// Renders one record, canonical fields first in schema order, then any
/// off-schema fields in record order.
///
/// # Examples
///
/// ```
/// use toon_report_core::{FieldShapeMap, Record, Scalar, Value, render_record};
///
/// let mut fields = Record::new();
/// fields.insert("percentual_conclusao".into(), Value::Scalar(Scalar::Int(72)));
/// fields.insert(
///     "itens_faltantes".into(),
///     Value::ScalarArray(vec![Scalar::text("guarda-corpo"), Scalar::text("forma")]),
/// );
///
/// let text = render_record(&fields, &FieldShapeMap::pairwise());
/// assert_eq!(
///     text,
///     "percentual_conclusao: 72\nitens_faltantes: [\"guarda-corpo\", \"forma\"]\n",
/// );
/// ```
pub fn render_record(record: &Record, schema: &FieldShapeMap) -> String {
    let mut out = String::new();

    for spec in schema.iter() {
        if let Some(value) = record.get(spec.name) {
            render_field(&mut out, spec.name, value, spec.subfields);
        }
    }
    for (name, value) in record.iter() {
        if schema.get(name).is_none() {
            render_field(&mut out, name, value, &[]);
        }
    }

    out
}

/// Renders a batch of records as numbered sections for the consolidation
/// prompt, preserving each record's position in the original request order.
/// Degraded records are marked so the second pass can weigh them down.
pub fn render_batch(records: &[AnalysisRecord], schema: &FieldShapeMap) -> String {
    let mut out = String::new();
    for (position, record) in records.iter().enumerate() {
        if position > 0 {
            out.push('\n');
        }
        if record.partial {
            out.push_str(&format!("# par {} (parcial)\n", position + 1));
        } else {
            out.push_str(&format!("# par {}\n", position + 1));
        }
        out.push_str(&render_record(&record.fields, schema));
    }
    out
}

fn render_field(out: &mut String, name: &str, value: &Value, fallback_columns: &[&str]) {
    match value {
        Value::Scalar(scalar) => {
            out.push_str(&format!("{name}: {}\n", render_scalar(scalar)));
        }
        Value::ScalarArray(items) => {
            let rendered: Vec<String> = items.iter().map(render_bracket_element).collect();
            out.push_str(&format!("{name}: [{}]\n", rendered.join(", ")));
        }
        Value::Object(object) => {
            render_table(out, name, std::slice::from_ref(object), fallback_columns);
        }
        Value::ObjectArray(rows) => {
            render_table(out, name, rows, fallback_columns);
        }
    }
}

fn render_table(out: &mut String, name: &str, rows: &[Record], fallback_columns: &[&str]) {
    let columns: Vec<String> = match rows.first() {
        Some(first) => first.keys().map(str::to_string).collect(),
        None => fallback_columns.iter().map(|c| (*c).to_string()).collect(),
    };
    out.push_str(&format!("{name}{{{}}}:\n", columns.join(",")));

    for row in rows {
        let cells: Vec<String> = columns
            .iter()
            .map(|column| {
                row.get(column)
                    .and_then(|value| value.as_scalar())
                    .map(render_scalar)
                    .unwrap_or_default()
            })
            .collect();
        out.push_str(&format!("  {}\n", cells.join(",")));
    }
}

fn render_scalar(scalar: &Scalar) -> String {
    match scalar {
        Scalar::Text(text) if needs_quoting(text) => format!("\"{text}\""),
        other => other.to_string(),
    }
}

fn render_bracket_element(scalar: &Scalar) -> String {
    match scalar {
        Scalar::Text(text) => format!("\"{text}\""),
        other => other.to_string(),
    }
}

// Text cells are quoted when the decoder would otherwise split, trim, or
// retype them.
fn needs_quoting(text: &str) -> bool {
    text.is_empty() || text.contains(',') || text != text.trim() || looks_numeric(text)
}

fn looks_numeric(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty()
        && digits.chars().all(|ch| ch.is_ascii_digit() || ch == '.')
        && digits.chars().filter(|&ch| ch == '.').count() <= 1
        && !digits.starts_with('.')
        && !digits.ends_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CONFORMITY, DETECTED_ISSUES};

    #[test]
    fn test_object_renders_as_one_row_table() {
        let mut conformity = Record::new();
        conformity.insert("estrutura".into(), Value::Scalar(Scalar::text("conforme")));
        conformity.insert("dimensoes".into(), Value::Scalar(Scalar::text("não_conforme")));

        let mut record = Record::new();
        record.insert(CONFORMITY.into(), Value::Object(conformity));

        let text = render_record(&record, &FieldShapeMap::pairwise());
        assert_eq!(text, "conformidade{estrutura,dimensoes}:\n  conforme,não_conforme\n");
    }

    #[test]
    fn test_cell_with_comma_is_quoted() {
        let mut issue = Record::new();
        issue.insert("tipo".into(), Value::Scalar(Scalar::text("estrutural")));
        issue.insert(
            "descricao".into(),
            Value::Scalar(Scalar::text("afeta custo, prazo e qualidade")),
        );
        issue.insert("severidade".into(), Value::Scalar(Scalar::text("alta")));

        let mut record = Record::new();
        record.insert(DETECTED_ISSUES.into(), Value::ObjectArray(vec![issue]));

        let text = render_record(&record, &FieldShapeMap::pairwise());
        assert!(text.contains("  estrutural,\"afeta custo, prazo e qualidade\",alta\n"));
    }

    #[test]
    fn test_numeric_looking_text_is_quoted_to_keep_its_type() {
        let mut record = Record::new();
        record.insert("justificativa".into(), Value::Scalar(Scalar::text("42")));
        let text = render_record(&record, &FieldShapeMap::pairwise());
        assert_eq!(text, "justificativa: \"42\"\n");
    }

    #[test]
    fn test_empty_object_array_renders_header_from_schema() {
        let mut record = Record::new();
        record.insert(DETECTED_ISSUES.into(), Value::ObjectArray(Vec::new()));
        let text = render_record(&record, &FieldShapeMap::pairwise());
        assert_eq!(text, "problemas_detectados{tipo,descricao,severidade}:\n");
    }

    #[test]
    fn test_batch_marks_partial_sections() {
        let schema = FieldShapeMap::pairwise();
        let complete = AnalysisRecord::new(Record::new());
        let degraded = AnalysisRecord::degraded(schema.sentinel_record());

        let text = render_batch(&[complete, degraded], &schema);
        assert!(text.starts_with("# par 1\n"));
        assert!(text.contains("# par 2 (parcial)\n"));
    }
}
