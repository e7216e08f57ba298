//! Line-oriented decoder for the report notation the analysis prompts
//! request from the model.
//!
//! The grammar is two line forms plus tolerance:
//!
//! - `key: value` scalar assignments, with quote stripping and numeric
//!   coercion;
//! - `key{col1,col2,...}:` table headers followed by indented
//!   comma-separated rows, where commas inside double quotes do not split;
//! - every other line is skipped. The model is a cooperative but unreliable
//!   generator, and rejecting on any deviation would throw away
//!   otherwise-usable output.
//!
//! Decoding fails only when the input contains no recognizable line at all.
//! Tables always decode to row sequences here; collapsing one-row tables
//! into objects is the normalizer's job, because a single-row table and a
//! multi-row table are structurally identical before domain knowledge is
//! applied.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use toon_report_core::{Record, Scalar, Value};

static PATTERNS: LazyLock<ToonPatterns> = LazyLock::new(ToonPatterns::new);

struct ToonPatterns {
    // conformidade{estrutura,dimensoes}:
    table_header: Regex,
    // percentual_conclusao: 72
    scalar_line: Regex,
    // 42, -7, 42.5
    numeral: Regex,
}

impl ToonPatterns {
    fn new() -> Self {
        // All regexes here are compile-time constants. An expect() failure
        // indicates a programmer error in the pattern, not a runtime
        // condition.
        Self {
            table_header: Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\{([^{}]*)\}:\s*$")
                .expect("static regex must compile"),
            scalar_line: Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*):\s?(.*)$")
                .expect("static regex must compile"),
            numeral: Regex::new(r"^-?\d+(\.\d+)?$").expect("static regex must compile"),
        }
    }
}

/// Decoding failed outright; the caller falls back to partial recovery.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The response was empty or whitespace-only.
    #[error("empty response text")]
    EmptyInput,
    /// No line matched either grammar form.
    #[error("response contains no recognizable report lines")]
    NoRecognizedLines,
}

/// Decoder for one response, accumulating line-level diagnostics.
///
/// # Examples
///
/// ```
/// use toon_report_decode::ToonDecoder;
///
/// let text = "\
/// percentual_conclusao: 72
/// analise_progresso: \"Fase intermediária\"
/// ";
///
/// let mut decoder = ToonDecoder::new();
/// let record = decoder.decode(text).unwrap();
/// assert_eq!(
///     record.get("percentual_conclusao").and_then(|v| v.as_scalar()).and_then(|s| s.as_int()),
///     Some(72),
/// );
/// assert_eq!(decoder.recognized_lines(), 2);
/// ```
#[derive(Debug, Default)]
pub struct ToonDecoder {
    relevant_lines: usize,
    recognized_lines: usize,
    skipped_lines: Vec<String>,
}

impl ToonDecoder {
    /// Creates a decoder with empty diagnostics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes cleaned response text into a shape-ambiguous record.
    ///
    /// Returns [`DecodeError`] only when zero scalar assignments and zero
    /// table headers were found; a single recognizable line is enough to
    /// produce a record.
    pub fn decode(&mut self, text: &str) -> Result<Record, DecodeError> {
        if text.trim().is_empty() {
            return Err(DecodeError::EmptyInput);
        }

        let lines: Vec<&str> = text.lines().collect();
        let mut record = Record::new();
        let mut index = 0;

        while index < lines.len() {
            let trimmed = lines[index].trim();
            if trimmed.is_empty() {
                index += 1;
                continue;
            }
            self.relevant_lines += 1;

            if let Some(caps) = PATTERNS.table_header.captures(trimmed) {
                let key = caps[1].to_string();
                let columns: Vec<String> = caps[2]
                    .split(',')
                    .map(|column| column.trim().to_string())
                    .filter(|column| !column.is_empty())
                    .collect();
                self.recognized_lines += 1;

                let (rows, next_index) = self.consume_rows(&lines, index + 1, &columns);
                record.insert(key, Value::ObjectArray(rows));
                index = next_index;
                continue;
            }

            if let Some(caps) = PATTERNS.scalar_line.captures(trimmed) {
                let key = caps[1].to_string();
                self.recognized_lines += 1;
                record.insert(key, Value::Scalar(coerce_scalar(&caps[2])));
                index += 1;
                continue;
            }

            debug!(line = trimmed, "skipping unrecognized line");
            self.skipped_lines.push(trimmed.to_string());
            index += 1;
        }

        if self.recognized_lines == 0 {
            return Err(DecodeError::NoRecognizedLines);
        }
        Ok(record)
    }

    /// Consumes indented row lines following a table header. Stops at the
    /// first non-indented line (blank lines included) or end of input.
    fn consume_rows(
        &mut self,
        lines: &[&str],
        start: usize,
        columns: &[String],
    ) -> (Vec<Record>, usize) {
        let mut rows = Vec::new();
        let mut index = start;

        while index < lines.len() {
            let line = lines[index];
            if !line.starts_with(' ') && !line.starts_with('\t') {
                break;
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                index += 1;
                continue;
            }

            self.relevant_lines += 1;
            self.recognized_lines += 1;

            let cells = split_quoted_cells(trimmed);
            let mut row = Record::new();
            for (column, cell) in columns.iter().zip(cells.iter()) {
                row.insert(column.clone(), Value::Scalar(coerce_scalar(cell)));
            }
            rows.push(row);
            index += 1;
        }

        (rows, index)
    }

    /// Non-blank lines seen.
    pub fn relevant_lines(&self) -> usize {
        self.relevant_lines
    }

    /// Lines that matched a grammar form.
    pub fn recognized_lines(&self) -> usize {
        self.recognized_lines
    }

    /// Lines skipped as noise, in input order.
    pub fn skipped_lines(&self) -> &[String] {
        &self.skipped_lines
    }
}

/// Applies the shared value-parsing rules: trim, strip matching quotes,
/// then coerce to a number when the text matches the numeral pattern
/// (decimal point selects float, otherwise integer). Used identically for
/// top-level scalar values and table cells so the same logical field never
/// types differently across response shapes.
pub(crate) fn coerce_scalar(raw: &str) -> Scalar {
    let unquoted = strip_matching_quotes(raw.trim());
    if PATTERNS.numeral.is_match(unquoted) {
        if unquoted.contains('.') {
            if let Ok(value) = unquoted.parse::<f64>() {
                return Scalar::Float(value);
            }
        } else if let Ok(value) = unquoted.parse::<i64>() {
            return Scalar::Int(value);
        }
    }
    Scalar::Text(unquoted.to_string())
}

fn strip_matching_quotes(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Splits a row on commas, treating double-quoted spans as opaque.
/// Description cells legitimately contain commas.
fn split_quoted_cells(row: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in row.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            ',' if !in_quotes => {
                cells.push(std::mem::take(&mut current).trim().to_string());
            }
            _ => current.push(ch),
        }
    }
    cells.push(current.trim().to_string());
    cells
}
