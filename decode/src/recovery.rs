//! Last-resort field extraction when structural decoding fails.
//!
//! The common failure is generation cut off mid-table by a length limit.
//! This pass is deliberately narrow: a small fixed set of independent
//! pattern searches over the raw text, each optional, so the caller always
//! gets a minimally usable record. It is a fallback, not a second grammar,
//! and must never grow into one.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use toon_report_core::{
    AnalysisRecord, COMPLETION_PERCENT, FieldShapeMap, INCOMPLETE_ANALYSIS_NOTE,
    PROGRESS_NARRATIVE, Scalar, Value,
};

/// Upper bound on the recovered narrative length, in characters.
const NARRATIVE_MAX_CHARS: usize = 300;

static COMPLETION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)percentual_conclusao\s*[:=]?\s*"?(-?\d+)"#).expect("static regex must compile")
});
static NARRATIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)analise_progresso\s*[:=]?\s*(.+)").expect("static regex must compile")
});

/// Recovers a degraded record from undecodable response text.
///
/// Never fails. The completion percentage and the progress narrative are
/// searched for directly; every other canonical field is filled with the
/// schema's explicit neutral sentinels, so the result satisfies the same
/// shape contract as a fully-normalized record. The returned record
/// carries the `partial` flag.
///
/// # Examples
///
/// ```
/// use toon_report_core::FieldShapeMap;
/// use toon_report_decode::recovery::extract_partial;
///
/// let schema = FieldShapeMap::pairwise();
/// let record = extract_partial("não foi possível gerar o relatório", &schema);
///
/// assert!(record.partial);
/// assert!(record.completion_percent().is_some());
/// assert!(!record.progress_narrative().unwrap().is_empty());
/// ```
pub fn extract_partial(text: &str, schema: &FieldShapeMap) -> AnalysisRecord {
    let mut fields = schema.sentinel_record();

    if let Some(caps) = COMPLETION_RE.captures(text) {
        if let Ok(percent) = caps[1].parse::<i64>() {
            debug!(percent, "recovered completion percentage");
            fields.insert(COMPLETION_PERCENT.to_string(), Value::Scalar(Scalar::Int(percent)));
        }
    }

    let narrative = NARRATIVE_RE
        .captures(text)
        .map(|caps| clip_narrative(caps[1].trim()))
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| INCOMPLETE_ANALYSIS_NOTE.to_string());
    fields.insert(PROGRESS_NARRATIVE.to_string(), Value::Scalar(Scalar::Text(narrative)));

    AnalysisRecord::degraded(fields)
}

// Truncated generations often leave an unbalanced quote; stray quote
// characters are trimmed from both ends rather than requiring a matched
// pair.
fn clip_narrative(raw: &str) -> String {
    let unquoted = raw
        .trim()
        .trim_matches(|ch| ch == '"' || ch == '\'')
        .trim();
    unquoted.chars().take(NARRATIVE_MAX_CHARS).collect()
}
