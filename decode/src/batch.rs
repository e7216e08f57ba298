//! Ordered decoding for concurrent fan-out response sets.
//!
//! Pairwise comparisons are issued concurrently upstream, and completion
//! order does not match submission order. Every result carries its request
//! index explicitly, and consumers receive records sorted back into
//! submission order before rendering or consolidation.

use rayon::prelude::*;

use toon_report_core::{AnalysisRecord, FieldShapeMap};

use crate::{DecodePolicy, decode_response_with_report};

/// A decoded record tagged with its original request index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedRecord {
    pub index: usize,
    pub record: AnalysisRecord,
}

/// Decodes a batch of responses in parallel and returns the records in
/// submission order.
///
/// # Examples
///
/// ```
/// use toon_report_core::FieldShapeMap;
/// use toon_report_decode::batch::decode_batch;
///
/// let responses = vec![
///     "percentual_conclusao: 10".to_string(),
///     "percentual_conclusao: 20".to_string(),
/// ];
/// let records = decode_batch(&responses, &FieldShapeMap::pairwise());
/// assert_eq!(records[0].completion_percent(), Some(10.0));
/// assert_eq!(records[1].completion_percent(), Some(20.0));
/// ```
pub fn decode_batch(responses: &[String], schema: &FieldShapeMap) -> Vec<AnalysisRecord> {
    let indexed: Vec<IndexedRecord> = responses
        .par_iter()
        .enumerate()
        .map(|(index, text)| IndexedRecord {
            index,
            record: decode_response_with_report(text, schema, DecodePolicy::default()).record,
        })
        .collect();
    into_request_order(indexed)
}

/// Sorts indexed results back into request order and strips the indices.
/// Useful when results were gathered from completion-ordered channels
/// rather than [`decode_batch`].
pub fn into_request_order(mut results: Vec<IndexedRecord>) -> Vec<AnalysisRecord> {
    results.sort_by_key(|entry| entry.index);
    results.into_iter().map(|entry| entry.record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_preserves_submission_order() {
        let schema = FieldShapeMap::pairwise();
        let responses: Vec<String> = (0..16)
            .map(|i| format!("percentual_conclusao: {i}"))
            .collect();

        let records = decode_batch(&responses, &schema);
        let percents: Vec<f64> = records
            .iter()
            .filter_map(|record| record.completion_percent())
            .collect();
        assert_eq!(percents, (0..16).map(f64::from).collect::<Vec<_>>());
    }

    #[test]
    fn test_into_request_order_sorts_completion_ordered_results() {
        let schema = FieldShapeMap::pairwise();
        let make = |index: usize, pct: i64| IndexedRecord {
            index,
            record: decode_response_with_report(
                &format!("percentual_conclusao: {pct}"),
                &schema,
                DecodePolicy::default(),
            )
            .record,
        };

        let shuffled = vec![make(2, 30), make(0, 10), make(1, 20)];
        let ordered = into_request_order(shuffled);
        assert_eq!(ordered[0].completion_percent(), Some(10.0));
        assert_eq!(ordered[2].completion_percent(), Some(30.0));
    }

    #[test]
    fn test_failed_responses_still_occupy_their_slot() {
        let schema = FieldShapeMap::pairwise();
        let responses = vec![
            "percentual_conclusao: 10".to_string(),
            "resposta sem estrutura".to_string(),
            "percentual_conclusao: 30".to_string(),
        ];

        let records = decode_batch(&responses, &schema);
        assert_eq!(records.len(), 3);
        assert!(!records[0].partial);
        assert!(records[1].partial);
        assert_eq!(records[2].completion_percent(), Some(30.0));
    }
}
