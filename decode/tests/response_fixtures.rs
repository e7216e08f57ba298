use std::fs;
use std::path::PathBuf;

use toon_report_core::{
    FieldShapeMap, INCOMPLETE_ANALYSIS_NOTE, Scalar, render_record, validate_record,
};
use toon_report_decode::{
    DecodeOutcome, DecodePolicy, FallbackReason, decode_response, decode_response_with_report,
};

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|_| panic!("missing fixture {}", path.display()))
}

#[test]
fn test_complete_pairwise_response_decodes_to_canonical_shapes() {
    let schema = FieldShapeMap::pairwise();
    let run = decode_response_with_report(
        &fixture("pairwise-complete.txt"),
        &schema,
        DecodePolicy::default(),
    );

    assert_eq!(run.report.outcome, DecodeOutcome::Normalized);
    assert!(!run.record.partial);
    assert!(validate_record(&run.record.fields, &schema).is_empty());

    assert_eq!(run.record.completion_percent(), Some(72.0));
    assert!(
        run.record
            .progress_narrative()
            .unwrap()
            .starts_with("Estrutura de concreto concluída")
    );

    // One-row conformity table arrives as an object with all four aspects.
    let conformity = run.record.field("conformidade").unwrap().as_object().unwrap();
    assert_eq!(
        conformity.get("acabamento").and_then(|v| v.as_scalar()),
        Some(&Scalar::text("não_conforme"))
    );

    // The quoted description keeps its commas as one cell.
    let issues = run
        .record
        .field("problemas_detectados")
        .unwrap()
        .as_object_array()
        .unwrap();
    assert_eq!(issues.len(), 2);
    assert_eq!(
        issues[0].get("descricao").and_then(|v| v.as_scalar()),
        Some(&Scalar::text("Fissura vertical no pilar P3, próxima à junta de dilatação"))
    );

    // Single-column rows project down to a scalar list.
    let missing = run
        .record
        .field("itens_faltantes")
        .unwrap()
        .as_scalar_array()
        .unwrap();
    assert_eq!(missing.len(), 2);
    assert_eq!(missing[0], Scalar::text("guarda-corpo provisório"));

    // The bracket literal becomes a string list.
    let actions = run
        .record
        .field("acoes_recomendadas")
        .unwrap()
        .as_scalar_array()
        .unwrap();
    assert_eq!(actions.len(), 2);
    assert_eq!(actions[1], Scalar::text("Refazer reboco da fachada norte"));
}

#[test]
fn test_consolidated_response_carries_distribution_and_priorities() {
    let schema = FieldShapeMap::consolidated();
    let record = decode_response(&fixture("consolidated.txt"), &schema);

    assert!(!record.partial);
    assert!(validate_record(&record.fields, &schema).is_empty());

    let distribution = record
        .field("distribuicao_percentual")
        .unwrap()
        .as_object()
        .unwrap();
    assert_eq!(
        distribution.get("media").and_then(|v| v.as_scalar()),
        Some(&Scalar::Float(68.5))
    );
    assert_eq!(
        distribution.get("minimo").and_then(|v| v.as_scalar()),
        Some(&Scalar::Int(55))
    );

    let priorities = record
        .field("recomendacoes_prioritarias")
        .unwrap()
        .as_object_array()
        .unwrap();
    assert_eq!(priorities.len(), 2);
    assert_eq!(
        priorities[0].get("prioridade").and_then(|v| v.as_scalar()),
        Some(&Scalar::Int(1))
    );
    assert_eq!(
        priorities[1].get("acao").and_then(|v| v.as_scalar()),
        Some(&Scalar::text("Concluir vedações do pavimento 2"))
    );
}

#[test]
fn test_truncated_response_with_known_finish_reason_recovers() {
    let schema = FieldShapeMap::pairwise();
    let run = decode_response_with_report(
        &fixture("truncated.txt"),
        &schema,
        DecodePolicy {
            assume_truncated: true,
        },
    );

    assert_eq!(
        run.report.fallback_reason,
        Some(FallbackReason::TruncatedGeneration)
    );
    assert!(run.record.partial);
    assert_eq!(run.record.completion_percent(), Some(45.0));
    assert!(
        run.record
            .progress_narrative()
            .unwrap()
            .starts_with("Fundações concluídas")
    );
    assert!(validate_record(&run.record.fields, &schema).is_empty());
}

#[test]
fn test_prose_response_yields_sentinel_record() {
    let schema = FieldShapeMap::pairwise();
    let run = decode_response_with_report(&fixture("prose.txt"), &schema, DecodePolicy::default());

    assert_eq!(run.report.outcome, DecodeOutcome::PartiallyRecovered);
    assert_eq!(
        run.report.fallback_reason,
        Some(FallbackReason::NoRecognizedLines)
    );
    assert!(run.record.partial);
    assert!(run.record.completion_percent().is_some());
    assert_eq!(run.record.progress_narrative(), Some(INCOMPLETE_ANALYSIS_NOTE));
    assert!(validate_record(&run.record.fields, &schema).is_empty());
}

#[test]
fn test_rendered_record_survives_a_second_decode() {
    let schema = FieldShapeMap::pairwise();
    let first = decode_response(&fixture("pairwise-complete.txt"), &schema);

    let rendered = render_record(&first.fields, &schema);
    let second = decode_response(&rendered, &schema);

    assert_eq!(second.fields, first.fields);
    assert!(!second.partial);
}
