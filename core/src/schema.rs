//! Per-field shape declarations driving normalization and recovery defaults.
//!
//! The model alternates between one-row tables, multi-row tables, and
//! stringified list literals for the same logical field. The
//! [`FieldShapeMap`] declares the one canonical shape each field must end up
//! in, so shape decisions are driven by a static table rather than by
//! inspecting runtime values.

use serde::{Deserialize, Serialize};

use crate::{Record, Scalar, Value};

/// Sentinel text for fields the degraded path could not recover.
pub const NOT_IDENTIFIED: &str = "não identificado";

/// Mid-range completion placeholder used when the percentage could not be
/// recovered. Deliberately neither zero nor one hundred: the UI always
/// renders a percentage, and an extreme default would read as a finding.
pub const NEUTRAL_COMPLETION_PERCENT: i64 = 50;

/// Fixed caveat sentence substituted for a missing progress narrative.
pub const INCOMPLETE_ANALYSIS_NOTE: &str =
    "Análise incompleta: a resposta do modelo foi interrompida antes do fim do relatório.";

/// Completion percentage field (numeric scalar).
pub const COMPLETION_PERCENT: &str = "percentual_conclusao";
/// Short progress narrative field (text scalar).
pub const PROGRESS_NARRATIVE: &str = "analise_progresso";
/// Conformity classification field (object with fixed sub-aspects).
pub const CONFORMITY: &str = "conformidade";
/// Detected issue list (array of records with type/description/severity).
pub const DETECTED_ISSUES: &str = "problemas_detectados";
/// Missing/expected item list (array of scalars).
pub const MISSING_ITEMS: &str = "itens_faltantes";
/// Free-text general observations field.
pub const GENERAL_OBSERVATIONS: &str = "observacoes_gerais";
/// Free-text justification field.
pub const JUSTIFICATION: &str = "justificativa";
/// Recommended action list (array of scalars).
pub const RECOMMENDED_ACTIONS: &str = "acoes_recomendadas";
/// Percentage distribution summary (consolidated reports only).
pub const PERCENT_DISTRIBUTION: &str = "distribuicao_percentual";
/// Prioritized recommendation list (consolidated reports only).
pub const PRIORITY_RECOMMENDATIONS: &str = "recomendacoes_prioritarias";

/// Canonical shape a field must have after normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldShape {
    /// A single scalar value.
    Scalar,
    /// A single nested record, never an array.
    Object,
    /// An ordered sequence of records with named sub-fields.
    ObjectArray,
    /// An ordered sequence of bare scalars.
    ScalarArray,
}

impl FieldShape {
    /// Human-readable label matching [`Value::shape_label`].
    pub fn label(self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::Object => "object",
            Self::ObjectArray => "array-of-object",
            Self::ScalarArray => "array-of-scalar",
        }
    }
}

/// Static description of one canonical field.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    /// Canonical field name.
    pub name: &'static str,
    /// Required shape after normalization.
    pub shape: FieldShape,
    /// Legacy/alternate spellings merged into the canonical name.
    pub aliases: &'static [&'static str],
    /// Named sub-fields for object-shaped fields.
    pub subfields: &'static [&'static str],
    /// Whether a scalar field is expected to hold a number.
    pub numeric: bool,
}

const PAIRWISE_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: COMPLETION_PERCENT,
        shape: FieldShape::Scalar,
        aliases: &["percentual"],
        subfields: &[],
        numeric: true,
    },
    FieldSpec {
        name: PROGRESS_NARRATIVE,
        shape: FieldShape::Scalar,
        aliases: &[],
        subfields: &[],
        numeric: false,
    },
    FieldSpec {
        name: CONFORMITY,
        shape: FieldShape::Object,
        aliases: &[],
        subfields: &["estrutura", "dimensoes", "acabamento", "posicionamento"],
        numeric: false,
    },
    FieldSpec {
        name: DETECTED_ISSUES,
        shape: FieldShape::ObjectArray,
        aliases: &[],
        subfields: &["tipo", "descricao", "severidade"],
        numeric: false,
    },
    FieldSpec {
        name: MISSING_ITEMS,
        shape: FieldShape::ScalarArray,
        aliases: &["elementos_faltantes"],
        subfields: &[],
        numeric: false,
    },
    FieldSpec {
        name: GENERAL_OBSERVATIONS,
        shape: FieldShape::Scalar,
        aliases: &["observacoes", "observacao_geral"],
        subfields: &[],
        numeric: false,
    },
    FieldSpec {
        name: JUSTIFICATION,
        shape: FieldShape::Scalar,
        aliases: &[],
        subfields: &[],
        numeric: false,
    },
    FieldSpec {
        name: RECOMMENDED_ACTIONS,
        shape: FieldShape::ScalarArray,
        aliases: &["acoes_sugeridas"],
        subfields: &[],
        numeric: false,
    },
];

const CONSOLIDATED_EXTRAS: &[FieldSpec] = &[
    FieldSpec {
        name: PERCENT_DISTRIBUTION,
        shape: FieldShape::Object,
        aliases: &[],
        subfields: &["minimo", "maximo", "media", "desvio_padrao"],
        numeric: false,
    },
    FieldSpec {
        name: PRIORITY_RECOMMENDATIONS,
        shape: FieldShape::ObjectArray,
        aliases: &[],
        subfields: &["prioridade", "acao", "justificativa"],
        numeric: false,
    },
];

/// Ordered collection of canonical field declarations.
///
/// The built-in maps cover the fields the analysis prompts define today;
/// callers may extend them with [`FieldShapeMap::with_field`] when prompts
/// grow new sections. Field names absent from the map are not an error
/// anywhere in the pipeline, they are surfaced in diagnostics instead.
///
/// # Examples
///
/// ```
/// use toon_report_core::{FieldShape, FieldShapeMap};
///
/// let schema = FieldShapeMap::pairwise();
/// assert_eq!(schema.get("conformidade").unwrap().shape, FieldShape::Object);
///
/// // Alias lookup resolves to the canonical spec.
/// let spec = schema.resolve("observacoes").unwrap();
/// assert_eq!(spec.name, "observacoes_gerais");
///
/// let consolidated = FieldShapeMap::consolidated();
/// assert!(consolidated.get("distribuicao_percentual").is_some());
/// assert!(schema.get("distribuicao_percentual").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct FieldShapeMap {
    fields: Vec<FieldSpec>,
}

impl FieldShapeMap {
    /// Schema for one pairwise image-comparison response.
    pub fn pairwise() -> Self {
        Self {
            fields: PAIRWISE_FIELDS.to_vec(),
        }
    }

    /// Schema for the consolidating second-pass response: the pairwise
    /// fields plus the distribution summary and prioritized recommendations.
    pub fn consolidated() -> Self {
        let mut fields = PAIRWISE_FIELDS.to_vec();
        fields.extend(CONSOLIDATED_EXTRAS.iter().cloned());
        Self { fields }
    }

    /// Adds or replaces a field declaration.
    pub fn with_field(mut self, spec: FieldSpec) -> Self {
        if let Some(existing) = self.fields.iter_mut().find(|f| f.name == spec.name) {
            *existing = spec;
        } else {
            self.fields.push(spec);
        }
        self
    }

    /// Looks up a spec by canonical name.
    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|spec| spec.name == name)
    }

    /// Looks up a spec by canonical name or alias.
    pub fn resolve(&self, name: &str) -> Option<&FieldSpec> {
        self.fields
            .iter()
            .find(|spec| spec.name == name || spec.aliases.contains(&name))
    }

    /// Iterates field declarations in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter()
    }

    /// Builds a fully-populated record with explicit neutral sentinels:
    /// `"não identificado"` for scalar fields, the neutral percentage for
    /// numeric fields, empty sequences for list fields, and objects with
    /// every sub-field set to the sentinel.
    ///
    /// Consumed by the degraded recovery path only; the normalizer never
    /// invents defaults for absent fields.
    pub fn sentinel_record(&self) -> Record {
        let mut record = Record::new();
        for spec in &self.fields {
            let value = match spec.shape {
                FieldShape::Scalar if spec.numeric => {
                    Value::Scalar(Scalar::Int(NEUTRAL_COMPLETION_PERCENT))
                }
                FieldShape::Scalar => Value::Scalar(Scalar::text(NOT_IDENTIFIED)),
                FieldShape::Object => {
                    let mut object = Record::new();
                    for subfield in spec.subfields {
                        object.insert((*subfield).to_string(), Value::Scalar(Scalar::text(NOT_IDENTIFIED)));
                    }
                    Value::Object(object)
                }
                FieldShape::ObjectArray => Value::ObjectArray(Vec::new()),
                FieldShape::ScalarArray => Value::ScalarArray(Vec::new()),
            };
            record.insert(spec.name.to_string(), value);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairwise_field_order_is_stable() {
        let schema = FieldShapeMap::pairwise();
        let names: Vec<&str> = schema.iter().map(|spec| spec.name).collect();
        assert_eq!(
            names,
            vec![
                COMPLETION_PERCENT,
                PROGRESS_NARRATIVE,
                CONFORMITY,
                DETECTED_ISSUES,
                MISSING_ITEMS,
                GENERAL_OBSERVATIONS,
                JUSTIFICATION,
                RECOMMENDED_ACTIONS,
            ]
        );
    }

    #[test]
    fn test_resolve_prefers_canonical_over_alias() {
        let schema = FieldShapeMap::pairwise();
        assert_eq!(schema.resolve(GENERAL_OBSERVATIONS).unwrap().name, GENERAL_OBSERVATIONS);
        assert_eq!(schema.resolve("observacao_geral").unwrap().name, GENERAL_OBSERVATIONS);
        assert!(schema.resolve("campo_desconhecido").is_none());
    }

    #[test]
    fn test_sentinel_record_satisfies_every_shape() {
        let schema = FieldShapeMap::consolidated();
        let record = schema.sentinel_record();

        for spec in schema.iter() {
            let value = record.get(spec.name).expect("sentinel field present");
            assert_eq!(value.shape_label(), spec.shape.label(), "field {}", spec.name);
        }

        let percent = record
            .get(COMPLETION_PERCENT)
            .and_then(|v| v.as_scalar())
            .and_then(|s| s.as_int());
        assert_eq!(percent, Some(NEUTRAL_COMPLETION_PERCENT));

        let conformity = record.get(CONFORMITY).and_then(|v| v.as_object()).unwrap();
        assert_eq!(
            conformity.get("estrutura").and_then(|v| v.as_scalar()).and_then(|s| s.as_str()),
            Some(NOT_IDENTIFIED)
        );
    }

    #[test]
    fn test_with_field_replaces_existing_declaration() {
        let schema = FieldShapeMap::pairwise().with_field(FieldSpec {
            name: MISSING_ITEMS,
            shape: FieldShape::ObjectArray,
            aliases: &[],
            subfields: &["item", "quantidade"],
            numeric: false,
        });
        assert_eq!(schema.get(MISSING_ITEMS).unwrap().shape, FieldShape::ObjectArray);
        assert_eq!(schema.iter().count(), PAIRWISE_FIELDS.len());
    }
}
