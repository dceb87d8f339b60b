//! # Corpus Exporters
//!
//! Pure functions that turn `(document text, annotations, entities)` into
//! the payloads downstream NLP tooling consumes. Four formats are
//! supported:
//!
//! | Format | Output | Tokenized? |
//! |---|---|---|
//! | Enhanced JSON | full annotation dump with entity metadata | no |
//! | spaCy training | raw character spans with display labels | no |
//! | Hugging Face | token-classification records with BIO tags | yes |
//! | CoNLL-2003 | `token\tTAG` lines, plain text | yes |
//!
//! The two token-based formats share a single BIO routine ([`bio_tags`]);
//! there is deliberately exactly one place that decides how a character
//! span maps onto token tags.
//!
//! None of these functions mutate state. Delivering the payload to the
//! user (file download, HTTP response) belongs to the caller.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::annotation::Annotation;
use crate::entity::EntityCatalog;
use crate::tokenizer::{tokenize, Token};

/// Tool name stamped into export metadata.
pub const ANNOTATION_TOOL: &str = "Medical NER Annotation UI";

/// Tokenizes the document and assigns one BIO tag per token.
///
/// A token's tag defaults to `"O"`. A token whose range intersects an
/// annotation's range gets `B-<LABEL>` when it is the token the span
/// starts in, `I-<LABEL>` otherwise. Intersection (rather than full
/// containment) means an annotation boundary falling mid-token still tags
/// that token: with whitespace tokenization, "TICI 2b" annotated out of
/// "... TICI 2b." tags the token `2b.` as inside the span instead of
/// silently dropping it to `O`.
///
/// Annotations are walked in start-ascending order and the first
/// intersecting one wins; with the overlap rule enforced at admission
/// time at most one can match, so the ordering only matters for
/// exact-duplicate spans (the earliest-inserted label contributes the
/// tag). The label falls back to the raw entity id when the entity
/// definition no longer exists.
pub fn bio_tags(
    text: &str,
    annotations: &[Annotation],
    entities: &EntityCatalog,
) -> (Vec<Token>, Vec<String>) {
    let mut ordered: Vec<&Annotation> = annotations.iter().collect();
    ordered.sort_by_key(|a| a.start);

    let tokens = tokenize(text);
    let tags = tokens
        .iter()
        .map(|token| {
            ordered
                .iter()
                .find(|a| a.start < token.end && token.start < a.end)
                .map(|a| {
                    let label = entities.display_label(&a.entity);
                    if token.start <= a.start {
                        format!("B-{label}")
                    } else {
                        format!("I-{label}")
                    }
                })
                .unwrap_or_else(|| "O".to_string())
        })
        .collect();

    (tokens, tags)
}

/// Count of annotations per display label, for statistics panels.
pub fn entity_counts(
    annotations: &[Annotation],
    entities: &EntityCatalog,
) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for annotation in annotations {
        *counts
            .entry(entities.display_label(&annotation.entity))
            .or_insert(0) += 1;
    }
    counts
}

// ---------------------------------------------------------------------------
// Enhanced JSON

#[derive(Debug, Serialize)]
pub struct JsonExport {
    pub document_info: DocumentInfo,
    pub text: String,
    pub annotations: Vec<JsonAnnotation>,
}

#[derive(Debug, Serialize)]
pub struct DocumentInfo {
    pub created_at: String,
    pub total_annotations: usize,
    pub annotation_tool: String,
}

#[derive(Debug, Serialize)]
pub struct JsonAnnotation {
    pub id: String,
    pub start: usize,
    pub end: usize,
    pub text: String,
    /// The entity id, as stored on the annotation.
    pub label: String,
    pub entity_info: EntityInfo,
}

/// Display metadata for the referenced entity; `None` fields mean the
/// definition no longer exists.
#[derive(Debug, Serialize)]
pub struct EntityInfo {
    pub label: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

/// One-to-one dump of the span index, enriched with entity metadata.
pub fn export_json(
    text: &str,
    annotations: &[Annotation],
    entities: &EntityCatalog,
) -> JsonExport {
    let mut ordered: Vec<&Annotation> = annotations.iter().collect();
    ordered.sort_by_key(|a| a.start);

    JsonExport {
        document_info: DocumentInfo {
            created_at: Utc::now().to_rfc3339(),
            total_annotations: ordered.len(),
            annotation_tool: ANNOTATION_TOOL.to_string(),
        },
        text: text.to_string(),
        annotations: ordered
            .into_iter()
            .map(|a| {
                let entity = entities.get(&a.entity);
                JsonAnnotation {
                    id: a.id.clone(),
                    start: a.start,
                    end: a.end,
                    text: a.text.clone(),
                    label: a.entity.clone(),
                    entity_info: EntityInfo {
                        label: entity.map(|e| e.label.clone()),
                        description: entity.map(|e| e.description.clone()),
                        color: entity.map(|e| e.color.clone()),
                    },
                }
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// spaCy training JSON

#[derive(Debug, Serialize)]
pub struct SpacyExport {
    pub version: u32,
    pub meta: SpacyMeta,
    pub data: Vec<SpacyRecord>,
}

#[derive(Debug, Serialize)]
pub struct SpacyMeta {
    pub lang: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct SpacyRecord {
    pub text: String,
    pub entities: Vec<SpacyEntity>,
}

#[derive(Debug, Serialize)]
pub struct SpacyEntity {
    pub start: usize,
    pub end: usize,
    /// Display label (falls back to the entity id).
    pub label: String,
}

/// Raw character spans with display labels; no tokenization involved.
pub fn export_spacy(
    text: &str,
    annotations: &[Annotation],
    entities: &EntityCatalog,
) -> SpacyExport {
    let mut ordered: Vec<&Annotation> = annotations.iter().collect();
    ordered.sort_by_key(|a| a.start);

    SpacyExport {
        version: 4,
        meta: SpacyMeta {
            lang: "de".to_string(),
            name: "medical_ner_model".to_string(),
            description: "Medical NER annotations for German stroke documents".to_string(),
        },
        data: vec![SpacyRecord {
            text: text.to_string(),
            entities: ordered
                .into_iter()
                .map(|a| SpacyEntity {
                    start: a.start,
                    end: a.end,
                    label: entities.display_label(&a.entity),
                })
                .collect(),
        }],
    }
}

// ---------------------------------------------------------------------------
// Hugging Face token classification

#[derive(Debug, Serialize)]
pub struct HuggingFaceExport {
    pub data: Vec<HuggingFaceRecord>,
    pub features: HuggingFaceFeatures,
    pub metadata: HuggingFaceMetadata,
}

#[derive(Debug, Serialize)]
pub struct HuggingFaceRecord {
    pub tokens: Vec<String>,
    pub ner_tags: Vec<String>,
    pub id: usize,
}

#[derive(Debug, Serialize)]
pub struct HuggingFaceFeatures {
    pub tokens: HuggingFaceFeature,
    pub ner_tags: HuggingFaceFeature,
}

#[derive(Debug, Serialize)]
pub struct HuggingFaceFeature {
    pub dtype: String,
    #[serde(rename = "_type")]
    pub feature_type: String,
}

impl HuggingFaceFeature {
    fn sequence() -> Self {
        Self {
            dtype: "string".to_string(),
            feature_type: "Sequence".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HuggingFaceMetadata {
    pub created_at: String,
    pub language: String,
    pub domain: String,
    pub annotation_tool: String,
}

/// Token-classification records using the shared BIO routine.
pub fn export_huggingface(
    text: &str,
    annotations: &[Annotation],
    entities: &EntityCatalog,
) -> HuggingFaceExport {
    let (tokens, tags) = bio_tags(text, annotations, entities);

    HuggingFaceExport {
        data: vec![HuggingFaceRecord {
            tokens: tokens.into_iter().map(|t| t.text).collect(),
            ner_tags: tags,
            id: 0,
        }],
        features: HuggingFaceFeatures {
            tokens: HuggingFaceFeature::sequence(),
            ner_tags: HuggingFaceFeature::sequence(),
        },
        metadata: HuggingFaceMetadata {
            created_at: Utc::now().to_rfc3339(),
            language: "de".to_string(),
            domain: "medical".to_string(),
            annotation_tool: ANNOTATION_TOOL.to_string(),
        },
    }
}

// ---------------------------------------------------------------------------
// CoNLL-2003

/// Tab-separated `token\tTAG` lines joined by newlines. Plain text, the
/// only non-JSON format.
pub fn export_conll(text: &str, annotations: &[Annotation], entities: &EntityCatalog) -> String {
    let (tokens, tags) = bio_tags(text, annotations, entities);
    tokens
        .iter()
        .zip(tags.iter())
        .map(|(token, tag)| format!("{}\t{}", token.text, tag))
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------

/// The export formats the engine can produce, parseable from the format
/// segment of an export URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Json,
    Spacy,
    HuggingFace,
    Conll,
}

impl ExportFormat {
    /// Conventional file extension for download filenames.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Conll => "conll",
            _ => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "spacy" => Ok(ExportFormat::Spacy),
            "huggingface" => Ok(ExportFormat::HuggingFace),
            "conll" => Ok(ExportFormat::Conll),
            other => Err(format!("unknown export format {other:?}")),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportFormat::Json => "json",
            ExportFormat::Spacy => "spacy",
            ExportFormat::HuggingFace => "huggingface",
            ExportFormat::Conll => "conll",
        };
        write!(f, "{name}")
    }
}
