//! # Annotations and the Span Index
//!
//! An [`Annotation`] is a labeled character range in the document. The
//! [`SpanIndex`] is the in-memory store of annotations for one document
//! session, responsible for upholding the invariants that make flat BIO
//! export possible:
//!
//! - offsets always reproduce the annotated text exactly
//!   (`document[start..end] == text`);
//! - the referenced entity exists at creation time;
//! - no two annotations partially overlap. Exact duplicates (same start,
//!   end and text) may coexist as independent annotations, so the same
//!   literal span can intentionally carry two labels.
//!
//! Admission is all-or-nothing: a candidate that fails any check leaves
//! the index untouched.

use serde::{Deserialize, Serialize};

use crate::entity::EntityCatalog;
use crate::error::AnnotateError;
use crate::selection::SpanCandidate;

/// A labeled span in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Unique within the document.
    pub id: String,
    /// Byte offset of the first byte (inclusive).
    pub start: usize,
    /// Byte offset one past the last byte (exclusive).
    pub end: usize,
    /// The annotated text, exactly as it appears in the document.
    pub text: String,
    /// Id of the entity this span is labeled with.
    pub entity: String,
}

/// Overlap admission rule.
///
/// A candidate is rejected iff its character range intersects an existing
/// annotation's range and the two are not exact duplicates. Partial and
/// nested overlaps are ambiguous under a flat BIO scheme, so they are
/// never admitted.
pub fn is_admissible(candidate: &SpanCandidate, existing: &[Annotation]) -> bool {
    existing.iter().all(|e| {
        let intersects = candidate.start < e.end && candidate.end > e.start;
        let exact_duplicate =
            candidate.start == e.start && candidate.end == e.end && candidate.text == e.text;
        !intersects || exact_duplicate
    })
}

/// In-memory annotation store for one document session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpanIndex {
    annotations: Vec<Annotation>,
    next_id: u64,
}

impl SpanIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a candidate against the document and admits it.
    ///
    /// Checks, in order: the entity id exists in the catalog, the offsets
    /// reproduce the candidate text exactly, and the overlap rule. On
    /// success the stored annotation (with its fresh id) is returned.
    pub fn add(
        &mut self,
        document: &str,
        candidate: &SpanCandidate,
        entity_id: &str,
        entities: &EntityCatalog,
    ) -> Result<Annotation, AnnotateError> {
        if !entities.contains(entity_id) {
            return Err(AnnotateError::InvalidEntityReference {
                entity: entity_id.to_string(),
            });
        }

        // The authoritative correctness check: offsets must slice out the
        // candidate text char-for-char.
        let malformed = AnnotateError::MalformedOffsets {
            start: candidate.start,
            end: candidate.end,
        };
        if candidate.start >= candidate.end {
            return Err(malformed);
        }
        match document.get(candidate.start..candidate.end) {
            Some(slice) if slice == candidate.text => {}
            _ => return Err(malformed),
        }

        if !is_admissible(candidate, &self.annotations) {
            return Err(AnnotateError::OverlapRejected {
                start: candidate.start,
                end: candidate.end,
            });
        }

        self.next_id += 1;
        let annotation = Annotation {
            id: self.next_id.to_string(),
            start: candidate.start,
            end: candidate.end,
            text: candidate.text.clone(),
            entity: entity_id.to_string(),
        };
        self.annotations.push(annotation.clone());
        Ok(annotation)
    }

    /// Removes by id. A missing id is a no-op, not an error.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.annotations.len();
        self.annotations.retain(|a| a.id != id);
        self.annotations.len() != before
    }

    /// Bulk removal of every annotation referencing an entity. Used when
    /// an entity definition is deleted. Returns how many were removed.
    pub fn remove_by_entity(&mut self, entity_id: &str) -> usize {
        let before = self.annotations.len();
        self.annotations.retain(|a| a.entity != entity_id);
        before - self.annotations.len()
    }

    /// All annotations sorted by `start` ascending; ties keep insertion
    /// order (stable sort over the insertion-ordered backing Vec).
    pub fn all(&self) -> Vec<Annotation> {
        let mut ordered = self.annotations.clone();
        ordered.sort_by_key(|a| a.start);
        ordered
    }

    pub fn by_entity(&self, entity_id: &str) -> Vec<Annotation> {
        self.all()
            .into_iter()
            .filter(|a| a.entity == entity_id)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter()
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn clear(&mut self) {
        self.annotations.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "Dr. Schmidt used TICI 2b.";

    fn candidate(start: usize, end: usize) -> SpanCandidate {
        SpanCandidate {
            start,
            end,
            text: DOC[start..end].to_string(),
        }
    }

    fn catalog() -> EntityCatalog {
        EntityCatalog::default_entities()
    }

    #[test]
    fn test_add_valid_annotation() {
        let mut index = SpanIndex::new();
        let ann = index
            .add(DOC, &candidate(0, 11), "person", &catalog())
            .expect("admitted");
        assert_eq!(ann.text, "Dr. Schmidt");
        assert_eq!(DOC[ann.start..ann.end], ann.text);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_unknown_entity_rejected_before_storage() {
        let mut index = SpanIndex::new();
        let err = index
            .add(DOC, &candidate(0, 11), "ghost", &catalog())
            .unwrap_err();
        assert!(matches!(err, AnnotateError::InvalidEntityReference { .. }));
        assert!(index.is_empty());
    }

    #[test]
    fn test_malformed_offsets_rejected() {
        let mut index = SpanIndex::new();
        let bad = SpanCandidate {
            start: 0,
            end: 11,
            text: "Dr. Schmid".to_string(),
        };
        let err = index.add(DOC, &bad, "person", &catalog()).unwrap_err();
        assert_eq!(err, AnnotateError::MalformedOffsets { start: 0, end: 11 });

        let inverted = SpanCandidate {
            start: 11,
            end: 0,
            text: String::new(),
        };
        assert!(index.add(DOC, &inverted, "person", &catalog()).is_err());
        assert!(index.is_empty());
    }

    #[test]
    fn test_partial_overlap_rejected() {
        let mut index = SpanIndex::new();
        index
            .add(DOC, &candidate(0, 11), "person", &catalog())
            .expect("first span");
        // "Schmidt used" overlaps "Dr. Schmidt".
        let err = index
            .add(DOC, &candidate(4, 16), "person", &catalog())
            .unwrap_err();
        assert_eq!(err, AnnotateError::OverlapRejected { start: 4, end: 16 });
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_exact_duplicate_admitted_under_other_entity() {
        let mut index = SpanIndex::new();
        let first = index
            .add(DOC, &candidate(17, 24), "medical_score", &catalog())
            .expect("first label");
        let second = index
            .add(DOC, &candidate(17, 24), "procedure", &catalog())
            .expect("duplicate span, different label");
        assert_ne!(first.id, second.id);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_adjacent_spans_do_not_overlap() {
        let mut index = SpanIndex::new();
        index
            .add(DOC, &candidate(0, 11), "person", &catalog())
            .expect("first");
        // [12, 16) starts exactly where nothing conflicts: "used".
        index
            .add(DOC, &candidate(12, 16), "procedure", &catalog())
            .expect("adjacent");
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_remove_is_noop_for_missing_id() {
        let mut index = SpanIndex::new();
        assert!(!index.remove("42"));
        index
            .add(DOC, &candidate(0, 11), "person", &catalog())
            .expect("admitted");
        let id = index.all()[0].id.clone();
        assert!(index.remove(&id));
        assert!(index.is_empty());
    }

    #[test]
    fn test_remove_by_entity_cascades_only_that_entity() {
        let mut index = SpanIndex::new();
        index.add(DOC, &candidate(0, 11), "person", &catalog()).expect("p");
        index
            .add(DOC, &candidate(17, 24), "medical_score", &catalog())
            .expect("m1");
        index
            .add(DOC, &candidate(17, 24), "medical_score", &catalog())
            .expect("m2");
        index
            .add(DOC, &candidate(17, 24), "medical_score", &catalog())
            .expect("m3");
        assert_eq!(index.remove_by_entity("medical_score"), 3);
        assert_eq!(index.len(), 1);
        assert_eq!(index.all()[0].entity, "person");
    }

    #[test]
    fn test_all_sorted_by_start_with_stable_ties() {
        let mut index = SpanIndex::new();
        index
            .add(DOC, &candidate(17, 24), "medical_score", &catalog())
            .expect("later span first");
        index.add(DOC, &candidate(0, 11), "person", &catalog()).expect("p");
        index
            .add(DOC, &candidate(17, 24), "procedure", &catalog())
            .expect("duplicate");
        let ordered = index.all();
        assert_eq!(ordered[0].entity, "person");
        // Equal starts keep insertion order.
        assert_eq!(ordered[1].entity, "medical_score");
        assert_eq!(ordered[2].entity, "procedure");
    }

    #[test]
    fn test_overlap_rule_pairwise() {
        let mut index = SpanIndex::new();
        index.add(DOC, &candidate(0, 11), "person", &catalog()).expect("p");
        index
            .add(DOC, &candidate(17, 24), "medical_score", &catalog())
            .expect("m");
        index
            .add(DOC, &candidate(17, 24), "medical_score", &catalog())
            .expect("dup");
        let all = index.all();
        for a in &all {
            for b in &all {
                if a.id == b.id {
                    continue;
                }
                let disjoint = a.end <= b.start || b.end <= a.start;
                let duplicate = a.start == b.start && a.end == b.end && a.text == b.text;
                assert!(disjoint || duplicate);
            }
        }
    }
}
