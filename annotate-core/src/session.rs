//! # Annotation Session
//!
//! The [`Session`] is the explicit owner of everything one document's
//! annotation workflow needs: the canonical document text, the entity
//! catalog, the span index, and the pending (resolved but not yet
//! labeled) selection. Callers hold the session and drive it with
//! discrete user actions; no implicit global state exists anywhere in
//! the engine.
//!
//! ## Lifecycle
//!
//! Load a document, select spans and label them, export. Replacing the
//! document is the one "cancel everything" operation: annotations and
//! the pending selection are cleared in the same call, so nothing can
//! ever reference a previous document's offsets.
//!
//! ```rust
//! use annotate_core::{RawSelection, Session};
//!
//! let mut session = Session::new();
//! session.load_document("report_001", "Dr. Schmidt used TICI 2b.");
//!
//! let raw = RawSelection {
//!     text: "Dr. Schmidt".to_string(),
//!     approx_start: 0,
//!     approx_end: 11,
//! };
//! session.select(&raw).expect("resolvable");
//!
//! session.add_entity("Person", "#FF6B6B", "names").expect("new entity");
//! let ann = session.apply_entity("person").expect("admitted");
//! assert_eq!(ann.text, "Dr. Schmidt");
//! ```

use crate::annotation::{Annotation, SpanIndex};
use crate::entity::{slug, Entity, EntityCatalog};
use crate::error::AnnotateError;
use crate::selection::{resolve, RawSelection, SpanCandidate};

/// Holds the full annotation state for one document.
#[derive(Debug, Clone, Default)]
pub struct Session {
    document_name: Option<String>,
    text: String,
    entities: EntityCatalog,
    spans: SpanIndex,
    pending: Option<SpanCandidate>,
}

impl Session {
    /// A session preloaded with the stroke intervention label set.
    pub fn new() -> Self {
        Self::with_entities(EntityCatalog::stroke_entities())
    }

    pub fn with_entities(entities: EntityCatalog) -> Self {
        Self {
            entities,
            ..Self::default()
        }
    }

    /// Replaces the document wholesale. Clears all annotations and the
    /// pending selection atomically; the entity catalog survives.
    pub fn load_document(&mut self, name: &str, text: &str) {
        self.document_name = Some(name.to_string());
        self.text = text.to_string();
        self.spans.clear();
        self.pending = None;
    }

    pub fn document_name(&self) -> Option<&str> {
        self.document_name.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Resolves a raw selection and stores it as the pending candidate.
    ///
    /// `Ok(None)` means the selection was empty or whitespace-only; this
    /// is not an error, it simply yields no candidate (and clears any
    /// previous one). A non-empty selection whose text occurs nowhere in
    /// the document fails with [`AnnotateError::UnresolvableSelection`],
    /// so the caller can prompt the user to select again.
    pub fn select(
        &mut self,
        raw: &RawSelection,
    ) -> Result<Option<&SpanCandidate>, AnnotateError> {
        if raw.text.trim().is_empty() {
            self.pending = None;
            return Ok(None);
        }
        match resolve(&self.text, raw) {
            Some(candidate) => {
                self.pending = Some(candidate);
                Ok(self.pending.as_ref())
            }
            None => {
                self.pending = None;
                Err(AnnotateError::UnresolvableSelection {
                    text: raw.text.clone(),
                })
            }
        }
    }

    pub fn pending(&self) -> Option<&SpanCandidate> {
        self.pending.as_ref()
    }

    pub fn clear_selection(&mut self) {
        self.pending = None;
    }

    /// Labels the pending candidate with an entity and stores it.
    ///
    /// The pending selection is consumed on success and on overlap
    /// rejection (the user has to select afresh either way, matching the
    /// interactive flow). Other failures leave it in place.
    pub fn apply_entity(&mut self, entity_id: &str) -> Result<Annotation, AnnotateError> {
        let candidate = self.pending.clone().ok_or(AnnotateError::EmptySelection)?;
        match self.spans.add(&self.text, &candidate, entity_id, &self.entities) {
            Ok(annotation) => {
                self.pending = None;
                Ok(annotation)
            }
            Err(err) => {
                if matches!(err, AnnotateError::OverlapRejected { .. }) {
                    self.pending = None;
                }
                Err(err)
            }
        }
    }

    /// Removes an annotation by id; missing ids are a no-op.
    pub fn remove_annotation(&mut self, id: &str) -> bool {
        self.spans.remove(id)
    }

    pub fn clear_annotations(&mut self) {
        self.spans.clear();
        self.pending = None;
    }

    /// All annotations ordered by start offset.
    pub fn annotations(&self) -> Vec<Annotation> {
        self.spans.all()
    }

    pub fn annotations_by_entity(&self, entity_id: &str) -> Vec<Annotation> {
        self.spans.by_entity(entity_id)
    }

    pub fn entities(&self) -> &EntityCatalog {
        &self.entities
    }

    /// Defines a new entity. The id is derived from the label
    /// ("Guide Catheter" -> "guide_catheter") and the stored display
    /// label is uppercased.
    pub fn add_entity(
        &mut self,
        label: &str,
        color: &str,
        description: &str,
    ) -> Result<Entity, AnnotateError> {
        let entity = Entity {
            id: slug(label),
            label: label.trim().to_uppercase(),
            color: color.to_string(),
            description: description.to_string(),
        };
        self.entities.add(entity.clone())?;
        Ok(entity)
    }

    /// Removes an entity definition and cascades into the span index:
    /// every annotation referencing it is removed too. Returns the number
    /// of annotations removed.
    pub fn remove_entity(&mut self, entity_id: &str) -> usize {
        self.entities.remove(entity_id);
        self.spans.remove_by_entity(entity_id)
    }

    /// Replaces the entity catalog and drops all annotations, since their
    /// entity references may no longer exist.
    pub fn reset_entities(&mut self, entities: EntityCatalog) {
        self.entities = entities;
        self.spans.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "Dr. Schmidt used TICI 2b.";

    fn session() -> Session {
        let mut s = Session::with_entities(EntityCatalog::default_entities());
        s.load_document("report_001", DOC);
        s
    }

    fn select(s: &mut Session, text: &str, start: usize) {
        let raw = RawSelection {
            text: text.to_string(),
            approx_start: start,
            approx_end: start + text.len(),
        };
        s.select(&raw).expect("resolvable").expect("candidate");
    }

    #[test]
    fn test_select_then_apply() {
        let mut s = session();
        select(&mut s, "Dr. Schmidt", 0);
        let ann = s.apply_entity("person").expect("admitted");
        assert_eq!((ann.start, ann.end), (0, 11));
        assert!(s.pending().is_none());
        assert_eq!(s.annotations().len(), 1);
    }

    #[test]
    fn test_apply_without_selection_is_empty_selection() {
        let mut s = session();
        assert_eq!(s.apply_entity("person"), Err(AnnotateError::EmptySelection));
    }

    #[test]
    fn test_blank_selection_clears_pending_without_error() {
        let mut s = session();
        select(&mut s, "used", 12);
        let raw = RawSelection {
            text: "   ".to_string(),
            approx_start: 0,
            approx_end: 3,
        };
        assert_eq!(s.select(&raw), Ok(None));
        assert!(s.pending().is_none());
    }

    #[test]
    fn test_unresolvable_selection_is_an_error() {
        let mut s = session();
        let raw = RawSelection {
            text: "absent".to_string(),
            approx_start: 0,
            approx_end: 6,
        };
        assert!(matches!(
            s.select(&raw),
            Err(AnnotateError::UnresolvableSelection { .. })
        ));
    }

    #[test]
    fn test_overlap_rejection_consumes_pending() {
        let mut s = session();
        select(&mut s, "Dr. Schmidt", 0);
        s.apply_entity("person").expect("first");
        select(&mut s, "Schmidt used", 4);
        assert!(matches!(
            s.apply_entity("person"),
            Err(AnnotateError::OverlapRejected { .. })
        ));
        assert!(s.pending().is_none());
        assert_eq!(s.annotations().len(), 1);
    }

    #[test]
    fn test_invalid_entity_keeps_pending() {
        let mut s = session();
        select(&mut s, "used", 12);
        assert!(matches!(
            s.apply_entity("ghost"),
            Err(AnnotateError::InvalidEntityReference { .. })
        ));
        assert!(s.pending().is_some());
        s.apply_entity("procedure").expect("still applicable");
    }

    #[test]
    fn test_load_document_clears_everything_atomically() {
        let mut s = session();
        select(&mut s, "Dr. Schmidt", 0);
        s.apply_entity("person").expect("admitted");
        select(&mut s, "used", 12);

        s.load_document("report_002", "Completely new text.");
        assert!(s.annotations().is_empty());
        assert!(s.pending().is_none());
        assert_eq!(s.document_name(), Some("report_002"));
    }

    #[test]
    fn test_remove_entity_cascades() {
        let mut s = session();
        select(&mut s, "Dr.", 0);
        s.apply_entity("person").expect("a1");
        select(&mut s, "Schmidt", 4);
        s.apply_entity("person").expect("a2");
        select(&mut s, "used", 12);
        s.apply_entity("person").expect("a3");
        select(&mut s, "TICI 2b", 17);
        s.apply_entity("medical_score").expect("a4");

        assert_eq!(s.remove_entity("person"), 3);
        assert!(!s.entities().contains("person"));
        let remaining = s.annotations();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].entity, "medical_score");
    }

    #[test]
    fn test_add_entity_slugs_and_uppercases() {
        let mut s = session();
        let entity = s
            .add_entity("Stent Retriever", "#FF9FF3", "retrievers")
            .expect("new entity");
        assert_eq!(entity.id, "stent_retriever");
        assert_eq!(entity.label, "STENT RETRIEVER");
        assert!(matches!(
            s.add_entity("Stent  Retriever", "#000000", "dup"),
            Err(AnnotateError::DuplicateEntity { .. })
        ));
    }

    #[test]
    fn test_reset_entities_drops_annotations() {
        let mut s = session();
        select(&mut s, "Dr. Schmidt", 0);
        s.apply_entity("person").expect("admitted");
        s.reset_entities(EntityCatalog::stroke_entities());
        assert!(s.annotations().is_empty());
        assert!(s.entities().contains("tici_score"));
    }
}
