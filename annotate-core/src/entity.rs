//! # Entity Label Definitions
//!
//! An [`Entity`] is a user-defined label category (PERSON, TICI_SCORE, ...)
//! with the display metadata the UI needs to render highlights. The
//! [`EntityCatalog`] is the mutable, per-session set of those definitions.
//!
//! Two built-in sets ship with the engine:
//! - [`EntityCatalog::default_entities`]: a minimal four-label set used by
//!   the sample document.
//! - [`EntityCatalog::stroke_entities`]: the full thrombectomy label set
//!   for annotating stroke intervention reports.

use serde::{Deserialize, Serialize};

use crate::error::AnnotateError;

/// A label category definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Stable slug-like identifier (ex: "tici_score"). Annotations
    /// reference entities by this id.
    pub id: String,
    /// Display name, conventionally UPPER_SNAKE_CASE (ex: "TICI_SCORE").
    /// This is what ends up in BIO tags and exported labels.
    pub label: String,
    /// Hex color for the UI highlight.
    pub color: String,
    /// Human-readable description shown in the label picker.
    pub description: String,
}

impl Entity {
    pub fn new(id: &str, label: &str, color: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            color: color.to_string(),
            description: description.to_string(),
        }
    }
}

/// Derives a stable entity id from a display label: lowercased, with
/// whitespace runs collapsed to underscores (ex: "Tici Score" -> "tici_score").
pub fn slug(label: &str) -> String {
    label
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// The ordered, mutable set of entity definitions for one session.
///
/// Insertion order is preserved for display purposes. Ids are unique;
/// adding a duplicate id is rejected rather than silently replacing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityCatalog {
    entities: Vec<Entity>,
}

impl EntityCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from an existing list, keeping the first
    /// definition when ids repeat.
    pub fn from_entities(entities: Vec<Entity>) -> Self {
        let mut catalog = Self::new();
        for entity in entities {
            let _ = catalog.add(entity);
        }
        catalog
    }

    /// The minimal label set used for the sample document.
    pub fn default_entities() -> Self {
        Self::from_entities(vec![
            Entity::new(
                "person",
                "PERSON",
                "#FF6B6B",
                "Patient and physician names (e.g. Dr. Schmidt, Hans Meier)",
            ),
            Entity::new(
                "medical_score",
                "MEDICAL_SCORE",
                "#4ECDC4",
                "Medical scoring systems (e.g. TICI 2b, NIHSS 10)",
            ),
            Entity::new(
                "procedure",
                "PROCEDURE",
                "#FF9FF3",
                "Procedures or treatments (e.g. Thrombektomie)",
            ),
            Entity::new(
                "diagnosis",
                "DIAGNOSIS",
                "#FDCB6E",
                "Diagnoses or conditions (e.g. Schlaganfall, Okklusion)",
            ),
        ])
    }

    /// The full thrombectomy label set for stroke intervention reports.
    pub fn stroke_entities() -> Self {
        Self::from_entities(vec![
            Entity::new("anaesthesia", "ANAESTHESIA", "#A29BFE",
                "Type of anesthesia or sedation (Intubationsnarkose, Propofol, Midazolam)"),
            Entity::new("aspiration_catheter", "ASPIRATION_CATHETER", "#48DBFB",
                "Aspiration catheters and usage (RED 68, RED 72, Absaugung)"),
            Entity::new("complications", "COMPLICATIONS", "#FF6B6B",
                "Complications during intervention (Dissektion, Blutung, iatrogene Probleme)"),
            Entity::new("intervention_timing", "INTERVENTION_TIMING", "#54A0FF",
                "Timings of intervention steps (Puncture-to-reperfusion times)"),
            Entity::new("extracranial_pta", "EXTRACRANIAL_PTA", "#FECA57",
                "Extracranial percutaneous transluminal angioplasty"),
            Entity::new("intracranial_pta", "INTRACRANIAL_PTA", "#FDCB6E",
                "Intracranial percutaneous transluminal angioplasty"),
            Entity::new("guide_catheter", "GUIDE_CATHETER", "#4ECDC4",
                "Guide catheters (Cerebase, Emboguard, Ballon-Guider)"),
            Entity::new("microcatheter", "MICROCATHETER", "#45B7D1",
                "Microcatheters (Trevo Trak 21, Microcatheter)"),
            Entity::new("recanalization_attempts", "RECANALIZATION_ATTEMPTS", "#5F27CD",
                "Number of attempts/manoeuvres"),
            Entity::new("antiplatelet_therapy", "ANTIPLATELET_THERAPY", "#00D2D3",
                "Antiplatelet treatments (Aspirin, Integrilin, IV aspirin)"),
            Entity::new("thrombolysis", "THROMBOLYSIS", "#96CEB4",
                "Thrombolysis administration (IA-thrombolyse, rtPA, Tenekteplase)"),
            Entity::new("spasmolytic_medication", "SPASMOLYTIC_MEDICATION", "#FD79A8",
                "Spasmolytic medication usage"),
            Entity::new("occlusion_site", "OCCLUSION_SITE", "#B53471",
                "Site of vessel occlusion (ICA, M1, Tandemverschluss)"),
            Entity::new("cervical_stenoses", "CERVICAL_STENOSES", "#FDCB6E",
                "Cervical stenoses findings"),
            Entity::new("stent_retriever", "STENT_RETRIEVER", "#FF9FF3",
                "Stent retrievers (Solitaire, 6x40mm, 4x20mm)"),
            Entity::new("tici_score", "TICI_SCORE", "#96CEB4",
                "TICI reperfusion score (TICI 2c, TICI 3, 100%)"),
            Entity::new("technique_first_maneuver", "TECHNIQUE_FIRST_MANEUVER", "#576574",
                "Technique used in the first maneuver (Stent-retriever, Pinning)"),
            Entity::new("vessel_visualization", "VESSEL_VISUALIZATION", "#00D2D3",
                "Vessel visualization during procedure"),
        ])
    }

    /// Adds a definition; rejects duplicate ids.
    pub fn add(&mut self, entity: Entity) -> Result<(), AnnotateError> {
        if self.contains(&entity.id) {
            return Err(AnnotateError::DuplicateEntity { id: entity.id });
        }
        self.entities.push(entity);
        Ok(())
    }

    /// Removes a definition by id. Returns whether anything was removed.
    /// Cascading removal of annotations is the session's job.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entities.len();
        self.entities.retain(|e| e.id != id);
        self.entities.len() != before
    }

    pub fn get(&self, id: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Display label for an entity id, falling back to the raw id when
    /// the definition no longer exists.
    pub fn display_label(&self, id: &str) -> String {
        self.get(id)
            .map(|e| e.label.clone())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug() {
        assert_eq!(slug("Tici Score"), "tici_score");
        assert_eq!(slug("  Guide   Catheter "), "guide_catheter");
        assert_eq!(slug("PERSON"), "person");
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut catalog = EntityCatalog::new();
        catalog
            .add(Entity::new("person", "PERSON", "#FF6B6B", "names"))
            .expect("first add");
        let err = catalog
            .add(Entity::new("person", "PERSON_2", "#000000", "dup"))
            .unwrap_err();
        assert_eq!(
            err,
            AnnotateError::DuplicateEntity {
                id: "person".to_string()
            }
        );
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_remove_and_lookup() {
        let mut catalog = EntityCatalog::default_entities();
        assert!(catalog.contains("person"));
        assert!(catalog.remove("person"));
        assert!(!catalog.contains("person"));
        assert!(!catalog.remove("person"));
    }

    #[test]
    fn test_display_label_falls_back_to_id() {
        let catalog = EntityCatalog::default_entities();
        assert_eq!(catalog.display_label("person"), "PERSON");
        assert_eq!(catalog.display_label("ghost_entity"), "ghost_entity");
    }

    #[test]
    fn test_builtin_sets_have_unique_ids() {
        for catalog in [
            EntityCatalog::default_entities(),
            EntityCatalog::stroke_entities(),
        ] {
            let mut ids: Vec<&str> = catalog.iter().map(|e| e.id.as_str()).collect();
            let total = ids.len();
            ids.sort();
            ids.dedup();
            assert_eq!(ids.len(), total);
        }
    }
}
