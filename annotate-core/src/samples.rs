//! # Sample Document
//!
//! A German thrombectomy report excerpt used for demos and tests, plus a
//! ready-made session with its canonical annotations applied.
//!
//! The sample annotations are resolved against the text at construction
//! time (surface string by surface string, in document order), never
//! hard-coded as offsets. That way the offset invariant holds by
//! construction, umlauts and all.

use crate::entity::EntityCatalog;
use crate::selection::RawSelection;
use crate::session::Session;

/// Document id used for the sample session.
pub const SAMPLE_DOCUMENT_NAME: &str = "sample_document";

/// Excerpt of a (synthetic) German stroke intervention report.
pub const SAMPLE_TEXT: &str = "Der Patient Dr. Schmidt wurde am 15. März 2024 mit akuten Schlaganfall-Symptomen in die Klinik München eingeliefert. Die Computertomographie-Angiographie zeigte eine Okklusion der Arteria cerebri media mit einem TICI-Score von 0.

Nach der mechanischen Thrombektomie durch Dr. Weber konnte eine vollständige Reperfusion erreicht werden, was einem TICI-Score von 3 entspricht. Die Behandlung erfolgte unter der Leitung von Prof. Müller in der neurointensiven Abteilung.

Der Patient Hans Meier zeigte nach dem Eingriff deutliche Verbesserungen. Die Kontroll-Bildgebung bestätigte den Behandlungserfolg mit TICI 2b. Die Nachsorge wird in der Neurologischen Klinik Hamburg fortgesetzt.";

/// Surface strings to annotate, in document order, with their entity ids.
/// Repeated surfaces ("TICI-Score") appear once per occurrence; resolution
/// advances through the text so each entry binds to the next occurrence.
const SAMPLE_SPANS: &[(&str, &str)] = &[
    ("Dr. Schmidt", "person"),
    ("TICI-Score", "medical_score"),
    ("0", "medical_score"),
    ("mechanischen Thrombektomie", "procedure"),
    ("Dr. Weber", "person"),
    ("TICI-Score", "medical_score"),
    ("3", "medical_score"),
    ("Prof. Müller", "person"),
    ("neurointensiven Abteilung", "diagnosis"),
    ("Hans Meier", "person"),
    ("TICI 2b", "medical_score"),
];

/// Builds a session preloaded with the sample document, the minimal
/// entity set and the canonical sample annotations.
pub fn sample_session() -> Session {
    let mut session = Session::with_entities(EntityCatalog::default_entities());
    session.load_document(SAMPLE_DOCUMENT_NAME, SAMPLE_TEXT);

    let mut cursor = 0;
    for (surface, entity) in SAMPLE_SPANS {
        if let Some(found) = SAMPLE_TEXT[cursor..].find(surface) {
            let start = cursor + found;
            let raw = RawSelection {
                text: (*surface).to_string(),
                approx_start: start,
                approx_end: start + surface.len(),
            };
            if session.select(&raw).is_ok() {
                // Sample spans are disjoint and use known entity ids, so
                // this cannot fail; a failure would only drop the span.
                let _ = session.apply_entity(entity);
            }
            cursor = start + 1;
        }
    }

    session
}
