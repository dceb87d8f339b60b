//! # annotate-core — Text-Span Annotation & NER Export Engine
//!
//! This crate is the engine behind a browser-based annotation tool for
//! building NER training corpora from medical (stroke intervention)
//! documents. The UI, PDF extraction and persistence are external
//! collaborators; everything here is synchronous, in-memory computation
//! over one canonical document string.
//!
//! ## Architecture
//!
//! The data flows through the engine in a straight line:
//!
//! 1. **Document**: an immutable string supplied by a collaborator (PDF
//!    extraction, manual paste, sample fixture). All offsets refer to it.
//! 2. **Selection resolution** ([`selection`]): a raw UI selection
//!    (reported text + approximate offsets) is mapped back to exact
//!    offsets in the document, disambiguating repeated substrings.
//! 3. **Admission** ([`annotation`]): the candidate span is validated
//!    (offsets reproduce the text, entity exists, no partial overlap)
//!    and stored in the [`annotation::SpanIndex`].
//! 4. **Export** ([`export`]): the document is re-tokenized
//!    ([`tokenizer`]) and the stored spans are emitted as enriched JSON,
//!    spaCy training JSON, Hugging Face token-classification JSON or
//!    CoNLL-2003 BIO text.
//!
//! The [`session::Session`] ties these together as the explicit owner of
//! one document's annotation state — there is no global state anywhere.
//!
//! ## Example
//!
//! ```rust
//! use annotate_core::{export, RawSelection, Session};
//! use annotate_core::entity::EntityCatalog;
//!
//! let mut session = Session::with_entities(EntityCatalog::default_entities());
//! session.load_document("report_001", "Dr. Schmidt used TICI 2b.");
//!
//! let raw = RawSelection {
//!     text: "TICI 2b".to_string(),
//!     approx_start: 17,
//!     approx_end: 24,
//! };
//! session.select(&raw).expect("selection resolves");
//! session.apply_entity("medical_score").expect("span admitted");
//!
//! let conll = export::export_conll(
//!     session.text(),
//!     &session.annotations(),
//!     session.entities(),
//! );
//! assert!(conll.contains("TICI\tB-MEDICAL_SCORE"));
//! ```

pub mod annotation;
pub mod entity;
pub mod error;
pub mod export;
pub mod samples;
pub mod selection;
pub mod session;
pub mod tokenizer;

pub use annotation::{Annotation, SpanIndex};
pub use entity::{Entity, EntityCatalog};
pub use error::AnnotateError;
pub use export::ExportFormat;
pub use selection::{RawSelection, SpanCandidate};
pub use session::Session;
pub use tokenizer::{tokenize, Token};
