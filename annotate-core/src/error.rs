//! # Engine Errors
//!
//! Every recoverable failure the engine reports to its caller. All of
//! these map to a user-visible situation in the annotation workflow
//! (nothing selected, span conflicts with an existing one, ...), so the
//! messages are written to be shown as-is.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnnotateError {
    /// An entity was applied with no pending selection.
    #[error("no text selected")]
    EmptySelection,

    /// The reported selection text occurs nowhere in the document.
    #[error("selected text not found in document: {text:?}")]
    UnresolvableSelection { text: String },

    /// The candidate span partially overlaps an existing annotation.
    #[error("span [{start}, {end}) overlaps an existing annotation")]
    OverlapRejected { start: usize, end: usize },

    /// The referenced entity id is not in the catalog.
    #[error("unknown entity: {entity}")]
    InvalidEntityReference { entity: String },

    /// The offsets do not slice the annotated text out of the document.
    #[error("offsets [{start}, {end}) do not match the annotated text")]
    MalformedOffsets { start: usize, end: usize },

    /// An entity with this id already exists in the catalog.
    #[error("entity already exists: {id}")]
    DuplicateEntity { id: String },
}
