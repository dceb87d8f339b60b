//! # Selection Resolver
//!
//! Recovers authoritative character offsets for a freeform text selection.
//!
//! The rendering surface reports what text the user selected plus
//! best-effort offsets computed by walking its rendered nodes. Those
//! offsets are only an approximation: highlight wrappers and injected
//! line breaks mean the walk does not correspond 1:1 to document
//! characters. The resolver therefore trusts exact character content over
//! structural position:
//!
//! 1. If the approximate offsets slice out exactly the reported text,
//!    accept them (fast path, covers most selections).
//! 2. Otherwise enumerate every literal occurrence of the reported text
//!    in the document and pick the one whose start is numerically closest
//!    to the approximate start. Positional proximity is used only to
//!    disambiguate identical substrings, never to override content.

use serde::{Deserialize, Serialize};

/// A selection event as reported by the rendering surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSelection {
    /// The selected substring as reported.
    pub text: String,
    /// Approximate byte offset of the selection start.
    pub approx_start: usize,
    /// Approximate byte offset of the selection end.
    pub approx_end: usize,
}

/// A resolved span, verified against the canonical document text.
///
/// Not yet an annotation: it still needs an entity assignment before it
/// can be admitted into the span index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanCandidate {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

/// Resolves a raw selection against the canonical document text.
///
/// Returns `None` when the selection is empty/whitespace-only or when the
/// reported text does not occur in the document at all.
pub fn resolve(document: &str, raw: &RawSelection) -> Option<SpanCandidate> {
    if raw.text.trim().is_empty() {
        return None;
    }

    // Fast path: the walk-derived offsets already slice out the reported
    // text. `get` guards against out-of-range or non-boundary offsets.
    if let Some(slice) = document.get(raw.approx_start..raw.approx_end) {
        if slice == raw.text {
            return Some(SpanCandidate {
                start: raw.approx_start,
                end: raw.approx_end,
                text: raw.text.clone(),
            });
        }
    }

    // Fallback: the walk mis-measured. Enumerate every occurrence of the
    // reported text and take the one nearest the approximate start.
    let occurrences = find_occurrences(document, &raw.text);
    let best = occurrences.into_iter().min_by_key(|&start| {
        start.abs_diff(raw.approx_start)
    })?;

    Some(SpanCandidate {
        start: best,
        end: best + raw.text.len(),
        text: raw.text.clone(),
    })
}

/// All occurrence start offsets of `needle` in `haystack`, including
/// overlapping ones (search resumes one character after each hit).
fn find_occurrences(haystack: &str, needle: &str) -> Vec<usize> {
    let step = needle.chars().next().map(char::len_utf8).unwrap_or(1);
    let mut occurrences = Vec::new();
    let mut search_from = 0;
    while let Some(found) = haystack.get(search_from..).and_then(|s| s.find(needle)) {
        let start = search_from + found;
        occurrences.push(start);
        search_from = start + step;
    }
    occurrences
}
