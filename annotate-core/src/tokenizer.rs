//! # Whitespace Tokenizer
//!
//! Splits a document into whitespace-delimited tokens while preserving the
//! exact byte offsets of each token in the original text. The offsets are
//! what ties token-level output (BIO tags, CoNLL lines) back to the
//! character-level annotations made in the UI, so they must be exact.
//!
//! ## Offset recovery
//!
//! After splitting on runs of whitespace, each token's `start` is found by
//! searching forward from the end of the previous token, never from the
//! beginning of the document. This keeps offsets monotonically increasing
//! even when the same token text occurs many times.
//!
//! ## Known limitation
//!
//! Punctuation is not split off: `"TICI 2b."` tokenizes as `["TICI", "2b."]`
//! with the trailing period attached. Splitting punctuation here would
//! desynchronize BIO tags from annotations whose boundaries were made
//! against whitespace tokens, so the naive behavior is kept deliberately.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A token extracted from the document text.
///
/// `start` and `end` are byte offsets into the original string, so
/// `text[token.start..token.end] == token.text` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The token text (ex: "Thrombektomie", "2b.").
    pub text: String,
    /// Byte offset of the first byte (inclusive).
    pub start: usize,
    /// Byte offset one past the last byte (exclusive).
    pub end: usize,
    /// Sequential index of the token (0, 1, 2...).
    pub index: usize,
}

fn whitespace() -> &'static Regex {
    static WS: OnceLock<Regex> = OnceLock::new();
    WS.get_or_init(|| Regex::new(r"\s+").expect("static pattern"))
}

/// Tokenizes a document into whitespace-delimited tokens with byte offsets.
///
/// Pure and deterministic: the same input always yields the same token
/// sequence. An empty or whitespace-only document yields no tokens.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut cursor = 0;

    for piece in whitespace().split(text) {
        if piece.is_empty() {
            continue;
        }
        // Only whitespace sits between the previous token and this one,
        // so the first occurrence after the cursor is the right one.
        if let Some(found) = text[cursor..].find(piece) {
            let start = cursor + found;
            let end = start + piece.len();
            tokens.push(Token {
                text: piece.to_string(),
                start,
                end,
                index: tokens.len(),
            });
            cursor = end;
        }
    }

    tokens
}
