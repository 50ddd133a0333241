//! Punctuation-driven text segmentation.
//!
//! Every splitter keeps the punctuation run that closes a chunk attached to
//! that chunk, and never emits a chunk that is empty or whitespace-only.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static CLAUSE_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[。、！？!?]+").expect("valid clause pattern"));

static SENTENCE_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[。！？!?]+").expect("valid sentence pattern"));

/// Segmentation strategy used when an utterance starts
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Segmentation {
    /// Split on every clause or sentence mark
    #[default]
    Punctuation,
    /// Split on punctuation, then coalesce chunks shorter than `min_len`
    MinLength { min_len: usize },
    /// Split on sentence-final marks only
    Sentence,
}

impl Segmentation {
    pub fn split(&self, text: &str) -> Vec<String> {
        match self {
            Segmentation::Punctuation => split_by_punctuation(text),
            Segmentation::MinLength { min_len } => split_with_min_length(text, *min_len),
            Segmentation::Sentence => split_by_sentence(text),
        }
    }
}

fn split_on(text: &str, boundary: &Regex) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    for mark in boundary.find_iter(text) {
        let chunk = &text[start..mark.end()];
        start = mark.end();
        // A bare punctuation run still counts as content.
        if !chunk.trim().is_empty() {
            chunks.push(chunk.to_string());
        }
    }

    let rest = &text[start..];
    if !rest.trim().is_empty() {
        chunks.push(rest.to_string());
    }
    chunks
}

/// Split text after every run of `。 、 ！ ？ ! ?`.
///
/// ```
/// use vrmchat_speech::segment::split_by_punctuation;
///
/// assert_eq!(
///     split_by_punctuation("こんにちは。今日は良い天気ですね！"),
///     vec!["こんにちは。", "今日は良い天気ですね！"],
/// );
/// ```
pub fn split_by_punctuation(text: &str) -> Vec<String> {
    split_on(text, &CLAUSE_BOUNDARY)
}

/// Split text after sentence-final marks only; `、` never ends a chunk.
pub fn split_by_sentence(text: &str) -> Vec<String> {
    split_on(text, &SENTENCE_BOUNDARY)
}

/// Split on punctuation, then merge chunks forward until each holds at least
/// `min_len` characters. A short remainder is appended to the last chunk.
pub fn split_with_min_length(text: &str, min_len: usize) -> Vec<String> {
    let chunks = split_by_punctuation(text);
    if chunks.len() <= 1 {
        return chunks;
    }

    let mut merged: Vec<String> = Vec::with_capacity(chunks.len());
    let mut buffer = String::new();
    for chunk in chunks {
        buffer.push_str(&chunk);
        if buffer.chars().count() >= min_len {
            merged.push(std::mem::take(&mut buffer));
        }
    }

    if !buffer.is_empty() {
        match merged.last_mut() {
            Some(last) => last.push_str(&buffer),
            None => merged.push(buffer),
        }
    }
    merged
}
