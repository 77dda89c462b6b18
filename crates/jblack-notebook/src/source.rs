//! Conversion between a cell's source fragment list and contiguous text
//!
//! Notebooks store cell source as a list of line fragments. Every fragment
//! carries its own line terminator except, possibly, the last one, so joining
//! is plain concatenation. Splitting goes through a per-call marker token so
//! that only literal `\n` characters ever delimit fragments.

use uuid::Uuid;

/// Concatenate source fragments into the text they represent.
#[inline]
#[must_use]
pub fn join_fragments<S: AsRef<str>>(fragments: &[S]) -> String {
    fragments.iter().map(AsRef::as_ref).collect()
}

/// Split text into notebook source fragments.
///
/// Each fragment is one line including its trailing `\n`. The last fragment
/// lacks a newline only when `text` itself does not end with one. Empty text
/// yields an empty list, never `[""]`.
///
/// `join_fragments(&split_fragments(text)) == text` holds for every input.
#[must_use]
pub fn split_fragments(text: &str) -> Vec<String> {
    let marker = newline_marker(text);

    let mut marked = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch == '\n' {
            marked.push_str(&marker);
        } else {
            marked.push(ch);
        }
    }

    let mut pieces: Vec<&str> = marked.split(marker.as_str()).collect();
    // `split` always yields at least one piece; the last one is whatever
    // follows the final newline, and is empty when the text ends with one.
    let tail = pieces.pop().unwrap_or_default();

    let mut fragments: Vec<String> = pieces.into_iter().map(|line| format!("{line}\n")).collect();
    if !tail.is_empty() {
        fragments.push(tail.to_string());
    }
    fragments
}

/// Generate a marker token that does not occur anywhere in `text`.
fn newline_marker(text: &str) -> String {
    loop {
        let marker = Uuid::new_v4().to_string();
        if !text.contains(&marker) {
            return marker;
        }
    }
}
