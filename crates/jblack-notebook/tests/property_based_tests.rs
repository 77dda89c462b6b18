//! Property-Based Tests
//!
//! Invariants of source splitting and notebook serialization, checked over
//! generated inputs:
//! - splitting then joining restores the text
//! - only the last fragment may lack a newline
//! - rewriting a cell changes nothing but that cell's source

use jblack_notebook::{join_fragments, parse_notebook_from_str, split_fragments};
use proptest::prelude::*;

// ============================================================================
// Source fragments
// ============================================================================

/// Property: join(split(text)) == text
#[test]
fn proptest_split_join_identity() {
    proptest!(|(text in "(\\PC|\n|\r){0,200}")| {
        prop_assert_eq!(join_fragments(&split_fragments(&text)), text);
    });
}

/// Property: every fragment is one line, and only the last may be unterminated
#[test]
fn proptest_fragments_are_lines() {
    proptest!(|(text in "[a-z =%!\n]{0,120}")| {
        let fragments = split_fragments(&text);
        prop_assert!(fragments.iter().all(|f| !f.is_empty()));
        if let Some((last, init)) = fragments.split_last() {
            for fragment in init {
                prop_assert!(fragment.ends_with('\n'));
                prop_assert_eq!(fragment.matches('\n').count(), 1);
            }
            prop_assert!(last.matches('\n').count() <= 1);
            prop_assert_eq!(last.ends_with('\n'), text.ends_with('\n'));
        } else {
            prop_assert!(text.is_empty());
        }
    });
}

// ============================================================================
// Notebook documents
// ============================================================================

fn notebook_with(first: &str, second: &str) -> String {
    let doc = serde_json::json!({
        "cells": [
            {"cell_type": "code", "execution_count": 1, "metadata": {}, "outputs": [], "source": split_fragments(first)},
            {"cell_type": "markdown", "metadata": {}, "source": split_fragments(second)}
        ],
        "metadata": {"language_info": {"name": "python"}},
        "nbformat": 4,
        "nbformat_minor": 5
    });
    serde_json::to_string_pretty(&doc).unwrap() + "\n"
}

/// Property: an untouched notebook serializes to exactly its input
#[test]
fn proptest_unmodified_notebook_is_identical() {
    proptest!(|(code in "[ -~\n]{0,80}", prose in "[ -~\n]{0,80}")| {
        let text = notebook_with(&code, &prose);
        let notebook = parse_notebook_from_str(&text).unwrap();
        prop_assert_eq!(notebook.to_json_string().unwrap(), text);
    });
}

/// Property: setting a code cell's source only changes that source
#[test]
fn proptest_set_source_touches_only_source() {
    proptest!(|(code in "[ -~\n]{0,80}", replacement in "[ -~\n]{0,80}", prose in "[ -~\n]{0,80}")| {
        let mut notebook = parse_notebook_from_str(&notebook_with(&code, &prose)).unwrap();
        for cell in notebook.code_cells_mut() {
            cell.set_source(&replacement);
        }
        prop_assert_eq!(
            notebook.to_json_string().unwrap(),
            notebook_with(&replacement, &prose)
        );
    });
}
