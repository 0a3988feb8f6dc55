//! Name similarity heuristics.
//!
//! Two deliberately distinct tests live here. Program grouping uses the
//! token-overlap ratio (`is_similar`); attendance signals join on the
//! looser distinct-word overlap (`signal_matches`). They are kept separate
//! because they disagree on real inputs, and the disagreement is part of
//! the observed behavior (see the `heuristics_disagree` test).

use std::collections::BTreeSet;

use crate::normalize::normalize_for_match;

/// Tokens meaningful for comparison: normalized words longer than 2 chars.
fn long_tokens(normalized: &str) -> Vec<&str> {
    normalized
        .split_whitespace()
        .filter(|t| t.chars().count() > 2)
        .collect()
}

/// Token-overlap similarity between two program titles.
///
/// Both inputs are normalized first; [`normalize_for_match`] is idempotent,
/// so pre-normalized input is fine. Counts tokens of `a` that contain or
/// are contained by some token of `b`, over the larger token count.
/// Substring tolerance absorbs partial renames and unlemmatized plurals.
pub fn is_similar(a: &str, b: &str, threshold: f64) -> bool {
    let na = normalize_for_match(a);
    let nb = normalize_for_match(b);
    let ta = long_tokens(&na);
    let tb = long_tokens(&nb);
    if ta.is_empty() || tb.is_empty() {
        return false;
    }
    if na == nb {
        return true;
    }
    let matched = ta
        .iter()
        .filter(|x| tb.iter().any(|y| x.contains(y) || y.contains(**x)))
        .count();
    let ratio = matched as f64 / ta.len().max(tb.len()) as f64;
    ratio >= threshold
}

/// Count distinct exact words (longer than 2 chars) shared by two names.
pub fn signal_name_overlap(a: &str, b: &str) -> usize {
    let na = normalize_for_match(a);
    let nb = normalize_for_match(b);
    let ta: BTreeSet<&str> = long_tokens(&na).into_iter().collect();
    let tb: BTreeSet<&str> = long_tokens(&nb).into_iter().collect();
    ta.intersection(&tb).count()
}

/// Looser join test used for identity-less attendance signals.
pub fn signal_matches(event_name: &str, group_name: &str, min_words: usize) -> bool {
    signal_name_overlap(event_name, group_name) >= min_words
}
