//! Query expansion for BM25 retrieval (spec §4.10): `prefix` (cap 50 by
//! corpus document-frequency descending) and `fuzzy≤1` (Damerau-Levenshtein
//! specialized to distance-1: one substitution, one transposition, or a
//! single insertion/deletion). Output is capped and alphabetized so the
//! same query against the same corpus always expands identically.

use std::collections::HashMap;

pub const DEFAULT_PREFIX_CAP: usize = 50;

/// `true` when `a` and `b` are within Damerau-Levenshtein distance 1 of
/// each other, checked directly rather than via a full DP table since the
/// bound is fixed at 1 (spec §4.10).
pub fn within_distance_one(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (la, lb) = (a.len(), b.len());
    if la.abs_diff(lb) > 1 {
        return false;
    }

    if la == lb {
        let diffs: Vec<usize> = (0..la).filter(|&i| a[i] != b[i]).collect();
        match diffs.len() {
            0 | 1 => true,
            2 => {
                let (i, j) = (diffs[0], diffs[1]);
                j == i + 1 && a[i] == b[j] && a[j] == b[i]
            }
            _ => false,
        }
    } else {
        let (short, long) = if la < lb { (&a, &b) } else { (&b, &a) };
        let (mut i, mut j, mut edits) = (0usize, 0usize, 0u8);
        while i < short.len() && j < long.len() {
            if short[i] == long[j] {
                i += 1;
                j += 1;
            } else {
                edits += 1;
                if edits > 1 {
                    return false;
                }
                j += 1;
            }
        }
        true
    }
}

/// Expand `term` against the corpus vocabulary (with per-term document
/// frequency), returning at most `cap` extra terms: prefix matches ranked
/// by `df` descending, then fuzzy (distance-1) matches, deduped, and the
/// final set alphabetized for determinism (spec §4.10).
pub fn expand(term: &str, vocab_df: &HashMap<String, u32>, fuzzy: bool, cap: usize) -> Vec<String> {
    if term.is_empty() {
        return Vec::new();
    }

    let mut prefix_matches: Vec<(&String, u32)> = vocab_df
        .iter()
        .filter(|(t, _)| t.as_str() != term && t.starts_with(term))
        .map(|(t, df)| (t, *df))
        .collect();
    prefix_matches.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    let mut expanded: Vec<String> = prefix_matches
        .into_iter()
        .take(cap)
        .map(|(t, _)| t.clone())
        .collect();

    if fuzzy {
        for candidate in vocab_df.keys() {
            if expanded.len() >= cap {
                break;
            }
            if candidate != term
                && !expanded.contains(candidate)
                && within_distance_one(term, candidate)
            {
                expanded.push(candidate.clone());
            }
        }
    }

    expanded.sort();
    expanded.dedup();
    expanded
}
