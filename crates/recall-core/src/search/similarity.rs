//! String similarity scoring.
//!
//! Three normalized sub-scores are blended into one 0-100 closeness value:
//! edit distance, a prefix-weighted Jaro score, and a token-set Jaccard index.
//! Short, tag-like strings lean on the prefix score; longer free text leans on
//! edit distance.

use std::collections::HashSet;

/// Strings shorter than this (in characters) are treated as tag-like.
const SHORT_TEXT_LEN: usize = 20;
const PREFIX_WEIGHT_SHORT: f64 = 0.4;
const PREFIX_WEIGHT_LONG: f64 = 0.2;
const TOKEN_WEIGHT: f64 = 0.3;
const MAX_PREFIX: usize = 4;
const PREFIX_SCALE: f64 = 0.1;

/// Closeness of two strings on a 0-100 scale.
///
/// Reflexive (`similarity(a, a) == 100`), symmetric, and defined for empty
/// input. The tag-like weighting is chosen by the shorter of the two strings
/// so that argument order never changes the result.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    let edit = edit_distance_score(&a_chars, &b_chars);
    let prefix = prefix_weighted_score(&a_chars, &b_chars);
    let tokens = token_set_score(a, b);

    let prefix_weight = if a_chars.len().min(b_chars.len()) < SHORT_TEXT_LEN {
        PREFIX_WEIGHT_SHORT
    } else {
        PREFIX_WEIGHT_LONG
    };
    let edit_weight = 1.0 - prefix_weight - TOKEN_WEIGHT;

    let score = (edit_weight * edit + prefix_weight * prefix + TOKEN_WEIGHT * tokens) * 100.0;
    score.clamp(0.0, 100.0)
}

/// Minimum single-character insert/delete/substitute count.
pub fn edit_distance(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution
                .min(previous[j + 1] + 1)
                .min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

#[allow(clippy::cast_precision_loss)]
fn edit_distance_score(a: &[char], b: &[char]) -> f64 {
    let longest = a.len().max(b.len()).max(1);
    1.0 - edit_distance(a, b) as f64 / longest as f64
}

/// Jaro similarity in 0..=1.
#[allow(clippy::cast_precision_loss)]
pub fn jaro(a: &[char], b: &[char]) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let window = (a.len().max(b.len()) / 2).saturating_sub(1);
    let mut a_matched = vec![false; a.len()];
    let mut b_matched = vec![false; b.len()];
    let mut matches = 0usize;

    for (i, ca) in a.iter().enumerate() {
        let start = i.saturating_sub(window);
        let end = (i + window + 1).min(b.len());
        for j in start..end {
            if !b_matched[j] && b[j] == *ca {
                a_matched[i] = true;
                b_matched[j] = true;
                matches += 1;
                break;
            }
        }
    }

    if matches == 0 {
        return 0.0;
    }

    let a_sequence = a.iter().zip(&a_matched).filter(|(_, m)| **m).map(|(c, _)| c);
    let b_sequence = b.iter().zip(&b_matched).filter(|(_, m)| **m).map(|(c, _)| c);
    let half_transpositions = a_sequence.zip(b_sequence).filter(|(x, y)| x != y).count();

    let m = matches as f64;
    let t = half_transpositions as f64 / 2.0;
    (m / a.len() as f64 + m / b.len() as f64 + (m - t) / m) / 3.0
}

/// Jaro score boosted by a shared prefix of up to four characters.
#[allow(clippy::cast_precision_loss)]
fn prefix_weighted_score(a: &[char], b: &[char]) -> f64 {
    let base = jaro(a, b);
    let prefix = a
        .iter()
        .zip(b)
        .take(MAX_PREFIX)
        .take_while(|(x, y)| x == y)
        .count();
    base + prefix as f64 * PREFIX_SCALE * (1.0 - base)
}

/// Jaccard index over case-folded whitespace tokens.
#[allow(clippy::cast_precision_loss)]
fn token_set_score(a: &str, b: &str) -> f64 {
    let a_tokens = tokenize(a);
    let b_tokens = tokenize(b);

    match (a_tokens.is_empty(), b_tokens.is_empty()) {
        (true, true) => 1.0,
        (true, false) | (false, true) => 0.0,
        (false, false) => {
            let shared = a_tokens.intersection(&b_tokens).count();
            let union = a_tokens.union(&b_tokens).count();
            shared as f64 / union as f64
        }
    }
}

fn tokenize(text: &str) -> HashSet<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}
