//! Near-duplicate detection for new cards.

use std::cmp::Ordering;

use serde::Serialize;

use crate::models::{Deck, RecordId};

use super::similarity::similarity;

/// Scores closer than this (in percentage points) are considered tied.
const SCORE_TIE_TOLERANCE: f64 = 0.1;

/// Default minimum score for a fuzzy match
pub const DEFAULT_THRESHOLD: f64 = 70.0;

/// Most matches ever reported for one check
pub const MAX_RESULTS: usize = 3;

/// An existing card the new text is compared against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub record_id: RecordId,
    pub content: String,
    pub tags: Vec<String>,
    /// Tie-break signal, e.g. how often the card was marked helpful
    pub popularity: u32,
    pub deck_id: Option<RecordId>,
    pub deck_name: Option<String>,
}

/// A candidate that matched, with its best score.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityCandidate {
    pub record_id: RecordId,
    pub content: String,
    /// Best 0-100 score against the content or any tag
    pub score: f64,
    /// The text appears verbatim (case-insensitively) in the content or a tag
    pub exact_match: bool,
    pub tags: Vec<String>,
    pub popularity: u32,
    pub deck_id: Option<RecordId>,
    pub deck_name: Option<String>,
}

/// Flatten every card of every deck into duplicate-check candidates.
pub fn candidates_from_decks(decks: &[Deck]) -> Vec<Candidate> {
    decks
        .iter()
        .flat_map(|deck| {
            deck.cards.iter().map(|card| Candidate {
                record_id: card.id.clone(),
                content: card.content.clone(),
                tags: card.tags.clone(),
                popularity: card.helpful_count,
                deck_id: Some(deck.id.clone()),
                deck_name: Some(deck.name.clone()),
            })
        })
        .collect()
}

/// Existing candidates that `text` would duplicate, best first.
///
/// Exact containment matches rank ahead of fuzzy ones. Within a class, higher
/// scores win unless two scores are within a tenth of a point, in which case
/// the more popular candidate wins. At most [`MAX_RESULTS`] are returned.
pub fn find_similar(text: &str, candidates: &[Candidate], threshold: f64) -> Vec<SimilarityCandidate> {
    find_similar_limited(text, candidates, threshold, MAX_RESULTS)
}

/// [`find_similar`] with an explicit result cap.
pub fn find_similar_limited(
    text: &str,
    candidates: &[Candidate],
    threshold: f64,
    max_results: usize,
) -> Vec<SimilarityCandidate> {
    let text = text.trim();
    if text.is_empty() || max_results == 0 {
        return Vec::new();
    }
    let needle = text.to_lowercase();

    let matches = candidates.iter().filter_map(|candidate| {
        let exact_match = candidate.content.to_lowercase().contains(&needle)
            || candidate
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(&needle));

        let content_score = similarity(text, &candidate.content);
        let best_tag_score = candidate
            .tags
            .iter()
            .map(|tag| similarity(text, tag))
            .fold(0.0_f64, f64::max);
        let score = content_score.max(best_tag_score);

        (exact_match || score >= threshold).then(|| SimilarityCandidate {
            record_id: candidate.record_id.clone(),
            content: candidate.content.clone(),
            score,
            exact_match,
            tags: candidate.tags.clone(),
            popularity: candidate.popularity,
            deck_id: candidate.deck_id.clone(),
            deck_name: candidate.deck_name.clone(),
        })
    });

    let mut top = Vec::with_capacity(max_results + 1);
    for matched in matches {
        insert_ranked(&mut top, matched, max_results);
    }
    top
}

/// Insert `matched` into the sorted buffer `top`, keeping at most `limit`.
///
/// Walks left from the end like an insertion sort. The score tolerance makes
/// the comparison non-transitive, which `slice::sort_by` is allowed to panic on.
fn insert_ranked(top: &mut Vec<SimilarityCandidate>, matched: SimilarityCandidate, limit: usize) {
    top.push(matched);
    let mut j = top.len() - 1;
    while j > 0 && precedence(&top[j], &top[j - 1]) == Ordering::Less {
        top.swap(j, j - 1);
        j -= 1;
    }
    top.truncate(limit);
}

/// `Less` means `a` ranks ahead of `b`.
fn precedence(a: &SimilarityCandidate, b: &SimilarityCandidate) -> Ordering {
    if a.exact_match != b.exact_match {
        return if a.exact_match { Ordering::Less } else { Ordering::Greater };
    }
    if (a.score - b.score).abs() > SCORE_TIE_TOLERANCE {
        return b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal);
    }
    b.popularity.cmp(&a.popularity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Card;
    use pretty_assertions::assert_eq;

    fn candidate(id: &str, content: &str, tags: &[&str], popularity: u32) -> Candidate {
        Candidate {
            record_id: RecordId::from(id),
            content: content.to_string(),
            tags: tags.iter().map(|tag| (*tag).to_string()).collect(),
            popularity,
            deck_id: None,
            deck_name: None,
        }
    }

    fn ids(matches: &[SimilarityCandidate]) -> Vec<&str> {
        matches.iter().map(|m| m.record_id.as_str()).collect()
    }

    #[test]
    fn large_corpus_keeps_only_the_best_few() {
        let corpus: Vec<Candidate> = (0..2_000)
            .map(|index| candidate(&format!("c{index}"), "hip drill", &[], index))
            .collect();

        let matches = find_similar("hip", &corpus, DEFAULT_THRESHOLD);

        assert_eq!(ids(&matches), vec!["c1999", "c1998", "c1997"]);
        assert!(matches.iter().all(|m| m.exact_match));
        assert!(find_similar_limited("hip", &corpus, DEFAULT_THRESHOLD, 0).is_empty());
    }

    #[test]
    fn exact_containment_ranks_above_fuzzy_match() {
        let corpus = vec![
            candidate("fuzzy", "Lead with right hip", &[], 50),
            candidate("exact", "Lead with right hip and shoulder, then drive", &[], 0),
            candidate("unrelated", "Keep your eyes on the ball", &[], 99),
        ];

        let matches = find_similar("Lead with right hip and shoulder", &corpus, DEFAULT_THRESHOLD);

        assert_eq!(ids(&matches), vec!["exact", "fuzzy"]);
        assert!(matches[0].exact_match);
        assert!(!matches[1].exact_match);
        assert!(matches[1].score >= DEFAULT_THRESHOLD);
    }

    #[test]
    fn tag_containment_counts_as_exact() {
        let corpus = vec![candidate("tagged", "Rotate early", &["Right Hip Drive"], 0)];
        let matches = find_similar("right hip", &corpus, 99.0);
        assert_eq!(ids(&matches), vec!["tagged"]);
        assert!(matches[0].exact_match);
    }

    #[test]
    fn tag_score_can_carry_a_fuzzy_match() {
        let corpus = vec![candidate("c1", "Completely different words", &["footwork basic"], 0)];
        let matches = find_similar("footwork basics", &corpus, DEFAULT_THRESHOLD);
        assert_eq!(ids(&matches), vec!["c1"]);
        assert!(!matches[0].exact_match);
    }

    #[test]
    fn below_threshold_is_dropped() {
        let corpus = vec![candidate("c1", "Something totally different here", &[], 0)];
        assert!(find_similar("Keep your eyes on the ball", &corpus, DEFAULT_THRESHOLD).is_empty());
    }

    #[test]
    fn never_returns_more_than_three() {
        let corpus: Vec<Candidate> = (0..10)
            .map(|i| candidate(&format!("c{i}"), "grip pressure light", &[], i))
            .collect();
        let matches = find_similar("grip pressure", &corpus, DEFAULT_THRESHOLD);
        assert_eq!(matches.len(), 3);
    }

    #[test]
    fn near_equal_scores_fall_back_to_popularity() {
        let corpus = vec![
            candidate("quiet", "grip pressure light", &[], 1),
            candidate("popular", "grip pressure light", &[], 40),
            candidate("middle", "grip pressure light", &[], 7),
        ];
        let matches = find_similar("grip pressure", &corpus, DEFAULT_THRESHOLD);
        assert_eq!(ids(&matches), vec!["popular", "middle", "quiet"]);
    }

    #[test]
    fn clearly_higher_score_beats_popularity() {
        let corpus = vec![
            candidate("popular", "hip rotation drills for power", &[], 100),
            candidate("closer", "hip rotation drills", &[], 0),
        ];
        let matches = find_similar("hip rotation drill", &corpus, 50.0);
        assert_eq!(ids(&matches), vec!["closer", "popular"]);
    }

    #[test]
    fn blank_text_matches_nothing() {
        let corpus = vec![candidate("c1", "anything", &[], 0)];
        assert!(find_similar("   ", &corpus, 0.0).is_empty());
    }

    #[test]
    fn candidates_carry_deck_context() {
        let deck = Deck::new("Swing").with_card(Card::new("Lead with right hip").with_helpful_count(4));
        let candidates = candidates_from_decks(&[deck.clone()]);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].deck_id.as_ref(), Some(&deck.id));
        assert_eq!(candidates[0].deck_name.as_deref(), Some("Swing"));
        assert_eq!(candidates[0].popularity, 4);
    }
}
