//! Similarity scoring and near-duplicate detection for Recall
//!
//! [`similarity`] compares two strings; [`find_similar`] applies it across a
//! corpus of existing cards before a new one is created.

mod duplicates;
mod similarity;

pub use duplicates::{
    candidates_from_decks, find_similar, find_similar_limited, Candidate, SimilarityCandidate,
    DEFAULT_THRESHOLD, MAX_RESULTS,
};
pub use similarity::{edit_distance, jaro, similarity};
