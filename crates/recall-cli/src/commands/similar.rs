use recall_core::db::LocalStore;
use recall_core::search::{candidates_from_decks, find_similar_limited, SimilarityCandidate};
use recall_core::Deck;

use crate::commands::common::{format_match_line, normalize_content, Engine};
use crate::error::CliError;

pub async fn find_matches(
    engine: &Engine,
    text: &str,
    threshold: Option<f64>,
) -> Result<Vec<SimilarityCandidate>, CliError> {
    let Some(threshold) = threshold else {
        return Ok(engine.find_similar_cards(text).await?);
    };
    if !(0.0..=100.0).contains(&threshold) {
        return Err(CliError::Config(format!(
            "threshold must be between 0 and 100, got {threshold}"
        )));
    }

    let decks = engine.local().all::<Deck>().await?;
    Ok(find_similar_limited(
        text,
        &candidates_from_decks(&decks),
        threshold,
        engine.config().duplicates.max_results,
    ))
}

pub async fn run_similar(
    engine: &Engine,
    text_parts: &[String],
    threshold: Option<f64>,
    as_json: bool,
) -> Result<(), CliError> {
    let text = normalize_content(&text_parts.join(" ")).ok_or(CliError::EmptySearchText)?;
    let matches = find_matches(engine, &text, threshold).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&matches)?);
    } else if matches.is_empty() {
        println!("No similar cards.");
    } else {
        for candidate in &matches {
            println!("{}", format_match_line(candidate));
        }
    }
    Ok(())
}
