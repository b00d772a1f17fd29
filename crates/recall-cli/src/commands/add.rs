use recall_core::{Card, Deck, Mutation};

use crate::commands::common::{format_match_line, normalize_content, normalize_record_id, Engine};
use crate::error::CliError;

pub async fn run_add_deck(engine: &Engine, name_parts: &[String]) -> Result<Deck, CliError> {
    let name = normalize_content(&name_parts.join(" ")).ok_or(CliError::EmptyDeckName)?;
    let deck = engine.mutate(Mutation::Create(Deck::new(name))).await?;
    println!("{}", deck.id);
    Ok(deck)
}

pub async fn run_add_card(
    engine: &Engine,
    deck_id: &str,
    content_parts: &[String],
    tags: &[String],
    force: bool,
) -> Result<Card, CliError> {
    let content = normalize_content(&content_parts.join(" ")).ok_or(CliError::EmptyContent)?;
    let deck_id = normalize_record_id(deck_id)?;

    let matches = engine.find_similar_cards(&content).await?;
    if !matches.is_empty() {
        for candidate in &matches {
            eprintln!("{}", format_match_line(candidate));
        }
        if !force {
            return Err(CliError::DuplicateCard(matches.len()));
        }
    }

    // Build on the remote's copy so cards added elsewhere are not overwritten
    let deck = engine
        .reconcile_one::<Deck>(&deck_id)
        .await?
        .ok_or_else(|| CliError::DeckNotFound(deck_id.to_string()))?;

    let card = Card::new(content).with_tags(tags.iter().cloned());
    let mut cards = deck.cards;
    cards.push(card.clone());
    let patch = serde_json::json!({ "cards": serde_json::to_value(&cards)? });

    engine
        .mutate::<Deck>(Mutation::Update {
            id: deck_id,
            patch,
        })
        .await?;

    println!("{}", card.id);
    Ok(card)
}
