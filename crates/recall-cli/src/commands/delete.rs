use recall_core::{AppSetting, Deck, Goal, RecordKind};

use crate::commands::common::{normalize_record_id, Engine};
use crate::error::CliError;

pub async fn run_delete(engine: &Engine, kind: RecordKind, id: &str) -> Result<bool, CliError> {
    let id = normalize_record_id(id)?;
    let existed = match kind {
        RecordKind::Decks => engine.delete::<Deck>(&id).await?,
        RecordKind::Goals => engine.delete::<Goal>(&id).await?,
        RecordKind::AppSettings => engine.delete::<AppSetting>(&id).await?,
    };

    if existed {
        println!("{id}");
    } else {
        println!("{id} (was not cached locally)");
    }
    Ok(existed)
}
