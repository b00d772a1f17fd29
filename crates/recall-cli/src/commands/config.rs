use std::path::Path;

use recall_core::EngineConfig;
use serde::Serialize;

use crate::error::CliError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveConfig<'a> {
    pub db_path: String,
    pub mode: &'static str,
    #[serde(flatten)]
    pub engine: &'a EngineConfig,
}

pub fn effective_config<'a>(config: &'a EngineConfig, db_path: &Path) -> EffectiveConfig<'a> {
    EffectiveConfig {
        db_path: db_path.display().to_string(),
        mode: if config.is_remote_configured() {
            "remote"
        } else {
            "standalone"
        },
        engine: config,
    }
}

pub fn run_config(config: &EngineConfig, db_path: &Path) -> Result<(), CliError> {
    let effective = effective_config(config, db_path);
    println!("{}", serde_json::to_string_pretty(&effective)?);
    Ok(())
}
