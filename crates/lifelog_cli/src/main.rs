//! CLI probe for `lifelog_core`.
//!
//! # Responsibility
//! - Verify core crate linkage (`ping`, `version`).
//! - Print a summary of the newest snapshot in `LIFELOG_SNAPSHOT_DIR`
//!   (`summary`), exercising config, logging and file storage end to end.

use lifelog_core::{
    init_logging_from_config, make_archive, now_ms, ArchiveStorage, EngineConfig,
    FileArchiveStorage,
};
use log::error;
use std::process::ExitCode;

const USAGE: &str = "usage: lifelog_cli <ping|version|summary>";

fn main() -> ExitCode {
    let command = std::env::args().nth(1).unwrap_or_else(|| "ping".to_string());
    let outcome = match command.as_str() {
        "ping" => {
            println!("lifelog_core ping={}", lifelog_core::ping());
            Ok(())
        }
        "version" => {
            println!("lifelog_core version={}", lifelog_core::core_version());
            Ok(())
        }
        "summary" => summary(),
        _ => Err(USAGE.to_string()),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("event=cli_command module=cli status=error command={command}");
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn summary() -> Result<(), String> {
    let config = EngineConfig::from_env().map_err(|err| err.to_string())?;
    init_logging_from_config(&config)?;

    let dir = config
        .snapshot_dir
        .clone()
        .ok_or_else(|| "LIFELOG_SNAPSHOT_DIR is not set".to_string())?;
    let storage = FileArchiveStorage::open(dir).map_err(|err| err.to_string())?;
    let archive = make_archive(storage.get().map_err(|err| err.to_string())?)
        .with_narrative_ceiling(config.narrative_ceiling);

    let now = now_ms();
    println!("tags={}", archive.get_all_raw_tags().len());
    println!("narratives={}", archive.get_all_raw_narratives().len());
    for narrative in archive.get_ongoing_narratives() {
        let minutes = narrative.time().duration(now).as_secs() / 60;
        println!("ongoing id={} minutes={}", narrative.id, minutes);
    }
    Ok(())
}
