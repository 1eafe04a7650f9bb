//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `rotina_core` linkage.
//! - Print a deterministic summary of the store selected by `ROTINA_DB_PATH`
//!   (in-memory when unset).
//! - Write rolling logs under `ROTINA_LOG_DIR` at `ROTINA_LOG_LEVEL`.

use rotina_core::{CoreConfig, RotinaCore};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("rotina_core ping={}", rotina_core::ping());
    println!("rotina_core version={}", rotina_core::core_version());

    let config = CoreConfig::from_env();
    match config.init_logging() {
        Ok(true) => println!("rotina_core logging level={}", config.log_level),
        Ok(false) => {}
        Err(err) => eprintln!("rotina_core logging disabled: {err}"),
    }
    let core = match RotinaCore::open(&config) {
        Ok(core) => core,
        Err(err) => {
            eprintln!("rotina_core open failed: {err}");
            return ExitCode::FAILURE;
        }
    };

    {
        let board = core.board();
        let data = board.board();
        println!(
            "board title={:?} lists={} tasks={} tags={}",
            data.title,
            data.lists.len(),
            data.task_count(),
            data.tags.len()
        );
    }
    println!(
        "prayers count={} categories={}",
        core.prayers().prayers().len(),
        core.prayers().categories().join(",")
    );
    let profile = core.profile().profile();
    println!(
        "profile name={:?} theme={}",
        profile.name,
        profile.theme_preset.as_str()
    );

    ExitCode::SUCCESS
}
