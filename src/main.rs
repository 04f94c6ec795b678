mod autoplay;
mod config;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use placement::engine::{Action, EngineCore};
use placement::level::{LevelConfig, LevelError};
use placement::progress::LevelResult;

use crate::autoplay::Autoplay;
use crate::config::{ConfigError, RunnerConfig};

/// Simulated seconds after which an unfinished run gives up.
const MAX_SIMULATED_SECS: f64 = 600.0;

#[derive(Debug, thiserror::Error)]
enum RunnerError {
    #[error("cannot read {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error(transparent)]
    Level(#[from] LevelError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("json output failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("level did not complete within {0} simulated seconds")]
    Unfinished(f64),
}

#[derive(Parser, Debug)]
#[command(name = "dropzone", about = "Headless runner for drag-and-drop placement levels")]
struct Cli {
    /// Level file, YAML or JSON (by extension).
    #[arg(long)]
    level: PathBuf,

    /// Skip play and force completion immediately.
    #[arg(long)]
    force: bool,

    #[command(flatten)]
    config: RunnerConfig,
}

fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();
    tracing_subscriber::fmt::init();
    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "ignoring unreadable .env"),
    }

    match run(&Cli::parse()) {
        Ok(result) => {
            println!("{result}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "run failed");
            ExitCode::FAILURE
        }
    }
}

/// Load, play and report. Returns the result as pretty JSON.
fn run(cli: &Cli) -> Result<String, RunnerError> {
    let config = cli.config.check()?;

    let level = load_level(&cli.level)?;
    let mut engine = level.build(config.seed)?;
    tracing::info!(
        level = %level.name,
        seed = config.seed,
        tick_hz = config.tick_hz,
        force = cli.force,
        "run started"
    );

    let result = play(&mut engine, &config, cli.force)?;
    Ok(serde_json::to_string_pretty(&result)?)
}

fn load_level(path: &Path) -> Result<LevelConfig, RunnerError> {
    let text = std::fs::read_to_string(path).map_err(|source| RunnerError::Io { path: path.to_owned(), source })?;
    let is_json = path.extension().is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let level = if is_json { LevelConfig::from_json_str(&text)? } else { LevelConfig::from_yaml_str(&text)? };
    Ok(level)
}

fn play(engine: &mut EngineCore, config: &RunnerConfig, force: bool) -> Result<LevelResult, RunnerError> {
    let mut result = None;
    let mut sink = |action: Action| {
        if let Action::LevelComplete(r) = &action {
            result = Some(*r);
        }
        log_action(&action);
    };

    if force {
        for action in engine.force_complete_level() {
            sink(action);
        }
    }
    let mut autoplay = Autoplay::new(config.dt(), config.drag_steps, sink);
    if !force {
        let drags = autoplay.play(engine);
        tracing::info!(drags, "autoplay finished");
    }

    let mut simulated = 0.0;
    while engine.result().is_none() && simulated < MAX_SIMULATED_SECS {
        autoplay.tick(engine);
        simulated += config.dt();
    }
    drop(autoplay);
    result.ok_or(RunnerError::Unfinished(MAX_SIMULATED_SECS))
}

fn log_action(action: &Action) {
    match action {
        Action::PieceMoved { .. } | Action::PieceTransformed { .. } | Action::RenderNeeded => {
            tracing::trace!(?action, "action");
        }
        _ => tracing::info!(?action, "action"),
    }
}
