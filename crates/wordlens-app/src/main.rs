use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use wordlens_config::input::InputSource;
use wordlens_core::CacheLayout;

mod controller;
mod coordinator;
mod events;
mod io;
mod player;
mod pool;
mod profile;
mod setup;
mod sink;
mod snippet;
mod state;
mod ui;
mod workers;

#[cfg(test)]
mod tests;

use self::controller::AppController;
use self::profile::ProfileStore;
use self::state::AppState;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum InputArg {
    Stdin,
    Clipboard,
    Websocket,
}

impl From<InputArg> for InputSource {
    fn from(arg: InputArg) -> Self {
        match arg {
            InputArg::Stdin => InputSource::Stdin,
            InputArg::Clipboard => InputSource::Clipboard,
            InputArg::Websocket => InputSource::Websocket,
        }
    }
}

/// Translations, definitions and pronunciations for the words you type
#[derive(Debug, Parser)]
#[command(name = "wordlens", version)]
struct Cli {
    /// Profile under <config dir>/wordlens/profiles
    #[arg(long, default_value = "main")]
    profile: String,

    /// Where words come from (overrides the profile)
    #[arg(long, value_enum)]
    input: Option<InputArg>,

    /// Skip words among the first LEVEL x 100 most common ones
    #[arg(long)]
    level: Option<u32>,

    /// Print the size of the on-disk cache and exit
    #[arg(long)]
    cache_size: bool,

    /// Delete every cached file and exit
    #[arg(long)]
    clear_cache: bool,

    /// Log as JSON lines
    #[arg(long)]
    json_logs: bool,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.with_ansi(atty::is(atty::Stream::Stderr)).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _ = dotenvy::dotenv();
    init_tracing(cli.json_logs);

    let profiles = ProfileStore::user()?;
    profiles.init()?;
    let mut config = profiles.load(&cli.profile)?;
    config.apply_env();

    if let Some(input) = cli.input {
        config.input.source = input.into();
    }
    if let Some(level) = cli.level {
        config.vocab.level = level;
    }

    let layout = CacheLayout::new(&config.cache.data_dir);

    if cli.cache_size || cli.clear_cache {
        if cli.cache_size {
            println!("Cache size: {} MB ({})", layout.size_mb(), layout.root().display());
        }
        if cli.clear_cache {
            let deleted = layout.clear();
            println!("Deleted {deleted} cached files");
        }
        return Ok(());
    }

    layout
        .ensure()
        .with_context(|| format!("cannot create cache under {}", layout.root().display()))?;

    let state = Arc::new(AppState::new(config.clone(), layout.clone()));
    let controller = AppController::new(state);
    let services = setup::build_services(&config, &layout, controller.sink(), controller.cancel_token())?;
    let mut tasks = controller.spawn_tasks(Arc::new(services));

    tokio::select! {
        result = signal::ctrl_c() => {
            result.context("failed to listen for ctrl+c")?;
            tracing::info!("Shutdown requested");
        }
        Some(result) = tasks.join_next() => {
            match result {
                Ok(Ok(())) => tracing::warn!("task exited"),
                Ok(Err(e)) => tracing::error!("task failed: {e:#}"),
                Err(e) => tracing::error!("task panicked: {e}"),
            }
        }
    }

    controller.shutdown();
    tasks.shutdown().await;
    Ok(())
}
