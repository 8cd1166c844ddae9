mod backend_bridge;
mod controller;
mod settings;
mod ui;

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use client_core::HttpTimelineClient;
use crossbeam_channel::bounded;
use storage::{normalize_database_url, Preferences};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::{commands::BackendCommand, runtime::launch};
use crate::controller::{
    display::{DisplayContext, DisplayController},
    events::UiEvent,
};
use crate::ui::terminal::TerminalView;

#[derive(Parser, Debug)]
#[command(about = "Conference schedule client")]
struct Args {
    /// Settings file (defaults to ./schedule.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    timeline_url: Option<String>,
    #[arg(long)]
    database_url: Option<String>,
    /// How many times the schedule screen is brought to the foreground.
    #[arg(long, default_value_t = 1)]
    activations: u32,
    /// Only print this day tab (1-based).
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    day: Option<u64>,
    /// Upper bound on waiting for each refresh.
    #[arg(long, default_value_t = 30)]
    wait_secs: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let args = Args::parse();

    let mut settings = settings::load_settings(args.config.as_deref())?;
    if let Some(url) = args.timeline_url {
        settings.timeline_url = url;
    }
    if let Some(url) = args.database_url {
        settings.database_url = url;
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    let database_url = normalize_database_url(&settings.database_url);
    let preferences = runtime.block_on(Preferences::open(&database_url))?;
    let api = {
        let _guard = runtime.enter();
        HttpTimelineClient::new(
            &settings.timeline_url,
            &settings.routes(),
            settings.request_timeout(),
        )
        .with_context(|| format!("invalid timeline url '{}'", settings.timeline_url))?
    };
    info!(
        timeline_url = %settings.timeline_url,
        database_url = %database_url,
        "schedule client starting"
    );

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(16);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(64);
    let worker = launch(cmd_rx, ui_tx, Arc::new(api), runtime.handle().clone());

    let mut controller = DisplayController::new(
        DisplayContext::new(preferences),
        TerminalView::stdout(selected_tab(args.day)),
        cmd_tx,
        ui_rx,
        settings.refresh_timeout(),
    );

    let wait = Duration::from_secs(args.wait_secs);
    for _ in 0..args.activations {
        controller.activate();
        if !controller.settle(wait) {
            warn!(wait_secs = args.wait_secs, "timeline refresh still running; giving up");
        }
    }

    info!(
        entries = controller.entries().len(),
        state = ?controller.state(),
        fetching = controller.is_fetching(),
        openings = controller
            .preferences()
            .get_long(shared::keys::OPENING_APP_COUNT)
            .unwrap_or(0),
        "schedule screen closing"
    );
    controller.teardown();
    let context = controller.into_context();
    worker
        .join()
        .map_err(|_| anyhow!("backend worker panicked"))?;
    runtime.block_on(context.preferences.flush())?;

    Ok(())
}

/// Zero-based tab index for a 1-based `--day`.
fn selected_tab(day: Option<u64>) -> Option<usize> {
    day.and_then(|day| usize::try_from(day.saturating_sub(1)).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_zero_is_rejected() {
        let err = Args::try_parse_from(["schedule", "--day", "0"]).expect_err("day 0");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn day_is_one_based() {
        let args = Args::try_parse_from(["schedule", "--day", "2"]).expect("args");
        assert_eq!(selected_tab(args.day), Some(1));
        let args = Args::try_parse_from(["schedule"]).expect("args");
        assert_eq!(selected_tab(args.day), None);
    }
}
