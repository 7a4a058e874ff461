use anyhow::{Context, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use inquire::{Confirm, CustomType, Text};
use skylook_core::{Config, SearchController, SearchState};
use tracing::warn;

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skylook", version, about = "How's the sky looking today?")]
pub struct Cli {
    /// Log pipeline progress to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively edit endpoints and geocoding options.
    Configure,

    /// Show current, daily and hourly weather for a place.
    Show {
        /// Place name, e.g. "Berlin".
        place: String,

        /// Day for the hourly forecast (YYYY-MM-DD); defaults to the first day.
        #[arg(long)]
        day: Option<NaiveDate>,

        /// Print the snapshot as JSON instead of text.
        #[arg(long)]
        json: bool,

        /// Never prompt to retry after a connection failure.
        #[arg(long)]
        no_retry: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show {
                place,
                day,
                json,
                no_retry,
            } => show(&place, day, json, no_retry).await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut cfg = Config::load()?;

    cfg.geocoding_url = Text::new("Geocoding endpoint:")
        .with_default(&cfg.geocoding_url)
        .prompt()?;
    cfg.forecast_url = Text::new("Forecast endpoint:")
        .with_default(&cfg.forecast_url)
        .prompt()?;
    cfg.language = Text::new("Language for place names:")
        .with_default(&cfg.language)
        .prompt()?;
    cfg.result_count = CustomType::<u8>::new("Candidates to request from the geocoder:")
        .with_default(cfg.result_count)
        .with_error_message("Please enter a number between 1 and 100")
        .prompt()?;

    let path = cfg.save()?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

async fn show(
    place: &str,
    day: Option<NaiveDate>,
    json: bool,
    no_retry: bool,
) -> anyhow::Result<()> {
    let cfg = Config::load()?;
    let controller = SearchController::from_config(&cfg)?;

    let Some(mut ticket) = controller.search(place) else {
        bail!("Place name must not be empty");
    };

    loop {
        controller.run(ticket).await;

        let state = controller.current_state();
        match &state {
            SearchState::Ready { .. } => break,
            SearchState::NoResults { .. } => {
                println!("{}", render::render_status(&state));
                return Ok(());
            }
            SearchState::TransportError { .. } => {
                eprintln!("{}", render::render_status(&state));
                if no_retry || !Confirm::new("Retry?").with_default(true).prompt()? {
                    bail!("Could not load weather for '{place}'");
                }
                ticket = controller.retry().context("Nothing to retry")?;
            }
            other => bail!("Search stopped in unexpected state '{}'", other.name()),
        }
    }

    if let Some(day) = day {
        if !controller.select_day(day) {
            warn!(%day, "no hourly data for requested day, showing the first day");
        }
    }

    let state = controller.current_state();
    let Some(snapshot) = state.snapshot() else {
        bail!("Search result is no longer available");
    };

    if json {
        let out = serde_json::to_string_pretty(snapshot.as_ref())
            .context("Failed to serialize weather snapshot")?;
        println!("{out}");
    } else {
        print!("{}", render::render_snapshot(snapshot, state.selected_day()));
    }

    Ok(())
}
