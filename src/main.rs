use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

mod app;
mod cli;
mod config;
mod daily;
mod fetcher;
mod icons;
mod logging;
mod owm;
mod units;
mod weather;

use crate::app::{run_app, App};
use crate::cli::Args;
use crate::config::Config;
use crate::fetcher::Fetcher;
use crate::owm::Endpoint;
use crate::weather::Units;

fn load_config(args: &Args) -> Result<Config> {
    let mut config = Config::load(args.config.as_deref())?;

    if let Some(key) = &args.api_key {
        config.api.api_key = key.clone();
    }
    if let Some(city) = &args.city {
        let index = config
            .city_index(city)
            .with_context(|| format!("Unknown city {city:?}"))?;
        config.ui.default_city = Some(config.cities[index].name.clone());
    }
    if args.night {
        config.ui.night = true;
    }
    if args.imperial {
        config.ui.units = Units::Imperial;
    }

    config.check()?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(path) = args.log_file.clone().or_else(logging::default_log_path) {
        if let Err(err) = logging::init(&path, &args.log_level) {
            eprintln!("logging disabled: {err:#}");
        }
    }

    let config = load_config(&args)?;
    let fetcher = Fetcher::new(Endpoint::new(&config.api.base_url, &config.api.api_key))
        .context("Failed to build HTTP client")?;
    let mut app = App::new(&config, fetcher)?;
    tracing::info!(cities = config.cities.len(), "starting");

    // setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // create app and run it
    let res = run_app(&mut terminal, &mut app);

    // restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %err, "ui loop failed");
        println!("{:?}", err)
    }

    Ok(())
}
