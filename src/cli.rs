use std::path::PathBuf;

use clap::builder::{styling::AnsiColor, Styles};
use clap::Parser;

const ABOUT: &str = "City weather TUI";

const LONG_ABOUT: &str = "
TUI showing the current temperature and a five day forecast for a city, sourced from
OpenWeatherMap.

An API key is required. Put it in the config file (created on first run under your config
directory as citywx/config.toml), export OWM_API_KEY, or pass --api-key.

Keys: left/right or h/l switch city, 1-9 pick a city, n or space toggle day/night,
u toggle C/F, r refresh, q quit.
";

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default())
    .usage(AnsiColor::Green.on_default())
    .literal(AnsiColor::Green.on_default())
    .placeholder(AnsiColor::Green.on_default());

#[derive(Parser, Debug)]
#[command(version, styles=STYLES, about=ABOUT, long_about = LONG_ABOUT)]
pub struct Args {
    #[arg(help = "City to show first (one of the configured cities)")]
    pub city: Option<String>,

    #[arg(long, help = "Path to the config file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "OpenWeatherMap API key (overrides config and OWM_API_KEY)")]
    pub api_key: Option<String>,

    #[arg(long, help = "Start with the night background")]
    pub night: bool,

    #[arg(long, help = "Show temperatures in Fahrenheit")]
    pub imperial: bool,

    #[arg(long, help = "Write logs here instead of the cache directory")]
    pub log_file: Option<PathBuf>,

    #[arg(long, default_value = "info", help = "Log level when RUST_LOG is unset")]
    pub log_level: String,
}
