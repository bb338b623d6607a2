#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Interactive terminal front end for the realty map backend.
//!
//! Loads the client configuration, connects to the backend, and drives the
//! page through a `dialoguer` menu: pick a location, estimate a price, save
//! and compare favorites, and look up nearby amenities.
//!
//! Uses `indicatif-log-bridge` (via [`progress::init_logger`]) to route
//! `log` output through `indicatif::MultiProgress` so that log lines and
//! the request spinner never fight for the terminal.

mod interactive;
mod progress;
mod terminal_map;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use realty_map_app::page::Page;
use realty_map_client::{ClientConfig, HttpBackend};

use crate::progress::with_spinner;
use crate::terminal_map::TerminalMap;

/// Estimate property prices and explore locations from the terminal.
#[derive(Parser)]
#[command(name = "realty_map_cli")]
#[command(about = "Estimate property prices and explore locations")]
struct Cli {
    /// Backend base URL (overrides the config file and `REALTY_MAP_BASE_URL`).
    #[arg(long)]
    base_url: Option<String>,

    /// TOML file overriding the built-in client configuration.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Nearby-search radius in metres.
    #[arg(long)]
    nearby_radius: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = progress::init_logger();
    let cli = Cli::parse();

    let mut config = ClientConfig::load(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(radius) = cli.nearby_radius {
        config.nearby.radius_m = Some(radius);
    }

    let backend = HttpBackend::new(&config)?;
    log::info!("Using backend at {}", backend.base_url());

    println!("Realty Map");
    println!();

    let mut page = Page::new(Arc::new(backend), TerminalMap::default(), &config);
    for notice in with_spinner(&multi, "Loading...", page.load()).await {
        interactive::print_notice(&notice);
    }

    interactive::run(&mut page, &multi).await
}
