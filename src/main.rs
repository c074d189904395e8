//! # Salesdash entry point
//!
//! With a subcommand the binary runs as a CLI and exits:
//!
//! ```bash
//! salesdash summary --file sales.csv
//! salesdash group --demo sales --by Region --value Revenue --agg mean
//! ```
//!
//! Without one it opens the dashboard window.

#![warn(clippy::all, rust_2018_idioms)]
#![expect(clippy::print_stdout)] // CLI output goes to stdout
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod cli;

use anyhow::Result;
use clap::Parser as _;
use salesdash::config::load_config;
use salesdash::gui::DashboardApp;
use salesdash::logging;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    let mut config = load_config();
    if let Some(level) = &cli.log_level {
        config.log_level.clone_from(level);
    }

    // A bad level in the config falls back to info rather than going silent.
    if let Err(e) = logging::init(&config.log_level) {
        logging::init("info")?;
        tracing::warn!("Ignoring log level '{}': {e:#}", config.log_level);
    }

    if let Some(command) = cli.command {
        return cli::run_command(command, &config);
    }

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Sales Analytics Dashboard")
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Sales Analytics Dashboard",
        native_options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc, config)))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to start the dashboard: {e}"))
}
