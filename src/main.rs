// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! VIDASH - Video Dashboard
//!
//! A cross-platform desktop application that plays back a local video and
//! records lightweight viewing analytics: play/pause counts, watched
//! intervals, and frame capture/export.

mod app;
mod config;
mod io;
mod models;
mod player;
mod ui;
mod util;

use anyhow::{Context, Result};
use app::DashboardApp;
use clap::Parser;
use config::DashboardConfig;
use io::intake::{HandleRegistry, MediaReference};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vidash", about = "Video dashboard with viewing analytics")]
struct Cli {
    /// Video file or http(s) URL to open on startup
    reference: Option<String>,

    /// YAML configuration file
    #[arg(long, env = "VIDASH_CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = DashboardConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let registry = HandleRegistry::new();

    let mut app = DashboardApp::new(config.clone(), registry.clone());
    if let Some(arg) = cli.reference {
        match MediaReference::from_arg(&arg, &registry, &config) {
            Ok(reference) => app.load_reference(reference),
            Err(e) => {
                log::error!("Error compressing video: {}", e);
                app.notify(format!("Failed to compress video. Please try again.\n\n{}", e));
            }
        }
    }

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 760.0])
            .with_min_inner_size([800.0, 600.0])
            .with_drag_and_drop(true)
            .with_title("Video Dashboard"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "VIDASH",
        options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
