// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! CelestialLens - chart readings streamed from Gemini
//!
//! Entry point for the CelestialLens CLI application.

use clap::Parser;

use celestial_lens::cli::{Cli, Commands};
use celestial_lens::config::Settings;
use celestial_lens::error::Result;

#[path = "main/cli_commands.rs"]
mod cli_commands;

use cli_commands::{run_analyze, run_catalog, run_prompt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());

    // `-v` turns on the pipeline diagnostics. `RUST_LOG` still takes precedence.
    if cli.verbose > 0 {
        for directive in [
            "celestial.llm.client=debug",
            "celestial.llm.gemini=debug",
            "celestial.attachment=debug",
            "celestial.session=debug",
            "celestial.prompt=debug",
        ] {
            if let Ok(parsed) = directive.parse() {
                env_filter = env_filter.add_directive(parsed);
            }
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };

    match cli.command {
        Commands::Analyze(args) => run_analyze(args, settings, cli.verbose).await,
        Commands::Catalog => run_catalog(&settings),
        Commands::Prompt(args) => run_prompt(args, &settings),
    }
}
