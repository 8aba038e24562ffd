//! kiroku - a markdown blog builder with embed transforms, RSS and OG images.

mod cli;
mod config;
mod content;
mod embed;
mod freshness;
mod generator;
mod logger;
mod markdown;
mod pipeline;
mod utils;
mod vdom;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands, build::build_site, new::new_post};
use config::SiteConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    if let Some(args) = cli.build_args() {
        logger::set_verbose(args.verbose);
    }

    let config = SiteConfig::load(&cli)?;

    match &cli.command {
        Commands::Build { .. } => build_site(&config).map(|_| ()),
        Commands::New { args } => new_post(&config, args).map(|_| ()),
    }
}
