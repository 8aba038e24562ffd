//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// kiroku: markdown blog builder
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: kiroku.toml)
    #[arg(short = 'C', long, default_value = "kiroku.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build pages, feed and OG images
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Scaffold a new draft post
    #[command(visible_alias = "n")]
    New {
        #[command(flatten)]
        args: NewArgs,
    },
}

/// Build command arguments.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Output directory path (relative to project root)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Clean output directory completely before building
    #[arg(short, long)]
    pub clean: bool,

    /// Include draft posts
    #[arg(short, long)]
    pub drafts: bool,

    /// Enable RSS feed generation
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub rss: Option<bool>,

    /// Enable OG image generation
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub og: Option<bool>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

/// New-post arguments. Missing slug and title are asked for on stdin.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct NewArgs {
    /// File name without extension (letters, digits and `-`)
    #[arg(short, long)]
    pub slug: Option<String>,

    /// Post title
    #[arg(short, long)]
    pub title: Option<String>,

    /// Short description for listings and the feed
    #[arg(short, long)]
    pub description: Option<String>,

    /// Path of a hand-made OG image (skips generation)
    #[arg(long = "og-image", value_hint = clap::ValueHint::FilePath)]
    pub og_image: Option<String>,

    /// Tag to attach (repeatable)
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,
}

impl Cli {
    pub fn build_args(&self) -> Option<&BuildArgs> {
        match &self.command {
            Commands::Build { build_args } => Some(build_args),
            Commands::New { .. } => None,
        }
    }
}
