//! Command-line interface module.

mod args;
pub mod build;
pub mod new;

pub use args::{BuildArgs, Cli, Commands, NewArgs};
