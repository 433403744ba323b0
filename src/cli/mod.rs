//! Command-line interface definitions.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// restockd - product restock monitoring with webhook alerts.
#[derive(Parser, Debug)]
#[command(name = "restockd")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "restockd.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the monitor in the foreground
    Run(RunArgs),

    /// Register a product and fetch its initial snapshot
    Add(AddArgs),

    /// Remove a product from the registry
    Remove(IdArg),

    /// List registered products
    List,

    /// Replace the watched sizes of a product
    Watch(WatchArgs),

    /// Clear the notified flags of a product
    Reset(IdArg),

    /// Run a one-off check of a product
    Check(IdArg),
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Override log level (debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Use JSON log format instead of pretty
    #[arg(long)]
    pub json_logs: bool,
}

/// Arguments for the `add` subcommand.
#[derive(Parser, Debug)]
pub struct AddArgs {
    /// Product page URL
    pub url: String,

    /// Size to watch (repeatable); watches all sizes when omitted
    #[arg(short, long = "size")]
    pub sizes: Vec<String>,
}

/// Arguments for the `watch` subcommand.
#[derive(Parser, Debug)]
pub struct WatchArgs {
    /// Product id
    pub id: String,

    /// Size to watch (repeatable); an empty list watches all sizes
    #[arg(short, long = "size")]
    pub sizes: Vec<String>,
}

/// Shared argument for commands addressing one product.
#[derive(Parser, Debug)]
pub struct IdArg {
    /// Product id
    pub id: String,
}
