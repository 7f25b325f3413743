//! Command-line interface definitions for cdk-config.

use std::path::PathBuf;

use cdk_config::config::DEFAULT_CONFIG_DIR;
use cdk_config::Format;
use clap::{Parser, Subcommand};

/// Layered configuration for CDK apps.
///
/// Resolves `base` / named / `env.<environment>` config files and moves
/// configuration in and out of a CDK manifest's context block.
#[derive(Parser, Debug)]
#[command(name = "cdk-config")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding base, named and environment config files.
    #[arg(short = 'd', long, global = true, default_value = DEFAULT_CONFIG_DIR)]
    pub config_dir: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a config file with its layers and print it as JSON.
    Show {
        /// Config file, relative to the config directory unless absolute.
        file: PathBuf,

        /// Environment overlay to apply (`env.<ENV>.<ext>`).
        #[arg(short, long)]
        env: Option<String>,

        /// Print only the value at this dotted path.
        #[arg(short, long)]
        key: Option<String>,
    },

    /// Convert a config file to another format.
    Convert {
        input: PathBuf,

        /// Output format: toml, json or yaml.
        #[arg(short, long, value_parser = parse_format)]
        to: Format,

        /// Output path (defaults to `<config-dir>/<input stem>.<ext>`).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract the manifest's context block into a config file.
    ImportContext {
        #[arg(short, long, default_value = "cdk.json")]
        manifest: PathBuf,

        #[arg(short, long, value_parser = parse_format, default_value = "toml")]
        to: Format,

        /// Output path (defaults to `<config-dir>/cdk-context.<ext>`).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Merge a config file into the manifest's context block.
    ExportContext {
        file: PathBuf,

        #[arg(short, long, default_value = "cdk.json")]
        manifest: PathBuf,

        /// Apply the `environments.<ENV>` block before exporting.
        #[arg(short, long)]
        env: Option<String>,
    },

    /// Check that dotted keys are present in a resolved config.
    Validate {
        file: PathBuf,

        #[arg(short, long)]
        env: Option<String>,

        #[arg(required = true)]
        keys: Vec<String>,
    },
}

fn parse_format(s: &str) -> Result<Format, String> {
    s.parse().map_err(|e: cdk_config::ConfigError| e.to_string())
}
