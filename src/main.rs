use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;
use tracing::debug;

use cdk_config::{ConfigCache, ConfigLoader, ContextBridge};

mod cli;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;
    debug!("Parsed CLI arguments: {:?}", cli);
    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Show { file, env, key } => {
            let mut cache = ConfigCache::new();
            let config = loader(&cli.config_dir, env.as_deref())
                .resolve(&file, &mut cache)
                .with_context(|| format!("Failed to resolve config {}", file.display()))?;
            let value = match key {
                Some(key) => config.get_required(&key)?.clone(),
                None => Value::Object(config.to_dict().clone()),
            };
            let rendered =
                serde_json::to_string_pretty(&value).context("Failed to render config as JSON")?;
            println!("{rendered}");
        }
        Commands::Convert { input, to, output } => {
            let written = bridge(&cli.config_dir)?
                .convert_file(&input, to, output.as_deref())
                .with_context(|| format!("Failed to convert {} to {to}", input.display()))?;
            println!("{}", written.display());
        }
        Commands::ImportContext {
            manifest,
            to,
            output,
        } => {
            let written = bridge(&cli.config_dir)?
                .import_context(&manifest, to, output.as_deref())
                .with_context(|| format!("Failed to import context from {}", manifest.display()))?;
            println!("{}", written.display());
        }
        Commands::ExportContext { file, manifest, env } => {
            let written = bridge(&cli.config_dir)?
                .export_context(&file, &manifest, env.as_deref())
                .with_context(|| {
                    format!(
                        "Failed to export {} into {}",
                        file.display(),
                        manifest.display()
                    )
                })?;
            println!("{}", written.display());
        }
        Commands::Validate { file, env, keys } => {
            let config = loader(&cli.config_dir, env.as_deref())
                .load(&file)
                .with_context(|| format!("Failed to load config {}", file.display()))?;
            config.validate_required_keys(&keys)?;
            println!("all {} keys present", keys.len());
        }
    }

    Ok(())
}

fn loader(config_dir: &Path, env: Option<&str>) -> ConfigLoader {
    let loader = ConfigLoader::new(config_dir);
    match env {
        Some(env) => loader.with_environment(env),
        None => loader,
    }
}

fn bridge(config_dir: &Path) -> Result<ContextBridge> {
    ContextBridge::new(config_dir)
        .with_context(|| format!("Failed to prepare config directory {}", config_dir.display()))
}

/// Installs a stderr subscriber.
///
/// - 0 (default): `RUST_LOG`, else warnings and errors
/// - 1 (-v): info
/// - 2 (-vv): debug
/// - 3+ (-vvv): trace
fn init_tracing(verbose: u8) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cli(dir: &TempDir, args: &[&str]) -> Cli {
        let config_dir = dir.path().to_str().unwrap();
        let mut argv = vec!["cdk-config", "-d", config_dir];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    #[test]
    fn test_missing_file_error_reads_as_sentence() {
        let dir = TempDir::new().unwrap();
        let err = run(cli(&dir, &["show", "missing.toml"])).unwrap_err();

        let message = format!("{err:#}");
        assert!(message.starts_with("Failed to resolve config missing.toml"));
        assert!(message.contains("config file not found"));
        assert!(!message.contains("FileNotFound("));
    }

    #[test]
    fn test_validate_reports_missing_keys() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("app.toml"), "[aws]\nregion = \"us-east-1\"\n").unwrap();

        run(cli(&dir, &["validate", "app.toml", "aws.region"])).unwrap();

        let err = run(cli(&dir, &["validate", "app.toml", "a.b", "c.d"])).unwrap_err();
        assert_eq!(err.to_string(), "required keys missing: a.b, c.d");
    }
}
