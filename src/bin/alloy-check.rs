//! Validate or format Alloy configuration files from the command line.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use alloy_language_server::catalog::load_catalog;
use alloy_language_server::config::SharedArgs;
use alloy_language_server::{Config, ValidationVerdict};
use anyhow::{Context, Result};
use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "alloy-check")]
#[command(about = "Validate Grafana Alloy configuration files")]
#[command(version)]
struct Args {
    /// Files to check
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Print the formatted configuration instead of validating
    #[arg(long, conflicts_with = "json")]
    format: bool,

    /// Print each verdict as JSON
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    shared: SharedArgs,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let config = Config::from_args(args.shared)?;
    config.init_logging();

    let catalog = Arc::new(load_catalog(&config.catalog_dirs, None).await);
    let validator = config.validator(catalog);

    let mut all_valid = true;
    for path in &args.files {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        if args.format {
            let formatted = validator
                .format(&content)
                .await
                .with_context(|| format!("Failed to format {}", path.display()))?;
            println!("{}", formatted);
            continue;
        }

        let verdict = validator
            .validate(
                &content,
                config.stability_level.as_deref(),
                config.prefer_external,
            )
            .await
            .with_context(|| format!("Failed to validate {}", path.display()))?;

        if args.json {
            println!("{}", serde_json::to_string(&verdict)?);
        } else {
            print_verdict(path, &verdict);
        }
        all_valid &= verdict.valid;
    }

    Ok(if all_valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_verdict(path: &std::path::Path, verdict: &ValidationVerdict) {
    for diagnostic in verdict.diagnostics() {
        let severity = if diagnostic.is_error() {
            "error"
        } else {
            "warning"
        };
        println!(
            "{}:{}:{}: {}: {}",
            path.display(),
            diagnostic.line,
            diagnostic.column,
            severity,
            diagnostic.message.trim_end()
        );
    }
}
