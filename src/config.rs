//! Configuration management for the Alloy language server.
//!
//! Handles:
//! - Command-line argument parsing (shared by the server and the checker)
//! - The `ALLOY_PATH` environment variable
//! - Project configuration from `.alloy-ls.toml`
//! - Catalog directory discovery
//!
//! Precedence: command line > environment > project file > defaults.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;

use crate::catalog::ComponentCatalog;
use crate::external::{ExternalCompiler, DEFAULT_PROGRAM, DEFAULT_TIMEOUT};
use crate::validation::Validator;

pub const PROJECT_CONFIG_FILE: &str = ".alloy-ls.toml";

/// Options shared by every binary
#[derive(Debug, Clone, Default, clap::Args)]
pub struct SharedArgs {
    /// Path or name of the alloy executable
    #[arg(long, env = "ALLOY_PATH", help = "Alloy executable used for validate/fmt")]
    pub alloy_path: Option<PathBuf>,

    /// Stability level passed to `alloy validate`
    #[arg(
        long,
        help = "Stability level (experimental, public-preview, generally-available)"
    )]
    pub stability_level: Option<String>,

    /// Never delegate to the external compiler
    #[arg(long, help = "Only use the built-in heuristic checks")]
    pub no_external: bool,

    /// Upper bound on a single external compiler run
    #[arg(long, help = "Timeout in seconds for alloy validate/fmt")]
    pub external_timeout_secs: Option<u64>,

    /// Additional catalog directory, highest priority
    #[arg(long, help = "Directory containing component catalog JSON files")]
    pub catalog_dir: Option<PathBuf>,

    /// Log level
    #[arg(
        long,
        default_value = "info",
        help = "Log level (trace, debug, info, warn, error)"
    )]
    pub log_level: String,
}

/// Command-line arguments for the language server
#[derive(Debug, Parser)]
#[command(name = "alloy-ls")]
#[command(about = "Language server for Grafana Alloy configuration files")]
#[command(version)]
pub struct Args {
    #[command(flatten)]
    pub shared: SharedArgs,
}

/// Contents of `.alloy-ls.toml`
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    pub stability_level: Option<String>,
    pub alloy_path: Option<PathBuf>,
    /// Set to false to disable the external compiler for this project
    pub external: Option<bool>,
    pub external_timeout_secs: Option<u64>,
}

/// Combined configuration from all sources
#[derive(Debug, Clone)]
pub struct Config {
    pub alloy_path: PathBuf,
    pub stability_level: Option<String>,
    pub prefer_external: bool,
    pub external_timeout: Duration,
    /// Catalog directories in increasing priority
    pub catalog_dirs: Vec<PathBuf>,
    pub log_level: String,
    /// Where the project configuration was found, if anywhere
    pub project_config_path: Option<PathBuf>,
}

impl Config {
    /// Create configuration from command-line arguments and the environment
    pub fn from_args_and_env() -> Result<Self> {
        Self::from_args(Args::parse().shared)
    }

    /// Create configuration from explicit arguments, discovering the project
    /// file from the current directory
    pub fn from_args(args: SharedArgs) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to determine current directory")?;
        Self::resolve(args, &cwd)
    }

    /// Create configuration with `start_dir` as the workspace root
    pub fn resolve(args: SharedArgs, start_dir: &Path) -> Result<Self> {
        let project_config_path = find_project_config(start_dir);
        let project = match &project_config_path {
            Some(path) => load_project_config(path)?,
            None => ProjectConfig::default(),
        };

        let mut catalog_dirs = Vec::new();
        if let Some(config_dir) = dirs::config_dir() {
            catalog_dirs.push(config_dir.join("alloy-ls").join("catalog"));
        }
        catalog_dirs.push(start_dir.join(".alloy-ls").join("catalog"));
        if let Some(custom_dir) = args.catalog_dir {
            catalog_dirs.push(custom_dir);
        }

        let external_timeout = args
            .external_timeout_secs
            .or(project.external_timeout_secs)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        Ok(Config {
            alloy_path: args
                .alloy_path
                .or(project.alloy_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PROGRAM)),
            stability_level: args.stability_level.or(project.stability_level),
            prefer_external: !args.no_external && project.external.unwrap_or(true),
            external_timeout,
            catalog_dirs,
            log_level: args.log_level,
            project_config_path,
        })
    }

    pub fn has_project_config(&self) -> bool {
        self.project_config_path.is_some()
    }

    pub fn external_compiler(&self) -> ExternalCompiler {
        ExternalCompiler::new(&self.alloy_path, self.external_timeout)
    }

    /// Validator over `catalog` with the configured external compiler.
    pub fn validator(&self, catalog: Arc<ComponentCatalog>) -> Validator {
        let validator = Validator::new(catalog);
        if self.prefer_external {
            validator.with_external(self.external_compiler())
        } else {
            validator
        }
    }

    /// Initialise `env_logger`, with `RUST_LOG` overriding the configured level.
    pub fn init_logging(&self) {
        let env = env_logger::Env::default().default_filter_or(self.log_level.as_str());
        // A logger may already be installed when embedded in tests.
        let _ = env_logger::Builder::from_env(env).try_init();
    }
}

/// Walk up from `start_dir` looking for `.alloy-ls.toml`.
pub fn find_project_config(start_dir: &Path) -> Option<PathBuf> {
    start_dir
        .ancestors()
        .map(|dir| dir.join(PROJECT_CONFIG_FILE))
        .find(|candidate| candidate.is_file())
}

pub fn load_project_config(path: &Path) -> Result<ProjectConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}
