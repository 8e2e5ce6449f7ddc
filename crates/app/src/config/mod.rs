use clap::Parser;
use serde::Deserialize;

use crate::{commands::Command, error::Result};

const DEFAULT_CONFIG_PATH: &str = "config/mindframe.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    /// Bearer token; without one the remote collections stay empty.
    pub token: Option<String>,
    /// Local storage file used for budgets.
    pub state_path: String,
    pub level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            token: None,
            state_path: "config/mindframe_state.json".to_string(),
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "mindframe", about = "Expenses, moods, tasks and budgets")]
pub struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override base URL (e.g. http://localhost:5000/api).
    #[arg(long)]
    base_url: Option<String>,
    /// Override the local state file.
    #[arg(long)]
    state_path: Option<String>,
    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Layers the config file, `MINDFRAME_*` variables and CLI flags, in that
/// order. The token is never read from the command line.
pub fn load(args: &Args) -> Result<AppConfig> {
    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("MINDFRAME"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(base_url) = &args.base_url {
        settings.base_url = base_url.clone();
    }
    if let Some(state_path) = &args.state_path {
        settings.state_path = state_path.clone();
    }
    if let Some(level) = &args.level {
        settings.level = level.clone();
    }
    settings.token = settings.token.filter(|token| !token.trim().is_empty());

    Ok(settings)
}
