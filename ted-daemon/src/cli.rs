//! Command line arguments and environment overrides

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

/// TED binding daemon
///
/// Polls The Energy Detective gateways listed in the service configuration
/// and prints the values of every bound item as they arrive.
#[derive(Parser, Debug, Clone)]
#[command(name = "tedd")]
#[command(about = "Polls TED gateways and prints bound item updates")]
#[command(version)]
pub struct Args {
    /// Service configuration file (`theenergydetective:<key>=<value>` lines)
    #[arg(short, long, default_value = "openhab.cfg")]
    pub config: PathBuf,

    /// Items file with `{ theenergydetective="<gateway>:<path>" }` bindings
    #[arg(short, long, default_value = "ted.items")]
    pub items: PathBuf,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Run a single poll cycle and exit
    #[arg(long)]
    pub once: bool,
}

impl Args {
    /// Validate command line arguments
    pub fn validate(&self) -> Result<()> {
        match self.log_level.to_lowercase().as_str() {
            "off" | "error" | "warn" | "info" | "debug" | "trace" => Ok(()),
            _ => Err(anyhow::anyhow!(
                "Invalid log level '{}'. Valid levels: off, error, warn, info, debug, trace",
                self.log_level
            )),
        }
    }

    /// Override arguments with values from `lookup`
    ///
    /// `TED_CONFIG`, `TED_ITEMS` and `TED_LOG_LEVEL` take precedence over
    /// the command line.
    pub fn apply_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(config) = lookup("TED_CONFIG") {
            self.config = PathBuf::from(config);
        }
        if let Some(items) = lookup("TED_ITEMS") {
            self.items = PathBuf::from(items);
        }
        if let Some(log_level) = lookup("TED_LOG_LEVEL") {
            self.log_level = log_level;
        }
        self
    }
}

/// Daemon configuration derived from arguments and environment
#[derive(Debug, Clone)]
pub struct Config {
    pub config_path: PathBuf,
    pub items_path: PathBuf,
    pub log_level: String,
    pub once: bool,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            config_path: args.config,
            items_path: args.items,
            log_level: args.log_level.to_lowercase(),
            once: args.once,
        }
    }
}

impl Config {
    /// Create configuration from command line arguments and environment variables
    pub fn from_env() -> Result<Self> {
        let args = Args::parse().apply_env(|key| std::env::var(key).ok());
        args.validate()?;
        Ok(Config::from(args))
    }
}
