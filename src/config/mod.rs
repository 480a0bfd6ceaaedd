//! Configuration Management
//!
//! Loads server configuration from TOML files.
//! Configuration includes:
//! - Server settings (bind host and port)
//! - Event log capacity
//! - Dashboard delivery and browser auto-launch
//! - Console output options
//!
//! Precedence: file < `BOOKDROP_*` environment < CLI flags.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::errors::BookdropError;
use crate::event_log::{DEFAULT_CAPACITY, MAX_CAPACITY};
use crate::net::host_for_url;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub log: LogConfig,

    #[serde(default)]
    pub dashboard: DashboardConfig,

    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", host_for_url(&self.host), self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Maximum number of events kept in memory
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Serve the dashboard page at `/dashboard`
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Open the dashboard in the default browser once the server is up
    #[serde(default)]
    pub open_browser: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            open_browser: false,
        }
    }
}

/// Console output options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_true")]
    pub color: bool,
    /// Print the pretty-printed request body after each record
    #[serde(default = "default_true")]
    pub show_raw_json: bool,
    /// Suppress per-record console output entirely
    #[serde(default)]
    pub quiet: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            color: true,
            show_raw_json: true,
            quiet: false,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}
fn default_true() -> bool {
    true
}

impl Config {
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut config: Config = match path {
            Some(p) => {
                let content = std::fs::read_to_string(p)
                    .with_context(|| format!("Failed to read config from {}", p))?;
                toml::from_str(&content).context("Failed to parse config")?
            }
            None => {
                let mut default_paths = vec![std::path::PathBuf::from("bookdrop.toml")];
                if let Some(home) = dirs::home_dir() {
                    default_paths.push(home.join(".config/bookdrop/config.toml"));
                }

                let mut loaded: Option<Config> = None;
                for p in &default_paths {
                    if let Ok(content) = std::fs::read_to_string(p) {
                        loaded = Some(toml::from_str(&content).with_context(|| {
                            format!("Failed to parse config {}", p.display())
                        })?);
                        break;
                    }
                }
                loaded.unwrap_or_default()
            }
        };

        config.apply_env();
        Ok(config)
    }

    /// Override fields from `BOOKDROP_*` environment variables.
    /// Unparseable values are ignored.
    pub fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("BOOKDROP_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("BOOKDROP_PORT") {
            if let Ok(p) = port.parse::<u16>() {
                self.server.port = p;
            }
        }
        if let Ok(capacity) = std::env::var("BOOKDROP_CAPACITY") {
            if let Ok(n) = capacity.parse::<usize>() {
                self.log.capacity = n;
            }
        }
        if let Ok(dashboard) = std::env::var("BOOKDROP_DASHBOARD") {
            match dashboard.to_lowercase().as_str() {
                "1" | "true" | "on" | "yes" => self.dashboard.enabled = true,
                "0" | "false" | "off" | "no" => self.dashboard.enabled = false,
                _ => {}
            }
        }
    }

    pub fn validate(&self) -> std::result::Result<(), BookdropError> {
        if self.log.capacity == 0 || self.log.capacity > MAX_CAPACITY {
            return Err(BookdropError::Config(format!(
                "log.capacity must be between 1 and {}, got {}",
                MAX_CAPACITY, self.log.capacity
            )));
        }
        if self.server.host.trim().is_empty() {
            return Err(BookdropError::Config(
                "server.host must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
