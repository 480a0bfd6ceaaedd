//! Command-line entry point for the bookdrop server.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;

use crate::config::Config;
use crate::errors::BookdropError;
use crate::event_log::EventLog;
use crate::observability::init_tracing;
use crate::output;
use crate::server;

#[derive(Parser, Debug, Default)]
#[command(name = "bookdrop")]
#[command(about = "Digital library ingestion server with a live dashboard")]
#[command(version)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<String>,

    /// Address to bind (default 0.0.0.0)
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Port to listen on (default 8080)
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Number of recent records kept in memory (default 50)
    #[arg(short = 'n', long, value_name = "N")]
    pub capacity: Option<usize>,

    /// Do not serve the dashboard page
    #[arg(long)]
    pub no_dashboard: bool,

    /// Open the dashboard in a browser after startup
    #[arg(long)]
    pub open: bool,

    /// Quiet mode (no per-record console output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbose logging on stderr
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Do not echo the raw request body
    #[arg(long)]
    pub no_raw_json: bool,
}

impl Cli {
    /// Apply CLI overrides on top of file and environment settings.
    pub fn apply(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(capacity) = self.capacity {
            config.log.capacity = capacity;
        }
        if self.no_dashboard {
            config.dashboard.enabled = false;
        }
        if self.open {
            config.dashboard.open_browser = true;
        }
        if self.quiet {
            config.ui.quiet = true;
        }
        if self.no_color {
            config.ui.color = false;
        }
        if self.no_raw_json {
            config.ui.show_raw_json = false;
        }
    }

    /// Load, override and validate the effective configuration.
    pub fn resolve_config(&self) -> Result<Config, BookdropError> {
        let mut config = Config::load(self.config.as_deref())
            .map_err(|e| BookdropError::Config(format!("{:#}", e)))?;
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.resolve_config()?;
    output::init(&config.ui);

    let log = Arc::new(EventLog::new(config.log.capacity)?);
    server::serve(&config, log, crate::shutdown_requested()).await?;
    Ok(())
}
