mod details;
mod markets;
mod stats;
mod watchlist;

use std::time::Duration;

use coinpulse_core::{
    ConfigError, CoreConfig, FetchOrchestrator, FetchOrigin, FetchReport, RestWatchlistStore,
};
use serde_json::Value;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub struct CommandResult {
    pub data: Value,
    pub origin: Option<FetchOrigin>,
    pub warnings: Vec<String>,
    pub latency_ms: u64,
}

impl CommandResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data,
            origin: None,
            warnings: Vec::new(),
            latency_ms: 0,
        }
    }

    /// Carries origin, latency, and provider failures of a market fetch.
    pub fn with_fetch(mut self, report: &FetchReport) -> Self {
        self.origin = Some(report.origin);
        self.latency_ms = report.latency_ms;
        self.warnings
            .extend(report.failures.iter().map(ToString::to_string));
        if let FetchOrigin::Stale { age_ms, .. } = report.origin {
            self.warnings.push(format!(
                "every provider failed; market data is {}s old",
                age_ms / 1000
            ));
        }
        self
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }
}

pub async fn run(cli: &Cli) -> Result<CommandResult, CliError> {
    let config = load_config(cli.timeout_ms)?;
    let orchestrator = FetchOrchestrator::builder().with_config(&config).build();
    let store = RestWatchlistStore::new(&config.watchlist);
    let store_warning = config.watchlist.is_placeholder().then_some(
        "watchlist store is not configured; set COINPULSE_SUPABASE_URL and COINPULSE_SUPABASE_ANON_KEY",
    );

    let result = match &cli.command {
        Command::Markets(args) => markets::run(args, &orchestrator, &store).await?,
        Command::Stats(args) => stats::run(args, &orchestrator).await?,
        Command::Details(args) => details::run(args, &orchestrator).await?,
        Command::Watchlist(args) => watchlist::run(args, &store).await?,
    };

    let uses_store = matches!(&cli.command, Command::Watchlist(_))
        || matches!(&cli.command, Command::Markets(args) if args.watchlist_only);
    Ok(match store_warning {
        Some(warning) if uses_store => result.with_warning(warning),
        _ => result,
    })
}

fn load_config(timeout_ms: Option<u64>) -> Result<CoreConfig, ConfigError> {
    let config = CoreConfig::from_env()?;
    match timeout_ms {
        None => Ok(config),
        Some(0) => Err(ConfigError::InvalidValue {
            key: "--timeout-ms",
            value: String::from("0"),
        }),
        Some(ms) => Ok(config.with_request_timeout(Duration::from_millis(ms))),
    }
}
