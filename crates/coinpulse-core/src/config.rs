//! Environment-driven settings.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `COINPULSE_REQUEST_TIMEOUT_MS` | `8000` |
//! | `COINPULSE_COINGECKO_BASE_URL` | `https://api.coingecko.com/api/v3` |
//! | `COINPULSE_BINANCE_BASE_URL` | `https://api.binance.com` |
//! | `COINPULSE_COINCAP_BASE_URL` | `https://api.coincap.io` |
//! | `COINPULSE_SUPABASE_URL`, then `SUPABASE_URL` | `https://placeholder.supabase.co` |
//! | `COINPULSE_SUPABASE_ANON_KEY`, then `SUPABASE_ANON_KEY` | `placeholder-key` |
//!
//! Blank values count as unset.

use std::time::Duration;

use crate::orchestrator::DEFAULT_REQUEST_TIMEOUT;
use crate::provider::ProviderEndpoints;
use crate::ConfigError;

pub const REQUEST_TIMEOUT_ENV: &str = "COINPULSE_REQUEST_TIMEOUT_MS";
pub const COINGECKO_BASE_URL_ENV: &str = "COINPULSE_COINGECKO_BASE_URL";
pub const BINANCE_BASE_URL_ENV: &str = "COINPULSE_BINANCE_BASE_URL";
pub const COINCAP_BASE_URL_ENV: &str = "COINPULSE_COINCAP_BASE_URL";
pub const SUPABASE_URL_ENV: [&str; 2] = ["COINPULSE_SUPABASE_URL", "SUPABASE_URL"];
pub const SUPABASE_ANON_KEY_ENV: [&str; 2] = ["COINPULSE_SUPABASE_ANON_KEY", "SUPABASE_ANON_KEY"];

const PLACEHOLDER_SUPABASE_URL: &str = "https://placeholder.supabase.co";
const PLACEHOLDER_ANON_KEY: &str = "placeholder-key";

/// Connection settings for the remote watchlist table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchlistStoreConfig {
    pub url: String,
    pub anon_key: String,
    pub table: String,
    pub timeout: Duration,
}

impl WatchlistStoreConfig {
    /// True while the store still points at the built-in placeholder project.
    pub fn is_placeholder(&self) -> bool {
        self.url == PLACEHOLDER_SUPABASE_URL || self.anon_key == PLACEHOLDER_ANON_KEY
    }
}

impl Default for WatchlistStoreConfig {
    fn default() -> Self {
        Self {
            url: String::from(PLACEHOLDER_SUPABASE_URL),
            anon_key: String::from(PLACEHOLDER_ANON_KEY),
            table: String::from("watchlist"),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub request_timeout: Duration,
    pub endpoints: ProviderEndpoints,
    pub watchlist: WatchlistStoreConfig,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            endpoints: ProviderEndpoints::default(),
            watchlist: WatchlistStoreConfig::default(),
        }
    }
}

impl CoreConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };
        let first = |keys: [&'static str; 2]| get(keys[0]).or_else(|| get(keys[1]));

        let request_timeout = match get(REQUEST_TIMEOUT_ENV) {
            Some(raw) => parse_timeout(REQUEST_TIMEOUT_ENV, &raw)?,
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        let defaults = ProviderEndpoints::default();
        let endpoints = ProviderEndpoints {
            coingecko: get(COINGECKO_BASE_URL_ENV).unwrap_or(defaults.coingecko),
            binance: get(BINANCE_BASE_URL_ENV).unwrap_or(defaults.binance),
            coincap: get(COINCAP_BASE_URL_ENV).unwrap_or(defaults.coincap),
        };
        for (key, url) in [
            (COINGECKO_BASE_URL_ENV, &endpoints.coingecko),
            (BINANCE_BASE_URL_ENV, &endpoints.binance),
            (COINCAP_BASE_URL_ENV, &endpoints.coincap),
        ] {
            check_url(key, url)?;
        }

        let store_defaults = WatchlistStoreConfig::default();
        let watchlist = WatchlistStoreConfig {
            url: first(SUPABASE_URL_ENV).unwrap_or(store_defaults.url),
            anon_key: first(SUPABASE_ANON_KEY_ENV).unwrap_or(store_defaults.anon_key),
            timeout: request_timeout,
            ..store_defaults
        };
        check_url(SUPABASE_URL_ENV[0], &watchlist.url)?;

        Ok(Self {
            request_timeout,
            endpoints,
            watchlist,
        })
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self.watchlist.timeout = request_timeout;
        self
    }
}

fn parse_timeout(key: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    match raw.parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_owned(),
        }),
    }
}

fn check_url(key: &'static str, url: &str) -> Result<(), ConfigError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            key,
            value: url.to_owned(),
        })
    }
}
