//! # Coinpulse Core
//!
//! Market data plumbing for the coinpulse dashboard.
//!
//! ## Overview
//!
//! - **Canonical asset records** shared by every upstream provider
//! - **Per-provider normalizers** that never fail, only degrade to zeros
//! - **Ordered provider registry** with CoinGecko, Binance, and CoinCap built in
//! - **Fetch orchestrator** with fallback, a five minute cache, and stale serving
//! - **Watchlist store** over a PostgREST table
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Environment-driven settings |
//! | [`dashboard`] | Statistics, table sort/filter, sentiment |
//! | [`domain`] | Asset records, requests, watchlist rows |
//! | [`error`] | Error types |
//! | [`events`] | Fetch observer hooks |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`normalize`] | Raw provider JSON to asset records |
//! | [`orchestrator`] | Fallback fetch and caching |
//! | [`provider`] | Provider descriptors and registry |
//! | [`source`] | Provider identifiers |
//! | [`watchlist`] | Remote watchlist store |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use coinpulse_core::{CoreConfig, FetchOrchestrator, RestWatchlistStore, WatchlistStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CoreConfig::from_env()?;
//!     let orchestrator = FetchOrchestrator::builder().with_config(&config).build();
//!
//!     let assets = orchestrator.fetch_assets("usd", 50).await?;
//!     let watched = RestWatchlistStore::new(&config.watchlist).list().await?;
//!
//!     println!("{} assets, {} watched", assets.len(), watched.len());
//!     Ok(())
//! }
//! ```

mod cache;
pub mod config;
pub mod dashboard;
pub mod domain;
pub mod error;
pub mod events;
pub mod http_client;
pub mod normalize;
pub mod orchestrator;
pub mod provider;
pub mod source;
pub mod watchlist;

pub use cache::CACHE_DURATION;
pub use config::{CoreConfig, WatchlistStoreConfig};
pub use dashboard::{
    market_cap_leaders, AssetQuery, DashboardStats, SentimentBreakdown, SortField, SortOrder,
};
pub use domain::*;
pub use error::{ConfigError, FetchError, ProviderError, ProviderErrorKind, StoreError, ValidationError};
pub use events::{FetchObserver, TracingObserver};
pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpFuture, HttpMethod, HttpRequest, HttpResponse,
    ReqwestHttpClient, DEFAULT_HTTP_TIMEOUT,
};
pub use orchestrator::{
    FetchOrchestrator, FetchOrchestratorBuilder, FetchOrigin, FetchReport, DEFAULT_REQUEST_TIMEOUT,
};
pub use provider::{ProviderDescriptor, ProviderEndpoints, ProviderRegistry};
pub use source::ProviderId;
pub use watchlist::{RestWatchlistStore, WatchlistChange, WatchlistStore};
