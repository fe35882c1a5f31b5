//! CLI argument definitions for coinpulse.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `markets` | Market list, searchable and sortable |
//! | `stats` | Dashboard statistics for the market list |
//! | `details` | Detail view of one asset |
//! | `watchlist` | List, add, remove, or toggle watched assets |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--timeout-ms` | `COINPULSE_REQUEST_TIMEOUT_MS` or `8000` | Per-request timeout |
//!
//! # Examples
//!
//! ```bash
//! coinpulse markets --limit 20 --sort change --pretty
//! coinpulse stats
//! coinpulse details ethereum
//! coinpulse watchlist add solana
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use coinpulse_core::{SortField, SortOrder};

/// Crypto market dashboard on the command line.
///
/// Market data comes from CoinGecko with Binance and CoinCap as fallbacks;
/// the watchlist lives in a Supabase table.
#[derive(Debug, Parser)]
#[command(name = "coinpulse", author, version, about = "Crypto market dashboard CLI")]
pub struct Cli {
    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Per-request timeout in milliseconds.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch the market list.
    ///
    /// # Examples
    ///
    ///   coinpulse markets
    ///   coinpulse markets --search sol --sort price --order asc
    ///   coinpulse markets --watchlist-only
    Markets(MarketsArgs),

    /// Total market cap, volume, average change, top gainer, and sentiment.
    Stats(StatsArgs),

    /// Fetch details for one asset, falling back to the market list.
    Details(DetailsArgs),

    /// Manage the watchlist.
    Watchlist(WatchlistArgs),
}

/// Currency and page size shared by market commands.
#[derive(Debug, Args)]
pub struct MarketOptions {
    /// Quote currency code passed to the providers.
    #[arg(long, default_value = "usd")]
    pub currency: String,

    /// Number of assets to request.
    #[arg(long, default_value_t = 50)]
    pub limit: usize,
}

#[derive(Debug, Args)]
pub struct MarketsArgs {
    #[command(flatten)]
    pub market: MarketOptions,

    /// Case-insensitive match on name or symbol.
    #[arg(long, default_value = "")]
    pub search: String,

    #[arg(long, value_enum, default_value_t = SortArg::MarketCap)]
    pub sort: SortArg,

    #[arg(long, value_enum, default_value_t = OrderArg::Desc)]
    pub order: OrderArg,

    /// Only show assets on the watchlist.
    #[arg(long, default_value_t = false)]
    pub watchlist_only: bool,
}

#[derive(Debug, Args)]
pub struct StatsArgs {
    #[command(flatten)]
    pub market: MarketOptions,
}

#[derive(Debug, Args)]
pub struct DetailsArgs {
    /// Asset id, e.g. `bitcoin`.
    pub id: String,
}

#[derive(Debug, Args)]
pub struct WatchlistArgs {
    #[command(subcommand)]
    pub command: WatchlistCommand,
}

#[derive(Debug, Subcommand)]
pub enum WatchlistCommand {
    /// List watched assets.
    List,
    /// Watch an asset.
    Add { id: String },
    /// Stop watching an asset. Succeeds when it was not watched.
    Remove { id: String },
    /// Add the asset when it is not watched, remove it otherwise.
    Toggle { id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    MarketCap,
    Price,
    Change,
}

impl From<SortArg> for SortField {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::MarketCap => Self::MarketCap,
            SortArg::Price => Self::CurrentPrice,
            SortArg::Change => Self::PriceChangePercentage24h,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OrderArg {
    Asc,
    Desc,
}

impl From<OrderArg> for SortOrder {
    fn from(value: OrderArg) -> Self {
        match value {
            OrderArg::Asc => Self::Asc,
            OrderArg::Desc => Self::Desc,
        }
    }
}
