//! # Domain Models
//!
//! Canonical types shared by every provider, the orchestrator, and the
//! watchlist client.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`AssetRecord`] | Normalized market snapshot of one asset |
//! | [`Sparkline`] | 7-day price samples |
//! | [`MarketsRequest`] | Validated currency + page size |
//! | [`AssetDetails`] | Detail view, live or served from cache |
//! | [`WatchlistEntry`] | Row of the remote watchlist table |

mod asset;
mod watchlist;

pub use asset::{
    validate_currency_code, AssetDetails, AssetRecord, DetailOrigin, MarketsRequest, Sparkline,
    MAX_PAGE_SIZE,
};
pub use watchlist::WatchlistEntry;
