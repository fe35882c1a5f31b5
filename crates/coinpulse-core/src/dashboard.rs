//! Derived views over a fetched market list: headline statistics, the
//! sortable and searchable asset table, and 24h sentiment buckets.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::Serialize;

use crate::domain::AssetRecord;

/// Number of assets shown in the market capitalization chart.
pub const MARKET_CAP_LEADERS: usize = 7;

/// 24h change (in percent) beyond which an asset counts as moving.
pub const SENTIMENT_THRESHOLD: f64 = 1.0;

/// Headline figures for a market list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub asset_count: usize,
    pub total_market_cap: f64,
    pub total_volume: f64,
    pub avg_change_24h: f64,
    pub top_gainer: Option<AssetRecord>,
}

impl DashboardStats {
    /// All zeros and no top gainer for an empty list.
    pub fn from_assets(assets: &[AssetRecord]) -> Self {
        if assets.is_empty() {
            return Self {
                asset_count: 0,
                total_market_cap: 0.0,
                total_volume: 0.0,
                avg_change_24h: 0.0,
                top_gainer: None,
            };
        }

        let total_change: f64 = assets
            .iter()
            .map(|asset| asset.price_change_percentage_24h)
            .sum();

        // First of equally large gainers wins.
        let top_gainer = assets.iter().fold(None::<&AssetRecord>, |best, asset| match best {
            Some(best)
                if best
                    .price_change_percentage_24h
                    .total_cmp(&asset.price_change_percentage_24h)
                    != Ordering::Less =>
            {
                Some(best)
            }
            _ => Some(asset),
        });

        Self {
            asset_count: assets.len(),
            total_market_cap: assets.iter().map(|asset| asset.market_cap).sum(),
            total_volume: assets.iter().map(|asset| asset.total_volume).sum(),
            avg_change_24h: total_change / assets.len() as f64,
            top_gainer: top_gainer.cloned(),
        }
    }
}

/// Count of assets up, flat, and down over 24h.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SentimentBreakdown {
    /// Change above +1%.
    pub bullish: usize,
    /// Change within [-1%, +1%].
    pub neutral: usize,
    /// Change below -1%.
    pub bearish: usize,
}

impl SentimentBreakdown {
    pub fn from_assets(assets: &[AssetRecord]) -> Self {
        assets
            .iter()
            .fold(Self::default(), |mut breakdown, asset| {
                let change = asset.price_change_percentage_24h;
                if change > SENTIMENT_THRESHOLD {
                    breakdown.bullish += 1;
                } else if change < -SENTIMENT_THRESHOLD {
                    breakdown.bearish += 1;
                } else {
                    breakdown.neutral += 1;
                }
                breakdown
            })
    }
}

/// The first [`MARKET_CAP_LEADERS`] assets in list order, as
/// `(uppercase symbol, market cap)` pairs.
pub fn market_cap_leaders(assets: &[AssetRecord]) -> Vec<(String, f64)> {
    assets
        .iter()
        .take(MARKET_CAP_LEADERS)
        .map(|asset| (asset.symbol.to_uppercase(), asset.market_cap))
        .collect()
}

/// Sortable columns of the asset table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    MarketCap,
    CurrentPrice,
    PriceChangePercentage24h,
}

impl SortField {
    fn value(self, asset: &AssetRecord) -> f64 {
        match self {
            Self::MarketCap => asset.market_cap,
            Self::CurrentPrice => asset.current_price,
            Self::PriceChangePercentage24h => asset.price_change_percentage_24h,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub const fn reversed(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Search, watchlist restriction, and ordering applied to a market list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetQuery {
    pub search: String,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
    /// When set, only assets whose id is in the set are kept.
    pub only_ids: Option<HashSet<String>>,
}

impl AssetQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_sort(mut self, field: SortField, order: SortOrder) -> Self {
        self.sort_field = field;
        self.sort_order = order;
        self
    }

    pub fn with_only_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.only_ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    /// Clicking the active column flips its order; another column starts descending.
    pub fn sort_by(&mut self, field: SortField) {
        if self.sort_field == field {
            self.sort_order = self.sort_order.reversed();
        } else {
            self.sort_field = field;
            self.sort_order = SortOrder::Desc;
        }
    }

    /// Filters then stably sorts a copy of `assets`.
    pub fn apply(&self, assets: &[AssetRecord]) -> Vec<AssetRecord> {
        let mut rows: Vec<AssetRecord> = assets
            .iter()
            .filter(|asset| asset.matches(&self.search))
            .filter(|asset| {
                self.only_ids
                    .as_ref()
                    .map_or(true, |ids| ids.contains(&asset.id))
            })
            .cloned()
            .collect();

        let field = self.sort_field;
        rows.sort_by(|a, b| {
            let ordering = field.value(a).total_cmp(&field.value(b));
            match self.sort_order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
        rows
    }
}
