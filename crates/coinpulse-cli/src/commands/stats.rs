use coinpulse_core::{
    market_cap_leaders, DashboardStats, FetchOrchestrator, MarketsRequest, SentimentBreakdown,
};
use serde::Serialize;

use crate::cli::StatsArgs;
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct MarketCapLeader {
    symbol: String,
    market_cap: f64,
}

#[derive(Debug, Serialize)]
struct StatsResponseData {
    currency: String,
    stats: DashboardStats,
    sentiment: SentimentBreakdown,
    market_cap_leaders: Vec<MarketCapLeader>,
}

pub async fn run(args: &StatsArgs, orchestrator: &FetchOrchestrator) -> Result<CommandResult, CliError> {
    let request = MarketsRequest::new(&args.market.currency, args.market.limit)?;
    let report = orchestrator.fetch_assets_report(&request).await?;

    let data = serde_json::to_value(StatsResponseData {
        currency: request.currency,
        stats: DashboardStats::from_assets(&report.assets),
        sentiment: SentimentBreakdown::from_assets(&report.assets),
        market_cap_leaders: market_cap_leaders(&report.assets)
            .into_iter()
            .map(|(symbol, market_cap)| MarketCapLeader { symbol, market_cap })
            .collect(),
    })?;

    Ok(CommandResult::ok(data).with_fetch(&report))
}
