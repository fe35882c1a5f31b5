use coinpulse_core::{
    AssetQuery, AssetRecord, FetchOrchestrator, MarketsRequest, RestWatchlistStore, WatchlistStore,
};
use serde::Serialize;

use crate::cli::MarketsArgs;
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct MarketsResponseData {
    currency: String,
    total: usize,
    assets: Vec<AssetRecord>,
}

pub async fn run(
    args: &MarketsArgs,
    orchestrator: &FetchOrchestrator,
    store: &RestWatchlistStore,
) -> Result<CommandResult, CliError> {
    let request = MarketsRequest::new(&args.market.currency, args.market.limit)?;

    let mut query = AssetQuery::new()
        .with_search(args.search.as_str())
        .with_sort(args.sort.into(), args.order.into());
    if args.watchlist_only {
        let watched = store.list().await?;
        query = query.with_only_ids(watched.into_iter().map(|entry| entry.coin_id));
    }

    let report = orchestrator.fetch_assets_report(&request).await?;
    let assets = query.apply(&report.assets);
    let data = serde_json::to_value(MarketsResponseData {
        currency: request.currency,
        total: report.assets.len(),
        assets,
    })?;

    Ok(CommandResult::ok(data).with_fetch(&report))
}
