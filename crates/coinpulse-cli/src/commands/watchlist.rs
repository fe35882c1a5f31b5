use coinpulse_core::{WatchlistChange, WatchlistEntry, WatchlistStore};
use serde::Serialize;
use serde_json::json;

use crate::cli::{WatchlistArgs, WatchlistCommand};
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct WatchlistResponseData {
    entries: Vec<WatchlistEntry>,
}

pub async fn run(args: &WatchlistArgs, store: &dyn WatchlistStore) -> Result<CommandResult, CliError> {
    let data = match &args.command {
        WatchlistCommand::List => serde_json::to_value(WatchlistResponseData {
            entries: store.list().await?,
        })?,
        WatchlistCommand::Add { id } => {
            store.add(id).await?;
            json!({ "coin_id": id, "watched": true })
        }
        WatchlistCommand::Remove { id } => {
            store.remove(id).await?;
            json!({ "coin_id": id, "watched": false })
        }
        WatchlistCommand::Toggle { id } => {
            let change = store.toggle(id).await?;
            json!({ "coin_id": id, "watched": change == WatchlistChange::Added })
        }
    };

    Ok(CommandResult::ok(data))
}
