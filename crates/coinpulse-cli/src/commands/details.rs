use coinpulse_core::{DetailOrigin, FetchOrchestrator};

use crate::cli::DetailsArgs;
use crate::error::CliError;

use super::CommandResult;

pub async fn run(args: &DetailsArgs, orchestrator: &FetchOrchestrator) -> Result<CommandResult, CliError> {
    let details = orchestrator.fetch_asset_details(&args.id).await?;
    let result = CommandResult::ok(serde_json::to_value(&details)?);

    Ok(match details.origin {
        DetailOrigin::Live => result,
        DetailOrigin::Cached => {
            result.with_warning("detail request failed; showing the cached market summary")
        }
    })
}
