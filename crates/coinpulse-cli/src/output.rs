use std::io::Write;

use serde_json::json;

use crate::commands::CommandResult;
use crate::error::CliError;

/// Prints `{"data": ..., "meta": {...}}` to stdout.
pub fn render(result: &CommandResult, pretty: bool) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    render_to(&mut stdout.lock(), result, pretty)
}

fn render_to(out: &mut impl Write, result: &CommandResult, pretty: bool) -> Result<(), CliError> {
    let document = json!({
        "data": result.data,
        "meta": {
            "origin": result.origin,
            "warnings": result.warnings,
            "latency_ms": result.latency_ms,
        },
    });

    if pretty {
        serde_json::to_writer_pretty(&mut *out, &document)?;
    } else {
        serde_json::to_writer(&mut *out, &document)?;
    }
    writeln!(out)?;
    out.flush()?;

    Ok(())
}
