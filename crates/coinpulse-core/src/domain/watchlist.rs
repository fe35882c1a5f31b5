use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, PrimitiveDateTime};

// Postgres `timestamp` (no time zone) columns come back without an offset.
const NAIVE_TIMESTAMP: &str =
    "[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]";

/// One row of the remote `watchlist` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    #[serde(deserialize_with = "row_id")]
    pub id: String,
    pub coin_id: String,
    #[serde(
        serialize_with = "time::serde::rfc3339::serialize",
        deserialize_with = "created_at"
    )]
    pub created_at: OffsetDateTime,
}

// Row ids may be serial integers or uuids depending on how the table was created.
fn row_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(text),
        Value::Number(number) if number.is_i64() || number.is_u64() => Ok(number.to_string()),
        other => Err(D::Error::custom(format!("invalid row id: {other}"))),
    }
}

// Offset-less timestamps are read as UTC.
fn created_at<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    if let Ok(timestamp) = OffsetDateTime::parse(&text, &Rfc3339) {
        return Ok(timestamp);
    }

    let naive = time::format_description::parse(NAIVE_TIMESTAMP).map_err(D::Error::custom)?;
    PrimitiveDateTime::parse(&text, &naive)
        .map(PrimitiveDateTime::assume_utc)
        .map_err(|error| D::Error::custom(format!("invalid created_at '{text}': {error}")))
}
