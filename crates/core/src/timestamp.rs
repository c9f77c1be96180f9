//! Serde helpers for backend timestamps.
//!
//! The backend stores naive datetimes and serializes them without an
//! offset (`2026-03-01T10:00:00.123456`). Those are read as UTC. Values
//! carrying an RFC 3339 offset are converted to UTC.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::types::Timestamp;

const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Parse an RFC 3339 timestamp, or an offset-less one taken as UTC.
pub fn parse(raw: &str) -> Result<Timestamp, chrono::ParseError> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Ok(dt.with_timezone(&Utc)),
        Err(_) => NaiveDateTime::parse_from_str(raw, NAIVE_FORMAT).map(|naive| naive.and_utc()),
    }
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(|e| serde::de::Error::custom(format!("invalid timestamp '{raw}': {e}")))
}

pub fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|raw| {
            parse(&raw)
                .map_err(|e| serde::de::Error::custom(format!("invalid timestamp '{raw}': {e}")))
        })
        .transpose()
}
