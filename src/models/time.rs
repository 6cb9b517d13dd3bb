//! Timestamps leave the service as ISO-8601 UTC instants with seconds precision
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::Serializer;

pub fn format_utc_instant(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

pub fn serialize_utc_instant<S>(value: &SystemTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_utc_instant(*value))
}

pub fn serialize_optional_utc_instant<S>(value: &Option<SystemTime>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match *value {
        Some(time) => serialize_utc_instant(&time, serializer),
        None => serializer.serialize_none(),
    }
}
