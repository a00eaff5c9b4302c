//! Calendar dates on the wire.
//!
//! Dates serialize as `YYYY-MM-DD`. On input an RFC 3339 timestamp is also
//! accepted and truncated to its date.

use serde::{de, Deserialize, Deserializer, Serializer};
use time::{format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime};

pub fn parse_date(raw: &str) -> Option<Date> {
    let raw = raw.trim();
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .ok()
        .or_else(|| OffsetDateTime::parse(raw, &Rfc3339).ok().map(|ts| ts.date()))
}

fn invalid<E: de::Error>(raw: &str) -> E {
    E::custom(format!("invalid date `{raw}`, expected YYYY-MM-DD"))
}

/// `#[serde(with = "dates::calendar")]` on output records.
pub mod calendar {
    use super::*;

    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(date)
    }
}

/// `#[serde(default, with = "dates::calendar_opt")]` on request bodies.
pub mod calendar_opt {
    use super::*;

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Date>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => parse_date(&raw).map(Some).ok_or_else(|| invalid(&raw)),
            None => Ok(None),
        }
    }
}
