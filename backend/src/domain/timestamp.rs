//! Serde helpers for `createdAt` fields.
//!
//! Timestamps are written as RFC 3339 strings. On read, the epoch object form
//! emitted by document databases (`{"seconds": .., "nanoseconds": ..}`, or the
//! underscore-prefixed variant produced by admin SDK exports) is accepted too,
//! so documents written by external tooling decode unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum TimestampRepr {
    Rfc3339(DateTime<Utc>),
    Epoch {
        #[serde(alias = "_seconds")]
        seconds: i64,
        #[serde(default, alias = "_nanoseconds", alias = "nanos")]
        nanoseconds: u32,
    },
}

impl TimestampRepr {
    fn into_datetime<E: serde::de::Error>(self) -> Result<DateTime<Utc>, E> {
        match self {
            Self::Rfc3339(value) => Ok(value),
            Self::Epoch {
                seconds,
                nanoseconds,
            } => DateTime::from_timestamp(seconds, nanoseconds).ok_or_else(|| {
                E::custom(format!(
                    "timestamp out of range: {seconds}s {nanoseconds}ns"
                ))
            }),
        }
    }
}

/// Serialise a timestamp as RFC 3339.
pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    value.serialize(serializer)
}

/// Deserialise a timestamp from RFC 3339 text or an epoch object.
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    TimestampRepr::deserialize(deserializer)?.into_datetime()
}

/// Variant of the helpers for optional timestamps.
///
/// Pair with `#[serde(default)]` so a missing field decodes as `None`.
pub mod option {
    use super::*;

    /// Serialise an optional timestamp; `None` becomes `null`.
    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        value.serialize(serializer)
    }

    /// Deserialise an optional timestamp; `null` becomes `None`.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        Option::<TimestampRepr>::deserialize(deserializer)?
            .map(TimestampRepr::into_datetime)
            .transpose()
    }
}
