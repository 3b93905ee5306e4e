use chrono::{DateTime, NaiveDateTime, SubsecRound, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Wire format of every timestamp in documents, credentials and proofs.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Default `validUntil` of an issued credential.
pub const FAR_FUTURE: &str = "9999-12-31T23:59:59Z";

/// UTC instant with second precision.
///
/// Serializes exactly as `yyyy-MM-ddTHH:mm:ssZ`. Signing payloads are rebuilt
/// from these values at verification time, so the rendering must never vary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtcTimestamp(DateTime<Utc>);

impl UtcTimestamp {
    pub fn now() -> Self {
        Self(Utc::now().trunc_subsecs(0))
    }

    pub fn far_future() -> Self {
        FAR_FUTURE
            .parse()
            .unwrap_or(Self(DateTime::<Utc>::MAX_UTC.trunc_subsecs(0)))
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt.trunc_subsecs(0))
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// True once this instant lies strictly before the current time.
    pub fn is_past(&self) -> bool {
        self.0 < Utc::now()
    }
}

impl From<DateTime<Utc>> for UtcTimestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_datetime(dt)
    }
}

impl fmt::Display for UtcTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIMESTAMP_FORMAT))
    }
}

impl FromStr for UtcTimestamp {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT) {
            Ok(naive) => Ok(Self(Utc.from_utc_datetime(&naive))),
            Err(_) => DateTime::parse_from_rfc3339(s)
                .map(|dt| Self::from_datetime(dt.with_timezone(&Utc))),
        }
    }
}

impl Serialize for UtcTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for UtcTimestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
