use super::store::PositionStore;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Where a source that has no stored position starts reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StartPosition {
    #[default]
    Beginning,
    End,
    /// Read back this many seconds from now.
    SecondsAgo(u64),
}

#[derive(Debug, thiserror::Error)]
#[error("start_position '{0}' is invalid! Must be `beginning`, `end`, or a non-negative integer")]
pub struct InvalidStartPosition(pub String);

impl StartPosition {
    pub fn initial_cursor(&self, now_ms: i64) -> i64 {
        match self {
            StartPosition::Beginning => 0,
            StartPosition::End => now_ms,
            StartPosition::SecondsAgo(secs) => {
                let back = i64::try_from(secs.saturating_mul(1000)).unwrap_or(i64::MAX);
                now_ms.saturating_sub(back).max(0)
            }
        }
    }
}

impl FromStr for StartPosition {
    type Err = InvalidStartPosition;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "beginning" => Ok(StartPosition::Beginning),
            "end" => Ok(StartPosition::End),
            other => other
                .parse::<u64>()
                .map(StartPosition::SecondsAgo)
                .map_err(|_| InvalidStartPosition(s.to_string())),
        }
    }
}

impl fmt::Display for StartPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartPosition::Beginning => f.write_str("beginning"),
            StartPosition::End => f.write_str("end"),
            StartPosition::SecondsAgo(secs) => write!(f, "{}", secs),
        }
    }
}

impl Serialize for StartPosition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StartPosition::SecondsAgo(secs) => serializer.serialize_u64(*secs),
            other => serializer.serialize_str(&other.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for StartPosition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct StartPositionVisitor;

        impl Visitor<'_> for StartPositionVisitor {
            type Value = StartPosition;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("`beginning`, `end`, or a non-negative integer")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<StartPosition, E> {
                Ok(StartPosition::SecondsAgo(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<StartPosition, E> {
                u64::try_from(v)
                    .map(StartPosition::SecondsAgo)
                    .map_err(|_| E::custom(InvalidStartPosition(v.to_string())))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<StartPosition, E> {
                Err(E::custom(InvalidStartPosition(v.to_string())))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<StartPosition, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(StartPositionVisitor)
    }
}

/// Assign an initial cursor to every source not already in the store.
/// Returns the number of sources added.
pub fn resolve_start_positions<S: AsRef<str>>(
    store: &mut PositionStore,
    sources: &[S],
    policy: StartPosition,
    now_ms: i64,
) -> usize {
    let mut added = 0;
    for source in sources {
        let source = source.as_ref();
        if store.contains(source) {
            continue;
        }
        let cursor = policy.initial_cursor(now_ms);
        debug!(source = %source, cursor, policy = %policy, "Assigned start position");
        store.insert(source, cursor);
        added += 1;
    }
    added
}
