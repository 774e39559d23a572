//! Shared utility functions.

/// Serialize a [`Duration`](std::time::Duration) as integer milliseconds.
///
/// Used with `#[serde(with = "crate::util::duration_ms")]` so JSON output
/// reads `"elapsed_ms": 1234` instead of a `{secs, nanos}` pair.
pub mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}
