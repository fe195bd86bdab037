use chrono::{DateTime, Local};
use std::fmt;

/// Hour-bucketed cache key: `{prefix}image_{YYYYMMDDHH}` in local time.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn for_hour(prefix: &str, now: DateTime<Local>) -> Self {
        Self(format!("{}image_{}", prefix, now.format("%Y%m%d%H")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
