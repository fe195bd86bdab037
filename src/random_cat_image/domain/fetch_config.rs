use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.ai-cats.net/v1/cat";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str = concat!("random_cat_image/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_CACHE_DURATION_MINUTES: u64 = 60;
pub const DEFAULT_CACHE_KEY_PREFIX: &str = "random_cat_image_";
/// Longest accepted HTTP timeout; larger values fall through like zero does.
pub const MAX_TIMEOUT_SECONDS: u64 = 24 * 60 * 60;

pub const ENV_API_URL: &str = "RANDOM_CAT_API_URL";
pub const ENV_CACHE_ENABLED: &str = "RANDOM_CAT_CACHE_ENABLED";
pub const ENV_CACHE_DURATION: &str = "RANDOM_CAT_CACHE_DURATION";
pub const ENV_HTTP_TIMEOUT: &str = "RANDOM_CAT_HTTP_TIMEOUT";
pub const ENV_USER_AGENT: &str = "RANDOM_CAT_USER_AGENT";

/// Effective settings for a single fetch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FetchConfig {
    pub endpoint: String,
    pub timeout_seconds: u64,
    pub user_agent: String,
    pub cache_enabled: bool,
    pub cache_duration_minutes: u64,
    pub cache_key_prefix: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            cache_enabled: false,
            cache_duration_minutes: DEFAULT_CACHE_DURATION_MINUTES,
            cache_key_prefix: DEFAULT_CACHE_KEY_PREFIX.to_string(),
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.clamp(1, MAX_TIMEOUT_SECONDS))
    }

    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.cache_duration_minutes.min(i64::MAX as u64 / 60_000) as i64)
    }
}

/// Any subset of [`FetchConfig`]. Used for caller overrides, config files
/// and the environment tier alike.
///
/// Deserializes from the flat field names or from the nested package shape
/// `{"api_url", "cache": {"enabled", "duration", "key_prefix"}, "http": {"timeout", "user_agent"}}`.
/// A flat field wins over its nested counterpart.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawPartialFetchConfig")]
pub struct PartialFetchConfig {
    pub endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub user_agent: Option<String>,
    pub cache_enabled: Option<bool>,
    pub cache_duration_minutes: Option<u64>,
    pub cache_key_prefix: Option<String>,
}

impl PartialFetchConfig {
    /// Field-by-field merge where `self` wins over `lower`.
    pub fn over(self, lower: PartialFetchConfig) -> PartialFetchConfig {
        let timeout_seconds = self.valid_timeout().or(lower.valid_timeout());
        PartialFetchConfig {
            endpoint: self.endpoint.or(lower.endpoint),
            timeout_seconds,
            user_agent: self.user_agent.or(lower.user_agent),
            cache_enabled: self.cache_enabled.or(lower.cache_enabled),
            cache_duration_minutes: self.cache_duration_minutes.or(lower.cache_duration_minutes),
            cache_key_prefix: self.cache_key_prefix.or(lower.cache_key_prefix),
        }
    }

    pub fn apply_to(self, base: FetchConfig) -> FetchConfig {
        let timeout_seconds = self.valid_timeout().unwrap_or(base.timeout_seconds);
        FetchConfig {
            endpoint: self.endpoint.unwrap_or(base.endpoint),
            timeout_seconds,
            user_agent: self.user_agent.unwrap_or(base.user_agent),
            cache_enabled: self.cache_enabled.unwrap_or(base.cache_enabled),
            cache_duration_minutes: self.cache_duration_minutes.unwrap_or(base.cache_duration_minutes),
            cache_key_prefix: self.cache_key_prefix.unwrap_or(base.cache_key_prefix),
        }
    }

    // Zero or oversized timeouts are not values, they fall through to the next tier.
    fn valid_timeout(&self) -> Option<u64> {
        self.timeout_seconds.filter(|secs| match *secs {
            0 => false,
            secs if secs > MAX_TIMEOUT_SECONDS => {
                tracing::warn!(timeout_seconds = secs, max = MAX_TIMEOUT_SECONDS, "ignoring oversized timeout");
                false
            }
            _ => true,
        })
    }

    /// Reads the `RANDOM_CAT_*` variables through `lookup`.
    /// Empty or unparseable values are skipped.
    pub fn from_lookup<F>(lookup: F) -> PartialFetchConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        PartialFetchConfig {
            endpoint: read(ENV_API_URL),
            timeout_seconds: read(ENV_HTTP_TIMEOUT).and_then(|v| parse_number(ENV_HTTP_TIMEOUT, &v)),
            user_agent: read(ENV_USER_AGENT),
            cache_enabled: read(ENV_CACHE_ENABLED).and_then(|v| parse_flag(ENV_CACHE_ENABLED, &v)),
            cache_duration_minutes: read(ENV_CACHE_DURATION).and_then(|v| parse_number(ENV_CACHE_DURATION, &v)),
            cache_key_prefix: None,
        }
    }

    pub fn from_env() -> PartialFetchConfig {
        Self::from_lookup(|name| std::env::var(name).ok())
    }
}

#[derive(Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawPartialFetchConfig {
    #[serde(alias = "api_url")]
    endpoint: Option<String>,
    timeout_seconds: Option<u64>,
    user_agent: Option<String>,
    cache_enabled: Option<bool>,
    cache_duration_minutes: Option<u64>,
    cache_key_prefix: Option<String>,
    cache: RawCacheSection,
    http: RawHttpSection,
}

#[derive(Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawCacheSection {
    enabled: Option<bool>,
    duration: Option<u64>,
    key_prefix: Option<String>,
}

#[derive(Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawHttpSection {
    timeout: Option<u64>,
    user_agent: Option<String>,
}

impl From<RawPartialFetchConfig> for PartialFetchConfig {
    fn from(raw: RawPartialFetchConfig) -> Self {
        PartialFetchConfig {
            endpoint: raw.endpoint,
            timeout_seconds: raw.timeout_seconds.or(raw.http.timeout),
            user_agent: raw.user_agent.or(raw.http.user_agent),
            cache_enabled: raw.cache_enabled.or(raw.cache.enabled),
            cache_duration_minutes: raw.cache_duration_minutes.or(raw.cache.duration),
            cache_key_prefix: raw.cache_key_prefix.or(raw.cache.key_prefix),
        }
    }
}

fn parse_flag(name: &str, raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "(true)" | "1" | "yes" | "on" => Some(true),
        "false" | "(false)" | "0" | "no" | "off" => Some(false),
        _ => {
            tracing::warn!(variable = name, value = raw, "ignoring unrecognised boolean");
            None
        }
    }
}

fn parse_number(name: &str, raw: &str) -> Option<u64> {
    match raw.parse::<u64>() {
        Ok(n) => Some(n),
        Err(e) => {
            tracing::warn!(variable = name, value = raw, error = %e, "ignoring non-numeric value");
            None
        }
    }
}
