use dotenv::dotenv;
use ipgeo_view::refresh::{
    RefreshPolicy, DEFAULT_DEBOUNCE, DEFAULT_MAX_TIMEOUT, DEFAULT_MIN_DWELL,
};
use std::env;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:5000";
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base: String,
    /// Where the startup record comes from; `-` is stdin.
    pub record: Option<String>,
    pub http_timeout: Duration,
    pub refresh: RefreshPolicy,
}

/// Loads `.env`, then reads the configuration from the environment.
pub fn init_app_config() -> AppConfig {
    dotenv().ok();
    AppConfig::from_lookup(|key| env::var(key).ok())
}

impl AppConfig {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_base = lookup("IPGEO_API_BASE")
            .map(|base| base.trim().to_string())
            .filter(|base| !base.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let record = lookup("IPGEO_RECORD").filter(|path| !path.trim().is_empty());

        let http_timeout = parse_or(&lookup, "IPGEO_HTTP_TIMEOUT", DEFAULT_HTTP_TIMEOUT, |raw| {
            raw.parse().ok().filter(|secs| *secs > 0).map(Duration::from_secs)
        });

        let refresh = RefreshPolicy {
            debounce: millis(&lookup, "IPGEO_REFRESH_DEBOUNCE_MS", DEFAULT_DEBOUNCE),
            min_dwell: millis(&lookup, "IPGEO_REFRESH_MIN_MS", DEFAULT_MIN_DWELL),
            max_timeout: millis(&lookup, "IPGEO_REFRESH_MAX_MS", DEFAULT_MAX_TIMEOUT),
        }
        .normalized();

        Self {
            api_base,
            record,
            http_timeout,
            refresh,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn millis(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: Duration) -> Duration {
    parse_or(lookup, key, default, |raw| {
        raw.parse().ok().map(Duration::from_millis)
    })
}

fn parse_or(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: Duration,
    parse: impl Fn(&str) -> Option<Duration>,
) -> Duration {
    let Some(raw) = lookup(key) else {
        return default;
    };
    parse(raw.trim()).unwrap_or_else(|| {
        log::warn!(
            "Ignoring invalid {key}={raw:?}, using {}ms",
            default.as_millis()
        );
        default
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = config(&[]);

        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.record, None);
        assert_eq!(config.http_timeout, DEFAULT_HTTP_TIMEOUT);
        assert_eq!(config.refresh, RefreshPolicy::default());
    }

    #[test]
    fn reads_overrides() {
        let config = config(&[
            ("IPGEO_API_BASE", "https://geo.example.net/"),
            ("IPGEO_RECORD", "record.json"),
            ("IPGEO_HTTP_TIMEOUT", "3"),
            ("IPGEO_REFRESH_MIN_MS", "250"),
            ("IPGEO_REFRESH_MAX_MS", "4000"),
            ("IPGEO_REFRESH_DEBOUNCE_MS", "0"),
        ]);

        assert_eq!(config.api_base, "https://geo.example.net/");
        assert_eq!(config.record.as_deref(), Some("record.json"));
        assert_eq!(config.http_timeout, Duration::from_secs(3));
        assert_eq!(config.refresh.min_dwell, Duration::from_millis(250));
        assert_eq!(config.refresh.max_timeout, Duration::from_millis(4_000));
        assert_eq!(config.refresh.debounce, Duration::ZERO);
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = config(&[
            ("IPGEO_HTTP_TIMEOUT", "0"),
            ("IPGEO_REFRESH_MIN_MS", "soon"),
            ("IPGEO_REFRESH_MAX_MS", "-5"),
        ]);

        assert_eq!(config.http_timeout, DEFAULT_HTTP_TIMEOUT);
        assert_eq!(config.refresh.min_dwell, DEFAULT_MIN_DWELL);
        assert_eq!(config.refresh.max_timeout, DEFAULT_MAX_TIMEOUT);
    }

    #[test]
    fn timeout_never_below_dwell() {
        let config = config(&[
            ("IPGEO_REFRESH_MIN_MS", "5000"),
            ("IPGEO_REFRESH_MAX_MS", "1000"),
        ]);

        assert_eq!(config.refresh.max_timeout, Duration::from_millis(5_000));
    }
}
