//! Process configuration: compiled defaults with environment overrides.

use std::time::Duration;

/// Everything the pipeline needs injected at construction. No ambient
/// globals; tests swap endpoints and shrink timeouts through this.
#[derive(Debug, Clone)]
pub struct Config {
    /// Structured-API base, e.g. "https://uniteapi.dev".
    pub api_base: String,
    /// Character detail site base, e.g. "https://unite-db.com".
    pub site_base: String,
    pub cache_ttl: Duration,
    /// Per-request timeout for the structured-API lookup.
    pub http_timeout: Duration,
    /// Browser viewport (width, height).
    pub viewport: (u32, u32),
    /// Attempts per automation phase.
    pub retry_attempts: u32,
    /// Fixed delay between phase attempts.
    pub retry_delay: Duration,
    pub navigation_timeout: Duration,
    /// Ceiling for each selector wait (phases 2 and 3).
    pub selector_timeout: Duration,
    /// Ceiling for the builds-rendered poll (phase 4).
    pub readiness_timeout: Duration,
    /// Interval between in-page condition probes.
    pub poll_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: "https://uniteapi.dev".to_string(),
            site_base: "https://unite-db.com".to_string(),
            cache_ttl: Duration::from_secs(3600),
            http_timeout: Duration::from_secs(15),
            viewport: (1366, 900),
            retry_attempts: 2,
            retry_delay: Duration::from_secs(2),
            navigation_timeout: Duration::from_secs(45),
            selector_timeout: Duration::from_secs(30),
            readiness_timeout: Duration::from_secs(45),
            poll_interval: Duration::from_millis(250),
        }
    }
}

impl Config {
    /// Defaults with `UNITE_SCOUT_*` environment overrides applied.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(v) = std::env::var("UNITE_SCOUT_API_BASE") {
            cfg.api_base = v;
        }
        if let Ok(v) = std::env::var("UNITE_SCOUT_SITE_BASE") {
            cfg.site_base = v;
        }
        if let Some(secs) = std::env::var("UNITE_SCOUT_CACHE_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            cfg.cache_ttl = Duration::from_secs(secs);
        }
        cfg
    }
}
