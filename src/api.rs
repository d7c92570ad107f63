//! Structured-API client — the fast-path identity lookup.
//!
//! One GET per pipeline invocation, no retry. Any failure (network, non-2xx,
//! malformed body) is "no structured data" and the pipeline carries on with
//! the scrape alone.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                          AppleWebKit/537.36 (KHTML, like Gecko) \
                          Chrome/131.0.0.0 Safari/537.36";

/// Partial identity record from the structured API. Every field is optional;
/// the merge fills the gaps.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiCharacter {
    pub name: Option<String>,
    pub role: Option<String>,
    #[serde(default)]
    pub assets: ApiAssets,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiAssets {
    pub icon: Option<String>,
}

pub struct StructuredApiClient {
    client: reqwest::Client,
    base: String,
}

impl StructuredApiClient {
    /// Construction is fallible so a broken TLS backend surfaces at startup
    /// instead of as a client that silently lost its timeout.
    pub fn new(base: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            base: base.into(),
        })
    }

    /// Look up `name` (already lower-cased) once.
    pub async fn lookup(&self, name: &str) -> Option<ApiCharacter> {
        let url = crate::scrape::selectors::api_lookup_url(&self.base, name);
        match self.fetch(&url).await {
            Ok(data) => {
                debug!("structured data for '{name}' retrieved from the API");
                Some(data)
            }
            Err(err) => {
                warn!("structured API returned nothing for '{name}': {err:#}");
                None
            }
        }
    }

    async fn fetch(&self, url: &str) -> anyhow::Result<ApiCharacter> {
        let resp = self.client.get(url).send().await?.error_for_status()?;
        Ok(resp.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_reports_builder_failures_instead_of_degrading() {
        let client = StructuredApiClient::new("https://uniteapi.dev", Duration::from_secs(5));
        assert!(client.is_ok());
    }

    #[test]
    fn test_missing_assets_deserialize_to_defaults() {
        let data: ApiCharacter = serde_json::from_str(r#"{"name":"Pikachu"}"#).unwrap();
        assert_eq!(data.name.as_deref(), Some("Pikachu"));
        assert!(data.role.is_none());
        assert!(data.assets.icon.is_none());
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let body = r#"{"name":"Pikachu","role":"Attacker","assets":{"icon":"u","extra":1},"stats":{}}"#;
        let data: ApiCharacter = serde_json::from_str(body).unwrap();
        assert_eq!(data.role.as_deref(), Some("Attacker"));
        assert_eq!(data.assets.icon.as_deref(), Some("u"));
    }
}
