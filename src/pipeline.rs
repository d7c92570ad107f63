//! Top-level acquisition pipeline: cache, API fast path, scrape fallback,
//! merge.
//!
//! The two sources are independent and best effort. A failed API lookup or
//! an exhausted scrape degrades the corresponding fields instead of failing
//! the call; even a total miss yields a well-formed record with sentinel
//! identity and no builds.

use anyhow::Result;
use crate::api::{ApiCharacter, StructuredApiClient};
use crate::browser::BrowserLauncher;
use crate::cache::ResultCache;
use crate::config::Config;
use crate::model::{CharacterInfo, UNSPECIFIED};
use crate::scrape::selectors::{SelectorTable, UNITE_DB_V1};
use crate::scrape::{self, ScrapeResult};
use std::sync::Arc;
use tracing::{info, warn};

pub struct AcquisitionPipeline {
    config: Config,
    cache: ResultCache,
    api: StructuredApiClient,
    launcher: Arc<dyn BrowserLauncher>,
    table: SelectorTable,
}

impl AcquisitionPipeline {
    pub fn new(config: Config, launcher: Arc<dyn BrowserLauncher>) -> Result<Self> {
        let cache = ResultCache::new(config.cache_ttl);
        let api = StructuredApiClient::new(config.api_base.clone(), config.http_timeout)?;
        Ok(Self {
            config,
            cache,
            api,
            launcher,
            table: UNITE_DB_V1.clone(),
        })
    }

    /// Fetch the merged record for `name`.
    ///
    /// Never signals "not found": undeterminable identity fields fall back
    /// to the title-cased input and the "unspecified" sentinel.
    pub async fn fetch(&self, name: &str) -> Result<CharacterInfo> {
        let key = name.trim().to_lowercase();

        if let Some(hit) = self.cache.get(&key).await {
            info!("returning '{key}' from cache");
            return Ok(hit);
        }

        let api_data = self.api.lookup(&key).await;
        if api_data.is_none() {
            info!("no structured data for '{key}'; relying on the scrape");
        }

        let scraped = match scrape::scrape_character(
            self.launcher.as_ref(),
            &self.config,
            &self.table,
            &key,
        )
        .await
        {
            Ok(result) => Some(result),
            Err(err) => {
                warn!("scrape failed for '{key}': {err:#}");
                None
            }
        };

        let merged = merge(&key, api_data, scraped);
        self.cache.set(&key, merged.clone()).await;
        Ok(merged)
    }
}

fn merge(
    key: &str,
    api: Option<ApiCharacter>,
    scraped: Option<ScrapeResult>,
) -> CharacterInfo {
    let api = api.unwrap_or_default();
    let (damage_type, builds) = match scraped {
        Some(s) => (
            s.damage_type.unwrap_or_else(|| UNSPECIFIED.to_string()),
            s.builds,
        ),
        None => (UNSPECIFIED.to_string(), Vec::new()),
    };

    CharacterInfo {
        name: api.name.unwrap_or_else(|| title_case(key)),
        role: api.role.unwrap_or_else(|| UNSPECIFIED.to_string()),
        damage_type,
        image_url: api.assets.icon.unwrap_or_default(),
        builds,
    }
}

/// First letter upper-cased, the rest untouched.
fn title_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiAssets;
    use crate::model::{BuildRecord, MoveRef};
    use crate::scrape::extract::ExtractionReport;

    fn api_record() -> ApiCharacter {
        ApiCharacter {
            name: Some("Pikachu".to_string()),
            role: Some("Attacker".to_string()),
            assets: ApiAssets {
                icon: Some("https://img/pikachu.png".to_string()),
            },
        }
    }

    fn scrape_result() -> ScrapeResult {
        ScrapeResult {
            damage_type: Some("Special".to_string()),
            builds: vec![BuildRecord {
                build_name: Some("Boltcaster".to_string()),
                moves: vec![MoveRef {
                    name: "Thunderbolt".to_string(),
                    level: Some("7".to_string()),
                }],
                ..Default::default()
            }],
            report: ExtractionReport::default(),
        }
    }

    #[test]
    fn test_merge_prefers_both_sources() {
        let merged = merge("pikachu", Some(api_record()), Some(scrape_result()));
        assert_eq!(merged.name, "Pikachu");
        assert_eq!(merged.role, "Attacker");
        assert_eq!(merged.damage_type, "Special");
        assert_eq!(merged.image_url, "https://img/pikachu.png");
        assert_eq!(merged.builds.len(), 1);
    }

    #[test]
    fn test_merge_without_api_falls_back_to_input_and_sentinel() {
        let merged = merge("pikachu", None, Some(scrape_result()));
        assert_eq!(merged.name, "Pikachu");
        assert_eq!(merged.role, UNSPECIFIED);
        assert_eq!(merged.damage_type, "Special");
        assert_eq!(merged.image_url, "");
        assert_eq!(merged.builds.len(), 1);
    }

    #[test]
    fn test_merge_without_scrape_degrades_builds_only() {
        let merged = merge("pikachu", Some(api_record()), None);
        assert_eq!(merged.name, "Pikachu");
        assert_eq!(merged.role, "Attacker");
        assert_eq!(merged.damage_type, UNSPECIFIED);
        assert!(merged.builds.is_empty());
    }

    #[test]
    fn test_merge_total_miss_is_still_well_formed() {
        let merged = merge("mr. mime", None, None);
        assert_eq!(merged.name, "Mr. mime");
        assert_eq!(merged.role, UNSPECIFIED);
        assert_eq!(merged.damage_type, UNSPECIFIED);
        assert_eq!(merged.image_url, "");
        assert!(merged.builds.is_empty());
    }

    #[test]
    fn test_scraped_empty_damage_heading_becomes_sentinel() {
        let mut scraped = scrape_result();
        scraped.damage_type = None;
        let merged = merge("pikachu", None, Some(scraped));
        assert_eq!(merged.damage_type, UNSPECIFIED);
    }
}
