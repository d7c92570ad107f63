//! The scripted page-automation scrape of a character detail page.
//!
//! Four strictly ordered phases, each under the bounded-retry wrapper:
//! navigate, capture general info, switch to the builds tab, poll until every
//! build panel has rendered its ability icons. The browser is released on
//! every exit path; a failure at any phase aborts the whole attempt and the
//! pipeline degrades to empty scraped data.

pub mod extract;
pub mod selectors;

use anyhow::{Context, Result};
use crate::browser::{BrowserLauncher, PageSession};
use crate::config::Config;
use crate::model::BuildRecord;
use crate::retry::retry;
use crate::scrape::extract::ExtractionReport;
use crate::scrape::selectors::SelectorTable;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Scrape failures the caller may want to tell apart.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// A bounded poll wait hit its deadline.
    #[error("timed out after {timeout:?} waiting for {what}")]
    Timeout { what: String, timeout: Duration },
    /// The click target disappeared between its wait and the click.
    #[error("click target vanished: {selector}")]
    ClickTargetVanished { selector: String },
}

/// Everything a successful scrape produces.
#[derive(Debug, Clone)]
pub struct ScrapeResult {
    /// Damage-type heading text; `None` when the element rendered empty.
    pub damage_type: Option<String>,
    /// All builds on the page, zero-move ones included.
    pub builds: Vec<BuildRecord>,
    pub report: ExtractionReport,
}

/// Scrape `name`'s detail page through a freshly launched browser.
///
/// The browser and page are closed whichever phase fails.
pub async fn scrape_character(
    launcher: &dyn BrowserLauncher,
    config: &Config,
    table: &SelectorTable,
    name: &str,
) -> Result<ScrapeResult> {
    let browser = launcher
        .launch()
        .await
        .context("failed to acquire browser")?;

    let page = match browser.new_page().await {
        Ok(page) => page,
        Err(err) => {
            let _ = browser.close().await;
            return Err(err);
        }
    };

    let outcome = run_phases(page.as_ref(), config, table, name).await;

    let _ = page.close().await;
    let _ = browser.close().await;

    outcome
}

async fn run_phases(
    page: &dyn PageSession,
    config: &Config,
    table: &SelectorTable,
    name: &str,
) -> Result<ScrapeResult> {
    let attempts = config.retry_attempts;
    let delay = config.retry_delay;

    // Phase 1: load the character page.
    let url = selectors::character_page_url(&config.site_base, name);
    info!("navigating to {url}");
    retry("page.goto", attempts, delay, || {
        page.navigate(&url, config.navigation_timeout)
    })
    .await
    .context("character page did not load")?;

    // Phase 2: general info. The damage type lives on the default tab, so it
    // is captured before the tab switch removes it from the document.
    let anchor_probe = selector_probe(table.damage_anchor);
    retry("wait(damage-wrapper)", attempts, delay, || {
        wait_for_condition(
            page,
            &anchor_probe,
            table.damage_anchor,
            config.selector_timeout,
            config.poll_interval,
        )
    })
    .await
    .context("general-info block never appeared")?;

    let damage_type = extract::extract_damage_type(&page.html().await?, table)?;
    debug!("damage type: {damage_type:?}");

    // Phase 3: switch to the builds tab.
    let tab_probe = selector_probe(table.builds_tab);
    retry("wait(builds-tab)", attempts, delay, || {
        wait_for_condition(
            page,
            &tab_probe,
            table.builds_tab,
            config.selector_timeout,
            config.poll_interval,
        )
    })
    .await
    .context("builds tab never appeared")?;
    click(page, table.builds_tab).await?;

    // Phase 4: build panels render asynchronously and piecemeal after the
    // tab switch; poll until every container has its ability icons.
    let ready = readiness_script(table);
    retry("wait(builds-rendered)", attempts, delay, || {
        wait_for_condition(
            page,
            &ready,
            "fully rendered build panels",
            config.readiness_timeout,
            config.poll_interval,
        )
    })
    .await
    .context("build panels never finished rendering")?;

    let html = page.html().await.context("failed to snapshot the page")?;
    let (builds, report) = extract::extract_builds(&html, table)?;
    if !report.is_clean() {
        warn!(
            schema = %report.schema,
            unmatched = ?report.unmatched,
            "extraction left selector expectations unmatched"
        );
    }
    info!("extracted {} build(s) for '{name}'", builds.len());

    Ok(ScrapeResult {
        damage_type,
        builds,
        report,
    })
}

/// Poll `script` until it evaluates to `true`, at `interval`, up to
/// `timeout`. Probe errors are tolerated; only the deadline ends the wait.
async fn wait_for_condition(
    page: &dyn PageSession,
    script: &str,
    what: &str,
    timeout: Duration,
    interval: Duration,
) -> Result<()> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        match page.evaluate(script).await {
            Ok(value) if value.as_bool() == Some(true) => return Ok(()),
            Ok(_) => {}
            Err(err) => debug!("condition probe failed: {err:#}"),
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(ScrapeError::Timeout {
                what: what.to_string(),
                timeout,
            }
            .into());
        }
        tokio::time::sleep(interval).await;
    }
}

async fn click(page: &dyn PageSession, selector: &str) -> Result<()> {
    let script = format!(
        r#"(() => {{
            const el = document.querySelector('{}');
            if (el) {{ el.click(); return true; }}
            return false;
        }})()"#,
        js_escape(selector)
    );

    let clicked = page.evaluate(&script).await?;
    if clicked.as_bool() == Some(true) {
        Ok(())
    } else {
        Err(ScrapeError::ClickTargetVanished {
            selector: selector.to_string(),
        }
        .into())
    }
}

fn selector_probe(selector: &str) -> String {
    format!(r#"!!document.querySelector('{}')"#, js_escape(selector))
}

/// Predicate: at least one build container exists and every container has
/// its ability-icon selection rendered.
fn readiness_script(table: &SelectorTable) -> String {
    format!(
        r#"(() => {{
            const builds = document.querySelectorAll('{}');
            return builds.length > 0 &&
                [...builds].every(b => b.querySelector('{}'));
        }})()"#,
        js_escape(table.build_container),
        js_escape(table.ability_icon_ready)
    )
}

/// Escape a value for injection into a single-quoted JS string literal.
/// Escaped only into string positions, never code positions.
fn js_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 8);
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '`' => out.push_str("\\`"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => {}
            '<' => out.push_str("\\x3c"),
            '>' => out.push_str("\\x3e"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays a queue of evaluation results; empty queue answers `false`.
    struct ScriptedPage {
        responses: Mutex<VecDeque<Result<serde_json::Value>>>,
    }

    impl ScriptedPage {
        fn new(responses: Vec<Result<serde_json::Value>>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().collect()),
            }
        }
    }

    #[async_trait]
    impl PageSession for ScriptedPage {
        async fn navigate(&self, _url: &str, _timeout: Duration) -> Result<()> {
            Ok(())
        }

        async fn evaluate(&self, _script: &str) -> Result<serde_json::Value> {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(json!(false)))
        }

        async fn html(&self) -> Result<String> {
            Ok(String::new())
        }

        async fn close(self: Box<Self>) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_wait_succeeds_once_the_condition_turns_true() {
        let page = ScriptedPage::new(vec![Ok(json!(false)), Ok(json!(false)), Ok(json!(true))]);
        wait_for_condition(
            &page,
            "probe",
            "the thing",
            Duration::from_millis(200),
            Duration::from_millis(1),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_wait_timeout_is_distinguishable() {
        let page = ScriptedPage::new(Vec::new());
        let err = wait_for_condition(
            &page,
            "probe",
            "the thing",
            Duration::from_millis(10),
            Duration::from_millis(1),
        )
        .await
        .unwrap_err();

        let scrape_err = err.downcast_ref::<ScrapeError>().unwrap();
        assert!(matches!(scrape_err, ScrapeError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_wait_tolerates_probe_errors_until_deadline() {
        let page = ScriptedPage::new(vec![
            Err(anyhow::anyhow!("context destroyed")),
            Ok(json!(true)),
        ]);
        wait_for_condition(
            &page,
            "probe",
            "the thing",
            Duration::from_millis(200),
            Duration::from_millis(1),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_click_reports_a_vanished_target() {
        let page = ScriptedPage::new(vec![Ok(json!(false))]);
        let err = click(&page, ".gone").await.unwrap_err();
        let scrape_err = err.downcast_ref::<ScrapeError>().unwrap();
        assert!(matches!(
            scrape_err,
            ScrapeError::ClickTargetVanished { .. }
        ));
    }

    #[test]
    fn test_js_escape_guards_string_positions() {
        assert_eq!(js_escape("plain"), "plain");
        assert_eq!(js_escape("it's"), "it\\'s");
        assert_eq!(js_escape("a > b"), "a \\x3e b");
        assert!(!js_escape("</script>").contains("</script>"));
    }

    #[test]
    fn test_readiness_script_mentions_both_selectors() {
        let script = readiness_script(&selectors::UNITE_DB_V1);
        assert!(script.contains("querySelectorAll"));
        assert!(script.contains("selected-abilities"));
    }
}
