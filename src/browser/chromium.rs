//! Chromium implementation of the browser traits via chromiumoxide.

use super::{BrowserHandle, BrowserLauncher, PageSession};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Find the Chromium binary path.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. UNITE_SCOUT_CHROMIUM_PATH env
    if let Ok(p) = std::env::var("UNITE_SCOUT_CHROMIUM_PATH") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. System PATH
    if let Ok(path) = which::which("google-chrome") {
        return Some(path);
    }
    if let Ok(path) = which::which("chromium") {
        return Some(path);
    }
    if let Ok(path) = which::which("chromium-browser") {
        return Some(path);
    }

    // 3. Common macOS location
    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Launches one headless Chromium per scrape invocation, with a fixed
/// viewport.
pub struct ChromiumLauncher {
    viewport: (u32, u32),
}

impl ChromiumLauncher {
    pub fn new(viewport: (u32, u32)) -> Self {
        Self { viewport }
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserHandle>> {
        let chrome_path = find_chromium()
            .context("Chromium not found. Set UNITE_SCOUT_CHROMIUM_PATH or install chromium.")?;

        let (width, height) = self.viewport;
        let config = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .viewport(Viewport {
                width,
                height,
                ..Viewport::default()
            })
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking")
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        // Drain CDP events for the lifetime of this instance
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        Ok(Box::new(ChromiumHandle {
            browser,
            handler_task,
        }))
    }
}

/// A running Chromium instance and its event-drain task.
pub struct ChromiumHandle {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

#[async_trait]
impl BrowserHandle for ChromiumHandle {
    async fn new_page(&self) -> Result<Box<dyn PageSession>> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .context("failed to create new page")?;

        Ok(Box::new(ChromiumPage { page }))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let mut this = self;
        let _ = this.browser.close().await;
        this.handler_task.abort();
        Ok(())
    }
}

/// A single Chromium page.
pub struct ChromiumPage {
    page: Page,
}

#[async_trait]
impl PageSession for ChromiumPage {
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()> {
        // The load-event settle stays inside the ceiling: a dropped CDP
        // lifecycle event must not pend past the phase budget.
        let result = tokio::time::timeout(timeout, async {
            self.page
                .goto(url)
                .await
                .map_err(|e| anyhow::anyhow!("navigation failed: {e}"))?;
            // Late XHR-driven rendering is covered by the caller's
            // readiness poll.
            let _ = self.page.wait_for_navigation().await;
            Ok::<(), anyhow::Error>(())
        })
        .await;

        match result {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(e),
            Err(_) => bail!("navigation timed out after {}ms", timeout.as_millis()),
        }
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value> {
        let result = self
            .page
            .evaluate(script)
            .await
            .context("JS evaluation failed")?;

        result
            .into_value()
            .map_err(|e| anyhow::anyhow!("failed to convert JS result: {e:?}"))
    }

    async fn html(&self) -> Result<String> {
        let result = self
            .page
            .evaluate("document.documentElement.outerHTML")
            .await
            .context("failed to get HTML")?;

        let html: String = result
            .into_value()
            .map_err(|e| anyhow::anyhow!("failed to convert HTML result: {e:?}"))?;

        Ok(html)
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let _ = self.page.close().await;
        Ok(())
    }
}
