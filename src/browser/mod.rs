//! Browser abstraction for the page-automation scrape.
//!
//! `BrowserLauncher` produces one `BrowserHandle` per scrape invocation;
//! a handle opens `PageSession` tabs. The chromium module provides the real
//! implementation; tests script a fake.

pub mod chromium;

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Launches a fresh browser instance. One instance per scrape invocation,
/// released on every exit path.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserHandle>>;
}

/// A running browser instance.
#[async_trait]
pub trait BrowserHandle: Send + Sync {
    /// Open a fresh page (tab).
    async fn new_page(&self) -> Result<Box<dyn PageSession>>;
    /// Shut the browser down, closing all pages.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// A single page. All methods take `&self`; implementations use interior
/// mutability where they need state.
#[async_trait]
pub trait PageSession: Send + Sync {
    /// Navigate and wait for the document to load, within `timeout`.
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()>;
    /// Evaluate JavaScript in the page and return its JSON value.
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value>;
    /// Snapshot of the rendered document markup.
    async fn html(&self) -> Result<String>;
    /// Close this page.
    async fn close(self: Box<Self>) -> Result<()>;
}
