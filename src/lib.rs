//! unite-scout — build lookup for Pokémon UNITE characters.
//!
//! Combines a fast structured-API lookup (baseline identity fields) with a
//! fallback headless-browser scrape of the character's unite-db.com detail
//! page, merges the two best-effort sources, and caches the result in-process
//! with a fixed TTL.

pub mod api;
pub mod browser;
pub mod cache;
pub mod config;
pub mod model;
pub mod pipeline;
pub mod retry;
pub mod scrape;
