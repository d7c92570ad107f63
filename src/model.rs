//! Data model for merged character results.

use serde::{Deserialize, Serialize};

/// Placeholder for fields that could not be determined from either source.
/// Distinct from absence: the field is always present, just unknowable.
pub const UNSPECIFIED: &str = "unspecified";

/// Merged character record returned by the acquisition pipeline.
///
/// Identity fields come from the structured API when available; `damage_type`
/// and `builds` come from the scrape. Constructed once per pipeline
/// invocation and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterInfo {
    pub name: String,
    pub role: String,
    pub damage_type: String,
    /// Icon URL from the structured API; empty when unavailable.
    pub image_url: String,
    /// All scraped builds, including ones with no moves yet.
    pub builds: Vec<BuildRecord>,
}

impl CharacterInfo {
    /// Builds worth showing: the ones with at least one move.
    ///
    /// Incomplete builds stay in `builds` so callers can tell "site has more
    /// builds than we can display" apart from "site has no more builds".
    pub fn displayable_builds(&self) -> impl Iterator<Item = &BuildRecord> {
        self.builds.iter().filter(|b| b.is_displayable())
    }
}

/// One ability/item loadout scraped from a build panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRecord {
    pub build_name: Option<String>,
    /// Lane/path subtitle, e.g. "Top lane".
    pub path: Option<String>,
    /// Moves in visual (DOM) order.
    pub moves: Vec<MoveRef>,
    pub held_items: Vec<ItemRef>,
    pub battle_item: Option<ItemRef>,
    /// Emblem-configuration link; empty when the build specifies none.
    pub emblem_loadout_url: String,
}

impl BuildRecord {
    pub fn is_displayable(&self) -> bool {
        !self.moves.is_empty()
    }
}

/// A move, paired with its unlock-level label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRef {
    pub name: String,
    /// In-game unlock tier as shown on the page. Free-form text.
    pub level: Option<String>,
}

/// A held or battle item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRef {
    pub name: String,
}
