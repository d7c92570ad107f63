//! CSS selectors and URL paths for unite-db.com.
//!
//! This table is the fragile external contract of the scrape: when the site
//! markup changes, bump the version and update entries here. Breakage shows
//! up as unmatched expectations in the extraction report, not as a crash.

/// Selector schema for a character detail page.
#[derive(Debug, Clone)]
pub struct SelectorTable {
    /// Schema version, carried in every extraction report.
    pub version: &'static str,
    /// General-info anchor whose presence means the default tab rendered.
    pub damage_anchor: &'static str,
    /// Damage-type heading inside the general-info block.
    pub damage_type: &'static str,
    /// Builds tab in the section nav.
    pub builds_tab: &'static str,
    /// One container per build panel.
    pub build_container: &'static str,
    pub build_title: &'static str,
    pub build_lane: &'static str,
    /// One element per selected ability within a build.
    pub ability: &'static str,
    /// Icon image inside an ability element.
    pub ability_icon: &'static str,
    /// Level label next to an ability icon.
    pub ability_level: &'static str,
    /// Icon as seen from a build container; the readiness predicate checks
    /// every container has at least one of these.
    pub ability_icon_ready: &'static str,
    /// Detail links of the non-optional held-item slots.
    pub held_item_link: &'static str,
    /// Detail link of the non-optional battle-item slot.
    pub battle_item_link: &'static str,
    pub emblem_link: &'static str,
}

/// unite-db.com markup as of the current site generation.
pub const UNITE_DB_V1: SelectorTable = SelectorTable {
    version: "unite-db/v1",
    damage_anchor: ".character-info .damage-wrapper h3",
    damage_type: ".damage-wrapper > h3",
    builds_tab: "#app > div.container > section > ul > li:nth-child(2)",
    build_container: "div.details.builds div.build",
    build_title: "h3.title",
    build_lane: "p.lane",
    ability: ".selected-abilities .ability",
    ability_icon: ".ability-icon",
    ability_level: "p.level",
    ability_icon_ready: ".selected-abilities .ability-icon",
    held_item_link: ".wrapper.held:not(.optional) section.item a.item-name",
    battle_item_link: ".wrapper.battle:not(.optional) section.item a.item-name",
    emblem_link: ".emblem-loadout a",
};

/// Character detail page for `name` (already lower-cased).
pub fn character_page_url(base: &str, name: &str) -> String {
    format!("{base}/pokemon/{name}")
}

/// Structured-API lookup for `name` (already lower-cased).
pub fn api_lookup_url(base: &str, name: &str) -> String {
    format!("{base}/p/{name}?type=auto")
}
