//! Build extraction from a rendered character page.
//!
//! Pure functions over an HTML snapshot taken after the builds tab has fully
//! rendered. Missing optional fields are tolerated per build; selector misses
//! that suggest the site changed are collected into an [`ExtractionReport`].

use anyhow::Result;
use crate::model::{BuildRecord, ItemRef, MoveRef};
use crate::scrape::selectors::SelectorTable;
use percent_encoding::percent_decode_str;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Diagnostics for a single extraction pass: which selector expectations
/// found no match. A clean report with zero builds means the page really has
/// none; an unclean one points at the selector table.
#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    /// Selector schema version used.
    pub schema: String,
    /// Unmatched expectations, as "context: selector".
    pub unmatched: Vec<String>,
}

impl ExtractionReport {
    pub fn is_clean(&self) -> bool {
        self.unmatched.is_empty()
    }

    fn miss(&mut self, context: &str, selector: &str) {
        self.unmatched.push(format!("{context}: {selector}"));
    }
}

/// Compiled selectors for one pass. The table entries are compile-time
/// constants; a parse failure here is a programming error and propagates.
struct Compiled {
    container: Selector,
    title: Selector,
    lane: Selector,
    ability: Selector,
    icon: Selector,
    level: Selector,
    held: Selector,
    battle: Selector,
    emblem: Selector,
}

impl Compiled {
    fn new(t: &SelectorTable) -> Result<Self> {
        Ok(Self {
            container: parse(t.build_container)?,
            title: parse(t.build_title)?,
            lane: parse(t.build_lane)?,
            ability: parse(t.ability)?,
            icon: parse(t.ability_icon)?,
            level: parse(t.ability_level)?,
            held: parse(t.held_item_link)?,
            battle: parse(t.battle_item_link)?,
            emblem: parse(t.emblem_link)?,
        })
    }
}

fn parse(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| anyhow::anyhow!("bad selector '{selector}': {e}"))
}

/// Extract the damage-type heading from the general-info block, if rendered.
pub fn extract_damage_type(html: &str, table: &SelectorTable) -> Result<Option<String>> {
    let sel = parse(table.damage_type)?;
    let document = Html::parse_document(html);
    Ok(document
        .select(&sel)
        .next()
        .map(element_text)
        .filter(|s| !s.is_empty()))
}

/// Extract every build on the page, in DOM order.
///
/// A build with zero moves is still emitted; display eligibility is the
/// caller's concern.
pub fn extract_builds(
    html: &str,
    table: &SelectorTable,
) -> Result<(Vec<BuildRecord>, ExtractionReport)> {
    let sels = Compiled::new(table)?;
    let mut report = ExtractionReport {
        schema: table.version.to_string(),
        unmatched: Vec::new(),
    };

    let document = Html::parse_document(html);
    let containers: Vec<ElementRef> = document.select(&sels.container).collect();
    if containers.is_empty() {
        report.miss("build containers", table.build_container);
    }

    let mut builds = Vec::with_capacity(containers.len());
    for container in containers {
        builds.push(extract_build(container, &sels, table, &mut report));
    }

    Ok((builds, report))
}

fn extract_build(
    el: ElementRef,
    sels: &Compiled,
    table: &SelectorTable,
    report: &mut ExtractionReport,
) -> BuildRecord {
    let build_name = first_text(el, &sels.title);
    if build_name.is_none() {
        report.miss("build title", table.build_title);
    }
    let path = first_text(el, &sels.lane);

    let mut moves = Vec::new();
    for ability in el.select(&sels.ability) {
        let Some(icon) = ability.select(&sels.icon).next() else {
            report.miss("ability icon", table.ability_icon);
            continue;
        };
        let Some(src) = icon.value().attr("src") else {
            report.miss("ability icon src attribute", table.ability_icon);
            continue;
        };
        let Some(name) = move_name_from_icon(src) else {
            continue;
        };
        let level = first_text(ability, &sels.level);
        moves.push(MoveRef { name, level });
    }

    let mut held_items = Vec::new();
    for link in el.select(&sels.held) {
        if let Some(name) = link.value().attr("href").and_then(item_name_from_href) {
            held_items.push(ItemRef { name });
        }
    }

    let battle_item = el
        .select(&sels.battle)
        .next()
        .and_then(|link| link.value().attr("href"))
        .and_then(item_name_from_href)
        .map(|name| ItemRef { name });

    let emblem_loadout_url = el
        .select(&sels.emblem)
        .next()
        .and_then(|link| link.value().attr("href"))
        .unwrap_or("")
        .to_string();

    BuildRecord {
        build_name,
        path,
        moves,
        held_items,
        battle_item,
        emblem_loadout_url,
    }
}

/// Derive a move name from its icon URL: last path segment, percent-decoded,
/// trailing `.png` stripped.
pub fn move_name_from_icon(src: &str) -> Option<String> {
    let file = last_path_segment(src)?;
    let decoded = percent_decode_str(&file).decode_utf8().ok()?;
    let name = decoded.trim_end_matches(".png").trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Derive an item name from its detail-link URL's trailing segment.
fn item_name_from_href(href: &str) -> Option<String> {
    let slug = last_path_segment(href)?;
    Some(normalize_slug(&slug))
}

/// Normalize a URL slug into a display name: hyphens become spaces, each
/// word capitalized ("razor-claw" → "Razor Claw").
pub fn normalize_slug(slug: &str) -> String {
    slug.split('-')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Last non-empty path segment of an absolute or site-relative URL, without
/// query or fragment.
fn last_path_segment(raw: &str) -> Option<String> {
    if let Ok(parsed) = Url::parse(raw) {
        return parsed
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).next_back())
            .map(str::to_string);
    }

    // Relative href: strip query/fragment by hand.
    let path = raw.split(['?', '#']).next().unwrap_or(raw);
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn first_text(scope: ElementRef, sel: &Selector) -> Option<String> {
    scope
        .select(sel)
        .next()
        .map(element_text)
        .filter(|s| !s.is_empty())
}

fn element_text(el: ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}
