//! Highlight template catalog and keyword-driven selection.
//!
//! The templates are defined in `highlights.toml` and embedded in the binary
//! at compile time. Selection is driven by [`THEMES`], an ordered table from
//! Spanish theme keyword to template key.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

/// A themed content block used to populate one day of the schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    /// Stable catalog key (e.g. `culture`).
    pub key: String,
    pub title: String,
    pub summary: String,
    pub morning: String,
    pub afternoon: String,
    pub evening: String,
}

impl Highlight {
    /// Placeholder used when no template is available at all.
    pub fn free_exploration() -> Self {
        Self {
            key: "free".to_owned(),
            title: "Exploración libre".to_owned(),
            summary: String::new(),
            morning: String::new(),
            afternoon: String::new(),
            evening: String::new(),
        }
    }

    fn is_adventure(&self) -> bool {
        self.title.to_lowercase().contains("aventura")
    }
}

/// Theme keyword → template key. Matching is exact against lowercased
/// keywords.
pub const THEMES: &[(&str, &str)] = &[
    ("cultura", "culture"),
    ("gastronomía", "gastronomy"),
    ("aventura", "adventure"),
    ("relax", "wellness"),
    ("arte", "art"),
    ("historia", "history"),
];

/// Rotation used when the keywords mention no theme.
pub const DEFAULT_ROTATION: &[&str] = &["welcome", "culture", "gastronomy", "wellness"];

/// Travel styles that promote adventure templates to the front.
const ADVENTURE_STYLES: &[&str] = &["aventura", "experiencial"];

#[derive(Debug, Deserialize)]
struct Catalog {
    highlights: Vec<Highlight>,
}

static CATALOG_TOML: &str = include_str!("highlights.toml");

static CATALOG: LazyLock<Vec<Highlight>> = LazyLock::new(|| {
    let catalog: Catalog =
        toml::from_str(CATALOG_TOML).expect("embedded highlights.toml is invalid");
    catalog.highlights
});

/// All built-in templates, in catalog order.
///
/// # Panics
///
/// Panics on first use if the embedded TOML is malformed. The file is
/// compiled into the binary, so a passing test suite rules this out.
pub fn catalog() -> &'static [Highlight] {
    &CATALOG
}

/// Look up a template by its catalog key.
pub fn by_key(key: &str) -> Option<&'static Highlight> {
    catalog().iter().find(|h| h.key == key)
}

/// Template key for a theme keyword, if the keyword is a theme.
pub fn theme_for(keyword: &str) -> Option<&'static str> {
    THEMES
        .iter()
        .find(|(theme, _)| *theme == keyword)
        .map(|(_, key)| *key)
}

/// Choose the ordered highlight rotation for a trip.
///
/// Themes are appended in keyword order. Without any theme the default
/// rotation is used. Adventure-style trips get adventure templates first,
/// otherwise preserving order.
pub fn select(keywords: &BTreeSet<String>, travel_style: &str) -> Vec<&'static Highlight> {
    let mut selected: Vec<&'static Highlight> = keywords
        .iter()
        .filter_map(|kw| theme_for(kw))
        .filter_map(by_key)
        .collect();

    if selected.is_empty() {
        selected = DEFAULT_ROTATION.iter().filter_map(|key| by_key(key)).collect();
    }

    if ADVENTURE_STYLES.contains(&travel_style.to_lowercase().as_str()) {
        // Stable: non-adventure entries keep their relative order.
        selected.sort_by_key(|h| !h.is_adventure());
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords(words: &[&str]) -> BTreeSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn keys(selected: &[&Highlight]) -> Vec<String> {
        selected.iter().map(|h| h.key.clone()).collect()
    }

    #[test]
    fn catalog_has_all_templates() {
        let keys: Vec<_> = catalog().iter().map(|h| h.key.as_str()).collect();
        assert_eq!(
            keys,
            ["welcome", "culture", "gastronomy", "wellness", "adventure", "art", "history"]
        );
    }

    #[test]
    fn every_theme_points_at_a_template() {
        for (theme, key) in THEMES {
            assert!(by_key(key).is_some(), "theme {theme} maps to missing {key}");
        }
        for key in DEFAULT_ROTATION {
            assert!(by_key(key).is_some(), "default rotation lists missing {key}");
        }
    }

    #[test]
    fn no_theme_falls_back_to_default_rotation() {
        let selected = select(&keywords(&["roma", "hotel"]), "Premium");
        assert_eq!(keys(&selected), ["welcome", "culture", "gastronomy", "wellness"]);
    }

    #[test]
    fn themes_follow_keyword_order() {
        // BTreeSet order: arte < aventura < historia.
        let selected = select(&keywords(&["historia", "aventura", "arte", "madrid"]), "Premium");
        assert_eq!(keys(&selected), ["art", "adventure", "history"]);
    }

    #[test]
    fn relax_maps_to_wellness() {
        let selected = select(&keywords(&["relax"]), "Premium");
        assert_eq!(keys(&selected), ["wellness"]);
    }

    #[test]
    fn adventure_style_moves_adventure_first() {
        let selected = select(&keywords(&["arte", "aventura", "cultura"]), "Aventura");
        assert_eq!(keys(&selected), ["adventure", "art", "culture"]);

        let selected = select(&keywords(&["arte", "aventura", "cultura"]), "EXPERIENCIAL");
        assert_eq!(selected[0].key, "adventure");
    }

    #[test]
    fn other_styles_keep_keyword_order() {
        let selected = select(&keywords(&["arte", "aventura", "cultura"]), "Premium");
        assert_eq!(keys(&selected), ["art", "adventure", "culture"]);
    }

    #[test]
    fn theme_match_is_exact() {
        assert_eq!(theme_for("gastronomía"), Some("gastronomy"));
        assert_eq!(theme_for("gastronomia"), None);
        assert_eq!(theme_for("aventuras"), None);
    }
}
