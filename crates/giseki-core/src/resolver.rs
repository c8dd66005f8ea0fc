//! Region resolution: free-text location strings to region keys.
//!
//! The normalizer does not know any geography. It asks a [`RegionResolver`]
//! for a key and drops the record when none comes back. [`GazetteerResolver`]
//! is the table-driven implementation used by the report binary; tests and
//! embedders can pass a closure instead.

use serde::Deserialize;

use giseki_types::RegionId;

/// Administrative-level suffixes stripped to build a short match pattern.
const REGION_SUFFIXES: [char; 4] = ['都', '道', '府', '県'];

/// Maps free text naming a place to a region key.
pub trait RegionResolver {
    /// Resolve `text` to a region, or `None` if it names no known region.
    fn resolve(&self, text: &str) -> Option<RegionId>;
}

impl<F> RegionResolver for F
where
    F: Fn(&str) -> Option<RegionId>,
{
    fn resolve(&self, text: &str) -> Option<RegionId> {
        self(text)
    }
}

/// One gazetteer row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GazetteerEntry {
    /// Region key returned on a match (e.g. `"13"`).
    pub code: String,
    /// Canonical name (e.g. `"東京都"`).
    pub name: String,
    /// Extra spellings that also resolve to `code`.
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Substring-matching resolver over a fixed list of regions.
///
/// Patterns are tried longest first so `京都府` is not captured by a
/// shorter pattern such as `京都`.
#[derive(Debug, Clone, Default)]
pub struct GazetteerResolver {
    patterns: Vec<(String, RegionId)>,
}

impl GazetteerResolver {
    /// Build a resolver from gazetteer rows.
    pub fn new(entries: &[GazetteerEntry]) -> Self {
        let mut patterns: Vec<(String, RegionId)> = Vec::new();
        for entry in entries {
            let code = RegionId::new(entry.code.trim());
            let name = entry.name.trim();
            if !name.is_empty() {
                patterns.push((name.to_owned(), code.clone()));
            }
            if let Some(short) = name
                .strip_suffix(REGION_SUFFIXES)
                .filter(|short| short.chars().count() >= 2)
            {
                patterns.push((short.to_owned(), code.clone()));
            }
            for alias in &entry.aliases {
                let alias = alias.trim();
                if !alias.is_empty() {
                    patterns.push((alias.to_owned(), code.clone()));
                }
            }
        }
        // Stable sort: equal-length patterns keep gazetteer order.
        patterns.sort_by_key(|(pattern, _)| core::cmp::Reverse(pattern.chars().count()));
        Self { patterns }
    }

    /// Number of match patterns (names, short names, and aliases).
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the resolver has no patterns and so resolves nothing.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl RegionResolver for GazetteerResolver {
    fn resolve(&self, text: &str) -> Option<RegionId> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        self.patterns
            .iter()
            .find(|(pattern, _)| text.contains(pattern.as_str()))
            .map(|(_, region)| region.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(code: &str, name: &str, aliases: &[&str]) -> GazetteerEntry {
        GazetteerEntry {
            code: code.to_owned(),
            name: name.to_owned(),
            aliases: aliases.iter().map(|a| (*a).to_owned()).collect(),
        }
    }

    fn gazetteer() -> GazetteerResolver {
        GazetteerResolver::new(&[
            entry("01", "北海道", &[]),
            entry("13", "東京都", &["Tokyo"]),
            entry("26", "京都府", &[]),
        ])
    }

    #[test]
    fn full_and_short_names_resolve() {
        let resolver = gazetteer();
        assert_eq!(resolver.resolve("東京都新宿区"), Some(RegionId::from("13")));
        assert_eq!(resolver.resolve("東京"), Some(RegionId::from("13")));
        assert_eq!(resolver.resolve("北海道札幌市"), Some(RegionId::from("01")));
        assert_eq!(resolver.resolve("  Tokyo  "), Some(RegionId::from("13")));
    }

    #[test]
    fn longest_pattern_wins() {
        let resolver = gazetteer();
        // `東京都` contains `京都` as a substring; the longer name must win.
        assert_eq!(resolver.resolve("東京都"), Some(RegionId::from("13")));
        assert_eq!(resolver.resolve("京都府京都市"), Some(RegionId::from("26")));
    }

    #[test]
    fn unknown_and_blank_text_is_unresolved() {
        let resolver = gazetteer();
        assert_eq!(resolver.resolve("Atlantis"), None);
        assert_eq!(resolver.resolve("   "), None);
    }

    #[test]
    fn closures_are_resolvers() {
        let resolver = |text: &str| (text == "R1").then(|| RegionId::from("R1"));
        assert_eq!(resolver.resolve("R1"), Some(RegionId::from("R1")));
        assert_eq!(resolver.resolve("R2"), None);
    }

    #[test]
    fn gazetteer_rows_deserialize_from_yaml() {
        let rows: Vec<GazetteerEntry> =
            serde_yml::from_str("- code: \"13\"\n  name: 東京都\n  aliases: [Tokyo]\n")
                .unwrap_or_default();
        assert_eq!(rows, vec![entry("13", "東京都", &["Tokyo"])]);
    }
}
