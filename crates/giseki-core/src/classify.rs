//! Keyword classification of raw record fields.
//!
//! Outcome strings, election names, and party labels arrive as free text.
//! Each is mapped onto a closed set of values using fixed keyword tables.

use giseki_types::{INDEPENDENT_PARTY, Party, Scope};

/// Outcome keywords that mark a record as a seat win.
pub const WIN_KEYWORDS: [&str; 6] = [
    "当選",
    "補欠当選",
    "繰上当選",
    "繰り上げ当選",
    "当せん",
    "再選",
];

/// Election-name markers for prefectural assemblies.
pub const PREFECTURAL_MARKERS: [&str; 4] = ["県議会", "都議会", "道議会", "府議会"];

/// Election-name markers for municipal assemblies.
pub const MUNICIPAL_MARKERS: [&str; 4] = ["市議会", "町議会", "村議会", "区議会"];

/// Party labels that mean "no party".
const BLANK_PARTY_LABELS: [&str; 6] = ["", "-", "nan", "na", "none", "なし"];

/// Whether an outcome string records a win.
///
/// Whitespace (including full-width spaces) is ignored, and any keyword
/// appearing anywhere in the text counts.
pub fn is_winning_outcome(outcome: &str) -> bool {
    let compact: String = outcome.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return false;
    }
    WIN_KEYWORDS.iter().any(|kw| compact.contains(kw))
}

/// Map an election name onto a council scope.
///
/// Prefectural markers are tested before municipal ones, so a name that
/// carries both is prefectural. Anything else falls back to
/// [`Scope::Combined`].
pub fn classify_scope(election_name: &str) -> Scope {
    if PREFECTURAL_MARKERS
        .iter()
        .any(|marker| election_name.contains(marker))
    {
        Scope::Prefectural
    } else if MUNICIPAL_MARKERS
        .iter()
        .any(|marker| election_name.contains(marker))
    {
        Scope::Municipal
    } else {
        Scope::Combined
    }
}

/// Normalise a raw party label.
///
/// Blank and placeholder labels, and any label mentioning `無所属`, become
/// the independent party. Other labels are trimmed.
pub fn normalize_party(label: &str) -> Party {
    let trimmed = label.trim();
    let lowered = trimmed.to_lowercase();
    if BLANK_PARTY_LABELS.contains(&lowered.as_str()) || trimmed.contains(INDEPENDENT_PARTY) {
        Party::independent()
    } else {
        Party::new(trimmed)
    }
}
