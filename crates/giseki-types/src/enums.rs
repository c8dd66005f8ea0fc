//! Enumeration types shared across the Giseki workspace.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Council scope
// ---------------------------------------------------------------------------

/// The aggregation dimension a seat is tallied under.
///
/// `Prefectural` and `Municipal` separate the two council tiers. `Combined`
/// is both the classification fallback (an election name that matches neither
/// council tier) and the aggregate view that unions every tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Scope {
    /// All councils together.
    Combined,
    /// Prefectural assemblies (`県議会`, `都議会`, ...).
    Prefectural,
    /// Municipal assemblies (`市議会`, `町議会`, ...).
    Municipal,
}

impl Scope {
    /// Every scope, in declaration order.
    pub const ALL: [Self; 3] = [Self::Combined, Self::Prefectural, Self::Municipal];

    /// Stable lowercase name, matching the serde representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Combined => "combined",
            Self::Prefectural => "prefectural",
            Self::Municipal => "municipal",
        }
    }

    /// Whether an event classified under `event_scope` contributes to this
    /// scope's tally.
    ///
    /// `Combined` accepts everything; the council tiers accept only their own
    /// events.
    pub const fn accepts(self, event_scope: Self) -> bool {
        matches!(
            (self, event_scope),
            (Self::Combined, _)
                | (Self::Prefectural, Self::Prefectural)
                | (Self::Municipal, Self::Municipal)
        )
    }
}

impl core::fmt::Display for Scope {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Output ordering
// ---------------------------------------------------------------------------

/// Order in which snapshot years are listed in a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum YearOrder {
    /// Oldest year first.
    Ascending,
    /// Most recent year first (dashboard default).
    #[default]
    Descending,
}
