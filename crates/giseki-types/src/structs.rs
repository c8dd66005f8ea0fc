//! Input-side structs: raw outcome records and the typed seat events the
//! normaliser produces from them.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::Scope;
use crate::ids::{Party, RegionId};

/// Seats held per party. Keys are unique; zero entries are never stored by
/// the ledger.
pub type SeatCounts = BTreeMap<Party, u32>;

/// Sum the seat counts, saturating at `u32::MAX`.
pub fn sum_seats(seats: &SeatCounts) -> u32 {
    seats.values().fold(0_u32, |acc, n| acc.saturating_add(*n))
}

// ---------------------------------------------------------------------------
// OutcomeRecord
// ---------------------------------------------------------------------------

/// One candidate's result as handed over by an external loader.
///
/// Only the fields the normaliser needs are modelled. Dates arrive already
/// parsed; a record whose date could not be parsed carries `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct OutcomeRecord {
    /// Outcome text, e.g. `当選` or `落選`.
    pub outcome: String,
    /// Party label as written in the source. Blank means independent.
    #[serde(default)]
    pub party: String,
    /// Election date, if the loader could parse one.
    #[serde(default)]
    pub election_date: Option<NaiveDate>,
    /// Text the region resolver matches against (source key or file name).
    pub source_region_text: String,
    /// Text the scope classifier matches against (election name).
    #[serde(default)]
    pub source_scope_text: String,
}

// ---------------------------------------------------------------------------
// SeatEvent
// ---------------------------------------------------------------------------

/// One election's seat outcome for a single (region, scope) pair.
///
/// At most one event exists per (region, scope, date): the normaliser merges
/// duplicate records for the same election by summing their counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SeatEvent {
    /// Region the seats belong to.
    pub region: RegionId,
    /// Council scope of the election.
    pub scope: Scope,
    /// Election date.
    pub date: NaiveDate,
    /// Seats won per party.
    pub seats: SeatCounts,
}

impl SeatEvent {
    /// Build an event from its parts.
    pub const fn new(region: RegionId, scope: Scope, date: NaiveDate, seats: SeatCounts) -> Self {
        Self {
            region,
            scope,
            date,
            seats,
        }
    }

    /// Total seats across all parties.
    pub fn total_seats(&self) -> u32 {
        sum_seats(&self.seats)
    }

    /// Calendar year of the election.
    pub fn year(&self) -> i32 {
        self.date.year()
    }

    /// Whether the event carries no seats at all.
    pub fn is_empty(&self) -> bool {
        self.total_seats() == 0
    }
}
