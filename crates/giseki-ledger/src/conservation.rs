//! Seat conservation checks for the term ledger.
//!
//! The ledger keeps three views of the same seats: the live terms, the
//! per-region tallies, and the global per-party totals. For every party P:
//!
//! ```text
//! party_totals[P] == sum(region_tally[R][P] for R) == sum(term.seats[P] for live terms)
//! ```
//!
//! The incremental bookkeeping keeps this true by construction; the check
//! recomputes both sums from scratch so a broken update shows up as a
//! [`LedgerAnomaly`] instead of a silently wrong snapshot.

use std::collections::{BTreeMap, BTreeSet};

use giseki_types::{Party, SeatCounts};

use crate::LedgerAnomaly;
use crate::tally::SeatTally;
use crate::term::Term;

/// The result of a conservation check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConservationResult {
    /// All three views agree.
    Balanced,
    /// At least one party disagrees between the views.
    Anomaly(LedgerAnomaly),
}

impl ConservationResult {
    /// Whether the check passed.
    pub const fn is_balanced(&self) -> bool {
        matches!(self, Self::Balanced)
    }
}

/// Recompute per-party sums from terms and region tallies and compare them
/// with the running party totals.
pub fn verify_conservation<'a>(
    terms: impl IntoIterator<Item = &'a Term>,
    regions: impl IntoIterator<Item = &'a SeatTally>,
    party_totals: &SeatCounts,
) -> ConservationResult {
    let mut from_terms: BTreeMap<&Party, u32> = BTreeMap::new();
    for term in terms {
        for (party, seats) in &term.seats {
            if *seats == 0 {
                continue;
            }
            let sum = from_terms.entry(party).or_insert(0);
            *sum = match sum.checked_add(*seats) {
                Some(val) => val,
                None => return overflow_anomaly(party),
            };
        }
    }

    let mut from_regions: BTreeMap<&Party, u32> = BTreeMap::new();
    for tally in regions {
        for (party, seats) in tally.as_counts() {
            let sum = from_regions.entry(party).or_insert(0);
            *sum = match sum.checked_add(*seats) {
                Some(val) => val,
                None => return overflow_anomaly(party),
            };
        }
    }

    let all_parties: BTreeSet<&Party> = party_totals
        .keys()
        .chain(from_terms.keys().copied())
        .chain(from_regions.keys().copied())
        .collect();

    let mut imbalances: BTreeMap<Party, (u32, u32)> = BTreeMap::new();
    for party in all_parties {
        let recorded = party_totals.get(party).copied().unwrap_or(0);
        let by_terms = from_terms.get(party).copied().unwrap_or(0);
        let by_regions = from_regions.get(party).copied().unwrap_or(0);
        if recorded != by_terms || recorded != by_regions {
            let recomputed = if recorded == by_terms { by_regions } else { by_terms };
            imbalances.insert(party.clone(), (recorded, recomputed));
        }
    }

    if imbalances.is_empty() {
        ConservationResult::Balanced
    } else {
        let count = imbalances.len();
        ConservationResult::Anomaly(LedgerAnomaly {
            imbalances,
            message: format!("SEAT_ANOMALY: running totals disagree for {count} party(ies)"),
        })
    }
}

/// Construct an anomaly result for arithmetic overflow during summation.
fn overflow_anomaly(party: &Party) -> ConservationResult {
    let mut imbalances = BTreeMap::new();
    imbalances.insert(party.clone(), (0, 0));
    ConservationResult::Anomaly(LedgerAnomaly {
        imbalances,
        message: format!("SEAT_ANOMALY: arithmetic overflow while summing {party}"),
    })
}
