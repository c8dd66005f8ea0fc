//! Running seat tallies.
//!
//! Every place that keeps a per-party count goes through one of the two
//! tallies here, so the increment / decrement / delete-if-zero pattern exists
//! exactly once:
//!
//! - [`SeatTally`] -- exact `u32` counts with checked arithmetic. Used by the
//!   [`TermLedger`](crate::TermLedger) for region and party totals.
//! - [`DeltaTally`] -- fractional `f64` values. Used by the continuous
//!   timeline, where deltas are accumulated per date bucket and folded into
//!   running totals. Values within [`ZERO_EPSILON`] of zero are clamped to
//!   exactly zero and the entry is removed.

use std::collections::BTreeMap;

use giseki_types::{Party, SeatCounts, sum_seats};

use crate::LedgerError;

/// Magnitude below which a fractional tally entry counts as zero.
pub const ZERO_EPSILON: f64 = 1e-9;

// ---------------------------------------------------------------------------
// SeatTally
// ---------------------------------------------------------------------------

/// Exact per-party seat counts. Zero entries are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeatTally {
    seats: SeatCounts,
}

impl SeatTally {
    /// Create an empty tally.
    pub const fn new() -> Self {
        Self {
            seats: BTreeMap::new(),
        }
    }

    /// Seats held by `party`, zero if absent.
    pub fn get(&self, party: &Party) -> u32 {
        self.seats.get(party).copied().unwrap_or(0)
    }

    /// Sum over all parties.
    pub fn total(&self) -> u32 {
        sum_seats(&self.seats)
    }

    /// Return whether no party holds seats.
    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    /// Number of parties with seats.
    pub fn len(&self) -> usize {
        self.seats.len()
    }

    /// Read-only view of the counts.
    pub const fn as_counts(&self) -> &SeatCounts {
        &self.seats
    }

    /// Add every count in `seats`.
    ///
    /// The update is all-or-nothing: if any party would overflow, the tally
    /// is left untouched.
    pub fn add(&mut self, seats: &SeatCounts) -> Result<(), LedgerError> {
        let mut updated = Vec::with_capacity(seats.len());
        for (party, count) in seats {
            if *count == 0 {
                continue;
            }
            let next = self
                .get(party)
                .checked_add(*count)
                .ok_or(LedgerError::ArithmeticOverflow)?;
            updated.push((party, next));
        }
        for (party, next) in updated {
            self.seats.insert(party.clone(), next);
        }
        Ok(())
    }

    /// Subtract every count in `seats`, removing entries that reach zero.
    ///
    /// A count never goes below zero. Returns the number of seats that could
    /// not be subtracted because the tally held fewer; a balanced ledger
    /// always gets zero back.
    pub fn remove(&mut self, seats: &SeatCounts) -> u32 {
        let mut shortfall = 0_u32;
        for (party, count) in seats {
            let held = self.get(party);
            match held.checked_sub(*count) {
                Some(0) => {
                    self.seats.remove(party);
                }
                Some(next) => {
                    self.seats.insert(party.clone(), next);
                }
                None => {
                    let missing = count.saturating_sub(held);
                    shortfall = shortfall.saturating_add(missing);
                    self.seats.remove(party);
                }
            }
        }
        shortfall
    }
}

// ---------------------------------------------------------------------------
// DeltaTally
// ---------------------------------------------------------------------------

/// Fractional per-party values with a clamp-to-zero tolerance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeltaTally {
    values: BTreeMap<Party, f64>,
}

impl DeltaTally {
    /// Create an empty tally.
    pub const fn new() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    /// Value for `party`, zero if absent.
    pub fn get(&self, party: &Party) -> f64 {
        self.values.get(party).copied().unwrap_or(0.0)
    }

    /// Return whether every value is zero.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over non-zero entries in party order.
    pub fn iter(&self) -> impl Iterator<Item = (&Party, f64)> {
        self.values.iter().map(|(party, value)| (party, *value))
    }

    /// Add a signed delta. The entry is removed if the result is within
    /// [`ZERO_EPSILON`] of zero.
    pub fn add(&mut self, party: &Party, delta: f64) {
        let next = self.get(party) + delta;
        self.store(party, next);
    }

    /// Add a signed delta to a running total that must stay non-negative.
    ///
    /// Negative results clamp to zero; near-zero results are removed.
    pub fn accumulate(&mut self, party: &Party, delta: f64) {
        let next = (self.get(party) + delta).max(0.0);
        self.store(party, next);
    }

    fn store(&mut self, party: &Party, value: f64) {
        if value.abs() < ZERO_EPSILON {
            self.values.remove(party);
        } else {
            self.values.insert(party.clone(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(rows: &[(&str, u32)]) -> SeatCounts {
        rows.iter()
            .map(|(party, seats)| (Party::from(*party), *seats))
            .collect()
    }

    #[test]
    fn add_then_remove_leaves_empty_tally() {
        let mut tally = SeatTally::new();
        let seats = counts(&[("A", 3), ("B", 2)]);
        assert!(tally.add(&seats).is_ok());
        assert_eq!(tally.total(), 5);
        assert_eq!(tally.remove(&seats), 0);
        assert!(tally.is_empty());
    }

    #[test]
    fn zero_counts_are_not_stored() {
        let mut tally = SeatTally::new();
        assert!(tally.add(&counts(&[("A", 0), ("B", 1)])).is_ok());
        assert_eq!(tally.len(), 1);
        assert_eq!(tally.get(&Party::from("A")), 0);
    }

    #[test]
    fn overflow_leaves_tally_untouched() {
        let mut tally = SeatTally::new();
        assert!(tally.add(&counts(&[("A", 1), ("B", u32::MAX)])).is_ok());
        let result = tally.add(&counts(&[("A", 1), ("B", 1)]));
        assert!(matches!(result, Err(LedgerError::ArithmeticOverflow)));
        assert_eq!(tally.get(&Party::from("A")), 1);
    }

    #[test]
    fn remove_never_goes_negative() {
        let mut tally = SeatTally::new();
        assert!(tally.add(&counts(&[("A", 2)])).is_ok());
        let shortfall = tally.remove(&counts(&[("A", 5), ("Z", 1)]));
        assert_eq!(shortfall, 4);
        assert!(tally.is_empty());
    }

    #[test]
    fn delta_near_zero_is_removed() {
        let mut tally = DeltaTally::new();
        let party = Party::from("A");
        tally.add(&party, 0.1);
        tally.add(&party, 0.2);
        tally.add(&party, -0.3);
        assert!(tally.is_empty());
    }

    #[test]
    fn delta_keeps_negative_values() {
        let mut tally = DeltaTally::new();
        let party = Party::from("A");
        tally.add(&party, -3.0);
        assert!((tally.get(&party) + 3.0).abs() < ZERO_EPSILON);
    }

    #[test]
    fn accumulate_clamps_at_zero() {
        let mut running = DeltaTally::new();
        let party = Party::from("A");
        running.accumulate(&party, 2.0);
        running.accumulate(&party, -5.0);
        assert!(running.is_empty());
        assert!(running.get(&party).abs() < ZERO_EPSILON);
        running.accumulate(&party, 1.0);
        assert!((running.get(&party) - 1.0).abs() < ZERO_EPSILON);
    }
}
