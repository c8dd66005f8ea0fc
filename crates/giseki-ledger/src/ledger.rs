//! The term ledger: the live seat state of every (region, scope) pair.
//!
//! The [`TermLedger`] owns a map from [`TermKey`] to at most one live
//! [`Term`], plus running totals maintained incrementally as terms enter and
//! leave:
//!
//! - per-region party tallies (the sum of the region's live terms across
//!   every scope filed in this ledger),
//! - the global per-party total (the sum of every live term).
//!
//! # Design
//!
//! - **Ordered**: events must be applied in non-decreasing date order. An
//!   earlier event is rejected with [`LedgerError::OutOfOrder`]; the ledger
//!   cannot undo an applied event.
//! - **Supersession**: a newer election for a key always closes the live
//!   term, whether or not its nominal expiry has passed.
//! - **Expiry**: terms close on their nominal expiry (`[start, expiry)`).
//! - **Encapsulated**: the internal maps are never handed out mutably;
//!   callers see [`Snapshot`] values and read-only term references.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use giseki_types::{
    Party, PartyShare, RegionId, Scope, SeatCounts, SeatEvent, Snapshot, sum_seats,
};

use crate::conservation::{ConservationResult, verify_conservation};
use crate::tally::SeatTally;
use crate::term::{ClosedTerm, Term, TermClosure, TermKey};
use crate::LedgerError;

/// Live seat terms and their running totals.
#[derive(Debug, Clone)]
pub struct TermLedger {
    /// Nominal term length in calendar years.
    nominal_years: u32,
    /// At most one live term per key.
    terms: BTreeMap<TermKey, Term>,
    /// Per-region party tallies. Regions with no seats are absent.
    regions: BTreeMap<RegionId, SeatTally>,
    /// Global per-party totals.
    party_totals: SeatTally,
    /// Date of the most recently applied event.
    last_applied: Option<NaiveDate>,
}

impl TermLedger {
    /// Create an empty ledger with the given nominal term length.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidTermLength`] if `nominal_years` is zero.
    pub fn new(nominal_years: u32) -> Result<Self, LedgerError> {
        if nominal_years == 0 {
            return Err(LedgerError::InvalidTermLength {
                years: nominal_years,
            });
        }
        Ok(Self {
            nominal_years,
            terms: BTreeMap::new(),
            regions: BTreeMap::new(),
            party_totals: SeatTally::new(),
            last_applied: None,
        })
    }

    /// Nominal term length in calendar years.
    pub const fn nominal_years(&self) -> u32 {
        self.nominal_years
    }

    /// Number of live terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Return whether no term is live.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Date of the most recently applied event.
    pub const fn last_applied(&self) -> Option<NaiveDate> {
        self.last_applied
    }

    /// The live term for a region and scope.
    pub fn term(&self, region: &RegionId, scope: Scope) -> Option<&Term> {
        self.terms.get(&TermKey::new(region.clone(), scope))
    }

    /// Iterate over live terms in key order.
    pub fn live_terms(&self) -> impl Iterator<Item = &Term> {
        self.terms.values()
    }

    /// Global per-party totals.
    pub const fn party_totals(&self) -> &SeatCounts {
        self.party_totals.as_counts()
    }

    /// Seats held by `party` across all regions.
    pub fn party_total(&self, party: &Party) -> u32 {
        self.party_totals.get(party)
    }

    /// Per-party seats held in `region`, summed over its live terms.
    pub fn region_seats(&self, region: &RegionId) -> Option<&SeatCounts> {
        self.regions.get(region).map(SeatTally::as_counts)
    }

    /// Apply an election outcome.
    ///
    /// Closes the live term for the event's key (if any) as of the event
    /// date, then opens a new term from the event. Returns the superseded
    /// term.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::OutOfOrder`] if the event predates the last applied
    ///   event.
    /// - [`LedgerError::EmptyEvent`] if the event carries no seats.
    /// - [`LedgerError::ArithmeticOverflow`] if a running total overflows.
    ///
    /// The ledger is unchanged when an error is returned.
    pub fn apply(&mut self, event: &SeatEvent) -> Result<Option<ClosedTerm>, LedgerError> {
        if let Some(last) = self.last_applied.filter(|last| event.date < *last) {
            tracing::error!(
                region = %event.region,
                scope = %event.scope,
                last = %last,
                attempted = %event.date,
                "seat event applied out of chronological order"
            );
            return Err(LedgerError::OutOfOrder {
                last,
                attempted: event.date,
            });
        }
        if event.is_empty() {
            return Err(LedgerError::EmptyEvent {
                region: event.region.clone(),
                scope: event.scope,
                date: event.date,
            });
        }

        let term = Term::from_event(event, self.nominal_years)?;
        let superseded = self.terms.remove(&term.key);
        if let Some(old) = &superseded {
            self.release(&old.key.region, &old.seats);
        }

        if let Err(err) = self.credit(&term.key.region, &term.seats) {
            // Put the superseded term back so the ledger is unchanged.
            if let Some(old) = superseded {
                self.credit(&old.key.region, &old.seats)?;
                self.terms.insert(old.key.clone(), old);
            }
            return Err(err);
        }

        self.last_applied = Some(event.date);
        let closed = superseded.map(|old| {
            tracing::debug!(
                key = %old.key,
                started = %old.start,
                nominal_expiry = %old.expiry,
                superseded_on = %event.date,
                seats = old.total_seats,
                "term superseded"
            );
            old.close(event.date, TermClosure::Superseded)
        });
        self.terms.insert(term.key.clone(), term);
        Ok(closed)
    }

    /// Close every live term whose expiry is strictly before `date`.
    ///
    /// Returns the closed terms ordered by expiry, then key.
    pub fn expire_as_of(&mut self, date: NaiveDate) -> Vec<ClosedTerm> {
        let mut due: Vec<(NaiveDate, TermKey)> = self
            .terms
            .values()
            .filter(|term| term.expiry < date)
            .map(|term| (term.expiry, term.key.clone()))
            .collect();
        due.sort();

        let mut closed = Vec::with_capacity(due.len());
        for (expiry, key) in due {
            let Some(term) = self.terms.remove(&key) else {
                continue;
            };
            self.release(&term.key.region, &term.seats);
            tracing::debug!(
                key = %term.key,
                started = %term.start,
                expired_on = %expiry,
                seats = term.total_seats,
                "term expired"
            );
            closed.push(term.close(expiry, TermClosure::Expired));
        }
        closed
    }

    /// Read-only view of the current totals.
    pub fn snapshot(&self) -> Snapshot {
        let mut snapshot = Snapshot {
            party_totals: self.party_totals.as_counts().clone(),
            ..Snapshot::default()
        };
        for (region, tally) in &self.regions {
            let total = tally.total();
            if total == 0 {
                continue;
            }
            let shares = tally
                .as_counts()
                .iter()
                .map(|(party, seats)| (party.clone(), PartyShare::new(*seats, total)))
                .collect();
            snapshot.region_totals.insert(region.clone(), total);
            snapshot.region_shares.insert(region.clone(), shares);
        }
        snapshot
    }

    /// Check that the running totals agree with the live terms.
    pub fn verify_conservation(&self) -> ConservationResult {
        verify_conservation(
            self.terms.values(),
            self.regions.values(),
            self.party_totals.as_counts(),
        )
    }

    /// Add seats to the region and party totals, all-or-nothing.
    fn credit(&mut self, region: &RegionId, seats: &SeatCounts) -> Result<(), LedgerError> {
        self.regions.entry(region.clone()).or_default().add(seats)?;
        if let Err(err) = self.party_totals.add(seats) {
            self.release_region(region, seats);
            return Err(err);
        }
        Ok(())
    }

    /// Subtract seats from the region and party totals.
    fn release(&mut self, region: &RegionId, seats: &SeatCounts) {
        let shortfall = self
            .release_region(region, seats)
            .saturating_add(self.party_totals.remove(seats));
        if shortfall > 0 {
            tracing::warn!(
                region = %region,
                shortfall,
                "running totals held fewer seats than the released term"
            );
        }
    }

    fn release_region(&mut self, region: &RegionId, seats: &SeatCounts) -> u32 {
        let Some(tally) = self.regions.get_mut(region) else {
            return sum_seats(seats);
        };
        let shortfall = tally.remove(seats);
        if tally.is_empty() {
            self.regions.remove(region);
        }
        shortfall
    }
}
