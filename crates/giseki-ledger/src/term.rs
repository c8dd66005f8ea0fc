//! Seat terms: the interval during which a party is credited with the seats
//! won at one election for one region and scope.
//!
//! A term covers the half-open interval `[start, expiry)`. It ends early when
//! a newer election for the same key supersedes it.

use chrono::{Months, NaiveDate};
use serde::Serialize;

use giseki_types::{RegionId, Scope, SeatCounts, SeatEvent, sum_seats};

use crate::LedgerError;

/// Months in one calendar year.
const MONTHS_PER_YEAR: u32 = 12;

/// The ledger key: at most one live term exists per (region, scope).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TermKey {
    /// Region the seats belong to.
    pub region: RegionId,
    /// Council scope of the seats.
    pub scope: Scope,
}

impl TermKey {
    /// Build a key.
    pub const fn new(region: RegionId, scope: Scope) -> Self {
        Self { region, scope }
    }

    /// The key an event is filed under.
    pub fn for_event(event: &SeatEvent) -> Self {
        Self::new(event.region.clone(), event.scope)
    }
}

impl core::fmt::Display for TermKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.region, self.scope)
    }
}

/// A live seat term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Term {
    /// Which region and scope the term fills.
    pub key: TermKey,
    /// Seats per party, copied from the originating event.
    pub seats: SeatCounts,
    /// Sum of `seats`.
    pub total_seats: u32,
    /// Election date; first day the seats count.
    pub start: NaiveDate,
    /// Nominal end; first day the seats no longer count.
    pub expiry: NaiveDate,
}

impl Term {
    /// Open a term from an event.
    pub fn from_event(event: &SeatEvent, nominal_years: u32) -> Result<Self, LedgerError> {
        let expiry = nominal_expiry(event.date, nominal_years)?;
        Ok(Self {
            key: TermKey::for_event(event),
            seats: event.seats.clone(),
            total_seats: sum_seats(&event.seats),
            start: event.date,
            expiry,
        })
    }

    /// Whether the term holds seats on `date`.
    pub fn is_live_on(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.expiry
    }

    /// Close the term, recording why and when.
    pub fn close(self, closed_at: NaiveDate, closure: TermClosure) -> ClosedTerm {
        ClosedTerm {
            key: self.key,
            seats: self.seats,
            total_seats: self.total_seats,
            start: self.start,
            nominal_expiry: self.expiry,
            closed_at,
            closure,
        }
    }
}

/// Why a term left the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TermClosure {
    /// A newer election for the same key took over.
    Superseded,
    /// The nominal term length elapsed.
    Expired,
}

/// A term that has been removed from the ledger.
///
/// Drivers use it to emit seat-loss deltas at `closed_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClosedTerm {
    /// Which region and scope the term filled.
    pub key: TermKey,
    /// Seats released.
    pub seats: SeatCounts,
    /// Sum of `seats`.
    pub total_seats: u32,
    /// Election date the term started on.
    pub start: NaiveDate,
    /// Expiry the term would have had without supersession.
    pub nominal_expiry: NaiveDate,
    /// First day the seats no longer count.
    pub closed_at: NaiveDate,
    /// Supersession or expiry.
    pub closure: TermClosure,
}

/// Compute `start + years` in calendar years.
///
/// A 29 February start lands on 28 February when the target year is not a
/// leap year.
pub fn nominal_expiry(start: NaiveDate, years: u32) -> Result<NaiveDate, LedgerError> {
    let months = years
        .checked_mul(MONTHS_PER_YEAR)
        .ok_or(LedgerError::ExpiryOutOfRange { start, years })?;
    start
        .checked_add_months(Months::new(months))
        .ok_or(LedgerError::ExpiryOutOfRange { start, years })
}

#[cfg(test)]
mod tests {
    use giseki_types::Party;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
    }

    #[test]
    fn expiry_adds_calendar_years() {
        assert_eq!(nominal_expiry(date(2015, 4, 1), 4).ok(), Some(date(2019, 4, 1)));
    }

    #[test]
    fn leap_day_start_clamps_to_month_end() {
        assert_eq!(nominal_expiry(date(2020, 2, 29), 1).ok(), Some(date(2021, 2, 28)));
        assert_eq!(nominal_expiry(date(2020, 2, 29), 4).ok(), Some(date(2024, 2, 29)));
    }

    #[test]
    fn absurd_term_length_is_an_error() {
        let result = nominal_expiry(date(2020, 1, 1), u32::MAX);
        assert!(matches!(result, Err(LedgerError::ExpiryOutOfRange { .. })));
    }

    #[test]
    fn term_interval_is_half_open() {
        let mut seats = SeatCounts::new();
        seats.insert(Party::from("X"), 3);
        let event = SeatEvent::new(RegionId::from("R1"), Scope::Combined, date(2015, 4, 1), seats);
        let term = Term::from_event(&event, 4);
        assert!(term.is_ok());
        if let Ok(term) = term {
            assert_eq!(term.total_seats, 3);
            assert!(term.is_live_on(date(2015, 4, 1)));
            assert!(term.is_live_on(date(2019, 3, 31)));
            assert!(!term.is_live_on(date(2019, 4, 1)));
            assert!(!term.is_live_on(date(2015, 3, 31)));
        }
    }
}
