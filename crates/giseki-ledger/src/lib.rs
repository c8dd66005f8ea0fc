//! Seat-term ledger for the Giseki engine.
//!
//! A seat won at an election stays with its party until the nominal term
//! elapses or a newer election for the same region and scope supersedes it.
//! This crate owns that bookkeeping and nothing else: it knows nothing about
//! raw records, calendar-year snapshots, or chart series. Those are drivers
//! built on top of it in `giseki-core`.
//!
//! # Architecture
//!
//! - [`ledger`] -- The [`TermLedger`]: `apply`, `expire_as_of`, `snapshot`.
//! - [`term`] -- [`Term`], [`ClosedTerm`], and nominal expiry arithmetic.
//! - [`tally`] -- Integer and fractional per-party tallies.
//! - [`conservation`] -- Cross-checks between terms, region tallies, and
//!   party totals.
//!
//! # Term interval
//!
//! A term covers `[start, expiry)`. `expire_as_of(d)` closes terms whose
//! expiry is strictly before `d`, so a term expiring on 1 January of year Y
//! is still counted through 31 December of Y-1 and gone for Y.
//!
//! # Usage
//!
//! ```
//! use chrono::NaiveDate;
//! use giseki_ledger::TermLedger;
//! use giseki_types::{Party, RegionId, Scope, SeatEvent};
//!
//! let mut ledger = TermLedger::new(4).ok();
//! let date = NaiveDate::from_ymd_opt(2015, 4, 1).unwrap_or_default();
//! let seats = [(Party::from("PartyX"), 3)].into_iter().collect();
//! let event = SeatEvent::new(RegionId::from("R1"), Scope::Combined, date, seats);
//!
//! if let Some(ledger) = ledger.as_mut() {
//!     let _ = ledger.apply(&event);
//!     assert_eq!(ledger.party_total(&Party::from("PartyX")), 3);
//!     assert!(ledger.verify_conservation().is_balanced());
//! }
//! ```

pub mod conservation;
pub mod ledger;
pub mod tally;
pub mod term;

// Re-export primary types at crate root.
pub use conservation::ConservationResult;
pub use ledger::TermLedger;
pub use tally::{DeltaTally, SeatTally, ZERO_EPSILON};
pub use term::{ClosedTerm, Term, TermClosure, TermKey, nominal_expiry};

use std::collections::BTreeMap;

use chrono::NaiveDate;

use giseki_types::{Party, RegionId, Scope};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when updating the ledger.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// An event was applied with a date earlier than one already applied.
    #[error("seat event dated {attempted} applied after {last}; events must be date-ordered")]
    OutOfOrder {
        /// Date of the most recently applied event.
        last: NaiveDate,
        /// Date of the rejected event.
        attempted: NaiveDate,
    },

    /// The event carries no seats.
    #[error("seat event for {region}/{scope} on {date} has no seats")]
    EmptyEvent {
        /// Region of the rejected event.
        region: RegionId,
        /// Scope of the rejected event.
        scope: Scope,
        /// Date of the rejected event.
        date: NaiveDate,
    },

    /// The nominal term length must be at least one year.
    #[error("nominal term length must be at least one year, got {years}")]
    InvalidTermLength {
        /// The rejected length.
        years: u32,
    },

    /// `start + years` is not a representable date.
    #[error("term starting {start} cannot run {years} years")]
    ExpiryOutOfRange {
        /// Term start.
        start: NaiveDate,
        /// Nominal term length.
        years: u32,
    },

    /// A running total would exceed `u32::MAX`.
    #[error("arithmetic overflow in seat tally")]
    ArithmeticOverflow,
}

// ---------------------------------------------------------------------------
// Anomaly type
// ---------------------------------------------------------------------------

/// A disagreement between the ledger's running totals and its live terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerAnomaly {
    /// Per-party (`recorded_total`, `recomputed_total`) for each party that
    /// did not balance.
    pub imbalances: BTreeMap<Party, (u32, u32)>,
    /// Human-readable description of the anomaly.
    pub message: String,
}

impl core::fmt::Display for LedgerAnomaly {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.message)
    }
}
