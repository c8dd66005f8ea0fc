//! Calendar-year snapshots of live seats.
//!
//! Events are replayed once, in date order, through one [`TermLedger`] per
//! tracked scope. For each year Y the events dated in or before Y are
//! applied, every term that lapsed on or before 1 January of Y is closed, and
//! each ledger is read. A snapshot therefore holds the seats that were live
//! at some instant during Y.
//!
//! Council-tier events feed their own ledger and the combined ledger; events
//! that matched neither tier feed only the combined ledger. Events that carry
//! no seats are dropped before replay.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate};

use giseki_ledger::{TermLedger, nominal_expiry};
use giseki_types::{Scope, SeatEvent, SnapshotReport, YearOrder};

use crate::error::EngineError;

/// Default nominal term length in years.
pub const DEFAULT_TERM_YEARS: u32 = 4;

/// How far past the last live year `through_year` may reach.
pub const MAX_TRAILING_YEARS: i32 = 100;

/// Snapshot engine parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotOptions {
    /// Nominal term length in years.
    pub nominal_years: u32,
    /// Scopes to keep a ledger for.
    pub scopes: BTreeSet<Scope>,
    /// Order of `SnapshotReport::years`.
    pub year_order: YearOrder,
    /// Last year to snapshot. Defaults to the last year any term is live.
    pub through_year: Option<i32>,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self {
            nominal_years: DEFAULT_TERM_YEARS,
            scopes: Scope::ALL.into_iter().collect(),
            year_order: YearOrder::default(),
            through_year: None,
        }
    }
}

/// Build one snapshot per (calendar year, tracked scope).
///
/// Years run without gaps from the earliest event year to
/// `options.through_year`, or to the last year in which any term is live
/// when that is unset. Input order does not matter.
///
/// # Errors
///
/// - [`EngineError::NoScopes`] if `options.scopes` is empty.
/// - [`EngineError::ThroughYearOutOfRange`] if `options.through_year` lies
///   more than [`MAX_TRAILING_YEARS`] past the last live year.
/// - [`EngineError::Ledger`] if the ledger rejects an event (invalid term
///   length or tally overflow).
pub fn build_snapshots(
    events: &[SeatEvent],
    options: &SnapshotOptions,
) -> Result<SnapshotReport, EngineError> {
    if options.scopes.is_empty() {
        return Err(EngineError::NoScopes);
    }
    let mut ledgers: BTreeMap<Scope, TermLedger> = BTreeMap::new();
    for scope in &options.scopes {
        ledgers.insert(*scope, TermLedger::new(options.nominal_years)?);
    }

    let sorted = replay_order(events.iter());
    let mut report = SnapshotReport::default();
    let Some(first_year) = sorted.first().map(|e| e.year()) else {
        return Ok(report);
    };
    let live_until = last_live_year(&sorted, options.nominal_years)?;
    let last_year = match options.through_year {
        Some(year) if year > live_until.saturating_add(MAX_TRAILING_YEARS) => {
            return Err(EngineError::ThroughYearOutOfRange {
                through_year: year,
                last_live_year: live_until,
            });
        }
        Some(year) => year,
        None => live_until,
    };

    let mut cursor = sorted.iter().peekable();
    let mut years = Vec::new();
    for year in first_year..=last_year {
        while let Some(event) = cursor.next_if(|e| e.year() <= year) {
            for (scope, ledger) in &mut ledgers {
                if scope.accepts(event.scope) {
                    ledger.apply(event)?;
                }
            }
        }

        let cutoff = lapse_cutoff(year);
        let mut by_scope = BTreeMap::new();
        for (scope, ledger) in &mut ledgers {
            ledger.expire_as_of(cutoff);
            by_scope.insert(*scope, ledger.snapshot());
        }
        report.snapshots.insert(year, by_scope);
        years.push(year);
    }

    if options.year_order == YearOrder::Descending {
        years.reverse();
    }
    report.years = years;

    tracing::debug!(
        events = events.len(),
        first_year,
        last_year,
        scopes = ledgers.len(),
        "snapshots built"
    );
    Ok(report)
}

/// Drop seatless events and sort the rest into replay order.
pub(crate) fn replay_order<'a, I>(events: I) -> Vec<&'a SeatEvent>
where
    I: Iterator<Item = &'a SeatEvent>,
{
    let mut sorted: Vec<&SeatEvent> = events
        .filter(|event| {
            if event.is_empty() {
                tracing::trace!(
                    region = %event.region,
                    scope = %event.scope,
                    date = %event.date,
                    "seatless event skipped"
                );
            }
            !event.is_empty()
        })
        .collect();
    sorted.sort_by(|a, b| (a.date, &a.region, a.scope).cmp(&(b.date, &b.region, b.scope)));
    sorted
}

/// The expiry cutoff for year Y: terms whose expiry is on or before
/// 1 January of Y held no seat during Y.
fn lapse_cutoff(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 1, 2).unwrap_or(NaiveDate::MAX)
}

/// The last calendar year on which some term is still live, ignoring
/// supersession.
fn last_live_year(sorted: &[&SeatEvent], nominal_years: u32) -> Result<i32, EngineError> {
    let mut last = i32::MIN;
    for event in sorted {
        let expiry = nominal_expiry(event.date, nominal_years)?;
        let last_day = expiry.pred_opt().unwrap_or(expiry);
        last = last.max(last_day.year()).max(event.year());
    }
    Ok(last)
}

#[cfg(test)]
mod tests {
    use giseki_types::{Party, RegionId, SeatCounts, Snapshot};

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
    }

    fn event(region: &str, scope: Scope, on: NaiveDate, party: &str, seats: u32) -> SeatEvent {
        let counts: SeatCounts = [(Party::from(party), seats)].into_iter().collect();
        SeatEvent::new(RegionId::from(region), scope, on, counts)
    }

    #[test]
    fn empty_input_gives_empty_report() {
        let report = build_snapshots(&[], &SnapshotOptions::default());
        assert!(report.is_ok_and(|r| r.is_empty()));
    }

    #[test]
    fn no_scopes_is_rejected() {
        let options = SnapshotOptions {
            scopes: BTreeSet::new(),
            ..SnapshotOptions::default()
        };
        let result = build_snapshots(&[], &options);
        assert!(matches!(result, Err(EngineError::NoScopes)));
    }

    #[test]
    fn combined_unions_council_tiers() {
        let events = [
            event("R1", Scope::Prefectural, date(2019, 4, 7), "X", 2),
            event("R1", Scope::Municipal, date(2019, 4, 21), "Y", 5),
            event("R2", Scope::Combined, date(2019, 6, 1), "Z", 1),
        ];
        let report = build_snapshots(&events, &SnapshotOptions::default()).unwrap_or_default();

        let combined = report.snapshot(2019, Scope::Combined);
        assert_eq!(combined.map(|s| s.total_seats()), Some(8));
        let prefectural = report.snapshot(2019, Scope::Prefectural);
        assert_eq!(prefectural.map(|s| s.total_seats()), Some(2));
        let municipal = report.snapshot(2019, Scope::Municipal);
        assert_eq!(municipal.map(|s| s.seats_for(&Party::from("Z"))), Some(0));
    }

    #[test]
    fn years_are_contiguous_and_ordered() {
        let events = [
            event("R1", Scope::Combined, date(2015, 4, 1), "X", 1),
            event("R1", Scope::Combined, date(2019, 4, 1), "X", 1),
        ];
        let ascending = SnapshotOptions {
            year_order: YearOrder::Ascending,
            ..SnapshotOptions::default()
        };
        let up = build_snapshots(&events, &ascending).unwrap_or_default();
        let down = build_snapshots(&events, &SnapshotOptions::default()).unwrap_or_default();
        // The 2019 term runs to 2023-04-01.
        assert_eq!(up.years, (2015..=2023).collect::<Vec<_>>());
        assert_eq!(down.years, (2015..=2023).rev().collect::<Vec<_>>());
        assert_eq!(down.latest_year(), Some(2023));
    }

    #[test]
    fn through_year_extends_the_range() {
        let events = [event("R1", Scope::Combined, date(2015, 4, 1), "X", 1)];
        let options = SnapshotOptions {
            through_year: Some(2020),
            ..SnapshotOptions::default()
        };
        let report = build_snapshots(&events, &options).unwrap_or_default();
        assert_eq!(report.years.first(), Some(&2020));
        let last = report.snapshot(2020, Scope::Combined);
        assert_eq!(last.map(Snapshot::is_empty), Some(true));
    }

    #[test]
    fn through_year_far_past_the_data_is_rejected() {
        let events = [event("R1", Scope::Combined, date(2015, 4, 1), "X", 1)];
        let options = SnapshotOptions {
            through_year: Some(200_000),
            ..SnapshotOptions::default()
        };
        assert!(matches!(
            build_snapshots(&events, &options),
            Err(EngineError::ThroughYearOutOfRange {
                through_year: 200_000,
                last_live_year: 2019,
            })
        ));
    }

    #[test]
    fn seatless_events_are_skipped() {
        let events = [
            event("R1", Scope::Combined, date(2019, 4, 7), "X", 3),
            event("R2", Scope::Combined, date(2018, 4, 7), "Y", 0),
        ];
        let report = build_snapshots(&events, &SnapshotOptions::default()).unwrap_or_default();
        assert_eq!(report.years.last(), Some(&2019));
        let snap = report.snapshot(2019, Scope::Combined);
        assert_eq!(snap.map(|s| s.total_seats()), Some(3));
    }

    #[test]
    fn term_lapsing_mid_year_counts_for_that_year_only() {
        let events = [event("R1", Scope::Combined, date(2015, 4, 1), "X", 3)];
        let options = SnapshotOptions {
            through_year: Some(2020),
            ..SnapshotOptions::default()
        };
        let report = build_snapshots(&events, &options).unwrap_or_default();
        let seats = |year| {
            report
                .snapshot(year, Scope::Combined)
                .map(|s| s.seats_for(&Party::from("X")))
        };
        // Expires 2019-04-01: live for part of 2019, gone for 2020.
        assert_eq!(seats(2019), Some(3));
        assert_eq!(seats(2020), Some(0));
    }

    #[test]
    fn expiry_on_new_year_belongs_to_the_prior_year() {
        let events = [event("R1", Scope::Combined, date(2016, 1, 1), "X", 2)];
        let options = SnapshotOptions {
            through_year: Some(2020),
            ..SnapshotOptions::default()
        };
        let report = build_snapshots(&events, &options).unwrap_or_default();
        let seats = |year| {
            report
                .snapshot(year, Scope::Combined)
                .map(|s| s.seats_for(&Party::from("X")))
        };
        assert_eq!(seats(2019), Some(2));
        assert_eq!(seats(2020), Some(0));
    }
}
