//! Raw outcome records to typed seat events.
//!
//! Each winning record contributes one seat to its party. Records are grouped
//! by (region, scope, election date) so that one event carries every seat
//! filled at one election.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

use giseki_types::{OutcomeRecord, RegionId, Scope, SeatCounts, SeatEvent};

use crate::classify::{classify_scope, is_winning_outcome, normalize_party};
use crate::resolver::RegionResolver;

/// Inclusive date window applied to records before grouping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Earliest election date kept.
    pub start: Option<NaiveDate>,
    /// Latest election date kept.
    pub end: Option<NaiveDate>,
}

impl NormalizeOptions {
    /// Whether `date` falls inside the window.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }
}

/// Why a record did not become part of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The outcome is not a win.
    NotAWin,
    /// The record has no election date.
    MissingDate,
    /// The election date is outside the configured window.
    OutsideWindow,
    /// The region text did not resolve.
    UnresolvedRegion,
}

/// Counts from one normalisation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeReport {
    /// Records examined.
    pub seen: usize,
    /// Records that contributed a seat.
    pub kept: usize,
    /// Dropped records per reason.
    pub skipped: BTreeMap<SkipReason, usize>,
    /// Distinct regions with at least one kept record.
    pub regions: usize,
    /// Events produced.
    pub events: usize,
}

impl NormalizeReport {
    /// Records dropped for `reason`.
    pub fn skipped_for(&self, reason: SkipReason) -> usize {
        self.skipped.get(&reason).copied().unwrap_or(0)
    }

    fn skip(&mut self, reason: SkipReason) {
        let count = self.skipped.entry(reason).or_insert(0);
        *count = count.saturating_add(1);
    }
}

/// Events plus the report describing how they were derived.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalized {
    /// Seat events sorted by (date, region, scope).
    pub events: Vec<SeatEvent>,
    /// Pass statistics.
    pub report: NormalizeReport,
}

/// Turn raw records into seat events.
///
/// A record is dropped when its outcome is not a win, it has no date, the
/// date is outside `options`, or `resolver` cannot place its region text.
/// Everything else is grouped by (region, scope, date).
pub fn normalize_records<R>(
    records: &[OutcomeRecord],
    resolver: &R,
    options: &NormalizeOptions,
) -> Normalized
where
    R: RegionResolver + ?Sized,
{
    let mut report = NormalizeReport {
        seen: records.len(),
        ..NormalizeReport::default()
    };
    let mut groups: BTreeMap<(NaiveDate, RegionId, Scope), SeatCounts> = BTreeMap::new();
    let mut regions: BTreeSet<RegionId> = BTreeSet::new();

    for (index, record) in records.iter().enumerate() {
        let reason = match classify_record(record, resolver, options) {
            Ok((date, region, scope)) => {
                let party = normalize_party(&record.party);
                let seats = groups
                    .entry((date, region.clone(), scope))
                    .or_default()
                    .entry(party)
                    .or_insert(0);
                *seats = seats.saturating_add(1);
                regions.insert(region);
                report.kept = report.kept.saturating_add(1);
                continue;
            }
            Err(reason) => reason,
        };
        tracing::trace!(
            index,
            reason = ?reason,
            region_text = %record.source_region_text,
            "record skipped"
        );
        report.skip(reason);
    }

    let events: Vec<SeatEvent> = groups
        .into_iter()
        .map(|((date, region, scope), seats)| SeatEvent::new(region, scope, date, seats))
        .collect();
    report.regions = regions.len();
    report.events = events.len();

    tracing::debug!(
        seen = report.seen,
        kept = report.kept,
        events = report.events,
        regions = report.regions,
        not_a_win = report.skipped_for(SkipReason::NotAWin),
        missing_date = report.skipped_for(SkipReason::MissingDate),
        outside_window = report.skipped_for(SkipReason::OutsideWindow),
        unresolved_region = report.skipped_for(SkipReason::UnresolvedRegion),
        "records normalized"
    );

    Normalized { events, report }
}

/// Decide where a record lands, or why it is dropped.
fn classify_record<R>(
    record: &OutcomeRecord,
    resolver: &R,
    options: &NormalizeOptions,
) -> Result<(NaiveDate, RegionId, Scope), SkipReason>
where
    R: RegionResolver + ?Sized,
{
    if !is_winning_outcome(&record.outcome) {
        return Err(SkipReason::NotAWin);
    }
    let date = record.election_date.ok_or(SkipReason::MissingDate)?;
    if !options.contains(date) {
        return Err(SkipReason::OutsideWindow);
    }
    let region = resolver
        .resolve(&record.source_region_text)
        .ok_or(SkipReason::UnresolvedRegion)?;
    let scope = classify_scope(&record.source_scope_text);
    Ok((date, region, scope))
}
