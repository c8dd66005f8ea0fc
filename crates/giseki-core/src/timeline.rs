//! Continuous seat timeline built from gain and loss deltas.
//!
//! Every term contributes a gain on its start date and a loss on the date it
//! closes, either its nominal expiry or the date a newer election superseded
//! it. Deltas are bucketed by exact date and folded into running totals.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};

use giseki_ledger::{ClosedTerm, DeltaTally, TermLedger};
use giseki_types::{Party, PartySeries, PartyTimeline, Scope, SeatCounts, SeatEvent};

use crate::error::EngineError;
use crate::snapshot::{DEFAULT_TERM_YEARS, replay_order};

/// Default number of chart series.
pub const DEFAULT_TOP_N: usize = 8;

/// Date label format for chart axes.
const LABEL_FORMAT: &str = "%Y-%m-%d";

/// Timeline builder parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineOptions {
    /// Nominal term length in years.
    pub nominal_years: u32,
    /// Which events to include. `Combined` includes every event.
    pub scope: Scope,
    /// Number of parties that get a chart series.
    pub top_n: usize,
    /// Points after this date are dropped, unless that would drop them all.
    /// Defaults to today (UTC).
    pub now: NaiveDate,
}

impl Default for TimelineOptions {
    fn default() -> Self {
        Self {
            nominal_years: DEFAULT_TERM_YEARS,
            scope: Scope::Combined,
            top_n: DEFAULT_TOP_N,
            now: Utc::now().date_naive(),
        }
    }
}

/// Build the running seat total per party over time.
///
/// # Errors
///
/// - [`EngineError::ZeroTopN`] if `options.top_n` is zero.
/// - [`EngineError::Ledger`] if the ledger rejects an event.
pub fn build_party_timeline(
    events: &[SeatEvent],
    options: &TimelineOptions,
) -> Result<PartyTimeline, EngineError> {
    if options.top_n == 0 {
        return Err(EngineError::ZeroTopN);
    }
    let selected = replay_order(events.iter().filter(|e| options.scope.accepts(e.scope)));

    let buckets = collect_deltas(&selected, options.nominal_years)?;
    let points = fold_running_totals(buckets);
    let points = truncate_to(points, options.now);

    let timeline = assemble(&points, options.top_n);
    tracing::debug!(
        events = selected.len(),
        points = timeline.dates.len(),
        parties = timeline.parties.len(),
        total_seats = timeline.total_seats,
        "party timeline built"
    );
    Ok(timeline)
}

/// Replay events through one ledger and bucket the resulting deltas by date.
fn collect_deltas(
    events: &[&SeatEvent],
    nominal_years: u32,
) -> Result<BTreeMap<NaiveDate, DeltaTally>, EngineError> {
    let mut ledger = TermLedger::new(nominal_years)?;
    let mut buckets: BTreeMap<NaiveDate, DeltaTally> = BTreeMap::new();

    for event in events {
        // Terms that lapse on or before this date close first.
        let horizon = event.date.succ_opt().unwrap_or(NaiveDate::MAX);
        for closed in ledger.expire_as_of(horizon) {
            record_loss(&mut buckets, &closed);
        }
        if let Some(superseded) = ledger.apply(event)? {
            record_loss(&mut buckets, &superseded);
        }
        record(&mut buckets, event.date, &event.seats, 1.0);
    }
    for closed in ledger.expire_as_of(NaiveDate::MAX) {
        record_loss(&mut buckets, &closed);
    }

    buckets.retain(|_, tally| !tally.is_empty());
    Ok(buckets)
}

fn record_loss(buckets: &mut BTreeMap<NaiveDate, DeltaTally>, closed: &ClosedTerm) {
    record(buckets, closed.closed_at, &closed.seats, -1.0);
}

fn record(
    buckets: &mut BTreeMap<NaiveDate, DeltaTally>,
    date: NaiveDate,
    seats: &SeatCounts,
    sign: f64,
) {
    let bucket = buckets.entry(date).or_default();
    for (party, count) in seats {
        bucket.add(party, sign * f64::from(*count));
    }
}

/// Fold buckets left to right into one running total per date.
fn fold_running_totals(buckets: BTreeMap<NaiveDate, DeltaTally>) -> Vec<(NaiveDate, DeltaTally)> {
    let mut running = DeltaTally::new();
    buckets
        .into_iter()
        .map(|(date, deltas)| {
            for (party, delta) in deltas.iter() {
                running.accumulate(party, delta);
            }
            (date, running.clone())
        })
        .collect()
}

/// Keep points on or before `now`; keep everything if none qualify.
fn truncate_to(
    mut points: Vec<(NaiveDate, DeltaTally)>,
    now: NaiveDate,
) -> Vec<(NaiveDate, DeltaTally)> {
    let cut = points.partition_point(|(date, _)| *date <= now);
    if cut == 0 {
        return points;
    }
    points.truncate(cut);
    points
}

fn assemble(points: &[(NaiveDate, DeltaTally)], top_n: usize) -> PartyTimeline {
    let Some((_, last)) = points.last() else {
        return PartyTimeline::default();
    };

    let mut ranked: Vec<(Party, f64)> = last
        .iter()
        .filter(|(_, value)| *value > 0.0)
        .map(|(party, value)| (party.clone(), value))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let totals: BTreeMap<Party, u32> = ranked
        .iter()
        .map(|(party, value)| (party.clone(), whole_seats(*value)))
        .collect();
    let total_seats = totals.values().fold(0_u32, |acc, n| acc.saturating_add(*n));

    let series = ranked
        .iter()
        .take(top_n)
        .map(|(party, _)| PartySeries {
            party: party.clone(),
            values: points.iter().map(|(_, tally)| tally.get(party)).collect(),
        })
        .collect();

    let dates: Vec<NaiveDate> = points.iter().map(|(date, _)| *date).collect();
    PartyTimeline {
        date_labels: dates
            .iter()
            .map(|d| d.format(LABEL_FORMAT).to_string())
            .collect(),
        first_date: dates.first().copied(),
        last_date: dates.last().copied(),
        dates,
        totals,
        series,
        parties: ranked.into_iter().map(|(party, _)| party).collect(),
        total_seats,
    }
}

/// Round a running total to whole seats.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_seats(value: f64) -> u32 {
    let rounded = value.round();
    if rounded <= 0.0 {
        0
    } else if rounded >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        // In range and integral after the checks above.
        rounded as u32
    }
}

#[cfg(test)]
mod tests {
    use giseki_types::RegionId;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
    }

    fn event(region: &str, scope: Scope, on: NaiveDate, rows: &[(&str, u32)]) -> SeatEvent {
        let seats: SeatCounts = rows.iter().map(|(p, n)| (Party::from(*p), *n)).collect();
        SeatEvent::new(RegionId::from(region), scope, on, seats)
    }

    fn build(events: &[SeatEvent], now: NaiveDate) -> PartyTimeline {
        let options = TimelineOptions {
            now,
            ..TimelineOptions::default()
        };
        build_party_timeline(events, &options).unwrap_or_default()
    }

    #[test]
    fn empty_input_gives_empty_timeline() {
        let timeline = build(&[], NaiveDate::MAX);
        assert!(timeline.is_empty());
        assert!(timeline.totals.is_empty());
    }

    #[test]
    fn zero_top_n_is_rejected() {
        let options = TimelineOptions {
            top_n: 0,
            ..TimelineOptions::default()
        };
        assert!(matches!(
            build_party_timeline(&[], &options),
            Err(EngineError::ZeroTopN)
        ));
    }

    #[test]
    fn gain_then_expiry_loss() {
        let events = [event("R1", Scope::Combined, date(2015, 4, 1), &[("X", 3)])];
        let timeline = build(&events, NaiveDate::MAX);
        assert_eq!(timeline.date_labels, vec!["2015-04-01", "2019-04-01"]);
        assert_eq!(timeline.series_for(&Party::from("X")), None);
        // Final value is zero, so X is not retained anywhere.
        assert!(timeline.totals.is_empty());
    }

    #[test]
    fn now_hides_future_expiry() {
        let events = [event("R1", Scope::Combined, date(2015, 4, 1), &[("X", 3)])];
        let timeline = build(&events, date(2018, 1, 1));
        assert_eq!(timeline.date_labels, vec!["2015-04-01"]);
        assert_eq!(timeline.totals.get(&Party::from("X")), Some(&3));
        assert_eq!(timeline.series_for(&Party::from("X")), Some(&[3.0][..]));
        assert_eq!(timeline.total_seats, 3);
    }

    #[test]
    fn default_cutoff_is_today() {
        let today = Utc::now().date_naive();
        let on = today.pred_opt().unwrap_or(today);
        let events = [event("R1", Scope::Combined, on, &[("X", 3)])];
        let timeline = build_party_timeline(&events, &TimelineOptions::default()).unwrap_or_default();
        assert_eq!(timeline.dates, vec![on]);
        assert_eq!(timeline.totals.get(&Party::from("X")), Some(&3));
    }

    #[test]
    fn seatless_events_are_skipped() {
        let events = [
            event("R1", Scope::Combined, date(2019, 4, 7), &[("X", 3)]),
            event("R2", Scope::Combined, date(2019, 5, 1), &[("Y", 0)]),
        ];
        let timeline = build(&events, date(2020, 1, 1));
        assert_eq!(timeline.date_labels, vec!["2019-04-07"]);
        assert_eq!(timeline.parties, vec![Party::from("X")]);
    }

    #[test]
    fn all_future_data_falls_back_to_full_series() {
        let events = [event("R1", Scope::Combined, date(2030, 4, 1), &[("X", 3)])];
        let timeline = build(&events, date(2020, 1, 1));
        assert_eq!(timeline.dates.len(), 2);
        assert_eq!(timeline.first_date, Some(date(2030, 4, 1)));
    }

    #[test]
    fn supersession_moves_seats_on_the_election_date() {
        let events = [
            event("R1", Scope::Combined, date(2015, 4, 1), &[("X", 3)]),
            event("R1", Scope::Combined, date(2017, 6, 1), &[("Y", 3)]),
        ];
        let timeline = build(&events, date(2018, 1, 1));
        assert_eq!(timeline.date_labels, vec!["2015-04-01", "2017-06-01"]);
        assert_eq!(timeline.totals.get(&Party::from("Y")), Some(&3));
        assert!(!timeline.totals.contains_key(&Party::from("X")));
    }

    #[test]
    fn unchanged_re_election_leaves_no_bucket() {
        let events = [
            event("R1", Scope::Combined, date(2015, 4, 1), &[("X", 3)]),
            event("R1", Scope::Combined, date(2017, 6, 1), &[("X", 3)]),
        ];
        let timeline = build(&events, date(2018, 1, 1));
        assert_eq!(timeline.date_labels, vec!["2015-04-01"]);
    }

    #[test]
    fn scope_selector_filters_events() {
        let events = [
            event("R1", Scope::Prefectural, date(2019, 4, 7), &[("X", 2)]),
            event("R1", Scope::Municipal, date(2019, 4, 21), &[("Y", 5)]),
        ];
        let options = TimelineOptions {
            scope: Scope::Prefectural,
            now: date(2020, 1, 1),
            ..TimelineOptions::default()
        };
        let timeline = build_party_timeline(&events, &options).unwrap_or_default();
        assert_eq!(timeline.parties, vec![Party::from("X")]);

        let all = build(&events, date(2020, 1, 1));
        assert_eq!(all.parties, vec![Party::from("Y"), Party::from("X")]);
        assert_eq!(all.total_seats, 7);
    }

    #[test]
    fn only_top_n_parties_get_series() {
        let rows: Vec<(String, u32)> = (1..=10).map(|i| (format!("P{i:02}"), i)).collect();
        let rows: Vec<(&str, u32)> = rows.iter().map(|(p, n)| (p.as_str(), *n)).collect();
        let events = [event("R1", Scope::Combined, date(2019, 4, 7), &rows)];
        let timeline = build(&events, date(2020, 1, 1));
        assert_eq!(timeline.totals.len(), 10);
        assert_eq!(timeline.series.len(), DEFAULT_TOP_N);
        assert_eq!(timeline.parties.first(), Some(&Party::from("P10")));
        assert!(timeline.series_for(&Party::from("P01")).is_none());
    }

    #[test]
    fn whole_seats_rounds_and_clamps() {
        assert_eq!(whole_seats(2.999_999_999_9), 3);
        assert_eq!(whole_seats(-1.0), 0);
        assert_eq!(whole_seats(f64::MAX), u32::MAX);
    }
}
