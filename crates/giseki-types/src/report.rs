//! Output-side structs consumed by external renderers: per-year snapshots
//! and the continuous party timeline.
//!
//! All of these are plain data. The engine in `giseki-core` produces them;
//! renderers (maps, charts) only read them. The query helpers on
//! [`Snapshot`] cover the lookups the dashboards perform: ranking parties,
//! pivoting shares by party, and summarising a party's regional coverage.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::Scope;
use crate::ids::{Party, RegionId};

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// A party's share of one region's seats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PartyShare {
    /// Seats the party holds in the region.
    pub seats: u32,
    /// Total seats held in the region across all parties.
    pub total: u32,
    /// `seats / total`, or `0.0` for an empty region.
    pub ratio: f64,
}

impl PartyShare {
    /// Build a share, deriving the ratio.
    pub fn new(seats: u32, total: u32) -> Self {
        let ratio = if total == 0 {
            0.0
        } else {
            f64::from(seats) / f64::from(total)
        };
        Self {
            seats,
            total,
            ratio,
        }
    }
}

/// Immutable point-in-time seat holdings for one scope.
///
/// Regions with no live seats are absent from every map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Snapshot {
    /// Total seats held per region.
    pub region_totals: BTreeMap<RegionId, u32>,
    /// Per-region, per-party seat shares.
    pub region_shares: BTreeMap<RegionId, BTreeMap<Party, PartyShare>>,
    /// Seats held per party across all regions.
    pub party_totals: BTreeMap<Party, u32>,
}

/// Summary of where a party holds seats in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PartyCoverage {
    /// The party summarised.
    pub party: Party,
    /// Regions in which the party holds at least one seat.
    pub covered_regions: usize,
    /// Regions in which any party holds seats.
    pub available_regions: usize,
    /// Seats held by the party across all regions.
    pub seat_sum: u32,
    /// Region with the highest share for the party.
    pub max_region: RegionId,
    /// The share in `max_region`.
    pub max_ratio: f64,
}

impl Snapshot {
    /// Whether no seats are held at all.
    pub fn is_empty(&self) -> bool {
        self.party_totals.is_empty()
    }

    /// Total seats held across every party.
    pub fn total_seats(&self) -> u32 {
        self.party_totals
            .values()
            .fold(0_u32, |acc, n| acc.saturating_add(*n))
    }

    /// Seats held by `party`, zero if absent.
    pub fn seats_for(&self, party: &Party) -> u32 {
        self.party_totals.get(party).copied().unwrap_or(0)
    }

    /// Parties ordered by seats held (descending), ties broken by name.
    pub fn ranked_parties(&self) -> Vec<(Party, u32)> {
        let mut ranked: Vec<(Party, u32)> = self
            .party_totals
            .iter()
            .map(|(party, seats)| (party.clone(), *seats))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked
    }

    /// Shares for one party, keyed by region.
    pub fn party_shares(&self, party: &Party) -> BTreeMap<RegionId, PartyShare> {
        self.region_shares
            .iter()
            .filter_map(|(region, shares)| {
                shares.get(party).map(|share| (region.clone(), *share))
            })
            .collect()
    }

    /// Coverage summary for `party`, or `None` if it holds no seats.
    ///
    /// When several regions tie for the highest ratio the first in region
    /// order wins.
    pub fn party_coverage(&self, party: &Party) -> Option<PartyCoverage> {
        let shares = self.party_shares(party);
        let mut max: Option<(&RegionId, f64)> = None;
        let mut seat_sum = 0_u32;
        for (region, share) in &shares {
            seat_sum = seat_sum.saturating_add(share.seats);
            let better = max.is_none_or(|(_, best)| share.ratio > best);
            if better {
                max = Some((region, share.ratio));
            }
        }
        let (max_region, max_ratio) = max?;
        Some(PartyCoverage {
            party: party.clone(),
            covered_regions: shares.len(),
            available_regions: self.region_totals.len(),
            seat_sum,
            max_region: max_region.clone(),
            max_ratio,
        })
    }
}

/// Per-year, per-scope snapshots produced by one replay pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SnapshotReport {
    /// Years covered, in the requested order.
    pub years: Vec<i32>,
    /// Snapshot per year and scope.
    pub snapshots: BTreeMap<i32, BTreeMap<Scope, Snapshot>>,
}

impl SnapshotReport {
    /// Whether the report covers no years (no qualifying events).
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Look up the snapshot for `year` and `scope`.
    pub fn snapshot(&self, year: i32, scope: Scope) -> Option<&Snapshot> {
        self.snapshots.get(&year).and_then(|by_scope| by_scope.get(&scope))
    }

    /// The most recent year covered.
    pub fn latest_year(&self) -> Option<i32> {
        self.snapshots.keys().next_back().copied()
    }
}

// ---------------------------------------------------------------------------
// Timeline
// ---------------------------------------------------------------------------

/// Cumulative seat counts for one party, aligned to
/// [`PartyTimeline::dates`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PartySeries {
    /// The party.
    pub party: Party,
    /// Running total at each date.
    pub values: Vec<f64>,
}

/// Continuous running-total series of seats per party.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PartyTimeline {
    /// Bucket dates, ascending.
    pub dates: Vec<NaiveDate>,
    /// `dates` formatted as `YYYY-MM-DD`.
    pub date_labels: Vec<String>,
    /// Final seat count for every party still holding seats.
    pub totals: BTreeMap<Party, u32>,
    /// Chart series for the top-ranked parties, in rank order.
    pub series: Vec<PartySeries>,
    /// Every party in `totals`, ranked by final seats (descending).
    pub parties: Vec<Party>,
    /// Sum of `totals`.
    pub total_seats: u32,
    /// First bucket date.
    pub first_date: Option<NaiveDate>,
    /// Last bucket date.
    pub last_date: Option<NaiveDate>,
}

impl PartyTimeline {
    /// Whether the timeline has no points.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// The chart series for `party`, if it made the top-N cut.
    pub fn series_for(&self, party: &Party) -> Option<&[f64]> {
        self.series
            .iter()
            .find(|s| &s.party == party)
            .map(|s| s.values.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_with(rows: &[(&str, &str, u32)]) -> Snapshot {
        let mut snapshot = Snapshot::default();
        for (region, party, seats) in rows {
            let region = RegionId::from(*region);
            let total = snapshot.region_totals.entry(region.clone()).or_insert(0);
            *total = total.saturating_add(*seats);
            let party_total = snapshot.party_totals.entry(Party::from(*party)).or_insert(0);
            *party_total = party_total.saturating_add(*seats);
        }
        for (region, party, seats) in rows {
            let region = RegionId::from(*region);
            let total = snapshot.region_totals.get(&region).copied().unwrap_or(0);
            snapshot
                .region_shares
                .entry(region)
                .or_default()
                .insert(Party::from(*party), PartyShare::new(*seats, total));
        }
        snapshot
    }

    #[test]
    fn share_ratio_of_empty_region_is_zero() {
        let share = PartyShare::new(0, 0);
        assert!(share.ratio.abs() < f64::EPSILON);
    }

    #[test]
    fn ranked_parties_sorts_by_seats_then_name() {
        let snapshot = snapshot_with(&[("01", "B", 2), ("01", "A", 2), ("02", "C", 5)]);
        let ranked: Vec<String> = snapshot
            .ranked_parties()
            .into_iter()
            .map(|(p, _)| p.into_inner())
            .collect();
        assert_eq!(ranked, vec!["C", "A", "B"]);
    }

    #[test]
    fn coverage_picks_highest_ratio_region() {
        let snapshot = snapshot_with(&[
            ("01", "A", 1),
            ("01", "B", 3),
            ("02", "A", 2),
            ("02", "B", 2),
            ("03", "B", 4),
        ]);
        let coverage = snapshot.party_coverage(&Party::from("A"));
        assert!(coverage.is_some());
        if let Some(coverage) = coverage {
            assert_eq!(coverage.covered_regions, 2);
            assert_eq!(coverage.available_regions, 3);
            assert_eq!(coverage.seat_sum, 3);
            assert_eq!(coverage.max_region, RegionId::from("02"));
            assert!((coverage.max_ratio - 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn coverage_of_absent_party_is_none() {
        let snapshot = snapshot_with(&[("01", "A", 1)]);
        assert!(snapshot.party_coverage(&Party::from("Z")).is_none());
    }

    #[test]
    fn report_lookup() {
        let mut report = SnapshotReport::default();
        assert!(report.is_empty());
        assert_eq!(report.latest_year(), None);

        report.years = vec![2020, 2019];
        for year in [2019, 2020] {
            report
                .snapshots
                .entry(year)
                .or_default()
                .insert(Scope::Combined, Snapshot::default());
        }
        assert_eq!(report.latest_year(), Some(2020));
        assert!(report.snapshot(2019, Scope::Combined).is_some());
        assert!(report.snapshot(2019, Scope::Municipal).is_none());
    }
}
