//! Shared type definitions for the Giseki seat-term engine.
//!
//! This crate is the single source of truth for the types that cross crate
//! boundaries: the raw outcome records handed over by loaders, the typed
//! seat events the normaliser produces, and the snapshot / timeline reports
//! consumed by renderers. Report types flow downstream to `TypeScript` via
//! `ts-rs` for the dashboard.
//!
//! # Modules
//!
//! - [`ids`] -- String-keyed newtypes for regions and parties
//! - [`enums`] -- Council scope and output ordering
//! - [`structs`] -- Outcome records and seat events
//! - [`report`] -- Snapshots, snapshot reports, and party timelines

pub mod enums;
pub mod ids;
pub mod report;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{Scope, YearOrder};
pub use ids::{INDEPENDENT_PARTY, NATIONAL_REGION, Party, RegionId};
pub use report::{
    PartyCoverage, PartySeries, PartyShare, PartyTimeline, Snapshot, SnapshotReport,
};
pub use structs::{OutcomeRecord, SeatCounts, SeatEvent, sum_seats};
