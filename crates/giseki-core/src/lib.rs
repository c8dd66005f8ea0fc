//! Aggregation drivers for the Giseki seat-term engine.
//!
//! Raw outcome records go through the normaliser to become
//! [`SeatEvent`](giseki_types::SeatEvent)s. Those events are then replayed
//! through [`TermLedger`](giseki_ledger::TermLedger)s by one of two drivers:
//! calendar-year snapshots per scope, or a continuous per-party timeline.
//!
//! # Modules
//!
//! - [`classify`] -- Keyword tables for outcomes, council scopes, and party
//!   labels.
//! - [`resolver`] -- [`RegionResolver`] trait and the table-driven
//!   [`GazetteerResolver`].
//! - [`normalize`] -- Records to grouped, sorted seat events.
//! - [`snapshot`] -- Per-year, per-scope snapshots.
//! - [`timeline`] -- Running seat totals from gain and loss deltas.
//! - [`config`] -- YAML configuration with environment overrides.
//! - [`error`] -- [`EngineError`].
//!
//! Every call builds fresh ledgers; nothing is shared between calls.

pub mod classify;
pub mod config;
pub mod error;
pub mod normalize;
pub mod resolver;
pub mod snapshot;
pub mod timeline;

pub use classify::{classify_scope, is_winning_outcome, normalize_party};
pub use config::{ConfigError, EngineConfig, LogFormat};
pub use error::EngineError;
pub use normalize::{NormalizeOptions, NormalizeReport, Normalized, SkipReason, normalize_records};
pub use resolver::{GazetteerEntry, GazetteerResolver, RegionResolver};
pub use snapshot::{DEFAULT_TERM_YEARS, SnapshotOptions, build_snapshots};
pub use timeline::{DEFAULT_TOP_N, TimelineOptions, build_party_timeline};
