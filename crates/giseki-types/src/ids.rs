//! Type-safe string keys for regions and parties.
//!
//! Regions and parties are both identified by free-form text in the source
//! data (a prefecture code, a municipality code, a party label). Wrapping them
//! in distinct newtypes keeps a region key from ever being used where a party
//! is expected, and gives both a total order so they can key `BTreeMap`s with
//! deterministic iteration.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Label used for candidates without a party affiliation.
pub const INDEPENDENT_PARTY: &str = "無所属";

/// Region key used when events are aggregated without a regional breakdown.
pub const NATIONAL_REGION: &str = "national";

/// Generates a newtype wrapper around [`String`] with standard derives.
macro_rules! define_key {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub String);

        impl $name {
            /// Create a key from any string-like value.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrow the key as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Return the inner [`String`].
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_key! {
    /// Opaque identifier of the region a seat belongs to (prefecture code,
    /// municipality code, or [`NATIONAL_REGION`]).
    RegionId
}

define_key! {
    /// A party label as it appears in the (normalised) outcome records.
    Party
}

impl RegionId {
    /// The region key for scope-less national aggregation.
    pub fn national() -> Self {
        Self::new(NATIONAL_REGION)
    }
}

impl Party {
    /// The label for independent (unaffiliated) seats.
    pub fn independent() -> Self {
        Self::new(INDEPENDENT_PARTY)
    }
}
