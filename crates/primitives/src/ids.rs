//! Index and identifier newtypes.

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

/// Hours in one data block.
pub const HOURS_PER_DAY: i64 = 24;

/// Hourly index used as the universal join key across sources.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    From,
    Into,
    Serialize,
    Deserialize,
)]
pub struct TimeId(pub i64);

impl TimeId {
    /// Create a new time index.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }
}

/// Daily index identifying when a record becomes available.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    From,
    Into,
    Serialize,
    Deserialize,
)]
pub struct DataBlockId(pub i64);

impl DataBlockId {
    /// Create a new data block index.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Hourly index of `hour` within this block.
    #[must_use]
    pub const fn hour(self, hour: u32) -> TimeId {
        TimeId(self.0 * HOURS_PER_DAY + hour as i64)
    }
}

/// County identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, From, Into, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CountyId(pub i64);

/// Reporting latency of a source, in days.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    From,
    Into,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct Latency(pub i64);

impl Latency {
    /// Available on the nominal day.
    pub const NONE: Self = Self(0);

    /// Create a latency of `days`.
    #[must_use]
    pub const fn days(days: i64) -> Self {
        Self(days)
    }
}
