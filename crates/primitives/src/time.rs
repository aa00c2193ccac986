//! Time indexing relative to a fixed epoch.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};

use crate::{DataBlockId, Latency, TimeId};

/// Converts timestamps into daily and hourly indices.
///
/// Every index is measured from `epoch`. Day counts floor toward negative
/// infinity, so an instant one hour before the epoch lands in block `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeIndexer {
    epoch: NaiveDateTime,
}

impl TimeIndexer {
    /// Create an indexer anchored at `epoch`.
    #[must_use]
    pub const fn new(epoch: NaiveDateTime) -> Self {
        Self { epoch }
    }

    /// The reference instant.
    #[must_use]
    pub const fn epoch(&self) -> NaiveDateTime {
        self.epoch
    }

    /// Whole days elapsed between the epoch and `datetime`, floored.
    #[must_use]
    pub fn days_since_epoch(&self, datetime: NaiveDateTime) -> i64 {
        let delta = datetime - self.epoch;
        let days = delta.num_days();
        if delta < TimeDelta::days(days) { days - 1 } else { days }
    }

    /// Daily block in which a record dated `datetime` becomes available.
    #[must_use]
    pub fn data_block_id(&self, datetime: NaiveDateTime, latency: Latency) -> DataBlockId {
        DataBlockId::new(self.days_since_epoch(datetime) + latency.0)
    }

    /// Hourly index of `datetime` with no latency.
    #[must_use]
    pub fn time_id(&self, datetime: NaiveDateTime) -> TimeId {
        self.time_id_with_latency(datetime, Latency::NONE)
    }

    /// Hourly index of `datetime` once its block is shifted by `latency`.
    #[must_use]
    pub fn time_id_with_latency(&self, datetime: NaiveDateTime, latency: Latency) -> TimeId {
        self.data_block_id(datetime, latency).hour(datetime.hour())
    }

    /// Hourly index for observations labelled for the following local day.
    ///
    /// The day is taken from `datetime - back_shift`, the hour from
    /// `datetime` itself.
    #[must_use]
    pub fn time_id_back_shifted(
        &self,
        datetime: NaiveDateTime,
        back_shift: TimeDelta,
        latency: Latency,
    ) -> TimeId {
        self.data_block_id(datetime - back_shift, latency).hour(datetime.hour())
    }
}

impl Default for TimeIndexer {
    fn default() -> Self {
        Self::new(default_epoch())
    }
}

/// 2021-09-01T00:00, the start of the prosumer dataset.
#[must_use]
pub fn default_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2021, 9, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .expect("2021-09-01T00:00 is a valid timestamp")
}
