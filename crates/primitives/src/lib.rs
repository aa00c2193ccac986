#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/prosumer-energy/prosumer-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

pub mod columns;

mod county;
pub use county::{CountyMap, LatLonKey};

mod ids;
pub use ids::{CountyId, DataBlockId, HOURS_PER_DAY, Latency, TimeId};

mod time;
pub use time::{TimeIndexer, default_epoch};

/// Re-export the timestamp type used throughout the pipeline.
pub type Timestamp = chrono::NaiveDateTime;
