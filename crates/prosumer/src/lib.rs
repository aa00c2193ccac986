//! # prosumer
//!
//! Leakage-free feature engineering for prosumer energy forecasting.
//!
//! This crate provides a unified interface to the prosumer pipeline crates.
//! Individual components can be enabled via feature flags.
//!
//! ## Features
//!
//! - `full` (default): Enables all components
//! - `primitives`: Index newtypes, time indexer, county map, column names
//! - `traits`: Feature source and lag transform traits
//! - `utils`: Frame and timestamp helpers
//! - `sources`: Client, price, weather and calendar sources
//! - `pipeline`: Lag generator and join orchestrator
//! - `cli`: The `features` binary
//!
//! ## Example
//!
//! ```rust,ignore
//! use prosumer::pipeline::{RawTables, get_features};
//! use prosumer::primitives::CountyMap;
//!
//! let counties: CountyMap = serde_json::from_str(r#"{"57.6_21.7": 0}"#)?;
//! let features = get_features(tables, &counties)?;
//! ```

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[cfg(feature = "primitives")]
#[doc(inline)]
pub use prosumer_primitives as primitives;
#[cfg(feature = "traits")]
#[doc(inline)]
pub use prosumer_traits as traits;
#[cfg(feature = "utils")]
#[doc(inline)]
pub use prosumer_utils as utils;
#[cfg(feature = "sources")]
#[doc(inline)]
pub use prosumer_sources as sources;
#[cfg(feature = "pipeline")]
#[doc(inline)]
pub use prosumer_pipeline as pipeline;

// Used by the `features` binary only.
#[cfg(feature = "cli")]
use {clap as _, polars as _, serde_json as _, tracing as _, tracing_subscriber as _};
