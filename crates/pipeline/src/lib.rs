#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/prosumer-energy/prosumer-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod base;
pub use base::{BaseTable, index_targets};

mod lag;
pub use lag::{
    FORECAST_LAGS, ForecastLag, MIN_TIME_ID, TARGET_LAGS, TargetLag, create_forecast_lag,
    create_target_lag,
};

mod builder;
pub use builder::{
    FeatureBuilder, RATIO_EPSILON, RawTables, TARGET_RATIO, get_features, target_ratio,
};

mod config;
pub use config::PipelineConfig;

mod error;
pub use error::PipelineError;

/// Re-export commonly used types.
pub mod prelude {
    pub use prosumer_primitives::{CountyMap, TimeIndexer};
    pub use prosumer_traits::{FeatureSource, LagTransform};

    pub use super::{FeatureBuilder, PipelineConfig, PipelineError, RawTables, get_features};
}
