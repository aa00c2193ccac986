#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/prosumer-energy/prosumer-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod block;

mod client;
pub use client::{ClientConfig, ClientSource, client_features};

mod gas;
pub use gas::{GasConfig, GasSource, gas_features};

mod electricity;
pub use electricity::{ElectricityConfig, ElectricitySource, electricity_features};

mod historical;
pub use historical::{HistoricalWeatherConfig, HistoricalWeatherSource};

mod forecast;
pub use forecast::{ForecastWeatherConfig, ForecastWeatherSource};

mod calendar;
pub use calendar::{
    CalendarFeatures, CalendarSource, DAY_PERIOD_HOURS, MONTH_PERIOD_HOURS, YEAR_PERIOD_HOURS,
    YEAR_PHASE_HOURS, time_features,
};
