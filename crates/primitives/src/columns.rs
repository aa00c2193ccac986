//! Column names shared across tables.

/// Hourly join key.
pub const TIME_ID: &str = "time_id";
/// Daily availability key.
pub const DATA_BLOCK_ID: &str = "data_block_id";
/// County identifier.
pub const COUNTY: &str = "county";
/// Business customer flag.
pub const IS_BUSINESS: &str = "is_business";
/// Contract product type.
pub const PRODUCT_TYPE: &str = "product_type";
/// Consumption (1) or production (0).
pub const IS_CONSUMPTION: &str = "is_consumption";
/// Label column.
pub const TARGET: &str = "target";
/// Timestamp of a base row.
pub const DATETIME: &str = "datetime";

/// Client table date.
pub const DATE: &str = "date";
/// Number of consumption points.
pub const EIC_COUNT: &str = "eic_count";
/// Installed solar capacity.
pub const INSTALLED_CAPACITY: &str = "installed_capacity";

/// Price table date.
pub const FORECAST_DATE: &str = "forecast_date";
/// Lowest day-ahead gas price.
pub const LOWEST_PRICE_PER_MWH: &str = "lowest_price_per_mwh";
/// Highest day-ahead gas price.
pub const HIGHEST_PRICE_PER_MWH: &str = "highest_price_per_mwh";
/// Hourly electricity price.
pub const EUROS_PER_MWH: &str = "euros_per_mwh";

/// Weather grid latitude.
pub const LATITUDE: &str = "latitude";
/// Weather grid longitude.
pub const LONGITUDE: &str = "longitude";
/// Issue time of a weather forecast.
pub const ORIGIN_DATETIME: &str = "origin_datetime";
/// Valid time of a weather forecast.
pub const FORECAST_DATETIME: &str = "forecast_datetime";
/// Forecast horizon.
pub const HOURS_AHEAD: &str = "hours_ahead";

/// Keys identifying one target series.
pub const SEGMENT_KEYS: [&str; 4] = [IS_CONSUMPTION, IS_BUSINESS, PRODUCT_TYPE, COUNTY];

/// Keys joining a target lag onto the base table.
pub const TARGET_KEYS: [&str; 5] = [TIME_ID, IS_CONSUMPTION, IS_BUSINESS, PRODUCT_TYPE, COUNTY];

/// Keys joining client features onto the base table.
pub const CLIENT_KEYS: [&str; 4] = [PRODUCT_TYPE, COUNTY, IS_BUSINESS, DATA_BLOCK_ID];

/// Keys joining county weather onto the base table.
pub const WEATHER_KEYS: [&str; 2] = [TIME_ID, COUNTY];
