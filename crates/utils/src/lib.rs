#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/prosumer-energy/prosumer-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod fill;
pub use fill::{fill_forward, fill_forward_all};

mod frame;
pub use frame::{
    cast_columns, column_names, has_column, is_numeric, numeric_columns, rename_columns,
    require_columns,
};

mod temporal;
pub use temporal::{index_series, index_values, parse_timestamp, timestamps};

mod error;
pub use error::UtilsError;
