#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/prosumer-energy/prosumer-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod source;
pub use source::{FeatureSource, SourceContext, SourceKind};

mod transform;
pub use transform::LagTransform;

mod error;
pub use error::SourceError;
