//! Error types shared by feature sources and lag transforms.

use polars::prelude::PolarsError;
use prosumer_utils::UtilsError;

/// Errors that can occur while building a feature table.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Column or timestamp error raised while reading a table.
    #[error(transparent)]
    Utils(#[from] UtilsError),

    /// Polars error.
    #[error("data processing error: {0}")]
    Polars(#[from] PolarsError),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SourceError {
    /// Missing required column.
    #[must_use]
    pub fn missing_column(name: impl Into<String>) -> Self {
        Self::Utils(UtilsError::MissingColumn(name.into()))
    }

    /// Returns whether the failure stems from the input data itself.
    #[must_use]
    pub const fn is_data_error(&self) -> bool {
        matches!(
            self,
            Self::Utils(
                UtilsError::MissingColumn(_)
                    | UtilsError::Parse { .. }
                    | UtilsError::UnsupportedType { .. }
            )
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_column_display_is_transparent() {
        let err = SourceError::missing_column("euros_per_mwh");
        assert_eq!(err.to_string(), "missing column: euros_per_mwh");
        assert!(err.is_data_error());
    }

    #[test]
    fn config_error_is_not_data_error() {
        let err = SourceError::InvalidConfig("negative latency".to_string());
        assert!(!err.is_data_error());
        assert_eq!(err.to_string(), "invalid configuration: negative latency");
    }
}
