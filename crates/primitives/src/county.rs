//! Weather grid coordinates and their county mapping.

use std::collections::HashMap;

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::CountyId;

/// Grid coordinate key, `"{lat:.1}_{lon:.1}"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LatLonKey(String);

impl LatLonKey {
    /// Round both coordinates to one decimal and join them.
    #[must_use]
    pub fn from_coords(latitude: f64, longitude: f64) -> Self {
        Self(format!("{latitude:.1}_{longitude:.1}"))
    }

    /// Get the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LatLonKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for LatLonKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Read-only mapping from grid coordinates to counties.
///
/// Deserializes from a flat JSON object such as `{"57.6_21.7": 0}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountyMap {
    counties: HashMap<LatLonKey, CountyId>,
}

impl CountyMap {
    /// Create a mapping from `(key, county)` pairs.
    #[must_use]
    pub fn new(counties: HashMap<LatLonKey, CountyId>) -> Self {
        Self { counties }
    }

    /// County for an already formatted key.
    #[must_use]
    pub fn get(&self, key: &LatLonKey) -> Option<CountyId> {
        self.counties.get(key).copied()
    }

    /// County for raw coordinates, after one-decimal rounding.
    #[must_use]
    pub fn county_at(&self, latitude: f64, longitude: f64) -> Option<CountyId> {
        self.get(&LatLonKey::from_coords(latitude, longitude))
    }

    /// Number of mapped grid points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counties.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counties.is_empty()
    }
}

impl<K: Into<LatLonKey>, C: Into<CountyId>> FromIterator<(K, C)> for CountyMap {
    fn from_iter<I: IntoIterator<Item = (K, C)>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|(k, c)| (k.into(), c.into())).collect())
    }
}
