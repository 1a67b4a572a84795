//! Coarse geographic lookups: nominal country of a coordinate and no-entry zones
//!
//! Both are driven by latitude/longitude boxes from the scenario file.

use geo::{coord, Contains, Intersects, Rect};
use serde::{Deserialize, Serialize};

use super::country::Country;
use crate::core::types::LatLon;

/// Maps a coordinate to its nominal country. `None` means neutral ground.
pub trait RegionClassifier {
    fn classify(&self, at: LatLon) -> Option<Country>;
}

fn default_min_lat() -> f64 {
    -90.0
}

fn default_max_lat() -> f64 {
    90.0
}

fn default_min_lon() -> f64 {
    -180.0
}

fn default_max_lon() -> f64 {
    180.0
}

/// Axis-aligned lat/lon box. Omitted bounds extend to the edge of the globe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBox {
    #[serde(default = "default_min_lat")]
    pub min_lat: f64,
    #[serde(default = "default_max_lat")]
    pub max_lat: f64,
    #[serde(default = "default_min_lon")]
    pub min_lon: f64,
    #[serde(default = "default_max_lon")]
    pub max_lon: f64,
}

impl GeoBox {
    pub fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self { min_lat, max_lat, min_lon, max_lon }
    }

    fn rect(&self) -> Rect<f64> {
        Rect::new(
            coord! { x: self.min_lon, y: self.min_lat },
            coord! { x: self.max_lon, y: self.max_lat },
        )
    }

    /// Strictly inside, boundary excluded
    pub fn contains_strict(&self, at: LatLon) -> bool {
        self.rect().contains(&coord! { x: at.lon, y: at.lat })
    }

    /// Inside or on the boundary
    pub fn contains_inclusive(&self, at: LatLon) -> bool {
        self.rect().intersects(&coord! { x: at.lon, y: at.lat })
    }
}

/// A box belonging to a country
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionRule {
    pub country: Country,
    #[serde(flatten)]
    pub bounds: GeoBox,
}

/// First-match box classifier.
///
/// Neutral boxes are checked first (strict bounds), then country boxes in
/// file order (inclusive bounds). Anything unmatched is neutral.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxClassifier {
    #[serde(default)]
    pub neutral: Vec<GeoBox>,
    #[serde(default)]
    pub region: Vec<RegionRule>,
}

impl BoxClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_neutral(mut self, bounds: GeoBox) -> Self {
        self.neutral.push(bounds);
        self
    }

    pub fn with_region(mut self, country: Country, bounds: GeoBox) -> Self {
        self.region.push(RegionRule { country, bounds });
        self
    }
}

impl RegionClassifier for BoxClassifier {
    fn classify(&self, at: LatLon) -> Option<Country> {
        if self.neutral.iter().any(|b| b.contains_strict(at)) {
            return None;
        }
        self.region
            .iter()
            .find(|rule| rule.bounds.contains_inclusive(at))
            .map(|rule| rule.country)
    }
}

/// Fixed no-entry zones units may never step into
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExclusionZones {
    pub zones: Vec<GeoBox>,
}

impl ExclusionZones {
    pub fn new(zones: Vec<GeoBox>) -> Self {
        Self { zones }
    }

    pub fn allows(&self, at: LatLon) -> bool {
        !self.zones.iter().any(|z| z.contains_strict(at))
    }
}
