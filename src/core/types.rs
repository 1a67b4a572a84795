//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Simulation tick counter (one hour of simulated time per tick)
pub type Tick = u64;

/// Unique identifier for units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub u32);

/// Unique identifier for battles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BattleId(pub u32);

/// Geographic position in degrees.
///
/// Distances are plain Euclidean distances in degree space, which is what
/// every range constant in the simulation is expressed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn distance(&self, other: &Self) -> f64 {
        let dlat = self.lat - other.lat;
        let dlon = self.lon - other.lon;
        (dlat * dlat + dlon * dlon).sqrt()
    }

    pub fn length(&self) -> f64 {
        (self.lat * self.lat + self.lon * self.lon).sqrt()
    }

    /// Vector rotated a quarter turn, used for sideways offsets
    pub fn perpendicular(&self) -> Self {
        Self {
            lat: -self.lon,
            lon: self.lat,
        }
    }

    /// Bearing in radians, 0 = north, positive towards east
    pub fn heading(&self) -> f64 {
        self.lon.atan2(self.lat)
    }
}

impl std::ops::Add for LatLon {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self { lat: self.lat + rhs.lat, lon: self.lon + rhs.lon }
    }
}

impl std::ops::AddAssign for LatLon {
    fn add_assign(&mut self, rhs: Self) {
        self.lat += rhs.lat;
        self.lon += rhs.lon;
    }
}

impl std::ops::Sub for LatLon {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self { lat: self.lat - rhs.lat, lon: self.lon - rhs.lon }
    }
}

impl std::ops::Mul<f64> for LatLon {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self { lat: self.lat * rhs, lon: self.lon * rhs }
    }
}
