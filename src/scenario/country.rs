//! Countries and their static scenario profiles

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::LatLon;

/// Every country the classifier can name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Country {
    Germany,
    France,
    Poland,
    Ussr,
    Uk,
}

impl Country {
    pub const ALL: [Country; 5] = [
        Country::Germany,
        Country::France,
        Country::Poland,
        Country::Ussr,
        Country::Uk,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Germany => "Germany",
            Self::France => "France",
            Self::Poland => "Poland",
            Self::Ussr => "USSR",
            Self::Uk => "United Kingdom",
        }
    }
}

impl std::fmt::Display for Country {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Segment along which a country deploys its opening army
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrontLine {
    pub start: LatLon,
    pub end: LatLon,
    /// Signed maximum offset from the segment, applied to both axes.
    /// Positive pushes east/north, negative west/south.
    pub depth: f64,
}

impl FrontLine {
    /// Point at fraction `t` along the segment, pushed back by `depth * d`
    pub fn deployment_point(&self, t: f64, d: f64) -> LatLon {
        let along = self.start + (self.end - self.start) * t;
        let offset = self.depth * d;
        LatLon::new(along.lat + offset, along.lon + offset)
    }
}

fn default_army_size() -> u32 {
    30
}

fn default_aircraft() -> u32 {
    6
}

/// Static per-country scenario data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryProfile {
    pub capital: LatLon,
    #[serde(default)]
    pub front_line: Option<FrontLine>,
    #[serde(default)]
    pub naval_spawns: Vec<LatLon>,
    #[serde(default = "default_army_size")]
    pub army_size: u32,
    /// Probability that a land division spawns as armour
    #[serde(default)]
    pub tank_share: f64,
    #[serde(default = "default_aircraft")]
    pub aircraft: u32,
    #[serde(default)]
    pub given_names: Vec<String>,
    #[serde(default)]
    pub surnames: Vec<String>,
}

impl CountryProfile {
    pub fn new(capital: LatLon) -> Self {
        Self {
            capital,
            front_line: None,
            naval_spawns: Vec::new(),
            army_size: default_army_size(),
            tank_share: 0.0,
            aircraft: default_aircraft(),
            given_names: Vec::new(),
            surnames: Vec::new(),
        }
    }

    /// Random commander-style display name for a new unit
    pub fn generate_name<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        match (self.given_names.choose(rng), self.surnames.choose(rng)) {
            (Some(given), Some(surname)) => format!("{} {}", given, surname),
            _ => "Unknown Soldier".to_string(),
        }
    }
}
