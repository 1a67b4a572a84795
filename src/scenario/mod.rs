//! Static scenario data
//!
//! Countries, diplomacy, the unit catalog and the geographic lookups are
//! loaded once and never change during a run.

pub mod classifier;
pub mod country;
pub mod diplomacy;
pub mod loader;
pub mod unit_type;

use std::collections::BTreeMap;

pub use classifier::{BoxClassifier, ExclusionZones, GeoBox, RegionClassifier, RegionRule};
pub use country::{Country, CountryProfile, FrontLine};
pub use diplomacy::{Diplomacy, Relation};
pub use loader::{load_scenario, parse_scenario, BUILTIN_SCENARIO};
pub use unit_type::{UnitCatalog, UnitCategory, UnitType, UnitTypeId};

use crate::core::config::SimulationConfig;
use crate::core::error::{FrontlineError, Result};
use crate::core::types::LatLon;

#[derive(Debug, Clone)]
pub struct Scenario {
    pub config: SimulationConfig,
    pub unit_types: UnitCatalog,
    pub countries: BTreeMap<Country, CountryProfile>,
    pub diplomacy: Diplomacy,
    pub classifier: BoxClassifier,
    pub exclusion: ExclusionZones,
}

impl Scenario {
    /// Empty scenario with default config and catalog, for building by hand
    pub fn new() -> Self {
        Self {
            config: SimulationConfig::default(),
            unit_types: UnitCatalog::default(),
            countries: BTreeMap::new(),
            diplomacy: Diplomacy::new(),
            classifier: BoxClassifier::new(),
            exclusion: ExclusionZones::default(),
        }
    }

    /// The 1939 western-front scenario shipped with the crate
    pub fn builtin() -> Result<Self> {
        parse_scenario(BUILTIN_SCENARIO)
    }

    pub fn with_country(mut self, country: Country, profile: CountryProfile) -> Self {
        self.countries.insert(country, profile);
        self
    }

    pub fn capital(&self, country: Country) -> Option<LatLon> {
        self.countries.get(&country).map(|p| p.capital)
    }

    pub fn validate(&self) -> Result<()> {
        self.config.validate()?;

        if self.countries.is_empty() {
            return Err(FrontlineError::InvalidScenario(
                "scenario defines no countries".into(),
            ));
        }

        for (country, profile) in &self.countries {
            if !(0.0..=1.0).contains(&profile.tank_share) {
                return Err(FrontlineError::InvalidScenario(format!(
                    "{}: tank_share {} outside [0, 1]",
                    country, profile.tank_share
                )));
            }
        }

        for (a, b) in self.diplomacy.war_pairs() {
            for country in [a, b] {
                if !self.countries.contains_key(&country) {
                    return Err(FrontlineError::InvalidScenario(format!(
                        "{} is at war but has no country profile",
                        country
                    )));
                }
            }
        }

        for (id, unit_type) in self.unit_types.iter() {
            if unit_type.speed < 0.0 || unit_type.supply_usage < 0.0 {
                return Err(FrontlineError::InvalidScenario(format!(
                    "{:?}: speed and supply usage must be non-negative",
                    id
                )));
            }
        }

        Ok(())
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Self::new()
    }
}
