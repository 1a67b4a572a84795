//! World state
//!
//! Everything a tick mutates lives here and is owned by the simulation:
//! the unit roster, battles, supply network, territory grid, calendar and
//! random source. Subsystems receive the pieces they need as parameters.

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::events::SimEvent;
use super::snapshot::WorldSnapshot;
use crate::core::calendar::WarCalendar;
use crate::core::error::Result;
use crate::core::types::{LatLon, UnitId};
use crate::military::{BattleManager, SupplyNetwork, Unit, UnitRoster};
use crate::scenario::{Country, Scenario, UnitTypeId};
use crate::territory::TerritoryGrid;

/// Spread of opening positions around the capital when a country has no front line
pub const CAPITAL_SPAWN_LAT: f64 = 1.5;
pub const CAPITAL_SPAWN_LON: f64 = 2.5;

pub struct World<R = ChaCha8Rng> {
    pub scenario: Scenario,
    pub units: UnitRoster,
    pub battles: BattleManager,
    pub supply: SupplyNetwork,
    pub grid: TerritoryGrid,
    pub calendar: WarCalendar,
    pub rng: R,
    next_unit_id: u32,
}

impl World<ChaCha8Rng> {
    /// Empty world seeded from the scenario config, or from entropy when unseeded
    pub fn new(scenario: Scenario) -> Result<Self> {
        let rng = match scenario.config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self::with_rng(scenario, rng)
    }
}

impl<R: Rng> World<R> {
    /// Empty world drawing randomness from `rng`
    pub fn with_rng(scenario: Scenario, rng: R) -> Result<Self> {
        scenario.validate()?;

        let grid = TerritoryGrid::new(
            scenario.config.cell_size,
            Arc::new(scenario.classifier.clone()),
        );
        let calendar = WarCalendar::new(scenario.config.start_date);

        Ok(Self {
            scenario,
            units: UnitRoster::new(),
            battles: BattleManager::new(),
            supply: SupplyNetwork::new(),
            grid,
            calendar,
            rng,
            next_unit_id: 0,
        })
    }

    /// Add a fresh unit with a generated name
    pub fn spawn_unit(&mut self, country: Country, unit_type: UnitTypeId, position: LatLon) -> UnitId {
        let id = UnitId(self.next_unit_id);
        self.next_unit_id += 1;

        let name = match self.scenario.countries.get(&country) {
            Some(profile) => profile.generate_name(&mut self.rng),
            None => "Unknown Soldier".to_string(),
        };
        let category = self.scenario.unit_types.get(unit_type).category;

        self.units.insert(id, Unit::new(id, name, country, unit_type, category, position));
        id
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    /// Opening deployment for every country in the scenario.
    ///
    /// Each country gets a capital depot and airfield, its land army along
    /// the front line (or around the capital), its air wings at the capital
    /// and a fleet at each naval spawn point.
    pub fn deploy(&mut self) -> SimEvent {
        let countries: Vec<_> = self
            .scenario
            .countries
            .iter()
            .map(|(country, profile)| (*country, profile.clone()))
            .collect();

        for (country, profile) in countries {
            self.supply.establish_capital(country, profile.capital);

            for _ in 0..profile.army_size {
                let unit_type = if self.rng.gen_bool(profile.tank_share) {
                    UnitTypeId::Tank
                } else {
                    UnitTypeId::Infantry
                };

                let position = match profile.front_line {
                    Some(front) if front.depth != 0.0 => {
                        let t = self.rng.gen::<f64>();
                        let d = self.rng.gen::<f64>();
                        front.deployment_point(t, d)
                    }
                    _ => {
                        let dlat = self.rng.gen_range(-CAPITAL_SPAWN_LAT..=CAPITAL_SPAWN_LAT);
                        let dlon = self.rng.gen_range(-CAPITAL_SPAWN_LON..=CAPITAL_SPAWN_LON);
                        profile.capital + LatLon::new(dlat, dlon)
                    }
                };

                self.spawn_unit(country, unit_type, position);
            }

            for _ in 0..profile.aircraft {
                self.spawn_unit(country, UnitTypeId::Plane, profile.capital);
            }

            for &spawn in &profile.naval_spawns {
                self.spawn_unit(country, UnitTypeId::Ship, spawn);
            }

            tracing::debug!(
                "Deployed {}: {} land, {} air, {} naval",
                country,
                profile.army_size,
                profile.aircraft,
                profile.naval_spawns.len()
            );
        }

        SimEvent::WarBegan {
            belligerents: self.scenario.diplomacy.war_pairs(),
        }
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot::capture(self)
    }
}
