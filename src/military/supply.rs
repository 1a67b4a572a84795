//! Supply network
//!
//! Units burn supply every tick. Standing near an own depot, or resting
//! in the recovering state, restores supply, strength and morale. A unit
//! with nothing left loses morale.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use super::unit::{Unit, UnitState};
use crate::core::types::LatLon;
use crate::scenario::Country;

/// Multiplier on a unit type's supply usage per tick
pub const SUPPLY_USAGE_FACTOR: f64 = 0.005;

/// Units within this distance of an own depot are resupplied
pub const DEPOT_RANGE: f64 = 2.0;

pub const RESUPPLY_AMOUNT: f64 = 2.0;
pub const RESUPPLY_STRENGTH: f64 = 0.5;
pub const RESUPPLY_MORALE: f64 = 1.0;

/// Morale lost per tick while supply is empty
pub const EMPTY_SUPPLY_MORALE_LOSS: f64 = 0.2;

/// Initial pool of a capital depot
pub const CAPITAL_DEPOT_POOL: f64 = 100_000.0;

/// Marker radius of a capital depot, carried into snapshots for display
pub const CAPITAL_DEPOT_RADIUS: f64 = 500.0;

/// Airfields sit this far north-east of the capital on both axes
pub const AIRFIELD_OFFSET: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DepotId(pub u32);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Depot {
    pub id: DepotId,
    pub country: Country,
    pub location: LatLon,
    /// Stockpile shown to renderers. Resupply never draws it down.
    pub supply: f64,
    /// Display radius of the depot marker. Resupply reach is [`DEPOT_RANGE`].
    pub radius: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Airfield {
    pub country: Country,
    pub location: LatLon,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupplyNetwork {
    pub depots: Vec<Depot>,
    pub airfields: Vec<Airfield>,
    next_depot_id: u32,
}

impl SupplyNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_depot(&mut self, country: Country, location: LatLon, supply: f64) -> DepotId {
        let id = DepotId(self.next_depot_id);
        self.next_depot_id += 1;
        self.depots.push(Depot {
            id,
            country,
            location,
            supply,
            radius: CAPITAL_DEPOT_RADIUS,
        });
        id
    }

    pub fn add_airfield(&mut self, country: Country, location: LatLon) {
        self.airfields.push(Airfield { country, location });
    }

    /// Depot and airfield for a country's capital
    pub fn establish_capital(&mut self, country: Country, capital: LatLon) -> DepotId {
        self.add_airfield(
            country,
            capital + LatLon::new(AIRFIELD_OFFSET, AIRFIELD_OFFSET),
        );
        self.add_depot(country, capital, CAPITAL_DEPOT_POOL)
    }

    /// Nearest own airfield to `from`
    pub fn nearest_airfield(&self, country: Country, from: LatLon) -> Option<LatLon> {
        self.airfields
            .iter()
            .filter(|a| a.country == country)
            .min_by_key(|a| OrderedFloat(a.location.distance(&from)))
            .map(|a| a.location)
    }

    /// Per-tick supply step for one unit: usage drain, restoration near an
    /// own depot or while recovering, and morale loss on an empty supply.
    pub fn resupply(&self, unit: &mut Unit, usage_rate: f64) {
        unit.adjust_supply(-usage_rate * SUPPLY_USAGE_FACTOR);

        let near_depot = self
            .depots
            .iter()
            .any(|d| d.country == unit.country && unit.distance_to(d.location) < DEPOT_RANGE);

        if unit.state == UnitState::Recovering || near_depot {
            unit.adjust_supply(RESUPPLY_AMOUNT);
            unit.adjust_strength(RESUPPLY_STRENGTH);
            unit.adjust_morale(RESUPPLY_MORALE);
        }

        if unit.supply <= 0.0 {
            unit.adjust_morale(-EMPTY_SUPPLY_MORALE_LOSS);
        }
    }
}
