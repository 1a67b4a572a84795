//! Divisions, air wings and fleets on the map

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::types::{BattleId, LatLon, UnitId};
use crate::scenario::{Country, UnitCategory, UnitTypeId};

/// Upper bound of strength, morale and supply
pub const STAT_MAX: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitState {
    Idle,
    Moving,
    Fighting,
    Retreating,
    Recovering,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub name: String,
    pub country: Country,
    pub unit_type: UnitTypeId,
    pub category: UnitCategory,
    pub position: LatLon,
    pub target: Option<LatLon>,
    pub state: UnitState,
    pub strength: f64,
    pub morale: f64,
    pub supply: f64,
    /// Radians, 0 = north
    pub heading: f64,
    pub battle: Option<BattleId>,
}

/// Live units keyed by id; iteration order is the tick's processing order
pub type UnitRoster = BTreeMap<UnitId, Unit>;

fn clamp_stat(value: f64) -> f64 {
    value.clamp(0.0, STAT_MAX)
}

impl Unit {
    pub fn new(
        id: UnitId,
        name: impl Into<String>,
        country: Country,
        unit_type: UnitTypeId,
        category: UnitCategory,
        position: LatLon,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            country,
            unit_type,
            category,
            position,
            target: None,
            state: UnitState::Idle,
            strength: STAT_MAX,
            morale: STAT_MAX,
            supply: STAT_MAX,
            heading: 0.0,
            battle: None,
        }
    }

    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = clamp_stat(strength);
        self
    }

    pub fn with_morale(mut self, morale: f64) -> Self {
        self.morale = clamp_stat(morale);
        self
    }

    pub fn with_supply(mut self, supply: f64) -> Self {
        self.supply = clamp_stat(supply);
        self
    }

    pub fn with_state(mut self, state: UnitState) -> Self {
        self.state = state;
        self
    }

    pub fn is_alive(&self) -> bool {
        self.strength > 0.0
    }

    pub fn is_land(&self) -> bool {
        self.category == UnitCategory::Land
    }

    pub fn adjust_strength(&mut self, delta: f64) {
        self.strength = clamp_stat(self.strength + delta);
    }

    pub fn adjust_morale(&mut self, delta: f64) {
        self.morale = clamp_stat(self.morale + delta);
    }

    pub fn adjust_supply(&mut self, delta: f64) {
        self.supply = clamp_stat(self.supply + delta);
    }

    /// Head for `target` in the given state
    pub fn order(&mut self, target: LatLon, state: UnitState) {
        self.target = Some(target);
        self.state = state;
    }

    pub fn distance_to(&self, at: LatLon) -> f64 {
        self.position.distance(&at)
    }
}
