//! Read-only copies of world state for rendering and reporting

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::world::World;
use crate::core::calendar::CalendarDate;
use crate::core::error::Result;
use crate::core::types::Tick;
use crate::military::{Airfield, Battle, Depot, Unit};
use crate::scenario::Country;

/// Complete picture of the world after a tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub tick: Tick,
    pub date: CalendarDate,
    pub units: Vec<Unit>,
    pub battles: Vec<Battle>,
    pub depots: Vec<Depot>,
    pub airfields: Vec<Airfield>,
    /// Cells held per country
    pub territory: BTreeMap<Country, usize>,
}

impl WorldSnapshot {
    pub fn capture<R>(world: &World<R>) -> Self {
        Self {
            tick: world.calendar.current_tick(),
            date: world.calendar.current_date(),
            units: world.units.values().cloned().collect(),
            battles: world.battles.iter().cloned().collect(),
            depots: world.supply.depots.clone(),
            airfields: world.supply.airfields.clone(),
            territory: world.grid.cell_counts(),
        }
    }

    /// Live units per country
    pub fn unit_counts(&self) -> BTreeMap<Country, usize> {
        let mut counts = BTreeMap::new();
        for unit in &self.units {
            *counts.entry(unit.country).or_insert(0) += 1;
        }
        counts
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
