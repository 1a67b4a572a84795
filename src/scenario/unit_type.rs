//! Unit type catalog

use serde::{Deserialize, Serialize};

/// Identifier of a catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitTypeId {
    Infantry,
    Tank,
    Plane,
    Ship,
}

/// Broad movement domain; decides which AI routine a unit runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitCategory {
    Land,
    Air,
    Sea,
}

/// Immutable per-type statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitType {
    pub name: String,
    /// Degrees per tick at full morale, before the step factor
    pub speed: f64,
    pub attack: f64,
    pub defense: f64,
    /// Supply drained per tick, before the usage factor
    pub supply_usage: f64,
    pub category: UnitCategory,
    #[serde(default)]
    pub icon: char,
}

/// Fixed catalog keyed by [`UnitTypeId`]. Every id has an entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitCatalog {
    pub infantry: UnitType,
    pub tank: UnitType,
    pub plane: UnitType,
    pub ship: UnitType,
}

impl UnitCatalog {
    pub fn get(&self, id: UnitTypeId) -> &UnitType {
        match id {
            UnitTypeId::Infantry => &self.infantry,
            UnitTypeId::Tank => &self.tank,
            UnitTypeId::Plane => &self.plane,
            UnitTypeId::Ship => &self.ship,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (UnitTypeId, &UnitType)> {
        [
            (UnitTypeId::Infantry, &self.infantry),
            (UnitTypeId::Tank, &self.tank),
            (UnitTypeId::Plane, &self.plane),
            (UnitTypeId::Ship, &self.ship),
        ]
        .into_iter()
    }
}

impl Default for UnitCatalog {
    fn default() -> Self {
        Self {
            infantry: UnitType {
                name: "Infantry Division".to_string(),
                speed: 0.05,
                attack: 10.0,
                defense: 20.0,
                supply_usage: 1.0,
                category: UnitCategory::Land,
                icon: 'I',
            },
            tank: UnitType {
                name: "Panzer Division".to_string(),
                speed: 0.15,
                attack: 40.0,
                defense: 15.0,
                supply_usage: 3.0,
                category: UnitCategory::Land,
                icon: 'T',
            },
            plane: UnitType {
                name: "Air Wing".to_string(),
                speed: 0.8,
                attack: 30.0,
                defense: 5.0,
                supply_usage: 5.0,
                category: UnitCategory::Air,
                icon: 'A',
            },
            ship: UnitType {
                name: "Fleet".to_string(),
                speed: 0.1,
                attack: 50.0,
                defense: 50.0,
                supply_usage: 4.0,
                category: UnitCategory::Sea,
                icon: 'S',
            },
        }
    }
}
