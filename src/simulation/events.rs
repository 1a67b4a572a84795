//! Notable occurrences during a tick and the hook that receives them

use serde::{Deserialize, Serialize};

use crate::core::types::{BattleId, LatLon, UnitId};
use crate::scenario::Country;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    WarBegan { belligerents: Vec<(Country, Country)> },
    BattleStarted { battle: BattleId, location: LatLon, attacker: String, defender: String },
    UnitDestroyed { unit: UnitId, name: String, country: Country },
    UnitFled { unit: UnitId, name: String },
    UnitRegrouped { unit: UnitId, name: String, with: String },
    BattleEnded { battle: BattleId, winner: Option<Country>, cells_captured: usize },
}

impl SimEvent {
    /// Display text handed to the event hook
    pub fn message(&self) -> String {
        match self {
            Self::WarBegan { belligerents } => {
                let wars: Vec<String> = belligerents
                    .iter()
                    .map(|(a, b)| format!("{} and {}", a, b))
                    .collect();
                format!("War has begun: {} are at war", wars.join("; "))
            }
            Self::BattleStarted { attacker, defender, .. } => {
                format!("Battle started: {} against {}", attacker, defender)
            }
            Self::UnitDestroyed { name, country, .. } => {
                format!("Loss: {} ({}) was destroyed", name, country)
            }
            Self::UnitFled { name, .. } => format!("{} panics and flees the battlefield", name),
            Self::UnitRegrouped { name, with, .. } => format!("{} regrouped with {}", name, with),
            Self::BattleEnded { winner: Some(country), cells_captured, .. } => {
                format!("Battle won by {} ({} cells taken)", country, cells_captured)
            }
            Self::BattleEnded { winner: None, .. } => "Battle ended with no survivors".to_string(),
        }
    }

    pub fn is_major(&self) -> bool {
        matches!(
            self,
            Self::WarBegan { .. } | Self::BattleStarted { .. } | Self::UnitDestroyed { .. }
        )
    }

    /// Forward to `tracing` at the level matching the event's weight
    pub fn log(&self) {
        if self.is_major() {
            tracing::info!("{}", self.message());
        } else {
            tracing::debug!("{}", self.message());
        }
    }
}

/// Receives `(message, is_major)` for every event; display and throttling
/// are up to the implementor.
pub trait EventHook {
    fn on_event(&mut self, message: &str, major: bool);
}

impl<F> EventHook for F
where
    F: FnMut(&str, bool),
{
    fn on_event(&mut self, message: &str, major: bool) {
        self(message, major)
    }
}
