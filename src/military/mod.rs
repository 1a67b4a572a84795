//! Units and what they do each tick: fight, resupply, decide, move

pub mod ai;
pub mod battle;
pub mod movement;
pub mod supply;
pub mod unit;

pub use ai::Planner;
pub use battle::{combat_damage, Battle, BattleManager, Side, MAX_SIDE_UNITS};
pub use movement::{move_unit, MoveOutcome};
pub use supply::{Airfield, Depot, DepotId, SupplyNetwork};
pub use unit::{Unit, UnitRoster, UnitState};
