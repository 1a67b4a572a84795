//! Position integration
//!
//! Moving and retreating units step toward their target at a speed scaled
//! by morale. Steps into exclusion zones are refused, and every committed
//! step onto ground the unit's country does not hold captures it.

use super::unit::{Unit, UnitRoster, UnitState};
use crate::core::types::{Tick, UnitId};
use crate::scenario::{ExclusionZones, UnitType};
use crate::territory::TerritoryGrid;

/// Closer than this to the target counts as arrived
pub const ARRIVAL_DISTANCE: f64 = 0.02;

/// A retreating unit regroups with a steady ally this close
pub const REGROUP_RANGE: f64 = 0.5;

/// Fraction of the type speed covered per tick
pub const STEP_FACTOR: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Not moving, or no target
    Stationary,
    Arrived,
    /// Retreat ended next to a steady ally
    Regrouped { with: UnitId },
    /// Stepped forward; `captured` cells changed hands
    Advanced { captured: usize },
    /// Next step lay in an exclusion zone; target dropped
    Blocked,
}

pub fn move_unit(
    unit: &mut Unit,
    others: &UnitRoster,
    unit_type: &UnitType,
    exclusion: &ExclusionZones,
    grid: &mut TerritoryGrid,
    now: Tick,
) -> MoveOutcome {
    if !matches!(unit.state, UnitState::Moving | UnitState::Retreating) {
        return MoveOutcome::Stationary;
    }
    let Some(target) = unit.target else {
        return MoveOutcome::Stationary;
    };

    let to_target = target - unit.position;
    let distance = to_target.length();

    if distance < ARRIVAL_DISTANCE {
        if unit.state == UnitState::Retreating {
            let ally = others.values().find(|a| {
                a.country == unit.country
                    && a.is_alive()
                    && a.state != UnitState::Retreating
                    && unit.distance_to(a.position) < REGROUP_RANGE
            });
            if let Some(ally) = ally {
                unit.state = UnitState::Idle;
                return MoveOutcome::Regrouped { with: ally.id };
            }
            unit.state = UnitState::Recovering;
        } else {
            unit.state = UnitState::Idle;
        }
        return MoveOutcome::Arrived;
    }

    let step = unit_type.speed * (unit.morale / 100.0) * STEP_FACTOR;
    let next = unit.position + to_target * (step / distance);
    unit.heading = to_target.heading();

    if !exclusion.allows(next) {
        unit.state = UnitState::Idle;
        unit.target = None;
        return MoveOutcome::Blocked;
    }

    unit.position = next;
    let captured = if grid.owner(next) != Some(unit.country) {
        grid.conquer(next, unit.country, now)
    } else {
        0
    };

    MoveOutcome::Advanced { captured }
}
