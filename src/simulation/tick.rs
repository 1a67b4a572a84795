//! Tick system - one hour of war
//!
//! Phases run strictly in order:
//! 1. Combat round in every battle
//! 2. Per live unit, in id order: supply, decision, movement, contact check
//! 3. Removal of destroyed units
//! 4. Finalization of battles with an empty side (territory award)

use ahash::AHashSet;
use rand::Rng;

use super::events::SimEvent;
use super::world::World;
use crate::core::types::{Tick, UnitId};
use crate::military::{move_unit, MoveOutcome, Planner, UnitState};

/// Advance the world by one tick and return what happened
pub fn run_tick<R: Rng>(world: &mut World<R>) -> Vec<SimEvent> {
    world.calendar.advance();
    let now = world.calendar.current_tick();

    let mut events = world
        .battles
        .resolve_all(&mut world.units, &world.scenario, &mut world.rng);

    let ids: Vec<UnitId> = world.units.keys().copied().collect();
    for id in ids {
        step_unit(world, id, now, &mut events);
    }

    remove_destroyed(world, &mut events);
    events.extend(world.battles.finalize(&mut world.units, &mut world.grid, now));

    for event in &events {
        event.log();
    }
    tracing::debug!(
        "Tick {} ({}): {} units, {} battles, {} cells held",
        now,
        world.calendar.current_date(),
        world.units.len(),
        world.battles.len(),
        world.grid.len()
    );

    events
}

/// Supply, decision, movement and contact for one unit.
///
/// The unit is taken out of the roster for the duration so it can be
/// mutated alongside the rest of the world.
fn step_unit<R: Rng>(world: &mut World<R>, id: UnitId, now: Tick, events: &mut Vec<SimEvent>) {
    let Some(mut unit) = world.units.remove(&id) else {
        return;
    };

    if unit.is_alive() {
        let unit_type = world.scenario.unit_types.get(unit.unit_type);

        world.supply.resupply(&mut unit, unit_type.supply_usage);

        Planner::new(&world.scenario, &world.battles, &world.supply).plan(
            &mut unit,
            &mut world.units,
            &mut world.rng,
        );

        let outcome = move_unit(
            &mut unit,
            &world.units,
            unit_type,
            &world.scenario.exclusion,
            &mut world.grid,
            now,
        );
        if let MoveOutcome::Regrouped { with } = outcome {
            events.push(SimEvent::UnitRegrouped {
                unit: unit.id,
                name: unit.name.clone(),
                with: world.units.get(&with).map(|a| a.name.clone()).unwrap_or_default(),
            });
        }

        if unit.state != UnitState::Fighting && unit.is_land() {
            if let Some(event) = world.battles.engage(&mut unit, &mut world.units, &world.scenario.diplomacy) {
                events.push(event);
            }
        }
    }

    world.units.insert(id, unit);
}

/// Drop units with no strength left from the roster and from any battle
/// still listing them
fn remove_destroyed<R: Rng>(world: &mut World<R>, events: &mut Vec<SimEvent>) {
    let reported: AHashSet<UnitId> = events
        .iter()
        .filter_map(|e| match e {
            SimEvent::UnitDestroyed { unit, .. } => Some(*unit),
            _ => None,
        })
        .collect();

    let dead: Vec<UnitId> = world
        .units
        .values()
        .filter(|u| !u.is_alive())
        .map(|u| u.id)
        .collect();

    for id in dead {
        let Some(unit) = world.units.remove(&id) else {
            continue;
        };
        world.battles.forget_unit(id);
        if !reported.contains(&id) {
            events.push(SimEvent::UnitDestroyed {
                unit: id,
                name: unit.name,
                country: unit.country,
            });
        }
    }
}
