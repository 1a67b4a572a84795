//! Unit decision making
//!
//! Each tick every unit not locked in combat picks a target and a state
//! from the current world. Aircraft chase battles and enemy units, fleets
//! patrol, and land divisions retreat, recover, reinforce battles, advance
//! on nearby enemies or push into enemy country.

use std::f64::consts::TAU;

use ordered_float::OrderedFloat;
use rand::Rng;

use super::battle::BattleManager;
use super::supply::SupplyNetwork;
use super::unit::{Unit, UnitRoster, UnitState};
use crate::core::types::LatLon;
use crate::scenario::{Scenario, UnitCategory};

/// Aircraft below this supply fly home
pub const LOW_SUPPLY: f64 = 30.0;

/// Aircraft this close to an enemy strafe it
pub const STRAFE_RANGE: f64 = 0.2;
pub const STRAFE_DAMAGE: f64 = 0.5;

/// Fleets patrol to a point within this distance
pub const WANDER_RADIUS: f64 = 0.25;

pub const RETREAT_STRENGTH: f64 = 30.0;
pub const RETREAT_MORALE: f64 = 20.0;

/// Longest leg of a retreat toward the capital, recomputed every tick
pub const RETREAT_LEG: f64 = 2.0;

/// Recovering units rejoin once strength and morale both exceed this
pub const RECOVERED: f64 = 90.0;

pub const BATTLE_JOIN_RANGE: f64 = 2.0;
pub const DETECTION_RANGE: f64 = 2.5;

/// Allies within this range and above this strength count as support
pub const SUPPORT_RANGE: f64 = 1.0;
pub const SUPPORT_MIN_STRENGTH: f64 = 20.0;

/// More supporting allies than this and the approach is spread sideways
pub const CROWD_THRESHOLD: usize = 3;
pub const SPREAD_FACTOR: f64 = 0.25;

pub const ADVANCE_STRENGTH: f64 = 30.0;
pub const ADVANCE_CHANCE: f64 = 0.7;

/// Area-conquest targets lie within this many degrees of the enemy capital
pub const CONQUEST_SPREAD: f64 = 5.0;
pub const SECURE_SPREAD: f64 = 1.5;
pub const SECURE_RADIUS: f64 = 2.0;

pub const COHESION_RANGE: f64 = 0.2;
pub const COHESION_STRENGTH: f64 = 0.5;

/// A moving unit with no enemy anywhere keeps a target farther than this
pub const HOLD_DISTANCE: f64 = 0.5;

/// Point at most [`RETREAT_LEG`] from `from` on the line to `home`
pub fn retreat_point(from: LatLon, home: LatLon) -> LatLon {
    let to_home = home - from;
    let total = to_home.length();
    if total < 1e-9 {
        return home;
    }
    from + to_home * (total.min(RETREAT_LEG) / total)
}

/// Read-only view of the world a unit decides against
pub struct Planner<'a> {
    scenario: &'a Scenario,
    battles: &'a BattleManager,
    supply: &'a SupplyNetwork,
}

impl<'a> Planner<'a> {
    pub fn new(scenario: &'a Scenario, battles: &'a BattleManager, supply: &'a SupplyNetwork) -> Self {
        Self { scenario, battles, supply }
    }

    /// Decide for `unit`. `others` is every other live unit; aircraft may
    /// chip one of them directly.
    pub fn plan<R: Rng + ?Sized>(&self, unit: &mut Unit, others: &mut UnitRoster, rng: &mut R) {
        if unit.state == UnitState::Fighting {
            return;
        }

        match unit.category {
            UnitCategory::Air => self.plan_air(unit, others),
            UnitCategory::Sea => self.plan_sea(unit, rng),
            UnitCategory::Land => self.plan_land(unit, others, rng),
        }
    }

    fn plan_air(&self, unit: &mut Unit, others: &mut UnitRoster) {
        if unit.supply < LOW_SUPPLY {
            if let Some(airfield) = self.supply.nearest_airfield(unit.country, unit.position) {
                unit.order(airfield, UnitState::Moving);
            }
            return;
        }

        if let Some(battle) = self.battles.with_friendly(unit.country, others) {
            unit.order(battle.location, UnitState::Moving);
            return;
        }

        let diplomacy = &self.scenario.diplomacy;
        let enemy = others
            .values_mut()
            .find(|e| e.is_alive() && diplomacy.is_at_war(unit.country, e.country));

        if let Some(enemy) = enemy {
            unit.order(enemy.position, UnitState::Moving);
            if unit.distance_to(enemy.position) < STRAFE_RANGE {
                enemy.adjust_strength(-STRAFE_DAMAGE);
                enemy.adjust_morale(-STRAFE_DAMAGE);
            }
        }
    }

    fn plan_sea<R: Rng + ?Sized>(&self, unit: &mut Unit, rng: &mut R) {
        if unit.state != UnitState::Idle {
            return;
        }
        let angle = rng.gen_range(0.0..TAU);
        let radius = WANDER_RADIUS * rng.gen::<f64>().sqrt();
        let offset = LatLon::new(radius * angle.cos(), radius * angle.sin());
        unit.order(unit.position + offset, UnitState::Moving);
    }

    fn plan_land<R: Rng + ?Sized>(&self, unit: &mut Unit, others: &UnitRoster, rng: &mut R) {
        if unit.strength < RETREAT_STRENGTH || unit.morale < RETREAT_MORALE {
            unit.state = UnitState::Retreating;
        }

        if unit.state == UnitState::Retreating {
            if let Some(capital) = self.scenario.capital(unit.country) {
                unit.target = Some(retreat_point(unit.position, capital));
            }
            return;
        }

        if unit.state == UnitState::Recovering {
            if unit.strength > RECOVERED && unit.morale > RECOVERED {
                unit.state = UnitState::Idle;
            } else {
                return;
            }
        }

        if let Some(battle) = self.battles.joinable_near(unit, others, BATTLE_JOIN_RANGE) {
            unit.order(battle.location, UnitState::Moving);
            return;
        }

        let diplomacy = &self.scenario.diplomacy;
        let nearest = others
            .values()
            .filter(|e| e.is_alive() && e.is_land() && diplomacy.is_at_war(unit.country, e.country))
            .map(|e| (e.position, unit.distance_to(e.position)))
            .min_by_key(|&(_, d)| OrderedFloat(d));

        if unit.state == UnitState::Moving && nearest.is_none() {
            if let Some(target) = unit.target {
                if unit.distance_to(target) > HOLD_DISTANCE {
                    return;
                }
            }
        }

        match nearest {
            Some((enemy, distance)) if distance < DETECTION_RANGE => {
                self.advance(unit, enemy, others, rng)
            }
            _ => self.conquer_area(unit, rng),
        }

        if unit.state == UnitState::Moving {
            apply_cohesion(unit, others);
        }
    }

    /// Close with an enemy at `enemy`, or fall back when weak and alone
    fn advance<R: Rng + ?Sized>(&self, unit: &mut Unit, enemy: LatLon, others: &UnitRoster, rng: &mut R) {
        let support = others
            .values()
            .filter(|a| {
                a.country == unit.country
                    && a.is_land()
                    && a.strength > SUPPORT_MIN_STRENGTH
                    && unit.distance_to(a.position) < SUPPORT_RANGE
            })
            .count();

        let mut target = enemy;
        if support > CROWD_THRESHOLD {
            let approach = enemy - unit.position;
            target += approach.perpendicular() * rng.gen_range(-SPREAD_FACTOR..=SPREAD_FACTOR);
        }

        if unit.strength > ADVANCE_STRENGTH || support > 0 || rng.gen_bool(ADVANCE_CHANCE) {
            unit.order(target, UnitState::Moving);
        } else {
            unit.state = UnitState::Retreating;
        }
    }

    /// Spread over the enemy country around its capital
    fn conquer_area<R: Rng + ?Sized>(&self, unit: &mut Unit, rng: &mut R) {
        let Some(capital) = self
            .scenario
            .diplomacy
            .primary_enemy(unit.country)
            .and_then(|enemy| self.scenario.capital(enemy))
        else {
            return;
        };

        let spread = if unit.distance_to(capital) < SECURE_RADIUS {
            SECURE_SPREAD
        } else {
            CONQUEST_SPREAD
        };
        let offset = LatLon::new(rng.gen_range(-spread..=spread), rng.gen_range(-spread..=spread));
        unit.order(capital + offset, UnitState::Moving);
    }
}

/// Push the target away from same-country land units standing too close
fn apply_cohesion(unit: &mut Unit, others: &UnitRoster) {
    let crowd: Vec<LatLon> = others
        .values()
        .filter(|a| {
            a.country == unit.country
                && a.is_land()
                && a.is_alive()
                && unit.distance_to(a.position) < COHESION_RANGE
        })
        .map(|a| unit.position - a.position)
        .collect();

    if crowd.is_empty() {
        return;
    }

    let push = crowd.into_iter().fold(LatLon::default(), |acc, d| acc + d);
    if let Some(target) = unit.target.as_mut() {
        *target += push * COHESION_STRENGTH;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::UnitId;
    use crate::military::battle::Side;
    use crate::scenario::{Country, CountryProfile, Diplomacy, UnitTypeId};
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const BERLIN: LatLon = LatLon { lat: 52.52, lon: 13.40 };
    const PARIS: LatLon = LatLon { lat: 48.85, lon: 2.35 };

    fn scenario() -> Scenario {
        let mut scenario = Scenario::new()
            .with_country(Country::Germany, CountryProfile::new(BERLIN))
            .with_country(Country::France, CountryProfile::new(PARIS));
        scenario.diplomacy = Diplomacy::from_wars([(Country::Germany, Country::France)]);
        scenario
    }

    fn unit(id: u32, country: Country, type_id: UnitTypeId, at: LatLon) -> Unit {
        let category = match type_id {
            UnitTypeId::Plane => UnitCategory::Air,
            UnitTypeId::Ship => UnitCategory::Sea,
            _ => UnitCategory::Land,
        };
        Unit::new(UnitId(id), format!("Unit {}", id), country, type_id, category, at)
    }

    fn roster(units: Vec<Unit>) -> UnitRoster {
        units.into_iter().map(|u| (u.id, u)).collect()
    }

    struct World {
        scenario: Scenario,
        battles: BattleManager,
        supply: SupplyNetwork,
    }

    impl World {
        fn new() -> Self {
            Self {
                scenario: scenario(),
                battles: BattleManager::new(),
                supply: SupplyNetwork::new(),
            }
        }

        fn planner(&self) -> Planner<'_> {
            Planner::new(&self.scenario, &self.battles, &self.supply)
        }
    }

    #[test]
    fn test_retreat_point_bounded() {
        let point = retreat_point(LatLon::new(0.0, 0.0), LatLon::new(0.0, 10.0));
        assert!((point.lon - 2.0).abs() < 1e-12);

        let home = LatLon::new(0.0, 1.0);
        assert_eq!(retreat_point(LatLon::new(0.0, 0.0), home), home);
    }

    #[test]
    fn test_fighting_units_skipped() {
        let world = World::new();
        let mut soldier = unit(1, Country::Germany, UnitTypeId::Infantry, BERLIN)
            .with_state(UnitState::Fighting)
            .with_strength(5.0);
        world.planner().plan(&mut soldier, &mut UnitRoster::new(), &mut StepRng::new(0, 1));
        assert_eq!(soldier.state, UnitState::Fighting);
        assert!(soldier.target.is_none());
    }

    #[test]
    fn test_aircraft_low_supply_returns_to_airfield() {
        let mut world = World::new();
        world.supply.establish_capital(Country::Germany, BERLIN);
        let mut wing = unit(1, Country::Germany, UnitTypeId::Plane, PARIS).with_supply(20.0);

        world.planner().plan(&mut wing, &mut UnitRoster::new(), &mut StepRng::new(0, 1));
        assert_eq!(wing.target, Some(BERLIN + LatLon::new(0.1, 0.1)));
        assert_eq!(wing.state, UnitState::Moving);
    }

    #[test]
    fn test_aircraft_supports_friendly_battle() {
        let mut world = World::new();
        let location = LatLon::new(49.5, 7.0);
        let id = world.battles.create(location);
        let mut others = roster(vec![unit(2, Country::Germany, UnitTypeId::Infantry, location)]);
        let mut soldier = others.remove(&UnitId(2)).unwrap();
        world.battles.get_mut(id).unwrap().add_unit(&mut soldier, Side::A);
        others.insert(soldier.id, soldier);

        let mut wing = unit(1, Country::Germany, UnitTypeId::Plane, BERLIN);
        world.planner().plan(&mut wing, &mut others, &mut StepRng::new(0, 1));
        assert_eq!(wing.target, Some(location));
    }

    #[test]
    fn test_aircraft_strafes_close_enemy() {
        let world = World::new();
        let mut others = roster(vec![unit(2, Country::France, UnitTypeId::Infantry, LatLon::new(49.0, 6.1))]);
        let mut wing = unit(1, Country::Germany, UnitTypeId::Plane, LatLon::new(49.0, 6.0));

        world.planner().plan(&mut wing, &mut others, &mut StepRng::new(0, 1));

        assert_eq!(wing.target, Some(LatLon::new(49.0, 6.1)));
        let target = &others[&UnitId(2)];
        assert!((target.strength - 99.5).abs() < 1e-9);
        assert!((target.morale - 99.5).abs() < 1e-9);
    }

    #[test]
    fn test_fleet_patrols_when_idle() {
        let world = World::new();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let start = LatLon::new(54.0, 7.0);
        let mut fleet = unit(1, Country::Germany, UnitTypeId::Ship, start);

        world.planner().plan(&mut fleet, &mut UnitRoster::new(), &mut rng);
        let target = fleet.target.unwrap();
        assert_eq!(fleet.state, UnitState::Moving);
        assert!(start.distance(&target) <= WANDER_RADIUS + 1e-12);

        // Already under way: unchanged
        world.planner().plan(&mut fleet, &mut UnitRoster::new(), &mut rng);
        assert_eq!(fleet.target, Some(target));
    }

    #[test]
    fn test_weak_unit_retreats_toward_capital() {
        let world = World::new();
        let start = LatLon::new(BERLIN.lat, BERLIN.lon - 10.0);
        let mut soldier = unit(1, Country::Germany, UnitTypeId::Infantry, start).with_strength(25.0);

        world.planner().plan(&mut soldier, &mut UnitRoster::new(), &mut StepRng::new(0, 1));

        assert_eq!(soldier.state, UnitState::Retreating);
        let target = soldier.target.unwrap();
        assert!((start.distance(&target) - RETREAT_LEG).abs() < 1e-9);
        assert!(target.distance(&BERLIN) < start.distance(&BERLIN));
    }

    #[test]
    fn test_recovering_waits_until_healed() {
        let world = World::new();
        let mut soldier = unit(1, Country::Germany, UnitTypeId::Infantry, BERLIN)
            .with_state(UnitState::Recovering)
            .with_strength(85.0);

        world.planner().plan(&mut soldier, &mut UnitRoster::new(), &mut StepRng::new(0, 1));
        assert_eq!(soldier.state, UnitState::Recovering);
        assert!(soldier.target.is_none());

        soldier.strength = 95.0;
        world.planner().plan(&mut soldier, &mut UnitRoster::new(), &mut StepRng::new(0, 1));
        assert_ne!(soldier.state, UnitState::Recovering);
    }

    #[test]
    fn test_joins_nearby_battle() {
        let mut world = World::new();
        let location = LatLon::new(49.0, 7.0);
        world.battles.create(location);
        let mut soldier = unit(1, Country::Germany, UnitTypeId::Infantry, LatLon::new(49.0, 8.5));

        world.planner().plan(&mut soldier, &mut UnitRoster::new(), &mut StepRng::new(0, 1));
        assert_eq!(soldier.target, Some(location));
        assert_eq!(soldier.state, UnitState::Moving);
    }

    #[test]
    fn test_advances_on_detected_enemy() {
        let world = World::new();
        let enemy_at = LatLon::new(49.0, 7.0);
        let mut others = roster(vec![unit(2, Country::France, UnitTypeId::Infantry, enemy_at)]);
        let mut soldier = unit(1, Country::Germany, UnitTypeId::Infantry, LatLon::new(49.0, 8.0));

        world.planner().plan(&mut soldier, &mut others, &mut StepRng::new(0, 1));
        assert_eq!(soldier.target, Some(enemy_at));
        assert_eq!(soldier.state, UnitState::Moving);
    }

    #[test]
    fn test_lone_weak_unit_may_fall_back() {
        let world = World::new();
        let mut others = roster(vec![unit(2, Country::France, UnitTypeId::Infantry, LatLon::new(49.0, 7.0))]);
        let mut soldier = unit(1, Country::Germany, UnitTypeId::Infantry, LatLon::new(49.0, 8.0))
            .with_strength(30.0);

        // Every roll fails
        world.planner().plan(&mut soldier, &mut others, &mut StepRng::new(u64::MAX, 0));
        assert_eq!(soldier.state, UnitState::Retreating);
    }

    #[test]
    fn test_crowded_approach_spreads_sideways() {
        let world = World::new();
        let enemy_at = LatLon::new(49.0, 7.0);
        let start = LatLon::new(49.0, 8.0);
        let mut units = vec![unit(2, Country::France, UnitTypeId::Infantry, enemy_at)];
        for i in 0..4 {
            units.push(unit(10 + i, Country::Germany, UnitTypeId::Infantry, LatLon::new(49.5, 8.0 + 0.1 * i as f64)));
        }
        let mut others = roster(units);
        let mut soldier = unit(1, Country::Germany, UnitTypeId::Infantry, start);

        world.planner().plan(&mut soldier, &mut others, &mut ChaCha8Rng::seed_from_u64(11));

        let target = soldier.target.unwrap();
        // Offset is perpendicular to the east-west approach
        assert!((target.lon - enemy_at.lon).abs() < 1e-9);
        assert!((target.lat - enemy_at.lat).abs() <= SPREAD_FACTOR + 1e-9);
    }

    #[test]
    fn test_area_conquest_around_enemy_capital() {
        let world = World::new();
        let mut soldier = unit(1, Country::Germany, UnitTypeId::Infantry, BERLIN);

        world.planner().plan(&mut soldier, &mut UnitRoster::new(), &mut ChaCha8Rng::seed_from_u64(5));

        let target = soldier.target.unwrap();
        assert_eq!(soldier.state, UnitState::Moving);
        assert!((target.lat - PARIS.lat).abs() <= CONQUEST_SPREAD);
        assert!((target.lon - PARIS.lon).abs() <= CONQUEST_SPREAD);
    }

    #[test]
    fn test_secures_area_near_enemy_capital() {
        let world = World::new();
        let mut soldier = unit(1, Country::Germany, UnitTypeId::Infantry, LatLon::new(49.5, 2.5));

        for seed in 0..10 {
            world.planner().plan(&mut soldier, &mut UnitRoster::new(), &mut ChaCha8Rng::seed_from_u64(seed));
            let target = soldier.target.unwrap();
            assert!((target.lat - PARIS.lat).abs() <= SECURE_SPREAD);
            assert!((target.lon - PARIS.lon).abs() <= SECURE_SPREAD);
            soldier.state = UnitState::Idle;
        }
    }

    #[test]
    fn test_holds_distant_target_without_enemies() {
        let world = World::new();
        let goal = LatLon::new(BERLIN.lat, BERLIN.lon - 3.0);
        let mut soldier = unit(1, Country::Germany, UnitTypeId::Infantry, BERLIN);
        soldier.order(goal, UnitState::Moving);

        world.planner().plan(&mut soldier, &mut UnitRoster::new(), &mut StepRng::new(0, 1));
        assert_eq!(soldier.target, Some(goal));
    }

    #[test]
    fn test_cohesion_pushes_target_away_from_neighbours() {
        let world = World::new();
        let start = LatLon::new(51.0, 10.0);
        let neighbour = unit(2, Country::Germany, UnitTypeId::Infantry, LatLon::new(51.1, 10.0));

        let mut alone = unit(1, Country::Germany, UnitTypeId::Infantry, start);
        world.planner().plan(&mut alone, &mut UnitRoster::new(), &mut ChaCha8Rng::seed_from_u64(9));

        let mut crowded = unit(1, Country::Germany, UnitTypeId::Infantry, start);
        world.planner().plan(&mut crowded, &mut roster(vec![neighbour]), &mut ChaCha8Rng::seed_from_u64(9));

        let shift = crowded.target.unwrap() - alone.target.unwrap();
        assert!((shift.lat + 0.05).abs() < 1e-9);
        assert!(shift.lon.abs() < 1e-9);
    }
}
