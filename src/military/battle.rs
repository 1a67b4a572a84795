//! Group battles between land units
//!
//! A battle forms when opposing land units make contact, runs one combat
//! round per tick and is finalized at the end of the tick in which either
//! side empties. The surviving side's country takes the ground.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::unit::{Unit, UnitRoster, UnitState};
use crate::core::types::{BattleId, LatLon, Tick, UnitId};
use crate::scenario::{Country, Diplomacy, Scenario, UnitCatalog, UnitCategory, UnitType};
use crate::simulation::events::SimEvent;
use crate::territory::TerritoryGrid;

/// Maximum units on one side of a battle
pub const MAX_SIDE_UNITS: usize = 12;

/// Distance at which opposing land units engage
pub const CONTACT_RANGE: f64 = 0.1;

/// Friendly aircraft closer than this to a battle support their side
pub const AIR_SUPPORT_RANGE: f64 = 1.0;

/// Damage bonus per supporting aircraft
pub const AIR_SUPPORT_BONUS: f64 = 0.2;

/// Share of the defence total subtracted from the attack total
pub const DEFENSE_WEIGHT: f64 = 0.5;

/// Floor on base damage per round
pub const MIN_DAMAGE: f64 = 1.0;

pub const STRENGTH_DAMAGE_FACTOR: f64 = 0.1;
pub const MORALE_DAMAGE_FACTOR: f64 = 0.05;
pub const SUPPLY_LOSS_PER_HIT: f64 = 0.5;

/// Morale gained by every attacker when a defender is destroyed
pub const KILL_MORALE_BONUS: f64 = 10.0;

/// Defenders whose morale drops below this flee
pub const PANIC_MORALE: f64 = 15.0;

/// Morale gained by survivors when a battle ends
pub const VICTORY_MORALE_BONUS: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Battle {
    pub id: BattleId,
    pub location: LatLon,
    side_a: Vec<UnitId>,
    side_b: Vec<UnitId>,
    /// Combat rounds fought so far
    pub duration: u32,
}

impl Battle {
    pub fn new(id: BattleId, location: LatLon) -> Self {
        Self {
            id,
            location,
            side_a: Vec::new(),
            side_b: Vec::new(),
            duration: 0,
        }
    }

    pub fn side(&self, side: Side) -> &[UnitId] {
        match side {
            Side::A => &self.side_a,
            Side::B => &self.side_b,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut Vec<UnitId> {
        match side {
            Side::A => &mut self.side_a,
            Side::B => &mut self.side_b,
        }
    }

    /// Put `unit` on `side`. Rejected, leaving the unit untouched, when the
    /// side is full or the unit already belongs to a battle.
    pub fn add_unit(&mut self, unit: &mut Unit, side: Side) -> bool {
        if unit.battle.is_some() || self.side(side).len() >= MAX_SIDE_UNITS {
            return false;
        }
        self.side_mut(side).push(unit.id);
        unit.state = UnitState::Fighting;
        unit.battle = Some(self.id);
        true
    }

    /// Take `unit` out of whichever side holds it and clear its battle reference
    pub fn remove_unit(&mut self, unit: &mut Unit) -> Option<Side> {
        let side = self.remove_id(unit.id);
        if unit.battle == Some(self.id) {
            unit.battle = None;
        }
        side
    }

    /// Drop an id from the side lists without touching the unit record
    pub fn remove_id(&mut self, id: UnitId) -> Option<Side> {
        for side in [Side::A, Side::B] {
            let list = self.side_mut(side);
            if let Some(index) = list.iter().position(|&u| u == id) {
                list.remove(index);
                return Some(side);
            }
        }
        None
    }

    pub fn side_of(&self, id: UnitId) -> Option<Side> {
        if self.side_a.contains(&id) {
            Some(Side::A)
        } else if self.side_b.contains(&id) {
            Some(Side::B)
        } else {
            None
        }
    }

    /// One side has emptied
    pub fn is_resolved(&self) -> bool {
        self.side_a.is_empty() || self.side_b.is_empty()
    }

    pub fn participants(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.side_a.iter().chain(self.side_b.iter()).copied()
    }

    /// A side fights for the country of its first unit
    pub fn side_country(&self, side: Side, units: &UnitRoster) -> Option<Country> {
        self.side(side)
            .first()
            .and_then(|id| units.get(id))
            .map(|u| u.country)
    }

    pub fn involves(&self, country: Country, units: &UnitRoster) -> bool {
        [Side::A, Side::B]
            .into_iter()
            .any(|side| self.side_country(side, units) == Some(country))
    }

    /// False only when the side fighting for `country` is already full
    pub fn has_room_for(&self, country: Country, units: &UnitRoster) -> bool {
        [Side::A, Side::B].into_iter().all(|side| {
            self.side_country(side, units) != Some(country) || self.side(side).len() < MAX_SIDE_UNITS
        })
    }
}

/// Damage dealt by one side's attack in a round
pub fn combat_damage(attack_total: f64, defense_total: f64, air_support: usize) -> f64 {
    let base = (attack_total - DEFENSE_WEIGHT * defense_total).max(MIN_DAMAGE);
    base * (1.0 + AIR_SUPPORT_BONUS * air_support as f64)
}

/// Sum of a stat weighted by strength and morale
fn side_total(
    units: &UnitRoster,
    ids: &[UnitId],
    catalog: &UnitCatalog,
    stat: fn(&UnitType) -> f64,
) -> f64 {
    ids.iter()
        .filter_map(|id| units.get(id))
        .map(|u| stat(catalog.get(u.unit_type)) * (u.strength / 100.0) * (u.morale / 100.0))
        .sum()
}

fn air_support(units: &UnitRoster, country: Option<Country>, location: LatLon) -> usize {
    let Some(country) = country else {
        return 0;
    };
    units
        .values()
        .filter(|u| {
            u.category == UnitCategory::Air
                && u.is_alive()
                && u.country == country
                && u.distance_to(location) < AIR_SUPPORT_RANGE
        })
        .count()
}

/// `attacker` strikes one random defender
fn combat_round<R: Rng + ?Sized>(
    battle: &mut Battle,
    attacker: Side,
    air: usize,
    units: &mut UnitRoster,
    scenario: &Scenario,
    rng: &mut R,
    events: &mut Vec<SimEvent>,
) {
    let defender = attacker.opposite();
    if battle.side(attacker).is_empty() || battle.side(defender).is_empty() {
        return;
    }

    let catalog = &scenario.unit_types;
    let attack_total = side_total(units, battle.side(attacker), catalog, |t| t.attack);
    let defense_total = side_total(units, battle.side(defender), catalog, |t| t.defense);
    let damage = combat_damage(attack_total, defense_total, air);

    let defenders = battle.side(defender);
    let target_id = defenders[rng.gen_range(0..defenders.len())];
    let Some(target) = units.get_mut(&target_id) else {
        battle.remove_id(target_id);
        return;
    };

    target.adjust_strength(-STRENGTH_DAMAGE_FACTOR * damage);
    target.adjust_morale(-MORALE_DAMAGE_FACTOR * damage);
    target.adjust_supply(-SUPPLY_LOSS_PER_HIT);

    if !target.is_alive() {
        battle.remove_unit(target);
        events.push(SimEvent::UnitDestroyed {
            unit: target.id,
            name: target.name.clone(),
            country: target.country,
        });
        for id in battle.side(attacker) {
            if let Some(unit) = units.get_mut(id) {
                unit.adjust_morale(KILL_MORALE_BONUS);
            }
        }
    } else if target.morale < PANIC_MORALE {
        battle.remove_unit(target);
        target.state = UnitState::Retreating;
        target.target = scenario.capital(target.country);
        events.push(SimEvent::UnitFled {
            unit: target.id,
            name: target.name.clone(),
        });
    }
}

/// Owns every active battle
#[derive(Debug, Clone, Default)]
pub struct BattleManager {
    battles: BTreeMap<BattleId, Battle>,
    next_id: u32,
}

impl BattleManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.battles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.battles.is_empty()
    }

    pub fn get(&self, id: BattleId) -> Option<&Battle> {
        self.battles.get(&id)
    }

    pub fn get_mut(&mut self, id: BattleId) -> Option<&mut Battle> {
        self.battles.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Battle> {
        self.battles.values()
    }

    /// Open an empty battle at `location`
    pub fn create(&mut self, location: LatLon) -> BattleId {
        let id = BattleId(self.next_id);
        self.next_id += 1;
        self.battles.insert(id, Battle::new(id, location));
        id
    }

    /// One combat round in every battle: side A strikes, then side B
    pub fn resolve_all<R: Rng + ?Sized>(
        &mut self,
        units: &mut UnitRoster,
        scenario: &Scenario,
        rng: &mut R,
    ) -> Vec<SimEvent> {
        let mut events = Vec::new();

        for battle in self.battles.values_mut() {
            battle.duration += 1;

            let support_a = air_support(units, battle.side_country(Side::A, units), battle.location);
            let support_b = air_support(units, battle.side_country(Side::B, units), battle.location);

            combat_round(battle, Side::A, support_a, units, scenario, rng, &mut events);
            combat_round(battle, Side::B, support_b, units, scenario, rng, &mut events);
        }

        events
    }

    /// Contact check for a land unit that is not fighting.
    ///
    /// The first at-war enemy land unit within [`CONTACT_RANGE`] decides the
    /// outcome: if it is already fighting, `unit` joins the opposite side
    /// (silently dropped when full); otherwise a new battle opens at the
    /// unit's position.
    pub fn engage(
        &mut self,
        unit: &mut Unit,
        others: &mut UnitRoster,
        diplomacy: &Diplomacy,
    ) -> Option<SimEvent> {
        if !unit.is_land() || !unit.is_alive() || unit.state == UnitState::Fighting {
            return None;
        }

        let enemy = others.values_mut().find(|e| {
            e.is_alive()
                && e.is_land()
                && diplomacy.is_at_war(unit.country, e.country)
                && unit.distance_to(e.position) < CONTACT_RANGE
        })?;

        if let Some(battle_id) = enemy.battle {
            let battle = self.battles.get_mut(&battle_id)?;
            let enemy_side = battle.side_of(enemy.id)?;
            battle.add_unit(unit, enemy_side.opposite());
            return None;
        }

        let id = BattleId(self.next_id);
        self.next_id += 1;
        let mut battle = Battle::new(id, unit.position);
        battle.add_unit(unit, Side::A);
        battle.add_unit(enemy, Side::B);
        self.battles.insert(id, battle);

        Some(SimEvent::BattleStarted {
            battle: id,
            location: unit.position,
            attacker: unit.name.clone(),
            defender: enemy.name.clone(),
        })
    }

    /// Remove a unit id from every battle, for units leaving the roster
    pub fn forget_unit(&mut self, id: UnitId) {
        for battle in self.battles.values_mut() {
            battle.remove_id(id);
        }
    }

    /// First battle with a side fighting for `country`
    pub fn with_friendly(&self, country: Country, units: &UnitRoster) -> Option<&Battle> {
        self.battles.values().find(|b| b.involves(country, units))
    }

    /// First battle within `range` of `unit` that still has room for its country
    pub fn joinable_near(&self, unit: &Unit, units: &UnitRoster, range: f64) -> Option<&Battle> {
        self.battles
            .values()
            .find(|b| unit.distance_to(b.location) < range && b.has_room_for(unit.country, units))
    }

    /// Close every battle with an empty side. Survivors stand down with a
    /// morale boost and the first survivor's country takes the ground once.
    pub fn finalize(
        &mut self,
        units: &mut UnitRoster,
        grid: &mut TerritoryGrid,
        now: Tick,
    ) -> Vec<SimEvent> {
        let resolved: Vec<BattleId> = self
            .battles
            .values()
            .filter(|b| b.is_resolved())
            .map(|b| b.id)
            .collect();

        let mut events = Vec::new();
        for id in resolved {
            let Some(battle) = self.battles.remove(&id) else {
                continue;
            };

            let survivors: Vec<UnitId> = battle.participants().collect();
            let winner = survivors.first().and_then(|u| units.get(u)).map(|u| u.country);
            let cells_captured = winner
                .map(|country| grid.conquer(battle.location, country, now))
                .unwrap_or(0);

            for survivor in &survivors {
                if let Some(unit) = units.get_mut(survivor) {
                    unit.state = UnitState::Idle;
                    unit.battle = None;
                    unit.adjust_morale(VICTORY_MORALE_BONUS);
                }
            }

            events.push(SimEvent::BattleEnded {
                battle: id,
                winner,
                cells_captured,
            });
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{BoxClassifier, CountryProfile, GeoBox, UnitTypeId};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::sync::Arc;

    fn scenario() -> Scenario {
        Scenario::new()
            .with_country(Country::Germany, CountryProfile::new(LatLon::new(52.52, 13.40)))
            .with_country(Country::France, CountryProfile::new(LatLon::new(48.85, 2.35)))
    }

    fn land(id: u32, country: Country, at: LatLon) -> Unit {
        Unit::new(UnitId(id), format!("Unit {}", id), country, UnitTypeId::Infantry, UnitCategory::Land, at)
    }

    fn plane(id: u32, country: Country, at: LatLon) -> Unit {
        Unit::new(UnitId(id), format!("Wing {}", id), country, UnitTypeId::Plane, UnitCategory::Air, at)
    }

    /// One German and one French infantry division in a battle at the origin
    fn duel(german: Unit, french: Unit) -> (BattleManager, UnitRoster) {
        let mut manager = BattleManager::new();
        let mut units = UnitRoster::new();
        let id = manager.create(LatLon::new(0.0, 0.0));
        let battle = manager.get_mut(id).unwrap();
        let (mut a, mut b) = (german, french);
        assert!(battle.add_unit(&mut a, Side::A));
        assert!(battle.add_unit(&mut b, Side::B));
        units.insert(a.id, a);
        units.insert(b.id, b);
        (manager, units)
    }

    #[test]
    fn test_thirteenth_unit_rejected() {
        let mut battle = Battle::new(BattleId(0), LatLon::default());
        for i in 0..12 {
            let mut unit = land(i, Country::Germany, LatLon::default());
            assert!(battle.add_unit(&mut unit, Side::A));
        }

        let mut extra = land(99, Country::Germany, LatLon::default());
        assert!(!battle.add_unit(&mut extra, Side::A));
        assert_eq!(battle.side(Side::A).len(), MAX_SIDE_UNITS);
        assert_eq!(extra.state, UnitState::Idle);
        assert!(extra.battle.is_none());

        // The other side is unaffected
        assert!(battle.add_unit(&mut extra, Side::B));
    }

    #[test]
    fn test_unit_joins_only_one_battle() {
        let mut first = Battle::new(BattleId(0), LatLon::default());
        let mut second = Battle::new(BattleId(1), LatLon::default());
        let mut unit = land(1, Country::France, LatLon::default());

        assert!(first.add_unit(&mut unit, Side::A));
        assert!(!second.add_unit(&mut unit, Side::B));
        assert_eq!(unit.battle, Some(BattleId(0)));
    }

    #[test]
    fn test_remove_unit_clears_reference() {
        let mut battle = Battle::new(BattleId(3), LatLon::default());
        let mut unit = land(1, Country::France, LatLon::default());
        battle.add_unit(&mut unit, Side::B);

        assert_eq!(battle.remove_unit(&mut unit), Some(Side::B));
        assert!(unit.battle.is_none());
        assert!(battle.is_resolved());
        assert_eq!(battle.remove_unit(&mut unit), None);
    }

    #[test]
    fn test_damage_floor_and_air_bonus() {
        assert!((combat_damage(10.0, 20.0, 0) - 1.0).abs() < 1e-12);
        assert!((combat_damage(10.0, 20.0, 2) - 1.4).abs() < 1e-12);
        assert!((combat_damage(40.0, 20.0, 0) - 30.0).abs() < 1e-12);
    }

    #[test]
    fn test_infantry_round() {
        let (mut manager, mut units) = duel(
            land(1, Country::Germany, LatLon::default()),
            land(2, Country::France, LatLon::default()),
        );
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let events = manager.resolve_all(&mut units, &scenario(), &mut rng);
        assert!(events.is_empty());

        for id in [UnitId(1), UnitId(2)] {
            let unit = &units[&id];
            assert!((unit.strength - 99.9).abs() < 1e-9);
            assert!((unit.morale - 99.95).abs() < 1e-9);
            assert!((unit.supply - 99.5).abs() < 1e-9);
        }
        assert_eq!(manager.iter().next().unwrap().duration, 1);
    }

    #[test]
    fn test_air_support_increases_damage() {
        let (mut manager, mut units) = duel(
            land(1, Country::Germany, LatLon::default()),
            land(2, Country::France, LatLon::default()),
        );
        units.insert(UnitId(10), plane(10, Country::Germany, LatLon::new(0.5, 0.5)));
        // Out of range
        units.insert(UnitId(11), plane(11, Country::Germany, LatLon::new(1.0, 0.0)));
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        manager.resolve_all(&mut units, &scenario(), &mut rng);

        assert!((units[&UnitId(2)].strength - 99.88).abs() < 1e-9);
        assert!((units[&UnitId(1)].strength - 99.9).abs() < 1e-9);
    }

    #[test]
    fn test_kill_removes_defender_and_rewards_attackers() {
        let (mut manager, mut units) = duel(
            land(1, Country::Germany, LatLon::default()).with_morale(80.0),
            land(2, Country::France, LatLon::default()).with_strength(0.05),
        );
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let events = manager.resolve_all(&mut units, &scenario(), &mut rng);

        let dead = &units[&UnitId(2)];
        assert_eq!(dead.strength, 0.0);
        assert!(dead.battle.is_none());
        assert!((units[&UnitId(1)].morale - 90.0).abs() < 1e-9);
        assert!(matches!(events[0], SimEvent::UnitDestroyed { unit: UnitId(2), .. }));

        let battle = manager.iter().next().unwrap();
        assert!(battle.is_resolved());
        assert_eq!(battle.side(Side::A), &[UnitId(1)]);
    }

    #[test]
    fn test_panicked_defender_flees_home() {
        let (mut manager, mut units) = duel(
            land(1, Country::Germany, LatLon::default()),
            land(2, Country::France, LatLon::default()).with_morale(15.02),
        );
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let events = manager.resolve_all(&mut units, &scenario(), &mut rng);

        let fled = &units[&UnitId(2)];
        assert_eq!(fled.state, UnitState::Retreating);
        assert_eq!(fled.target, Some(LatLon::new(48.85, 2.35)));
        assert!(fled.battle.is_none());
        assert!(matches!(events[0], SimEvent::UnitFled { .. }));
    }

    #[test]
    fn test_engage_creates_battle() {
        let diplomacy = Diplomacy::from_wars([(Country::Germany, Country::France)]);
        let mut manager = BattleManager::new();
        let mut others = UnitRoster::new();
        others.insert(UnitId(2), land(2, Country::France, LatLon::new(0.0, 0.05)));
        let mut unit = land(1, Country::Germany, LatLon::default());

        let event = manager.engage(&mut unit, &mut others, &diplomacy);

        assert!(matches!(event, Some(SimEvent::BattleStarted { .. })));
        assert_eq!(manager.len(), 1);
        let battle = manager.iter().next().unwrap();
        assert_eq!(battle.side(Side::A), &[UnitId(1)]);
        assert_eq!(battle.side(Side::B), &[UnitId(2)]);
        assert_eq!(battle.location, LatLon::default());
        assert_eq!(unit.state, UnitState::Fighting);
        assert_eq!(others[&UnitId(2)].state, UnitState::Fighting);
    }

    #[test]
    fn test_engage_ignores_peace_and_distance() {
        let diplomacy = Diplomacy::from_wars([(Country::Germany, Country::France)]);
        let mut manager = BattleManager::new();
        let mut others = UnitRoster::new();
        others.insert(UnitId(2), land(2, Country::Uk, LatLon::new(0.0, 0.01)));
        others.insert(UnitId(3), land(3, Country::France, LatLon::new(0.0, 0.1)));
        let mut unit = land(1, Country::Germany, LatLon::default());

        assert!(manager.engage(&mut unit, &mut others, &diplomacy).is_none());
        assert!(manager.is_empty());
    }

    #[test]
    fn test_engage_joins_opposite_side() {
        let diplomacy = Diplomacy::from_wars([(Country::Germany, Country::France)]);
        let (mut manager, mut units) = duel(
            land(1, Country::Germany, LatLon::default()),
            land(2, Country::France, LatLon::default()),
        );
        let mut newcomer = land(3, Country::France, LatLon::new(0.05, 0.0));

        let event = manager.engage(&mut newcomer, &mut units, &diplomacy);

        assert!(event.is_none());
        let battle = manager.iter().next().unwrap();
        assert_eq!(battle.side(Side::B), &[UnitId(2), UnitId(3)]);
        assert_eq!(newcomer.battle, Some(battle.id));
    }

    #[test]
    fn test_finalize_awards_ground_once() {
        let classifier =
            BoxClassifier::new().with_region(Country::France, GeoBox::new(-90.0, 90.0, -180.0, 180.0));
        let mut grid = TerritoryGrid::new(0.05, Arc::new(classifier));
        let (mut manager, mut units) = duel(
            land(1, Country::Germany, LatLon::default()).with_morale(97.0),
            land(2, Country::France, LatLon::default()),
        );
        let id = manager.iter().next().unwrap().id;
        let mut french = units.remove(&UnitId(2)).unwrap();
        manager.get_mut(id).unwrap().remove_unit(&mut french);

        let events = manager.finalize(&mut units, &mut grid, 5);

        assert!(manager.is_empty());
        let winner = &units[&UnitId(1)];
        assert_eq!(winner.state, UnitState::Idle);
        assert!(winner.battle.is_none());
        assert_eq!(winner.morale, 100.0);
        assert_eq!(grid.owner(LatLon::default()), Some(Country::Germany));
        assert_eq!(
            events,
            vec![SimEvent::BattleEnded {
                battle: id,
                winner: Some(Country::Germany),
                cells_captured: 13,
            }]
        );
    }

    #[test]
    fn test_has_room_for_country() {
        let mut units = UnitRoster::new();
        let mut battle = Battle::new(BattleId(0), LatLon::default());
        for i in 0..12 {
            let mut unit = land(i, Country::Germany, LatLon::default());
            battle.add_unit(&mut unit, Side::A);
            units.insert(unit.id, unit);
        }
        let mut french = land(50, Country::France, LatLon::default());
        battle.add_unit(&mut french, Side::B);
        units.insert(french.id, french);

        assert!(!battle.has_room_for(Country::Germany, &units));
        assert!(battle.has_room_for(Country::France, &units));
        assert!(battle.involves(Country::France, &units));
        assert!(!battle.involves(Country::Uk, &units));
    }
}
