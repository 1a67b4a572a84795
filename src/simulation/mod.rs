//! Simulation orchestration
//!
//! [`Simulation`] owns the world and the clock. External code drives it one
//! invocation at a time and reads snapshots between invocations; partial
//! tick state is never visible.

pub mod clock;
pub mod events;
pub mod snapshot;
pub mod tick;
pub mod world;

pub use clock::SimulationClock;
pub use events::{EventHook, SimEvent};
pub use snapshot::WorldSnapshot;
pub use tick::run_tick;
pub use world::World;

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::core::error::Result;
use crate::scenario::Scenario;

pub struct Simulation<R = ChaCha8Rng> {
    world: World<R>,
    clock: SimulationClock,
    /// Events raised outside a tick (the opening deployment), delivered on
    /// the next invocation
    pending: Vec<SimEvent>,
}

impl Simulation<ChaCha8Rng> {
    /// Deploy a scenario with the random source its config asks for
    pub fn new(scenario: Scenario) -> Result<Self> {
        Self::from_world(World::new(scenario)?)
    }

    pub fn builtin() -> Result<Self> {
        Self::new(Scenario::builtin()?)
    }
}

impl<R: Rng> Simulation<R> {
    pub fn with_rng(scenario: Scenario, rng: R) -> Result<Self> {
        Self::from_world(World::with_rng(scenario, rng)?)
    }

    fn from_world(mut world: World<R>) -> Result<Self> {
        let opening = world.deploy();
        opening.log();
        tracing::info!(
            "Deployed {} units for {} countries, starting {}",
            world.units.len(),
            world.scenario.countries.len(),
            world.calendar.current_date()
        );

        Ok(Self {
            clock: SimulationClock::new(world.scenario.config.speed_multiplier),
            world,
            pending: vec![opening],
        })
    }

    /// One external invocation: deliver pending events, then run the
    /// clock's ticks
    pub fn advance<H: EventHook + ?Sized>(&mut self, hook: &mut H) -> Vec<SimEvent> {
        let mut events = std::mem::take(&mut self.pending);
        for event in &events {
            hook.on_event(&event.message(), event.is_major());
        }
        events.extend(self.clock.advance(&mut self.world, hook));
        events
    }

    pub fn world(&self) -> &World<R> {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World<R> {
        &mut self.world
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut SimulationClock {
        &mut self.clock
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        self.world.snapshot()
    }
}
