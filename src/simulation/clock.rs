//! Simulation clock
//!
//! Each external invocation runs `floor(speed_multiplier)` ticks back to
//! back. A paused clock runs none.

use rand::Rng;

use super::events::{EventHook, SimEvent};
use super::tick::run_tick;
use super::world::World;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationClock {
    pub speed_multiplier: f64,
    pub paused: bool,
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl SimulationClock {
    pub fn new(speed_multiplier: f64) -> Self {
        Self {
            speed_multiplier,
            paused: false,
        }
    }

    pub fn set_speed(&mut self, speed_multiplier: f64) {
        self.speed_multiplier = speed_multiplier;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Ticks one invocation will run
    pub fn ticks_per_invocation(&self) -> u32 {
        if self.paused || !self.speed_multiplier.is_finite() {
            return 0;
        }
        self.speed_multiplier.max(0.0).floor() as u32
    }

    /// Run this invocation's ticks, forwarding every event to `hook`
    pub fn advance<R, H>(&self, world: &mut World<R>, hook: &mut H) -> Vec<SimEvent>
    where
        R: Rng,
        H: EventHook + ?Sized,
    {
        let mut events = Vec::new();
        for _ in 0..self.ticks_per_invocation() {
            let tick_events = run_tick(world);
            for event in &tick_events {
                hook.on_event(&event.message(), event.is_major());
            }
            events.extend(tick_events);
        }
        events
    }
}
