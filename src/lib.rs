//! Frontline - tick-driven military simulation with grid-based territory control

pub mod core;
pub mod military;
pub mod scenario;
pub mod simulation;
pub mod territory;
