//! Simulation configuration
//!
//! Run-level knobs live here. Combat, supply and AI tuning constants live
//! next to the systems that use them.

use serde::{Deserialize, Serialize};

use super::calendar::CalendarDate;
use super::error::{FrontlineError, Result};

/// Configuration for a simulation run
///
/// Loaded from the `[simulation]` table of a scenario file. Every field has
/// a default, so the table may be omitted entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Edge length of a territory grid cell in degrees
    ///
    /// At 0.05 a capture radius of 2 cells covers roughly a 0.2 degree
    /// disc, and the gap-fill scan of 20 cells closes gaps of about one degree.
    pub cell_size: f64,

    /// Seed for the random source. `None` seeds from OS entropy.
    pub seed: Option<u64>,

    /// Ticks executed per external invocation. Fractional values are floored.
    pub speed_multiplier: f64,

    /// Date of tick zero
    pub start_date: CalendarDate,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            cell_size: 0.05,
            seed: None,
            speed_multiplier: 1.0,
            start_date: CalendarDate::default(),
        }
    }
}

impl SimulationConfig {
    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(FrontlineError::InvalidConfig(format!(
                "cell_size must be positive, got {}",
                self.cell_size
            )));
        }

        if !(self.speed_multiplier.is_finite() && self.speed_multiplier >= 0.0) {
            return Err(FrontlineError::InvalidConfig(format!(
                "speed_multiplier must be non-negative, got {}",
                self.speed_multiplier
            )));
        }

        if !self.start_date.is_valid() {
            return Err(FrontlineError::InvalidConfig(format!(
                "start_date {:?} is not a calendar date",
                self.start_date
            )));
        }

        Ok(())
    }
}
