pub mod calendar;
pub mod config;
pub mod error;
pub mod types;

pub use calendar::{CalendarDate, WarCalendar};
pub use config::SimulationConfig;
pub use error::{FrontlineError, Result};
pub use types::{BattleId, LatLon, Tick, UnitId};
