//! Territory control
//!
//! A sparse grid over lat/lon records which country holds each cell.
//! Units capture ground by moving and by winning battles; outlines for
//! rendering are traced from the grid on demand.

pub mod grid;
pub mod outline;

pub use grid::{Cell, CellSet, GridCoord, TerritoryGrid, CAPTURE_RADIUS, GAP_FILL_RANGE};
pub use outline::{filter_isolated, trace_boundaries, Outline, TRACE_ITERATION_CAP};
