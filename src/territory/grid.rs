//! Territory grid - which country holds each cell
//!
//! Cells are created on first capture and never deleted; a later capture by
//! another country overwrites the owner. Only cells whose nominal country
//! is non-neutral can ever be captured.

use std::collections::BTreeMap;
use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use super::outline::{filter_isolated, trace_boundaries, Outline};
use crate::core::types::{LatLon, Tick};
use crate::scenario::{Country, RegionClassifier};

/// Cells within this Euclidean radius (in cells) of the origin are captured directly
pub const CAPTURE_RADIUS: i32 = 2;

/// How far gap filling scans for a friendly anchor, in cells
pub const GAP_FILL_RANGE: i32 = 20;

/// Horizontal, vertical and both diagonals; each is scanned in both directions
const GAP_FILL_AXES: [(i32, i32); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

/// Integer cell address. `x` follows longitude, `y` follows latitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
}

impl GridCoord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// The 8 surrounding cells
    pub fn neighbors(&self) -> [GridCoord; 8] {
        [
            self.offset(-1, -1),
            self.offset(0, -1),
            self.offset(1, -1),
            self.offset(-1, 0),
            self.offset(1, 0),
            self.offset(-1, 1),
            self.offset(0, 1),
            self.offset(1, 1),
        ]
    }
}

/// Set of cells, the unit of work for outline extraction
pub type CellSet = AHashSet<GridCoord>;

/// Ownership record of a captured cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub owner: Country,
    /// What the classifier said about this cell when it was taken
    pub nominal_owner: Country,
    pub captured_at: Tick,
}

pub struct TerritoryGrid {
    cell_size: f64,
    cells: AHashMap<GridCoord, Cell>,
    classifier: Arc<dyn RegionClassifier + Send + Sync>,
}

impl std::fmt::Debug for TerritoryGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerritoryGrid")
            .field("cell_size", &self.cell_size)
            .field("cells", &self.cells.len())
            .finish_non_exhaustive()
    }
}

impl TerritoryGrid {
    pub fn new(cell_size: f64, classifier: Arc<dyn RegionClassifier + Send + Sync>) -> Self {
        Self {
            cell_size,
            cells: AHashMap::new(),
            classifier,
        }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    #[inline]
    pub fn coord_of(&self, at: LatLon) -> GridCoord {
        GridCoord::new(
            (at.lon / self.cell_size).floor() as i32,
            (at.lat / self.cell_size).floor() as i32,
        )
    }

    pub fn cell_center(&self, coord: GridCoord) -> LatLon {
        LatLon::new(
            (f64::from(coord.y) + 0.5) * self.cell_size,
            (f64::from(coord.x) + 0.5) * self.cell_size,
        )
    }

    /// Current owner of the cell containing `at`
    pub fn owner(&self, at: LatLon) -> Option<Country> {
        self.owner_of(self.coord_of(at))
    }

    pub fn owner_of(&self, coord: GridCoord) -> Option<Country> {
        self.cells.get(&coord).map(|c| c.owner)
    }

    pub fn cell(&self, coord: GridCoord) -> Option<&Cell> {
        self.cells.get(&coord)
    }

    pub fn cells(&self) -> &AHashMap<GridCoord, Cell> {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Capture the disc around `center` for `country`, then close gaps to
    /// nearby friendly ground if anything changed.
    ///
    /// Returns the number of cells that changed hands.
    pub fn conquer(&mut self, center: LatLon, country: Country, now: Tick) -> usize {
        let origin = self.coord_of(center);
        let radius_sq = CAPTURE_RADIUS * CAPTURE_RADIUS;

        let mut captured = 0;
        for dx in -CAPTURE_RADIUS..=CAPTURE_RADIUS {
            for dy in -CAPTURE_RADIUS..=CAPTURE_RADIUS {
                if dx * dx + dy * dy > radius_sq {
                    continue;
                }
                if self.try_capture(origin.offset(dx, dy), country, now) {
                    captured += 1;
                }
            }
        }

        if captured > 0 {
            captured += self.fill_gaps(origin, country, now);
            tracing::trace!(
                "{} captured {} cells around ({:.2}, {:.2})",
                country,
                captured,
                center.lat,
                center.lon
            );
        }

        captured
    }

    /// Capture a single cell if it is not already ours and not neutral
    fn try_capture(&mut self, coord: GridCoord, country: Country, now: Tick) -> bool {
        if self.owner_of(coord) == Some(country) {
            return false;
        }

        let Some(nominal) = self.classifier.classify(self.cell_center(coord)) else {
            return false;
        };

        self.cells.insert(
            coord,
            Cell {
                owner: country,
                nominal_owner: nominal,
                captured_at: now,
            },
        );
        true
    }

    /// Scan each axis both ways from `origin`; where a friendly cell is found
    /// within range, take every capturable cell between.
    fn fill_gaps(&mut self, origin: GridCoord, country: Country, now: Tick) -> usize {
        let mut filled = 0;
        for (dx, dy) in GAP_FILL_AXES {
            filled += self.fill_ray(origin, dx, dy, country, now);
            filled += self.fill_ray(origin, -dx, -dy, country, now);
        }
        filled
    }

    fn fill_ray(&mut self, origin: GridCoord, dx: i32, dy: i32, country: Country, now: Tick) -> usize {
        let anchor = (1..=GAP_FILL_RANGE)
            .find(|&i| self.owner_of(origin.offset(dx * i, dy * i)) == Some(country));

        let Some(anchor) = anchor else {
            return 0;
        };

        (1..anchor)
            .filter(|&i| self.try_capture(origin.offset(dx * i, dy * i), country, now))
            .count()
    }

    /// All cells currently held by `country`
    pub fn cells_of(&self, country: Country) -> CellSet {
        self.cells
            .iter()
            .filter(|(_, cell)| cell.owner == country)
            .map(|(coord, _)| *coord)
            .collect()
    }

    /// Cell sets grouped by owner
    pub fn by_owner(&self) -> BTreeMap<Country, CellSet> {
        let mut groups: BTreeMap<Country, CellSet> = BTreeMap::new();
        for (coord, cell) in &self.cells {
            groups.entry(cell.owner).or_default().insert(*coord);
        }
        groups
    }

    pub fn cell_counts(&self) -> BTreeMap<Country, usize> {
        let mut counts = BTreeMap::new();
        for cell in self.cells.values() {
            *counts.entry(cell.owner).or_insert(0) += 1;
        }
        counts
    }

    /// Closed outlines of every country's holdings, rebuilt from current state
    pub fn outlines(&self) -> BTreeMap<Country, Vec<Outline>> {
        self.by_owner()
            .into_iter()
            .filter_map(|(country, cells)| {
                let cells = filter_isolated(&cells);
                if cells.is_empty() {
                    return None;
                }
                Some((country, trace_boundaries(&cells)))
            })
            .collect()
    }
}
