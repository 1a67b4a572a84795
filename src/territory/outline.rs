//! Outline extraction
//!
//! Turns a set of owned cells into closed polygons in grid-corner space.
//! Every exposed cell side becomes a directed edge; walking the edges with
//! a consumed-edge set yields one ring per boundary. Rings are always rebuilt
//! from the full cell set.

use std::collections::BTreeMap;

use ahash::AHashSet;
use geo_types::LineString;
use serde::{Deserialize, Serialize};

use super::grid::{CellSet, GridCoord};

/// Hard cap on edges followed while tracing one ring
pub const TRACE_ITERATION_CAP: usize = 10_000;

/// Cells with fewer owned neighbours (of 8) than this are noise
pub const MIN_NEIGHBORS: usize = 2;

/// Closed ring of cell corners. The closing vertex is not repeated.
///
/// With `y` growing downward, outer rings run clockwise and holes run
/// counter-clockwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    pub vertices: Vec<GridCoord>,
}

impl Outline {
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Twice the signed shoelace area; positive for outer rings
    pub fn signed_area2(&self) -> i64 {
        let n = self.vertices.len();
        (0..n)
            .map(|i| {
                let a = self.vertices[i];
                let b = self.vertices[(i + 1) % n];
                i64::from(a.x) * i64::from(b.y) - i64::from(b.x) * i64::from(a.y)
            })
            .sum()
    }

    pub fn is_hole(&self) -> bool {
        self.signed_area2() < 0
    }

    /// Closed ring in (lon, lat) degrees for rendering
    pub fn to_line_string(&self, cell_size: f64) -> LineString<f64> {
        let mut points: Vec<(f64, f64)> = self
            .vertices
            .iter()
            .map(|v| (f64::from(v.x) * cell_size, f64::from(v.y) * cell_size))
            .collect();
        if let Some(&first) = points.first() {
            points.push(first);
        }
        LineString::from(points)
    }
}

/// Drop cells with fewer than [`MIN_NEIGHBORS`] of their 8 neighbours in the set.
/// Counts are taken against the input set, not the shrinking result.
pub fn filter_isolated(cells: &CellSet) -> CellSet {
    cells
        .iter()
        .filter(|cell| {
            cell.neighbors()
                .iter()
                .filter(|n| cells.contains(*n))
                .count()
                >= MIN_NEIGHBORS
        })
        .copied()
        .collect()
}

/// Directed boundary edges keyed by start corner.
///
/// Corner (x, y) is the top-left corner of cell (x, y).
fn boundary_edges(cells: &CellSet) -> BTreeMap<GridCoord, Vec<GridCoord>> {
    let mut edges: BTreeMap<GridCoord, Vec<GridCoord>> = BTreeMap::new();
    let mut add = |from: GridCoord, to: GridCoord| edges.entry(from).or_default().push(to);

    for &cell in cells {
        let top_left = cell;
        let top_right = cell.offset(1, 0);
        let bottom_right = cell.offset(1, 1);
        let bottom_left = cell.offset(0, 1);

        if !cells.contains(&cell.offset(0, -1)) {
            add(top_left, top_right);
        }
        if !cells.contains(&cell.offset(1, 0)) {
            add(top_right, bottom_right);
        }
        if !cells.contains(&cell.offset(0, 1)) {
            add(bottom_right, bottom_left);
        }
        if !cells.contains(&cell.offset(-1, 0)) {
            add(bottom_left, top_left);
        }
    }

    for targets in edges.values_mut() {
        targets.sort();
    }
    edges
}

/// Trace every closed boundary of `cells`.
///
/// Rings with fewer than 3 vertices, rings that never close, and traces that
/// hit [`TRACE_ITERATION_CAP`] are discarded.
pub fn trace_boundaries(cells: &CellSet) -> Vec<Outline> {
    trace_boundaries_capped(cells, TRACE_ITERATION_CAP)
}

fn trace_boundaries_capped(cells: &CellSet, cap: usize) -> Vec<Outline> {
    let edges = boundary_edges(cells);
    let mut consumed: AHashSet<(GridCoord, GridCoord)> = AHashSet::new();
    let mut outlines = Vec::new();

    for (&start, targets) in &edges {
        for &first in targets {
            if consumed.contains(&(start, first)) {
                continue;
            }
            consumed.insert((start, first));

            let mut path = vec![start];
            let mut current = first;
            let mut closed = false;
            let mut steps = 1;

            while steps < cap {
                if current == start {
                    closed = true;
                    break;
                }
                path.push(current);

                let next = edges.get(&current).and_then(|outgoing| {
                    outgoing
                        .iter()
                        .copied()
                        .find(|&to| !consumed.contains(&(current, to)))
                });
                let Some(next) = next else {
                    break;
                };

                consumed.insert((current, next));
                current = next;
                steps += 1;
            }

            if !closed {
                tracing::debug!("Discarding open boundary trace from {:?}", start);
                continue;
            }

            let vertices = simplify(path);
            if vertices.len() > 2 {
                outlines.push(Outline { vertices });
            }
        }
    }

    outlines
}

/// Remove vertices lying on a straight run
fn simplify(path: Vec<GridCoord>) -> Vec<GridCoord> {
    let n = path.len();
    if n < 3 {
        return path;
    }

    let direction = |a: GridCoord, b: GridCoord| ((b.x - a.x).signum(), (b.y - a.y).signum());

    (0..n)
        .filter(|&i| {
            let prev = path[(i + n - 1) % n];
            let here = path[i];
            let next = path[(i + 1) % n];
            direction(prev, here) != direction(here, next)
        })
        .map(|i| path[i])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(x0: i32, y0: i32, w: i32, h: i32) -> CellSet {
        let mut cells = CellSet::new();
        for x in x0..x0 + w {
            for y in y0..y0 + h {
                cells.insert(GridCoord::new(x, y));
            }
        }
        cells
    }

    #[test]
    fn test_isolated_cell_removed() {
        let mut cells = block(0, 0, 3, 3);
        cells.insert(GridCoord::new(10, 10));

        let filtered = filter_isolated(&cells);
        assert!(!filtered.contains(&GridCoord::new(10, 10)));
        assert_eq!(filtered.len(), 9);
    }

    #[test]
    fn test_cell_with_one_neighbor_removed() {
        let cells: CellSet = [GridCoord::new(0, 0), GridCoord::new(1, 0)].into_iter().collect();
        assert!(filter_isolated(&cells).is_empty());
    }

    #[test]
    fn test_solid_block_single_quad() {
        let cells = filter_isolated(&block(0, 0, 3, 3));
        let outlines = trace_boundaries(&cells);

        assert_eq!(outlines.len(), 1);
        let ring = &outlines[0];
        assert_eq!(ring.len(), 4);
        let corners: AHashSet<_> = ring.vertices.iter().copied().collect();
        for corner in [(0, 0), (3, 0), (3, 3), (0, 3)] {
            assert!(corners.contains(&GridCoord::new(corner.0, corner.1)));
        }
        assert_eq!(ring.signed_area2(), 18);
        assert!(!ring.is_hole());
    }

    #[test]
    fn test_ring_with_hole() {
        let mut cells = block(0, 0, 5, 5);
        cells.remove(&GridCoord::new(2, 2));

        let outlines = trace_boundaries(&cells);
        assert_eq!(outlines.len(), 2);

        let holes: Vec<_> = outlines.iter().filter(|o| o.is_hole()).collect();
        assert_eq!(holes.len(), 1);
        assert_eq!(holes[0].signed_area2(), -2);
        assert_eq!(holes[0].len(), 4);
    }

    #[test]
    fn test_separate_blocks_separate_rings() {
        let mut cells = block(0, 0, 2, 2);
        cells.extend(block(10, 0, 2, 2));
        assert_eq!(trace_boundaries(&cells).len(), 2);
    }

    #[test]
    fn test_diagonal_touch_closes() {
        // Two blocks sharing only a corner produce a pinch vertex
        let mut cells = block(0, 0, 2, 2);
        cells.extend(block(2, 2, 2, 2));

        let outlines = trace_boundaries(&cells);
        assert!(!outlines.is_empty());
        let total_area: i64 = outlines.iter().map(|o| o.signed_area2()).sum();
        assert_eq!(total_area, 16);
    }

    #[test]
    fn test_l_shape_vertices() {
        let mut cells = block(0, 0, 1, 3);
        cells.extend(block(1, 2, 2, 1));

        let outlines = trace_boundaries(&cells);
        assert_eq!(outlines.len(), 1);
        assert_eq!(outlines[0].len(), 6);
    }

    #[test]
    fn test_capped_trace_discarded() {
        let cells = block(0, 0, 3, 3);
        assert!(trace_boundaries_capped(&cells, 5).is_empty());
        assert_eq!(trace_boundaries_capped(&cells, 13).len(), 1);
    }

    #[test]
    fn test_perimeter_past_cap_discarded() {
        // 5001 x 2 strip: 10006 boundary edges
        let long = block(0, 0, 5001, 2);
        assert!(trace_boundaries(&long).is_empty());

        // 4000 x 2 strip: 8004 edges, within the cap
        let short = block(0, 0, 4000, 2);
        let outlines = trace_boundaries(&short);
        assert_eq!(outlines.len(), 1);
        assert_eq!(outlines[0].signed_area2(), 16_000);
    }

    #[test]
    fn test_empty_set() {
        assert!(trace_boundaries(&CellSet::new()).is_empty());
    }

    #[test]
    fn test_line_string_closed_in_degrees() {
        let outline = trace_boundaries(&block(0, 0, 2, 2)).remove(0);
        let line = outline.to_line_string(0.05);
        assert!(line.is_closed());
        assert_eq!(line.0.len(), 5);
        assert!(line.0.iter().all(|c| c.x >= 0.0 && c.x <= 0.1 + 1e-12));
    }
}
