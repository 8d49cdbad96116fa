use fxhash::FxHashSet;
use grid_util::point::Point;
use log::{debug, warn};
use std::collections::VecDeque;

use crate::astar::BudgetExceeded;
use crate::walkability::WalkabilityGrid;

/// Moves `cell` to the closest walkable cell by breadth-first search over 4-neighbours.
///
/// Walkable cells are returned unchanged. Neighbours are visited right, left, down, up, which
/// makes ties deterministic. If the flood fill runs out of cells without meeting a walkable
/// one, `cell` itself is returned: the caller treats that as "no better cell", not an error.
pub fn snap(cell: Point, grid: &WalkabilityGrid) -> Point {
    match snap_bounded(cell, grid, usize::MAX) {
        Ok(snapped) => snapped,
        Err(_) => cell,
    }
}

/// [snap] that gives up after dequeuing `max_expansions` cells.
pub fn snap_bounded(
    cell: Point,
    grid: &WalkabilityGrid,
    max_expansions: usize,
) -> Result<Point, BudgetExceeded> {
    if grid.is_walkable(cell) {
        return Ok(cell);
    }
    let mut queue = VecDeque::from([cell]);
    let mut seen: FxHashSet<Point> = FxHashSet::default();
    seen.insert(cell);
    let mut expansions = 0usize;
    while let Some(current) = queue.pop_front() {
        expansions += 1;
        if expansions > max_expansions {
            warn!("Snapping {} gave up after {} expansions", cell, max_expansions);
            return Err(BudgetExceeded {
                limit: max_expansions,
            });
        }
        for n in grid.neighbours(&current) {
            if !seen.insert(n) {
                continue;
            }
            if grid.is_walkable(n) {
                debug!("Snapped {} to {}", cell, n);
                return Ok(n);
            }
            queue.push_back(n);
        }
    }
    debug!("No walkable cell reachable from {}", cell);
    Ok(cell)
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_util::grid::ValueGrid;

    fn grid_from_rows(rows: &[&str]) -> WalkabilityGrid {
        let mut grid = WalkabilityGrid::new(rows[0].len(), rows.len(), false);
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                grid.set(x as i32, y as i32, c == '.');
            }
        }
        grid.generate_components();
        grid
    }

    #[test]
    fn walkable_cell_is_kept() {
        let grid = grid_from_rows(&["..", ".."]);
        for x in 0..2 {
            for y in 0..2 {
                assert_eq!(snap(Point::new(x, y), &grid), Point::new(x, y));
            }
        }
    }

    #[test]
    fn snaps_to_nearest_cell() {
        let grid = grid_from_rows(&["#####", "####.", "#####"]);
        assert_eq!(snap(Point::new(0, 1), &grid), Point::new(4, 1));
    }

    /// Right wins over left, down over up at equal distance.
    #[test]
    fn ties_prefer_right_then_down() {
        let grid = grid_from_rows(&["..#..", "#####"]);
        assert_eq!(snap(Point::new(2, 0), &grid), Point::new(3, 0));
        let grid = grid_from_rows(&["#.#", "###", "#.#"]);
        assert_eq!(snap(Point::new(1, 1), &grid), Point::new(1, 2));
    }

    #[test]
    fn lands_in_only_region_from_anywhere() {
        let grid = grid_from_rows(&["######", "######", "####..", "####.."]);
        for x in 0..6 {
            for y in 0..4 {
                let s = snap(Point::new(x, y), &grid);
                assert!(grid.is_walkable(s), "{} snapped to {}", Point::new(x, y), s);
                assert!(s.x >= 4 && s.y >= 2);
            }
        }
    }

    #[test]
    fn blocked_grid_returns_origin() {
        let grid = grid_from_rows(&["###", "###"]);
        assert_eq!(snap(Point::new(1, 1), &grid), Point::new(1, 1));
    }

    #[test]
    fn outside_cell_enters_grid() {
        let grid = grid_from_rows(&["...", "..."]);
        assert_eq!(snap(Point::new(3, 0), &grid), Point::new(2, 0));
        // Too far away to have an in-bounds neighbour
        assert_eq!(snap(Point::new(10, 10), &grid), Point::new(10, 10));
    }

    #[test]
    fn budget_is_enforced() {
        let grid = grid_from_rows(&["#########."]);
        assert_eq!(
            snap_bounded(Point::new(0, 0), &grid, 2),
            Err(BudgetExceeded { limit: 2 })
        );
        assert_eq!(snap_bounded(Point::new(0, 0), &grid, 100), Ok(Point::new(9, 0)));
    }
}
