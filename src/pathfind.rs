use grid_util::point::Point;
use log::info;
use smallvec::SmallVec;

use crate::astar::{astar, BudgetExceeded};
use crate::walkability::WalkabilityGrid;

/// Cost of a single 4-connected step.
pub const STEP_COST: i32 = 1;

fn successors(grid: &WalkabilityGrid, node: &Point) -> SmallVec<[(Point, i32); 4]> {
    grid.neighbours(node)
        .into_iter()
        .filter(|p| grid.is_walkable(*p))
        .map(|p| (p, STEP_COST))
        .collect()
}

/// Manhattan distance that saturates instead of overflowing for cells far outside the grid.
fn manhattan(a: &Point, b: &Point) -> i32 {
    let d = a.x.abs_diff(b.x).saturating_add(a.y.abs_diff(b.y));
    d.min(i32::MAX as u32) as i32
}

/// Computes a minimum-step path from `start` to `goal` moving only between walkable
/// 4-neighbours, along with its step count. The heuristic used is the
/// [Manhattan distance](https://en.wikipedia.org/wiki/Taxicab_geometry).
///
/// The start cell itself does not need to be walkable. `start == goal` yields the single-cell
/// path. Returns `Ok(None)` if the goal cannot be reached.
pub fn find_path_with_cost(
    start: Point,
    goal: Point,
    grid: &WalkabilityGrid,
    max_expansions: usize,
) -> Result<Option<(Vec<Point>, i32)>, BudgetExceeded> {
    if start != goal && !grid.is_walkable(goal) {
        info!("{} is not on a walkway", goal);
        return Ok(None);
    }
    if start != goal
        && grid.is_walkable(start)
        && grid.is_walkable(goal)
        && !grid.connected(&start, &goal)
    {
        info!("{} and {} are on different walkways", start, goal);
        return Ok(None);
    }
    astar(
        &start,
        |node| successors(grid, node),
        |point| manhattan(point, &goal) * STEP_COST,
        |point| *point == goal,
        max_expansions,
    )
}

/// [find_path_with_cost] without a budget, returning an empty path on failure.
pub fn find_path(start: Point, goal: Point, grid: &WalkabilityGrid) -> Vec<Point> {
    match find_path_with_cost(start, goal, grid, usize::MAX) {
        Ok(Some((path, _))) => path,
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_util::grid::ValueGrid;

    fn open_grid(width: usize, height: usize) -> WalkabilityGrid {
        WalkabilityGrid::new(width, height, true)
    }

    fn assert_connected_steps(path: &[Point]) {
        for pair in path.windows(2) {
            assert_eq!(pair[0].manhattan_distance(&pair[1]), 1);
        }
    }

    #[test]
    fn open_grid_corner_to_diagonal() {
        let grid = open_grid(30, 30);
        let (path, cost) =
            find_path_with_cost(Point::new(0, 0), Point::new(5, 5), &grid, usize::MAX)
                .unwrap()
                .unwrap();
        assert_eq!(path.len(), 11);
        assert_eq!(cost, 10);
        assert_eq!(path[0], Point::new(0, 0));
        assert_eq!(path[10], Point::new(5, 5));
        assert_connected_steps(&path);
    }

    #[test]
    fn open_grid_matches_manhattan() {
        let grid = open_grid(12, 9);
        for (sx, sy, gx, gy) in [(0, 0, 11, 8), (3, 7, 3, 0), (10, 2, 1, 2), (5, 5, 6, 4)] {
            let (start, goal) = (Point::new(sx, sy), Point::new(gx, gy));
            let path = find_path(start, goal, &grid);
            assert_eq!(path.len() as i32 - 1, start.manhattan_distance(&goal));
        }
    }

    #[test]
    fn equal_start_goal() {
        let grid = open_grid(1, 1);
        assert_eq!(find_path(Point::new(0, 0), Point::new(0, 0), &grid), vec![Point::new(0, 0)]);
        // Even a blocked cell is its own path
        let blocked = WalkabilityGrid::new(2, 2, false);
        assert_eq!(
            find_path(Point::new(1, 1), Point::new(1, 1), &blocked),
            vec![Point::new(1, 1)]
        );
    }

    /// Detours around a wall with a single gap at the bottom.
    ///  ______
    /// |S#   |
    /// | # # |
    /// |   #G|
    ///  ______
    #[test]
    fn walks_around_walls() {
        let mut grid = open_grid(5, 3);
        grid.set(1, 0, false);
        grid.set(1, 1, false);
        grid.set(3, 1, false);
        grid.set(3, 2, false);
        grid.generate_components();
        let path = find_path(Point::new(0, 0), Point::new(4, 2), &grid);
        assert_eq!(path.len(), 11);
        assert_connected_steps(&path);
        assert!(path.iter().all(|p| grid.is_walkable(*p)));
    }

    #[test]
    fn far_off_cells_have_no_path() {
        let grid = open_grid(4, 4);
        let far = Point::new(i32::MAX, i32::MIN);
        assert_eq!(find_path(far, Point::new(2, 2), &grid), Vec::<Point>::new());
        assert_eq!(find_path(Point::new(2, 2), far, &grid), Vec::<Point>::new());
        assert_eq!(manhattan(&far, &Point::new(0, 0)), i32::MAX);
    }

    #[test]
    fn separated_regions_have_no_path() {
        let mut grid = open_grid(3, 3);
        for y in 0..3 {
            grid.set(1, y, false);
        }
        grid.generate_components();
        assert!(find_path(Point::new(0, 0), Point::new(2, 2), &grid).is_empty());
    }

    #[test]
    fn blocked_goal_has_no_path() {
        let mut grid = open_grid(3, 3);
        grid.set(2, 2, false);
        grid.generate_components();
        assert!(find_path(Point::new(0, 0), Point::new(2, 2), &grid).is_empty());
    }

    #[test]
    fn budget_is_enforced() {
        let grid = open_grid(50, 50);
        let result = find_path_with_cost(Point::new(0, 0), Point::new(49, 49), &grid, 10);
        assert_eq!(result, Err(BudgetExceeded { limit: 10 }));
    }
}
