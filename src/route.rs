//! Assembles a walkway route between two normalized map positions.
use image::{DynamicImage, RgbImage};
use log::{info, warn};
use serde::Serialize;

use crate::astar::BudgetExceeded;
use crate::config::RouteParams;
use crate::coords::{cell_to_norm, norm_to_cell, ImageSize, NormPoint};
use crate::error::{Phase, Result, RouteError};
use crate::pathfind::find_path_with_cost;
use crate::registry::LocationRegistry;
use crate::snap::snap_bounded;
use crate::walkability::{classify, WalkabilityGrid};

/// How a [Route] was obtained.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum RouteKind {
    /// The waypoints follow walkable cells.
    Found,
    /// No walkway connects the endpoints; the route is the straight line between them.
    Fallback,
    /// No walkway connects the endpoints and fallback is disabled. There are no waypoints.
    Unreachable,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Route {
    pub kind: RouteKind,
    pub waypoints: Vec<NormPoint>,
}

impl Route {
    pub fn is_found(&self) -> bool {
        self.kind == RouteKind::Found
    }
    pub fn is_fallback(&self) -> bool {
        self.kind == RouteKind::Fallback
    }
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }
    /// Polyline length in normalized units.
    pub fn length(&self) -> f64 {
        self.waypoints
            .windows(2)
            .map(|w| (w[1].x - w[0].x).hypot(w[1].y - w[0].y))
            .sum()
    }
}

fn over_budget(phase: Phase) -> impl Fn(BudgetExceeded) -> RouteError {
    move |e| RouteError::BudgetExceeded {
        phase,
        limit: e.limit,
    }
}

/// Routes between two normalized positions on an already classified grid.
///
/// `size` is the size of the image the grid was classified from.
pub fn route_on_grid(
    start: NormPoint,
    end: NormPoint,
    grid: &WalkabilityGrid,
    size: ImageSize,
    params: &RouteParams,
) -> Result<Route> {
    params.validate()?;
    let scale = params.scale;
    let start_cell = snap_bounded(norm_to_cell(start, size, scale), grid, params.max_expansions)
        .map_err(over_budget(Phase::Snap))?;
    let goal_cell = snap_bounded(norm_to_cell(end, size, scale), grid, params.max_expansions)
        .map_err(over_budget(Phase::Snap))?;

    let path = find_path_with_cost(start_cell, goal_cell, grid, params.max_expansions)
        .map_err(over_budget(Phase::Search))?;

    let Some((cells, steps)) = path else {
        return Ok(no_walkway(start, end, params));
    };

    if let &[cell] = cells.as_slice() {
        if start == end {
            return Ok(Route {
                kind: RouteKind::Found,
                waypoints: vec![start],
            });
        }
        // Both pins share one cell
        if !grid.is_walkable(cell) {
            return Ok(no_walkway(start, end, params));
        }
        return Ok(Route {
            kind: RouteKind::Found,
            waypoints: vec![start, end],
        });
    }
    info!("Found walkway route of {} steps", steps);

    let mut waypoints: Vec<NormPoint> = cells
        .into_iter()
        .map(|cell| cell_to_norm(cell, size, scale))
        .collect();
    // Pin the ends to the exact positions rather than the snapped cells
    if let Some(first) = waypoints.first_mut() {
        *first = start;
    }
    if let Some(last) = waypoints.last_mut() {
        *last = end;
    }
    Ok(Route {
        kind: RouteKind::Found,
        waypoints,
    })
}

fn no_walkway(start: NormPoint, end: NormPoint, params: &RouteParams) -> Route {
    if params.fallback {
        warn!("No walkway between {} and {}, drawing a straight line", start, end);
        Route {
            kind: RouteKind::Fallback,
            waypoints: vec![start, end],
        }
    } else {
        info!("No walkway between {} and {}", start, end);
        Route {
            kind: RouteKind::Unreachable,
            waypoints: Vec::new(),
        }
    }
}

/// Classifies `image` and routes between two normalized positions on it.
pub fn assemble_route_points(
    start: NormPoint,
    end: NormPoint,
    image: &RgbImage,
    params: &RouteParams,
) -> Result<Route> {
    params.validate()?;
    let grid = classify(image, params);
    let size = ImageSize::new(image.width(), image.height());
    route_on_grid(start, end, &grid, size, params)
}

/// Resolves two location names in `registry` and routes between them on `image`.
pub fn assemble_route(
    start_name: &str,
    end_name: &str,
    registry: &LocationRegistry,
    image: &DynamicImage,
    params: &RouteParams,
) -> Result<Route> {
    let start = registry
        .resolve(start_name)
        .ok_or_else(|| RouteError::UnknownLocation(start_name.to_owned()))?;
    let end = registry
        .resolve(end_name)
        .ok_or_else(|| RouteError::UnknownLocation(end_name.to_owned()))?;
    assemble_route_points(start, end, &image.to_rgb8(), params)
}
