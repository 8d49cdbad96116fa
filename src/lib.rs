//! # walkway_pathfinding
//!
//! Walkway-constrained routing on campus map images. The map is downsampled and every cell is
//! classified as walkway or not by its
//! [HSV](https://en.wikipedia.org/wiki/HSL_and_HSV) color: paved paths are pale and
//! unsaturated. Named locations are snapped onto the nearest walkway and joined by a
//! 4-connected [A*](https://en.wikipedia.org/wiki/A*_search_algorithm) search with the Manhattan
//! heuristic. Connected components of the walkway are pre-computed to avoid flood-filling
//! behaviour if no path exists.
//!
//! Routes are returned in normalized image coordinates with both ends pinned to the exact
//! requested positions.
//!
//! ```no_run
//! use walkway_pathfinding::{LocationRegistry, RouteParams, Router};
//!
//! let registry = LocationRegistry::load_or_default("data/markers.json");
//! let mut router = Router::open("images/macleans_map.jpg", registry, RouteParams::default())?;
//! let route = router.route("Kupe", "Te Kanawa")?;
//! for p in &route.waypoints {
//!     println!("{p}");
//! }
//! # Ok::<(), walkway_pathfinding::RouteError>(())
//! ```
pub mod astar;
pub mod config;
pub mod coords;
pub mod error;
pub mod pathfind;
pub mod registry;
pub mod route;
pub mod router;
pub mod snap;
pub mod walkability;

pub use config::RouteParams;
pub use coords::{ImageSize, NormPoint};
pub use error::{Result, RouteError};
pub use grid_util::point::Point;
pub use pathfind::{find_path, find_path_with_cost};
pub use registry::{find_map_image, LocationRegistry};
pub use route::{assemble_route, assemble_route_points, route_on_grid, Route, RouteKind};
pub use router::Router;
pub use snap::snap;
pub use walkability::{classify, classify_dynamic, WalkabilityGrid};
