use fxhash::FxHasher;
use image::RgbImage;
use log::{debug, info};
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::Arc;

use crate::config::RouteParams;
use crate::coords::{ImageSize, NormPoint};
use crate::error::{Result, RouteError};
use crate::registry::LocationRegistry;
use crate::route::{route_on_grid, Route};
use crate::walkability::{classify, WalkabilityGrid};

/// Identifies the inputs a [WalkabilityGrid] was classified from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct GridKey {
    fingerprint: u64,
    size: ImageSize,
    scale: u32,
    sat_max: u8,
    val_min: u8,
}

impl GridKey {
    fn new(image: &RgbImage, params: &RouteParams) -> GridKey {
        let mut hasher = FxHasher::default();
        image.as_raw().hash(&mut hasher);
        GridKey {
            fingerprint: hasher.finish(),
            size: ImageSize::new(image.width(), image.height()),
            scale: params.scale,
            sat_max: params.sat_max,
            val_min: params.val_min,
        }
    }
}

/// Routes between registry locations on a map image.
///
/// Holds the map, the registry and the parameters of a session and keeps the last classified
/// grid around, so repeated requests on an unchanged map skip classification.
#[derive(Clone, Debug)]
pub struct Router {
    pub registry: LocationRegistry,
    pub params: RouteParams,
    map: RgbImage,
    cache: Option<(GridKey, Arc<WalkabilityGrid>)>,
}

impl Router {
    pub fn new(map: RgbImage, registry: LocationRegistry, params: RouteParams) -> Result<Router> {
        params.validate()?;
        Ok(Router {
            registry,
            params,
            map,
            cache: None,
        })
    }

    /// Opens a map image file.
    pub fn open(
        map_path: impl AsRef<Path>,
        registry: LocationRegistry,
        params: RouteParams,
    ) -> Result<Router> {
        let map_path = map_path.as_ref();
        info!("Loading map {}", map_path.display());
        let map = image::open(map_path)?.to_rgb8();
        Router::new(map, registry, params)
    }

    pub fn map(&self) -> &RgbImage {
        &self.map
    }

    pub fn map_size(&self) -> ImageSize {
        ImageSize::new(self.map.width(), self.map.height())
    }

    /// Replaces the map. The cached grid is dropped on the next request if the pixels differ.
    pub fn set_map(&mut self, map: RgbImage) {
        self.map = map;
    }

    /// The walkability grid of the current map under the current parameters.
    pub fn grid(&mut self) -> Arc<WalkabilityGrid> {
        let key = GridKey::new(&self.map, &self.params);
        if let Some((cached_key, grid)) = &self.cache {
            if *cached_key == key {
                debug!("Reusing cached walkability grid");
                return grid.clone();
            }
        }
        let grid = Arc::new(classify(&self.map, &self.params));
        self.cache = Some((key, grid.clone()));
        grid
    }

    /// Routes between two normalized positions.
    pub fn route_points(&mut self, start: NormPoint, end: NormPoint) -> Result<Route> {
        self.params.validate()?;
        let grid = self.grid();
        route_on_grid(start, end, &grid, self.map_size(), &self.params)
    }

    /// Routes between two location names, aliases or room codes.
    pub fn route(&mut self, from: &str, to: &str) -> Result<Route> {
        let start = self
            .registry
            .resolve(from)
            .ok_or_else(|| RouteError::UnknownLocation(from.to_owned()))?;
        let end = self
            .registry
            .resolve(to)
            .ok_or_else(|| RouteError::UnknownLocation(to.to_owned()))?;
        info!("Routing {} {} -> {} {}", from, start, to, end);
        self.route_points(start, end)
    }
}
