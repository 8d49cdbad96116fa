//! Turns a map image into a [WalkabilityGrid].
//!
//! Paved surfaces on the campus imagery are light gray or white: low saturation and high value.
//! Roofs are saturated and vegetation is dark, so a pair of HSV thresholds separates them.
use core::fmt;
use grid_util::grid::{BoolGrid, ValueGrid};
use grid_util::point::Point;
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};
use itertools::iproduct;
use log::debug;
use petgraph::unionfind::UnionFind;
use smallvec::SmallVec;

use crate::config::RouteParams;
use crate::coords::{grid_len, ImageSize};

/// Hue, saturation and value, each on a 0-255 scale.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Hsv {
    pub h: u8,
    pub s: u8,
    pub v: u8,
}

impl From<Rgb<u8>> for Hsv {
    fn from(Rgb([r, g, b]): Rgb<u8>) -> Self {
        let max = r.max(g).max(b) as i32;
        let min = r.min(g).min(b) as i32;
        let delta = max - min;
        if max == 0 || delta == 0 {
            return Hsv {
                h: 0,
                s: 0,
                v: max as u8,
            };
        }
        let s = delta * 255 / max;
        let (r, g, b) = (r as i32, g as i32, b as i32);
        // Hue in sixths of the circle, scaled to 0..255
        let sector = if max == r {
            (g - b) as f32 / delta as f32
        } else if max == g {
            2.0 + (b - r) as f32 / delta as f32
        } else {
            4.0 + (r - g) as f32 / delta as f32
        };
        let h = (sector / 6.0).rem_euclid(1.0) * 255.0;
        Hsv {
            h: h as u8,
            s: s as u8,
            v: max as u8,
        }
    }
}

/// Whether a color counts as walkway under the given thresholds.
pub fn is_walkway(hsv: Hsv, sat_max: u8, val_min: u8) -> bool {
    hsv.s < sat_max && hsv.v > val_min
}

/// Boolean walkability raster plus the 4-connected components of its walkable cells.
///
/// Unlike an obstacle grid, `true` marks a cell that can be walked on.
#[derive(Clone, Debug)]
pub struct WalkabilityGrid {
    pub grid: BoolGrid,
    pub components: UnionFind<usize>,
}

impl WalkabilityGrid {
    /// Bounds-checked lookup; anything outside the grid is not walkable.
    pub fn is_walkable(&self, cell: Point) -> bool {
        self.grid.index_in_bounds(cell.x, cell.y) && self.grid.get(cell.x, cell.y)
    }

    pub fn in_bounds(&self, cell: Point) -> bool {
        self.grid.index_in_bounds(cell.x, cell.y)
    }

    /// The in-bounds 4-neighbours of `cell` in right, left, down, up order. `cell` itself may lie
    /// anywhere, even at the edge of the `i32` range.
    pub fn neighbours(&self, cell: &Point) -> SmallVec<[Point; 4]> {
        [
            Point::new(cell.x.saturating_add(1), cell.y),
            Point::new(cell.x.saturating_sub(1), cell.y),
            Point::new(cell.x, cell.y.saturating_add(1)),
            Point::new(cell.x, cell.y.saturating_sub(1)),
        ]
        .into_iter()
        .filter(|p| self.in_bounds(*p))
        .collect()
    }

    pub fn walkable_count(&self) -> usize {
        iproduct!(0..self.height() as i32, 0..self.width() as i32)
            .filter(|&(y, x)| self.grid.get(x, y))
            .count()
    }

    /// Checks whether two walkable cells belong to the same walkway blob.
    pub fn connected(&self, a: &Point, b: &Point) -> bool {
        self.is_walkable(*a)
            && self.is_walkable(*b)
            && self
                .components
                .equiv(self.get_ix_point(a), self.get_ix_point(b))
    }

    /// Generates a new [UnionFind] structure and links up walkable 4-neighbours.
    pub fn generate_components(&mut self) {
        let w = self.grid.width();
        let h = self.grid.height();
        self.components = UnionFind::new(w * h);
        for (y, x) in iproduct!(0..h as i32, 0..w as i32) {
            if !self.grid.get(x, y) {
                continue;
            }
            let point = Point::new(x, y);
            let ix = self.get_ix_point(&point);
            for n in [Point::new(x + 1, y), Point::new(x, y + 1)] {
                if self.is_walkable(n) {
                    let n_ix = self.get_ix_point(&n);
                    self.components.union(ix, n_ix);
                }
            }
        }
    }
}

impl fmt::Display for WalkabilityGrid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for y in 0..self.grid.height() as i32 {
            let row = (0..self.grid.width() as i32)
                .map(|x| if self.grid.get(x, y) { '.' } else { '#' })
                .collect::<String>();
            writeln!(f, "{}", row)?;
        }
        Ok(())
    }
}

impl ValueGrid<bool> for WalkabilityGrid {
    fn new(width: usize, height: usize, default_value: bool) -> Self {
        let mut grid = WalkabilityGrid {
            grid: BoolGrid::new(width, height, default_value),
            components: UnionFind::new(width * height),
        };
        if default_value {
            grid.generate_components();
        }
        grid
    }
    fn get(&self, x: i32, y: i32) -> bool {
        self.grid.get(x, y)
    }
    /// Updates a cell. Components are not maintained incrementally; call
    /// [generate_components](WalkabilityGrid::generate_components) after editing.
    fn set(&mut self, x: i32, y: i32, walkable: bool) {
        self.grid.set(x, y, walkable);
    }
    fn width(&self) -> usize {
        self.grid.width()
    }
    fn height(&self) -> usize {
        self.grid.height()
    }
}

/// Downsamples `image` by `scale` to `ceil(w / scale) x ceil(h / scale)` pixels.
fn downsample(image: &RgbImage, scale: u32) -> RgbImage {
    if scale <= 1 {
        return image.clone();
    }
    let width = grid_len(image.width(), scale);
    let height = grid_len(image.height(), scale);
    imageops::resize(image, width, height, FilterType::Triangle)
}

/// Classifies every downsampled pixel of `image` as walkway or not.
///
/// Never fails: an image without pixels yields a single non-walkable cell.
pub fn classify(image: &RgbImage, params: &RouteParams) -> WalkabilityGrid {
    let size = ImageSize::new(image.width(), image.height());
    if size.is_empty() {
        debug!("Empty image, using a 1x1 blocked grid");
        return WalkabilityGrid::new(1, 1, false);
    }
    let small = downsample(image, params.scale);
    let mut grid = WalkabilityGrid::new(small.width() as usize, small.height() as usize, false);
    for (x, y, pixel) in small.enumerate_pixels() {
        if is_walkway(Hsv::from(*pixel), params.sat_max, params.val_min) {
            grid.set(x as i32, y as i32, true);
        }
    }
    grid.generate_components();
    debug!(
        "Classified {}x{} image into {}x{} grid with {} walkable cells",
        size.width,
        size.height,
        grid.width(),
        grid.height(),
        grid.walkable_count()
    );
    grid
}

/// [classify] for any decoded image.
pub fn classify_dynamic(image: &DynamicImage, params: &RouteParams) -> WalkabilityGrid {
    classify(&image.to_rgb8(), params)
}
