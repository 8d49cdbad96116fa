//! Conversions between the three coordinate spaces a route passes through.
//!
//! - normalized: fractions of image width/height, what the registry stores and the caller draws
//! - pixel: full-resolution image coordinates
//! - cell: [Point]s on the downsampled walkability grid
//!
//! Every crossing between spaces goes through these functions so that all call sites share one
//! rounding mode (floor).
use core::fmt;
use grid_util::point::Point;
use serde::{Deserialize, Serialize};

/// A position as a fraction of the image size.
#[derive(Copy, Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct NormPoint {
    pub x: f64,
    pub y: f64,
}

impl NormPoint {
    pub const fn new(x: f64, y: f64) -> NormPoint {
        NormPoint { x, y }
    }
}

impl From<[f64; 2]> for NormPoint {
    fn from([x, y]: [f64; 2]) -> Self {
        NormPoint { x, y }
    }
}

impl From<NormPoint> for [f64; 2] {
    fn from(p: NormPoint) -> Self {
        [p.x, p.y]
    }
}

impl fmt::Display for NormPoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.x, self.y)
    }
}

/// A full-resolution pixel position. May lie outside the image.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

/// Width and height of the source image in pixels.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> ImageSize {
        ImageSize { width, height }
    }
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Grid dimension for a source dimension: `ceil(len / scale)`, at least 1.
pub fn grid_len(len: u32, scale: u32) -> u32 {
    len.div_ceil(scale.max(1)).max(1)
}

pub fn norm_to_pixel(p: NormPoint, size: ImageSize) -> PixelPoint {
    PixelPoint {
        x: (p.x * size.width as f64).floor() as i32,
        y: (p.y * size.height as f64).floor() as i32,
    }
}

pub fn pixel_to_cell(p: PixelPoint, scale: u32) -> Point {
    let scale = scale.max(1) as i32;
    Point::new(p.x.div_euclid(scale), p.y.div_euclid(scale))
}

pub fn cell_to_pixel(cell: Point, scale: u32) -> PixelPoint {
    let scale = scale.max(1) as i32;
    PixelPoint {
        x: cell.x * scale,
        y: cell.y * scale,
    }
}

/// A zero-sized dimension maps to 0 rather than dividing by zero.
pub fn pixel_to_norm(p: PixelPoint, size: ImageSize) -> NormPoint {
    let div = |v: i32, len: u32| if len == 0 { 0.0 } else { v as f64 / len as f64 };
    NormPoint {
        x: div(p.x, size.width),
        y: div(p.y, size.height),
    }
}

pub fn norm_to_cell(p: NormPoint, size: ImageSize, scale: u32) -> Point {
    pixel_to_cell(norm_to_pixel(p, size), scale)
}

pub fn cell_to_norm(cell: Point, size: ImageSize, scale: u32) -> NormPoint {
    pixel_to_norm(cell_to_pixel(cell, scale), size)
}
