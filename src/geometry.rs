//! Rectangle geometry codec.
//!
//! A shape layer stores each rectangle as four `[row, col]` vertices. This
//! module converts between that representation and the logical
//! `(x, y, width, height)` of an ROI under a given [`RoiOrigin`], and rewrites
//! single fields of a stored rectangle in place of a full re-encode.
//!
//! Everything here is pure. `x` lives on the column axis and `y` on the row
//! axis, so vertex `[row, col]` pairs read as `[y, x]`.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use serde::{Deserialize, Serialize};

use crate::origin::RoiOrigin;

/// A single `[row, col]` vertex.
pub type Vertex = [f64; 2];

/// The four vertices of a rectangle in drawing order.
pub type Rectangle = [Vertex; 4];

const ROW: usize = 0;
const COL: usize = 1;

/// Logical placement of an ROI, independent of its name.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RoiGeometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl RoiGeometry {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }
}

/// Build the four vertices of a rectangle whose `(x, y)` is the `origin` point.
#[must_use]
pub fn encode(origin: RoiOrigin, g: RoiGeometry) -> Rectangle {
    let RoiGeometry { x, y, width: w, height: h } = g;
    match origin {
        RoiOrigin::Center => {
            let (hw, hh) = (w / 2.0, h / 2.0);
            [[y - hh, x - hw], [y - hh, x + hw], [y + hh, x + hw], [y + hh, x - hw]]
        }
        RoiOrigin::TopLeft => [[y, x], [y, x + w], [y + h, x + w], [y + h, x]],
        RoiOrigin::TopRight => [[y, x - w], [y, x], [y + h, x], [y + h, x - w]],
        RoiOrigin::BottomLeft => [[y - h, x], [y - h, x + w], [y, x + w], [y, x]],
        RoiOrigin::BottomRight => [[y - h, x - w], [y - h, x], [y, x], [y, x - w]],
    }
}

/// Recover the logical placement of a stored rectangle.
#[must_use]
pub fn decode(origin: RoiOrigin, rect: &Rectangle) -> RoiGeometry {
    RoiGeometry {
        x: decode_x(origin, rect),
        y: decode_y(origin, rect),
        width: width(rect),
        height: height(rect),
    }
}

/// Column coordinate of the origin point.
#[must_use]
pub fn decode_x(origin: RoiOrigin, rect: &Rectangle) -> f64 {
    let (min, max) = axis_range(rect, COL);
    match origin {
        RoiOrigin::Center => 0.5 * (min + max),
        RoiOrigin::TopLeft | RoiOrigin::BottomLeft => min,
        RoiOrigin::TopRight | RoiOrigin::BottomRight => max,
    }
}

/// Row coordinate of the origin point.
#[must_use]
pub fn decode_y(origin: RoiOrigin, rect: &Rectangle) -> f64 {
    let (min, max) = axis_range(rect, ROW);
    match origin {
        RoiOrigin::Center => 0.5 * (min + max),
        RoiOrigin::TopLeft | RoiOrigin::TopRight => min,
        RoiOrigin::BottomLeft | RoiOrigin::BottomRight => max,
    }
}

/// Extent along the column axis. Origin-independent.
#[must_use]
pub fn width(rect: &Rectangle) -> f64 {
    let (min, max) = axis_range(rect, COL);
    max - min
}

/// Extent along the row axis. Origin-independent.
#[must_use]
pub fn height(rect: &Rectangle) -> f64 {
    let (min, max) = axis_range(rect, ROW);
    max - min
}

/// Translate every vertex along the column axis so the origin lands on `x`.
#[must_use]
pub fn with_x(origin: RoiOrigin, rect: &Rectangle, x: f64) -> Rectangle {
    translate(rect, COL, x - decode_x(origin, rect))
}

/// Translate every vertex along the row axis so the origin lands on `y`.
#[must_use]
pub fn with_y(origin: RoiOrigin, rect: &Rectangle, y: f64) -> Rectangle {
    translate(rect, ROW, y - decode_y(origin, rect))
}

/// Rescale along the column axis around the current origin point.
#[must_use]
pub fn with_width(origin: RoiOrigin, rect: &Rectangle, new_width: f64) -> Rectangle {
    let current = width(rect);
    if current > 0.0 {
        scale(rect, COL, decode_x(origin, rect), new_width / current)
    } else {
        let mut g = decode(origin, rect);
        g.width = new_width;
        encode(origin, g)
    }
}

/// Rescale along the row axis around the current origin point.
#[must_use]
pub fn with_height(origin: RoiOrigin, rect: &Rectangle, new_height: f64) -> Rectangle {
    let current = height(rect);
    if current > 0.0 {
        scale(rect, ROW, decode_y(origin, rect), new_height / current)
    } else {
        let mut g = decode(origin, rect);
        g.height = new_height;
        encode(origin, g)
    }
}

fn axis_range(rect: &Rectangle, axis: usize) -> (f64, f64) {
    rect.iter()
        .map(|v| v[axis])
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), c| (min.min(c), max.max(c)))
}

fn translate(rect: &Rectangle, axis: usize, delta: f64) -> Rectangle {
    let mut out = *rect;
    for v in &mut out {
        v[axis] += delta;
    }
    out
}

fn scale(rect: &Rectangle, axis: usize, anchor: f64, factor: f64) -> Rectangle {
    let mut out = *rect;
    for v in &mut out {
        v[axis] = (v[axis] - anchor) * factor + anchor;
    }
    out
}
