#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

/// A point in data (world) coordinates. `x` is the column axis, `y` the row axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Viewer camera state as far as ROI placement cares.
///
/// The viewer reports its center as one coordinate per displayed dimension;
/// only the last two (row, column) place a rectangle on the image plane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Camera {
    pub center: Point,
}

impl Camera {
    #[must_use]
    pub fn new(center: Point) -> Self {
        Self { center }
    }

    /// Build from the viewer's N-dimensional center. Returns `None` for fewer
    /// than two dimensions.
    #[must_use]
    pub fn from_center(center: &[f64]) -> Option<Self> {
        match center {
            [.., y, x] => Some(Self::new(Point::new(*x, *y))),
            _ => None,
        }
    }
}
