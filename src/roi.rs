//! ROI records: the value type and the capability traits shared with live
//! layer views.
//!
//! [`RoiRead`] and [`RoiWrite`] describe "something with a name, x, y, width
//! and height". [`Roi`] is the detached implementation; the collection in
//! [`crate::accessor`] hands out views that implement the same traits by
//! reading and writing the backing layer on every call.

#[cfg(test)]
#[path = "roi_test.rs"]
mod roi_test;

use std::convert::Infallible;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_NEW_ROI_HEIGHT, DEFAULT_NEW_ROI_NAME, DEFAULT_NEW_ROI_WIDTH};
use crate::geometry::RoiGeometry;

/// Read access to an ROI's fields.
pub trait RoiRead {
    fn name(&self) -> String;
    fn x(&self) -> f64;
    fn y(&self) -> f64;
    fn width(&self) -> f64;
    fn height(&self) -> f64;

    /// The four numeric fields as one value.
    fn geometry(&self) -> RoiGeometry {
        RoiGeometry::new(self.x(), self.y(), self.width(), self.height())
    }

    /// Snapshot into a detached [`Roi`].
    fn to_roi(&self) -> Roi {
        Roi::from_geometry(self.name(), self.geometry())
    }
}

/// Write access to an ROI's fields.
///
/// Each setter is an independent write. Layer-backed implementations apply
/// it to the layer immediately.
pub trait RoiWrite: RoiRead {
    type Error;

    fn set_name(&mut self, name: &str) -> Result<(), Self::Error>;
    fn set_x(&mut self, x: f64) -> Result<(), Self::Error>;
    fn set_y(&mut self, y: f64) -> Result<(), Self::Error>;
    fn set_width(&mut self, width: f64) -> Result<(), Self::Error>;
    fn set_height(&mut self, height: f64) -> Result<(), Self::Error>;

    /// Copy every field from `other`: name, x, y, width, height, in that order.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by one of the individual setters; fields
    /// written before it keep their new values.
    fn assign<R: RoiRead + ?Sized>(&mut self, other: &R) -> Result<(), Self::Error> {
        self.set_name(&other.name())?;
        self.set_x(other.x())?;
        self.set_y(other.y())?;
        self.set_width(other.width())?;
        self.set_height(other.height())
    }
}

/// A detached ROI value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roi {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Roi {
    #[must_use]
    pub fn new(name: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { name: name.into(), x, y, width, height }
    }

    #[must_use]
    pub fn from_geometry(name: impl Into<String>, g: RoiGeometry) -> Self {
        Self::new(name, g.x, g.y, g.width, g.height)
    }
}

impl Default for Roi {
    fn default() -> Self {
        Self::new(DEFAULT_NEW_ROI_NAME, 0.0, 0.0, DEFAULT_NEW_ROI_WIDTH, DEFAULT_NEW_ROI_HEIGHT)
    }
}

impl RoiRead for Roi {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn x(&self) -> f64 {
        self.x
    }

    fn y(&self) -> f64 {
        self.y
    }

    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }
}

impl RoiWrite for Roi {
    type Error = Infallible;

    fn set_name(&mut self, name: &str) -> Result<(), Infallible> {
        self.name = name.to_string();
        Ok(())
    }

    fn set_x(&mut self, x: f64) -> Result<(), Infallible> {
        self.x = x;
        Ok(())
    }

    fn set_y(&mut self, y: f64) -> Result<(), Infallible> {
        self.y = y;
        Ok(())
    }

    fn set_width(&mut self, width: f64) -> Result<(), Infallible> {
        self.width = width;
        Ok(())
    }

    fn set_height(&mut self, height: f64) -> Result<(), Infallible> {
        self.height = height;
        Ok(())
    }
}
