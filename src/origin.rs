//! ROI origin: which point of a rectangle its `(x, y)` refers to.

#[cfg(test)]
#[path = "origin_test.rs"]
mod origin_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Anchor convention for a rectangle's `(x, y)` coordinates.
///
/// Stored per layer. Changing it reinterprets the reported `x`/`y` of every
/// ROI on the layer without moving any stored vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RoiOrigin {
    /// Midpoint of the rectangle.
    #[default]
    #[serde(rename = "center")]
    Center,
    /// Minimum row, minimum column.
    #[serde(rename = "top left")]
    TopLeft,
    /// Minimum row, maximum column.
    #[serde(rename = "top right")]
    TopRight,
    /// Maximum row, minimum column.
    #[serde(rename = "bottom left")]
    BottomLeft,
    /// Maximum row, maximum column.
    #[serde(rename = "bottom right")]
    BottomRight,
}

impl RoiOrigin {
    /// All variants, in menu order.
    pub const ALL: [Self; 5] = [Self::Center, Self::TopLeft, Self::TopRight, Self::BottomLeft, Self::BottomRight];

    /// The string stored in layer metadata.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Center => "center",
            Self::TopLeft => "top left",
            Self::TopRight => "top right",
            Self::BottomLeft => "bottom left",
            Self::BottomRight => "bottom right",
        }
    }
}

impl fmt::Display for RoiOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown origin string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown ROI origin: {0:?}")]
pub struct UnknownOrigin(pub String);

impl FromStr for RoiOrigin {
    type Err = UnknownOrigin;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|origin| origin.as_str() == s)
            .ok_or_else(|| UnknownOrigin(s.to_string()))
    }
}
