//! Input model: layer interaction modes and the drag state machine.
//!
//! `Mode` is the shape layer's interaction mode at the time a drag starts.
//! `DragState` tracks one mouse drag between press and release, so the
//! controller can tell a drag-driven layer change (refresh the touched rows)
//! from any other change (reset the table).

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use std::fmt;
use std::str::FromStr;

/// Interaction mode of a shape layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Navigate the canvas; shapes are not touched.
    #[default]
    PanZoom,
    /// Select, move and resize whole shapes.
    Select,
    /// Move single vertices.
    Direct,
    AddRectangle,
    AddEllipse,
    AddLine,
    AddPath,
    AddPolygon,
    VertexInsert,
    VertexRemove,
}

impl Mode {
    pub const ALL: [Self; 10] = [
        Self::PanZoom,
        Self::Select,
        Self::Direct,
        Self::AddRectangle,
        Self::AddEllipse,
        Self::AddLine,
        Self::AddPath,
        Self::AddPolygon,
        Self::VertexInsert,
        Self::VertexRemove,
    ];

    /// Whether a drag in this mode creates a new shape.
    #[must_use]
    pub fn is_adding(self) -> bool {
        matches!(
            self,
            Self::AddRectangle | Self::AddEllipse | Self::AddLine | Self::AddPath | Self::AddPolygon
        )
    }

    /// Name the host uses for this mode.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PanZoom => "pan_zoom",
            Self::Select => "select",
            Self::Direct => "direct",
            Self::AddRectangle => "add_rectangle",
            Self::AddEllipse => "add_ellipse",
            Self::AddLine => "add_line",
            Self::AddPath => "add_path",
            Self::AddPolygon => "add_polygon",
            Self::VertexInsert => "vertex_insert",
            Self::VertexRemove => "vertex_remove",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown layer mode {0:?}")]
pub struct UnknownMode(pub String);

impl FromStr for Mode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| UnknownMode(s.to_string()))
    }
}

/// State of the drag state machine.
///
/// `Idle → Dragging` on press, `Dragging → Dragging` on every move,
/// `Dragging → Idle` on release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    /// No button held.
    #[default]
    Idle,
    /// A drag is in progress.
    Dragging {
        /// Layer mode when the drag started.
        mode: Mode,
        /// Move events seen so far.
        moves: usize,
    },
}

impl DragState {
    #[must_use]
    pub fn is_dragging(self) -> bool {
        matches!(self, Self::Dragging { .. })
    }
}
