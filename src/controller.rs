//! Interactive controller: binds the active shape layer, reacts to viewer
//! and form input, and keeps the table and the ROI file in sync.
//!
//! DESIGN
//! ======
//! The controller is either inactive (no shape layer selected, widget
//! disabled) or active (one layer wrapped in a collection and a table model).
//! Switching layers returns the previous layer to the host before the new one
//! is bound, so no handler ever sees a stale layer.
//!
//! Every handler returns the [`Action`]s the host should carry out: enable or
//! disable the widget, show a warning, ask the user to confirm loading a file.
//! The controller never blocks on the user.
//!
//! Drag handling is the [`DragState`] machine. While a drag is in progress,
//! layer changes refresh only the rows the drag touches and autosave is
//! deferred to the end of the drag. Hosts do not always report the end of a
//! gesture, so a drag is also closed by the next drag start, by widget input,
//! and by a table cell edit. None of those can happen while the pointer is
//! still dragging on the canvas.

#[cfg(test)]
#[path = "controller_test.rs"]
mod controller_test;

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::accessor::{Rejected, RoiLayerAccessor};
use crate::camera::Camera;
use crate::consts::ROI_NAME_FEATURE;
use crate::csv_file;
use crate::geometry::{self, RoiGeometry};
use crate::input::{DragState, Mode};
use crate::layer::{LayerEvent, ShapesLayer};
use crate::origin::RoiOrigin;
use crate::roi::Roi;
use crate::table::RoiTableModel;

// =============================================================================
// TYPES
// =============================================================================

/// Actions returned from handlers for the host to carry out.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Enable or disable the ROI widget.
    WidgetEnabled(bool),
    /// Show a non-fatal warning to the user.
    Warning(String),
    /// `path` already holds ROIs. Ask the user which origin the file uses
    /// (`origin` is the layer's current one), then call
    /// [`RoiController::load_roi_file`] or [`RoiController::save`].
    ConfirmLoad { path: PathBuf, origin: RoiOrigin },
    /// The ROI file was written.
    Saved { path: PathBuf, count: usize },
}

/// The layer the viewer just made active.
#[derive(Debug)]
pub enum ActiveLayer<L> {
    /// A drawable shapes layer.
    Shapes(L),
    /// Anything else, or nothing at all.
    Other,
}

/// Result of an active-layer change.
#[derive(Debug)]
pub struct LayerSwitch<L> {
    /// Previously bound layer, handed back to the host.
    pub previous: Option<L>,
    /// The new layer, handed back because it could not be bound.
    pub rejected: Option<L>,
    pub actions: Vec<Action>,
}

/// ROI widget controller.
#[derive(Debug)]
pub struct RoiController<L: ShapesLayer> {
    table: Option<RoiTableModel<L>>,
    drag: DragState,
    /// Table edit count when the current drag started.
    drag_edits: u64,
    /// Layer changed during the current drag and has not been autosaved.
    dirty: bool,
}

impl<L: ShapesLayer> Default for RoiController<L> {
    fn default() -> Self {
        Self { table: None, drag: DragState::Idle, drag_edits: 0, dirty: false }
    }
}

// =============================================================================
// BINDING
// =============================================================================

impl<L: ShapesLayer> RoiController<L> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.table.is_some()
    }

    #[must_use]
    pub fn table(&self) -> Option<&RoiTableModel<L>> {
        self.table.as_ref()
    }

    pub fn table_mut(&mut self) -> Option<&mut RoiTableModel<L>> {
        self.table.as_mut()
    }

    #[must_use]
    pub fn rois(&self) -> Option<&RoiLayerAccessor<L>> {
        self.table.as_ref().map(RoiTableModel::rois)
    }

    #[must_use]
    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    /// React to the viewer's active layer changing.
    ///
    /// The previous layer is unbound first and returned. A shapes layer is
    /// then initialized for ROI use and bound; anything else leaves the
    /// controller inactive. If the new layer cannot be initialized it is
    /// returned in [`LayerSwitch::rejected`] and the controller stays inactive.
    pub fn on_active_layer_changed(&mut self, layer: ActiveLayer<L>) -> LayerSwitch<L> {
        let previous = self.unbind();
        let mut rejected = None;
        let actions = match layer {
            ActiveLayer::Shapes(layer) => match self.bind(layer) {
                Ok(()) => vec![Action::WidgetEnabled(true)],
                Err(Rejected { error, layer }) => {
                    warn!(layer = layer.name(), %error, "failed to bind ROI layer");
                    rejected = Some(layer);
                    vec![Action::WidgetEnabled(false), Action::Warning(format!("Cannot use layer for ROIs: {error}"))]
                }
            },
            ActiveLayer::Other => vec![Action::WidgetEnabled(false)],
        };
        LayerSwitch { previous, rejected, actions }
    }

    fn bind(&mut self, layer: L) -> Result<(), Rejected<L>> {
        let mut rois = RoiLayerAccessor::try_new(layer)?;
        rois.layer_mut().set_text_feature(Some(ROI_NAME_FEATURE));
        info!(layer = rois.layer().name(), rois = rois.len(), "bound ROI layer");
        let mut table = RoiTableModel::new(rois);
        table.reset();
        self.table = Some(table);
        Ok(())
    }

    fn unbind(&mut self) -> Option<L> {
        self.drag = DragState::Idle;
        self.dirty = false;
        let layer = self.table.take()?.into_rois().into_layer();
        info!(layer = layer.name(), "unbound ROI layer");
        Some(layer)
    }
}

// =============================================================================
// ROI CREATION
// =============================================================================

impl<L: ShapesLayer> RoiController<L> {
    /// Unique name for the next ROI, derived from the layer's configured
    /// default name. `None` when inactive.
    #[must_use]
    pub fn next_roi_name(&self) -> Option<String> {
        let rois = self.rois()?;
        Some(unique_name(&rois.new_roi_name(), &rois.names()))
    }

    /// Append an ROI with the next default name and the configured size,
    /// centered on the camera.
    pub fn add_roi(&mut self, camera: &Camera) -> Vec<Action> {
        let Some(name) = self.next_roi_name() else {
            return Vec::new();
        };
        let mut actions = self.finish_drag();
        let Some(table) = self.table.as_mut() else {
            return actions;
        };
        let rois = table.rois();
        let origin = rois.roi_origin();
        let centered = RoiGeometry::new(camera.center.x, camera.center.y, rois.new_roi_width(), rois.new_roi_height());
        let placed = geometry::decode(origin, &geometry::encode(RoiOrigin::Center, centered));
        let roi = Roi::from_geometry(name, placed);

        if let Err(e) = table.push_roi(&roi) {
            warn!(error = %e, "failed to add ROI");
            actions.push(Action::Warning(format!("Failed to add ROI: {e}")));
            return actions;
        }
        info!(name = %roi.name, x = roi.x, y = roi.y, "added ROI");
        actions
    }
}

/// Resolve a name collision.
///
/// `desired` is returned verbatim when no existing name equals it. Otherwise
/// the result is `"<desired> (<n>)"` where `n` is one more than the largest
/// suffix already used in that pattern, or 2 if there is none.
#[must_use]
pub fn unique_name<S: AsRef<str>>(desired: &str, existing: &[S]) -> String {
    if !existing.iter().any(|name| name.as_ref() == desired) {
        return desired.to_string();
    }
    let max = existing
        .iter()
        .filter_map(|name| numbered_suffix(name.as_ref(), desired))
        .max();
    let next = max.map_or(2, |n| n.saturating_add(1));
    format!("{desired} ({next})")
}

/// `n` if `name` is exactly `"<base> (<n>)"`. A suffix too large for `u64`
/// counts as `u64::MAX`.
fn numbered_suffix(name: &str, base: &str) -> Option<u64> {
    let digits = name.strip_prefix(base)?.strip_prefix(" (")?.strip_suffix(')')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // Only overflow is left to fail.
    Some(digits.parse().unwrap_or(u64::MAX))
}

// =============================================================================
// VIEWER EVENTS
// =============================================================================

impl<L: ShapesLayer> RoiController<L> {
    /// Mouse button pressed on the layer. In a shape-adding mode the shape
    /// about to be drawn is given the next default name.
    ///
    /// A previous drag that never ended is closed first; the returned
    /// actions are from its deferred autosave.
    pub fn on_drag_start(&mut self, mode: Mode) -> Vec<Action> {
        let actions = self.finish_drag();
        let Some(table) = self.table.as_mut() else {
            return actions;
        };
        if mode.is_adding() {
            let rois = table.rois_mut();
            let name = unique_name(&rois.new_roi_name(), &rois.names());
            rois.set_current_roi_name(Some(&name));
        }
        self.drag_edits = table.edit_count();
        self.drag = DragState::Dragging { mode, moves: 0 };
        debug!(%mode, "drag started");
        actions
    }

    /// Mouse moved while pressed. `rows` are the shapes the drag edits.
    pub fn on_drag_move(&mut self, rows: &[usize]) {
        let DragState::Dragging { mode, moves } = self.drag else {
            return;
        };
        self.drag = DragState::Dragging { mode, moves: moves + 1 };
        if let Some(table) = self.table.as_mut() {
            table.refresh_rows(rows.iter().copied());
        }
    }

    /// Mouse button released. Runs the autosave deferred during the drag.
    pub fn on_drag_end(&mut self) -> Vec<Action> {
        self.finish_drag()
    }

    fn finish_drag(&mut self) -> Vec<Action> {
        let DragState::Dragging { mode, moves } = self.drag else {
            return Vec::new();
        };
        self.drag = DragState::Idle;
        debug!(%mode, moves, "drag ended");
        if std::mem::take(&mut self.dirty) {
            if let Some(table) = self.table.as_mut() {
                table.reset();
            }
            return self.autosave();
        }
        Vec::new()
    }

    /// A change notification from the bound layer.
    pub fn on_layer_event(&mut self, event: LayerEvent) -> Vec<Action> {
        let Some(table) = self.table.as_mut() else {
            return Vec::new();
        };
        match event {
            LayerEvent::Data | LayerEvent::Features => {}
            LayerEvent::CurrentProperties => return Vec::new(),
        }
        if self.drag.is_dragging() && table.edit_count() != self.drag_edits {
            debug!("table edited during drag, closing drag");
            self.drag = DragState::Idle;
            self.dirty = false;
        }
        if self.drag.is_dragging() {
            // Rows the drag touches are refreshed by on_drag_move.
            if table.row_count() != table.rois().len() {
                table.reset();
            }
            self.dirty = true;
            return Vec::new();
        }
        table.reset();
        self.autosave()
    }
}

// =============================================================================
// FORM INPUT
// =============================================================================

impl<L: ShapesLayer> RoiController<L> {
    /// Default name for new ROIs.
    pub fn set_new_roi_name(&mut self, name: &str) {
        if let Some(table) = self.table.as_mut() {
            table.rois_mut().set_new_roi_name(name);
        }
    }

    /// Default width for new ROIs. Returns `false` if `width` is not a
    /// positive finite number.
    pub fn set_new_roi_width(&mut self, width: f64) -> bool {
        let Some(table) = self.table.as_mut().filter(|_| is_valid_size(width)) else {
            return false;
        };
        table.rois_mut().set_new_roi_width(width);
        true
    }

    /// Default height for new ROIs. Returns `false` if `height` is not a
    /// positive finite number.
    pub fn set_new_roi_height(&mut self, height: f64) -> bool {
        let Some(table) = self.table.as_mut().filter(|_| is_valid_size(height)) else {
            return false;
        };
        table.rois_mut().set_new_roi_height(height);
        true
    }

    /// Change the origin convention. Every row's x/y changes, so the table
    /// is reset and the file rewritten if autosave is on.
    pub fn set_roi_origin(&mut self, origin: RoiOrigin) -> Vec<Action> {
        let mut actions = self.finish_drag();
        let Some(table) = self.table.as_mut() else {
            return actions;
        };
        table.rois_mut().set_roi_origin(origin);
        table.reset();
        actions.extend(self.autosave());
        actions
    }

    /// Choose the ROI file. An existing non-empty file is offered for
    /// loading; otherwise the layer is written to it if autosave is on.
    pub fn set_roi_file(&mut self, path: Option<PathBuf>) -> Vec<Action> {
        let mut actions = self.finish_drag();
        let Some(table) = self.table.as_mut() else {
            return actions;
        };
        let rois = table.rois_mut();
        rois.set_roi_file(path.as_deref());
        if let Some(path) = path.filter(|p| csv_file::has_content(p)) {
            actions.push(Action::ConfirmLoad { path, origin: rois.roi_origin() });
            return actions;
        }
        actions.extend(self.autosave());
        actions
    }

    /// Turn autosave on or off. Turning it on saves immediately.
    pub fn set_autosave(&mut self, enabled: bool) -> Vec<Action> {
        let mut actions = self.finish_drag();
        let Some(table) = self.table.as_mut() else {
            return actions;
        };
        table.rois_mut().set_autosave_roi_file(enabled);
        actions.extend(self.autosave());
        actions
    }

    /// Replace the layer's ROIs with the contents of the ROI file, read
    /// under `origin`, which becomes the layer's origin convention.
    pub fn load_roi_file(&mut self, origin: RoiOrigin) -> Vec<Action> {
        let mut actions = self.finish_drag();
        let Some(table) = self.table.as_mut() else {
            return actions;
        };
        let Some(path) = table.rois().roi_file() else {
            actions.push(Action::Warning("No ROI file selected".to_string()));
            return actions;
        };
        let loaded = match csv_file::read(&path) {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read ROI file");
                actions.push(Action::Warning(format!("Failed to load {}: {e}", path.display())));
                return actions;
            }
        };
        let rois = table.rois_mut();
        rois.set_roi_origin(origin);
        let result = rois.replace_all(&loaded);
        table.reset();
        if let Err(e) = result {
            warn!(path = %path.display(), error = %e, "failed to apply ROI file");
            actions.push(Action::Warning(format!("Failed to load {}: {e}", path.display())));
            return actions;
        }
        info!(path = %path.display(), count = loaded.len(), %origin, "loaded ROI file");
        actions
    }

    /// Write the layer's ROIs to the ROI file.
    pub fn save(&mut self) -> Vec<Action> {
        let Some(rois) = self.rois() else {
            return Vec::new();
        };
        let Some(path) = rois.roi_file() else {
            return vec![Action::Warning("No ROI file selected".to_string())];
        };
        match csv_file::write(&path, rois.iter()) {
            Ok(count) => {
                info!(path = %path.display(), count, "saved ROI file");
                vec![Action::Saved { path, count }]
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to save ROI file");
                vec![Action::Warning(format!("Failed to save {}: {e}", path.display()))]
            }
        }
    }

    fn autosave(&mut self) -> Vec<Action> {
        let enabled = self
            .rois()
            .is_some_and(|rois| rois.autosave_roi_file() && rois.roi_file().is_some());
        if enabled { self.save() } else { Vec::new() }
    }
}

fn is_valid_size(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
