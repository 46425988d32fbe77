//! Layer-backed ROI collection.
//!
//! DESIGN
//! ======
//! [`RoiLayerAccessor`] presents a [`ShapesLayer`] as an ordered, indexable,
//! mutable sequence of ROIs. It stores nothing of its own: every read decodes
//! the layer's vertices and feature table, every write re-encodes and replaces
//! the layer's geometry or features immediately.
//!
//! Items handed out by [`RoiLayerAccessor::get`] and
//! [`RoiLayerAccessor::get_mut`] are `(collection, index)` handles. They are
//! positional: the borrow they hold prevents structural changes while they
//! are alive, and a fresh handle must be taken after any insert or remove.
//!
//! Geometry and features are two independently assigned host properties.
//! Insert grows the geometry first (the host appends a default feature row),
//! then moves that row into place. Remove moves the doomed feature row to the
//! end first, then shrinks the geometry (the host drops the trailing row).
//! Both structures therefore have equal length at every host notification.

#[cfg(test)]
#[path = "accessor_test.rs"]
pub(crate) mod accessor_test;

use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tracing::debug;

use crate::config::{ConfigMut, ConfigView, LayerConfig};
use crate::consts::ROI_NAME_FEATURE;
use crate::geometry::{self, Rectangle};
use crate::layer::{FeatureTable, LayerError, ShapesLayer};
use crate::origin::RoiOrigin;
use crate::roi::{RoiRead, RoiWrite};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoiError {
    /// Index outside `[0, len)` after resolving negative indices.
    #[error("ROI index {index} out of range for {len} ROIs")]
    IndexOutOfRange { index: isize, len: usize },
    /// The host layer rejected a write.
    #[error(transparent)]
    Layer(#[from] LayerError),
}

/// A layer that could not be wrapped, handed back with the reason.
#[derive(Debug)]
pub struct Rejected<L> {
    pub error: RoiError,
    pub layer: L,
}

/// An ordered collection of ROIs backed by a shape layer.
#[derive(Debug)]
pub struct RoiLayerAccessor<L: ShapesLayer> {
    layer: L,
}

// =============================================================================
// CONSTRUCTION
// =============================================================================

impl<L: ShapesLayer> RoiLayerAccessor<L> {
    /// Wrap `layer`, adding the `roi_name` feature column, its feature
    /// default, and any missing configuration keys. Values already present on
    /// the layer are kept, so wrapping the same layer twice is harmless.
    ///
    /// # Errors
    ///
    /// Returns [`RoiError::Layer`] if the host rejects the feature table.
    /// The layer is dropped; use [`RoiLayerAccessor::try_new`] to get it back.
    pub fn new(layer: L) -> Result<Self, RoiError> {
        Self::try_new(layer).map_err(|rejected| rejected.error)
    }

    /// Like [`RoiLayerAccessor::new`], but a layer that cannot be wrapped is
    /// handed back instead of dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Rejected`] if the host rejects the feature table.
    pub fn try_new(mut layer: L) -> Result<Self, Rejected<L>> {
        if !layer.features().has_column(ROI_NAME_FEATURE) {
            let mut features = layer.features().clone();
            features.add_column(ROI_NAME_FEATURE, json!(""));
            if let Err(e) = layer.set_features(features) {
                return Err(Rejected { error: e.into(), layer });
            }
        }
        if !layer.feature_defaults().contains_key(ROI_NAME_FEATURE) {
            layer.feature_defaults_mut().insert(ROI_NAME_FEATURE.into(), json!(""));
        }
        LayerConfig::initialize(layer.metadata_mut());
        Ok(Self { layer })
    }

    #[must_use]
    pub fn layer(&self) -> &L {
        &self.layer
    }

    pub fn layer_mut(&mut self) -> &mut L {
        &mut self.layer
    }

    /// Give the layer back to its owner.
    pub fn into_layer(self) -> L {
        self.layer
    }
}

// =============================================================================
// SEQUENCE
// =============================================================================

impl<L: ShapesLayer> RoiLayerAccessor<L> {
    /// Number of ROIs, i.e. the layer's shape count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layer.data().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve a possibly negative index against the current length.
    ///
    /// # Errors
    ///
    /// Returns [`RoiError::IndexOutOfRange`] if the resolved index is not in `[0, len)`.
    pub fn resolve(&self, index: isize) -> Result<usize, RoiError> {
        let len = self.len();
        let resolved = if index < 0 {
            len.checked_sub(index.unsigned_abs())
        } else {
            Some(index.unsigned_abs())
        };
        match resolved {
            Some(i) if i < len => Ok(i),
            _ => Err(RoiError::IndexOutOfRange { index, len }),
        }
    }

    /// Read-only live view of one ROI. Negative indices count from the end.
    ///
    /// # Errors
    ///
    /// Returns [`RoiError::IndexOutOfRange`] for an invalid index.
    pub fn get(&self, index: isize) -> Result<Item<'_, L>, RoiError> {
        let index = self.resolve(index)?;
        Ok(Item { rois: self, index })
    }

    /// Writable live view of one ROI. Negative indices count from the end.
    ///
    /// # Errors
    ///
    /// Returns [`RoiError::IndexOutOfRange`] for an invalid index.
    pub fn get_mut(&mut self, index: isize) -> Result<ItemMut<'_, L>, RoiError> {
        let index = self.resolve(index)?;
        Ok(ItemMut { rois: self, index })
    }

    /// Read-only view at a non-negative position, or `None` past the end.
    #[must_use]
    pub fn at(&self, index: usize) -> Option<Item<'_, L>> {
        (index < self.len()).then_some(Item { rois: self, index })
    }

    /// Writable view at a non-negative position, or `None` past the end.
    pub fn at_mut(&mut self, index: usize) -> Option<ItemMut<'_, L>> {
        (index < self.len()).then_some(ItemMut { rois: self, index })
    }

    /// Overwrite the ROI at `index` with the fields of `roi`.
    ///
    /// # Errors
    ///
    /// Returns [`RoiError::IndexOutOfRange`] for an invalid index, or
    /// [`RoiError::Layer`] if the host rejects a write.
    pub fn set<R: RoiRead + ?Sized>(&mut self, index: isize, roi: &R) -> Result<(), RoiError> {
        self.get_mut(index)?.assign(roi)
    }

    /// Insert `roi` so that it ends up at position `index`.
    ///
    /// # Errors
    ///
    /// Returns [`RoiError::IndexOutOfRange`] if `index > len`, or
    /// [`RoiError::Layer`] if the host breaks the feature reconciliation rule.
    pub fn insert<R: RoiRead + ?Sized>(&mut self, index: usize, roi: &R) -> Result<(), RoiError> {
        let len = self.len();
        if index > len {
            return Err(RoiError::IndexOutOfRange { index: isize::try_from(index).unwrap_or(isize::MAX), len });
        }

        let rect = geometry::encode(self.roi_origin(), roi.geometry());
        let mut data = self.layer.data().to_vec();
        data.insert(index, rect);
        self.layer.set_data(data);

        let mut features = self.layer.features().clone();
        if features.len() != len + 1 {
            return Err(LayerError::LengthMismatch { shapes: len + 1, features: features.len() }.into());
        }
        features.move_row(len, index);
        features.clear_row(index);
        features.set(index, ROI_NAME_FEATURE, json!(roi.name()));
        self.layer.set_features(features)?;

        debug!(index, name = %roi.name(), "inserted ROI");
        Ok(())
    }

    /// Append `roi` at the end.
    ///
    /// # Errors
    ///
    /// Same as [`RoiLayerAccessor::insert`].
    pub fn push<R: RoiRead + ?Sized>(&mut self, roi: &R) -> Result<(), RoiError> {
        self.insert(self.len(), roi)
    }

    /// Remove the ROI at `index`, shifting later ROIs down by one.
    ///
    /// # Errors
    ///
    /// Returns [`RoiError::IndexOutOfRange`] for an invalid index, or
    /// [`RoiError::Layer`] if the host rejects the reordered features.
    pub fn remove(&mut self, index: isize) -> Result<(), RoiError> {
        let index = self.resolve(index)?;
        let last = self.len() - 1;

        let mut features = self.layer.features().clone();
        features.move_row(index, last);
        self.layer.set_features(features)?;

        let mut data = self.layer.data().to_vec();
        data.remove(index);
        self.layer.set_data(data);

        debug!(index, "removed ROI");
        Ok(())
    }

    /// Replace every ROI at once: one geometry write, one feature write.
    ///
    /// # Errors
    ///
    /// Returns [`RoiError::Layer`] if the host rejects the feature table.
    pub fn replace_all<R: RoiRead>(&mut self, rois: &[R]) -> Result<(), RoiError> {
        let origin = self.roi_origin();
        let data: Vec<Rectangle> = rois.iter().map(|roi| geometry::encode(origin, roi.geometry())).collect();
        self.layer.set_data(data);

        let mut features = self.layer.features().clone();
        for (index, roi) in rois.iter().enumerate() {
            features.clear_row(index);
            features.set(index, ROI_NAME_FEATURE, json!(roi.name()));
        }
        self.layer.set_features(features)?;

        debug!(count = rois.len(), "replaced all ROIs");
        Ok(())
    }

    /// Live read-only views in index order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, L> {
        Iter { rois: self, next: 0 }
    }

    /// Names of all ROIs in index order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        (0..self.len()).map(|i| self.read_name(i)).collect()
    }
}

impl<'a, L: ShapesLayer> IntoIterator for &'a RoiLayerAccessor<L> {
    type Item = Item<'a, L>;
    type IntoIter = Iter<'a, L>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// =============================================================================
// CONFIGURATION
// =============================================================================

impl<L: ShapesLayer> RoiLayerAccessor<L> {
    /// Snapshot of the whole layer configuration.
    #[must_use]
    pub fn config(&self) -> LayerConfig {
        LayerConfig::read(self.layer.metadata())
    }

    #[must_use]
    pub fn new_roi_name(&self) -> String {
        ConfigView::new(self.layer.metadata()).new_roi_name().to_string()
    }

    pub fn set_new_roi_name(&mut self, name: &str) {
        ConfigMut::new(self.layer.metadata_mut()).set_new_roi_name(name);
    }

    #[must_use]
    pub fn new_roi_width(&self) -> f64 {
        ConfigView::new(self.layer.metadata()).new_roi_width()
    }

    pub fn set_new_roi_width(&mut self, width: f64) {
        ConfigMut::new(self.layer.metadata_mut()).set_new_roi_width(width);
    }

    #[must_use]
    pub fn new_roi_height(&self) -> f64 {
        ConfigView::new(self.layer.metadata()).new_roi_height()
    }

    pub fn set_new_roi_height(&mut self, height: f64) {
        ConfigMut::new(self.layer.metadata_mut()).set_new_roi_height(height);
    }

    #[must_use]
    pub fn roi_origin(&self) -> RoiOrigin {
        ConfigView::new(self.layer.metadata()).roi_origin()
    }

    /// Change the origin convention. Stored vertices do not move; reported
    /// `x`/`y` of every ROI change accordingly.
    pub fn set_roi_origin(&mut self, origin: RoiOrigin) {
        ConfigMut::new(self.layer.metadata_mut()).set_roi_origin(origin);
    }

    #[must_use]
    pub fn roi_file(&self) -> Option<PathBuf> {
        ConfigView::new(self.layer.metadata()).roi_file()
    }

    pub fn set_roi_file(&mut self, path: Option<&Path>) {
        ConfigMut::new(self.layer.metadata_mut()).set_roi_file(path);
    }

    #[must_use]
    pub fn autosave_roi_file(&self) -> bool {
        ConfigView::new(self.layer.metadata()).autosave_roi_file()
    }

    pub fn set_autosave_roi_file(&mut self, autosave: bool) {
        ConfigMut::new(self.layer.metadata_mut()).set_autosave_roi_file(autosave);
    }

    /// Name the host will give the shape currently being drawn, if any.
    #[must_use]
    pub fn current_roi_name(&self) -> Option<String> {
        self.layer
            .current_properties()
            .get(ROI_NAME_FEATURE)
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    pub fn set_current_roi_name(&mut self, name: Option<&str>) {
        let mut properties = self.layer.current_properties().clone();
        match name {
            Some(name) => properties.insert(ROI_NAME_FEATURE.into(), json!(name)),
            None => properties.remove(ROI_NAME_FEATURE),
        };
        self.layer.set_current_properties(properties);
    }
}

// =============================================================================
// ROW ACCESS
// =============================================================================

impl<L: ShapesLayer> RoiLayerAccessor<L> {
    fn rect(&self, index: usize) -> &Rectangle {
        &self.layer.data()[index]
    }

    fn read_name(&self, index: usize) -> String {
        match self.layer.features().get(index, ROI_NAME_FEATURE) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    fn write_name(&mut self, index: usize, name: &str) -> Result<(), RoiError> {
        let mut features: FeatureTable = self.layer.features().clone();
        features.set(index, ROI_NAME_FEATURE, json!(name));
        self.layer.set_features(features)?;
        Ok(())
    }

    fn write_rect(&mut self, index: usize, rect: Rectangle) {
        let mut data = self.layer.data().to_vec();
        data[index] = rect;
        self.layer.set_data(data);
    }

    fn rewrite_rect(&mut self, index: usize, f: impl FnOnce(RoiOrigin, &Rectangle) -> Rectangle) {
        let rect = f(self.roi_origin(), self.rect(index));
        self.write_rect(index, rect);
    }
}

// =============================================================================
// ITEM VIEWS
// =============================================================================

/// Read-only live view of one ROI.
#[derive(Debug)]
pub struct Item<'a, L: ShapesLayer> {
    rois: &'a RoiLayerAccessor<L>,
    index: usize,
}

impl<L: ShapesLayer> Item<'_, L> {
    /// Position in the collection.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Stored vertices.
    #[must_use]
    pub fn rect(&self) -> &Rectangle {
        self.rois.rect(self.index)
    }
}

impl<L: ShapesLayer> RoiRead for Item<'_, L> {
    fn name(&self) -> String {
        self.rois.read_name(self.index)
    }

    fn x(&self) -> f64 {
        geometry::decode_x(self.rois.roi_origin(), self.rois.rect(self.index))
    }

    fn y(&self) -> f64 {
        geometry::decode_y(self.rois.roi_origin(), self.rois.rect(self.index))
    }

    fn width(&self) -> f64 {
        geometry::width(self.rois.rect(self.index))
    }

    fn height(&self) -> f64 {
        geometry::height(self.rois.rect(self.index))
    }
}

/// Writable live view of one ROI. Every setter writes through to the layer.
#[derive(Debug)]
pub struct ItemMut<'a, L: ShapesLayer> {
    rois: &'a mut RoiLayerAccessor<L>,
    index: usize,
}

impl<L: ShapesLayer> ItemMut<'_, L> {
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    fn view(&self) -> Item<'_, L> {
        Item { rois: &*self.rois, index: self.index }
    }
}

impl<L: ShapesLayer> RoiRead for ItemMut<'_, L> {
    fn name(&self) -> String {
        self.view().name()
    }

    fn x(&self) -> f64 {
        self.view().x()
    }

    fn y(&self) -> f64 {
        self.view().y()
    }

    fn width(&self) -> f64 {
        self.view().width()
    }

    fn height(&self) -> f64 {
        self.view().height()
    }
}

impl<L: ShapesLayer> RoiWrite for ItemMut<'_, L> {
    type Error = RoiError;

    fn set_name(&mut self, name: &str) -> Result<(), RoiError> {
        self.rois.write_name(self.index, name)
    }

    fn set_x(&mut self, x: f64) -> Result<(), RoiError> {
        self.rois.rewrite_rect(self.index, |origin, rect| geometry::with_x(origin, rect, x));
        Ok(())
    }

    fn set_y(&mut self, y: f64) -> Result<(), RoiError> {
        self.rois.rewrite_rect(self.index, |origin, rect| geometry::with_y(origin, rect, y));
        Ok(())
    }

    fn set_width(&mut self, width: f64) -> Result<(), RoiError> {
        self.rois.rewrite_rect(self.index, |origin, rect| geometry::with_width(origin, rect, width));
        Ok(())
    }

    fn set_height(&mut self, height: f64) -> Result<(), RoiError> {
        self.rois.rewrite_rect(self.index, |origin, rect| geometry::with_height(origin, rect, height));
        Ok(())
    }
}

/// Iterator over live read-only views, in index order.
#[derive(Debug)]
pub struct Iter<'a, L: ShapesLayer> {
    rois: &'a RoiLayerAccessor<L>,
    next: usize,
}

impl<'a, L: ShapesLayer> Iterator for Iter<'a, L> {
    type Item = Item<'a, L>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.rois.len() {
            return None;
        }
        let item = Item { rois: self.rois, index: self.next };
        self.next += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.rois.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl<L: ShapesLayer> ExactSizeIterator for Iter<'_, L> {}
