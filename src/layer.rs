//! Host shape layer: the contract the ROI collection relies on, and an
//! in-memory implementation of it.
//!
//! A shape layer is owned by the host viewer. It holds an ordered sequence of
//! rectangles, a feature table with one row per rectangle, a metadata map,
//! and a "current properties" slot applied to the next interactively drawn
//! shape. The host notifies listeners after every change through
//! [`LayerEvent`]s.
//!
//! [`Shapes`] reproduces the host behaviors the collection depends on,
//! including the one that matters most: replacing the geometry reconciles the
//! feature table length before any event is emitted.

#[cfg(test)]
#[path = "layer_test.rs"]
mod layer_test;

use serde_json::{Map, Value};

use crate::geometry::Rectangle;

/// A single feature row keyed by column name.
pub type FeatureRow = Map<String, Value>;

/// Layer metadata: a string-keyed JSON map owned by the host.
pub type Metadata = Map<String, Value>;

/// Error returned when the host rejects a layer write.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayerError {
    /// A feature table was assigned whose row count differs from the shape count.
    #[error("feature table has {features} rows but layer has {shapes} shapes")]
    LengthMismatch { shapes: usize, features: usize },
}

// =============================================================================
// FEATURE TABLE
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
struct FeatureColumn {
    name: String,
    values: Vec<Value>,
}

/// Per-shape feature data: named columns of equal length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureTable {
    columns: Vec<FeatureColumn>,
    len: usize,
}

impl FeatureTable {
    /// Create an empty table with no columns and no rows.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table with `len` rows and no columns.
    #[must_use]
    pub fn with_len(len: usize) -> Self {
        Self { columns: Vec::new(), len }
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Column names in insertion order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// All values of one column.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns.iter().find(|c| c.name == name).map(|c| c.values.as_slice())
    }

    /// Add a column filled with `fill`. Returns false if it already exists.
    pub fn add_column(&mut self, name: &str, fill: Value) -> bool {
        if self.has_column(name) {
            return false;
        }
        self.columns.push(FeatureColumn { name: name.to_string(), values: vec![fill; self.len] });
        true
    }

    /// One cell, or `None` if the row or column does not exist.
    #[must_use]
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        self.column(column).and_then(|values| values.get(row))
    }

    /// Overwrite one cell. Returns false if the row or column does not exist.
    pub fn set(&mut self, row: usize, column: &str, value: Value) -> bool {
        let Some(cell) = self
            .columns
            .iter_mut()
            .find(|c| c.name == column)
            .and_then(|c| c.values.get_mut(row))
        else {
            return false;
        };
        *cell = value;
        true
    }

    /// One row as a map. Missing cells are not possible; every column has
    /// a value for every row.
    #[must_use]
    pub fn row(&self, row: usize) -> Option<FeatureRow> {
        if row >= self.len {
            return None;
        }
        Some(
            self.columns
                .iter()
                .map(|c| (c.name.clone(), c.values[row].clone()))
                .collect(),
        )
    }

    /// Append a row. Columns absent from `row` get the missing sentinel;
    /// keys in `row` that are not columns are ignored.
    pub fn push_row(&mut self, row: &FeatureRow) {
        for column in &mut self.columns {
            column.values.push(row.get(&column.name).cloned().unwrap_or(Value::Null));
        }
        self.len += 1;
    }

    /// Set every cell of `row` to the missing sentinel.
    pub fn clear_row(&mut self, row: usize) {
        for column in &mut self.columns {
            if let Some(cell) = column.values.get_mut(row) {
                *cell = Value::Null;
            }
        }
    }

    /// Move the row at `from` to position `to`, shifting the rows between.
    /// Returns false if either index is out of range.
    pub fn move_row(&mut self, from: usize, to: usize) -> bool {
        if from >= self.len || to >= self.len {
            return false;
        }
        for column in &mut self.columns {
            let value = column.values.remove(from);
            column.values.insert(to, value);
        }
        true
    }

    /// Drop trailing rows so at most `len` remain.
    pub fn truncate(&mut self, len: usize) {
        for column in &mut self.columns {
            column.values.truncate(len);
        }
        self.len = self.len.min(len);
    }
}

// =============================================================================
// EVENTS
// =============================================================================

/// Change notification emitted by a shape layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerEvent {
    /// The geometry sequence was replaced or edited.
    Data,
    /// The feature table was replaced.
    Features,
    /// The current-properties slot changed.
    CurrentProperties,
}

/// An emitted event together with the layer sizes at emission time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventRecord {
    pub event: LayerEvent,
    pub shapes: usize,
    pub features: usize,
}

// =============================================================================
// HOST CONTRACT
// =============================================================================

/// A drawable shapes layer as provided by the host viewer.
///
/// Implementations must uphold one rule the ROI collection depends on:
/// [`ShapesLayer::set_data`] reconciles the feature table to the new shape
/// count (appending [`ShapesLayer::feature_defaults`] rows when growing,
/// dropping trailing rows when shrinking) before notifying any listener.
pub trait ShapesLayer {
    /// Display name of the layer.
    fn name(&self) -> &str;

    fn data(&self) -> &[Rectangle];

    /// Replace the whole geometry sequence.
    fn set_data(&mut self, data: Vec<Rectangle>);

    fn features(&self) -> &FeatureTable;

    /// Replace the whole feature table.
    ///
    /// # Errors
    ///
    /// Returns [`LayerError::LengthMismatch`] if the row count differs from
    /// the current shape count.
    fn set_features(&mut self, features: FeatureTable) -> Result<(), LayerError>;

    /// Row appended to the feature table when geometry grows.
    fn feature_defaults(&self) -> &FeatureRow;

    fn feature_defaults_mut(&mut self) -> &mut FeatureRow;

    /// Feature values applied to the next interactively drawn shape.
    fn current_properties(&self) -> &FeatureRow;

    fn set_current_properties(&mut self, properties: FeatureRow);

    fn metadata(&self) -> &Metadata;

    fn metadata_mut(&mut self) -> &mut Metadata;

    /// Feature column rendered as a text label next to each shape.
    fn text_feature(&self) -> Option<&str>;

    fn set_text_feature(&mut self, column: Option<&str>);
}

impl<T: ShapesLayer + ?Sized> ShapesLayer for &mut T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn data(&self) -> &[Rectangle] {
        (**self).data()
    }

    fn set_data(&mut self, data: Vec<Rectangle>) {
        (**self).set_data(data);
    }

    fn features(&self) -> &FeatureTable {
        (**self).features()
    }

    fn set_features(&mut self, features: FeatureTable) -> Result<(), LayerError> {
        (**self).set_features(features)
    }

    fn feature_defaults(&self) -> &FeatureRow {
        (**self).feature_defaults()
    }

    fn feature_defaults_mut(&mut self) -> &mut FeatureRow {
        (**self).feature_defaults_mut()
    }

    fn current_properties(&self) -> &FeatureRow {
        (**self).current_properties()
    }

    fn set_current_properties(&mut self, properties: FeatureRow) {
        (**self).set_current_properties(properties);
    }

    fn metadata(&self) -> &Metadata {
        (**self).metadata()
    }

    fn metadata_mut(&mut self) -> &mut Metadata {
        (**self).metadata_mut()
    }

    fn text_feature(&self) -> Option<&str> {
        (**self).text_feature()
    }

    fn set_text_feature(&mut self, column: Option<&str>) {
        (**self).set_text_feature(column);
    }
}

// =============================================================================
// IN-MEMORY LAYER
// =============================================================================

/// In-memory shape layer.
///
/// Events are queued instead of dispatched; the embedding application drains
/// them with [`Shapes::take_events`] and forwards them to the controller.
#[derive(Debug, Clone, Default)]
pub struct Shapes {
    name: String,
    data: Vec<Rectangle>,
    features: FeatureTable,
    feature_defaults: FeatureRow,
    current_properties: FeatureRow,
    metadata: Metadata,
    text_feature: Option<String>,
    events: Vec<EventRecord>,
}

impl Shapes {
    /// Create an empty layer.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    /// Commit an interactively drawn rectangle, the way the viewer does at
    /// the end of a draw gesture: the new feature row is the feature
    /// defaults overlaid with the current properties.
    pub fn add_rectangle(&mut self, rect: Rectangle) {
        let mut row = self.feature_defaults.clone();
        for (key, value) in &self.current_properties {
            row.insert(key.clone(), value.clone());
        }
        self.data.push(rect);
        self.features.push_row(&row);
        self.emit(LayerEvent::Data);
    }

    /// Replace one rectangle in place, as a drag edit does.
    /// Returns false if `index` is out of range.
    pub fn set_rectangle(&mut self, index: usize, rect: Rectangle) -> bool {
        let Some(slot) = self.data.get_mut(index) else {
            return false;
        };
        *slot = rect;
        self.emit(LayerEvent::Data);
        true
    }

    /// Drain queued change notifications in emission order.
    pub fn take_events(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: LayerEvent) {
        self.events.push(EventRecord { event, shapes: self.data.len(), features: self.features.len() });
    }
}

impl ShapesLayer for Shapes {
    fn name(&self) -> &str {
        &self.name
    }

    fn data(&self) -> &[Rectangle] {
        &self.data
    }

    fn set_data(&mut self, data: Vec<Rectangle>) {
        let len = data.len();
        self.data = data;
        if len < self.features.len() {
            self.features.truncate(len);
        }
        while self.features.len() < len {
            self.features.push_row(&self.feature_defaults);
        }
        self.emit(LayerEvent::Data);
    }

    fn features(&self) -> &FeatureTable {
        &self.features
    }

    fn set_features(&mut self, features: FeatureTable) -> Result<(), LayerError> {
        if features.len() != self.data.len() {
            return Err(LayerError::LengthMismatch { shapes: self.data.len(), features: features.len() });
        }
        self.features = features;
        self.emit(LayerEvent::Features);
        Ok(())
    }

    fn feature_defaults(&self) -> &FeatureRow {
        &self.feature_defaults
    }

    fn feature_defaults_mut(&mut self) -> &mut FeatureRow {
        &mut self.feature_defaults
    }

    fn current_properties(&self) -> &FeatureRow {
        &self.current_properties
    }

    fn set_current_properties(&mut self, properties: FeatureRow) {
        self.current_properties = properties;
        self.emit(LayerEvent::CurrentProperties);
    }

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    fn text_feature(&self) -> Option<&str> {
        self.text_feature.as_deref()
    }

    fn set_text_feature(&mut self, column: Option<&str>) {
        self.text_feature = column.map(str::to_string);
    }
}
