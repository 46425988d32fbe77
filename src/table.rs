//! Five-column table projection of a layer-backed ROI collection.
//!
//! DESIGN
//! ======
//! [`RoiTableModel`] owns the collection and exposes it as rows of
//! `name, x, y, width, height`. Cell edits are validated before anything is
//! written; a rejected edit leaves the layer untouched and returns `false`.
//!
//! The model does not call into a view. Every change is queued as a
//! [`TableEvent`] and the view drains the queue with
//! [`RoiTableModel::take_events`]. Structural changes are bracketed by
//! begin/end pairs so a view can keep selections and scroll positions valid.
//!
//! The model remembers the row count it last announced. When the layer
//! changes size behind its back (a shape drawn or deleted in the viewer),
//! [`RoiTableModel::refresh_rows`] falls back to a full reset.

#[cfg(test)]
#[path = "table_test.rs"]
mod table_test;

use tracing::{debug, warn};

use crate::accessor::{RoiError, RoiLayerAccessor};
use crate::consts::TABLE_HEADERS;
use crate::layer::ShapesLayer;
use crate::roi::{Roi, RoiRead, RoiWrite};

// =============================================================================
// TYPES
// =============================================================================

/// Table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Name,
    X,
    Y,
    Width,
    Height,
}

impl Column {
    pub const ALL: [Self; 5] = [Self::Name, Self::X, Self::Y, Self::Width, Self::Height];

    /// Column at position `index`, if any.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Header title.
    #[must_use]
    pub fn title(self) -> &'static str {
        TABLE_HEADERS[self.index()]
    }
}

/// Value shown in one cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
}

/// Change notification for the attached view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableEvent {
    /// Cells in the inclusive range changed value.
    DataChanged { top: usize, left: usize, bottom: usize, right: usize },
    BeginInsertRows { first: usize, last: usize },
    EndInsertRows,
    BeginRemoveRows { first: usize, last: usize },
    EndRemoveRows,
    /// Everything the view knows is stale.
    BeginReset,
    EndReset,
}

/// Why a cell edit was refused.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditError {
    #[error("ROI name must not be empty")]
    EmptyName,
    #[error("ROI name {0:?} is already in use")]
    DuplicateName(String),
    #[error("{0:?} is not a number")]
    NotANumber(String),
    #[error("{0} is not positive")]
    NotPositive(f64),
    #[error("cell ({row}, {column}) is outside the table")]
    OutOfRange { row: usize, column: usize },
}

/// A validated cell write.
#[derive(Debug, Clone, PartialEq)]
enum Edit {
    Name(String),
    X(f64),
    Y(f64),
    Width(f64),
    Height(f64),
}

// =============================================================================
// MODEL
// =============================================================================

/// Table model over a layer-backed ROI collection.
#[derive(Debug)]
pub struct RoiTableModel<L: ShapesLayer> {
    rois: RoiLayerAccessor<L>,
    rows: usize,
    /// Successful cell edits so far.
    edits: u64,
    events: Vec<TableEvent>,
}

impl<L: ShapesLayer> RoiTableModel<L> {
    #[must_use]
    pub fn new(rois: RoiLayerAccessor<L>) -> Self {
        let rows = rois.len();
        Self { rois, rows, edits: 0, events: Vec::new() }
    }

    /// The wrapped collection.
    #[must_use]
    pub fn rois(&self) -> &RoiLayerAccessor<L> {
        &self.rois
    }

    /// Direct access to the collection. Changes made through it are not
    /// announced; follow up with [`RoiTableModel::reset`] or
    /// [`RoiTableModel::refresh_rows`].
    pub fn rois_mut(&mut self) -> &mut RoiLayerAccessor<L> {
        &mut self.rois
    }

    pub fn into_rois(self) -> RoiLayerAccessor<L> {
        self.rois
    }

    /// Row count as last announced to the view.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        Column::ALL.len()
    }

    /// Number of cell edits applied through [`RoiTableModel::set_data`].
    #[must_use]
    pub fn edit_count(&self) -> u64 {
        self.edits
    }

    /// Drain queued notifications in emission order.
    pub fn take_events(&mut self) -> Vec<TableEvent> {
        std::mem::take(&mut self.events)
    }

    // --- Cells ---

    /// Cell contents, or `None` outside the table.
    #[must_use]
    pub fn data(&self, row: usize, column: usize) -> Option<CellValue> {
        let column = Column::from_index(column)?;
        let item = self.rois.at(row)?;
        Some(match column {
            Column::Name => CellValue::Text(item.name()),
            Column::X => CellValue::Number(item.x()),
            Column::Y => CellValue::Number(item.y()),
            Column::Width => CellValue::Number(item.width()),
            Column::Height => CellValue::Number(item.height()),
        })
    }

    #[must_use]
    pub fn header(&self, section: usize) -> Option<&'static str> {
        Column::from_index(section).map(Column::title)
    }

    /// Every cell inside the table can be edited.
    #[must_use]
    pub fn is_editable(&self, row: usize, column: usize) -> bool {
        row < self.rois.len() && column < self.column_count()
    }

    /// Apply a user edit. Returns `false`, changing nothing, if the value is
    /// not acceptable for that column.
    pub fn set_data(&mut self, row: usize, column: usize, value: &str) -> bool {
        let edit = match self.validate(row, column, value) {
            Ok(edit) => edit,
            Err(e) => {
                debug!(row, column, error = %e, "rejected cell edit");
                return false;
            }
        };
        let Some(mut item) = self.rois.at_mut(row) else {
            return false;
        };
        if let Err(e) = apply(&mut item, edit) {
            warn!(row, column, error = %e, "cell edit failed");
            return false;
        }
        self.edits += 1;
        self.events.push(TableEvent::DataChanged { top: row, left: column, bottom: row, right: column });
        true
    }

    fn validate(&self, row: usize, column: usize, value: &str) -> Result<Edit, EditError> {
        let Some(column) = Column::from_index(column).filter(|_| row < self.rois.len()) else {
            return Err(EditError::OutOfRange { row, column });
        };
        match column {
            Column::Name => {
                let name = value.trim();
                if name.is_empty() {
                    return Err(EditError::EmptyName);
                }
                let taken = self
                    .rois
                    .iter()
                    .any(|item| item.index() != row && item.name() == name);
                if taken {
                    return Err(EditError::DuplicateName(name.to_string()));
                }
                Ok(Edit::Name(name.to_string()))
            }
            Column::X => parse_number(value).map(Edit::X),
            Column::Y => parse_number(value).map(Edit::Y),
            Column::Width => parse_positive(value).map(Edit::Width),
            Column::Height => parse_positive(value).map(Edit::Height),
        }
    }

    // --- Rows ---

    /// Insert `count` default ROIs before `row`. Returns `false` for an
    /// invalid range.
    pub fn insert_rows(&mut self, row: usize, count: usize) -> bool {
        let Some(end) = row.checked_add(count).filter(|_| count > 0 && row <= self.rois.len()) else {
            return false;
        };
        self.events.push(TableEvent::BeginInsertRows { first: row, last: end - 1 });
        let mut inserted = 0;
        for i in row..end {
            if let Err(e) = self.rois.insert(i, &Roi::default()) {
                warn!(row = i, error = %e, "row insert failed");
                break;
            }
            inserted += 1;
        }
        self.rows += inserted;
        self.events.push(TableEvent::EndInsertRows);
        inserted == count
    }

    /// Remove `count` rows starting at `row`. Returns `false` for an invalid
    /// range.
    pub fn remove_rows(&mut self, row: usize, count: usize) -> bool {
        let Some(end) = row.checked_add(count).filter(|&end| count > 0 && end <= self.rois.len()) else {
            return false;
        };
        let Ok(index) = isize::try_from(row) else {
            return false;
        };
        self.events.push(TableEvent::BeginRemoveRows { first: row, last: end - 1 });
        let mut removed = 0;
        for _ in 0..count {
            if let Err(e) = self.rois.remove(index) {
                warn!(row, error = %e, "row remove failed");
                break;
            }
            removed += 1;
        }
        self.rows = self.rows.saturating_sub(removed);
        self.events.push(TableEvent::EndRemoveRows);
        removed == count
    }

    // --- Sequence operations ---

    /// Insert `roi` at `index`, announcing one inserted row.
    ///
    /// # Errors
    ///
    /// Returns [`RoiError::IndexOutOfRange`] if `index > len`, before any
    /// notification is queued.
    pub fn insert_roi<R: RoiRead + ?Sized>(&mut self, index: usize, roi: &R) -> Result<(), RoiError> {
        let len = self.rois.len();
        if index > len {
            return Err(RoiError::IndexOutOfRange { index: isize::try_from(index).unwrap_or(isize::MAX), len });
        }
        self.events.push(TableEvent::BeginInsertRows { first: index, last: index });
        let result = self.rois.insert(index, roi);
        if result.is_ok() {
            self.rows += 1;
        }
        self.events.push(TableEvent::EndInsertRows);
        result
    }

    /// Append `roi`, announcing one inserted row.
    ///
    /// # Errors
    ///
    /// Same as [`RoiTableModel::insert_roi`].
    pub fn push_roi<R: RoiRead + ?Sized>(&mut self, roi: &R) -> Result<(), RoiError> {
        self.insert_roi(self.rois.len(), roi)
    }

    /// Overwrite the ROI at `index`, announcing the whole row as changed.
    ///
    /// # Errors
    ///
    /// Returns [`RoiError`] if the index is invalid or the layer rejects a write.
    pub fn replace_roi<R: RoiRead + ?Sized>(&mut self, index: isize, roi: &R) -> Result<(), RoiError> {
        let row = self.rois.resolve(index)?;
        self.rois.set(index, roi)?;
        self.events.push(self.row_changed(row));
        Ok(())
    }

    /// Remove the ROI at `index`, announcing one removed row.
    ///
    /// # Errors
    ///
    /// Returns [`RoiError::IndexOutOfRange`] for an invalid index, before any
    /// notification is queued.
    pub fn remove_roi(&mut self, index: isize) -> Result<(), RoiError> {
        let row = self.rois.resolve(index)?;
        self.events.push(TableEvent::BeginRemoveRows { first: row, last: row });
        let result = self.rois.remove(index);
        if result.is_ok() {
            self.rows = self.rows.saturating_sub(1);
        }
        self.events.push(TableEvent::EndRemoveRows);
        result
    }

    // --- Refresh ---

    /// Invalidate the whole view and adopt the layer's current row count.
    pub fn reset(&mut self) {
        self.events.push(TableEvent::BeginReset);
        self.rows = self.rois.len();
        self.events.push(TableEvent::EndReset);
    }

    /// Announce that the given rows changed in place. Rows outside the table
    /// are skipped. Falls back to [`RoiTableModel::reset`] if the layer's
    /// row count differs from what the view last saw.
    pub fn refresh_rows(&mut self, rows: impl IntoIterator<Item = usize>) {
        if self.rows != self.rois.len() {
            debug!(announced = self.rows, actual = self.rois.len(), "row count drifted, resetting table");
            self.reset();
            return;
        }
        for row in rows {
            if row < self.rows {
                self.events.push(self.row_changed(row));
            }
        }
    }

    fn row_changed(&self, row: usize) -> TableEvent {
        TableEvent::DataChanged { top: row, left: 0, bottom: row, right: self.column_count() - 1 }
    }
}

// =============================================================================
// EDITS
// =============================================================================

fn apply<W: RoiWrite>(item: &mut W, edit: Edit) -> Result<(), W::Error> {
    match edit {
        Edit::Name(name) => item.set_name(&name),
        Edit::X(x) => item.set_x(x),
        Edit::Y(y) => item.set_y(y),
        Edit::Width(width) => item.set_width(width),
        Edit::Height(height) => item.set_height(height),
    }
}

fn parse_number(value: &str) -> Result<f64, EditError> {
    match value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(EditError::NotANumber(value.to_string())),
    }
}

fn parse_positive(value: &str) -> Result<f64, EditError> {
    let v = parse_number(value)?;
    if v > 0.0 { Ok(v) } else { Err(EditError::NotPositive(v)) }
}
