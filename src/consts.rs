//! Shared constants for the ROI layer crate.

// ── Feature table ───────────────────────────────────────────────

/// Feature column holding each shape's ROI name.
pub const ROI_NAME_FEATURE: &str = "roi_name";

// ── Layer metadata keys ─────────────────────────────────────────

pub const NEW_ROI_NAME_KEY: &str = "new_roi_name";
pub const NEW_ROI_WIDTH_KEY: &str = "new_roi_width";
pub const NEW_ROI_HEIGHT_KEY: &str = "new_roi_height";
pub const ROI_ORIGIN_KEY: &str = "roi_origin";
pub const ROI_FILE_KEY: &str = "roi_file";
pub const AUTOSAVE_ROI_FILE_KEY: &str = "autosave_roi_file";

// ── Defaults ────────────────────────────────────────────────────

/// Name given to a new ROI when the layer has no configured default.
pub const DEFAULT_NEW_ROI_NAME: &str = "New ROI";

/// Width of a new ROI in data units.
pub const DEFAULT_NEW_ROI_WIDTH: f64 = 100.0;

/// Height of a new ROI in data units.
pub const DEFAULT_NEW_ROI_HEIGHT: f64 = 100.0;

// ── Table ───────────────────────────────────────────────────────

/// Column titles of the ROI table, in column order.
pub const TABLE_HEADERS: [&str; 5] = ["name", "x", "y", "width", "height"];

// ── CSV ─────────────────────────────────────────────────────────

/// Header row of the ROI file, in column order.
pub const CSV_HEADERS: [&str; 5] = ["Name", "X", "Y", "W", "H"];
