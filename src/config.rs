//! Per-layer configuration stored in the shape layer's metadata.
//!
//! The host persists layer metadata with the layer, so configuration written
//! here survives re-wrapping the layer and saving the viewer session.
//! [`LayerConfig`] is the typed snapshot; [`ConfigView`] and [`ConfigMut`]
//! read and write single keys with typed values.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::warn;

use crate::consts::{
    AUTOSAVE_ROI_FILE_KEY, DEFAULT_NEW_ROI_HEIGHT, DEFAULT_NEW_ROI_NAME, DEFAULT_NEW_ROI_WIDTH, NEW_ROI_HEIGHT_KEY,
    NEW_ROI_NAME_KEY, NEW_ROI_WIDTH_KEY, ROI_FILE_KEY, ROI_ORIGIN_KEY,
};
use crate::layer::Metadata;
use crate::origin::RoiOrigin;

/// Typed layer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    /// Base name for ROIs added by the user.
    pub new_roi_name: String,
    /// Width of ROIs added with "Add ROI".
    pub new_roi_width: f64,
    /// Height of ROIs added with "Add ROI".
    pub new_roi_height: f64,
    /// Anchor convention for every ROI on the layer.
    pub roi_origin: RoiOrigin,
    /// CSV mirror of the layer, if one was chosen.
    pub roi_file: Option<PathBuf>,
    /// Export to `roi_file` after every change.
    pub autosave_roi_file: bool,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            new_roi_name: DEFAULT_NEW_ROI_NAME.to_string(),
            new_roi_width: DEFAULT_NEW_ROI_WIDTH,
            new_roi_height: DEFAULT_NEW_ROI_HEIGHT,
            roi_origin: RoiOrigin::default(),
            roi_file: None,
            autosave_roi_file: false,
        }
    }
}

impl LayerConfig {
    /// Write the default value of every key that `metadata` lacks.
    /// Existing keys are left untouched. Returns the number of keys written.
    pub fn initialize(metadata: &mut Metadata) -> usize {
        let defaults = Self::default();
        let entries = [
            (NEW_ROI_NAME_KEY, json!(defaults.new_roi_name)),
            (NEW_ROI_WIDTH_KEY, json!(defaults.new_roi_width)),
            (NEW_ROI_HEIGHT_KEY, json!(defaults.new_roi_height)),
            (ROI_ORIGIN_KEY, json!(defaults.roi_origin.as_str())),
            (ROI_FILE_KEY, json!("")),
            (AUTOSAVE_ROI_FILE_KEY, json!(defaults.autosave_roi_file)),
        ];
        let mut written = 0;
        for (key, value) in entries {
            if !metadata.contains_key(key) {
                metadata.insert(key.to_string(), value);
                written += 1;
            }
        }
        written
    }

    /// Read every key, falling back to its default when absent or malformed.
    #[must_use]
    pub fn read(metadata: &Metadata) -> Self {
        let view = ConfigView::new(metadata);
        Self {
            new_roi_name: view.new_roi_name().to_string(),
            new_roi_width: view.new_roi_width(),
            new_roi_height: view.new_roi_height(),
            roi_origin: view.roi_origin(),
            roi_file: view.roi_file(),
            autosave_roi_file: view.autosave_roi_file(),
        }
    }

    /// Overwrite every key with this configuration.
    pub fn write(&self, metadata: &mut Metadata) {
        let mut out = ConfigMut::new(metadata);
        out.set_new_roi_name(&self.new_roi_name);
        out.set_new_roi_width(self.new_roi_width);
        out.set_new_roi_height(self.new_roi_height);
        out.set_roi_origin(self.roi_origin);
        out.set_roi_file(self.roi_file.as_deref());
        out.set_autosave_roi_file(self.autosave_roi_file);
    }
}

/// Typed read access to configuration keys.
pub struct ConfigView<'a> {
    metadata: &'a Metadata,
}

impl<'a> ConfigView<'a> {
    #[must_use]
    pub fn new(metadata: &'a Metadata) -> Self {
        Self { metadata }
    }

    #[must_use]
    pub fn new_roi_name(&self) -> &'a str {
        self.metadata
            .get(NEW_ROI_NAME_KEY)
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_NEW_ROI_NAME)
    }

    #[must_use]
    pub fn new_roi_width(&self) -> f64 {
        self.metadata
            .get(NEW_ROI_WIDTH_KEY)
            .and_then(Value::as_f64)
            .unwrap_or(DEFAULT_NEW_ROI_WIDTH)
    }

    #[must_use]
    pub fn new_roi_height(&self) -> f64 {
        self.metadata
            .get(NEW_ROI_HEIGHT_KEY)
            .and_then(Value::as_f64)
            .unwrap_or(DEFAULT_NEW_ROI_HEIGHT)
    }

    /// Origin convention. An unrecognized value falls back to the default.
    #[must_use]
    pub fn roi_origin(&self) -> RoiOrigin {
        let Some(raw) = self.metadata.get(ROI_ORIGIN_KEY).and_then(Value::as_str) else {
            return RoiOrigin::default();
        };
        raw.parse().unwrap_or_else(|e| {
            warn!(error = %e, "ignoring malformed roi_origin metadata");
            RoiOrigin::default()
        })
    }

    /// ROI file path. The empty string means no file.
    #[must_use]
    pub fn roi_file(&self) -> Option<PathBuf> {
        self.metadata
            .get(ROI_FILE_KEY)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
    }

    #[must_use]
    pub fn autosave_roi_file(&self) -> bool {
        self.metadata
            .get(AUTOSAVE_ROI_FILE_KEY)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

/// Typed write access to configuration keys.
pub struct ConfigMut<'a> {
    metadata: &'a mut Metadata,
}

impl<'a> ConfigMut<'a> {
    pub fn new(metadata: &'a mut Metadata) -> Self {
        Self { metadata }
    }

    pub fn set_new_roi_name(&mut self, name: &str) {
        self.metadata.insert(NEW_ROI_NAME_KEY.into(), json!(name));
    }

    pub fn set_new_roi_width(&mut self, width: f64) {
        self.metadata.insert(NEW_ROI_WIDTH_KEY.into(), json!(width));
    }

    pub fn set_new_roi_height(&mut self, height: f64) {
        self.metadata.insert(NEW_ROI_HEIGHT_KEY.into(), json!(height));
    }

    pub fn set_roi_origin(&mut self, origin: RoiOrigin) {
        self.metadata.insert(ROI_ORIGIN_KEY.into(), json!(origin.as_str()));
    }

    pub fn set_roi_file(&mut self, path: Option<&Path>) {
        let raw = path.map(|p| p.to_string_lossy().into_owned()).unwrap_or_default();
        self.metadata.insert(ROI_FILE_KEY.into(), json!(raw));
    }

    pub fn set_autosave_roi_file(&mut self, autosave: bool) {
        self.metadata.insert(AUTOSAVE_ROI_FILE_KEY.into(), json!(autosave));
    }
}
