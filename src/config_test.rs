#![allow(clippy::float_cmp)]

use super::*;

#[test]
fn initialize_writes_every_default() {
    let mut metadata = Metadata::new();
    assert_eq!(LayerConfig::initialize(&mut metadata), 6);
    assert_eq!(metadata.get("new_roi_name"), Some(&json!("New ROI")));
    assert_eq!(metadata.get("new_roi_width"), Some(&json!(100.0)));
    assert_eq!(metadata.get("new_roi_height"), Some(&json!(100.0)));
    assert_eq!(metadata.get("roi_origin"), Some(&json!("center")));
    assert_eq!(metadata.get("roi_file"), Some(&json!("")));
    assert_eq!(metadata.get("autosave_roi_file"), Some(&json!(false)));
}

#[test]
fn initialize_keeps_existing_values() {
    let mut metadata = Metadata::new();
    metadata.insert("new_roi_name".into(), json!("Cell"));
    metadata.insert("roi_origin".into(), json!("top left"));
    assert_eq!(LayerConfig::initialize(&mut metadata), 4);
    assert_eq!(LayerConfig::initialize(&mut metadata), 0);

    let config = LayerConfig::read(&metadata);
    assert_eq!(config.new_roi_name, "Cell");
    assert_eq!(config.roi_origin, RoiOrigin::TopLeft);
}

#[test]
fn read_empty_metadata_yields_defaults() {
    assert_eq!(LayerConfig::read(&Metadata::new()), LayerConfig::default());
}

#[test]
fn read_malformed_values_fall_back() {
    let mut metadata = Metadata::new();
    metadata.insert("new_roi_width".into(), json!("wide"));
    metadata.insert("roi_origin".into(), json!("middle"));
    metadata.insert("autosave_roi_file".into(), json!(1));
    let config = LayerConfig::read(&metadata);
    assert_eq!(config.new_roi_width, 100.0);
    assert_eq!(config.roi_origin, RoiOrigin::Center);
    assert!(!config.autosave_roi_file);
}

#[test]
fn empty_roi_file_means_none() {
    let mut metadata = Metadata::new();
    LayerConfig::initialize(&mut metadata);
    assert_eq!(ConfigView::new(&metadata).roi_file(), None);

    ConfigMut::new(&mut metadata).set_roi_file(Some(Path::new("/tmp/rois.csv")));
    assert_eq!(ConfigView::new(&metadata).roi_file(), Some(PathBuf::from("/tmp/rois.csv")));

    ConfigMut::new(&mut metadata).set_roi_file(None);
    assert_eq!(metadata.get("roi_file"), Some(&json!("")));
}

#[test]
fn write_then_read_round_trips() {
    let config = LayerConfig {
        new_roi_name: "Nucleus".into(),
        new_roi_width: 12.5,
        new_roi_height: 7.0,
        roi_origin: RoiOrigin::BottomRight,
        roi_file: Some(PathBuf::from("out.csv")),
        autosave_roi_file: true,
    };
    let mut metadata = Metadata::new();
    config.write(&mut metadata);
    assert_eq!(LayerConfig::read(&metadata), config);
    assert_eq!(metadata.get("roi_origin"), Some(&json!("bottom right")));
}

#[test]
fn config_serde_uses_origin_strings() {
    let json = serde_json::to_value(LayerConfig::default()).unwrap();
    assert_eq!(json["roi_origin"], json!("center"));
    assert_eq!(json["roi_file"], Value::Null);
}
