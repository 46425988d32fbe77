use serde_json::json;

use super::*;

fn rect(i: f64) -> Rectangle {
    [[i, i], [i, i + 1.0], [i + 1.0, i + 1.0], [i + 1.0, i]]
}

fn names(table: &FeatureTable) -> Vec<Value> {
    table.column("roi_name").unwrap_or_default().to_vec()
}

fn named_table(values: &[&str]) -> FeatureTable {
    let mut table = FeatureTable::with_len(values.len());
    table.add_column("roi_name", Value::Null);
    for (i, v) in values.iter().enumerate() {
        table.set(i, "roi_name", json!(v));
    }
    table
}

// =============================================================
// FeatureTable
// =============================================================

#[test]
fn feature_table_new_is_empty() {
    let table = FeatureTable::new();
    assert!(table.is_empty());
    assert_eq!(table.column_names().count(), 0);
}

#[test]
fn feature_table_add_column_fills_existing_rows() {
    let mut table = FeatureTable::with_len(3);
    assert!(table.add_column("roi_name", json!("")));
    assert_eq!(names(&table), vec![json!(""), json!(""), json!("")]);
}

#[test]
fn feature_table_add_column_twice_is_noop() {
    let mut table = named_table(&["a"]);
    assert!(!table.add_column("roi_name", json!("x")));
    assert_eq!(names(&table), vec![json!("a")]);
}

#[test]
fn feature_table_get_and_set() {
    let mut table = named_table(&["a", "b"]);
    assert_eq!(table.get(1, "roi_name"), Some(&json!("b")));
    assert!(table.set(1, "roi_name", json!("c")));
    assert_eq!(table.get(1, "roi_name"), Some(&json!("c")));
    assert!(!table.set(2, "roi_name", json!("d")));
    assert!(!table.set(0, "missing", json!("d")));
    assert_eq!(table.get(0, "missing"), None);
}

#[test]
fn feature_table_push_row_fills_missing_columns_with_null() {
    let mut table = named_table(&["a"]);
    table.add_column("score", json!(1.0));
    let mut row = FeatureRow::new();
    row.insert("roi_name".into(), json!("b"));
    row.insert("unknown".into(), json!(true));
    table.push_row(&row);
    assert_eq!(table.len(), 2);
    assert_eq!(table.get(1, "roi_name"), Some(&json!("b")));
    assert_eq!(table.get(1, "score"), Some(&Value::Null));
    assert!(!table.has_column("unknown"));
}

#[test]
fn feature_table_move_row_forward_and_back() {
    let mut table = named_table(&["a", "b", "c", "d"]);
    assert!(table.move_row(3, 1));
    assert_eq!(names(&table), vec![json!("a"), json!("d"), json!("b"), json!("c")]);
    assert!(table.move_row(1, 3));
    assert_eq!(names(&table), vec![json!("a"), json!("b"), json!("c"), json!("d")]);
    assert!(!table.move_row(4, 0));
}

#[test]
fn feature_table_clear_row_sets_null() {
    let mut table = named_table(&["a", "b"]);
    table.clear_row(0);
    assert_eq!(names(&table), vec![Value::Null, json!("b")]);
}

#[test]
fn feature_table_truncate() {
    let mut table = named_table(&["a", "b", "c"]);
    table.truncate(1);
    assert_eq!(table.len(), 1);
    assert_eq!(names(&table), vec![json!("a")]);
    table.truncate(5);
    assert_eq!(table.len(), 1);
}

#[test]
fn feature_table_row_snapshot() {
    let table = named_table(&["a"]);
    let row = table.row(0).unwrap();
    assert_eq!(row.get("roi_name"), Some(&json!("a")));
    assert!(table.row(1).is_none());
}

// =============================================================
// Shapes host behavior
// =============================================================

#[test]
fn shapes_set_data_grows_features_with_defaults() {
    let mut layer = Shapes::new("ROIs");
    let mut features = FeatureTable::new();
    features.add_column("roi_name", json!(""));
    layer.set_features(features).unwrap();
    layer.feature_defaults_mut().insert("roi_name".into(), json!("default"));

    layer.set_data(vec![rect(0.0), rect(1.0)]);
    assert_eq!(layer.features().len(), 2);
    assert_eq!(layer.features().get(1, "roi_name"), Some(&json!("default")));
}

#[test]
fn shapes_set_data_shrinks_features_from_the_end() {
    let mut layer = Shapes::new("ROIs");
    layer.set_data(vec![rect(0.0), rect(1.0), rect(2.0)]);
    layer.set_features(named_table(&["a", "b", "c"])).unwrap();

    layer.set_data(vec![rect(0.0)]);
    assert_eq!(names(layer.features()), vec![json!("a")]);
}

#[test]
fn shapes_set_features_rejects_length_mismatch() {
    let mut layer = Shapes::new("ROIs");
    layer.set_data(vec![rect(0.0)]);
    let err = layer.set_features(named_table(&["a", "b"])).unwrap_err();
    assert_eq!(err, LayerError::LengthMismatch { shapes: 1, features: 2 });
    assert_eq!(layer.features().len(), 1);
}

#[test]
fn shapes_events_record_sizes() {
    let mut layer = Shapes::new("ROIs");
    layer.set_data(vec![rect(0.0)]);
    layer.set_features(named_table(&["a"])).unwrap();
    layer.set_current_properties(FeatureRow::new());

    let events = layer.take_events();
    assert_eq!(
        events,
        vec![
            EventRecord { event: LayerEvent::Data, shapes: 1, features: 1 },
            EventRecord { event: LayerEvent::Features, shapes: 1, features: 1 },
            EventRecord { event: LayerEvent::CurrentProperties, shapes: 1, features: 1 },
        ]
    );
    assert!(layer.take_events().is_empty());
}

#[test]
fn shapes_add_rectangle_uses_current_properties() {
    let mut layer = Shapes::new("ROIs");
    layer.set_features(named_table(&[])).unwrap();
    layer.feature_defaults_mut().insert("roi_name".into(), json!(""));
    let mut current = FeatureRow::new();
    current.insert("roi_name".into(), json!("ROI 1"));
    layer.set_current_properties(current);

    layer.add_rectangle(rect(0.0));
    assert_eq!(layer.data().len(), 1);
    assert_eq!(layer.features().get(0, "roi_name"), Some(&json!("ROI 1")));
}

#[test]
fn shapes_set_rectangle_in_range_only() {
    let mut layer = Shapes::new("ROIs");
    layer.set_data(vec![rect(0.0)]);
    assert!(layer.set_rectangle(0, rect(5.0)));
    assert_eq!(layer.data()[0], rect(5.0));
    assert!(!layer.set_rectangle(1, rect(5.0)));
}

#[test]
fn shapes_text_feature_round_trip() {
    let mut layer = Shapes::new("ROIs");
    assert_eq!(layer.text_feature(), None);
    layer.set_text_feature(Some("roi_name"));
    assert_eq!(layer.text_feature(), Some("roi_name"));
}

#[test]
fn shapes_usable_through_mut_reference() {
    let mut layer = Shapes::new("ROIs");
    {
        let mut borrowed: &mut Shapes = &mut layer;
        ShapesLayer::set_data(&mut borrowed, vec![rect(0.0)]);
        assert_eq!(ShapesLayer::name(&borrowed), "ROIs");
    }
    assert_eq!(layer.data().len(), 1);
}
