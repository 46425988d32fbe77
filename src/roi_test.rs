#![allow(clippy::float_cmp)]

use super::*;

#[test]
fn roi_default_matches_new_roi_defaults() {
    let roi = Roi::default();
    assert_eq!(roi.name, "New ROI");
    assert_eq!(roi.x, 0.0);
    assert_eq!(roi.y, 0.0);
    assert_eq!(roi.width, 100.0);
    assert_eq!(roi.height, 100.0);
}

#[test]
fn roi_read_trait_exposes_fields() {
    let roi = Roi::new("A", 1.0, 2.0, 3.0, 4.0);
    assert_eq!(RoiRead::name(&roi), "A");
    assert_eq!(roi.geometry(), RoiGeometry::new(1.0, 2.0, 3.0, 4.0));
}

#[test]
fn roi_to_roi_is_a_copy() {
    let roi = Roi::new("A", 1.0, 2.0, 3.0, 4.0);
    assert_eq!(roi.to_roi(), roi);
}

#[test]
fn roi_setters_write_fields() {
    let mut roi = Roi::default();
    roi.set_name("B").unwrap();
    roi.set_x(5.0).unwrap();
    roi.set_y(6.0).unwrap();
    roi.set_width(7.0).unwrap();
    roi.set_height(8.0).unwrap();
    assert_eq!(roi, Roi::new("B", 5.0, 6.0, 7.0, 8.0));
}

#[test]
fn roi_assign_copies_every_field() {
    let mut roi = Roi::default();
    let source = Roi::new("C", -1.0, -2.0, 0.5, 0.25);
    roi.assign(&source).unwrap();
    assert_eq!(roi, source);
}

#[test]
fn roi_from_geometry() {
    let roi = Roi::from_geometry("D", RoiGeometry::new(1.0, 1.0, 2.0, 2.0));
    assert_eq!(roi, Roi::new("D", 1.0, 1.0, 2.0, 2.0));
}
