#![allow(clippy::float_cmp)]

use super::*;
use crate::accessor::RoiLayerAccessor;
use crate::layer::Shapes;
use crate::origin::RoiOrigin;

fn sample() -> Vec<Roi> {
    vec![Roi::new("A", 0.0, 0.0, 10.0, 5.0), Roi::new("B", 3.0, 4.0, 2.0, 2.0)]
}

fn top_left_layer(rois: &[Roi]) -> RoiLayerAccessor<Shapes> {
    let mut acc = RoiLayerAccessor::new(Shapes::new("ROIs")).unwrap();
    acc.set_roi_origin(RoiOrigin::TopLeft);
    for roi in rois {
        acc.push(roi).unwrap();
    }
    acc
}

#[test]
fn write_layer_exact_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rois.csv");
    let acc = top_left_layer(&sample());

    let written = write(&path, acc.iter()).unwrap();
    assert_eq!(written, 2);
    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text, "Name,X,Y,W,H\nA,0,0,10,5\nB,3,4,2,2\n");
}

#[test]
fn read_back_reproduces_tuples() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rois.csv");
    write(&path, top_left_layer(&sample()).iter()).unwrap();

    let rois = read(&path).unwrap();
    assert_eq!(rois, sample());

    let mut reloaded = RoiLayerAccessor::new(Shapes::new("ROIs")).unwrap();
    reloaded.set_roi_origin(RoiOrigin::TopLeft);
    reloaded.replace_all(&rois).unwrap();
    let again: Vec<Roi> = reloaded.iter().map(|item| item.to_roi()).collect();
    assert_eq!(again, sample());
}

#[test]
fn write_empty_collection_writes_header_only() {
    let mut buf = Vec::new();
    let written = write_to(&mut buf, Vec::<Roi>::new()).unwrap();
    assert_eq!(written, 0);
    assert_eq!(String::from_utf8(buf).unwrap(), "Name,X,Y,W,H\n");
}

#[test]
fn write_fractional_and_quoted_names() {
    let mut buf = Vec::new();
    write_to(&mut buf, [Roi::new("a, b", 2.5, -1.25, 0.5, 3.0)]).unwrap();
    assert_eq!(String::from_utf8(buf).unwrap(), "Name,X,Y,W,H\n\"a, b\",2.5,-1.25,0.5,3\n");
}

#[test]
fn read_tolerates_whitespace_around_numbers() {
    let rois = read_from(" Name , X ,Y,W,H\nA, 1 , 2 , 3 , 4 \n".as_bytes()).unwrap();
    assert_eq!(rois, vec![Roi::new("A", 1.0, 2.0, 3.0, 4.0)]);
}

#[test]
fn names_keep_surrounding_whitespace() {
    let rois = vec![Roi::new(" A ", 1.0, 2.0, 3.0, 4.0), Roi::new("B\t", 0.0, 0.0, 1.0, 1.0)];
    let mut buf = Vec::new();
    write_to(&mut buf, rois.iter().cloned()).unwrap();
    assert_eq!(read_from(buf.as_slice()).unwrap(), rois);
}

#[test]
fn read_header_only_is_empty() {
    assert!(read_from("Name,X,Y,W,H\n".as_bytes()).unwrap().is_empty());
}

#[test]
fn read_rejects_non_positive_size() {
    let err = read_from("Name,X,Y,W,H\nA,0,0,1,1\nB,0,0,0,1\n".as_bytes()).unwrap_err();
    assert!(matches!(err, RoiFileError::InvalidSize { line: 3 }), "{err:?}");
    let err = read_from("Name,X,Y,W,H\nA,0,0,1,-2\n".as_bytes()).unwrap_err();
    assert!(matches!(err, RoiFileError::InvalidSize { line: 2 }), "{err:?}");
}

#[test]
fn read_rejects_unparseable_number() {
    let err = read_from("Name,X,Y,W,H\nA,zero,0,1,1\n".as_bytes()).unwrap_err();
    assert!(matches!(err, RoiFileError::Csv(_)), "{err:?}");
}

#[test]
fn read_rejects_missing_column() {
    let err = read_from("Name,X,Y,W\nA,0,0,1\n".as_bytes()).unwrap_err();
    assert!(matches!(err, RoiFileError::Csv(_)), "{err:?}");
}

#[test]
fn read_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = read(&dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, RoiFileError::Io(_)), "{err:?}");
}

#[test]
fn has_content_checks_existence_and_size() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rois.csv");
    assert!(!has_content(&path));
    std::fs::write(&path, "").unwrap();
    assert!(!has_content(&path));
    std::fs::write(&path, "Name,X,Y,W,H\n").unwrap();
    assert!(has_content(&path));
    assert!(!has_content(dir.path()));
}
