//! Tests for the YOLO codec.

use crate::format::yolo;
use crate::geometry::Rect;
use crate::model::BoxAnnotation;

use super::{DISPLAY, catalog, dog_box};

#[test]
fn test_line_parses_to_display_corners() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("photo.txt");
    std::fs::write(&path, "0 0.5 0.5 0.25 0.25\n").unwrap();

    let boxes = yolo::load(&path, &catalog(), DISPLAY).unwrap();
    assert_eq!(boxes.len(), 1);
    assert_eq!(boxes[0].label.as_deref(), Some("dog"));

    let rect = boxes[0].rect;
    assert!((rect.left - 300.0).abs() < 0.001);
    assert!((rect.top - 225.0).abs() < 0.001);
    assert!((rect.right - 500.0).abs() < 0.001);
    assert!((rect.bottom - 375.0).abs() < 0.001);
}

#[test]
fn test_save_writes_normalized_six_decimals() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("photo.txt");

    yolo::save(&path, &[dog_box()], &catalog(), DISPLAY).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents, "0 0.500000 0.500000 0.250000 0.250000\n");
}

#[test]
fn test_out_of_range_class_returns_partial() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("photo.txt");
    std::fs::write(
        &path,
        "0 0.5 0.5 0.25 0.25\n99 0.5 0.5 0.1 0.1\n1 0.2 0.2 0.1 0.1\n",
    )
    .unwrap();

    // The inconsistent index stops parsing; the line before it survives,
    // the one after it is dropped.
    let boxes = yolo::load(&path, &catalog(), DISPLAY).unwrap();
    assert_eq!(boxes.len(), 1);
    assert_eq!(boxes[0].label.as_deref(), Some("dog"));
}

#[test]
fn test_malformed_lines_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("photo.txt");
    std::fs::write(
        &path,
        "not a line\n0 0.5\n0 0.5 0.5 0.25 0.25\n1 x y w h\n",
    )
    .unwrap();

    let boxes = yolo::load(&path, &catalog(), DISPLAY).unwrap();
    assert_eq!(boxes.len(), 1);
}

#[test]
fn test_unlabeled_and_uncatalogued_boxes_skipped_on_save() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("photo.txt");

    let boxes = vec![
        BoxAnnotation::unlabeled(Rect::new(0.0, 0.0, 100.0, 100.0)),
        BoxAnnotation::new(Rect::new(0.0, 0.0, 100.0, 100.0), Some("zebra".into())),
        dog_box(),
    ];
    yolo::save(&path, &boxes, &catalog(), DISPLAY).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents.lines().count(), 1);
    assert!(contents.starts_with("0 "));
}

#[test]
fn test_empty_box_list_writes_empty_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("photo.txt");

    yolo::save(&path, &[], &catalog(), DISPLAY).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
}
