//! Tests for the Pascal VOC codec.

use std::path::Path;

use crate::format::pascal_voc;
use crate::geometry::Rect;
use crate::model::BoxAnnotation;

use super::{DISPLAY, ORIGINAL, catalog, dog_box};

#[test]
fn test_save_writes_original_space_integers() {
    let dir = tempfile::tempdir().unwrap();
    let image_path = dir.path().join("photo.jpg");
    let xml_path = dir.path().join("photo.xml");

    pascal_voc::save(
        &xml_path,
        &image_path,
        &[dog_box()],
        &catalog(),
        DISPLAY,
        ORIGINAL,
    )
    .unwrap();

    let contents = std::fs::read_to_string(&xml_path).unwrap();
    // Display (300,225)-(500,375) doubles into original space.
    assert!(contents.contains("<xmin>600</xmin>"));
    assert!(contents.contains("<ymin>450</ymin>"));
    assert!(contents.contains("<xmax>1000</xmax>"));
    assert!(contents.contains("<ymax>750</ymax>"));
    assert!(contents.contains("<name>dog</name>"));
}

#[test]
fn test_save_header_fields() {
    let dir = tempfile::tempdir().unwrap();
    let image_path = dir.path().join("photo.jpg");
    let xml_path = dir.path().join("photo.xml");

    pascal_voc::save(&xml_path, &image_path, &[], &catalog(), DISPLAY, ORIGINAL).unwrap();

    let contents = std::fs::read_to_string(&xml_path).unwrap();
    assert!(contents.contains("<filename>photo.jpg</filename>"));
    assert!(contents.contains("<database>Unknown</database>"));
    assert!(contents.contains("<width>1600</width>"));
    assert!(contents.contains("<height>1200</height>"));
    assert!(contents.contains("<depth>3</depth>"));
    assert!(contents.contains("<segmented>0</segmented>"));
    assert!(!contents.contains("<object>"));
}

#[test]
fn test_save_object_boilerplate() {
    let dir = tempfile::tempdir().unwrap();
    let image_path = dir.path().join("photo.jpg");
    let xml_path = dir.path().join("photo.xml");

    pascal_voc::save(
        &xml_path,
        &image_path,
        &[dog_box()],
        &catalog(),
        DISPLAY,
        ORIGINAL,
    )
    .unwrap();

    let contents = std::fs::read_to_string(&xml_path).unwrap();
    assert!(contents.contains("<pose>Unspecified</pose>"));
    assert!(contents.contains("<truncated>0</truncated>"));
    assert!(contents.contains("<difficult>0</difficult>"));
}

fn write_fixture(path: &Path, objects: &str) {
    let xml = format!(
        "<annotation>\
           <folder>images</folder>\
           <filename>photo.jpg</filename>\
           <size><width>1600</width><height>1200</height><depth>3</depth></size>\
           <segmented>0</segmented>\
           {objects}\
         </annotation>"
    );
    std::fs::write(path, xml).unwrap();
}

#[test]
fn test_load_converts_to_display_space() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("photo.xml");
    write_fixture(
        &path,
        "<object><name>cat</name>\
           <bndbox><xmin>600</xmin><ymin>450</ymin><xmax>1000</xmax><ymax>750</ymax></bndbox>\
         </object>",
    );

    let boxes = pascal_voc::load(&path, DISPLAY, ORIGINAL).unwrap();
    assert_eq!(boxes.len(), 1);
    assert_eq!(boxes[0].label.as_deref(), Some("cat"));
    assert_eq!(boxes[0].rect, Rect::new(300.0, 225.0, 500.0, 375.0));
}

#[test]
fn test_load_multiple_objects_in_document_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("photo.xml");
    write_fixture(
        &path,
        "<object><name>dog</name>\
           <bndbox><xmin>0</xmin><ymin>0</ymin><xmax>200</xmax><ymax>200</ymax></bndbox>\
         </object>\
         <object><name>person</name>\
           <bndbox><xmin>400</xmin><ymin>400</ymin><xmax>800</xmax><ymax>800</ymax></bndbox>\
         </object>",
    );

    let boxes = pascal_voc::load(&path, DISPLAY, ORIGINAL).unwrap();
    assert_eq!(boxes.len(), 2);
    assert_eq!(boxes[0].label.as_deref(), Some("dog"));
    assert_eq!(boxes[1].label.as_deref(), Some("person"));
}

#[test]
fn test_load_skips_degenerate_objects() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("photo.xml");
    // Second object has an inverted box, third is missing its name.
    write_fixture(
        &path,
        "<object><name>dog</name>\
           <bndbox><xmin>0</xmin><ymin>0</ymin><xmax>200</xmax><ymax>200</ymax></bndbox>\
         </object>\
         <object><name>cat</name>\
           <bndbox><xmin>500</xmin><ymin>500</ymin><xmax>100</xmax><ymax>100</ymax></bndbox>\
         </object>\
         <object>\
           <bndbox><xmin>10</xmin><ymin>10</ymin><xmax>50</xmax><ymax>50</ymax></bndbox>\
         </object>",
    );

    let boxes = pascal_voc::load(&path, DISPLAY, ORIGINAL).unwrap();
    assert_eq!(boxes.len(), 1);
    assert_eq!(boxes[0].label.as_deref(), Some("dog"));
}

#[test]
fn test_uncatalogued_label_skipped_on_save() {
    let dir = tempfile::tempdir().unwrap();
    let image_path = dir.path().join("photo.jpg");
    let xml_path = dir.path().join("photo.xml");

    let boxes = vec![
        BoxAnnotation::new(Rect::new(0.0, 0.0, 100.0, 100.0), Some("zebra".into())),
        dog_box(),
    ];
    pascal_voc::save(&xml_path, &image_path, &boxes, &catalog(), DISPLAY, ORIGINAL).unwrap();

    let contents = std::fs::read_to_string(&xml_path).unwrap();
    assert!(!contents.contains("zebra"));
    assert!(contents.contains("<name>dog</name>"));
}
