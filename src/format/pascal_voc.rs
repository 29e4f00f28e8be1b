//! Pascal VOC XML codec.
//!
//! One XML file per image. Geometry is persisted in original-image pixel
//! coordinates as non-negative integers; the truncation happens here, not
//! in the coordinate transform.

use std::io::Write;
use std::path::Path;

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::geometry::transform;
use crate::geometry::{Rect, Size};
use crate::model::{BoxAnnotation, ClassCatalog};

use super::FormatError;

/// Serialize boxes to a Pascal VOC annotation file.
///
/// Boxes whose class label is missing or not in the catalog are skipped
/// with a warning.
pub fn save(
    path: &Path,
    image_path: &Path,
    boxes: &[BoxAnnotation],
    catalog: &ClassCatalog,
    display: Size,
    original: Size,
) -> Result<(), FormatError> {
    let folder = image_path
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .unwrap_or("");
    let filename = image_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown");

    let xml = build_xml(folder, filename, image_path, boxes, catalog, display, original)?;
    std::fs::write(path, xml)?;

    log::info!("Saved Pascal VOC annotations to {:?}", path);
    Ok(())
}

/// Parse a Pascal VOC annotation file into display-space boxes.
///
/// Scans the tree for `object` elements, collecting `name` and the four
/// `bndbox` coordinates, and converts each completed box from original to
/// display space.
pub fn load(path: &Path, display: Size, original: Size) -> Result<Vec<BoxAnnotation>, FormatError> {
    use quick_xml::Reader;

    let contents = std::fs::read_to_string(path)?;
    let mut reader = Reader::from_str(&contents);
    reader.trim_text(true);

    let mut boxes = Vec::new();

    let mut current_element = String::new();
    let mut in_object = false;
    let mut in_bndbox = false;

    let mut obj_name = String::new();
    let mut xmin = 0i64;
    let mut ymin = 0i64;
    let mut xmax = 0i64;
    let mut ymax = 0i64;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                current_element = name.clone();

                match name.as_str() {
                    "object" => {
                        in_object = true;
                        obj_name.clear();
                        xmin = 0;
                        ymin = 0;
                        xmax = 0;
                        ymax = 0;
                    }
                    "bndbox" => in_bndbox = true,
                    _ => {}
                }
            }
            Ok(Event::End(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                match name.as_str() {
                    "object" => {
                        if !obj_name.is_empty() && xmax > xmin && ymax > ymin {
                            let top_left =
                                transform::to_display(xmin as f32, ymin as f32, display, original);
                            let bottom_right =
                                transform::to_display(xmax as f32, ymax as f32, display, original);
                            boxes.push(BoxAnnotation::new(
                                Rect::from_corners(top_left, bottom_right),
                                Some(obj_name.clone()),
                            ));
                        }
                        in_object = false;
                    }
                    "bndbox" => in_bndbox = false,
                    _ => {}
                }
                current_element.clear();
            }
            Ok(Event::Text(ref e)) => {
                let text = e.unescape().unwrap_or_default().to_string();

                if in_object && in_bndbox {
                    match current_element.as_str() {
                        "xmin" => xmin = text.parse().unwrap_or(0),
                        "ymin" => ymin = text.parse().unwrap_or(0),
                        "xmax" => xmax = text.parse().unwrap_or(0),
                        "ymax" => ymax = text.parse().unwrap_or(0),
                        _ => {}
                    }
                } else if in_object && current_element == "name" {
                    obj_name = text;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(FormatError::Xml(e));
            }
            _ => {}
        }
    }

    log::info!("Loaded {} Pascal VOC annotations from {:?}", boxes.len(), path);
    Ok(boxes)
}

#[allow(clippy::too_many_arguments)]
fn build_xml(
    folder: &str,
    filename: &str,
    image_path: &Path,
    boxes: &[BoxAnnotation],
    catalog: &ClassCatalog,
    display: Size,
    original: Size,
) -> Result<String, FormatError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    // <annotation>
    writer
        .write_event(Event::Start(BytesStart::new("annotation")))
        .map_err(|e| FormatError::Xml(e.into()))?;

    write_text_element(&mut writer, "folder", folder)?;
    write_text_element(&mut writer, "filename", filename)?;
    write_text_element(&mut writer, "path", &image_path.to_string_lossy())?;

    // <source>
    writer
        .write_event(Event::Start(BytesStart::new("source")))
        .map_err(|e| FormatError::Xml(e.into()))?;
    write_text_element(&mut writer, "database", "Unknown")?;
    writer
        .write_event(Event::End(BytesEnd::new("source")))
        .map_err(|e| FormatError::Xml(e.into()))?;

    // <size> holds the ORIGINAL image resolution.
    writer
        .write_event(Event::Start(BytesStart::new("size")))
        .map_err(|e| FormatError::Xml(e.into()))?;
    write_text_element(&mut writer, "width", &(original.width as u32).to_string())?;
    write_text_element(&mut writer, "height", &(original.height as u32).to_string())?;
    write_text_element(&mut writer, "depth", "3")?;
    writer
        .write_event(Event::End(BytesEnd::new("size")))
        .map_err(|e| FormatError::Xml(e.into()))?;

    write_text_element(&mut writer, "segmented", "0")?;

    for b in boxes {
        let Some(label) = b.label.as_deref() else {
            log::warn!("Skipping unlabeled box in Pascal VOC export");
            continue;
        };
        if !catalog.contains(label) {
            log::warn!("Class '{}' is not in the catalog, skipping box", label);
            continue;
        }

        let (xmin, ymin, xmax, ymax) = original_bounds(&b.rect, display, original);

        writer
            .write_event(Event::Start(BytesStart::new("object")))
            .map_err(|e| FormatError::Xml(e.into()))?;

        write_text_element(&mut writer, "name", label)?;
        write_text_element(&mut writer, "pose", "Unspecified")?;
        write_text_element(&mut writer, "truncated", "0")?;
        write_text_element(&mut writer, "difficult", "0")?;

        writer
            .write_event(Event::Start(BytesStart::new("bndbox")))
            .map_err(|e| FormatError::Xml(e.into()))?;
        write_text_element(&mut writer, "xmin", &xmin.to_string())?;
        write_text_element(&mut writer, "ymin", &ymin.to_string())?;
        write_text_element(&mut writer, "xmax", &xmax.to_string())?;
        write_text_element(&mut writer, "ymax", &ymax.to_string())?;
        writer
            .write_event(Event::End(BytesEnd::new("bndbox")))
            .map_err(|e| FormatError::Xml(e.into()))?;

        writer
            .write_event(Event::End(BytesEnd::new("object")))
            .map_err(|e| FormatError::Xml(e.into()))?;
    }

    // </annotation>
    writer
        .write_event(Event::End(BytesEnd::new("annotation")))
        .map_err(|e| FormatError::Xml(e.into()))?;

    let result = writer.into_inner();
    String::from_utf8(result).map_err(|_| FormatError::invalid_format("Invalid UTF-8 in XML"))
}

/// Original-space integer corner coordinates, clamped to be non-negative.
fn original_bounds(rect: &Rect, display: Size, original: Size) -> (i64, i64, i64, i64) {
    let top_left = transform::to_original(rect.top_left(), display, original);
    let bottom_right = transform::to_original(rect.bottom_right(), display, original);

    (
        (top_left.x as i64).max(0),
        (top_left.y as i64).max(0),
        (bottom_right.x as i64).max(0),
        (bottom_right.y as i64).max(0),
    )
}

/// Write a simple text element.
fn write_text_element<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    value: &str,
) -> Result<(), FormatError> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(|e| FormatError::Xml(e.into()))?;
    writer
        .write_event(Event::Text(BytesText::new(value)))
        .map_err(|e| FormatError::Xml(e.into()))?;
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(|e| FormatError::Xml(e.into()))?;
    Ok(())
}
