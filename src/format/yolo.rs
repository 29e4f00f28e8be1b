//! YOLO TXT codec.
//!
//! One text file per image; each line is
//! `class_index center_x center_y width height` with all four geometry
//! fields normalized to `[0, 1]` against the display size and written with
//! six-decimal fixed precision.

use std::path::Path;

use crate::geometry::{Point, Rect, Size};
use crate::model::{BoxAnnotation, ClassCatalog};

use super::FormatError;

/// Serialize boxes to a YOLO annotation file.
///
/// Boxes whose class label is missing or not in the catalog are skipped
/// with a warning.
pub fn save(
    path: &Path,
    boxes: &[BoxAnnotation],
    catalog: &ClassCatalog,
    display: Size,
) -> Result<(), FormatError> {
    let mut lines = Vec::new();

    for b in boxes {
        let Some(label) = b.label.as_deref() else {
            log::warn!("Skipping unlabeled box in YOLO export");
            continue;
        };
        let Some(class_idx) = catalog.index_of(label) else {
            log::warn!("Class '{}' is not in the catalog, skipping box", label);
            continue;
        };

        let (cx, cy, w, h) = rect_to_yolo(&b.rect, display);
        lines.push(format!("{} {:.6} {:.6} {:.6} {:.6}", class_idx, cx, cy, w, h));
    }

    let mut contents = lines.join("\n");
    if !contents.is_empty() {
        contents.push('\n');
    }
    std::fs::write(path, contents)?;

    log::info!("Saved {} YOLO annotations to {:?}", lines.len(), path);
    Ok(())
}

/// Parse a YOLO annotation file into display-space boxes.
///
/// A class index outside the catalog is logged as an inconsistency and
/// parsing stops, returning the boxes parsed so far. Malformed lines are
/// skipped.
pub fn load(
    path: &Path,
    catalog: &ClassCatalog,
    display: Size,
) -> Result<Vec<BoxAnnotation>, FormatError> {
    let contents = std::fs::read_to_string(path)?;
    let mut boxes = Vec::new();

    for line in contents.lines() {
        let Some((class_idx, cx, cy, w, h)) = parse_line(line) else {
            continue;
        };

        let Some(name) = catalog.name_at(class_idx) else {
            log::warn!(
                "The categories of {:?} and the class catalog are inconsistent",
                path
            );
            return Ok(boxes);
        };

        boxes.push(BoxAnnotation::new(
            yolo_to_rect(cx, cy, w, h, display),
            Some(name.to_string()),
        ));
    }

    log::info!("Loaded {} YOLO annotations from {:?}", boxes.len(), path);
    Ok(boxes)
}

/// Convert a display-space rectangle to normalized YOLO center/size fields.
fn rect_to_yolo(rect: &Rect, display: Size) -> (f32, f32, f32, f32) {
    let cx = (rect.left + rect.right) / 2.0 / display.width;
    let cy = (rect.top + rect.bottom) / 2.0 / display.height;
    let w = rect.width() / display.width;
    let h = rect.height() / display.height;
    (cx, cy, w, h)
}

/// Convert normalized YOLO center/size fields to a display-space rectangle.
fn yolo_to_rect(cx: f32, cy: f32, w: f32, h: f32, display: Size) -> Rect {
    Rect::from_corners(
        Point::new((cx - w / 2.0) * display.width, (cy - h / 2.0) * display.height),
        Point::new((cx + w / 2.0) * display.width, (cy + h / 2.0) * display.height),
    )
}

/// Split one annotation line; `None` for blank or malformed lines.
fn parse_line(line: &str) -> Option<(usize, f32, f32, f32, f32)> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() != 5 {
        return None;
    }

    let class_idx = parts[0].parse().ok()?;
    let cx = parts[1].parse().ok()?;
    let cy = parts[2].parse().ok()?;
    let w = parts[3].parse().ok()?;
    let h = parts[4].parse().ok()?;
    Some((class_idx, cx, cy, w, h))
}
