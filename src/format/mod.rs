//! Annotation persistence: YOLO, Pascal VOC, and COCO codecs.
//!
//! Each codec is an independent (parse, serialize) pair. All space
//! conversion goes through [`crate::geometry::transform`]; the formats
//! differ only in which space they persist (YOLO: display-normalized
//! floats; Pascal VOC and COCO: original-image integer pixels) and in
//! their file granularity (per-image file vs one shared document).

pub mod coco;
mod error;
pub mod pascal_voc;
pub mod yolo;

#[cfg(test)]
mod tests;

pub use coco::CocoAccumulator;
pub use error::FormatError;

use std::path::{Path, PathBuf};

use crate::constants::COCO_FILE_NAME;
use crate::geometry::Size;
use crate::model::{BoxAnnotation, ClassCatalog};

/// Persisted annotation formats, in the cycle order of the format toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveFormat {
    #[default]
    Yolo,
    PascalVoc,
    Coco,
}

impl SaveFormat {
    /// Display name of this format.
    pub fn name(&self) -> &'static str {
        match self {
            SaveFormat::Yolo => "YOLO",
            SaveFormat::PascalVoc => "PascalVOC",
            SaveFormat::Coco => "COCO",
        }
    }

    /// Next format in the toggle cycle.
    pub fn next(self) -> Self {
        match self {
            SaveFormat::Yolo => SaveFormat::PascalVoc,
            SaveFormat::PascalVoc => SaveFormat::Coco,
            SaveFormat::Coco => SaveFormat::Yolo,
        }
    }

    /// Default save target next to the source image: a sibling `.txt` or
    /// `.xml`, or the directory's shared `annotations.json` for COCO.
    pub fn default_save_path(&self, image_path: &Path) -> PathBuf {
        match self {
            SaveFormat::Yolo => image_path.with_extension("txt"),
            SaveFormat::PascalVoc => image_path.with_extension("xml"),
            SaveFormat::Coco => image_path
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join(COCO_FILE_NAME),
        }
    }
}

/// Load prior annotations for an image by probing for known files.
///
/// Detection priority: sibling `.txt` (YOLO), then sibling `.xml`
/// (Pascal VOC), then the directory's shared `annotations.json` (COCO).
/// If none exists the image has no prior annotations and an empty list is
/// returned; absence is a normal state, not an error.
pub fn load_existing(
    image_path: &Path,
    catalog: &ClassCatalog,
    display: Size,
    original: Size,
) -> Result<Vec<BoxAnnotation>, FormatError> {
    let txt = image_path.with_extension("txt");
    if txt.exists() {
        return yolo::load(&txt, catalog, display);
    }

    let xml = image_path.with_extension("xml");
    if xml.exists() {
        return pascal_voc::load(&xml, display, original);
    }

    let json = image_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(COCO_FILE_NAME);
    if json.exists() {
        let file_name = image_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        return coco::load(&json, file_name, catalog, display, original);
    }

    log::debug!("No annotation file found for {:?}", image_path);
    Ok(Vec::new())
}
