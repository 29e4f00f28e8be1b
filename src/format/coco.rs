//! COCO JSON codec and the shared-document accumulator.
//!
//! COCO uses a single `annotations.json` shared by every image in a
//! directory. The accumulator is owned by the session and passed
//! explicitly; each save merges the current image's boxes into it and
//! rewrites the whole document, so repeated saves replace that image's
//! annotations instead of appending duplicates.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::geometry::transform;
use crate::geometry::{Rect, Size};
use crate::model::{BoxAnnotation, ClassCatalog};

use super::FormatError;

/// The shared COCO document accumulated across a directory's images.
///
/// Image ids are positional: the index of the file name in first-seen
/// order, which the `images` list itself records. Annotation ids are
/// reassigned densely (`0..n-1`) after every merge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CocoAccumulator {
    #[serde(default)]
    pub images: Vec<CocoImage>,
    #[serde(default)]
    pub annotations: Vec<CocoAnnotation>,
    #[serde(default)]
    pub categories: Vec<CocoCategory>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CocoImage {
    pub id: usize,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CocoAnnotation {
    #[serde(default)]
    pub iscrowd: u8,
    #[serde(default)]
    pub ignore: u8,
    pub image_id: usize,
    /// `[x, y, width, height]` in original-image pixels, truncated to
    /// integers and clamped non-negative at merge time.
    pub bbox: [f32; 4],
    #[serde(default)]
    pub area: f32,
    #[serde(default)]
    pub segmentation: Vec<Vec<f32>>,
    pub category_id: usize,
    pub id: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CocoCategory {
    pub supercategory: String,
    pub id: usize,
    pub name: String,
}

impl CocoAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a shared document from disk.
    pub fn read(path: &Path) -> Result<Self, FormatError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Write the accumulated document as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), FormatError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!(
            "Saved COCO document with {} images and {} annotations to {:?}",
            self.images.len(),
            self.annotations.len(),
            path
        );
        Ok(())
    }

    /// Id for a file name, registering it in first-seen order if new.
    fn image_id(&mut self, file_name: &str, original: Size) -> usize {
        if let Some(img) = self.images.iter().find(|i| i.file_name == file_name) {
            return img.id;
        }
        let id = self.images.len();
        self.images.push(CocoImage {
            id,
            file_name: file_name.to_string(),
            width: original.width as u32,
            height: original.height as u32,
        });
        id
    }

    /// Replace one image's annotations from its current box list.
    ///
    /// Annotations belonging to other images are kept untouched; this
    /// image's are recomputed from scratch. After the merge every
    /// annotation id is reassigned by final list position, and the
    /// categories list is rebuilt from the catalog.
    pub fn merge_image(
        &mut self,
        file_name: &str,
        boxes: &[BoxAnnotation],
        catalog: &ClassCatalog,
        display: Size,
        original: Size,
    ) {
        let image_id = self.image_id(file_name, original);

        let mut merged: Vec<CocoAnnotation> = self
            .annotations
            .iter()
            .filter(|a| a.image_id != image_id)
            .cloned()
            .collect();

        for b in boxes {
            let Some(label) = b.label.as_deref() else {
                log::warn!("Skipping unlabeled box in COCO export");
                continue;
            };
            let Some(category_id) = catalog.index_of(label) else {
                log::warn!("Class '{}' is not in the catalog, skipping box", label);
                continue;
            };

            let top_left = transform::to_original(b.rect.top_left(), display, original);
            let bottom_right = transform::to_original(b.rect.bottom_right(), display, original);
            let x1 = (top_left.x as i64).max(0) as f32;
            let y1 = (top_left.y as i64).max(0) as f32;
            let x2 = (bottom_right.x as i64).max(0) as f32;
            let y2 = (bottom_right.y as i64).max(0) as f32;
            let w = x2 - x1;
            let h = y2 - y1;

            merged.push(CocoAnnotation {
                iscrowd: 0,
                ignore: 0,
                image_id,
                bbox: [x1, y1, w, h],
                area: w * h,
                segmentation: Vec::new(),
                category_id,
                id: 0,
            });
        }

        for (idx, annotation) in merged.iter_mut().enumerate() {
            annotation.id = idx;
        }
        self.annotations = merged;

        self.categories = catalog
            .iter()
            .enumerate()
            .map(|(id, name)| CocoCategory {
                supercategory: "none".to_string(),
                id,
                name: name.to_string(),
            })
            .collect();
    }

    /// Display-space boxes for one image of this document.
    ///
    /// An unknown `category_id` is logged as an inconsistency and scanning
    /// stops, returning the boxes collected so far. An unknown file name
    /// simply yields no boxes.
    pub fn boxes_for(
        &self,
        file_name: &str,
        catalog: &ClassCatalog,
        display: Size,
        original: Size,
    ) -> Vec<BoxAnnotation> {
        let Some(image_id) = self
            .images
            .iter()
            .find(|i| i.file_name == file_name)
            .map(|i| i.id)
        else {
            return Vec::new();
        };

        let mut boxes = Vec::new();
        for annotation in &self.annotations {
            if annotation.image_id != image_id {
                continue;
            }

            let Some(name) = catalog.name_at(annotation.category_id) else {
                log::warn!(
                    "COCO category id {} has no class catalog entry; keeping partial result",
                    annotation.category_id
                );
                return boxes;
            };

            let [x, y, w, h] = annotation.bbox;
            let (x, y, w, h) = (x.trunc(), y.trunc(), w.trunc(), h.trunc());
            let top_left = transform::to_display(x, y, display, original);
            let bottom_right = transform::to_display(x + w, y + h, display, original);

            boxes.push(BoxAnnotation::new(
                Rect::from_corners(top_left, bottom_right),
                Some(name.to_string()),
            ));
        }

        boxes
    }
}

/// Parse boxes for one image out of a shared document on disk.
pub fn load(
    path: &Path,
    file_name: &str,
    catalog: &ClassCatalog,
    display: Size,
    original: Size,
) -> Result<Vec<BoxAnnotation>, FormatError> {
    let document = CocoAccumulator::read(path)?;
    let boxes = document.boxes_for(file_name, catalog, display, original);
    log::info!(
        "Loaded {} COCO annotations for '{}' from {:?}",
        boxes.len(),
        file_name,
        path
    );
    Ok(boxes)
}
