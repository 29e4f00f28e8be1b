//! Annotation session state and orchestration.
//!
//! A [`Session`] owns everything tied to the working set of images: the
//! current image, its annotation set and mirrored list, the dirty flag,
//! the selected save format, the class catalog, and the shared COCO
//! accumulator. All mutation is single-threaded and synchronous; the
//! external predictor blocks the caller for the duration of a request.

mod annotation_set;
mod editor;
mod predictor;

pub use annotation_set::{AnnotationSet, ItemId, ListEntry};
pub use editor::{Editor, EditorOutcome, EditorState, PointerButton, PointerEvent};
pub use predictor::{PredictedBox, PredictorError, RegionPredictor};

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::constants::{IMAGE_EXTENSIONS, NUDGE_STEP};
use crate::format::{self, CocoAccumulator, FormatError, SaveFormat};
use crate::geometry::transform;
use crate::geometry::{Point, Rect, Size, clamp_point};
use crate::model::{AnnotationItem, BoxAnnotation, ClassCatalog};

/// Errors surfaced by session operations.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Navigation or open refused while edits are pending
    #[error("unsaved changes pending; save or discard them first")]
    UnsavedChanges,

    /// An operation that needs a current image was called without one
    #[error("no image loaded")]
    NoImage,

    /// Image index outside the working set
    #[error("image index {0} out of range")]
    IndexOutOfRange(usize),

    /// I/O error outside the codecs (directory listing etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to read an image header for its dimensions
    #[error("failed to read image {path:?}: {source}")]
    ImageRead {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Predictor(#[from] PredictorError),
}

/// One image known to the session: its path and native resolution.
#[derive(Debug, Clone)]
pub struct ImageRecord {
    pub path: PathBuf,
    pub original: Size,
}

impl ImageRecord {
    pub fn new(path: impl Into<PathBuf>, original: Size) -> Self {
        Self {
            path: path.into(),
            original,
        }
    }

    /// Probe an image file's dimensions without decoding it.
    pub fn probe(path: PathBuf) -> Result<Self, SessionError> {
        let (width, height) =
            image::image_dimensions(&path).map_err(|source| SessionError::ImageRead {
                path: path.clone(),
                source,
            })?;
        Ok(Self {
            path,
            original: Size::new(width as f32, height as f32),
        })
    }
}

/// The annotation session for a working set of images.
pub struct Session {
    images: Vec<ImageRecord>,
    current: usize,
    viewport: Size,
    annotations: AnnotationSet,
    editor: Editor,
    selected: Option<ItemId>,
    catalog: ClassCatalog,
    save_format: SaveFormat,
    modified: bool,
    coco: CocoAccumulator,
}

impl Session {
    /// Create an empty session rendering into the given viewport.
    ///
    /// The viewport is fixed for the session's lifetime; display-space
    /// coordinates are only meaningful against a stable display size.
    pub fn new(catalog: ClassCatalog, viewport: Size) -> Self {
        Self {
            images: Vec::new(),
            current: 0,
            viewport,
            annotations: AnnotationSet::new(),
            editor: Editor::new(),
            selected: None,
            catalog,
            save_format: SaveFormat::default(),
            modified: false,
            coco: CocoAccumulator::new(),
        }
    }

    /// Create a session over images whose dimensions are already known,
    /// loading any existing annotations for the first one.
    pub fn with_images(
        catalog: ClassCatalog,
        viewport: Size,
        images: Vec<ImageRecord>,
    ) -> Result<Self, SessionError> {
        let mut session = Self::new(catalog, viewport);
        if !images.is_empty() {
            session.images = images;
            session.load_annotations()?;
        }
        Ok(session)
    }

    /// Open a single image file as the working set.
    pub fn open_file(&mut self, path: PathBuf) -> Result<(), SessionError> {
        if self.modified {
            return Err(SessionError::UnsavedChanges);
        }
        let record = ImageRecord::probe(path)?;
        self.replace_images(vec![record])
    }

    /// Open every supported image in a directory, sorted by path.
    ///
    /// Returns the number of images found; an empty directory leaves the
    /// session untouched.
    pub fn open_dir(&mut self, dir: &Path) -> Result<usize, SessionError> {
        if self.modified {
            return Err(SessionError::UnsavedChanges);
        }

        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| {
                        IMAGE_EXTENSIONS
                            .iter()
                            .any(|known| ext.eq_ignore_ascii_case(known))
                    })
            })
            .collect();
        paths.sort();

        if paths.is_empty() {
            log::warn!("No images found in {:?}", dir);
            return Ok(0);
        }

        let records = paths
            .into_iter()
            .map(ImageRecord::probe)
            .collect::<Result<Vec<_>, _>>()?;
        let count = records.len();
        self.replace_images(records)?;
        Ok(count)
    }

    fn replace_images(&mut self, images: Vec<ImageRecord>) -> Result<(), SessionError> {
        self.images = images;
        self.current = 0;
        self.selected = None;
        self.editor = Editor::new();
        self.load_annotations()
    }

    pub fn images(&self) -> &[ImageRecord] {
        &self.images
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_image(&self) -> Option<&ImageRecord> {
        self.images.get(self.current)
    }

    /// Size at which the current image is displayed.
    pub fn display_size(&self) -> Option<Size> {
        self.current_image()
            .map(|r| transform::fit_display_size(r.original, self.viewport))
    }

    /// Displayed rectangle of the current image; the parent bounds for all
    /// interactive edits.
    pub fn display_bounds(&self) -> Option<Rect> {
        self.display_size()
            .map(|s| Rect::new(0.0, 0.0, s.width, s.height))
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn annotations(&self) -> &AnnotationSet {
        &self.annotations
    }

    pub fn catalog(&self) -> &ClassCatalog {
        &self.catalog
    }

    pub fn save_format(&self) -> SaveFormat {
        self.save_format
    }

    pub fn selected(&self) -> Option<ItemId> {
        self.selected
    }

    pub fn editor_state(&self) -> EditorState {
        self.editor.state()
    }

    pub fn coco(&self) -> &CocoAccumulator {
        &self.coco
    }

    pub fn set_save_format(&mut self, format: SaveFormat) {
        self.save_format = format;
    }

    /// Advance the save-format toggle (YOLO → PascalVOC → COCO → …).
    pub fn cycle_save_format(&mut self) -> SaveFormat {
        self.save_format = self.save_format.next();
        self.save_format
    }

    /// Switch to the next image; a no-op at the end of the list.
    pub fn next_image(&mut self) -> Result<(), SessionError> {
        if self.current + 1 < self.images.len() {
            self.switch_image(self.current + 1)
        } else {
            Ok(())
        }
    }

    /// Switch to the previous image; a no-op at the start of the list.
    pub fn prev_image(&mut self) -> Result<(), SessionError> {
        if self.current > 0 {
            self.switch_image(self.current - 1)
        } else {
            Ok(())
        }
    }

    /// Switch to an image by index.
    ///
    /// Refused with [`SessionError::UnsavedChanges`] while edits are
    /// pending; the caller confirms with the user, calls
    /// [`discard_changes`](Self::discard_changes), and retries.
    pub fn switch_image(&mut self, index: usize) -> Result<(), SessionError> {
        if self.modified {
            return Err(SessionError::UnsavedChanges);
        }
        if index >= self.images.len() {
            return Err(SessionError::IndexOutOfRange(index));
        }

        self.current = index;
        self.selected = None;
        self.editor = Editor::new();
        self.load_annotations()
    }

    /// Drop pending edits unconditionally, clearing the dirty flag.
    pub fn discard_changes(&mut self) {
        self.modified = false;
    }

    /// Reload the current image's annotations by file auto-detection.
    fn load_annotations(&mut self) -> Result<(), SessionError> {
        self.annotations.clear();

        let Some(record) = self.images.get(self.current) else {
            return Ok(());
        };
        let display = transform::fit_display_size(record.original, self.viewport);
        let boxes = format::load_existing(&record.path, &self.catalog, display, record.original)?;

        for annotation in boxes {
            self.annotations.insert_box(annotation);
        }
        Ok(())
    }

    /// Feed a pointer event through the editor FSM, tracking dirty state
    /// and selection.
    ///
    /// [`EditorOutcome::BoxDrawn`] is passed back to the caller so it can
    /// run class selection and then [`commit_box`](Self::commit_box).
    /// With no image loaded, input is ignored.
    pub fn pointer_event(&mut self, event: PointerEvent) -> Option<EditorOutcome> {
        let bounds = self.display_bounds()?;
        let outcome = self.editor.handle(event, &mut self.annotations, bounds);

        match outcome {
            Some(EditorOutcome::SeedPlaced(_)) => self.modified = true,
            Some(EditorOutcome::Moved(_)) | Some(EditorOutcome::Resized(_)) => {
                self.modified = true;
            }
            Some(EditorOutcome::Selected(id)) => self.selected = Some(id),
            Some(EditorOutcome::SelectionCleared) => self.selected = None,
            Some(EditorOutcome::BoxDrawn(_)) | None => {}
        }
        outcome
    }

    /// Commit a drawn or predicted box to the set.
    pub fn commit_box(&mut self, rect: Rect, label: Option<String>) -> ItemId {
        self.modified = true;
        let id = self.annotations.insert_box(BoxAnnotation::new(rect, label));
        self.selected = Some(id);
        id
    }

    /// Delete an item (and its mirrored list entry).
    pub fn delete(&mut self, id: ItemId) -> bool {
        let removed = self.annotations.remove(id).is_some();
        if removed {
            self.modified = true;
            if self.selected == Some(id) {
                self.selected = None;
            }
        }
        removed
    }

    /// Delete whatever is currently selected.
    pub fn delete_selected(&mut self) -> bool {
        match self.selected {
            Some(id) => self.delete(id),
            None => false,
        }
    }

    /// Assign a class label to a box.
    pub fn set_class(&mut self, id: ItemId, name: &str) -> bool {
        let updated = self.annotations.set_class(id, name);
        if updated {
            self.modified = true;
        }
        updated
    }

    /// Nudge the selected item by whole steps of [`NUDGE_STEP`], clamped to
    /// the image like any other move.
    pub fn nudge_selected(&mut self, dx_steps: i32, dy_steps: i32) -> bool {
        let Some(bounds) = self.display_bounds() else {
            return false;
        };
        let Some(id) = self.selected else {
            return false;
        };
        let dx = dx_steps as f32 * NUDGE_STEP;
        let dy = dy_steps as f32 * NUDGE_STEP;

        let box_rect = self
            .annotations
            .get(id)
            .and_then(AnnotationItem::as_box)
            .map(|b| b.rect);
        let seed_pos = self
            .annotations
            .get(id)
            .and_then(AnnotationItem::as_seed)
            .map(|s| s.position);
        let moved = if let Some(rect) = box_rect {
            self.annotations
                .set_box_rect(id, rect.translate(dx, dy, &bounds))
        } else if let Some(position) = seed_pos {
            let p = clamp_point(Point::new(position.x + dx, position.y + dy), &bounds);
            self.annotations.set_seed_position(id, p)
        } else {
            false
        };
        if moved {
            self.modified = true;
        }
        moved
    }

    /// Run a prediction request from the pending seed points.
    ///
    /// All seeds are collected and consumed; with none pending this is a
    /// no-op returning `Ok(None)`. Otherwise the predictor is called with
    /// original-space points and labels, and its box is placed in display
    /// space as a new unlabeled annotation.
    pub fn predict(
        &mut self,
        predictor: &mut dyn RegionPredictor,
    ) -> Result<Option<ItemId>, SessionError> {
        let record = self.current_image().ok_or(SessionError::NoImage)?;
        let image_path = record.path.clone();
        let original = record.original;
        let display = transform::fit_display_size(original, self.viewport);

        let (labels, points) = self.annotations.collect_and_consume(display, original);
        if labels.is_empty() {
            return Ok(None);
        }
        self.modified = true;

        let predicted = predictor.predict_box(&image_path, &points, &labels)?;

        let top_left = transform::to_display(predicted.x, predicted.y, display, original);
        let bottom_right = transform::to_display(
            predicted.x + predicted.width,
            predicted.y + predicted.height,
            display,
            original,
        );
        let id = self
            .annotations
            .insert_box(BoxAnnotation::unlabeled(Rect::from_corners(
                top_left,
                bottom_right,
            )));
        self.selected = Some(id);
        Ok(Some(id))
    }

    /// Persist the current image's annotations in the selected format.
    ///
    /// `target` overrides the default save path (sibling `.txt`/`.xml`, or
    /// the directory's `annotations.json` for COCO). On success the dirty
    /// flag clears and the written path is returned.
    pub fn save(&mut self, target: Option<&Path>) -> Result<PathBuf, SessionError> {
        let record = self.current_image().ok_or(SessionError::NoImage)?;
        let image_path = record.path.clone();
        let original = record.original;
        let display = transform::fit_display_size(original, self.viewport);

        let path = target
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.save_format.default_save_path(&image_path));
        let boxes: Vec<BoxAnnotation> = self.annotations.boxes().cloned().collect();

        match self.save_format {
            SaveFormat::Yolo => format::yolo::save(&path, &boxes, &self.catalog, display)?,
            SaveFormat::PascalVoc => format::pascal_voc::save(
                &path,
                &image_path,
                &boxes,
                &self.catalog,
                display,
                original,
            )?,
            SaveFormat::Coco => {
                let file_name = image_path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or_default()
                    .to_string();
                self.coco
                    .merge_image(&file_name, &boxes, &self.catalog, display, original);
                self.coco.save(&path)?;
            }
        }

        self.modified = false;
        Ok(path)
    }
}
