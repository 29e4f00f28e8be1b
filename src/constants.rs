//! Global constants for the annotation engine.

/// Minimum width/height a box may have after a corner resize (display units).
pub const MIN_BOX_SIZE: f32 = 20.0;

/// Hit radius for grabbing a box corner (display units).
pub const CORNER_HIT_TOLERANCE: f32 = 10.0;

/// Release gestures whose rectangle area is below this threshold are treated
/// as clicks (seed-point placement), not box creation (square display units).
pub const CLICK_AREA_THRESHOLD: f32 = 10.0;

/// Arrow-key nudge distance for a selected item (display units).
pub const NUDGE_STEP: f32 = 1.0;

/// Class names written to `classes.txt` when no catalog file exists.
pub const DEFAULT_CLASSES: &[&str] = &["dog", "person", "cat", "tv", "car"];

/// Image file extensions the session will pick up from a directory.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp"];

/// File name of the shared COCO annotation document.
pub const COCO_FILE_NAME: &str = "annotations.json";

/// Hit radius for selecting a seed point (display units).
pub const SEED_HIT_RADIUS: f32 = 10.0;
