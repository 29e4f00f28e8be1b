//! Unit tests for the annotation format codecs.
//!
//! These tests verify serialization, deserialization, auto-detection, and
//! round-trip conversions for each persisted format.

mod pascal_voc_tests;
mod yolo_tests;

use crate::geometry::{Rect, Size};
use crate::model::{BoxAnnotation, ClassCatalog};

/// The default catalog used across the codec tests.
pub(crate) fn catalog() -> ClassCatalog {
    ClassCatalog::from_names(["dog", "person", "cat", "tv", "car"])
}

/// Image displayed at 800x600 from a 1600x1200 original (scale 2 per axis).
pub(crate) const DISPLAY: Size = Size {
    width: 800.0,
    height: 600.0,
};
pub(crate) const ORIGINAL: Size = Size {
    width: 1600.0,
    height: 1200.0,
};

/// A labeled display-space box centered in the test image.
pub(crate) fn dog_box() -> BoxAnnotation {
    BoxAnnotation::new(Rect::new(300.0, 225.0, 500.0, 375.0), Some("dog".into()))
}
