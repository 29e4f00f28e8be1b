//! Annotation entity types.

use crate::geometry::{Point, Rect, clamp_point};

/// An axis-aligned box annotation in display space.
///
/// The rectangle's corners stay normalized and inside the owning image's
/// displayed bounds; every interactive edit clamps rather than rejects.
/// The class label is `None` until the user (or a prediction accept flow)
/// assigns one; unlabeled boxes are skipped by the codecs on save.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxAnnotation {
    pub rect: Rect,
    pub label: Option<String>,
}

impl BoxAnnotation {
    /// Create a box with an optional class label.
    pub fn new(rect: Rect, label: Option<String>) -> Self {
        Self { rect, label }
    }

    /// Create an unlabeled box.
    pub fn unlabeled(rect: Rect) -> Self {
        Self { rect, label: None }
    }
}

/// Foreground/background hint for the region predictor.
///
/// The list display keeps the UI color convention: positive seeds show as
/// "green", negative ones as "red".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedLabel {
    Positive,
    Negative,
}

impl SeedLabel {
    /// Predictor index: negative maps to 0, positive to 1.
    pub fn index(self) -> u8 {
        match self {
            SeedLabel::Negative => 0,
            SeedLabel::Positive => 1,
        }
    }

    /// Display name in the annotation list.
    pub fn display_name(self) -> &'static str {
        match self {
            SeedLabel::Positive => "green",
            SeedLabel::Negative => "red",
        }
    }
}

/// A single prediction-seed point in display space.
///
/// Seeds are single-use: issuing a prediction request consumes every seed
/// collected for it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeedPoint {
    pub position: Point,
    pub label: SeedLabel,
}

impl SeedPoint {
    /// Place a seed at `point`, clamped into `parent` if necessary.
    pub fn create_at(point: Point, label: SeedLabel, parent: &Rect) -> Self {
        Self {
            position: clamp_point(point, parent),
            label,
        }
    }
}

/// Any annotation entity owned by the set for one image.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationItem {
    Box(BoxAnnotation),
    Seed(SeedPoint),
}

impl AnnotationItem {
    /// The text shown in the mirrored list entry for this item.
    pub fn list_text(&self) -> String {
        match self {
            AnnotationItem::Box(b) => b.label.clone().unwrap_or_else(|| "unlabeled".to_string()),
            AnnotationItem::Seed(s) => s.label.display_name().to_string(),
        }
    }

    pub fn as_box(&self) -> Option<&BoxAnnotation> {
        match self {
            AnnotationItem::Box(b) => Some(b),
            AnnotationItem::Seed(_) => None,
        }
    }

    pub fn as_seed(&self) -> Option<&SeedPoint> {
        match self {
            AnnotationItem::Seed(s) => Some(s),
            AnnotationItem::Box(_) => None,
        }
    }
}
