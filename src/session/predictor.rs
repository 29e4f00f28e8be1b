//! External region-predictor seam.

use std::path::Path;

use thiserror::Error;

/// Bounding box returned by the predictor, in original-image pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictedBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Errors surfaced by a predictor implementation.
#[derive(Error, Debug)]
pub enum PredictorError {
    /// IO error while reading the image
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Model-side failure
    #[error("prediction failed: {0}")]
    Failed(String),
}

/// A region predictor seeded with labeled points.
///
/// Implementations load the image themselves, run whatever segmentation
/// model they wrap, and return the bounding box of the predicted region in
/// the image's native resolution. The session never inspects masks, only
/// the final box. Calls are synchronous and may block.
///
/// `points` are original-space coordinates; `labels` holds 1 for a
/// foreground hint and 0 for a background hint, index-aligned with
/// `points`.
pub trait RegionPredictor {
    fn predict_box(
        &mut self,
        image_path: &Path,
        points: &[(f32, f32)],
        labels: &[u8],
    ) -> Result<PredictedBox, PredictorError>;
}
