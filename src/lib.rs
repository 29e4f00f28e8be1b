//! AutoLabel annotation core.
//!
//! The geometry and persistence engine of an image-labeling tool: box and
//! seed-point editing with parent-bound clamping, display/original
//! coordinate transforms, predictor-seeded box generation, and YOLO /
//! Pascal VOC / COCO codecs. The windowing shell and the segmentation
//! model itself live outside this crate; the model is reached through the
//! [`session::RegionPredictor`] trait.

pub mod constants;
pub mod format;
pub mod geometry;
pub mod model;
pub mod session;

pub use session::Session;
