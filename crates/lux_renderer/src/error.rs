//! Error types for scene building, rendering and image output.

use thiserror::Error;

/// Errors raised before the first pixel is produced, or while writing output.
///
/// Numeric faults inside a single Monte Carlo sample are not errors: the
/// sample is zeroed and counted in [`crate::RenderStats`].
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Invalid camera configuration: {0}")]
    InvalidCamera(String),

    #[error("Cannot build a BVH over an empty object list")]
    EmptyScene,

    #[error("Primitive {index} has no finite bounding box")]
    UnboundedPrimitive { index: usize },

    #[error("Scene error: {0}")]
    Scene(#[from] lux_core::SceneError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
}

pub type RenderResult<T> = Result<T, RenderError>;
