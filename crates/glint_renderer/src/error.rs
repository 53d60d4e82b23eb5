//! Error types for scene construction, texture loading and rendering.
//!
//! Rendering itself has no error paths once started; everything here is
//! raised while a scene is being assembled or a render is being set up.

use thiserror::Error;

/// Malformed scene data. Fatal: the scene must not be rendered.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("Primitive {index} has no finite bounding box; it cannot be placed in a BVH")]
    MissingBoundingBox { index: usize },

    #[error("Image texture has {actual} pixels but its dimensions require {expected}")]
    ImageSizeMismatch { expected: usize, actual: usize },

    #[error("Image texture must be at least 1x1")]
    EmptyImage,
}

/// Errors surfaced by the image-decoding collaborator.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decoding error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Errors raised before any pixel is traced.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Invalid render configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Scene(#[from] SceneError),
}

pub type SceneResult<T> = Result<T, SceneError>;
pub type TextureResult<T> = Result<T, TextureError>;
pub type RenderResult<T> = Result<T, RenderError>;
