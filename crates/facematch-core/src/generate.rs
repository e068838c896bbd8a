//! Image → embedding.

use crate::backend::{BackendError, FaceBackend};
use crate::types::Embedding;
use image::{ImageReader, RgbImage};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("Image file not found")]
    FileNotFound(PathBuf),
    #[error("No face detected in the image")]
    NoFaceDetected,
    #[error("Could not generate face encoding")]
    EncodingFailed,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl GenerateError {
    /// Stable taxonomy name, for logs.
    pub fn code(&self) -> &'static str {
        match self {
            GenerateError::FileNotFound(_) => "file_not_found",
            GenerateError::NoFaceDetected => "no_face_detected",
            GenerateError::EncodingFailed => "encoding_failed",
            GenerateError::Io(_) => "io",
            GenerateError::Image(_) => "image_decode",
            GenerateError::Backend(_) => "backend",
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeneratedEmbedding {
    pub embedding: Embedding,
    /// Number of faces detected; only the first one is encoded into the result.
    pub face_count: usize,
}

/// Produce the embedding of the first face found in `image_path`.
///
/// `load_backend` runs only after the image has been found and decoded.
pub fn generate_embedding<B, F>(image_path: &Path, load_backend: F) -> Result<GeneratedEmbedding, GenerateError>
where
    B: FaceBackend,
    F: FnOnce() -> Result<B, BackendError>,
{
    if !image_path.exists() {
        return Err(GenerateError::FileNotFound(image_path.to_path_buf()));
    }

    let image = decode_rgb(image_path)?;
    tracing::debug!(
        path = %image_path.display(),
        width = image.width(),
        height = image.height(),
        "image decoded"
    );

    let mut backend = load_backend()?;

    let faces = backend.locate(&image)?;
    if faces.is_empty() {
        return Err(GenerateError::NoFaceDetected);
    }
    tracing::debug!(faces = faces.len(), "faces located");

    let embedding = backend
        .encode(&image, &faces)?
        .into_iter()
        .next()
        .ok_or(GenerateError::EncodingFailed)?;

    Ok(GeneratedEmbedding {
        embedding,
        face_count: faces.len(),
    })
}

/// Decode by content; callers routinely save PNG data under a `.jpg` name.
fn decode_rgb(path: &Path) -> Result<RgbImage, GenerateError> {
    let image = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    Ok(image.to_rgb8())
}
