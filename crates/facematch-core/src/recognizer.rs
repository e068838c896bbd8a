//! 128-dimensional face encoder via ONNX Runtime.
//!
//! Runs a MobileFaceNet-style encoder on aligned 112×112 RGB crops.

use crate::alignment::{self, ALIGNED_SIZE};
use crate::types::{BoundingBox, Embedding, EMBEDDING_DIM};
use image::RgbImage;
use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::Path;
use thiserror::Error;

// Encoder normalization is symmetric, unlike SCRFD's 128.0 divisor.
const ENCODER_MEAN: f32 = 127.5;
const ENCODER_STD: f32 = 127.5;

#[derive(Error, Debug)]
pub enum RecognizerError {
    #[error("model file not found: {0}")]
    ModelNotFound(String),
    #[error("inference failed: {0}")]
    InferenceFailed(String),
    #[error("face has no landmarks; detector must return landmarks for alignment")]
    NoLandmarks,
    #[error("ort: {0}")]
    Ort(#[from] ort::Error),
}

pub struct FaceRecognizer {
    session: Session,
}

impl FaceRecognizer {
    /// Load the encoder ONNX model from the given path.
    pub fn load(model_path: &Path) -> Result<Self, RecognizerError> {
        if !model_path.exists() {
            return Err(RecognizerError::ModelNotFound(model_path.display().to_string()));
        }

        let session = Session::builder()?
            .with_intra_threads(2)?
            .commit_from_file(model_path)?;

        tracing::info!(
            path = %model_path.display(),
            inputs = ?session.inputs().iter().map(|i| i.name()).collect::<Vec<_>>(),
            "loaded face encoder model"
        );

        Ok(Self { session })
    }

    /// Extract an embedding for one detected face.
    ///
    /// The face is aligned from its landmarks before inference.
    pub fn extract(&mut self, image: &RgbImage, face: &BoundingBox) -> Result<Embedding, RecognizerError> {
        let landmarks = face.landmarks.as_ref().ok_or(RecognizerError::NoLandmarks)?;
        let aligned = alignment::align_face(image, landmarks);
        let input = preprocess(&aligned);

        let outputs = self.session.run(ort::inputs![TensorRef::from_array_view(input.view())?])?;
        let (_, raw) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| RecognizerError::InferenceFailed(format!("embedding extraction: {e}")))?;

        postprocess(raw)
    }
}

/// Convert an aligned 112×112 RGB crop into a NCHW float tensor.
fn preprocess(aligned: &RgbImage) -> Array4<f32> {
    let size = ALIGNED_SIZE as usize;
    let mut tensor = Array4::<f32>::zeros((1, 3, size, size));
    for (x, y, pixel) in aligned.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = (pixel.0[c] as f32 - ENCODER_MEAN) / ENCODER_STD;
        }
    }
    tensor
}

/// Validate, L2-normalize and widen raw encoder output.
fn postprocess(raw: &[f32]) -> Result<Embedding, RecognizerError> {
    if raw.len() != EMBEDDING_DIM {
        return Err(RecognizerError::InferenceFailed(format!(
            "expected {EMBEDDING_DIM}-dim embedding, got {}",
            raw.len()
        )));
    }
    if raw.iter().any(|v| !v.is_finite()) {
        return Err(RecognizerError::InferenceFailed("embedding contains non-finite values".into()));
    }

    let norm = raw.iter().map(|&v| (v as f64).powi(2)).sum::<f64>().sqrt();
    let values: Vec<f64> = if norm > 0.0 {
        raw.iter().map(|&v| v as f64 / norm).collect()
    } else {
        raw.iter().map(|&v| v as f64).collect()
    };

    Embedding::try_from(values).map_err(|e| RecognizerError::InferenceFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_preprocess_output_shape() {
        let aligned = RgbImage::from_pixel(ALIGNED_SIZE, ALIGNED_SIZE, Rgb([128, 128, 128]));
        let tensor = preprocess(&aligned);
        assert_eq!(tensor.shape(), &[1, 3, 112, 112]);
    }

    #[test]
    fn test_preprocess_keeps_channel_order() {
        let aligned = RgbImage::from_pixel(ALIGNED_SIZE, ALIGNED_SIZE, Rgb([255, 0, 128]));
        let tensor = preprocess(&aligned);
        assert!((tensor[[0, 0, 5, 7]] - 1.0).abs() < 1e-6);
        assert!((tensor[[0, 1, 5, 7]] + 1.0).abs() < 1e-6);
        let expected = (128.0 - ENCODER_MEAN) / ENCODER_STD;
        assert!((tensor[[0, 2, 5, 7]] - expected).abs() < 1e-6);
    }

    #[test]
    fn test_postprocess_normalizes() {
        let mut raw = vec![0.0f32; EMBEDDING_DIM];
        raw[0] = 3.0;
        raw[1] = 4.0;
        let e = postprocess(&raw).unwrap();
        assert!((e.values()[0] - 0.6).abs() < 1e-9);
        assert!((e.values()[1] - 0.8).abs() < 1e-9);
        let norm: f64 = e.values().iter().map(|v| v * v).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_postprocess_rejects_wrong_dimension() {
        let err = postprocess(&[0.1f32; 512]).unwrap_err();
        assert!(matches!(err, RecognizerError::InferenceFailed(_)));
    }

    #[test]
    fn test_postprocess_rejects_nan() {
        let mut raw = vec![0.1f32; EMBEDDING_DIM];
        raw[42] = f32::NAN;
        assert!(postprocess(&raw).is_err());
    }
}
