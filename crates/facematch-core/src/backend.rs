//! Detection + encoding seam used by the embedding generator.

use crate::detector::{DetectorError, FaceDetector};
use crate::recognizer::{FaceRecognizer, RecognizerError};
use crate::types::{BoundingBox, Embedding};
use image::RgbImage;
use std::path::{Path, PathBuf};

/// Locations of the ONNX model files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPaths {
    pub detector: PathBuf,
    pub encoder: PathBuf,
}

pub const DETECTOR_MODEL_FILE: &str = "det_10g.onnx";
pub const ENCODER_MODEL_FILE: &str = "mobilefacenet_128.onnx";

impl ModelPaths {
    /// Standard file names inside `model_dir`.
    pub fn in_dir(model_dir: &Path) -> Self {
        Self {
            detector: model_dir.join(DETECTOR_MODEL_FILE),
            encoder: model_dir.join(ENCODER_MODEL_FILE),
        }
    }
}

/// Default model directory: `$XDG_DATA_HOME/facematch/models`, then
/// `$HOME/.local/share/facematch/models`, then `/usr/share/facematch/models`.
pub fn default_model_dir() -> PathBuf {
    if let Ok(data) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(data).join("facematch/models");
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local/share/facematch/models");
    }
    PathBuf::from("/usr/share/facematch/models")
}

#[derive(thiserror::Error, Debug)]
pub enum BackendError {
    #[error(transparent)]
    Detector(#[from] DetectorError),
    #[error(transparent)]
    Recognizer(#[from] RecognizerError),
}

/// Face detection and encoding over a decoded RGB image.
pub trait FaceBackend {
    /// Face boxes in detector order.
    fn locate(&mut self, image: &RgbImage) -> Result<Vec<BoundingBox>, BackendError>;

    /// One embedding per face that could be encoded, in the order of `faces`.
    fn encode(&mut self, image: &RgbImage, faces: &[BoundingBox]) -> Result<Vec<Embedding>, BackendError>;
}

/// SCRFD detector + 128-d encoder, both on ONNX Runtime.
pub struct OnnxBackend {
    detector: FaceDetector,
    recognizer: FaceRecognizer,
}

impl OnnxBackend {
    pub fn load(paths: &ModelPaths) -> Result<Self, BackendError> {
        let detector = FaceDetector::load(&paths.detector)?;
        let recognizer = FaceRecognizer::load(&paths.encoder)?;
        Ok(Self { detector, recognizer })
    }
}

impl FaceBackend for OnnxBackend {
    fn locate(&mut self, image: &RgbImage) -> Result<Vec<BoundingBox>, BackendError> {
        Ok(self.detector.detect(image)?)
    }

    fn encode(&mut self, image: &RgbImage, faces: &[BoundingBox]) -> Result<Vec<Embedding>, BackendError> {
        encode_faces(faces, |face| self.recognizer.extract(image, face))
    }
}

/// Run `extract` over `faces`, skipping faces without landmarks.
///
/// Any other recognizer error aborts the whole batch.
fn encode_faces<E>(faces: &[BoundingBox], mut extract: E) -> Result<Vec<Embedding>, BackendError>
where
    E: FnMut(&BoundingBox) -> Result<Embedding, RecognizerError>,
{
    let mut embeddings = Vec::with_capacity(faces.len());
    for (index, face) in faces.iter().enumerate() {
        match extract(face) {
            Ok(embedding) => embeddings.push(embedding),
            Err(RecognizerError::NoLandmarks) => {
                tracing::warn!(index, confidence = face.confidence, "face has no landmarks; skipping");
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(embeddings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_paths_in_dir() {
        let paths = ModelPaths::in_dir(Path::new("/opt/models"));
        assert_eq!(paths.detector, PathBuf::from("/opt/models/det_10g.onnx"));
        assert_eq!(paths.encoder, PathBuf::from("/opt/models/mobilefacenet_128.onnx"));
    }

    fn face(x: f32, landmarks: bool) -> BoundingBox {
        BoundingBox {
            x,
            y: 0.0,
            width: 20.0,
            height: 20.0,
            confidence: 0.9,
            landmarks: landmarks.then_some([(0.0, 0.0); 5]),
        }
    }

    /// Extracts like the ONNX recognizer minus the model: no landmarks is an error.
    struct FakeRecognizer {
        fail_on: Option<f32>,
    }

    impl FakeRecognizer {
        fn extract(&mut self, face: &BoundingBox) -> Result<Embedding, RecognizerError> {
            if face.landmarks.is_none() {
                return Err(RecognizerError::NoLandmarks);
            }
            if self.fail_on == Some(face.x) {
                return Err(RecognizerError::InferenceFailed("encoder produced no output".into()));
            }
            let mut values = vec![0.0; crate::types::EMBEDDING_DIM];
            values[0] = face.x as f64;
            Ok(Embedding::try_from(values).unwrap())
        }
    }

    impl FaceBackend for FakeRecognizer {
        fn locate(&mut self, _image: &RgbImage) -> Result<Vec<BoundingBox>, BackendError> {
            Ok(vec![face(0.0, false), face(30.0, false)])
        }

        fn encode(&mut self, _image: &RgbImage, faces: &[BoundingBox]) -> Result<Vec<Embedding>, BackendError> {
            encode_faces(faces, |face| self.extract(face))
        }
    }

    #[test]
    fn test_encode_skips_faces_without_landmarks() {
        let mut recognizer = FakeRecognizer { fail_on: None };
        let faces = [face(0.0, false), face(10.0, true), face(20.0, true)];

        let embeddings = encode_faces(&faces, |face| recognizer.extract(face)).unwrap();
        assert_eq!(embeddings.len(), 2);
        assert_eq!(embeddings[0].values()[0], 10.0);
        assert_eq!(embeddings[1].values()[0], 20.0);
    }

    #[test]
    fn test_encode_all_without_landmarks_is_encoding_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("two_faces.png");
        RgbImage::new(16, 16).save(&path).unwrap();

        let err = crate::generate::generate_embedding(&path, || Ok(FakeRecognizer { fail_on: None })).unwrap_err();
        assert!(matches!(err, crate::generate::GenerateError::EncodingFailed));
        assert_eq!(err.to_string(), "Could not generate face encoding");
    }

    #[test]
    fn test_encode_propagates_other_errors() {
        let mut recognizer = FakeRecognizer { fail_on: Some(20.0) };
        let faces = [face(10.0, true), face(20.0, true), face(30.0, true)];

        let err = encode_faces(&faces, |face| recognizer.extract(face)).unwrap_err();
        assert!(matches!(err, BackendError::Recognizer(RecognizerError::InferenceFailed(_))));
    }

    #[test]
    fn test_load_reports_missing_detector() {
        let dir = tempfile::tempdir().unwrap();
        let err = OnnxBackend::load(&ModelPaths::in_dir(dir.path())).err().unwrap();
        assert!(matches!(err, BackendError::Detector(DetectorError::ModelNotFound(_))));
        assert!(err.to_string().starts_with("model file not found: "));
    }
}
