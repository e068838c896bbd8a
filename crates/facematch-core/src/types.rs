use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of values in a face embedding.
pub const EMBEDDING_DIM: usize = 128;

/// Bounding box for a detected face, with optional facial landmarks.
#[derive(Debug, Clone)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub confidence: f32,
    /// Five-point facial landmarks: [left_eye, right_eye, nose, left_mouth, right_mouth].
    pub landmarks: Option<[(f32, f32); 5]>,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("expected {EMBEDDING_DIM} embedding values, found {found}")]
pub struct DimensionMismatch {
    pub found: usize,
}

/// 128-dimensional face embedding.
///
/// Serializes as a bare JSON array of numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "Vec<f64>", try_from = "Vec<f64>")]
pub struct Embedding {
    values: Vec<f64>,
}

impl Embedding {
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Euclidean distance between two embeddings.
    pub fn euclidean_distance(&self, other: &Embedding) -> f64 {
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>()
            .sqrt()
    }
}

impl TryFrom<Vec<f64>> for Embedding {
    type Error = DimensionMismatch;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        if values.len() != EMBEDDING_DIM {
            return Err(DimensionMismatch {
                found: values.len(),
            });
        }
        Ok(Self { values })
    }
}

impl From<Embedding> for Vec<f64> {
    fn from(embedding: Embedding) -> Self {
        embedding.values
    }
}

/// Outcome of comparing two embeddings at a given tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Comparison {
    pub is_match: bool,
    pub distance: f64,
    pub tolerance: f64,
    /// `1 - distance`, unclamped.
    pub similarity_score: f64,
}

impl Comparison {
    pub fn evaluate(a: &Embedding, b: &Embedding, tolerance: f64) -> Self {
        let distance = a.euclidean_distance(b);
        Self {
            is_match: distance < tolerance,
            distance,
            tolerance,
            similarity_score: 1.0 - distance,
        }
    }
}

/// Best candidate found for a probe embedding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BestMatch {
    /// Position of the candidate in the gallery.
    pub index: usize,
    /// `1 - distance`.
    pub score: f64,
    pub distance: f64,
}

/// Strategy for searching a gallery of candidate embeddings.
pub trait Matcher {
    fn best_match(&self, probe: &Embedding, gallery: &[Embedding], tolerance: f64) -> Option<BestMatch>;
}

/// Euclidean matcher with constant-time gallery traversal.
///
/// Every entry is compared; a candidate wins only if it is strictly below the
/// tolerance and strictly closer than any earlier winner.
pub struct EuclideanMatcher;

impl Matcher for EuclideanMatcher {
    fn best_match(&self, probe: &Embedding, gallery: &[Embedding], tolerance: f64) -> Option<BestMatch> {
        let mut best: Option<BestMatch> = None;
        let mut bound = tolerance;

        for (index, candidate) in gallery.iter().enumerate() {
            let distance = probe.euclidean_distance(candidate);
            if distance < bound {
                bound = distance;
                best = Some(BestMatch {
                    index,
                    score: 1.0 - distance,
                    distance,
                });
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embedding_with(head: &[f64]) -> Embedding {
        let mut values = vec![0.0; EMBEDDING_DIM];
        values[..head.len()].copy_from_slice(head);
        Embedding::try_from(values).unwrap()
    }

    #[test]
    fn test_try_from_rejects_wrong_length() {
        let err = Embedding::try_from(vec![0.0; 127]).unwrap_err();
        assert_eq!(err.found, 127);
        assert!(Embedding::try_from(vec![]).is_err());
        assert!(Embedding::try_from(vec![0.0; EMBEDDING_DIM]).is_ok());
    }

    #[test]
    fn test_serializes_as_bare_array() {
        let e = embedding_with(&[0.25]);
        let json = serde_json::to_value(&e).unwrap();
        let arr = json.as_array().unwrap();
        assert_eq!(arr.len(), EMBEDDING_DIM);
        assert_eq!(arr[0], 0.25);
    }

    #[test]
    fn test_deserialize_validates_length() {
        let short = serde_json::to_string(&vec![0.5; 10]).unwrap();
        assert!(serde_json::from_str::<Embedding>(&short).is_err());

        let full = serde_json::to_string(&vec![0.5; EMBEDDING_DIM]).unwrap();
        let e: Embedding = serde_json::from_str(&full).unwrap();
        assert_eq!(e.values().len(), EMBEDDING_DIM);
    }

    #[test]
    fn test_euclidean_distance() {
        let a = embedding_with(&[0.0, 0.0]);
        let b = embedding_with(&[3.0, 4.0]);
        assert!((a.euclidean_distance(&b) - 5.0).abs() < 1e-12);
        assert_eq!(a.euclidean_distance(&a), 0.0);
    }

    #[test]
    fn test_comparison_identical() {
        let a = embedding_with(&[0.1, -0.2, 0.3]);
        let c = Comparison::evaluate(&a, &a.clone(), 0.5);
        assert!(c.is_match);
        assert_eq!(c.distance, 0.0);
        assert_eq!(c.similarity_score, 1.0);
        assert_eq!(c.tolerance, 0.5);
    }

    #[test]
    fn test_comparison_threshold_is_strict() {
        let a = embedding_with(&[0.0]);
        let b = embedding_with(&[0.5]);
        let c = Comparison::evaluate(&a, &b, 0.5);
        assert!(!c.is_match);
        assert!((c.similarity_score - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_similarity_score_not_clamped() {
        let a = embedding_with(&[0.0]);
        let b = embedding_with(&[2.0]);
        let c = Comparison::evaluate(&a, &b, 0.5);
        assert!(!c.is_match);
        assert!((c.similarity_score + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_matcher_picks_closest_below_tolerance() {
        let probe = embedding_with(&[0.0]);
        let gallery = vec![
            embedding_with(&[0.5]),
            embedding_with(&[0.2]),
            embedding_with(&[0.3]),
        ];

        let best = EuclideanMatcher.best_match(&probe, &gallery, 0.6).unwrap();
        assert_eq!(best.index, 1);
        assert!((best.distance - 0.2).abs() < 1e-12);
        assert!((best.score - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_matcher_tie_keeps_earliest() {
        let probe = embedding_with(&[0.0]);
        let gallery = vec![embedding_with(&[0.1]), embedding_with(&[-0.1])];
        let best = EuclideanMatcher.best_match(&probe, &gallery, 0.6).unwrap();
        assert_eq!(best.index, 0);
    }

    #[test]
    fn test_matcher_no_match() {
        let probe = embedding_with(&[0.0]);
        let gallery = vec![embedding_with(&[0.6]), embedding_with(&[1.0])];
        assert!(EuclideanMatcher.best_match(&probe, &gallery, 0.6).is_none());
    }

    #[test]
    fn test_matcher_empty_gallery() {
        let probe = embedding_with(&[0.0]);
        assert!(EuclideanMatcher.best_match(&probe, &[], 0.6).is_none());
    }
}
