//! Uniform JSON response shared by the command-line programs.
//!
//! Every response is `{"success": bool, "error": string|null, ...payload}`;
//! the payload fields are flattened into the top-level object.

use crate::gallery::GallerySearch;
use crate::generate::GeneratedEmbedding;
use crate::types::{BestMatch, Comparison, Embedding};
use serde::Serialize;
use std::fmt::Display;

#[derive(Debug, Clone, Serialize)]
pub struct Envelope<P> {
    pub success: bool,
    pub error: Option<String>,
    #[serde(flatten)]
    pub payload: P,
}

impl<P: Serialize> Envelope<P> {
    pub fn ok(payload: P) -> Self {
        Self {
            success: true,
            error: None,
            payload,
        }
    }

    pub fn failed(error: impl Display, payload: P) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            payload,
        }
    }
}

/// Payload of `generate_embedding`.
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingPayload {
    pub face_embedding: Option<Embedding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub face_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl EmbeddingPayload {
    pub fn empty() -> Self {
        Self {
            face_embedding: None,
            face_count: None,
            message: None,
        }
    }
}

impl From<GeneratedEmbedding> for EmbeddingPayload {
    fn from(generated: GeneratedEmbedding) -> Self {
        Self {
            face_embedding: Some(generated.embedding),
            face_count: Some(generated.face_count),
            message: Some("Face embedding generated successfully"),
        }
    }
}

/// Payload of `compare_faces`.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonPayload {
    pub is_match: bool,
    pub distance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl ComparisonPayload {
    pub fn empty() -> Self {
        Self {
            is_match: false,
            distance: None,
            tolerance: None,
            similarity_score: None,
            message: None,
        }
    }
}

impl From<Comparison> for ComparisonPayload {
    fn from(c: Comparison) -> Self {
        Self {
            is_match: c.is_match,
            distance: Some(c.distance),
            tolerance: Some(c.tolerance),
            similarity_score: Some(c.similarity_score),
            message: Some("Face comparison completed successfully"),
        }
    }
}

/// Payload of `find_best_match`.
#[derive(Debug, Clone, Serialize)]
pub struct BestMatchPayload {
    pub best_match: Option<BestMatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidates: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,
}

impl BestMatchPayload {
    pub fn empty() -> Self {
        Self {
            best_match: None,
            candidates: None,
            tolerance: None,
        }
    }

    pub fn found(search: GallerySearch, tolerance: f64) -> Self {
        Self {
            best_match: search.best_match,
            candidates: Some(search.candidates),
            tolerance: Some(tolerance),
        }
    }
}
