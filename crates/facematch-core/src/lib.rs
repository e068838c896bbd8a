//! facematch-core — 128-d face embeddings and Euclidean face matching.
//!
//! Detection uses SCRFD and encoding a 128-d ONNX encoder, both on ONNX
//! Runtime. Embeddings travel between processes as bare JSON arrays.

pub mod alignment;
pub mod backend;
pub mod compare;
pub mod detector;
pub mod envelope;
pub mod gallery;
pub mod generate;
pub mod recognizer;
pub mod types;

pub use backend::{default_model_dir, BackendError, FaceBackend, ModelPaths, OnnxBackend};
pub use compare::{compare_embedding_files, CompareError, DEFAULT_TOLERANCE};
pub use envelope::{BestMatchPayload, ComparisonPayload, EmbeddingPayload, Envelope};
pub use gallery::{find_best_match, GallerySearch, MatchError, DEFAULT_GALLERY_TOLERANCE};
pub use generate::{generate_embedding, GenerateError, GeneratedEmbedding};
pub use types::{BestMatch, BoundingBox, Comparison, Embedding, EMBEDDING_DIM};
