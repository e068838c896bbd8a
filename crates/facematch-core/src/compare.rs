//! Embedding file loading and pairwise comparison.

use crate::types::{Comparison, Embedding};
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default matching tolerance for pairwise comparison.
pub const DEFAULT_TOLERANCE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    First,
    Second,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::First => f.write_str("First"),
            Side::Second => f.write_str("Second"),
        }
    }
}

#[derive(Error, Debug)]
pub enum CompareError {
    #[error("{side} embedding file not found")]
    EmbeddingNotFound { side: Side, path: PathBuf },
    #[error("Invalid embedding dimensions")]
    InvalidDimensions { side: Side, found: usize },
    #[error("Embedding distance is not finite")]
    NonFiniteDistance,
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl CompareError {
    /// Stable taxonomy name, for logs.
    pub fn code(&self) -> &'static str {
        match self {
            CompareError::EmbeddingNotFound { .. } => "embedding_not_found",
            CompareError::InvalidDimensions { .. } => "invalid_dimensions",
            CompareError::NonFiniteDistance => "non_finite_distance",
            CompareError::Io(_) => "io",
            CompareError::Json(_) => "malformed_json",
        }
    }
}

/// Read a JSON array of numbers without checking its length.
pub fn read_embedding_values(path: &Path) -> Result<Vec<f64>, CompareError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Compare the embeddings stored in two files.
///
/// Both files are checked for existence and parsed before either length is
/// validated, so a dimension error is only reported for well-formed files.
pub fn compare_embedding_files(first: &Path, second: &Path, tolerance: f64) -> Result<Comparison, CompareError> {
    for (side, path) in [(Side::First, first), (Side::Second, second)] {
        if !path.exists() {
            return Err(CompareError::EmbeddingNotFound {
                side,
                path: path.to_path_buf(),
            });
        }
    }

    let first_values = read_embedding_values(first)?;
    let second_values = read_embedding_values(second)?;

    let to_embedding = |side, values: Vec<f64>| {
        Embedding::try_from(values).map_err(|e| CompareError::InvalidDimensions { side, found: e.found })
    };
    let a = to_embedding(Side::First, first_values)?;
    let b = to_embedding(Side::Second, second_values)?;

    let comparison = Comparison::evaluate(&a, &b, tolerance);
    if !comparison.distance.is_finite() {
        return Err(CompareError::NonFiniteDistance);
    }
    tracing::debug!(
        distance = comparison.distance,
        tolerance,
        is_match = comparison.is_match,
        "embeddings compared"
    );
    Ok(comparison)
}
