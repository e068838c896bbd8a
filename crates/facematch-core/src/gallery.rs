//! Probe-vs-gallery search over embedding files.

use crate::compare::{read_embedding_values, CompareError};
use crate::types::{BestMatch, Embedding, EuclideanMatcher, Matcher};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default tolerance for gallery search.
pub const DEFAULT_GALLERY_TOLERANCE: f64 = 0.6;

#[derive(Error, Debug)]
pub enum MatchError {
    #[error("Probe embedding file not found")]
    ProbeNotFound(PathBuf),
    #[error("Candidate embedding file not found: {}", .0.display())]
    CandidateNotFound(PathBuf),
    #[error("Invalid embedding dimensions")]
    InvalidDimensions { path: PathBuf, found: usize },
    #[error(transparent)]
    Read(#[from] CompareError),
}

impl MatchError {
    pub fn code(&self) -> &'static str {
        match self {
            MatchError::ProbeNotFound(_) | MatchError::CandidateNotFound(_) => "embedding_not_found",
            MatchError::InvalidDimensions { .. } => "invalid_dimensions",
            MatchError::Read(inner) => inner.code(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GallerySearch {
    pub best_match: Option<BestMatch>,
    pub candidates: usize,
}

fn load(path: &Path) -> Result<Embedding, MatchError> {
    let values = read_embedding_values(path)?;
    Embedding::try_from(values).map_err(|e| MatchError::InvalidDimensions {
        path: path.to_path_buf(),
        found: e.found,
    })
}

/// Find the candidate closest to `probe` whose distance is below `tolerance`.
pub fn find_best_match(probe: &Path, candidates: &[PathBuf], tolerance: f64) -> Result<GallerySearch, MatchError> {
    if !probe.exists() {
        return Err(MatchError::ProbeNotFound(probe.to_path_buf()));
    }
    if let Some(missing) = candidates.iter().find(|c| !c.exists()) {
        return Err(MatchError::CandidateNotFound(missing.clone()));
    }

    let probe = load(probe)?;
    let gallery = candidates.iter().map(|c| load(c)).collect::<Result<Vec<_>, _>>()?;

    let best_match = EuclideanMatcher.best_match(&probe, &gallery, tolerance);
    tracing::debug!(candidates = gallery.len(), ?best_match, "gallery searched");

    Ok(GallerySearch {
        best_match,
        candidates: gallery.len(),
    })
}
