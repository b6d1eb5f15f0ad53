//! Candidate file loading
//!
//! Reads generator-level candidates either as one JSON array or as JSON lines
//! (one candidate per non-empty line).

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::McParticle;
use crate::infrastructure::traits::FileSystem;

/// Service for reading candidate records from disk.
pub struct CandidateService {
    fs: Arc<dyn FileSystem>,
}

impl CandidateService {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Load all candidates from `path`.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<Vec<McParticle>> {
        if !self.fs.exists(path) {
            return Err(ApplicationError::OperationFailed {
                context: format!("file not found: {}", path.display()),
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "file does not exist",
                )),
            });
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read candidates", path)?;
        let candidates = parse_candidates(&content, path)?;
        debug!("load: {} candidates from {}", candidates.len(), path.display());
        Ok(candidates)
    }
}

/// Parse candidate file content; `path` is only used for error messages.
pub fn parse_candidates(content: &str, path: &Path) -> ApplicationResult<Vec<McParticle>> {
    let invalid = |message: String| ApplicationError::InvalidCandidates {
        path: path.to_path_buf(),
        message,
    };

    if content.trim_start().starts_with('[') {
        return serde_json::from_str(content)
            .map_err(|e| invalid(format!("line {}: {}", e.line(), e)));
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str::<McParticle>(line)
                .map_err(|e| invalid(format!("line {}: {}", idx + 1, e)))
        })
        .collect()
}
