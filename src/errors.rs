// ⚠️ Error taxonomy for the geography pipeline
// Row-level problems never surface here; they are counted in BuildReport.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::parser::SourceKind;

/// Fatal conditions. Any of these stops the run before the persisted
/// document is touched.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("could not retrieve {source_kind} from '{location}': {reason}")]
    SourceRetrieval {
        source_kind: SourceKind,
        location: String,
        reason: String,
    },
    #[error("persisted document not found: {}", .0.display())]
    MissingDocument(PathBuf),
    #[error("persisted document is not valid JSON: {reason}")]
    CorruptDocument { reason: String },
    #[error("persisted document is neither a list nor an object (found {found})")]
    UnrecognizedDocument { found: &'static str },
    #[error("filesystem failure at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}

impl PipelineError {
    pub fn filesystem(path: impl Into<PathBuf>, source: io::Error) -> Self {
        PipelineError::Filesystem {
            path: path.into(),
            source,
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
