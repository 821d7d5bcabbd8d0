//! Error types for document and page operations

use std::path::PathBuf;

/// Failures that prevent a document from opening at all
#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("broken document structure: {detail}")]
    CorruptStructure { detail: String },

    #[error("encrypted document (empty password rejected)")]
    EncryptionUnsupported,
}

impl OpenError {
    pub fn corrupt(detail: impl Into<String>) -> Self {
        Self::CorruptStructure {
            detail: detail.into(),
        }
    }
}

/// Failures while loading or rendering one page; never fatal to the session
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    #[error("{0}")]
    Content(String),

    #[error("render failed: {0}")]
    Render(String),

    #[error("page {page} out of range (document has {count})")]
    OutOfRange { page: usize, count: usize },
}

impl PageError {
    pub fn content(msg: impl Into<String>) -> Self {
        Self::Content(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}

/// Session-level failures surfaced to the host
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Open(#[from] OpenError),

    #[error("document has no pages")]
    Empty,
}
