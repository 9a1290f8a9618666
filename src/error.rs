//! Error types shared across the crate.
//!
//! Geometry and state-machine operations are fail-open and never return
//! errors. Configuration, snapshot hydration and the capture collaborators
//! can fail.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

/// Grepable error code and retryable flag for structured logs.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

// =============================================================================
// CONFIG
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {var}: {message}")]
    Parse { var: String, message: String },
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Parse { .. } => "E_CONFIG_PARSE",
        }
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// A render-tree snapshot that could not be hydrated.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot parse failed: {0}")]
    Parse(#[from] serde_json::Error),

    /// `node` names `other` as parent or child but `other` does not agree.
    #[error("snapshot link mismatch: node {node} and node {other}")]
    Link { node: usize, other: usize },

    /// Following parents from `node` never reaches a root.
    #[error("snapshot parent cycle at node {node}")]
    Cycle { node: usize },
}

impl ErrorCode for SnapshotError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Parse(_) => "E_SNAPSHOT_PARSE",
            Self::Link { .. } => "E_SNAPSHOT_LINK",
            Self::Cycle { .. } => "E_SNAPSHOT_CYCLE",
        }
    }
}

// =============================================================================
// CAPTURE COLLABORATORS
// =============================================================================

/// Failure fetching bytes for a URL.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DownloadError {
    /// The URL could not be parsed or resolved against the page.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// A `data:` URL had a malformed header or payload.
    #[error("malformed data url: {0}")]
    DataUrl(String),

    /// The HTTP request failed before a response arrived.
    #[error("download request failed: {0}")]
    Request(String),

    /// The server answered with a non-success status.
    #[error("download failed: {url} returned {status}")]
    Status { url: String, status: u16 },

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ErrorCode for DownloadError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidUrl(_) => "E_INVALID_URL",
            Self::DataUrl(_) => "E_DATA_URL",
            Self::Request(_) => "E_DOWNLOAD_REQUEST",
            Self::Status { .. } => "E_DOWNLOAD_STATUS",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Status { status: 429 | 500..=599, .. })
    }
}

/// Failure registering bytes in file storage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("file storage write failed: {0}")]
    Write(String),
}

impl ErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Write(_) => "E_STORAGE_WRITE",
        }
    }
}

/// Failure appending to a note.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NoteError {
    #[error("note not found: {title}")]
    NotFound { title: String },

    #[error("note write failed: {0}")]
    Write(String),
}

impl ErrorCode for NoteError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "E_NOTE_NOT_FOUND",
            Self::Write(_) => "E_NOTE_WRITE",
        }
    }
}

/// Failure converting one capture item.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ErrorCode for CaptureError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Download(e) => e.error_code(),
            Self::Storage(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Download(e) => e.retryable(),
            Self::Storage(e) => e.retryable(),
        }
    }
}
