//! External collaborators of the capture pipeline.
//!
//! Transport, storage, and notes live outside the engine; these traits are
//! the seams. `HttpDownloader` and `MemoryFileStorage` are ready-made
//! implementations for hosts that have nothing better.

#[cfg(test)]
#[path = "collab_test.rs"]
mod collab_test;

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::capture::NoteItem;
use crate::config::DownloadTimeouts;
use crate::error::{DownloadError, NoteError, StorageError};

/// Bytes fetched for a URL plus the server-declared content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Downloaded {
    pub bytes: Vec<u8>,
    pub mime: Option<String>,
}

#[async_trait::async_trait]
pub trait Downloader: Send + Sync {
    /// Fetch `url`, sending `headers` with the request.
    ///
    /// # Errors
    ///
    /// Returns a [`DownloadError`] when the request fails or the server
    /// answers with a non-success status.
    async fn download(&self, url: &str, headers: &[(String, String)]) -> Result<Downloaded, DownloadError>;
}

#[async_trait::async_trait]
pub trait FileStorage: Send + Sync {
    /// Register `bytes` under `name` and return the content id.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the bytes cannot be stored.
    async fn insert_file(&self, name: &str, bytes: Vec<u8>, mime: &str) -> Result<String, StorageError>;
}

#[async_trait::async_trait]
pub trait NoteStore: Send + Sync {
    /// Look up a note by title, returning its id.
    ///
    /// # Errors
    ///
    /// Returns [`NoteError::NotFound`] when no note has that title.
    async fn get_note(&self, title: &str) -> Result<String, NoteError>;

    /// Append `items` to the note with `note_id`.
    ///
    /// # Errors
    ///
    /// Returns [`NoteError::Write`] when the note cannot be updated.
    async fn add_to_note(&self, note_id: &str, items: &[NoteItem]) -> Result<(), NoteError>;
}

// =============================================================================
// HTTP
// =============================================================================

pub struct HttpDownloader {
    http: reqwest::Client,
}

impl HttpDownloader {
    /// Client with the configured request and connect timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::HttpClientBuild`] when the TLS backend cannot
    /// be initialized.
    pub fn new(timeouts: DownloadTimeouts) -> Result<Self, DownloadError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| DownloadError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http })
    }
}

#[async_trait::async_trait]
impl Downloader for HttpDownloader {
    async fn download(&self, url: &str, headers: &[(String, String)]) -> Result<Downloaded, DownloadError> {
        let mut request = self.http.get(url);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }
        let response = request
            .send()
            .await
            .map_err(|e| DownloadError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status { url: url.to_string(), status: status.as_u16() });
        }
        let mime = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| match v.to_str() {
                Ok(raw) => Some(content_type_essence(raw)),
                Err(_) => None,
            });
        let bytes = response
            .bytes()
            .await
            .map_err(|e| DownloadError::Request(e.to_string()))?;
        Ok(Downloaded { bytes: bytes.to_vec(), mime })
    }
}

/// `image/png; charset=binary` -> `image/png`.
fn content_type_essence(raw: &str) -> String {
    raw.split(';').next().unwrap_or_default().trim().to_ascii_lowercase()
}

// =============================================================================
// IN-MEMORY STORAGE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub name: String,
    pub bytes: Vec<u8>,
    pub mime: String,
}

/// File storage keyed by name. Inserting the same name twice keeps one copy
/// and returns the same id.
#[derive(Debug, Default)]
pub struct MemoryFileStorage {
    files: Mutex<HashMap<String, StoredFile>>,
}

impl MemoryFileStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.files.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.files.lock().await.is_empty()
    }

    pub async fn get(&self, id: &str) -> Option<StoredFile> {
        self.files.lock().await.get(id).cloned()
    }
}

#[async_trait::async_trait]
impl FileStorage for MemoryFileStorage {
    async fn insert_file(&self, name: &str, bytes: Vec<u8>, mime: &str) -> Result<String, StorageError> {
        if name.is_empty() {
            return Err(StorageError::Write("empty file name".into()));
        }
        let mut files = self.files.lock().await;
        files
            .entry(name.to_string())
            .or_insert_with(|| StoredFile { name: name.to_string(), bytes, mime: mime.to_string() });
        Ok(name.to_string())
    }
}
