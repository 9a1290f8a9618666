//! Capturer: blocks to note items, with downloads running concurrently and
//! results kept in block order.

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod pipeline_test;

use std::sync::Arc;

use futures::future::join_all;
use tracing::{info, warn};

use crate::capture::collab::{Downloader, FileStorage, NoteStore};
use crate::capture::html::{self, Block};
use crate::capture::media::{self, MediaLink, SVG_MIME};
use crate::capture::{NoteItem, SourceRef};
use crate::engine::CaptureRequest;
use crate::error::{CaptureError, ErrorCode, NoteError};
use crate::target::{Confirmation, NoteInfo};

pub struct Capturer {
    downloader: Arc<dyn Downloader>,
    storage: Arc<dyn FileStorage>,
    notes: Arc<dyn NoteStore>,
}

impl Capturer {
    #[must_use]
    pub fn new(downloader: Arc<dyn Downloader>, storage: Arc<dyn FileStorage>, notes: Arc<dyn NoteStore>) -> Self {
        Self { downloader, storage, notes }
    }

    /// Convert HTML fragments into note items numbered 1..n. Relative URLs
    /// resolve against `base_url`, the document the fragments came from.
    ///
    /// Items that fail to download or store are dropped and logged; the rest
    /// keep their relative order.
    pub async fn capture(&self, fragments: &[String], source: &SourceRef, base_url: &str) -> Vec<NoteItem> {
        let blocks = html::blocks(fragments);
        let results = join_all(blocks.into_iter().map(|block| self.convert(block, source, base_url))).await;

        let mut items = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(item) => items.push(item),
                Err(e) => warn!(error = %e, code = e.error_code(), retryable = e.retryable(), "capture item dropped"),
            }
        }
        for (i, item) in items.iter_mut().enumerate() {
            item.set_ordinal(i + 1);
        }
        items
    }

    /// Append `items` to the note titled `title`, returning the note id.
    ///
    /// # Errors
    ///
    /// Returns a [`NoteError`] when the note is missing or cannot be written.
    pub async fn add_to_note(&self, title: &str, items: &[NoteItem]) -> Result<String, NoteError> {
        let note_id = self.notes.get_note(title).await?;
        self.notes.add_to_note(&note_id, items).await?;
        info!(%note_id, items = items.len(), "items added to note");
        Ok(note_id)
    }

    /// Capture a shoot group into the note titled `note_title` and report
    /// the outcome for [`crate::engine::EngineCore::finish_capture`].
    ///
    /// Items cite the top-level page (`page_title`, `page_url`) even when the
    /// group was shot inside a child frame; `request.href` only resolves
    /// relative URLs.
    pub async fn capture_into_note(
        &self,
        request: &CaptureRequest,
        page_title: &str,
        page_url: &str,
        note_title: &str,
    ) -> (Confirmation, Option<NoteInfo>) {
        let source = SourceRef::new(page_title, page_url);
        let items = self.capture(&request.html, &source, &request.href).await;
        if items.is_empty() {
            warn!(group_id = %request.group_id, "capture produced no items");
            return (Confirmation::Failure, None);
        }
        match self.add_to_note(note_title, &items).await {
            Ok(note_id) => {
                let info = NoteInfo { id: Some(note_id), title: note_title.to_string() };
                (Confirmation::Success, Some(info))
            }
            Err(e) => {
                warn!(group_id = %request.group_id, error = %e, code = e.error_code(), "note update failed");
                (Confirmation::Failure, None)
            }
        }
    }

    async fn convert(&self, block: Block, source: &SourceRef, base_url: &str) -> Result<NoteItem, CaptureError> {
        match block {
            Block::Text(text) => Ok(NoteItem::Quote { ordinal: 0, text, source: source.clone() }),
            Block::Image(raw) => self.image(&raw, source, base_url).await,
            Block::Svg(markup) => self.store(markup.into_bytes(), SVG_MIME, source).await,
            Block::Media(src) => Ok(match media::media_link(&src, base_url) {
                MediaLink::Embed(url) => NoteItem::Embed { ordinal: 0, url, source: source.clone() },
                MediaLink::Link(url) => NoteItem::Link { ordinal: 0, url, source: source.clone() },
            }),
        }
    }

    async fn image(&self, raw: &str, source: &SourceRef, base_url: &str) -> Result<NoteItem, CaptureError> {
        if raw.trim_start().starts_with("data:") {
            let (bytes, mime) = media::decode_data_url(raw)?;
            return self.store(bytes, &mime, source).await;
        }
        let url = media::resolve_url(raw, base_url)?;
        let mut headers = Vec::new();
        if !base_url.is_empty() {
            headers.push(("Referer".to_string(), base_url.to_string()));
        }
        let downloaded = self.downloader.download(url.as_str(), &headers).await?;
        let mime = media::mime_for(url.as_str(), downloaded.mime.as_deref());
        self.store(downloaded.bytes, &mime, source).await
    }

    async fn store(&self, bytes: Vec<u8>, mime: &str, source: &SourceRef) -> Result<NoteItem, CaptureError> {
        let name = media::content_name(&bytes);
        let content_id = self.storage.insert_file(&name, bytes, mime).await?;
        Ok(NoteItem::Image { ordinal: 0, content_id, mime: mime.to_string(), source: source.clone() })
    }
}
