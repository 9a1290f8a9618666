//! Conversion of a captured group's HTML into ordered note items.
//!
//! ```text
//! html::blocks    fragments -> ordered raw blocks (text, image, svg, media)
//! media           URL resolution, provider embeds, data: URLs, hashing
//! pipeline        Capturer: blocks -> note items, downloads joined in order
//! collab          Downloader / FileStorage / NoteStore seams
//! ```

pub mod collab;
pub mod html;
pub mod media;
pub mod pipeline;

pub use collab::{Downloaded, Downloader, FileStorage, HttpDownloader, MemoryFileStorage, NoteStore};
pub use pipeline::Capturer;

use serde::{Deserialize, Serialize};

/// Where a captured item came from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRef {
    pub title: String,
    pub source_url: String,
}

impl SourceRef {
    #[must_use]
    pub fn new(title: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self { title: title.into(), source_url: source_url.into() }
    }
}

/// One unit of note content, numbered from 1 in capture order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NoteItem {
    Quote {
        ordinal: usize,
        text: String,
        #[serde(flatten)]
        source: SourceRef,
    },
    #[serde(rename_all = "camelCase")]
    Image {
        ordinal: usize,
        /// Id returned by file storage.
        content_id: String,
        mime: String,
        #[serde(flatten)]
        source: SourceRef,
    },
    Embed {
        ordinal: usize,
        url: String,
        #[serde(flatten)]
        source: SourceRef,
    },
    Link {
        ordinal: usize,
        url: String,
        #[serde(flatten)]
        source: SourceRef,
    },
}

impl NoteItem {
    #[must_use]
    pub fn ordinal(&self) -> usize {
        match self {
            Self::Quote { ordinal, .. }
            | Self::Image { ordinal, .. }
            | Self::Embed { ordinal, .. }
            | Self::Link { ordinal, .. } => *ordinal,
        }
    }

    pub fn set_ordinal(&mut self, value: usize) {
        match self {
            Self::Quote { ordinal, .. }
            | Self::Image { ordinal, .. }
            | Self::Embed { ordinal, .. }
            | Self::Link { ordinal, .. } => *ordinal = value,
        }
    }

    #[must_use]
    pub fn source(&self) -> &SourceRef {
        match self {
            Self::Quote { source, .. }
            | Self::Image { source, .. }
            | Self::Embed { source, .. }
            | Self::Link { source, .. } => source,
        }
    }
}
