//! JSON-file backed media library.
//!
//! The CLI has no CMS to ask, so attachments come from a JSON object keyed
//! by attachment id:
//!
//! ```json
//! {
//!   "42": { "url": "https://example.com/uploads/dawn.jpg", "width": 2000, "height": 1000 },
//!   "43": { "url": "https://example.com/uploads/dusk.jpg", "width": 1200, "height": 1600 }
//! }
//! ```
//!
//! Missing `width`/`height` default to 0, which the resolver treats as
//! "dimensions unknown".

use crate::transform::{Attachment, LookupMiss, MediaLibrary};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// In-memory attachment store loaded from JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonLibrary {
    attachments: BTreeMap<u64, Attachment>,
}

impl JsonLibrary {
    pub fn new(attachments: BTreeMap<u64, Attachment>) -> Self {
        Self { attachments }
    }

    pub fn from_json(json: &str) -> Result<Self, LibraryError> {
        let attachments = serde_json::from_str(json)?;
        Ok(Self { attachments })
    }

    pub fn from_path(path: &Path) -> Result<Self, LibraryError> {
        let content = fs::read_to_string(path)?;
        let library = Self::from_json(&content)?;
        tracing::debug!(
            path = %path.display(),
            attachments = library.len(),
            "Loaded media library"
        );
        Ok(library)
    }

    pub fn len(&self) -> usize {
        self.attachments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attachments.is_empty()
    }
}

impl MediaLibrary for JsonLibrary {
    fn attachment(&self, id: u64) -> Result<Attachment, LookupMiss> {
        let attachment = self
            .attachments
            .get(&id)
            .ok_or(LookupMiss::UnknownAttachment(id))?;
        if attachment.url.is_empty() {
            return Err(LookupMiss::MissingUrl(id));
        }
        Ok(attachment.clone())
    }
}
