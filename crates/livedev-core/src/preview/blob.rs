//! Ephemeral object URLs for preview assets.

use std::collections::HashMap;
use uuid::Uuid;

/// URL scheme prefix of every object URL issued by [`BlobRegistry`].
pub const BLOB_URL_PREFIX: &str = "blob:livedev/";

/// Content registered behind an object URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub mime_type: String,
    pub content: String,
}

/// Issues and revokes object URLs for in-memory content.
pub trait BlobStore {
    /// Registers `content` and returns a fresh URL that resolves to it.
    fn create_object_url(&mut self, content: &str, mime_type: &str) -> String;

    /// Releases `url`. Returns false when it was unknown or already revoked.
    fn revoke_object_url(&mut self, url: &str) -> bool;
}

/// In-memory [`BlobStore`].
#[derive(Debug, Default)]
pub struct BlobRegistry {
    blobs: HashMap<String, Blob>,
}

impl BlobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, url: &str) -> Option<&Blob> {
        self.blobs.get(url)
    }

    /// Number of live (unrevoked) URLs.
    pub fn live_count(&self) -> usize {
        self.blobs.len()
    }
}

impl BlobStore for BlobRegistry {
    fn create_object_url(&mut self, content: &str, mime_type: &str) -> String {
        let url = format!("{}{}", BLOB_URL_PREFIX, Uuid::new_v4());
        self.blobs.insert(
            url.clone(),
            Blob {
                mime_type: mime_type.to_string(),
                content: content.to_string(),
            },
        );
        url
    }

    fn revoke_object_url(&mut self, url: &str) -> bool {
        self.blobs.remove(url).is_some()
    }
}
