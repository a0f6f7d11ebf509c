//! Preview rendering of a container's static files.

mod blob;
mod render;

pub use blob::{BLOB_URL_PREFIX, Blob, BlobRegistry, BlobStore};
pub use render::{
    LIVE_RELOAD_SCRIPT, PreviewDocument, PreviewStatus, SANDBOX_POLICY, mime_for_path,
    render_preview, resolve_reference,
};
