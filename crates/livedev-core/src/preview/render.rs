//! Static preview rendering.
//!
//! Turns a container's `index.html` into a self-contained document: local
//! `href`/`src` references are swapped for object URLs and a live-reload
//! marker script is injected into `<head>`.

use super::blob::BlobStore;
use crate::file_system::FileSystem;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

/// Sandbox attribute applied to the preview surface. Top-level navigation is not allowed.
pub const SANDBOX_POLICY: &str = "allow-scripts allow-same-origin allow-popups allow-forms";

/// Marker script injected before `</head>`.
pub const LIVE_RELOAD_SCRIPT: &str = r#"
document.addEventListener('DOMContentLoaded', () => {
    if (window.frameElement) {
        console.log("Live edit script loaded.");
    }
});
"#;

const ENTRY_FILE: &str = "index.html";
const EXTERNAL_PREFIXES: [&str; 3] = ["http://", "https://", "data:"];

static ASSET_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(href|src)=["']([^"']+)["']"#).expect("asset reference pattern is valid")
});

/// What a render produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewStatus {
    /// No preview root is selected.
    Idle,
    /// The root has no `index.html`.
    MissingEntry,
    Rendered,
}

/// Document handed to the sandboxed preview surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewDocument {
    pub html: String,
    pub status: PreviewStatus,
    /// Object URLs created for this render, to be revoked once superseded.
    pub object_urls: Vec<String>,
}

impl PreviewDocument {
    pub fn sandbox_policy(&self) -> &'static str {
        SANDBOX_POLICY
    }
}

/// Renders the preview for `root` (a container path ending in `/`).
pub fn render_preview(
    fs: &FileSystem,
    root: Option<&str>,
    blobs: &mut dyn BlobStore,
) -> PreviewDocument {
    let Some(root) = root else {
        return PreviewDocument {
            html: idle_document(),
            status: PreviewStatus::Idle,
            object_urls: Vec::new(),
        };
    };

    let entry = format!("{}{}", root, ENTRY_FILE);
    let Some(html) = fs.get(&entry) else {
        return PreviewDocument {
            html: missing_entry_document(root),
            status: PreviewStatus::MissingEntry,
            object_urls: Vec::new(),
        };
    };

    let mut object_urls = Vec::new();
    let rewritten = ASSET_REFERENCE.replace_all(html, |caps: &Captures| {
        let attr = &caps[1];
        let reference = &caps[2];

        if EXTERNAL_PREFIXES.iter().any(|p| reference.starts_with(p)) {
            return caps[0].to_string();
        }

        let resolved = resolve_reference(reference, root);
        match fs.get(&resolved) {
            Some(content) => {
                let url = blobs.create_object_url(content, mime_for_path(&resolved));
                object_urls.push(url.clone());
                format!("{}=\"{}\"", attr, url)
            }
            None => format!("{}=\"{}\"", attr, reference),
        }
    });

    let html = inject_live_reload(&rewritten);
    debug!("Rendered preview for {} with {} assets", root, object_urls.len());

    PreviewDocument {
        html,
        status: PreviewStatus::Rendered,
        object_urls,
    }
}

/// Resolves an asset reference against the preview root.
///
/// A leading `/` addresses the store directly; anything else is resolved
/// relative to `root` with `.` and `..` segments applied. Query strings and
/// fragments are dropped.
pub fn resolve_reference(reference: &str, root: &str) -> String {
    let reference = reference
        .split(['?', '#'])
        .next()
        .unwrap_or_default();

    if reference.starts_with('/') {
        return reference.to_string();
    }

    let mut segments: Vec<&str> = root.split('/').filter(|s| !s.is_empty()).collect();
    let trailing_slash = reference.ends_with('/') || reference.is_empty();
    for part in reference.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    let mut resolved = format!("/{}", segments.join("/"));
    if trailing_slash && !resolved.ends_with('/') {
        resolved.push('/');
    }
    resolved
}

/// MIME type used for an asset, by extension.
pub fn mime_for_path(path: &str) -> &'static str {
    let extension = path
        .rsplit('/')
        .next()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "css" => "text/css",
        "js" | "ts" | "tsx" | "mjs" => "application/javascript",
        "png" => "image/png",
        "jpg" => "image/jpg",
        "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg",
        "webp" => "image/webp",
        "ico" => "image/ico",
        _ => "text/plain",
    }
}

fn inject_live_reload(html: &str) -> String {
    let tag = format!("<script>{}</script>", LIVE_RELOAD_SCRIPT);
    match html.find("</head>") {
        Some(index) => {
            let mut out = String::with_capacity(html.len() + tag.len());
            out.push_str(&html[..index]);
            out.push_str(&tag);
            out.push_str(&html[index..]);
            out
        }
        None => html.to_string(),
    }
}

fn idle_document() -> String {
    r#"<div style="font-family: sans-serif; color: #555; text-align: center; padding: 2rem;">Select a container and press 'Start' to preview it here.</div>"#
        .to_string()
}

fn missing_entry_document(root: &str) -> String {
    format!(
        r#"<div style="font-family: sans-serif; color: #933; text-align: center; padding: 2rem;">Error: <strong>index.html</strong> not found in container '{}'.</div>"#,
        root
    )
}
