//! Session snapshot DTOs and migrations.
//!
//! ## Version History
//! - **1.0.0**: Chat entries may lack an `id`; no vertical split. Snapshots
//!   written before versioning existed carry no `version` key and are read
//!   as 1.0.0.
//! - **2.0.0**: Every chat entry has an `id`; adds `rightPanelVerticalSplit`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;
use version_migrate::{FromDomain, IntoDomain, MigratesTo, Versioned};

use livedev_core::chat::{ChatMessage, CodeEdit, MessageRole};
use livedev_core::session::{DEFAULT_PANEL_SIZES, DEFAULT_VERTICAL_SPLIT, SessionSnapshot};

/// Entity name the snapshot migration path is registered under.
pub const SNAPSHOT_ENTITY: &str = "session_snapshot";
/// Versions the migrator knows how to read.
pub const SUPPORTED_SNAPSHOT_VERSIONS: [&str; 2] = ["1.0.0", "2.0.0"];
/// Version assumed for payloads without a `version` key.
pub const LEGACY_SNAPSHOT_VERSION: &str = "1.0.0";

fn default_panel_sizes() -> Vec<f64> {
    DEFAULT_PANEL_SIZES.to_vec()
}

fn default_vertical_split() -> f64 {
    DEFAULT_VERTICAL_SPLIT
}

// ============================================================================
// Chat entry DTOs
// ============================================================================

/// Chat entry V1.0.0 (id optional)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatEntryV1_0_0 {
    #[serde(default)]
    pub id: Option<String>,
    pub role: MessageRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<Vec<CodeEdit>>,
}

/// Chat entry V2.0.0
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatEntryV2_0_0 {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<Vec<CodeEdit>>,
}

impl From<ChatEntryV1_0_0> for ChatEntryV2_0_0 {
    fn from(entry: ChatEntryV1_0_0) -> Self {
        ChatEntryV2_0_0 {
            id: entry
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            role: entry.role,
            content: entry.content,
            explanation: entry.explanation,
            code: entry.code,
        }
    }
}

impl From<ChatEntryV2_0_0> for ChatMessage {
    fn from(dto: ChatEntryV2_0_0) -> Self {
        ChatMessage {
            id: dto.id,
            role: dto.role,
            content: dto.content,
            explanation: dto.explanation,
            code: dto.code,
        }
    }
}

impl From<&ChatMessage> for ChatEntryV2_0_0 {
    fn from(message: &ChatMessage) -> Self {
        ChatEntryV2_0_0 {
            id: message.id.clone(),
            role: message.role,
            content: message.content.clone(),
            explanation: message.explanation.clone(),
            code: message.code.clone(),
        }
    }
}

// ============================================================================
// Snapshot DTOs
// ============================================================================

/// Session snapshot V1.0.0
#[derive(Debug, Clone, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshotV1_0_0 {
    #[serde(default)]
    pub file_system: BTreeMap<String, String>,
    #[serde(default)]
    pub chat_history: Vec<ChatEntryV1_0_0>,
    #[serde(default = "default_panel_sizes")]
    pub panel_sizes: Vec<f64>,
    #[serde(default)]
    pub preview_root: Option<String>,
    #[serde(default)]
    pub open_files: Vec<String>,
    #[serde(default)]
    pub active_file: Option<String>,
}

/// Session snapshot V2.0.0
#[derive(Debug, Clone, Serialize, Deserialize, Versioned)]
#[versioned(version = "2.0.0")]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshotV2_0_0 {
    #[serde(default)]
    pub file_system: BTreeMap<String, String>,
    #[serde(default)]
    pub chat_history: Vec<ChatEntryV2_0_0>,
    #[serde(default = "default_panel_sizes")]
    pub panel_sizes: Vec<f64>,
    #[serde(default = "default_vertical_split")]
    pub right_panel_vertical_split: f64,
    #[serde(default)]
    pub preview_root: Option<String>,
    #[serde(default)]
    pub open_files: Vec<String>,
    #[serde(default)]
    pub active_file: Option<String>,
}

/// Type alias for the latest snapshot version.
pub type SessionSnapshotDTO = SessionSnapshotV2_0_0;

// ============================================================================
// Migration implementations
// ============================================================================

/// Migration from V1.0.0 to V2.0.0.
/// Gives every id-less chat entry a fresh UUID and adds the default vertical split.
impl MigratesTo<SessionSnapshotV2_0_0> for SessionSnapshotV1_0_0 {
    fn migrate(self) -> SessionSnapshotV2_0_0 {
        SessionSnapshotV2_0_0 {
            file_system: self.file_system,
            chat_history: self.chat_history.into_iter().map(Into::into).collect(),
            panel_sizes: self.panel_sizes,
            right_panel_vertical_split: DEFAULT_VERTICAL_SPLIT,
            preview_root: self.preview_root,
            open_files: self.open_files,
            active_file: self.active_file,
        }
    }
}

// ============================================================================
// Domain model conversions
// ============================================================================

impl IntoDomain<SessionSnapshot> for SessionSnapshotV2_0_0 {
    fn into_domain(self) -> SessionSnapshot {
        SessionSnapshot {
            file_system: self.file_system.into_iter().collect(),
            chat_history: self.chat_history.into_iter().map(Into::into).collect(),
            panel_sizes: self.panel_sizes,
            right_panel_vertical_split: self.right_panel_vertical_split,
            preview_root: self.preview_root,
            open_files: self.open_files,
            active_file: self.active_file,
        }
    }
}

impl FromDomain<SessionSnapshot> for SessionSnapshotV2_0_0 {
    fn from_domain(snapshot: SessionSnapshot) -> Self {
        SessionSnapshotV2_0_0 {
            file_system: snapshot
                .file_system
                .entries()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            chat_history: snapshot.chat_history.iter().map(Into::into).collect(),
            panel_sizes: snapshot.panel_sizes,
            right_panel_vertical_split: snapshot.right_panel_vertical_split,
            preview_root: snapshot.preview_root,
            open_files: snapshot.open_files,
            active_file: snapshot.active_file,
        }
    }
}

// ============================================================================
// Migrator factory
// ============================================================================

/// Creates and configures a Migrator for session snapshots.
///
/// # Migration Path
///
/// - V1.0.0 → V2.0.0: Synthesizes chat ids, adds `rightPanelVerticalSplit` (60)
/// - V2.0.0 → SessionSnapshot: Converts DTO to domain model
pub fn create_snapshot_migrator() -> version_migrate::Migrator {
    let mut migrator = version_migrate::Migrator::builder().build();

    let snapshot_path = version_migrate::Migrator::define(SNAPSHOT_ENTITY)
        .from::<SessionSnapshotV1_0_0>()
        .step::<SessionSnapshotV2_0_0>()
        .into_with_save::<SessionSnapshot>();

    migrator
        .register(snapshot_path)
        .expect("Failed to register session_snapshot migration path");

    migrator
}
