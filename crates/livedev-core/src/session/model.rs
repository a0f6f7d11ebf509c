//! Session snapshot: everything a restart has to bring back.

use super::editor::EditorState;
use crate::chat::ChatMessage;
use crate::container::registry;
use crate::file_system::FileSystem;
use crate::template::TemplateRegistry;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default widths (percent) of the three main panels.
pub const DEFAULT_PANEL_SIZES: [f64; 3] = [20.0, 45.0, 35.0];
/// Default height (percent) of the preview within the right panel.
pub const DEFAULT_VERTICAL_SPLIT: f64 = 60.0;
pub const MIN_VERTICAL_SPLIT: f64 = 10.0;
pub const MAX_VERTICAL_SPLIT: f64 = 90.0;

/// Clamps a vertical split percentage into the allowed range.
pub fn clamp_vertical_split(value: f64) -> f64 {
    if value.is_nan() {
        DEFAULT_VERTICAL_SPLIT
    } else {
        value.clamp(MIN_VERTICAL_SPLIT, MAX_VERTICAL_SPLIT)
    }
}

/// Full persisted state of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub file_system: FileSystem,
    pub chat_history: Vec<ChatMessage>,
    pub panel_sizes: Vec<f64>,
    pub right_panel_vertical_split: f64,
    pub preview_root: Option<String>,
    pub open_files: Vec<String>,
    pub active_file: Option<String>,
}

impl SessionSnapshot {
    /// A brand-new session seeded from `templates`.
    pub fn initial(templates: &TemplateRegistry) -> Self {
        Self {
            file_system: templates.seed_file_system(),
            chat_history: vec![ChatMessage::welcome()],
            panel_sizes: DEFAULT_PANEL_SIZES.to_vec(),
            right_panel_vertical_split: DEFAULT_VERTICAL_SPLIT,
            preview_root: None,
            open_files: Vec::new(),
            active_file: None,
        }
    }

    /// Picks the state to start from given what storage returned.
    ///
    /// A missing snapshot, or one whose store is empty, yields the initial
    /// session. Anything else is kept, with the layout normalized.
    pub fn restore_or_initial(loaded: Option<Self>, templates: &TemplateRegistry) -> Self {
        match loaded {
            Some(snapshot) if !snapshot.file_system.is_empty() => snapshot.normalized(),
            _ => Self::initial(templates),
        }
    }

    /// Repairs layout values that fell out of range and rolls back
    /// container commands that were still running when the state was saved.
    pub fn normalized(mut self) -> Self {
        match registry::settle_interrupted(&self.file_system) {
            Ok((file_system, settled)) => {
                if !settled.is_empty() {
                    warn!("Rolled back interrupted commands of {:?}", settled);
                }
                self.file_system = file_system;
            }
            Err(e) => warn!("Failed to settle interrupted containers: {}", e),
        }
        if self.panel_sizes.len() != DEFAULT_PANEL_SIZES.len() {
            self.panel_sizes = DEFAULT_PANEL_SIZES.to_vec();
        }
        self.right_panel_vertical_split = clamp_vertical_split(self.right_panel_vertical_split);
        if self.chat_history.is_empty() {
            self.chat_history.push(ChatMessage::welcome());
        }
        self
    }

    pub fn editor(&self) -> EditorState {
        EditorState {
            open_files: self.open_files.clone(),
            active_file: self.active_file.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_session() {
        let snapshot = SessionSnapshot::initial(TemplateRegistry::builtin());
        assert!(snapshot.file_system.contains("/templates/react-vite/index.html"));
        assert_eq!(snapshot.chat_history.len(), 1);
        assert_eq!(snapshot.chat_history[0].id, "init");
        assert_eq!(snapshot.panel_sizes, vec![20.0, 45.0, 35.0]);
        assert_eq!(snapshot.right_panel_vertical_split, 60.0);
        assert!(snapshot.preview_root.is_none());
    }

    #[test]
    fn test_restore_falls_back_on_empty_store() {
        let registry = TemplateRegistry::builtin();
        let mut empty = SessionSnapshot::initial(registry);
        empty.file_system = FileSystem::new();
        empty.chat_history.clear();

        let restored = SessionSnapshot::restore_or_initial(Some(empty), registry);
        assert_eq!(restored, SessionSnapshot::initial(registry));
        let fresh = SessionSnapshot::restore_or_initial(None, registry);
        assert!(!fresh.file_system.is_empty());
    }

    #[test]
    fn test_restore_keeps_saved_state() {
        let registry = TemplateRegistry::builtin();
        let mut saved = SessionSnapshot::initial(registry);
        saved.file_system.set("/containers/c/index.html", "<p>hi</p>");
        saved.right_panel_vertical_split = 99.0;
        saved.preview_root = Some("/containers/c/".to_string());

        let restored = SessionSnapshot::restore_or_initial(Some(saved), registry);
        assert!(restored.file_system.contains("/containers/c/index.html"));
        assert_eq!(restored.right_panel_vertical_split, 90.0);
        assert_eq!(restored.preview_root.as_deref(), Some("/containers/c/"));
    }

    #[test]
    fn test_restore_rolls_back_running_command() {
        use crate::container::{ContainerStatus, CreateContainerOptions};

        let templates = TemplateRegistry::builtin();
        let mut saved = SessionSnapshot::initial(templates);
        let (fs, mut container) = registry::create(
            &CreateContainerOptions::new("todo app", "react-vite"),
            &saved.file_system,
            templates,
        )
        .unwrap();
        container.status = ContainerStatus::Installing;
        saved.file_system = registry::write_metadata(&container, &fs).unwrap();

        let restored = SessionSnapshot::restore_or_initial(Some(saved), templates);
        let record = registry::read_metadata(&container.id, &restored.file_system)
            .unwrap()
            .unwrap();
        assert_eq!(record.status, ContainerStatus::Initialized);
    }

    #[test]
    fn test_clamp_vertical_split() {
        assert_eq!(clamp_vertical_split(5.0), 10.0);
        assert_eq!(clamp_vertical_split(42.0), 42.0);
        assert_eq!(clamp_vertical_split(f64::NAN), 60.0);
    }

    #[test]
    fn test_snapshot_json_shape() {
        let json = serde_json::to_value(SessionSnapshot::initial(TemplateRegistry::builtin()))
            .unwrap();
        for key in [
            "fileSystem",
            "chatHistory",
            "panelSizes",
            "rightPanelVerticalSplit",
            "previewRoot",
            "openFiles",
            "activeFile",
        ] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
    }
}
