//! Container domain models.
//!
//! A container's record lives inside the store as `<root>handover.json` and
//! serializes with camelCase keys.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use strum_macros::{Display, EnumString};

/// Operator name recorded on every automated history entry.
pub const SYSTEM_OPERATOR: &str = "system_operator";
/// History status of a command cut short by a restart.
pub const INTERRUPTED: &str = "interrupted";

/// Lifecycle state of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ContainerStatus {
    Initialized,
    Installing,
    Installed,
    Building,
    Built,
    Running,
    Error,
}

impl ContainerStatus {
    /// True while a simulated command is in flight.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Installing | Self::Building)
    }

    /// Status a command in flight started from; settled statuses map to themselves.
    pub fn settled(&self) -> Self {
        match self {
            Self::Installing => Self::Initialized,
            Self::Building => Self::Installed,
            other => *other,
        }
    }
}

/// Templates a container was scaffolded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChosenTemplates {
    pub base: String,
    #[serde(default)]
    pub ui: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datastore: Option<String>,
}

impl ChosenTemplates {
    /// Template ids in application order: base, UI layers, datastore.
    pub fn ordered_ids(&self) -> Vec<&str> {
        let mut ids = vec![self.base.as_str()];
        ids.extend(self.ui.iter().map(String::as_str));
        if let Some(datastore) = &self.datastore {
            ids.push(datastore.as_str());
        }
        ids
    }
}

/// Kind of a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum HistoryAction {
    Create,
    Command,
    FeatureAdd,
    Debug,
}

/// Append-only audit entry of a container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub action: HistoryAction,
    pub by: String,
    /// ISO-8601 timestamp
    pub at: String,
    #[serde(default)]
    pub details: Map<String, Value>,
}

impl HistoryEntry {
    pub fn new(action: HistoryAction, details: Map<String, Value>) -> Self {
        Self {
            action,
            by: SYSTEM_OPERATOR.to_string(),
            at: now_iso(),
            details,
        }
    }

    /// Reads a string field of `details`.
    pub fn detail_str(&self, key: &str) -> Option<&str> {
        self.details.get(key).and_then(Value::as_str)
    }
}

/// Persisted record of a container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    pub id: String,
    pub operator: String,
    pub prompt: String,
    pub status: ContainerStatus,
    /// ISO-8601 creation timestamp
    pub created_at: String,
    /// Root prefix, `/containers/<id>/`
    pub path: String,
    pub chosen_templates: ChosenTemplates,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<BTreeMap<String, String>>,
}

impl Container {
    /// Store path of this container's metadata file.
    pub fn metadata_path(&self) -> String {
        format!("{}{}", self.path, super::METADATA_FILE)
    }

    /// Parsed creation time; unparsable timestamps sort as the oldest.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.created_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Rolls back a command that never finished.
    ///
    /// A transient status returns to the status the command started from and
    /// pending command entries are marked [`INTERRUPTED`]. Returns whether
    /// anything changed.
    pub fn settle_interrupted(&mut self) -> bool {
        let mut changed = false;
        if self.status.is_transient() {
            self.status = self.status.settled();
            changed = true;
        }
        for entry in self.history.iter_mut().filter(|entry| {
            entry.action == HistoryAction::Command && entry.detail_str("status") == Some("pending")
        }) {
            entry
                .details
                .insert("status".to_string(), Value::String(INTERRUPTED.to_string()));
            changed = true;
        }
        changed
    }

    /// A copy safe to print: the environment is replaced by [`Container::masked_env`].
    pub fn redacted(&self) -> Self {
        let mut shown = self.clone();
        if shown.env.is_some() {
            shown.env = Some(self.masked_env());
        }
        shown
    }

    /// Environment with secret-looking values masked, for display.
    pub fn masked_env(&self) -> BTreeMap<String, String> {
        self.env
            .iter()
            .flatten()
            .map(|(k, v)| {
                let shown = if k.contains("KEY") || k.contains("SECRET") {
                    "*".repeat(v.chars().count().min(8))
                } else {
                    v.clone()
                };
                (k.clone(), shown)
            })
            .collect()
    }
}

/// Options accepted by container creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateContainerOptions {
    pub prompt: String,
    pub base: String,
    #[serde(default)]
    pub ui: Vec<String>,
    #[serde(default)]
    pub datastore: Option<String>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl CreateContainerOptions {
    pub fn new(prompt: impl Into<String>, base: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            base: base.into(),
            ..Default::default()
        }
    }

    pub fn with_ui(mut self, ui: impl Into<String>) -> Self {
        self.ui.push(ui.into());
        self
    }

    pub fn with_datastore(mut self, datastore: impl Into<String>) -> Self {
        self.datastore = Some(datastore.into());
        self
    }

    /// Adds an environment variable; empty values are ignored.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.trim().is_empty() {
            self.env.insert(key.into(), value);
        }
        self
    }
}

pub(crate) fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&ContainerStatus::Installing).unwrap();
        assert_eq!(json, "\"installing\"");
        assert_eq!(ContainerStatus::Built.to_string(), "built");
        assert!(ContainerStatus::Building.is_transient());
        assert!(!ContainerStatus::Running.is_transient());
    }

    #[test]
    fn test_settle_interrupted_command() {
        let mut details = Map::new();
        details.insert("command".to_string(), Value::String("build".to_string()));
        details.insert("status".to_string(), Value::String("pending".to_string()));
        let mut container = Container {
            id: "c".to_string(),
            operator: SYSTEM_OPERATOR.to_string(),
            prompt: String::new(),
            status: ContainerStatus::Building,
            created_at: now_iso(),
            path: "/containers/c/".to_string(),
            chosen_templates: ChosenTemplates {
                base: "react-vite".to_string(),
                ui: vec![],
                datastore: None,
            },
            history: vec![HistoryEntry::new(HistoryAction::Command, details)],
            env: None,
        };

        assert!(container.settle_interrupted());
        assert_eq!(container.status, ContainerStatus::Installed);
        assert_eq!(container.history[0].detail_str("status"), Some(INTERRUPTED));
        assert!(!container.settle_interrupted());

        assert_eq!(ContainerStatus::Installing.settled(), ContainerStatus::Initialized);
        assert_eq!(ContainerStatus::Running.settled(), ContainerStatus::Running);
    }

    #[test]
    fn test_history_action_kebab_case() {
        let json = serde_json::to_string(&HistoryAction::FeatureAdd).unwrap();
        assert_eq!(json, "\"feature-add\"");
    }

    #[test]
    fn test_container_camel_case_fields() {
        let container = Container {
            id: "cntr_abcd1234".to_string(),
            operator: SYSTEM_OPERATOR.to_string(),
            prompt: "todo app".to_string(),
            status: ContainerStatus::Initialized,
            created_at: now_iso(),
            path: "/containers/cntr_abcd1234/".to_string(),
            chosen_templates: ChosenTemplates {
                base: "react-vite".to_string(),
                ui: vec![],
                datastore: None,
            },
            history: vec![],
            env: None,
        };

        let json = serde_json::to_value(&container).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("chosenTemplates").is_some());
        assert!(json.get("env").is_none());
        assert_eq!(
            container.metadata_path(),
            "/containers/cntr_abcd1234/handover.json"
        );
        assert!(container.created_at_utc().is_some());
    }

    #[test]
    fn test_ordered_ids() {
        let chosen = ChosenTemplates {
            base: "react-vite".to_string(),
            ui: vec!["tailwind-css".to_string()],
            datastore: Some("indexeddb".to_string()),
        };
        assert_eq!(
            chosen.ordered_ids(),
            vec!["react-vite", "tailwind-css", "indexeddb"]
        );
    }

    #[test]
    fn test_with_env_skips_blank_values() {
        let options = CreateContainerOptions::new("p", "react-vite")
            .with_env("API_NAME", "")
            .with_env("API_KEY", "sk-123");
        assert_eq!(options.env.len(), 1);
        assert_eq!(options.env.get("API_KEY").map(String::as_str), Some("sk-123"));
    }

    #[test]
    fn test_masked_env() {
        let mut env = BTreeMap::new();
        env.insert("API_NAME".to_string(), "weather".to_string());
        env.insert("API_KEY".to_string(), "secret-value-123".to_string());
        let container = Container {
            id: "c".to_string(),
            operator: SYSTEM_OPERATOR.to_string(),
            prompt: String::new(),
            status: ContainerStatus::Initialized,
            created_at: now_iso(),
            path: "/containers/c/".to_string(),
            chosen_templates: ChosenTemplates {
                base: "react-vite".to_string(),
                ui: vec![],
                datastore: None,
            },
            history: vec![],
            env: Some(env),
        };
        let masked = container.masked_env();
        assert_eq!(masked["API_NAME"], "weather");
        assert_eq!(masked["API_KEY"], "********");

        let json = serde_json::to_string(&container.redacted()).unwrap();
        assert!(!json.contains("secret-value-123"));
        assert!(json.contains("weather"));
    }
}
