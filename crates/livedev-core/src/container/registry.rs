//! Container registry: scanning, scaffolding and removal.
//!
//! All functions here are pure with respect to the store: they take a
//! `&FileSystem` and hand back a new one.

use super::model::{
    ChosenTemplates, Container, ContainerStatus, CreateContainerOptions, HistoryAction,
    HistoryEntry, SYSTEM_OPERATOR, now_iso,
};
use crate::error::{Result, SandboxError};
use crate::file_system::FileSystem;
use crate::template::TemplateRegistry;
use serde_json::{Map, Value, json};
use tracing::{info, warn};
use uuid::Uuid;

/// Store prefix under which every container root lives.
pub const CONTAINERS_ROOT: &str = "/containers/";
/// File name of the embedded container record.
pub const METADATA_FILE: &str = "handover.json";
const MANIFEST_FILE: &str = "package.json";

/// Root prefix for the container `id`.
pub fn root_for(id: &str) -> String {
    format!("{}{}/", CONTAINERS_ROOT, id)
}

/// Parses every metadata file in `fs` into container records.
///
/// Unparsable records are logged and skipped. The result is ordered by
/// creation time, newest first.
pub fn scan(fs: &FileSystem) -> Vec<Container> {
    let suffix = format!("/{}", METADATA_FILE);
    let mut containers: Vec<Container> = fs
        .entries()
        .filter(|(path, _)| path.ends_with(&suffix))
        .filter_map(|(path, content)| match serde_json::from_str::<Container>(content) {
            Ok(container) => Some(container),
            Err(e) => {
                warn!("Skipping unreadable container metadata at {}: {}", path, e);
                None
            }
        })
        .collect();

    containers.sort_by(|a, b| b.created_at_utc().cmp(&a.created_at_utc()));
    containers
}

/// Scaffolds a new container from the chosen templates.
///
/// Returns the updated store and the new record. `fs` itself is untouched.
pub fn create(
    options: &CreateContainerOptions,
    fs: &FileSystem,
    templates: &TemplateRegistry,
) -> Result<(FileSystem, Container)> {
    if options.base.trim().is_empty() {
        return Err(SandboxError::invalid_input(
            "a base template is required to create a container",
        ));
    }

    let id = fresh_id(fs);
    let root = root_for(&id);
    let chosen = ChosenTemplates {
        base: options.base.clone(),
        ui: options.ui.clone(),
        datastore: options.datastore.clone(),
    };

    let mut next = fs.clone();
    let mut manifest = Value::Object(Map::new());

    for template_id in chosen.ordered_ids() {
        let Some(template) = templates.find(template_id) else {
            warn!("Unknown template '{}' skipped while creating {}", template_id, id);
            continue;
        };
        let template_root = template.root();

        for (path, content) in templates.files_of(template) {
            let relative = &path[template_root.len()..];
            if relative == MANIFEST_FILE {
                match serde_json::from_str::<Value>(content) {
                    Ok(fragment) => deep_merge(&mut manifest, fragment),
                    Err(e) => warn!("Invalid {} in template '{}': {}", MANIFEST_FILE, template.id, e),
                }
            } else {
                next.set(format!("{}{}", root, relative), content);
            }
        }
    }

    next.set(
        format!("{}{}", root, MANIFEST_FILE),
        serde_json::to_string_pretty(&manifest)?,
    );

    let mut details = Map::new();
    details.insert("prompt".to_string(), json!(options.prompt));
    details.insert("templates".to_string(), json!(chosen.ordered_ids()));

    let env = options
        .env
        .iter()
        .filter(|(_, v)| !v.trim().is_empty())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect::<std::collections::BTreeMap<_, _>>();

    let container = Container {
        id: id.clone(),
        operator: SYSTEM_OPERATOR.to_string(),
        prompt: options.prompt.clone(),
        status: ContainerStatus::Initialized,
        created_at: now_iso(),
        path: root,
        chosen_templates: chosen,
        history: vec![HistoryEntry::new(HistoryAction::Create, details)],
        env: if env.is_empty() { None } else { Some(env) },
    };

    let next = write_metadata(&container, &next)?;
    info!("Created container {} from {:?}", id, container.chosen_templates.ordered_ids());
    Ok((next, container))
}

/// Returns a copy of `fs` without any entry of the container `id`.
pub fn remove(id: &str, fs: &FileSystem) -> FileSystem {
    let mut next = fs.clone();
    let removed = next.remove_prefix(&root_for(id));
    info!("Removed container {} ({} files)", id, removed);
    next
}

/// Returns a copy of `fs` with the record of `container` rewritten.
pub fn write_metadata(container: &Container, fs: &FileSystem) -> Result<FileSystem> {
    let mut next = fs.clone();
    next.set(
        container.metadata_path(),
        serde_json::to_string_pretty(container)?,
    );
    Ok(next)
}

/// Rolls back every container whose last command never finished.
///
/// Returns the repaired store and the ids of the containers that changed.
pub fn settle_interrupted(fs: &FileSystem) -> Result<(FileSystem, Vec<String>)> {
    let mut next = fs.clone();
    let mut settled = Vec::new();
    for mut container in scan(fs) {
        if container.settle_interrupted() {
            next = write_metadata(&container, &next)?;
            settled.push(container.id);
        }
    }
    Ok((next, settled))
}

/// Reads the record of container `id` from `fs`.
pub fn read_metadata(id: &str, fs: &FileSystem) -> Result<Option<Container>> {
    let path = format!("{}{}", root_for(id), METADATA_FILE);
    fs.get(&path)
        .map(|content| serde_json::from_str::<Container>(content).map_err(SandboxError::from))
        .transpose()
}

/// Recursively merges `source` into `target`.
///
/// Objects merge key by key; any other value in `source` replaces the one in
/// `target`.
pub fn deep_merge(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target), Value::Object(source)) => {
            for (key, value) in source {
                match target.get_mut(&key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        deep_merge(existing, value)
                    }
                    _ => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, source) => *target = source,
    }
}

fn fresh_id(fs: &FileSystem) -> String {
    loop {
        let uuid = Uuid::new_v4().simple().to_string();
        let id = format!("cntr_{}", &uuid[..8]);
        if fs.keys_with_prefix(&root_for(&id)).is_empty() {
            return id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> FileSystem {
        TemplateRegistry::builtin().seed_file_system()
    }

    #[test]
    fn test_create_places_every_file_under_root() {
        let fs = seeded();
        let options = CreateContainerOptions::new("todo app", "react-vite");
        let (next, container) = create(&options, &fs, TemplateRegistry::builtin()).unwrap();

        assert!(container.id.starts_with("cntr_"));
        assert_eq!(container.id.len(), "cntr_".len() + 8);
        assert_eq!(container.path, format!("/containers/{}/", container.id));
        assert_eq!(container.status, ContainerStatus::Initialized);

        let created: Vec<String> = next
            .paths()
            .filter(|p| !fs.contains(p))
            .map(str::to_string)
            .collect();
        assert!(!created.is_empty());
        assert!(created.iter().all(|p| p.starts_with(&container.path)));

        for file in ["package.json", "index.html", "src/main.tsx", "handover.json"] {
            assert!(
                next.contains(&format!("{}{}", container.path, file)),
                "missing {}",
                file
            );
        }

        // input store untouched
        assert_eq!(fs, seeded());
    }

    #[test]
    fn test_create_records_history_and_metadata() {
        let options = CreateContainerOptions::new("todo app", "react-vite")
            .with_ui("tailwind-css")
            .with_datastore("indexeddb");
        let (next, container) =
            create(&options, &FileSystem::new(), TemplateRegistry::builtin()).unwrap();

        assert_eq!(container.history.len(), 1);
        let entry = &container.history[0];
        assert_eq!(entry.action, HistoryAction::Create);
        assert_eq!(entry.by, SYSTEM_OPERATOR);
        assert_eq!(entry.detail_str("prompt"), Some("todo app"));
        assert_eq!(
            entry.details["templates"],
            json!(["react-vite", "tailwind-css", "indexeddb"])
        );

        let parsed = read_metadata(&container.id, &next).unwrap().unwrap();
        assert_eq!(parsed.chosen_templates, container.chosen_templates);
        assert_eq!(parsed.env, None);
    }

    #[test]
    fn test_create_merges_manifests_and_layers_files() {
        let options = CreateContainerOptions::new("styled", "react-vite").with_ui("tailwind-css");
        let (next, container) =
            create(&options, &FileSystem::new(), TemplateRegistry::builtin()).unwrap();

        let manifest: Value = serde_json::from_str(
            next.get(&format!("{}package.json", container.path)).unwrap(),
        )
        .unwrap();
        assert_eq!(manifest["name"], "react-vite-app");
        assert_eq!(manifest["dependencies"]["react"], "^18.2.0");
        assert_eq!(manifest["devDependencies"]["vite"], "^4.4.5");
        assert_eq!(manifest["devDependencies"]["tailwindcss"], "^3.3.3");

        let css = next.get(&format!("{}src/index.css", container.path)).unwrap();
        assert!(css.starts_with("@tailwind base;"));
        assert!(next.contains(&format!("{}tailwind.config.js", container.path)));
    }

    #[test]
    fn test_settle_interrupted_rewrites_transient_records() {
        let options = CreateContainerOptions::new("todo app", "react-vite");
        let (fs, idle) = create(&options, &FileSystem::new(), TemplateRegistry::builtin()).unwrap();
        let (fs, mut busy) = create(&options, &fs, TemplateRegistry::builtin()).unwrap();
        busy.status = ContainerStatus::Installing;
        let fs = write_metadata(&busy, &fs).unwrap();

        let (settled_fs, settled) = settle_interrupted(&fs).unwrap();
        assert_eq!(settled, vec![busy.id.clone()]);
        assert_eq!(
            read_metadata(&busy.id, &settled_fs).unwrap().unwrap().status,
            ContainerStatus::Initialized
        );
        assert_eq!(read_metadata(&idle.id, &settled_fs).unwrap().unwrap(), idle);

        let (_, again) = settle_interrupted(&settled_fs).unwrap();
        assert!(again.is_empty());
    }

    #[test]
    fn test_create_skips_unknown_templates() {
        let options = CreateContainerOptions::new("x", "react-vite").with_ui("bootstrap");
        let (_, container) =
            create(&options, &FileSystem::new(), TemplateRegistry::builtin()).unwrap();
        assert_eq!(container.chosen_templates.ui, vec!["bootstrap".to_string()]);
    }

    #[test]
    fn test_create_requires_base() {
        let options = CreateContainerOptions::new("x", "");
        let err = create(&options, &FileSystem::new(), TemplateRegistry::builtin()).unwrap_err();
        assert!(matches!(err, SandboxError::InvalidInput(_)));
    }

    #[test]
    fn test_create_stores_env_when_present() {
        let options = CreateContainerOptions::new("api", "react-vite")
            .with_env("API_NAME", "weather")
            .with_env("API_KEY", "k-1");
        let (_, container) =
            create(&options, &FileSystem::new(), TemplateRegistry::builtin()).unwrap();
        let env = container.env.unwrap();
        assert_eq!(env["API_NAME"], "weather");
        assert_eq!(env["API_KEY"], "k-1");
    }

    #[test]
    fn test_scan_skips_broken_and_sorts_newest_first() {
        let registry = TemplateRegistry::builtin();
        let (fs, mut older) =
            create(&CreateContainerOptions::new("a", "react-vite"), &FileSystem::new(), registry)
                .unwrap();
        older.created_at = "2024-01-01T00:00:00.000Z".to_string();
        let fs = write_metadata(&older, &fs).unwrap();

        let (mut fs, newer) =
            create(&CreateContainerOptions::new("b", "react-vite"), &fs, registry).unwrap();
        fs.set("/containers/cntr_broken/handover.json", "{not json");

        let found = scan(&fs);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].id, newer.id);
        assert_eq!(found[1].id, older.id);
        assert_eq!(scan(&fs), found);
    }

    #[test]
    fn test_remove_deletes_exactly_the_prefix() {
        let registry = TemplateRegistry::builtin();
        let base = seeded();
        let (fs, a) =
            create(&CreateContainerOptions::new("a", "react-vite"), &base, registry).unwrap();
        let (fs, b) = create(&CreateContainerOptions::new("b", "react-vite"), &fs, registry).unwrap();

        let after = remove(&a.id, &fs);
        assert!(after.keys_with_prefix(&a.path).is_empty());
        assert_eq!(
            after.keys_with_prefix(&b.path),
            fs.keys_with_prefix(&b.path)
        );
        assert_eq!(after.len(), fs.len() - fs.keys_with_prefix(&a.path).len());
    }

    #[test]
    fn test_deep_merge() {
        let mut target = json!({"a": {"x": 1, "y": [1, 2]}, "b": 1});
        deep_merge(&mut target, json!({"a": {"y": [3], "z": true}, "b": {"n": 1}}));
        assert_eq!(target, json!({"a": {"x": 1, "y": [3], "z": true}, "b": {"n": 1}}));
    }
}
