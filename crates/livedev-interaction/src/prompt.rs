//! Prompt context rendering.
//!
//! The agent sees every non-template file of the store, sorted by path, plus
//! a sentence about what is being previewed.

use livedev_core::FileSystem;
use livedev_core::error::{Result, SandboxError};
use livedev_core::template::TEMPLATES_ROOT;
use minijinja::{Environment, context};
use once_cell::sync::Lazy;
use serde::Serialize;

const CONTEXT_TEMPLATE_NAME: &str = "file_context";

const CONTEXT_TEMPLATE: &str = r#"Here is the current state of all files in the user's containers. Use this as context for the user's request.
{{ preview_context }}
{% for file in files %}
---
File: {{ file.path }}
```{{ file.language }}
{{ file.content }}
```
{% endfor %}
---
"#;

const SYSTEM_INSTRUCTION_TEMPLATE_NAME: &str = "system_instruction";

const SYSTEM_INSTRUCTION_TEMPLATE: &str = r#"You are an expert AI system operator and a helpful guide for a web development sandbox. Your primary goal is to help the user build web applications using a container-based system.

The user can:
1. Create a container from a base template, optional UI libraries and an optional datastore. Containers live under '/containers/'.
2. Run the simulated commands {{ commands | join(", ") }} within a container.
3. Start a container to show it in the live preview.

When the user asks for a code change, reply with a JSON object with a short 'text', a markdown 'explanation' and, when files change, a 'code' array of full-file {path, content} objects inside the relevant /containers/<id>/ folder.

{{ context }}"#;

static TEMPLATES: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    env.add_template(CONTEXT_TEMPLATE_NAME, CONTEXT_TEMPLATE)
        .expect("file context template is valid");
    env.add_template(SYSTEM_INSTRUCTION_TEMPLATE_NAME, SYSTEM_INSTRUCTION_TEMPLATE)
        .expect("system instruction template is valid");
    env
});

#[derive(Debug, Serialize)]
struct FileBlock<'a> {
    path: &'a str,
    language: &'a str,
    content: &'a str,
}

fn language_of(path: &str) -> &str {
    path.rsplit('/')
        .next()
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext)
        .unwrap_or_default()
}

fn render_error(err: minijinja::Error) -> SandboxError {
    SandboxError::internal(format!("Failed to render prompt: {}", err))
}

/// Sentence describing the current preview state.
pub fn preview_context(preview_root: Option<&str>) -> String {
    match preview_root {
        Some(root) => format!(
            "The user is currently previewing the project from the \"{}\" container directory.",
            root
        ),
        None => "The user is not currently previewing any container.".to_string(),
    }
}

/// Renders the file dump sent to agents as context.
pub fn format_file_context(fs: &FileSystem, preview_root: Option<&str>) -> Result<String> {
    let files: Vec<FileBlock<'_>> = fs
        .entries()
        .filter(|(path, _)| !path.starts_with(TEMPLATES_ROOT))
        .map(|(path, content)| FileBlock {
            path,
            language: language_of(path),
            content,
        })
        .collect();

    TEMPLATES
        .get_template(CONTEXT_TEMPLATE_NAME)
        .and_then(|t| {
            t.render(context! {
                preview_context => preview_context(preview_root),
                files => files,
            })
        })
        .map_err(render_error)
}

/// Full system instruction for a chat agent, embedding the file context.
pub fn system_instruction(fs: &FileSystem, preview_root: Option<&str>) -> Result<String> {
    let file_context = format_file_context(fs, preview_root)?;
    TEMPLATES
        .get_template(SYSTEM_INSTRUCTION_TEMPLATE_NAME)
        .and_then(|t| {
            t.render(context! {
                commands => vec!["install", "build", "start"],
                context => file_context,
            })
        })
        .map_err(render_error)
}
