//! Built-in project templates.
//!
//! A template is a set of files stored under a template root such as
//! `/templates/react-vite`. Containers are scaffolded by copying one base
//! template, any number of UI templates and an optional datastore template.

use crate::file_system::FileSystem;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Store prefix that every template root lives under.
pub const TEMPLATES_ROOT: &str = "/templates/";

/// Category a template belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TemplateKind {
    Base,
    Ui,
    Datastore,
}

/// Descriptor of a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TemplateKind,
    /// Store path of the template root, without trailing slash.
    pub path: String,
    pub description: String,
}

impl Template {
    fn new(id: &str, name: &str, kind: TemplateKind, path: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            path: path.to_string(),
            description: description.to_string(),
        }
    }

    /// Root prefix of the template files, with trailing slash.
    pub fn root(&self) -> String {
        format!("{}/", self.path.trim_end_matches('/'))
    }
}

/// Catalog of templates plus the file contents that back them.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: Vec<Template>,
    files: FileSystem,
}

macro_rules! template_file {
    ($store:literal, $asset:literal) => {
        ($store, include_str!(concat!("../../templates/", $asset)))
    };
}

const BUILTIN_FILES: &[(&str, &str)] = &[
    template_file!("/templates/react-vite/package.json", "react-vite/package.json"),
    template_file!("/templates/react-vite/index.html", "react-vite/index.html"),
    template_file!("/templates/react-vite/vite.svg", "react-vite/vite.svg"),
    template_file!("/templates/react-vite/vite.config.ts", "react-vite/vite.config.ts"),
    template_file!("/templates/react-vite/tsconfig.json", "react-vite/tsconfig.json"),
    template_file!("/templates/react-vite/tsconfig.node.json", "react-vite/tsconfig.node.json"),
    template_file!("/templates/react-vite/src/main.tsx", "react-vite/src/main.tsx"),
    template_file!("/templates/react-vite/src/App.tsx", "react-vite/src/App.tsx"),
    template_file!("/templates/react-vite/src/index.css", "react-vite/src/index.css"),
    template_file!("/templates/tailwind-css/package.json", "tailwind-css/package.json"),
    template_file!("/templates/tailwind-css/tailwind.config.js", "tailwind-css/tailwind.config.js"),
    template_file!("/templates/tailwind-css/postcss.config.js", "tailwind-css/postcss.config.js"),
    template_file!("/templates/tailwind-css/src/index.css", "tailwind-css/src/index.css"),
    template_file!("/templates/tailwind-css/src/App.tsx", "tailwind-css/src/App.tsx"),
    template_file!("/templates/datastore/indexeddb/package.json", "datastore/indexeddb/package.json"),
    template_file!("/templates/datastore/indexeddb/src/lib/db.ts", "datastore/indexeddb/src/lib/db.ts"),
    template_file!("/templates/datastore/indexeddb/src/App.tsx", "datastore/indexeddb/src/App.tsx"),
];

static BUILTIN: Lazy<TemplateRegistry> = Lazy::new(|| {
    let templates = vec![
        Template::new(
            "react-vite",
            "React + Vite",
            TemplateKind::Base,
            "/templates/react-vite",
            "A modern React setup with Vite for lightning-fast development.",
        ),
        Template::new(
            "tailwind-css",
            "Tailwind CSS",
            TemplateKind::Ui,
            "/templates/tailwind-css",
            "A utility-first CSS framework for rapid UI development.",
        ),
        Template::new(
            "indexeddb",
            "IndexedDB",
            TemplateKind::Datastore,
            "/templates/datastore/indexeddb",
            "Browser-based key-value store for client-side data persistence.",
        ),
    ];
    TemplateRegistry::new(templates, BUILTIN_FILES.iter().copied().collect())
});

impl TemplateRegistry {
    pub fn new(templates: Vec<Template>, files: FileSystem) -> Self {
        Self { templates, files }
    }

    /// The registry compiled into the binary.
    pub fn builtin() -> &'static TemplateRegistry {
        &BUILTIN
    }

    pub fn all(&self) -> &[Template] {
        &self.templates
    }

    pub fn by_kind(&self, kind: TemplateKind) -> Vec<&Template> {
        self.templates.iter().filter(|t| t.kind == kind).collect()
    }

    pub fn find(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }

    /// Iterates over `(store path, content)` for every file of `template`.
    pub fn files_of<'a>(
        &'a self,
        template: &Template,
    ) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        let root = template.root();
        self.files
            .entries()
            .filter(move |(path, _)| path.starts_with(&root))
    }

    /// All template files, used to seed a fresh session store.
    pub fn seed_file_system(&self) -> FileSystem {
        self.files.clone()
    }
}
