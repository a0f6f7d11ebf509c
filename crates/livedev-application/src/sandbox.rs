//! Sandbox session use case.
//!
//! `SandboxSession` owns the live state of one sandbox (store, transcript,
//! editor tabs, layout and preview root) and implements every user-facing
//! operation on it. Each mutation re-renders the preview and schedules an
//! autosave, both debounced.

use crate::autosave::PersistenceGateway;
use crate::preview_controller::LivePreview;
use livedev_core::FileSystem;
use livedev_core::chat::{AgentRequest, ChatAgent, ChatMessage, PlanAgent};
use livedev_core::config::SandboxConfig;
use livedev_core::container::{
    Command, Container, ContainerRepository, ContainerStatus, CreateContainerOptions,
    LifecycleRunner, registry,
};
use livedev_core::error::{Result, SandboxError};
use livedev_core::export::{ProjectArchive, export_project};
use livedev_core::file_system::{TreeNode, build_tree};
use livedev_core::preview::{Blob, PreviewDocument};
use livedev_core::session::{
    DEFAULT_PANEL_SIZES, EditorState, SessionSnapshot, SnapshotRepository, clamp_vertical_split,
};
use livedev_core::template::TemplateRegistry;
use livedev_infrastructure::StoreContainerRepository;
use livedev_interaction::{
    OrchestrationPlan, Reviewer, format_file_context, run_deconstruction_task,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{RwLock, watch};
use tracing::{debug, info, warn};

/// Smallest width (percent) a main panel may be resized to.
pub const MIN_PANEL_SIZE: f64 = 10.0;

/// Transcript, tabs and layout.
#[derive(Debug, Clone)]
struct ViewState {
    chat_history: Vec<ChatMessage>,
    editor: EditorState,
    panel_sizes: Vec<f64>,
    right_panel_vertical_split: f64,
}

/// Atomic "something is in flight" flag.
#[derive(Debug, Default)]
struct Gate {
    busy: AtomicBool,
}

impl Gate {
    fn try_enter(&self, what: &str) -> Result<GateGuard<'_>> {
        if self.busy.swap(true, Ordering::SeqCst) {
            return Err(SandboxError::Busy(format!(
                "another {} is still running",
                what
            )));
        }
        Ok(GateGuard { gate: self })
    }

    fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }
}

struct GateGuard<'a> {
    gate: &'a Gate,
}

impl Drop for GateGuard<'_> {
    fn drop(&mut self) {
        self.gate.busy.store(false, Ordering::SeqCst);
    }
}

/// Builder for [`SandboxSession`].
pub struct SandboxSessionBuilder {
    agent: Arc<dyn ChatAgent>,
    templates: Arc<TemplateRegistry>,
    runner: LifecycleRunner,
    persistence: Option<PersistenceGateway>,
    preview_debounce: Duration,
}

impl SandboxSessionBuilder {
    pub fn templates(mut self, templates: Arc<TemplateRegistry>) -> Self {
        self.templates = templates;
        self
    }

    pub fn runner(mut self, runner: LifecycleRunner) -> Self {
        self.runner = runner;
        self
    }

    pub fn persistence(mut self, gateway: PersistenceGateway) -> Self {
        self.persistence = Some(gateway);
        self
    }

    pub fn preview_debounce(mut self, window: Duration) -> Self {
        self.preview_debounce = window;
        self
    }

    /// Builds the session from `snapshot`.
    pub fn build(self, snapshot: SessionSnapshot) -> SandboxSession {
        let snapshot = snapshot.normalized();
        let editor = snapshot.editor();

        let fs = Arc::new(RwLock::new(snapshot.file_system));
        let preview_root = Arc::new(RwLock::new(snapshot.preview_root));
        let preview = LivePreview::spawn(fs.clone(), preview_root.clone(), self.preview_debounce);
        preview.request();

        SandboxSession {
            containers: StoreContainerRepository::new(fs.clone(), self.templates.clone()),
            fs,
            preview_root,
            view: RwLock::new(ViewState {
                chat_history: snapshot.chat_history,
                editor,
                panel_sizes: snapshot.panel_sizes,
                right_panel_vertical_split: snapshot.right_panel_vertical_split,
            }),
            templates: self.templates,
            runner: self.runner,
            agent: self.agent,
            commands: Gate::default(),
            thinking: Gate::default(),
            persistence: self.persistence,
            preview,
        }
    }

    /// Restores the stored snapshot through the configured gateway, then builds.
    pub async fn restore(self) -> SandboxSession {
        let snapshot = match &self.persistence {
            Some(gateway) => gateway.restore(&self.templates).await,
            None => SessionSnapshot::initial(&self.templates),
        };
        self.build(snapshot)
    }
}

/// One live sandbox.
pub struct SandboxSession {
    /// The path-keyed store, shared with the container repository and preview.
    fs: Arc<RwLock<FileSystem>>,
    /// Container directory being previewed.
    preview_root: Arc<RwLock<Option<String>>>,
    view: RwLock<ViewState>,
    templates: Arc<TemplateRegistry>,
    containers: StoreContainerRepository,
    runner: LifecycleRunner,
    agent: Arc<dyn ChatAgent>,
    /// Rejects a second container command while one runs.
    commands: Gate,
    /// Rejects a second chat request while the agent is answering.
    thinking: Gate,
    persistence: Option<PersistenceGateway>,
    preview: LivePreview,
}

impl SandboxSession {
    pub fn builder(agent: Arc<dyn ChatAgent>) -> SandboxSessionBuilder {
        SandboxSessionBuilder {
            agent,
            templates: Arc::new(TemplateRegistry::builtin().clone()),
            runner: LifecycleRunner::default(),
            persistence: None,
            preview_debounce: Duration::from_millis(250),
        }
    }

    /// Opens a session configured from `config`, restoring from `repository`.
    pub async fn open(
        config: &SandboxConfig,
        repository: Arc<dyn SnapshotRepository>,
        agent: Arc<dyn ChatAgent>,
    ) -> Self {
        let gateway = PersistenceGateway::new(repository, config.persistence.autosave_debounce());
        Self::builder(agent)
            .runner(LifecycleRunner::from_config(&config.lifecycle))
            .preview_debounce(config.preview.debounce())
            .persistence(gateway)
            .restore()
            .await
    }

    // ------------------------------------------------------------------
    // State
    // ------------------------------------------------------------------

    pub async fn snapshot(&self) -> SessionSnapshot {
        let file_system = self.fs.read().await.clone();
        let preview_root = self.preview_root.read().await.clone();
        let view = self.view.read().await;
        SessionSnapshot {
            file_system,
            chat_history: view.chat_history.clone(),
            panel_sizes: view.panel_sizes.clone(),
            right_panel_vertical_split: view.right_panel_vertical_split,
            preview_root,
            open_files: view.editor.open_files.clone(),
            active_file: view.editor.active_file.clone(),
        }
    }

    pub async fn file_system(&self) -> FileSystem {
        self.fs.read().await.clone()
    }

    pub async fn tree(&self) -> Vec<TreeNode> {
        build_tree(&*self.fs.read().await)
    }

    pub async fn read_file(&self, path: &str) -> Option<String> {
        self.fs.read().await.get(path).map(str::to_string)
    }

    pub async fn chat_history(&self) -> Vec<ChatMessage> {
        self.view.read().await.chat_history.clone()
    }

    pub async fn editor(&self) -> EditorState {
        self.view.read().await.editor.clone()
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    pub fn is_processing(&self) -> bool {
        self.commands.is_busy()
    }

    pub fn is_thinking(&self) -> bool {
        self.thinking.is_busy()
    }

    /// Schedules the autosave and the preview refresh.
    async fn changed(&self) {
        self.preview.request();
        if let Some(gateway) = &self.persistence {
            gateway.schedule(self.snapshot().await).await;
        }
    }

    // ------------------------------------------------------------------
    // Containers
    // ------------------------------------------------------------------

    pub async fn containers(&self) -> Result<Vec<Container>> {
        self.containers.list_all().await
    }

    pub async fn container(&self, id: &str) -> Result<Container> {
        self.containers
            .find_by_id(id)
            .await?
            .ok_or_else(|| SandboxError::not_found("container", id))
    }

    pub async fn create_container(&self, options: &CreateContainerOptions) -> Result<Container> {
        let container = self.containers.create(options).await?;
        info!(
            "Created container {} from {:?}",
            container.id,
            container.chosen_templates.ordered_ids()
        );
        self.changed().await;
        Ok(container)
    }

    /// Commands the runner would accept for `id` right now.
    pub async fn available_commands(&self, id: &str) -> Result<Vec<Command>> {
        let container = self.container(id).await?;
        Ok(self.runner.available_commands(&container))
    }

    /// Runs a simulated lifecycle command.
    ///
    /// The record shows the transient status while the command runs; only
    /// the finished record is scheduled for saving. A successful `start`
    /// makes the container the preview root.
    pub async fn run_command(&self, id: &str, command: Command) -> Result<Container> {
        let _guard = self.commands.try_enter("container command")?;

        let container = self.container(id).await?;
        let started = self.runner.begin(&container, command)?;
        self.containers.update(&started).await?;
        self.preview.request();

        self.runner.simulate().await;
        let outcome = self.runner.roll_outcome();
        let finished = self.runner.finish(started, command, outcome);

        match self.containers.update(&finished).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                warn!("Container {} was deleted while running {}", id, command);
                return Ok(finished);
            }
            Err(e) => return Err(e),
        }
        info!(
            "Container {} {} -> {} ({})",
            finished.id,
            command,
            finished.status,
            outcome.as_str()
        );

        if command == Command::Start && finished.status == ContainerStatus::Running {
            *self.preview_root.write().await = Some(finished.path.clone());
        }
        self.changed().await;
        Ok(finished)
    }

    /// Deletes a container and every file under its root.
    pub async fn delete_container(&self, id: &str) -> Result<()> {
        self.containers.delete(id).await?;

        let root = registry::root_for(id);
        {
            let mut preview_root = self.preview_root.write().await;
            if preview_root.as_deref() == Some(root.as_str()) {
                *preview_root = None;
            }
        }
        {
            let fs = self.fs.read().await;
            self.view.write().await.editor.prune(&fs);
        }

        info!("Deleted container {}", id);
        self.changed().await;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Files and editor
    // ------------------------------------------------------------------

    /// Opens `path` in a tab and activates it. Returns false for folders and
    /// unknown paths.
    pub async fn open_file(&self, path: &str) -> bool {
        let selected = {
            let fs = self.fs.read().await;
            self.view.write().await.editor.select(&fs, path)
        };
        if selected {
            self.changed().await;
        }
        selected
    }

    pub async fn close_file(&self, path: &str) {
        self.view.write().await.editor.close(path);
        self.changed().await;
    }

    /// Replaces the content of an existing file.
    pub async fn update_file(&self, path: &str, content: impl Into<String>) -> Result<()> {
        {
            let mut fs = self.fs.write().await;
            if !fs.contains(path) {
                return Err(SandboxError::not_found("file", path));
            }
            fs.set(path, content);
        }
        self.changed().await;
        Ok(())
    }

    /// Creates an empty file in `dir` and opens it.
    pub async fn new_file(&self, dir: &str, name: &str) -> Result<String> {
        let path = {
            let mut fs = self.fs.write().await;
            let path = fs.new_file(dir, validate_name(name)?);
            self.view.write().await.editor.select(&fs, &path);
            path
        };
        debug!("Created file {}", path);
        self.changed().await;
        Ok(path)
    }

    pub async fn new_folder(&self, dir: &str, name: &str) -> Result<String> {
        let path = self.fs.write().await.new_folder(dir, validate_name(name)?);
        debug!("Created folder {}", path);
        self.changed().await;
        Ok(path)
    }

    /// Writes uploaded files into `dir`.
    pub async fn upload<I>(&self, dir: &str, files: I) -> Vec<String>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let paths = self.fs.write().await.upload(dir, files);
        debug!("Uploaded {} files into {}", paths.len(), dir);
        self.changed().await;
        paths
    }

    // ------------------------------------------------------------------
    // Layout
    // ------------------------------------------------------------------

    pub async fn set_panel_sizes(&self, sizes: Vec<f64>) -> Result<()> {
        if sizes.len() != DEFAULT_PANEL_SIZES.len()
            || sizes.iter().any(|s| !s.is_finite() || *s < MIN_PANEL_SIZE)
        {
            return Err(SandboxError::invalid_input(format!(
                "panel sizes must be {} values of at least {}",
                DEFAULT_PANEL_SIZES.len(),
                MIN_PANEL_SIZE
            )));
        }
        self.view.write().await.panel_sizes = sizes;
        self.changed().await;
        Ok(())
    }

    /// Sets the preview/log split of the right panel, clamped to 10..=90.
    pub async fn set_vertical_split(&self, percent: f64) -> f64 {
        let clamped = clamp_vertical_split(percent);
        self.view.write().await.right_panel_vertical_split = clamped;
        self.changed().await;
        clamped
    }

    // ------------------------------------------------------------------
    // Preview
    // ------------------------------------------------------------------

    pub async fn preview_root(&self) -> Option<String> {
        self.preview_root.read().await.clone()
    }

    /// Selects the directory to preview; `None` clears it.
    pub async fn set_preview_root(&self, root: Option<String>) {
        *self.preview_root.write().await = root;
        self.changed().await;
    }

    /// Renders the preview now instead of waiting for the debounce.
    pub async fn render_preview(&self) -> PreviewDocument {
        self.preview.render_now().await
    }

    /// Receives every debounced re-render.
    pub fn subscribe_preview(&self) -> watch::Receiver<PreviewDocument> {
        self.preview.subscribe()
    }

    pub async fn preview_asset(&self, url: &str) -> Option<Blob> {
        self.preview.blob(url).await
    }

    // ------------------------------------------------------------------
    // Chat and planning
    // ------------------------------------------------------------------

    /// Sends `prompt` to the chat agent and returns the message appended in
    /// response.
    ///
    /// Agent failures become a `system` message rather than an error. Code
    /// edits in the reply are applied to the store and opened in tabs.
    pub async fn submit_chat(&self, prompt: &str) -> Result<ChatMessage> {
        if prompt.trim().is_empty() {
            return Err(SandboxError::invalid_input("prompt is empty"));
        }
        let _guard = self.thinking.try_enter("chat request")?;

        let transcript = {
            let mut view = self.view.write().await;
            view.chat_history.push(ChatMessage::user(prompt));
            view.chat_history.clone()
        };
        self.changed().await;

        let context = {
            let fs = self.fs.read().await;
            let root = self.preview_root.read().await;
            format_file_context(&fs, root.as_deref())?
        };

        let message = match self
            .agent
            .respond(AgentRequest::from_transcript(&transcript, context))
            .await
        {
            Ok(reply) => {
                let message = reply.into_message();
                if let Some(edits) = &message.code {
                    let mut fs = self.fs.write().await;
                    self.view.write().await.editor.apply_edits(&mut fs, edits);
                    info!("Applied {} agent edits", edits.len());
                }
                message
            }
            Err(e) => {
                warn!("Chat agent failed: {}", e);
                ChatMessage::system(e.to_string())
            }
        };

        self.view.write().await.chat_history.push(message.clone());
        self.changed().await;
        Ok(message)
    }

    /// Drafts and reviews a plan for `goal` against the current store.
    pub async fn plan(
        &self,
        goal: &str,
        planner: &dyn PlanAgent,
        reviewer: &dyn Reviewer,
    ) -> Result<OrchestrationPlan> {
        let fs = self.file_system().await;
        run_deconstruction_task(goal, &fs, planner, reviewer).await
    }

    // ------------------------------------------------------------------
    // Export and shutdown
    // ------------------------------------------------------------------

    pub async fn export(&self) -> ProjectArchive {
        export_project(&*self.fs.read().await)
    }

    /// Writes the latest state and stops background tasks.
    pub async fn shutdown(self) {
        if let Some(gateway) = &self.persistence {
            gateway.schedule(self.snapshot().await).await;
        }
        if let Some(gateway) = self.persistence {
            gateway.shutdown().await;
        }
        self.preview.shutdown().await;
    }
}

fn validate_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() || name.contains('/') {
        return Err(SandboxError::invalid_input(format!(
            "'{}' is not a valid name",
            name
        )));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use livedev_core::chat::{AgentReply, CodeEdit, MessageRole};
    use livedev_core::container::{LatencyWindow, TransitionPolicy};
    use livedev_core::preview::PreviewStatus;
    use livedev_infrastructure::InMemorySnapshotRepository;
    use livedev_interaction::OfflineChatAgent;
    use tokio::time::sleep;

    struct BrokenAgent;

    #[async_trait]
    impl ChatAgent for BrokenAgent {
        async fn respond(&self, _request: AgentRequest) -> Result<AgentReply> {
            Err(SandboxError::agent("Received an invalid response from the AI agent."))
        }
    }

    struct EditingAgent;

    #[async_trait]
    impl ChatAgent for EditingAgent {
        async fn respond(&self, request: AgentRequest) -> Result<AgentReply> {
            assert!(request.context.contains("Here is the current state"));
            Ok(AgentReply {
                text: "Styled it".to_string(),
                explanation: "Added a stylesheet".to_string(),
                code: Some(vec![
                    CodeEdit::new("/containers/cntr_x/style.css", "h1 { color: red }"),
                    CodeEdit::new("/containers/cntr_x/assets/.placeholder", ""),
                ]),
            })
        }
    }

    fn session_with(agent: Arc<dyn ChatAgent>, latency: LatencyWindow) -> SandboxSession {
        SandboxSession::builder(agent)
            .runner(LifecycleRunner::new(TransitionPolicy::Strict, latency))
            .build(SessionSnapshot::initial(TemplateRegistry::builtin()))
    }

    fn session() -> SandboxSession {
        session_with(Arc::new(OfflineChatAgent), LatencyWindow::instant())
    }

    #[tokio::test]
    async fn test_start_sets_preview_root() {
        let session = session();
        let container = session
            .create_container(&CreateContainerOptions::new("demo", "react-vite"))
            .await
            .unwrap();

        for command in [Command::Install, Command::Build, Command::Start] {
            session.run_command(&container.id, command).await.unwrap();
        }
        let running = session.container(&container.id).await.unwrap();
        assert_eq!(running.status, ContainerStatus::Running);
        assert_eq!(session.preview_root().await, Some(container.path.clone()));

        let document = session.render_preview().await;
        assert_eq!(document.status, PreviewStatus::Rendered);
    }

    #[tokio::test]
    async fn test_strict_policy_rejects_out_of_order() {
        let session = session();
        let container = session
            .create_container(&CreateContainerOptions::new("demo", "react-vite"))
            .await
            .unwrap();

        let err = session
            .run_command(&container.id, Command::Build)
            .await
            .unwrap_err();
        assert!(err.is_invalid_transition());
        assert!(!session.is_processing());
        assert_eq!(
            session.available_commands(&container.id).await.unwrap(),
            vec![Command::Install]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_command_is_busy() {
        let session = Arc::new(session_with(
            Arc::new(OfflineChatAgent),
            LatencyWindow::new(Duration::from_millis(1000), Duration::from_millis(1000)),
        ));
        let container = session
            .create_container(&CreateContainerOptions::new("demo", "react-vite"))
            .await
            .unwrap();

        let background = session.clone();
        let id = container.id.clone();
        let first = tokio::spawn(async move { background.run_command(&id, Command::Install).await });

        sleep(Duration::from_millis(10)).await;
        assert!(session.is_processing());
        assert_eq!(
            session.container(&container.id).await.unwrap().status,
            ContainerStatus::Installing
        );
        let err = session
            .run_command(&container.id, Command::Install)
            .await
            .unwrap_err();
        assert!(err.is_busy());

        let finished = first.await.unwrap().unwrap();
        assert_eq!(finished.status, ContainerStatus::Installed);
        assert!(!session.is_processing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupted_command_is_rolled_back_on_restore() {
        let repo = InMemorySnapshotRepository::new();
        let shared: Arc<dyn SnapshotRepository> = Arc::new(repo.clone());
        let slow = LatencyWindow::new(Duration::from_millis(400), Duration::from_millis(400));
        let session = SandboxSession::builder(Arc::new(OfflineChatAgent))
            .runner(LifecycleRunner::new(TransitionPolicy::Strict, slow))
            .persistence(PersistenceGateway::new(shared.clone(), Duration::from_millis(50)))
            .restore()
            .await;
        let container = session
            .create_container(&CreateContainerOptions::new("demo", "react-vite"))
            .await
            .unwrap();

        let cut_short = tokio::time::timeout(
            Duration::from_millis(200),
            session.run_command(&container.id, Command::Install),
        )
        .await;
        assert!(cut_short.is_err());
        // Any other change saves the store with the record still installing.
        session.set_vertical_split(50.0).await;
        sleep(Duration::from_millis(100)).await;
        let stored = repo.load().await.unwrap().unwrap();
        let record = registry::read_metadata(&container.id, &stored.file_system)
            .unwrap()
            .unwrap();
        assert_eq!(record.status, ContainerStatus::Installing);
        drop(session);

        let reopened = SandboxSession::builder(Arc::new(OfflineChatAgent))
            .runner(LifecycleRunner::new(TransitionPolicy::Strict, LatencyWindow::instant()))
            .persistence(PersistenceGateway::new(shared, Duration::from_millis(50)))
            .restore()
            .await;
        let restored = reopened.container(&container.id).await.unwrap();
        assert_eq!(restored.status, ContainerStatus::Initialized);
        let installed = reopened
            .run_command(&container.id, Command::Install)
            .await
            .unwrap();
        assert_eq!(installed.status, ContainerStatus::Installed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_running_command_is_not_autosaved() {
        let repo = InMemorySnapshotRepository::new();
        let slow = LatencyWindow::new(Duration::from_millis(400), Duration::from_millis(400));
        let session = SandboxSession::builder(Arc::new(OfflineChatAgent))
            .runner(LifecycleRunner::new(TransitionPolicy::Strict, slow))
            .persistence(PersistenceGateway::new(Arc::new(repo.clone()), Duration::from_millis(50)))
            .restore()
            .await;
        let container = session
            .create_container(&CreateContainerOptions::new("demo", "react-vite"))
            .await
            .unwrap();
        sleep(Duration::from_millis(100)).await;
        let saves = repo.save_count();

        let cut_short = tokio::time::timeout(
            Duration::from_millis(200),
            session.run_command(&container.id, Command::Install),
        )
        .await;
        assert!(cut_short.is_err());
        sleep(Duration::from_millis(100)).await;
        assert_eq!(repo.save_count(), saves);
    }

    #[tokio::test]
    async fn test_delete_clears_matching_preview_and_tabs() {
        let session = session();
        let container = session
            .create_container(&CreateContainerOptions::new("demo", "react-vite"))
            .await
            .unwrap();
        let index = format!("{}index.html", container.path);
        assert!(session.open_file(&index).await);
        session.set_preview_root(Some(container.path.clone())).await;

        session.delete_container(&container.id).await.unwrap();
        assert!(session.preview_root().await.is_none());
        assert!(session.editor().await.open_files.is_empty());
        assert!(session.containers().await.unwrap().is_empty());
        assert!(
            session
                .delete_container(&container.id)
                .await
                .unwrap_err()
                .is_not_found()
        );
    }

    #[tokio::test]
    async fn test_chat_applies_edits() {
        let session = session_with(Arc::new(EditingAgent), LatencyWindow::instant());
        let message = session.submit_chat("add some style").await.unwrap();
        assert_eq!(message.role, MessageRole::Model);

        assert_eq!(
            session.read_file("/containers/cntr_x/style.css").await.as_deref(),
            Some("h1 { color: red }")
        );
        let editor = session.editor().await;
        assert_eq!(editor.open_files, vec!["/containers/cntr_x/style.css"]);
        assert_eq!(editor.active_file.as_deref(), Some("/containers/cntr_x/style.css"));
        assert_eq!(session.chat_history().await.len(), 3);
    }

    #[tokio::test]
    async fn test_chat_failure_becomes_system_message() {
        let session = session_with(Arc::new(BrokenAgent), LatencyWindow::instant());
        let message = session.submit_chat("hello").await.unwrap();
        assert_eq!(message.role, MessageRole::System);
        assert!(message.content.contains("invalid response"));
        assert!(!session.is_thinking());

        assert!(session.submit_chat("   ").await.is_err());
    }

    #[tokio::test]
    async fn test_files_and_layout() {
        let session = session();
        let path = session.new_file("/containers/", "notes.md").await.unwrap();
        assert_eq!(path, "/containers/notes.md");
        assert_eq!(session.editor().await.active_file.as_deref(), Some("/containers/notes.md"));
        session.update_file(&path, "# hi").await.unwrap();
        assert!(session.update_file("/nope", "x").await.unwrap_err().is_not_found());

        let folder = session.new_folder("/containers/", "assets").await.unwrap();
        assert_eq!(folder, "/containers/assets/");
        assert!(session.new_folder("/containers/", "a/b").await.is_err());

        let uploaded = session
            .upload(&folder, vec![("logo.svg".to_string(), "<svg/>".to_string())])
            .await;
        assert_eq!(uploaded, vec!["/containers/assets/logo.svg"]);

        assert_eq!(session.set_vertical_split(95.0).await, 90.0);
        assert!(session.set_panel_sizes(vec![5.0, 50.0, 45.0]).await.is_err());
        session.set_panel_sizes(vec![30.0, 40.0, 30.0]).await.unwrap();

        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.panel_sizes, vec![30.0, 40.0, 30.0]);
        assert_eq!(snapshot.right_panel_vertical_split, 90.0);
        assert_eq!(snapshot.file_system.get("/containers/notes.md"), Some("# hi"));
    }
}
