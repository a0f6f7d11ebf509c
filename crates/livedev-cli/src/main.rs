use anyhow::Result;
use clap::{Parser, Subcommand};
use livedev_core::container::Command;
use std::path::PathBuf;

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "livedev")]
#[command(about = "Live Dev Sandbox - scaffold, run and preview small web projects", long_about = None)]
struct Cli {
    /// Data directory (defaults to $LIVEDEV_HOME or the platform data dir)
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory, default config and initial session
    Init,
    /// List the built-in templates
    Templates,
    /// Scaffold a new container from templates
    Create {
        /// What the container is for
        prompt: String,
        /// Base template id
        #[arg(long, default_value = "react-vite")]
        base: String,
        /// UI library template id
        #[arg(long)]
        ui: Option<String>,
        /// Datastore template id
        #[arg(long)]
        datastore: Option<String>,
        /// Environment variable as KEY=VALUE (repeatable)
        #[arg(long = "env")]
        env: Vec<String>,
    },
    /// List containers, newest first
    List {
        #[arg(long)]
        json: bool,
    },
    /// Run a simulated lifecycle command (install, build, start)
    Run {
        id: String,
        #[arg(value_parser = commands::container::parse_command)]
        command: Command,
    },
    /// Delete a container and its files
    Delete { id: String },
    /// Print the file tree
    Tree {
        /// Only show this folder
        path: Option<String>,
    },
    /// Render the preview document
    Preview {
        /// Container root to preview, e.g. /containers/cntr_1234abcd/
        #[arg(long)]
        root: Option<String>,
        /// Write the document to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Export every container into a directory
    Export {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Send a message to the offline chat agent
    Chat { message: String },
    /// Draft and review a development plan
    Plan {
        goal: String,
        #[arg(long)]
        json: bool,
    },
    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Print the config file location
    Path,
    /// Write the default configuration if missing
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let home = cli.home.as_deref();

    match cli.command {
        Commands::Init => commands::init::run(home).await?,
        Commands::Templates => commands::files::templates(),
        Commands::Create {
            prompt,
            base,
            ui,
            datastore,
            env,
        } => {
            commands::container::create(
                home,
                commands::container::CreateArgs {
                    prompt,
                    base,
                    ui,
                    datastore,
                    env,
                },
            )
            .await?
        }
        Commands::List { json } => commands::container::list(home, json).await?,
        Commands::Run { id, command } => commands::container::run(home, &id, command).await?,
        Commands::Delete { id } => commands::container::delete(home, &id).await?,
        Commands::Tree { path } => commands::files::tree(home, path.as_deref()).await?,
        Commands::Preview { root, out } => {
            commands::preview::run(home, root, out.as_deref()).await?
        }
        Commands::Export { out } => commands::export::run(home, out).await?,
        Commands::Chat { message } => commands::chat::chat(home, &message).await?,
        Commands::Plan { goal, json } => commands::chat::plan(home, &goal, json).await?,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(home).await?,
            ConfigAction::Path => commands::config::path(home)?,
            ConfigAction::Init => commands::config::init(home).await?,
        },
    }

    Ok(())
}
