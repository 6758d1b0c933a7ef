mod cmd;
mod output;
mod root;
mod settings;

use clap::{Parser, Subcommand};
use settings::{RemoteArgs, Settings};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "idg",
    about = "Keep a mermaid issue dependency graph in sync with GitHub issues",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root holding .idg.yaml and the token file (default: auto-detect)
    #[arg(long, global = true, env = "IDG_ROOT")]
    root: Option<PathBuf>,

    /// Repository to sync, as <owner>/<name>
    #[arg(long, global = true, env = "IDG_REPO")]
    repo: Option<String>,

    /// GitHub access token (overrides the token file)
    #[arg(long, global = true, env = "IDG_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// GitHub API base URL
    #[arg(long, global = true, env = "IDG_API_URL")]
    api_url: Option<String>,

    /// Read the graph from this repository file instead of the pinned issue
    #[arg(long, global = true, value_name = "PATH")]
    file: Option<String>,

    /// Report what would change without writing anything
    #[arg(long, global = true)]
    dry_run: bool,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Log progress to stderr
    #[arg(long, global = true, short = 'v')]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Annotate the graph from issues, then create issues for new nodes
    Sync,

    /// Link graph nodes to their issues and mark closed ones done
    Annotate,

    /// Create an issue for every graph node that has none
    CreateMissing,

    /// Assign a milestone to every graph issue without one
    SetMilestone {
        /// Milestone title (default: the first open milestone)
        #[arg(long)]
        milestone: Option<String>,
    },

    /// Print the nodes and edges of the graph
    Show {
        /// Parse a local Markdown file instead of the remote document
        #[arg(long, value_name = "PATH")]
        local: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());
    let remote = RemoteArgs {
        repo: cli.repo,
        token: cli.token,
        api_url: cli.api_url,
        file: cli.file,
        dry_run: cli.dry_run,
    };

    let result = Settings::resolve(&root, remote).and_then(|settings| match cli.command {
        Commands::Sync => cmd::sync::run(&settings, cli.json),
        Commands::Annotate => cmd::sync::annotate(&settings, cli.json),
        Commands::CreateMissing => cmd::sync::create_missing(&settings, cli.json),
        Commands::SetMilestone { milestone } => {
            cmd::milestone::run(&settings, milestone.as_deref(), cli.json)
        }
        Commands::Show { local } => cmd::show::run(&settings, local.as_deref(), cli.json),
    });

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
