mod cmd;
mod output;
mod project;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    artifact::ArtifactSubcommand, config::ConfigSubcommand, gate::GateSubcommand,
    rules::RulesSubcommand, task::TaskSubcommand, workflow::WorkflowSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "forge",
    about = "Compile markdown agent templates and drive a feature through its workflow phases",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .forge/ or .git/)
    #[arg(long, global = true, env = "FORGE_ROOT")]
    root: Option<PathBuf>,

    /// Fallback template directory (default: ./templates, then ~/.local/share/forge/templates)
    #[arg(long, global = true, env = "FORGE_TEMPLATES")]
    templates: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Log debug output to stderr
    #[arg(long, global = true, short = 'v')]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize forge in a new or the current project directory
    Init {
        /// Name of the new project directory ('.' for the current directory)
        name: Option<String>,

        /// Initialize in the current directory
        #[arg(long)]
        here: bool,

        /// AI assistant to set up for
        #[arg(long, default_value = forge_core::agents::DEFAULT_AGENT)]
        ai: String,

        /// Initialize even if the current directory is not empty
        #[arg(long)]
        force: bool,

        /// Skip checking that the assistant's CLI is installed
        #[arg(long)]
        ignore_agent_tools: bool,
    },

    /// Check which assistant CLIs and tools are installed
    Check,

    /// Show the feature state
    State,

    /// Move the feature between workflow phases
    Workflow {
        #[command(subcommand)]
        subcommand: WorkflowSubcommand,
    },

    /// Manage tasks
    Task {
        #[command(subcommand)]
        subcommand: TaskSubcommand,
    },

    /// Manage artifacts
    Artifact {
        #[command(subcommand)]
        subcommand: ArtifactSubcommand,
    },

    /// Inspect quality gates
    Gate {
        #[command(subcommand)]
        subcommand: GateSubcommand,
    },

    /// Detect the project stack and compile agent rules
    Rules {
        #[command(subcommand)]
        subcommand: RulesSubcommand,
    },

    /// Compile a markdown template
    Compile {
        file: PathBuf,

        /// Write the result to a file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Show or validate the project configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::DEBUG
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

    let templates = cli.templates.as_deref();
    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init {
            name,
            here,
            ai,
            force,
            ignore_agent_tools,
        } => cmd::init::run(
            cli.root.as_deref(),
            templates,
            cmd::init::InitArgs {
                name,
                here,
                ai,
                force,
                ignore_agent_tools,
            },
            cli.json,
        ),
        Commands::Check => cmd::check::run(cli.json),
        Commands::State => cmd::state::run(&root, cli.json),
        Commands::Workflow { subcommand } => {
            cmd::workflow::run(&root, templates, subcommand, cli.json)
        }
        Commands::Task { subcommand } => cmd::task::run(&root, subcommand, cli.json),
        Commands::Artifact { subcommand } => cmd::artifact::run(&root, subcommand, cli.json),
        Commands::Gate { subcommand } => cmd::gate::run(&root, subcommand, cli.json),
        Commands::Rules { subcommand } => cmd::rules::run(&root, templates, subcommand, cli.json),
        Commands::Compile { file, output } => {
            cmd::compile::run(&root, templates, &file, output.as_deref(), cli.json)
        }
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
