use crate::output::print_json;
use crate::project::fallback_root;
use anyhow::Context;
use forge_core::{
    agents::{self, AgentInfo},
    config::Config,
    io, paths,
    state::{FeatureState, StateStore},
    ForgeError,
};
use std::path::{Path, PathBuf};

pub struct InitArgs {
    pub name: Option<String>,
    pub here: bool,
    pub ai: String,
    pub force: bool,
    pub ignore_agent_tools: bool,
}

/// Directory `init` writes into, and whether it is the current directory.
#[derive(Debug, PartialEq)]
struct Target {
    path: PathBuf,
    here: bool,
}

pub fn run(
    base: Option<&Path>,
    templates: Option<&Path>,
    args: InitArgs,
    json: bool,
) -> anyhow::Result<()> {
    let base = match base {
        Some(p) => p.to_path_buf(),
        None => std::env::current_dir().context("failed to read current directory")?,
    };
    let target = resolve_target(&base, args.name.as_deref(), args.here, args.force)?;
    let agent = agents::find_agent(&args.ai).with_context(|| {
        format!("choose from: {}", agents::agent_keys().join(", "))
    })?;

    if !args.ignore_agent_tools && !agent.is_installed() {
        anyhow::bail!(
            "{} not found; install from {} or pass --ignore-agent-tools to skip this check",
            agent.key,
            agent.install_url.unwrap_or("its vendor"),
        );
    }

    let root = &target.path;
    let project_name = paths::project_name(root);
    if !json {
        println!("Initializing forge in: {}", root.display());
    }

    io::ensure_dir(&paths::forge_dir(root))
        .with_context(|| format!("failed to create {}", paths::forge_dir(root).display()))?;

    let created_config = Config::new(&project_name)
        .save_if_missing(root)
        .context("failed to write config.yaml")?;
    let config = Config::load(root).context("failed to load config")?;

    let created_state = StateStore::new(root)
        .save_if_missing(&FeatureState::new(&project_name))
        .context("failed to write state.json")?;

    let fallback = fallback_root(root, &config, templates);
    let copied = match &fallback {
        Some(dir) => io::copy_markdown_files(
            &dir.join(paths::AGENTS_DIR),
            &paths::override_agents_dir(root),
        )
        .context("failed to copy agent templates")?,
        None => {
            tracing::warn!("no template directory found, skipping agent templates");
            0
        }
    };

    if json {
        print_json(&serde_json::json!({
            "root": root,
            "project": project_name,
            "ai": agent.key,
            "created_config": created_config,
            "created_state": created_state,
            "agent_templates": copied,
        }))?;
        return Ok(());
    }

    let mark = |created: bool| if created { "created:" } else { "exists: " };
    println!("  {} {}", mark(created_config), paths::CONFIG_FILE);
    println!("  {} {}", mark(created_state), paths::STATE_FILE);
    println!(
        "  copied:  {copied} agent template(s) into {}/{}",
        paths::OVERRIDE_TEMPLATES_DIR,
        paths::AGENTS_DIR
    );

    println!("\nProject ready.");
    print_security_notice(agent);
    print_next_steps(&target, agent);
    Ok(())
}

/// Validate the name/`--here` combination and pick the directory to
/// initialize. A new project directory is created here; an existing one is
/// only reused with `--here`.
fn resolve_target(
    base: &Path,
    name: Option<&str>,
    here: bool,
    force: bool,
) -> anyhow::Result<Target> {
    let (name, here) = match name {
        Some(".") => (None, true),
        other => (other, here),
    };

    match (name, here) {
        (Some(_), true) => anyhow::bail!("cannot specify both a project name and --here"),
        (None, false) => anyhow::bail!(
            "must specify a project name, use '.' for the current directory, or pass --here"
        ),
        (None, true) => {
            let items = std::fs::read_dir(base)
                .with_context(|| format!("failed to read {}", base.display()))?
                .count();
            if items > 0 {
                if !force {
                    anyhow::bail!(
                        "current directory is not empty ({items} items); pass --force to merge into it"
                    );
                }
                eprintln!("warning: current directory is not empty ({items} items), merging");
            }
            Ok(Target {
                path: base.to_path_buf(),
                here: true,
            })
        }
        (Some(name), false) => {
            let path = base.join(name);
            if path.exists() {
                return Err(ForgeError::ProjectExists(name.to_string()).into());
            }
            io::ensure_dir(&path).with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Target { path, here: false })
        }
    }
}

fn print_security_notice(agent: &AgentInfo) {
    println!(
        "\nSome agents may store credentials, auth tokens, or other private artifacts in {}.",
        agent.folder
    );
    println!(
        "Consider adding {} (or parts of it) to .gitignore to prevent accidental credential leakage.",
        agent.folder
    );
}

fn print_next_steps(target: &Target, agent: &AgentInfo) {
    println!("\nNext steps:");
    let mut step = 1;
    if !target.here {
        let dir = target
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        println!("  {step}. cd {dir}");
        step += 1;
    }
    if agent.key == "codex" {
        println!(
            "  {step}. export CODEX_HOME={}",
            target.path.join(".codex").display()
        );
        step += 1;
    }
    println!("  {step}. forge workflow plan <feature>");
    println!("  {}. forge workflow tasks | implement | optimize | ship", step + 1);
}
