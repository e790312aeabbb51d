use crate::output::{emit, print_json};
use crate::project::Project;
use anyhow::Context;
use clap::Subcommand;
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum RulesSubcommand {
    /// Print the stack tags detected from the project's manifests
    Detect,
    /// Compile the agent rules file for the project's stack
    Compile {
        /// Persona block under rules/roles/ (default: config rules.role)
        #[arg(long)]
        role: Option<String>,
        /// Stack tag to include, e.g. languages/python (repeatable; default: detected)
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Output file (default: config rules.output)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
        /// Print to stdout instead of writing the file
        #[arg(long)]
        stdout: bool,
    },
}

pub fn run(
    root: &Path,
    templates: Option<&Path>,
    subcmd: RulesSubcommand,
    json: bool,
) -> anyhow::Result<()> {
    let project = Project::open(root, templates)?;
    match subcmd {
        RulesSubcommand::Detect => detect(&project, json),
        RulesSubcommand::Compile {
            role,
            tags,
            output,
            stdout,
        } => compile(&project, role, tags, output, stdout, json),
    }
}

fn detect(project: &Project, json: bool) -> anyhow::Result<()> {
    let tags = project.stack();
    if json {
        print_json(&tags)?;
    } else if tags.is_empty() {
        println!("No known stack detected.");
    } else {
        for tag in &tags {
            println!("{tag}");
        }
    }
    Ok(())
}

fn compile(
    project: &Project,
    role: Option<String>,
    tags: Vec<String>,
    output: Option<PathBuf>,
    stdout: bool,
    json: bool,
) -> anyhow::Result<()> {
    let role = role.unwrap_or_else(|| project.config.rules.role.clone());
    let tags = if tags.is_empty() { project.stack() } else { tags };

    let compiler = project.compiler();
    let content = project
        .rule_library()
        .compile(&compiler, &role, &tags)
        .context("failed to compile rules")?;

    if stdout {
        return emit(&content, None);
    }

    let output = output.unwrap_or_else(|| project.config.rules.output.clone());
    let path = if output.is_absolute() {
        output
    } else {
        project.root.join(output)
    };
    let mut data = content;
    if !data.ends_with('\n') {
        data.push('\n');
    }
    emit(&data, Some(&path)).with_context(|| format!("failed to write {}", path.display()))?;

    if json {
        print_json(&serde_json::json!({
            "output": path,
            "role": role,
            "tags": tags,
        }))?;
    } else {
        println!("Generated {}", path.display());
    }
    Ok(())
}
