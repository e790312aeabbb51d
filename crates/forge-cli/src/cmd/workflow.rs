use crate::output::print_json;
use crate::project::Project;
use clap::Subcommand;
use forge_core::{
    types::Phase,
    workflow::{PhaseController, TransitionOptions},
    ForgeError,
};
use std::path::Path;

#[derive(Subcommand)]
pub enum WorkflowSubcommand {
    /// Start planning, optionally naming the feature
    Plan { feature: Option<String> },
    /// Break the plan into tasks
    Tasks,
    /// Implement the tasks
    Implement,
    /// Run the quality gates and enter optimization
    Optimize {
        /// Enter optimize without running the quality gates
        #[arg(long)]
        skip_gates: bool,
    },
    /// Prepare the feature for shipping
    Ship,
    /// Move to any phase
    To {
        phase: Phase,
        /// Rename the feature
        #[arg(long)]
        feature: Option<String>,
        /// Skip the quality gates when entering optimize
        #[arg(long)]
        skip_gates: bool,
    },
    /// Print the document of the current phase without changing it
    Show,
}

pub fn run(
    root: &Path,
    templates: Option<&Path>,
    subcmd: WorkflowSubcommand,
    json: bool,
) -> anyhow::Result<()> {
    let project = Project::open(root, templates)?;
    let controller = project.controller()?;

    let (target, opts) = match subcmd {
        WorkflowSubcommand::Plan { feature } => (
            Phase::Plan,
            TransitionOptions {
                feature,
                skip_gates: false,
            },
        ),
        WorkflowSubcommand::Tasks => (Phase::Tasks, TransitionOptions::default()),
        WorkflowSubcommand::Implement => (Phase::Implement, TransitionOptions::default()),
        WorkflowSubcommand::Optimize { skip_gates } => (
            Phase::Optimize,
            TransitionOptions {
                feature: None,
                skip_gates,
            },
        ),
        WorkflowSubcommand::Ship => (Phase::Ship, TransitionOptions::default()),
        WorkflowSubcommand::To {
            phase,
            feature,
            skip_gates,
        } => (phase, TransitionOptions { feature, skip_gates }),
        WorkflowSubcommand::Show => return show(&controller, json),
    };

    transition(&controller, target, opts, json)
}

fn transition(
    controller: &PhaseController,
    target: Phase,
    opts: TransitionOptions,
    json: bool,
) -> anyhow::Result<()> {
    let transition = match controller.transition(target, opts) {
        Ok(t) => t,
        Err(ForgeError::GatesFailed(names)) => {
            report_failed_gates(controller, &names);
            anyhow::bail!(
                "cannot enter {target}: quality gates failed: {} (use --skip-gates to bypass)",
                names.join(", ")
            );
        }
        Err(e) => return Err(anyhow::Error::new(e).context(format!("failed to enter {target}"))),
    };

    if json {
        print_json(&transition)?;
        return Ok(());
    }

    eprintln!("Phase: {} ({})", transition.state.phase, transition.state.name);
    print!("{}", transition.document);
    if !transition.document.ends_with('\n') {
        println!();
    }
    Ok(())
}

fn show(controller: &PhaseController, json: bool) -> anyhow::Result<()> {
    let (state, document) = controller.current_document();
    if json {
        print_json(&serde_json::json!({
            "phase": state.phase,
            "document": document,
        }))?;
    } else {
        println!("{document}");
    }
    Ok(())
}

/// Print the details of the most recent result of each failed gate.
fn report_failed_gates(controller: &PhaseController, names: &[String]) {
    let state = controller.store().load();
    for name in names {
        let latest = state.quality_gates.iter().rev().find(|g| &g.name == name);
        if let Some(details) = latest.and_then(|g| g.details.as_deref()) {
            eprintln!("--- {name} ---\n{details}");
        }
    }
}
