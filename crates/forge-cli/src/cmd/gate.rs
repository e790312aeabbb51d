use crate::output::{or_dash, print_json, print_table};
use crate::project::{open_store, Project};
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum GateSubcommand {
    /// List recorded gate results
    List,
    /// Show the checks that run before entering optimize
    Plan,
}

pub fn run(root: &Path, subcmd: GateSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        GateSubcommand::List => list(root, json),
        GateSubcommand::Plan => plan(root, json),
    }
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let state = open_store(root)?.load();

    if json {
        print_json(&state.quality_gates)?;
        return Ok(());
    }

    if state.quality_gates.is_empty() {
        println!("No quality gates recorded.");
        return Ok(());
    }
    let rows = state
        .quality_gates
        .iter()
        .map(|g| {
            vec![
                g.name.clone(),
                if g.passed { "pass" } else { "FAIL" }.to_string(),
                g.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                or_dash(g.details.as_deref().and_then(|d| d.lines().last())),
            ]
        })
        .collect();
    print_table(&["GATE", "RESULT", "WHEN", "DETAILS"], rows);
    Ok(())
}

fn plan(root: &Path, json: bool) -> anyhow::Result<()> {
    let project = Project::open(root, None)?;
    let stack = project.stack();
    let plan = project.gate_plan();

    if json {
        print_json(&serde_json::json!({
            "stack": stack,
            "checks": plan.checks,
        }))?;
        return Ok(());
    }

    if plan.is_empty() {
        println!("No quality gates for this project.");
        return Ok(());
    }
    let rows = plan
        .checks
        .iter()
        .map(|c| {
            let command = std::iter::once(c.program.as_str())
                .chain(c.args.iter().map(String::as_str))
                .collect::<Vec<_>>()
                .join(" ");
            let installed = which::which(&c.program).is_ok();
            vec![
                c.name.clone(),
                command,
                if installed { "yes" } else { "no (skipped)" }.to_string(),
            ]
        })
        .collect();
    print_table(&["GATE", "COMMAND", "INSTALLED"], rows);
    Ok(())
}
