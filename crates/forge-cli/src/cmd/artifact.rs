use crate::output::{print_json, print_table};
use crate::project::open_store;
use anyhow::Context;
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum ArtifactSubcommand {
    /// Record an artifact (usually the path of a document the phase produced)
    Set { name: String, value: String },
    /// List recorded artifacts
    List,
}

pub fn run(root: &Path, subcmd: ArtifactSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ArtifactSubcommand::Set { name, value } => set(root, &name, &value, json),
        ArtifactSubcommand::List => list(root, json),
    }
}

fn set(root: &Path, name: &str, value: &str, json: bool) -> anyhow::Result<()> {
    let store = open_store(root)?;
    let mut state = store.load();
    let previous = state.artifacts.get(name).cloned();
    state.set_artifact(name, value);
    store.save(&state).context("failed to save state")?;

    if json {
        print_json(&serde_json::json!({
            "artifact": name,
            "value": value,
            "previous": previous,
        }))?;
    } else if let Some(prev) = previous {
        println!("Updated artifact '{name}': {prev} -> {value}");
    } else {
        println!("Recorded artifact '{name}': {value}");
    }
    Ok(())
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let state = open_store(root)?.load();

    if json {
        print_json(&state.artifacts)?;
        return Ok(());
    }

    if state.artifacts.is_empty() {
        println!("No artifacts.");
        return Ok(());
    }
    let rows = state
        .artifacts
        .iter()
        .map(|(k, v)| vec![k.clone(), v.clone()])
        .collect();
    print_table(&["ARTIFACT", "VALUE"], rows);
    Ok(())
}
