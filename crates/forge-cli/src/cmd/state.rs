use crate::output::print_json;
use crate::project::open_store;
use forge_core::{task, types::Status};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let store = open_store(root)?;
    let state = store.load();

    if json {
        print_json(&state)?;
        return Ok(());
    }

    println!("Feature:  {}", state.name);
    println!("Phase:    {}", state.phase);
    println!("Status:   {}", state.status);
    if state.status == Status::Failed {
        println!(
            "          ({} could not be read and was reset)",
            store.path().display()
        );
    }
    println!("Tasks:    {}", task::summarize(&state.tasks));
    println!("Artifacts: {}", state.artifacts.len());

    let passed = state.quality_gates.iter().filter(|g| g.passed).count();
    println!(
        "Gates:    {passed}/{} passed",
        state.quality_gates.len()
    );
    println!(
        "Updated:  {}",
        state.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    if let Some(next) = state.phase.next() {
        println!("\nNext: forge workflow to {next}");
    }
    Ok(())
}
