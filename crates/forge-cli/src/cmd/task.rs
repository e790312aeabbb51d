use crate::output::{or_dash, print_json, print_table};
use crate::project::open_store;
use anyhow::Context;
use clap::Subcommand;
use forge_core::{
    task::{self as task_ops, Task},
    types::Status,
};
use std::path::Path;

#[derive(Subcommand)]
pub enum TaskSubcommand {
    /// Add a task
    Add {
        #[arg(required = true)]
        description: Vec<String>,
        /// Task id; defaults to the next free `T<n>`
        #[arg(long)]
        id: Option<String>,
        /// Source file the task changes
        #[arg(long)]
        file: Option<String>,
        /// Test file covering the task
        #[arg(long)]
        test_file: Option<String>,
    },
    /// Start a task
    Start { id: String },
    /// Complete a task
    Complete { id: String },
    /// Mark a task as blocked
    Block { id: String },
    /// List tasks
    List,
}

pub fn run(root: &Path, subcmd: TaskSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        TaskSubcommand::Add {
            id,
            description,
            file,
            test_file,
        } => {
            let description = description.join(" ");
            add(root, id, &description, file, test_file, json)
        }
        TaskSubcommand::Start { id } => set_status(root, &id, Status::InProgress, json),
        TaskSubcommand::Complete { id } => set_status(root, &id, Status::Completed, json),
        TaskSubcommand::Block { id } => set_status(root, &id, Status::Blocked, json),
        TaskSubcommand::List => list(root, json),
    }
}

fn add(
    root: &Path,
    id: Option<String>,
    description: &str,
    file: Option<String>,
    test_file: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let store = open_store(root)?;
    let mut state = store.load();
    let id = id.unwrap_or_else(|| task_ops::next_id(&state.tasks));
    let mut task = Task::new(id.clone(), description);
    task.file_path = file;
    task.test_file = test_file;
    task_ops::add_task(&mut state.tasks, task)?;
    state.touch();
    store.save(&state).context("failed to save state")?;

    if json {
        print_json(&serde_json::json!({ "task_id": id, "description": description }))?;
    } else {
        println!("Added task [{id}]: {description}");
    }
    Ok(())
}

fn set_status(root: &Path, id: &str, status: Status, json: bool) -> anyhow::Result<()> {
    let store = open_store(root)?;
    let mut state = store.load();
    task_ops::set_status(&mut state.tasks, id, status)?;
    state.touch();
    store.save(&state).context("failed to save state")?;

    if json {
        print_json(&serde_json::json!({ "task_id": id, "status": status }))?;
    } else {
        println!("Task [{id}] is now {status}");
    }
    Ok(())
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let state = open_store(root)?.load();

    if json {
        print_json(&state.tasks)?;
        return Ok(());
    }

    if state.tasks.is_empty() {
        println!("No tasks.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = state
        .tasks
        .iter()
        .map(|t| {
            vec![
                t.id.clone(),
                t.status.to_string(),
                t.description.clone(),
                or_dash(t.file_path.as_deref()),
                or_dash(t.test_file.as_deref()),
            ]
        })
        .collect();
    print_table(&["ID", "STATUS", "DESCRIPTION", "FILE", "TEST"], rows);
    println!("\n{}", task_ops::summarize(&state.tasks));
    Ok(())
}
