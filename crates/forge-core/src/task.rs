use crate::error::{ForgeError, Result};
use crate::types::Status;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub test_file: Option<String>,
}

impl Task {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            status: Status::Pending,
            file_path: None,
            test_file: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Task list operations (operate on a mutable Vec<Task>)
// ---------------------------------------------------------------------------

pub fn add_task(tasks: &mut Vec<Task>, task: Task) -> Result<()> {
    if tasks.iter().any(|t| t.id == task.id) {
        return Err(ForgeError::TaskExists(task.id));
    }
    tasks.push(task);
    Ok(())
}

/// Next free id of the form `T<n>`.
pub fn next_id(tasks: &[Task]) -> String {
    let mut n = tasks.len() + 1;
    loop {
        let id = format!("T{n}");
        if !tasks.iter().any(|t| t.id == id) {
            return id;
        }
        n += 1;
    }
}

pub fn set_status(tasks: &mut [Task], id: &str, status: Status) -> Result<()> {
    find_mut(tasks, id)?.status = status;
    Ok(())
}

/// Human-readable summary: "3/5 completed, 1 in progress, 1 blocked"
pub fn summarize(tasks: &[Task]) -> String {
    let count = |s: Status| tasks.iter().filter(|t| t.status == s).count();
    format!(
        "{}/{} completed, {} in progress, {} blocked",
        count(Status::Completed),
        tasks.len(),
        count(Status::InProgress),
        count(Status::Blocked)
    )
}

fn find_mut<'a>(tasks: &'a mut [Task], id: &str) -> Result<&'a mut Task> {
    tasks
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or_else(|| ForgeError::TaskNotFound(id.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_lifecycle() {
        let mut tasks: Vec<Task> = Vec::new();
        add_task(&mut tasks, Task::new("T1", "Write tests")).unwrap();
        assert_eq!(tasks[0].status, Status::Pending);

        set_status(&mut tasks, "T1", Status::InProgress).unwrap();
        assert_eq!(tasks[0].status, Status::InProgress);

        set_status(&mut tasks, "T1", Status::Completed).unwrap();
        assert_eq!(summarize(&tasks), "1/1 completed, 0 in progress, 0 blocked");
    }

    #[test]
    fn duplicate_task_rejected() {
        let mut tasks = vec![Task::new("T1", "First")];
        let err = add_task(&mut tasks, Task::new("T1", "Again")).unwrap_err();
        assert!(matches!(err, ForgeError::TaskExists(id) if id == "T1"));
    }

    #[test]
    fn task_not_found() {
        let mut tasks: Vec<Task> = Vec::new();
        assert!(set_status(&mut tasks, "T99", Status::Completed).is_err());
    }

    #[test]
    fn next_id_skips_taken_ids() {
        let tasks = vec![Task::new("T2", "Second")];
        assert_eq!(next_id(&tasks), "T3");
        assert_eq!(next_id(&[]), "T1");
    }

    #[test]
    fn optional_paths_default_to_none() {
        let task: Task = serde_json::from_str(r#"{"id":"T1","description":"x"}"#).unwrap();
        assert_eq!(task.status, Status::Pending);
        assert!(task.file_path.is_none());
        assert!(task.test_file.is_none());
    }
}
