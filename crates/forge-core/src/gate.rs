//! Quality gates run before a feature enters the optimize phase.
//!
//! A gate plan is a list of external checks picked from the project's stack
//! tags. Checks run one after another in the project root; a check whose
//! program is not installed is recorded as a passing skip so that a missing
//! toolchain never blocks the workflow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;

// ---------------------------------------------------------------------------
// QualityGate (persisted result)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityGate {
    pub name: String,
    pub passed: bool,
    #[serde(deserialize_with = "crate::types::deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub details: Option<String>,
}

impl QualityGate {
    pub fn new(name: impl Into<String>, passed: bool, details: Option<String>) -> Self {
        Self {
            name: name.into(),
            passed,
            timestamp: Utc::now(),
            details,
        }
    }
}

// ---------------------------------------------------------------------------
// QualityCheck (configured command)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QualityCheck {
    pub name: String,
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl QualityCheck {
    pub fn new(name: &str, program: &str, args: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Built-in checks for a stack tag. Only language tags carry a test command.
pub fn default_checks(tag: &str) -> Vec<QualityCheck> {
    match tag {
        "languages/python" => vec![QualityCheck::new("python-tests", "pytest", &[])],
        "languages/typescript" => vec![QualityCheck::new("typescript-tests", "npm", &["test"])],
        "languages/java" => vec![QualityCheck::new("java-tests", "mvn", &["-q", "test"])],
        _ => Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// GatePlan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GatePlan {
    pub checks: Vec<QualityCheck>,
}

impl GatePlan {
    pub fn new(checks: Vec<QualityCheck>) -> Self {
        Self { checks }
    }

    /// Build the plan for the detected stack tags. A tag configured in
    /// `overrides` replaces its built-in checks entirely; checks sharing a
    /// name are kept once.
    pub fn for_tags(tags: &[String], overrides: &BTreeMap<String, Vec<QualityCheck>>) -> Self {
        let mut checks: Vec<QualityCheck> = Vec::new();
        for tag in tags {
            let for_tag = overrides
                .get(tag)
                .cloned()
                .unwrap_or_else(|| default_checks(tag));
            for check in for_tag {
                if !checks.iter().any(|c| c.name == check.name) {
                    checks.push(check);
                }
            }
        }
        Self { checks }
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Run every check sequentially in `root` and return one result per check.
    pub fn run(&self, root: &Path) -> Vec<QualityGate> {
        self.checks.iter().map(|c| run_check(c, root)).collect()
    }
}

/// Names of the gates that did not pass.
pub fn failures(results: &[QualityGate]) -> Vec<String> {
    results
        .iter()
        .filter(|g| !g.passed)
        .map(|g| g.name.clone())
        .collect()
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

fn run_check(check: &QualityCheck, root: &Path) -> QualityGate {
    if check.program.trim().is_empty() {
        return QualityGate::new(&check.name, false, Some("gate program is empty".to_string()));
    }

    let installed = which::which_in(&check.program, std::env::var_os("PATH"), root).is_ok();
    if !installed {
        tracing::info!(gate = %check.name, program = %check.program, "tool not found, skipping");
        return skipped(check);
    }

    tracing::info!(gate = %check.name, program = %check.program, "running quality gate");
    let output = match Command::new(&check.program)
        .args(&check.args)
        .current_dir(root)
        .output()
    {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return skipped(check),
        Err(e) => {
            return QualityGate::new(&check.name, false, Some(format!("failed to spawn: {e}")));
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    if output.status.success() {
        QualityGate::new(&check.name, true, None)
    } else {
        let mut details = format_output(&stdout, &stderr);
        if details.is_empty() {
            details = format!("exited with {}", output.status);
        }
        QualityGate::new(&check.name, false, Some(details))
    }
}

fn skipped(check: &QualityCheck) -> QualityGate {
    QualityGate::new(
        &check.name,
        true,
        Some(format!("skipped: '{}' not found", check.program)),
    )
}

/// Combine stdout/stderr and cap to 10KB (keeping the tail).
fn format_output(stdout: &str, stderr: &str) -> String {
    let output = if stderr.is_empty() {
        stdout.to_string()
    } else if stdout.is_empty() {
        stderr.to_string()
    } else {
        format!("{stdout}\n{stderr}")
    };
    const MAX_OUTPUT: usize = 10 * 1024;
    let trimmed = output.trim();
    if trimmed.len() <= MAX_OUTPUT {
        return trimmed.to_string();
    }
    let mut start = trimmed.len() - MAX_OUTPUT;
    while !trimmed.is_char_boundary(start) {
        start += 1;
    }
    trimmed[start..].to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn plan_uses_defaults_for_language_tags() {
        let tags = vec!["languages/python".to_string(), "frameworks/django".to_string()];
        let plan = GatePlan::for_tags(&tags, &BTreeMap::new());
        assert_eq!(plan.checks.len(), 1);
        assert_eq!(plan.checks[0].program, "pytest");
    }

    #[test]
    fn plan_overrides_replace_defaults() {
        let tags = vec!["languages/python".to_string()];
        let mut overrides = BTreeMap::new();
        overrides.insert(
            "languages/python".to_string(),
            vec![QualityCheck::new("lint", "ruff", &["check", "."])],
        );
        let plan = GatePlan::for_tags(&tags, &overrides);
        assert_eq!(plan.checks, vec![QualityCheck::new("lint", "ruff", &["check", "."])]);
    }

    #[test]
    fn missing_tool_is_recorded_as_skipped_pass() {
        let dir = TempDir::new().unwrap();
        let plan = GatePlan::new(vec![QualityCheck::new(
            "ghost",
            "forge-definitely-missing-tool",
            &[],
        )]);
        let results = plan.run(dir.path());
        assert_eq!(results.len(), 1);
        assert!(results[0].passed);
        assert!(results[0].details.as_deref().unwrap().starts_with("skipped"));
        assert!(failures(&results).is_empty());
    }

    #[test]
    fn empty_program_fails() {
        let dir = TempDir::new().unwrap();
        let plan = GatePlan::new(vec![QualityCheck::new("blank", "  ", &[])]);
        let results = plan.run(dir.path());
        assert!(!results[0].passed);
    }

    #[cfg(unix)]
    #[test]
    fn failing_command_fails_gate_and_keeps_running() {
        let dir = TempDir::new().unwrap();
        let plan = GatePlan::new(vec![
            QualityCheck::new("broken", "sh", &["-c", "echo boom >&2; exit 3"]),
            QualityCheck::new("fine", "sh", &["-c", "exit 0"]),
        ]);
        let results = plan.run(dir.path());
        assert_eq!(results.len(), 2);
        assert!(!results[0].passed);
        assert_eq!(results[0].details.as_deref(), Some("boom"));
        assert!(results[1].passed);
        assert_eq!(failures(&results), vec!["broken".to_string()]);
    }

    #[test]
    fn quality_check_rejects_unknown_fields() {
        let yaml = "name: test\nprogram: pytest\nargz: []\n";
        assert!(serde_yaml::from_str::<QualityCheck>(yaml).is_err());
    }

    #[test]
    fn format_output_keeps_tail() {
        let long = "x".repeat(20 * 1024);
        let out = format_output(&long, "");
        assert_eq!(out.len(), 10 * 1024);
    }
}
