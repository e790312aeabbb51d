use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const FORGE_DIR: &str = ".forge";
pub const STATE_FILE: &str = ".forge/state.json";
pub const CONFIG_FILE: &str = ".forge/config.yaml";

/// Project-local override root for fragments and rule blocks.
pub const OVERRIDE_TEMPLATES_DIR: &str = ".forge/templates";

/// Fallback template root inside a project checkout.
pub const PROJECT_TEMPLATES_DIR: &str = "templates";

/// Fallback template root under the user's home directory.
pub const USER_TEMPLATES_DIR: &str = ".local/share/forge/templates";

pub const AGENTS_DIR: &str = "agents";
pub const RULES_DIR: &str = "rules";

/// Fragment categories probed under every template root, in priority order.
pub const CATEGORY_DIRS: &[&str] = &["blocks", "instructions", "personas", "agents", "workflows"];

pub const DEFAULT_PROJECT_NAME: &str = "Project";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn forge_dir(root: &Path) -> PathBuf {
    root.join(FORGE_DIR)
}

pub fn state_path(root: &Path) -> PathBuf {
    root.join(STATE_FILE)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn override_templates_dir(root: &Path) -> PathBuf {
    root.join(OVERRIDE_TEMPLATES_DIR)
}

pub fn override_agents_dir(root: &Path) -> PathBuf {
    override_templates_dir(root).join(AGENTS_DIR)
}

/// Pick the fallback template root: the first existing directory among an
/// explicit choice, `<root>/templates` and `~/.local/share/forge/templates`.
pub fn fallback_templates_dir(root: &Path, explicit: Option<&Path>) -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Some(p) = explicit {
        candidates.push(if p.is_absolute() { p.to_path_buf() } else { root.join(p) });
    }
    candidates.push(root.join(PROJECT_TEMPLATES_DIR));
    if let Some(home) = home::home_dir() {
        candidates.push(home.join(USER_TEMPLATES_DIR));
    }
    candidates.into_iter().find(|p| p.is_dir())
}

/// Name derived from the project directory, `"Project"` when it has none.
pub fn project_name(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| DEFAULT_PROJECT_NAME.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn path_helpers() {
        let root = Path::new("/tmp/proj");
        assert_eq!(state_path(root), PathBuf::from("/tmp/proj/.forge/state.json"));
        assert_eq!(config_path(root), PathBuf::from("/tmp/proj/.forge/config.yaml"));
        assert_eq!(
            override_agents_dir(root),
            PathBuf::from("/tmp/proj/.forge/templates/agents")
        );
    }

    #[test]
    fn project_name_from_dir() {
        assert_eq!(project_name(Path::new("/work/my-app")), "my-app");
        assert_eq!(project_name(Path::new("/")), DEFAULT_PROJECT_NAME);
    }

    #[test]
    fn fallback_prefers_explicit_dir() {
        let dir = TempDir::new().unwrap();
        let custom = dir.path().join("custom");
        std::fs::create_dir_all(&custom).unwrap();
        std::fs::create_dir_all(dir.path().join("templates")).unwrap();

        let found = fallback_templates_dir(dir.path(), Some(Path::new("custom"))).unwrap();
        assert_eq!(found, custom);
    }

    #[test]
    fn fallback_uses_project_templates() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("templates")).unwrap();
        let found = fallback_templates_dir(dir.path(), Some(Path::new("missing"))).unwrap();
        assert_eq!(found, dir.path().join("templates"));
    }
}
