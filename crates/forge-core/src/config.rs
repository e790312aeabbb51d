use crate::compiler::DEFAULT_MAX_DEPTH;
use crate::error::Result;
use crate::gate::QualityCheck;
use crate::paths;
use crate::rules::{self, DEFAULT_OUTPUT, DEFAULT_ROLE};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

impl ConfigWarning {
    fn warning(message: String) -> Self {
        Self {
            level: WarnLevel::Warning,
            message,
        }
    }

    fn error(message: String) -> Self {
        Self {
            level: WarnLevel::Error,
            message,
        }
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilerConfig {
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulesConfig {
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

fn default_role() -> String {
    DEFAULT_ROLE.to_string()
}

fn default_output() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT)
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            role: default_role(),
            output: default_output(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

/// Project settings stored in `.forge/config.yaml`. Every section is
/// optional on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    pub project: ProjectConfig,
    #[serde(default)]
    pub compiler: CompilerConfig,
    /// Fallback template root; relative paths are taken from the project root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templates_dir: Option<PathBuf>,
    #[serde(default)]
    pub rules: RulesConfig,
    /// Quality checks per stack tag, replacing the built-in ones for that tag.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub gates: BTreeMap<String, Vec<QualityCheck>>,
}

fn default_version() -> u32 {
    1
}

impl Config {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            version: default_version(),
            project: ProjectConfig {
                name: project_name.into(),
                description: None,
            },
            compiler: CompilerConfig::default(),
            templates_dir: None,
            rules: RulesConfig::default(),
            gates: BTreeMap::new(),
        }
    }

    /// Load the project config. A project without a config file gets the
    /// defaults, named after its directory.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::new(paths::project_name(root)));
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&paths::config_path(root), data.as_bytes())
    }

    /// Write the config only when none exists yet. Returns true if written.
    pub fn save_if_missing(&self, root: &Path) -> Result<bool> {
        let data = serde_yaml::to_string(self)?;
        crate::io::write_if_missing(&paths::config_path(root), data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.project.name.trim().is_empty() {
            warnings.push(ConfigWarning::error("project.name is empty".to_string()));
        }

        if self.compiler.max_depth == 0 {
            warnings.push(ConfigWarning::warning(
                "compiler.max_depth is 0: no transclusion will be expanded".to_string(),
            ));
        } else if self.compiler.max_depth > 100 {
            warnings.push(ConfigWarning::warning(format!(
                "compiler.max_depth={} (>100 is unusual)",
                self.compiler.max_depth
            )));
        }

        if self.rules.role.trim().is_empty() {
            warnings.push(ConfigWarning::error("rules.role is empty".to_string()));
        }

        for (tag, checks) in &self.gates {
            if rules::parse_tag(tag).is_err() {
                warnings.push(ConfigWarning::error(format!(
                    "gates key '{tag}' is not a <category>/<name> stack tag"
                )));
            }

            let mut seen = BTreeSet::new();
            for check in checks {
                if check.program.trim().is_empty() {
                    warnings.push(ConfigWarning::warning(format!(
                        "gate '{}' on '{}' has an empty program",
                        check.name, tag
                    )));
                }
                if !seen.insert(check.name.as_str()) {
                    warnings.push(ConfigWarning::warning(format!(
                        "gate '{}' is listed more than once on '{}'",
                        check.name, tag
                    )));
                }
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::new("test-project");
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, cfg);
        assert_eq!(parsed.compiler.max_depth, 10);
        assert_eq!(parsed.rules.role, "developer");
    }

    #[test]
    fn minimal_yaml_gets_defaults() {
        let cfg: Config = serde_yaml::from_str("project:\n  name: demo\n").unwrap();
        assert_eq!(cfg.version, 1);
        assert_eq!(cfg.compiler.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(cfg.rules.output, PathBuf::from(".cursorrules"));
        assert!(cfg.templates_dir.is_none());
        assert!(cfg.gates.is_empty());
    }

    #[test]
    fn gates_not_serialized_when_empty() {
        let yaml = serde_yaml::to_string(&Config::new("p")).unwrap();
        assert!(!yaml.contains("gates"));
        assert!(!yaml.contains("templates_dir"));
    }

    #[test]
    fn gates_parse_per_tag() {
        let yaml = r#"
project:
  name: demo
gates:
  languages/python:
    - name: lint
      program: ruff
      args: [check, .]
    - name: tests
      program: pytest
"#;
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        let checks = &cfg.gates["languages/python"];
        assert_eq!(checks.len(), 2);
        assert_eq!(checks[0].args, vec!["check", "."]);
        assert!(checks[1].args.is_empty());
    }

    #[test]
    fn load_missing_file_uses_directory_name() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("shop");
        std::fs::create_dir_all(&root).unwrap();
        let cfg = Config::load(&root).unwrap();
        assert_eq!(cfg.project.name, "shop");
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::new("demo");
        cfg.compiler.max_depth = 4;
        cfg.templates_dir = Some(PathBuf::from("vendor/templates"));
        cfg.save(dir.path()).unwrap();

        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn save_if_missing_keeps_existing_config() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::new("demo");
        cfg.compiler.max_depth = 3;
        assert!(cfg.save_if_missing(dir.path()).unwrap());
        assert!(!Config::new("other").save_if_missing(dir.path()).unwrap());

        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.project.name, "demo");
        assert_eq!(loaded.compiler.max_depth, 3);
    }

    #[test]
    fn load_rejects_malformed_yaml() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".forge")).unwrap();
        std::fs::write(dir.path().join(".forge/config.yaml"), "project: [unclosed").unwrap();
        assert!(Config::load(dir.path()).is_err());
    }

    #[test]
    fn validate_valid_config_no_warnings() {
        assert!(Config::new("test-project").validate().is_empty());
    }

    #[test]
    fn validate_zero_depth_warning() {
        let mut cfg = Config::new("p");
        cfg.compiler.max_depth = 0;
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].level, WarnLevel::Warning);
    }

    #[test]
    fn validate_bad_gate_tag_is_error() {
        let mut cfg = Config::new("p");
        cfg.gates.insert(
            "python".to_string(),
            vec![QualityCheck::new("tests", "pytest", &[])],
        );
        let warnings = cfg.validate();
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Error && w.message.contains("'python'")));
    }

    #[test]
    fn validate_empty_program_and_duplicates() {
        let mut cfg = Config::new("p");
        cfg.gates.insert(
            "languages/java".to_string(),
            vec![
                QualityCheck::new("tests", "", &[]),
                QualityCheck::new("tests", "mvn", &["test"]),
            ],
        );
        let warnings = cfg.validate();
        assert!(warnings.iter().any(|w| w.message.contains("empty program")));
        assert!(warnings.iter().any(|w| w.message.contains("more than once")));
    }

    #[test]
    fn validate_empty_role_is_error() {
        let mut cfg = Config::new("p");
        cfg.rules.role = " ".to_string();
        assert!(cfg.validate().iter().any(|w| w.level == WarnLevel::Error));
    }
}
