use crate::compiler::{strip_frontmatter, Compiler};
use crate::error::{ForgeError, Result};
use crate::paths;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Persona used when no role is given.
pub const DEFAULT_ROLE: &str = "developer";

/// Blocks included in every compiled rule set, after the persona.
pub const CORE_BLOCKS: &[(&str, &str)] = &[("core", "behavior"), ("core", "tdd")];

pub const DEFAULT_OUTPUT: &str = ".cursorrules";

// ---------------------------------------------------------------------------
// Stack detection
// ---------------------------------------------------------------------------

/// Detect stack tags (`<category>/<name>`) from well-known manifest files in
/// `project`.
pub fn detect_stack(project: &Path) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();

    let python_manifests: Vec<PathBuf> = ["pyproject.toml", "requirements.txt"]
        .iter()
        .map(|f| project.join(f))
        .filter(|p| p.is_file())
        .collect();
    if !python_manifests.is_empty() {
        tags.push("languages/python".to_string());
        let content: String = python_manifests
            .iter()
            .filter_map(|p| std::fs::read_to_string(p).ok())
            .collect::<Vec<_>>()
            .join("\n")
            .to_lowercase();
        for (needle, tag) in [("fastapi", "frameworks/fastapi"), ("django", "frameworks/django")] {
            if content.contains(needle) {
                tags.push(tag.to_string());
            }
        }
    }

    let package_json = project.join("package.json");
    if package_json.is_file() {
        let content = std::fs::read_to_string(&package_json).unwrap_or_default();
        let deps = node_dependencies(&content);
        let has = |name: &str| match &deps {
            Some(set) => set.contains(name),
            None => content.contains(name),
        };
        if has("typescript") || project.join("tsconfig.json").is_file() {
            tags.push("languages/typescript".to_string());
        }
        for (dep, tag) in [
            ("next", "frameworks/nextjs"),
            ("react", "frameworks/react"),
            ("tailwindcss", "frameworks/tailwind"),
        ] {
            if has(dep) {
                tags.push(tag.to_string());
            }
        }
    }

    if ["pom.xml", "build.gradle", "build.gradle.kts"]
        .iter()
        .any(|f| project.join(f).is_file())
    {
        tags.push("languages/java".to_string());
    }

    tracing::debug!(?tags, project = %project.display(), "detected stack");
    tags
}

/// Dependency names declared in a `package.json`, or `None` when it is not
/// valid JSON.
fn node_dependencies(content: &str) -> Option<BTreeSet<String>> {
    let value: serde_json::Value = serde_json::from_str(content).ok()?;
    let mut names = BTreeSet::new();
    for section in ["dependencies", "devDependencies", "peerDependencies"] {
        if let Some(map) = value.get(section).and_then(|v| v.as_object()) {
            names.extend(map.keys().cloned());
        }
    }
    Some(names)
}

/// Split a `<category>/<name>` tag.
pub fn parse_tag(tag: &str) -> Result<(&str, &str)> {
    match tag.split_once('/') {
        Some((category, name)) if !category.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok((category, name))
        }
        _ => Err(ForgeError::InvalidTag(tag.to_string())),
    }
}

// ---------------------------------------------------------------------------
// RuleLibrary
// ---------------------------------------------------------------------------

/// Rule blocks laid out as `<root>/<category>/<name>.md`, searched in order.
#[derive(Debug, Clone, Default)]
pub struct RuleLibrary {
    roots: Vec<PathBuf>,
}

impl RuleLibrary {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// `<root>/.forge/templates/rules` overriding `<fallback>/rules`.
    pub fn for_project(root: &Path, fallback_root: Option<&Path>) -> Self {
        let mut roots = vec![paths::override_templates_dir(root).join(paths::RULES_DIR)];
        if let Some(fallback) = fallback_root {
            roots.push(fallback.join(paths::RULES_DIR));
        }
        Self::new(roots)
    }

    pub fn find(&self, category: &str, name: &str) -> Option<PathBuf> {
        let file = format!("{name}.md");
        self.roots
            .iter()
            .map(|r| r.join(category).join(&file))
            .find(|p| p.is_file())
    }

    /// Raw text of a rule block, or an inline marker when it does not exist.
    pub fn load_block(&self, category: &str, name: &str) -> String {
        match self.find(category, name).map(std::fs::read_to_string) {
            Some(Ok(text)) => text,
            Some(Err(e)) => {
                tracing::warn!(category, name, error = %e, "failed to read rule block");
                missing_block_marker(category, name)
            }
            None => missing_block_marker(category, name),
        }
    }

    /// Assemble a rule set: the persona, the core blocks, then one block per
    /// stack tag. Each block is stripped of frontmatter and compiled; blank
    /// blocks are dropped and the rest joined by a blank line.
    pub fn compile(&self, compiler: &Compiler, role: &str, tags: &[String]) -> Result<String> {
        let mut blocks: Vec<(String, String)> = vec![("roles".to_string(), role.to_string())];
        blocks.extend(
            CORE_BLOCKS
                .iter()
                .map(|(c, n)| (c.to_string(), n.to_string())),
        );
        for tag in tags {
            let (category, name) = parse_tag(tag)?;
            blocks.push((category.to_string(), name.to_string()));
        }

        let rendered: Vec<String> = blocks
            .iter()
            .map(|(category, name)| {
                let raw = self.load_block(category, name);
                compiler.compile(strip_frontmatter(&raw))
            })
            .filter(|text| !text.trim().is_empty())
            .collect();
        Ok(rendered.join("\n\n"))
    }
}

pub fn missing_block_marker(category: &str, name: &str) -> String {
    format!("<!-- Missing rule block: {category}/{name} -->")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchPaths;
    use tempfile::TempDir;

    #[test]
    fn detect_python() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("pyproject.toml"), "").unwrap();
        assert_eq!(detect_stack(dir.path()), vec!["languages/python"]);
    }

    #[test]
    fn detect_python_frameworks() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("requirements.txt"), "FastAPI==0.110\nuvicorn\n").unwrap();
        let tags = detect_stack(dir.path());
        assert!(tags.contains(&"frameworks/fastapi".to_string()));
        assert!(!tags.contains(&"frameworks/django".to_string()));
    }

    #[test]
    fn detect_java() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("pom.xml"), "").unwrap();
        assert!(detect_stack(dir.path()).contains(&"languages/java".to_string()));
    }

    #[test]
    fn detect_react_tailwind() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("package.json"),
            r#"{"dependencies": {"react": "18", "tailwindcss": "3"}}"#,
        )
        .unwrap();
        let tags = detect_stack(dir.path());
        assert!(tags.contains(&"frameworks/react".to_string()));
        assert!(tags.contains(&"frameworks/tailwind".to_string()));
        assert!(!tags.contains(&"frameworks/nextjs".to_string()));
        assert!(!tags.contains(&"languages/typescript".to_string()));
    }

    #[test]
    fn detect_typescript_from_dev_dependencies() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("package.json"),
            r#"{"devDependencies": {"typescript": "5"}, "dependencies": {"next": "14"}}"#,
        )
        .unwrap();
        let tags = detect_stack(dir.path());
        assert!(tags.contains(&"languages/typescript".to_string()));
        assert!(tags.contains(&"frameworks/nextjs".to_string()));
    }

    #[test]
    fn malformed_package_json_falls_back_to_substring() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("package.json"), "{ react, ").unwrap();
        assert!(detect_stack(dir.path()).contains(&"frameworks/react".to_string()));
    }

    #[test]
    fn empty_project_has_no_tags() {
        let dir = TempDir::new().unwrap();
        assert!(detect_stack(dir.path()).is_empty());
    }

    #[test]
    fn parse_tag_requires_category_and_name() {
        assert_eq!(parse_tag("languages/python").unwrap(), ("languages", "python"));
        assert!(parse_tag("python").is_err());
        assert!(parse_tag("/python").is_err());
        assert!(parse_tag("a/b/c").is_err());
    }

    #[test]
    fn missing_block_yields_marker() {
        let dir = TempDir::new().unwrap();
        let lib = RuleLibrary::new(vec![dir.path().to_path_buf()]);
        let content = lib.load_block("core", "missing");
        assert!(content.contains("Missing rule block"));
    }

    #[test]
    fn override_root_wins() {
        let dir = TempDir::new().unwrap();
        let over = dir.path().join(".forge/templates/rules/core");
        let fall = dir.path().join("templates/rules/core");
        std::fs::create_dir_all(&over).unwrap();
        std::fs::create_dir_all(&fall).unwrap();
        std::fs::write(over.join("tdd.md"), "local").unwrap();
        std::fs::write(fall.join("tdd.md"), "packaged").unwrap();

        let lib = RuleLibrary::for_project(dir.path(), Some(&dir.path().join("templates")));
        assert_eq!(lib.load_block("core", "tdd"), "local");
    }

    #[test]
    fn compile_assembles_blocks_in_order() {
        let dir = TempDir::new().unwrap();
        let rules = dir.path().join("rules");
        for (cat, name, body) in [
            ("roles", "developer", "---\ntitle: dev\n---\nRole: Developer"),
            ("core", "behavior", "Behavior: Be nice ![[tone]]"),
            ("core", "tdd", "   \n"),
            ("languages", "python", "Python: use pytest"),
        ] {
            std::fs::create_dir_all(rules.join(cat)).unwrap();
            std::fs::write(rules.join(cat).join(format!("{name}.md")), body).unwrap();
        }
        let blocks = dir.path().join("blocks");
        std::fs::create_dir_all(&blocks).unwrap();
        std::fs::write(blocks.join("tone.md"), "and calm").unwrap();

        let lib = RuleLibrary::new(vec![rules]);
        let compiler = Compiler::new(SearchPaths::new([blocks]), dir.path());
        let out = lib
            .compile(&compiler, "developer", &["languages/python".to_string()])
            .unwrap();
        assert_eq!(
            out,
            "Role: Developer\n\nBehavior: Be nice and calm\n\nPython: use pytest"
        );
    }

    #[test]
    fn compile_rejects_malformed_tag() {
        let dir = TempDir::new().unwrap();
        let lib = RuleLibrary::new(vec![dir.path().to_path_buf()]);
        let compiler = Compiler::new(SearchPaths::default(), dir.path());
        let err = lib
            .compile(&compiler, DEFAULT_ROLE, &["python".to_string()])
            .unwrap_err();
        assert!(matches!(err, ForgeError::InvalidTag(_)));
    }
}
