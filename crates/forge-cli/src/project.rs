use anyhow::Context;
use forge_core::{
    compiler::Compiler,
    config::Config,
    gate::GatePlan,
    paths,
    rules::{self, RuleLibrary},
    search::SearchPaths,
    state::StateStore,
    workflow::PhaseController,
    ForgeError,
};
use std::path::{Path, PathBuf};

/// Everything a command needs to work on one project: its root, its config
/// and the template root fragments fall back to.
pub struct Project {
    pub root: PathBuf,
    pub config: Config,
    pub fallback: Option<PathBuf>,
}

impl Project {
    pub fn open(root: &Path, templates: Option<&Path>) -> anyhow::Result<Self> {
        let config = Config::load(root).context("failed to load config")?;
        let fallback = fallback_root(root, &config, templates);
        match &fallback {
            Some(dir) => tracing::debug!(fallback = %dir.display(), "template fallback root"),
            None => tracing::debug!("no template fallback root found"),
        }
        Ok(Self {
            root: root.to_path_buf(),
            config,
            fallback,
        })
    }

    pub fn search_paths(&self) -> SearchPaths {
        SearchPaths::for_project(&self.root, self.fallback.as_deref())
    }

    /// Compiler whose links are relative to the invoking directory.
    pub fn compiler(&self) -> Compiler {
        let cwd = std::env::current_dir().unwrap_or_else(|_| self.root.clone());
        Compiler::new(self.search_paths(), cwd).with_max_depth(self.config.compiler.max_depth)
    }

    pub fn rule_library(&self) -> RuleLibrary {
        RuleLibrary::for_project(&self.root, self.fallback.as_deref())
    }

    pub fn stack(&self) -> Vec<String> {
        rules::detect_stack(&self.root)
    }

    pub fn gate_plan(&self) -> GatePlan {
        GatePlan::for_tags(&self.stack(), &self.config.gates)
    }

    /// Phase controller over the initialized project's state.
    pub fn controller(&self) -> anyhow::Result<PhaseController> {
        let store = open_store(&self.root)?;
        Ok(PhaseController::new(store, self.compiler(), self.gate_plan()))
    }
}

/// State store of an initialized project.
pub fn open_store(root: &Path) -> anyhow::Result<StateStore> {
    let store = StateStore::new(root);
    if !store.exists() {
        return Err(ForgeError::NotInitialized.into());
    }
    Ok(store)
}

/// First existing directory among the configured `templates_dir` (relative
/// to the project root), the `--templates` flag, `<root>/templates` and the
/// user template directory.
pub fn fallback_root(root: &Path, config: &Config, flag: Option<&Path>) -> Option<PathBuf> {
    let configured = config.templates_dir.as_deref().map(|p| root.join(p));
    configured
        .into_iter()
        .chain(flag.map(Path::to_path_buf))
        .find(|p| p.is_dir())
        .or_else(|| paths::fallback_templates_dir(root, None))
}
