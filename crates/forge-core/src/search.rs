use crate::paths;
use std::path::{Path, PathBuf};

/// Ordered list of directories fragments are resolved against, highest
/// priority first.
///
/// Directories that do not exist are dropped when the list is built, so the
/// resolver never has to re-check them per lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPaths {
    dirs: Vec<PathBuf>,
}

impl SearchPaths {
    pub fn new<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let dirs = dirs
            .into_iter()
            .map(Into::<PathBuf>::into)
            .filter(|d| d.is_dir())
            .collect();
        Self { dirs }
    }

    /// Category directories under each root: every category of the override
    /// root comes before any category of the fallback root.
    pub fn from_roots(override_root: Option<&Path>, fallback_root: Option<&Path>) -> Self {
        let dirs = [override_root, fallback_root]
            .into_iter()
            .flatten()
            .flat_map(|root| paths::CATEGORY_DIRS.iter().map(move |c| root.join(c)));
        Self::new(dirs)
    }

    /// Search paths for a project: `<root>/.forge/templates` overriding the
    /// fallback template root.
    pub fn for_project(root: &Path, fallback_root: Option<&Path>) -> Self {
        let override_root = paths::override_templates_dir(root);
        Self::from_roots(Some(&override_root), fallback_root)
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
