use crate::search::SearchPaths;
use std::path::{Component, Path, PathBuf};

pub const FRAGMENT_EXT: &str = ".md";

/// File name probed for a fragment reference: `name` with `.md` appended
/// unless it already ends in `.md`.
pub fn fragment_file_name(name: &str) -> String {
    if name.ends_with(FRAGMENT_EXT) {
        name.to_string()
    } else {
        format!("{name}{FRAGMENT_EXT}")
    }
}

/// Find a fragment in the search paths. The first directory holding the
/// file wins.
///
/// References that are absolute or climb with `..` would escape the listed
/// directories and never resolve.
pub fn resolve(name: &str, search_paths: &SearchPaths) -> Option<PathBuf> {
    if name.is_empty() || escapes(Path::new(name)) {
        return None;
    }
    let file = fragment_file_name(name);
    let found = search_paths
        .dirs()
        .iter()
        .map(|dir| dir.join(&file))
        .find(|candidate| candidate.is_file());
    tracing::debug!(fragment = name, found = ?found, "resolved fragment");
    found
}

fn escapes(path: &Path) -> bool {
    path.components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn two_dirs() -> (TempDir, PathBuf, PathBuf) {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("dirA");
        let b = dir.path().join("dirB");
        std::fs::create_dir_all(&a).unwrap();
        std::fs::create_dir_all(&b).unwrap();
        (dir, a, b)
    }

    #[test]
    fn appends_md_extension() {
        assert_eq!(fragment_file_name("plan"), "plan.md");
        assert_eq!(fragment_file_name("plan.md"), "plan.md");
    }

    #[test]
    fn first_directory_wins() {
        let (_dir, a, b) = two_dirs();
        std::fs::write(a.join("ref.md"), "A").unwrap();
        std::fs::write(b.join("ref.md"), "B").unwrap();

        let sp = SearchPaths::new([a.clone(), b]);
        assert_eq!(resolve("ref", &sp), Some(a.join("ref.md")));
    }

    #[test]
    fn falls_through_to_later_directory() {
        let (_dir, a, b) = two_dirs();
        std::fs::write(b.join("ref.md"), "B").unwrap();

        let sp = SearchPaths::new([a, b.clone()]);
        assert_eq!(resolve("ref.md", &sp), Some(b.join("ref.md")));
    }

    #[test]
    fn missing_fragment_is_none() {
        let (_dir, a, b) = two_dirs();
        let sp = SearchPaths::new([a, b]);
        assert_eq!(resolve("nope", &sp), None);
        assert_eq!(resolve("", &sp), None);
    }

    #[test]
    fn parent_references_never_resolve() {
        let (dir, a, _b) = two_dirs();
        std::fs::write(dir.path().join("secret.md"), "outside").unwrap();
        let sp = SearchPaths::new([a]);
        assert_eq!(resolve("../secret", &sp), None);
    }

    #[test]
    fn directories_are_not_fragments() {
        let (_dir, a, _b) = two_dirs();
        std::fs::create_dir_all(a.join("folder.md")).unwrap();
        let sp = SearchPaths::new([a]);
        assert_eq!(resolve("folder", &sp), None);
    }
}
