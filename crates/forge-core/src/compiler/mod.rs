//! Markdown template compiler.
//!
//! Two markers are understood inside a document:
//!
//! - `![[name]]` transcludes the fragment `name`: its frontmatter is stripped
//!   and its body is compiled recursively before it replaces the marker.
//! - `[[name]]` links to the fragment `name` and is rewritten to
//!   `@<path>`, relative to the working directory when possible.
//!
//! Compilation never fails. A missing transclusion becomes an inline HTML
//! comment, an unresolved link is left as written, and a branch nested deeper
//! than `max_depth` stops expanding and is flagged inline. The depth ceiling
//! is what bounds self-referencing fragments.

pub mod frontmatter;
pub mod resolve;

pub use frontmatter::strip_frontmatter;
pub use resolve::resolve;

use crate::error::Result;
use crate::search::SearchPaths;
use regex::{Captures, Regex};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub const DEFAULT_MAX_DEPTH: usize = 10;

pub const DEPTH_EXCEEDED_MARKER: &str = "<!-- Error: Recursion depth exceeded -->";

pub fn not_found_marker(name: &str) -> String {
    format!("<!-- Error: Transclusion not found: {name} -->")
}

fn unreadable_marker(name: &str, err: &std::io::Error) -> String {
    format!("<!-- Error: Transclusion unreadable: {name} ({err}) -->")
}

// Marker content is the shortest text up to the next `]]` on the same line.
static TRANSCLUSION_RE: OnceLock<Regex> = OnceLock::new();
static LINK_RE: OnceLock<Regex> = OnceLock::new();

fn transclusion_re() -> &'static Regex {
    TRANSCLUSION_RE.get_or_init(|| Regex::new(r"!\[\[(.*?)\]\]").unwrap())
}

// The optional `!` is captured so that a transclusion left behind by the
// depth ceiling is not mistaken for a link.
fn link_re() -> &'static Regex {
    LINK_RE.get_or_init(|| Regex::new(r"(!?)\[\[(.*?)\]\]").unwrap())
}

// ---------------------------------------------------------------------------
// Compiler
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Compiler {
    search_paths: SearchPaths,
    working_dir: PathBuf,
    max_depth: usize,
}

impl Compiler {
    /// `working_dir` is the directory rewritten links are made relative to.
    pub fn new(search_paths: SearchPaths, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            search_paths,
            working_dir: working_dir.into(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn compile(&self, content: &str) -> String {
        self.compile_at(content, 0)
    }

    /// Expand all transclusions, then rewrite links, in `content` found at
    /// nesting level `depth`.
    pub fn compile_at(&self, content: &str, depth: usize) -> String {
        if depth > self.max_depth {
            tracing::warn!(depth, max_depth = self.max_depth, "transclusion depth exceeded");
            return format!("{content}\n{DEPTH_EXCEEDED_MARKER}");
        }

        let expanded = transclusion_re().replace_all(content, |caps: &Captures| {
            self.transclude(caps[1].trim(), depth)
        });

        link_re()
            .replace_all(&expanded, |caps: &Captures| self.rewrite_link(caps))
            .into_owned()
    }

    /// Compile the fragment `name` as if the document were `![[name]]`.
    pub fn render_fragment(&self, name: &str) -> String {
        self.compile(&format!("![[{name}]]"))
    }

    /// Read a markdown file, drop its frontmatter and compile the rest.
    pub fn compile_file(&self, path: &Path) -> Result<String> {
        let text = std::fs::read_to_string(path)?;
        Ok(self.compile(strip_frontmatter(&text)))
    }

    fn transclude(&self, name: &str, depth: usize) -> String {
        let Some(path) = resolve(name, &self.search_paths) else {
            tracing::debug!(fragment = name, "transclusion not found");
            return not_found_marker(name);
        };
        match std::fs::read_to_string(&path) {
            Ok(text) => self.compile_at(strip_frontmatter(&text), depth + 1),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read fragment");
                unreadable_marker(name, &e)
            }
        }
    }

    fn rewrite_link(&self, caps: &Captures) -> String {
        let whole = &caps[0];
        if &caps[1] == "!" {
            return whole.to_string();
        }
        match resolve(caps[2].trim(), &self.search_paths) {
            Some(path) => format!("@{}", self.link_path(&path).display()),
            None => whole.to_string(),
        }
    }

    /// `path` relative to the working directory, or absolute when it lies
    /// outside of it.
    fn link_path(&self, path: &Path) -> PathBuf {
        let absolute = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        let base = std::fs::canonicalize(&self.working_dir)
            .unwrap_or_else(|_| self.working_dir.clone());
        match absolute.strip_prefix(&base) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => absolute,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
