use ignore::WalkBuilder;
use log::debug;
use std::path::{Path, PathBuf};

/// Path segments that are never indexed: dependency trees, VCS metadata,
/// build artifacts.
const EXCLUDED_SEGMENTS: &[&str] = &[
    "node_modules",
    ".git",
    ".hg",
    ".svn",
    "target",
    "dist",
    "build",
    "out",
    "vendor",
    "__pycache__",
    ".venv",
    "venv",
    ".idea",
    ".vscode",
];

/// Extensions accepted for indexing: code plus the text formats the
/// search focus can classify as docs.
const INDEXABLE_EXTENSIONS: &[&str] = &[
    "rs", "py", "pyw", "pyi", "js", "jsx", "mjs", "cjs", "ts", "tsx", "mts", "cts", "go", "java",
    "c", "h", "cpp", "cc", "cxx", "hpp", "hxx", "cs", "rb", "sh", "bash", "php", "swift", "kt",
    "scala", "vue", "svelte", "md", "markdown", "txt", "rst",
];

/// One file discovered under the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkedFile {
    /// Absolute path on disk.
    pub abs_path: PathBuf,

    /// Root-relative path with `/` separators, regardless of platform.
    pub rel_path: String,
}

/// Result of a project walk.
#[derive(Debug)]
pub struct WalkOutcome {
    /// Discovered files, sorted by relative path.
    pub files: Vec<WalkedFile>,

    /// Whether a `max_files` cap cut the walk short. Stale-file cleanup is
    /// unsafe against a truncated walk, so callers need to know.
    pub truncated: bool,
}

/// Enumerate indexable files under a root.
///
/// Missing or unreadable directories contribute an empty listing rather
/// than an error; the walk itself never mutates anything.
pub fn walk_project(root: &Path, max_files: Option<usize>) -> WalkOutcome {
    if !root.is_dir() {
        return WalkOutcome {
            files: Vec::new(),
            truncated: false,
        };
    }

    let walker = WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .git_exclude(true)
        .require_git(false)
        .build();

    let mut files = Vec::new();
    for entry in walker.flatten() {
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        let path = entry.path();
        if !is_indexable(path) {
            continue;
        }

        let rel_path = relative_path(root, path);
        if has_excluded_segment(&rel_path) {
            continue;
        }

        files.push(WalkedFile {
            abs_path: path.to_path_buf(),
            rel_path,
        });
    }

    // Deterministic ordering keeps batch commits and progress stable.
    files.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));

    let truncated = max_files.is_some_and(|cap| files.len() > cap);
    if let Some(cap) = max_files {
        files.truncate(cap);
    }

    debug!(
        "walk of {} found {} files (truncated: {})",
        root.display(),
        files.len(),
        truncated
    );

    WalkOutcome { files, truncated }
}

/// Whether a file's extension is on the indexing allowlist.
pub fn is_indexable(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| INDEXABLE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn has_excluded_segment(rel_path: &str) -> bool {
    rel_path
        .split('/')
        .any(|segment| EXCLUDED_SEGMENTS.contains(&segment))
}

fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "content").unwrap();
    }

    #[test]
    fn test_discovers_code_files() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "src/main.rs");
        touch(dir.path(), "src/util.py");
        touch(dir.path(), "image.png");

        let outcome = walk_project(dir.path(), None);
        let rels: Vec<&str> = outcome.files.iter().map(|f| f.rel_path.as_str()).collect();

        assert_eq!(rels, vec!["src/main.rs", "src/util.py"]);
        assert!(!outcome.truncated);
    }

    #[test]
    fn test_excludes_dependency_and_build_dirs() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "src/app.ts");
        touch(dir.path(), "node_modules/pkg/index.js");
        touch(dir.path(), "target/debug/gen.rs");
        touch(dir.path(), "vendor/lib.go");

        let outcome = walk_project(dir.path(), None);
        let rels: Vec<&str> = outcome.files.iter().map(|f| f.rel_path.as_str()).collect();

        assert_eq!(rels, vec!["src/app.ts"]);
    }

    #[test]
    fn test_docs_are_indexable() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "README.md");
        touch(dir.path(), "docs/guide.rst");

        let outcome = walk_project(dir.path(), None);
        assert_eq!(outcome.files.len(), 2);
    }

    #[test]
    fn test_max_files_cap_reports_truncation() {
        let dir = TempDir::new().unwrap();
        for i in 0..5 {
            touch(dir.path(), &format!("src/file_{i}.rs"));
        }

        let outcome = walk_project(dir.path(), Some(3));
        assert_eq!(outcome.files.len(), 3);
        assert!(outcome.truncated);

        let uncapped = walk_project(dir.path(), Some(5));
        assert!(!uncapped.truncated);
    }

    #[test]
    fn test_missing_root_yields_empty_listing() {
        let outcome = walk_project(Path::new("/definitely/not/here"), None);
        assert!(outcome.files.is_empty());
        assert!(!outcome.truncated);
    }

    #[test]
    fn test_relative_paths_use_forward_slashes() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a/b/c.rs");

        let outcome = walk_project(dir.path(), None);
        assert_eq!(outcome.files[0].rel_path, "a/b/c.rs");
        assert!(outcome.files[0].abs_path.is_absolute());
    }

    #[test]
    fn test_ordering_is_deterministic() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "z.rs");
        touch(dir.path(), "a.rs");
        touch(dir.path(), "m.rs");

        let rels: Vec<String> = walk_project(dir.path(), None)
            .files
            .into_iter()
            .map(|f| f.rel_path)
            .collect();
        assert_eq!(rels, vec!["a.rs", "m.rs", "z.rs"]);
    }

    #[test]
    fn test_is_indexable() {
        assert!(is_indexable(Path::new("lib.rs")));
        assert!(is_indexable(Path::new("notes.md")));
        assert!(!is_indexable(Path::new("binary.png")));
        assert!(!is_indexable(Path::new("Makefile")));
    }
}
