//! Path-pattern classification and focus-based result promotion.

use serde::{Deserialize, Serialize};

/// Search-time hint for which category of file the caller wants promoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchFocus {
    Code,
    Tests,
    Docs,
}

/// Category a result path falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathCategory {
    Code,
    Tests,
    Docs,
}

impl SearchFocus {
    fn matches(self, category: PathCategory) -> bool {
        matches!(
            (self, category),
            (SearchFocus::Code, PathCategory::Code)
                | (SearchFocus::Tests, PathCategory::Tests)
                | (SearchFocus::Docs, PathCategory::Docs)
        )
    }
}

const TEST_PATTERNS: &[&str] = &[".test.", ".spec.", "/tests/", "/__tests__/", "_test."];
const DOC_EXTENSIONS: &[&str] = &["md", "markdown", "txt", "rst"];

/// Classify a result path as tests, docs, or code (the default).
pub fn classify_path(path: &str) -> PathCategory {
    let normalized = path.replace('\\', "/");
    let lowered = normalized.to_lowercase();

    if TEST_PATTERNS.iter().any(|p| lowered.contains(p))
        || lowered.starts_with("tests/")
        || lowered.starts_with("__tests__/")
    {
        return PathCategory::Tests;
    }

    let extension = lowered.rsplit('.').next().unwrap_or("");
    if DOC_EXTENSIONS.contains(&extension) {
        return PathCategory::Docs;
    }

    PathCategory::Code
}

/// Stable-partition results so entries matching the focus lead, keeping
/// relative order within both groups.
pub fn promote_focus<T, F>(results: Vec<T>, focus: SearchFocus, path_of: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    let mut focused = Vec::new();
    let mut rest = Vec::new();

    for result in results {
        if focus.matches(classify_path(path_of(&result))) {
            focused.push(result);
        } else {
            rest.push(result);
        }
    }

    focused.extend(rest);
    focused
}
