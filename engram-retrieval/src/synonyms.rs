//! Static synonym expansion for the lexical search branch.

/// Synonym table for common code-search vocabulary. Lookup is by exact
/// term and by simple suffix-stripped forms, so "testing" reaches the
/// "test" row.
const SYNONYMS: &[(&str, &[&str])] = &[
    ("auth", &["authentication", "authorization", "login", "credential"]),
    ("authentication", &["auth", "login", "credential"]),
    ("config", &["configuration", "settings", "options"]),
    ("db", &["database", "storage", "sql"]),
    ("database", &["db", "storage", "sql"]),
    ("delete", &["remove", "drop", "destroy"]),
    ("doc", &["documentation", "readme", "guide"]),
    ("error", &["exception", "failure", "fault"]),
    ("fetch", &["get", "retrieve", "load", "request"]),
    ("handler", &["listener", "callback", "dispatch"]),
    ("init", &["initialize", "setup", "bootstrap"]),
    ("index", &["catalog", "registry"]),
    ("log", &["logger", "logging", "trace"]),
    ("parse", &["parser", "decode", "deserialize"]),
    ("search", &["query", "find", "lookup", "retrieve"]),
    ("serialize", &["encode", "marshal", "format"]),
    ("test", &["spec", "assert", "verify", "fixture"]),
    ("util", &["utility", "helper", "common"]),
    ("validate", &["validator", "validation", "check", "verify"]),
    ("worker", &["job", "task", "queue"]),
];

/// Suffixes stripped for the secondary lookup, longest first.
const STRIP_SUFFIXES: &[&str] = &["ing", "ed", "s"];

/// Expand a free-text query into lexical search terms: the original
/// tokens, plus synonyms found by direct and suffix-stripped lookups.
/// Order is preserved and duplicates removed.
pub fn expand_query(query: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();

    for token in tokenize(query) {
        push_unique(&mut terms, token.clone());

        if let Some(synonyms) = lookup(&token) {
            for synonym in synonyms {
                push_unique(&mut terms, (*synonym).to_string());
            }
            continue;
        }

        for suffix in STRIP_SUFFIXES {
            let Some(stem) = token.strip_suffix(suffix) else {
                continue;
            };
            if stem.len() < 3 {
                continue;
            }
            if let Some(synonyms) = lookup(stem) {
                push_unique(&mut terms, stem.to_string());
                for synonym in synonyms {
                    push_unique(&mut terms, (*synonym).to_string());
                }
                break;
            }
        }
    }

    terms
}

fn tokenize(query: &str) -> Vec<String> {
    query
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|t| t.len() >= 2)
        .map(str::to_lowercase)
        .collect()
}

fn lookup(term: &str) -> Option<&'static [&'static str]> {
    SYNONYMS
        .iter()
        .find(|(key, _)| *key == term)
        .map(|(_, synonyms)| *synonyms)
}

fn push_unique(terms: &mut Vec<String>, term: String) {
    if !terms.contains(&term) {
        terms.push(term);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_direct_lookup() {
        let terms = expand_query("auth flow");
        assert!(terms.contains(&"auth".to_string()));
        assert!(terms.contains(&"authentication".to_string()));
        assert!(terms.contains(&"flow".to_string()));
    }

    #[test]
    fn test_original_tokens_come_first() {
        let terms = expand_query("db connection");
        assert_eq!(terms[0], "db");
        assert!(terms.contains(&"database".to_string()));
    }

    #[test]
    fn test_ing_suffix_stripped() {
        let terms = expand_query("testing helpers");
        assert!(terms.contains(&"testing".to_string()));
        assert!(terms.contains(&"test".to_string()));
        assert!(terms.contains(&"spec".to_string()));
    }

    #[test]
    fn test_plural_suffix_stripped() {
        let terms = expand_query("errors");
        assert!(terms.contains(&"error".to_string()));
        assert!(terms.contains(&"exception".to_string()));
    }

    #[test]
    fn test_unknown_terms_pass_through() {
        let terms = expand_query("frobnicate widget");
        assert_eq!(terms, vec!["frobnicate".to_string(), "widget".to_string()]);
    }

    #[test]
    fn test_no_duplicates() {
        let terms = expand_query("test tests testing");
        let mut deduped = terms.clone();
        deduped.dedup();
        assert_eq!(terms.len(), {
            let mut sorted = terms.clone();
            sorted.sort();
            sorted.dedup();
            sorted.len()
        });
    }

    #[test]
    fn test_punctuation_and_case() {
        let terms = expand_query("How do I Validate-Input?");
        assert!(terms.contains(&"validate".to_string()));
        assert!(terms.contains(&"check".to_string()));
    }

    #[test]
    fn test_empty_query() {
        assert!(expand_query("").is_empty());
        assert!(expand_query("  !?  ").is_empty());
    }
}
