//! History-seeking query detection.
//!
//! A fixed, ordered rule set; no statistical model. The host uses the
//! verdict to decide whether to surface a supersede chain instead of plain
//! search results.

use log::debug;
use regex_lite::Regex;
use std::sync::OnceLock;

/// What a query is after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryIntent {
    /// Asking how something came to be: why it changed, what it replaced,
    /// what the earlier approach was.
    HistorySeeking,
    /// Everything else: locating, explaining, or using the current code.
    Ordinary,
}

impl QueryIntent {
    pub fn is_history_seeking(&self) -> bool {
        matches!(self, Self::HistorySeeking)
    }
}

/// Ordered detection rules; the first match wins.
const HISTORY_PATTERNS: &[&str] = &[
    // "why did this change", "why was the old parser replaced"
    r"(?i)\bwhy\b.*\b(chang\w*|switch\w*|replac\w*|remov\w*|rewrit\w*|rewrot\w*|migrat\w*|drop\w*|abandon\w*|move[d]? away)",
    // "why did we decide", "why was it decided"
    r"(?i)\bwhy\b.*\b(decid\w*|chose|choos\w*|pick\w*)",
    // "how did this evolve", "how has the config layer changed"
    r"(?i)\bhow\b.*\b(evolv\w*|chang\w*|develop\w*|end(?:ed)? up|came about|came to be)",
    // "the previous approach", "original implementation", "earlier version"
    r"(?i)\b(previous|original|earlier|old|older|former|initial|first)\b.*\b(approach|version|implementation|design|way|solution|behaviou?r|attempt|iteration)",
    // explicit supersession vocabulary
    r"(?i)\b(supersed\w*|deprecat\w*|obsolet\w*|replaced by|was replaced|got replaced)\b",
    // then-versus-now contrasts
    r"(?i)\b(used to|no longer|back then|at first|originally|over time|anymore)\b",
    // "what was the X", "what were the Y"
    r"(?i)\bwhat\s+(was|were)\b",
    // "history of", "historical context", "changelog"
    r"(?i)\b(histor(?:y|ical)|changelog|evolution)\b",
];

fn history_rules() -> &'static [Regex] {
    static RULES: OnceLock<Vec<Regex>> = OnceLock::new();
    RULES.get_or_init(|| {
        HISTORY_PATTERNS
            .iter()
            .map(|p| Regex::new(p).expect("Valid regex"))
            .collect()
    })
}

/// Classify a query as history-seeking or ordinary.
pub fn classify_query_intent(query: &str) -> QueryIntent {
    for (index, rule) in history_rules().iter().enumerate() {
        if rule.is_match(query) {
            debug!("query matched history rule #{index}: '{query}'");
            return QueryIntent::HistorySeeking;
        }
    }
    QueryIntent::Ordinary
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reference phrases a history-aware host should answer with a chain.
    const POSITIVE: &[&str] = &[
        "why did this change",
        "why was this function changed",
        "why did we switch to sqlite",
        "why was the old parser replaced",
        "why did the team move away from threads",
        "why did we decide on batch commits",
        "how did this module evolve",
        "how has the config layer changed over time",
        "how did we end up with two chunkers",
        "what was the previous approach to retries",
        "what was the original implementation of search",
        "what did the earlier version of this rule say",
        "is the json store deprecated",
        "what superseded the flat-file index",
        "this used to work differently, right?",
        "we no longer retry forever, when did that stop",
        "show me the history of this decision",
        "what were the initial assumptions here",
        "originally this was synchronous, what happened",
        "walk me through the evolution of the indexer",
    ];

    /// Reference phrases that are ordinary code questions.
    const NEGATIVE: &[&str] = &[
        "where is the config parser",
        "find the auth handler",
        "how does caching work",
        "show me the retry logic",
        "what does this function do",
        "search for validation tests",
        "how do I add a new provider",
        "list files related to embeddings",
        "what is the default batch size",
        "explain the circuit breaker",
        "which module owns the walker",
        "how do I run the test suite",
        "where are errors logged",
        "what happens when the index is empty",
        "find usages of cosine_similarity",
        "does search support a result limit",
        "how is the project id generated",
        "show the chunker configuration",
        "what file defines the embedding trait",
        "is hybrid search enabled by default",
    ];

    fn accuracy(phrases: &[&str], expected: QueryIntent) -> f64 {
        let hits = phrases
            .iter()
            .filter(|p| classify_query_intent(p) == expected)
            .count();
        hits as f64 / phrases.len() as f64
    }

    #[test]
    fn test_positive_set_accuracy() {
        let score = accuracy(POSITIVE, QueryIntent::HistorySeeking);
        assert!(score >= 0.9, "positive accuracy {score} below target");
    }

    #[test]
    fn test_negative_set_accuracy() {
        let score = accuracy(NEGATIVE, QueryIntent::Ordinary);
        assert!(score >= 0.9, "negative accuracy {score} below target");
    }

    #[test]
    fn test_supersession_vocabulary_detected() {
        assert!(classify_query_intent("what superseded the old store").is_history_seeking());
        assert!(classify_query_intent("is this API deprecated").is_history_seeking());
    }

    #[test]
    fn test_plain_lookup_is_ordinary() {
        assert_eq!(
            classify_query_intent("find the request handler"),
            QueryIntent::Ordinary
        );
    }

    #[test]
    fn test_empty_query_is_ordinary() {
        assert_eq!(classify_query_intent(""), QueryIntent::Ordinary);
    }
}
