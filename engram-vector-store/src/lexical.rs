use crate::record::EmbeddingRecord;
use log::debug;
use nucleo_matcher::{Config, Matcher, Utf32Str};

/// Characters of chunk content included in the searchable text; full
/// bodies make fuzzy scoring noisy.
const CONTENT_PREVIEW_CHARS: usize = 500;

/// Minimum normalized score for a lexical match to count.
const SCORE_THRESHOLD: f32 = 0.05;

/// In-memory lexical index over a namespace's records, built alongside the
/// vectors. Ranks by fuzzy match over file path plus a content preview.
pub struct LexicalIndex {
    matcher: Matcher,
    /// Pre-computed searchable text, parallel to the store's record list.
    search_texts: Vec<String>,
}

impl LexicalIndex {
    /// Build the index from the namespace's records.
    pub fn build(records: &[EmbeddingRecord]) -> Self {
        let search_texts = records.iter().map(Self::search_text).collect();
        Self {
            matcher: Matcher::new(Config::DEFAULT),
            search_texts,
        }
    }

    fn search_text(record: &EmbeddingRecord) -> String {
        let mut text = record.file_path.clone();
        if let Some(symbol) = &record.symbol {
            text.push(' ');
            text.push_str(symbol);
        }
        text.push(' ');
        text.extend(record.content.chars().take(CONTENT_PREVIEW_CHARS));
        text
    }

    /// Rank record indices for the query terms, best first.
    pub fn search(&mut self, terms: &[String], limit: usize) -> Vec<usize> {
        if terms.is_empty() {
            return Vec::new();
        }

        let query = terms.join(" ");
        let mut query_buf: Vec<char> = Vec::new();
        let query_utf32 = Utf32Str::new(&query, &mut query_buf);

        let mut scored: Vec<(usize, u16)> = Vec::new();
        for (idx, text) in self.search_texts.iter().enumerate() {
            let mut haystack_buf: Vec<char> = Vec::new();
            let haystack = Utf32Str::new(text, &mut haystack_buf);

            if let Some(score) = self.matcher.fuzzy_match(haystack, query_utf32) {
                let normalized = score as f32 / 1000.0;
                if normalized >= SCORE_THRESHOLD {
                    scored.push((idx, score));
                }
            }
        }

        scored.sort_by(|a, b| b.1.cmp(&a.1));
        scored.truncate(limit);

        debug!("lexical search matched {} records", scored.len());
        scored.into_iter().map(|(idx, _)| idx).collect()
    }
}
