use crate::config::ChunkerConfig;
use crate::language::Language;
use crate::Chunk;
use log::debug;
use regex_lite::Regex;

/// Estimated chars-per-token ratio used for the chunk budget.
const CHARS_PER_TOKEN: usize = 4;

/// How many leading lines of a chunk are scanned for a declaration.
const SYMBOL_SCAN_LINES: usize = 5;

/// Split content into line-window chunks against an estimated token budget.
///
/// Lines accumulate until the budget (`chars / 4`) is reached, then a chunk
/// is emitted and the next one is seeded with the trailing overlap lines.
/// A trailing remainder that adds no lines beyond the seeded overlap is
/// suppressed; a file smaller than the minimum line count still produces a
/// single chunk.
pub fn chunk_generic(content: &str, language: Language, config: &ChunkerConfig) -> Vec<Chunk> {
    let max_chars = config.max_chunk_tokens * CHARS_PER_TOKEN;
    let patterns = compile_patterns(language);

    let lines: Vec<&str> = content.lines().collect();
    if lines.iter().all(|l| l.trim().is_empty()) {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    // (1-indexed line number, text)
    let mut buffer: Vec<(usize, &str)> = Vec::new();
    let mut buffer_chars = 0usize;
    // Lines in the buffer that were carried over as overlap, not fresh input.
    let mut seeded = 0usize;

    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx + 1;
        buffer.push((line_no, line));
        buffer_chars += line.chars().count() + 1;

        let over_budget = buffer_chars >= max_chars;
        if over_budget && buffer.len() >= config.min_chunk_lines {
            emit(&mut chunks, &buffer, &patterns);
            buffer_chars = seed_overlap(&mut buffer, config.overlap_lines);
            seeded = buffer.len();
        }
    }

    // Remainder: only emit if it carries lines beyond the seeded overlap.
    if buffer.len() > seeded {
        emit(&mut chunks, &buffer, &patterns);
    }

    debug!(
        "generic chunker produced {} chunks ({} lines)",
        chunks.len(),
        lines.len()
    );

    chunks
}

fn emit(chunks: &mut Vec<Chunk>, buffer: &[(usize, &str)], patterns: &[Regex]) {
    let content: String = buffer
        .iter()
        .map(|(_, l)| *l)
        .collect::<Vec<_>>()
        .join("\n");

    let symbol = extract_symbol(buffer, patterns);

    chunks.push(Chunk {
        content,
        start_line: buffer[0].0,
        end_line: buffer[buffer.len() - 1].0,
        chunk_index: chunks.len(),
        symbol,
        scope_chain: None,
        contextualized: None,
    });
}

/// Retain only the trailing overlap lines; returns the new buffer char count.
fn seed_overlap<'a>(buffer: &mut Vec<(usize, &'a str)>, overlap_lines: usize) -> usize {
    let keep = overlap_lines.min(buffer.len());
    buffer.drain(..buffer.len() - keep);
    buffer.iter().map(|(_, l)| l.chars().count() + 1).sum()
}

/// Scan the first few lines of a chunk for a declaration name.
fn extract_symbol(buffer: &[(usize, &str)], patterns: &[Regex]) -> Option<String> {
    for (_, line) in buffer.iter().take(SYMBOL_SCAN_LINES) {
        for pattern in patterns {
            if let Some(caps) = pattern.captures(line) {
                if let Some(name) = caps.get(1) {
                    return Some(name.as_str().to_string());
                }
            }
        }
    }
    None
}

fn compile_patterns(language: Language) -> Vec<Regex> {
    language
        .declaration_patterns()
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
}
