use crate::config::ChunkerConfig;
use crate::generic::chunk_generic;
use crate::language::Language;
use crate::Chunk;
use log::debug;
use tree_sitter::{Node, Parser};

/// Parse a source file and emit one chunk per semantic unit.
///
/// Returns `None` for unsupported languages, empty input, or an
/// unrecoverable parse failure so the caller can fall back to
/// [`chunk_generic`]. Oversized units recurse into nested units when
/// possible and are otherwise split by the generic strategy with the scope
/// chain preserved.
pub fn chunk_structural(
    source: &str,
    file_path: &str,
    language: Language,
    config: &ChunkerConfig,
) -> Option<Vec<Chunk>> {
    let grammar = language.grammar()?;

    if source.trim().is_empty() {
        return None;
    }

    let mut parser = Parser::new();
    parser.set_language(&grammar).ok()?;
    let tree = parser.parse(source, None)?;
    let root = tree.root_node();

    // A tree that is nothing but an error node is unrecoverable; trees with
    // localized error nodes still yield usable units.
    if root.has_error() && root.named_child_count() == 0 {
        return None;
    }

    let mut chunks = Vec::new();
    collect_units(source, file_path, language, config, &root, "", &mut chunks);

    // Files with no recognizable units (e.g. a script of bare statements)
    // become a single file-level chunk.
    if chunks.is_empty() {
        chunks.push(make_unit_chunk(source, file_path, &root, None, ""));
    }

    for (i, chunk) in chunks.iter_mut().enumerate() {
        chunk.chunk_index = i;
    }

    debug!(
        "structural chunker produced {} chunks for {}",
        chunks.len(),
        file_path
    );

    Some(chunks)
}

fn collect_units(
    source: &str,
    file_path: &str,
    language: Language,
    config: &ChunkerConfig,
    parent: &Node,
    scope: &str,
    output: &mut Vec<Chunk>,
) {
    let unit_kinds = language.unit_node_kinds();
    let mut cursor = parent.walk();

    for child in parent.named_children(&mut cursor) {
        if !unit_kinds.contains(&child.kind()) {
            continue;
        }

        let text = &source[child.byte_range()];
        let name = node_name(&child, source);

        if text.chars().count() > config.max_unit_chars {
            let inner_scope = extend_scope(scope, name.as_deref(), &child);
            let before = output.len();
            collect_units(source, file_path, language, config, &child, &inner_scope, output);

            // No nested units to descend into: split the oversized unit with
            // the generic strategy, keeping its scope on every piece.
            if output.len() == before {
                split_oversized(source, file_path, language, config, &child, &inner_scope, output);
            }
            continue;
        }

        output.push(make_unit_chunk(text, file_path, &child, name, scope));
    }
}

fn split_oversized(
    source: &str,
    file_path: &str,
    language: Language,
    config: &ChunkerConfig,
    node: &Node,
    scope: &str,
    output: &mut Vec<Chunk>,
) {
    let text = &source[node.byte_range()];
    let base_line = node.start_position().row + 1;

    for mut piece in chunk_generic(text, language, config) {
        piece.start_line += base_line - 1;
        piece.end_line += base_line - 1;
        piece.scope_chain = non_empty(scope);
        piece.contextualized = Some(contextualize(file_path, scope, &piece.content));
        output.push(piece);
    }
}

fn make_unit_chunk(
    text: &str,
    file_path: &str,
    node: &Node,
    name: Option<String>,
    scope: &str,
) -> Chunk {
    Chunk {
        content: text.to_string(),
        start_line: node.start_position().row + 1,
        end_line: node.end_position().row + 1,
        chunk_index: 0,
        symbol: name,
        scope_chain: non_empty(scope),
        contextualized: Some(contextualize(file_path, scope, text)),
    }
}

/// Embedding text: the unit prefixed by its file and enclosing declarations.
fn contextualize(file_path: &str, scope: &str, content: &str) -> String {
    let mut text = String::with_capacity(content.len() + file_path.len() + 32);
    text.push_str("// ");
    text.push_str(file_path);
    text.push('\n');
    if !scope.is_empty() {
        text.push_str("// scope: ");
        text.push_str(scope);
        text.push('\n');
    }
    text.push_str(content);
    text
}

fn node_name(node: &Node, source: &str) -> Option<String> {
    // tree-sitter-rust impl_item exposes its subject via "type", most other
    // grammars use "name".
    node.child_by_field_name("name")
        .or_else(|| node.child_by_field_name("type"))
        .map(|n| source[n.byte_range()].to_string())
}

fn extend_scope(scope: &str, name: Option<&str>, node: &Node) -> String {
    let segment = name.map(str::to_string).unwrap_or_else(|| node.kind().to_string());
    if scope.is_empty() {
        segment
    } else {
        format!("{scope} > {segment}")
    }
}

fn non_empty(scope: &str) -> Option<String> {
    if scope.is_empty() {
        None
    } else {
        Some(scope.to_string())
    }
}
