//! Shared utility functions for rendering.

use std::ops::Range;

use inkset_tree::{Node, kind};

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Convert text to URL-safe slug.
///
/// Converts to lowercase, replaces whitespace/dashes/underscores with single dashes,
/// and removes other non-alphanumeric characters.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut result = String::new();
    let mut last_was_dash = true;

    for c in text.trim().chars() {
        if c.is_alphanumeric() {
            result.extend(c.to_lowercase());
            last_was_dash = false;
        } else if !last_was_dash && (c.is_whitespace() || c == '-' || c == '_') {
            result.push('-');
            last_was_dash = true;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }

    result
}

/// Node types that carry syntax rather than content.
const MARKER_KINDS: [&str; 15] = [
    kind::HEADER_MARK,
    kind::EMPHASIS_MARK,
    kind::STRIKETHROUGH_MARK,
    kind::CODE_MARK,
    kind::CODE_INFO,
    kind::LINK_MARK,
    kind::URL,
    kind::LINK_TITLE,
    kind::LINK_LABEL,
    kind::QUOTE_MARK,
    kind::ALERT_MARK,
    kind::LIST_MARK,
    kind::TASK_MARKER,
    kind::TABLE_DELIMITER,
    kind::MATH_MARK,
];

/// Whether a node type is a syntax marker.
#[must_use]
pub fn is_marker(kind: &str) -> bool {
    MARKER_KINDS.contains(&kind)
}

/// Source text of `range` inside `node`, skipping syntax markers.
///
/// Escapes contribute their escaped character.
#[must_use]
pub fn plain_text(node: Node<'_>, range: Range<usize>) -> String {
    let mut out = String::new();
    let mut pos = range.start;
    for child in node.children() {
        if child.end() <= range.start || child.start() >= range.end {
            continue;
        }
        if child.start() > pos {
            out.push_str(node.tree().slice(pos..child.start()));
        }
        if child.is(kind::ESCAPE) {
            out.push_str(child.text().get(1..).unwrap_or_default());
        } else if !is_marker(child.kind()) {
            out.push_str(&plain_text(child, child.range()));
        }
        pos = child.end().max(pos);
    }
    if pos < range.end {
        out.push_str(node.tree().slice(pos..range.end));
    }
    out
}

/// Byte ranges of the lines overlapping `range`, without line terminators.
#[must_use]
pub fn line_ranges(source: &str, range: Range<usize>) -> Vec<Range<usize>> {
    let Some(text) = source.get(range.clone()) else {
        return Vec::new();
    };
    let mut lines = Vec::new();
    let mut start = range.start;
    for line in text.split('\n') {
        let end = start + line.len();
        lines.push(start..end);
        start = end + 1;
    }
    lines
}

/// Range of the line containing `pos`, without the terminator.
#[must_use]
pub fn line_at(source: &str, pos: usize) -> Range<usize> {
    let pos = pos.min(source.len());
    let start = source[..pos].rfind('\n').map_or(0, |i| i + 1);
    let end = source[pos..].find('\n').map_or(source.len(), |i| pos + i);
    start..end
}
