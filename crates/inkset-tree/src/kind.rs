//! Node type names produced by [`MarkdownParser`](crate::MarkdownParser).
//!
//! Names are plain strings so that trees assembled by other parsers can use
//! their own vocabulary; these constants are the names the built-in adapter
//! emits and the built-in plugins register for.

pub const DOCUMENT: &str = "Document";
pub const PARAGRAPH: &str = "Paragraph";

pub const HEADER_MARK: &str = "HeaderMark";

pub const EMPHASIS: &str = "Emphasis";
pub const STRONG_EMPHASIS: &str = "StrongEmphasis";
pub const STRIKETHROUGH: &str = "Strikethrough";
pub const EMPHASIS_MARK: &str = "EmphasisMark";
pub const STRIKETHROUGH_MARK: &str = "StrikethroughMark";

pub const INLINE_CODE: &str = "InlineCode";
pub const CODE_MARK: &str = "CodeMark";
pub const FENCED_CODE: &str = "FencedCode";
pub const CODE_BLOCK: &str = "CodeBlock";
pub const CODE_INFO: &str = "CodeInfo";
pub const CODE_TEXT: &str = "CodeText";

pub const LINK: &str = "Link";
pub const IMAGE: &str = "Image";
pub const LINK_MARK: &str = "LinkMark";
pub const URL: &str = "URL";
pub const LINK_TITLE: &str = "LinkTitle";
pub const LINK_LABEL: &str = "LinkLabel";

pub const BLOCKQUOTE: &str = "Blockquote";
pub const QUOTE_MARK: &str = "QuoteMark";
pub const ALERT_MARK: &str = "AlertMark";

pub const BULLET_LIST: &str = "BulletList";
pub const ORDERED_LIST: &str = "OrderedList";
pub const LIST_ITEM: &str = "ListItem";
pub const LIST_MARK: &str = "ListMark";
pub const TASK_MARKER: &str = "TaskMarker";

pub const TABLE: &str = "Table";
pub const TABLE_HEADER: &str = "TableHeader";
pub const TABLE_ROW: &str = "TableRow";
pub const TABLE_CELL: &str = "TableCell";
pub const TABLE_DELIMITER: &str = "TableDelimiter";

pub const HORIZONTAL_RULE: &str = "HorizontalRule";
pub const HTML_BLOCK: &str = "HTMLBlock";
pub const HTML_TAG: &str = "HTMLTag";

pub const INLINE_MATH: &str = "InlineMath";
pub const DISPLAY_MATH: &str = "DisplayMath";
pub const MATH_MARK: &str = "MathMark";

pub const HARD_BREAK: &str = "HardBreak";
pub const ESCAPE: &str = "Escape";
pub const ENTITY: &str = "Entity";

pub const FOOTNOTE_REFERENCE: &str = "FootnoteReference";
pub const FOOTNOTE_DEFINITION: &str = "FootnoteDefinition";

const ATX_HEADINGS: [&str; 6] = [
    "ATXHeading1",
    "ATXHeading2",
    "ATXHeading3",
    "ATXHeading4",
    "ATXHeading5",
    "ATXHeading6",
];

const SETEXT_HEADINGS: [&str; 2] = ["SetextHeading1", "SetextHeading2"];

/// ATX heading type name for a level (clamped to 1-6).
#[must_use]
pub fn heading(level: u8) -> &'static str {
    ATX_HEADINGS[usize::from(level.clamp(1, 6)) - 1]
}

/// Setext heading type name for a level (clamped to 1-2).
#[must_use]
pub fn setext_heading(level: u8) -> &'static str {
    SETEXT_HEADINGS[usize::from(level.clamp(1, 2)) - 1]
}

/// All heading type names, ATX first.
pub fn headings() -> impl Iterator<Item = &'static str> {
    ATX_HEADINGS.into_iter().chain(SETEXT_HEADINGS)
}

/// Heading level for a heading type name.
///
/// # Examples
///
/// ```
/// use inkset_tree::kind;
///
/// assert_eq!(kind::heading_level("ATXHeading3"), Some(3));
/// assert_eq!(kind::heading_level("SetextHeading2"), Some(2));
/// assert_eq!(kind::heading_level("Paragraph"), None);
/// ```
#[must_use]
pub fn heading_level(kind: &str) -> Option<u8> {
    let digit = kind
        .strip_prefix("ATXHeading")
        .or_else(|| kind.strip_prefix("SetextHeading"))?;
    match digit.parse::<u8>() {
        Ok(level @ 1..=6) => Some(level),
        _ => None,
    }
}
