//! Open/close pairing of inline HTML tags.
//!
//! Tokens come from one logical region (a line of a paragraph, a heading).
//! Pairing never fails: tags without a partner are reported as orphans and
//! rendered as styled source.
//!
//! # Example
//!
//! ```
//! use inkset_engine::tags::{outermost, pair_tags, scan_tags};
//!
//! let tokens = scan_tags("<b>x<i>y</i>z</b>", 0);
//! let pairing = pair_tags(&tokens);
//! assert_eq!(pairing.elements.len(), 2);
//! assert!(pairing.orphans.is_empty());
//!
//! let top = outermost(&pairing.elements);
//! assert_eq!(top.len(), 1);
//! assert_eq!(top[0].range(), 0..17);
//! ```

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<(/?)([A-Za-z][A-Za-z0-9-]*)(?:\s(?:[^<>"']|"[^"]*"|'[^']*')*?)?\s*(/?)>"#)
        .unwrap()
});

/// Elements that never have a closing tag.
const VOID_ELEMENTS: [&str; 13] = [
    "br", "hr", "img", "input", "meta", "link", "area", "base", "col", "embed", "source",
    "track", "wbr",
];

/// Whether `name` is an HTML void element.
#[must_use]
pub fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

/// One scanned tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagToken {
    /// Start of `<`.
    pub from: usize,
    /// End after `>`.
    pub to: usize,
    /// Lowercased tag name.
    pub name: String,
    /// `</name>`.
    pub closing: bool,
    /// `<name/>`.
    pub self_closing: bool,
}

impl TagToken {
    /// Token range.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.from..self.to
    }

    fn is_complete(&self) -> bool {
        self.self_closing || is_void(&self.name)
    }
}

/// A matched element: an open/close pair or a single complete tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagElement {
    /// Lowercased tag name.
    pub name: String,
    /// Opening (or only) tag range.
    pub open: Range<usize>,
    /// Closing tag range, `None` for void and self-closing tags.
    pub close: Option<Range<usize>>,
}

impl TagElement {
    /// Range from the opening tag start to the closing tag end.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        let end = self.close.as_ref().map_or(self.open.end, |c| c.end);
        self.open.start..end
    }

    /// Range between the tags, empty for single-tag elements.
    #[must_use]
    pub fn inner(&self) -> Range<usize> {
        match &self.close {
            Some(close) => self.open.end..close.start,
            None => self.open.end..self.open.end,
        }
    }
}

/// Result of pairing a token run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagPairing {
    /// All matched elements, by start.
    pub elements: Vec<TagElement>,
    /// Tokens no element consumed, by start.
    pub orphans: Vec<TagToken>,
}

/// Scan tag tokens from `text`, offsetting ranges by `offset`.
#[must_use]
pub fn scan_tags(text: &str, offset: usize) -> Vec<TagToken> {
    TAG_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(TagToken {
                from: offset + whole.start(),
                to: offset + whole.end(),
                name: caps[2].to_ascii_lowercase(),
                closing: !caps[1].is_empty(),
                self_closing: !caps[3].is_empty(),
            })
        })
        .collect()
}

/// Pair open and close tokens.
///
/// Tokens are scanned left to right. A self-closing or void tag is a complete
/// element on its own. Any other opening tag searches forward for a closing
/// tag of the same name, counting nested same-name opens.
#[must_use]
pub fn pair_tags(tokens: &[TagToken]) -> TagPairing {
    let mut consumed = vec![false; tokens.len()];
    let mut elements = Vec::new();

    for (i, token) in tokens.iter().enumerate() {
        if consumed[i] || token.closing {
            continue;
        }
        if token.is_complete() {
            consumed[i] = true;
            elements.push(TagElement {
                name: token.name.clone(),
                open: token.range(),
                close: None,
            });
            continue;
        }

        let mut depth = 1usize;
        let mut matched = None;
        for (j, candidate) in tokens.iter().enumerate().skip(i + 1) {
            if consumed[j] || candidate.name != token.name || candidate.self_closing {
                continue;
            }
            if candidate.closing {
                depth -= 1;
                if depth == 0 {
                    matched = Some(j);
                    break;
                }
            } else {
                depth += 1;
            }
        }

        if let Some(j) = matched {
            consumed[i] = true;
            consumed[j] = true;
            elements.push(TagElement {
                name: token.name.clone(),
                open: token.range(),
                close: Some(tokens[j].range()),
            });
        }
    }

    elements.sort_by_key(|e| e.open.start);
    let orphans = tokens
        .iter()
        .zip(&consumed)
        .filter(|(_, consumed)| !**consumed)
        .map(|(token, _)| token.clone())
        .collect();

    TagPairing { elements, orphans }
}

/// Keep only elements not nested in (or overlapping) an earlier kept one.
#[must_use]
pub fn outermost(elements: &[TagElement]) -> Vec<TagElement> {
    let mut sorted: Vec<&TagElement> = elements.iter().collect();
    sorted.sort_by_key(|e| (e.range().start, std::cmp::Reverse(e.range().end)));

    let mut kept: Vec<TagElement> = Vec::new();
    for element in sorted {
        if kept.last().is_some_and(|last| element.range().start < last.range().end) {
            continue;
        }
        kept.push(element.clone());
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pair(text: &str) -> TagPairing {
        pair_tags(&scan_tags(text, 0))
    }

    #[test]
    fn test_scan_tokens() {
        let tokens = scan_tags(r#"a <span class="x">b</span> <br/> <IMG src='y'>"#, 10);
        let names: Vec<_> = tokens.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["span", "span", "br", "img"]);
        assert_eq!(tokens[0].from, 12);
        assert!(tokens[1].closing);
        assert!(tokens[2].self_closing);
        assert!(!tokens[3].self_closing);
    }

    #[test]
    fn test_scan_ignores_comments_and_text() {
        assert!(scan_tags("<!-- c --> a < b", 0).is_empty());
    }

    #[test]
    fn test_nested_pairs() {
        let pairing = pair("<b>x<i>y</i>z</b>");
        assert_eq!(
            pairing.elements,
            vec![
                TagElement {
                    name: "b".to_owned(),
                    open: 0..3,
                    close: Some(13..17),
                },
                TagElement {
                    name: "i".to_owned(),
                    open: 4..7,
                    close: Some(8..12),
                },
            ]
        );
        assert!(pairing.orphans.is_empty());
        assert_eq!(pairing.elements[0].inner(), 3..13);
    }

    #[test]
    fn test_unterminated_is_orphan() {
        let pairing = pair("<b>unterminated");
        assert!(pairing.elements.is_empty());
        assert_eq!(pairing.orphans.len(), 1);
        assert_eq!(pairing.orphans[0].range(), 0..3);
    }

    #[test]
    fn test_stray_closing_is_orphan() {
        let pairing = pair("a</i> <b>b</b>");
        assert_eq!(pairing.elements.len(), 1);
        assert_eq!(pairing.orphans.len(), 1);
        assert!(pairing.orphans[0].closing);
    }

    #[test]
    fn test_same_name_depth() {
        let pairing = pair("<span><span>a</span></span>");
        assert_eq!(pairing.elements[0].range(), 0..27);
        assert_eq!(pairing.elements[1].range(), 6..20);
    }

    #[test]
    fn test_inner_open_without_close() {
        let pairing = pair("<b><b></b>");
        assert_eq!(pairing.elements.len(), 1);
        assert_eq!(pairing.elements[0].range(), 3..10);
        assert_eq!(pairing.orphans[0].range(), 0..3);
    }

    #[test]
    fn test_void_and_self_closing_are_complete() {
        let pairing = pair("<br><img src=x><x-icon/>");
        assert_eq!(pairing.elements.len(), 3);
        assert!(pairing.elements.iter().all(|e| e.close.is_none()));
        assert!(pairing.orphans.is_empty());
    }

    #[test]
    fn test_outermost_drops_nested() {
        let pairing = pair("<b>x<i>y</i>z</b> <u>w</u>");
        let top = outermost(&pairing.elements);
        let names: Vec<_> = top.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["b", "u"]);
    }

    #[test]
    fn test_crossed_tags_keep_earliest() {
        let pairing = pair("<b>1<i>2</b>3</i>");
        let top = outermost(&pairing.elements);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].name, "b");
    }
}
