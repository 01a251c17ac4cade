//! Event-to-span conversion for the `pulldown-cmark` adapter.
//!
//! Container events become spans directly. Syntax markers are derived from the
//! source slice of the element that owns them, since `pulldown-cmark` reports
//! element ranges but not marker positions.

use std::ops::Range;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, LinkType, Tag};

use crate::{Destination, Span};
use crate::kind;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LinkShape {
    Inline,
    Reference,
    Autolink,
}

impl From<LinkType> for LinkShape {
    fn from(link_type: LinkType) -> Self {
        match link_type {
            LinkType::Inline => Self::Inline,
            LinkType::Autolink | LinkType::Email => Self::Autolink,
            _ => Self::Reference,
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Element {
    Paragraph,
    Heading(u8),
    Blockquote { alert: bool },
    FencedCode,
    IndentedCode,
    List { ordered: bool },
    Item,
    Table,
    TableHead,
    TableRow,
    TableCell,
    Emphasis,
    Strong,
    Strikethrough,
    Link(LinkShape),
    Image(LinkShape),
    HtmlBlock,
    FootnoteDefinition,
}

impl Element {
    fn from_tag(tag: &Tag<'_>) -> Option<Self> {
        let element = match tag {
            Tag::Paragraph => Self::Paragraph,
            Tag::Heading { level, .. } => Self::Heading(heading_level_to_num(*level)),
            Tag::BlockQuote(kind) => Self::Blockquote {
                alert: kind.is_some(),
            },
            Tag::CodeBlock(CodeBlockKind::Fenced(_)) => Self::FencedCode,
            Tag::CodeBlock(CodeBlockKind::Indented) => Self::IndentedCode,
            Tag::List(start) => Self::List {
                ordered: start.is_some(),
            },
            Tag::Item => Self::Item,
            Tag::Table(_) => Self::Table,
            Tag::TableHead => Self::TableHead,
            Tag::TableRow => Self::TableRow,
            Tag::TableCell => Self::TableCell,
            Tag::Emphasis => Self::Emphasis,
            Tag::Strong => Self::Strong,
            Tag::Strikethrough => Self::Strikethrough,
            Tag::Link { link_type, .. } => Self::Link((*link_type).into()),
            Tag::Image { link_type, .. } => Self::Image((*link_type).into()),
            Tag::HtmlBlock => Self::HtmlBlock,
            Tag::FootnoteDefinition(_) => Self::FootnoteDefinition,
            _ => return None,
        };
        Some(element)
    }

    /// Elements whose text events are raw content rather than inline text.
    fn is_raw(self) -> bool {
        matches!(self, Self::FencedCode | Self::IndentedCode | Self::HtmlBlock)
    }
}

/// Convert heading level enum to number (1-6).
fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

struct Open {
    element: Option<Element>,
    /// Opening order, which decides nesting between equal ranges.
    seq: usize,
    range: Range<usize>,
    /// End of the furthest event seen inside this element.
    inner_end: usize,
    /// Raw text events of a code block, without container prefixes.
    texts: Vec<Range<usize>>,
    destination: Option<Destination>,
}

/// Spans are emitted when elements close, so each one is keyed by the
/// position its element opened at to keep parents ahead of children.
pub(crate) struct SpanCollector<'a> {
    source: &'a str,
    spans: Vec<(usize, Span)>,
    seq: usize,
    key: usize,
    open: Vec<Open>,
    quote_depth: usize,
    raw_depth: usize,
}

impl<'a> SpanCollector<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Self {
            source,
            spans: Vec::new(),
            seq: 0,
            key: 0,
            open: Vec::new(),
            quote_depth: 0,
            raw_depth: 0,
        }
    }

    pub(crate) fn finish(mut self) -> Vec<Span> {
        self.spans.sort_by_key(|(key, _)| *key);
        self.spans.into_iter().map(|(_, span)| span).collect()
    }

    pub(crate) fn event(&mut self, event: Event<'_>, range: Range<usize>) {
        self.key = self.seq;
        self.seq += 1;
        match event {
            Event::Start(tag) => self.start(&tag, range),
            Event::End(_) => self.end(),
            Event::Text(text) => {
                if self.raw_depth == 0 {
                    self.text(&text, range.clone());
                } else if let Some(top) = self.open.last_mut() {
                    top.texts.push(range.clone());
                }
                self.touch(range.end);
            }
            Event::Code(_) => {
                self.delimited(kind::INLINE_CODE, kind::CODE_MARK, range.clone(), b'`');
                self.touch(range.end);
            }
            Event::InlineMath(_) => {
                self.delimited(kind::INLINE_MATH, kind::MATH_MARK, range.clone(), b'$');
                self.touch(range.end);
            }
            Event::DisplayMath(_) => {
                self.delimited(kind::DISPLAY_MATH, kind::MATH_MARK, range.clone(), b'$');
                self.touch(range.end);
            }
            Event::InlineHtml(_) => {
                self.push(kind::HTML_TAG, range.clone());
                self.touch(range.end);
            }
            Event::HardBreak => {
                self.push(kind::HARD_BREAK, range.clone());
                self.touch(range.end);
            }
            Event::Rule => {
                let range = self.trim_end(range);
                self.push(kind::HORIZONTAL_RULE, range);
            }
            Event::TaskListMarker(_) => {
                self.push(kind::TASK_MARKER, range.clone());
                self.touch(range.end);
            }
            Event::FootnoteReference(_) => {
                self.push(kind::FOOTNOTE_REFERENCE, range.clone());
                self.touch(range.end);
            }
            Event::Html(_) | Event::SoftBreak => self.touch(range.end),
        }
    }

    fn start(&mut self, tag: &Tag<'_>, range: Range<usize>) {
        let element = Element::from_tag(tag);
        let destination = match tag {
            Tag::Link {
                dest_url, title, ..
            }
            | Tag::Image {
                dest_url, title, ..
            } => Some(Destination {
                url: dest_url.to_string(),
                title: title.to_string(),
            }),
            _ => None,
        };
        match element {
            Some(Element::Blockquote { .. }) => self.quote_depth += 1,
            Some(e) if e.is_raw() => self.raw_depth += 1,
            _ => {}
        }
        self.open.push(Open {
            element,
            seq: self.key,
            inner_end: range.start,
            range,
            texts: Vec::new(),
            destination,
        });
    }

    fn end(&mut self) {
        let Some(mut open) = self.open.pop() else {
            return;
        };
        let range = self.trim_end(open.range.clone());
        self.key = open.seq;

        match open.element {
            None => {}
            Some(Element::Paragraph) => self.push(kind::PARAGRAPH, range.clone()),
            Some(Element::Heading(level)) => self.heading(level, range.clone()),
            Some(Element::Blockquote { alert }) => {
                self.quote_depth -= 1;
                self.push(kind::BLOCKQUOTE, range.clone());
                if self.quote_depth == 0 {
                    self.quote_marks(range.clone());
                }
                if alert {
                    self.alert_mark(range.clone());
                }
            }
            Some(Element::FencedCode) => {
                self.raw_depth -= 1;
                self.fenced_code(range.clone(), &open.texts);
            }
            Some(Element::IndentedCode) => {
                self.raw_depth -= 1;
                self.push(kind::CODE_BLOCK, range.clone());
                self.code_lines(&open.texts, range.end);
            }
            Some(Element::HtmlBlock) => {
                self.raw_depth -= 1;
                self.push(kind::HTML_BLOCK, range.clone());
            }
            Some(Element::List { ordered }) => {
                let list = if ordered {
                    kind::ORDERED_LIST
                } else {
                    kind::BULLET_LIST
                };
                self.push(list, range.clone());
            }
            Some(Element::Item) => self.list_item(range.clone()),
            Some(Element::Table) => self.table(range.clone()),
            Some(Element::TableHead) => self.push(kind::TABLE_HEADER, range.clone()),
            Some(Element::TableRow) => self.push(kind::TABLE_ROW, range.clone()),
            Some(Element::TableCell) => self.push(kind::TABLE_CELL, range.clone()),
            Some(Element::Emphasis) => {
                self.delimited(kind::EMPHASIS, kind::EMPHASIS_MARK, range.clone(), 0);
            }
            Some(Element::Strong) => {
                self.delimited(kind::STRONG_EMPHASIS, kind::EMPHASIS_MARK, range.clone(), 0);
            }
            Some(Element::Strikethrough) => {
                self.delimited(
                    kind::STRIKETHROUGH,
                    kind::STRIKETHROUGH_MARK,
                    range.clone(),
                    b'~',
                );
            }
            Some(Element::Link(shape)) => {
                let destination = open.destination.take().unwrap_or_default();
                self.link(range.clone(), open.inner_end, shape, destination, false);
            }
            Some(Element::Image(shape)) => {
                let destination = open.destination.take().unwrap_or_default();
                self.link(range.clone(), open.inner_end, shape, destination, true);
            }
            Some(Element::FootnoteDefinition) => self.footnote_definition(range.clone()),
        }

        self.touch(range.end);
    }

    fn push(&mut self, kind: &'static str, range: Range<usize>) {
        self.spans.push((self.key, Span::new(kind, range)));
    }

    fn touch(&mut self, end: usize) {
        if let Some(top) = self.open.last_mut() {
            top.inner_end = top.inner_end.max(end);
        }
    }

    fn slice(&self, range: Range<usize>) -> &'a str {
        self.source.get(range).unwrap_or_default()
    }

    fn trim_end(&self, range: Range<usize>) -> Range<usize> {
        let bytes = self.source.as_bytes();
        let mut end = range.end.min(bytes.len());
        while end > range.start && matches!(bytes[end - 1], b' ' | b'\t' | b'\r' | b'\n') {
            end -= 1;
        }
        range.start..end
    }

    /// Escapes and entities, for text events whose source differs from their text.
    fn text(&mut self, text: &str, range: Range<usize>) {
        let raw = self.slice(range.clone());
        if raw == text {
            return;
        }
        let bytes = raw.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\\' if bytes.get(i + 1).is_some_and(u8::is_ascii_punctuation) => {
                    self.push(kind::ESCAPE, range.start + i..range.start + i + 2);
                    i += 2;
                }
                b'&' => {
                    let name_len = bytes[i + 1..]
                        .iter()
                        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'#')
                        .count();
                    if name_len > 0 && bytes.get(i + 1 + name_len) == Some(&b';') {
                        let end = i + name_len + 2;
                        self.push(kind::ENTITY, range.start + i..range.start + end);
                        i = end;
                    } else {
                        i += 1;
                    }
                }
                _ => i += 1,
            }
        }
    }

    /// Element wrapped in symmetric delimiter runs (`**`, `` ` ``, `$$`).
    ///
    /// With `delimiter == 0` the run is whatever `*`/`_` character opens the element.
    fn delimited(&mut self, element: &'static str, mark: &'static str, range: Range<usize>, delimiter: u8) {
        self.push(element, range.clone());
        let text = self.slice(range.clone());
        let Some(&first) = text.as_bytes().first() else {
            return;
        };
        let delimiter = if delimiter == 0 { first } else { delimiter };
        let open = text.bytes().take_while(|&b| b == delimiter).count();
        let close = text.bytes().rev().take_while(|&b| b == delimiter).count();
        // Emphasis nested in strong (`***x***`) shares runs; cap at the run the
        // element owns, which is the shorter of the two sides.
        let width = match element {
            kind::EMPHASIS => 1,
            kind::STRONG_EMPHASIS => 2,
            _ => open.min(close),
        };
        if width == 0 || open < width || close < width || text.len() < width * 2 {
            return;
        }
        self.push(mark, range.start..range.start + width);
        self.push(mark, range.end - width..range.end);
    }

    fn heading(&mut self, level: u8, range: Range<usize>) {
        let text = self.slice(range.clone());
        let lead = text.len() - text.trim_start_matches(' ').len();
        let hashes = text[lead..].bytes().take_while(|&b| b == b'#').count();

        if hashes == 0 {
            self.push(kind::setext_heading(level), range.clone());
            if let Some(newline) = text.rfind('\n') {
                let underline = &text[newline + 1..];
                let indent = underline.len() - underline.trim_start().len();
                self.push(kind::HEADER_MARK, range.start + newline + 1 + indent..range.end);
            }
            return;
        }

        self.push(kind::heading(level), range.clone());
        let mark_start = range.start + lead;
        self.push(kind::HEADER_MARK, mark_start..mark_start + hashes);

        let body = &text[lead + hashes..];
        let closing = body.bytes().rev().take_while(|&b| b == b'#').count();
        if closing > 0 && closing < body.len() && body.as_bytes()[body.len() - closing - 1] == b' ' {
            self.push(kind::HEADER_MARK, range.end - closing..range.end);
        }
    }

    fn quote_marks(&mut self, range: Range<usize>) {
        let mut offset = range.start;
        for line in self.slice(range.clone()).split_inclusive('\n') {
            let bytes = line.as_bytes();
            let mut i = bytes.iter().take_while(|&&b| b == b' ').count();
            while bytes.get(i) == Some(&b'>') {
                let width = if bytes.get(i + 1) == Some(&b' ') { 2 } else { 1 };
                let end = (offset + i + width).min(range.end);
                self.push(kind::QUOTE_MARK, offset + i..end);
                i += width;
                i += bytes[i.min(bytes.len())..]
                    .iter()
                    .take_while(|&&b| b == b' ')
                    .count();
            }
            offset += line.len();
        }
    }

    fn alert_mark(&mut self, range: Range<usize>) {
        let text = self.slice(range.clone());
        let first_line = text.split('\n').next().unwrap_or_default();
        let Some(open) = first_line.find("[!") else {
            return;
        };
        if let Some(close) = first_line[open..].find(']') {
            self.push(
                kind::ALERT_MARK,
                range.start + open..range.start + open + close + 1,
            );
        }
    }

    fn list_item(&mut self, range: Range<usize>) {
        self.push(kind::LIST_ITEM, range.clone());
        let text = self.slice(range.clone());
        let lead = text.len() - text.trim_start_matches(' ').len();
        let rest = &text[lead..];
        let width = if rest.starts_with(['-', '*', '+']) {
            1
        } else {
            let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
            if digits > 0 && matches!(rest.as_bytes().get(digits), Some(b'.' | b')')) {
                digits + 1
            } else {
                0
            }
        };
        if width > 0 {
            self.push(kind::LIST_MARK, range.start + lead..range.start + lead + width);
        }
    }

    fn fenced_code(&mut self, range: Range<usize>, texts: &[Range<usize>]) {
        self.push(kind::FENCED_CODE, range.clone());
        let text = self.slice(range.clone());
        let first_end = text.find('\n').unwrap_or(text.len());
        let first = &text[..first_end];
        let lead = first.len() - first.trim_start().len();
        let Some(&fence) = first.as_bytes().get(lead) else {
            return;
        };
        if fence != b'`' && fence != b'~' {
            return;
        }
        let fence_len = first[lead..].bytes().take_while(|&b| b == fence).count();
        self.push(
            kind::CODE_MARK,
            range.start + lead..range.start + lead + fence_len,
        );

        let info = &first[lead + fence_len..];
        let info_trimmed = info.trim();
        if !info_trimmed.is_empty() {
            let info_start = range.start + lead + fence_len + (info.len() - info.trim_start().len());
            self.push(kind::CODE_INFO, info_start..info_start + info_trimmed.len());
        }

        // The closing fence is the last line after the body, behind whatever
        // quote markers or indentation its container puts there.
        let body_end = texts
            .iter()
            .map(|r| r.end)
            .filter(|&end| end > range.start + first_end)
            .max()
            .unwrap_or(range.start + first_end);
        let rest = self.slice(body_end.min(range.end)..range.end);
        if let Some(newline) = rest.rfind('\n').or((body_end > range.start + first_end).then_some(0)) {
            let last = rest[newline..].trim_start_matches('\n');
            let closing = last.trim_start_matches([' ', '\t', '>']);
            let run = closing.bytes().take_while(|&b| b == fence).count();
            if run >= fence_len && closing[run..].trim().is_empty() {
                let mark_start = range.end - closing.len();
                self.push(kind::CODE_MARK, mark_start..mark_start + run);
            }
        }

        self.code_lines(texts, range.end);
    }

    /// One `CodeText` span per line of code content, each keeping its newline.
    ///
    /// Text events inside containers start after the container prefix, so the
    /// lines never include quote markers or list indentation.
    fn code_lines(&mut self, texts: &[Range<usize>], end: usize) {
        let mut merged: Vec<Range<usize>> = Vec::new();
        for range in texts.iter().filter(|r| r.start < r.end) {
            match merged.last_mut() {
                Some(last) if matches!(self.slice(last.end..range.start), "" | "\r") => {
                    last.end = range.end;
                }
                _ => merged.push(range.clone()),
            }
        }
        for range in merged {
            let mut start = range.start;
            for line in self.slice(range.clone()).split_inclusive('\n') {
                let line_end = (start + line.len()).min(end);
                if start < line_end {
                    self.push(kind::CODE_TEXT, start..line_end);
                }
                start += line.len();
            }
        }
    }

    fn table(&mut self, range: Range<usize>) {
        self.push(kind::TABLE, range.clone());
        let text = self.slice(range.clone());
        let Some(first_newline) = text.find('\n') else {
            return;
        };
        let rest = &text[first_newline + 1..];
        let line = rest.split('\n').next().unwrap_or_default();
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return;
        }
        let start = range.start + first_newline + 1 + (line.len() - line.trim_start().len());
        self.push(kind::TABLE_DELIMITER, start..start + trimmed.len());
    }

    fn link(
        &mut self,
        range: Range<usize>,
        inner_end: usize,
        shape: LinkShape,
        destination: Destination,
        image: bool,
    ) {
        let element = if image { kind::IMAGE } else { kind::LINK };
        self.spans
            .push((self.key, Span::new(element, range.clone()).with_destination(destination)));
        let text = self.slice(range.clone());

        if shape == LinkShape::Autolink {
            if text.len() >= 2 && text.starts_with('<') && text.ends_with('>') {
                self.push(kind::LINK_MARK, range.start..range.start + 1);
                self.push(kind::URL, range.start + 1..range.end - 1);
                self.push(kind::LINK_MARK, range.end - 1..range.end);
            } else {
                self.push(kind::URL, range.clone());
            }
            return;
        }

        let opener = if image { "![" } else { "[" };
        if !text.starts_with(opener) {
            return;
        }
        self.push(kind::LINK_MARK, range.start..range.start + opener.len());

        let label_end = inner_end.clamp(range.start + opener.len(), range.end);
        let Some(offset) = self.slice(label_end..range.end).find(']') else {
            return;
        };
        let close = label_end + offset;
        self.push(kind::LINK_MARK, close..close + 1);

        let rest = self.slice(close + 1..range.end);
        match shape {
            LinkShape::Inline if rest.len() >= 2 && rest.starts_with('(') && rest.ends_with(')') => {
                self.destination(close + 1, range.end);
            }
            LinkShape::Reference if rest.len() >= 2 && rest.starts_with('[') && rest.ends_with(']') => {
                self.push(kind::LINK_LABEL, close + 1..range.end);
            }
            _ => {}
        }
    }

    /// `(url "title")` following a link label.
    fn destination(&mut self, start: usize, end: usize) {
        self.push(kind::LINK_MARK, start..start + 1);
        self.push(kind::LINK_MARK, end - 1..end);

        let inner = self.slice(start + 1..end - 1);
        let lead = inner.len() - inner.trim_start().len();
        let body = &inner[lead..];
        let url_len = if body.starts_with('<') {
            body.find('>').map_or(body.len(), |i| i + 1)
        } else {
            body.find(char::is_whitespace).unwrap_or(body.len())
        };
        let url_start = start + 1 + lead;
        if url_len > 0 {
            self.push(kind::URL, url_start..url_start + url_len);
        }

        let after = &body[url_len..];
        let title = after.trim();
        if !title.is_empty() {
            let title_start = url_start + url_len + (after.len() - after.trim_start().len());
            self.push(kind::LINK_TITLE, title_start..title_start + title.len());
        }
    }

    fn footnote_definition(&mut self, range: Range<usize>) {
        self.push(kind::FOOTNOTE_DEFINITION, range.clone());
        if let Some(colon) = self.slice(range.clone()).find("]:") {
            self.push(kind::LINK_LABEL, range.start..range.start + colon + 2);
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{Destination, MarkdownParser, SyntaxExtension, Tree, kind};

    fn parse(markdown: &str) -> Tree {
        MarkdownParser::new().parse(markdown)
    }

    fn parse_with(markdown: &str, extension: SyntaxExtension) -> Tree {
        let mut parser = MarkdownParser::new();
        parser.enable(extension);
        parser.parse(markdown)
    }

    fn texts<'a>(tree: &'a Tree, kind: &'a str) -> Vec<&'a str> {
        tree.nodes_of(kind).map(|n| n.text()).collect()
    }

    #[test]
    fn test_atx_heading_marks() {
        let tree = parse("## Title ##");
        let heading = tree.root().child(kind::heading(2)).unwrap();
        assert_eq!(heading.range(), 0..11);
        assert_eq!(texts(&tree, kind::HEADER_MARK), vec!["##", "##"]);
    }

    #[test]
    fn test_setext_heading_mark() {
        let tree = parse("Title\n===");
        assert!(tree.root().child(kind::setext_heading(1)).is_some());
        assert_eq!(texts(&tree, kind::HEADER_MARK), vec!["==="]);
    }

    #[test]
    fn test_emphasis_marks() {
        let tree = parse("**bold** and *em*");
        let paragraph = tree.root().child(kind::PARAGRAPH).unwrap();
        let strong = paragraph.child(kind::STRONG_EMPHASIS).unwrap();
        assert_eq!(strong.range(), 0..8);
        let marks: Vec<_> = strong.children_of(kind::EMPHASIS_MARK).map(|n| n.range()).collect();
        assert_eq!(marks, vec![0..2, 6..8]);
        assert_eq!(paragraph.child(kind::EMPHASIS).unwrap().text(), "*em*");
    }

    #[test]
    fn test_container_wraps_equal_range_child() {
        let tree = parse("*only*");
        let paragraph = tree.root().child(kind::PARAGRAPH).unwrap();
        assert_eq!(paragraph.range(), 0..6);
        assert!(paragraph.child(kind::EMPHASIS).is_some());
    }

    #[test]
    fn test_inline_code_marks() {
        let tree = parse("use `x` here");
        let code = tree.nodes_of(kind::INLINE_CODE).next().unwrap();
        assert_eq!(code.text(), "`x`");
        assert_eq!(code.children().count(), 2);
    }

    #[test]
    fn test_inline_link_parts() {
        let tree = parse("[text](http://x.com \"T\")");
        let link = tree.root().child(kind::PARAGRAPH).unwrap().child(kind::LINK).unwrap();
        assert_eq!(link.range(), 0..24);
        assert_eq!(texts(&tree, kind::LINK_MARK), vec!["[", "]", "(", ")"]);
        assert_eq!(texts(&tree, kind::URL), vec!["http://x.com"]);
        assert_eq!(texts(&tree, kind::LINK_TITLE), vec!["\"T\""]);
    }

    #[test]
    fn test_reference_destination_from_parser() {
        let tree = parse("> [a]\n>\n> [a]: /x \"T\"\n\n```\n[b]: /wrong\n```\n\n[b]\n\n[b]: /right");
        let destinations: Vec<_> = tree
            .nodes_of(kind::LINK)
            .map(|n| n.destination().unwrap().clone())
            .collect();
        assert_eq!(
            destinations,
            vec![
                Destination {
                    url: "/x".to_owned(),
                    title: "T".to_owned(),
                },
                Destination {
                    url: "/right".to_owned(),
                    title: String::new(),
                },
            ]
        );
    }

    #[test]
    fn test_image_opener() {
        let tree = parse("![alt](a.png)");
        let image = tree.nodes_of(kind::IMAGE).next().unwrap();
        assert_eq!(image.children().next().unwrap().text(), "![");
        assert_eq!(texts(&tree, kind::URL), vec!["a.png"]);
    }

    #[test]
    fn test_autolink_parts() {
        let tree = parse("<https://example.com>");
        assert_eq!(texts(&tree, kind::LINK_MARK), vec!["<", ">"]);
        assert_eq!(texts(&tree, kind::URL), vec!["https://example.com"]);
    }

    #[test]
    fn test_fenced_code_parts() {
        let tree = parse("```rust {1}\nfn main() {}\n```");
        let code = tree.root().child(kind::FENCED_CODE).unwrap();
        assert_eq!(code.range(), 0..28);
        assert_eq!(texts(&tree, kind::CODE_MARK), vec!["```", "```"]);
        assert_eq!(texts(&tree, kind::CODE_INFO), vec!["rust {1}"]);
        assert_eq!(texts(&tree, kind::CODE_TEXT), vec!["fn main() {}\n"]);
    }

    #[test]
    fn test_fence_inside_blockquote() {
        let tree = parse("> ```\n> code\n> ```");
        let quote = tree.root().child(kind::BLOCKQUOTE).unwrap();
        let code = quote.child(kind::FENCED_CODE).unwrap();
        assert_eq!(code.text(), "```\n> code\n> ```");
        assert_eq!(texts(&tree, kind::CODE_TEXT), vec!["code\n"]);
        let marks: Vec<_> = code.children_of(kind::CODE_MARK).map(|n| n.range()).collect();
        assert_eq!(marks, vec![2..5, 15..18]);
    }

    #[test]
    fn test_fence_inside_list_item() {
        let tree = parse("- ```\n  a\n\n  b\n  ```");
        assert_eq!(texts(&tree, kind::CODE_TEXT), vec!["a\n", "\n", "b\n"]);
        assert_eq!(texts(&tree, kind::CODE_MARK), vec!["```", "```"]);
    }

    #[test]
    fn test_indented_code_lines_skip_indent() {
        let tree = parse("    one\n      two");
        let block = tree.root().child(kind::CODE_BLOCK).unwrap();
        let lines: Vec<_> = block.children_of(kind::CODE_TEXT).map(|n| n.text()).collect();
        assert_eq!(lines, vec!["one\n", "  two"]);
    }

    #[test]
    fn test_unclosed_fence_keeps_body() {
        let tree = parse("~~~\nline one\nline two");
        assert_eq!(texts(&tree, kind::CODE_MARK), vec!["~~~"]);
        assert_eq!(texts(&tree, kind::CODE_TEXT), vec!["line one\n", "line two"]);
    }

    #[test]
    fn test_blockquote_marks() {
        let tree = parse("> one\n> two");
        let quote = tree.root().child(kind::BLOCKQUOTE).unwrap();
        assert_eq!(quote.range(), 0..11);
        let marks: Vec<_> = tree.nodes_of(kind::QUOTE_MARK).map(|n| n.range()).collect();
        assert_eq!(marks, vec![0..2, 6..8]);
    }

    #[test]
    fn test_alert_mark() {
        let tree = parse_with("> [!NOTE]\n> body", SyntaxExtension::Alerts);
        assert_eq!(texts(&tree, kind::ALERT_MARK), vec!["[!NOTE]"]);
    }

    #[test]
    fn test_list_marks() {
        let tree = parse("- a\n- b\n\n1. one\n2) two");
        assert_eq!(texts(&tree, kind::LIST_MARK), vec!["-", "-", "1.", "2)"]);
        assert!(tree.root().child(kind::BULLET_LIST).is_some());
        assert!(tree.root().child(kind::ORDERED_LIST).is_some());
    }

    #[test]
    fn test_task_marker() {
        let tree = parse_with("- [x] done", SyntaxExtension::TaskList);
        assert_eq!(texts(&tree, kind::TASK_MARKER), vec!["[x]"]);
    }

    #[test]
    fn test_table_structure() {
        let tree = parse_with("| a | b |\n|---|---|\n| 1 | 2 |", SyntaxExtension::Table);
        let table = tree.root().child(kind::TABLE).unwrap();
        assert_eq!(texts(&tree, kind::TABLE_DELIMITER), vec!["|---|---|"]);
        assert!(table.child(kind::TABLE_HEADER).is_some());
        assert_eq!(table.children_of(kind::TABLE_ROW).count(), 1);
        assert_eq!(tree.nodes_of(kind::TABLE_CELL).count(), 4);
    }

    #[test]
    fn test_math_marks() {
        let tree = parse_with("$x$ and $$y$$", SyntaxExtension::Math);
        assert_eq!(texts(&tree, kind::INLINE_MATH), vec!["$x$"]);
        assert_eq!(texts(&tree, kind::DISPLAY_MATH), vec!["$$y$$"]);
        assert_eq!(texts(&tree, kind::MATH_MARK), vec!["$", "$", "$$", "$$"]);
    }

    #[test]
    fn test_escape_and_entity() {
        let tree = parse("a \\* b &amp; c");
        assert_eq!(texts(&tree, kind::ESCAPE), vec!["\\*"]);
        assert_eq!(texts(&tree, kind::ENTITY), vec!["&amp;"]);
    }

    #[test]
    fn test_horizontal_rule_and_html() {
        let tree = parse("---\n\n<div>\nhi\n</div>\n\ntext <b>x</b>");
        assert_eq!(texts(&tree, kind::HORIZONTAL_RULE), vec!["---"]);
        assert_eq!(texts(&tree, kind::HTML_BLOCK), vec!["<div>\nhi\n</div>"]);
        assert_eq!(texts(&tree, kind::HTML_TAG), vec!["<b>", "</b>"]);
    }

    #[test]
    fn test_strikethrough_marks() {
        let tree = parse_with("~~gone~~", SyntaxExtension::Strikethrough);
        assert_eq!(texts(&tree, kind::STRIKETHROUGH_MARK), vec!["~~", "~~"]);
    }
}
