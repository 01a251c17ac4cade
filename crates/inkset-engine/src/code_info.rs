//! Fenced code block info-string parsing.
//!
//! The info string is a single line of order-independent tokens; the first
//! word is the language:
//!
//! ```text
//! tsx line-numbers{5} title="hello.tsx" copy {2-4,5} /Hello/3-5
//! ```
//!
//! Tokens are extracted by repeated scan-and-strip over the remaining text,
//! in fixed precedence: quoted `key="value"` pairs, `line-numbers{N}`,
//! `copy`, the `{a-b,c}` line set, then every `/pattern/i-j` highlight spec.
//! Malformed fragments are dropped; parsing never fails.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

static PAIR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([A-Za-z][\w-]*)="([^"]*)""#).unwrap());
static LINE_NUMBERS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)line-numbers(?:\{(\d+)\})?").unwrap());
static COPY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?:^|\s)copy(?:\s|$)").unwrap());
static LINE_SET_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{([\d,\s-]+)\}").unwrap());
static HIGHLIGHT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/((?:[^/\\]|\\.)+)/([\d,-]*)").unwrap());

/// Largest span a single `a-b` range may expand to.
const MAX_RANGE_SPAN: usize = 10_000;

/// Line numbering requested by `line-numbers`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineNumbers {
    /// Number from 1.
    Enabled,
    /// Number from the given line.
    StartAt(usize),
}

impl LineNumbers {
    /// First line number.
    #[must_use]
    pub fn start(self) -> usize {
        match self {
            Self::Enabled => 1,
            Self::StartAt(n) => n,
        }
    }
}

/// A `/pattern/` highlight spec.
#[derive(Clone, Debug)]
pub struct HighlightText {
    /// Regular expression source.
    pub pattern: String,
    /// 1-indexed match numbers within a line; empty means every match.
    pub instances: Vec<usize>,
    regex: Regex,
}

impl PartialEq for HighlightText {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern && self.instances == other.instances
    }
}

impl Eq for HighlightText {}

impl HighlightText {
    /// Compile a highlight spec. Returns `None` for invalid patterns.
    #[must_use]
    pub fn new(pattern: &str, instances: Vec<usize>) -> Option<Self> {
        let regex = Regex::new(pattern).ok()?;
        Some(Self {
            pattern: pattern.to_owned(),
            instances,
            regex,
        })
    }

    /// Ranges in `line` selected by this spec.
    #[must_use]
    pub fn find_in(&self, line: &str) -> Vec<Range<usize>> {
        self.regex
            .find_iter(line)
            .filter(|m| !m.is_empty())
            .enumerate()
            .filter(|(i, _)| self.instances.is_empty() || self.instances.contains(&(i + 1)))
            .map(|(_, m)| m.range())
            .collect()
    }
}

/// Structured form of a fenced code block's info string.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodeInfo {
    /// Language, empty when absent.
    pub language: String,
    /// Line numbering.
    pub line_numbers: Option<LineNumbers>,
    /// `title="..."`.
    pub title: Option<String>,
    /// `caption="..."`.
    pub caption: Option<String>,
    /// Show a copy button.
    pub copy: bool,
    /// Highlighted lines, 1-indexed, in order of first appearance.
    pub highlight_lines: Vec<usize>,
    /// Highlighted text patterns.
    pub highlight_text: Vec<HighlightText>,
}

impl CodeInfo {
    /// Parse an info string.
    ///
    /// # Example
    ///
    /// ```
    /// use inkset_engine::code_info::{CodeInfo, LineNumbers};
    ///
    /// let info = CodeInfo::parse(r#"tsx line-numbers{5} title="hello.tsx" copy {2-4,5} /Hello/3-5"#);
    /// assert_eq!(info.language, "tsx");
    /// assert_eq!(info.line_numbers, Some(LineNumbers::StartAt(5)));
    /// assert_eq!(info.title.as_deref(), Some("hello.tsx"));
    /// assert!(info.copy);
    /// assert_eq!(info.highlight_lines, vec![2, 3, 4, 5]);
    /// assert_eq!(info.highlight_text[0].pattern, "Hello");
    /// assert_eq!(info.highlight_text[0].instances, vec![3, 4, 5]);
    /// ```
    #[must_use]
    pub fn parse(info: &str) -> Self {
        let mut result = Self::default();
        let info = info.trim();

        let (first, rest) = info.split_once(char::is_whitespace).unwrap_or((info, ""));
        let mut remaining = if is_language(first) {
            result.language = first.to_owned();
            rest.to_owned()
        } else {
            info.to_owned()
        };

        for caps in PAIR_RE.captures_iter(&remaining) {
            match &caps[1] {
                "title" => result.title = Some(caps[2].to_owned()),
                "caption" => result.caption = Some(caps[2].to_owned()),
                _ => {}
            }
        }
        remaining = PAIR_RE.replace_all(&remaining, " ").into_owned();

        if let Some(caps) = LINE_NUMBERS_RE.captures(&remaining) {
            result.line_numbers = Some(
                caps.get(1)
                    .and_then(|n| n.as_str().parse().ok())
                    .map_or(LineNumbers::Enabled, LineNumbers::StartAt),
            );
            remaining = LINE_NUMBERS_RE.replace(&remaining, " ").into_owned();
        }

        if COPY_RE.is_match(&remaining) {
            result.copy = true;
            remaining = COPY_RE.replace(&remaining, " ").into_owned();
        }

        if let Some(caps) = LINE_SET_RE.captures(&remaining) {
            result.highlight_lines = expand_line_set(&caps[1]);
            remaining = LINE_SET_RE.replace(&remaining, " ").into_owned();
        }

        result.highlight_text = HIGHLIGHT_RE
            .captures_iter(&remaining)
            .filter_map(|caps| HighlightText::new(&caps[1], expand_line_set(&caps[2])))
            .collect();

        result
    }

    /// Whether the 1-indexed line is highlighted.
    #[must_use]
    pub fn highlights_line(&self, line: usize) -> bool {
        self.highlight_lines.contains(&line)
    }

    /// Text ranges to highlight in one line.
    #[must_use]
    pub fn text_highlights(&self, line: &str) -> Vec<Range<usize>> {
        let mut ranges: Vec<Range<usize>> = self
            .highlight_text
            .iter()
            .flat_map(|spec| spec.find_in(line))
            .collect();
        ranges.sort_by_key(|r| (r.start, std::cmp::Reverse(r.end)));
        let mut merged: Vec<Range<usize>> = Vec::with_capacity(ranges.len());
        for range in ranges {
            match merged.last_mut() {
                Some(last) if range.start <= last.end => last.end = last.end.max(range.end),
                _ => merged.push(range),
            }
        }
        merged
    }
}

fn is_language(word: &str) -> bool {
    !word.is_empty()
        && !word.starts_with(['{', '/'])
        && !word.contains('=')
        && word != "copy"
        && !word.starts_with("line-numbers")
}

/// Expand `2-4,5` into `[2, 3, 4, 5]`, keeping first-appearance order.
fn expand_line_set(set: &str) -> Vec<usize> {
    let mut lines = Vec::new();
    let mut push = |n: usize| {
        if !lines.contains(&n) {
            lines.push(n);
        }
    };

    for part in set.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.split_once('-') {
            Some((a, b)) => {
                let (Ok(a), Ok(b)) = (a.trim().parse::<usize>(), b.trim().parse::<usize>()) else {
                    continue;
                };
                if a <= b && b - a <= MAX_RANGE_SPAN {
                    (a..=b).for_each(&mut push);
                }
            }
            None => {
                if let Ok(n) = part.parse() {
                    push(n);
                }
            }
        }
    }
    lines
}
