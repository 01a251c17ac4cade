//! `pulldown-cmark` adapter producing [`Tree`]s.

use std::fmt;
use std::str::FromStr;

use pulldown_cmark::{Options, Parser};

use crate::Tree;
use crate::collect::SpanCollector;

/// Grammar extension that can be registered with the parser.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SyntaxExtension {
    /// GFM tables.
    Table,
    /// `~~strikethrough~~`.
    Strikethrough,
    /// `- [ ] task` list items.
    TaskList,
    /// `$inline$` and `$$display$$` math.
    Math,
    /// `[^note]` footnotes.
    Footnotes,
    /// `> [!NOTE]` blockquote alerts.
    Alerts,
}

impl SyntaxExtension {
    /// All extensions, in registration-name order.
    pub const ALL: [Self; 6] = [
        Self::Table,
        Self::Strikethrough,
        Self::TaskList,
        Self::Math,
        Self::Footnotes,
        Self::Alerts,
    ];

    /// Registration name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Strikethrough => "strikethrough",
            Self::TaskList => "task-list",
            Self::Math => "math",
            Self::Footnotes => "footnotes",
            Self::Alerts => "alerts",
        }
    }

    fn options(self) -> Options {
        match self {
            Self::Table => Options::ENABLE_TABLES,
            Self::Strikethrough => Options::ENABLE_STRIKETHROUGH,
            Self::TaskList => Options::ENABLE_TASKLISTS,
            Self::Math => Options::ENABLE_MATH,
            Self::Footnotes => Options::ENABLE_FOOTNOTES,
            Self::Alerts => Options::ENABLE_GFM,
        }
    }
}

impl fmt::Display for SyntaxExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SyntaxExtension {
    type Err = SyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ext| ext.name() == s)
            .ok_or_else(|| SyntaxError::UnknownExtension(s.to_owned()))
    }
}

/// Syntax extension registration error.
#[derive(Debug, thiserror::Error)]
pub enum SyntaxError {
    /// The parser has no extension with this name.
    #[error("unknown syntax extension `{0}`")]
    UnknownExtension(String),
}

/// Markdown parser with registrable syntax extensions.
///
/// Plain `CommonMark` by default; each registered extension enables the
/// corresponding `pulldown-cmark` option.
///
/// # Example
///
/// ```
/// use inkset_tree::{MarkdownParser, SyntaxExtension, kind};
///
/// let mut parser = MarkdownParser::new();
/// parser.register("table").unwrap();
/// assert!(parser.is_enabled(SyntaxExtension::Table));
/// assert!(parser.register("wiki-links").is_err());
///
/// let tree = parser.parse("| a |\n|---|\n| 1 |");
/// assert!(tree.root().child(kind::TABLE).is_some());
/// ```
#[derive(Clone, Debug, Default)]
pub struct MarkdownParser {
    extensions: Vec<SyntaxExtension>,
}

impl MarkdownParser {
    /// Create a `CommonMark`-only parser.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an extension by name.
    ///
    /// Registering the same extension twice is a no-op.
    pub fn register(&mut self, name: &str) -> Result<SyntaxExtension, SyntaxError> {
        let extension = name.parse::<SyntaxExtension>()?;
        self.enable(extension);
        Ok(extension)
    }

    /// Enable an extension.
    pub fn enable(&mut self, extension: SyntaxExtension) {
        if !self.extensions.contains(&extension) {
            self.extensions.push(extension);
        }
    }

    /// Check whether an extension is enabled.
    #[must_use]
    pub fn is_enabled(&self, extension: SyntaxExtension) -> bool {
        self.extensions.contains(&extension)
    }

    /// Enabled extensions in registration order.
    #[must_use]
    pub fn extensions(&self) -> &[SyntaxExtension] {
        &self.extensions
    }

    /// `pulldown-cmark` options for the enabled extensions.
    #[must_use]
    pub fn options(&self) -> Options {
        self.extensions
            .iter()
            .fold(Options::empty(), |options, ext| options | ext.options())
    }

    /// Parse markdown into a tree.
    #[must_use]
    pub fn parse(&self, source: &str) -> Tree {
        let mut collector = SpanCollector::new(source);
        for (event, range) in Parser::new_ext(source, self.options()).into_offset_iter() {
            collector.event(event, range);
        }
        Tree::from_spans(source, collector.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_names_round_trip() {
        for ext in SyntaxExtension::ALL {
            assert_eq!(ext.name().parse::<SyntaxExtension>().unwrap(), ext);
        }
    }

    #[test]
    fn test_unknown_extension() {
        let mut parser = MarkdownParser::new();
        let err = parser.register("mermaid").unwrap_err();
        assert_eq!(err.to_string(), "unknown syntax extension `mermaid`");
        assert!(parser.extensions().is_empty());
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut parser = MarkdownParser::new();
        parser.register("math").unwrap();
        parser.register("math").unwrap();
        assert_eq!(parser.extensions(), &[SyntaxExtension::Math]);
    }

    #[test]
    fn test_options_accumulate() {
        let mut parser = MarkdownParser::new();
        assert!(parser.options().is_empty());
        parser.enable(SyntaxExtension::Table);
        parser.enable(SyntaxExtension::TaskList);
        let options = parser.options();
        assert!(options.contains(Options::ENABLE_TABLES));
        assert!(options.contains(Options::ENABLE_TASKLISTS));
        assert!(!options.contains(Options::ENABLE_MATH));
    }
}
