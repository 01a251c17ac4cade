//! Blockquotes and GitHub-style alerts (`> [!NOTE]`).

use inkset_tree::{Node, SyntaxExtension, kind};

use super::{SYNTAX_CLASS, html_widget};
use crate::annotation::Annotation;
use crate::plugin::{Plugin, Rendered};
use crate::render::RenderContext;
use crate::util::{is_marker, line_ranges};

// SVG icons for alerts (GitHub Octicons-style, 16x16)
const SVG_INFO: &str = r#"<svg class="alert-icon" viewBox="0 0 16 16" width="16" height="16" aria-hidden="true"><path d="M0 8a8 8 0 1 1 16 0A8 8 0 0 1 0 8Zm8-6.5a6.5 6.5 0 1 0 0 13 6.5 6.5 0 0 0 0-13ZM6.5 7.75A.75.75 0 0 1 7.25 7h1a.75.75 0 0 1 .75.75v2.75h.25a.75.75 0 0 1 0 1.5h-2a.75.75 0 0 1 0-1.5h.25v-2h-.25a.75.75 0 0 1-.75-.75ZM8 6a1 1 0 1 1 0-2 1 1 0 0 1 0 2Z"></path></svg>"#;
const SVG_LIGHTBULB: &str = r#"<svg class="alert-icon" viewBox="0 0 16 16" width="16" height="16" aria-hidden="true"><path d="M8 1.5c-2.363 0-4 1.69-4 3.75 0 .984.424 1.625.984 2.304l.214.253c.223.264.47.556.673.848.284.411.537.896.621 1.49a.75.75 0 0 1-1.484.211c-.04-.282-.163-.547-.37-.847a8.456 8.456 0 0 0-.542-.68c-.084-.1-.173-.205-.268-.32C3.201 7.75 2.5 6.766 2.5 5.25 2.5 2.31 4.863 0 8 0s5.5 2.31 5.5 5.25c0 1.516-.701 2.5-1.328 3.259-.095.115-.184.22-.268.319-.207.245-.383.453-.541.681-.208.3-.33.565-.37.847a.751.751 0 0 1-1.485-.212c.084-.593.337-1.078.621-1.489.203-.292.45-.584.673-.848.075-.088.147-.173.213-.253.561-.679.985-1.32.985-2.304 0-2.06-1.637-3.75-4-3.75ZM5.75 12h4.5a.75.75 0 0 1 0 1.5h-4.5a.75.75 0 0 1 0-1.5ZM6 15.25a.75.75 0 0 1 .75-.75h2.5a.75.75 0 0 1 0 1.5h-2.5a.75.75 0 0 1-.75-.75Z"></path></svg>"#;
const SVG_REPORT: &str = r#"<svg class="alert-icon" viewBox="0 0 16 16" width="16" height="16" aria-hidden="true"><path d="M0 1.75C0 .784.784 0 1.75 0h12.5C15.216 0 16 .784 16 1.75v9.5A1.75 1.75 0 0 1 14.25 13H8.06l-2.573 2.573A1.458 1.458 0 0 1 3 14.543V13H1.75A1.75 1.75 0 0 1 0 11.25Zm1.75-.25a.25.25 0 0 0-.25.25v9.5c0 .138.112.25.25.25h2a.75.75 0 0 1 .75.75v2.19l2.72-2.72a.749.749 0 0 1 .53-.22h6.5a.25.25 0 0 0 .25-.25v-9.5a.25.25 0 0 0-.25-.25Zm7 2.25v2.5a.75.75 0 0 1-1.5 0v-2.5a.75.75 0 0 1 1.5 0ZM9 9a1 1 0 1 1-2 0 1 1 0 0 1 2 0Z"></path></svg>"#;
const SVG_ALERT: &str = r#"<svg class="alert-icon" viewBox="0 0 16 16" width="16" height="16" aria-hidden="true"><path d="M6.457 1.047c.659-1.234 2.427-1.234 3.086 0l6.082 11.378A1.75 1.75 0 0 1 14.082 15H1.918a1.75 1.75 0 0 1-1.543-2.575Zm1.763.707a.25.25 0 0 0-.44 0L1.698 13.132a.25.25 0 0 0 .22.368h12.164a.25.25 0 0 0 .22-.368Zm.53 3.996v2.5a.75.75 0 0 1-1.5 0v-2.5a.75.75 0 0 1 1.5 0ZM9 11a1 1 0 1 1-2 0 1 1 0 0 1 2 0Z"></path></svg>"#;
const SVG_STOP: &str = r#"<svg class="alert-icon" viewBox="0 0 16 16" width="16" height="16" aria-hidden="true"><path d="M4.47.22A.749.749 0 0 1 5 0h6c.199 0 .389.079.53.22l4.25 4.25c.141.14.22.331.22.53v6a.749.749 0 0 1-.22.53l-4.25 4.25A.749.749 0 0 1 11 16H5a.749.749 0 0 1-.53-.22L.22 11.53A.749.749 0 0 1 0 11V5c0-.199.079-.389.22-.53Zm.84 1.28L1.5 5.31v5.38l3.81 3.81h5.38l3.81-3.81V5.31L10.69 1.5ZM8 4a.75.75 0 0 1 .75.75v3.5a.75.75 0 0 1-1.5 0v-3.5A.75.75 0 0 1 8 4Zm0 8a1 1 0 1 1 0-2 1 1 0 0 1 0 2Z"></path></svg>"#;

/// Alert flavour of a blockquote.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertKind {
    Note,
    Tip,
    Important,
    Warning,
    Caution,
}

impl AlertKind {
    /// Parse an alert marker such as `[!NOTE]` (case-insensitive).
    #[must_use]
    pub fn from_marker(marker: &str) -> Option<Self> {
        let name = marker.strip_prefix("[!")?.strip_suffix(']')?;
        match name.to_ascii_lowercase().as_str() {
            "note" => Some(Self::Note),
            "tip" => Some(Self::Tip),
            "important" => Some(Self::Important),
            "warning" => Some(Self::Warning),
            "caution" => Some(Self::Caution),
            _ => None,
        }
    }

    fn parts(self) -> (&'static str, &'static str, &'static str) {
        match self {
            Self::Note => ("note", SVG_INFO, "Note"),
            Self::Tip => ("tip", SVG_LIGHTBULB, "Tip"),
            Self::Important => ("important", SVG_REPORT, "Important"),
            Self::Warning => ("warning", SVG_ALERT, "Warning"),
            Self::Caution => ("caution", SVG_STOP, "Caution"),
        }
    }

    fn title_html(self) -> String {
        let (_, icon, title) = self.parts();
        format!(r#"<div class="alert-title">{icon}{title}</div>"#)
    }
}

/// Blockquote plugin.
#[must_use]
pub fn plugin() -> Plugin {
    Plugin::new("blockquote", env!("CARGO_PKG_VERSION"))
        .with_priority(50)
        .with_node_types([kind::BLOCKQUOTE])
        .with_syntax(SyntaxExtension::Alerts)
        .with_annotate(|ctx, out| {
            let quotes = ctx
                .nodes_of(kind::BLOCKQUOTE)
                .filter(|node| !node.ancestors().any(|a| a.is(kind::BLOCKQUOTE)));
            for node in quotes {
                let revealed = ctx.reveals(node);
                let alert = alert_kind(node);
                let line_class = alert.map_or_else(
                    || "ink-blockquote".to_owned(),
                    |alert| format!("ink-alert ink-alert-{}", alert.parts().0),
                );
                for line in line_ranges(ctx.source(), node.range()) {
                    out.push(Annotation::line(line.start, line_class.as_str()));
                }

                let marks = node.descendants().filter(|n| n.is(kind::QUOTE_MARK));
                super::syntax_markers(revealed, marks.map(|m| m.range()), out);

                if let (Some(alert), Some(mark)) = (alert, node.child(kind::ALERT_MARK)) {
                    out.push(if revealed {
                        Annotation::mark(mark.range(), SYNTAX_CLASS)
                    } else {
                        Annotation::replace(mark.range(), html_widget("ink-alert-title", alert.title_html()))
                    });
                }
            }
            Ok(())
        })
        .with_render(|node, _, ctx| {
            let body = block_children(node, ctx);
            let html = match alert_kind(node) {
                Some(alert) => format!(
                    r#"<div class="alert alert-{}">{}<div class="alert-content">{body}</div></div>"#,
                    alert.parts().0,
                    alert.title_html()
                ),
                None => format!("<blockquote>{body}</blockquote>"),
            };
            Rendered::Html(html)
        })
        .with_styles(|_| {
            ".ink-blockquote, blockquote { border-left: 3px solid var(--ink-border); padding-left: 1em; color: var(--ink-muted); }
.ink-alert, .alert { border-left: 3px solid var(--ink-accent); padding-left: 1em; }
.ink-alert-warning, .alert-warning { border-left-color: #d29922; }
.ink-alert-caution, .alert-caution { border-left-color: #f85149; }
.alert-title { display: flex; gap: 0.5em; align-items: center; font-weight: 600; }
.alert-icon { fill: currentColor; }"
                .to_owned()
        })
}

fn alert_kind(node: Node<'_>) -> Option<AlertKind> {
    node.child(kind::ALERT_MARK)
        .and_then(|mark| AlertKind::from_marker(mark.text()))
}

/// Child blocks one per line, without the quote markers between them.
fn block_children(node: Node<'_>, ctx: &RenderContext<'_>) -> String {
    node.children()
        .filter(|child| !is_marker(child.kind()))
        .map(|child| ctx.render_node(child))
        .filter(|html| !html.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::AnnotationKind;
    use crate::external::Services;
    use crate::plugins::test_support::{annotate, describe, render};
    use crate::selection::Selection;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_alert_kind_from_marker() {
        assert_eq!(AlertKind::from_marker("[!NOTE]"), Some(AlertKind::Note));
        assert_eq!(AlertKind::from_marker("[!warning]"), Some(AlertKind::Warning));
        assert_eq!(AlertKind::from_marker("[!OTHER]"), None);
        assert_eq!(AlertKind::from_marker("NOTE"), None);
    }

    #[test]
    fn test_hidden_quote_marks() {
        let source = "> one\n> two\n\nx";
        let annotations = annotate(plugin(), source, &Selection::caret(source.len()));
        assert_eq!(
            describe(&annotations, source),
            vec![
                (AnnotationKind::Line, "", "ink-blockquote"),
                (AnnotationKind::Replace, "> ", ""),
                (AnnotationKind::Line, "", "ink-blockquote"),
                (AnnotationKind::Replace, "> ", ""),
            ]
        );
    }

    #[test]
    fn test_revealed_quote_marks() {
        let source = "> one";
        let annotations = annotate(plugin(), source, &Selection::caret(3));
        assert_eq!(
            describe(&annotations, source),
            vec![
                (AnnotationKind::Line, "", "ink-blockquote"),
                (AnnotationKind::Mark, "> ", SYNTAX_CLASS),
            ]
        );
    }

    #[test]
    fn test_hidden_alert_marker_becomes_title() {
        let source = "> [!WARNING]\n> Be careful";
        let annotations = annotate(plugin(), source, &Selection::none());
        let described = describe(&annotations, source);
        assert_eq!(described[0], (AnnotationKind::Line, "", "ink-alert ink-alert-warning"));
        assert!(described.contains(&(AnnotationKind::Replace, "[!WARNING]", "")));

        let title = annotations
            .iter()
            .find(|a| a.is_widget_replacement())
            .unwrap();
        let view = title.widget.as_ref().unwrap().build(title.range());
        assert!(view.as_html().unwrap().contains("Warning</div>"));
    }

    #[test]
    fn test_render_blockquote() {
        let html = render(vec![plugin()], &Services::default(), "> one\n> two");
        assert_eq!(html, "<blockquote><p>one\ntwo</p></blockquote>");
    }

    #[test]
    fn test_render_nested_blockquote() {
        let html = render(vec![plugin()], &Services::default(), "> a\n>\n> > b");
        assert_eq!(
            html,
            "<blockquote><p>a</p>\n<blockquote><p>b</p></blockquote></blockquote>"
        );
    }

    #[test]
    fn test_render_alert() {
        let html = render(vec![plugin()], &Services::default(), "> [!TIP]\n> Use it");
        assert!(html.starts_with(r#"<div class="alert alert-tip"><div class="alert-title"><svg"#));
        assert!(html.ends_with(r#"Tip</div><div class="alert-content"><p>Use it</p></div></div>"#));
    }
}
