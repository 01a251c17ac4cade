//! ATX and setext headings.

use std::ops::Range;

use inkset_tree::{Node, kind};

use super::syntax_markers;
use crate::annotation::Annotation;
use crate::plugin::{Plugin, Rendered};
use crate::util::{escape_html, line_at, plain_text};

/// Heading plugin.
#[must_use]
pub fn plugin() -> Plugin {
    Plugin::new("heading", env!("CARGO_PKG_VERSION"))
        .with_priority(10)
        .with_node_types(kind::headings())
        .with_annotate(|ctx, out| {
            for node in ctx.tree.iter().filter(|n| kind::heading_level(n.kind()).is_some()) {
                if !ctx.viewport.shows(&node.range()) {
                    continue;
                }
                let level = kind::heading_level(node.kind()).unwrap_or(1);
                let line = line_at(ctx.source(), node.start());
                out.push(Annotation::line(line.start, format!("ink-h{level}")));
                syntax_markers(ctx.reveals(node), marker_ranges(node), out);
            }
            Ok(())
        })
        .with_render(|node, children, ctx| {
            let Some(level) = kind::heading_level(node.kind()) else {
                return Rendered::Unhandled;
            };
            let id = ctx.unique_id(plain_text(node, node.range()).trim());
            Rendered::Html(format!(
                r#"<h{level} id="{}">{}</h{level}>"#,
                escape_html(&id),
                children.html().trim()
            ))
        })
        .with_styles(|_| {
            ".ink-h1 { font-size: 2em; font-weight: 600; }
.ink-h2 { font-size: 1.5em; font-weight: 600; }
.ink-h3 { font-size: 1.25em; font-weight: 600; }
.ink-h4, .ink-h5, .ink-h6 { font-weight: 600; }"
                .to_owned()
        })
}

/// Marker ranges, widened over the whitespace that separates them from the
/// heading text so hiding them leaves no stray spaces.
fn marker_ranges(node: Node<'_>) -> Vec<Range<usize>> {
    let source = node.tree().source().as_bytes();
    let text = plain_text(node, node.range());
    let has_text = !text.trim().is_empty();

    node.children_of(kind::HEADER_MARK)
        .map(|mark| {
            let mut range = mark.range();
            if mark.start() == node.start() {
                while has_text && range.end < node.end() && source[range.end] == b' ' {
                    range.end += 1;
                }
            } else {
                while range.start > node.start() && source[range.start - 1] == b' ' {
                    range.start -= 1;
                }
            }
            range
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::AnnotationKind;
    use crate::external::Services;
    use crate::plugins::SYNTAX_CLASS;
    use crate::plugins::test_support::{annotate, describe, render};
    use crate::selection::Selection;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_hidden_markers_include_spacing() {
        let source = "## Title ##\n\ntext";
        let annotations = annotate(plugin(), source, &Selection::caret(source.len()));
        assert_eq!(
            describe(&annotations, source),
            vec![
                (AnnotationKind::Line, "", "ink-h2"),
                (AnnotationKind::Replace, "## ", ""),
                (AnnotationKind::Replace, " ##", ""),
            ]
        );
    }

    #[test]
    fn test_revealed_markers_styled() {
        let source = "# Title";
        let annotations = annotate(plugin(), source, &Selection::caret(3));
        assert_eq!(
            describe(&annotations, source),
            vec![
                (AnnotationKind::Line, "", "ink-h1"),
                (AnnotationKind::Mark, "# ", SYNTAX_CLASS),
            ]
        );
    }

    #[test]
    fn test_setext_underline() {
        let source = "Title\n=====\n\nx";
        let annotations = annotate(plugin(), source, &Selection::none());
        assert_eq!(
            describe(&annotations, source),
            vec![
                (AnnotationKind::Line, "", "ink-h1"),
                (AnnotationKind::Replace, "=====", ""),
            ]
        );
    }

    #[test]
    fn test_render_with_deduplicated_ids() {
        let html = render(
            vec![plugin()],
            &Services::default(),
            "# FAQ\n\n## *FAQ*\n\nSub\n---",
        );
        assert_eq!(
            html,
            "<h1 id=\"faq\">FAQ</h1>\n<h2 id=\"faq-1\">FAQ</h2>\n<h2 id=\"sub\">Sub</h2>"
        );
    }

    #[test]
    fn test_render_escapes_content() {
        let html = render(vec![plugin()], &Services::default(), "# a < b");
        assert_eq!(html, "<h1 id=\"a-b\">a &lt; b</h1>");
    }
}
