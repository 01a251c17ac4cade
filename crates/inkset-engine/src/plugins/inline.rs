//! Emphasis, strong emphasis, strikethrough and inline code.

use inkset_tree::{Node, SyntaxExtension, kind};

use super::syntax_markers;
use crate::annotation::Annotation;
use crate::plugin::{Plugin, Rendered};
use crate::util::escape_html;

const NODE_TYPES: [&str; 4] = [
    kind::EMPHASIS,
    kind::STRONG_EMPHASIS,
    kind::STRIKETHROUGH,
    kind::INLINE_CODE,
];

/// Inline formatting plugin.
#[must_use]
pub fn plugin() -> Plugin {
    Plugin::new("inline", env!("CARGO_PKG_VERSION"))
        .with_priority(20)
        .with_node_types(NODE_TYPES)
        .with_syntax(SyntaxExtension::Strikethrough)
        .with_annotate(|ctx, out| {
            for node in ctx.nodes_of_any(&NODE_TYPES) {
                let (class, marker) = style(node.kind());
                out.push(Annotation::mark(node.range(), class));
                let markers = node.children_of(marker).map(|m| m.range());
                syntax_markers(ctx.reveals(node), markers, out);
            }
            Ok(())
        })
        .with_render(|node, children, _| {
            let html = match node.kind() {
                kind::EMPHASIS => format!("<em>{}</em>", children.html()),
                kind::STRONG_EMPHASIS => format!("<strong>{}</strong>", children.html()),
                kind::STRIKETHROUGH => format!("<del>{}</del>", children.html()),
                kind::INLINE_CODE => format!("<code>{}</code>", escape_html(code_content(node))),
                _ => return Rendered::Unhandled,
            };
            Rendered::Html(html)
        })
        .with_styles(|_| {
            ".ink-em { font-style: italic; }
.ink-strong { font-weight: 600; }
.ink-strike { text-decoration: line-through; }
.ink-code { font-family: monospace; background: var(--ink-code-bg); border-radius: 4px; }"
                .to_owned()
        })
}

fn style(node_type: &str) -> (&'static str, &'static str) {
    match node_type {
        kind::EMPHASIS => ("ink-em", kind::EMPHASIS_MARK),
        kind::STRONG_EMPHASIS => ("ink-strong", kind::EMPHASIS_MARK),
        kind::STRIKETHROUGH => ("ink-strike", kind::STRIKETHROUGH_MARK),
        _ => ("ink-code", kind::CODE_MARK),
    }
}

/// Code span text between the backtick runs, with one padding space
/// stripped from each side when both are present.
fn code_content(node: Node<'_>) -> &str {
    let open = node.child(kind::CODE_MARK).map_or(node.start(), |m| m.end());
    let close = node
        .last_child(kind::CODE_MARK)
        .filter(|m| m.start() >= open)
        .map_or(node.end(), |m| m.start());
    let text = node.tree().slice(open..close);
    match text.strip_prefix(' ').and_then(|t| t.strip_suffix(' ')) {
        Some(inner) if !text.trim().is_empty() => inner,
        _ => text,
    }
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
    fn test_caret_after_bold_reveals() {
        let source = "**bold** x";
        let annotations = annotate(plugin(), source, &Selection::caret(8));
        assert_eq!(
            describe(&annotations, source),
            vec![
                (AnnotationKind::Mark, "**bold**", "ink-strong"),
                (AnnotationKind::Mark, "**", SYNTAX_CLASS),
                (AnnotationKind::Mark, "**", SYNTAX_CLASS),
            ]
        );
    }

    #[test]
    fn test_caret_away_hides() {
        let source = "**bold** x";
        let annotations = annotate(plugin(), source, &Selection::caret(10));
        assert_eq!(
            describe(&annotations, source),
            vec![
                (AnnotationKind::Replace, "**", ""),
                (AnnotationKind::Mark, "**bold**", "ink-strong"),
                (AnnotationKind::Replace, "**", ""),
            ]
        );
    }

    #[test]
    fn test_nested_emphasis() {
        let source = "***both***";
        let annotations = annotate(plugin(), source, &Selection::none());
        let styles: Vec<_> = annotations
            .iter()
            .filter(|a| a.kind == AnnotationKind::Mark)
            .map(|a| a.style.as_str())
            .collect();
        assert_eq!(styles.len(), 2);
        assert!(styles.contains(&"ink-em") && styles.contains(&"ink-strong"));
    }

    #[test]
    fn test_render() {
        let html = render(
            vec![plugin()],
            &Services::default(),
            "*a* **b** ~~c~~ `` `<d>` ``",
        );
        assert_eq!(
            html,
            "<p><em>a</em> <strong>b</strong> <del>c</del> <code>`&lt;d&gt;`</code></p>"
        );
    }

    #[test]
    fn test_code_keeps_single_sided_space() {
        let html = render(vec![plugin()], &Services::default(), "` a`");
        assert_eq!(html, "<p><code> a</code></p>");
    }
}
