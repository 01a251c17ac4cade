//! Links and images.
//!
//! Hidden links keep their text visible and hide the surrounding syntax;
//! hidden images are replaced by the image itself. Activating the image
//! widget selects its source.

use std::ops::Range;

use inkset_tree::{Node, kind};

use super::syntax_markers;
use crate::annotation::{Annotation, HostEvent, Widget, WidgetView};
use crate::plugin::{Plugin, Rendered};
use crate::util::{escape_html, plain_text};

/// Resolved link destination.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Target {
    /// Destination URL.
    pub href: String,
    /// Optional title.
    pub title: Option<String>,
}

/// Link and image plugin.
#[must_use]
pub fn plugin() -> Plugin {
    Plugin::new("link", env!("CARGO_PKG_VERSION"))
        .with_priority(30)
        .with_node_types([kind::LINK, kind::IMAGE])
        .with_annotate(|ctx, out| {
            for node in ctx.nodes_of_any(&[kind::LINK, kind::IMAGE]) {
                let revealed = ctx.reveals(node);
                if node.is(kind::IMAGE) && !revealed {
                    let html = image_html(node);
                    let widget = Widget::new(move |range| {
                        WidgetView::html("ink-image", html.as_str()).with_activation(HostEvent::Select(range))
                    });
                    out.push(Annotation::replace(node.range(), widget));
                    continue;
                }
                let class = if node.is(kind::IMAGE) {
                    "ink-image-source"
                } else {
                    "ink-link"
                };
                out.push(Annotation::mark(node.range(), class));
                syntax_markers(revealed, syntax_ranges(node), out);
            }
            Ok(())
        })
        .with_render(|node, _, ctx| {
            if node.is(kind::IMAGE) {
                return Rendered::Html(image_html(node));
            }
            let Some(target) = target(node) else {
                return Rendered::Unhandled;
            };
            let text = text_range(node);
            let content = if is_autolink(node) {
                escape_html(ctx.slice(text))
            } else {
                ctx.render_span(node, text)
            };
            Rendered::Html(format!(
                r#"<a href="{}"{}>{content}</a>"#,
                escape_html(&target.href),
                title_attr(target.title.as_deref()),
            ))
        })
        .with_styles(|_| {
            ".ink-link { color: var(--ink-accent); text-decoration: underline; }
.ink-image img { max-width: 100%; }"
                .to_owned()
        })
}

/// Destination of a link or image.
///
/// Parsed trees carry the destination the parser resolved, including
/// reference links whose definition sits inside a container. Hand-assembled
/// trees fall back to the node's `Url` child.
#[must_use]
pub fn target(node: Node<'_>) -> Option<Target> {
    let (mut href, title) = match node.destination() {
        Some(destination) => (
            destination.url.clone(),
            Some(destination.title.clone()).filter(|t| !t.is_empty()),
        ),
        None => {
            let url = node.child(kind::URL)?;
            let href = url.text().trim_start_matches('<').trim_end_matches('>').to_owned();
            let title = node.child(kind::LINK_TITLE).map(|t| unquote(t.text()).to_owned());
            (href, title)
        }
    };
    if is_autolink(node) && href.contains('@') && !href.contains(':') {
        href.insert_str(0, "mailto:");
    }
    Some(Target { href, title })
}

fn is_autolink(node: Node<'_>) -> bool {
    node.text().starts_with('<') || node.children().next().is_some_and(|c| c.is(kind::URL))
}

/// Syntax around the link text: the opener, and everything from the closing
/// bracket to the end. Autolinks only hide their angle brackets.
fn syntax_ranges(node: Node<'_>) -> Vec<Range<usize>> {
    if is_autolink(node) {
        return node.children_of(kind::LINK_MARK).map(|m| m.range()).collect();
    }

    let Some(opener) = node.child(kind::LINK_MARK).filter(|m| m.start() == node.start()) else {
        return Vec::new();
    };
    let tail = node
        .children()
        .filter(|c| c.start() > opener.start())
        .find(|c| c.is(kind::LINK_MARK) || c.is(kind::LINK_LABEL) || c.is(kind::URL))
        .map(|c| c.start()..node.end());
    std::iter::once(opener.range()).chain(tail).collect()
}

/// Range of the visible link text.
fn text_range(node: Node<'_>) -> Range<usize> {
    if is_autolink(node) {
        return node.child(kind::URL).map_or(node.range(), |url| url.range());
    }
    let ranges = syntax_ranges(node);
    let start = ranges.first().map_or(node.start(), |r| r.end);
    let end = ranges.get(1).map_or(node.end(), |r| r.start);
    start..end.max(start)
}

fn image_html(node: Node<'_>) -> String {
    let target = target(node).unwrap_or_default();
    format!(
        r#"<img src="{}" alt="{}"{}>"#,
        escape_html(&target.href),
        escape_html(plain_text(node, node.range()).trim()),
        title_attr(target.title.as_deref())
    )
}

fn title_attr(title: Option<&str>) -> String {
    title
        .filter(|t| !t.is_empty())
        .map(|t| format!(r#" title="{}""#, escape_html(t)))
        .unwrap_or_default()
}

fn unquote(text: &str) -> &str {
    let mut chars = text.chars();
    match (chars.next(), chars.next_back()) {
        (Some('"'), Some('"')) | (Some('\''), Some('\'')) | (Some('('), Some(')')) => {
            &text[1..text.len() - 1]
        }
        _ => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::AnnotationKind;
    use crate::external::Services;
    use crate::plugins::SYNTAX_CLASS;
    use crate::plugins::test_support::{annotate, describe, parse, render};
    use crate::selection::Selection;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_hidden_link_keeps_text() {
        let source = "[text](http://x.com \"T\") after";
        let annotations = annotate(plugin(), source, &Selection::caret(source.len()));
        assert_eq!(
            describe(&annotations, source),
            vec![
                (AnnotationKind::Replace, "[", ""),
                (AnnotationKind::Mark, "[text](http://x.com \"T\")", "ink-link"),
                (AnnotationKind::Replace, "](http://x.com \"T\")", ""),
            ]
        );
    }

    #[test]
    fn test_revealed_link_styles_syntax() {
        let source = "[text][ref]\n\n[ref]: /r";
        let annotations = annotate(plugin(), source, &Selection::caret(2));
        assert_eq!(
            describe(&annotations, source),
            vec![
                (AnnotationKind::Mark, "[text][ref]", "ink-link"),
                (AnnotationKind::Mark, "[", SYNTAX_CLASS),
                (AnnotationKind::Mark, "][ref]", SYNTAX_CLASS),
            ]
        );
    }

    #[test]
    fn test_autolink_hides_brackets_only() {
        let source = "<https://y.org>";
        let annotations = annotate(plugin(), source, &Selection::none());
        assert_eq!(
            describe(&annotations, source),
            vec![
                (AnnotationKind::Replace, "<", ""),
                (AnnotationKind::Mark, "<https://y.org>", "ink-link"),
                (AnnotationKind::Replace, ">", ""),
            ]
        );
    }

    #[test]
    fn test_hidden_image_becomes_widget() {
        let source = "![alt *x*](a.png)";
        let annotations = annotate(plugin(), source, &Selection::none());
        assert_eq!(annotations.len(), 1);
        assert!(annotations[0].is_widget_replacement());

        let view = annotations[0].widget.as_ref().unwrap().build(0..17);
        assert_eq!(view.as_html(), Some(r#"<img src="a.png" alt="alt x">"#));
        assert_eq!(view.on_activate, Some(HostEvent::Select(0..17)));
    }

    #[test]
    fn test_target_resolution() {
        let tree = parse("[a][Some  Ref] [b]\n\n[some ref]: /one 'One'\n[b]: </two>");
        let links: Vec<_> = tree.nodes_of(kind::LINK).filter_map(target).collect();
        assert_eq!(
            links,
            vec![
                Target {
                    href: "/one".to_owned(),
                    title: Some("One".to_owned()),
                },
                Target {
                    href: "/two".to_owned(),
                    title: None,
                },
            ]
        );
    }

    #[test]
    fn test_definition_inside_blockquote() {
        let plugins = vec![plugin(), crate::plugins::blockquote::plugin()];
        let html = render(plugins, &Services::default(), "> [a]\n>\n> [a]: /x");
        assert_eq!(html, "<blockquote><p><a href=\"/x\">a</a></p></blockquote>");
    }

    #[test]
    fn test_definition_text_in_code_is_ignored() {
        let tree = parse("```\n[a]: /wrong\n```\n\n[a]\n\n[a]: /right");
        let link = tree.nodes_of(kind::LINK).next().unwrap();
        assert_eq!(target(link).unwrap().href, "/right");
    }

    #[test]
    fn test_hand_built_tree_uses_url_child() {
        let tree = inkset_tree::Tree::from_spans(
            "[a](/u 'T')",
            vec![
                inkset_tree::Span::new(kind::LINK, 0..11),
                inkset_tree::Span::new(kind::URL, 4..6),
                inkset_tree::Span::new(kind::LINK_TITLE, 7..10),
            ],
        );
        let link = tree.root().child(kind::LINK).unwrap();
        assert_eq!(
            target(link),
            Some(Target {
                href: "/u".to_owned(),
                title: Some("T".to_owned()),
            })
        );
    }

    #[test]
    fn test_render() {
        let html = render(
            vec![plugin()],
            &Services::default(),
            "[a](http://x \"T\") <me@z.org> ![i](p.png)",
        );
        assert_eq!(
            html,
            "<p><a href=\"http://x\" title=\"T\">a</a> \
             <a href=\"mailto:me@z.org\">me@z.org</a> \
             <img src=\"p.png\" alt=\"i\"></p>"
        );
    }
}
