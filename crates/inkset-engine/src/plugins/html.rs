//! Raw HTML blocks and inline tags.
//!
//! Inline tags are paired per line of their parent block. A paired element is
//! rendered as one unit, its opening tag, rendered content and closing tag
//! passing through the sanitizer together. Hidden elements show that same
//! rendering. Tags without a partner are orphans and always stay visible as
//! styled source.

use std::collections::HashSet;

use inkset_tree::{Node, NodeId, kind};

use crate::annotation::{Annotation, Widget};
use crate::context::AnnotateContext;
use crate::plugin::{Plugin, Rendered};
use crate::render::{Fragment, RenderContext};
use crate::tags::{TagElement, TagPairing, TagToken, outermost, pair_tags, scan_tags};
use crate::util::{escape_html, line_at, line_ranges};

/// HTML plugin.
#[must_use]
pub fn plugin() -> Plugin {
    Plugin::new("html", env!("CARGO_PKG_VERSION"))
        .with_priority(90)
        .with_node_types([kind::HTML_BLOCK, kind::HTML_TAG])
        .with_annotate(|ctx, out| {
            for node in ctx.nodes_of(kind::HTML_BLOCK) {
                if ctx.reveals(node) {
                    for line in line_ranges(ctx.source(), node.range()) {
                        out.push(Annotation::line(line.start, "ink-html-source"));
                    }
                } else {
                    let widget = fragment_widget("ink-html-block", ctx.fragments.node(node));
                    out.push(Annotation::replace(node.range(), widget));
                }
            }
            annotate_inline(ctx, out);
            Ok(())
        })
        .with_render(|node, _, ctx| {
            if node.is(kind::HTML_BLOCK) {
                return Rendered::Html(ctx.sanitize(node.text()));
            }
            Rendered::Html(inline_html(node, ctx))
        })
        .with_styles(|_| {
            ".ink-html-source, .ink-html-tag { font-family: monospace; color: var(--ink-muted); }
.ink-html-orphan { font-family: monospace; color: var(--ink-error); text-decoration: wavy underline; }"
                .to_owned()
        })
}

fn fragment_widget(class: &'static str, fragment: Fragment) -> Widget {
    Widget::new(move |_| fragment.view(class))
}

fn annotate_inline(ctx: &AnnotateContext<'_>, out: &mut Vec<Annotation>) {
    let mut seen: HashSet<(NodeId, usize)> = HashSet::new();
    for tag in ctx.nodes_of(kind::HTML_TAG) {
        let Some(parent) = tag.parent() else {
            continue;
        };
        let line = line_at(ctx.source(), tag.start());
        if !seen.insert((parent.id(), line.start)) {
            continue;
        }

        let tokens = line_tokens(parent, line.start, line.end);
        let pairing = pair_tags(&tokens);
        for element in outermost(&pairing.elements) {
            let range = element.range();
            if ctx.reveals_range(&range) {
                let inside = tokens.iter().filter(|t| range.start <= t.from && t.to <= range.end);
                for token in inside.filter(|t| !pairing.orphans.contains(t)) {
                    out.push(Annotation::mark(token.range(), "ink-html-tag"));
                }
            } else {
                let widget = fragment_widget("ink-html-inline", ctx.fragments.span(parent, range.clone()));
                out.push(Annotation::replace(range, widget));
            }
        }
        for orphan in &pairing.orphans {
            out.push(Annotation::mark(orphan.range(), "ink-html-orphan"));
        }
    }
}

/// Static HTML of one inline tag node.
///
/// The opening tag of an outermost element renders the whole element and
/// claims the source up to its closing tag. Tags nested in an element are
/// emitted raw, since the enclosing element is sanitized as a whole.
fn inline_html(tag: Node<'_>, ctx: &RenderContext<'_>) -> String {
    let Some((parent, pairing)) = line_pairing(tag) else {
        return ctx.sanitize(tag.text());
    };
    if pairing.orphans.iter().any(|orphan| orphan.from == tag.start()) {
        return orphan_html(tag.text());
    }

    let elements = outermost(&pairing.elements);
    let Some(element) = elements.iter().find(|e| e.range().contains(&tag.start())) else {
        return ctx.sanitize(tag.text());
    };
    if element.open.start != tag.start() {
        return tag.text().to_owned();
    }
    let html = ctx.sanitize(&element_html(element, parent, ctx));
    // After rendering the content, whose own spans reset pending claims.
    ctx.claim(element.range().end);
    html
}

fn element_html(element: &TagElement, parent: Node<'_>, ctx: &RenderContext<'_>) -> String {
    let open = ctx.slice(element.open.clone());
    match &element.close {
        Some(close) => format!(
            "{open}{}{}",
            ctx.render_span(parent, element.inner()),
            ctx.slice(close.clone())
        ),
        None => open.to_owned(),
    }
}

/// Tag tokens of the inline tags of `parent` on the line `start..end`.
fn line_tokens(parent: Node<'_>, start: usize, end: usize) -> Vec<TagToken> {
    parent
        .children_of(kind::HTML_TAG)
        .filter(|tag| start <= tag.start() && tag.start() <= end)
        .flat_map(|tag| scan_tags(tag.text(), tag.start()))
        .collect()
}

fn line_pairing(tag: Node<'_>) -> Option<(Node<'_>, TagPairing)> {
    let parent = tag.parent()?;
    let line = line_at(tag.tree().source(), tag.start());
    let pairing = pair_tags(&line_tokens(parent, line.start, line.end));
    Some((parent, pairing))
}

/// Whether an inline tag has no partner on its line.
#[must_use]
pub fn is_orphan(tag: Node<'_>) -> bool {
    line_pairing(tag).is_some_and(|(_, pairing)| {
        pairing.orphans.iter().any(|orphan| orphan.from == tag.start())
    })
}

fn orphan_html(source: &str) -> String {
    format!(r#"<code class="ink-html-orphan">{}</code>"#, escape_html(source))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::annotation::AnnotationKind;
    use crate::external::{Sanitizer, Services};
    use crate::plugins::inline;
    use crate::plugins::test_support::{annotate, annotate_with, describe, parse, render, render_with};
    use crate::render::RenderOptions;
    use crate::selection::Selection;
    use pretty_assertions::assert_eq;

    /// Wraps its input in `[..]` and records every call.
    #[derive(Default)]
    struct RecordingSanitizer {
        calls: RefCell<Vec<String>>,
    }

    impl Sanitizer for RecordingSanitizer {
        fn sanitize(&self, html: &str) -> String {
            self.calls.borrow_mut().push(html.to_owned());
            format!("[{html}]")
        }
    }

    fn sanitizing() -> RenderOptions {
        RenderOptions {
            sanitize: true,
            ..RenderOptions::default()
        }
    }

    #[test]
    fn test_nested_pair_replaced_as_one() {
        let source = "a <b>x<i>y</i>z</b> c";
        let annotations = annotate(plugin(), source, &Selection::none());
        assert_eq!(
            describe(&annotations, source),
            vec![(AnnotationKind::Replace, "<b>x<i>y</i>z</b>", "")]
        );
        let view = annotations[0].widget.as_ref().unwrap().build(2..19);
        assert_eq!(view.as_html(), Some("<b>x<i>y</i>z</b>"));
    }

    #[test]
    fn test_widget_renders_nested_markdown() {
        let source = "a <b>*x*</b>";
        let plugins = || vec![plugin(), inline::plugin()];
        let html = render(plugins(), &Services::default(), source);
        assert_eq!(html, "<p>a <b><em>x</em></b></p>");

        let options = RenderOptions::default();
        let annotations = annotate_with(plugins(), &Services::default(), &options, source, &Selection::none());
        let element = annotations.iter().find(|a| a.is_widget_replacement()).unwrap();
        assert_eq!(&source[element.range()], "<b>*x*</b>");
        let view = element.widget.as_ref().unwrap().build(element.range());
        assert_eq!(view.as_html(), Some("<b><em>x</em></b>"));
    }

    #[test]
    fn test_element_sanitized_as_a_whole() {
        let sanitizer = Rc::new(RecordingSanitizer::default());
        let services = Services {
            sanitizer: Rc::clone(&sanitizer) as Rc<dyn Sanitizer>,
            ..Services::default()
        };
        let source = "a <b>*x*<i>y</i></b> <br>";
        let plugins = || vec![plugin(), inline::plugin()];

        let html = render_with(plugins(), &services, &sanitizing(), source);
        assert_eq!(html, "<p>a [<b><em>x</em><i>y</i></b>] [<br>]</p>");
        assert_eq!(
            sanitizer.calls.take(),
            vec!["<b><em>x</em><i>y</i></b>".to_owned(), "<br>".to_owned()]
        );

        let annotations = annotate_with(plugins(), &services, &sanitizing(), source, &Selection::none());
        let element = annotations
            .iter()
            .find(|a| a.is_widget_replacement() && a.from == 2)
            .unwrap();
        let view = element.widget.as_ref().unwrap().build(element.range());
        assert_eq!(view.as_html(), Some("[<b><em>x</em><i>y</i></b>]"));
    }

    #[test]
    fn test_revealed_pair_marks_tags() {
        let source = "a <b>x</b> c";
        let annotations = annotate(plugin(), source, &Selection::caret(6));
        assert_eq!(
            describe(&annotations, source),
            vec![
                (AnnotationKind::Mark, "<b>", "ink-html-tag"),
                (AnnotationKind::Mark, "</b>", "ink-html-tag"),
            ]
        );
    }

    #[test]
    fn test_orphan_stays_visible() {
        let source = "x <b>unterminated";
        let annotations = annotate(plugin(), source, &Selection::none());
        assert_eq!(
            describe(&annotations, source),
            vec![(AnnotationKind::Mark, "<b>", "ink-html-orphan")]
        );

        let html = render(vec![plugin()], &Services::default(), source);
        assert_eq!(
            html,
            r#"<p>x <code class="ink-html-orphan">&lt;b&gt;</code>unterminated</p>"#
        );
    }

    #[test]
    fn test_pairing_is_per_line() {
        let tree = parse("<b>a\n</b>");
        let tags: Vec<_> = tree.nodes_of(kind::HTML_TAG).collect();
        assert_eq!(tags.len(), 2);
        assert!(tags.iter().all(|tag| is_orphan(*tag)));
    }

    #[test]
    fn test_void_element_is_complete() {
        let source = "a<br>b";
        let html = render(vec![plugin()], &Services::default(), source);
        assert_eq!(html, "<p>a<br>b</p>");
    }

    #[test]
    fn test_html_block() {
        let source = "<div>\nhi\n</div>\n\nx";
        let hidden = annotate(plugin(), source, &Selection::caret(source.len()));
        assert_eq!(
            describe(&hidden, source),
            vec![(AnnotationKind::Replace, "<div>\nhi\n</div>", "")]
        );

        let shown = annotate(plugin(), source, &Selection::caret(1));
        assert_eq!(shown.len(), 3);
        assert!(shown.iter().all(|a| a.style == "ink-html-source"));

        let html = render(vec![plugin()], &Services::default(), source);
        assert_eq!(html, "<div>\nhi\n</div>\n<p>x</p>");
    }

    #[test]
    fn test_sanitized_widgets() {
        let source = "a <b>x</b>";
        let annotations = annotate_with(
            vec![plugin()],
            &Services::default(),
            &sanitizing(),
            source,
            &Selection::none(),
        );
        let view = annotations[0].widget.as_ref().unwrap().build(annotations[0].range());
        assert_eq!(view.as_html(), Some("&lt;b&gt;x&lt;/b&gt;"));
    }
}
