//! Fenced and indented code blocks.
//!
//! The fence's info string is parsed with [`CodeInfo`]; both the
//! interactive header widget and the static output use the parsed form.
//! Blocks whose language the diagram engine renders are left to the diagram
//! plugin.

use std::fmt::Write;
use std::ops::Range;

use inkset_tree::{Node, kind};

use super::{SYNTAX_CLASS, html_widget};
use crate::annotation::{Annotation, HostEvent, Widget, WidgetView};
use crate::code_info::CodeInfo;
use crate::external::Services;
use crate::plugin::{Plugin, Rendered};
use crate::util::{escape_html, line_at, line_ranges};

/// Code block plugin.
#[must_use]
pub fn plugin(services: &Services) -> Plugin {
    let services = services.clone();
    Plugin::new("code", env!("CARGO_PKG_VERSION"))
        .with_priority(40)
        .with_node_types([kind::FENCED_CODE, kind::CODE_BLOCK])
        .with_annotate(move |ctx, out| {
            for node in ctx.nodes_of(kind::CODE_BLOCK) {
                for line in line_ranges(ctx.source(), node.range()) {
                    out.push(Annotation::line(line.start, "ink-code-line"));
                }
            }
            for node in ctx.nodes_of(kind::FENCED_CODE) {
                let info = info(node);
                if services.renders_diagram(&info.language) {
                    continue;
                }
                annotate_fenced(node, &info, ctx.reveals(node), out);
            }
            Ok(())
        })
        .with_render(|node, _, _| {
            let html = if node.is(kind::FENCED_CODE) {
                code_html(&info(node), &body(node))
            } else {
                format!("<pre><code>{}</code></pre>", escape_html(&body(node)))
            };
            Rendered::Html(html)
        })
        .with_styles(|_| {
            ".ink-code-line, pre { font-family: monospace; background: var(--ink-code-bg); }
.ink-code-highlight, .line.highlighted { background: rgba(255, 212, 59, 0.2); }
.ink-code-highlight-text, pre mark { background: rgba(255, 212, 59, 0.45); }
.ink-code-header { display: flex; gap: 0.5em; color: var(--ink-muted); }
.ink-code-title, .ink-code-block figcaption { font-size: 0.875em; color: var(--ink-muted); }"
                .to_owned()
        })
}

/// Parsed info string of a fenced block.
#[must_use]
pub fn info(node: Node<'_>) -> CodeInfo {
    CodeInfo::parse(node.child(kind::CODE_INFO).map_or("", |n| n.text()))
}

/// Block body without fences or container prefixes.
pub(crate) fn body(node: Node<'_>) -> String {
    let mut body: String = node.children_of(kind::CODE_TEXT).map(|line| line.text()).collect();
    if body.ends_with('\n') {
        body.pop();
    }
    body
}

/// Source range of each code line, without its line ending.
fn code_lines(node: Node<'_>) -> impl Iterator<Item = Range<usize>> + '_ {
    node.children_of(kind::CODE_TEXT).map(|line| {
        let text = line.text();
        let content = text.trim_end_matches('\n').trim_end_matches('\r');
        line.start()..line.start() + content.len()
    })
}

fn annotate_fenced(node: Node<'_>, info: &CodeInfo, revealed: bool, out: &mut Vec<Annotation>) {
    let source = node.tree().source();
    let lines = line_ranges(source, node.range());
    for line in &lines {
        out.push(Annotation::line(line_at(source, line.start).start, "ink-code-line"));
    }

    for (i, line) in code_lines(node).enumerate() {
        if info.highlights_line(i + 1) {
            out.push(Annotation::line(line_at(source, line.start).start, "ink-code-highlight"));
        }
        for range in info.text_highlights(&source[line.clone()]) {
            let from = line.start + range.start;
            out.push(Annotation::mark(from..line.start + range.end, "ink-code-highlight-text"));
        }
    }

    let closing = node
        .last_child(kind::CODE_MARK)
        .filter(|mark| lines.len() > 1 && mark.start() >= lines[lines.len() - 1].start);

    if revealed {
        for mark in node.children_of(kind::CODE_MARK) {
            out.push(Annotation::mark(mark.range(), SYNTAX_CLASS));
        }
        if let Some(info_node) = node.child(kind::CODE_INFO) {
            out.push(Annotation::mark(info_node.range(), "ink-code-info"));
        }
        return;
    }

    if let Some(opening) = lines.first() {
        out.push(Annotation::replace(opening.clone(), header_widget(info, body(node))));
    }
    if let Some(closing) = closing {
        out.push(Annotation::hide(closing.range()));
    }
}

fn header_widget(info: &CodeInfo, body: String) -> Widget {
    let mut html = String::from(r#"<div class="ink-code-header">"#);
    if !info.language.is_empty() {
        let _ = write!(html, r#"<span class="ink-code-language">{}</span>"#, escape_html(&info.language));
    }
    if let Some(title) = &info.title {
        let _ = write!(html, r#"<span class="ink-code-title">{}</span>"#, escape_html(title));
    }
    if info.copy {
        html.push_str(r#"<button class="ink-code-copy" type="button">Copy</button>"#);
    }
    html.push_str("</div>");

    if !info.copy {
        return html_widget("ink-code-header", html);
    }
    Widget::new(move |_| {
        WidgetView::html("ink-code-header", html.as_str()).with_activation(HostEvent::Copy(body.clone()))
    })
}

/// Static HTML for a fenced block.
fn code_html(info: &CodeInfo, body: &str) -> String {
    let class = if info.language.is_empty() {
        String::new()
    } else {
        format!(r#" class="language-{}""#, escape_html(&info.language))
    };
    let plain =
        info.line_numbers.is_none() && info.highlight_lines.is_empty() && info.highlight_text.is_empty();
    let code = if plain {
        escape_html(body)
    } else {
        lines_html(info, body)
    };
    let copy = if info.copy { " data-copy" } else { "" };
    let pre = format!("<pre{copy}><code{class}>{code}</code></pre>");

    if info.title.is_none() && info.caption.is_none() {
        return pre;
    }
    let mut out = String::from(r#"<figure class="ink-code-block">"#);
    if let Some(title) = &info.title {
        let _ = write!(out, r#"<div class="ink-code-title">{}</div>"#, escape_html(title));
    }
    out.push_str(&pre);
    if let Some(caption) = &info.caption {
        let _ = write!(out, "<figcaption>{}</figcaption>", escape_html(caption));
    }
    out.push_str("</figure>");
    out
}

fn lines_html(info: &CodeInfo, body: &str) -> String {
    let start = info.line_numbers.map(|n| n.start());
    body.split('\n')
        .enumerate()
        .map(|(i, line)| {
            let class = if info.highlights_line(i + 1) {
                "line highlighted"
            } else {
                "line"
            };
            let number = start
                .map(|n| format!(r#" data-line="{}""#, n + i))
                .unwrap_or_default();
            format!(
                r#"<span class="{class}"{number}>{}</span>"#,
                marked(line, &info.text_highlights(line))
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Escape `line`, wrapping highlighted ranges in `<mark>`.
fn marked(line: &str, ranges: &[Range<usize>]) -> String {
    let mut out = String::new();
    let mut pos = 0;
    for range in ranges {
        out.push_str(&escape_html(&line[pos..range.start]));
        let _ = write!(out, "<mark>{}</mark>", escape_html(&line[range.clone()]));
        pos = range.end;
    }
    out.push_str(&escape_html(&line[pos..]));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::AnnotationKind;
    use crate::plugins::test_support::{annotate, describe, render};
    use crate::selection::Selection;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_hidden_fences() {
        let source = "```rust copy\nfn a() {}\n```\n\nx";
        let annotations = annotate(plugin(&Services::default()), source, &Selection::caret(source.len()));
        assert_eq!(
            describe(&annotations, source),
            vec![
                (AnnotationKind::Line, "", "ink-code-line"),
                (AnnotationKind::Replace, "```rust copy", ""),
                (AnnotationKind::Line, "", "ink-code-line"),
                (AnnotationKind::Line, "", "ink-code-line"),
                (AnnotationKind::Replace, "```", ""),
            ]
        );

        let view = annotations[1].widget.as_ref().unwrap().build(0..12);
        assert_eq!(view.on_activate, Some(HostEvent::Copy("fn a() {}".to_owned())));
        assert!(view.as_html().unwrap().contains("ink-code-language\">rust<"));
    }

    #[test]
    fn test_revealed_fences_and_highlights() {
        let source = "```js {2} /a/\nx\nbab\n```";
        let annotations = annotate(plugin(&Services::default()), source, &Selection::caret(0));
        let described = describe(&annotations, source);
        assert!(described.contains(&(AnnotationKind::Mark, "```", SYNTAX_CLASS)));
        assert!(described.contains(&(AnnotationKind::Mark, "js {2} /a/", "ink-code-info")));
        assert!(described.contains(&(AnnotationKind::Mark, "a", "ink-code-highlight-text")));

        let highlight = annotations
            .iter()
            .find(|a| a.style == "ink-code-highlight")
            .unwrap();
        assert_eq!(highlight.from, 16);
        assert!(annotations.iter().all(|a| a.kind != AnnotationKind::Replace));
    }

    #[test]
    fn test_render_plain() {
        let html = render(vec![plugin(&Services::default())], &Services::default(), "```rust\nfn main() {}\n```");
        assert_eq!(html, r#"<pre><code class="language-rust">fn main() {}</code></pre>"#);
    }

    #[test]
    fn test_render_with_info() {
        let html = render(
            vec![plugin(&Services::default())],
            &Services::default(),
            "```tsx title=\"t.tsx\" line-numbers{5} {1} /1/\nlet a = 1;\n<b>\n```",
        );
        assert_eq!(
            html,
            "<figure class=\"ink-code-block\"><div class=\"ink-code-title\">t.tsx</div>\
             <pre><code class=\"language-tsx\">\
             <span class=\"line highlighted\" data-line=\"5\">let a = <mark>1</mark>;</span>\n\
             <span class=\"line\" data-line=\"6\">&lt;b&gt;</span>\
             </code></pre></figure>"
        );
    }

    #[test]
    fn test_render_indented() {
        let html = render(vec![plugin(&Services::default())], &Services::default(), "    code\n      more");
        assert_eq!(html, "<pre><code>code\n  more</code></pre>");
    }

    #[test]
    fn test_fence_inside_blockquote() {
        let plugins = vec![plugin(&Services::default()), crate::plugins::blockquote::plugin()];
        let html = render(plugins, &Services::default(), "> ```\n> code\n> ```");
        assert_eq!(html, "<blockquote><pre><code>code</code></pre></blockquote>");
    }

    #[test]
    fn test_copy_body_skips_container_prefixes() {
        let source = "> ```sh copy\n> a\n>\n> b\n> ```\n\nx";
        let annotations = annotate(plugin(&Services::default()), source, &Selection::caret(source.len()));
        let header = annotations.iter().find(|a| a.is_widget_replacement()).unwrap();
        let view = header.widget.as_ref().unwrap().build(header.range());
        assert_eq!(view.on_activate, Some(HostEvent::Copy("a\n\nb".to_owned())));

        let closing = annotations
            .iter()
            .filter(|a| a.kind == AnnotationKind::Replace && !a.is_widget_replacement())
            .map(|a| &source[a.range()])
            .collect::<Vec<_>>();
        assert_eq!(closing, vec!["```"]);
    }

    #[test]
    fn test_highlight_lines_inside_list_item() {
        let source = "- ```js {2}\n  a\n  b\n  ```";
        let annotations = annotate(plugin(&Services::default()), source, &Selection::caret(0));
        let highlight = annotations
            .iter()
            .find(|a| a.style == "ink-code-highlight")
            .unwrap();
        assert_eq!(highlight.from, 16);
    }

    #[test]
    fn test_empty_block() {
        let html = render(vec![plugin(&Services::default())], &Services::default(), "```\n```");
        assert_eq!(html, "<pre><code></code></pre>");
    }
}
