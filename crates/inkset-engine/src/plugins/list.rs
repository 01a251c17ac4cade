//! Bullet, ordered and task lists.
//!
//! A list item's markers are revealed while the selection touches the item,
//! nested items included.

use inkset_tree::{Node, SyntaxExtension, kind};

use super::{SYNTAX_CLASS, html_widget};
use crate::annotation::{Annotation, HostEvent, Widget, WidgetView};
use crate::context::AnnotateContext;
use crate::plugin::{Plugin, Rendered};

const BULLETS: [&str; 3] = ["•", "◦", "▪"];

/// List plugin.
#[must_use]
pub fn plugin() -> Plugin {
    Plugin::new("list", env!("CARGO_PKG_VERSION"))
        .with_priority(60)
        .with_node_types([kind::LIST_ITEM, kind::TASK_MARKER])
        .with_syntax(SyntaxExtension::TaskList)
        .with_annotate(|ctx, out| {
            for item in ctx.nodes_of(kind::LIST_ITEM) {
                annotate_item(ctx, item, out);
            }
            Ok(())
        })
        .with_render(|node, children, _| {
            if node.is(kind::TASK_MARKER) {
                return Rendered::Html(checkbox_html(is_checked(node)));
            }
            if task_marker(node).is_none() {
                return Rendered::Unhandled;
            }
            Rendered::Html(format!(
                r#"<li class="task-list-item">{}</li>"#,
                children.html().trim()
            ))
        })
        .with_styles(|_| {
            ".ink-list-bullet { color: var(--ink-muted); }
.ink-list-number { color: var(--ink-muted); font-variant-numeric: tabular-nums; }
.ink-task-checked { text-decoration: line-through; color: var(--ink-muted); }
.task-list-item { list-style: none; }"
                .to_owned()
        })
}

fn annotate_item(ctx: &AnnotateContext<'_>, item: Node<'_>, out: &mut Vec<Annotation>) {
    let Some(mark) = item.child(kind::LIST_MARK) else {
        return;
    };
    let revealed = ctx.reveals(item);
    let task = task_marker(item);
    let ordered = item.parent().is_some_and(|list| list.is(kind::ORDERED_LIST));

    if revealed {
        let class = if ordered { "ink-list-number" } else { SYNTAX_CLASS };
        out.push(Annotation::mark(mark.range(), class));
    } else if let Some(task) = task {
        out.push(Annotation::hide(mark.start()..task.start()));
    } else if ordered {
        out.push(Annotation::mark(mark.range(), "ink-list-number"));
    } else {
        let bullet = BULLETS[depth(item) % BULLETS.len()];
        out.push(Annotation::replace(
            mark.range(),
            html_widget("ink-list-bullet", bullet.to_owned()),
        ));
    }

    let Some(task) = task else {
        return;
    };
    let checked = is_checked(task);
    if revealed {
        out.push(Annotation::mark(task.range(), SYNTAX_CLASS));
    } else {
        out.push(Annotation::replace(task.range(), checkbox_widget(task)));
    }
    if checked {
        let source = ctx.source();
        let mut start = task.end();
        while source.as_bytes().get(start) == Some(&b' ') {
            start += 1;
        }
        let end = first_line.end;
        if start < end {
            out.push(Annotation::mark(start..end, "ink-task-checked"));
        }
    }
}

/// Checkbox that toggles the marker text when activated.
fn checkbox_widget(task: Node<'_>) -> Widget {
    let checked = is_checked(task);
    let range = task.range();
    let insert = if checked { "[ ]" } else { "[x]" };
    Widget::new(move |_| {
        WidgetView::html("ink-task", checkbox_html(checked)).with_activation(HostEvent::ReplaceText {
            range: range.clone(),
            insert: insert.to_owned(),
        })
    })
}

fn checkbox_html(checked: bool) -> String {
    let checked = if checked { " checked" } else { "" };
    format!(r#"<input type="checkbox" disabled{checked}>"#)
}

/// Task marker of a list item, directly inside it or inside its first paragraph.
fn task_marker(item: Node<'_>) -> Option<Node<'_>> {
    item.child(kind::TASK_MARKER).or_else(|| {
        item.child(kind::PARAGRAPH)
            .and_then(|paragraph| paragraph.child(kind::TASK_MARKER))
    })
}

fn is_checked(task: Node<'_>) -> bool {
    task.text().contains(['x', 'X'])
}

/// Nesting depth of an item, 0 for top-level items.
fn depth(item: Node<'_>) -> usize {
    item.ancestors()
        .filter(|n| n.is(kind::BULLET_LIST) || n.is(kind::ORDERED_LIST))
        .count()
        .saturating_sub(1)
}
