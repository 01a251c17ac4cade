//! Diagram code blocks (e.g. ```` ```mermaid ````), rendered by the
//! configured [`DiagramEngine`].
//!
//! Runs before the code plugin and declines blocks whose language the engine
//! does not support, so they fall through to ordinary code rendering.
//!
//! [`DiagramEngine`]: crate::external::DiagramEngine

use std::rc::Rc;

use inkset_tree::kind;

use super::SYNTAX_CLASS;
use super::code::{body, info};
use crate::annotation::{Annotation, HostEvent, Widget, WidgetView};
use crate::external::Services;
use crate::plugin::{Plugin, Rendered};
use crate::util::line_ranges;

/// Diagram plugin.
#[must_use]
pub fn plugin(services: &Services) -> Plugin {
    let engine = services.diagrams.clone();
    let widget_engine = engine.clone();
    Plugin::new("diagram", env!("CARGO_PKG_VERSION"))
        .with_priority(35)
        .with_node_types([kind::FENCED_CODE])
        .with_annotate(move |ctx, out| {
            let Some(engine) = &widget_engine else {
                return Ok(());
            };
            for node in ctx.nodes_of(kind::FENCED_CODE) {
                let language = info(node).language;
                if language.is_empty() || !engine.supports(&language) {
                    continue;
                }
                if ctx.reveals(node) {
                    for line in line_ranges(ctx.source(), node.range()) {
                        out.push(Annotation::line(line.start, "ink-code-line"));
                    }
                    for mark in node.children_of(kind::CODE_MARK) {
                        out.push(Annotation::mark(mark.range(), SYNTAX_CLASS));
                    }
                    continue;
                }
                let engine = Rc::clone(engine);
                let source = body(node);
                let widget = Widget::new(move |range| {
                    WidgetView::deferred("ink-diagram", engine.render(&language, &source))
                        .with_activation(HostEvent::Select(range))
                });
                out.push(Annotation::replace(node.range(), widget));
            }
            Ok(())
        })
        .with_render(move |node, _, _| {
            let Some(engine) = &engine else {
                return Rendered::Unhandled;
            };
            let language = info(node).language;
            if language.is_empty() || !engine.supports(&language) {
                return Rendered::Unhandled;
            }
            Rendered::Deferred(engine.render(&language, &body(node)))
        })
        .with_styles(|_| ".ink-diagram { display: flex; justify-content: center; }".to_owned())
}
