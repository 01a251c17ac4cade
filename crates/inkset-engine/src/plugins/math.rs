//! TeX math, `$inline$` and `$$display$$`.
//!
//! Rendering is delegated to the configured [`MathEngine`]; without one, math
//! is shown as styled TeX source.
//!
//! [`MathEngine`]: crate::external::MathEngine

use std::rc::Rc;

use inkset_tree::{Node, SyntaxExtension, kind};

use super::syntax_markers;
use crate::annotation::{Annotation, HostEvent, Widget, WidgetView};
use crate::external::Services;
use crate::plugin::{Plugin, Rendered};
use crate::util::escape_html;

/// Math plugin.
#[must_use]
pub fn plugin(services: &Services) -> Plugin {
    let engine = services.math.clone();
    let widget_engine = engine.clone();
    Plugin::new("math", env!("CARGO_PKG_VERSION"))
        .with_priority(100)
        .with_node_types([kind::INLINE_MATH, kind::DISPLAY_MATH])
        .with_syntax(SyntaxExtension::Math)
        .with_annotate(move |ctx, out| {
            for node in ctx.nodes_of_any(&[kind::INLINE_MATH, kind::DISPLAY_MATH]) {
                let revealed = ctx.reveals(node);
                match &widget_engine {
                    Some(engine) if !revealed => {
                        let engine = Rc::clone(engine);
                        let tex = tex(node).to_owned();
                        let display = node.is(kind::DISPLAY_MATH);
                        let widget = Widget::new(move |range| {
                            WidgetView::deferred("ink-math", engine.render(&tex, display))
                                .with_activation(HostEvent::Select(range))
                        });
                        out.push(Annotation::replace(node.range(), widget));
                    }
                    _ => {
                        let class = if revealed { "ink-math-source" } else { "ink-math" };
                        out.push(Annotation::mark(node.range(), class));
                        let markers = node.children_of(kind::MATH_MARK).map(|m| m.range());
                        syntax_markers(revealed, markers, out);
                    }
                }
            }
            Ok(())
        })
        .with_render(move |node, _, _| {
            let display = node.is(kind::DISPLAY_MATH);
            if let Some(engine) = &engine {
                return Rendered::Deferred(engine.render(tex(node), display));
            }
            let tex = escape_html(tex(node));
            Rendered::Html(if display {
                format!(r#"<div class="ink-math ink-math-display">{tex}</div>"#)
            } else {
                format!(r#"<span class="ink-math">{tex}</span>"#)
            })
        })
        .with_styles(|_| {
            ".ink-math, .ink-math-source { font-family: KaTeX_Main, serif; }
.ink-math-display { display: block; text-align: center; margin: 1em 0; }"
                .to_owned()
        })
}

/// TeX source between the dollar delimiters.
fn tex(node: Node<'_>) -> &str {
    let start = node.child(kind::MATH_MARK).map_or(node.start(), |m| m.end());
    let end = node
        .last_child(kind::MATH_MARK)
        .filter(|m| m.start() >= start)
        .map_or(node.end(), |m| m.start());
    node.tree().slice(start..end).trim()
}
