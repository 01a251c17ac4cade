//! Thematic breaks.

use inkset_tree::kind;

use super::{SYNTAX_CLASS, html_widget};
use crate::annotation::Annotation;
use crate::plugin::{Plugin, Rendered};

/// Horizontal rule plugin.
#[must_use]
pub fn plugin() -> Plugin {
    Plugin::new("rule", env!("CARGO_PKG_VERSION"))
        .with_priority(80)
        .with_node_types([kind::HORIZONTAL_RULE])
        .with_annotate(|ctx, out| {
            for node in ctx.nodes_of(kind::HORIZONTAL_RULE) {
                out.push(if ctx.reveals(node) {
                    Annotation::mark(node.range(), SYNTAX_CLASS)
                } else {
                    Annotation::replace(node.range(), html_widget("ink-rule", "<hr>".to_owned()))
                });
            }
            Ok(())
        })
        .with_render(|_, _, _| Rendered::Html("<hr>".to_owned()))
        .with_styles(|_| {
            "hr, .ink-rule hr { border: none; border-top: 1px solid var(--ink-border); }".to_owned()
        })
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
    fn test_reveal_symmetry() {
        let source = "a\n\n***\n\nb";
        let hidden = annotate(plugin(), source, &Selection::caret(0));
        assert!(hidden[0].is_widget_replacement());

        let shown = annotate(plugin(), source, &Selection::caret(6));
        assert_eq!(
            describe(&shown, source),
            vec![(AnnotationKind::Mark, "***", SYNTAX_CLASS)]
        );
    }

    #[test]
    fn test_render() {
        let html = render(vec![plugin()], &Services::default(), "a\n\n---\n\nb");
        assert_eq!(html, "<p>a</p>\n<hr>\n<p>b</p>");
    }
}
