//! Built-in plugins.
//!
//! Each built-in is an ordinary [`Plugin`]: it annotates its node types for
//! the interactive surface and renders them statically, using the same data
//! extraction for both.
//!
//! Interactive contributors follow one reveal rule: when the selection
//! touches a node its syntax markers stay visible with light styling,
//! otherwise they are hidden or replaced by a widget.

use std::ops::Range;

use crate::annotation::{Annotation, Widget, WidgetView};
use crate::external::Services;
use crate::plugin::Plugin;

pub mod blockquote;
pub mod code;
pub mod diagram;
pub mod heading;
pub mod html;
pub mod inline;
pub mod link;
pub mod list;
pub mod math;
pub mod rule;
pub mod table;

/// Class for revealed syntax markers.
pub const SYNTAX_CLASS: &str = "ink-syntax";

/// All built-in plugins, in registration order.
#[must_use]
pub fn builtins(services: &Services) -> Vec<Plugin> {
    vec![
        heading::plugin(),
        inline::plugin(),
        link::plugin(),
        diagram::plugin(services),
        code::plugin(services),
        blockquote::plugin(),
        list::plugin(),
        table::plugin(),
        rule::plugin(),
        html::plugin(),
        math::plugin(services),
    ]
}

/// Style revealed markers, hide the rest.
pub(crate) fn syntax_markers(
    revealed: bool,
    markers: impl IntoIterator<Item = Range<usize>>,
    out: &mut Vec<Annotation>,
) {
    for range in markers.into_iter().filter(|r| !r.is_empty()) {
        out.push(if revealed {
            Annotation::mark(range, SYNTAX_CLASS)
        } else {
            Annotation::hide(range)
        });
    }
}

/// Widget showing fixed HTML.
pub(crate) fn html_widget(class: &str, html: String) -> Widget {
    let class = class.to_owned();
    Widget::new(move |_| WidgetView::html(class.as_str(), html.as_str()))
}

#[cfg(test)]
pub(crate) mod test_support {
    use inkset_config::Theme;
    use inkset_tree::{MarkdownParser, SyntaxExtension, Tree};

    use crate::annotate::build_annotations;
    use crate::annotation::{Annotation, AnnotationKind};
    use crate::context::AnnotateContext;
    use crate::external::Services;
    use crate::generation::Generation;
    use crate::plugin::Plugin;
    use crate::registry::Registry;
    use crate::render::{Fragments, RenderOptions, render_tree};
    use crate::selection::{Selection, Viewport};

    pub(crate) fn parse(source: &str) -> Tree {
        let mut parser = MarkdownParser::new();
        for extension in SyntaxExtension::ALL {
            parser.enable(extension);
        }
        parser.parse(source)
    }

    pub(crate) fn annotate(plugin: Plugin, source: &str, selection: &Selection) -> Vec<Annotation> {
        let options = RenderOptions::default();
        annotate_with(vec![plugin], &Services::default(), &options, source, selection)
    }

    /// Annotate with several plugins; widgets render through all of them.
    pub(crate) fn annotate_with(
        plugins: Vec<Plugin>,
        services: &Services,
        options: &RenderOptions,
        source: &str,
        selection: &Selection,
    ) -> Vec<Annotation> {
        let tree = parse(source);
        let viewport = Viewport::all();
        let registry = Registry::new(plugins);
        let ctx = AnnotateContext {
            tree: &tree,
            selection,
            viewport: &viewport,
            theme: Theme::Light,
            fragments: Fragments::new(&registry, services, options, Theme::Light),
        };
        build_annotations(&registry, &ctx)
    }

    pub(crate) fn render(plugins: Vec<Plugin>, services: &Services, source: &str) -> String {
        render_with(plugins, services, &RenderOptions::default(), source)
    }

    pub(crate) fn render_with(
        plugins: Vec<Plugin>,
        services: &Services,
        options: &RenderOptions,
        source: &str,
    ) -> String {
        let tree = parse(source);
        let registry = Registry::new(plugins);
        let doc = render_tree(&tree, &registry, services, options, Theme::Light, Generation::new().next());
        futures::executor::block_on(doc.resolve()).unwrap()
    }

    /// `(kind, source text, style)` for each annotation.
    pub(crate) fn describe<'a>(
        annotations: &'a [Annotation],
        source: &'a str,
    ) -> Vec<(AnnotationKind, &'a str, &'a str)> {
        annotations
            .iter()
            .map(|a| (a.kind, &source[a.range()], a.style.as_str()))
            .collect()
    }
}
