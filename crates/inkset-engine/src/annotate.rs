//! Annotation builder.
//!
//! Runs every plugin's contributor once per pass, in registry order, each
//! into its own buffer. A contributor that fails or panics loses its buffer
//! for this pass only. Surviving buffers are merged, stable-sorted by
//! `(from, kind rank, z-order)`, and `Replace` annotations overlapping an
//! earlier kept `Replace` are dropped.

use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::annotation::{Annotation, AnnotationKind};
use crate::context::AnnotateContext;
use crate::registry::Registry;

/// Build the sorted annotation list for one pass.
#[must_use]
pub fn build_annotations(registry: &Registry, ctx: &AnnotateContext<'_>) -> Vec<Annotation> {
    let mut merged = Vec::new();

    for plugin in registry.iter() {
        let Some(annotate) = &plugin.annotate else {
            continue;
        };

        let mut buffer = Vec::new();
        match catch_unwind(AssertUnwindSafe(|| annotate(ctx, &mut buffer))) {
            Ok(Ok(())) => merged.append(&mut buffer),
            Ok(Err(e)) => {
                tracing::warn!(plugin = %plugin.name, error = %e, "Annotation contributor failed");
            }
            Err(panic) => {
                tracing::warn!(
                    plugin = %plugin.name,
                    panic = panic_message(&*panic),
                    "Annotation contributor panicked"
                );
            }
        }
    }

    merged.sort_by_key(Annotation::sort_key);
    let annotations = drop_overlapping_replacements(merged);
    tracing::debug!(count = annotations.len(), "Built annotations");
    annotations
}

fn drop_overlapping_replacements(sorted: Vec<Annotation>) -> Vec<Annotation> {
    let mut kept = Vec::with_capacity(sorted.len());
    let mut replaced_until: Option<usize> = None;

    for annotation in sorted {
        if annotation.kind == AnnotationKind::Replace {
            if replaced_until.is_some_and(|end| annotation.from < end) {
                tracing::trace!(
                    from = annotation.from,
                    to = annotation.to,
                    "Dropped overlapping replacement"
                );
                continue;
            }
            replaced_until = Some(replaced_until.map_or(annotation.to, |end| end.max(annotation.to)));
        }
        kept.push(annotation);
    }
    kept
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::AnnotationSummary;
    use crate::error::PluginError;
    use crate::external::Services;
    use crate::plugin::Plugin;
    use crate::render::{Fragments, RenderOptions};
    use crate::selection::{Selection, Viewport};
    use inkset_config::Theme;
    use inkset_tree::MarkdownParser;
    use pretty_assertions::assert_eq;

    fn build(plugins: Vec<Plugin>) -> Vec<AnnotationSummary> {
        let tree = MarkdownParser::new().parse("some text");
        let selection = Selection::none();
        let viewport = Viewport::all();
        let registry = Registry::new(plugins);
        let (services, options) = (Services::default(), RenderOptions::default());
        let ctx = AnnotateContext {
            tree: &tree,
            selection: &selection,
            viewport: &viewport,
            theme: Theme::Light,
            fragments: Fragments::new(&registry, &services, &options, Theme::Light),
        };
        build_annotations(&registry, &ctx)
            .iter()
            .map(AnnotationSummary::from)
            .collect()
    }

    fn emitting(name: &str, annotations: fn() -> Vec<Annotation>) -> Plugin {
        Plugin::new(name, "1").with_annotate(move |_, out| {
            out.extend(annotations());
            Ok(())
        })
    }

    #[test]
    fn test_sorted_by_position_kind_and_z_order() {
        let annotations = build(vec![emitting("a", || {
            vec![
                Annotation::mark(0..4, "m"),
                Annotation::hide(0..2),
                Annotation::line(0, "l"),
                Annotation::mark(0..4, "z1").with_z_order(1),
                Annotation::mark(0..4, "z-1").with_z_order(-1),
            ]
        })]);
        let styles: Vec<_> = annotations.iter().map(|a| a.style.as_str()).collect();
        assert_eq!(styles, vec!["l", "", "z-1", "m", "z1"]);
    }

    #[test]
    fn test_overlapping_replace_dropped() {
        let annotations = build(vec![
            emitting("first", || vec![Annotation::hide(0..5)]),
            emitting("second", || {
                vec![
                    Annotation::hide(3..8),
                    Annotation::hide(5..6),
                    Annotation::mark(3..8, "kept"),
                ]
            }),
        ]);
        let ranges: Vec<_> = annotations.iter().map(|a| (a.from, a.to)).collect();
        assert_eq!(ranges, vec![(0, 5), (3, 8), (5, 6)]);
        assert_eq!(annotations[1].kind, AnnotationKind::Mark);
    }

    #[test]
    fn test_failing_plugin_discarded() {
        let annotations = build(vec![
            Plugin::new("broken", "1").with_annotate(|_, out| {
                out.push(Annotation::mark(0..1, "partial"));
                Err(PluginError::Other("boom".to_owned()))
            }),
            emitting("ok", || vec![Annotation::mark(0..4, "ok")]),
        ]);
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].style, "ok");
    }

    #[test]
    fn test_panicking_plugin_discarded() {
        let annotations = build(vec![
            Plugin::new("panics", "1").with_annotate(|_, _| panic!("bad tree")),
            emitting("ok", || vec![Annotation::line(0, "ok")]),
        ]);
        assert_eq!(annotations.len(), 1);
    }

    #[test]
    fn test_plugin_order_breaks_ties() {
        let annotations = build(vec![
            emitting("b", || vec![Annotation::mark(0..1, "b")]).with_priority(2),
            emitting("a", || vec![Annotation::mark(0..1, "a")]).with_priority(1),
        ]);
        let styles: Vec<_> = annotations.iter().map(|a| a.style.as_str()).collect();
        assert_eq!(styles, vec!["a", "b"]);
    }
}
