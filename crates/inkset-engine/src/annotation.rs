//! Positional annotations and widgets handed to the host surface.

use std::fmt;
use std::ops::Range;
use std::rc::Rc;

use futures::future::LocalBoxFuture;

use crate::error::RenderError;

/// How an annotation affects the source text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnnotationKind {
    /// Class on the whole line starting at `from`.
    Line,
    /// Widget inserted at `from` without consuming text.
    Widget,
    /// Hides `from..to`, optionally showing a widget in its place.
    Replace,
    /// Styles `from..to`.
    Mark,
}

impl AnnotationKind {
    /// Tie-break rank among annotations sharing a `from`.
    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            Self::Line => 0,
            Self::Widget => 1,
            Self::Replace => 2,
            Self::Mark => 3,
        }
    }
}

/// Edit or navigation request emitted when a widget is activated.
///
/// Widgets never hold a handle into the host; the host applies the event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostEvent {
    /// Replace `range` of the source with `insert`.
    ReplaceText {
        /// Source range to replace.
        range: Range<usize>,
        /// Replacement text.
        insert: String,
    },
    /// Put text on the clipboard.
    Copy(String),
    /// Move the selection to `range`, revealing its source.
    Select(Range<usize>),
}

/// Widget content, either ready or produced by an external engine.
pub enum WidgetContent {
    /// Ready HTML.
    Html(String),
    /// HTML produced asynchronously; the host shows a placeholder until ready.
    Deferred(LocalBoxFuture<'static, Result<String, RenderError>>),
}

impl fmt::Debug for WidgetContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Html(html) => f.debug_tuple("Html").field(html).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// What a widget factory builds for the host.
#[derive(Debug)]
pub struct WidgetView {
    /// Widget markup.
    pub content: WidgetContent,
    /// CSS class for the widget container.
    pub class: String,
    /// Event emitted when the user activates the widget.
    pub on_activate: Option<HostEvent>,
}

impl WidgetView {
    /// View with ready HTML.
    pub fn html(class: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            content: WidgetContent::Html(html.into()),
            class: class.into(),
            on_activate: None,
        }
    }

    /// View whose HTML arrives later.
    pub fn deferred(
        class: impl Into<String>,
        future: LocalBoxFuture<'static, Result<String, RenderError>>,
    ) -> Self {
        Self {
            content: WidgetContent::Deferred(future),
            class: class.into(),
            on_activate: None,
        }
    }

    /// Set the activation event.
    #[must_use]
    pub fn with_activation(mut self, event: HostEvent) -> Self {
        self.on_activate = Some(event);
        self
    }

    /// Ready HTML, if any.
    #[must_use]
    pub fn as_html(&self) -> Option<&str> {
        match &self.content {
            WidgetContent::Html(html) => Some(html),
            WidgetContent::Deferred(_) => None,
        }
    }
}

/// Widget factory. Called by the host with the annotation's range whenever it
/// needs to (re)build the widget.
#[derive(Clone)]
pub struct Widget(Rc<dyn Fn(Range<usize>) -> WidgetView>);

impl Widget {
    /// Wrap a factory function.
    pub fn new(factory: impl Fn(Range<usize>) -> WidgetView + 'static) -> Self {
        Self(Rc::new(factory))
    }

    /// Build the view for `range`.
    #[must_use]
    pub fn build(&self, range: Range<usize>) -> WidgetView {
        (self.0)(range)
    }
}

impl fmt::Debug for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Widget(..)")
    }
}

/// Instruction to visually augment or replace a span of source text.
#[derive(Clone, Debug)]
pub struct Annotation {
    /// Range start (byte offset).
    pub from: usize,
    /// Range end (exclusive). Equal to `from` for `Line` and `Widget`.
    pub to: usize,
    /// Annotation kind.
    pub kind: AnnotationKind,
    /// CSS class(es) applied by the host.
    pub style: String,
    /// Widget for `Widget` and (optionally) `Replace` annotations.
    pub widget: Option<Widget>,
    /// Tie-break among annotations of the same kind at the same position.
    pub z_order: i32,
}

impl Annotation {
    fn new(range: Range<usize>, kind: AnnotationKind, style: impl Into<String>) -> Self {
        Self {
            from: range.start,
            to: range.end,
            kind,
            style: style.into(),
            widget: None,
            z_order: 0,
        }
    }

    /// Style a range.
    pub fn mark(range: Range<usize>, style: impl Into<String>) -> Self {
        Self::new(range, AnnotationKind::Mark, style)
    }

    /// Class on the line starting at `line_start`.
    pub fn line(line_start: usize, style: impl Into<String>) -> Self {
        Self::new(line_start..line_start, AnnotationKind::Line, style)
    }

    /// Hide a range.
    #[must_use]
    pub fn hide(range: Range<usize>) -> Self {
        Self::new(range, AnnotationKind::Replace, "")
    }

    /// Hide a range and show a widget in its place.
    #[must_use]
    pub fn replace(range: Range<usize>, widget: Widget) -> Self {
        Self {
            widget: Some(widget),
            ..Self::new(range, AnnotationKind::Replace, "")
        }
    }

    /// Insert a widget at `at`.
    #[must_use]
    pub fn widget(at: usize, widget: Widget) -> Self {
        Self {
            widget: Some(widget),
            ..Self::new(at..at, AnnotationKind::Widget, "")
        }
    }

    /// Set the style.
    #[must_use]
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    /// Set the z-order.
    #[must_use]
    pub fn with_z_order(mut self, z_order: i32) -> Self {
        self.z_order = z_order;
        self
    }

    /// The annotation range.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.from..self.to
    }

    /// Whether this replaces its range with a widget.
    #[must_use]
    pub fn is_widget_replacement(&self) -> bool {
        self.kind == AnnotationKind::Replace && self.widget.is_some()
    }

    /// Sort key: position, then kind rank, then z-order.
    #[must_use]
    pub fn sort_key(&self) -> (usize, u8, i32) {
        (self.from, self.kind.rank(), self.z_order)
    }
}

/// Comparable view of an annotation, without the widget factory.
///
/// Used to check determinism and to diff annotation lists.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AnnotationSummary {
    /// Range start.
    pub from: usize,
    /// Range end.
    pub to: usize,
    /// Annotation kind.
    pub kind: AnnotationKind,
    /// Style.
    pub style: String,
    /// Whether a widget is attached.
    pub has_widget: bool,
    /// Z-order.
    pub z_order: i32,
}

impl From<&Annotation> for AnnotationSummary {
    fn from(annotation: &Annotation) -> Self {
        Self {
            from: annotation.from,
            to: annotation.to,
            kind: annotation.kind,
            style: annotation.style.clone(),
            has_widget: annotation.widget.is_some(),
            z_order: annotation.z_order,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_kind_rank_order() {
        let mut kinds = [
            AnnotationKind::Mark,
            AnnotationKind::Replace,
            AnnotationKind::Line,
            AnnotationKind::Widget,
        ];
        kinds.sort_by_key(|k| k.rank());
        assert_eq!(
            kinds,
            [
                AnnotationKind::Line,
                AnnotationKind::Widget,
                AnnotationKind::Replace,
                AnnotationKind::Mark,
            ]
        );
    }

    #[test]
    fn test_constructors() {
        let line = Annotation::line(5, "ink-h1");
        assert_eq!(line.range(), 5..5);
        assert_eq!(line.kind, AnnotationKind::Line);

        let hide = Annotation::hide(0..2);
        assert_eq!(hide.kind, AnnotationKind::Replace);
        assert!(!hide.is_widget_replacement());

        let widget = Widget::new(|_| WidgetView::html("ink-hr", "<hr>"));
        let replace = Annotation::replace(0..3, widget).with_z_order(2);
        assert!(replace.is_widget_replacement());
        assert_eq!(replace.sort_key(), (0, 2, 2));
    }

    #[test]
    fn test_widget_builds_view_for_range() {
        let widget = Widget::new(|range| {
            WidgetView::html("ink-test", format!("{}..{}", range.start, range.end))
                .with_activation(HostEvent::Select(range))
        });
        let view = widget.build(3..7);
        assert_eq!(view.as_html(), Some("3..7"));
        assert_eq!(view.on_activate, Some(HostEvent::Select(3..7)));
    }

    #[test]
    fn test_summary_ignores_factory_identity() {
        let a = Annotation::widget(1, Widget::new(|_| WidgetView::html("x", "")));
        let b = Annotation::widget(1, Widget::new(|_| WidgetView::html("y", "")));
        assert_eq!(AnnotationSummary::from(&a), AnnotationSummary::from(&b));
    }
}
