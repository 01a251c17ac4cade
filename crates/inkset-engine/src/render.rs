//! Static HTML renderer.
//!
//! Nodes are rendered recursively. For each node the plugins registered for
//! its type are tried in priority order and the first handled result wins;
//! otherwise the built-in default table applies. Children are rendered
//! lazily, only when a renderer asks for them.
//!
//! Deferred results (math, diagrams) leave a placeholder in the output and
//! are spliced in by [`RenderedDocument::resolve`], so the final string is in
//! document order whatever order the futures complete in.

use std::cell::{Cell, OnceCell, RefCell};
use std::fmt;
use std::collections::HashMap;
use std::fmt::Write;
use std::ops::Range;

use futures::FutureExt;
use futures::future::{LocalBoxFuture, Shared, join_all};
use inkset_config::{RenderConfig, Theme};
use inkset_tree::{Node, Tree, kind};

use crate::annotation::WidgetView;
use crate::error::{EngineError, RenderError};
use crate::external::Services;
use crate::generation::PassToken;
use crate::plugin::Rendered;
use crate::registry::Registry;
use crate::replacements::{Replacements, placeholder};
use crate::util::{escape_html, is_marker, slugify};

type DeferredHtml = LocalBoxFuture<'static, Result<String, RenderError>>;

/// Static render options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    /// Pass raw HTML through the sanitizer.
    pub sanitize: bool,
    /// Root tag wrapping the output.
    pub wrapper_tag: Option<String>,
    /// Class on the root tag; also scopes the stylesheet.
    pub wrapper_class: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from(&RenderConfig::default())
    }
}

impl From<&RenderConfig> for RenderOptions {
    fn from(config: &RenderConfig) -> Self {
        Self {
            sanitize: config.sanitize,
            wrapper_tag: config.wrapper_tag.clone(),
            wrapper_class: config.wrapper_class.clone(),
        }
    }
}

/// State of one static render pass, passed to every render call.
pub struct RenderContext<'a> {
    tree: &'a Tree,
    registry: &'a Registry,
    services: &'a Services,
    options: &'a RenderOptions,
    theme: Theme,
    pass: u64,
    deferred: RefCell<Vec<(String, DeferredHtml)>>,
    ids: RefCell<HashMap<String, usize>>,
    claimed: Cell<Option<usize>>,
}

impl<'a> RenderContext<'a> {
    fn new(
        tree: &'a Tree,
        registry: &'a Registry,
        services: &'a Services,
        options: &'a RenderOptions,
        theme: Theme,
        pass: u64,
    ) -> Self {
        Self {
            tree,
            registry,
            services,
            options,
            theme,
            pass,
            deferred: RefCell::new(Vec::new()),
            ids: RefCell::new(HashMap::new()),
            claimed: Cell::new(None),
        }
    }

    /// Document source.
    #[must_use]
    pub fn source(&self) -> &'a str {
        self.tree.source()
    }

    /// Source text of `range`.
    #[must_use]
    pub fn slice(&self, range: Range<usize>) -> &'a str {
        self.tree.slice(range)
    }

    /// Active theme.
    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Shared external collaborators.
    #[must_use]
    pub fn services(&self) -> &'a Services {
        self.services
    }

    /// Apply the sanitizer to raw HTML when sanitizing is enabled.
    #[must_use]
    pub fn sanitize(&self, html: &str) -> String {
        if self.options.sanitize {
            self.services.sanitizer.sanitize(html)
        } else {
            html.to_owned()
        }
    }

    /// Render one node.
    #[must_use]
    pub fn render_node(&self, node: Node<'_>) -> String {
        let children = Children::new(node, self);
        for plugin in self.registry.for_type(node.kind()) {
            let Some(render) = &plugin.render else {
                continue;
            };
            match render(node, &children, self) {
                Rendered::Html(html) => return html,
                Rendered::Deferred(future) => return self.defer(future),
                Rendered::Unhandled => {}
            }
        }
        render_default(node, &children, self)
    }

    /// Render all children of `node` with the gap text between them.
    #[must_use]
    pub fn render_children(&self, node: Node<'_>) -> String {
        self.render_span(node, node.range())
    }

    /// Render the children of `node` that lie inside `range`, with the gap
    /// text between them HTML-escaped. Children crossing the range edges are
    /// skipped.
    #[must_use]
    pub fn render_span(&self, node: Node<'_>, range: Range<usize>) -> String {
        let mut out = String::new();
        let mut pos = range.start;
        for child in node.children() {
            if child.start() < range.start.max(pos) || child.end() > range.end {
                continue;
            }
            if child.start() > pos {
                out.push_str(&escape_html(self.slice(pos..child.start())));
            }
            self.claimed.set(None);
            out.push_str(&self.render_node(child));
            let claimed = self.claimed.take().map_or(0, |end| end.min(range.end));
            pos = pos.max(child.end()).max(claimed);
        }
        if pos < range.end {
            out.push_str(&escape_html(self.slice(pos..range.end)));
        }
        out
    }

    /// Mark the source up to `end` as rendered by the node being rendered.
    ///
    /// The enclosing [`render_span`](Self::render_span) skips the siblings
    /// and gap text before `end`. Used by renderers whose output covers more
    /// than their own node, such as an HTML element spanning several inline
    /// nodes.
    pub fn claim(&self, end: usize) {
        self.claimed.set(Some(end));
    }

    /// Register asynchronous output and return its placeholder.
    pub fn defer(&self, future: DeferredHtml) -> String {
        let mut deferred = self.deferred.borrow_mut();
        let marker = placeholder(self.pass, deferred.len());
        deferred.push((marker.clone(), future));
        marker
    }

    /// Slug id for `text`, unique within this pass (`faq`, `faq-1`, ...).
    #[must_use]
    pub fn unique_id(&self, text: &str) -> String {
        let mut base_id = slugify(text);
        if base_id.is_empty() {
            base_id.push_str("section");
        }
        let mut ids = self.ids.borrow_mut();
        let count = ids.entry(base_id.clone()).or_default();
        let id = match *count {
            0 => base_id,
            n => format!("{base_id}-{n}"),
        };
        *count += 1;
        id
    }
}

/// Lazily rendered children of the node being rendered.
pub struct Children<'a> {
    node: Node<'a>,
    ctx: &'a RenderContext<'a>,
    html: OnceCell<String>,
}

impl<'a> Children<'a> {
    fn new(node: Node<'a>, ctx: &'a RenderContext<'a>) -> Self {
        Self {
            node,
            ctx,
            html: OnceCell::new(),
        }
    }

    /// Rendered children, computed on first use.
    pub fn html(&self) -> &str {
        self.html.get_or_init(|| self.ctx.render_children(self.node))
    }
}

/// Output of a static render pass, possibly with deferred parts pending.
pub struct RenderedDocument {
    html: String,
    deferred: Vec<(String, DeferredHtml)>,
    token: PassToken,
}

impl RenderedDocument {
    /// HTML with placeholders for pending deferred parts.
    #[must_use]
    pub fn html(&self) -> &str {
        &self.html
    }

    /// Number of pending deferred parts.
    #[must_use]
    pub fn deferred_count(&self) -> usize {
        self.deferred.len()
    }

    /// Generation of the pass that produced this document.
    #[must_use]
    pub fn pass(&self) -> u64 {
        self.token.pass()
    }

    /// Await all deferred parts concurrently and splice them in.
    ///
    /// A failed part becomes an inline error indicator.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Superseded`] if a newer pass started on the
    /// same engine before the deferred parts completed.
    pub async fn resolve(self) -> Result<String, EngineError> {
        let Self {
            mut html,
            deferred,
            token,
        } = self;

        let (markers, futures): (Vec<_>, Vec<_>) = deferred.into_iter().unzip();
        let results = join_all(futures).await;

        if !token.is_current() {
            return Err(EngineError::Superseded {
                pass: token.pass(),
                current: token.latest(),
            });
        }

        splice(&mut html, markers, results);
        Ok(html)
    }
}

/// Replace each marker with its result, failed parts with an error indicator.
fn splice(html: &mut String, markers: Vec<String>, results: Vec<Result<String, RenderError>>) {
    let mut replacements = Replacements::with_capacity(markers.len());
    for (marker, result) in markers.into_iter().zip(results) {
        let part = result.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Deferred render failed");
            error_html(&e)
        });
        replacements.add(marker, part);
    }
    replacements.apply(html);
}

/// Static HTML of part of a document, rendered for a widget.
#[derive(Clone)]
pub enum Fragment {
    /// Complete HTML.
    Ready(String),
    /// HTML waiting on deferred parts. Every widget built from it shares the
    /// same pending work.
    Pending(Shared<LocalBoxFuture<'static, String>>),
}

impl Fragment {
    /// Widget view showing the fragment.
    #[must_use]
    pub fn view(&self, class: &str) -> WidgetView {
        match self {
            Self::Ready(html) => WidgetView::html(class, html.as_str()),
            Self::Pending(html) => WidgetView::deferred(class, html.clone().map(Ok).boxed_local()),
        }
    }

    /// The HTML, if no deferred part is pending.
    #[must_use]
    pub fn as_ready(&self) -> Option<&str> {
        match self {
            Self::Ready(html) => Some(html),
            Self::Pending(_) => None,
        }
    }
}

impl fmt::Debug for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(html) => f.debug_tuple("Ready").field(html).finish(),
            Self::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// Renders single nodes outside a document pass, with the same plugins and
/// options as [`render_tree`].
///
/// Widgets that stand in for hidden source build their content here, so the
/// interactive surface shows exactly what the static output contains.
#[derive(Clone, Copy, Debug)]
pub struct Fragments<'a> {
    registry: &'a Registry,
    services: &'a Services,
    options: &'a RenderOptions,
    theme: Theme,
}

impl<'a> Fragments<'a> {
    /// Fragment renderer over a plugin registry.
    #[must_use]
    pub fn new(
        registry: &'a Registry,
        services: &'a Services,
        options: &'a RenderOptions,
        theme: Theme,
    ) -> Self {
        Self {
            registry,
            services,
            options,
            theme,
        }
    }

    /// Static HTML of `node`.
    #[must_use]
    pub fn node(&self, node: Node<'_>) -> Fragment {
        self.render(node.tree(), |ctx| ctx.render_node(node))
    }

    /// Static HTML of the children of `parent` inside `range`, as
    /// [`RenderContext::render_span`] renders them.
    #[must_use]
    pub fn span(&self, parent: Node<'_>, range: Range<usize>) -> Fragment {
        self.render(parent.tree(), |ctx| ctx.render_span(parent, range))
    }

    fn render(&self, tree: &Tree, f: impl FnOnce(&RenderContext<'_>) -> String) -> Fragment {
        // Pass 0 is never handed out to a document pass.
        let ctx = RenderContext::new(tree, self.registry, self.services, self.options, self.theme, 0);
        let mut html = f(&ctx);
        let deferred = ctx.deferred.into_inner();
        if deferred.is_empty() {
            return Fragment::Ready(html);
        }

        let (markers, futures): (Vec<_>, Vec<_>) = deferred.into_iter().unzip();
        let pending = async move {
            let results = join_all(futures).await;
            splice(&mut html, markers, results);
            html
        };
        Fragment::Pending(pending.boxed_local().shared())
    }
}

/// Render a tree.
pub(crate) fn render_tree(
    tree: &Tree,
    registry: &Registry,
    services: &Services,
    options: &RenderOptions,
    theme: Theme,
    token: PassToken,
) -> RenderedDocument {
    let ctx = RenderContext::new(tree, registry, services, options, theme, token.pass());

    let body = ctx.render_node(tree.root());
    let html = match &options.wrapper_tag {
        Some(tag) => format!(
            r#"<{tag} class="{}">{body}</{tag}>"#,
            escape_html(&options.wrapper_class)
        ),
        None => body,
    };
    let deferred = ctx.deferred.into_inner();

    tracing::debug!(pass = token.pass(), deferred = deferred.len(), "Rendered document");
    RenderedDocument {
        html,
        deferred,
        token,
    }
}

/// Inline indicator for a failed deferred part.
#[must_use]
pub fn error_html(error: &RenderError) -> String {
    let message = escape_html(&error.to_string());
    format!(r#"<span class="ink-error" title="{message}">{message}</span>"#)
}

fn render_default(node: Node<'_>, children: &Children<'_>, ctx: &RenderContext<'_>) -> String {
    match node.kind() {
        kind::DOCUMENT => blocks(node, ctx),
        kind::PARAGRAPH => format!("<p>{}</p>", children.html().trim()),
        kind::BULLET_LIST => format!("<ul>\n{}</ul>", list_items(node, ctx)),
        kind::ORDERED_LIST => {
            let start = ordered_start(node).filter(|&n| n != 1);
            let attr = start.map(|n| format!(r#" start="{n}""#)).unwrap_or_default();
            format!("<ol{attr}>\n{}</ol>", list_items(node, ctx))
        }
        kind::LIST_ITEM => format!("<li>{}</li>", children.html().trim()),
        kind::HARD_BREAK => "<br>".to_owned(),
        kind::ESCAPE => escape_html(node.text().get(1..).unwrap_or_default()),
        kind::ENTITY => node.text().to_owned(),
        kind::FOOTNOTE_REFERENCE => {
            let label = footnote_label(node.text());
            let id = escape_html(&slugify(label));
            format!(
                r##"<sup class="footnote-ref"><a href="#fn-{id}">{}</a></sup>"##,
                escape_html(label)
            )
        }
        kind::FOOTNOTE_DEFINITION => {
            let label = node
                .child(kind::LINK_LABEL)
                .map_or("", |label| footnote_label(label.text()));
            let id = escape_html(&slugify(label));
            format!(
                r#"<div class="footnote-definition" id="fn-{id}"><sup>{}</sup> {}</div>"#,
                escape_html(label),
                children.html().trim()
            )
        }
        k if is_marker(k) => String::new(),
        _ if node.is_leaf() => escape_html(node.text()),
        _ => children.html().to_owned(),
    }
}

/// Render top-level blocks one per line. Text between blocks (blank lines,
/// link reference definitions) is not content.
fn blocks(document: Node<'_>, ctx: &RenderContext<'_>) -> String {
    document
        .children()
        .map(|block| ctx.render_node(block))
        .filter(|html| !html.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render list items one per line; the source between items is dropped.
fn list_items(list: Node<'_>, ctx: &RenderContext<'_>) -> String {
    list.children_of(kind::LIST_ITEM)
        .fold(String::new(), |mut out, item| {
            let _ = writeln!(out, "{}", ctx.render_node(item));
            out
        })
}

fn ordered_start(list: Node<'_>) -> Option<u64> {
    let mark = list.child(kind::LIST_ITEM)?.child(kind::LIST_MARK)?;
    mark.text()
        .trim_end_matches(['.', ')'])
        .parse()
        .ok()
}

fn footnote_label(text: &str) -> &str {
    text.trim_end_matches(':')
        .trim_start_matches("[^")
        .trim_end_matches(']')
}
