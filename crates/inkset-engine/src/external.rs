//! Interfaces to external collaborators: HTML sanitizer, math and diagram
//! engines.
//!
//! The engine never implements these; hosts plug in their own. Engines that
//! need time (layout, network) return a future that the render pass awaits
//! positionally.

use std::fmt;
use std::rc::Rc;

use futures::future::LocalBoxFuture;

use crate::error::RenderError;
use crate::util::escape_html;

/// HTML sanitizer applied to raw HTML when sanitizing is enabled.
pub trait Sanitizer {
    /// Return a safe version of `html`.
    fn sanitize(&self, html: &str) -> String;
}

/// Sanitizer that escapes everything, turning raw HTML into visible text.
#[derive(Clone, Copy, Debug, Default)]
pub struct EscapeSanitizer;

impl Sanitizer for EscapeSanitizer {
    fn sanitize(&self, html: &str) -> String {
        escape_html(html)
    }
}

/// TeX math renderer.
pub trait MathEngine {
    /// Render `tex` to HTML, as a display block when `display` is set.
    fn render(&self, tex: &str, display: bool) -> LocalBoxFuture<'static, Result<String, RenderError>>;

    /// Base CSS the rendered output depends on.
    ///
    /// Included in the generated stylesheet rather than injected globally.
    fn stylesheet(&self) -> String {
        String::new()
    }
}

/// Diagram renderer for fenced code blocks (e.g. `mermaid`).
pub trait DiagramEngine {
    /// Whether this engine renders blocks of `language`.
    fn supports(&self, language: &str) -> bool;

    /// Render diagram source to HTML (usually inline SVG).
    fn render(&self, language: &str, source: &str) -> LocalBoxFuture<'static, Result<String, RenderError>>;
}

/// External collaborators shared by the built-in plugins.
#[derive(Clone)]
pub struct Services {
    /// Sanitizer for raw HTML.
    pub sanitizer: Rc<dyn Sanitizer>,
    /// Math engine, if configured.
    pub math: Option<Rc<dyn MathEngine>>,
    /// Diagram engine, if configured.
    pub diagrams: Option<Rc<dyn DiagramEngine>>,
}

impl Services {
    /// Whether the diagram engine renders `language`.
    #[must_use]
    pub fn renders_diagram(&self, language: &str) -> bool {
        !language.is_empty() && self.diagrams.as_ref().is_some_and(|d| d.supports(language))
    }
}

impl Default for Services {
    fn default() -> Self {
        Self {
            sanitizer: Rc::new(EscapeSanitizer),
            math: None,
            diagrams: None,
        }
    }
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services")
            .field("math", &self.math.is_some())
            .field("diagrams", &self.diagrams.is_some())
            .finish_non_exhaustive()
    }
}
