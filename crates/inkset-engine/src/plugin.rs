//! Plugin capability model.
//!
//! A plugin is one struct with optional capability fields. Every capability
//! is independent: a plugin may only contribute styles, or only a static
//! renderer for one node type.
//!
//! # Example
//!
//! ```
//! use inkset_engine::{Annotation, Plugin, Rendered};
//! use inkset_tree::kind;
//!
//! let plugin = Plugin::new("shout", "1.0.0")
//!     .with_priority(5)
//!     .with_node_types([kind::STRONG_EMPHASIS])
//!     .with_annotate(|ctx, out| {
//!         for node in ctx.nodes_of(kind::STRONG_EMPHASIS) {
//!             out.push(Annotation::mark(node.range(), "shout"));
//!         }
//!         Ok(())
//!     })
//!     .with_render(|_, children, _| Rendered::Html(children.html().to_uppercase()))
//!     .with_styles(|_| ".shout { font-weight: 900 }".to_owned());
//!
//! assert_eq!(plugin.name, "shout");
//! assert!(plugin.annotate.is_some());
//! ```

use std::fmt;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use inkset_config::Theme;
use inkset_tree::{Node, SyntaxExtension};

use crate::annotation::Annotation;
use crate::context::AnnotateContext;
use crate::error::{PluginError, RenderError};
use crate::render::{Children, RenderContext};

/// Annotation contributor.
pub type AnnotateFn =
    Rc<dyn Fn(&AnnotateContext<'_>, &mut Vec<Annotation>) -> Result<(), PluginError>>;

/// Static renderer for a node.
pub type RenderFn = Rc<dyn Fn(Node<'_>, &Children<'_>, &RenderContext<'_>) -> Rendered>;

/// Themed CSS fragment.
pub type StylesFn = Rc<dyn Fn(Theme) -> String>;

/// Default priority for plugins that don't set one.
pub const DEFAULT_PRIORITY: i32 = 100;

/// Result of a plugin's static renderer.
pub enum Rendered {
    /// Final HTML. An empty string suppresses the node.
    Html(String),
    /// HTML produced asynchronously, spliced in when the pass resolves.
    Deferred(LocalBoxFuture<'static, Result<String, RenderError>>),
    /// Not handled; the next plugin (or the default table) is tried.
    Unhandled,
}

impl fmt::Debug for Rendered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Html(html) => f.debug_tuple("Html").field(html).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
            Self::Unhandled => f.write_str("Unhandled"),
        }
    }
}

/// Opaque key-binding, consumed only by the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyBinding {
    /// Key chord, e.g. `Mod-Alt-f`.
    pub key: String,
    /// Command name the host dispatches.
    pub command: String,
}

impl KeyBinding {
    /// Create a binding.
    pub fn new(key: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            command: command.into(),
        }
    }
}

/// An engine plugin.
#[derive(Clone)]
pub struct Plugin {
    /// Unique name; configuration refers to plugins by it.
    pub name: String,
    /// Plugin version.
    pub version: String,
    /// Lower runs first. Ties keep registration order.
    pub priority: i32,
    /// Node types this plugin renders.
    pub node_types: Vec<String>,
    /// Parser extensions registered at engine construction.
    pub syntax: Vec<SyntaxExtension>,
    /// Annotation contributor.
    pub annotate: Option<AnnotateFn>,
    /// Static renderer.
    pub render: Option<RenderFn>,
    /// CSS fragment.
    pub styles: Option<StylesFn>,
    /// Key-bindings for the host.
    pub key_bindings: Vec<KeyBinding>,
}

impl Plugin {
    /// Create a plugin with no capabilities.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            priority: DEFAULT_PRIORITY,
            node_types: Vec::new(),
            syntax: Vec::new(),
            annotate: None,
            render: None,
            styles: None,
            key_bindings: Vec::new(),
        }
    }

    /// Set the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Add node types handled by the static renderer.
    #[must_use]
    pub fn with_node_types<I, S>(mut self, node_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.node_types.extend(node_types.into_iter().map(Into::into));
        self
    }

    /// Add a parser extension.
    #[must_use]
    pub fn with_syntax(mut self, extension: SyntaxExtension) -> Self {
        self.syntax.push(extension);
        self
    }

    /// Set the annotation contributor.
    #[must_use]
    pub fn with_annotate(
        mut self,
        annotate: impl Fn(&AnnotateContext<'_>, &mut Vec<Annotation>) -> Result<(), PluginError> + 'static,
    ) -> Self {
        self.annotate = Some(Rc::new(annotate));
        self
    }

    /// Set the static renderer.
    #[must_use]
    pub fn with_render(
        mut self,
        render: impl Fn(Node<'_>, &Children<'_>, &RenderContext<'_>) -> Rendered + 'static,
    ) -> Self {
        self.render = Some(Rc::new(render));
        self
    }

    /// Set the CSS fragment.
    #[must_use]
    pub fn with_styles(mut self, styles: impl Fn(Theme) -> String + 'static) -> Self {
        self.styles = Some(Rc::new(styles));
        self
    }

    /// Add a key-binding.
    #[must_use]
    pub fn with_key_binding(mut self, binding: KeyBinding) -> Self {
        self.key_bindings.push(binding);
        self
    }
}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("priority", &self.priority)
            .field("node_types", &self.node_types)
            .field("syntax", &self.syntax)
            .field("annotate", &self.annotate.is_some())
            .field("render", &self.render.is_some())
            .field("styles", &self.styles.is_some())
            .field("key_bindings", &self.key_bindings)
            .finish()
    }
}
