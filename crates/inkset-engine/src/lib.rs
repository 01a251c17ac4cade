//! Plugin-driven markdown engine for live editors and static pages.
//!
//! One set of plugins drives two surfaces:
//! - **Interactive**: [`Engine::annotate`] turns a syntax tree plus the
//!   cursor selection into a sorted list of [`Annotation`]s (marks, line
//!   styles, widgets, replacements). Syntax markers near the cursor are
//!   revealed, everything else is hidden or replaced by a rendered widget.
//! - **Static**: [`Engine::render`] produces HTML. Parts rendered by external
//!   engines (math, diagrams) are deferred and spliced back in document order
//!   by [`RenderedDocument::resolve`].
//!
//! Plugins are plain values built from closures (see [`Plugin`]); the
//! built-in set lives in [`plugins`]. Configuration comes from
//! `inkset-config`.
//!
//! # Example
//!
//! ```
//! use futures::executor::block_on;
//! use inkset_engine::Engine;
//!
//! let engine = Engine::builder().build().unwrap();
//! let html = block_on(engine.render_html("Some **bold** text")).unwrap();
//! assert_eq!(html, "<p>Some <strong>bold</strong> text</p>");
//! ```

mod annotate;
mod annotation;
pub mod code_info;
mod context;
mod engine;
mod error;
mod external;
mod generation;
mod plugin;
pub mod plugins;
mod registry;
mod render;
mod replacements;
mod selection;
pub mod styles;
pub mod table;
pub mod tags;
pub mod util;

pub use annotate::build_annotations;
pub use annotation::{
    Annotation, AnnotationKind, AnnotationSummary, HostEvent, Widget, WidgetContent, WidgetView,
};
pub use context::AnnotateContext;
pub use engine::{Engine, EngineBuilder};
pub use error::{EngineError, PluginError, RenderError};
pub use external::{DiagramEngine, EscapeSanitizer, MathEngine, Sanitizer, Services};
pub use generation::{Generation, PassToken};
pub use inkset_config::Theme;
pub use plugin::{AnnotateFn, DEFAULT_PRIORITY, KeyBinding, Plugin, RenderFn, Rendered, StylesFn};
pub use registry::Registry;
pub use render::{
    Children, Fragment, Fragments, RenderContext, RenderOptions, RenderedDocument, error_html,
};
pub use selection::{Selection, Viewport};
