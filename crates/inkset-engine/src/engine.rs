//! Engine façade: parser, registry and services wired from configuration.

use std::rc::Rc;

use inkset_config::{Config, Theme};
use inkset_tree::{MarkdownParser, Tree};

use crate::annotate::build_annotations;
use crate::annotation::Annotation;
use crate::context::AnnotateContext;
use crate::error::EngineError;
use crate::external::{DiagramEngine, MathEngine, Sanitizer, Services};
use crate::generation::Generation;
use crate::plugin::{KeyBinding, Plugin};
use crate::plugins::builtins;
use crate::registry::Registry;
use crate::render::{Fragments, RenderOptions, RenderedDocument, render_tree};
use crate::selection::{Selection, Viewport};

/// A configured markdown engine.
///
/// The plugin order and the parser's syntax extensions are fixed when the
/// engine is built. Each [`render`](Self::render) starts a new pass and
/// supersedes earlier passes that still have deferred work pending.
///
/// # Example
///
/// ```
/// use inkset_engine::{Engine, Selection, Viewport};
///
/// let engine = Engine::builder().build().unwrap();
/// let tree = engine.parse("# Hello *world*");
///
/// let annotations = engine.annotate(&tree, &Selection::caret(0), &Viewport::all());
/// assert!(!annotations.is_empty());
///
/// let html = futures::executor::block_on(engine.render(&tree).resolve()).unwrap();
/// assert_eq!(html, r#"<h1 id="hello-world">Hello <em>world</em></h1>"#);
/// ```
#[derive(Debug)]
pub struct Engine {
    parser: MarkdownParser,
    registry: Registry,
    services: Services,
    options: RenderOptions,
    theme: Theme,
    generation: Generation,
}

impl Engine {
    /// Start building an engine with the built-in plugins and default
    /// configuration.
    #[must_use]
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Parse markdown with the engine's syntax extensions.
    #[must_use]
    pub fn parse(&self, source: &str) -> Tree {
        self.parser.parse(source)
    }

    /// The configured parser.
    #[must_use]
    pub fn parser(&self) -> &MarkdownParser {
        &self.parser
    }

    /// Plugins in evaluation order.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Active theme.
    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Switch the theme used for annotation, rendering and styles.
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    /// Default static render options.
    #[must_use]
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Build the annotation list for the interactive surface.
    #[must_use]
    pub fn annotate(&self, tree: &Tree, selection: &Selection, viewport: &Viewport) -> Vec<Annotation> {
        let ctx = AnnotateContext {
            tree,
            selection,
            viewport,
            theme: self.theme,
            fragments: Fragments::new(&self.registry, &self.services, &self.options, self.theme),
        };
        build_annotations(&self.registry, &ctx)
    }

    /// Render a tree with the configured options, starting a new pass.
    #[must_use]
    pub fn render(&self, tree: &Tree) -> RenderedDocument {
        self.render_with(tree, &self.options)
    }

    /// Render a tree with per-call options, starting a new pass.
    #[must_use]
    pub fn render_with(&self, tree: &Tree, options: &RenderOptions) -> RenderedDocument {
        render_tree(
            tree,
            &self.registry,
            &self.services,
            options,
            self.theme,
            self.generation.next(),
        )
    }

    /// Parse, render and resolve markdown in one call.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Superseded`] if another pass started before the
    /// deferred parts of this one completed.
    pub async fn render_html(&self, source: &str) -> Result<String, EngineError> {
        let tree = self.parse(source);
        self.render(&tree).resolve().await
    }

    /// CSS for static output: base styles, external engine assets, then each
    /// plugin's fragment, all scoped under the wrapper class.
    #[must_use]
    pub fn stylesheet(&self) -> String {
        let assets: Vec<String> = self
            .services
            .math
            .iter()
            .map(|math| math.stylesheet())
            .filter(|css| !css.trim().is_empty())
            .collect();
        self.registry
            .stylesheet(self.theme, &self.options.wrapper_class, &assets)
    }

    /// Key-bindings of all plugins, in plugin order.
    #[must_use]
    pub fn key_bindings(&self) -> Vec<KeyBinding> {
        self.registry.key_bindings()
    }

    /// Generation of the newest render pass.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.current()
    }
}

/// Builder for [`Engine`].
#[derive(Debug)]
pub struct EngineBuilder {
    config: Config,
    plugins: Vec<Plugin>,
    builtins: bool,
    services: Services,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBuilder {
    /// Builder with the built-in plugins and default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            plugins: Vec::new(),
            builtins: true,
            services: Services::default(),
        }
    }

    /// Use loaded configuration.
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Register a plugin after the built-ins.
    #[must_use]
    pub fn with_plugin(mut self, plugin: Plugin) -> Self {
        self.plugins.push(plugin);
        self
    }

    /// Sanitizer for raw HTML.
    #[must_use]
    pub fn with_sanitizer(mut self, sanitizer: impl Sanitizer + 'static) -> Self {
        self.services.sanitizer = Rc::new(sanitizer);
        self
    }

    /// Math engine for `$...$` and `$$...$$`.
    #[must_use]
    pub fn with_math_engine(mut self, engine: impl MathEngine + 'static) -> Self {
        self.services.math = Some(Rc::new(engine));
        self
    }

    /// Diagram engine for fenced blocks of supported languages.
    #[must_use]
    pub fn with_diagram_engine(mut self, engine: impl DiagramEngine + 'static) -> Self {
        self.services.diagrams = Some(Rc::new(engine));
        self
    }

    /// Leave out the built-in plugins.
    #[must_use]
    pub fn without_builtins(mut self) -> Self {
        self.builtins = false;
        self
    }

    /// Build the engine.
    ///
    /// Registers the configured syntax extensions and those requested by the
    /// enabled plugins.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Syntax`] if a configured extension is unknown.
    pub fn build(self) -> Result<Engine, EngineError> {
        let Self {
            config,
            plugins,
            builtins: with_builtins,
            services,
        } = self;

        let mut all = if with_builtins {
            builtins(&services)
        } else {
            Vec::new()
        };
        all.extend(plugins);
        let registry = Registry::from_config(all, &config);

        let mut parser = MarkdownParser::new();
        for name in &config.parser.extensions {
            parser.register(name)?;
        }
        for extension in registry.syntax_extensions() {
            parser.enable(extension);
        }

        tracing::debug!(
            plugins = registry.len(),
            extensions = ?parser.extensions(),
            "Built engine"
        );

        Ok(Engine {
            parser,
            registry,
            services,
            options: RenderOptions::from(&config.render),
            theme: config.theme,
            generation: Generation::new(),
        })
    }
}
