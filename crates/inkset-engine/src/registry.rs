//! Ordered plugin registry.
//!
//! Evaluation order is decided once, when the registry is built: plugins are
//! stable-sorted by priority, so equal priorities keep registration order.

use std::collections::HashMap;

use inkset_config::{Config, Theme};
use inkset_tree::SyntaxExtension;

use crate::plugin::{KeyBinding, Plugin};
use crate::styles::{base_styles, scope_css};

/// Plugins in evaluation order, indexed by the node types they render.
#[derive(Debug, Default)]
pub struct Registry {
    plugins: Vec<Plugin>,
    index: HashMap<String, Vec<usize>>,
}

impl Registry {
    /// Build a registry from plugins in registration order.
    #[must_use]
    pub fn new(mut plugins: Vec<Plugin>) -> Self {
        plugins.sort_by_key(|plugin| plugin.priority);

        let mut index: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, plugin) in plugins.iter().enumerate() {
            if plugin.render.is_none() {
                continue;
            }
            for node_type in &plugin.node_types {
                let entry = index.entry(node_type.clone()).or_default();
                if !entry.contains(&i) {
                    entry.push(i);
                }
            }
        }

        Self { plugins, index }
    }

    /// Build a registry, applying the `[plugins.<name>]` configuration.
    ///
    /// Disabled plugins are dropped; priority overrides replace the
    /// plugin's own priority.
    #[must_use]
    pub fn from_config(plugins: Vec<Plugin>, config: &Config) -> Self {
        let plugins = plugins
            .into_iter()
            .filter_map(|mut plugin| {
                let settings = config.plugin(&plugin.name);
                if !settings.enabled {
                    tracing::debug!(plugin = %plugin.name, "Plugin disabled by configuration");
                    return None;
                }
                if let Some(priority) = settings.priority {
                    plugin.priority = priority;
                }
                Some(plugin)
            })
            .collect();
        Self::new(plugins)
    }

    /// Plugins in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = &Plugin> {
        self.plugins.iter()
    }

    /// Number of plugins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Whether the registry has no plugins.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Look up a plugin by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Plugin> {
        self.plugins.iter().find(|plugin| plugin.name == name)
    }

    /// Plugins with a static renderer for `node_type`, in evaluation order.
    pub fn for_type<'a>(&'a self, node_type: &str) -> impl Iterator<Item = &'a Plugin> + 'a {
        self.index
            .get(node_type)
            .into_iter()
            .flatten()
            .map(|&i| &self.plugins[i])
    }

    /// Parser extensions requested by all plugins, without duplicates.
    #[must_use]
    pub fn syntax_extensions(&self) -> Vec<SyntaxExtension> {
        let mut extensions = Vec::new();
        for extension in self.plugins.iter().flat_map(|plugin| &plugin.syntax) {
            if !extensions.contains(extension) {
                extensions.push(*extension);
            }
        }
        extensions
    }

    /// Key-bindings of all plugins, in evaluation order.
    #[must_use]
    pub fn key_bindings(&self) -> Vec<KeyBinding> {
        self.plugins
            .iter()
            .flat_map(|plugin| plugin.key_bindings.iter().cloned())
            .collect()
    }

    /// Assemble the stylesheet: base styles, extra assets, then each plugin's
    /// fragment, all scoped under `class`.
    #[must_use]
    pub fn stylesheet(&self, theme: Theme, class: &str, assets: &[String]) -> String {
        let mut css = scope_css(&base_styles(theme), class);
        for asset in assets.iter().filter(|asset| !asset.trim().is_empty()) {
            css.push_str(&scope_css(asset, class));
        }
        for plugin in &self.plugins {
            if let Some(styles) = &plugin.styles {
                css.push_str(&scope_css(&styles(theme), class));
            }
        }
        css
    }
}
