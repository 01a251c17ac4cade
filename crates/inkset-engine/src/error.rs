//! Engine error types.

use inkset_tree::SyntaxError;

/// Error returned by engine construction and render resolution.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A syntax extension could not be registered with the parser.
    #[error("syntax extension registration failed: {0}")]
    Syntax(#[from] SyntaxError),
    /// A newer render pass started before deferred work of this pass completed.
    #[error("render pass {pass} superseded by pass {current}")]
    Superseded {
        /// Generation of the pass being resolved.
        pass: u64,
        /// Generation of the newest pass.
        current: u64,
    },
}

/// Error returned by a plugin's annotation contributor.
///
/// The builder logs and discards the plugin's annotations for the pass.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// The tree did not have the shape the plugin expected.
    #[error("unexpected tree shape at {start}..{end}: {message}")]
    Tree {
        /// Node start.
        start: usize,
        /// Node end.
        end: usize,
        /// What was missing.
        message: String,
    },
    /// Any other failure.
    #[error("{0}")]
    Other(String),
}

impl PluginError {
    /// Tree-shape error for a node range.
    pub fn tree(range: std::ops::Range<usize>, message: impl Into<String>) -> Self {
        Self::Tree {
            start: range.start,
            end: range.end,
            message: message.into(),
        }
    }
}

/// Error produced by a deferred renderer (math, diagrams).
///
/// Rendered in place as an inline error indicator, never propagated.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// An external engine rejected its input.
    #[error("{engine} error: {message}")]
    Engine {
        /// Engine name (e.g. "math").
        engine: String,
        /// Engine message.
        message: String,
    },
    /// The engine needed for this node is not configured.
    #[error("no {0} engine configured")]
    Unavailable(String),
}

impl RenderError {
    /// Error reported by a named engine.
    pub fn engine(engine: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Engine {
            engine: engine.into(),
            message: message.into(),
        }
    }
}
