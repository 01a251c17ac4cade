//! Inputs shared by every annotation contributor in a pass.

use std::ops::Range;

use inkset_config::Theme;
use inkset_tree::{Node, Tree};

use crate::render::Fragments;
use crate::selection::{Selection, Viewport};

/// Read-only view of one annotation pass.
#[derive(Clone, Copy, Debug)]
pub struct AnnotateContext<'a> {
    /// The parsed document.
    pub tree: &'a Tree,
    /// Host selection.
    pub selection: &'a Selection,
    /// Visible window.
    pub viewport: &'a Viewport,
    /// Active theme.
    pub theme: Theme,
    /// Static rendering for widgets that stand in for hidden source.
    pub fragments: Fragments<'a>,
}

impl<'a> AnnotateContext<'a> {
    /// Document source.
    #[must_use]
    pub fn source(&self) -> &'a str {
        self.tree.source()
    }

    /// Whether the selection reveals the node's source.
    #[must_use]
    pub fn reveals(&self, node: Node<'_>) -> bool {
        self.selection.reveals(&node.range())
    }

    /// Whether the selection reveals `range`.
    #[must_use]
    pub fn reveals_range(&self, range: &Range<usize>) -> bool {
        self.selection.reveals(range)
    }

    /// Visible nodes of one type, in document order.
    pub fn nodes_of(&self, kind: &'a str) -> impl Iterator<Item = Node<'a>> + 'a {
        let viewport = self.viewport;
        self.tree
            .nodes_of(kind)
            .filter(move |node| viewport.shows(&node.range()))
    }

    /// Visible nodes of any of `kinds`, in document order.
    pub fn nodes_of_any(&self, kinds: &'a [&'a str]) -> impl Iterator<Item = Node<'a>> + 'a {
        let viewport = self.viewport;
        self.tree
            .iter()
            .filter(move |node| kinds.contains(&node.kind()) && viewport.shows(&node.range()))
    }
}
