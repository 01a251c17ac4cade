//! Arena-backed syntax tree with borrowed node handles.

use std::borrow::Cow;
use std::cmp::Reverse;
use std::fmt;
use std::ops::Range;

use crate::kind;

/// Index of a node inside its [`Tree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in pre-order.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Where a link or image points, as resolved by the parser.
///
/// Reference links carry the destination of their definition, wherever in
/// the document that definition lives.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Destination {
    /// Destination URL, unescaped.
    pub url: String,
    /// Title, empty when absent.
    pub title: String,
}

/// A flat `(type, range)` pair used to assemble a tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Span {
    /// Node type name.
    pub kind: Cow<'static, str>,
    /// Byte range into the source.
    pub range: Range<usize>,
    /// Link or image destination.
    pub destination: Option<Destination>,
}

impl Span {
    /// Create a span.
    pub fn new(kind: impl Into<Cow<'static, str>>, range: Range<usize>) -> Self {
        Self {
            kind: kind.into(),
            range,
            destination: None,
        }
    }

    /// Attach a link destination.
    #[must_use]
    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = Some(destination);
        self
    }
}

#[derive(Clone, Debug)]
struct NodeData {
    kind: Cow<'static, str>,
    range: Range<usize>,
    destination: Option<Destination>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Immutable syntax tree over a source string.
///
/// The root is always a [`kind::DOCUMENT`] node spanning the whole source.
/// Nodes are stored in pre-order, so [`NodeId`] order is document order.
#[derive(Clone)]
pub struct Tree {
    source: String,
    nodes: Vec<NodeData>,
}

impl Tree {
    /// Assemble a tree from flat spans.
    ///
    /// Spans are nested by containment: each span becomes a child of the
    /// smallest earlier span that contains it. Spans with equal ranges nest in
    /// the order given. Empty spans, spans outside the source, and spans that
    /// partially overlap a sibling are dropped.
    ///
    /// # Example
    ///
    /// ```
    /// use inkset_tree::{Span, Tree};
    ///
    /// let tree = Tree::from_spans(
    ///     "**hi**",
    ///     vec![
    ///         Span::new("StrongEmphasis", 0..6),
    ///         Span::new("EmphasisMark", 0..2),
    ///         Span::new("EmphasisMark", 4..6),
    ///     ],
    /// );
    ///
    /// let strong = tree.root().child("StrongEmphasis").unwrap();
    /// assert_eq!(strong.children().count(), 2);
    /// ```
    pub fn from_spans(source: impl Into<String>, spans: impl IntoIterator<Item = Span>) -> Self {
        let source = source.into();
        let len = source.len();

        let mut spans: Vec<(usize, Span)> = spans
            .into_iter()
            .filter(|span| span.range.start < span.range.end && span.range.end <= len)
            .enumerate()
            .collect();
        spans.sort_by_key(|(order, span)| (span.range.start, Reverse(span.range.end), *order));

        let mut nodes = vec![NodeData {
            kind: Cow::Borrowed(kind::DOCUMENT),
            range: 0..len,
            destination: None,
            parent: None,
            children: Vec::new(),
        }];
        let mut stack = vec![NodeId(0)];

        for (_, span) in spans {
            let mut overlaps = false;
            while let Some(&top) = stack.last() {
                let top_range = &nodes[top.0].range;
                if span.range.end <= top_range.end {
                    break;
                }
                if top.0 != 0 && span.range.start < top_range.end {
                    overlaps = true;
                    break;
                }
                stack.pop();
            }
            let Some(&parent) = stack.last() else {
                continue;
            };
            if overlaps {
                tracing::trace!(kind = %span.kind, ?span.range, "Dropping overlapping span");
                continue;
            }

            let id = NodeId(nodes.len());
            nodes.push(NodeData {
                kind: span.kind,
                range: span.range,
                destination: span.destination,
                parent: Some(parent),
                children: Vec::new(),
            });
            nodes[parent.0].children.push(id);
            stack.push(id);
        }

        Self { source, nodes }
    }

    /// The full source text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Slice the source, returning an empty string for invalid ranges.
    #[must_use]
    pub fn slice(&self, range: Range<usize>) -> &str {
        self.source.get(range).unwrap_or_default()
    }

    /// The document root.
    #[must_use]
    pub fn root(&self) -> Node<'_> {
        Node {
            tree: self,
            id: NodeId(0),
        }
    }

    /// Look up a node by id.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<Node<'_>> {
        (id.0 < self.nodes.len()).then_some(Node { tree: self, id })
    }

    /// Number of nodes, including the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree only contains the root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// All nodes in document (pre-)order, root first.
    pub fn iter(&self) -> impl Iterator<Item = Node<'_>> {
        (0..self.nodes.len()).map(|i| Node {
            tree: self,
            id: NodeId(i),
        })
    }

    /// All nodes of one type in document order.
    pub fn nodes_of<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = Node<'a>> + 'a {
        self.iter().filter(move |node| node.is(kind))
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_node(node: Node<'_>, depth: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            writeln!(f, "{:indent$}{node:?}", "", indent = depth * 2)?;
            node.children()
                .try_for_each(|child| write_node(child, depth + 1, f))
        }
        write_node(self.root(), 0, f)
    }
}

/// Borrowed handle to one node of a [`Tree`].
#[derive(Clone, Copy)]
pub struct Node<'t> {
    tree: &'t Tree,
    id: NodeId,
}

impl<'t> Node<'t> {
    fn data(&self) -> &'t NodeData {
        &self.tree.nodes[self.id.0]
    }

    /// Node id.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Owning tree.
    #[must_use]
    pub fn tree(&self) -> &'t Tree {
        self.tree
    }

    /// Node type name.
    #[must_use]
    pub fn kind(&self) -> &'t str {
        &self.data().kind
    }

    /// Check the node type name.
    #[must_use]
    pub fn is(&self, kind: &str) -> bool {
        self.kind() == kind
    }

    /// Byte range of the node.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.data().range.clone()
    }

    /// Range start.
    #[must_use]
    pub fn start(&self) -> usize {
        self.data().range.start
    }

    /// Range end (exclusive).
    #[must_use]
    pub fn end(&self) -> usize {
        self.data().range.end
    }

    /// Source text covered by the node.
    #[must_use]
    pub fn text(&self) -> &'t str {
        self.tree.slice(self.range())
    }

    /// Destination of a link or image node.
    #[must_use]
    pub fn destination(&self) -> Option<&'t Destination> {
        self.data().destination.as_ref()
    }

    /// Parent node, `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Node<'t>> {
        self.data().parent.map(|id| Node {
            tree: self.tree,
            id,
        })
    }

    /// Direct children in document order.
    pub fn children(self) -> impl DoubleEndedIterator<Item = Node<'t>> + 't {
        let tree = self.tree;
        self.data()
            .children
            .iter()
            .map(move |&id| Node { tree, id })
    }

    /// Whether the node has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.data().children.is_empty()
    }

    /// First direct child with the given type.
    #[must_use]
    pub fn child(self, kind: &str) -> Option<Node<'t>> {
        self.children().find(|child| child.is(kind))
    }

    /// Last direct child with the given type.
    #[must_use]
    pub fn last_child(self, kind: &str) -> Option<Node<'t>> {
        self.children().rev().find(|child| child.is(kind))
    }

    /// All direct children with the given type.
    pub fn children_of<'k>(self, kind: &'k str) -> impl Iterator<Item = Node<'t>> + 'k
    where
        't: 'k,
    {
        self.children().filter(move |child| child.is(kind))
    }

    /// All descendants in pre-order, excluding this node.
    #[must_use]
    pub fn descendants(self) -> Descendants<'t> {
        Descendants {
            tree: self.tree,
            stack: self.data().children.iter().rev().copied().collect(),
        }
    }

    /// Ancestors from the parent up to the root.
    pub fn ancestors(self) -> impl Iterator<Item = Node<'t>> + 't {
        std::iter::successors(self.parent(), Node::parent)
    }

    /// Whether `range` lies inside this node.
    #[must_use]
    pub fn contains(&self, range: &Range<usize>) -> bool {
        self.start() <= range.start && range.end <= self.end()
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for Node<'_> {}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:?}", self.kind(), self.range())
    }
}

/// Pre-order iterator over a node's descendants.
pub struct Descendants<'t> {
    tree: &'t Tree,
    stack: Vec<NodeId>,
}

impl<'t> Iterator for Descendants<'t> {
    type Item = Node<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.nodes[id.0].children.iter().rev().copied());
        Some(Node {
            tree: self.tree,
            id,
        })
    }
}
