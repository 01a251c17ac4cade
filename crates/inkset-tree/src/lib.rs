//! Typed, ranged markdown syntax tree.
//!
//! This crate provides the read-only tree consumed by the inkset engine:
//! every node has a type name and a byte range into the source text, ordered
//! children, and named-child lookup.
//!
//! Trees come from two places:
//! - [`MarkdownParser`]: an adapter over `pulldown-cmark` that turns its
//!   offset-annotated event stream into nodes, adding syntax-marker children
//!   (`HeaderMark`, `EmphasisMark`, `CodeMark`, ...) derived from the source.
//! - [`Tree::from_spans`]: assembles a tree from flat `(type, range)` spans,
//!   for hosts that bring their own parser.
//!
//! # Example
//!
//! ```
//! use inkset_tree::{MarkdownParser, kind};
//!
//! let parser = MarkdownParser::new();
//! let tree = parser.parse("# Hello");
//!
//! let heading = tree.root().child(kind::heading(1)).unwrap();
//! assert_eq!(heading.range(), 0..7);
//! assert_eq!(heading.child(kind::HEADER_MARK).unwrap().text(), "#");
//! ```

mod collect;
pub mod kind;
mod parser;
mod tree;

pub use parser::{MarkdownParser, SyntaxError, SyntaxExtension};
pub use tree::{Descendants, Destination, Node, NodeId, Span, Tree};
