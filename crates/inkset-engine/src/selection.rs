//! Host selection state and the reveal policy.

use std::ops::Range;

/// Selection ranges supplied by the host on every rebuild.
///
/// A caret is an empty range. The engine only tests overlap; it never
/// mutates the selection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    ranges: Vec<Range<usize>>,
}

impl Selection {
    /// Selection from arbitrary ranges. Reversed ranges are normalized.
    pub fn new(ranges: impl IntoIterator<Item = Range<usize>>) -> Self {
        let ranges = ranges
            .into_iter()
            .map(|r| r.start.min(r.end)..r.start.max(r.end))
            .collect();
        Self { ranges }
    }

    /// No selection at all; nothing is revealed.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// A single caret.
    #[must_use]
    pub fn caret(pos: usize) -> Self {
        Self {
            ranges: vec![pos..pos],
        }
    }

    /// The selection ranges, in the order given.
    #[must_use]
    pub fn ranges(&self) -> &[Range<usize>] {
        &self.ranges
    }

    /// Whether any selection range touches `range`.
    ///
    /// Both ends are inclusive, so a caret directly before or after a node
    /// reveals it.
    ///
    /// ```
    /// use inkset_engine::Selection;
    ///
    /// let bold = 0..8; // **bold**
    /// assert!(Selection::caret(8).reveals(&bold));
    /// assert!(!Selection::caret(9).reveals(&bold));
    /// assert!(!Selection::none().reveals(&bold));
    /// ```
    #[must_use]
    pub fn reveals(&self, range: &Range<usize>) -> bool {
        self.ranges
            .iter()
            .any(|r| r.start <= range.end && r.end >= range.start)
    }
}

/// Visible window of the host surface.
///
/// Annotation contributors skip nodes outside it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Viewport {
    range: Option<Range<usize>>,
}

impl Viewport {
    /// The whole document is visible.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Only `range` is visible.
    #[must_use]
    pub fn range(range: Range<usize>) -> Self {
        Self { range: Some(range) }
    }

    /// Whether a node range intersects the visible window.
    #[must_use]
    pub fn shows(&self, range: &Range<usize>) -> bool {
        self.range
            .as_ref()
            .is_none_or(|v| range.start < v.end && range.end > v.start)
    }
}
