//! Render pass generations.
//!
//! Each static render pass takes a [`PassToken`] from the engine's
//! [`Generation`] counter. Deferred results are only spliced into a pass's
//! output while that pass is still the newest one.

use std::cell::Cell;
use std::rc::Rc;

/// Monotonic render pass counter.
#[derive(Clone, Debug, Default)]
pub struct Generation {
    current: Rc<Cell<u64>>,
}

impl Generation {
    /// Create a counter at generation zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new pass, superseding all earlier ones.
    #[must_use]
    pub fn next(&self) -> PassToken {
        let pass = self.current.get() + 1;
        self.current.set(pass);
        PassToken {
            pass,
            current: Rc::clone(&self.current),
        }
    }

    /// Generation of the newest pass.
    #[must_use]
    pub fn current(&self) -> u64 {
        self.current.get()
    }
}

/// Stamp of one render pass.
#[derive(Clone, Debug)]
pub struct PassToken {
    pass: u64,
    current: Rc<Cell<u64>>,
}

impl PassToken {
    /// Generation of this pass.
    #[must_use]
    pub fn pass(&self) -> u64 {
        self.pass
    }

    /// Generation of the newest pass on the same counter.
    #[must_use]
    pub fn latest(&self) -> u64 {
        self.current.get()
    }

    /// Whether no newer pass has started.
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.current.get() == self.pass
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_pass_supersedes() {
        let generation = Generation::new();
        let first = generation.next();
        assert!(first.is_current());
        assert_eq!(first.pass(), 1);

        let second = generation.next();
        assert!(!first.is_current());
        assert!(second.is_current());
        assert_eq!(first.latest(), 2);
        assert_eq!(generation.current(), 2);
    }

    #[test]
    fn test_clones_share_counter() {
        let generation = Generation::new();
        let token = generation.next();
        let _ = generation.clone().next();
        assert!(!token.is_current());
    }
}
