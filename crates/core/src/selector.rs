//! Wording Selection
//!
//! All randomized choices (probe phrasing, suggestion text, topic and theme
//! picks) go through a [`Selector`], so tests can pin the choice and assert on
//! decision logic independently of phrasing.

use rand::Rng;

/// Picks an index in `0..len`. Implementations must return a value below `len`
/// whenever `len > 0`; callers never ask for a pick from an empty range.
pub trait Selector: Send + Sync {
    fn pick(&self, len: usize) -> usize;
}

/// Uniformly random selection backed by the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomSelector;

impl Selector for RandomSelector {
    fn pick(&self, len: usize) -> usize {
        rand::rng().random_range(0..len)
    }
}

/// Always picks the first candidate. Deterministic stand-in for tests and
/// reproducible runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstSelector;

impl Selector for FirstSelector {
    fn pick(&self, _len: usize) -> usize {
        0
    }
}

/// Chooses one element of `items`, or `None` when the slice is empty.
pub fn choose<'a, T>(selector: &dyn Selector, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    let index = selector.pick(items.len()).min(items.len() - 1);
    items.get(index)
}
