//! Builder for `Table` construction options.

use crate::dynamic_array::Cleanup;
use crate::table::Table;
use std::rc::Rc;

/// Initial bucket count when none is given.
pub const DEFAULT_INITIAL_CAPACITY: usize = 16;

/// Collects the construction options of a `Table`.
///
/// The load-factor thresholds are fixed (grow at 3/4, shrink at 1/4); only
/// the initial capacity and the cleanup callback are configurable.
pub struct TableBuilder<V> {
    initial_capacity: usize,
    cleanup: Option<Cleanup<V>>,
}

impl<V> TableBuilder<V> {
    pub fn new() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            cleanup: None,
        }
    }

    /// Bucket count at creation and the floor for shrinking. Must be
    /// positive; `build` panics otherwise.
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Callback that receives every value the table destroys.
    pub fn cleanup<F>(mut self, cleanup: F) -> Self
    where
        F: Fn(V) + 'static,
    {
        let cleanup: Cleanup<V> = Rc::new(cleanup);
        self.cleanup = Some(cleanup);
        self
    }

    /// Reuse a callback that is already shared with other containers.
    pub fn shared_cleanup(mut self, cleanup: Cleanup<V>) -> Self {
        self.cleanup = Some(cleanup);
        self
    }
}

impl<V: 'static> TableBuilder<V> {
    pub fn build(self) -> Table<V> {
        Table::from_parts(self.initial_capacity, self.cleanup)
    }
}

impl<V> Default for TableBuilder<V> {
    fn default() -> Self {
        Self::new()
    }
}
