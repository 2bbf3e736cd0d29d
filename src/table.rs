//! Table: text-keyed hash table with separate chaining over `DynamicArray`.

use crate::builder::TableBuilder;
use crate::cursor::{Cursor, Iter};
use crate::dynamic_array::{Cleanup, DynamicArray};
use crate::error::{InsertError, SetError};
use crate::hash::bucket_index;
use core::fmt;
use core::mem;
use std::rc::Rc;

/// A stored key/value pair. The key is a private copy made on insert.
pub(crate) struct Item<V> {
    pub(crate) key: Box<str>,
    pub(crate) value: V,
}

/// Chain of items that share a bucket index under the current capacity.
struct Bucket<V> {
    items: DynamicArray<Item<V>>,
}

impl<V: 'static> Bucket<V> {
    /// The item array destroys values through the table's cleanup, if any.
    fn new(cleanup: Option<&Cleanup<V>>) -> Self {
        let items = match cleanup {
            Some(cleanup) => {
                let cleanup = cleanup.clone();
                let release: Cleanup<Item<V>> = Rc::new(move |item: Item<V>| cleanup(item.value));
                DynamicArray::with_cleanup(release)
            }
            None => DynamicArray::new(),
        };
        Bucket { items }
    }
}

impl<V> Bucket<V> {
    fn position(&self, key: &str) -> Option<usize> {
        self.items.iter().position(|item| &*item.key == key)
    }
}

/// Load statistics over the bucket chains.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ChainStats {
    pub capacity: usize,
    pub len: usize,
    pub occupied_buckets: usize,
    pub longest_chain: usize,
    /// Sum over occupied buckets of `chain length - 1`.
    pub total_collisions: usize,
}

/// Hash table keyed by text that owns its values.
///
/// - `add` never overwrites and `set` never inserts.
/// - Capacity doubles once `len >= capacity * 3 / 4` after an insert and
///   halves once `len <= capacity / 4` after a removal, never going below
///   the initial capacity.
/// - Values leave the table through the cleanup callback (on `remove`,
///   overwrite in `set`, and drop) unless moved out with `take`.
pub struct Table<V> {
    buckets: DynamicArray<Option<Bucket<V>>>,
    initial_capacity: usize,
    len: usize,
    cleanup: Option<Cleanup<V>>,
}

impl<V: 'static> Table<V> {
    /// Table with `initial_capacity` buckets and no cleanup; values are
    /// dropped normally.
    pub fn new(initial_capacity: usize) -> Self {
        Self::from_parts(initial_capacity, None)
    }

    /// Table that hands every destroyed value to `cleanup`.
    pub fn with_cleanup<F>(initial_capacity: usize, cleanup: F) -> Self
    where
        F: Fn(V) + 'static,
    {
        let cleanup: Cleanup<V> = Rc::new(cleanup);
        Self::from_parts(initial_capacity, Some(cleanup))
    }

    pub fn builder() -> TableBuilder<V> {
        TableBuilder::new()
    }

    pub(crate) fn from_parts(initial_capacity: usize, cleanup: Option<Cleanup<V>>) -> Self {
        let table = Self::with_floor(initial_capacity, initial_capacity, cleanup);
        tracing::trace!(
            capacity = initial_capacity,
            cleanup = table.cleanup.is_some(),
            "created table"
        );
        table
    }

    fn with_floor(capacity: usize, initial_capacity: usize, cleanup: Option<Cleanup<V>>) -> Self {
        assert!(capacity > 0, "table capacity must be positive");
        Self {
            buckets: DynamicArray::with_len(capacity),
            initial_capacity,
            len: 0,
            cleanup,
        }
    }

    /// Insert a new key. Fails, returning the value, if the key is empty or
    /// already present; the table is left untouched in that case.
    pub fn add(&mut self, key: &str, value: V) -> Result<(), InsertError<V>> {
        if key.is_empty() {
            return Err(InsertError::EmptyKey(value));
        }
        let idx = bucket_index(self.capacity(), key);
        if self.bucket(idx).and_then(|b| b.position(key)).is_some() {
            return Err(InsertError::DuplicateKey(value));
        }
        self.place(
            idx,
            Item {
                key: Box::from(key),
                value,
            },
        );
        self.len += 1;

        let capacity = self.capacity();
        if self.len >= capacity * 3 / 4 {
            self.resize(capacity * 2);
        }
        Ok(())
    }

    /// Overwrite the value of an existing key, destroying the old value.
    /// Missing keys are not inserted.
    pub fn set(&mut self, key: &str, value: V) -> Result<(), SetError<V>> {
        if key.is_empty() {
            return Err(SetError::EmptyKey(value));
        }
        let Some((b, i)) = self.locate(key) else {
            return Err(SetError::MissingKey(value));
        };
        let Some(item) = self.bucket_mut(b).and_then(|bucket| bucket.items.get_mut(i)) else {
            return Err(SetError::MissingKey(value));
        };
        let old = mem::replace(&mut item.value, value);
        self.dispose(old);
        Ok(())
    }

    /// Remove a key and destroy its value. Returns false if it was absent.
    pub fn remove(&mut self, key: &str) -> bool {
        let Some((b, i)) = self.locate(key) else {
            return false;
        };
        let Some(item) = self.bucket_mut(b).and_then(|bucket| bucket.items.take_at(i)) else {
            return false;
        };
        // Unlinked before the cleanup runs; the cleanup may panic.
        self.unlinked(b);
        self.dispose(item.value);
        true
    }

    /// Remove a key and hand its value back without cleanup.
    pub fn take(&mut self, key: &str) -> Option<V> {
        let (b, i) = self.locate(key)?;
        let item = self.bucket_mut(b)?.items.take_at(i)?;
        self.unlinked(b);
        Some(item.value)
    }

    /// Destroy every value and free the table.
    pub fn release(self) {
        tracing::trace!(items = self.len, "releasing table");
        drop(self)
    }

    fn dispose(&self, value: V) {
        match &self.cleanup {
            Some(cleanup) => cleanup(value),
            None => drop(value),
        }
    }

    /// Append `item` to bucket `idx`, creating the bucket on first use.
    fn place(&mut self, idx: usize, item: Item<V>) {
        let cleanup = self.cleanup.as_ref();
        let Some(slot) = self.buckets.get_mut(idx) else {
            unreachable!("bucket index {idx} past capacity");
        };
        slot.get_or_insert_with(|| Bucket::new(cleanup))
            .items
            .push(item);
    }

    /// Bookkeeping after an item left bucket `b`: drop the bucket if it is
    /// now empty, then shrink if the table became sparse.
    fn unlinked(&mut self, b: usize) {
        if let Some(slot) = self.buckets.get_mut(b) {
            if slot.as_ref().is_some_and(|bucket| bucket.items.is_empty()) {
                *slot = None;
            }
        }
        self.len -= 1;

        let capacity = self.capacity();
        if capacity > self.initial_capacity && self.len <= capacity / 4 {
            self.resize((capacity / 2).max(self.initial_capacity));
        }
    }

    /// Rebuild into `capacity` buckets. Items are moved, never destroyed:
    /// only the emptied bucket shells of the old table are dropped.
    fn resize(&mut self, capacity: usize) {
        let from = self.capacity();
        let mut next = Self::with_floor(capacity, self.initial_capacity, self.cleanup.clone());
        for slot in self.buckets.iter_mut() {
            let Some(bucket) = slot.take() else {
                continue;
            };
            for item in bucket.items.into_vec() {
                let idx = bucket_index(capacity, &item.key);
                next.place(idx, item);
                next.len += 1;
            }
        }
        debug_assert_eq!(next.len, self.len, "resize must not lose items");
        tracing::debug!(
            direction = if capacity > from { "grow" } else { "shrink" },
            from,
            to = capacity,
            items = next.len,
            "resized table"
        );
        *self = next;
    }
}

impl<V> Table<V> {
    /// Number of live keys.
    pub fn len(&self) -> usize {
        self.len
    }
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current number of buckets.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Floor below which the table never shrinks.
    pub fn initial_capacity(&self) -> usize {
        self.initial_capacity
    }

    pub fn has_cleanup(&self) -> bool {
        self.cleanup.is_some()
    }

    fn bucket(&self, b: usize) -> Option<&Bucket<V>> {
        self.buckets.get(b).and_then(Option::as_ref)
    }

    fn bucket_mut(&mut self, b: usize) -> Option<&mut Bucket<V>> {
        self.buckets.get_mut(b).and_then(Option::as_mut)
    }

    /// `(bucket, position in chain)` of `key`.
    fn locate(&self, key: &str) -> Option<(usize, usize)> {
        if key.is_empty() {
            return None;
        }
        let b = bucket_index(self.capacity(), key);
        let i = self.bucket(b)?.position(key)?;
        Some((b, i))
    }

    pub(crate) fn item_at(&self, b: usize, i: usize) -> Option<&Item<V>> {
        self.bucket(b)?.items.get(i)
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        let (b, i) = self.locate(key)?;
        self.item_at(b, i).map(|item| &item.value)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let (b, i) = self.locate(key)?;
        self.bucket_mut(b)?.items.get_mut(i).map(|item| &mut item.value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.locate(key).is_some()
    }

    /// Cursor over values in bucket order.
    pub fn cursor(&self) -> Cursor<'_, V> {
        Cursor::new(self)
    }

    /// `(key, value)` pairs in the same order as `cursor`.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter::new(self.cursor())
    }

    pub fn chain_stats(&self) -> ChainStats {
        let mut stats = ChainStats {
            capacity: self.capacity(),
            len: self.len,
            ..ChainStats::default()
        };
        for bucket in self.buckets.iter().flatten() {
            let chain = bucket.items.len();
            stats.occupied_buckets += 1;
            stats.longest_chain = stats.longest_chain.max(chain);
            stats.total_collisions += chain.saturating_sub(1);
        }
        stats
    }
}

impl<V: 'static> Default for Table<V> {
    fn default() -> Self {
        TableBuilder::new().build()
    }
}

impl<V: fmt::Debug> fmt::Debug for Table<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, V> IntoIterator for &'a Table<V> {
    type Item = (&'a str, &'a V);
    type IntoIter = Iter<'a, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::BTreeSet;

    fn counting_table(capacity: usize) -> (Table<String>, Rc<RefCell<Vec<String>>>) {
        let released = Rc::new(RefCell::new(Vec::new()));
        let sink = released.clone();
        let t = Table::with_cleanup(capacity, move |v: String| sink.borrow_mut().push(v));
        (t, released)
    }

    fn snapshot<V: Clone + Ord>(t: &Table<V>) -> BTreeSet<(String, V)> {
        t.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    /// Invariant: duplicate keys are rejected, the value comes back, and the
    /// table is unchanged.
    #[test]
    fn duplicate_add_rejected() {
        let mut t: Table<i32> = Table::new(8);
        t.add("dup", 1).unwrap();
        match t.add("dup", 2) {
            Err(InsertError::DuplicateKey(v)) => assert_eq!(v, 2),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(t.get("dup"), Some(&1));
        assert_eq!(t.len(), 1);
        assert_eq!(t.capacity(), 8);
    }

    #[test]
    fn empty_key_is_rejected_everywhere() {
        let mut t: Table<i32> = Table::new(4);
        assert_eq!(t.add("", 1), Err(InsertError::EmptyKey(1)));
        assert_eq!(t.set("", 2), Err(SetError::EmptyKey(2)));
        assert_eq!(t.get(""), None);
        assert!(!t.remove(""));
        assert_eq!(t.take(""), None);
        assert!(t.is_empty());
    }

    /// Invariant: capacity doubles on the insert that reaches `cap * 3 / 4`.
    #[test]
    fn grows_at_three_quarters() {
        let mut t: Table<u32> = Table::new(4);
        t.add("a", 1).unwrap();
        t.add("b", 2).unwrap();
        assert_eq!(t.capacity(), 4);
        t.add("c", 3).unwrap();
        assert_eq!(t.capacity(), 8);
        assert_eq!(t.len(), 3);
        for (k, v) in [("a", 1), ("b", 2), ("c", 3)] {
            assert_eq!(t.get(k), Some(&v));
        }
    }

    /// Invariant: a one-bucket table grows on every early insert and shrinks
    /// back to exactly one bucket once emptied.
    #[test]
    fn single_bucket_grow_and_shrink_cycle() {
        let mut t: Table<u8> = Table::new(1);
        let keys = ["w", "x", "y", "z"];
        let mut caps = Vec::new();
        for (i, k) in keys.iter().enumerate() {
            t.add(k, i as u8).unwrap();
            caps.push(t.capacity());
        }
        assert_eq!(caps, vec![2, 4, 8, 8]);

        caps.clear();
        for k in keys {
            assert!(t.remove(k));
            caps.push(t.capacity());
        }
        assert_eq!(caps, vec![8, 4, 2, 1]);
        assert!(t.is_empty());
    }

    /// Invariant: shrinking halves capacity but never below the initial one.
    #[test]
    fn shrink_stops_at_initial_capacity() {
        let mut t: Table<usize> = Table::new(3);
        for i in 0..40 {
            t.add(&format!("k{i}"), i).unwrap();
        }
        assert!(t.capacity() > 3);
        for i in 0..40 {
            assert!(t.remove(&format!("k{i}")));
            assert!(t.capacity() >= 3);
        }
        assert_eq!(t.capacity(), 3);
        assert_eq!(t.len(), 0);
    }

    #[test]
    fn missing_key_operations_are_noops() {
        let mut t: Table<i32> = Table::new(4);
        t.add("present", 1).unwrap();
        assert!(!t.remove("absent"));
        assert_eq!(t.take("absent"), None);
        assert_eq!(t.set("absent", 5), Err(SetError::MissingKey(5)));
        assert!(!t.contains_key("absent"));
        assert_eq!(t.len(), 1);
        assert_eq!(t.capacity(), 4);
    }

    /// Invariant: `set` destroys the previous value through cleanup.
    #[test]
    fn set_overwrites_and_cleans_old_value() {
        let (mut t, released) = counting_table(8);
        t.add("k", "old".to_string()).unwrap();
        t.set("k", "new".to_string()).unwrap();
        assert_eq!(t.get("k").map(String::as_str), Some("new"));
        assert_eq!(*released.borrow(), vec!["old".to_string()]);
        assert_eq!(t.len(), 1);
    }

    /// Invariant: `remove` destroys through cleanup, `take` moves out.
    #[test]
    fn remove_cleans_take_moves() {
        let (mut t, released) = counting_table(8);
        t.add("a", "va".to_string()).unwrap();
        t.add("b", "vb".to_string()).unwrap();
        assert!(t.remove("a"));
        assert_eq!(t.take("b"), Some("vb".to_string()));
        assert_eq!(*released.borrow(), vec!["va".to_string()]);
        assert!(t.is_empty());
    }

    /// Invariant: resizing moves items without running cleanup; every value
    /// is destroyed exactly once when the table goes away.
    #[test]
    fn resize_never_invokes_cleanup() {
        let (mut t, released) = counting_table(2);
        for i in 0..64 {
            t.add(&format!("k{i}"), format!("v{i}")).unwrap();
        }
        for i in 0..60 {
            assert!(t.remove(&format!("k{i}")));
        }
        assert_eq!(released.borrow().len(), 60);
        t.release();
        let released = released.borrow();
        assert_eq!(released.len(), 64);
        let distinct: BTreeSet<&String> = released.iter().collect();
        assert_eq!(distinct.len(), 64, "no value destroyed twice");
    }

    /// Invariant: the observable (key, value) set survives grow and shrink.
    #[test]
    fn no_data_loss_across_resizes() {
        let mut t: Table<usize> = Table::new(5);
        t.add("key-0", 0).unwrap();
        t.add("key-1", 1).unwrap();
        let before = snapshot(&t);

        t.add("key-2", 2).unwrap();
        assert_eq!(t.capacity(), 10);
        let mut expected = before.clone();
        expected.insert(("key-2".to_string(), 2));
        assert_eq!(snapshot(&t), expected);

        assert!(t.remove("key-0"));
        assert_eq!(t.capacity(), 5);
        expected.remove(&("key-0".to_string(), 0));
        assert_eq!(snapshot(&t), expected);
    }

    /// Invariant: a bucket emptied by removal is cleared, not kept around.
    #[test]
    fn emptied_bucket_is_cleared() {
        let mut t: Table<i32> = Table::new(1000);
        t.add("only", 1).unwrap();
        assert_eq!(t.chain_stats().occupied_buckets, 1);
        assert!(t.remove("only"));
        let stats = t.chain_stats();
        assert_eq!(stats.occupied_buckets, 0);
        assert_eq!(stats.len, 0);
    }

    /// Invariant: chain statistics agree with len and count collisions as
    /// `chain - 1` per occupied bucket.
    #[test]
    fn chain_stats_on_crowded_table() {
        let mut t: Table<usize> = Table::new(1);
        for i in 0..20 {
            t.add(&format!("Domenico{i}"), i).unwrap();
        }
        let stats = t.chain_stats();
        assert_eq!(stats.len, 20);
        assert_eq!(stats.capacity, t.capacity());
        assert!(stats.occupied_buckets <= stats.capacity);
        assert_eq!(stats.total_collisions, stats.len - stats.occupied_buckets);
        assert!(stats.longest_chain >= 1);
    }

    #[test]
    fn get_mut_updates_in_place() {
        let mut t: Table<Vec<u8>> = Table::new(4);
        t.add("bytes", vec![1]).unwrap();
        t.get_mut("bytes").unwrap().push(2);
        assert_eq!(t.get("bytes"), Some(&vec![1, 2]));
        assert!(t.get_mut("nope").is_none());
    }

    #[test]
    fn drop_without_cleanup_drops_values() {
        let drops = Rc::new(Cell::new(0));
        struct Tracked(Rc<Cell<u32>>);
        impl Drop for Tracked {
            fn drop(&mut self) {
                self.0.set(self.0.get() + 1);
            }
        }
        {
            let mut t: Table<Tracked> = Table::new(2);
            for i in 0..10 {
                let added = t.add(&format!("t{i}"), Tracked(drops.clone()));
                assert!(added.is_ok());
            }
            assert_eq!(drops.get(), 0, "resizes must not drop values");
        }
        assert_eq!(drops.get(), 10);
    }

    #[test]
    #[should_panic(expected = "table capacity must be positive")]
    fn zero_capacity_is_fatal() {
        let _t: Table<()> = Table::new(0);
    }

    #[test]
    fn debug_lists_entries() {
        let mut t: Table<i32> = Table::new(4);
        t.add("k", 1).unwrap();
        assert_eq!(format!("{:?}", t), r#"{"k": 1}"#);
    }

    /// Invariant: the item is unlinked before its cleanup runs, so a
    /// cleanup that panics still leaves `len`, the buckets and iteration in
    /// agreement.
    #[test]
    fn panicking_cleanup_leaves_table_consistent() {
        use std::panic::{catch_unwind, AssertUnwindSafe};

        let mut t: Table<i32> = Table::with_cleanup(8, |v: i32| {
            if v == 1 {
                panic!("cleanup refused {v}");
            }
        });
        t.add("a", 1).unwrap();
        t.add("b", 2).unwrap();

        let res = catch_unwind(AssertUnwindSafe(|| t.remove("a")));
        assert!(res.is_err());
        assert_eq!(t.len(), 1);
        assert!(!t.contains_key("a"));
        assert_eq!(t.cursor().count(), 1);
        let stats = t.chain_stats();
        assert_eq!((stats.len, stats.occupied_buckets), (1, 1));
        assert!(t.remove("b"));
        assert!(t.is_empty());
    }
}
