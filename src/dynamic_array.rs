//! DynamicArray: growable, insertion-ordered owning sequence with an
//! optional cleanup callback bound at construction.
//!
//! Two ways of getting an element out:
//! - destroy: `remove_at`, `remove_value`, `set` (old value) and `Drop`
//!   hand the element to the cleanup callback when one is bound, and drop
//!   it otherwise.
//! - move: `take_at` and `into_vec` return elements to the caller and never
//!   call the cleanup callback. The table relies on this when it rehashes
//!   items into a new bucket array.

use crate::error::OutOfBounds;
use core::fmt;
use core::mem;
use std::rc::Rc;

/// Shared capability that knows how to dispose of an element.
pub type Cleanup<T> = Rc<dyn Fn(T)>;

pub struct DynamicArray<T> {
    elements: Vec<T>,
    cleanup: Option<Cleanup<T>>,
}

impl<T> DynamicArray<T> {
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
            cleanup: None,
        }
    }

    pub fn with_cleanup(cleanup: Cleanup<T>) -> Self {
        Self {
            elements: Vec::new(),
            cleanup: Some(cleanup),
        }
    }

    /// `len` default-initialized elements, e.g. `None` slots.
    pub fn with_len(len: usize) -> Self
    where
        T: Default,
    {
        let mut elements = Vec::with_capacity(len);
        elements.resize_with(len, T::default);
        Self {
            elements,
            cleanup: None,
        }
    }

    /// Like `with_len`, with a cleanup bound. The cleanup receives every
    /// element it destroys, default-filled ones included.
    pub fn with_len_and_cleanup(len: usize, cleanup: Cleanup<T>) -> Self
    where
        T: Default,
    {
        let mut a = Self::with_len(len);
        a.cleanup = Some(cleanup);
        a
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
    pub fn has_cleanup(&self) -> bool {
        self.cleanup.is_some()
    }

    fn destroy(&self, value: T) {
        match &self.cleanup {
            Some(cleanup) => cleanup(value),
            None => drop(value),
        }
    }

    pub fn push(&mut self, value: T) {
        self.elements.push(value);
    }

    pub fn push_front(&mut self, value: T) {
        self.elements.insert(0, value);
    }

    /// Insert before `index`, shifting later elements right. `index == len`
    /// appends.
    pub fn insert_at(&mut self, index: usize, value: T) -> Result<(), OutOfBounds<T>> {
        let len = self.elements.len();
        if index > len {
            return Err(OutOfBounds { index, len, value });
        }
        self.elements.insert(index, value);
        Ok(())
    }

    /// Remove and destroy the element at `index`. Returns false when out of
    /// range.
    pub fn remove_at(&mut self, index: usize) -> bool {
        match self.take_at(index) {
            Some(value) => {
                self.destroy(value);
                true
            }
            None => false,
        }
    }

    /// Remove the element at `index` and hand it back without cleanup.
    pub fn take_at(&mut self, index: usize) -> Option<T> {
        if index < self.elements.len() {
            Some(self.elements.remove(index))
        } else {
            None
        }
    }

    /// Remove and destroy the first element equal to `value`.
    pub fn remove_value(&mut self, value: &T) -> bool
    where
        T: PartialEq,
    {
        match self.index_of(value) {
            Some(i) => self.remove_at(i),
            None => false,
        }
    }

    pub fn index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.elements.iter().position(|e| e == value)
    }

    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.index_of(value).is_some()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.elements.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.elements.get_mut(index)
    }

    /// Replace the element at an existing index, destroying the old one.
    /// Never extends the array.
    pub fn set(&mut self, index: usize, value: T) -> Result<(), OutOfBounds<T>> {
        let len = self.elements.len();
        match self.elements.get_mut(index) {
            Some(slot) => {
                let old = mem::replace(slot, value);
                self.destroy(old);
                Ok(())
            }
            None => Err(OutOfBounds { index, len, value }),
        }
    }

    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.elements.iter()
    }

    pub fn iter_mut(&mut self) -> core::slice::IterMut<'_, T> {
        self.elements.iter_mut()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.elements
    }

    /// Move every element out, in order, without invoking cleanup.
    pub fn into_vec(mut self) -> Vec<T> {
        mem::take(&mut self.elements)
    }

    /// Destroy every element and free the storage.
    pub fn release(self) {
        drop(self)
    }
}

impl<T> Drop for DynamicArray<T> {
    fn drop(&mut self) {
        if let Some(cleanup) = self.cleanup.take() {
            for value in self.elements.drain(..) {
                cleanup(value);
            }
        }
    }
}

impl<T> Default for DynamicArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for DynamicArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicArray")
            .field("elements", &self.elements)
            .field("cleanup", &self.cleanup.is_some())
            .finish()
    }
}

impl<T> FromIterator<T> for DynamicArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            elements: iter.into_iter().collect(),
            cleanup: None,
        }
    }
}
