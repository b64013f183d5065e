//! Specialized collection types
//!
//! [`Registry`] is the engine's replacement for an intrusive linked list:
//! entries live in a generational slot map and are chained in insertion
//! order, so removal through a handle is O(1) and never reorders the
//! remaining entries.

use slotmap::{new_key_type, SlotMap};
use thiserror::Error;

new_key_type! {
    /// Stable handle to a registry entry
    ///
    /// Generational: a handle that was removed never aliases a later entry.
    pub struct RegistryHandle;
}

/// Registry errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// The handle was never issued by this registry or was already removed
    #[error("invalid registry handle: {0:?}")]
    InvalidHandle(RegistryHandle),
}

#[derive(Debug, Clone)]
struct Node<T> {
    value: T,
    prev: Option<RegistryHandle>,
    next: Option<RegistryHandle>,
}

/// Insertion-ordered registry with O(1) removal by handle
#[derive(Debug, Clone)]
pub struct Registry<T> {
    nodes: SlotMap<RegistryHandle, Node<T>>,
    head: Option<RegistryHandle>,
    tail: Option<RegistryHandle>,
}

impl<T> Registry<T> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            head: None,
            tail: None,
        }
    }

    /// Append a value and return its handle
    pub fn insert(&mut self, value: T) -> RegistryHandle {
        let prev = self.tail;
        let handle = self.nodes.insert(Node { value, prev, next: None });

        match prev.and_then(|tail| self.nodes.get_mut(tail)) {
            Some(tail_node) => tail_node.next = Some(handle),
            None => self.head = Some(handle),
        }
        self.tail = Some(handle);
        handle
    }

    /// Unlink and return the value behind `handle`
    pub fn remove(&mut self, handle: RegistryHandle) -> Result<T, RegistryError> {
        let node = self
            .nodes
            .remove(handle)
            .ok_or(RegistryError::InvalidHandle(handle))?;

        match node.prev.and_then(|prev| self.nodes.get_mut(prev)) {
            Some(prev_node) => prev_node.next = node.next,
            None => self.head = node.next,
        }
        match node.next.and_then(|next| self.nodes.get_mut(next)) {
            Some(next_node) => next_node.prev = node.prev,
            None => self.tail = node.prev,
        }

        Ok(node.value)
    }

    /// Whether `handle` is currently registered
    pub fn contains(&self, handle: RegistryHandle) -> bool {
        self.nodes.contains_key(handle)
    }

    /// Value behind `handle`
    pub fn get(&self, handle: RegistryHandle) -> Option<&T> {
        self.nodes.get(handle).map(|node| &node.value)
    }

    /// Number of registered entries
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate values in insertion order
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            registry: self,
            cursor: self.head,
        }
    }

    /// Iterate `(handle, value)` pairs in insertion order
    pub fn entries(&self) -> impl Iterator<Item = (RegistryHandle, &T)> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let handle = cursor?;
            let node = self.nodes.get(handle)?;
            cursor = node.next;
            Some((handle, &node.value))
        })
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.head = None;
        self.tail = None;
    }
}

impl<T: Copy> Registry<T> {
    /// Copy of the values in insertion order
    ///
    /// Used by the managers so that callbacks may register or unregister
    /// components while a pass is running.
    pub fn snapshot(&self) -> Vec<T> {
        self.iter().copied().collect()
    }
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Insertion-order iterator over a [`Registry`]
pub struct Iter<'a, T> {
    registry: &'a Registry<T>,
    cursor: Option<RegistryHandle>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.registry.nodes.get(self.cursor?)?;
        self.cursor = node.next;
        Some(&node.value)
    }
}

impl<'a, T> IntoIterator for &'a Registry<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iteration_follows_insertion_order() {
        let mut registry = Registry::new();
        for value in [3, 1, 2] {
            registry.insert(value);
        }
        assert_eq!(registry.snapshot(), vec![3, 1, 2]);
    }

    #[test]
    fn test_remove_middle_keeps_relative_order() {
        let mut registry = Registry::new();
        let a = registry.insert("a");
        let b = registry.insert("b");
        let c = registry.insert("c");

        assert_eq!(registry.remove(b), Ok("b"));
        assert_eq!(registry.snapshot(), vec!["a", "c"]);

        assert_eq!(registry.remove(a), Ok("a"));
        assert_eq!(registry.snapshot(), vec!["c"]);

        let d = registry.insert("d");
        assert_eq!(registry.snapshot(), vec!["c", "d"]);

        assert_eq!(registry.remove(d), Ok("d"));
        assert_eq!(registry.remove(c), Ok("c"));
        assert!(registry.is_empty());
        assert_eq!(registry.iter().count(), 0);
    }

    #[test]
    fn test_stale_handle_is_rejected() {
        let mut registry = Registry::new();
        let handle = registry.insert(7);
        registry.remove(handle).unwrap();

        assert_eq!(registry.remove(handle), Err(RegistryError::InvalidHandle(handle)));

        // A new entry may reuse the slot but not the generation
        let reused = registry.insert(8);
        assert_ne!(reused, handle);
        assert!(!registry.contains(handle));
        assert_eq!(registry.get(reused), Some(&8));
    }

    #[test]
    fn test_entries_report_handles() {
        let mut registry = Registry::new();
        let first = registry.insert('x');
        let second = registry.insert('y');
        let handles: Vec<_> = registry.entries().map(|(handle, _)| handle).collect();
        assert_eq!(handles, vec![first, second]);
    }
}
