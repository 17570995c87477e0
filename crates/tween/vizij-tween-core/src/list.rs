//! Ordered collection with O(1) insertion and removal by handle.
//!
//! Nodes live in a [`SlotMap`] arena and link to their neighbours by key, so a
//! handle stays valid until its own node is removed and stale handles are
//! simply rejected.

use std::fmt;
use std::iter::FusedIterator;

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Opaque position of a value inside a [`HandleList`]
    pub struct NodeHandle;
}

struct Node<T> {
    value: T,
    prev: Option<NodeHandle>,
    next: Option<NodeHandle>,
}

/// Doubly-linked sequence addressed by [`NodeHandle`].
pub struct HandleList<T> {
    nodes: SlotMap<NodeHandle, Node<T>>,
    head: Option<NodeHandle>,
    tail: Option<NodeHandle>,
}

impl<T> Default for HandleList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HandleList<T> {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            head: None,
            tail: None,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.nodes.contains_key(handle)
    }

    #[inline]
    pub fn first(&self) -> Option<NodeHandle> {
        self.head
    }

    #[inline]
    pub fn last(&self) -> Option<NodeHandle> {
        self.tail
    }

    pub fn next(&self, handle: NodeHandle) -> Option<NodeHandle> {
        self.nodes.get(handle).and_then(|node| node.next)
    }

    pub fn prev(&self, handle: NodeHandle) -> Option<NodeHandle> {
        self.nodes.get(handle).and_then(|node| node.prev)
    }

    pub fn get(&self, handle: NodeHandle) -> Option<&T> {
        self.nodes.get(handle).map(|node| &node.value)
    }

    pub fn get_mut(&mut self, handle: NodeHandle) -> Option<&mut T> {
        self.nodes.get_mut(handle).map(|node| &mut node.value)
    }

    pub fn insert_first(&mut self, value: T) -> NodeHandle {
        let old_head = self.head;
        let handle = self.nodes.insert(Node {
            value,
            prev: None,
            next: old_head,
        });
        match old_head {
            Some(head) => self.nodes[head].prev = Some(handle),
            None => self.tail = Some(handle),
        }
        self.head = Some(handle);
        handle
    }

    pub fn insert_last(&mut self, value: T) -> NodeHandle {
        let old_tail = self.tail;
        let handle = self.nodes.insert(Node {
            value,
            prev: old_tail,
            next: None,
        });
        match old_tail {
            Some(tail) => self.nodes[tail].next = Some(handle),
            None => self.head = Some(handle),
        }
        self.tail = Some(handle);
        handle
    }

    /// Insert in front of `anchor`; a stale anchor inserts at the front.
    pub fn insert_before(&mut self, anchor: NodeHandle, value: T) -> NodeHandle {
        let Some(prev) = self.nodes.get(anchor).map(|node| node.prev) else {
            return self.insert_first(value);
        };
        let Some(prev) = prev else {
            return self.insert_first(value);
        };
        let handle = self.nodes.insert(Node {
            value,
            prev: Some(prev),
            next: Some(anchor),
        });
        self.nodes[prev].next = Some(handle);
        self.nodes[anchor].prev = Some(handle);
        handle
    }

    /// Insert behind `anchor`; a stale anchor inserts at the back.
    pub fn insert_after(&mut self, anchor: NodeHandle, value: T) -> NodeHandle {
        let Some(next) = self.nodes.get(anchor).map(|node| node.next) else {
            return self.insert_last(value);
        };
        let Some(next) = next else {
            return self.insert_last(value);
        };
        let handle = self.nodes.insert(Node {
            value,
            prev: Some(anchor),
            next: Some(next),
        });
        self.nodes[next].prev = Some(handle);
        self.nodes[anchor].next = Some(handle);
        handle
    }

    /// Swap the value at `handle`, returning the previous one.
    pub fn replace(&mut self, handle: NodeHandle, value: T) -> Option<T> {
        self.nodes
            .get_mut(handle)
            .map(|node| std::mem::replace(&mut node.value, value))
    }

    /// Unlink and return the value at `handle`. Stale handles yield `None`.
    pub fn remove(&mut self, handle: NodeHandle) -> Option<T> {
        let node = self.nodes.remove(handle)?;
        match node.prev {
            Some(prev) => self.nodes[prev].next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => self.nodes[next].prev = node.prev,
            None => self.tail = node.prev,
        }
        Some(node.value)
    }

    pub fn remove_first(&mut self) -> Option<T> {
        self.head.and_then(|head| self.remove(head))
    }

    pub fn remove_last(&mut self) -> Option<T> {
        self.tail.and_then(|tail| self.remove(tail))
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.head = None;
        self.tail = None;
    }

    /// Front-to-back iterator over `(handle, value)`.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            front: self.head,
            back: self.tail,
            remaining: self.len(),
        }
    }

    /// Handles in order, detached from the list's borrow.
    pub fn handles(&self) -> Vec<NodeHandle> {
        self.iter().map(|(handle, _)| handle).collect()
    }

    pub fn for_each(&self, mut f: impl FnMut(&T, usize, NodeHandle)) {
        for (index, (handle, value)) in self.iter().enumerate() {
            f(value, index, handle);
        }
    }

    pub fn for_each_rev(&self, mut f: impl FnMut(&T, usize, NodeHandle)) {
        for (index, (handle, value)) in self.iter().rev().enumerate() {
            f(value, index, handle);
        }
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T, usize, NodeHandle) -> U) -> Vec<U> {
        self.iter()
            .enumerate()
            .map(|(index, (handle, value))| f(value, index, handle))
            .collect()
    }

    pub fn map_rev<U>(&self, mut f: impl FnMut(&T, usize, NodeHandle) -> U) -> Vec<U> {
        self.iter()
            .rev()
            .enumerate()
            .map(|(index, (handle, value))| f(value, index, handle))
            .collect()
    }

    pub fn filter(&self, mut f: impl FnMut(&T, usize, NodeHandle) -> bool) -> Vec<&T> {
        self.iter()
            .enumerate()
            .filter(|(index, (handle, value))| f(*value, *index, *handle))
            .map(|(_, (_, value))| value)
            .collect()
    }

    pub fn filter_rev(&self, mut f: impl FnMut(&T, usize, NodeHandle) -> bool) -> Vec<&T> {
        self.iter()
            .rev()
            .enumerate()
            .filter(|(index, (handle, value))| f(*value, *index, *handle))
            .map(|(_, (_, value))| value)
            .collect()
    }

    pub fn reduce<A>(&self, initial: A, mut f: impl FnMut(A, &T, usize, NodeHandle) -> A) -> A {
        self.iter()
            .enumerate()
            .fold(initial, |acc, (index, (handle, value))| {
                f(acc, value, index, handle)
            })
    }

    pub fn reduce_rev<A>(
        &self,
        initial: A,
        mut f: impl FnMut(A, &T, usize, NodeHandle) -> A,
    ) -> A {
        self.iter()
            .rev()
            .enumerate()
            .fold(initial, |acc, (index, (handle, value))| {
                f(acc, value, index, handle)
            })
    }

    /// True when every value passes; stops at the first failure.
    pub fn every(&self, mut f: impl FnMut(&T, usize, NodeHandle) -> bool) -> bool {
        self.iter()
            .enumerate()
            .all(|(index, (handle, value))| f(value, index, handle))
    }

    pub fn every_rev(&self, mut f: impl FnMut(&T, usize, NodeHandle) -> bool) -> bool {
        self.iter()
            .rev()
            .enumerate()
            .all(|(index, (handle, value))| f(value, index, handle))
    }

    /// True when any value passes; stops at the first success.
    pub fn some(&self, mut f: impl FnMut(&T, usize, NodeHandle) -> bool) -> bool {
        self.iter()
            .enumerate()
            .any(|(index, (handle, value))| f(value, index, handle))
    }

    pub fn some_rev(&self, mut f: impl FnMut(&T, usize, NodeHandle) -> bool) -> bool {
        self.iter()
            .rev()
            .enumerate()
            .any(|(index, (handle, value))| f(value, index, handle))
    }
}

impl<T: fmt::Debug> fmt::Debug for HandleList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.iter().map(|(_, value)| value))
            .finish()
    }
}

impl<T> FromIterator<T> for HandleList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl<T> Extend<T> for HandleList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert_last(value);
        }
    }
}

impl<'a, T> IntoIterator for &'a HandleList<T> {
    type Item = (NodeHandle, &'a T);
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a [`HandleList`], walkable from both ends.
pub struct Iter<'a, T> {
    list: &'a HandleList<T>,
    front: Option<NodeHandle>,
    back: Option<NodeHandle>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (NodeHandle, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let handle = self.front?;
        let node = self.list.nodes.get(handle)?;
        self.front = node.next;
        self.remaining -= 1;
        Some((handle, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let handle = self.back?;
        let node = self.list.nodes.get(handle)?;
        self.back = node.prev;
        self.remaining -= 1;
        Some((handle, &node.value))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}
