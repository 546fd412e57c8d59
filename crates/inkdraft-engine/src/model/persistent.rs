//! Persistent vector with path copying.
//!
//! A 32-way trie: every leaf holds up to 32 items and every branch up to 32
//! children. Only the last node on each level may be partially filled, so an
//! index is resolved by taking 5 bits per level. `set` copies the nodes on the
//! path from the root to one leaf and shares everything else with the
//! original, which keeps "copy with one change" at O(log n).

use std::fmt;
use std::sync::Arc;

const BITS: u32 = 5;
const WIDTH: usize = 1 << BITS;
const MASK: usize = WIDTH - 1;

enum Node<T> {
    Branch(Vec<Arc<Node<T>>>),
    Leaf(Vec<T>),
}

/// Immutable ordered sequence whose clones share storage.
pub struct PersistentVec<T> {
    root: Arc<Node<T>>,
    /// Bit shift applied at the root; zero when the root is a leaf.
    shift: u32,
    len: usize,
}

impl<T> PersistentVec<T> {
    pub fn new() -> Self {
        Self {
            root: Arc::new(Node::Leaf(Vec::new())),
            shift: 0,
            len: 0,
        }
    }

    /// Build a balanced trie from owned items.
    pub fn from_vec(items: Vec<T>) -> Self {
        let len = items.len();
        if len <= WIDTH {
            return Self {
                root: Arc::new(Node::Leaf(items)),
                shift: 0,
                len,
            };
        }

        let mut items = items.into_iter();
        let mut level: Vec<Arc<Node<T>>> = Vec::with_capacity(len.div_ceil(WIDTH));
        loop {
            let chunk: Vec<T> = items.by_ref().take(WIDTH).collect();
            if chunk.is_empty() {
                break;
            }
            level.push(Arc::new(Node::Leaf(chunk)));
        }

        let mut shift = 0;
        while level.len() > 1 {
            shift += BITS;
            let mut children = level.into_iter();
            let mut parents = Vec::new();
            loop {
                let chunk: Vec<Arc<Node<T>>> = children.by_ref().take(WIDTH).collect();
                if chunk.is_empty() {
                    break;
                }
                parents.push(Arc::new(Node::Branch(chunk)));
            }
            level = parents;
        }

        let root = level
            .pop()
            .unwrap_or_else(|| Arc::new(Node::Leaf(Vec::new())));
        Self { root, shift, len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }
        let mut node = &self.root;
        let mut shift = self.shift;
        loop {
            match node.as_ref() {
                Node::Branch(children) => {
                    node = &children[(index >> shift) & MASK];
                    shift -= BITS;
                }
                Node::Leaf(items) => return items.get(index & MASK),
            }
        }
    }

    pub fn first(&self) -> Option<&T> {
        self.get(0)
    }

    pub fn last(&self) -> Option<&T> {
        self.len.checked_sub(1).and_then(|index| self.get(index))
    }

    pub fn iter(&self) -> Iter<'_, T> {
        match self.root.as_ref() {
            Node::Leaf(items) => Iter {
                stack: Vec::new(),
                leaf: items.iter(),
            },
            Node::Branch(children) => Iter {
                stack: vec![children.iter()],
                leaf: Default::default(),
            },
        }
    }

    /// True when both vectors are the same snapshot (not merely equal).
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.root, &other.root)
    }
}

impl<T: Clone> PersistentVec<T> {
    pub fn repeat(value: T, count: usize) -> Self {
        Self::from_vec(vec![value; count])
    }

    /// Return a copy with the item at `index` replaced.
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn set(&self, index: usize, value: T) -> Self {
        assert!(
            index < self.len,
            "index {index} out of bounds for persistent vector of length {}",
            self.len
        );
        Self {
            root: set_in(&self.root, self.shift, index, value),
            shift: self.shift,
            len: self.len,
        }
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}

fn set_in<T: Clone>(node: &Arc<Node<T>>, shift: u32, index: usize, value: T) -> Arc<Node<T>> {
    match node.as_ref() {
        Node::Leaf(items) => {
            let mut items = items.clone();
            items[index & MASK] = value;
            Arc::new(Node::Leaf(items))
        }
        Node::Branch(children) => {
            let slot = (index >> shift) & MASK;
            let mut children = children.clone();
            children[slot] = set_in(&children[slot], shift - BITS, index, value);
            Arc::new(Node::Branch(children))
        }
    }
}

/// In-order iterator over a [`PersistentVec`].
pub struct Iter<'a, T> {
    stack: Vec<std::slice::Iter<'a, Arc<Node<T>>>>,
    leaf: std::slice::Iter<'a, T>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        loop {
            if let Some(item) = self.leaf.next() {
                return Some(item);
            }
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(child) => match child.as_ref() {
                    Node::Leaf(items) => self.leaf = items.iter(),
                    Node::Branch(children) => self.stack.push(children.iter()),
                },
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

impl<'a, T> IntoIterator for &'a PersistentVec<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<T> FromIterator<T> for PersistentVec<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<T> Clone for PersistentVec<T> {
    fn clone(&self) -> Self {
        Self {
            root: Arc::clone(&self.root),
            shift: self.shift,
            len: self.len,
        }
    }
}

impl<T> Default for PersistentVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialEq> PartialEq for PersistentVec<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && (self.ptr_eq(other) || self.iter().eq(other.iter()))
    }
}

impl<T: Eq> Eq for PersistentVec<T> {}

impl<T: fmt::Debug> fmt::Debug for PersistentVec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
