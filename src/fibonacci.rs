//! Fibonacci heap ("priority forest") implementation
//!
//! A Fibonacci heap is a data structure for priority queue operations with:
//! - O(1) amortized insert and decrease_key
//! - O(log n) amortized extract_min and delete
//!
//! The structure is a collection of heap-ordered trees. Roots are linked in a
//! circular doubly linked list, and so are the children of every entry. The
//! forest records which root holds the minimum key.
//!
//! # Storage
//!
//! Entries live in a [`SlotMap`] arena and refer to each other by slot key.
//! Parent, child and sibling links are plain keys, so the rings need no
//! reference counting and no `unsafe`.
//!
//! Every forest gets a process-unique id, and each [`EntryHandle`] records the
//! id of the forest that issued it. A handle is rejected with
//! [`Error::InvalidHandle`] when its entry has been extracted or deleted, and
//! when it is presented to any other forest.
//!
//! # Example
//!
//! ```rust
//! use rust_priority_forest::fibonacci::PriorityForest;
//!
//! let mut forest = PriorityForest::new();
//! let a = forest.insert("a", 5);
//! forest.insert("b", 3);
//! forest.decrease_key(a, 1).unwrap();
//! assert_eq!(forest.peek(), Some((&1, &"a")));
//! assert_eq!(forest.extract_min(), Some((1, "a")));
//! ```

use crate::error::{Error, Result};
use slotmap::{new_key_type, SecondaryMap, SlotMap};
use smallvec::{smallvec, SmallVec};
use std::mem;
use std::sync::atomic::{AtomicU64, Ordering};

new_key_type! {
    struct EntryKey;
}

static NEXT_FOREST_ID: AtomicU64 = AtomicU64::new(1);

fn next_forest_id() -> u64 {
    NEXT_FOREST_ID.fetch_add(1, Ordering::Relaxed)
}

/// Handle to an entry in a [`PriorityForest`]
///
/// A handle is only meaningful for the forest that issued it. Handles of a
/// forest consumed by [`merge`](PriorityForest::merge) or
/// [`absorb`](PriorityForest::absorb) are translated through the returned
/// [`HandleRemap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryHandle {
    forest: u64,
    key: EntryKey,
}

/// Golden ratio; a root of degree `d` spans at least `F(d + 2) >= φ^d` entries.
const PHI: f64 = 1.618_033_988_749_895;

#[derive(Debug, Clone)]
struct Entry<T, K> {
    data: T,
    key: K,
    parent: Option<EntryKey>,
    child: Option<EntryKey>,
    left: EntryKey,
    right: EntryKey,
    degree: usize,
    marked: bool,
}

/// Translates handles of a consumed forest into handles of the forest that
/// took over its entries
///
/// Returned by [`PriorityForest::merge`] and [`PriorityForest::absorb`].
#[derive(Debug, Clone)]
pub struct HandleRemap {
    from: u64,
    into: u64,
    map: SecondaryMap<EntryKey, EntryKey>,
}

impl HandleRemap {
    /// Returns the new handle for a live handle issued by the consumed forest
    ///
    /// Handles of any other forest, and handles whose entry was already gone
    /// before the merge, map to `None`.
    pub fn get(&self, old: EntryHandle) -> Option<EntryHandle> {
        if old.forest != self.from {
            return None;
        }
        self.map.get(old.key).map(|&key| EntryHandle {
            forest: self.into,
            key,
        })
    }

    /// Number of translated handles
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if the consumed forest was empty
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Fibonacci heap keyed by `K`, carrying a payload `T` per entry
///
/// A clone is a new forest: it holds copies of the entries but does not
/// accept handles of the forest it was cloned from.
///
/// # Example
///
/// ```rust
/// use rust_priority_forest::fibonacci::PriorityForest;
///
/// let mut low = PriorityForest::new();
/// low.insert('a', 8);
/// let mut high = PriorityForest::new();
/// let b = high.insert('b', 15);
///
/// let (mut merged, remap) = low.merge(high);
/// assert_eq!(merged.peek(), Some((&8, &'a')));
/// assert_eq!(merged.len(), 2);
///
/// let b = remap.get(b).unwrap();
/// merged.decrease_key(b, 1).unwrap();
/// assert_eq!(merged.peek(), Some((&1, &'b')));
/// ```
#[derive(Debug)]
pub struct PriorityForest<T, K: Ord> {
    id: u64,
    entries: SlotMap<EntryKey, Entry<T, K>>,
    min: Option<EntryKey>,
}

impl<T, K: Ord> Default for PriorityForest<T, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, K: Ord + Clone> Clone for PriorityForest<T, K> {
    fn clone(&self) -> Self {
        Self {
            id: next_forest_id(),
            entries: self.entries.clone(),
            min: self.min,
        }
    }
}

impl<T, K: Ord> PriorityForest<T, K> {
    /// Creates an empty forest
    pub fn new() -> Self {
        Self {
            id: next_forest_id(),
            entries: SlotMap::with_key(),
            min: None,
        }
    }

    /// Creates an empty forest with room for `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            id: next_forest_id(),
            entries: SlotMap::with_capacity_and_key(capacity),
            min: None,
        }
    }

    /// Returns true if the forest holds no entries
    pub fn is_empty(&self) -> bool {
        self.min.is_none()
    }

    /// Returns the number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if `handle` refers to a live entry of this forest
    pub fn contains(&self, handle: EntryHandle) -> bool {
        self.resolve(handle).is_some()
    }

    /// Returns the key and payload behind `handle`
    pub fn get(&self, handle: EntryHandle) -> Option<(&K, &T)> {
        let key = self.resolve(handle)?;
        let entry = &self.entries[key];
        Some((&entry.key, &entry.data))
    }

    /// Returns the minimum key and its payload without removing it
    ///
    /// # Time Complexity
    /// O(1)
    pub fn peek(&self) -> Option<(&K, &T)> {
        self.min.map(|min| {
            let entry = &self.entries[min];
            (&entry.key, &entry.data)
        })
    }

    /// Inserts `data` with ordering key `key`, returning its handle
    ///
    /// # Time Complexity
    /// O(1)
    pub fn insert(&mut self, data: T, key: K) -> EntryHandle {
        let slot = self.entries.insert_with_key(|slot| Entry {
            data,
            key,
            parent: None,
            child: None,
            left: slot,
            right: slot,
            degree: 0,
            marked: false,
        });

        match self.min {
            Some(min) => {
                self.insert_before(min, slot);
                if self.entries[slot].key < self.entries[min].key {
                    self.min = Some(slot);
                }
            }
            None => self.min = Some(slot),
        }

        self.handle(slot)
    }

    /// Removes and returns the entry with the minimum key
    ///
    /// The handle of the returned entry becomes invalid.
    ///
    /// # Time Complexity
    /// O(log n) amortized
    pub fn extract_min(&mut self) -> Option<(K, T)> {
        let min = self.min?;

        self.promote_children(min);

        let next = self.entries[min].right;
        if next == min {
            self.min = None;
        } else {
            self.unlink(min);
            self.min = Some(next);
            self.consolidate();
        }

        let entry = self.entries.remove(min)?;
        Some((entry.key, entry.data))
    }

    /// Lowers the key of the entry behind `handle` to `new_key`
    ///
    /// An equal key is accepted and leaves the structure untouched.
    ///
    /// # Errors
    /// - [`Error::InvalidHandle`] if the handle is not a live handle of this forest
    /// - [`Error::KeyIncreaseRejected`] if `new_key` is greater than the current
    ///   key; the entry keeps its old key
    ///
    /// # Time Complexity
    /// O(1) amortized
    pub fn decrease_key(&mut self, handle: EntryHandle, new_key: K) -> Result<()> {
        let slot = self.resolve(handle).ok_or(Error::InvalidHandle)?;
        let entry = &mut self.entries[slot];
        if new_key > entry.key {
            return Err(Error::KeyIncreaseRejected);
        }
        entry.key = new_key;
        let parent = entry.parent;

        if let Some(parent) = parent {
            if self.entries[slot].key < self.entries[parent].key {
                self.cut(slot, parent);
                self.cascading_cut(parent);
            }
        }

        if let Some(min) = self.min {
            if self.entries[slot].key < self.entries[min].key {
                self.min = Some(slot);
            }
        }

        Ok(())
    }

    /// Removes the entry behind `handle` regardless of its key
    ///
    /// Behaves as a decrease to a key below every other key followed by
    /// [`extract_min`](Self::extract_min).
    ///
    /// # Errors
    /// [`Error::InvalidHandle`] if the handle is not a live handle of this forest
    ///
    /// # Time Complexity
    /// O(log n) amortized
    pub fn delete(&mut self, handle: EntryHandle) -> Result<(K, T)> {
        let slot = self.resolve(handle).ok_or(Error::InvalidHandle)?;
        let parent = self.entries[slot].parent;

        if let Some(parent) = parent {
            self.cut(slot, parent);
            self.cascading_cut(parent);
        }
        self.min = Some(slot);

        self.extract_min().ok_or(Error::InvalidHandle)
    }

    /// Merges two forests into one, consuming both
    ///
    /// The result keeps accepting handles issued by `self`. Handles issued by
    /// `other` are rejected by the result; the returned [`HandleRemap`]
    /// translates them.
    pub fn merge(mut self, other: Self) -> (Self, HandleRemap) {
        let remap = self.absorb(other);
        (self, remap)
    }

    /// Moves every entry of `other` into this forest
    ///
    /// The root rings are spliced in O(1); moving the entries into this
    /// forest's arena is linear in `other.len()`. The returned map translates
    /// each handle issued by `other` into the matching handle of `self`.
    pub fn absorb(&mut self, other: Self) -> HandleRemap {
        let Self {
            id: other_id,
            entries,
            min: other_min,
        } = other;

        let mut remap = HandleRemap {
            from: other_id,
            into: self.id,
            map: SecondaryMap::with_capacity(entries.len()),
        };
        let mut moved = Vec::with_capacity(entries.len());
        for (old, entry) in entries {
            let new = self.entries.insert(entry);
            remap.map.insert(old, new);
            moved.push(new);
        }

        for new in moved {
            let entry = &mut self.entries[new];
            entry.left = remap.map[entry.left];
            entry.right = remap.map[entry.right];
            entry.parent = entry.parent.map(|p| remap.map[p]);
            entry.child = entry.child.map(|c| remap.map[c]);
        }

        if let Some(other_min) = other_min.map(|m| remap.map[m]) {
            match self.min {
                Some(min) => {
                    self.splice_rings(min, other_min);
                    if self.entries[other_min].key < self.entries[min].key {
                        self.min = Some(other_min);
                    }
                }
                None => self.min = Some(other_min),
            }
        }

        remap
    }

    /// Checks every structural invariant of the forest
    ///
    /// Walks the whole forest, so it is meant for tests and debugging:
    /// - heap order between every parent and child
    /// - `left`/`right` links agree around every ring
    /// - every degree equals the size of the child ring
    /// - the recorded minimum is the smallest root
    /// - every live entry is reached exactly once
    pub fn verify_invariants(&self) -> bool {
        let Some(min) = self.min else {
            return self.entries.is_empty();
        };
        if !self.entries.contains_key(min) {
            return false;
        }

        let mut pending = Vec::new();
        if self.verify_ring(min, None, &mut pending).is_none() {
            return false;
        }
        if pending
            .iter()
            .any(|&root| self.entries[root].key < self.entries[min].key)
        {
            return false;
        }

        let mut visited = 0usize;
        while let Some(slot) = pending.pop() {
            visited += 1;
            if visited > self.entries.len() {
                return false;
            }
            let entry = &self.entries[slot];
            let children = match entry.child {
                Some(child) => match self.verify_ring(child, Some(slot), &mut pending) {
                    Some(size) => size,
                    None => return false,
                },
                None => 0,
            };
            if children != entry.degree {
                return false;
            }
        }

        visited == self.entries.len()
    }

    /// Slot of a live entry behind a handle issued by this forest
    fn resolve(&self, handle: EntryHandle) -> Option<EntryKey> {
        (handle.forest == self.id && self.entries.contains_key(handle.key)).then_some(handle.key)
    }

    fn handle(&self, key: EntryKey) -> EntryHandle {
        EntryHandle {
            forest: self.id,
            key,
        }
    }

    /// Walks one sibling ring, pushing its members onto `pending`
    fn verify_ring(
        &self,
        start: EntryKey,
        parent: Option<EntryKey>,
        pending: &mut Vec<EntryKey>,
    ) -> Option<usize> {
        let mut size = 0usize;
        let mut current = start;
        loop {
            let entry = self.entries.get(current)?;
            if self.entries.get(entry.right)?.left != current
                || self.entries.get(entry.left)?.right != current
                || entry.parent != parent
            {
                return None;
            }
            if let Some(parent) = parent {
                if entry.key < self.entries[parent].key {
                    return None;
                }
            }

            pending.push(current);
            size += 1;
            if size > self.entries.len() {
                return None;
            }

            current = entry.right;
            if current == start {
                return Some(size);
            }
        }
    }

    /// Splices the singleton `node` into the ring of `anchor`, just left of it
    fn insert_before(&mut self, anchor: EntryKey, node: EntryKey) {
        let anchor_left = self.entries[anchor].left;
        let entry = &mut self.entries[node];
        entry.right = anchor;
        entry.left = anchor_left;
        self.entries[anchor_left].right = node;
        self.entries[anchor].left = node;
    }

    /// Detaches `node` from its ring, leaving it as a singleton ring
    fn unlink(&mut self, node: EntryKey) {
        let Entry { left, right, .. } = self.entries[node];
        self.entries[left].right = right;
        self.entries[right].left = left;
        let entry = &mut self.entries[node];
        entry.left = node;
        entry.right = node;
    }

    /// Joins the ring containing `a` with the ring containing `b`
    fn splice_rings(&mut self, a: EntryKey, b: EntryKey) {
        let a_left = self.entries[a].left;
        let b_left = self.entries[b].left;
        self.entries[a_left].right = b;
        self.entries[b].left = a_left;
        self.entries[b_left].right = a;
        self.entries[a].left = b_left;
    }

    /// Adds a singleton `node` to the root ring without touching the minimum
    fn add_root(&mut self, node: EntryKey) {
        match self.min {
            Some(min) => self.insert_before(min, node),
            None => self.min = Some(node),
        }
    }

    /// Moves every child of `node` into the root ring
    fn promote_children(&mut self, node: EntryKey) {
        let Some(child) = self.entries[node].child.take() else {
            return;
        };

        let mut current = child;
        loop {
            let entry = &mut self.entries[current];
            entry.parent = None;
            entry.marked = false;
            current = entry.right;
            if current == child {
                break;
            }
        }

        self.splice_rings(node, child);
        self.entries[node].degree = 0;
    }

    /// Links roots of equal degree until all root degrees are distinct
    fn consolidate(&mut self) {
        let Some(start) = self.min else {
            return;
        };

        let mut roots: SmallVec<[EntryKey; 32]> = SmallVec::new();
        let mut current = start;
        loop {
            roots.push(current);
            current = self.entries[current].right;
            if current == start {
                break;
            }
        }

        let bound = ((self.entries.len() as f64).ln() / PHI.ln()) as usize + 2;
        let mut by_degree: SmallVec<[Option<EntryKey>; 64]> = smallvec![None; bound];

        for root in roots {
            let mut x = root;
            let mut degree = self.entries[x].degree;
            loop {
                if degree >= by_degree.len() {
                    by_degree.resize(degree + 1, None);
                }
                let Some(mut y) = by_degree[degree].take() else {
                    break;
                };
                if self.entries[y].key < self.entries[x].key {
                    mem::swap(&mut x, &mut y);
                }
                self.link(y, x);
                degree += 1;
            }
            by_degree[degree] = Some(x);
        }

        let mut min: Option<EntryKey> = None;
        for root in by_degree.into_iter().flatten() {
            match min {
                Some(m) if self.entries[m].key <= self.entries[root].key => {}
                _ => min = Some(root),
            }
        }
        self.min = min;
    }

    /// Makes root `child` a child of root `parent`
    fn link(&mut self, child: EntryKey, parent: EntryKey) {
        self.unlink(child);

        let entry = &mut self.entries[child];
        entry.parent = Some(parent);
        entry.marked = false;

        match self.entries[parent].child {
            Some(first) => self.insert_before(first, child),
            None => self.entries[parent].child = Some(child),
        }
        self.entries[parent].degree += 1;
    }

    /// Detaches `node` from `parent` and makes it an unmarked root
    fn cut(&mut self, node: EntryKey, parent: EntryKey) {
        if self.entries[parent].child == Some(node) {
            let right = self.entries[node].right;
            self.entries[parent].child = if right == node { None } else { Some(right) };
        }
        self.unlink(node);
        self.entries[parent].degree -= 1;

        let entry = &mut self.entries[node];
        entry.parent = None;
        entry.marked = false;
        self.add_root(node);
    }

    /// Marks `node`, or cuts it if it already lost a child, walking upwards
    fn cascading_cut(&mut self, mut node: EntryKey) {
        while let Some(parent) = self.entries[node].parent {
            if !self.entries[node].marked {
                self.entries[node].marked = true;
                return;
            }
            self.cut(node, parent);
            node = parent;
        }
    }
}
