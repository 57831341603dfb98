//! SkipList - probabilistically balanced ordered map
//!
//! Nodes are kept in an arena and addressed by [`NodeId`]. The header is not
//! a node: it is the `head` slot array, one entry per level, and a `None`
//! predecessor in the descent below always means "the header".
//!
//! ```text
//! level 3   head ----------------------------------> 50
//! level 2   head ----------> 10 -------------------> 50
//! level 1   head ---> 4 ---> 10 ---------> 30 -----> 50 ---------> 70
//! level 0   head ---> 4 ---> 10 ---> 20 -> 30 -> 40 > 50 ---> 60 > 70
//! ```

use crate::level::RandomLevel;
use crate::node::{Node, NodeId};
use crate::SkipListConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::borrow::Borrow;
use std::fmt;

/// Outcome of [`SkipList::insert`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertResult {
    /// The key was new and has been linked in
    Inserted,
    /// The key was already present; nothing changed
    AlreadyExists,
}

impl InsertResult {
    /// Returns true if a new entry was created
    pub fn is_inserted(&self) -> bool {
        matches!(self, InsertResult::Inserted)
    }
}

/// Outcome of [`SkipList::delete`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteResult {
    /// The key was present and has been unlinked
    Deleted,
    /// The key was not present; nothing changed
    NotFound,
}

impl DeleteResult {
    /// Returns true if an entry was removed
    pub fn is_deleted(&self) -> bool {
        matches!(self, DeleteResult::Deleted)
    }
}

/// An ordered map backed by a skip list.
///
/// Inserting an existing key is rejected and keeps the stored value (first
/// insert wins). The random source used for leveling is a type parameter so
/// tests can pass a seeded generator.
///
/// # Examples
///
/// ```
/// use skiplite_storage::{InsertResult, SkipList};
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
///
/// let mut list = SkipList::with_rng(8, StdRng::seed_from_u64(1));
/// assert_eq!(list.insert(1, "a"), InsertResult::Inserted);
/// assert_eq!(list.insert(1, "z"), InsertResult::AlreadyExists);
/// assert_eq!(list.get(&1), Some(&"a"));
/// ```
pub struct SkipList<K, V, R = StdRng> {
    /// Header slots, `max_level + 1` of them
    head: Vec<Option<NodeId>>,
    /// Node arena; `None` marks a free slot
    nodes: Vec<Option<Node<K, V>>>,
    /// Reclaimed arena slots
    free: Vec<NodeId>,
    /// Highest level currently populated by any node
    level: usize,
    len: usize,
    leveler: RandomLevel,
    rng: R,
}

impl<K: Ord, V> SkipList<K, V, StdRng> {
    /// Creates an empty list whose levels are drawn from an entropy-seeded RNG.
    ///
    /// # Panics
    ///
    /// Panics if `max_level` is zero.
    pub fn new(max_level: usize) -> Self {
        Self::with_rng(max_level, StdRng::from_entropy())
    }

    /// Creates an empty list from a configuration
    pub fn with_config(config: &SkipListConfig) -> Self {
        Self::new(config.max_level)
    }
}

impl<K: Ord, V> Default for SkipList<K, V, StdRng> {
    fn default() -> Self {
        Self::with_config(&SkipListConfig::default())
    }
}

impl<K: Ord, V, R: Rng> SkipList<K, V, R> {
    /// Creates an empty list that draws levels from `rng`.
    ///
    /// # Panics
    ///
    /// Panics if `max_level` is zero.
    pub fn with_rng(max_level: usize, rng: R) -> Self {
        let leveler = RandomLevel::new(max_level);
        Self {
            head: vec![None; max_level + 1],
            nodes: Vec::new(),
            free: Vec::new(),
            level: 0,
            len: 0,
            leveler,
            rng,
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the list holds no entries
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Highest level currently populated (0 when empty)
    pub fn level(&self) -> usize {
        self.level
    }

    /// Level ceiling fixed at construction
    pub fn max_level(&self) -> usize {
        self.leveler.max_level()
    }

    /// Draws a level for a new node
    pub fn random_level(&mut self) -> usize {
        self.leveler.draw(&mut self.rng)
    }

    /// Returns the value stored under `key`
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).map(|id| self.node(id).value())
    }

    /// Returns a mutable reference to the value stored under `key`
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let id = self.find(key)?;
        Some(self.node_mut(id).value_mut())
    }

    /// Returns true if `key` is present
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).is_some()
    }

    /// Returns the level of the node stored under `key`
    pub fn level_of<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).map(|id| self.node(id).level())
    }

    /// Inserts `key` unless it is already present.
    ///
    /// An existing entry is left untouched and `value` is dropped.
    pub fn insert(&mut self, key: K, value: V) -> InsertResult {
        let mut update: Vec<Option<NodeId>> = vec![None; self.max_level() + 1];
        let candidate = self.descend(&key, |level, pred| update[level] = pred);

        if let Some(id) = candidate {
            if self.node(id).key() == &key {
                return InsertResult::AlreadyExists;
            }
        }

        let level = self.random_level();
        if level > self.level {
            // Levels above the old top are entered straight from the header
            for slot in update.iter_mut().take(level + 1).skip(self.level + 1) {
                *slot = None;
            }
            self.level = level;
        }

        let id = self.alloc(Node::new(key, value, level));
        for (i, pred) in update.iter().copied().enumerate().take(level + 1) {
            let next = self.next(pred, i);
            self.node_mut(id).set_next(i, next);
            self.set_next(pred, i, Some(id));
        }

        self.len += 1;
        InsertResult::Inserted
    }

    /// Removes `key`, reporting whether it was present
    pub fn delete<Q>(&mut self, key: &Q) -> DeleteResult
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.remove(key) {
            Some(_) => DeleteResult::Deleted,
            None => DeleteResult::NotFound,
        }
    }

    /// Removes `key` and returns its value
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes `key` and returns the stored key and value
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut update: Vec<Option<NodeId>> = vec![None; self.max_level() + 1];
        let target = self.descend(key, |level, pred| update[level] = pred)?;
        if self.node(target).key().borrow() != key {
            return None;
        }

        // The target is linked on a contiguous run of levels starting at 0
        for (i, pred) in update.iter().copied().enumerate().take(self.level + 1) {
            if self.next(pred, i) != Some(target) {
                break;
            }
            let next = self.node(target).next(i);
            self.set_next(pred, i, next);
        }

        while self.level > 0 && self.head[self.level].is_none() {
            self.level -= 1;
        }

        let node = self.release(target);
        self.len -= 1;
        Some(node.into_parts())
    }

    /// Removes every entry
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.head.iter_mut().for_each(|slot| *slot = None);
        self.level = 0;
        self.len = 0;
    }

    /// Iterates entries in ascending key order (the level-0 chain)
    pub fn iter(&self) -> Iter<'_, K, V, R> {
        Iter {
            list: self,
            cursor: self.head[0],
            remaining: self.len,
        }
    }

    /// Keys reachable at `level`, in chain order
    pub fn keys_at_level(&self, level: usize) -> Vec<&K> {
        let mut keys = Vec::new();
        if level > self.max_level() {
            return keys;
        }
        let mut cursor = self.head[level];
        while let Some(id) = cursor {
            let node = self.node(id);
            keys.push(node.key());
            cursor = node.next(level);
        }
        keys
    }

    fn find<Q>(&self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.descend(key, |_, _| {})
            .filter(|&id| self.node(id).key().borrow() == key)
    }

    /// Walks from the top populated level down to 0, advancing while the
    /// next key is smaller than `key`. `record` sees the node the walk drops
    /// down from at every level. Returns the level-0 successor of the final
    /// position, the only possible match.
    fn descend<Q, F>(&self, key: &Q, mut record: F) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
        F: FnMut(usize, Option<NodeId>),
    {
        let mut current: Option<NodeId> = None;
        for level in (0..=self.level).rev() {
            while let Some(next) = self.next(current, level) {
                if self.node(next).key().borrow() < key {
                    current = Some(next);
                } else {
                    break;
                }
            }
            record(level, current);
        }
        self.next(current, 0)
    }

    fn alloc(&mut self, node: Node<K, V>) -> NodeId {
        debug_assert!(node.level() <= self.max_level());
        match self.free.pop() {
            Some(id) => {
                self.nodes[id] = Some(node);
                id
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        }
    }

    fn release(&mut self, id: NodeId) -> Node<K, V> {
        let node = self.nodes[id].take().expect("released a free node slot");
        self.free.push(id);
        node
    }
}

impl<K, V, R> SkipList<K, V, R> {
    fn node(&self, id: NodeId) -> &Node<K, V> {
        self.nodes[id].as_ref().expect("dangling node handle")
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        self.nodes[id].as_mut().expect("dangling node handle")
    }

    fn next(&self, at: Option<NodeId>, level: usize) -> Option<NodeId> {
        match at {
            None => self.head[level],
            Some(id) => self.node(id).next(level),
        }
    }

    fn set_next(&mut self, at: Option<NodeId>, level: usize, next: Option<NodeId>) {
        match at {
            None => self.head[level] = next,
            Some(id) => self.node_mut(id).set_next(level, next),
        }
    }
}

/// Iterator over the level-0 chain
pub struct Iter<'a, K, V, R> {
    list: &'a SkipList<K, V, R>,
    cursor: Option<NodeId>,
    remaining: usize,
}

impl<'a, K, V, R> Iterator for Iter<'a, K, V, R> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let node = self.list.node(id);
        self.cursor = node.next(0);
        self.remaining -= 1;
        Some((node.key(), node.value()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V, R> ExactSizeIterator for Iter<'_, K, V, R> {}

impl<'a, K: Ord, V, R: Rng> IntoIterator for &'a SkipList<K, V, R> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: fmt::Debug + Ord, V: fmt::Debug, R: Rng> fmt::Debug for SkipList<K, V, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// One line per populated level: `Level i: k:v;k:v;`
impl<K, V, R> fmt::Display for SkipList<K, V, R>
where
    K: fmt::Display,
    V: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for level in 0..=self.level {
            write!(f, "Level {}: ", level)?;
            let mut cursor = self.head[level];
            while let Some(id) = cursor {
                let node = self.node(id);
                write!(f, "{}:{};", node.key(), node.value())?;
                cursor = node.next(level);
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
