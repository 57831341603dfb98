//! Skip list nodes.
//!
//! Nodes live in the engine's arena and point at each other through
//! [`NodeId`] handles. Every level above 0 reuses a node already present in
//! the level-0 chain, so a handle never owns anything by itself.

/// Stable handle of a node inside the engine's arena.
pub type NodeId = usize;

/// A single key/value pair with one successor slot per level it occupies.
#[derive(Debug, Clone)]
pub struct Node<K, V> {
    key: K,
    value: V,
    /// `forward[i]` is the next node at level `i`, `None` at the tail.
    forward: Vec<Option<NodeId>>,
}

impl<K, V> Node<K, V> {
    /// Creates a node that participates in levels `0..=level`.
    ///
    /// Keeping `level` within the owning list's `max_level` is the caller's
    /// responsibility.
    pub fn new(key: K, value: V, level: usize) -> Self {
        Self {
            key,
            value,
            forward: vec![None; level + 1],
        }
    }

    /// Returns the key
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Returns the value
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Returns a mutable reference to the value
    pub fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    /// Replaces the value, returning the previous one
    pub fn set_value(&mut self, value: V) -> V {
        std::mem::replace(&mut self.value, value)
    }

    /// Highest level index this node participates in
    pub fn level(&self) -> usize {
        self.forward.len() - 1
    }

    /// Successor at `level`, or `None` at the tail or above the node's level
    pub fn next(&self, level: usize) -> Option<NodeId> {
        self.forward.get(level).copied().flatten()
    }

    pub(crate) fn set_next(&mut self, level: usize, next: Option<NodeId>) {
        self.forward[level] = next;
    }

    /// Consumes the node and returns its key and value
    pub fn into_parts(self) -> (K, V) {
        (self.key, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_new() {
        let node = Node::new(7, "seven", 3);
        assert_eq!(node.key(), &7);
        assert_eq!(node.value(), &"seven");
        assert_eq!(node.level(), 3);
        for level in 0..=3 {
            assert_eq!(node.next(level), None);
        }
    }

    #[test]
    fn test_node_links() {
        let mut node = Node::new(1, (), 2);
        node.set_next(0, Some(4));
        node.set_next(2, Some(9));
        assert_eq!(node.next(0), Some(4));
        assert_eq!(node.next(1), None);
        assert_eq!(node.next(2), Some(9));
        // Above the node's own level there is nothing to follow
        assert_eq!(node.next(3), None);
    }

    #[test]
    fn test_node_set_value() {
        let mut node = Node::new("k".to_string(), "old".to_string(), 0);
        let old = node.set_value("new".to_string());
        assert_eq!(old, "old");
        node.value_mut().push('!');
        assert_eq!(node.into_parts(), ("k".to_string(), "new!".to_string()));
    }
}
