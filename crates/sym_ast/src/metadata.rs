//! Out-of-band typed metadata keyed by node identity.
//!
//! Nodes are immutable and shared, so metadata cannot live inside them.
//! [`NodeMetadata`] is a side table mapping `(node identity, key name, value
//! type)` to a typed value. Each entry keeps a clone of the node, so the address it is keyed by
//! stays valid (and unique) for as long as the entry exists.
//!
//! Metadata never takes part in equality, hashing or ordering of nodes.

use crate::expression::Node;
use rustc_hash::FxHashMap;
use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Typed key for a metadata slot.
///
/// ```
/// use sym_ast::{Expr, MetaKey, Node, NodeMetadata};
///
/// const VISITS: MetaKey<u32> = MetaKey::new("visits");
///
/// let x = Expr::sym("x");
/// let mut meta = NodeMetadata::new();
/// meta.insert(&x, &VISITS, 3);
/// assert_eq!(meta.get(&x, &VISITS), Some(&3));
/// // A structurally equal but distinct node has no metadata.
/// assert_eq!(meta.get(&Expr::sym("x"), &VISITS), None);
/// ```
pub struct MetaKey<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> MetaKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> fmt::Debug for MetaKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MetaKey({})", self.name)
    }
}

struct Entry {
    // Pins the allocation the map key points at.
    _node: Node,
    value: Box<dyn Any + Send + Sync>,
}

/// Side table of per-node metadata.
#[derive(Default)]
pub struct NodeMetadata {
    entries: FxHashMap<SlotKey, Entry>,
}

/// Node address, key name, value type. Keys sharing a name but not a value
/// type never collide.
type SlotKey = (usize, &'static str, TypeId);

#[inline]
fn slot<T: Any>(node: &Node, key: &MetaKey<T>) -> SlotKey {
    (Arc::as_ptr(node) as usize, key.name, TypeId::of::<T>())
}

impl NodeMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<T: Any + Send + Sync>(&self, node: &Node, key: &MetaKey<T>) -> Option<&T> {
        self.entries
            .get(&slot(node, key))
            .and_then(|e| e.value.downcast_ref::<T>())
    }

    /// Attach `value` to `node`, returning the previous value for the key.
    pub fn insert<T: Any + Send + Sync>(&mut self, node: &Node, key: &MetaKey<T>, value: T) -> Option<T> {
        let previous = self.entries.insert(
            slot(node, key),
            Entry {
                _node: node.clone(),
                value: Box::new(value),
            },
        );
        previous.and_then(|e| e.value.downcast::<T>().ok().map(|b| *b))
    }

    pub fn remove<T: Any + Send + Sync>(&mut self, node: &Node, key: &MetaKey<T>) -> Option<T> {
        self.entries
            .remove(&slot(node, key))
            .and_then(|e| e.value.downcast::<T>().ok().map(|b| *b))
    }

    pub fn contains<T: Any>(&self, node: &Node, key: &MetaKey<T>) -> bool {
        self.entries.contains_key(&slot(node, key))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl fmt::Debug for NodeMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeMetadata")
            .field("entries", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::Expr;

    const LABEL: MetaKey<String> = MetaKey::new("label");
    const WEIGHT: MetaKey<u64> = MetaKey::new("weight");

    #[test]
    fn test_keys_are_independent() {
        let x = Expr::sym("x");
        let mut meta = NodeMetadata::new();
        meta.insert(&x, &LABEL, "free".to_string());
        meta.insert(&x, &WEIGHT, 7);
        assert_eq!(meta.get(&x, &LABEL).map(String::as_str), Some("free"));
        assert_eq!(meta.get(&x, &WEIGHT), Some(&7));
        assert_eq!(meta.len(), 2);
    }

    #[test]
    fn test_same_name_different_type() {
        const COUNT: MetaKey<u64> = MetaKey::new("count");
        const COUNT_TEXT: MetaKey<String> = MetaKey::new("count");
        let x = Expr::sym("x");
        let mut meta = NodeMetadata::new();
        assert_eq!(meta.insert(&x, &COUNT, 3), None);
        assert_eq!(meta.insert(&x, &COUNT_TEXT, "three".to_string()), None);
        assert_eq!(meta.get(&x, &COUNT), Some(&3));
        assert_eq!(meta.remove(&x, &COUNT_TEXT).as_deref(), Some("three"));
        assert!(meta.contains(&x, &COUNT));
        assert_eq!(meta.len(), 1);
    }

    #[test]
    fn test_insert_returns_previous() {
        let x = Expr::sym("x");
        let mut meta = NodeMetadata::new();
        assert_eq!(meta.insert(&x, &WEIGHT, 1), None);
        assert_eq!(meta.insert(&x, &WEIGHT, 2), Some(1));
        assert_eq!(meta.remove(&x, &WEIGHT), Some(2));
        assert!(meta.is_empty());
    }

    #[test]
    fn test_identity_not_structure() {
        let a = Expr::sym("x");
        let b = Expr::sym("x");
        let mut meta = NodeMetadata::new();
        meta.insert(&a, &WEIGHT, 1);
        assert!(meta.contains(&a, &WEIGHT));
        assert!(!meta.contains(&b, &WEIGHT));
        assert!(meta.contains(&a.clone(), &WEIGHT));
    }
}
