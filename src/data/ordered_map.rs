//! Insertion-ordered, internally synchronized associative container.
//!
//! [`OrderedMap`] backs the vertex registry of [`Dag`](crate::topology::dag::Dag) but is
//! generic over keys and values. Reads share a `parking_lot::RwLock`; every mutator,
//! including [`OrderedMap::put_or_get`], runs under one exclusive acquisition.

use hashbrown::HashMap;
use parking_lot::RwLock;
use std::borrow::Borrow;
use std::hash::Hash;
use std::ops::ControlFlow;

#[derive(Debug)]
struct Inner<K, V> {
    data: HashMap<K, V>,
    /// Keys in first-insertion order; kept in step with `data`.
    keys: Vec<K>,
}

/// Thread-safe map that iterates in first-insertion order.
///
/// Overwriting an existing key keeps its original position.
///
/// # Example
/// ```
/// use vertex_dag::data::ordered_map::OrderedMap;
/// let m = OrderedMap::new();
/// m.put("b", 2);
/// m.put("a", 1);
/// assert_eq!(m.put_or_get("b", 20), (2, true));
/// assert_eq!(m.keys(), vec!["b", "a"]);
/// ```
#[derive(Debug)]
pub struct OrderedMap<K, V> {
    inner: RwLock<Inner<K, V>>,
}

impl<K, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(Inner {
                data: HashMap::new(),
                keys: Vec::new(),
            }),
        }
    }
}

impl<K, V> OrderedMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty map with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(Inner {
                data: HashMap::with_capacity(capacity),
                keys: Vec::with_capacity(capacity),
            }),
        }
    }

    /// Insert or overwrite `key`, returning the previous value.
    ///
    /// A new key is appended to the iteration order.
    pub fn put(&self, key: K, value: V) -> Option<V> {
        let mut inner = self.inner.write();
        let previous = inner.data.insert(key.clone(), value);
        if previous.is_none() {
            inner.keys.push(key);
        }
        previous
    }

    /// Look up `key`, cloning the stored value.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.read().data.get(key).cloned()
    }

    /// Get-or-insert under a single write lock.
    ///
    /// Returns `(existing, true)` if `key` was present, otherwise stores `value` and
    /// returns `(value, false)`. Concurrent callers racing on the same key see exactly
    /// one `false`.
    pub fn put_or_get(&self, key: K, value: V) -> (V, bool) {
        let mut inner = self.inner.write();
        if let Some(existing) = inner.data.get(&key) {
            return (existing.clone(), true);
        }
        inner.data.insert(key.clone(), value.clone());
        inner.keys.push(key);
        (value, false)
    }

    /// Remove `key`, returning its value. O(n) in the number of keys.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut inner = self.inner.write();
        let value = inner.data.remove(key)?;
        inner.keys.retain(|k| <K as Borrow<Q>>::borrow(k) != key);
        Some(value)
    }

    /// `true` if `key` is present.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.read().data.contains_key(key)
    }

    /// Visit every entry in insertion order under one read lock, stopping at the
    /// first `ControlFlow::Break`.
    ///
    /// The visitor must not call a mutator on the same map; that would deadlock.
    pub fn walk<B, F>(&self, mut visitor: F) -> ControlFlow<B>
    where
        F: FnMut(&K, &V) -> ControlFlow<B>,
    {
        let inner = self.inner.read();
        for key in &inner.keys {
            if let Some(value) = inner.data.get(key) {
                visitor(key, value)?;
            }
        }
        ControlFlow::Continue(())
    }

    /// Snapshot of the keys in insertion order.
    pub fn keys(&self) -> Vec<K> {
        self.inner.read().keys.clone()
    }

    /// Snapshot of the values in insertion order.
    pub fn values(&self) -> Vec<V> {
        let inner = self.inner.read();
        inner
            .keys
            .iter()
            .filter_map(|k| inner.data.get(k).cloned())
            .collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.inner.read().data.len()
    }

    /// `true` if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
