use std::hash::Hash;

use indexmap::IndexMap;

/// Insertion-ordered map from keys to append-only value lists. Every vendor
/// bucket and group-membership index in the pipeline goes through this, so
/// iteration-order guarantees live in one place.
#[derive(Debug, Clone)]
pub struct MultiMap<K, V> {
    inner: IndexMap<K, Vec<V>>,
}

impl<K: Hash + Eq, V> MultiMap<K, V> {
    pub fn new() -> Self {
        Self {
            inner: IndexMap::new(),
        }
    }

    /// Appends `value` under `key`, creating the key slot on first use.
    pub fn push(&mut self, key: K, value: V) {
        self.inner.entry(key).or_default().push(value);
    }

    pub fn get(&self, key: &K) -> Option<&[V]> {
        self.inner.get(key).map(Vec::as_slice)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.inner.contains_key(key)
    }

    /// Keys in first-insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.inner.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &[V])> {
        self.inner.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<K: Hash + Eq, V> MultiMap<K, V> {
    /// Appends only if no existing value under `key` satisfies `matches`.
    /// Used where buckets must stay duplicate-free under a caller-chosen
    /// identity (name equality, `Rc` identity).
    pub fn push_unique_by<F>(&mut self, key: K, value: V, matches: F)
    where
        F: Fn(&V, &V) -> bool,
    {
        let slot = self.inner.entry(key).or_default();
        if !slot.iter().any(|existing| matches(existing, &value)) {
            slot.push(value);
        }
    }
}

impl<K: Hash + Eq, V: PartialEq> MultiMap<K, V> {
    /// Appends only if `value` is not already present under `key`.
    pub fn push_unique(&mut self, key: K, value: V) {
        self.push_unique_by(key, value, |a, b| a == b);
    }
}

impl<K: Hash + Eq, V> Default for MultiMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_keep_first_insertion_order() {
        let mut map = MultiMap::new();
        map.push("b", 1);
        map.push("a", 2);
        map.push("b", 3);
        let keys: Vec<_> = map.keys().copied().collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(map.get(&"b"), Some(&[1, 3][..]));
    }

    #[test]
    fn push_unique_drops_duplicates() {
        let mut map = MultiMap::new();
        map.push_unique("k", "x");
        map.push_unique("k", "x");
        map.push_unique("k", "y");
        assert_eq!(map.get(&"k"), Some(&["x", "y"][..]));
    }

    #[test]
    fn push_unique_by_uses_caller_identity() {
        let mut map: MultiMap<&str, (u32, &str)> = MultiMap::new();
        map.push_unique_by("k", (1, "a"), |x, y| x.1 == y.1);
        map.push_unique_by("k", (2, "a"), |x, y| x.1 == y.1);
        assert_eq!(map.get(&"k"), Some(&[(1, "a")][..]));
    }
}
