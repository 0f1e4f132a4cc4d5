use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

/// Fixed-capacity map that evicts the least recently used entry.
/// Capacities stay small (tens of entries) so recency is tracked in a plain deque.
#[derive(Debug)]
pub struct LruMap<K, V> {
    capacity: usize,
    entries: HashMap<K, V>,
    // front = least recently used
    order: VecDeque<K>,
}

impl<K, V> LruMap<K, V>
where
    K: Hash + Eq + Clone,
{
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up `key` and marks it as most recently used
    pub fn get(&mut self, key: &K) -> Option<&V> {
        if self.entries.contains_key(key) {
            self.touch(key);
        }
        self.entries.get(key)
    }

    /// Inserts or replaces `key`. Returns whatever left the map: the replaced
    /// value under the same key, or the evicted least recently used entry.
    pub fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        if self.capacity == 0 {
            return Some((key, value));
        }

        if let Some(previous) = self.entries.insert(key.clone(), value) {
            self.touch(&key);
            return Some((key, previous));
        }
        self.order.push_back(key);

        if self.entries.len() > self.capacity {
            let oldest: K = self.order.pop_front()?;
            let evicted: V = self.entries.remove(&oldest)?;
            return Some((oldest, evicted));
        }
        None
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let value: V = self.entries.remove(key)?;
        self.order.retain(|k| k != key);
        Some(value)
    }

    /// Empties the map, oldest entries first
    pub fn drain(&mut self) -> Vec<(K, V)> {
        let mut drained: Vec<(K, V)> = Vec::with_capacity(self.entries.len());
        while let Some(key) = self.order.pop_front() {
            if let Some(value) = self.entries.remove(&key) {
                drained.push((key, value));
            }
        }
        drained
    }

    /// Keys from least to most recently used
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.order.iter()
    }

    fn touch(&mut self, key: &K) {
        if let Some(position) = self.order.iter().position(|k| k == key) {
            if let Some(k) = self.order.remove(position) {
                self.order.push_back(k);
            }
        }
    }
}
