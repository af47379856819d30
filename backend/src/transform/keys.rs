//! Surrogate key assignment.

use std::collections::HashMap;
use std::hash::Hash;

/// Dense surrogate keys in first-encounter order.
///
/// The first distinct natural key gets id 1, the next unseen one id 2, and so
/// on. A `None` component of a natural key is an ordinary value and gets an
/// id of its own.
#[derive(Debug, Clone)]
pub struct SurrogateKeys<K> {
    ids: HashMap<K, u32>,
    order: Vec<K>,
}

impl<K: Eq + Hash + Clone> SurrogateKeys<K> {
    pub fn new() -> Self {
        Self {
            ids: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Id of `key`, assigning the next one if unseen.
    pub fn id(&mut self, key: K) -> u32 {
        if let Some(id) = self.ids.get(&key) {
            return *id;
        }
        self.order.push(key.clone());
        let id = self.order.len() as u32;
        self.ids.insert(key, id);
        id
    }

    /// Id of an already seen key.
    pub fn get(&self, key: &K) -> Option<u32> {
        self.ids.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Natural keys by id (index `id - 1`).
    pub fn keys(&self) -> &[K] {
        &self.order
    }
}

impl<K: Eq + Hash + Clone> Default for SurrogateKeys<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dense_first_encounter_ids() {
        let mut keys = SurrogateKeys::new();
        assert_eq!(keys.id("Consumer"), 1);
        assert_eq!(keys.id("Corporate"), 2);
        assert_eq!(keys.id("Consumer"), 1);
        assert_eq!(keys.id("Home Office"), 3);
        assert_eq!(keys.len(), 3);
        assert_eq!(keys.keys(), &["Consumer", "Corporate", "Home Office"]);
        assert_eq!(keys.get(&"Corporate"), Some(2));
        assert_eq!(keys.get(&"Unknown"), None);
    }

    #[test]
    fn test_null_is_its_own_key() {
        let mut keys: SurrogateKeys<Option<&str>> = SurrogateKeys::new();
        assert_eq!(keys.id(Some("West")), 1);
        assert_eq!(keys.id(None), 2);
        assert_eq!(keys.id(None), 2);
    }
}
