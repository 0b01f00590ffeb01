//! Content-addressed interner for [`DenseSet`]s, fingerprinted with `xxhash-rust`'s xxh3.

use std::collections::HashMap;

use parking_lot::RwLock;
use pomagma_dense_set::DenseSet;
use pomagma_util::pomagma_assert;
use xxhash_rust::xxh3::xxh3_64;

pub type SetId = u64;

fn fingerprint(words: &[u64]) -> SetId {
    let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
    xxh3_64(&bytes)
}

/// An append-only table from fingerprint to the raw words of a stored [`DenseSet`]. Two equal
/// sets always intern to the same id; released only when the store itself is dropped.
pub struct DenseSetStore {
    item_dim: u32,
    sets: RwLock<HashMap<SetId, Vec<u64>>>,
}

impl DenseSetStore {
    pub fn new(item_dim: u32) -> Self {
        DenseSetStore {
            item_dim,
            sets: RwLock::new(HashMap::new()),
        }
    }

    pub fn item_dim(&self) -> u32 {
        self.item_dim
    }

    pub fn len(&self) -> usize {
        self.sets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Interns `set`, returning a stable id. A fingerprint collision between two non-equal sets
    /// is a programmer error, not a recoverable condition.
    pub fn store(&self, set: &DenseSet) -> SetId {
        let words = set.to_words();
        let id = fingerprint(&words);
        let mut sets = self.sets.write();
        match sets.get(&id) {
            Some(existing) => {
                pomagma_assert!(
                    existing == &words,
                    "DenseSetStore fingerprint collision for id {id}"
                );
            }
            None => {
                sets.insert(id, words);
            }
        }
        id
    }

    /// Returns a read-only copy of the set stored under `id`, if any.
    pub fn load(&self, id: SetId) -> Option<DenseSet> {
        self.sets
            .read()
            .get(&id)
            .map(|words| DenseSet::from_words(self.item_dim, words.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_set(item_dim: u32, members: &[u32]) -> DenseSet {
        let set = DenseSet::new(item_dim);
        for &m in members {
            set.insert(m);
        }
        set
    }

    #[test]
    fn storing_equal_sets_returns_the_same_id() {
        let store = DenseSetStore::new(64);
        let a = sample_set(64, &[1, 5, 9]);
        let b = sample_set(64, &[1, 5, 9]);
        assert_eq!(store.store(&a), store.store(&b));
    }

    #[test]
    fn storing_different_sets_returns_different_ids() {
        let store = DenseSetStore::new(64);
        let a = sample_set(64, &[1, 5, 9]);
        let b = sample_set(64, &[1, 5, 10]);
        assert_ne!(store.store(&a), store.store(&b));
    }

    #[test]
    fn load_recovers_the_stored_set() {
        let store = DenseSetStore::new(64);
        let set = sample_set(64, &[2, 4, 6]);
        let id = store.store(&set);
        let loaded = store.load(id).expect("present");
        assert_eq!(loaded, set);
    }

    #[test]
    fn load_of_unknown_id_is_none() {
        let store = DenseSetStore::new(64);
        assert!(store.load(0xdead_beef).is_none());
    }
}
