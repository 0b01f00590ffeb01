//! A fixed-width bit set over the dense one-based `Ob` index space `1..=item_dim`.
//!
//! Backed unconditionally by `AtomicU64` words. Most methods (`insert`, `remove`, `merge`, ...)
//! assume the caller already holds exclusive access and use relaxed loads/stores purely as a
//! convenient representation; [`DenseSet::try_insert`] additionally offers a
//! compare-and-swap-based test-and-set for callers that need true concurrent insertion (the
//! carrier's `try_insert` and the scheduler's insert phase). One representation serves both
//! disciplines, since atomics are a strict superset of plain words for a single-writer caller.

use std::sync::atomic::{AtomicU64, Ordering};

use pomagma_util::Ob;

const BITS: u32 = 64;

fn word_count(item_dim: u32) -> usize {
    (item_dim as usize + 1 + BITS as usize - 1) / BITS as usize
}

fn word_index(i: Ob) -> usize {
    (i / BITS) as usize
}

fn bit_mask(i: Ob) -> u64 {
    1u64 << (i % BITS)
}

/// A bit set over `0..=item_dim`; index `0` is reserved (obs are one-based) but allocated for
/// simplicity of indexing.
pub struct DenseSet {
    item_dim: u32,
    words: Vec<AtomicU64>,
}

impl DenseSet {
    pub fn new(item_dim: u32) -> Self {
        let mut words = Vec::with_capacity(word_count(item_dim));
        words.resize_with(word_count(item_dim), || AtomicU64::new(0));
        DenseSet { item_dim, words }
    }

    pub fn item_dim(&self) -> u32 {
        self.item_dim
    }

    #[inline]
    fn load(&self, w: usize) -> u64 {
        self.words[w].load(Ordering::Relaxed)
    }

    pub fn insert(&self, i: Ob) {
        debug_assert!(i >= 1 && i <= self.item_dim);
        let w = word_index(i);
        self.words[w].fetch_or(bit_mask(i), Ordering::Relaxed);
    }

    pub fn remove(&self, i: Ob) {
        debug_assert!(i >= 1 && i <= self.item_dim);
        let w = word_index(i);
        self.words[w].fetch_and(!bit_mask(i), Ordering::Relaxed);
    }

    pub fn contains(&self, i: Ob) -> bool {
        if i < 1 || i > self.item_dim {
            return false;
        }
        self.load(word_index(i)) & bit_mask(i) != 0
    }

    /// Atomic test-and-set: returns `true` iff this call newly set the bit.
    pub fn try_insert(&self, i: Ob) -> bool {
        debug_assert!(i >= 1 && i <= self.item_dim);
        let w = word_index(i);
        let mask = bit_mask(i);
        let prev = self.words[w].fetch_or(mask, Ordering::AcqRel);
        prev & mask == 0
    }

    pub fn count_items(&self) -> usize {
        self.words
            .iter()
            .map(|w| w.load(Ordering::Relaxed).count_ones() as usize)
            .sum()
    }

    pub fn zero(&self) {
        for w in &self.words {
            w.store(0, Ordering::Relaxed);
        }
    }

    pub fn copy_from(&self, other: &DenseSet) {
        debug_assert_eq!(self.item_dim, other.item_dim);
        for (dst, src) in self.words.iter().zip(other.words.iter()) {
            dst.store(src.load(Ordering::Relaxed), Ordering::Relaxed);
        }
    }

    /// Bitwise OR of `other` into `self`.
    pub fn merge(&self, other: &DenseSet) {
        debug_assert_eq!(self.item_dim, other.item_dim);
        for (dst, src) in self.words.iter().zip(other.words.iter()) {
            let s = src.load(Ordering::Relaxed);
            if s != 0 {
                dst.fetch_or(s, Ordering::Relaxed);
            }
        }
    }

    /// ORs `other` into `self`, and sets `diff` to exactly the bits that were newly set by this
    /// call (overwriting whatever `diff` held before). Returns whether anything was new.
    pub fn ensure(&self, other: &DenseSet, diff: &mut DenseSet) -> bool {
        debug_assert_eq!(self.item_dim, other.item_dim);
        debug_assert_eq!(self.item_dim, diff.item_dim);
        let mut any = false;
        for i in 0..self.words.len() {
            let cur = self.load(i);
            let incoming = other.load(i);
            let newly = incoming & !cur;
            diff.words[i].store(newly, Ordering::Relaxed);
            if newly != 0 {
                any = true;
                self.words[i].fetch_or(newly, Ordering::Relaxed);
            }
        }
        any
    }

    pub fn disjoint(&self, other: &DenseSet) -> bool {
        debug_assert_eq!(self.item_dim, other.item_dim);
        self.words
            .iter()
            .zip(other.words.iter())
            .all(|(a, b)| a.load(Ordering::Relaxed) & b.load(Ordering::Relaxed) == 0)
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| w.load(Ordering::Relaxed) == 0)
    }

    /// Sets each of `1..=item_dim` independently with probability `p`.
    pub fn fill_random<R: rand::Rng>(&self, rng: &mut R, p: f32) {
        for i in 1..=self.item_dim {
            if rng.random::<f32>() < p {
                self.insert(i);
            }
        }
    }

    /// Asserts no bit beyond `item_dim` is set in the trailing word.
    pub fn validate(&self) {
        if self.item_dim == 0 {
            return;
        }
        let last_word = word_index(self.item_dim);
        let valid_bits = self.item_dim % BITS + 1;
        let mask = if valid_bits == BITS {
            u64::MAX
        } else {
            (1u64 << valid_bits) - 1
        };
        debug_assert_eq!(self.load(last_word) & !mask, 0, "bits set beyond item_dim");
    }

    pub fn iter(&self) -> DenseSetIter<'_> {
        DenseSetIter {
            set: self,
            word: 0,
            bits: self.load(0) & !1u64,
        }
    }

    /// Packs the bit set into its raw words, for snapshot I/O.
    pub fn to_words(&self) -> Vec<u64> {
        self.words.iter().map(|w| w.load(Ordering::Relaxed)).collect()
    }

    /// Rebuilds a `DenseSet` from words produced by [`Self::to_words`] for the same `item_dim`.
    pub fn from_words(item_dim: u32, words: Vec<u64>) -> Self {
        debug_assert_eq!(words.len(), word_count(item_dim));
        DenseSet {
            item_dim,
            words: words.into_iter().map(AtomicU64::new).collect(),
        }
    }

    /// Lazily iterates the intersection of `self` and `other` without materializing it.
    pub fn iter_and<'a>(&'a self, other: &'a DenseSet) -> impl Iterator<Item = Ob> + 'a {
        debug_assert_eq!(self.item_dim, other.item_dim);
        AndIter {
            a: self,
            b: other,
            word: 0,
            bits: (self.load(0) & other.load(0)) & !1u64,
        }
    }
}

impl Clone for DenseSet {
    fn clone(&self) -> Self {
        let words = self
            .words
            .iter()
            .map(|w| AtomicU64::new(w.load(Ordering::Relaxed)))
            .collect();
        DenseSet {
            item_dim: self.item_dim,
            words,
        }
    }
}

impl PartialEq for DenseSet {
    fn eq(&self, other: &Self) -> bool {
        self.item_dim == other.item_dim
            && self
                .words
                .iter()
                .zip(other.words.iter())
                .all(|(a, b)| a.load(Ordering::Relaxed) == b.load(Ordering::Relaxed))
    }
}
impl Eq for DenseSet {}

pub struct DenseSetIter<'a> {
    set: &'a DenseSet,
    word: usize,
    bits: u64,
}

impl<'a> Iterator for DenseSetIter<'a> {
    type Item = Ob;

    fn next(&mut self) -> Option<Ob> {
        loop {
            if self.bits != 0 {
                let bit = self.bits.trailing_zeros();
                self.bits &= self.bits - 1;
                return Some(self.word as u32 * BITS + bit);
            }
            self.word += 1;
            if self.word >= self.set.words.len() {
                return None;
            }
            self.bits = self.set.load(self.word);
        }
    }
}

struct AndIter<'a> {
    a: &'a DenseSet,
    b: &'a DenseSet,
    word: usize,
    bits: u64,
}

impl<'a> Iterator for AndIter<'a> {
    type Item = Ob;

    fn next(&mut self) -> Option<Ob> {
        loop {
            if self.bits != 0 {
                let bit = self.bits.trailing_zeros();
                self.bits &= self.bits - 1;
                return Some(self.word as u32 * BITS + bit);
            }
            self.word += 1;
            if self.word >= self.a.words.len() {
                return None;
            }
            self.bits = self.a.load(self.word) & self.b.load(self.word);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_contains_remove() {
        let s = DenseSet::new(100);
        assert!(!s.contains(42));
        s.insert(42);
        assert!(s.contains(42));
        assert_eq!(s.count_items(), 1);
        s.remove(42);
        assert!(!s.contains(42));
        assert_eq!(s.count_items(), 0);
    }

    #[test]
    fn try_insert_is_test_and_set() {
        let s = DenseSet::new(10);
        assert!(s.try_insert(3));
        assert!(!s.try_insert(3));
    }

    #[test]
    fn iter_yields_sorted_items() {
        let s = DenseSet::new(200);
        for i in [5, 1, 199, 64, 63, 65] {
            s.insert(i);
        }
        let items: Vec<_> = s.iter().collect();
        assert_eq!(items, vec![1, 5, 63, 64, 65, 199]);
    }

    #[test]
    fn merge_is_union() {
        let a = DenseSet::new(64);
        let b = DenseSet::new(64);
        a.insert(1);
        b.insert(2);
        a.merge(&b);
        assert!(a.contains(1));
        assert!(a.contains(2));
    }

    #[test]
    fn ensure_reports_only_new_bits() {
        let dest = DenseSet::new(64);
        let src = DenseSet::new(64);
        let mut diff = DenseSet::new(64);
        dest.insert(1);
        src.insert(1);
        src.insert(2);
        let changed = dest.ensure(&src, &mut diff);
        assert!(changed);
        assert!(!diff.contains(1));
        assert!(diff.contains(2));
        assert!(dest.contains(1) && dest.contains(2));
    }

    #[test]
    fn disjoint_sets() {
        let a = DenseSet::new(64);
        let b = DenseSet::new(64);
        a.insert(1);
        b.insert(2);
        assert!(a.disjoint(&b));
        b.insert(1);
        assert!(!a.disjoint(&b));
    }

    #[test]
    fn iter_and_is_lazy_intersection() {
        let a = DenseSet::new(64);
        let b = DenseSet::new(64);
        for i in [1, 2, 3] {
            a.insert(i);
        }
        for i in [2, 3, 4] {
            b.insert(i);
        }
        let items: Vec<_> = a.iter_and(&b).collect();
        assert_eq!(items, vec![2, 3]);
    }

    #[test]
    fn to_words_from_words_round_trips() {
        let s = DenseSet::new(200);
        for i in [1, 64, 65, 199] {
            s.insert(i);
        }
        let rebuilt = DenseSet::from_words(200, s.to_words());
        assert_eq!(rebuilt, s);
    }

    #[test]
    fn validate_boundary_widths() {
        for item_dim in [0u32, 1, 63, 64, 65, 127] {
            let s = DenseSet::new(item_dim);
            if item_dim > 0 {
                s.insert(item_dim);
            }
            s.validate();
        }
    }
}
