//! The congruence-closure carrier: ob allocation plus a concurrent disjoint-set union over obs.
//!
//! `reps[ob]` is a path-compressible pointer with the invariant `reps[ob] <= ob`; `reps[ob] ==
//! ob` iff `ob` is currently a representative. Merging redirects the larger ("dep") ob to the
//! smaller ("rep") one. `find`/`merge`/`unsafe_insert`/`try_insert` may run concurrently from
//! many threads (the scheduler's "insert phase"); `unsafe_remove` and `validate` require
//! exclusive access (the "merge phase" / maintenance phase), modeled here with an internal
//! `parking_lot::RwLock<()>` sentinel that callers acquire in the matching mode.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::mpsc::Sender;

use parking_lot::{Mutex, RwLock};
use pomagma_dense_set::DenseSet;
use pomagma_util::Ob;

/// The shared, concurrently-mutable congruence-closure carrier.
pub struct Carrier {
    item_dim: u32,
    support: DenseSet,
    reps: Vec<AtomicU32>,
    item_count: AtomicUsize,
    rep_count: AtomicUsize,
    merge_callback: Mutex<Option<Sender<Ob>>>,
    /// Shared mode for `find`/`merge`/`try_insert`/`unsafe_insert`; exclusive mode for
    /// `unsafe_remove`/`validate`.
    phase_lock: RwLock<()>,
}

impl Carrier {
    pub fn new(item_dim: u32) -> Self {
        let mut reps = Vec::with_capacity(item_dim as usize + 1);
        reps.resize_with(item_dim as usize + 1, || AtomicU32::new(0));
        Carrier {
            item_dim,
            support: DenseSet::new(item_dim),
            reps,
            item_count: AtomicUsize::new(0),
            rep_count: AtomicUsize::new(0),
            merge_callback: Mutex::new(None),
            phase_lock: RwLock::new(()),
        }
    }

    pub fn item_dim(&self) -> u32 {
        self.item_dim
    }

    pub fn item_count(&self) -> usize {
        self.item_count.load(Ordering::Relaxed)
    }

    pub fn rep_count(&self) -> usize {
        self.rep_count.load(Ordering::Relaxed)
    }

    pub fn support(&self) -> &DenseSet {
        &self.support
    }

    pub fn iter(&self) -> impl Iterator<Item = Ob> + '_ {
        self.support.iter()
    }

    /// Registers the scheduler's merge-queue sender; `merge` sends each successfully-merged
    /// `dep` down this channel exactly once. Replaces any previously-registered callback.
    pub fn set_merge_callback(&self, sender: Sender<Ob>) {
        *self.merge_callback.lock() = Some(sender);
    }

    fn fire_merge_callback(&self, dep: Ob) {
        if let Some(sender) = self.merge_callback.lock().as_ref() {
            // A full scheduler channel or disconnected receiver is not this carrier's problem;
            // the merge already committed to `reps`.
            let _ = sender.send(dep);
        }
    }

    /// Sequential ob allocation: the caller guarantees no concurrent mutation of `reps`.
    pub fn unsafe_insert(&self) -> Ob {
        let _guard = self.phase_lock.read();
        for ob in 1..=self.item_dim {
            if self.reps[ob as usize].load(Ordering::Relaxed) == 0 {
                self.reps[ob as usize].store(ob, Ordering::Relaxed);
                self.support.insert(ob);
                self.item_count.fetch_add(1, Ordering::Relaxed);
                self.rep_count.fetch_add(1, Ordering::Relaxed);
                return ob;
            }
        }
        0
    }

    /// Concurrent ob allocation: CAS-scans for an empty slot, so many threads may call this
    /// simultaneously.
    pub fn try_insert(&self) -> Ob {
        let _guard = self.phase_lock.read();
        for ob in 1..=self.item_dim {
            let cell = &self.reps[ob as usize];
            if cell
                .compare_exchange(0, ob, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                self.support.try_insert(ob);
                self.item_count.fetch_add(1, Ordering::Relaxed);
                self.rep_count.fetch_add(1, Ordering::Relaxed);
                return ob;
            }
        }
        0
    }

    /// Chases `reps` to a fixed point with path halving; always returns a present rep.
    pub fn find(&self, ob: Ob) -> Ob {
        pomagma_util::pomagma_assert!(
            self.support.contains(ob),
            "find() called on absent ob {ob}"
        );
        self.find_rec(ob)
    }

    fn find_rec(&self, ob: Ob) -> Ob {
        let rep = self.reps[ob as usize].load(Ordering::Acquire);
        if rep == ob {
            return ob;
        }
        let rep_rep = self.find_rec(rep);
        if rep_rep != rep {
            // Path-halving: best-effort, a lost race is harmless.
            let _ = self.reps[ob as usize].compare_exchange(
                rep,
                rep_rep,
                Ordering::AcqRel,
                Ordering::Acquire,
            );
        }
        rep_rep
    }

    /// Merges `dep` into `rep`, where `dep > rep` is required by the caller (swapped here if
    /// given backwards). Returns the resulting rep, or `rep` unchanged if already merged.
    /// Fires the merge callback exactly once per successful merge.
    pub fn merge(&self, mut dep: Ob, mut rep: Ob) -> Ob {
        let _guard = self.phase_lock.read();
        loop {
            if dep < rep {
                std::mem::swap(&mut dep, &mut rep);
            }
            if dep == rep {
                return rep;
            }
            let cur = self.reps[dep as usize].load(Ordering::Acquire);
            if cur != dep {
                // Someone already redirected dep; chase further and retry against its target.
                dep = cur;
                continue;
            }
            match self.reps[dep as usize].compare_exchange(
                dep,
                rep,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    self.rep_count.fetch_sub(1, Ordering::Relaxed);
                    self.fire_merge_callback(dep);
                    return rep;
                }
                Err(_) => continue,
            }
        }
    }

    /// `x == y` trivially, else schedules `merge(max(x,y), min(x,y))`.
    pub fn ensure_equal(&self, x: Ob, y: Ob) -> Ob {
        if x == y {
            x
        } else if x > y {
            self.merge(x, y)
        } else {
            self.merge(y, x)
        }
    }

    /// Requires `*destin != 0`; merges `*destin` with `source` if they differ. Used by table
    /// merge cascades to reconcile two values that must now be considered equal.
    pub fn set_and_merge(&self, destin: &mut Ob, source: Ob) {
        pomagma_util::pomagma_assert!(*destin != 0, "set_and_merge on unset destin");
        if *destin != source {
            self.ensure_equal(*destin, source);
        }
    }

    /// Like [`Self::set_and_merge`], but also handles `*destin == 0` by simply adopting `source`.
    /// Returns `true` iff this was a fresh assignment (not a merge).
    pub fn set_or_merge(&self, destin: &mut Ob, source: Ob) -> bool {
        if *destin == 0 {
            *destin = source;
            true
        } else {
            self.set_and_merge(destin, source);
            false
        }
    }

    /// Removes `ob`, which must be either a rep with no remaining deps, or itself a dep (in
    /// which case every higher-numbered dep currently pointing at it is rewritten to its rep
    /// first). Requires exclusive access.
    pub fn unsafe_remove(&self, ob: Ob) {
        let _guard = self.phase_lock.write();
        let rep = self.reps[ob as usize].load(Ordering::Relaxed);
        pomagma_util::pomagma_assert!(rep != 0, "unsafe_remove on absent ob {ob}");
        if rep == ob {
            for dep in (ob + 1)..=self.item_dim {
                if self.reps[dep as usize].load(Ordering::Relaxed) == ob {
                    self.reps[dep as usize].store(ob, Ordering::Relaxed);
                }
            }
        }
        self.reps[ob as usize].store(0, Ordering::Relaxed);
        self.support.remove(ob);
        self.item_count.fetch_sub(1, Ordering::Relaxed);
        if rep == ob {
            self.rep_count.fetch_sub(1, Ordering::Relaxed);
        }
    }

    pub fn clear(&self) {
        let _guard = self.phase_lock.write();
        self.support.zero();
        for cell in &self.reps {
            cell.store(0, Ordering::Relaxed);
        }
        self.item_count.store(0, Ordering::Relaxed);
        self.rep_count.store(0, Ordering::Relaxed);
    }

    /// Rebuilds a carrier directly from a support bit set and a sparse dep-&gt;rep map, as restored
    /// from a snapshot (`pomagma-structure::snapshot`). `support` must already carry exactly the
    /// present obs at `item_dim`; every ob in `support` not named in `deps` is its own rep.
    pub fn from_parts(item_dim: u32, support: DenseSet, deps: &[(Ob, Ob)]) -> Carrier {
        debug_assert_eq!(support.item_dim(), item_dim);
        let mut reps = Vec::with_capacity(item_dim as usize + 1);
        reps.resize_with(item_dim as usize + 1, || AtomicU32::new(0));
        let mut item_count = 0usize;
        let mut rep_count = 0usize;
        for ob in support.iter() {
            reps[ob as usize].store(ob, Ordering::Relaxed);
            item_count += 1;
            rep_count += 1;
        }
        for &(dep, rep) in deps {
            reps[dep as usize].store(rep, Ordering::Relaxed);
            rep_count -= 1;
        }
        Carrier {
            item_dim,
            support,
            reps,
            item_count: AtomicUsize::new(item_count),
            rep_count: AtomicUsize::new(rep_count),
            merge_callback: Mutex::new(None),
            phase_lock: RwLock::new(()),
        }
    }

    /// Builds a new, larger carrier with every present ob `1..=item_dim` copied at the same
    /// index, preserving both support and the union-find structure exactly. Used by
    /// `Structure::resize`; requires exclusive access to `self`.
    pub fn resized(&self, new_item_dim: u32) -> Carrier {
        let _guard = self.phase_lock.write();
        pomagma_util::pomagma_assert!(
            new_item_dim >= self.item_dim,
            "Carrier::resized must not shrink item_dim"
        );
        let grown = Carrier::new(new_item_dim);
        for ob in 1..=self.item_dim {
            let rep = self.reps[ob as usize].load(Ordering::Relaxed);
            if rep != 0 {
                grown.reps[ob as usize].store(rep, Ordering::Relaxed);
                grown.support.insert(ob);
            }
        }
        grown.item_count.store(self.item_count(), Ordering::Relaxed);
        grown.rep_count.store(self.rep_count(), Ordering::Relaxed);
        grown
    }

    /// Full consistency scan; requires exclusive access.
    pub fn validate(&self) {
        let _guard = self.phase_lock.write();
        let mut item_count = 0usize;
        let mut rep_count = 0usize;
        for ob in 1..=self.item_dim {
            let rep = self.reps[ob as usize].load(Ordering::Relaxed);
            if rep == 0 {
                pomagma_util::pomagma_assert!(
                    !self.support.contains(ob),
                    "support contains {ob} but reps[{ob}] == 0"
                );
                continue;
            }
            pomagma_util::pomagma_assert!(
                self.support.contains(ob),
                "reps[{ob}] set but support does not contain {ob}"
            );
            pomagma_util::pomagma_assert!(rep <= ob, "reps[{ob}] = {rep} > {ob}");
            item_count += 1;
            if rep == ob {
                rep_count += 1;
            } else {
                pomagma_util::pomagma_assert!(
                    self.reps[rep as usize].load(Ordering::Relaxed) != 0,
                    "dep {ob} points to absent rep {rep}"
                );
            }
        }
        pomagma_util::pomagma_assert!(
            item_count == self.item_count(),
            "item_count mismatch: counted {item_count}, cached {}",
            self.item_count()
        );
        pomagma_util::pomagma_assert!(
            rep_count == self.rep_count(),
            "rep_count mismatch: counted {rep_count}, cached {}",
            self.rep_count()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_find_fixed_point() {
        let c = Carrier::new(10);
        let a = c.unsafe_insert();
        assert_eq!(c.find(a), a);
        assert_eq!(c.item_count(), 1);
        assert_eq!(c.rep_count(), 1);
    }

    #[test]
    fn merge_picks_smaller_as_rep() {
        let c = Carrier::new(10);
        for _ in 0..5 {
            c.unsafe_insert();
        }
        let rep = c.merge(5, 2);
        assert_eq!(rep, 2);
        assert_eq!(c.find(5), 2);
        assert_eq!(c.rep_count(), 4);
    }

    #[test]
    fn merge_swaps_when_given_backwards() {
        let c = Carrier::new(10);
        for _ in 0..5 {
            c.unsafe_insert();
        }
        let rep = c.merge(2, 5);
        assert_eq!(rep, 2);
        assert_eq!(c.find(5), 2);
    }

    #[test]
    fn merge_is_idempotent_on_equal_reps() {
        let c = Carrier::new(10);
        for _ in 0..3 {
            c.unsafe_insert();
        }
        c.merge(3, 1);
        let rep_count_before = c.rep_count();
        assert_eq!(c.merge(c.find(3), c.find(1)), 1);
        assert_eq!(c.rep_count(), rep_count_before);
    }

    #[test]
    fn merge_callback_fires_once_per_merge() {
        let c = Carrier::new(10);
        for _ in 0..3 {
            c.unsafe_insert();
        }
        let (tx, rx) = std::sync::mpsc::channel();
        c.set_merge_callback(tx);
        c.merge(3, 1);
        assert_eq!(rx.try_recv().unwrap(), 3);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn capacity_exhaustion_returns_zero() {
        let c = Carrier::new(2);
        assert_ne!(c.unsafe_insert(), 0);
        assert_ne!(c.unsafe_insert(), 0);
        assert_eq!(c.unsafe_insert(), 0);
    }

    #[test]
    fn concurrent_try_insert_never_double_allocates() {
        use std::sync::Arc;
        let c = Arc::new(Carrier::new(1000));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let c = Arc::clone(&c);
                std::thread::spawn(move || {
                    let mut got = vec![];
                    for _ in 0..100 {
                        let ob = c.try_insert();
                        if ob != 0 {
                            got.push(ob);
                        }
                    }
                    got
                })
            })
            .collect();
        let mut all = vec![];
        for h in handles {
            all.extend(h.join().unwrap());
        }
        all.sort_unstable();
        let before = all.len();
        all.dedup();
        assert_eq!(before, all.len(), "no ob allocated twice");
        assert_eq!(c.item_count(), before);
    }

    #[test]
    fn from_parts_reconstructs_support_and_reps() {
        let support = DenseSet::new(10);
        for ob in [1, 2, 3, 4] {
            support.insert(ob);
        }
        let c = Carrier::from_parts(10, support, &[(4, 2)]);
        assert_eq!(c.item_count(), 4);
        assert_eq!(c.rep_count(), 3);
        assert_eq!(c.find(4), 2);
        assert_eq!(c.find(1), 1);
    }

    #[test]
    fn resized_preserves_reps_and_identity() {
        let c = Carrier::new(5);
        for _ in 0..5 {
            c.unsafe_insert();
        }
        c.merge(5, 2);
        let grown = c.resized(20);
        assert_eq!(grown.item_dim(), 20);
        assert_eq!(grown.item_count(), c.item_count());
        assert_eq!(grown.rep_count(), c.rep_count());
        assert_eq!(grown.find(5), 2);
        assert!(grown.support().contains(1));
    }

    #[test]
    fn validate_passes_on_quiescent_structure() {
        let c = Carrier::new(10);
        for _ in 0..5 {
            c.unsafe_insert();
        }
        c.merge(5, 2);
        c.merge(4, 1);
        c.validate();
    }
}
