//! The four partial-function table kinds: `NullaryFunction`, `InjectiveFunction`,
//! `BinaryFunction`, `SymmetricFunction`. For the binary kinds the hash map is the source of
//! truth; the bit "lines" (`lx`/`rx`) lag until `unsafe_merge`/`update_values` catch them up.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use pomagma_carrier::Carrier;
use pomagma_dense_set::{DenseSet, DenseSetIter};
use pomagma_util::Ob;

use crate::table::{Table, TableKind};

/// A single ob value, shared by every ob in the carrier (e.g. the constant `I` in combinatory
/// logic).
pub struct NullaryFunction {
    carrier: Arc<Carrier>,
    value: AtomicU32,
    insert_lock: Mutex<()>,
}

impl NullaryFunction {
    pub fn new(carrier: Arc<Carrier>) -> Self {
        NullaryFunction {
            carrier,
            value: AtomicU32::new(0),
            insert_lock: Mutex::new(()),
        }
    }

    pub fn find(&self) -> Ob {
        self.value.load(Ordering::Acquire)
    }

    pub fn defined(&self) -> bool {
        self.find() != 0
    }

    pub fn raw_insert(&self, val: Ob) {
        self.value.store(val, Ordering::Relaxed);
    }

    /// Sets the value, merging with any prior value via the carrier.
    pub fn insert(&self, val: Ob) {
        pomagma_util::pomagma_assert!(val != 0, "NullaryFunction::insert(0)");
        let _guard = self.insert_lock.lock();
        let current = self.value.load(Ordering::Acquire);
        if current == 0 {
            self.value.store(val, Ordering::Release);
        } else if current != val {
            let rep = self.carrier.ensure_equal(current, val);
            self.value.store(rep, Ordering::Release);
        }
    }

    pub fn clear(&self) {
        self.value.store(0, Ordering::Relaxed);
    }

    pub fn validate(&self) {
        let val = self.find();
        if val != 0 {
            pomagma_util::pomagma_assert!(
                self.carrier.support().contains(val),
                "NullaryFunction value {val} is unsupported"
            );
        }
    }

    pub fn unsafe_merge(&self, dep: Ob) {
        let cur = self.value.load(Ordering::Relaxed);
        if cur == dep {
            self.value
                .store(self.carrier.find(dep), Ordering::Relaxed);
        }
    }

    pub fn update_values(&self) {
        let cur = self.value.load(Ordering::Relaxed);
        if cur != 0 {
            let rep = self.carrier.find(cur);
            if rep != cur {
                self.value.store(rep, Ordering::Relaxed);
            }
        }
    }
}

impl Table for NullaryFunction {
    fn kind(&self) -> TableKind {
        TableKind::NullaryFunction
    }
    fn validate(&self) {
        self.validate();
    }
    fn unsafe_merge(&self, dep: Ob) {
        self.unsafe_merge(dep);
    }
    fn update_values(&self) {
        self.update_values();
    }
    fn clear(&self) {
        self.clear();
    }
    fn count_items(&self) -> usize {
        if self.defined() {
            1
        } else {
            0
        }
    }
    fn log_stats(&self, name: &str) {
        tracing::debug!(table = name, defined = self.defined(), "nullary function stats");
    }
}

/// An injective partial function `Ob -> Ob`: forward map, inverse map, and a `defined` bitset
/// over keys. Inserting a value that collides with an existing preimage merges the two keys
/// instead of overwriting (injectivity is enforced, not merely recorded).
pub struct InjectiveFunction {
    carrier: Arc<Carrier>,
    forward: Vec<AtomicU32>,
    inverse: Vec<AtomicU32>,
    defined: DenseSet,
    write_lock: Mutex<()>,
}

impl InjectiveFunction {
    pub fn new(carrier: Arc<Carrier>) -> Self {
        let item_dim = carrier.item_dim();
        let mut forward = Vec::with_capacity(item_dim as usize + 1);
        let mut inverse = Vec::with_capacity(item_dim as usize + 1);
        for _ in 0..=item_dim {
            forward.push(AtomicU32::new(0));
            inverse.push(AtomicU32::new(0));
        }
        InjectiveFunction {
            carrier,
            forward,
            inverse,
            defined: DenseSet::new(item_dim),
            write_lock: Mutex::new(()),
        }
    }

    pub fn defined(&self, arg: Ob) -> bool {
        self.defined.contains(arg)
    }

    pub fn find(&self, arg: Ob) -> Ob {
        self.forward[arg as usize].load(Ordering::Acquire)
    }

    pub fn inverse_find(&self, val: Ob) -> Ob {
        self.inverse[val as usize].load(Ordering::Acquire)
    }

    pub fn raw_insert(&self, arg: Ob, val: Ob) {
        self.forward[arg as usize].store(val, Ordering::Relaxed);
        self.inverse[val as usize].store(arg, Ordering::Relaxed);
        self.defined.insert(arg);
    }

    pub fn iter(&self) -> DenseSetIter<'_> {
        self.defined.iter()
    }

    pub fn count_items(&self) -> usize {
        self.defined.count_items()
    }

    /// Snapshots every `(arg, val)` pair in increasing-arg order; used by snapshot I/O and by
    /// `Structure::resize`.
    pub fn entries(&self) -> Vec<(Ob, Ob)> {
        self.defined.iter().map(|arg| (arg, self.find(arg))).collect()
    }

    pub fn clear(&self) {
        for cell in self.forward.iter().chain(self.inverse.iter()) {
            cell.store(0, Ordering::Relaxed);
        }
        self.defined.zero();
    }

    pub fn validate(&self) {
        for arg in self.defined.iter() {
            let val = self.find(arg);
            pomagma_util::pomagma_assert!(
                self.carrier.support().contains(val),
                "InjectiveFunction({arg}) = {val} is unsupported"
            );
            pomagma_util::pomagma_assert!(
                self.inverse_find(val) == arg,
                "InjectiveFunction forward/inverse disagree at {arg} -> {val}"
            );
        }
    }

    /// Records `arg -> val`, merging `arg` with any existing preimage of `val` (injectivity),
    /// or merging `val` with any existing value of `arg` (functional consistency).
    pub fn insert(&self, arg: Ob, val: Ob) {
        let _guard = self.write_lock.lock();
        let old = self.forward[arg as usize].load(Ordering::Acquire);
        if old == 0 {
            let existing_arg = self.inverse[val as usize].load(Ordering::Acquire);
            if existing_arg == 0 {
                self.forward[arg as usize].store(val, Ordering::Release);
                self.inverse[val as usize].store(arg, Ordering::Release);
                self.defined.insert(arg);
            } else if existing_arg != arg {
                self.carrier.ensure_equal(existing_arg, arg);
            }
        } else if old != val {
            self.carrier.ensure_equal(old, val);
        }
    }

    /// Rewrites both maps so no reference to `dep` remains.
    pub fn unsafe_merge(&self, dep: Ob) {
        let rep = self.carrier.find(dep);

        if self.defined.contains(dep) {
            let val = self.forward[dep as usize].load(Ordering::Relaxed);
            self.forward[dep as usize].store(0, Ordering::Relaxed);
            self.defined.remove(dep);
            if self.defined.contains(rep) {
                let existing_val = self.forward[rep as usize].load(Ordering::Relaxed);
                if existing_val != val {
                    self.carrier.ensure_equal(existing_val, val);
                }
            } else {
                self.forward[rep as usize].store(val, Ordering::Relaxed);
                self.defined.insert(rep);
                self.inverse[val as usize].store(rep, Ordering::Relaxed);
            }
        }

        let key_of_dep = self.inverse[dep as usize].load(Ordering::Relaxed);
        if key_of_dep != 0 {
            self.inverse[dep as usize].store(0, Ordering::Relaxed);
            let existing_key = self.inverse[rep as usize].load(Ordering::Relaxed);
            if existing_key == 0 {
                self.inverse[rep as usize].store(key_of_dep, Ordering::Relaxed);
                self.forward[key_of_dep as usize].store(rep, Ordering::Relaxed);
            } else if existing_key != key_of_dep {
                self.carrier.ensure_equal(existing_key, key_of_dep);
                self.forward[key_of_dep as usize].store(rep, Ordering::Relaxed);
            }
        }
    }

    pub fn update_values(&self) {
        for arg in self.defined.iter() {
            let val = self.find(arg);
            let rep = self.carrier.find(val);
            if rep != val {
                self.forward[arg as usize].store(rep, Ordering::Relaxed);
                self.inverse[rep as usize].store(arg, Ordering::Relaxed);
            }
        }
    }
}

impl Table for InjectiveFunction {
    fn kind(&self) -> TableKind {
        TableKind::InjectiveFunction
    }
    fn validate(&self) {
        self.validate();
    }
    fn unsafe_merge(&self, dep: Ob) {
        self.unsafe_merge(dep);
    }
    fn update_values(&self) {
        self.update_values();
    }
    fn clear(&self) {
        self.clear();
    }
    fn count_items(&self) -> usize {
        self.count_items()
    }
    fn log_stats(&self, name: &str) {
        tracing::debug!(table = name, items = self.count_items(), "injective function stats");
    }
}

/// Row/column bit indices plus a `(lhs, rhs) -> val` hash map. The map is the source of truth;
/// `lx`/`rx` are rebuilt incrementally by `insert`/`unsafe_merge`.
pub struct BinaryFunction {
    carrier: Arc<Carrier>,
    lx: Vec<DenseSet>,
    rx: Vec<DenseSet>,
    values: RwLock<HashMap<(Ob, Ob), Ob>>,
}

impl BinaryFunction {
    pub fn new(carrier: Arc<Carrier>) -> Self {
        let item_dim = carrier.item_dim();
        let mut lx = Vec::with_capacity(item_dim as usize + 1);
        let mut rx = Vec::with_capacity(item_dim as usize + 1);
        for _ in 0..=item_dim {
            lx.push(DenseSet::new(item_dim));
            rx.push(DenseSet::new(item_dim));
        }
        BinaryFunction {
            carrier,
            lx,
            rx,
            values: RwLock::new(HashMap::new()),
        }
    }

    pub fn defined(&self, lhs: Ob, rhs: Ob) -> bool {
        self.lx[lhs as usize].contains(rhs)
    }

    pub fn find(&self, lhs: Ob, rhs: Ob) -> Ob {
        self.values.read().get(&(lhs, rhs)).copied().unwrap_or(0)
    }

    pub fn raw_insert(&self, lhs: Ob, rhs: Ob, val: Ob) {
        self.values.write().insert((lhs, rhs), val);
        self.lx[lhs as usize].insert(rhs);
        self.rx[rhs as usize].insert(lhs);
    }

    pub fn iter_lhs(&self, lhs: Ob) -> DenseSetIter<'_> {
        self.lx[lhs as usize].iter()
    }

    pub fn iter_rhs(&self, rhs: Ob) -> DenseSetIter<'_> {
        self.rx[rhs as usize].iter()
    }

    /// Iterates the `(lhs, rhs)` keys whose value is `val` (a value-preimage scan).
    pub fn iter_val(&self, val: Ob) -> Vec<(Ob, Ob)> {
        self.values
            .read()
            .iter()
            .filter(|(_, &v)| v == val)
            .map(|(&k, _)| k)
            .collect()
    }

    pub fn count_pairs(&self) -> usize {
        self.values.read().len()
    }

    /// Snapshots every `(lhs, rhs, val)` triple, sorted in row-major `(lhs, rhs)` order; used by
    /// snapshot I/O and by `Structure::resize`.
    pub fn entries(&self) -> Vec<(Ob, Ob, Ob)> {
        let mut out: Vec<(Ob, Ob, Ob)> = self
            .values
            .read()
            .iter()
            .map(|(&(lhs, rhs), &val)| (lhs, rhs, val))
            .collect();
        out.sort_unstable();
        out
    }

    pub fn clear(&self) {
        self.values.write().clear();
        for row in &self.lx {
            row.zero();
        }
        for col in &self.rx {
            col.zero();
        }
    }

    pub fn validate(&self) {
        let values = self.values.read();
        for (&(lhs, rhs), &val) in values.iter() {
            pomagma_util::pomagma_assert!(
                self.lx[lhs as usize].contains(rhs),
                "BinaryFunction map/line disagreement at ({lhs}, {rhs})"
            );
            pomagma_util::pomagma_assert!(
                self.carrier.find(val) == val,
                "BinaryFunction value {val} at ({lhs}, {rhs}) is not a rep"
            );
        }
    }

    /// Records `(lhs, rhs) -> val`, merging with the existing value if already defined.
    pub fn insert(&self, lhs: Ob, rhs: Ob, val: Ob) {
        let mut values = self.values.write();
        match values.get(&(lhs, rhs)).copied() {
            Some(existing) if existing != val => {
                drop(values);
                self.carrier.ensure_equal(existing, val);
            }
            Some(_) => {}
            None => {
                values.insert((lhs, rhs), val);
                drop(values);
                self.lx[lhs as usize].insert(rhs);
                self.rx[rhs as usize].insert(lhs);
            }
        }
    }

    /// Two-pass merge cascade: dep-as-rhs, then dep-as-lhs, then line
    /// union.
    pub fn unsafe_merge(&self, dep: Ob) {
        let rep = self.carrier.find(dep);

        // pass 1: dep as rhs
        let lhs_with_dep: Vec<Ob> = self.rx[dep as usize].iter().collect();
        for lhs in lhs_with_dep {
            let val = {
                let mut values = self.values.write();
                values.remove(&(lhs, dep)).expect("line/map agreement")
            };
            let mut values = self.values.write();
            match values.get(&(lhs, rep)).copied() {
                Some(existing) => {
                    if existing != val {
                        drop(values);
                        self.carrier.ensure_equal(existing, val);
                    }
                }
                None => {
                    values.insert((lhs, rep), val);
                    drop(values);
                    self.lx[lhs as usize].insert(rep);
                    self.rx[rep as usize].insert(lhs);
                }
            }
            self.lx[lhs as usize].remove(dep);
        }

        // pass 2: dep as lhs
        let rep = self.carrier.find(rep);
        let rhs_with_dep: Vec<Ob> = self.lx[dep as usize].iter().collect();
        for rhs in rhs_with_dep {
            let val = {
                let mut values = self.values.write();
                values.remove(&(dep, rhs)).expect("line/map agreement")
            };
            let mut values = self.values.write();
            match values.get(&(rep, rhs)).copied() {
                Some(existing) => {
                    if existing != val {
                        drop(values);
                        self.carrier.ensure_equal(existing, val);
                    }
                }
                None => {
                    values.insert((rep, rhs), val);
                    drop(values);
                    self.lx[rep as usize].insert(rhs);
                    self.rx[rhs as usize].insert(rep);
                }
            }
            self.rx[rhs as usize].remove(dep);
        }

        // merge line sets
        let dep_lx = self.lx[dep as usize].clone();
        self.lx[rep as usize].merge(&dep_lx);
        self.lx[dep as usize].zero();
        let dep_rx = self.rx[dep as usize].clone();
        self.rx[rep as usize].merge(&dep_rx);
        self.rx[dep as usize].zero();
    }

    pub fn update_values(&self) {
        let mut values = self.values.write();
        let stale: Vec<((Ob, Ob), Ob)> = values
            .iter()
            .filter_map(|(&k, &v)| {
                let rep = self.carrier.find(v);
                if rep != v {
                    Some((k, rep))
                } else {
                    None
                }
            })
            .collect();
        for (k, rep) in stale {
            values.insert(k, rep);
        }
    }
}

impl Table for BinaryFunction {
    fn kind(&self) -> TableKind {
        TableKind::BinaryFunction
    }
    fn validate(&self) {
        self.validate();
    }
    fn unsafe_merge(&self, dep: Ob) {
        self.unsafe_merge(dep);
    }
    fn update_values(&self) {
        self.update_values();
    }
    fn clear(&self) {
        self.clear();
    }
    fn count_items(&self) -> usize {
        self.count_pairs()
    }
    fn log_stats(&self, name: &str) {
        tracing::debug!(table = name, pairs = self.count_pairs(), "binary function stats");
    }
}

/// Like [`BinaryFunction`], but every key is canonicalized to `(min(lhs, rhs), max(lhs, rhs))` on
/// both insert and find, and `lx`/`rx` coincide (a single line set per ob).
pub struct SymmetricFunction {
    carrier: Arc<Carrier>,
    lines: Vec<DenseSet>,
    values: RwLock<HashMap<(Ob, Ob), Ob>>,
}

fn sorted_pair(i: Ob, j: Ob) -> (Ob, Ob) {
    if i <= j {
        (i, j)
    } else {
        (j, i)
    }
}

impl SymmetricFunction {
    pub fn new(carrier: Arc<Carrier>) -> Self {
        let item_dim = carrier.item_dim();
        let mut lines = Vec::with_capacity(item_dim as usize + 1);
        for _ in 0..=item_dim {
            lines.push(DenseSet::new(item_dim));
        }
        SymmetricFunction {
            carrier,
            lines,
            values: RwLock::new(HashMap::new()),
        }
    }

    pub fn defined(&self, lhs: Ob, rhs: Ob) -> bool {
        let (i, j) = sorted_pair(lhs, rhs);
        self.lines[i as usize].contains(j)
    }

    pub fn find(&self, lhs: Ob, rhs: Ob) -> Ob {
        self.values
            .read()
            .get(&sorted_pair(lhs, rhs))
            .copied()
            .unwrap_or(0)
    }

    pub fn raw_insert(&self, lhs: Ob, rhs: Ob, val: Ob) {
        let (i, j) = sorted_pair(lhs, rhs);
        self.values.write().insert((i, j), val);
        self.lines[i as usize].insert(j);
        self.lines[j as usize].insert(i);
    }

    pub fn iter_lhs(&self, lhs: Ob) -> DenseSetIter<'_> {
        self.lines[lhs as usize].iter()
    }

    pub fn iter_rhs(&self, rhs: Ob) -> DenseSetIter<'_> {
        self.lines[rhs as usize].iter()
    }

    pub fn iter_val(&self, val: Ob) -> Vec<(Ob, Ob)> {
        self.values
            .read()
            .iter()
            .filter(|(_, &v)| v == val)
            .map(|(&k, _)| k)
            .collect()
    }

    pub fn count_pairs(&self) -> usize {
        self.values.read().len()
    }

    /// Snapshots every canonicalized `(i, j, val)` triple with `i <= j`, sorted; used by snapshot
    /// I/O and by `Structure::resize`.
    pub fn entries(&self) -> Vec<(Ob, Ob, Ob)> {
        let mut out: Vec<(Ob, Ob, Ob)> = self
            .values
            .read()
            .iter()
            .map(|(&(i, j), &val)| (i, j, val))
            .collect();
        out.sort_unstable();
        out
    }

    pub fn clear(&self) {
        self.values.write().clear();
        for line in &self.lines {
            line.zero();
        }
    }

    pub fn validate(&self) {
        let values = self.values.read();
        for (&(i, j), &val) in values.iter() {
            pomagma_util::pomagma_assert!(i <= j, "SymmetricFunction key out of order: ({i}, {j})");
            pomagma_util::pomagma_assert!(
                self.lines[i as usize].contains(j) && self.lines[j as usize].contains(i),
                "SymmetricFunction map/line disagreement at ({i}, {j})"
            );
            pomagma_util::pomagma_assert!(
                self.carrier.find(val) == val,
                "SymmetricFunction value {val} at ({i}, {j}) is not a rep"
            );
        }
    }

    pub fn insert(&self, lhs: Ob, rhs: Ob, val: Ob) {
        let key = sorted_pair(lhs, rhs);
        let mut values = self.values.write();
        match values.get(&key).copied() {
            Some(existing) if existing != val => {
                drop(values);
                self.carrier.ensure_equal(existing, val);
            }
            Some(_) => {}
            None => {
                values.insert(key, val);
                drop(values);
                self.lines[key.0 as usize].insert(key.1);
                self.lines[key.1 as usize].insert(key.0);
            }
        }
    }

    /// As [`BinaryFunction::unsafe_merge`], but the `(dep, dep) -> val` diagonal case is
    /// relocated to `(rep, rep)` first.
    pub fn unsafe_merge(&self, dep: Ob) {
        let rep = self.carrier.find(dep);

        if let Some(diag_val) = self.values.write().remove(&(dep, dep)) {
            self.lines[dep as usize].remove(dep);
            let mut values = self.values.write();
            match values.get(&(rep, rep)).copied() {
                Some(existing) if existing != diag_val => {
                    drop(values);
                    self.carrier.ensure_equal(existing, diag_val);
                }
                Some(_) => {}
                None => {
                    values.insert((rep, rep), diag_val);
                    drop(values);
                    self.lines[rep as usize].insert(rep);
                }
            }
        }

        let others: Vec<Ob> = self.lines[dep as usize]
            .iter()
            .filter(|&k| k != dep)
            .collect();
        for other in others {
            let key = sorted_pair(dep, other);
            let val = {
                let mut values = self.values.write();
                match values.remove(&key) {
                    Some(v) => v,
                    None => continue,
                }
            };
            self.lines[other as usize].remove(dep);
            let new_key = sorted_pair(rep, other);
            let mut values = self.values.write();
            match values.get(&new_key).copied() {
                Some(existing) => {
                    if existing != val {
                        drop(values);
                        self.carrier.ensure_equal(existing, val);
                    }
                }
                None => {
                    values.insert(new_key, val);
                    drop(values);
                    self.lines[new_key.0 as usize].insert(new_key.1);
                    self.lines[new_key.1 as usize].insert(new_key.0);
                }
            }
        }
        self.lines[dep as usize].zero();
    }

    pub fn update_values(&self) {
        let mut values = self.values.write();
        let stale: Vec<((Ob, Ob), Ob)> = values
            .iter()
            .filter_map(|(&k, &v)| {
                let rep = self.carrier.find(v);
                if rep != v {
                    Some((k, rep))
                } else {
                    None
                }
            })
            .collect();
        for (k, rep) in stale {
            values.insert(k, rep);
        }
    }
}

impl Table for SymmetricFunction {
    fn kind(&self) -> TableKind {
        TableKind::SymmetricFunction
    }
    fn validate(&self) {
        self.validate();
    }
    fn unsafe_merge(&self, dep: Ob) {
        self.unsafe_merge(dep);
    }
    fn update_values(&self) {
        self.update_values();
    }
    fn clear(&self) {
        self.clear();
    }
    fn count_items(&self) -> usize {
        self.count_pairs()
    }
    fn log_stats(&self, name: &str) {
        tracing::debug!(table = name, pairs = self.count_pairs(), "symmetric function stats");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nullary_function_insert_then_merge_conflicting_values() {
        let carrier = Arc::new(Carrier::new(10));
        for _ in 0..5 {
            carrier.unsafe_insert();
        }
        let fun = NullaryFunction::new(carrier.clone());
        fun.insert(4);
        fun.insert(2);
        assert_eq!(fun.find(), 2);
        assert_eq!(carrier.find(4), 2);
    }

    #[test]
    fn injective_function_collision_merges_keys() {
        let carrier = Arc::new(Carrier::new(10));
        for _ in 0..5 {
            carrier.unsafe_insert();
        }
        let fun = InjectiveFunction::new(carrier.clone());
        fun.insert(1, 5);
        fun.insert(3, 5);
        assert_eq!(carrier.find(3), carrier.find(1));
    }

    #[test]
    fn binary_function_merge_cascade_scenario() {
        // merge cascade scenario: two values for one key force a merge.
        let carrier = Arc::new(Carrier::new(10));
        for _ in 0..5 {
            carrier.unsafe_insert();
        }
        let fun = BinaryFunction::new(carrier.clone());
        fun.insert(2, 3, 4);
        fun.insert(2, 3, 5);
        assert_eq!(carrier.find(4), carrier.find(5));
        assert_eq!(carrier.rep_count(), 4);
    }

    #[test]
    fn binary_function_functional_consistency_scenario() {
        // functional-consistency scenario: merging keys forces their values to merge too.
        let carrier = Arc::new(Carrier::new(10));
        for _ in 0..5 {
            carrier.unsafe_insert();
        }
        let fun = BinaryFunction::new(carrier.clone());
        fun.insert(1, 2, 3);
        fun.insert(1, 4, 5);
        carrier.merge(4, 2);
        fun.unsafe_merge(4);
        fun.update_values();
        assert_eq!(carrier.find(3), carrier.find(5));
        assert_eq!(fun.find(1, carrier.find(2)), carrier.find(3));
        fun.validate();
    }

    #[test]
    fn symmetric_function_canonicalizes_key_order() {
        let carrier = Arc::new(Carrier::new(10));
        for _ in 0..5 {
            carrier.unsafe_insert();
        }
        let fun = SymmetricFunction::new(carrier);
        fun.insert(3, 1, 5);
        assert_eq!(fun.find(1, 3), 5);
        assert_eq!(fun.find(3, 1), 5);
    }
}
