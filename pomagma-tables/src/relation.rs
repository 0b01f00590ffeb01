//! `UnaryRelation` and `BinaryRelation`: the two relation table kinds. Both store only
//! membership, so `update_values` is a no-op for them — there is nothing but the bits themselves.

use std::sync::Arc;

use pomagma_carrier::Carrier;
use pomagma_dense_set::{DenseSet, DenseSetIter};
use pomagma_util::{Ob, PomagmaError, Result};

use crate::table::{Table, TableKind};

/// A `DenseSet` over the carrier's support, i.e. a unary predicate on obs.
pub struct UnaryRelation {
    carrier: Arc<Carrier>,
    set: DenseSet,
}

impl UnaryRelation {
    pub fn new(carrier: Arc<Carrier>) -> Self {
        let item_dim = carrier.item_dim();
        UnaryRelation {
            carrier,
            set: DenseSet::new(item_dim),
        }
    }

    /// Bulk-load interface used by snapshot I/O; caller guarantees no concurrent merges.
    pub fn raw_insert(&self, ob: Ob) {
        self.set.insert(ob);
    }

    pub fn find(&self, ob: Ob) -> bool {
        self.set.contains(ob)
    }

    /// Idempotent concurrent insert; returns whether this call newly added `ob`.
    pub fn insert(&self, ob: Ob) -> bool {
        self.set.try_insert(ob)
    }

    pub fn iter(&self) -> DenseSetIter<'_> {
        self.set.iter()
    }

    pub fn count_items(&self) -> usize {
        self.set.count_items()
    }

    pub fn clear(&self) {
        self.set.zero();
    }

    pub fn validate(&self) {
        for ob in self.set.iter() {
            pomagma_util::pomagma_assert!(
                self.carrier.support().contains(ob),
                "UnaryRelation contains unsupported ob {ob}"
            );
        }
    }

    /// `self` and `other` (a declared negation pair) must never agree on the same ob. Unlike
    /// [`Self::validate`], this reports a violation as [`PomagmaError::InconsistencyDetected`]
    /// rather than aborting: disjointness can be broken by ordinary inference (a forward-chaining
    /// bug or a genuinely inconsistent theory), not just a programmer error.
    pub fn validate_disjoint(&self, relation: &str, negation: &str, other: &UnaryRelation) -> Result<()> {
        for ob in self.set.iter() {
            if other.set.contains(ob) {
                return Err(PomagmaError::InconsistencyDetected {
                    relation: relation.to_string(),
                    negation: negation.to_string(),
                    lhs: ob,
                    rhs: 0,
                });
            }
        }
        Ok(())
    }

    pub fn unsafe_merge(&self, dep: Ob) {
        if self.set.contains(dep) {
            let rep = self.carrier.find(dep);
            self.set.remove(dep);
            self.set.insert(rep);
        }
    }
}

impl Table for UnaryRelation {
    fn kind(&self) -> TableKind {
        TableKind::UnaryRelation
    }

    fn validate(&self) {
        self.validate();
    }

    fn unsafe_merge(&self, dep: Ob) {
        self.unsafe_merge(dep);
    }

    fn update_values(&self) {}

    fn clear(&self) {
        self.clear();
    }

    fn count_items(&self) -> usize {
        self.count_items()
    }

    fn log_stats(&self, name: &str) {
        tracing::debug!(table = name, items = self.count_items(), "unary relation stats");
    }
}

/// Two cache-aligned bit matrices over the support: `lx[x]` is the row of `y` with `(x,y)` in
/// the relation, `rx[y]` is the column of `x`. Both are kept in sync on every mutation.
pub struct BinaryRelation {
    carrier: Arc<Carrier>,
    lx: Vec<DenseSet>,
    rx: Vec<DenseSet>,
}

impl BinaryRelation {
    pub fn new(carrier: Arc<Carrier>) -> Self {
        let item_dim = carrier.item_dim();
        let mut lx = Vec::with_capacity(item_dim as usize + 1);
        let mut rx = Vec::with_capacity(item_dim as usize + 1);
        for _ in 0..=item_dim {
            lx.push(DenseSet::new(item_dim));
            rx.push(DenseSet::new(item_dim));
        }
        BinaryRelation { carrier, lx, rx }
    }

    fn item_dim(&self) -> u32 {
        self.carrier.item_dim()
    }

    pub fn raw_insert(&self, lhs: Ob, rhs: Ob) {
        self.lx[lhs as usize].insert(rhs);
        self.rx[rhs as usize].insert(lhs);
    }

    pub fn find(&self, lhs: Ob, rhs: Ob) -> bool {
        self.lx[lhs as usize].contains(rhs)
    }

    pub fn insert(&self, lhs: Ob, rhs: Ob) {
        self.lx[lhs as usize].insert(rhs);
        self.rx[rhs as usize].insert(lhs);
    }

    pub fn iter_lhs(&self, lhs: Ob) -> DenseSetIter<'_> {
        self.lx[lhs as usize].iter()
    }

    pub fn iter_rhs(&self, rhs: Ob) -> DenseSetIter<'_> {
        self.rx[rhs as usize].iter()
    }

    pub fn count_pairs(&self) -> usize {
        self.lx.iter().map(|row| row.count_items()).sum()
    }

    /// Snapshots every `(lhs, rhs)` pair in row-major order; used by snapshot I/O and by
    /// `Structure::resize` to replay a table's contents into a freshly sized one.
    pub fn entries(&self) -> Vec<(Ob, Ob)> {
        let mut out = Vec::new();
        for lhs in 1..=self.item_dim() {
            for rhs in self.lx[lhs as usize].iter() {
                out.push((lhs, rhs));
            }
        }
        out
    }

    pub fn clear(&self) {
        for row in &self.lx {
            row.zero();
        }
        for col in &self.rx {
            col.zero();
        }
    }

    pub fn validate(&self) {
        let support = self.carrier.support();
        for i in 1..=self.item_dim() {
            if !support.contains(i) {
                pomagma_util::pomagma_assert!(
                    self.lx[i as usize].is_empty() && self.rx[i as usize].is_empty(),
                    "BinaryRelation has bits at unsupported ob {i}"
                );
                continue;
            }
            for j in self.lx[i as usize].iter() {
                pomagma_util::pomagma_assert!(
                    self.rx[j as usize].contains(i),
                    "Lx,Rx disagree at ({i}, {j})"
                );
            }
        }
    }

    /// `self` and `other` (a declared negation pair) must never agree on the same pair. Reports a
    /// violation as [`PomagmaError::InconsistencyDetected`] rather than aborting: disjointness can
    /// be broken by ordinary inference, not just a programmer error.
    pub fn validate_disjoint(&self, relation: &str, negation: &str, other: &BinaryRelation) -> Result<()> {
        for i in self.carrier.iter() {
            for j in self.lx[i as usize].iter_and(&other.lx[i as usize]) {
                return Err(PomagmaError::InconsistencyDetected {
                    relation: relation.to_string(),
                    negation: negation.to_string(),
                    lhs: i,
                    rhs: j,
                });
            }
        }
        Ok(())
    }

    /// Rewrites every pair referencing `dep` (as lhs or rhs) so it instead references
    /// `carrier.find(dep)`, via the two-pass row/column merge.
    pub fn unsafe_merge(&self, dep: Ob) {
        let rep = self.carrier.find(dep);
        pomagma_util::pomagma_assert!(rep < dep, "BinaryRelation merge out of order");
        let item_dim = self.item_dim();

        // merge rows (dep, _) into (rep, _)
        let dep_row = self.lx[dep as usize].clone();
        for k in dep_row.iter() {
            self.rx[k as usize].remove(dep);
        }
        let mut diff = DenseSet::new(item_dim);
        if self.lx[rep as usize].ensure(&dep_row, &mut diff) {
            for k in diff.iter() {
                self.rx[k as usize].insert(rep);
            }
        }
        self.lx[dep as usize].zero();

        // merge cols (_, dep) into (_, rep)
        let dep_col = self.rx[dep as usize].clone();
        for k in dep_col.iter() {
            self.lx[k as usize].remove(dep);
        }
        let mut diff = DenseSet::new(item_dim);
        if self.rx[rep as usize].ensure(&dep_col, &mut diff) {
            for k in diff.iter() {
                self.lx[k as usize].insert(rep);
            }
        }
        self.rx[dep as usize].zero();
    }
}

impl Table for BinaryRelation {
    fn kind(&self) -> TableKind {
        TableKind::BinaryRelation
    }

    fn validate(&self) {
        self.validate();
    }

    fn unsafe_merge(&self, dep: Ob) {
        self.unsafe_merge(dep);
    }

    fn update_values(&self) {}

    fn clear(&self) {
        self.clear();
    }

    fn count_items(&self) -> usize {
        self.count_pairs()
    }

    fn log_stats(&self, name: &str) {
        tracing::debug!(table = name, pairs = self.count_pairs(), "binary relation stats");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unary_relation_insert_find() {
        let carrier = Arc::new(Carrier::new(10));
        for _ in 0..5 {
            carrier.unsafe_insert();
        }
        let rel = UnaryRelation::new(carrier);
        assert!(!rel.find(3));
        assert!(rel.insert(3));
        assert!(rel.find(3));
        assert!(!rel.insert(3));
        rel.validate();
    }

    #[test]
    fn unary_relation_unsafe_merge_moves_membership_to_rep() {
        let carrier = Arc::new(Carrier::new(10));
        for _ in 0..5 {
            carrier.unsafe_insert();
        }
        let rel = UnaryRelation::new(carrier.clone());
        rel.insert(4);
        carrier.merge(4, 2);
        rel.unsafe_merge(4);
        assert!(!rel.find(4));
        assert!(rel.find(2));
    }

    #[test]
    fn binary_relation_insert_sets_both_lines() {
        let carrier = Arc::new(Carrier::new(10));
        for _ in 0..5 {
            carrier.unsafe_insert();
        }
        let rel = BinaryRelation::new(carrier);
        rel.insert(1, 3);
        assert!(rel.find(1, 3));
        assert!(rel.iter_rhs(3).any(|x| x == 1));
        assert!(rel.iter_lhs(1).any(|x| x == 3));
    }

    #[test]
    fn binary_relation_unsafe_merge_preserves_pairs() {
        let carrier = Arc::new(Carrier::new(10));
        for _ in 0..5 {
            carrier.unsafe_insert();
        }
        let rel = BinaryRelation::new(carrier.clone());
        rel.insert(4, 5);
        rel.insert(3, 4);
        carrier.merge(4, 2);
        rel.unsafe_merge(4);
        assert!(rel.find(2, 5));
        assert!(rel.find(3, 2));
        rel.validate();
    }
}
