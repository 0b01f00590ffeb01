//! `Structure` wraps a [`Signature`] with the high-level operations a CLI tool or scheduler drives
//! directly: clearing, resizing, the two validation depths, and snapshot load/dump.

use std::sync::Arc;

use pomagma_carrier::Carrier;
use pomagma_util::Result;

use crate::signature::Signature;
use crate::snapshot;

/// A signature plus the operations that treat it as a single unit rather than a bag of tables.
pub struct Structure {
    signature: Signature,
}

impl Structure {
    pub fn new(item_dim: u32) -> Self {
        Structure {
            signature: Signature::with_default_theory_negations(item_dim),
        }
    }

    pub fn with_signature(signature: Signature) -> Self {
        Structure { signature }
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn signature_mut(&mut self) -> &mut Signature {
        &mut self.signature
    }

    pub fn carrier(&self) -> &Arc<Carrier> {
        self.signature.carrier()
    }

    pub fn clear(&self) {
        self.carrier().clear();
        for (_, table) in self.signature.all_tables() {
            table.clear();
        }
    }

    /// Allocates a larger carrier and every table again at the new `item_dim`, preserving the
    /// identity and union-find structure of every present ob and replaying every table entry.
    /// This always grows; shrinking is not supported.
    pub fn resize(&mut self, new_item_dim: u32) {
        if new_item_dim == self.carrier().item_dim() {
            return;
        }
        self.signature = self.signature.resized(new_item_dim);
    }

    /// Fast sanity pass: cardinalities and bit-line/map agreement for every table, but not the
    /// full recursive consistency scan `validate` performs.
    pub fn validate_consistent(&self) {
        self.carrier().validate();
        for (name, table) in self.signature.all_tables() {
            table.validate();
            let _ = name;
        }
    }

    /// Full validation: every table invariant, plus disjointness of every declared negation pair
    /// that happens to be a pair of [`pomagma_tables::UnaryRelation`]s or
    /// [`pomagma_tables::BinaryRelation`]s. Unlike the per-table invariant checks (programmer
    /// errors, which abort), a disjointness violation is returned so callers like
    /// `pomagma-validate` can report it as a distinct exit status rather than crashing.
    pub fn validate(&self) -> Result<()> {
        self.validate_consistent();
        for (name, _) in self.signature.all_tables() {
            if let Some(neg_name) = self.signature.negate(name) {
                if let (Some(pos), Some(neg)) = (
                    self.signature.unary_relation(name),
                    self.signature.unary_relation(neg_name),
                ) {
                    pos.validate_disjoint(name, neg_name, neg)?;
                }
                if let (Some(pos), Some(neg)) = (
                    self.signature.binary_relation(name),
                    self.signature.binary_relation(neg_name),
                ) {
                    pos.validate_disjoint(name, neg_name, neg)?;
                }
            }
        }
        Ok(())
    }

    pub fn log_stats(&self) {
        tracing::info!(
            item_count = self.carrier().item_count(),
            rep_count = self.carrier().rep_count(),
            "carrier stats"
        );
        for (name, table) in self.signature.all_tables() {
            table.log_stats(name);
        }
    }

    pub fn load(path: &std::path::Path) -> Result<Structure> {
        snapshot::load(path)
    }

    pub fn dump(&self, path: &std::path::Path) -> Result<()> {
        snapshot::dump(self, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_empties_carrier_and_tables() {
        let mut structure = Structure::new(10);
        let rel = structure.signature.declare_unary_relation("IS_ATOM");
        structure.carrier().unsafe_insert();
        rel.insert(1);
        structure.clear();
        assert_eq!(structure.carrier().item_count(), 0);
        assert_eq!(rel.count_items(), 0);
    }

    #[test]
    fn resize_preserves_identity_of_present_obs() {
        let mut structure = Structure::new(4);
        let a = structure.carrier().unsafe_insert();
        let b = structure.carrier().unsafe_insert();
        structure.resize(20);
        assert_eq!(structure.carrier().item_dim(), 20);
        assert!(structure.carrier().support().contains(a));
        assert!(structure.carrier().support().contains(b));
    }

    #[test]
    fn validate_consistent_passes_on_fresh_structure() {
        let structure = Structure::new(10);
        structure.validate_consistent();
    }

    #[test]
    fn validate_passes_when_negation_pair_is_disjoint() {
        let mut structure = Structure::new(10);
        for _ in 0..3 {
            structure.carrier().unsafe_insert();
        }
        let less = structure.signature.declare_unary_relation("LESS");
        let nless = structure.signature.declare_unary_relation("NLESS");
        less.insert(1);
        nless.insert(2);
        structure.validate().expect("disjoint relations must validate");
    }

    #[test]
    fn validate_reports_negation_pair_violation() {
        let mut structure = Structure::new(10);
        for _ in 0..3 {
            structure.carrier().unsafe_insert();
        }
        let less = structure.signature.declare_unary_relation("LESS");
        let nless = structure.signature.declare_unary_relation("NLESS");
        less.insert(1);
        nless.insert(1);
        let err = structure.validate().unwrap_err();
        assert!(matches!(err, pomagma_util::PomagmaError::InconsistencyDetected { .. }));
    }
}
