//! The uniform contract every relation/function table satisfies, so the merge scheduler and
//! signature can drive all six kinds without downcasting.

use pomagma_util::Ob;

/// Which of the six table kinds a [`Table`] implements; used by `Signature` to key lookups and
/// by snapshot I/O to pick a section codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    UnaryRelation,
    BinaryRelation,
    NullaryFunction,
    InjectiveFunction,
    BinaryFunction,
    SymmetricFunction,
}

impl TableKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableKind::UnaryRelation => "unary_relation",
            TableKind::BinaryRelation => "binary_relation",
            TableKind::NullaryFunction => "nullary_function",
            TableKind::InjectiveFunction => "injective_function",
            TableKind::BinaryFunction => "binary_function",
            TableKind::SymmetricFunction => "symmetric_function",
        }
    }
}

/// Common interface over the five table kinds, used by the merge scheduler (`unsafe_merge`,
/// `update_values`) and by `Structure` (`validate`, `clear`, `log_stats`).
///
/// `unsafe_merge` and `update_values` are only ever called while the scheduler holds the
/// exclusive merge-phase lock; everything else may be called concurrently with other tables'
/// safe operations.
pub trait Table: Send + Sync {
    fn kind(&self) -> TableKind;

    /// Checks every invariant for this table; requires exclusive access (the scheduler's merge
    /// phase, or a quiescent structure).
    fn validate(&self);

    /// Rewrites the table so no reference to `dep` remains, redirecting it to its current rep.
    /// May cascade further merges through the carrier.
    fn unsafe_merge(&self, dep: Ob);

    /// After a batch of merges, replaces every stored value with its current rep.
    fn update_values(&self);

    fn clear(&self);

    fn count_items(&self) -> usize;

    fn log_stats(&self, name: &str);
}
