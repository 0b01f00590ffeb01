//! The five relation/function table kinds built on a shared [`pomagma_carrier::Carrier`]:
//! `UnaryRelation`, `BinaryRelation`, `NullaryFunction`, `InjectiveFunction`, `BinaryFunction`,
//! `SymmetricFunction`. Each keeps a hash map (or bitset, for relations) as the source of truth
//! plus bitset "lines" for fast iteration; the two are reconciled by `unsafe_merge` and
//! `update_values` during the merge scheduler's exclusive phase.

pub mod function;
pub mod relation;
pub mod table;

pub use function::{BinaryFunction, InjectiveFunction, NullaryFunction, SymmetricFunction};
pub use relation::{BinaryRelation, UnaryRelation};
pub use table::{Table, TableKind};
