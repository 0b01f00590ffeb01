//! The signature, structure, and snapshot-format layer built on top of `pomagma-carrier` and
//! `pomagma-tables`: a named registry of tables sharing one carrier, the operations that treat
//! that registry as a single unit (clear, resize, validate, load, dump), and the on-disk snapshot
//! codec those load/dump operations use.

pub mod signature;
pub mod snapshot;
pub mod structure;

pub use signature::Signature;
pub use structure::Structure;
