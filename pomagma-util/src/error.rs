use thiserror::Error;

/// The error kinds recoverable at a call boundary.
///
/// Programmer errors (bad arity, merging out of order, referencing an absent ob) are not
/// represented here: they fire [`pomagma_assert!`](crate::pomagma_assert) instead, which panics in
/// debug builds and is compiled out in release.
#[derive(Debug, Error)]
pub enum PomagmaError {
    #[error("capacity exceeded: carrier is full at item_dim {item_dim}")]
    CapacityExceeded { item_dim: u32 },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("inconsistency detected: {relation} and {negation} both hold for ({lhs}, {rhs})")]
    InconsistencyDetected {
        relation: String,
        negation: String,
        lhs: u32,
        rhs: u32,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("digest mismatch: expected {expected}, found {found}")]
    DigestMismatch { expected: String, found: String },

    #[error("encode error: {0}")]
    Encode(#[from] Box<bincode::ErrorKind>),

    #[error("blob ref {0} does not name a 40-byte hex digest")]
    MalformedBlobRef(String),

    #[error("unknown table: {0}")]
    UnknownTable(String),
}

pub type Result<T> = std::result::Result<T, PomagmaError>;

/// Panics with a formatted message in debug builds; compiled to nothing in release builds.
///
/// Used only to catch programmer errors (a contract violation a caller could have checked in
/// advance), never recoverable runtime conditions.
#[macro_export]
macro_rules! pomagma_assert {
    ($cond:expr, $($arg:tt)*) => {
        #[cfg(debug_assertions)]
        {
            if !($cond) {
                panic!("pomagma assertion failed: {}", format!($($arg)*));
            }
        }
    };
}
