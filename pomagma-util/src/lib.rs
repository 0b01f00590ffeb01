//! Ambient stack shared by every pomagma crate: the error enum, the debug-only assertion macro,
//! environment-variable configuration names, tracing initialization, and the delta codec used by
//! the snapshot format.

pub mod codec;
pub mod compression;
pub mod config;
pub mod error;
pub mod tracing_init;

pub use error::{PomagmaError, Result};
pub use tracing_init::{init_tracing, TracingGuard};

/// The dense integer identifier type used throughout the carrier and its tables.
///
/// Fixed at `u32` (the "macro" build width): `0` means "absent", present obs are `1..=item_dim`.
pub type Ob = u32;

/// Upper bound on `item_dim`, one less than `Ob::MAX` so that `0` is free to mean "absent".
pub const MAX_ITEM_DIM: Ob = Ob::MAX - 1;
