//! Derived analyses over a congruence-closed [`pomagma_structure::Structure`]: a serialized
//! [`Language`] of symbol weights, the shortest-[`Router`] it drives, a
//! weighted-random [`Sampler`], and the housekeeping passes [`Aggregator`] and [`Compactor`] that
//! merge structures and renumber them afterward.

mod aggregator;
mod compactor;
mod language;
mod router;
mod sampler;

pub use aggregator::{Aggregator, Translation};
pub use compactor::Compactor;
pub use language::{Language, RawLanguage};
pub use router::{Router, DEFAULT_MAX_ROUNDS};
pub use sampler::{SampleOutcome, Sampler};
