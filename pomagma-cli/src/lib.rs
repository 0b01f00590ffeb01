//! Shared code behind the `pomagma-*` binaries: the common environment-variable
//! arguments, the symbols-file signature builder, and the facts-file term inserter.

pub mod common;
pub mod facts;
pub mod symbols;

pub use common::{fail, parse_args, CommonArgs, EXIT_FAILURE, EXIT_SUCCESS};
pub use facts::assert_fact;
pub use symbols::Symbols;
