//! Names of the environment variables every pomagma binary reads, and the small amount of parsing
//! logic shared across them. Individual binaries (in `pomagma-cli`) bind these to `clap` fields
//! via `#[arg(long, env = ...)]` so that every flag doubles as an environment variable.

/// Initial `item_dim` for a freshly created structure.
pub const ENV_SIZE: &str = "POMAGMA_SIZE";
/// Path to append structured logs to, in addition to stderr.
pub const ENV_LOG_FILE: &str = "POMAGMA_LOG_FILE";
/// `tracing_subscriber::EnvFilter` directive string.
pub const ENV_LOG_LEVEL: &str = "POMAGMA_LOG_LEVEL";
/// Worker pool size; defaults to available parallelism when unset.
pub const ENV_THREADS: &str = "POMAGMA_THREADS";
/// Root directory for a structure's on-disk artifacts.
pub const ENV_ROOT: &str = "POMAGMA_ROOT";
/// Content-addressed blob store directory.
pub const ENV_BLOB_DIR: &str = "POMAGMA_BLOB_DIR";
/// Name of the theory (signature + negation table) to load.
pub const ENV_THEORY: &str = "POMAGMA_THEORY";
/// Path to a serialized language (term -> weight) file.
pub const ENV_LANGUAGE: &str = "POMAGMA_LANGUAGE";
/// Wall-clock or task budget for a survey/aggregate run.
pub const ENV_BUDGET: &str = "POMAGMA_BUDGET";

/// Number of worker threads to use, given an optional explicit override.
///
/// Mirrors the common `POMAGMA_THREADS` convention: an explicit positive value wins, otherwise
/// fall back to the number of available cores, with a floor of 1.
pub fn worker_count(explicit: Option<usize>) -> usize {
    explicit
        .filter(|&n| n > 0)
        .unwrap_or_else(|| std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1))
}
