//! Shared CLI surface: the environment-variable knobs every pomagma binary
//! accepts, and the exit-code convention (`0` success, `1` usage error; consistency tools also use
//! `1` to mean "inconsistent").

use std::path::PathBuf;

use clap::Parser;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;

/// The environment-variable knobs common to every binary. Individual
/// tools `#[command(flatten)]` this alongside their own positional path arguments.
#[derive(Parser, Debug, Clone)]
pub struct CommonArgs {
    /// Initial item_dim for a freshly created structure.
    #[arg(long, env = "POMAGMA_SIZE", default_value_t = 1 << 16)]
    pub size: u32,

    #[arg(long, env = "POMAGMA_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    #[arg(long, env = "POMAGMA_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[arg(long, env = "POMAGMA_THREADS")]
    pub threads: Option<usize>,

    #[arg(long, env = "POMAGMA_ROOT")]
    pub root: Option<PathBuf>,

    #[arg(long, env = "POMAGMA_BLOB_DIR")]
    pub blob_dir: Option<PathBuf>,

    #[arg(long, env = "POMAGMA_THEORY")]
    pub theory: Option<PathBuf>,

    #[arg(long, env = "POMAGMA_LANGUAGE")]
    pub language: Option<PathBuf>,

    #[arg(long, env = "POMAGMA_BUDGET")]
    pub budget: Option<u64>,
}

impl CommonArgs {
    pub fn init_tracing(&self) -> pomagma_util::TracingGuard {
        pomagma_util::init_tracing(&self.log_level, self.log_file.as_deref())
    }

    pub fn worker_count(&self) -> usize {
        pomagma_util::config::worker_count(self.threads)
    }
}

/// Parses `T` from the process arguments, exiting with [`EXIT_FAILURE`] and the usage message on
/// failure rather than clap's default exit code (0 success, 1 usage error).
pub fn parse_args<T: Parser>() -> T {
    match T::try_parse() {
        Ok(args) => args,
        Err(e) => {
            eprint!("{e}");
            std::process::exit(EXIT_FAILURE);
        }
    }
}

/// Prints `message` to stderr and exits with [`EXIT_FAILURE`].
pub fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("error: {message}");
    std::process::exit(EXIT_FAILURE);
}
