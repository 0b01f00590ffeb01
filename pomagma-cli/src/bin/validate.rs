//! `pomagma-validate`: loads a structure snapshot and runs its full consistency check.
//!
//! Exit code doubles as the consistency verdict, matching the convention consistency tools use:
//! `EXIT_SUCCESS` for a consistent structure, `EXIT_FAILURE` both for usage errors and for a
//! structure found inconsistent.

use std::path::PathBuf;

use clap::Parser;

use pomagma_cli::{common, fail, parse_args, CommonArgs};
use pomagma_structure::Structure;

/// Validates a structure snapshot's invariants, including disjointness of every negation pair.
#[derive(Parser, Debug)]
#[command(name = "pomagma-validate")]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// Path to the structure snapshot to validate.
    structure_in: PathBuf,
}

fn main() {
    let args: Args = parse_args();
    let _guard = args.common.init_tracing();

    let structure = match Structure::load(&args.structure_in) {
        Ok(s) => s,
        Err(e) => fail(e),
    };
    structure.log_stats();

    match structure.validate() {
        Ok(()) => {
            tracing::info!("structure is consistent");
            std::process::exit(common::EXIT_SUCCESS);
        }
        Err(e) => {
            tracing::error!(error = %e, "structure is inconsistent");
            std::process::exit(common::EXIT_FAILURE);
        }
    }
}
