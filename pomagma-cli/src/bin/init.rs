//! `pomagma-init`: builds a fresh structure from a symbols file and dumps it to disk.

use std::path::PathBuf;

use clap::Parser;

use pomagma_cli::{common, fail, parse_args, symbols::Symbols, CommonArgs};
use pomagma_structure::Structure;

/// Creates an empty structure for a theory and writes it to disk.
#[derive(Parser, Debug)]
#[command(name = "pomagma-init")]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// Path to a `*.symbols.json` file naming the theory's tables and negation pairs.
    symbols: PathBuf,

    /// Path to write the freshly initialized structure snapshot to.
    structure_out: PathBuf,
}

fn main() {
    let args: Args = parse_args();
    let _guard = args.common.init_tracing();

    let symbols = match Symbols::load(&args.symbols) {
        Ok(s) => s,
        Err(e) => fail(e),
    };
    let signature = symbols.build(args.common.size);
    let structure = Structure::with_signature(signature);
    structure.log_stats();

    if let Err(e) = structure.dump(&args.structure_out) {
        fail(e);
    }
    std::process::exit(common::EXIT_SUCCESS);
}
