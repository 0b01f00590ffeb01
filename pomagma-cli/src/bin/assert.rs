//! `pomagma-assert`: loads a structure snapshot, asserts every fact in a facts file against it,
//! drains the resulting merges to a fixed point, and dumps the grown structure back out.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use pomagma_cli::{common, fail, parse_args, CommonArgs};
use pomagma_scheduler::Scheduler;
use pomagma_structure::Structure;

/// Asserts a batch of facts (one prefix-notation expression per line) against a structure.
#[derive(Parser, Debug)]
#[command(name = "pomagma-assert")]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// Path to the structure snapshot to grow.
    structure_in: PathBuf,

    /// Path to a facts file: one `EQUAL <expr> <expr>` or `<relation> <expr...>` line per fact.
    facts_in: PathBuf,

    /// Path to write the grown structure snapshot to.
    structure_out: PathBuf,
}

fn main() {
    let args: Args = parse_args();
    let _guard = args.common.init_tracing();

    let structure = match Structure::load(&args.structure_in) {
        Ok(s) => s,
        Err(e) => fail(e),
    };
    let text = match fs::read_to_string(&args.facts_in) {
        Ok(t) => t,
        Err(e) => fail(e),
    };

    let structure = Arc::new(structure);
    let scheduler = Scheduler::new(structure.clone());

    let mut asserted = 0usize;
    let mut failed = 0usize;
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match pomagma_cli::assert_fact(&structure, line) {
            Ok(()) => asserted += 1,
            Err(e) => {
                tracing::warn!(line, error = %e, "failed to assert fact");
                failed += 1;
            }
        }
        scheduler.drain_merges();
    }
    tracing::info!(asserted, failed, "facts applied");
    structure.log_stats();

    if let Err(e) = structure.dump(&args.structure_out) {
        fail(e);
    }
    std::process::exit(common::EXIT_SUCCESS);
}
