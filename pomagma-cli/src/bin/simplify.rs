//! `pomagma-simplify`: reduces every expression in a program file against a structure, printing
//! one reduced route per line. Routes come from a `Router` solved against the supplied language
//! (or an unweighted decimal fallback if no language is given).

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use pomagma_analysis::{Language, Router, DEFAULT_MAX_ROUNDS};
use pomagma_cli::{common, fail, parse_args, CommonArgs};
use pomagma_simplify::{NoRoutes, RouteTable, Simplifier};
use pomagma_structure::Structure;

/// Reduces each line of a program file to its shortest known route.
#[derive(Parser, Debug)]
#[command(name = "pomagma-simplify")]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// Path to the structure snapshot to simplify against.
    structure_in: PathBuf,

    /// Path to a program file: one space-delimited prefix expression per line.
    program_in: PathBuf,
}

fn main() {
    let args: Args = parse_args();
    let _guard = args.common.init_tracing();

    let structure = match Structure::load(&args.structure_in) {
        Ok(s) => s,
        Err(e) => fail(e),
    };
    let text = match fs::read_to_string(&args.program_in) {
        Ok(t) => t,
        Err(e) => fail(e),
    };

    let structure = Arc::new(structure);
    let router = args.common.language.as_deref().map(|path| match Language::load(path) {
        Ok(language) => {
            let router = Router::new(structure.clone(), language);
            router.solve(1e-6, DEFAULT_MAX_ROUNDS);
            router
        }
        Err(e) => fail(e),
    });
    let routes: &dyn RouteTable = match &router {
        Some(r) => r,
        None => &NoRoutes,
    };

    let simplifier = Simplifier::new(structure.as_ref(), routes);
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (reduced, errors) = simplifier.simplify(line);
        println!("{}", reduced.route);
        for err in errors {
            tracing::warn!(expr = line, error = %err, "simplify error");
        }
    }

    std::process::exit(common::EXIT_SUCCESS);
}
