//! `pomagma-solve`: runs the router's relaxation to a fixed point against a structure and a
//! language, writing the resulting ob -> shortest-route table to disk.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use pomagma_analysis::{Language, Router, DEFAULT_MAX_ROUNDS};
use pomagma_cli::{common, fail, parse_args, CommonArgs};
use pomagma_simplify::RouteTable;
use pomagma_structure::Structure;

/// Relaxes a weighted language's routes to a fixed point and dumps the resulting route table.
#[derive(Parser, Debug)]
#[command(name = "pomagma-solve")]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// Path to the structure snapshot to solve over.
    structure_in: PathBuf,

    /// Path to write the solved ob -> route table to, as JSON.
    routes_out: PathBuf,

    /// Relative-change tolerance at which relaxation is considered converged.
    #[arg(long, default_value_t = 1e-6)]
    reltol: f64,

    /// Upper bound on relaxation rounds, in case convergence is never reached.
    #[arg(long, default_value_t = DEFAULT_MAX_ROUNDS)]
    max_rounds: usize,
}

fn main() {
    let args: Args = parse_args();
    let _guard = args.common.init_tracing();

    let structure = match Structure::load(&args.structure_in) {
        Ok(s) => s,
        Err(e) => fail(e),
    };
    let language = match args.common.language.as_deref() {
        Some(path) => match Language::load(path) {
            Ok(l) => l,
            Err(e) => fail(e),
        },
        None => Language::from_weights(HashMap::new()),
    };

    let structure = Arc::new(structure);
    let router = Router::new(structure.clone(), language);
    let rounds_run = router.solve(args.reltol, args.max_rounds);
    tracing::info!(rounds_run, "router relaxation finished");

    let routes: HashMap<String, String> = structure
        .carrier()
        .iter()
        .filter(|&ob| ob == structure.carrier().find(ob))
        .map(|ob| (ob.to_string(), router.route(ob)))
        .collect();
    tracing::info!(routed = routes.len(), "router converged");

    let text = match serde_json::to_string_pretty(&routes) {
        Ok(t) => t,
        Err(e) => fail(e),
    };
    if let Err(e) = std::fs::write(&args.routes_out, text) {
        fail(e);
    }
    std::process::exit(common::EXIT_SUCCESS);
}
