//! `pomagma-serve`: binds the length-framed TCP protocol to a loaded structure, dispatching each
//! request to the Simplifier, Router, or structure validation as named by its oneof variant.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use parking_lot::Mutex;

use pomagma_analysis::{Language, Router, DEFAULT_MAX_ROUNDS};
use pomagma_cli::{common, fail, parse_args, CommonArgs};
use pomagma_simplify::{Simplifier, SEMI_TRUE};
use pomagma_protocol::{Handler, Request, Response, Server};
use pomagma_structure::Structure;

/// Serves `reduce`/`validate`/`simplify`/`validate_corpus`/`solve`/`get_histogram`/
/// `fit_language` requests over a length-framed TCP socket.
#[derive(Parser, Debug)]
#[command(name = "pomagma-serve")]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// Path to the structure snapshot to serve.
    structure_in: PathBuf,

    /// Address to bind, e.g. `127.0.0.1:9162`.
    #[arg(long, default_value = "127.0.0.1:9162")]
    bind: String,
}

struct PomagmaHandler {
    structure: Arc<Structure>,
    router: Router,
    histogram: Mutex<HashMap<String, u64>>,
}

impl PomagmaHandler {
    fn record_usage(&self, expr: &str) {
        let sig = self.structure.signature();
        let mut histogram = self.histogram.lock();
        for token in expr.split_whitespace() {
            if sig.nullary_function(token).is_some()
                || sig.injective_function(token).is_some()
                || sig.binary_function(token).is_some()
                || sig.symmetric_function(token).is_some()
                || sig.unary_relation(token).is_some()
                || sig.binary_relation(token).is_some()
            {
                *histogram.entry(token.to_string()).or_insert(0) += 1;
            }
        }
    }

    fn simplify(&self, expr: &str) -> (pomagma_simplify::Reduced, Vec<String>) {
        self.record_usage(expr);
        let simplifier = Simplifier::new(&self.structure, &self.router);
        simplifier.simplify(expr)
    }
}

impl Handler for PomagmaHandler {
    fn handle(&self, request: Request) -> Response {
        match request {
            Request::Reduce { expr } => {
                let (reduced, errors) = self.simplify(&expr);
                Response::Reduced {
                    ob: reduced.ob,
                    route: reduced.route,
                    errors,
                }
            }
            Request::Simplify { expr } => {
                let (reduced, errors) = self.simplify(&expr);
                Response::Simplified {
                    ob: reduced.ob,
                    route: reduced.route,
                    errors,
                }
            }
            Request::Validate => match self.structure.validate() {
                Ok(()) => Response::Validated {
                    consistent: true,
                    errors: Vec::new(),
                },
                Err(e) => Response::Validated {
                    consistent: false,
                    errors: vec![e.to_string()],
                },
            },
            Request::ValidateCorpus { exprs } => {
                let mut results = Vec::with_capacity(exprs.len());
                let mut errors = Vec::new();
                for expr in exprs {
                    let (reduced, expr_errors) = self.simplify(&expr);
                    results.push((expr, reduced.route == SEMI_TRUE));
                    errors.extend(expr_errors);
                }
                Response::CorpusValidated { results, errors }
            }
            Request::Solve { reltol, max_rounds } => {
                let rounds_run = self.router.solve(reltol, max_rounds);
                Response::Solved { rounds_run }
            }
            Request::GetHistogram => Response::Histogram {
                counts: self.histogram.lock().clone(),
            },
            Request::FitLanguage { usage } => {
                let fitted = self.router.refit(&usage);
                let weights = fitted.weights().clone();
                self.router.set_language(fitted);
                self.router.reset();
                Response::LanguageFitted { weights }
            }
        }
    }
}

fn main() {
    let args: Args = parse_args();
    let _guard = args.common.init_tracing();

    let structure = match Structure::load(&args.structure_in) {
        Ok(s) => s,
        Err(e) => fail(e),
    };
    let structure = Arc::new(structure);

    let language = match args.common.language.as_deref() {
        Some(path) => match Language::load(path) {
            Ok(l) => l,
            Err(e) => fail(e),
        },
        None => Language::from_weights(HashMap::new()),
    };
    let router = Router::new(structure.clone(), language);
    router.solve(1e-6, DEFAULT_MAX_ROUNDS);

    let handler = Arc::new(PomagmaHandler {
        structure,
        router,
        histogram: Mutex::new(HashMap::new()),
    });

    let server = match Server::bind(&args.bind) {
        Ok(s) => s,
        Err(e) => fail(e),
    };
    tracing::info!(addr = %args.bind, "pomagma-serve listening");
    if let Err(e) = server.serve(handler) {
        fail(e);
    }
    std::process::exit(common::EXIT_SUCCESS);
}
