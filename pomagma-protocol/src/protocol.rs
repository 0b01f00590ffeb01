//! The request/response oneof: `reduce`, `validate`, `simplify`,
//! `validate_corpus`, `solve`, `get_histogram`, `fit_language`. `pomagma-protocol` only defines the
//! wire shape; `pomagma-cli` supplies the handler that actually drives a `Structure`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Every request a pomagma server accepts, dispatched on this oneof.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Request {
    /// Reduces a ground expression to an ob and its shortest known route.
    Reduce { expr: String },
    /// Runs the structure's full consistency check.
    Validate,
    /// Reduces a (possibly non-ground) expression to a residual route.
    Simplify { expr: String },
    /// Validates a batch of expressions, e.g. a regression corpus.
    ValidateCorpus { exprs: Vec<String> },
    /// Runs the router's relaxation to the given tolerance.
    Solve { reltol: f64, max_rounds: usize },
    /// Requests the per-symbol usage histogram accumulated so far.
    GetHistogram,
    /// Refits the language from observed usage counts.
    FitLanguage { usage: HashMap<String, u64> },
}

/// Every response a pomagma server returns. `errors` accumulates non-fatal parse/consistency
/// diagnostics alongside the primary result, matching the Simplifier's error-log convention.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Response {
    Reduced {
        ob: u32,
        route: String,
        errors: Vec<String>,
    },
    Validated {
        consistent: bool,
        errors: Vec<String>,
    },
    Simplified {
        ob: u32,
        route: String,
        errors: Vec<String>,
    },
    CorpusValidated {
        results: Vec<(String, bool)>,
        errors: Vec<String>,
    },
    Solved {
        rounds_run: usize,
    },
    Histogram {
        counts: HashMap<String, u64>,
    },
    LanguageFitted {
        weights: HashMap<String, f64>,
    },
    /// A request the server could not service (unknown table name, capacity exceeded, and so on).
    Error {
        message: String,
    },
}
