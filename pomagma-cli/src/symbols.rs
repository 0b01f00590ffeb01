//! A declarative "symbols file" format: a JSON document naming a theory's tables and negation
//! pairs, loaded by `pomagma-init` to build a [`Signature`] without hand-writing Rust for every
//! theory. Distinct from a grammar-weight list (which `pomagma-analysis::Language` already owns):
//! this declares table *shape*, not term probabilities.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use pomagma_structure::Signature;
use pomagma_util::{PomagmaError, Result};

/// One theory's table declarations, as loaded from a `*.symbols.json` file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Symbols {
    #[serde(default)]
    pub unary_relations: Vec<String>,
    #[serde(default)]
    pub binary_relations: Vec<String>,
    #[serde(default)]
    pub nullary_functions: Vec<String>,
    #[serde(default)]
    pub injective_functions: Vec<String>,
    #[serde(default)]
    pub binary_functions: Vec<String>,
    #[serde(default)]
    pub symmetric_functions: Vec<String>,
    /// Extra negation pairs beyond the default theory's `LESS`/`NLESS`, `EQUAL`/`NEQUAL`,
    /// `RETURNS`/`NRETURNS` (which every [`Signature`] already carries).
    #[serde(default)]
    pub negations: Vec<(String, String)>,
}

impl Symbols {
    pub fn load(path: &Path) -> Result<Symbols> {
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text)
            .map_err(|e| PomagmaError::Parse(format!("{}: {e}", path.display())))
    }

    /// Builds a fresh signature at `item_dim`, declaring every table this document names and
    /// seeding both the default theory negations and this document's own.
    pub fn build(&self, item_dim: u32) -> Signature {
        let mut sig = Signature::with_default_theory_negations(item_dim);
        for name in &self.unary_relations {
            sig.declare_unary_relation(name);
        }
        for name in &self.binary_relations {
            sig.declare_binary_relation(name);
        }
        for name in &self.nullary_functions {
            sig.declare_nullary_function(name);
        }
        for name in &self.injective_functions {
            sig.declare_injective_function(name);
        }
        for name in &self.binary_functions {
            sig.declare_binary_function(name);
        }
        for name in &self.symmetric_functions {
            sig.declare_symmetric_function(name);
        }
        for (pos, neg) in &self.negations {
            sig.declare_negation(pos, neg);
        }
        sig
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_declares_every_named_table() {
        let symbols = Symbols {
            unary_relations: vec!["IS_ATOM".to_string()],
            binary_functions: vec!["APP".to_string()],
            nullary_functions: vec!["I".to_string()],
            ..Default::default()
        };
        let sig = symbols.build(100);
        assert!(sig.unary_relation("IS_ATOM").is_some());
        assert!(sig.binary_function("APP").is_some());
        assert!(sig.nullary_function("I").is_some());
        assert_eq!(sig.negate("LESS"), Some("NLESS"));
    }

    #[test]
    fn load_then_build_round_trips_through_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("theory.symbols.json");
        fs::write(
            &path,
            r#"{"binary_functions": ["APP"], "negations": [["FOO", "NFOO"]]}"#,
        )
        .expect("write");
        let symbols = Symbols::load(&path).expect("load");
        let sig = symbols.build(10);
        assert!(sig.binary_function("APP").is_some());
        assert_eq!(sig.negate("FOO"), Some("NFOO"));
    }

    #[test]
    fn load_rejects_malformed_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bad.json");
        fs::write(&path, "not json").expect("write");
        assert!(Symbols::load(&path).is_err());
    }
}
