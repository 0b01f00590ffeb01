//! The owner of a structure's single [`Carrier`] and the string-keyed maps from declared table
//! names to the six table kinds, plus the negation pairing used by consistency checks.

use std::collections::HashMap;
use std::sync::Arc;

use pomagma_carrier::Carrier;
use pomagma_tables::{
    BinaryFunction, BinaryRelation, InjectiveFunction, NullaryFunction, SymmetricFunction, Table,
    UnaryRelation,
};

/// The default theory's disjoint positive/negative relation pairs: `LESS`/`NLESS`, and the same
/// convention extended to `EQUAL`/`NEQUAL` and `RETURNS`/`NRETURNS`.
const DEFAULT_THEORY_NEGATIONS: &[(&str, &str)] = &[
    ("LESS", "NLESS"),
    ("EQUAL", "NEQUAL"),
    ("RETURNS", "NRETURNS"),
];

/// Owns the shared [`Carrier`] plus every declared table, keyed by name.
///
/// Tables are stored twice: once in a kind-specific typed map (for callers that know what they
/// want), and once behind `dyn Table` in `all_tables` (for the merge scheduler and `Structure`,
/// which must drive every table uniformly regardless of kind).
pub struct Signature {
    carrier: Arc<Carrier>,
    unary_relations: HashMap<String, Arc<UnaryRelation>>,
    binary_relations: HashMap<String, Arc<BinaryRelation>>,
    nullary_functions: HashMap<String, Arc<NullaryFunction>>,
    injective_functions: HashMap<String, Arc<InjectiveFunction>>,
    binary_functions: HashMap<String, Arc<BinaryFunction>>,
    symmetric_functions: HashMap<String, Arc<SymmetricFunction>>,
    all_tables: Vec<(String, Arc<dyn Table>)>,
    negations: HashMap<String, String>,
}

impl Signature {
    pub fn new(item_dim: u32) -> Self {
        Signature {
            carrier: Arc::new(Carrier::new(item_dim)),
            unary_relations: HashMap::new(),
            binary_relations: HashMap::new(),
            nullary_functions: HashMap::new(),
            injective_functions: HashMap::new(),
            binary_functions: HashMap::new(),
            symmetric_functions: HashMap::new(),
            all_tables: Vec::new(),
            negations: HashMap::new(),
        }
    }

    /// Wraps an already-constructed carrier, e.g. one shared with a caller-held reference.
    pub fn with_carrier(carrier: Arc<Carrier>) -> Self {
        Signature {
            carrier,
            unary_relations: HashMap::new(),
            binary_relations: HashMap::new(),
            nullary_functions: HashMap::new(),
            injective_functions: HashMap::new(),
            binary_functions: HashMap::new(),
            symmetric_functions: HashMap::new(),
            all_tables: Vec::new(),
            negations: HashMap::new(),
        }
    }

    /// A fresh signature seeded with [`DEFAULT_THEORY_NEGATIONS`].
    pub fn with_default_theory_negations(item_dim: u32) -> Self {
        let mut sig = Signature::new(item_dim);
        sig.seed_default_theory_negations();
        sig
    }

    /// Declares the default theory's negation pairs on an already-constructed signature, without
    /// touching its carrier or tables. Used when rebuilding a signature from a snapshot, which
    /// carries table data but not the negation convention.
    pub fn seed_default_theory_negations(&mut self) {
        for &(pos, neg) in DEFAULT_THEORY_NEGATIONS {
            self.declare_negation(pos, neg);
        }
    }

    pub fn carrier(&self) -> &Arc<Carrier> {
        &self.carrier
    }

    /// Every declared table, in declaration order, for callers (the scheduler, `Structure`) that
    /// must drive all of them uniformly.
    pub fn all_tables(&self) -> &[(String, Arc<dyn Table>)] {
        &self.all_tables
    }

    /// Typed table maps, for callers (snapshot I/O) that need each table's concrete entry shape
    /// rather than the uniform `dyn Table` contract.
    pub fn unary_relations(&self) -> &HashMap<String, Arc<UnaryRelation>> {
        &self.unary_relations
    }
    pub fn binary_relations(&self) -> &HashMap<String, Arc<BinaryRelation>> {
        &self.binary_relations
    }
    pub fn nullary_functions(&self) -> &HashMap<String, Arc<NullaryFunction>> {
        &self.nullary_functions
    }
    pub fn injective_functions(&self) -> &HashMap<String, Arc<InjectiveFunction>> {
        &self.injective_functions
    }
    pub fn binary_functions(&self) -> &HashMap<String, Arc<BinaryFunction>> {
        &self.binary_functions
    }
    pub fn symmetric_functions(&self) -> &HashMap<String, Arc<SymmetricFunction>> {
        &self.symmetric_functions
    }

    /// Registers a bidirectional positive/negative name pair. Either name may already be declared
    /// as a table, or may be declared later; the pairing itself carries no table reference.
    pub fn declare_negation(&mut self, positive: &str, negative: &str) {
        self.negations.insert(positive.to_string(), negative.to_string());
        self.negations.insert(negative.to_string(), positive.to_string());
    }

    /// Returns the paired name, if `name` was declared as one half of a negation pair.
    pub fn negate(&self, name: &str) -> Option<&str> {
        self.negations.get(name).map(String::as_str)
    }

    pub fn declare_unary_relation(&mut self, name: &str) -> Arc<UnaryRelation> {
        let table = Arc::new(UnaryRelation::new(self.carrier.clone()));
        self.unary_relations.insert(name.to_string(), table.clone());
        self.all_tables.push((name.to_string(), table.clone() as Arc<dyn Table>));
        table
    }

    pub fn declare_binary_relation(&mut self, name: &str) -> Arc<BinaryRelation> {
        let table = Arc::new(BinaryRelation::new(self.carrier.clone()));
        self.binary_relations.insert(name.to_string(), table.clone());
        self.all_tables.push((name.to_string(), table.clone() as Arc<dyn Table>));
        table
    }

    pub fn declare_nullary_function(&mut self, name: &str) -> Arc<NullaryFunction> {
        let table = Arc::new(NullaryFunction::new(self.carrier.clone()));
        self.nullary_functions.insert(name.to_string(), table.clone());
        self.all_tables.push((name.to_string(), table.clone() as Arc<dyn Table>));
        table
    }

    pub fn declare_injective_function(&mut self, name: &str) -> Arc<InjectiveFunction> {
        let table = Arc::new(InjectiveFunction::new(self.carrier.clone()));
        self.injective_functions.insert(name.to_string(), table.clone());
        self.all_tables.push((name.to_string(), table.clone() as Arc<dyn Table>));
        table
    }

    pub fn declare_binary_function(&mut self, name: &str) -> Arc<BinaryFunction> {
        let table = Arc::new(BinaryFunction::new(self.carrier.clone()));
        self.binary_functions.insert(name.to_string(), table.clone());
        self.all_tables.push((name.to_string(), table.clone() as Arc<dyn Table>));
        table
    }

    pub fn declare_symmetric_function(&mut self, name: &str) -> Arc<SymmetricFunction> {
        let table = Arc::new(SymmetricFunction::new(self.carrier.clone()));
        self.symmetric_functions.insert(name.to_string(), table.clone());
        self.all_tables.push((name.to_string(), table.clone() as Arc<dyn Table>));
        table
    }

    pub fn unary_relation(&self, name: &str) -> Option<&Arc<UnaryRelation>> {
        self.unary_relations.get(name)
    }

    pub fn binary_relation(&self, name: &str) -> Option<&Arc<BinaryRelation>> {
        self.binary_relations.get(name)
    }

    pub fn nullary_function(&self, name: &str) -> Option<&Arc<NullaryFunction>> {
        self.nullary_functions.get(name)
    }

    pub fn injective_function(&self, name: &str) -> Option<&Arc<InjectiveFunction>> {
        self.injective_functions.get(name)
    }

    pub fn binary_function(&self, name: &str) -> Option<&Arc<BinaryFunction>> {
        self.binary_functions.get(name)
    }

    pub fn symmetric_function(&self, name: &str) -> Option<&Arc<SymmetricFunction>> {
        self.symmetric_functions.get(name)
    }

    /// Builds a signature over a larger carrier with every declared table re-created at the new
    /// size and every entry replayed through `raw_insert`, preserving both table names and the
    /// negation pairing. Used by `Structure::resize`.
    pub fn resized(&self, new_item_dim: u32) -> Signature {
        let mut grown = Signature::with_carrier(Arc::new(self.carrier.resized(new_item_dim)));
        grown.negations = self.negations.clone();

        for (name, table) in &self.unary_relations {
            let grown_table = grown.declare_unary_relation(name);
            for ob in table.iter() {
                grown_table.raw_insert(ob);
            }
        }
        for (name, table) in &self.binary_relations {
            let grown_table = grown.declare_binary_relation(name);
            for (lhs, rhs) in table.entries() {
                grown_table.raw_insert(lhs, rhs);
            }
        }
        for (name, table) in &self.nullary_functions {
            let grown_table = grown.declare_nullary_function(name);
            if table.defined() {
                grown_table.raw_insert(table.find());
            }
        }
        for (name, table) in &self.injective_functions {
            let grown_table = grown.declare_injective_function(name);
            for (arg, val) in table.entries() {
                grown_table.raw_insert(arg, val);
            }
        }
        for (name, table) in &self.binary_functions {
            let grown_table = grown.declare_binary_function(name);
            for (lhs, rhs, val) in table.entries() {
                grown_table.raw_insert(lhs, rhs, val);
            }
        }
        for (name, table) in &self.symmetric_functions {
            let grown_table = grown.declare_symmetric_function(name);
            for (lhs, rhs, val) in table.entries() {
                grown_table.raw_insert(lhs, rhs, val);
            }
        }
        grown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_theory_negations_are_bidirectional() {
        let sig = Signature::with_default_theory_negations(10);
        assert_eq!(sig.negate("LESS"), Some("NLESS"));
        assert_eq!(sig.negate("NLESS"), Some("LESS"));
        assert_eq!(sig.negate("EQUAL"), Some("NEQUAL"));
        assert_eq!(sig.negate("RETURNS"), Some("NRETURNS"));
        assert_eq!(sig.negate("UNDECLARED"), None);
    }

    #[test]
    fn declared_tables_are_registered_in_all_tables() {
        let mut sig = Signature::new(10);
        sig.declare_unary_relation("IS_ATOM");
        sig.declare_binary_function("APP");
        assert_eq!(sig.all_tables().len(), 2);
        assert!(sig.unary_relation("IS_ATOM").is_some());
        assert!(sig.binary_function("APP").is_some());
        assert!(sig.binary_relation("APP").is_none());
    }
}
