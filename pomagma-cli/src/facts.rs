//! Parses and inserts one line of a facts file: a prefix-notation expression over declared
//! function/relation symbols, e.g. `EQUAL APP I x`. Walks tokens the same way
//! `pomagma-simplify::reduce` does, but inverted from pure lookup into reuse-or-allocate
//! insertion, the way `pomagma-analysis::Sampler::sample_term` builds fresh terms.

use std::str::SplitWhitespace;

use pomagma_structure::Structure;
use pomagma_util::{Ob, PomagmaError, Result};

/// Parses and asserts one fact line against `structure`, returning an error if the line is
/// malformed or names an undeclared symbol. A fact is either `EQUAL <expr> <expr>` or
/// `<relation-name> <expr>` / `<relation-name> <expr> <expr>` for a declared unary/binary
/// relation; everything else is parsed as a function expression and has no standalone meaning as
/// a fact.
pub fn assert_fact(structure: &Structure, line: &str) -> Result<()> {
    let mut tokens = line.split_whitespace();
    let head = tokens
        .next()
        .ok_or_else(|| PomagmaError::Parse("empty fact".to_string()))?;

    let sig = structure.signature();
    if head == "EQUAL" {
        let lhs = assert_expr(structure, &mut tokens)?;
        let rhs = assert_expr(structure, &mut tokens)?;
        structure.carrier().ensure_equal(lhs, rhs);
    } else if let Some(rel) = sig.unary_relation(head) {
        let arg = assert_expr(structure, &mut tokens)?;
        rel.insert(arg);
    } else if let Some(rel) = sig.binary_relation(head) {
        let lhs = assert_expr(structure, &mut tokens)?;
        let rhs = assert_expr(structure, &mut tokens)?;
        rel.insert(lhs, rhs);
    } else {
        return Err(PomagmaError::Parse(format!(
            "fact must start with EQUAL or a declared relation, found {head}"
        )));
    }

    if tokens.next().is_some() {
        return Err(PomagmaError::Parse(format!("trailing tokens in fact: {line}")));
    }
    Ok(())
}

/// Parses and inserts one function-application expression, returning the ob it denotes.
/// Every function call reuses an existing value where the table already defines one, allocating a
/// fresh ob only on first insertion of a given application.
fn assert_expr(structure: &Structure, tokens: &mut SplitWhitespace) -> Result<Ob> {
    let token = tokens
        .next()
        .ok_or_else(|| PomagmaError::Parse("premature end of expression".to_string()))?;
    let sig = structure.signature();

    if let Some(fun) = sig.nullary_function(token) {
        let existing = fun.find();
        if existing != 0 {
            return Ok(existing);
        }
        let ob = try_insert(structure)?;
        fun.insert(ob);
        return Ok(ob);
    }
    if let Some(fun) = sig.injective_function(token) {
        let arg = assert_expr(structure, tokens)?;
        let existing = fun.find(arg);
        if existing != 0 {
            return Ok(existing);
        }
        let ob = try_insert(structure)?;
        fun.insert(arg, ob);
        return Ok(ob);
    }
    if let Some(fun) = sig.binary_function(token) {
        let lhs = assert_expr(structure, tokens)?;
        let rhs = assert_expr(structure, tokens)?;
        let existing = fun.find(lhs, rhs);
        if existing != 0 {
            return Ok(existing);
        }
        let ob = try_insert(structure)?;
        fun.insert(lhs, rhs, ob);
        return Ok(ob);
    }
    if let Some(fun) = sig.symmetric_function(token) {
        let lhs = assert_expr(structure, tokens)?;
        let rhs = assert_expr(structure, tokens)?;
        let existing = fun.find(lhs, rhs);
        if existing != 0 {
            return Ok(existing);
        }
        let ob = try_insert(structure)?;
        fun.insert(lhs, rhs, ob);
        return Ok(ob);
    }

    Err(PomagmaError::Parse(format!("undeclared function symbol: {token}")))
}

fn try_insert(structure: &Structure) -> Result<Ob> {
    let ob = structure.carrier().try_insert();
    if ob == 0 {
        return Err(PomagmaError::CapacityExceeded {
            item_dim: structure.carrier().item_dim(),
        });
    }
    Ok(ob)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_structure() -> Structure {
        let mut structure = Structure::new(100);
        structure.signature_mut().declare_nullary_function("I");
        structure.signature_mut().declare_binary_function("APP");
        structure.signature_mut().declare_unary_relation("IS_ATOM");
        structure
    }

    #[test]
    fn assert_fact_allocates_fresh_obs_for_new_applications() {
        let structure = test_structure();
        assert_fact(&structure, "IS_ATOM I").expect("assert");
        let i = structure.signature().nullary_function("I").unwrap().find();
        assert!(structure.signature().unary_relation("IS_ATOM").unwrap().find(i));
    }

    #[test]
    fn assert_fact_reuses_application_on_repeated_assertion() {
        let structure = test_structure();
        assert_fact(&structure, "EQUAL APP I I APP I I").expect("assert");
        let app = structure.signature().binary_function("APP").unwrap();
        let i = structure.signature().nullary_function("I").unwrap().find();
        assert_eq!(app.count_pairs(), 1);
        assert_eq!(structure.carrier().find(app.find(i, i)), app.find(i, i));
    }

    #[test]
    fn assert_fact_equal_merges_two_distinct_obs() {
        let mut structure = test_structure();
        structure.signature_mut().declare_nullary_function("K");
        assert_fact(&structure, "EQUAL I K").expect("assert");
        let i = structure.signature().nullary_function("I").unwrap().find();
        let k = structure.signature().nullary_function("K").unwrap().find();
        assert_eq!(structure.carrier().find(i), structure.carrier().find(k));
    }

    #[test]
    fn assert_fact_rejects_undeclared_symbol() {
        let structure = test_structure();
        let err = assert_fact(&structure, "BOGUS I").unwrap_err();
        assert!(matches!(err, PomagmaError::Parse(_)));
    }

    #[test]
    fn assert_fact_rejects_trailing_tokens() {
        let structure = test_structure();
        assert!(assert_fact(&structure, "IS_ATOM I I").is_err());
    }
}
