//! Weighted random term generation. Maintains a per-ob reachability weight (how likely a
//! random descent of the declared grammar is to land on this ob) and can insert fresh random terms
//! into the structure, reusing existing obs wherever the structure already defines the needed
//! function application.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use pomagma_structure::Structure;
use pomagma_util::Ob;
use rand::Rng;

use crate::language::Language;

/// Recursion ceiling for [`Sampler::try_insert_random`]; past this depth the descent always picks
/// a nullary symbol, guaranteeing termination even from a pathological language.
const MAX_DEPTH: usize = 32;

#[derive(Clone, Copy)]
enum Symbol<'a> {
    Nullary(&'a str),
    Injective(&'a str),
    Binary(&'a str),
    Symmetric(&'a str),
}

impl Symbol<'_> {
    fn name(&self) -> &str {
        match self {
            Symbol::Nullary(n) | Symbol::Injective(n) | Symbol::Binary(n) | Symbol::Symmetric(n) => n,
        }
    }
}

/// Whether a sampled term was newly inserted (allocated a fresh ob) or reused an ob the structure
/// already defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleOutcome {
    Reused,
    Inserted,
}

pub struct Sampler {
    structure: Arc<Structure>,
    language: Language,
    probs: RwLock<HashMap<Ob, f64>>,
}

impl Sampler {
    pub fn new(structure: Arc<Structure>, language: Language) -> Self {
        Sampler {
            structure,
            language,
            probs: RwLock::new(HashMap::new()),
        }
    }

    pub fn probability(&self, ob: Ob) -> f64 {
        self.probs.read().get(&ob).copied().unwrap_or(0.0)
    }

    /// Recomputes `ob`'s reachability weight from every table that can currently derive it: the
    /// sum, over every nullary/injective/binary/symmetric function whose value is `ob`, of that
    /// symbol's language weight times the product of its arguments' own weights.
    pub fn update_one(&self, ob: Ob) {
        let sig = self.structure.signature();
        let mut total = 0.0f64;

        for (name, fun) in sig.nullary_functions() {
            if fun.find() == ob {
                total += self.language.weight(name);
            }
        }
        for (name, fun) in sig.injective_functions() {
            for (arg, val) in fun.entries() {
                if val == ob {
                    total += self.language.weight(name) * self.probability(arg);
                }
            }
        }
        for (name, fun) in sig.binary_functions() {
            for (lhs, rhs) in fun.iter_val(ob) {
                total += self.language.weight(name) * self.probability(lhs) * self.probability(rhs);
            }
        }
        for (name, fun) in sig.symmetric_functions() {
            for (i, j) in fun.iter_val(ob) {
                total += self.language.weight(name) * self.probability(i) * self.probability(j);
            }
        }

        self.probs.write().insert(ob, total);
    }

    fn declared_symbols(&self) -> Vec<(Symbol<'_>, f64)> {
        let sig = self.structure.signature();
        let mut out = Vec::new();
        for name in sig.nullary_functions().keys() {
            let w = self.language.weight(name);
            if w > 0.0 {
                out.push((Symbol::Nullary(name), w));
            }
        }
        for name in sig.injective_functions().keys() {
            let w = self.language.weight(name);
            if w > 0.0 {
                out.push((Symbol::Injective(name), w));
            }
        }
        for name in sig.binary_functions().keys() {
            let w = self.language.weight(name);
            if w > 0.0 {
                out.push((Symbol::Binary(name), w));
            }
        }
        for name in sig.symmetric_functions().keys() {
            let w = self.language.weight(name);
            if w > 0.0 {
                out.push((Symbol::Symmetric(name), w));
            }
        }
        out
    }

    fn choose_symbol<'a>(&self, rng: &mut impl Rng, candidates: &[(Symbol<'a>, f64)]) -> Option<Symbol<'a>> {
        let total: f64 = candidates.iter().map(|(_, w)| w).sum();
        if total <= 0.0 {
            return None;
        }
        let mut pick = rng.random_range(0.0..total);
        for &(symbol, w) in candidates {
            if pick < w {
                return Some(symbol);
            }
            pick -= w;
        }
        candidates.last().map(|(s, _)| *s)
    }

    /// Descends the declared grammar from the root, weighted by the current language, reusing any
    /// ob the structure already defines for a sampled application and allocating a fresh one
    /// otherwise. Returns `None` if the carrier has no capacity left for a fresh ob it needed.
    pub fn try_insert_random(&self, rng: &mut impl Rng) -> Option<(Ob, SampleOutcome)> {
        self.sample_term(rng, MAX_DEPTH)
    }

    fn sample_term(&self, rng: &mut impl Rng, depth: usize) -> Option<(Ob, SampleOutcome)> {
        let sig = self.structure.signature();
        let mut candidates = self.declared_symbols();
        if depth == 0 {
            candidates.retain(|(s, _)| matches!(s, Symbol::Nullary(_)));
        }
        let symbol = self.choose_symbol(rng, &candidates)?;

        match symbol {
            Symbol::Nullary(name) => {
                let fun = sig.nullary_function(name)?;
                let existing = fun.find();
                if existing != 0 {
                    return Some((existing, SampleOutcome::Reused));
                }
                let ob = self.structure.carrier().try_insert();
                if ob == 0 {
                    return None;
                }
                fun.insert(ob);
                Some((ob, SampleOutcome::Inserted))
            }
            Symbol::Injective(name) => {
                let (arg, _) = self.sample_term(rng, depth.saturating_sub(1))?;
                let fun = sig.injective_function(name)?;
                let existing = fun.find(arg);
                if existing != 0 {
                    return Some((existing, SampleOutcome::Reused));
                }
                let ob = self.structure.carrier().try_insert();
                if ob == 0 {
                    return None;
                }
                fun.insert(arg, ob);
                Some((ob, SampleOutcome::Inserted))
            }
            Symbol::Binary(name) => {
                let (lhs, _) = self.sample_term(rng, depth.saturating_sub(1))?;
                let (rhs, _) = self.sample_term(rng, depth.saturating_sub(1))?;
                let fun = sig.binary_function(name)?;
                let existing = fun.find(lhs, rhs);
                if existing != 0 {
                    return Some((existing, SampleOutcome::Reused));
                }
                let ob = self.structure.carrier().try_insert();
                if ob == 0 {
                    return None;
                }
                fun.insert(lhs, rhs, ob);
                Some((ob, SampleOutcome::Inserted))
            }
            Symbol::Symmetric(name) => {
                let (lhs, _) = self.sample_term(rng, depth.saturating_sub(1))?;
                let (rhs, _) = self.sample_term(rng, depth.saturating_sub(1))?;
                let fun = sig.symmetric_function(name)?;
                let existing = fun.find(lhs, rhs);
                if existing != 0 {
                    return Some((existing, SampleOutcome::Reused));
                }
                let ob = self.structure.carrier().try_insert();
                if ob == 0 {
                    return None;
                }
                fun.insert(lhs, rhs, ob);
                Some((ob, SampleOutcome::Inserted))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn language(names: &[(&str, f64)]) -> Language {
        Language::from_weights(names.iter().map(|(n, w)| (n.to_string(), *w)).collect())
    }

    #[test]
    fn update_one_sums_every_derivation_of_an_ob() {
        let mut structure = Structure::new(10);
        let v = structure.carrier().unsafe_insert();
        structure.signature_mut().declare_nullary_function("I").insert(v);
        structure.signature_mut().declare_nullary_function("J").insert(v);

        let sampler = Sampler::new(Arc::new(structure), language(&[("I", 0.3), ("J", 0.2)]));
        sampler.update_one(v);
        assert!((sampler.probability(v) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn try_insert_random_only_uses_symbols_with_positive_weight() {
        let mut structure = Structure::new(50);
        structure.signature_mut().declare_nullary_function("I");
        structure.signature_mut().declare_nullary_function("DEAD");

        let lang = language(&[("I", 1.0), ("DEAD", 0.0)]);
        let sampler = Sampler::new(Arc::new(structure), lang);
        let mut rng = rand::rngs::SmallRng::seed_from_u64(42);
        for _ in 0..20 {
            let (ob, _) = sampler.try_insert_random(&mut rng).expect("capacity available");
            assert_ne!(ob, 0);
        }
    }

    #[test]
    fn try_insert_random_reuses_an_existing_application() {
        let mut structure = Structure::new(10);
        let x = structure.carrier().unsafe_insert();
        let y = structure.carrier().unsafe_insert();
        structure.signature_mut().declare_nullary_function("x").insert(x);
        let not_fn = structure.signature_mut().declare_injective_function("NOT");
        not_fn.insert(x, y);

        let lang = language(&[("x", 0.0), ("NOT", 1.0)]);
        let sampler = Sampler::new(Arc::new(structure), lang);
        let mut rng = rand::rngs::SmallRng::seed_from_u64(7);
        // Weight 0 on "x" means NOT can never find an argument and should report no capacity
        // rather than loop forever; this exercises the early-return path, not reuse.
        assert!(sampler.try_insert_random(&mut rng).is_none());
    }
}
