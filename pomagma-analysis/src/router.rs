//! Shortest-route measure, in the propagation style of `pomagma-simplify::interval`: a Dijkstra-like fixed point over
//! declared symbols, weighted by a [`Language`], run until no ob's route probability changes by
//! more than a relative tolerance.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use pomagma_simplify::RouteTable;
use pomagma_structure::Structure;
use pomagma_util::Ob;

use crate::language::Language;

/// Default number of relaxation rounds if the caller doesn't know how many the structure needs;
/// each round visits every declared function table once.
pub const DEFAULT_MAX_ROUNDS: usize = 100;

/// Tracks, for every ob reached so far, the probability of its most probable known derivation and
/// the expression that achieves it. Implements [`RouteTable`] so a `Router` can feed a
/// [`pomagma_simplify::Simplifier`] directly.
pub struct Router {
    structure: Arc<Structure>,
    language: RwLock<Language>,
    probs: RwLock<HashMap<Ob, f64>>,
    routes: RwLock<HashMap<Ob, String>>,
}

impl Router {
    pub fn new(structure: Arc<Structure>, language: Language) -> Self {
        Router {
            structure,
            language: RwLock::new(language),
            probs: RwLock::new(HashMap::new()),
            routes: RwLock::new(HashMap::new()),
        }
    }

    pub fn language(&self) -> Language {
        self.language.read().clone()
    }

    pub fn set_language(&self, language: Language) {
        *self.language.write() = language;
    }

    pub fn probability(&self, ob: Ob) -> f64 {
        self.probs.read().get(&ob).copied().unwrap_or(0.0)
    }

    /// Discards every computed route/probability; used after a structure-mutating pass (merges,
    /// resize) invalidates the previous fixed point.
    pub fn reset(&self) {
        self.probs.write().clear();
        self.routes.write().clear();
    }

    /// Runs relaxation rounds until the largest relative change to any ob's probability in a round
    /// drops below `reltol`, or `max_rounds` rounds have run. Returns the number of rounds
    /// actually run.
    pub fn solve(&self, reltol: f64, max_rounds: usize) -> usize {
        let sig = self.structure.signature();
        let language = self.language.read();
        let mut prob = self.probs.write();
        let mut routes = self.routes.write();

        let mut rounds_run = 0;
        for round in 0..max_rounds {
            rounds_run = round + 1;
            let mut max_rel_change = 0.0f64;

            for (name, fun) in sig.nullary_functions() {
                let val = fun.find();
                if val != 0 {
                    let w = language.weight(name);
                    relax(&mut prob, &mut routes, &mut max_rel_change, val, w, || name.clone());
                }
            }

            for (name, fun) in sig.injective_functions() {
                for arg in fun.iter() {
                    let val = fun.find(arg);
                    if val == 0 {
                        continue;
                    }
                    let Some(&arg_p) = prob.get(&arg) else { continue };
                    let arg_route = routes.get(&arg).cloned().unwrap_or_else(|| arg.to_string());
                    let w = language.weight(name) * arg_p;
                    relax(&mut prob, &mut routes, &mut max_rel_change, val, w, || {
                        format!("{name} {arg_route}")
                    });
                }
            }

            for (name, fun) in sig.binary_functions() {
                for (lhs, rhs, val) in fun.entries() {
                    let (Some(&lp), Some(&rp)) = (prob.get(&lhs), prob.get(&rhs)) else {
                        continue;
                    };
                    let lr = routes.get(&lhs).cloned().unwrap_or_else(|| lhs.to_string());
                    let rr = routes.get(&rhs).cloned().unwrap_or_else(|| rhs.to_string());
                    let w = language.weight(name) * lp * rp;
                    relax(&mut prob, &mut routes, &mut max_rel_change, val, w, || {
                        format!("{name} {lr} {rr}")
                    });
                }
            }

            for (name, fun) in sig.symmetric_functions() {
                for (i, j, val) in fun.entries() {
                    let (Some(&ip), Some(&jp)) = (prob.get(&i), prob.get(&j)) else {
                        continue;
                    };
                    let ir = routes.get(&i).cloned().unwrap_or_else(|| i.to_string());
                    let jr = routes.get(&j).cloned().unwrap_or_else(|| j.to_string());
                    let w = language.weight(name) * ip * jp;
                    relax(&mut prob, &mut routes, &mut max_rel_change, val, w, || {
                        format!("{name} {ir} {jr}")
                    });
                }
            }

            tracing::debug!(round, max_rel_change, "router relaxation round");
            if max_rel_change < reltol {
                break;
            }
        }
        rounds_run
    }

    /// Refits the language from observed symbol usage counts (e.g. how often each symbol appeared
    /// in a corpus of validated expressions). Weights are normalized within each arity class
    /// (nullary, injective, binary-or-symmetric) to sum to `1 / num_nonempty_classes`, so the
    /// grand total across all declared symbols is 1.
    pub fn refit(&self, usage: &HashMap<String, u64>) -> Language {
        let sig = self.structure.signature();
        let groups: [Vec<String>; 3] = [
            sig.nullary_functions().keys().cloned().collect(),
            sig.injective_functions().keys().cloned().collect(),
            sig.binary_functions()
                .keys()
                .chain(sig.symmetric_functions().keys())
                .cloned()
                .collect(),
        ];
        let num_groups = groups.iter().filter(|g| !g.is_empty()).count().max(1);

        let mut weights = HashMap::new();
        for group in &groups {
            let total: u64 = group.iter().map(|n| usage.get(n).copied().unwrap_or(0)).sum();
            if total == 0 {
                continue;
            }
            for name in group {
                let count = usage.get(name).copied().unwrap_or(0);
                weights.insert(name.clone(), (count as f64 / total as f64) / num_groups as f64);
            }
        }
        Language::from_weights(weights)
    }
}

/// Updates `target`'s best-known probability/route if `candidate_prob` beats it, tracking the
/// largest relative change seen this round. `route_fn` is lazy so route strings aren't built for
/// candidates that don't win.
fn relax(
    prob: &mut HashMap<Ob, f64>,
    routes: &mut HashMap<Ob, String>,
    max_rel_change: &mut f64,
    target: Ob,
    candidate_prob: f64,
    route_fn: impl FnOnce() -> String,
) {
    let old = prob.get(&target).copied().unwrap_or(0.0);
    if candidate_prob <= old {
        return;
    }
    let rel = if old == 0.0 {
        1.0
    } else {
        (candidate_prob - old) / old
    };
    if rel > *max_rel_change {
        *max_rel_change = rel;
    }
    prob.insert(target, candidate_prob);
    routes.insert(target, route_fn());
}

impl RouteTable for Router {
    fn route(&self, ob: Ob) -> String {
        self.routes.read().get(&ob).cloned().unwrap_or_else(|| ob.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as Map;

    fn uniform_language(names: &[&str]) -> Language {
        let w = 1.0 / names.len() as f64;
        Language::from_weights(names.iter().map(|n| (n.to_string(), w)).collect())
    }

    #[test]
    fn routes_a_nullary_constant_to_its_own_name() {
        let mut structure = Structure::new(10);
        let ob = structure.carrier().unsafe_insert();
        structure.signature_mut().declare_nullary_function("I").insert(ob);

        let router = Router::new(Arc::new(structure), uniform_language(&["I"]));
        router.solve(1e-9, DEFAULT_MAX_ROUNDS);
        assert_eq!(router.route(ob), "I");
        assert!(router.probability(ob) > 0.0);
    }

    #[test]
    fn routes_an_injective_application_through_its_argument() {
        let mut structure = Structure::new(10);
        let x = structure.carrier().unsafe_insert();
        let y = structure.carrier().unsafe_insert();
        structure.signature_mut().declare_nullary_function("x").insert(x);
        let not_fn = structure.signature_mut().declare_injective_function("NOT");
        not_fn.insert(x, y);

        let router = Router::new(Arc::new(structure), uniform_language(&["x", "NOT"]));
        router.solve(1e-9, DEFAULT_MAX_ROUNDS);
        assert_eq!(router.route(x), "x");
        assert_eq!(router.route(y), "NOT x");
    }

    #[test]
    fn prefers_the_higher_weight_derivation_when_two_exist() {
        let mut structure = Structure::new(10);
        let v = structure.carrier().unsafe_insert();
        structure.signature_mut().declare_nullary_function("CHEAP").insert(v);
        structure.signature_mut().declare_nullary_function("RARE").insert(v);

        let mut weights = Map::new();
        weights.insert("CHEAP".to_string(), 0.9);
        weights.insert("RARE".to_string(), 0.1);
        let router = Router::new(Arc::new(structure), Language::from_weights(weights));
        router.solve(1e-9, DEFAULT_MAX_ROUNDS);
        assert_eq!(router.route(v), "CHEAP");
    }

    #[test]
    fn refit_normalizes_each_arity_class_and_the_grand_total() {
        let mut structure = Structure::new(10);
        structure.signature_mut().declare_nullary_function("I");
        structure.signature_mut().declare_nullary_function("K");
        structure.signature_mut().declare_injective_function("NOT");
        let router = Router::new(Arc::new(structure), Language::from_weights(Map::new()));

        let mut usage = Map::new();
        usage.insert("I".to_string(), 3);
        usage.insert("K".to_string(), 1);
        usage.insert("NOT".to_string(), 7);
        let refit = router.refit(&usage);

        assert!((refit.weight("I") - 0.375).abs() < 1e-9);
        assert!((refit.weight("K") - 0.125).abs() < 1e-9);
        assert!((refit.weight("NOT") - 0.5).abs() < 1e-9);
    }
}
