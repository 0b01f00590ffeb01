//! Interval approximation and term-DAG propagation: a four-`DenseSet` interval per ob,
//! propagated along a term DAG to a fixed point and memoized with [`LazyMap`] over `SetId`s.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use pomagma_concurrency::{DenseSetStore, LazyMap, SetId, WorkerPool};
use pomagma_dense_set::DenseSet;
use pomagma_structure::Structure;
use pomagma_util::Ob;

const MAX_ROUNDS: usize = 64;
const POLL_INTERVAL: Duration = Duration::from_micros(50);

/// Which of the four bounding sets a value belongs to: known to be below/above the term's value,
/// or known *not* to be below/above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parity {
    Below,
    Above,
    NBelow,
    NAbove,
}

const PARITIES: [Parity; 4] = [Parity::Below, Parity::Above, Parity::NBelow, Parity::NAbove];

/// An interval in the lattice of approximations: everything proven below/above a value, and
/// everything proven not below/above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Approximation {
    pub below: SetId,
    pub above: SetId,
    pub nbelow: SetId,
    pub nabove: SetId,
}

impl Approximation {
    pub fn get(&self, parity: Parity) -> SetId {
        match parity {
            Parity::Below => self.below,
            Parity::Above => self.above,
            Parity::NBelow => self.nbelow,
            Parity::NAbove => self.nabove,
        }
    }

    fn from_fn(mut f: impl FnMut(Parity) -> SetId) -> Self {
        Approximation {
            below: f(Parity::Below),
            above: f(Parity::Above),
            nbelow: f(Parity::NBelow),
            nabove: f(Parity::NAbove),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    Valid,
    Invalid,
    Unknown,
}

/// A term in the propagation DAG. Constructor arity mirrors the signature's five table kinds plus
/// the `VAR`/`HOLE` leaves the Simplifier also accepts.
#[derive(Debug, Clone)]
pub enum TermKind {
    Variable,
    Hole,
    Nullary(String),
    Injective(String),
    Binary(String),
    Symmetric(String),
    UnaryRelation(String),
    BinaryRelation(String),
}

pub type TermId = usize;

#[derive(Debug, Clone)]
pub struct Term {
    pub kind: TermKind,
    pub args: [Option<TermId>; 2],
}

/// A DAG of terms, indexed by insertion order; children must be pushed before their parents.
#[derive(Debug, Default, Clone)]
pub struct TermDag {
    terms: Vec<Term>,
}

impl TermDag {
    pub fn new() -> Self {
        TermDag { terms: Vec::new() }
    }

    pub fn push(&mut self, kind: TermKind, args: [Option<TermId>; 2]) -> TermId {
        self.terms.push(Term { kind, args });
        self.terms.len() - 1
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    fn get(&self, id: TermId) -> &Term {
        &self.terms[id]
    }
}

/// The outcome of propagating a [`TermDag`] to a fixed point (or giving up after `MAX_ROUNDS`).
pub struct Solution {
    pub states: HashMap<TermId, Approximation>,
    pub pending: bool,
}

pub fn is_pending(solution: &Solution) -> bool {
    solution.pending
}

type UnaryKey = (String, Parity, SetId);
type BinaryKey = (String, Parity, SetId, SetId);

/// Computes and caches interval approximations for obs and propagates them along term DAGs.
pub struct Approximator {
    structure: Arc<Structure>,
    sets: Arc<DenseSetStore>,
    bot: Ob,
    top: Ob,
    identity: Ob,
    unary_images: Arc<LazyMap<UnaryKey, SetId>>,
    binary_images: Arc<LazyMap<BinaryKey, SetId>>,
}

impl Approximator {
    pub fn new(
        structure: Arc<Structure>,
        sets: Arc<DenseSetStore>,
        pool: Arc<WorkerPool>,
        bot: Ob,
        top: Ob,
        identity: Ob,
    ) -> Self {
        let unary_images = {
            let structure = structure.clone();
            let sets = sets.clone();
            LazyMap::new(pool.clone(), move |(name, _parity, arg): UnaryKey| {
                compute_unary_image(&structure, &sets, &name, arg)
            })
        };
        let binary_images = {
            let structure = structure.clone();
            let sets = sets.clone();
            LazyMap::new(pool, move |(name, _parity, lhs, rhs): BinaryKey| {
                compute_binary_image(&structure, &sets, &name, lhs, rhs)
            })
        };
        Approximator {
            structure,
            sets,
            bot,
            top,
            identity,
            unary_images,
            binary_images,
        }
    }

    fn less(&self) -> Option<Arc<pomagma_tables::BinaryRelation>> {
        self.structure.signature().binary_relation("LESS").cloned()
    }

    fn nless(&self) -> Option<Arc<pomagma_tables::BinaryRelation>> {
        self.structure.signature().binary_relation("NLESS").cloned()
    }

    fn dense_set_from(&self, members: impl Iterator<Item = Ob>) -> DenseSet {
        let set = DenseSet::new(self.structure.carrier().item_dim());
        for ob in members {
            set.insert(ob);
        }
        set
    }

    /// The interval known for a single concrete ob: everything proven below/above it by `LESS`,
    /// and everything proven not below/above it by `NLESS`.
    pub fn known(&self, ob: Ob) -> Approximation {
        let below = match self.less() {
            Some(less) => self.dense_set_from(less.iter_rhs(ob)),
            None => DenseSet::new(self.structure.carrier().item_dim()),
        };
        let above = match self.less() {
            Some(less) => self.dense_set_from(less.iter_lhs(ob)),
            None => DenseSet::new(self.structure.carrier().item_dim()),
        };
        let nbelow = match self.nless() {
            Some(nless) => self.dense_set_from(nless.iter_rhs(ob)),
            None => DenseSet::new(self.structure.carrier().item_dim()),
        };
        let nabove = match self.nless() {
            Some(nless) => self.dense_set_from(nless.iter_lhs(ob)),
            None => DenseSet::new(self.structure.carrier().item_dim()),
        };
        Approximation {
            below: self.sets.store(&below),
            above: self.sets.store(&above),
            nbelow: self.sets.store(&nbelow),
            nabove: self.sets.store(&nabove),
        }
    }

    pub fn interval(&self, lb: Ob, ub: Ob) -> Approximation {
        let lb_known = self.known(lb);
        let ub_known = self.known(ub);
        Approximation {
            below: lb_known.below,
            above: ub_known.above,
            nbelow: ub_known.nbelow,
            nabove: lb_known.nabove,
        }
    }

    pub fn unknown(&self) -> Approximation {
        self.interval(self.bot, self.top)
    }

    pub fn truthy(&self) -> Approximation {
        self.known(self.identity)
    }

    pub fn falsey(&self) -> Approximation {
        self.known(self.bot)
    }

    /// `lhs` refines `rhs` if it has proven at least everything `rhs` has (a superset of facts in
    /// every one of the four directional sets).
    pub fn refines(&self, lhs: &Approximation, rhs: &Approximation) -> bool {
        PARITIES.iter().all(|&parity| {
            let lhs_set = self.sets.load(lhs.get(parity)).expect("interned set");
            let rhs_set = self.sets.load(rhs.get(parity)).expect("interned set");
            rhs_set.iter().all(|ob| lhs_set.contains(ob))
        })
    }

    /// `Valid` if the identity element is proven below the term's value (the same "I" sentinel
    /// the Simplifier uses for ground truth), `Invalid` if it's proven *not* below, else
    /// `Unknown`.
    pub fn validity(&self, approx: &Approximation) -> Validity {
        let below = self.sets.load(approx.below).expect("interned set");
        if below.contains(self.identity) {
            return Validity::Valid;
        }
        let nbelow = self.sets.load(approx.nbelow).expect("interned set");
        if nbelow.contains(self.identity) {
            return Validity::Invalid;
        }
        Validity::Unknown
    }

    fn image_unary(&self, name: &str, parity: Parity, arg: SetId) -> SetId {
        await_lazy(&self.unary_images, &(name.to_string(), parity, arg))
    }

    fn image_binary(&self, name: &str, parity: Parity, lhs: SetId, rhs: SetId) -> SetId {
        await_lazy(&self.binary_images, &(name.to_string(), parity, lhs, rhs))
    }

    fn step(&self, term: &Term, states: &HashMap<TermId, Approximation>) -> Approximation {
        match &term.kind {
            TermKind::Variable | TermKind::Hole => self.unknown(),
            TermKind::UnaryRelation(_) | TermKind::BinaryRelation(_) => self.unknown(),
            TermKind::Nullary(name) => {
                let ob = self
                    .structure
                    .signature()
                    .nullary_function(name)
                    .map(|fun| fun.find())
                    .unwrap_or(0);
                if ob != 0 {
                    self.known(self.structure.carrier().find(ob))
                } else {
                    self.unknown()
                }
            }
            TermKind::Injective(name) => {
                let arg = term.args[0].expect("injective term missing its argument");
                let arg_state = states[&arg];
                Approximation::from_fn(|parity| self.image_unary(name, parity, arg_state.get(parity)))
            }
            TermKind::Binary(name) | TermKind::Symmetric(name) => {
                let lhs = term.args[0].expect("binary term missing its lhs");
                let rhs = term.args[1].expect("binary term missing its rhs");
                let lhs_state = states[&lhs];
                let rhs_state = states[&rhs];
                Approximation::from_fn(|parity| {
                    self.image_binary(name, parity, lhs_state.get(parity), rhs_state.get(parity))
                })
            }
        }
    }

    /// Propagates every term in `dag` to a fixed point (or `MAX_ROUNDS`, whichever comes first).
    /// Children must already appear before their parents in `dag`'s insertion order.
    pub fn solve(&self, dag: &TermDag) -> Solution {
        let mut states: HashMap<TermId, Approximation> =
            (0..dag.len()).map(|id| (id, self.unknown())).collect();
        let mut pending = false;
        for round in 0..MAX_ROUNDS {
            let mut changed = false;
            for id in 0..dag.len() {
                let new_state = self.step(dag.get(id), &states);
                if new_state != states[&id] {
                    states.insert(id, new_state);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
            if round == MAX_ROUNDS - 1 {
                pending = true;
            }
        }
        Solution { states, pending }
    }
}

fn await_lazy<K, V>(map: &Arc<LazyMap<K, V>>, key: &K) -> V
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Clone + Send + Sync + 'static,
{
    loop {
        if let Some(value) = map.try_find(key) {
            return (*value).clone();
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

fn compute_unary_image(structure: &Arc<Structure>, sets: &Arc<DenseSetStore>, name: &str, arg: SetId) -> SetId {
    let item_dim = structure.carrier().item_dim();
    let out = DenseSet::new(item_dim);
    if let Some(fun) = structure.signature().injective_function(name) {
        if let Some(arg_set) = sets.load(arg) {
            for x in arg_set.iter() {
                let y = fun.find(x);
                if y != 0 {
                    out.insert(structure.carrier().find(y));
                }
            }
        }
    }
    sets.store(&out)
}

fn compute_binary_image(
    structure: &Arc<Structure>,
    sets: &Arc<DenseSetStore>,
    name: &str,
    lhs: SetId,
    rhs: SetId,
) -> SetId {
    let item_dim = structure.carrier().item_dim();
    let out = DenseSet::new(item_dim);
    if let (Some(lhs_set), Some(rhs_set)) = (sets.load(lhs), sets.load(rhs)) {
        if let Some(fun) = structure.signature().binary_function(name) {
            for x in lhs_set.iter() {
                for y in rhs_set.iter() {
                    let z = fun.find(x, y);
                    if z != 0 {
                        out.insert(structure.carrier().find(z));
                    }
                }
            }
        } else if let Some(fun) = structure.signature().symmetric_function(name) {
            for x in lhs_set.iter() {
                for y in rhs_set.iter() {
                    let z = fun.find(x, y);
                    if z != 0 {
                        out.insert(structure.carrier().find(z));
                    }
                }
            }
        }
    }
    sets.store(&out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approximator(structure: Arc<Structure>) -> Approximator {
        let sets = Arc::new(DenseSetStore::new(structure.carrier().item_dim()));
        let pool = Arc::new(WorkerPool::new(2));
        Approximator::new(structure, sets, pool, 1, 2, 3)
    }

    #[test]
    fn known_of_identity_is_below_itself_via_less() {
        let mut structure = Structure::new(10);
        for _ in 0..3 {
            structure.carrier().unsafe_insert();
        }
        let less = structure.signature_mut().declare_binary_relation("LESS");
        less.insert(3, 3);
        let approximator = approximator(Arc::new(structure));
        let approx = approximator.known(3);
        let below = approximator.sets.load(approx.below).unwrap();
        assert!(below.contains(3));
    }

    #[test]
    fn unknown_interval_refines_trivially_into_itself() {
        let structure = Structure::new(10);
        let approximator = approximator(Arc::new(structure));
        let unknown = approximator.unknown();
        assert!(approximator.refines(&unknown, &unknown));
    }

    #[test]
    fn nullary_term_solves_to_a_known_value() {
        let mut structure = Structure::new(10);
        for _ in 0..3 {
            structure.carrier().unsafe_insert();
        }
        structure.signature_mut().declare_nullary_function("I").insert(3);
        let structure = Arc::new(structure);
        let approximator = approximator(structure.clone());

        let mut dag = TermDag::new();
        let id = dag.push(TermKind::Nullary("I".to_string()), [None, None]);

        let solution = approximator.solve(&dag);
        assert!(!solution.pending);
        let approx = &solution.states[&id];
        assert_eq!(approximator.validity(approx), Validity::Unknown);
        let below = approximator.sets.load(approx.below).unwrap();
        assert!(below.is_empty());
    }
}
