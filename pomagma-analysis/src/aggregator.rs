//! Merges one structure's carrier and tables into another with a disjoint, compatibly-declared
//! signature. Every ob of the source gets a freshly allocated ob in the destination; every table entry is replayed
//! through the destination's ordinary `insert`, so any collision (two source obs that the
//! destination already equates, or vice versa) is resolved by the destination's own merge
//! scheduler rather than by this module.

use std::collections::HashMap;
use std::sync::Arc;

use pomagma_scheduler::Scheduler;
use pomagma_structure::Structure;
use pomagma_util::{Ob, PomagmaError, Result};

/// Maps every ob present in the source structure to the destination ob it was translated to.
pub type Translation = HashMap<Ob, Ob>;

pub struct Aggregator;

impl Aggregator {
    /// Copies every present ob and every table entry of `src` into `dest`, translating obs through
    /// a fresh allocation in `dest`'s carrier, then drains `dest_scheduler`'s merge queue so any
    /// collisions this induces are fully resolved before returning. `dest` and `src` must declare
    /// the same table names (a table `src` declares that `dest` doesn't is skipped with a warning,
    /// tolerating aggregation of a smaller theory into a larger one).
    pub fn aggregate(dest: &Structure, dest_scheduler: &Scheduler, src: &Structure) -> Result<Translation> {
        let mut translate = Translation::new();
        for src_ob in src.carrier().iter() {
            let dest_ob = dest.carrier().try_insert();
            if dest_ob == 0 {
                return Err(PomagmaError::CapacityExceeded {
                    item_dim: dest.carrier().item_dim(),
                });
            }
            translate.insert(src_ob, dest_ob);
        }
        let tr = |ob: Ob| translate[&ob];

        for (name, table) in src.signature().unary_relations() {
            let Some(dest_table) = dest.signature().unary_relation(name) else {
                tracing::warn!(table = name, "aggregator: destination has no matching unary relation");
                continue;
            };
            for ob in table.iter() {
                dest_table.insert(tr(ob));
            }
        }
        for (name, table) in src.signature().binary_relations() {
            let Some(dest_table) = dest.signature().binary_relation(name) else {
                tracing::warn!(table = name, "aggregator: destination has no matching binary relation");
                continue;
            };
            for (lhs, rhs) in table.entries() {
                dest_table.insert(tr(lhs), tr(rhs));
            }
        }
        for (name, table) in src.signature().nullary_functions() {
            let Some(dest_table) = dest.signature().nullary_function(name) else {
                tracing::warn!(table = name, "aggregator: destination has no matching nullary function");
                continue;
            };
            if table.defined() {
                dest_table.insert(tr(table.find()));
            }
        }
        for (name, table) in src.signature().injective_functions() {
            let Some(dest_table) = dest.signature().injective_function(name) else {
                tracing::warn!(table = name, "aggregator: destination has no matching injective function");
                continue;
            };
            for (arg, val) in table.entries() {
                dest_table.insert(tr(arg), tr(val));
            }
        }
        for (name, table) in src.signature().binary_functions() {
            let Some(dest_table) = dest.signature().binary_function(name) else {
                tracing::warn!(table = name, "aggregator: destination has no matching binary function");
                continue;
            };
            for (lhs, rhs, val) in table.entries() {
                dest_table.insert(tr(lhs), tr(rhs), tr(val));
            }
        }
        for (name, table) in src.signature().symmetric_functions() {
            let Some(dest_table) = dest.signature().symmetric_function(name) else {
                tracing::warn!(table = name, "aggregator: destination has no matching symmetric function");
                continue;
            };
            for (lhs, rhs, val) in table.entries() {
                dest_table.insert(tr(lhs), tr(rhs), tr(val));
            }
        }

        dest_scheduler.drain_merges();
        Ok(translate)
    }

    /// As [`Self::aggregate`], but clears `src` once every entry has been translated in, freeing it
    /// for reuse (e.g. a worker's scratch structure between batches).
    pub fn aggregate_clearing_src(
        dest: &Structure,
        dest_scheduler: &Scheduler,
        src: &Structure,
    ) -> Result<Translation> {
        let translation = Self::aggregate(dest, dest_scheduler, src)?;
        src.clear();
        Ok(translation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declare_matching(structure: &mut Structure) {
        structure.signature_mut().declare_nullary_function("I");
        structure.signature_mut().declare_binary_function("APP");
    }

    #[test]
    fn aggregate_translates_every_source_ob_and_entry() {
        let mut src = Structure::new(10);
        declare_matching(&mut src);
        let i = src.carrier().unsafe_insert();
        let x = src.carrier().unsafe_insert();
        src.signature().nullary_function("I").unwrap().insert(i);
        src.signature().binary_function("APP").unwrap().insert(i, x, x);

        let mut dest = Structure::new(10);
        declare_matching(&mut dest);
        let dest_arc = Arc::new(dest);
        let scheduler = Scheduler::new(dest_arc.clone());

        let translation = Aggregator::aggregate(&dest_arc, &scheduler, &src).expect("aggregate");
        assert_eq!(translation.len(), 2);

        let dest_i = dest_arc.carrier().find(translation[&i]);
        let dest_x = dest_arc.carrier().find(translation[&x]);
        let app = dest_arc.signature().binary_function("APP").unwrap();
        assert_eq!(app.find(dest_i, dest_x), dest_x);
    }

    #[test]
    fn aggregate_resolves_collisions_through_the_destination_scheduler() {
        let mut src = Structure::new(10);
        declare_matching(&mut src);
        let a = src.carrier().unsafe_insert();
        let b = src.carrier().unsafe_insert();
        src.signature().nullary_function("I").unwrap().insert(a);
        // a second source ob that the destination will already consider equal to the first once
        // translated in, forcing a merge during aggregation.
        src.signature()
            .binary_function("APP")
            .unwrap()
            .insert(a, b, b);

        let mut dest = Structure::new(10);
        declare_matching(&mut dest);
        let dest_i = dest.carrier().unsafe_insert();
        dest.signature().nullary_function("I").unwrap().insert(dest_i);
        let dest_arc = Arc::new(dest);
        let scheduler = Scheduler::new(dest_arc.clone());

        // Aggregating a second "I" forces the translated src-a to merge with the pre-existing
        // dest_i via NullaryFunction::insert's own collision handling.
        let translation = Aggregator::aggregate(&dest_arc, &scheduler, &src).expect("aggregate");
        assert_eq!(dest_arc.carrier().find(translation[&a]), dest_arc.carrier().find(dest_i));
    }

    #[test]
    fn aggregate_clearing_src_empties_the_source_structure() {
        let mut src = Structure::new(10);
        declare_matching(&mut src);
        let ob = src.carrier().unsafe_insert();
        src.signature().nullary_function("I").unwrap().insert(ob);

        let mut dest = Structure::new(10);
        declare_matching(&mut dest);
        let dest_arc = Arc::new(dest);
        let scheduler = Scheduler::new(dest_arc.clone());

        Aggregator::aggregate_clearing_src(&dest_arc, &scheduler, &src).expect("aggregate");
        assert_eq!(src.carrier().item_count(), 0);
    }
}
