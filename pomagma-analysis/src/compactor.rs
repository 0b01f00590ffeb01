//! Renumbers a structure's representatives into the contiguous range `1..=rep_count`.
//! Merges have left behind deps that are dead weight (their data is already folded into their rep); this removes
//! them, then moves every surviving rep whose number exceeds `rep_count` down into the low end of
//! the range that removal vacated, running the ordinary merge cascade to make the move visible to
//! every table.

use std::sync::Arc;

use pomagma_scheduler::Scheduler;
use pomagma_structure::Structure;
use pomagma_util::Ob;

pub struct Compactor;

impl Compactor {
    /// Compacts `structure` in place. Requires exclusive use of `structure` for the duration (no
    /// concurrent inserts or merges); typically run between batches, not during active insertion.
    pub fn compact(structure: &Arc<Structure>, scheduler: &Scheduler) {
        let carrier = structure.carrier();

        // Drop every non-rep ob; its table contributions already moved to its rep when it was
        // merged away, so nothing but the carrier slot itself is lost.
        let deps: Vec<Ob> = carrier.iter().filter(|&ob| carrier.find(ob) != ob).collect();
        for dep in deps {
            carrier.unsafe_remove(dep);
        }

        let rep_count = carrier.rep_count() as Ob;
        let surplus: Vec<Ob> = carrier.iter().filter(|&ob| ob > rep_count).collect();

        // Each `try_insert` claims the lowest still-empty slot; since exactly `surplus.len()`
        // slots below `rep_count` are empty (every present ob is now a rep, and there are
        // `rep_count` of them total), every fresh ob lands at or below `rep_count`.
        for old_rep in surplus {
            let new_ob = carrier.try_insert();
            pomagma_util::pomagma_assert!(
                new_ob != 0 && new_ob <= rep_count,
                "compactor: no low slot available while renumbering {old_rep}"
            );
            carrier.merge(old_rep, new_ob);
        }
        scheduler.drain_merges();

        // `find` fully path-compresses (see `Carrier::find_rec`), so after this loop nothing still
        // present points at an old_rep through an intermediate hop.
        for ob in carrier.iter() {
            carrier.find(ob);
        }

        let stale: Vec<Ob> = carrier.iter().filter(|&ob| carrier.find(ob) != ob).collect();
        for ob in stale {
            carrier.unsafe_remove(ob);
        }

        pomagma_util::pomagma_assert!(
            carrier.item_count() == carrier.rep_count(),
            "compactor: residual deps after renumbering"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_renumbers_reps_into_the_low_contiguous_range() {
        let structure = Arc::new(Structure::new(20));
        for _ in 0..10 {
            structure.carrier().unsafe_insert();
        }
        // Merge two low obs away, freeing slots 3 and 4 while obs 9 and 10 remain untouched reps
        // above the resulting rep_count (8) — a genuine gap for compaction to close.
        structure.carrier().merge(3, 1);
        structure.carrier().merge(4, 2);
        assert_eq!(structure.carrier().rep_count(), 8);

        let scheduler = Scheduler::new(structure.clone());
        Compactor::compact(&structure, &scheduler);

        assert_eq!(structure.carrier().item_count(), 8);
        assert_eq!(structure.carrier().rep_count(), 8);
        for ob in 1..=8u32 {
            assert!(structure.carrier().support().contains(ob));
            assert_eq!(structure.carrier().find(ob), ob);
        }
        structure.validate_consistent();
    }

    #[test]
    fn compact_is_a_no_op_on_an_already_contiguous_structure() {
        let structure = Arc::new(Structure::new(10));
        for _ in 0..4 {
            structure.carrier().unsafe_insert();
        }
        let scheduler = Scheduler::new(structure.clone());
        Compactor::compact(&structure, &scheduler);
        assert_eq!(structure.carrier().item_count(), 4);
        assert_eq!(structure.carrier().rep_count(), 4);
        for ob in 1..=4u32 {
            assert_eq!(structure.carrier().find(ob), ob);
        }
    }

    #[test]
    fn compact_preserves_table_entries_across_renumbering() {
        let mut owned = Structure::new(20);
        for _ in 0..10 {
            owned.carrier().unsafe_insert();
        }
        owned.signature_mut().declare_binary_function("APP");
        let fun = owned.signature().binary_function("APP").unwrap().clone();
        fun.insert(9, 10, 8);
        owned.carrier().merge(3, 1);
        owned.carrier().merge(4, 2);
        let structure = Arc::new(owned);
        let scheduler = Scheduler::new(structure.clone());
        Compactor::compact(&structure, &scheduler);

        let fun = structure.signature().binary_function("APP").unwrap();
        let a = structure.carrier().find(9);
        let b = structure.carrier().find(10);
        let v = structure.carrier().find(8);
        assert_eq!(fun.find(a, b), v);
        structure.validate_consistent();
    }
}
