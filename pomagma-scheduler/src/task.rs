//! Task kinds driven by the scheduler: `ExistsTask`, `UnaryRelationTask`, `BinaryRelationTask`
//! with its positive/negative order specializations, the three function task kinds, `AssumeTask`,
//! `MergeTask`, `CleanupTask`, `SampleTask`. Each insert/observe task carries its actual work as a
//! closure rather than dispatching by runtime reflection over table names.

use pomagma_tables::TableKind;
use pomagma_util::Ob;

/// `BinaryRelationTask` comes in three flavors: unordered, and two
/// order-sensitive variants used when the relation's two arguments are scanned by a structural
/// order over obs rather than insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationOrder {
    Unordered,
    PositiveOrder,
    NegativeOrder,
}

/// Which kind of work an [`InsertTask`] performs, kept for logging and metrics; the actual work
/// lives in the task's closure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskKind {
    Exists,
    UnaryRelation,
    BinaryRelation(RelationOrder),
    NullaryFunction,
    InjectiveFunction,
    BinaryFunction,
    SymmetricFunction,
    Assume,
    Cleanup(TableKind),
    Sample,
}

/// A unit of insert-phase work: runs under the scheduler's shared lock, alongside other
/// `InsertTask`s on other threads, and may trigger further merges via the carrier's merge
/// callback.
pub struct InsertTask {
    kind: TaskKind,
    refs: Vec<Ob>,
    work: Box<dyn FnOnce() + Send>,
}

impl InsertTask {
    pub fn new(kind: TaskKind, refs: Vec<Ob>, work: impl FnOnce() + Send + 'static) -> Self {
        InsertTask {
            kind,
            refs,
            work: Box::new(work),
        }
    }

    pub fn kind(&self) -> &TaskKind {
        &self.kind
    }

    /// Whether this task reads or writes `dep`; used by the merge coordinator to discard tasks
    /// made stale by a merge before they run.
    pub fn references(&self, dep: Ob) -> bool {
        self.refs.contains(&dep)
    }

    pub fn run(self) {
        (self.work)()
    }
}
