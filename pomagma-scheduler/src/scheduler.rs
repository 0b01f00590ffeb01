//! The merge scheduler: a task queue plus a single merge queue, coordinated by a process-wide
//! shared-exclusive lock so that "insert phase" (many readers) and "merge phase" (one exclusive
//! writer draining the carrier's merge callback to a fixed point) never overlap.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex, RwLock};
use pomagma_structure::Structure;
use pomagma_util::Ob;

use crate::task::InsertTask;

/// How long a worker with an empty queue waits before re-checking the stop flag.
const IDLE_POLL: Duration = Duration::from_millis(50);

pub struct Scheduler {
    structure: Arc<Structure>,
    phase_lock: RwLock<()>,
    tasks: Mutex<VecDeque<InsertTask>>,
    tasks_ready: Condvar,
    merge_queue: Mutex<VecDeque<Ob>>,
    merge_rx: Mutex<Receiver<Ob>>,
    stopping: AtomicBool,
}

impl Scheduler {
    /// Registers this scheduler as the carrier's sole merge callback consumer. Only one scheduler
    /// may be attached to a given structure at a time (a second `new` silently replaces the first
    /// callback, mirroring `Carrier::set_merge_callback`'s single-slot contract).
    pub fn new(structure: Arc<Structure>) -> Self {
        let (tx, rx) = mpsc::channel();
        structure.carrier().set_merge_callback(tx);
        Scheduler {
            structure,
            phase_lock: RwLock::new(()),
            tasks: Mutex::new(VecDeque::new()),
            tasks_ready: Condvar::new(),
            merge_queue: Mutex::new(VecDeque::new()),
            merge_rx: Mutex::new(rx),
            stopping: AtomicBool::new(false),
        }
    }

    pub fn structure(&self) -> &Arc<Structure> {
        &self.structure
    }

    pub fn push(&self, task: InsertTask) {
        self.tasks.lock().push_back(task);
        self.tasks_ready.notify_one();
    }

    /// Enqueues a merge directly, bypassing the carrier (used by `CleanupTask`/`SampleTask`-style
    /// callers that already know two obs must unify).
    pub fn push_merge(&self, dep: Ob) {
        self.merge_queue.lock().push_back(dep);
    }

    pub fn request_stop(&self) {
        self.stopping.store(true, Ordering::Relaxed);
        self.tasks_ready.notify_all();
    }

    pub fn is_stopping(&self) -> bool {
        self.stopping.load(Ordering::Relaxed)
    }

    /// Drains the merge queue (both directly pushed deps and anything the carrier's callback
    /// produced) to a fixed point, running every table's `unsafe_merge`/`update_values` cascade
    /// under the exclusive phase lock. A no-op when nothing is pending.
    pub fn drain_merges(&self) {
        let _exclusive = self.phase_lock.write();
        loop {
            let mut pending: Vec<Ob> = self.merge_queue.lock().drain(..).collect();
            {
                let rx = self.merge_rx.lock();
                while let Ok(dep) = rx.try_recv() {
                    pending.push(dep);
                }
            }
            if pending.is_empty() {
                break;
            }
            tracing::debug!(count = pending.len(), "draining merge batch");

            // Guarantee 3: discard queued tasks superseded by a merge they reference.
            self.tasks
                .lock()
                .retain(|task| !pending.iter().any(|dep| task.references(*dep)));

            for dep in &pending {
                for (_, table) in self.structure.signature().all_tables() {
                    table.unsafe_merge(*dep);
                }
            }
            for (_, table) in self.structure.signature().all_tables() {
                table.update_values();
            }
        }
    }

    /// Runs at most one queued insert task under the shared phase lock, then drains any merges it
    /// produced. Returns `false` if the queue was empty.
    pub fn run_one(&self) -> bool {
        let task = self.tasks.lock().pop_front();
        let Some(task) = task else {
            return false;
        };
        {
            let _shared = self.phase_lock.read();
            task.run();
        }
        self.drain_merges();
        true
    }

    /// A worker loop: runs tasks until told to stop and the queue is empty, then drains any
    /// remaining merges so the structure is left congruence-closed.
    pub fn run_until_stopped(&self) {
        loop {
            if self.run_one() {
                continue;
            }
            if self.is_stopping() {
                break;
            }
            let mut tasks = self.tasks.lock();
            if tasks.is_empty() {
                self.tasks_ready.wait_for(&mut tasks, IDLE_POLL);
            }
        }
        self.drain_merges();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskKind;
    use pomagma_structure::Structure;
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    #[test]
    fn drain_merges_cascades_carrier_merges_into_tables() {
        let mut structure = Structure::new(10);
        for _ in 0..6 {
            structure.carrier().unsafe_insert();
        }
        let app = structure.signature_mut().declare_binary_function("APP");
        app.insert(1, 2, 4);
        app.insert(1, 3, 5);

        let scheduler = Scheduler::new(Arc::new(structure));
        scheduler.structure().carrier().merge(5, 4);
        scheduler.drain_merges();

        let app = scheduler.structure().signature().binary_function("APP").unwrap();
        let rep = scheduler.structure().carrier().find(4);
        assert_eq!(app.find(1, 2), rep);
        assert_eq!(app.find(1, 3), rep);
    }

    #[test]
    fn run_one_discards_tasks_referencing_a_merged_dep() {
        let structure = Structure::new(10);
        for _ in 0..4 {
            structure.carrier().unsafe_insert();
        }
        let scheduler = Arc::new(Scheduler::new(Arc::new(structure)));
        let ran = Arc::new(AtomicUsize::new(0));

        scheduler.structure().carrier().merge(3, 2);

        let ran_clone = ran.clone();
        scheduler.push(InsertTask::new(TaskKind::Exists, vec![3], move || {
            ran_clone.fetch_add(1, Ordering::Relaxed);
        }));
        scheduler.drain_merges();
        assert_eq!(ran.load(Ordering::Relaxed), 0, "stale task must be discarded, not run");
    }

    #[test]
    fn concurrent_inserts_and_merges_leave_a_consistent_structure() {
        let mut structure = Structure::new(64);
        for _ in 0..20 {
            structure.carrier().unsafe_insert();
        }
        let fun = structure.signature_mut().declare_binary_function("APP");
        let scheduler = Arc::new(Scheduler::new(Arc::new(structure)));

        let mut handles = Vec::new();
        for t in 0..4 {
            let scheduler = scheduler.clone();
            let fun = fun.clone();
            handles.push(thread::spawn(move || {
                for i in 1..=15u32 {
                    let lhs = 1 + (i + t) % 15;
                    let rhs = 1 + (i * 3 + t) % 15;
                    let val = 1 + (i * 7 + t) % 15;
                    scheduler.push(InsertTask::new(TaskKind::BinaryFunction, vec![lhs, rhs, val], {
                        let fun = fun.clone();
                        move || {
                            fun.insert(lhs, rhs, val);
                        }
                    }));
                    scheduler.run_one();
                }
            }));
        }
        let merger = {
            let scheduler = scheduler.clone();
            thread::spawn(move || {
                for pair in [(10u32, 8u32), (12, 9), (15, 11)] {
                    scheduler.structure().carrier().merge(pair.0, pair.1);
                    scheduler.drain_merges();
                }
            })
        };
        for handle in handles {
            handle.join().unwrap();
        }
        merger.join().unwrap();
        scheduler.drain_merges();

        scheduler.structure().validate_consistent();
    }
}
