//! A memoized async function over a [`WorkerPool`]. Used by the interval approximator to cache
//! function images keyed by `SetId`.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::worker_pool::WorkerPool;

enum Slot<V> {
    Pending,
    Ready(Arc<V>),
}

/// A map whose values are computed lazily and in the background. `try_find` never blocks: it
/// returns the value if ready, schedules the computation otherwise, and returns `None` (the
/// "pending" sentinel) either way until a later call observes the result.
pub struct LazyMap<K, V> {
    pool: Arc<WorkerPool>,
    compute: Box<dyn Fn(K) -> V + Send + Sync>,
    state: Mutex<HashMap<K, Slot<V>>>,
}

impl<K, V> LazyMap<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Send + Sync + 'static,
{
    pub fn new(pool: Arc<WorkerPool>, compute: impl Fn(K) -> V + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(LazyMap {
            pool,
            compute: Box::new(compute),
            state: Mutex::new(HashMap::new()),
        })
    }

    /// Returns the cached value if ready. If the key has never been requested, schedules
    /// computation on the worker pool and returns `None`; a concurrent or later call with the
    /// same key observes the same in-flight computation rather than duplicating it.
    pub fn try_find(self: &Arc<Self>, key: &K) -> Option<Arc<V>> {
        {
            let state = self.state.lock();
            match state.get(key) {
                Some(Slot::Ready(value)) => return Some(value.clone()),
                Some(Slot::Pending) => return None,
                None => {}
            }
        }
        let mut state = self.state.lock();
        if state.contains_key(key) {
            // Lost the race to insert the pending marker; whoever won is already scheduled.
            return None;
        }
        state.insert(key.clone(), Slot::Pending);
        drop(state);

        let this = self.clone();
        let key_for_job = key.clone();
        self.pool.submit(move || {
            let value = (this.compute)(key_for_job.clone());
            this.state.lock().insert(key_for_job, Slot::Ready(Arc::new(value)));
        });
        None
    }

    /// Pre-seeds `key` with an already-known value, skipping computation (used to hydrate values
    /// loaded from disk).
    pub fn unsafe_insert(&self, key: K, value: V) {
        self.state.lock().insert(key, Slot::Ready(Arc::new(value)));
    }

    pub fn len(&self) -> usize {
        self.state.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
