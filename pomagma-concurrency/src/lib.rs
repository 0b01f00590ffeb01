//! Concurrency primitives shared by the analyst tools: a content-addressed
//! `DenseSet` interner, a memoized async map, and the worker pool backing both.

mod dense_set_store;
mod lazy_map;
mod worker_pool;

pub use dense_set_store::{DenseSetStore, SetId};
pub use lazy_map::LazyMap;
pub use worker_pool::WorkerPool;
