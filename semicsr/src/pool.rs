//! Fixed-size worker pool for one parallel phase
//!
//! A pool lives inside a [`std::thread::scope`], so every task it runs may
//! borrow data from the enclosing stack frame: the scope guarantees the
//! borrows outlive all workers. Tasks travel over an unbounded
//! crossbeam channel; workers block on it and exit once it is closed and
//! empty, which makes teardown a full drain. A panicking task does not take
//! its worker down: the panic is recorded and re-raised by
//! [`ThreadPool::join`].
//!
//! ```
//! use semicsr::{PoolConfig, ThreadPool};
//!
//! let mut slots = vec![0u64; 8];
//! std::thread::scope(|scope| -> semicsr::Result<()> {
//!     let pool = ThreadPool::new(scope, &PoolConfig::default().with_workers(2))?;
//!     for (i, slot) in slots.iter_mut().enumerate() {
//!         pool.submit(move || *slot = (i * i) as u64);
//!     }
//!     pool.join();
//!     Ok(())
//! })
//! .unwrap();
//! assert_eq!(slots[3], 9);
//! ```

use crossbeam_channel::{Receiver, Sender};
use semicsr_core::{CsrError, Result};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::{self, Scope, ScopedJoinHandle};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Environment variable overriding the default worker count
pub const WORKERS_ENV: &str = "SEMICSR_WORKERS";

type Task<'scope> = Box<dyn FnOnce() + Send + 'scope>;
type PanicPayload = Box<dyn Any + Send + 'static>;

/// Configuration for a [`ThreadPool`]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PoolConfig {
    /// Number of worker threads, at least 1
    pub workers: usize,
    /// Prefix for worker thread names
    pub thread_name: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get().max(1),
            thread_name: "semicsr-worker".to_string(),
        }
    }
}

impl PoolConfig {
    /// Set the worker count, clamped to at least one
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set the thread name prefix
    ///
    /// Names containing a NUL byte are rejected by [`ThreadPool::new`].
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Default configuration, with the worker count taken from
    /// `SEMICSR_WORKERS` when it holds a positive integer
    pub fn from_env() -> Self {
        let config = Self::default();
        match std::env::var(WORKERS_ENV) {
            Ok(raw) => match raw.trim().parse::<usize>() {
                Ok(workers) if workers > 0 => config.with_workers(workers),
                _ => {
                    log::warn!("ignoring {WORKERS_ENV}={raw:?}: expected a positive integer");
                    config
                }
            },
            Err(_) => config,
        }
    }

    /// Number of workers
    pub fn workers(&self) -> usize {
        self.workers
    }
}

/// Lifecycle of a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PoolState {
    Constructing = 0,
    Running = 1,
    Draining = 2,
    Stopped = 3,
}

impl PoolState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => PoolState::Constructing,
            1 => PoolState::Running,
            2 => PoolState::Draining,
            _ => PoolState::Stopped,
        }
    }
}

/// Task counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PoolStats {
    pub submitted: usize,
    pub completed: usize,
}

struct Shared {
    state: AtomicU8,
    submitted: AtomicUsize,
    completed: AtomicUsize,
    pending: Mutex<usize>,
    idle: Condvar,
    panic: Mutex<Option<PanicPayload>>,
}

impl Shared {
    fn new() -> Self {
        Self {
            state: AtomicU8::new(PoolState::Constructing as u8),
            submitted: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
            pending: Mutex::new(0),
            idle: Condvar::new(),
            panic: Mutex::new(None),
        }
    }

    fn set_state(&self, state: PoolState) {
        self.state.store(state as u8, Ordering::Release);
    }

    fn add_pending(&self) {
        *self.pending.lock().unwrap_or_else(PoisonError::into_inner) += 1;
    }

    fn finish_one(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
        self.release_pending();
    }

    /// Keep the first payload; later ones are only logged
    fn record_panic(&self, payload: PanicPayload) {
        let mut slot = self.panic.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            *slot = Some(payload);
        }
    }

    fn take_panic(&self) -> Option<PanicPayload> {
        self.panic.lock().unwrap_or_else(PoisonError::into_inner).take()
    }

    fn release_pending(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        *pending -= 1;
        if *pending == 0 {
            self.idle.notify_all();
        }
    }
}

fn worker_loop(receiver: &Receiver<Task<'_>>, shared: &Shared) {
    while let Ok(task) = receiver.recv() {
        // A task that panics still counts as completed
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(task)) {
            log::error!("task panicked on {:?}", thread::current().name());
            shared.record_panic(payload);
        }
        shared.finish_one();
    }
}

/// Worker pool bound to a thread scope
///
/// Dropping the pool (or calling [`ThreadPool::join`]) closes the queue and
/// waits for every submitted task to finish.
pub struct ThreadPool<'scope> {
    sender: Option<Sender<Task<'scope>>>,
    workers: Vec<ScopedJoinHandle<'scope, ()>>,
    shared: Arc<Shared>,
}

impl<'scope> ThreadPool<'scope> {
    /// Spawn `config.workers` threads inside `scope`
    ///
    /// Either every worker starts or none is left running: on a spawn
    /// failure the workers already started are joined and
    /// `CsrError::PoolSpawn` is returned. A thread name prefix containing a
    /// NUL byte fails the same way before any thread starts.
    pub fn new<'env>(scope: &'scope Scope<'scope, 'env>, config: &PoolConfig) -> Result<Self> {
        if config.thread_name.contains('\0') {
            log::error!("thread name {:?} contains a NUL byte", config.thread_name);
            return Err(CsrError::PoolSpawn);
        }

        let (sender, receiver) = crossbeam_channel::unbounded::<Task<'scope>>();
        let shared = Arc::new(Shared::new());
        let count = config.workers.max(1);
        let mut workers = Vec::with_capacity(count);

        for index in 0..count {
            let receiver = receiver.clone();
            let worker_shared = Arc::clone(&shared);
            let spawned = thread::Builder::new()
                .name(format!("{}-{index}", config.thread_name))
                .spawn_scoped(scope, move || worker_loop(&receiver, &worker_shared));

            match spawned {
                Ok(handle) => workers.push(handle),
                Err(err) => {
                    log::error!("failed to spawn worker {index} of {count}: {err}");
                    shared.set_state(PoolState::Draining);
                    drop(sender);
                    for handle in workers {
                        let _ = handle.join();
                    }
                    shared.set_state(PoolState::Stopped);
                    return Err(CsrError::PoolSpawn);
                }
            }
        }

        shared.set_state(PoolState::Running);
        log::debug!("thread pool running with {count} workers");

        Ok(Self {
            sender: Some(sender),
            workers,
            shared,
        })
    }

    /// Queue a task; returns immediately
    pub fn submit<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'scope,
    {
        let Some(sender) = &self.sender else {
            return;
        };

        self.shared.submitted.fetch_add(1, Ordering::Relaxed);
        self.shared.add_pending();

        if sender.send(Box::new(task)).is_err() {
            // Workers hold the receiver until the queue closes
            log::error!("task dropped: no live workers");
            self.shared.submitted.fetch_sub(1, Ordering::Relaxed);
            self.shared.release_pending();
        }
    }

    /// Block until every task submitted so far has completed or panicked
    ///
    /// The pool stays usable afterwards.
    pub fn wait_idle(&self) {
        let mut pending = self.shared.pending.lock().unwrap_or_else(PoisonError::into_inner);
        while *pending > 0 {
            pending = self
                .shared
                .idle
                .wait(pending)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Close the queue, run every queued task and join the workers
    ///
    /// # Panics
    ///
    /// Re-raises the first panic of a submitted task, after every other
    /// task has run.
    pub fn join(mut self) {
        if let Some(payload) = self.shutdown() {
            std::panic::resume_unwind(payload);
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> PoolState {
        PoolState::from_u8(self.shared.state.load(Ordering::Acquire))
    }

    /// Submitted and completed task counts
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            submitted: self.shared.submitted.load(Ordering::Relaxed),
            completed: self.shared.completed.load(Ordering::Relaxed),
        }
    }

    /// Number of worker threads
    pub fn workers(&self) -> usize {
        self.workers.len()
    }

    /// Returns the first worker panic payload, if any
    fn shutdown(&mut self) -> Option<PanicPayload> {
        let sender = self.sender.take()?;
        self.shared.set_state(PoolState::Draining);
        drop(sender);

        let mut first_panic = None;
        for handle in self.workers.drain(..) {
            if let Err(payload) = handle.join() {
                log::error!("worker thread panicked");
                first_panic.get_or_insert(payload);
            }
        }
        if let Some(payload) = self.shared.take_panic() {
            first_panic = Some(payload);
        }

        self.shared.set_state(PoolState::Stopped);
        let stats = self.stats();
        log::debug!(
            "thread pool stopped after {} of {} tasks",
            stats.completed,
            stats.submitted
        );
        first_panic
    }
}

impl Drop for ThreadPool<'_> {
    fn drop(&mut self) {
        if self.shutdown().is_some() {
            log::error!("thread pool dropped with an unhandled task panic");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU64;

    #[test]
    fn test_config_defaults() {
        let config = PoolConfig::default();
        assert!(config.workers() >= 1);
        assert_eq!(config.thread_name, "semicsr-worker");
        assert_eq!(PoolConfig::default().with_workers(0).workers(), 1);
        assert_eq!(
            PoolConfig::default().with_thread_name("mul").thread_name,
            "mul"
        );
    }

    #[test]
    fn test_join_drains_all_tasks() {
        let counter = AtomicU64::new(0);
        thread::scope(|scope| {
            let pool = ThreadPool::new(scope, &PoolConfig::default().with_workers(3)).unwrap();
            assert_eq!(pool.state(), PoolState::Running);
            assert_eq!(pool.workers(), 3);
            for i in 1..=100 {
                let counter = &counter;
                pool.submit(move || {
                    counter.fetch_add(i, Ordering::Relaxed);
                });
            }
            pool.join();
        });
        assert_eq!(counter.load(Ordering::Relaxed), 5050);
    }

    #[test]
    fn test_drop_drains() {
        let mut out = vec![0usize; 16];
        thread::scope(|scope| {
            let pool = ThreadPool::new(scope, &PoolConfig::default().with_workers(2)).unwrap();
            for (i, slot) in out.iter_mut().enumerate() {
                pool.submit(move || *slot = i + 1);
            }
        });
        assert!(out.iter().enumerate().all(|(i, &v)| v == i + 1));
    }

    #[test]
    fn test_wait_idle_is_reusable() {
        let counter = AtomicU64::new(0);
        thread::scope(|scope| {
            let pool = ThreadPool::new(scope, &PoolConfig::default().with_workers(4)).unwrap();

            for _ in 0..50 {
                let counter = &counter;
                pool.submit(move || {
                    counter.fetch_add(1, Ordering::Relaxed);
                });
            }
            pool.wait_idle();
            assert_eq!(counter.load(Ordering::Relaxed), 50);
            assert_eq!(pool.state(), PoolState::Running);

            for _ in 0..25 {
                let counter = &counter;
                pool.submit(move || {
                    counter.fetch_add(1, Ordering::Relaxed);
                });
            }
            pool.wait_idle();
            assert_eq!(counter.load(Ordering::Relaxed), 75);
            assert_eq!(
                pool.stats(),
                PoolStats {
                    submitted: 75,
                    completed: 75
                }
            );
            pool.join();
        });
    }

    #[test]
    fn test_wait_idle_without_tasks() {
        thread::scope(|scope| {
            let pool = ThreadPool::new(scope, &PoolConfig::default().with_workers(1)).unwrap();
            pool.wait_idle();
            assert_eq!(pool.stats(), PoolStats::default());
        });
    }

    #[test]
    fn test_panicking_task_does_not_stall() {
        let ran = AtomicU64::new(0);
        thread::scope(|scope| {
            let pool = ThreadPool::new(scope, &PoolConfig::default().with_workers(1)).unwrap();
            pool.submit(|| panic!("task failed"));
            pool.submit(|| {
                ran.fetch_add(1, Ordering::Relaxed);
            });

            pool.wait_idle();
            assert_eq!(ran.load(Ordering::Relaxed), 1);
            assert_eq!(
                pool.stats(),
                PoolStats {
                    submitted: 2,
                    completed: 2
                }
            );

            // The single worker is still alive
            pool.submit(|| {
                ran.fetch_add(1, Ordering::Relaxed);
            });
            pool.wait_idle();
            assert_eq!(ran.load(Ordering::Relaxed), 2);

            let joined = panic::catch_unwind(AssertUnwindSafe(|| pool.join()));
            let payload = joined.unwrap_err();
            assert_eq!(payload.downcast_ref::<&str>(), Some(&"task failed"));
        });
    }

    #[test]
    fn test_nul_in_thread_name_is_spawn_error() {
        thread::scope(|scope| {
            let config = PoolConfig::default().with_thread_name("bad\0name");
            assert!(matches!(
                ThreadPool::new(scope, &config),
                Err(CsrError::PoolSpawn)
            ));
        });
    }

    #[test]
    fn test_state_transitions() {
        let seen_draining = AtomicU64::new(0);
        thread::scope(|scope| {
            let pool = ThreadPool::new(scope, &PoolConfig::default().with_workers(2)).unwrap();
            let shared = Arc::clone(&pool.shared);
            assert_eq!(pool.state(), PoolState::Running);

            for _ in 0..10 {
                pool.submit(|| {});
            }
            let (watched, seen_draining) = (Arc::clone(&shared), &seen_draining);
            pool.submit(move || {
                let state = || PoolState::from_u8(watched.state.load(Ordering::Acquire));
                // Held until join starts closing the queue
                while state() == PoolState::Running {
                    thread::yield_now();
                }
                if state() == PoolState::Draining {
                    seen_draining.fetch_add(1, Ordering::Relaxed);
                }
            });

            pool.join();
            assert_eq!(
                PoolState::from_u8(shared.state.load(Ordering::Acquire)),
                PoolState::Stopped
            );
            assert_eq!(shared.submitted.load(Ordering::Relaxed), 11);
            assert_eq!(shared.completed.load(Ordering::Relaxed), 11);
            assert_eq!(*shared.pending.lock().unwrap(), 0);
        });
        assert_eq!(seen_draining.load(Ordering::Relaxed), 1);
    }
}
