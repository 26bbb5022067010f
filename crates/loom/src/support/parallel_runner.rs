//! Fixed worker pool for per-module independent phases (parsing, SSA
//! codegen per function).
//!
//! Grounded on `original_source/src/banjo/utils/parallel_runner.{hpp,cpp}`:
//! a shared work queue, a fixed set of OS threads, and a "finished"
//! condition variable the submitting thread waits on. The teacher's own
//! dependency graph has no async runtime or thread-pool crate anywhere, so
//! this stays on `std::thread`/`Mutex`/`Condvar` rather than reaching for
//! `rayon` — that would be a stack the teacher never uses.

use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

type Task = Box<dyn FnOnce() + Send + 'static>;

struct Shared {
    queue: Mutex<Vec<Task>>,
    pending: Mutex<usize>,
    finished: Condvar,
    shutdown: Mutex<bool>,
    work_available: Condvar,
}

/// A fixed pool of worker threads draining a shared task deque.
///
/// `run_blocking` is the only entry point: it enqueues a batch of
/// self-contained tasks and blocks the calling thread until every one of
/// them has completed, matching the spec's contract in §5 ("Concurrency &
/// Resource Model / Parallel runner").
pub struct ParallelRunner {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl ParallelRunner {
    #[must_use]
    pub fn new(worker_count: usize) -> Self {
        let worker_count = worker_count.max(1);
        let shared = Arc::new(Shared {
            queue: Mutex::new(Vec::new()),
            pending: Mutex::new(0),
            finished: Condvar::new(),
            shutdown: Mutex::new(false),
            work_available: Condvar::new(),
        });

        let workers = (0..worker_count)
            .map(|_| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || worker_loop(&shared))
            })
            .collect();

        Self { shared, workers }
    }

    /// Enqueues `tasks` and blocks until every one has run.
    ///
    /// Tasks must be self-contained: any shared mutable state they touch
    /// must be synchronized by the caller, since tasks may run concurrently
    /// on different workers.
    pub fn run_blocking(&self, tasks: Vec<Task>) {
        if tasks.is_empty() {
            return;
        }

        {
            let mut pending = self.shared.pending.lock().expect("pending mutex poisoned");
            *pending += tasks.len();
        }
        {
            let mut queue = self.shared.queue.lock().expect("queue mutex poisoned");
            queue.extend(tasks);
        }
        self.shared.work_available.notify_all();

        let mut pending = self.shared.pending.lock().expect("pending mutex poisoned");
        while *pending > 0 {
            pending = self
                .shared
                .finished
                .wait(pending)
                .expect("finished condvar mutex poisoned");
        }
    }
}

fn worker_loop(shared: &Shared) {
    loop {
        let task = {
            let mut queue = shared.queue.lock().expect("queue mutex poisoned");
            loop {
                if let Some(task) = queue.pop() {
                    break Some(task);
                }
                if *shared.shutdown.lock().expect("shutdown mutex poisoned") {
                    return;
                }
                queue = shared
                    .work_available
                    .wait(queue)
                    .expect("work_available condvar mutex poisoned");
            }
        };

        if let Some(task) = task {
            task();
            let mut pending = shared.pending.lock().expect("pending mutex poisoned");
            *pending -= 1;
            if *pending == 0 {
                shared.finished.notify_all();
            }
        }
    }
}

impl Drop for ParallelRunner {
    fn drop(&mut self) {
        *self.shared.shutdown.lock().expect("shutdown mutex poisoned") = true;
        self.shared.work_available.notify_all();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn run_blocking_waits_for_every_task() {
        let runner = ParallelRunner::new(4);
        let counter = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<Task> = (0..50)
            .map(|_| {
                let counter = Arc::clone(&counter);
                Box::new(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                }) as Task
            })
            .collect();

        runner.run_blocking(tasks);
        assert_eq!(counter.load(Ordering::SeqCst), 50);
    }

    #[test]
    fn empty_batch_returns_immediately() {
        let runner = ParallelRunner::new(2);
        runner.run_blocking(Vec::new());
    }
}
