//! Single ordered execution context ("UI thread")
//!
//! All rendering and panel-state mutation runs through a [`UiContext`]. Tasks
//! submitted from any thread are queued in submission order and executed one
//! at a time on the owner thread, either by [`UiContext::flush`] or by the
//! blocking [`UiContext::run`] loop.

use std::{
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    thread::{self, ThreadId},
};

use tokio::sync::mpsc;

type Task = Box<dyn FnOnce() + Send + 'static>;

enum Job {
    Run(Task),
    /// Unblocks `run` so it can observe a shutdown request
    Wake,
}

struct Inner {
    owner: ThreadId,
    tx: mpsc::UnboundedSender<Job>,
    rx: Mutex<mpsc::UnboundedReceiver<Job>>,
    /// Set while a task executes; nested flushes are no-ops
    busy: AtomicBool,
    shutdown: AtomicBool,
    queued: AtomicUsize,
}

/// Handle to the single-threaded execution context. Cheap to clone.
#[derive(Clone)]
pub struct UiContext {
    inner: Arc<Inner>,
}

impl UiContext {
    /// Create a context owned by the calling thread
    pub fn for_current_thread() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            inner: Arc::new(Inner {
                owner: thread::current().id(),
                tx,
                rx: Mutex::new(rx),
                busy: AtomicBool::new(false),
                shutdown: AtomicBool::new(false),
                queued: AtomicUsize::new(0),
            }),
        }
    }

    pub fn is_ui_thread(&self) -> bool {
        thread::current().id() == self.inner.owner
    }

    /// Number of tasks waiting to run
    pub fn pending(&self) -> usize {
        self.inner.queued.load(Ordering::Acquire)
    }

    /// Queue `task` behind everything already submitted. Safe from any thread.
    pub fn invoke_later<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.inner.queued.fetch_add(1, Ordering::AcqRel);
        if self.inner.tx.send(Job::Run(Box::new(task))).is_err() {
            self.inner.queued.fetch_sub(1, Ordering::AcqRel);
            log::warn!("[UiContext] Queue closed, dropping task");
        }
    }

    /// Run queued tasks in submission order.
    ///
    /// Only drains when called on the owner thread outside a running task;
    /// otherwise the tasks stay queued for the outer loop. Returns the number
    /// of tasks executed.
    pub fn flush(&self) -> usize {
        if !self.is_ui_thread() || self.inner.busy.load(Ordering::Acquire) {
            return 0;
        }

        let mut executed = 0;
        loop {
            let job = {
                let mut rx = self.inner.rx.lock().unwrap_or_else(|e| e.into_inner());
                match rx.try_recv() {
                    Ok(job) => job,
                    Err(_) => break,
                }
            };
            if let Job::Run(task) = job {
                self.execute(task);
                executed += 1;
            }
        }

        if executed > 0 {
            log::trace!("[UiContext] Flushed {} tasks", executed);
        }
        executed
    }

    /// Block the owner thread executing tasks until [`UiContext::shutdown`] is called
    pub fn run(&self) -> anyhow::Result<()> {
        if !self.is_ui_thread() {
            anyhow::bail!("UiContext::run must be called on the thread that created the context");
        }

        log::info!("[UiContext] Event loop started");
        while !self.inner.shutdown.load(Ordering::Acquire) {
            let job = {
                let mut rx = self.inner.rx.lock().unwrap_or_else(|e| e.into_inner());
                rx.blocking_recv()
            };
            match job {
                Some(Job::Run(task)) => self.execute(task),
                Some(Job::Wake) => {}
                None => break,
            }
        }
        log::info!(
            "[UiContext] Event loop stopped with {} tasks pending",
            self.pending()
        );
        Ok(())
    }

    /// Ask the `run` loop to stop after the current task. Safe from any thread.
    pub fn shutdown(&self) {
        self.inner.shutdown.store(true, Ordering::Release);
        let _ = self.inner.tx.send(Job::Wake);
    }

    pub fn is_shutdown(&self) -> bool {
        self.inner.shutdown.load(Ordering::Acquire)
    }

    fn execute(&self, task: Task) {
        self.inner.busy.store(true, Ordering::Release);
        if catch_unwind(AssertUnwindSafe(task)).is_err() {
            log::error!("[UiContext] Task panicked, continuing with the next one");
        }
        self.inner.busy.store(false, Ordering::Release);
        self.inner.queued.fetch_sub(1, Ordering::AcqRel);
    }
}

impl std::fmt::Debug for UiContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiContext")
            .field("owner", &self.inner.owner)
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<usize>>>, impl Fn(usize) + Clone) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_clone = log.clone();
        (log, move |n| log_clone.lock().unwrap().push(n))
    }

    #[test]
    fn test_flush_runs_tasks_in_submission_order() {
        let ui = UiContext::for_current_thread();
        let (log, record) = recorder();

        for n in 0..5 {
            let record = record.clone();
            ui.invoke_later(move || record(n));
        }
        assert_eq!(ui.pending(), 5);
        assert!(log.lock().unwrap().is_empty());

        assert_eq!(ui.flush(), 5);
        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2, 3, 4]);
        assert_eq!(ui.pending(), 0);
    }

    #[test]
    fn test_tasks_from_other_threads_run_on_owner() {
        let ui = UiContext::for_current_thread();
        let owner = thread::current().id();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let producer_ui = ui.clone();
        let producer_seen = seen.clone();
        thread::spawn(move || {
            // Off the owner thread flush never executes anything
            for n in 0..3 {
                let seen = producer_seen.clone();
                producer_ui.invoke_later(move || {
                    seen.lock().unwrap().push((n, thread::current().id()));
                });
            }
            assert_eq!(producer_ui.flush(), 0);
        })
        .join()
        .unwrap();

        assert_eq!(ui.flush(), 3);
        let seen = seen.lock().unwrap();
        assert_eq!(seen.iter().map(|(n, _)| *n).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert!(seen.iter().all(|(_, id)| *id == owner));
    }

    #[test]
    fn test_nested_flush_defers_to_outer_loop() {
        let ui = UiContext::for_current_thread();
        let (log, record) = recorder();

        let inner_ui = ui.clone();
        let outer_record = record.clone();
        ui.invoke_later(move || {
            outer_record(1);
            let nested_record = outer_record.clone();
            inner_ui.invoke_later(move || nested_record(3));
            // Must not run the nested task in the middle of this one
            assert_eq!(inner_ui.flush(), 0);
            outer_record(2);
        });

        assert_eq!(ui.flush(), 2);
        assert_eq!(*log.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_panicking_task_does_not_stop_queue() {
        let ui = UiContext::for_current_thread();
        let (log, record) = recorder();

        ui.invoke_later(|| panic!("boom"));
        ui.invoke_later(move || record(7));

        assert_eq!(ui.flush(), 2);
        assert_eq!(*log.lock().unwrap(), vec![7]);
    }

    #[test]
    fn test_run_until_shutdown() {
        let ui = UiContext::for_current_thread();
        let (log, record) = recorder();

        let producer_ui = ui.clone();
        let producer = thread::spawn(move || {
            for n in 0..10 {
                let record = record.clone();
                producer_ui.invoke_later(move || record(n));
            }
            let stopper = producer_ui.clone();
            producer_ui.invoke_later(move || stopper.shutdown());
        });

        ui.run().unwrap();
        producer.join().unwrap();

        assert!(ui.is_shutdown());
        assert_eq!(*log.lock().unwrap(), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_run_rejects_foreign_thread() {
        let ui = UiContext::for_current_thread();
        let foreign = ui.clone();
        let result = thread::spawn(move || foreign.run().is_err()).join().unwrap();
        assert!(result);
    }
}
