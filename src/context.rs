//! Worker-pool contexts for concurrent recursion.
//!
//! A [`TaskContext`] describes the subset of worker threads a recursion frame
//! may use. Splitting yields two child contexts over disjoint halves of the
//! pool; when fewer than two workers remain the split fails and the caller
//! runs its branches sequentially. The pool itself is static: there is no
//! work stealing beyond the binary split, and the only suspension point is
//! the join of the two branches.

/// Handle to a subset of the configured worker threads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskContext {
    workers: usize,
}

impl TaskContext {
    /// Context over `workers` threads (at least one).
    pub fn new(workers: usize) -> Self {
        Self { workers: workers.max(1) }
    }

    /// Single-worker context; every split attempt fails.
    pub fn sequential() -> Self {
        Self::new(1)
    }

    /// Context sized to the global thread pool.
    #[cfg(feature = "parallel")]
    pub fn available() -> Self {
        Self::new(rayon::current_num_threads())
    }

    /// Context sized to the global thread pool.
    #[cfg(not(feature = "parallel"))]
    pub fn available() -> Self {
        Self::sequential()
    }

    /// Number of workers covered by this context.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Splits the pool into two disjoint sub-pools, or returns `None` when
    /// fewer than two workers remain.
    pub fn try_split(&self) -> Option<(TaskContext, TaskContext)> {
        if self.workers < 2 {
            return None;
        }
        let low = self.workers / 2;
        Some((Self::new(self.workers - low), Self::new(low)))
    }

    /// Runs two closures fork-join, blocking until both complete.
    #[cfg(feature = "parallel")]
    pub fn join<A, B, RA, RB>(a: A, b: B) -> (RA, RB)
    where
        A: FnOnce() -> RA + Send,
        B: FnOnce() -> RB + Send,
        RA: Send,
        RB: Send,
    {
        rayon::join(a, b)
    }

    /// Runs two closures in sequence when the `parallel` feature is off.
    #[cfg(not(feature = "parallel"))]
    pub fn join<A, B, RA, RB>(a: A, b: B) -> (RA, RB)
    where
        A: FnOnce() -> RA + Send,
        B: FnOnce() -> RB + Send,
        RA: Send,
        RB: Send,
    {
        (a(), b())
    }
}
