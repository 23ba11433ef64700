use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Counting barrier: [`wait`](Self::wait) blocks until every
/// [`add`](Self::add) has been matched by a [`done`](Self::done).
#[derive(Debug, Default)]
pub(crate) struct WaitGroup {
    pending: Mutex<usize>,
    zero: Condvar,
}

impl WaitGroup {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, usize> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn add(&self) {
        *self.lock() += 1;
    }

    pub(crate) fn done(&self) {
        let mut pending = self.lock();
        *pending = pending.saturating_sub(1);
        if *pending == 0 {
            self.zero.notify_all();
        }
    }

    pub(crate) fn wait(&self) {
        let pending = self.lock();
        let _pending = self
            .zero
            .wait_while(pending, |pending| *pending > 0)
            .unwrap_or_else(PoisonError::into_inner);
    }

    pub(crate) fn count(&self) -> usize {
        *self.lock()
    }
}
