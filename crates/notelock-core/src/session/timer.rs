//! Auto-lock task bookkeeping.
//!
//! Only the most recently armed task may lock the session. Arming bumps the
//! generation and aborts the previous task; a task that wakes up anyway
//! (abort raced with its wake-up) sees a stale generation and does nothing.

use tokio::task::JoinHandle;

#[derive(Debug, Default)]
pub(crate) struct AutoLock {
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

impl AutoLock {
    /// Invalidate any armed task and return the generation for the next one.
    pub fn rearm(&mut self) -> u64 {
        self.cancel();
        self.generation
    }

    /// Attach the task spawned for the current generation.
    pub fn attach(&mut self, handle: JoinHandle<()>) {
        self.handle = Some(handle);
    }

    pub fn cancel(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.handle.is_some() && self.generation == generation
    }

    /// Called by the current task when it fires.
    pub fn fired(&mut self) {
        self.handle = None;
    }

    pub fn is_armed(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for AutoLock {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rearm_invalidates_previous_generation() {
        let mut timer = AutoLock::default();

        let first = timer.rearm();
        timer.attach(tokio::spawn(async {}));
        assert!(timer.is_current(first));

        let second = timer.rearm();
        timer.attach(tokio::spawn(async {}));
        assert!(!timer.is_current(first));
        assert!(timer.is_current(second));
    }

    #[tokio::test]
    async fn test_cancel_disarms() {
        let mut timer = AutoLock::default();
        let generation = timer.rearm();
        timer.attach(tokio::spawn(std::future::pending::<()>()));

        timer.cancel();
        assert!(!timer.is_armed());
        assert!(!timer.is_current(generation));
    }
}
