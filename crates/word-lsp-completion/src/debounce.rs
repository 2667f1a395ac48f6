//! Debouncing for suggestion queries and panel close.
//!
//! One pending timer per debouncer. Re-arming bumps a generation counter;
//! a timer whose generation is stale when it fires does nothing, so only
//! the most recent request in a window runs.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Default)]
struct DebounceState {
    generation: u64,
    last_call: Option<Instant>,
}

#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    state: Mutex<DebounceState>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Debouncer {
            delay,
            state: Mutex::new(DebounceState::default()),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    fn lock(&self) -> MutexGuard<'_, DebounceState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn arm(&self) -> (u64, Option<Instant>) {
        let mut state = self.lock();
        state.generation += 1;
        let previous = state.last_call.replace(Instant::now());
        (state.generation, previous)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.lock().generation == generation
    }

    /// Leading-edge debounce.
    ///
    /// The first call of a burst runs `f` at once. A call arriving within
    /// `delay` of the previous one waits out the window and runs only if no
    /// newer call came in meanwhile; superseded calls return `None`.
    pub async fn run<T>(&self, f: impl FnOnce() -> T) -> Option<T> {
        let (generation, previous) = self.arm();
        let in_window = previous.is_some_and(|last| last.elapsed() < self.delay);
        if !in_window {
            return Some(f());
        }

        tokio::time::sleep(self.delay).await;
        if !self.is_current(generation) {
            return None;
        }
        Some(f())
    }

    /// Trailing debounce: run `f` after `delay` unless re-scheduled or
    /// cancelled first.
    pub fn schedule<F>(self: &Arc<Self>, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let (generation, _) = self.arm();
        let this = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(this.delay).await;
            if this.is_current(generation) {
                f();
            }
        });
    }

    /// Drop whatever is pending.
    pub fn cancel(&self) {
        self.lock().generation += 1;
    }
}
