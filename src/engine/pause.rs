//! Pause rendezvous between mutators and the evaluator thread.
//!
//! A mutator calls [`PauseGate::request`], which bumps a request counter and
//! blocks until the evaluator reports that it is parked (or until no
//! evaluator is running). The evaluator only looks at the counter between
//! ticks, in [`PauseGate::checkpoint`], and stays parked until the counter
//! drops back to zero. Requests nest: the evaluator resumes only when the
//! last [`PauseGuard`] is dropped.

use parking_lot::{Condvar, Mutex};
use std::time::Duration;

#[derive(Debug, Default)]
struct GateState {
    requests: usize,
    paused: bool,
    running: bool,
    quit: bool,
}

#[derive(Debug, Default)]
pub struct PauseGate {
    state: Mutex<GateState>,
    cond: Condvar,
}

impl PauseGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks until the evaluator is parked between ticks. Returns
    /// immediately when no evaluator is running or it is already parked.
    pub fn request(&self) -> PauseGuard<'_> {
        let mut state = self.state.lock();
        state.requests += 1;
        tracing::trace!("Pause requested (depth {})", state.requests);
        self.cond.notify_all();
        while state.running && !state.paused {
            self.cond.wait(&mut state);
        }
        PauseGuard { gate: self }
    }

    fn release(&self) {
        let mut state = self.state.lock();
        state.requests -= 1;
        tracing::trace!("Pause released (depth {})", state.requests);
        if state.requests == 0 {
            self.cond.notify_all();
        }
    }

    /// Number of outstanding pause requests.
    pub fn depth(&self) -> usize {
        self.state.lock().requests
    }

    pub fn is_paused(&self) -> bool {
        self.state.lock().paused
    }

    /// Whether an evaluator thread is attached to this gate.
    pub fn is_running(&self) -> bool {
        self.state.lock().running
    }

    // ── Evaluator side ──

    /// Marks the evaluator as running. Called before the thread is spawned
    /// so a shutdown that races the spawn is not lost.
    pub(crate) fn begin(&self) {
        let mut state = self.state.lock();
        state.running = true;
        state.paused = false;
        state.quit = false;
    }

    /// Marks the evaluator as gone and wakes every waiter.
    pub(crate) fn finish(&self) {
        let mut state = self.state.lock();
        state.running = false;
        state.paused = false;
        self.cond.notify_all();
    }

    /// Calls [`PauseGate::finish`] on drop, including during a panic
    /// unwind, so requesters never wait on a dead thread.
    pub(crate) fn running_token(&self) -> RunningToken<'_> {
        RunningToken { gate: self }
    }

    /// Parks while pause requests are outstanding. Returns false once quit
    /// has been requested.
    pub(crate) fn checkpoint(&self) -> bool {
        let mut state = self.state.lock();
        if state.requests > 0 && !state.quit {
            state.paused = true;
            self.cond.notify_all();
            while state.requests > 0 && !state.quit {
                self.cond.wait(&mut state);
            }
            state.paused = false;
        }
        !state.quit
    }

    /// Sleeps for up to `period`, waking early for pause or quit requests.
    pub(crate) fn idle(&self, period: Duration) {
        let mut state = self.state.lock();
        if state.requests == 0 && !state.quit {
            self.cond.wait_for(&mut state, period);
        }
    }

    /// Waits out in-flight pauses, then asks the evaluator to exit.
    pub(crate) fn shutdown(&self) {
        let mut state = self.state.lock();
        while state.requests > 0 {
            self.cond.wait(&mut state);
        }
        state.quit = true;
        self.cond.notify_all();
    }
}

/// Held by a mutator; the evaluator stays parked while any guard is alive.
#[must_use = "the evaluator resumes as soon as the guard is dropped"]
pub struct PauseGuard<'a> {
    gate: &'a PauseGate,
}

impl Drop for PauseGuard<'_> {
    fn drop(&mut self) {
        self.gate.release();
    }
}

pub(crate) struct RunningToken<'a> {
    gate: &'a PauseGate,
}

impl Drop for RunningToken<'_> {
    fn drop(&mut self) {
        self.gate.finish();
    }
}
