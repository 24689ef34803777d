use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct State {
    stopped: bool,
    paused: bool,
}

/// Cooperative control over a running [`Runner`](super::Runner)
///
/// Clones share the same state, so a host thread can keep one while the runner executes on
/// another. The runner polls it at every step boundary: a pause blocks it there until
/// [`resume`](Self::resume) or [`stop`](Self::stop), a stop ends the run. A stop is final for
/// the runner it belongs to.
#[derive(Debug, Clone, Default)]
pub struct RunControl {
    inner: Arc<(Mutex<State>, Condvar)>,
}

impl RunControl {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.inner.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Ask the runner to return at the next step boundary
    pub fn stop(&self) {
        self.state().stopped = true;
        self.inner.1.notify_all();
    }

    /// Ask the runner to wait at the next step boundary
    pub fn pause(&self) {
        self.state().paused = true;
    }

    pub fn resume(&self) {
        self.state().paused = false;
        self.inner.1.notify_all();
    }

    pub fn is_stopped(&self) -> bool {
        self.state().stopped
    }

    pub fn is_paused(&self) -> bool {
        self.state().paused
    }

    /// Block while paused; returns whether the runner may go on
    pub(crate) fn checkpoint(&self) -> bool {
        let guard = self.state();
        let guard = self
            .inner
            .1
            .wait_while(guard, |s| s.paused && !s.stopped)
            .unwrap_or_else(PoisonError::into_inner);
        !guard.stopped
    }
}

#[cfg(test)]
mod tests {
    use std::{thread, time::Duration};

    use super::*;

    #[test]
    fn checkpoint_passes_when_running() {
        let control = RunControl::new();
        assert!(control.checkpoint());
        control.stop();
        assert!(control.is_stopped());
        assert!(!control.checkpoint());
    }

    #[test]
    fn pause_blocks_until_resume() {
        let control = RunControl::new();
        control.pause();
        assert!(control.is_paused());

        let remote = control.clone();
        let handle = thread::spawn(move || remote.checkpoint());
        thread::sleep(Duration::from_millis(50));
        assert!(!handle.is_finished(), "waiting while paused");

        control.resume();
        assert!(handle.join().unwrap());
    }

    #[test]
    fn stop_releases_pause() {
        let control = RunControl::new();
        control.pause();

        let remote = control.clone();
        let handle = thread::spawn(move || remote.checkpoint());
        thread::sleep(Duration::from_millis(20));
        control.stop();
        assert!(!handle.join().unwrap());
    }
}
