//! Background sweeper for a session store.
//!
//! The sweep runs on a dedicated OS thread so a store can be created and stopped
//! outside any async runtime. `stop()` signals the thread and joins it; it is safe
//! to call more than once and from `Drop`.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::warn;

use super::error::SessionError;

struct Running {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

pub struct Reaper {
    running: Mutex<Option<Running>>,
}

impl Reaper {
    /// Spawn the sweep loop. `sweep` returns how many records it removed.
    pub fn start<F>(interval: Duration, sweep: F) -> Self
    where
        F: Fn() -> Result<usize, SessionError> + Send + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let handle = std::thread::spawn(move || loop {
            match stop_rx.recv_timeout(interval) {
                // The sweep reports its own removals. One bad cycle must not end the loop.
                Err(RecvTimeoutError::Timeout) => {
                    if let Err(e) = sweep() {
                        warn!(error = %e, "session sweep failed");
                    }
                }
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });
        Self { running: Mutex::new(Some(Running { stop_tx, handle })) }
    }

    pub fn is_running(&self) -> bool { self.running.lock().is_some() }

    /// Signal the loop and wait for the thread to exit. Later calls are no-ops.
    pub fn stop(&self) {
        let Some(running) = self.running.lock().take() else { return; };
        let _ = running.stop_tx.send(());
        if running.handle.join().is_err() {
            warn!("session reaper thread panicked");
        }
    }
}

impl Drop for Reaper {
    fn drop(&mut self) {
        self.stop();
    }
}
