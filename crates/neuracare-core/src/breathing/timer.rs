//! Runtime phase timer for one breathing widget.
//!
//! Each timer owns at most one background task. The task sleeps until the
//! current phase's deadline, then advances. Stopping, restarting, and
//! dropping the timer all cancel the task, and the phase write itself checks
//! the cancellation token under the channel lock, so a cancelled task can
//! never publish a phase after `Idle`.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{BreathingPhase, PhaseEvent, transition};

/// The running half: cancellation handle plus the task itself.
struct Run {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl Run {
    fn cancel(self) {
        self.token.cancel();
        self.handle.abort();
    }
}

/// A start/stop breathing timer publishing its phase on a watch channel.
///
/// [`start`](Self::start) and [`toggle`](Self::toggle) spawn onto the
/// current tokio runtime and must be called from within one.
pub struct PhaseTimer {
    tx: Arc<watch::Sender<BreathingPhase>>,
    run: Option<Run>,
}

impl std::fmt::Debug for PhaseTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhaseTimer")
            .field("phase", &self.phase())
            .field("active", &self.is_active())
            .finish()
    }
}

impl Default for PhaseTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseTimer {
    /// A new, idle timer.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(BreathingPhase::Idle);
        Self {
            tx: Arc::new(tx),
            run: None,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> BreathingPhase {
        *self.tx.borrow()
    }

    /// Whether the user has started the exercise.
    pub fn is_active(&self) -> bool {
        self.run.is_some()
    }

    /// Caption for the start/stop button.
    pub fn button_label(&self) -> &'static str {
        if self.is_active() { "Stop" } else { "Start" }
    }

    /// Receive every phase change.
    pub fn subscribe(&self) -> watch::Receiver<BreathingPhase> {
        self.tx.subscribe()
    }

    /// Start the cycle at `Inhale`. Restarts from `Inhale` if already
    /// running.
    pub fn start(&mut self) {
        if let Some(run) = self.run.take() {
            run.cancel();
        }

        let started = Instant::now();
        let phase = transition(self.phase(), PhaseEvent::Start);
        self.tx.send_replace(phase);

        let token = CancellationToken::new();
        let handle = tokio::spawn(drive(
            Arc::clone(&self.tx),
            token.clone(),
            phase,
            started,
        ));
        self.run = Some(Run { token, handle });
        debug!(phase = %phase, "breathing exercise started");
    }

    /// Stop the cycle and return to `Idle`. No transition fires afterwards.
    pub fn stop(&mut self) {
        if let Some(run) = self.run.take() {
            run.cancel();
            debug!("breathing exercise stopped");
        }
        let idle = transition(self.phase(), PhaseEvent::Stop);
        self.tx.send_if_modified(|current| {
            let changed = *current != idle;
            *current = idle;
            changed
        });
    }

    /// Start if idle, stop if running.
    pub fn toggle(&mut self) {
        if self.is_active() {
            self.stop();
        } else {
            self.start();
        }
    }
}

impl Drop for PhaseTimer {
    fn drop(&mut self) {
        if let Some(run) = self.run.take() {
            run.cancel();
        }
    }
}

/// Advance through the cycle until cancelled.
///
/// Deadlines accumulate from `started` so a long session does not drift.
async fn drive(
    tx: Arc<watch::Sender<BreathingPhase>>,
    token: CancellationToken,
    mut phase: BreathingPhase,
    started: Instant,
) {
    let mut deadline = started;
    while let Some(dwell) = phase.dwell() {
        deadline += dwell;
        tokio::select! {
            biased;
            _ = token.cancelled() => return,
            _ = tokio::time::sleep_until(deadline) => {}
        }

        let next = transition(phase, PhaseEvent::Elapsed);
        let applied = tx.send_if_modified(|current| {
            if token.is_cancelled() {
                return false;
            }
            *current = next;
            true
        });
        if !applied {
            return;
        }
        debug!(phase = %next, "breathing phase advanced");
        phase = next;
    }
}
