//! Polling engine for a single reel.
//!
//! [`ReelTracker`] owns at most one poll loop at a time. A loop fetches
//! the reel immediately, then again on every tick of a fixed interval,
//! until it observes a terminal stage or a fetch fails. Either condition
//! halts the loop; only an explicit [`restart`](ReelTracker::restart)
//! resumes it.
//!
//! Every time a loop is armed the session epoch is bumped. A fetch result
//! is applied only if its epoch and reel ID still match the session, so a
//! response that arrives after the tracked reel changed (or after polling
//! was re-armed) is dropped instead of overwriting newer state. Stopping a
//! loop cancels its schedule but never aborts a request already in
//! flight.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use reelgen_core::backend::ReelBackend;
use reelgen_core::error::CoreError;
use reelgen_core::reel::Reel;
use reelgen_core::types::DbId;

use crate::config::TrackerConfig;
use crate::session::TrackingSession;

/// Tracks one reel and keeps a [`TrackingSession`] in sync with the
/// backend.
///
/// Must be used from within a Tokio runtime. Dropping the tracker detaches
/// it: the poll loop is cancelled and the session cleared.
pub struct ReelTracker<B: ReelBackend> {
    pub(crate) backend: Arc<B>,
    shared: Arc<Shared>,
    interval: Duration,
}

/// State shared between the tracker and its poll task.
struct Shared {
    session: watch::Sender<TrackingSession>,
    /// The active poll loop. Only the tracker and the loop itself (when it
    /// halts) ever touch this slot.
    timer: Mutex<Option<PollTimer>>,
}

struct PollTimer {
    epoch: u64,
    cancel: CancellationToken,
    _task: JoinHandle<()>,
}

/// What the poll loop should do after a fetch resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchOutcome {
    Continue,
    Halt,
    Stale,
}

impl<B: ReelBackend> ReelTracker<B> {
    pub fn new(backend: Arc<B>, config: TrackerConfig) -> Self {
        let (session, _) = watch::channel(TrackingSession::default());
        Self {
            backend,
            shared: Arc::new(Shared {
                session,
                timer: Mutex::new(None),
            }),
            interval: config.poll_interval,
        }
    }

    /// Begin tracking `reel_id`.
    ///
    /// Any active loop is torn down first. When the ID differs from the
    /// current target, the previous snapshot is discarded. The first fetch
    /// happens immediately. `None` is a no-op.
    pub fn start(&self, reel_id: Option<DbId>) {
        let Some(reel_id) = reel_id else {
            tracing::debug!("start called without a reel ID, nothing to track");
            return;
        };
        self.arm(reel_id, None, false);
    }

    /// Cancel the poll schedule. Idempotent.
    ///
    /// The target and last snapshot are kept so that [`restart`](Self::restart)
    /// can resume on the same reel.
    pub fn stop(&self) {
        let timer = self.shared.lock_timer().take();

        self.shared.session.send_if_modified(|s| {
            let was_polling = s.polling;
            s.polling = false;
            was_polling
        });

        if let Some(timer) = timer {
            timer.cancel.cancel();
            tracing::info!(epoch = timer.epoch, "Stopped polling");
        }
    }

    /// Stop, then start again on the current target. No-op when nothing
    /// is tracked.
    pub fn restart(&self) {
        let target = self.shared.session.borrow().target_id;
        match target {
            Some(reel_id) => {
                self.stop();
                self.arm(reel_id, None, true);
            }
            None => tracing::debug!("restart called with no tracked reel"),
        }
    }

    /// Stop polling and clear the session. Called when the consumer stops
    /// observing the reel.
    pub fn detach(&self) {
        self.stop();
        self.shared.session.send_if_modified(|s| {
            if s.target_id.is_none() && s.reel.is_none() {
                return false;
            }
            s.target_id = None;
            s.reel = None;
            s.last_error = None;
            s.epoch += 1;
            true
        });
    }

    /// Current session snapshot.
    pub fn session(&self) -> TrackingSession {
        self.shared.session.borrow().clone()
    }

    /// Receive every future session change.
    pub fn subscribe(&self) -> watch::Receiver<TrackingSession> {
        self.shared.session.subscribe()
    }

    pub fn is_polling(&self) -> bool {
        self.shared.session.borrow().polling
    }

    pub fn target_id(&self) -> Option<DbId> {
        self.shared.session.borrow().target_id
    }

    pub fn poll_interval(&self) -> Duration {
        self.interval
    }

    /// Arm a fresh poll loop for `reel_id`, optionally seeding the session
    /// with a known-fresh snapshot.
    ///
    /// The snapshot write, the epoch bump, and the replacement of the old
    /// loop happen under one timer lock, so no result from the old loop
    /// can land after the seed. With `require_tracked`, nothing happens
    /// unless `reel_id` is already the session's target; returns whether a
    /// loop was armed.
    pub(crate) fn arm(&self, reel_id: DbId, snapshot: Option<Reel>, require_tracked: bool) -> bool {
        let mut slot = self.shared.lock_timer();

        let mut armed_epoch = None;
        self.shared.session.send_if_modified(|s| {
            let same_target = s.target_id == Some(reel_id);
            if require_tracked && !same_target {
                return false;
            }
            if !same_target {
                s.reel = None;
            }
            if let Some(reel) = snapshot {
                s.reel = Some(reel);
            }
            s.target_id = Some(reel_id);
            s.last_error = None;
            s.polling = true;
            s.epoch += 1;
            armed_epoch = Some(s.epoch);
            true
        });

        let Some(epoch) = armed_epoch else {
            tracing::debug!(reel_id, "Reel is no longer tracked, not re-arming");
            return false;
        };

        if let Some(old) = slot.take() {
            old.cancel.cancel();
        }

        let cancel = CancellationToken::new();
        let task = tokio::spawn(poll_loop(
            Arc::clone(&self.shared),
            Arc::clone(&self.backend),
            reel_id,
            epoch,
            self.interval,
            cancel.clone(),
        ));
        *slot = Some(PollTimer {
            epoch,
            cancel,
            _task: task,
        });

        tracing::info!(
            reel_id,
            epoch,
            interval_ms = self.interval.as_millis() as u64,
            "Polling reel",
        );
        true
    }

    /// Write a snapshot returned by a mutation, without touching the poll
    /// loop. Ignored when the session has moved to another reel.
    pub(crate) fn apply_snapshot(&self, reel: &Reel) -> bool {
        self.shared.session.send_if_modified(|s| {
            if s.target_id != Some(reel.id) {
                return false;
            }
            s.reel = Some(reel.clone());
            s.last_error = None;
            true
        })
    }
}

impl<B: ReelBackend> Drop for ReelTracker<B> {
    fn drop(&mut self) {
        self.detach();
    }
}

impl Shared {
    fn lock_timer(&self) -> MutexGuard<'_, Option<PollTimer>> {
        self.timer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply a fetch result if it still belongs to the session.
    fn apply_fetch(
        &self,
        reel_id: DbId,
        epoch: u64,
        result: Result<Reel, CoreError>,
    ) -> FetchOutcome {
        let mut outcome = FetchOutcome::Stale;

        self.session.send_if_modified(|s| {
            if s.epoch != epoch || s.target_id != Some(reel_id) {
                return false;
            }

            match result {
                Ok(reel) => {
                    if let Err(e) = reel.check_invariants() {
                        tracing::warn!(reel_id, error = %e, "Reel snapshot breaks an invariant");
                    }

                    let previous = s.reel.as_ref().map(|r| r.stage);
                    if previous != Some(reel.stage) {
                        tracing::info!(
                            reel_id,
                            from = ?previous,
                            to = %reel.stage,
                            "Reel stage changed",
                        );
                    }

                    let terminal = reel.stage.is_terminal();
                    s.reel = Some(reel);
                    s.last_error = None;

                    if terminal {
                        s.polling = false;
                        outcome = FetchOutcome::Halt;
                        tracing::info!(reel_id, epoch, "Reel reached a terminal stage, polling stopped");
                    } else {
                        outcome = FetchOutcome::Continue;
                    }
                }
                Err(e) => {
                    tracing::warn!(reel_id, epoch, error = %e, "Reel fetch failed, polling stopped");
                    s.last_error = Some(e.to_string());
                    s.polling = false;
                    outcome = FetchOutcome::Halt;
                }
            }
            true
        });

        outcome
    }

    /// Drop the timer slot if it still belongs to the loop at `epoch`.
    fn release_timer(&self, epoch: u64) {
        let mut slot = self.lock_timer();
        if slot.as_ref().is_some_and(|t| t.epoch == epoch) {
            slot.take();
        }
    }
}

/// Fetch on every tick until halted, cancelled, or superseded.
///
/// The first tick of a Tokio interval completes immediately, which gives
/// the initial fetch. Fetches never overlap: the next tick is awaited only
/// after the previous fetch resolved.
async fn poll_loop<B: ReelBackend>(
    shared: Arc<Shared>,
    backend: Arc<B>,
    reel_id: DbId,
    epoch: u64,
    interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(reel_id, epoch, "Poll schedule cancelled");
                return;
            }
            _ = ticker.tick() => {}
        }

        tracing::debug!(reel_id, epoch, "Fetching reel status");
        let result = backend.fetch_reel(reel_id).await;

        match shared.apply_fetch(reel_id, epoch, result) {
            FetchOutcome::Continue => {}
            FetchOutcome::Halt => {
                shared.release_timer(epoch);
                return;
            }
            FetchOutcome::Stale => {
                tracing::debug!(reel_id, epoch, "Discarded stale poll result");
                return;
            }
        }
    }
}
