//! Observable state of the reel currently being tracked.

use reelgen_core::reel::Reel;
use reelgen_core::stage::ReelStage;
use reelgen_core::timeline::{self, StageDisplay};
use reelgen_core::types::DbId;

/// Snapshot of a tracking session, published to subscribers on every
/// change.
///
/// The poll timer itself is not part of this value; it stays private to
/// [`ReelTracker`](crate::ReelTracker).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackingSession {
    /// Reel under observation, or `None` when nothing is tracked.
    pub target_id: Option<DbId>,
    /// Most recent snapshot from a poll or a successful action.
    pub reel: Option<Reel>,
    /// Most recent fetch failure. Distinct from the reel's own
    /// `error_text`, which describes a failed pipeline run.
    pub last_error: Option<String>,
    /// Whether a poll loop is armed.
    pub polling: bool,
    /// Bumped every time polling is armed or the session is torn down.
    /// Poll results carrying an older epoch are discarded.
    pub(crate) epoch: u64,
}

impl TrackingSession {
    pub fn stage(&self) -> Option<ReelStage> {
        self.reel.as_ref().map(|r| r.stage)
    }

    /// Display facts for the last observed stage.
    pub fn display(&self) -> Option<StageDisplay> {
        self.stage().map(timeline::present)
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// The tracked reel's snapshot, if it belongs to the current target.
    pub fn tracked_reel(&self) -> Option<&Reel> {
        self.reel
            .as_ref()
            .filter(|r| Some(r.id) == self.target_id)
    }
}
