use reelgen_core::error::CoreError;
use reelgen_core::types::DbId;

/// Failure of a user-triggered action.
///
/// Action errors never touch the tracking session; they are returned to
/// the caller that invoked the action.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("No reel is being tracked")]
    NotTracking,

    /// A reel is tracked but its first snapshot has not arrived yet.
    #[error("Reel {0} has not been loaded yet")]
    NotLoaded(DbId),

    /// The tracked reel is not in a state that allows the action.
    #[error("Action not allowed: {0}")]
    Precondition(String),

    #[error(transparent)]
    Backend(#[from] CoreError),
}
