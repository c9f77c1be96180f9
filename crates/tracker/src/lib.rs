//! `reelgen-tracker` library crate.
//!
//! Status synchronization for a single reel: the polling engine
//! ([`ReelTracker`]), the user actions that mutate the reel and re-arm
//! polling, and the progress reporter used by the `reelgen-watch` binary.

pub mod actions;
pub mod config;
pub mod error;
pub mod poller;
pub mod report;
pub mod session;

pub use error::TrackerError;
pub use poller::ReelTracker;
pub use session::TrackingSession;
