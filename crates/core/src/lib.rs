//! Domain model for the reel generation client.
//!
//! Holds the reel status model, the stage classifier, the presentation
//! mapping used by status views, request DTOs, and the [`ReelBackend`]
//! trait every remote collaborator implements.
//!
//! [`ReelBackend`]: backend::ReelBackend

pub mod backend;
pub mod error;
pub mod reel;
pub mod stage;
pub mod timeline;
pub mod timestamp;
pub mod types;
