//! HTTP client for the reel generation backend.
//!
//! [`ReelApi`](api::ReelApi) implements
//! [`ReelBackend`](reelgen_core::backend::ReelBackend) over the backend's
//! REST endpoints using [`reqwest`].

pub mod api;
pub mod config;
