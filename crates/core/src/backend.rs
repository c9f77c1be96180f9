//! Remote collaborator contract for reel operations.
//!
//! The tracker only talks to the backend through [`ReelBackend`], so the
//! HTTP client and in-memory test doubles are interchangeable. Every
//! operation resolves to a value or a classified [`CoreError`]; nothing
//! panics across this boundary.

use async_trait::async_trait;

use crate::error::CoreError;
use crate::reel::{Reel, ReelCreate, ReelPage, ScriptUpdate};
use crate::types::DbId;

#[async_trait]
pub trait ReelBackend: Send + Sync + 'static {
    /// Fetch the current snapshot of a reel.
    ///
    /// Expected errors: `NotFound`, `Unreachable`.
    async fn fetch_reel(&self, id: DbId) -> Result<Reel, CoreError>;

    /// Replace the draft script. The stage is left unchanged.
    ///
    /// Expected errors: `Validation`, `InvalidState`, `NotFound`.
    async fn update_script(&self, id: DbId, update: &ScriptUpdate) -> Result<Reel, CoreError>;

    /// Ask the pipeline to run from the approved script.
    ///
    /// Legal only while the reel is at `script_ready` or `failed`.
    /// Expected errors: `InvalidState`, `Unreachable`.
    async fn request_generation(&self, id: DbId) -> Result<Reel, CoreError>;

    /// Expected errors: `NotFound`.
    async fn delete_reel(&self, id: DbId) -> Result<(), CoreError>;

    /// Expected errors: `Validation`.
    async fn create_reel(&self, request: &ReelCreate) -> Result<Reel, CoreError>;

    async fn list_reels(&self, page: u32, per_page: u32) -> Result<ReelPage, CoreError>;
}
