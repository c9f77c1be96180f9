//! User-triggered transitions on the tracked reel.
//!
//! Each action performs its mutating request, writes the returned snapshot
//! into the session, and then decides whether the poll loop must be
//! re-armed because the reel left a terminal or checkpoint stage. Failed
//! actions return their error and leave the session untouched.

use validator::Validate;

use reelgen_core::backend::ReelBackend;
use reelgen_core::error::CoreError;
use reelgen_core::reel::{Reel, ReelCreate, ScriptUpdate};
use reelgen_core::stage::ReelStage;

use crate::error::TrackerError;
use crate::poller::ReelTracker;

impl<B: ReelBackend> ReelTracker<B> {
    /// Save an edited script without starting generation.
    ///
    /// Requires the tracked reel to already have a script. The stage does
    /// not change and polling is not re-armed.
    pub async fn save_draft_script(
        &self,
        script_text: impl Into<String>,
    ) -> Result<Reel, TrackerError> {
        let reel = self.loaded_reel()?;
        if reel.script_text.is_none() {
            return Err(TrackerError::Precondition(format!(
                "reel {} has no script to edit yet",
                reel.id
            )));
        }

        let update = validated_script(script_text)?;
        let updated = self.backend.update_script(reel.id, &update).await?;

        self.apply_snapshot(&updated);
        tracing::info!(reel_id = reel.id, "Draft script saved");
        Ok(updated)
    }

    /// Save the script, then ask the pipeline to generate the reel.
    ///
    /// The generate request is only sent once the save has succeeded. On
    /// success the returned snapshot is written and polling re-armed.
    pub async fn approve_and_generate(
        &self,
        script_text: impl Into<String>,
    ) -> Result<Reel, TrackerError> {
        let reel = self.loaded_reel()?;
        if !reel.stage.accepts_script_edits() {
            return Err(TrackerError::Precondition(format!(
                "reel {} cannot be approved while in stage '{}'",
                reel.id, reel.stage
            )));
        }

        let update = validated_script(script_text)?;

        let saved = match self.backend.update_script(reel.id, &update).await {
            Ok(saved) => saved,
            Err(e) => {
                tracing::warn!(reel_id = reel.id, error = %e, "Script save failed, generation not requested");
                return Err(e.into());
            }
        };

        let generated = match self.backend.request_generation(reel.id).await {
            Ok(generated) => generated,
            Err(e) => {
                // The save went through; reflect it even though generation did not.
                self.apply_snapshot(&saved);
                return Err(e.into());
            }
        };

        self.rearm_with(generated.clone());
        tracing::info!(reel_id = reel.id, stage = %generated.stage, "Reel approved, generation started");
        Ok(generated)
    }

    /// Re-run the pipeline on a failed reel from its last good script.
    pub async fn retry(&self) -> Result<Reel, TrackerError> {
        let reel = self.loaded_reel()?;
        if reel.stage != ReelStage::Failed {
            return Err(TrackerError::Precondition(format!(
                "only failed reels can be retried (reel {} is '{}')",
                reel.id, reel.stage
            )));
        }
        if reel.script_text.is_none() {
            return Err(TrackerError::Precondition(format!(
                "reel {} failed before a script was written",
                reel.id
            )));
        }

        let generated = self.backend.request_generation(reel.id).await?;

        self.rearm_with(generated.clone());
        tracing::info!(reel_id = reel.id, stage = %generated.stage, "Retrying reel generation");
        Ok(generated)
    }

    /// Delete the tracked reel and tear the session down.
    pub async fn delete(&self) -> Result<(), TrackerError> {
        let reel_id = self.target_id().ok_or(TrackerError::NotTracking)?;

        self.backend.delete_reel(reel_id).await?;

        if self.target_id() == Some(reel_id) {
            self.detach();
        }
        tracing::info!(reel_id, "Reel deleted");
        Ok(())
    }

    /// Create a reel and immediately start tracking it.
    pub async fn create_and_track(&self, request: ReelCreate) -> Result<Reel, TrackerError> {
        request.validate().map_err(CoreError::from)?;

        let created = self.backend.create_reel(&request).await?;

        self.arm(created.id, Some(created.clone()), false);
        tracing::info!(reel_id = created.id, topic = %created.topic, "Reel created");
        Ok(created)
    }

    /// The snapshot of the currently tracked reel.
    fn loaded_reel(&self) -> Result<Reel, TrackerError> {
        let session = self.session();
        let target = session.target_id.ok_or(TrackerError::NotTracking)?;
        session
            .tracked_reel()
            .cloned()
            .ok_or(TrackerError::NotLoaded(target))
    }

    /// Write a post-mutation snapshot and re-arm polling in one step.
    fn rearm_with(&self, reel: Reel) {
        let reel_id = reel.id;
        if !self.arm(reel_id, Some(reel), true) {
            tracing::debug!(reel_id, "Session moved on during the action, snapshot dropped");
        }
    }
}

fn validated_script(script_text: impl Into<String>) -> Result<ScriptUpdate, TrackerError> {
    let update = ScriptUpdate::new(script_text);
    update.validate().map_err(CoreError::from)?;
    Ok(update)
}
