//! Presentation mapping from a reel stage to display facts.
//!
//! Everything here is a pure function of [`ReelStage`], so a view can be
//! re-derived at any moment from the last observed reel.

use serde::Serialize;

use crate::stage::ReelStage;

/// Display facts for a single stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageDisplay {
    pub label: &'static str,
    /// Position in the forward order; `None` for `failed`.
    pub ordinal: Option<usize>,
    /// The pipeline is actively working (spinner).
    pub is_active: bool,
    pub is_complete: bool,
    pub is_failed: bool,
}

/// Rendering state of one step in the progress timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    Done,
    Current,
    Upcoming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimelineStep {
    pub stage: ReelStage,
    pub label: &'static str,
    pub state: StepState,
}

/// Stages shown as steps in the progress timeline. `pending` has no step
/// of its own; a pending reel shows every step as upcoming.
pub const TIMELINE_STEPS: [ReelStage; 6] = [
    ReelStage::GeneratingScript,
    ReelStage::ScriptReady,
    ReelStage::GeneratingAudio,
    ReelStage::GeneratingVideo,
    ReelStage::PostProcessing,
    ReelStage::Completed,
];

/// Timeline label for a stage.
pub fn label(stage: ReelStage) -> &'static str {
    match stage {
        ReelStage::Pending => "Pending",
        ReelStage::GeneratingScript => "Generating Script",
        ReelStage::ScriptReady => "Script Ready",
        ReelStage::GeneratingAudio => "Generating Audio",
        ReelStage::GeneratingVideo => "Generating Video",
        ReelStage::PostProcessing => "Post Processing",
        ReelStage::Completed => "Completed",
        ReelStage::Failed => "Failed",
    }
}

/// Short status text used on reel cards in a listing.
pub fn status_line(stage: ReelStage) -> &'static str {
    match stage {
        ReelStage::Pending => "Pending",
        ReelStage::GeneratingScript => "Writing Script...",
        ReelStage::ScriptReady => "Script Ready",
        ReelStage::GeneratingAudio => "Generating Audio...",
        ReelStage::GeneratingVideo => "Generating Video...",
        ReelStage::PostProcessing => "Processing...",
        ReelStage::Completed => "Completed",
        ReelStage::Failed => "Failed",
    }
}

/// Map a stage to its display facts.
pub fn present(stage: ReelStage) -> StageDisplay {
    StageDisplay {
        label: label(stage),
        ordinal: stage.ordinal(),
        is_active: matches!(
            stage,
            ReelStage::GeneratingScript
                | ReelStage::GeneratingAudio
                | ReelStage::GeneratingVideo
                | ReelStage::PostProcessing
        ),
        is_complete: stage == ReelStage::Completed,
        is_failed: stage == ReelStage::Failed,
    }
}

/// Build the progress timeline for the current stage.
///
/// On `failed` every step renders as upcoming; the caller shows the
/// failure separately instead of attaching it to a step.
pub fn timeline(current: ReelStage) -> Vec<TimelineStep> {
    let current_idx = current.ordinal();

    TIMELINE_STEPS
        .iter()
        .map(|&stage| {
            let state = match (current_idx, stage.ordinal()) {
                (None, _) => StepState::Upcoming,
                _ if current == ReelStage::Completed => StepState::Done,
                _ if stage == current => StepState::Current,
                (Some(cur), Some(step)) if cur > step => StepState::Done,
                _ => StepState::Upcoming,
            };
            TimelineStep {
                stage,
                label: label(stage),
                state,
            }
        })
        .collect()
}
