//! Progress reporting for a tracked reel.
//!
//! Turns session updates into log lines using the presentation mapping, so
//! the `reelgen-watch` binary shows the same progress a status view would.

use tokio::sync::watch;

use reelgen_core::reel::Reel;
use reelgen_core::stage::ReelStage;
use reelgen_core::timeline::{self, StepState};

use crate::session::TrackingSession;

/// Render the progress timeline as a single line, e.g.
/// `[x] Generating Script > [x] Script Ready > [~] Generating Audio > ...`.
pub fn render_timeline(stage: ReelStage) -> String {
    let mut line = timeline::timeline(stage)
        .iter()
        .map(|step| {
            let marker = match step.state {
                StepState::Done => "[x]",
                StepState::Current => "[~]",
                StepState::Upcoming => "[ ]",
            };
            format!("{marker} {}", step.label)
        })
        .collect::<Vec<_>>()
        .join(" > ");

    if stage == ReelStage::Failed {
        line.push_str(" | [!] Failed");
    }
    line
}

fn log_stage(reel: &Reel) {
    let facts = timeline::present(reel.stage);

    tracing::info!(
        reel_id = reel.id,
        stage = %reel.stage,
        label = facts.label,
        active = facts.is_active,
        "{}",
        render_timeline(reel.stage),
    );

    match reel.stage {
        ReelStage::ScriptReady => tracing::info!(
            reel_id = reel.id,
            words = reel.script_word_count(),
            "Script is ready for review; approve it to continue",
        ),
        ReelStage::Failed => tracing::warn!(
            reel_id = reel.id,
            error = reel.error_text.as_deref().unwrap_or("unknown error"),
            retryable = reel.script_text.is_some(),
            "Reel generation failed",
        ),
        ReelStage::Completed => tracing::info!(
            reel_id = reel.id,
            duration_seconds = reel.duration_seconds,
            video = reel.media.video_final_path.as_deref(),
            "Reel completed",
        ),
        _ => {}
    }
}

/// Log every stage change until polling stops, then return the final
/// session.
///
/// Returns early if the tracker is dropped.
pub async fn follow(updates: &mut watch::Receiver<TrackingSession>) -> TrackingSession {
    let mut last_stage = None;

    loop {
        let session = updates.borrow_and_update().clone();

        if let Some(reel) = session.tracked_reel() {
            if last_stage != Some(reel.stage) {
                log_stage(reel);
                last_stage = Some(reel.stage);
            }
        }

        if !session.polling {
            if let Some(error) = &session.last_error {
                tracing::error!(error = %error, "Stopped following reel after a fetch error");
            }
            return session;
        }

        if updates.changed().await.is_err() {
            return session;
        }
    }
}
