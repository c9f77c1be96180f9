//! `reelgen-watch` -- follow a reel through the generation pipeline.
//!
//! Polls the backend for one reel and logs every stage change until the
//! reel completes or fails. Without a `REEL_ID` it prints the first page
//! of the caller's reels instead.
//!
//! # Environment variables
//!
//! | Variable                       | Required | Default                     | Description                              |
//! |--------------------------------|----------|-----------------------------|------------------------------------------|
//! | `REELGEN_API_URL`              | no       | `http://localhost:8000/api` | Backend base URL                         |
//! | `REELGEN_ACCESS_TOKEN`         | no       | --                          | Bearer token for the backend             |
//! | `REELGEN_REQUEST_TIMEOUT_SECS` | no       | `30`                        | Per-request HTTP timeout                 |
//! | `REELGEN_POLL_INTERVAL_MS`     | no       | `3000`                      | Milliseconds between status polls        |
//! | `REEL_ID`                      | no       | --                          | Reel to follow; lists reels when unset   |
//! | `REEL_DOWNLOAD_DIR`            | no       | --                          | Save the final video here on completion  |

use std::path::{Path, PathBuf};
use std::sync::Arc;

use reelgen_client::api::ReelApi;
use reelgen_client::config::{env_opt, ClientConfig};
use reelgen_core::backend::ReelBackend;
use reelgen_core::reel::DEFAULT_PER_PAGE;
use reelgen_core::timeline;
use reelgen_core::types::DbId;
use reelgen_tracker::config::TrackerConfig;
use reelgen_tracker::{report, ReelTracker};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reelgen_tracker=info,reelgen_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let client_config = ClientConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid client configuration");
        std::process::exit(1);
    });
    let tracker_config = TrackerConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid tracker configuration");
        std::process::exit(1);
    });
    let reel_id: Option<DbId> = env_opt("REEL_ID").unwrap_or_else(|e| {
        tracing::error!(error = %e, "REEL_ID must be a valid integer");
        std::process::exit(1);
    });
    let download_dir: Option<PathBuf> = env_opt("REEL_DOWNLOAD_DIR").unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid REEL_DOWNLOAD_DIR");
        std::process::exit(1);
    });

    let api = match ReelApi::new(&client_config) {
        Ok(api) => Arc::new(api),
        Err(e) => {
            tracing::error!(error = %e, "Failed to build HTTP client");
            std::process::exit(1);
        }
    };

    let Some(reel_id) = reel_id else {
        list_reels(&api).await;
        return;
    };

    tracing::info!(
        reel_id,
        api_url = %api.api_url(),
        interval_ms = tracker_config.poll_interval.as_millis() as u64,
        "Starting reelgen-watch",
    );

    let tracker = ReelTracker::new(Arc::clone(&api), tracker_config);
    tracker.start(Some(reel_id));
    let mut updates = tracker.subscribe();

    let session = tokio::select! {
        session = report::follow(&mut updates) => session,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, detaching");
            tracker.detach();
            return;
        }
    };

    if session.last_error.is_some() {
        std::process::exit(1);
    }

    if let (Some(reel), Some(dir)) = (session.tracked_reel(), download_dir.as_deref()) {
        if reel.is_downloadable() {
            save_video(&api, reel.id, dir).await;
        }
    }
}

/// Print the first page of reels with their card status.
async fn list_reels(api: &ReelApi) {
    match api.list_reels(1, DEFAULT_PER_PAGE).await {
        Ok(page) => {
            println!(
                "{} reel(s), page {} of {}",
                page.total,
                page.page,
                page.page_count().max(1)
            );
            for reel in &page.reels {
                println!(
                    "#{:<6} {:<20} {:<8} {}",
                    reel.id,
                    timeline::status_line(reel.stage),
                    reel.language.display_name(),
                    reel.topic,
                );
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to list reels");
            std::process::exit(1);
        }
    }
}

async fn save_video(api: &ReelApi, reel_id: DbId, dir: &Path) {
    let target = dir.join(format!("reel_{reel_id}.mp4"));
    match api.download_reel(reel_id).await {
        Ok(bytes) => match tokio::fs::write(&target, &bytes).await {
            Ok(()) => tracing::info!(path = %target.display(), bytes = bytes.len(), "Saved reel video"),
            Err(e) => tracing::error!(path = %target.display(), error = %e, "Failed to write reel video"),
        },
        Err(e) => tracing::error!(reel_id, error = %e, "Failed to download reel video"),
    }
}
