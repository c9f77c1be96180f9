//! Reel status model and request DTOs.
//!
//! [`Reel`] mirrors the reel resource returned by the backend. Field names
//! on the wire follow the backend (`status`, `error_message`); the Rust
//! names follow the tracking vocabulary (`stage`, `error_text`).

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::stage::ReelStage;
use crate::types::{DbId, Timestamp};

/// Default page size for reel listings.
pub const DEFAULT_PER_PAGE: u32 = 10;

/// Narration language for a reel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
}

impl Language {
    /// Human-readable name shown next to a reel's topic.
    pub fn display_name(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Hi => "Hindi",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// References to intermediate and final media artifacts.
///
/// Each path is set once by the pipeline step that produces it; later
/// stages add paths and never erase earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaRefs {
    pub audio_path: Option<String>,
    pub video_raw_path: Option<String>,
    pub video_final_path: Option<String>,
}

impl MediaRefs {
    pub fn is_empty(&self) -> bool {
        self.audio_path.is_none() && self.video_raw_path.is_none() && self.video_final_path.is_none()
    }
}

/// A reel as reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reel {
    pub id: DbId,
    pub topic: String,
    #[serde(default)]
    pub language: Language,
    #[serde(rename = "status")]
    pub stage: ReelStage,
    pub script_text: Option<String>,
    #[serde(flatten)]
    pub media: MediaRefs,
    #[serde(rename = "error_message")]
    pub error_text: Option<String>,
    pub duration_seconds: Option<f64>,
    #[serde(deserialize_with = "crate::timestamp::deserialize")]
    pub created_at: Timestamp,
    #[serde(default, deserialize_with = "crate::timestamp::deserialize_opt")]
    pub completed_at: Option<Timestamp>,
}

impl Reel {
    /// Check the cross-field rules that tie payloads to the stage.
    ///
    /// * `error_text` is only present on a failed reel.
    /// * `completed_at` is only present on a completed reel.
    pub fn check_invariants(&self) -> Result<(), CoreError> {
        if self.error_text.is_some() && self.stage != ReelStage::Failed {
            return Err(CoreError::Validation(format!(
                "reel {} carries an error message while in stage '{}'",
                self.id, self.stage,
            )));
        }
        if self.completed_at.is_some() && self.stage != ReelStage::Completed {
            return Err(CoreError::Validation(format!(
                "reel {} has a completion time while in stage '{}'",
                self.id, self.stage,
            )));
        }
        Ok(())
    }

    /// Whether the final video is available for download.
    pub fn is_downloadable(&self) -> bool {
        self.stage == ReelStage::Completed && self.media.video_final_path.is_some()
    }

    /// Number of whitespace-separated words in the script, if any.
    pub fn script_word_count(&self) -> usize {
        self.script_text
            .as_deref()
            .map(|s| s.split_whitespace().count())
            .unwrap_or(0)
    }
}

/// DTO for `POST /reels/`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReelCreate {
    #[validate(length(min = 3, max = 500, message = "topic must be 3 to 500 characters"))]
    pub topic: String,
    #[serde(default)]
    pub language: Language,
}

impl ReelCreate {
    pub fn new(topic: impl Into<String>, language: Language) -> Self {
        Self {
            topic: topic.into(),
            language,
        }
    }
}

/// DTO for `PUT /reels/{id}/script`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ScriptUpdate {
    #[validate(length(min = 10, message = "script must be at least 10 characters"))]
    pub script_text: String,
}

impl ScriptUpdate {
    pub fn new(script_text: impl Into<String>) -> Self {
        Self {
            script_text: script_text.into(),
        }
    }
}

/// One page of the caller's reels, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReelPage {
    pub reels: Vec<Reel>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

impl ReelPage {
    /// Total number of pages at the current page size.
    pub fn page_count(&self) -> u32 {
        if self.per_page == 0 {
            return 0;
        }
        let total = self.total.max(0) as u64;
        total.div_ceil(u64::from(self.per_page)) as u32
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
