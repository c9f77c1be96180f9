//! Reel pipeline stages and the terminal-state classifier.
//!
//! Each variant's wire name matches the `status` string the backend stores
//! on the reel row. Declaration order is the forward order of the pipeline;
//! `Failed` is declared last and sits outside that order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

macro_rules! define_stage_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $wire)] $variant ),+
        }

        impl $name {
            /// Every stage in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Wire name as stored by the backend.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    other => Err(CoreError::Validation(format!(
                        "unknown {} '{other}'",
                        stringify!($name),
                    ))),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

define_stage_enum! {
    /// Pipeline stage of a reel.
    ReelStage {
        Pending => "pending",
        GeneratingScript => "generating_script",
        /// Checkpoint: the pipeline waits for the user to approve the script.
        ScriptReady => "script_ready",
        GeneratingAudio => "generating_audio",
        GeneratingVideo => "generating_video",
        PostProcessing => "post_processing",
        Completed => "completed",
        /// Reachable from any non-terminal stage.
        Failed => "failed",
    }
}

/// Stages in forward pipeline order. `Failed` has no position here.
pub const FORWARD_ORDER: [ReelStage; 7] = [
    ReelStage::Pending,
    ReelStage::GeneratingScript,
    ReelStage::ScriptReady,
    ReelStage::GeneratingAudio,
    ReelStage::GeneratingVideo,
    ReelStage::PostProcessing,
    ReelStage::Completed,
];

impl ReelStage {
    /// `true` when the pipeline will make no further progress on its own.
    ///
    /// This is the only check the poller consults when deciding whether to
    /// keep polling. `ScriptReady` is a checkpoint, not a terminal stage.
    pub fn is_terminal(self) -> bool {
        matches!(self, ReelStage::Completed | ReelStage::Failed)
    }

    /// `true` for stages that wait on an explicit user action.
    pub fn is_checkpoint(self) -> bool {
        self == ReelStage::ScriptReady
    }

    /// Stages in which the backend accepts script edits and generate
    /// requests.
    pub fn accepts_script_edits(self) -> bool {
        matches!(self, ReelStage::ScriptReady | ReelStage::Failed)
    }

    /// Position in [`FORWARD_ORDER`], or `None` for `Failed`.
    pub fn ordinal(self) -> Option<usize> {
        FORWARD_ORDER.iter().position(|s| *s == self)
    }
}

/// Free-function form of [`ReelStage::is_terminal`].
pub fn is_terminal(stage: ReelStage) -> bool {
    stage.is_terminal()
}
