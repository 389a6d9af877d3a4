//! Application state owned by the studio controller

use serde::{Deserialize, Serialize};
use shortsmith_gen::{AspectRatio, ImageCount, StyleGuide};
use std::collections::BTreeSet;
use std::fmt;

use crate::asset::AssetStore;
use crate::script::Script;

pub const STATUS_PLANNING: &str = "Planning script...";
pub const STATUS_ILLUSTRATING: &str = "Generating images...";
pub const STATUS_NARRATING: &str = "Generating narration...";
pub const STATUS_READY: &str = "Assets ready!";
pub const STATUS_COMPOSITING: &str = "Compositing final video... (this can take several minutes)";
pub const STATUS_VIDEO_READY: &str = "Final video ready!";
pub const STATUS_VIDEO_CANCELLED: &str = "Video generation cancelled.";

/// What the user asked for
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSettings {
    pub topic: String,
    pub image_count: ImageCount,
    pub aspect_ratio: AspectRatio,
    pub style: StyleGuide,
    /// Background music style description
    pub music: String,
}

/// Where the pipeline is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Idle,
    Planning,
    Illustrating,
    Narrating,
    Complete,
    Failed,
    Compositing,
    VideoReady,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Planning => "planning",
            Stage::Illustrating => "illustrating",
            Stage::Narrating => "narrating",
            Stage::Complete => "complete",
            Stage::Failed => "failed",
            Stage::Compositing => "compositing",
            Stage::VideoReady => "video ready",
        };
        write!(f, "{}", name)
    }
}

/// The rendered video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalVideo {
    /// Where the service put it
    pub uri: String,
    pub file_name: String,
    pub size_bytes: usize,
    #[serde(skip)]
    pub data: Vec<u8>,
}

/// Busy flags and status of the current run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunState {
    pub busy: bool,
    pub stage: Stage,
    /// Indices with an image request in flight
    pub images_busy: BTreeSet<usize>,
    pub audio_busy: bool,
    pub video_busy: bool,
    pub status: String,
    pub final_video: Option<FinalVideo>,
}

impl RunState {
    /// Clear everything at the start of a full run
    pub fn reset(&mut self) {
        *self = RunState::default();
    }

    pub fn is_image_busy(&self, index: usize) -> bool {
        self.images_busy.contains(&index)
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }
}

/// Everything a view needs to render the studio
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    pub settings: ProjectSettings,
    pub script: Option<Script>,
    pub assets: AssetStore,
    pub run: RunState,
}

impl AppState {
    pub fn new(settings: ProjectSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    /// Composite needs a script and at least one image
    pub fn can_composite(&self) -> bool {
        self.script.is_some() && self.assets.first_image().is_some()
    }

    pub fn can_export(&self) -> bool {
        self.script.is_some()
    }
}
