//! The studio controller
//!
//! `Studio` owns the application state and drives the generation pipeline:
//! plan a script, illustrate each prompt in order, narrate, and optionally
//! composite a final video. Every operation takes `&mut self`, so a
//! regenerate can never interleave with a running pipeline on the same
//! studio. Subscribers are called with the new state after each change.

use shortsmith_core::{Result, ShortsError};
use shortsmith_gen::audio;
use shortsmith_gen::job::wait_for_video;
use shortsmith_gen::prompt::{self, VIDEO_RESOLUTION};
use shortsmith_gen::{
    CancelToken, CredentialProvider, GenerativeService, ImageRequest, PollPolicy, ScriptRequest,
    ShortsConfig, SpeechRequest, VideoRequest,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::asset::Asset;
use crate::export;
use crate::runner::{self, run_ordered};
use crate::script::{Script, ScriptField};
use crate::state::*;

/// Result of a controller operation.
///
/// `Rejected` means a precondition failed and nothing changed. `Failed`
/// means the operation ran and the status line now carries the error.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Outcome<T> {
    Done(T),
    Rejected(String),
    Failed(String),
}

impl<T> Outcome<T> {
    pub fn is_done(&self) -> bool {
        matches!(self, Outcome::Done(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected(_))
    }

    /// The message of a rejected or failed outcome
    pub fn message(&self) -> Option<&str> {
        match self {
            Outcome::Done(_) => None,
            Outcome::Rejected(msg) | Outcome::Failed(msg) => Some(msg),
        }
    }

    pub fn ok(self) -> Option<T> {
        match self {
            Outcome::Done(value) => Some(value),
            _ => None,
        }
    }
}

/// Summary of a full run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub title: String,
    pub prompts: usize,
    pub images_stored: usize,
    /// Indices whose image failed, with the reason
    pub images_skipped: Vec<(usize, String)>,
    pub narration: bool,
}

/// Settings that are not part of a project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudioOptions {
    pub voice: String,
    pub language: String,
    pub poll_policy: PollPolicy,
}

impl Default for StudioOptions {
    fn default() -> Self {
        Self::from_config(&ShortsConfig::default())
    }
}

impl StudioOptions {
    pub fn from_config(config: &ShortsConfig) -> Self {
        Self {
            voice: config.generation.voice.clone(),
            language: config.generation.language.clone(),
            poll_policy: config.poll_policy(),
        }
    }
}

type Subscriber = Box<dyn FnMut(&AppState)>;

/// Drives generation and owns all studio state
pub struct Studio {
    service: Box<dyn GenerativeService>,
    credentials: Arc<dyn CredentialProvider>,
    options: StudioOptions,
    state: AppState,
    subscribers: Vec<Subscriber>,
}

impl Studio {
    pub fn new(
        service: Box<dyn GenerativeService>,
        credentials: Arc<dyn CredentialProvider>,
        options: StudioOptions,
        settings: ProjectSettings,
    ) -> Self {
        Self {
            service,
            credentials,
            options,
            state: AppState::new(settings),
            subscribers: Vec::new(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn options(&self) -> &StudioOptions {
        &self.options
    }

    pub fn service_name(&self) -> &str {
        self.service.name()
    }

    /// Call `render` with the state after every change
    pub fn subscribe(&mut self, render: impl FnMut(&AppState) + 'static) {
        self.subscribers.push(Box::new(render));
    }

    fn notify(&mut self) {
        for render in self.subscribers.iter_mut() {
            render(&self.state);
        }
    }

    fn set_status(&mut self, status: impl Into<String>) {
        self.state.run.set_status(status);
        self.notify();
    }

    /// Change project settings between runs
    pub fn update_settings(&mut self, update: impl FnOnce(&mut ProjectSettings)) {
        update(&mut self.state.settings);
        self.notify();
    }

    /// Plan, illustrate and narrate using the current settings
    pub fn run(&mut self) -> Outcome<RunSummary> {
        self.run_full(self.state.settings.clone())
    }

    /// Start a full run with `settings`.
    ///
    /// An empty topic is rejected before anything changes. Otherwise the
    /// previous script, assets and video are discarded. Only a planning
    /// failure fails the run; image and narration failures are skipped.
    pub fn run_full(&mut self, settings: ProjectSettings) -> Outcome<RunSummary> {
        if settings.topic.trim().is_empty() {
            return Outcome::Rejected("Please enter a topic.".to_string());
        }

        self.state.settings = settings;
        self.state.script = None;
        self.state.assets.clear();
        self.state.run.reset();
        self.state.run.busy = true;
        self.state.run.stage = Stage::Planning;
        log::info!("Planning script for '{}'", self.state.settings.topic.trim());
        self.set_status(STATUS_PLANNING);

        let script = match self.plan() {
            Ok(script) => script,
            Err(e) => {
                log::warn!("Planning failed: {}", e);
                self.state.run.busy = false;
                self.state.run.stage = Stage::Failed;
                let message = e.to_string();
                self.set_status(format!("Error: {}", message));
                return Outcome::Failed(message);
            }
        };

        let prompts = script.image_prompts.clone();
        let title = script.title.clone();
        self.state.script = Some(script);
        self.state.run.stage = Stage::Illustrating;
        log::info!("Generating {} images", prompts.len());
        self.set_status(STATUS_ILLUSTRATING);

        let outcomes = run_ordered(prompts, |index, base| self.illustrate(index, &base));
        let images_skipped = runner::skipped(&outcomes);
        let images_stored = outcomes.len() - images_skipped.len();

        self.state.run.stage = Stage::Narrating;
        self.set_status(STATUS_NARRATING);
        let narration = match self.narrate() {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Narration failed, continuing without audio: {}", e);
                false
            }
        };

        self.state.run.busy = false;
        self.state.run.stage = Stage::Complete;
        log::info!(
            "Run complete: {}/{} images, narration {}",
            images_stored,
            outcomes.len(),
            if narration { "stored" } else { "missing" }
        );
        self.set_status(STATUS_READY);

        Outcome::Done(RunSummary {
            title,
            prompts: outcomes.len(),
            images_stored,
            images_skipped,
            narration,
        })
    }

    fn plan(&self) -> Result<Script> {
        let settings = &self.state.settings;
        let request = ScriptRequest {
            prompt: prompt::script_prompt(
                settings.topic.trim(),
                settings.image_count,
                &settings.style,
                &self.options.language,
            ),
            image_count: settings.image_count,
        };

        let text = self.service.generate_structured_text(&request)?;
        let mut script = Script::from_json(&text)?;
        script.normalize_prompts(settings.image_count)?;
        Ok(script)
    }

    /// Generate image `index` from `base` and store it, replacing any prior one
    fn illustrate(&mut self, index: usize, base: &str) -> Result<()> {
        self.state.run.images_busy.insert(index);
        self.notify();

        let request = ImageRequest {
            prompt: prompt::image_prompt(base, &self.state.settings.style),
            aspect_ratio: self.state.settings.aspect_ratio,
        };
        let result = self
            .service
            .generate_image(&request)
            .and_then(|payload| Asset::image(index, &payload));

        self.state.run.images_busy.remove(&index);
        let stored = result.map(|asset| {
            self.state.assets.replace(asset);
        });
        self.notify();
        stored
    }

    /// Synthesize the narration and store it as the single audio asset
    fn narrate(&mut self) -> Result<()> {
        let passage = self
            .state
            .script
            .as_ref()
            .map(|s| s.narration_passage())
            .ok_or_else(|| ShortsError::Precondition("No script to narrate".to_string()))?;

        self.state.run.audio_busy = true;
        self.notify();

        let request = SpeechRequest {
            text: prompt::speech_text(&passage),
            voice: self.options.voice.clone(),
        };
        let result = self
            .service
            .synthesize_speech(&request)
            .and_then(|payload| audio::ensure_wav(&payload))
            .and_then(|wav| Asset::narration(&wav));

        self.state.run.audio_busy = false;
        let stored = result.map(|asset| {
            self.state.assets.replace(asset);
        });
        self.notify();
        stored
    }

    /// Regenerate one image from its current (possibly edited) prompt.
    ///
    /// On failure the previous image at `index` is kept.
    pub fn regenerate_image(&mut self, index: usize) -> Outcome<()> {
        let base = match self.state.script.as_ref() {
            None => return Outcome::Rejected("Generate a script first.".to_string()),
            Some(script) => match script.image_prompts.get(index) {
                Some(base) => base.clone(),
                None => {
                    return Outcome::Rejected(format!(
                        "Image {} does not exist (script has {} prompts)",
                        index + 1,
                        script.image_prompts.len()
                    ))
                }
            },
        };

        log::info!("Regenerating image {}", index + 1);
        match self.illustrate(index, &base) {
            Ok(()) => Outcome::Done(()),
            Err(e) => {
                log::warn!("Image {} regeneration failed: {}", index + 1, e);
                let message = e.to_string();
                self.set_status(format!("Error: {}", message));
                Outcome::Failed(message)
            }
        }
    }

    /// Re-synthesize the narration from the current script text
    pub fn regenerate_audio(&mut self) -> Outcome<()> {
        if self.state.script.is_none() {
            return Outcome::Rejected("Generate a script first.".to_string());
        }

        log::info!("Regenerating narration");
        match self.narrate() {
            Ok(()) => Outcome::Done(()),
            Err(e) => {
                log::warn!("Narration failed: {}", e);
                let message = e.to_string();
                self.set_status(format!("Error: {}", message));
                Outcome::Failed(message)
            }
        }
    }

    /// Edit the title, hook, body or conclusion
    pub fn edit_field(&mut self, field: ScriptField, text: &str) -> Outcome<()> {
        match self.state.script.as_mut() {
            None => Outcome::Rejected("Generate a script first.".to_string()),
            Some(script) => {
                script.set_field(field, text);
                self.notify();
                Outcome::Done(())
            }
        }
    }

    /// Replace the text of prompt `index`
    pub fn edit_prompt(&mut self, index: usize, text: &str) -> Outcome<()> {
        let Some(script) = self.state.script.as_mut() else {
            return Outcome::Rejected("Generate a script first.".to_string());
        };
        if let Err(e) = script.set_prompt(index, text) {
            return Outcome::Rejected(e.to_string());
        }
        self.notify();
        Outcome::Done(())
    }

    /// Render the final video from the script and the first image.
    ///
    /// Polling follows the configured `PollPolicy` and stops early when
    /// `cancel` is triggered. A credential failure asks the credential
    /// provider to reselect once before the failure is reported.
    pub fn composite(&mut self, cancel: &CancelToken) -> Outcome<()> {
        let Some(script) = self.state.script.clone() else {
            return Outcome::Rejected("Generate a script first.".to_string());
        };
        let Some(seed) = self.state.assets.first_image().map(|a| a.payload()) else {
            return Outcome::Rejected("Generate at least one image first.".to_string());
        };

        let key_check = if self.service.requires_credentials() {
            self.credentials.ensure_selected()
        } else {
            Ok(())
        };
        if let Err(e) = key_check {
            let message = e.to_string();
            self.state.run.stage = Stage::Failed;
            self.set_status(format!("Video generation failed: {}", message));
            return Outcome::Failed(message);
        }

        self.state.run.video_busy = true;
        self.state.run.final_video = None;
        self.state.run.stage = Stage::Compositing;
        log::info!("Compositing final video");
        self.set_status(STATUS_COMPOSITING);

        let result = self.synthesize_video(&script, seed, cancel);
        self.state.run.video_busy = false;

        match result {
            Ok(video) => {
                log::info!("Final video ready ({} bytes)", video.size_bytes);
                self.state.run.final_video = Some(video);
                self.state.run.stage = Stage::VideoReady;
                self.set_status(STATUS_VIDEO_READY);
                Outcome::Done(())
            }
            Err(ShortsError::Cancelled) => {
                log::info!("Video generation cancelled");
                self.state.run.stage = Stage::Complete;
                self.set_status(STATUS_VIDEO_CANCELLED);
                Outcome::Failed(ShortsError::Cancelled.to_string())
            }
            Err(e) => {
                if e.is_credential_error() {
                    log::warn!("Video request was refused, asking for a new key: {}", e);
                    if let Err(re) = self.credentials.reselect() {
                        log::warn!("Key reselection failed: {}", re);
                    }
                }
                let message = e.to_string();
                self.state.run.stage = Stage::Failed;
                self.set_status(format!("Video generation failed: {}", message));
                Outcome::Failed(message)
            }
        }
    }

    fn synthesize_video(
        &self,
        script: &Script,
        seed: shortsmith_gen::InlineData,
        cancel: &CancelToken,
    ) -> Result<FinalVideo> {
        let settings = &self.state.settings;
        let request = VideoRequest {
            prompt: prompt::video_prompt(
                settings.topic.trim(),
                &settings.style,
                &settings.music,
                &script.narration_passage(),
            ),
            seed_image: Some(seed),
            aspect_ratio: settings.aspect_ratio.for_video(),
            resolution: VIDEO_RESOLUTION.to_string(),
        };

        let mut job = self.service.submit_video(&request)?;
        let uri = wait_for_video(
            self.service.as_ref(),
            &mut job,
            &self.options.poll_policy,
            cancel,
        )?;
        let data = self.service.download_video(&job)?;

        Ok(FinalVideo {
            uri,
            file_name: export::video_file_name(&script.title),
            size_bytes: data.len(),
            data,
        })
    }

    /// Write the zip archive into `dir`
    pub fn export_archive(&self, dir: &Path) -> Outcome<PathBuf> {
        if !self.state.can_export() {
            return Outcome::Rejected("Nothing to export yet.".to_string());
        }
        match export::export_archive(&self.state, dir) {
            Ok(path) => Outcome::Done(path),
            Err(e) => Outcome::Failed(e.to_string()),
        }
    }

    /// Write the final video into `dir`
    pub fn save_final_video(&self, dir: &Path) -> Outcome<PathBuf> {
        let Some(video) = self.state.run.final_video.as_ref() else {
            return Outcome::Rejected("No final video yet.".to_string());
        };
        let path = dir.join(&video.file_name);
        let written = std::fs::create_dir_all(dir).and_then(|_| std::fs::write(&path, &video.data));
        match written {
            Ok(()) => Outcome::Done(path),
            Err(e) => Outcome::Failed(e.to_string()),
        }
    }
}
