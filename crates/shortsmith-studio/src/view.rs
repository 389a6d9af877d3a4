//! Read-only projection of the studio state for display

use serde::Serialize;
use std::fmt::Write as _;

use shortsmith_gen::audio;

use crate::asset::Asset;
use crate::state::{AppState, Stage};

/// Displayable summary of one asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetCard {
    pub id: String,
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: usize,
    pub hash: String,
    /// `data:` URL a GUI can render directly
    #[serde(skip)]
    pub display_ref: String,
}

impl From<&Asset> for AssetCard {
    fn from(asset: &Asset) -> Self {
        Self {
            id: asset.id.to_string(),
            file_name: asset.file_name(),
            mime_type: asset.mime_type.clone(),
            size_bytes: asset.size_bytes,
            hash: asset.hash.short(),
            display_ref: asset.display_ref(),
        }
    }
}

/// One prompt and the image generated from it, if any
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageSlot {
    /// 1-based, as shown to users
    pub number: usize,
    pub prompt: String,
    pub busy: bool,
    pub image: Option<AssetCard>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptView {
    pub title: String,
    pub hook: String,
    pub body: String,
    pub conclusion: String,
}

/// Everything a front end shows, derived from `AppState` only
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudioView {
    pub topic: String,
    pub settings_line: String,
    pub status: String,
    pub stage: Stage,
    pub busy: bool,
    pub script: Option<ScriptView>,
    pub images: Vec<ImageSlot>,
    pub narration: Option<AssetCard>,
    /// Narration length, e.g. "12.5s"
    pub narration_length: Option<String>,
    pub audio_busy: bool,
    pub video_busy: bool,
    pub final_video: Option<String>,
    pub can_composite: bool,
    pub can_export: bool,
}

impl StudioView {
    pub fn project(state: &AppState) -> Self {
        let settings = &state.settings;
        let music = if settings.music.trim().is_empty() {
            "no music".to_string()
        } else {
            settings.music.trim().to_string()
        };
        let settings_line = format!(
            "{} images, {}, style {}, {}",
            settings.image_count, settings.aspect_ratio, settings.style.name, music
        );

        let images = state
            .script
            .as_ref()
            .map(|script| {
                script
                    .image_prompts
                    .iter()
                    .enumerate()
                    .map(|(i, prompt)| ImageSlot {
                        number: i + 1,
                        prompt: prompt.clone(),
                        busy: state.run.is_image_busy(i),
                        image: state.assets.image(i).map(AssetCard::from),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            topic: settings.topic.clone(),
            settings_line,
            status: state.run.status.clone(),
            stage: state.run.stage,
            busy: state.run.busy,
            script: state.script.as_ref().map(|s| ScriptView {
                title: s.title.clone(),
                hook: s.hook.clone(),
                body: s.body.clone(),
                conclusion: s.conclusion.clone(),
            }),
            images,
            narration: state.assets.narration().map(AssetCard::from),
            narration_length: state
                .assets
                .narration()
                .and_then(|a| a.bytes().ok())
                .and_then(|wav| audio::wav_duration_secs(&wav))
                .map(|secs| format!("{:.1}s", secs)),
            audio_busy: state.run.audio_busy,
            video_busy: state.run.video_busy,
            final_video: state
                .run
                .final_video
                .as_ref()
                .map(|v| format!("{} ({} bytes)", v.file_name, v.size_bytes)),
            can_composite: state.can_composite(),
            can_export: state.can_export(),
        }
    }

    /// Plain-text rendering for terminals
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let topic = if self.topic.is_empty() { "(no topic)" } else { self.topic.as_str() };
        let _ = writeln!(out, "Topic: {}", topic);
        let _ = writeln!(out, "Settings: {}", self.settings_line);
        if !self.status.is_empty() {
            let _ = writeln!(out, "Status: {}", self.status);
        }

        let Some(ref script) = self.script else {
            return out;
        };

        let _ = writeln!(out, "\n== {} ==", script.title);
        let _ = writeln!(out, "Hook:       {}", script.hook);
        let _ = writeln!(out, "Body:       {}", script.body);
        let _ = writeln!(out, "Conclusion: {}", script.conclusion);

        let _ = writeln!(out, "\nImages:");
        for slot in &self.images {
            let state = match (&slot.image, slot.busy) {
                (_, true) => "generating".to_string(),
                (Some(card), false) => format!("{} {}", card.file_name, card.hash),
                (None, false) => "missing".to_string(),
            };
            let _ = writeln!(out, "  {:>2}. [{}] {}", slot.number, state, slot.prompt);
        }

        let narration = match (&self.narration, self.audio_busy) {
            (_, true) => "generating".to_string(),
            (Some(card), false) => match self.narration_length {
                Some(ref length) => format!("{} {} ({}, {} bytes)", card.file_name, card.hash, length, card.size_bytes),
                None => format!("{} {} ({} bytes)", card.file_name, card.hash, card.size_bytes),
            },
            (None, false) => "missing".to_string(),
        };
        let _ = writeln!(out, "Narration: {}", narration);

        let video = match (&self.final_video, self.video_busy) {
            (_, true) => "compositing".to_string(),
            (Some(v), false) => v.clone(),
            (None, false) => "none".to_string(),
        };
        let _ = writeln!(out, "Video: {}", video);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::Script;
    use crate::state::ProjectSettings;
    use shortsmith_gen::InlineData;

    fn state_with_script() -> AppState {
        let mut state = AppState::new(ProjectSettings {
            topic: "Winter snacks".to_string(),
            ..Default::default()
        });
        state.script = Some(Script {
            title: "Winter snacks".to_string(),
            hook: "Cold outside?".to_string(),
            body: "Try roasted sweet potatoes.".to_string(),
            conclusion: "Stay warm!".to_string(),
            image_prompts: vec!["stall".to_string(), "cart".to_string(), "steam".to_string()],
        });
        state
            .assets
            .replace(Asset::image(0, &InlineData::from_bytes("image/png", b"a")).unwrap());
        state
            .assets
            .replace(Asset::image(2, &InlineData::from_bytes("image/png", b"c")).unwrap());
        state.run.images_busy.insert(1);
        state
    }

    #[test]
    fn test_projection_pairs_prompts_with_images() {
        let view = StudioView::project(&state_with_script());
        assert_eq!(view.images.len(), 3);
        assert_eq!(view.images[0].number, 1);
        assert!(view.images[0].image.is_some());
        assert!(view.images[1].image.is_none());
        assert!(view.images[1].busy);
        assert_eq!(view.images[2].image.as_ref().unwrap().id, "img-2");
        assert!(view.can_composite);
        assert!(view.narration.is_none());
    }

    #[test]
    fn test_projection_of_empty_state() {
        let view = StudioView::project(&AppState::default());
        assert!(view.script.is_none());
        assert!(view.images.is_empty());
        assert!(!view.can_export);
        assert!(view.render_text().contains("(no topic)"));
    }

    #[test]
    fn test_render_text() {
        let text = StudioView::project(&state_with_script()).render_text();
        assert!(text.contains("== Winter snacks =="));
        assert!(text.contains(" 1. [image_1.png"));
        assert!(text.contains(" 2. [generating] cart"));
        assert!(text.contains("Narration: missing"));
        assert!(text.contains("Video: none"));
    }

    #[test]
    fn test_narration_length() {
        let mut state = state_with_script();
        let wav = audio::pcm_to_wav(&vec![0u8; 24_000 * 2 * 3], 24_000).unwrap();
        state
            .assets
            .replace(Asset::narration(&InlineData::from_bytes(audio::WAV_MIME, &wav)).unwrap());

        let view = StudioView::project(&state);
        assert_eq!(view.narration_length.as_deref(), Some("3.0s"));
        assert!(view.render_text().contains("Narration: narration.wav"));
        assert!(view.render_text().contains("(3.0s, "));
    }
}
