//! Mock provider for testing and offline runs
//!
//! Produces valid script JSON, solid-colour PNGs and PCM silence without any
//! network calls. Failures can be injected per operation, and every call is
//! recorded in a shared `CallLog` for assertions.

use serde_json::json;
use shortsmith_core::{Result, ShortsError};
use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::sync::{Arc, Mutex};

use crate::job::{JobStatus, VideoJob};
use crate::provider::*;
use crate::style::AspectRatio;

const AUTO_PROMPT_COUNT: usize = 4;
const PNG_LONG_SIDE: u32 = 64;
const PCM_RATE: u32 = 24_000;

/// One recorded service call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Script,
    Image {
        prompt: String,
        aspect_ratio: AspectRatio,
    },
    Speech {
        text: String,
        voice: String,
    },
    VideoSubmit {
        prompt: String,
        has_seed_image: bool,
        aspect_ratio: AspectRatio,
    },
    VideoPoll,
    VideoDownload,
}

/// Shared record of calls made to a `MockService`
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<MockCall>>>);

impl CallLog {
    fn push(&self, call: MockCall) {
        if let Ok(mut calls) = self.0.lock() {
            calls.push(call);
        }
    }

    /// Snapshot of all calls so far
    pub fn calls(&self) -> Vec<MockCall> {
        self.0.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn count(&self, pred: impl Fn(&MockCall) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    pub fn count_scripts(&self) -> usize {
        self.count(|c| matches!(c, MockCall::Script))
    }

    pub fn count_images(&self) -> usize {
        self.count(|c| matches!(c, MockCall::Image { .. }))
    }

    pub fn count_speech(&self) -> usize {
        self.count(|c| matches!(c, MockCall::Speech { .. }))
    }

    pub fn count_video_submits(&self) -> usize {
        self.count(|c| matches!(c, MockCall::VideoSubmit { .. }))
    }

    pub fn count_video_polls(&self) -> usize {
        self.count(|c| matches!(c, MockCall::VideoPoll))
    }

    /// Prompts of image calls, in call order
    pub fn image_prompts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                MockCall::Image { prompt, .. } => Some(prompt),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
enum VideoBehaviour {
    CompleteAfter(u32),
    NeverComplete,
    Fail(String),
    RejectCredentials,
}

#[derive(Debug, Default)]
struct MockState {
    image_calls: usize,
    polls: HashMap<String, u32>,
}

/// A provider that fabricates results locally
#[derive(Debug)]
pub struct MockService {
    script_prompt_count: Option<usize>,
    script_failure: Option<String>,
    malformed_script: bool,
    failing_image_calls: HashSet<usize>,
    speech_failure: bool,
    video: VideoBehaviour,
    requires_key: bool,
    state: Mutex<MockState>,
    log: CallLog,
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockService {
    pub fn new() -> Self {
        Self {
            script_prompt_count: None,
            script_failure: None,
            malformed_script: false,
            failing_image_calls: HashSet::new(),
            speech_failure: false,
            video: VideoBehaviour::CompleteAfter(1),
            requires_key: false,
            state: Mutex::new(MockState::default()),
            log: CallLog::default(),
        }
    }

    /// Handle to the call log, usable after the service is moved
    pub fn call_log(&self) -> CallLog {
        self.log.clone()
    }

    /// Return this many prompts regardless of the requested count
    pub fn with_script_prompt_count(mut self, count: usize) -> Self {
        self.script_prompt_count = Some(count);
        self
    }

    /// Fail the script request with a service error
    pub fn with_script_failure(mut self, message: &str) -> Self {
        self.script_failure = Some(message.to_string());
        self
    }

    /// Answer the script request with text that is not a script
    pub fn with_malformed_script(mut self) -> Self {
        self.malformed_script = true;
        self
    }

    /// Fail the n-th image call (0-based, counted across the service's lifetime)
    pub fn with_image_failure_at(mut self, call: usize) -> Self {
        self.failing_image_calls.insert(call);
        self
    }

    pub fn with_speech_failure(mut self) -> Self {
        self.speech_failure = true;
        self
    }

    /// Complete video jobs on the n-th poll
    pub fn with_video_polls(mut self, polls: u32) -> Self {
        self.video = VideoBehaviour::CompleteAfter(polls.max(1));
        self
    }

    pub fn with_video_never_completing(mut self) -> Self {
        self.video = VideoBehaviour::NeverComplete;
        self
    }

    pub fn with_video_failure(mut self, message: &str) -> Self {
        self.video = VideoBehaviour::Fail(message.to_string());
        self
    }

    /// Reject video submission the way the service rejects an unusable key
    pub fn with_video_credential_rejection(mut self) -> Self {
        self.video = VideoBehaviour::RejectCredentials;
        self
    }

    /// Behave like a keyed service: callers must select a key first
    pub fn with_required_credentials(mut self) -> Self {
        self.requires_key = true;
        self
    }

    fn next_image_call(&self) -> usize {
        match self.state.lock() {
            Ok(mut state) => {
                let call = state.image_calls;
                state.image_calls += 1;
                call
            }
            Err(_) => 0,
        }
    }
}

impl GenerativeService for MockService {
    fn name(&self) -> &str {
        "mock"
    }

    fn health_check(&self) -> Result<ProviderStatus> {
        Ok(ProviderStatus::Available)
    }

    fn requires_credentials(&self) -> bool {
        self.requires_key
    }

    fn generate_structured_text(&self, request: &ScriptRequest) -> Result<String> {
        self.log.push(MockCall::Script);

        if let Some(ref msg) = self.script_failure {
            return Err(ShortsError::Generation(msg.clone()));
        }
        if self.malformed_script {
            return Ok(r#"{"title": "Half a script", "hook": 42}"#.to_string());
        }

        let count = self
            .script_prompt_count
            .or_else(|| request.image_count.expected())
            .unwrap_or(AUTO_PROMPT_COUNT);
        let prompts: Vec<String> = (1..=count)
            .map(|i| format!("Mock illustration {}", i))
            .collect();

        Ok(json!({
            "title": "Mock short",
            "hook": "Did you know this?",
            "body": "Here is the interesting part.",
            "conclusion": "Follow for more.",
            "imagePrompts": prompts
        })
        .to_string())
    }

    fn generate_image(&self, request: &ImageRequest) -> Result<InlineData> {
        self.log.push(MockCall::Image {
            prompt: request.prompt.clone(),
            aspect_ratio: request.aspect_ratio,
        });

        let call = self.next_image_call();
        if self.failing_image_calls.contains(&call) {
            return Err(ShortsError::Generation(format!(
                "Mock image failure on call {}",
                call
            )));
        }

        let png = solid_png(&request.prompt, call, request.aspect_ratio)?;
        Ok(InlineData::from_bytes("image/png", &png))
    }

    fn synthesize_speech(&self, request: &SpeechRequest) -> Result<InlineData> {
        self.log.push(MockCall::Speech {
            text: request.text.clone(),
            voice: request.voice.clone(),
        });

        if self.speech_failure {
            return Err(ShortsError::Generation("Mock speech failure".to_string()));
        }

        // Half a second of silence
        let pcm = vec![0u8; PCM_RATE as usize];
        Ok(InlineData::from_bytes(
            &format!("audio/L16;codec=pcm;rate={}", PCM_RATE),
            &pcm,
        ))
    }

    fn submit_video(&self, request: &VideoRequest) -> Result<VideoJob> {
        self.log.push(MockCall::VideoSubmit {
            prompt: request.prompt.clone(),
            has_seed_image: request.seed_image.is_some(),
            aspect_ratio: request.aspect_ratio,
        });

        if let VideoBehaviour::RejectCredentials = self.video {
            return Err(ShortsError::CredentialRejected(
                "Requested entity was not found.".to_string(),
            ));
        }

        let mut job = VideoJob::new("mock");
        job.remote_id = Some(format!("operations/mock-{}", job.id));
        Ok(job)
    }

    fn poll_video(&self, job: &VideoJob) -> Result<JobPollResult> {
        self.log.push(MockCall::VideoPoll);

        let remote_id = job
            .remote_id
            .as_deref()
            .ok_or_else(|| ShortsError::Generation("Job has no remote ID".to_string()))?;

        let polls = match self.state.lock() {
            Ok(mut state) => {
                let counter = state.polls.entry(remote_id.to_string()).or_insert(0);
                *counter += 1;
                *counter
            }
            Err(_) => 1,
        };

        Ok(match &self.video {
            VideoBehaviour::CompleteAfter(n) if polls >= *n => JobPollResult::Complete {
                video_uri: Some(format!("mock://video/{}", remote_id)),
            },
            VideoBehaviour::CompleteAfter(_) | VideoBehaviour::NeverComplete => {
                JobPollResult::Processing
            }
            VideoBehaviour::Fail(msg) => JobPollResult::Failed(msg.clone()),
            VideoBehaviour::RejectCredentials => {
                JobPollResult::Failed("Requested entity was not found.".to_string())
            }
        })
    }

    fn download_video(&self, job: &VideoJob) -> Result<Vec<u8>> {
        self.log.push(MockCall::VideoDownload);

        if job.status != JobStatus::Complete {
            return Err(ShortsError::Generation("Job not yet complete".to_string()));
        }
        let mut bytes = b"MOCKMP4".to_vec();
        bytes.extend_from_slice(job.id.as_bytes());
        Ok(bytes)
    }
}

/// Solid-colour PNG whose colour depends on the prompt and call number
fn solid_png(prompt: &str, call: usize, aspect_ratio: AspectRatio) -> Result<Vec<u8>> {
    let hash_val = prompt
        .bytes()
        .fold(call as u32 ^ 0x9E37_79B9, |acc, b| {
            acc.wrapping_mul(31).wrapping_add(b as u32)
        });
    let pixel = image::Rgba([
        ((hash_val >> 16) & 0xFF) as u8,
        ((hash_val >> 8) & 0xFF) as u8,
        (hash_val & 0xFF) as u8,
        255,
    ]);

    let (width, height) = aspect_ratio.dimensions(PNG_LONG_SIDE);
    let img = image::RgbaImage::from_pixel(width, height, pixel);

    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, image::ImageFormat::Png)
        .map_err(|e| ShortsError::Generation(format!("Failed to encode PNG: {}", e)))?;
    Ok(bytes.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_request(prompt: &str) -> ImageRequest {
        ImageRequest {
            prompt: prompt.to_string(),
            aspect_ratio: AspectRatio::Square,
        }
    }

    #[test]
    fn test_script_honours_fixed_count() {
        let mock = MockService::new();
        let text = mock
            .generate_structured_text(&ScriptRequest {
                prompt: "anything".to_string(),
                image_count: ImageCount::Fixed(3),
            })
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["imagePrompts"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_script_auto_count() {
        let mock = MockService::new();
        let text = mock
            .generate_structured_text(&ScriptRequest {
                prompt: "anything".to_string(),
                image_count: ImageCount::Auto,
            })
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(
            value["imagePrompts"].as_array().unwrap().len(),
            AUTO_PROMPT_COUNT
        );
    }

    #[test]
    fn test_image_is_valid_png() {
        let mock = MockService::new();
        let payload = mock.generate_image(&image_request("red lantern")).unwrap();
        assert_eq!(payload.mime_type, "image/png");

        let bytes = payload.decode().unwrap();
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!((img.width(), img.height()), (64, 64));
    }

    #[test]
    fn test_regenerated_image_differs() {
        let mock = MockService::new();
        let first = mock.generate_image(&image_request("same prompt")).unwrap();
        let second = mock.generate_image(&image_request("same prompt")).unwrap();
        assert_ne!(first.data, second.data);
    }

    #[test]
    fn test_injected_image_failure() {
        let mock = MockService::new().with_image_failure_at(1);
        assert!(mock.generate_image(&image_request("a")).is_ok());
        assert!(mock.generate_image(&image_request("b")).is_err());
        assert!(mock.generate_image(&image_request("c")).is_ok());
        assert_eq!(mock.call_log().count_images(), 3);
    }

    #[test]
    fn test_speech_is_pcm() {
        let mock = MockService::new();
        let payload = mock
            .synthesize_speech(&SpeechRequest {
                text: "hello".to_string(),
                voice: "Kore".to_string(),
            })
            .unwrap();
        assert!(payload.mime_type.starts_with("audio/L16"));
        assert_eq!(payload.decode().unwrap().len(), PCM_RATE as usize);
    }

    #[test]
    fn test_credential_rejection_on_submit() {
        let mock = MockService::new().with_video_credential_rejection();
        let err = mock
            .submit_video(&VideoRequest {
                prompt: "p".to_string(),
                seed_image: None,
                aspect_ratio: AspectRatio::Portrait9x16,
                resolution: "720p".to_string(),
            })
            .unwrap_err();
        assert!(err.is_credential_error());
    }

    #[test]
    fn test_needs_no_key_unless_asked() {
        assert!(!MockService::new().requires_credentials());
        assert!(MockService::new().with_required_credentials().requires_credentials());
    }
}
