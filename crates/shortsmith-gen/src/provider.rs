//! Generative service trait and request/result types

use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use shortsmith_core::{Result, ShortsError};
use std::fmt;
use std::str::FromStr;

use crate::job::VideoJob;
use crate::style::AspectRatio;

/// Upper bound on images per script
pub const MAX_IMAGES: u8 = 20;

/// The kind of artifact a service call produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Image,
    Audio,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Image => write!(f, "image"),
            AssetKind::Audio => write!(f, "audio"),
        }
    }
}

/// Binary payload returned inline by the service, base64 encoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineData {
    pub mime_type: String,
    /// Base64 (standard alphabet) content
    pub data: String,
}

impl InlineData {
    /// Encode raw bytes
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.to_string(),
            data: BASE64_STANDARD.encode(bytes),
        }
    }

    /// Decode the payload to raw bytes
    pub fn decode(&self) -> Result<Vec<u8>> {
        BASE64_STANDARD.decode(self.data.as_bytes()).map_err(|e| {
            ShortsError::MalformedResponse(format!("Invalid base64 payload: {}", e))
        })
    }

    /// `data:` URL suitable for direct display or playback
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// How many image prompts the script should contain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageCount {
    /// Let the model pick a count that suits the content
    Auto,
    Fixed(u8),
}

impl ImageCount {
    /// Fixed count, validated against `1..=MAX_IMAGES`
    pub fn fixed(n: u8) -> Result<Self> {
        if n == 0 || n > MAX_IMAGES {
            return Err(ShortsError::Validation(format!(
                "Image count must be between 1 and {}, got {}",
                MAX_IMAGES, n
            )));
        }
        Ok(ImageCount::Fixed(n))
    }

    /// Requested count, if fixed
    pub fn expected(&self) -> Option<usize> {
        match self {
            ImageCount::Auto => None,
            ImageCount::Fixed(n) => Some(*n as usize),
        }
    }
}

impl Default for ImageCount {
    fn default() -> Self {
        ImageCount::Fixed(5)
    }
}

impl fmt::Display for ImageCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageCount::Auto => write!(f, "auto"),
            ImageCount::Fixed(n) => write!(f, "{}", n),
        }
    }
}

impl FromStr for ImageCount {
    type Err = ShortsError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Ok(ImageCount::Auto);
        }
        let n: u8 = s.parse().map_err(|_| {
            ShortsError::Validation(format!("Image count must be 'auto' or 1-{}", MAX_IMAGES))
        })?;
        ImageCount::fixed(n)
    }
}

/// Structured script request. The response must follow `prompt::script_schema()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptRequest {
    pub prompt: String,
    pub image_count: ImageCount,
}

/// Single image request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRequest {
    pub prompt: String,
    pub aspect_ratio: AspectRatio,
}

/// Text-to-speech request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechRequest {
    pub text: String,
    pub voice: String,
}

/// Long-running video synthesis request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRequest {
    pub prompt: String,
    /// First frame / visual seed
    #[serde(default)]
    pub seed_image: Option<InlineData>,
    pub aspect_ratio: AspectRatio,
    pub resolution: String,
}

/// Status returned by a provider health check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderStatus {
    Available,
    Unavailable(String),
    NoApiKey,
}

/// Result of polling a video job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobPollResult {
    /// Still running
    Processing,
    /// Finished, with the location of the rendered video if the service gave one
    Complete { video_uri: Option<String> },
    /// Finished with an error message
    Failed(String),
}

/// Trait implemented by each generative backend (Gemini, Mock)
pub trait GenerativeService: Send {
    /// Provider name (e.g. "gemini", "mock")
    fn name(&self) -> &str;

    /// Check whether the provider can be used (credentials present, enabled)
    fn health_check(&self) -> Result<ProviderStatus>;

    /// Whether calls need an API key from the credential provider
    fn requires_credentials(&self) -> bool {
        true
    }

    /// Generate JSON text shaped like a script
    fn generate_structured_text(&self, request: &ScriptRequest) -> Result<String>;

    /// Generate one image
    fn generate_image(&self, request: &ImageRequest) -> Result<InlineData>;

    /// Synthesize narration audio
    fn synthesize_speech(&self, request: &SpeechRequest) -> Result<InlineData>;

    /// Submit a video synthesis job
    fn submit_video(&self, request: &VideoRequest) -> Result<VideoJob>;

    /// Poll a submitted video job once
    fn poll_video(&self, job: &VideoJob) -> Result<JobPollResult>;

    /// Fetch the rendered video of a completed job
    fn download_video(&self, job: &VideoJob) -> Result<Vec<u8>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_count_parse() {
        assert_eq!("auto".parse::<ImageCount>().unwrap(), ImageCount::Auto);
        assert_eq!("AUTO".parse::<ImageCount>().unwrap(), ImageCount::Auto);
        assert_eq!("3".parse::<ImageCount>().unwrap(), ImageCount::Fixed(3));
        assert!("0".parse::<ImageCount>().is_err());
        assert!("21".parse::<ImageCount>().is_err());
        assert!("many".parse::<ImageCount>().is_err());
    }

    #[test]
    fn test_image_count_expected() {
        assert_eq!(ImageCount::Auto.expected(), None);
        assert_eq!(ImageCount::Fixed(7).expected(), Some(7));
        assert_eq!(ImageCount::default(), ImageCount::Fixed(5));
    }

    #[test]
    fn test_inline_data_roundtrip_and_url() {
        let payload = InlineData::from_bytes("image/png", &[0x89, b'P', b'N', b'G']);
        assert_eq!(payload.decode().unwrap(), vec![0x89, b'P', b'N', b'G']);
        assert!(payload.data_url().starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_inline_data_invalid_base64() {
        let payload = InlineData {
            mime_type: "image/png".to_string(),
            data: "***".to_string(),
        };
        assert!(matches!(
            payload.decode(),
            Err(ShortsError::MalformedResponse(_))
        ));
    }
}
