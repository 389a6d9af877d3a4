//! Shortsmith Gen - generative service layer
//!
//! Provides the service trait the studio drives (structured text, image,
//! speech, long-running video), a Gemini REST provider and an offline mock,
//! plus layered configuration, credentials, art styles, prompt templates and
//! bounded polling for video jobs.

pub mod audio;
pub mod config;
pub mod credential;
pub mod job;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod style;

pub use config::ShortsConfig;
pub use credential::{CredentialProvider, StaticCredentials};
pub use job::{CancelToken, JobStatus, PollPolicy, VideoJob};
pub use provider::{
    AssetKind, GenerativeService, ImageCount, ImageRequest, InlineData, JobPollResult,
    ProviderStatus, ScriptRequest, SpeechRequest, VideoRequest,
};
pub use style::{AspectRatio, StyleGuide};
