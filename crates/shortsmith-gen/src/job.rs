//! Long-running video jobs
//!
//! Video synthesis is submitted once and then polled. Polling is bounded by a
//! `PollPolicy` and can be abandoned early through a `CancelToken`.

use serde::{Deserialize, Serialize};
use shortsmith_core::{Result, ShortsError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::provider::{GenerativeService, JobPollResult};

/// Longest single sleep between cancellation checks
const CANCEL_CHECK_SLICE: Duration = Duration::from_millis(250);

/// Status of a video job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Submitted,
    Processing,
    Complete,
    Failed,
}

/// A tracked video synthesis job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoJob {
    /// Local job ID (UUID)
    pub id: String,
    /// Provider-side operation name
    #[serde(default)]
    pub remote_id: Option<String>,
    pub provider: String,
    pub status: JobStatus,
    /// Polls issued so far
    #[serde(default)]
    pub polls: u32,
    #[serde(default)]
    pub error: Option<String>,
    /// Location of the rendered video once complete
    #[serde(default)]
    pub video_uri: Option<String>,
}

impl VideoJob {
    pub fn new(provider: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            remote_id: None,
            provider: provider.to_string(),
            status: JobStatus::Submitted,
            polls: 0,
            error: None,
            video_uri: None,
        }
    }
}

/// How often and how long to poll a video job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_attempts: 60,
        }
    }
}

/// Shared flag that asks a running poll loop to stop
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Poll `job` until it completes, fails, runs out of attempts or is cancelled.
///
/// Returns the URI of the rendered video.
pub fn wait_for_video(
    service: &dyn GenerativeService,
    job: &mut VideoJob,
    policy: &PollPolicy,
    cancel: &CancelToken,
) -> Result<String> {
    if job.status == JobStatus::Complete {
        if let Some(uri) = job.video_uri.clone() {
            return Ok(uri);
        }
    }

    for attempt in 1..=policy.max_attempts {
        sleep_unless_cancelled(policy.interval, cancel);
        if cancel.is_cancelled() {
            return Err(ShortsError::Cancelled);
        }

        job.polls = attempt;
        log::debug!("Polling video job {} (attempt {})", job.id, attempt);

        match service.poll_video(job)? {
            JobPollResult::Processing => {
                job.status = JobStatus::Processing;
            }
            JobPollResult::Complete { video_uri } => {
                job.status = JobStatus::Complete;
                job.video_uri = video_uri.clone();
                return video_uri.ok_or_else(|| {
                    ShortsError::MalformedResponse(
                        "Video job finished without a video location".to_string(),
                    )
                });
            }
            JobPollResult::Failed(msg) => {
                job.status = JobStatus::Failed;
                job.error = Some(msg.clone());
                return Err(ShortsError::Generation(format!("Video job failed: {}", msg)));
            }
        }
    }

    Err(ShortsError::PollTimeout {
        attempts: policy.max_attempts,
    })
}

fn sleep_unless_cancelled(total: Duration, cancel: &CancelToken) {
    let mut remaining = total;
    while !remaining.is_zero() && !cancel.is_cancelled() {
        let slice = remaining.min(CANCEL_CHECK_SLICE);
        std::thread::sleep(slice);
        remaining -= slice;
    }
}
