//! Gemini REST provider
//!
//! Script, image and speech go through `models/{model}:generateContent`.
//! Video is a long-running `predictLongRunning` operation that is polled by
//! name and downloaded from the URI it reports.

use serde_json::{json, Value};
use shortsmith_core::{Result, ShortsError};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{ModelConfig, ShortsConfig};
use crate::credential::CredentialProvider;
use crate::job::VideoJob;
use crate::prompt;
use crate::provider::*;

const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const API_KEY_HEADER: &str = "x-goog-api-key";
const REQUEST_TIMEOUT_SECS: u64 = 120;
const DOWNLOAD_TIMEOUT_SECS: u64 = 600;
const MAX_RETRIES: usize = 3;
const RETRY_BASE_DELAY_MS: u64 = 500;
const MAX_RESPONSE_BYTES: u64 = 64 * 1024 * 1024;
const MAX_VIDEO_BYTES: u64 = 512 * 1024 * 1024;

type HttpResponse = ureq::http::Response<ureq::Body>;

/// Gemini provider for script, image, speech and video generation
pub struct GeminiProvider {
    credentials: Arc<dyn CredentialProvider>,
    api_url: String,
    models: ModelConfig,
}

impl GeminiProvider {
    /// Create a provider from config.
    ///
    /// The key is not read here; every request asks `credentials` for it.
    pub fn from_config(config: &ShortsConfig, credentials: Arc<dyn CredentialProvider>) -> Self {
        let api_url = config
            .api_url("gemini")
            .unwrap_or(DEFAULT_GEMINI_URL)
            .trim_end_matches('/')
            .to_string();

        Self {
            credentials,
            api_url,
            models: config.models.clone(),
        }
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!("{}/models/{}:{}", self.api_url, model, method)
    }

    fn generate_content(&self, model: &str, payload: &Value) -> Result<Value> {
        let url = self.model_url(model, "generateContent");
        self.post_json_with_retry(&url, payload)
    }

    fn post_json_with_retry(&self, url: &str, payload: &Value) -> Result<Value> {
        let key = self.credentials.api_key()?;
        log::debug!("POST {}", url);

        let body = self.execute_with_retry(REQUEST_TIMEOUT_SECS, MAX_RESPONSE_BYTES, |agent| {
            agent
                .post(url)
                .header(API_KEY_HEADER, &key)
                .header("Content-Type", "application/json")
                .send_json(payload)
        })?;
        parse_json(&body)
    }

    fn get_json_with_retry(&self, url: &str) -> Result<Value> {
        let key = self.credentials.api_key()?;
        log::debug!("GET {}", url);

        let body = self.execute_with_retry(REQUEST_TIMEOUT_SECS, MAX_RESPONSE_BYTES, |agent| {
            agent.get(url).header(API_KEY_HEADER, &key).call()
        })?;
        parse_json(&body)
    }

    fn download_bytes_with_retry(&self, url: &str) -> Result<Vec<u8>> {
        let key = self.credentials.api_key()?;
        log::debug!("Downloading {}", url);

        self.execute_with_retry(DOWNLOAD_TIMEOUT_SECS, MAX_VIDEO_BYTES, |agent| {
            agent.get(url).header(API_KEY_HEADER, &key).call()
        })
    }

    /// Send a request, retrying transient failures, and return the body of a
    /// 2xx response. Other statuses are mapped through `classify_error`.
    fn execute_with_retry<F>(&self, timeout_secs: u64, limit: u64, send: F) -> Result<Vec<u8>>
    where
        F: Fn(&ureq::Agent) -> std::result::Result<HttpResponse, ureq::Error>,
    {
        for attempt in 0..MAX_RETRIES {
            let agent = build_agent(timeout_secs);
            match send(&agent) {
                Ok(mut response) => {
                    let status = response.status().as_u16();
                    let body = response
                        .body_mut()
                        .with_config()
                        .limit(limit)
                        .read_to_vec()
                        .map_err(|e| {
                            ShortsError::Generation(format!(
                                "Failed to read Gemini response: {}",
                                e
                            ))
                        })?;

                    if (200..300).contains(&status) {
                        return Ok(body);
                    }
                    if attempt + 1 < MAX_RETRIES && is_retryable_status(status) {
                        log::debug!("Gemini returned {}, retrying", status);
                        sleep_backoff(attempt);
                        continue;
                    }
                    return Err(classify_error(status, &String::from_utf8_lossy(&body)));
                }
                Err(e) => {
                    if attempt + 1 < MAX_RETRIES && is_retryable_error(&e) {
                        log::debug!("Gemini request failed ({}), retrying", e);
                        sleep_backoff(attempt);
                        continue;
                    }
                    return Err(ShortsError::Generation(format!(
                        "Gemini API request failed: {}",
                        e
                    )));
                }
            }
        }

        Err(ShortsError::Generation(
            "Gemini API request failed after retries".to_string(),
        ))
    }
}

impl GenerativeService for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn health_check(&self) -> Result<ProviderStatus> {
        if !self.credentials.has_selected_key() {
            return Ok(ProviderStatus::NoApiKey);
        }
        Ok(ProviderStatus::Available)
    }

    fn generate_structured_text(&self, request: &ScriptRequest) -> Result<String> {
        let payload = json!({
            "contents": [{"parts": [{"text": request.prompt}]}],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": prompt::script_schema()
            }
        });
        let response = self.generate_content(&self.models.script, &payload)?;
        parse_text_response(&response)
    }

    fn generate_image(&self, request: &ImageRequest) -> Result<InlineData> {
        let payload = json!({
            "contents": [{"parts": [{"text": request.prompt}]}],
            "generationConfig": {
                "imageConfig": {"aspectRatio": request.aspect_ratio.as_str()}
            }
        });
        let response = self.generate_content(&self.models.image, &payload)?;
        parse_inline_data(&response)
    }

    fn synthesize_speech(&self, request: &SpeechRequest) -> Result<InlineData> {
        let payload = json!({
            "contents": [{"parts": [{"text": request.text}]}],
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": {
                        "prebuiltVoiceConfig": {"voiceName": request.voice}
                    }
                }
            }
        });
        let response = self.generate_content(&self.models.speech, &payload)?;
        parse_inline_data(&response)
    }

    fn submit_video(&self, request: &VideoRequest) -> Result<VideoJob> {
        let mut instance = json!({"prompt": request.prompt});
        if let Some(ref seed) = request.seed_image {
            instance["image"] = json!({
                "bytesBase64Encoded": seed.data,
                "mimeType": seed.mime_type
            });
        }
        let payload = json!({
            "instances": [instance],
            "parameters": {
                "aspectRatio": request.aspect_ratio.for_video().as_str(),
                "resolution": request.resolution
            }
        });

        let url = self.model_url(&self.models.video, "predictLongRunning");
        let response = self.post_json_with_retry(&url, &payload)?;
        let operation = parse_operation_name(&response)?;
        log::info!("Submitted video operation {}", operation);

        let mut job = VideoJob::new("gemini");
        job.remote_id = Some(operation);
        Ok(job)
    }

    fn poll_video(&self, job: &VideoJob) -> Result<JobPollResult> {
        let remote_id = job
            .remote_id
            .as_deref()
            .ok_or_else(|| ShortsError::Generation("Job has no remote ID".to_string()))?;

        let url = format!("{}/{}", self.api_url, remote_id);
        let response = self.get_json_with_retry(&url)?;
        Ok(parse_operation_poll(&response))
    }

    fn download_video(&self, job: &VideoJob) -> Result<Vec<u8>> {
        let uri = job.video_uri.as_deref().ok_or_else(|| {
            ShortsError::Generation("Job has no video location yet".to_string())
        })?;
        self.download_bytes_with_retry(uri)
    }
}

fn build_agent(timeout_secs: u64) -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(timeout_secs)))
        .http_status_as_error(false)
        .build();
    config.into()
}

fn is_retryable_error(e: &ureq::Error) -> bool {
    matches!(
        e,
        ureq::Error::Timeout(_)
            | ureq::Error::Io(_)
            | ureq::Error::ConnectionFailed
            | ureq::Error::HostNotFound
    )
}

fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

fn sleep_backoff(attempt: usize) {
    let delay_ms = RETRY_BASE_DELAY_MS.saturating_mul(1u64 << attempt);
    std::thread::sleep(Duration::from_millis(delay_ms));
}

fn parse_json(body: &[u8]) -> Result<Value> {
    serde_json::from_slice(body).map_err(|e| {
        ShortsError::MalformedResponse(format!("Gemini response is not JSON: {}", e))
    })
}

/// Map a non-success status to an error.
///
/// Auth failures and the "entity was not found" 404 that the service returns
/// for keys without access to a model are credential errors.
pub fn classify_error(status: u16, body: &str) -> ShortsError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(|s| s.to_string())
        })
        .unwrap_or_else(|| body.trim().to_string());

    let not_found = message.to_ascii_lowercase().contains("entity was not found");
    match status {
        401 | 403 => ShortsError::CredentialRejected(message),
        404 if not_found => ShortsError::CredentialRejected(message),
        _ => ShortsError::Generation(format!("Gemini returned {}: {}", status, message)),
    }
}

/// Concatenated text parts of the first candidate
pub fn parse_text_response(response: &Value) -> Result<String> {
    let text: String = first_candidate_parts(response)
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect();

    if text.trim().is_empty() {
        return Err(ShortsError::MalformedResponse(format!(
            "No text in Gemini response{}",
            block_reason_suffix(response)
        )));
    }
    Ok(text)
}

/// First inline binary part of the first candidate
pub fn parse_inline_data(response: &Value) -> Result<InlineData> {
    first_candidate_parts(response)
        .iter()
        .filter_map(|p| p.get("inlineData"))
        .find_map(|d| {
            let data = d.get("data").and_then(|v| v.as_str())?;
            let mime_type = d
                .get("mimeType")
                .and_then(|v| v.as_str())
                .unwrap_or("application/octet-stream");
            Some(InlineData {
                mime_type: mime_type.to_string(),
                data: data.to_string(),
            })
        })
        .ok_or_else(|| {
            ShortsError::Generation(format!(
                "No inline data in Gemini response{}",
                block_reason_suffix(response)
            ))
        })
}

/// Operation name from a `predictLongRunning` response
pub fn parse_operation_name(response: &Value) -> Result<String> {
    response
        .get("name")
        .and_then(|n| n.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| {
            ShortsError::MalformedResponse(format!(
                "Unexpected video submit response: {}",
                serde_json::to_string_pretty(response).unwrap_or_default()
            ))
        })
}

/// Interpret an operation status document
pub fn parse_operation_poll(response: &Value) -> JobPollResult {
    if !response.get("done").and_then(|d| d.as_bool()).unwrap_or(false) {
        return JobPollResult::Processing;
    }

    if let Some(error) = response.get("error") {
        let msg = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown error")
            .to_string();
        return JobPollResult::Failed(msg);
    }

    let video_uri = response
        .pointer("/response/generateVideoResponse/generatedSamples/0/video/uri")
        .and_then(|u| u.as_str())
        .map(|s| s.to_string());

    if video_uri.is_none() {
        if let Some(reasons) = response
            .pointer("/response/generateVideoResponse/raiMediaFilteredReasons")
            .and_then(|r| r.as_array())
        {
            let joined: Vec<&str> = reasons.iter().filter_map(|r| r.as_str()).collect();
            if !joined.is_empty() {
                return JobPollResult::Failed(joined.join("; "));
            }
        }
    }

    JobPollResult::Complete { video_uri }
}

fn first_candidate_parts(response: &Value) -> Vec<Value> {
    response
        .pointer("/candidates/0/content/parts")
        .and_then(|p| p.as_array())
        .cloned()
        .unwrap_or_default()
}

fn block_reason_suffix(response: &Value) -> String {
    response
        .pointer("/promptFeedback/blockReason")
        .and_then(|r| r.as_str())
        .map(|r| format!(" (blocked: {})", r))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::StaticCredentials;

    fn value(json: &str) -> Value {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_parse_script_text() {
        let response = value(
            r#"{"candidates":[{"content":{"parts":[
                {"text":"{\"title\":\"Snacks\","},
                {"text":"\"hook\":\"h\"}"}
            ]}}]}"#,
        );
        let text = parse_text_response(&response).unwrap();
        assert_eq!(text, r#"{"title":"Snacks","hook":"h"}"#);
    }

    #[test]
    fn test_parse_blocked_text() {
        let response = value(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#);
        let err = parse_text_response(&response).unwrap_err();
        assert!(matches!(err, ShortsError::MalformedResponse(_)));
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_parse_inline_image_skips_text_parts() {
        let response = value(
            r#"{"candidates":[{"content":{"parts":[
                {"text":"Here is your image"},
                {"inlineData":{"mimeType":"image/png","data":"iVBORw0KGgo="}}
            ]}}]}"#,
        );
        let data = parse_inline_data(&response).unwrap();
        assert_eq!(data.mime_type, "image/png");
        assert_eq!(data.data, "iVBORw0KGgo=");
    }

    #[test]
    fn test_parse_inline_missing() {
        let response = value(r#"{"candidates":[{"content":{"parts":[{"text":"sorry"}]}}]}"#);
        assert!(parse_inline_data(&response).is_err());
    }

    #[test]
    fn test_parse_operation_name() {
        let response = value(r#"{"name":"models/veo/operations/abc123"}"#);
        assert_eq!(
            parse_operation_name(&response).unwrap(),
            "models/veo/operations/abc123"
        );
        assert!(parse_operation_name(&value("{}")).is_err());
    }

    #[test]
    fn test_parse_poll_pending() {
        let response = value(r#"{"name":"operations/abc","done":false}"#);
        assert_eq!(parse_operation_poll(&response), JobPollResult::Processing);
        assert_eq!(
            parse_operation_poll(&value(r#"{"name":"operations/abc"}"#)),
            JobPollResult::Processing
        );
    }

    #[test]
    fn test_parse_poll_complete() {
        let response = value(
            r#"{
                "name": "operations/abc",
                "done": true,
                "response": {
                    "generateVideoResponse": {
                        "generatedSamples": [
                            {"video": {"uri": "https://example.com/files/v1:download"}}
                        ]
                    }
                }
            }"#,
        );
        assert_eq!(
            parse_operation_poll(&response),
            JobPollResult::Complete {
                video_uri: Some("https://example.com/files/v1:download".to_string())
            }
        );
    }

    #[test]
    fn test_parse_poll_error() {
        let response = value(
            r#"{"done": true, "error": {"code": 3, "message": "Prompt rejected"}}"#,
        );
        assert_eq!(
            parse_operation_poll(&response),
            JobPollResult::Failed("Prompt rejected".to_string())
        );
    }

    #[test]
    fn test_parse_poll_filtered() {
        let response = value(
            r#"{"done": true, "response": {"generateVideoResponse": {
                "raiMediaFilteredReasons": ["Contains a celebrity likeness"]
            }}}"#,
        );
        assert_eq!(
            parse_operation_poll(&response),
            JobPollResult::Failed("Contains a celebrity likeness".to_string())
        );
    }

    #[test]
    fn test_classify_auth_errors() {
        let body = r#"{"error":{"code":403,"message":"API key not valid"}}"#;
        assert!(matches!(
            classify_error(403, body),
            ShortsError::CredentialRejected(m) if m == "API key not valid"
        ));
        assert!(classify_error(401, "").is_credential_error());
    }

    #[test]
    fn test_classify_entity_not_found() {
        let body = r#"{"error":{"code":404,"message":"Requested entity was not found."}}"#;
        assert!(classify_error(404, body).is_credential_error());

        let other = r#"{"error":{"code":404,"message":"models/nope is not found"}}"#;
        assert!(matches!(classify_error(404, other), ShortsError::Generation(_)));
    }

    #[test]
    fn test_classify_plain_body() {
        let err = classify_error(400, "bad request");
        assert!(err.to_string().contains("400"));
        assert!(err.to_string().contains("bad request"));
    }

    #[test]
    fn test_health_without_key() {
        let provider = GeminiProvider::from_config(
            &ShortsConfig::default(),
            Arc::new(StaticCredentials::new(None)),
        );
        assert_eq!(provider.health_check().unwrap(), ProviderStatus::NoApiKey);

        let provider = GeminiProvider::from_config(
            &ShortsConfig::default(),
            Arc::new(StaticCredentials::new(Some("key".to_string()))),
        );
        assert_eq!(provider.health_check().unwrap(), ProviderStatus::Available);
    }

    #[test]
    fn test_model_urls() {
        let provider = GeminiProvider::from_config(
            &ShortsConfig::default(),
            Arc::new(StaticCredentials::new(None)),
        );
        assert_eq!(
            provider.model_url("veo-3.1-fast-generate-preview", "predictLongRunning"),
            "https://generativelanguage.googleapis.com/v1beta/models/veo-3.1-fast-generate-preview:predictLongRunning"
        );
    }

    #[test]
    fn test_request_without_key_fails_before_network() {
        let provider = GeminiProvider::from_config(
            &ShortsConfig::default(),
            Arc::new(StaticCredentials::new(None)),
        );
        let err = provider
            .generate_structured_text(&ScriptRequest {
                prompt: "topic".to_string(),
                image_count: ImageCount::Fixed(3),
            })
            .unwrap_err();
        assert!(matches!(err, ShortsError::MissingCredential(_)));
    }
}
