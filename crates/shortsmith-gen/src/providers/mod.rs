//! Provider registry
//!
//! Maps provider names to concrete implementations.

pub mod gemini;
pub mod mock;

use shortsmith_core::{Result, ShortsError};
use std::sync::Arc;

use crate::config::ShortsConfig;
use crate::credential::CredentialProvider;
use crate::provider::GenerativeService;

/// Create a provider by name with configuration
pub fn create_provider(
    name: &str,
    config: &ShortsConfig,
    credentials: Arc<dyn CredentialProvider>,
) -> Result<Box<dyn GenerativeService>> {
    if !config.is_enabled(name) {
        return Err(ShortsError::Validation(format!(
            "Provider '{}' is disabled in configuration",
            name
        )));
    }

    match name {
        "mock" => Ok(Box::new(mock::MockService::new())),
        "gemini" => Ok(Box::new(gemini::GeminiProvider::from_config(config, credentials))),
        _ => Err(ShortsError::Validation(format!(
            "Unknown provider '{}'. Available: {}",
            name,
            available_providers().join(", ")
        ))),
    }
}

/// List all available provider names
pub fn available_providers() -> Vec<&'static str> {
    vec!["gemini", "mock"]
}
