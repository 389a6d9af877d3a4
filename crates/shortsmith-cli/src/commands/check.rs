//! Provider health check

use anyhow::Result;
use shortsmith_gen::providers::{available_providers, create_provider};
use shortsmith_gen::{ProviderStatus, ShortsConfig, StaticCredentials};
use std::sync::Arc;

pub fn run(provider: Option<&str>) -> Result<()> {
    let config = ShortsConfig::load()?;
    let names: Vec<String> = match provider {
        Some(name) => vec![name.to_string()],
        None => available_providers().into_iter().map(String::from).collect(),
    };

    println!("Default provider: {}", config.default_provider());
    for name in names {
        let credentials = Arc::new(StaticCredentials::new(
            config.api_key(&name).map(|k| k.to_string()),
        ));
        let status = create_provider(&name, &config, credentials).and_then(|p| p.health_check());
        let line = match status {
            Ok(ProviderStatus::Available) => "available".to_string(),
            Ok(ProviderStatus::NoApiKey) => {
                "no API key (set SHORTSMITH_API_KEY or GEMINI_API_KEY)".to_string()
            }
            Ok(ProviderStatus::Unavailable(reason)) => format!("unavailable: {}", reason),
            Err(e) => format!("error: {}", e),
        };
        println!("  {:<8} {}", name, line);
    }
    Ok(())
}
