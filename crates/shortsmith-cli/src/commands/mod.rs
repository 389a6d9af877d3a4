//! CLI command implementations and shared setup

pub mod check;
pub mod generate;
pub mod studio;
pub mod styles;

use anyhow::{Context, Result};
use clap::Args;
use shortsmith_core::{Result as ShortsResult, ShortsError};
use shortsmith_gen::providers::create_provider;
use shortsmith_gen::{
    AspectRatio, CredentialProvider, ImageCount, ShortsConfig, StaticCredentials, StyleGuide,
};
use shortsmith_studio::{AppState, ProjectSettings, Studio, StudioOptions};
use std::io::{self, BufRead, Write};
use std::sync::Arc;

/// Project settings shared by `generate` and `studio`
#[derive(Args, Debug, Clone, Default)]
pub struct ProjectArgs {
    /// Number of images: "auto" or 1-20
    #[arg(long)]
    pub count: Option<ImageCount>,

    /// Aspect ratio: 9:16, 16:9, 1:1, 4:3 or 3:4
    #[arg(long)]
    pub aspect: Option<AspectRatio>,

    /// Art style preset or custom guide name ("none" for no style)
    #[arg(long)]
    pub style: Option<String>,

    /// Background music style for the video
    #[arg(long, default_value = "")]
    pub music: String,
}

/// Key from config or environment, re-entered on the terminal when needed
pub struct TerminalCredentials {
    inner: StaticCredentials,
}

impl TerminalCredentials {
    pub fn new(key: Option<String>) -> Self {
        Self {
            inner: StaticCredentials::new(key),
        }
    }
}

impl CredentialProvider for TerminalCredentials {
    fn api_key(&self) -> ShortsResult<String> {
        self.inner.api_key()
    }

    fn reselect(&self) -> ShortsResult<()> {
        eprint!("Enter a Gemini API key (leave empty to cancel): ");
        io::stderr().flush()?;

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        let key = line.trim();
        if key.is_empty() {
            return Err(ShortsError::MissingCredential(
                "No API key entered".to_string(),
            ));
        }
        self.inner.set_key(Some(key.to_string()));
        Ok(())
    }
}

/// Resolve a style name, falling back to the default with a warning
pub fn resolve_style(name: &str) -> StyleGuide {
    match StyleGuide::find(name) {
        Ok(guide) => guide,
        Err(e) => {
            log::warn!("Could not load style '{}': {}", name, e);
            StyleGuide::default()
        }
    }
}

/// Merge command-line arguments over configured defaults
pub fn project_settings(config: &ShortsConfig, topic: &str, args: &ProjectArgs) -> ProjectSettings {
    let aspect_ratio = args
        .aspect
        .or_else(|| {
            config.default_aspect_ratio().and_then(|s| match s.parse() {
                Ok(ratio) => Some(ratio),
                Err(e) => {
                    log::warn!("Ignoring configured aspect ratio: {}", e);
                    None
                }
            })
        })
        .unwrap_or_default();

    let style = args
        .style
        .as_deref()
        .or_else(|| config.default_style())
        .map(resolve_style)
        .unwrap_or_default();

    ProjectSettings {
        topic: topic.to_string(),
        image_count: args.count.unwrap_or_default(),
        aspect_ratio,
        style,
        music: args.music.clone(),
    }
}

/// Load config, pick the provider and build a studio
pub fn open_studio(provider: Option<&str>, topic: &str, args: &ProjectArgs) -> Result<Studio> {
    let config = ShortsConfig::load().unwrap_or_else(|e| {
        log::warn!("Could not load config, using defaults: {}", e);
        ShortsConfig::default()
    });

    let provider_name = provider.unwrap_or_else(|| config.default_provider()).to_string();
    let credentials = Arc::new(TerminalCredentials::new(
        config.api_key(&provider_name).map(|k| k.to_string()),
    ));
    let service = create_provider(&provider_name, &config, credentials.clone())
        .with_context(|| format!("Could not create provider '{}'", provider_name))?;

    let settings = project_settings(&config, topic, args);
    Ok(Studio::new(
        service,
        credentials,
        StudioOptions::from_config(&config),
        settings,
    ))
}

/// Subscriber that prints each new status line once
pub fn status_printer() -> impl FnMut(&AppState) + 'static {
    let mut last = String::new();
    move |state: &AppState| {
        let status = &state.run.status;
        if !status.is_empty() && *status != last {
            println!("  {}", status);
            last = status.clone();
        }
    }
}
