//! Art styles and aspect ratios
//!
//! The built-in catalogue mirrors the style picker of the studio UI. Custom
//! guides live in `styles/<name>.style.toml` or `.shortsmith/styles/` and may
//! add a prefix/suffix that is applied to every image prompt.

use serde::{Deserialize, Serialize};
use shortsmith_core::{Result, ShortsError};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Name of the "no particular style" entry
pub const NO_STYLE: &str = "none";

/// Built-in style presets, in picker order
pub const PRESETS: &[&str] = &[
    NO_STYLE,
    "Photorealistic",
    "3D Animation",
    "Impressionism",
    "Cubism",
    "Realism",
    "Surrealism",
    "Paper",
    "Expressionism",
    "Minimalism",
    "Landscape and Nature",
    "Pixel Art",
    "Cartoon and Comics",
    "Art Deco",
    "Geometric and Fractal Art",
    "Pop Art",
    "Renaissance",
    "Sci-Fi and Fantasy",
    "Portrait",
    "Flat Design",
    "Isometric",
    "Watercolor",
    "Sketch",
    "Vincent van Gogh Style",
    "Claude Monet Style",
    "Pablo Picasso Style",
    "Salvador Dalí Style",
    "Frida Kahlo Style",
];

/// Preset selected when nothing is configured
pub const DEFAULT_STYLE: &str = "Photorealistic";

const STYLE_DIRS: &[&str] = &["styles", ".shortsmith/styles"];

/// Output frame shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "9:16")]
    Portrait9x16,
    #[serde(rename = "16:9")]
    Landscape16x9,
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "4:3")]
    Classic4x3,
    #[serde(rename = "3:4")]
    Tall3x4,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 5] = [
        AspectRatio::Portrait9x16,
        AspectRatio::Landscape16x9,
        AspectRatio::Square,
        AspectRatio::Classic4x3,
        AspectRatio::Tall3x4,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Portrait9x16 => "9:16",
            AspectRatio::Landscape16x9 => "16:9",
            AspectRatio::Square => "1:1",
            AspectRatio::Classic4x3 => "4:3",
            AspectRatio::Tall3x4 => "3:4",
        }
    }

    /// Ratio accepted by video synthesis, which only renders 9:16 and 16:9
    pub fn for_video(&self) -> AspectRatio {
        match self {
            AspectRatio::Landscape16x9 => AspectRatio::Landscape16x9,
            _ => AspectRatio::Portrait9x16,
        }
    }

    /// Width and height scaled so the long side equals `long_side`
    pub fn dimensions(&self, long_side: u32) -> (u32, u32) {
        let (w, h) = match self {
            AspectRatio::Portrait9x16 => (9, 16),
            AspectRatio::Landscape16x9 => (16, 9),
            AspectRatio::Square => (1, 1),
            AspectRatio::Classic4x3 => (4, 3),
            AspectRatio::Tall3x4 => (3, 4),
        };
        if w >= h {
            (long_side, (long_side * h / w).max(1))
        } else {
            ((long_side * w / h).max(1), long_side)
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = ShortsError;

    fn from_str(s: &str) -> Result<Self> {
        AspectRatio::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == s.trim())
            .ok_or_else(|| {
                ShortsError::Validation(format!(
                    "Unknown aspect ratio '{}'. Use one of: 9:16, 16:9, 1:1, 4:3, 3:4",
                    s
                ))
            })
    }
}

/// A visual style applied to script and image generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleGuide {
    /// Display name, also what the model is told to draw in
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Prepended to every image prompt
    #[serde(default)]
    pub prompt_prefix: Option<String>,
    /// Appended to every image prompt
    #[serde(default)]
    pub prompt_suffix: Option<String>,
}

/// TOML file wrapper
#[derive(Debug, Deserialize)]
struct StyleFile {
    style: StyleGuide,
}

impl StyleGuide {
    /// The "no style" guide
    pub fn none() -> Self {
        Self::named(NO_STYLE)
    }

    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            prompt_prefix: None,
            prompt_suffix: None,
        }
    }

    /// Look up a built-in preset (case-insensitive)
    pub fn preset(name: &str) -> Option<Self> {
        PRESETS
            .iter()
            .find(|p| p.eq_ignore_ascii_case(name.trim()))
            .map(|p| Self::named(p))
    }

    /// Load a custom style guide from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let file: StyleFile = toml::from_str(&content).map_err(|e| {
            ShortsError::TomlParse(format!(
                "Failed to parse style guide {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(file.style)
    }

    /// Resolve a style by name: presets first, then custom guide files
    pub fn find(name: &str) -> Result<Self> {
        if let Some(preset) = Self::preset(name) {
            return Ok(preset);
        }

        let candidates: Vec<PathBuf> = STYLE_DIRS
            .iter()
            .map(|dir| Path::new(dir).join(format!("{}.style.toml", name)))
            .collect();

        for candidate in &candidates {
            if candidate.exists() {
                return Self::load(candidate);
            }
        }

        Err(ShortsError::Validation(format!(
            "Style '{}' is neither a preset nor a guide file (searched: {})",
            name,
            candidates
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )))
    }

    /// Names of custom guides found in the standard style directories
    pub fn discover() -> Vec<String> {
        let mut names = Vec::new();
        for dir in STYLE_DIRS {
            let Ok(entries) = std::fs::read_dir(dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let file_name = entry.file_name();
                if let Some(stem) = file_name
                    .to_str()
                    .and_then(|n| n.strip_suffix(".style.toml"))
                {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        names.dedup();
        names
    }

    pub fn is_none(&self) -> bool {
        self.name.eq_ignore_ascii_case(NO_STYLE)
    }

    /// Enrich an image prompt with the guide's prefix and suffix
    pub fn enrich_prompt(&self, base_prompt: &str) -> String {
        let mut parts = Vec::new();
        if let Some(ref prefix) = self.prompt_prefix {
            parts.push(prefix.as_str());
        }
        parts.push(base_prompt);
        if let Some(ref suffix) = self.prompt_suffix {
            parts.push(suffix.as_str());
        }
        parts.join(". ")
    }
}

impl Default for StyleGuide {
    fn default() -> Self {
        Self::named(DEFAULT_STYLE)
    }
}

impl fmt::Display for StyleGuide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_style(content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("shortsmith_style_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("noir.style.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_aspect_ratio_parse_and_display() {
        for ratio in AspectRatio::ALL {
            assert_eq!(ratio.as_str().parse::<AspectRatio>().unwrap(), ratio);
        }
        assert!("2:1".parse::<AspectRatio>().is_err());
        assert_eq!(AspectRatio::default(), AspectRatio::Portrait9x16);
    }

    #[test]
    fn test_video_ratio_fallback() {
        assert_eq!(AspectRatio::Landscape16x9.for_video(), AspectRatio::Landscape16x9);
        assert_eq!(AspectRatio::Portrait9x16.for_video(), AspectRatio::Portrait9x16);
        assert_eq!(AspectRatio::Square.for_video(), AspectRatio::Portrait9x16);
        assert_eq!(AspectRatio::Classic4x3.for_video(), AspectRatio::Portrait9x16);
    }

    #[test]
    fn test_dimensions() {
        assert_eq!(AspectRatio::Portrait9x16.dimensions(64), (36, 64));
        assert_eq!(AspectRatio::Landscape16x9.dimensions(64), (64, 36));
        assert_eq!(AspectRatio::Square.dimensions(64), (64, 64));
    }

    #[test]
    fn test_preset_lookup() {
        let style = StyleGuide::preset("pixel art").unwrap();
        assert_eq!(style.name, "Pixel Art");
        assert!(!style.is_none());
        assert!(StyleGuide::preset("None").unwrap().is_none());
        assert!(StyleGuide::preset("vaporwave").is_none());
    }

    #[test]
    fn test_load_custom_guide() {
        let path = temp_style(
            r#"
[style]
name = "Film Noir"
description = "High contrast black and white"
prompt_prefix = "Film noir still"
prompt_suffix = "dramatic shadows, 35mm grain"
"#,
        );
        let style = StyleGuide::load(&path).unwrap();
        assert_eq!(style.name, "Film Noir");

        let enriched = style.enrich_prompt("a detective under a streetlight");
        assert_eq!(
            enriched,
            "Film noir still. a detective under a streetlight. dramatic shadows, 35mm grain"
        );

        std::fs::remove_file(&path).ok();
        std::fs::remove_dir(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_preset_does_not_alter_prompt() {
        let style = StyleGuide::default();
        assert_eq!(style.enrich_prompt("steaming fish cake skewers"), "steaming fish cake skewers");
    }

    #[test]
    fn test_unknown_style_not_found() {
        assert!(StyleGuide::find("nonexistent_style_xyz").is_err());
    }
}
