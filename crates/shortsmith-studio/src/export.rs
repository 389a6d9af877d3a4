//! Zip export of a finished project
//!
//! The archive holds `project_info.txt` and one entry per stored asset with
//! the decoded bytes. The final video is saved next to it, not inside.

use shortsmith_core::{Result, ShortsError};
use std::fmt::Write as _;
use std::fs;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::state::AppState;

pub const PROJECT_INFO_FILE: &str = "project_info.txt";
const FALLBACK_STEM: &str = "shorts";

/// File stem derived from a title, safe to use as a single path component
pub fn file_stem(title: &str) -> String {
    let cleaned: String = title
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let cleaned = cleaned.trim_matches('.').trim();
    if cleaned.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        cleaned.to_string()
    }
}

pub fn archive_name(title: &str) -> String {
    format!("{}.zip", file_stem(title))
}

pub fn video_file_name(title: &str) -> String {
    format!("{}.mp4", file_stem(title))
}

/// Text summary written as `project_info.txt`
pub fn project_info(state: &AppState) -> Result<String> {
    let script = state
        .script
        .as_ref()
        .ok_or_else(|| ShortsError::Precondition("Nothing to export yet".to_string()))?;
    let settings = &state.settings;

    let music = if settings.music.trim().is_empty() {
        "-"
    } else {
        settings.music.trim()
    };

    let mut info = String::new();
    let _ = writeln!(info, "Title: {}", script.title);
    let _ = writeln!(info, "Topic: {}", settings.topic);
    let _ = writeln!(info, "Aspect ratio: {}", settings.aspect_ratio);
    let _ = writeln!(info, "Style: {}", settings.style.name);
    let _ = writeln!(info, "Music: {}", music);
    let _ = writeln!(info);
    let _ = writeln!(info, "[Hook]\n{}\n", script.hook);
    let _ = writeln!(info, "[Body]\n{}\n", script.body);
    let _ = writeln!(info, "[Conclusion]\n{}\n", script.conclusion);

    let _ = writeln!(info, "[Image prompts]");
    for (i, prompt) in script.image_prompts.iter().enumerate() {
        let _ = writeln!(info, "{}. {}", i + 1, prompt);
    }

    if !state.assets.is_empty() {
        let _ = writeln!(info, "\n[Assets]");
        for asset in state.assets.iter() {
            let _ = writeln!(
                info,
                "{}  {}  {} bytes",
                asset.file_name(),
                asset.hash.to_prefixed_hex(),
                asset.size_bytes
            );
        }
    }

    Ok(info)
}

/// Write the archive to `writer` and hand the writer back
pub fn write_archive<W: Write + Seek>(state: &AppState, writer: W) -> Result<W> {
    let info = project_info(state)?;
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut zip = ZipWriter::new(writer);
    zip.start_file(PROJECT_INFO_FILE, options).map_err(archive_err)?;
    zip.write_all(info.as_bytes())?;

    for asset in state.assets.iter() {
        let bytes = asset.bytes()?;
        zip.start_file(asset.file_name(), options).map_err(archive_err)?;
        zip.write_all(&bytes)?;
    }

    zip.finish().map_err(archive_err)
}

/// Write `{title}.zip` into `dir` and return its path
pub fn export_archive(state: &AppState, dir: &Path) -> Result<PathBuf> {
    let title = state
        .script
        .as_ref()
        .map(|s| s.title.as_str())
        .unwrap_or_default();

    fs::create_dir_all(dir)?;
    let path = dir.join(archive_name(title));
    let file = fs::File::create(&path)?;
    if let Err(e) = write_archive(state, file) {
        if let Err(cleanup) = fs::remove_file(&path) {
            log::warn!("Could not remove partial archive {}: {}", path.display(), cleanup);
        }
        return Err(e);
    }

    log::info!("Exported {} assets to {}", state.assets.len(), path.display());
    Ok(path)
}

fn archive_err(e: zip::result::ZipError) -> ShortsError {
    ShortsError::Archive(e.to_string())
}
