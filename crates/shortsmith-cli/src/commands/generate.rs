//! One-shot generation: plan, illustrate, narrate, export

use anyhow::{bail, Result};
use shortsmith_gen::CancelToken;
use shortsmith_studio::{Outcome, StudioView};
use std::path::Path;

use super::{open_studio, status_printer, ProjectArgs};

pub fn run(
    provider: Option<&str>,
    topic: &str,
    project: &ProjectArgs,
    video: bool,
    out: &str,
) -> Result<()> {
    let mut studio = open_studio(provider, topic, project)?;
    studio.subscribe(status_printer());

    println!(
        "Generating '{}' via {}...",
        topic.trim(),
        studio.service_name()
    );

    let summary = match studio.run() {
        Outcome::Done(summary) => summary,
        Outcome::Rejected(msg) => bail!("{}", msg),
        Outcome::Failed(msg) => bail!("Generation failed: {}", msg),
    };

    for (index, reason) in &summary.images_skipped {
        eprintln!("  Warning: image {} was skipped: {}", index + 1, reason);
    }
    if !summary.narration {
        eprintln!("  Warning: narration could not be generated");
    }

    println!();
    print!("{}", StudioView::project(studio.state()).render_text());
    println!();

    let out_dir = Path::new(out);
    match studio.export_archive(out_dir) {
        Outcome::Done(path) => println!("Exported: {}", path.display()),
        Outcome::Rejected(msg) | Outcome::Failed(msg) => bail!("Export failed: {}", msg),
    }

    if video {
        match studio.composite(&CancelToken::new()) {
            Outcome::Done(()) => {}
            Outcome::Rejected(msg) => bail!("Cannot composite video: {}", msg),
            Outcome::Failed(msg) => bail!("Video generation failed: {}", msg),
        }
        match studio.save_final_video(out_dir) {
            Outcome::Done(path) => println!("Video: {}", path.display()),
            Outcome::Rejected(msg) | Outcome::Failed(msg) => bail!("Could not save video: {}", msg),
        }
    }

    Ok(())
}
