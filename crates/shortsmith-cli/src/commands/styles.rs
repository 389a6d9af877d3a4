//! List art styles

use anyhow::Result;
use shortsmith_gen::style::{DEFAULT_STYLE, PRESETS};
use shortsmith_gen::StyleGuide;

pub fn run() -> Result<()> {
    println!("Built-in styles:");
    for preset in PRESETS {
        let marker = if *preset == DEFAULT_STYLE { " (default)" } else { "" };
        println!("  {}{}", preset, marker);
    }

    let custom = StyleGuide::discover();
    if custom.is_empty() {
        println!("\nNo custom style guides found (add styles/<name>.style.toml)");
        return Ok(());
    }

    println!("\nCustom style guides:");
    for name in custom {
        match StyleGuide::find(&name) {
            Ok(guide) => println!(
                "  {}{}",
                name,
                guide
                    .description
                    .map(|d| format!(" - {}", d))
                    .unwrap_or_default()
            ),
            Err(e) => println!("  {} (invalid: {})", name, e),
        }
    }
    Ok(())
}
