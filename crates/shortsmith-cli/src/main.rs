//! Shortsmith CLI - turn a topic into short-form video assets

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{check, generate, studio, styles, ProjectArgs};

#[derive(Parser)]
#[command(name = "shortsmith")]
#[command(about = "Generate scripts, images, narration and videos for short-form content", long_about = None)]
#[command(version)]
struct Cli {
    /// Generative provider (gemini or mock); defaults to the configured one
    #[arg(long, global = true)]
    provider: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a script, images and narration for a topic, then export them
    Generate {
        /// What the short is about
        topic: String,

        #[command(flatten)]
        project: ProjectArgs,

        /// Also composite the final video
        #[arg(long)]
        video: bool,

        /// Directory for the archive and video
        #[arg(short, long, default_value = ".")]
        out: String,
    },

    /// Interactive session: edit the script, regenerate assets, export
    Studio {
        /// Starting topic
        topic: Option<String>,

        #[command(flatten)]
        project: ProjectArgs,
    },

    /// List built-in and custom art styles
    Styles,

    /// Check provider availability and API key presence
    Check,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let provider = cli.provider.as_deref();

    match cli.command {
        Commands::Generate {
            topic,
            project,
            video,
            out,
        } => generate::run(provider, &topic, &project, video, &out),
        Commands::Studio { topic, project } => studio::run(provider, topic, &project),
        Commands::Styles => styles::run(),
        Commands::Check => check::run(provider),
    }
}
