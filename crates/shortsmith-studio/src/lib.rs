//! Shortsmith Studio - the short-video asset pipeline
//!
//! Owns the application state (settings, script, assets, run flags) and the
//! controller that plans a script, illustrates it prompt by prompt, narrates
//! it and composites a final video. Also provides zip export and a read-only
//! view projection.

pub mod asset;
pub mod export;
pub mod pipeline;
pub mod runner;
pub mod script;
pub mod state;
pub mod view;

pub use asset::{Asset, AssetStore};
pub use pipeline::{Outcome, RunSummary, Studio, StudioOptions};
pub use runner::{run_ordered, TaskOutcome};
pub use script::{Script, ScriptField};
pub use state::{AppState, FinalVideo, ProjectSettings, RunState, Stage};
pub use view::StudioView;
