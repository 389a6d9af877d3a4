//! Shortsmith Core - Foundational types shared by every shortsmith crate
//!
//! - `AssetId` - Stable identifiers for generated artifacts
//! - `ContentHash` - SHA-256 fingerprints of asset payloads
//! - Error types and Result alias

mod error;
mod hash;
mod id;

pub use error::{Result, ShortsError};
pub use hash::ContentHash;
pub use id::AssetId;
