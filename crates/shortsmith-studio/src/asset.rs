//! Generated assets and the store that owns them

use serde::{Deserialize, Serialize};
use shortsmith_core::{AssetId, ContentHash, Result};
use shortsmith_gen::{AssetKind, InlineData};
use std::collections::BTreeMap;

/// One generated image or the narration track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub id: AssetId,
    pub kind: AssetKind,
    pub mime_type: String,
    /// Base64 payload as returned by the service
    pub data: String,
    /// Hash of the decoded bytes
    pub hash: ContentHash,
    pub size_bytes: usize,
}

impl Asset {
    /// Image asset for prompt `index`
    pub fn image(index: usize, payload: &InlineData) -> Result<Self> {
        Self::from_payload(AssetId::Image(index), AssetKind::Image, payload)
    }

    /// The narration asset
    pub fn narration(payload: &InlineData) -> Result<Self> {
        Self::from_payload(AssetId::Narration, AssetKind::Audio, payload)
    }

    fn from_payload(id: AssetId, kind: AssetKind, payload: &InlineData) -> Result<Self> {
        let bytes = payload.decode()?;
        Ok(Self {
            id,
            kind,
            mime_type: payload.mime_type.clone(),
            data: payload.data.clone(),
            hash: ContentHash::of(&bytes),
            size_bytes: bytes.len(),
        })
    }

    /// Suggested file name inside an export
    pub fn file_name(&self) -> String {
        self.id.file_name()
    }

    pub fn payload(&self) -> InlineData {
        InlineData {
            mime_type: self.mime_type.clone(),
            data: self.data.clone(),
        }
    }

    /// `data:` URL for direct display
    pub fn display_ref(&self) -> String {
        self.payload().data_url()
    }

    pub fn bytes(&self) -> Result<Vec<u8>> {
        self.payload().decode()
    }
}

/// Owns every asset, keyed by identifier.
///
/// Inserting under an existing identifier replaces the old asset, so there is
/// at most one image per index and at most one narration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetStore {
    assets: BTreeMap<AssetId, Asset>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove any asset with the same identifier, then insert
    pub fn replace(&mut self, asset: Asset) -> Option<Asset> {
        let previous = self.assets.remove(&asset.id);
        self.assets.insert(asset.id, asset);
        previous
    }

    pub fn get(&self, id: AssetId) -> Option<&Asset> {
        self.assets.get(&id)
    }

    pub fn image(&self, index: usize) -> Option<&Asset> {
        self.get(AssetId::Image(index))
    }

    pub fn narration(&self) -> Option<&Asset> {
        self.get(AssetId::Narration)
    }

    /// Images in index order
    pub fn images(&self) -> impl Iterator<Item = &Asset> {
        self.assets.values().filter(|a| a.kind == AssetKind::Image)
    }

    /// Lowest-index image, used as the video seed
    pub fn first_image(&self) -> Option<&Asset> {
        self.images().next()
    }

    pub fn image_count(&self) -> usize {
        self.images().count()
    }

    /// All assets: images by index, then narration
    pub fn iter(&self) -> impl Iterator<Item = &Asset> {
        self.assets.values()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn clear(&mut self) {
        self.assets.clear();
    }
}
