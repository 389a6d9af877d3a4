//! Stable asset identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ShortsError;

const NARRATION_SENTINEL: &str = "audio-main";
const IMAGE_PREFIX: &str = "img-";

/// Identifier of a generated asset.
///
/// Images are keyed by the index of the script prompt they illustrate, so
/// regenerating index `i` always lands on `img-{i}`. There is a single
/// narration slot. The derived ordering lists images by index, then narration.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum AssetId {
    Image(usize),
    Narration,
}

impl AssetId {
    /// Image index, if this is an image id
    pub fn image_index(&self) -> Option<usize> {
        match self {
            AssetId::Image(index) => Some(*index),
            AssetId::Narration => None,
        }
    }

    /// Suggested file name inside an export archive.
    ///
    /// Image file names are 1-based (`image_1.png` for `img-0`).
    pub fn file_name(&self) -> String {
        match self {
            AssetId::Image(index) => format!("image_{}.png", index + 1),
            AssetId::Narration => "narration.wav".to_string(),
        }
    }
}

impl fmt::Debug for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetId({})", self)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetId::Image(index) => write!(f, "{}{}", IMAGE_PREFIX, index),
            AssetId::Narration => write!(f, "{}", NARRATION_SENTINEL),
        }
    }
}

impl FromStr for AssetId {
    type Err = ShortsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == NARRATION_SENTINEL {
            return Ok(AssetId::Narration);
        }
        s.strip_prefix(IMAGE_PREFIX)
            .and_then(|n| n.parse::<usize>().ok())
            .map(AssetId::Image)
            .ok_or_else(|| ShortsError::Validation(format!("Invalid asset id: {}", s)))
    }
}

impl From<AssetId> for String {
    fn from(id: AssetId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for AssetId {
    type Error = ShortsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_ids_derive_from_index() {
        assert_eq!(AssetId::Image(0).to_string(), "img-0");
        assert_eq!(AssetId::Image(12).to_string(), "img-12");
        assert_ne!(AssetId::Image(1), AssetId::Image(2));
    }

    #[test]
    fn test_narration_sentinel() {
        assert_eq!(AssetId::Narration.to_string(), "audio-main");
        assert_eq!(AssetId::Narration.file_name(), "narration.wav");
        assert_eq!(AssetId::Narration.image_index(), None);
    }

    #[test]
    fn test_file_names_are_one_based() {
        assert_eq!(AssetId::Image(0).file_name(), "image_1.png");
        assert_eq!(AssetId::Image(2).file_name(), "image_3.png");
    }

    #[test]
    fn test_parse() {
        assert_eq!("img-7".parse::<AssetId>().unwrap(), AssetId::Image(7));
        assert_eq!("audio-main".parse::<AssetId>().unwrap(), AssetId::Narration);
        assert!("img-x".parse::<AssetId>().is_err());
        assert!("video".parse::<AssetId>().is_err());
    }

    #[test]
    fn test_ordering_lists_images_by_index_then_narration() {
        let mut ids = vec![
            AssetId::Narration,
            AssetId::Image(10),
            AssetId::Image(2),
            AssetId::Image(0),
        ];
        ids.sort();
        assert_eq!(
            ids,
            vec![
                AssetId::Image(0),
                AssetId::Image(2),
                AssetId::Image(10),
                AssetId::Narration
            ]
        );
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&AssetId::Image(3)).unwrap();
        assert_eq!(json, "\"img-3\"");
        let parsed: AssetId = serde_json::from_str("\"audio-main\"").unwrap();
        assert_eq!(parsed, AssetId::Narration);
    }
}
