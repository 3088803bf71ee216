use serde::{Deserialize, Serialize};

use crate::assets::color::parse_hex_color;
use crate::foundation::core::Rgb8;
use crate::foundation::error::{VizageError, VizageResult};

/// Caller-facing portrait configuration.
///
/// Part fields hold a part key (manifest file name without extension) or `""` to omit the layer.
/// There is no neck field: the neck always uses the atlas' canonical neck sprite.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortraitSelection {
    /// Front hair part key.
    #[serde(default)]
    pub hair: String,
    /// Eyebrow part key.
    #[serde(default)]
    pub brow: String,
    /// Facial hair part key.
    #[serde(default)]
    pub facial: String,
    /// Back hair part key.
    #[serde(default)]
    pub hair_back: String,
    /// Head part key; `""` selects the atlas default.
    #[serde(default)]
    pub head: String,
    /// Ears part key; `""` selects the atlas default.
    #[serde(default)]
    pub ears: String,
    /// `#RRGGBB` tint for hair, brow, facial hair and back hair.
    pub hair_color: String,
    /// `#RRGGBB` tint for head, ears and neck.
    pub skin_color: String,
}

/// Parsed tint colors of a selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tints {
    /// Hair tint.
    pub hair: Rgb8,
    /// Skin tint.
    pub skin: Rgb8,
}

impl PortraitSelection {
    /// Parse both tint colors.
    pub fn tints(&self) -> VizageResult<Tints> {
        let hair = parse_hex_color(&self.hair_color)
            .map_err(|e| VizageError::validation(format!("hairColor: {e}")))?;
        let skin = parse_hex_color(&self.skin_color)
            .map_err(|e| VizageError::validation(format!("skinColor: {e}")))?;
        Ok(Tints { hair, skin })
    }

    /// Reject selections whose colors do not parse.
    pub fn validate(&self) -> VizageResult<()> {
        self.tints().map(|_| ())
    }

    /// Read a selection from a JSON file.
    pub fn from_path(path: impl AsRef<std::path::Path>) -> VizageResult<Self> {
        use anyhow::Context as _;

        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("read selection '{}'", path.display()))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
