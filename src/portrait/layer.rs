use serde::{Deserialize, Serialize};

use crate::assets::atlas::PartCategory;
use crate::foundation::core::Rgb8;
use crate::portrait::selection::{PortraitSelection, Tints};

/// Which selection color tints a layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TintChannel {
    /// `hairColor`.
    Hair,
    /// `skinColor`.
    Skin,
}

/// One of the seven fixed draw steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LayerKind {
    /// Back hair.
    HairBack,
    /// Neck (always the canonical neck sprite).
    Neck,
    /// Ears.
    Ears,
    /// Head.
    Head,
    /// Facial hair.
    Facial,
    /// Eyebrows.
    Brow,
    /// Front hair.
    Hair,
}

/// Back-to-front draw order. Reordering changes the output.
pub const DRAW_ORDER: [LayerKind; 7] = [
    LayerKind::HairBack,
    LayerKind::Neck,
    LayerKind::Ears,
    LayerKind::Head,
    LayerKind::Facial,
    LayerKind::Brow,
    LayerKind::Hair,
];

impl LayerKind {
    /// Sheet the layer samples from.
    pub fn category(self) -> PartCategory {
        match self {
            LayerKind::HairBack => PartCategory::HairBack,
            LayerKind::Neck | LayerKind::Ears | LayerKind::Head => PartCategory::Head,
            LayerKind::Facial => PartCategory::Facial,
            LayerKind::Brow => PartCategory::Brow,
            LayerKind::Hair => PartCategory::Hair,
        }
    }

    /// Color channel used to tint the layer.
    pub fn tint_channel(self) -> TintChannel {
        match self {
            LayerKind::Neck | LayerKind::Ears | LayerKind::Head => TintChannel::Skin,
            LayerKind::HairBack | LayerKind::Facial | LayerKind::Brow | LayerKind::Hair => {
                TintChannel::Hair
            }
        }
    }

    /// Selection field driving the layer; `None` for the neck.
    pub fn selection_key(self, sel: &PortraitSelection) -> Option<&str> {
        match self {
            LayerKind::HairBack => Some(&sel.hair_back),
            LayerKind::Neck => None,
            LayerKind::Ears => Some(&sel.ears),
            LayerKind::Head => Some(&sel.head),
            LayerKind::Facial => Some(&sel.facial),
            LayerKind::Brow => Some(&sel.brow),
            LayerKind::Hair => Some(&sel.hair),
        }
    }

    /// Stable lowercase name for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            LayerKind::HairBack => "hairBack",
            LayerKind::Neck => "neck",
            LayerKind::Ears => "ears",
            LayerKind::Head => "head",
            LayerKind::Facial => "facial",
            LayerKind::Brow => "brow",
            LayerKind::Hair => "hair",
        }
    }
}

impl Tints {
    /// Color for `channel`.
    pub fn for_channel(self, channel: TintChannel) -> Rgb8 {
        match channel {
            TintChannel::Hair => self.hair,
            TintChannel::Skin => self.skin,
        }
    }
}
