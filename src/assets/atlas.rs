use std::path::Path;
use std::sync::Arc;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::assets::decode::decode_rgba8;
use crate::assets::manifest::{SpriteEntry, SpriteManifest};
use crate::foundation::error::{VizageError, VizageResult};

/// File stem of the optional backdrop image at the atlas root.
pub const BACKDROP_STEM: &str = "suit";

/// Sprite group backed by one manifest and one sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PartCategory {
    /// Front hair.
    Hair,
    /// Eyebrows.
    Brow,
    /// Facial hair.
    Facial,
    /// Hair drawn behind the head.
    HairBack,
    /// Heads, ears and the neck.
    Head,
}

impl PartCategory {
    /// All categories, in sheet index order.
    pub const ALL: [PartCategory; 5] = [
        PartCategory::Hair,
        PartCategory::Brow,
        PartCategory::Facial,
        PartCategory::HairBack,
        PartCategory::Head,
    ];

    /// Asset file stem (`<stem>.json`, `<stem>.png`).
    pub fn as_str(self) -> &'static str {
        match self {
            PartCategory::Hair => "hair",
            PartCategory::Brow => "brow",
            PartCategory::Facial => "facial",
            PartCategory::HairBack => "hairBack",
            PartCategory::Head => "head",
        }
    }

    fn index(self) -> usize {
        match self {
            PartCategory::Hair => 0,
            PartCategory::Brow => 1,
            PartCategory::Facial => 2,
            PartCategory::HairBack => 3,
            PartCategory::Head => 4,
        }
    }
}

impl std::fmt::Display for PartCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PartCategory {
    type Err = VizageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PartCategory::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| VizageError::validation(format!("unknown part category '{s}'")))
    }
}

/// One category's manifest plus its decoded straight-alpha sheet.
#[derive(Clone, Debug)]
pub struct SpriteSheet {
    category: PartCategory,
    manifest: SpriteManifest,
    image: Arc<RgbaImage>,
}

impl SpriteSheet {
    /// Pair a manifest with its sheet, checking that every region lies within the image.
    pub fn new(
        category: PartCategory,
        manifest: SpriteManifest,
        image: RgbaImage,
    ) -> VizageResult<Self> {
        manifest
            .check_bounds(image.width(), image.height())
            .map_err(|e| VizageError::missing_asset(format!("{category}: {e}")))?;
        Ok(Self {
            category,
            manifest,
            image: Arc::new(image),
        })
    }

    /// Category this sheet belongs to.
    pub fn category(&self) -> PartCategory {
        self.category
    }

    /// Sprite regions in manifest order.
    pub fn manifest(&self) -> &SpriteManifest {
        &self.manifest
    }

    /// Backing straight-alpha pixels.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}

/// Read `<root>/<category>.json` and `<root>/<category>.png` into a [`SpriteSheet`].
#[tracing::instrument(skip(root), fields(root = %root.display()))]
pub fn load_category(root: &Path, category: PartCategory) -> VizageResult<SpriteSheet> {
    let manifest_path = root.join(format!("{}.json", category.as_str()));
    let image_path = root.join(format!("{}.png", category.as_str()));

    let manifest_bytes = read_asset(&manifest_path)?;
    let manifest = SpriteManifest::from_json(&manifest_bytes).map_err(|e| {
        VizageError::missing_asset(format!("{}: {e}", manifest_path.display()))
    })?;

    let image_bytes = read_asset(&image_path)?;
    let image = decode_rgba8(&image_bytes).map_err(|e| {
        VizageError::missing_asset(format!("{}: {e}", image_path.display()))
    })?;

    let sheet = SpriteSheet::new(category, manifest, image)?;
    tracing::debug!(
        sprites = sheet.manifest.len(),
        width = sheet.image.width(),
        height = sheet.image.height(),
        "loaded sprite sheet"
    );
    Ok(sheet)
}

fn read_asset(path: &Path) -> VizageResult<Vec<u8>> {
    std::fs::read(path)
        .map_err(|e| VizageError::missing_asset(format!("read '{}': {e}", path.display())))
}

/// Read-only sprite atlas: one sheet per [`PartCategory`] and an optional backdrop.
///
/// Loading is eager, so asset failures surface at construction rather than at first render.
/// Share it across renderers and threads behind an `Arc`.
#[derive(Clone, Debug)]
pub struct SpriteAtlas {
    sheets: [SpriteSheet; 5],
    backdrop: Option<Arc<RgbaImage>>,
}

impl SpriteAtlas {
    /// Build an atlas from in-memory sheets. Every category must be present exactly once.
    pub fn new(sheets: impl IntoIterator<Item = SpriteSheet>) -> VizageResult<Self> {
        let mut slots: [Option<SpriteSheet>; 5] = Default::default();
        for sheet in sheets {
            let slot = &mut slots[sheet.category.index()];
            if slot.is_some() {
                return Err(VizageError::validation(format!(
                    "sprite sheet for '{}' given twice",
                    sheet.category
                )));
            }
            *slot = Some(sheet);
        }

        let [hair, brow, facial, hair_back, head] = slots;
        let take = |slot: Option<SpriteSheet>, category: PartCategory| {
            slot.ok_or_else(|| {
                VizageError::missing_asset(format!("no sprite sheet for '{category}'"))
            })
        };

        Ok(Self {
            sheets: [
                take(hair, PartCategory::Hair)?,
                take(brow, PartCategory::Brow)?,
                take(facial, PartCategory::Facial)?,
                take(hair_back, PartCategory::HairBack)?,
                take(head, PartCategory::Head)?,
            ],
            backdrop: None,
        })
    }

    /// Load all five categories from `root`, plus `suit.png` when present.
    #[tracing::instrument(skip(root), fields(root = %root.as_ref().display()))]
    pub fn load(root: impl AsRef<Path>) -> VizageResult<Self> {
        let root = root.as_ref();
        let sheets = PartCategory::ALL
            .into_iter()
            .map(|category| load_category(root, category))
            .collect::<VizageResult<Vec<_>>>()?;
        let mut atlas = Self::new(sheets)?;

        let backdrop_path = root.join(format!("{BACKDROP_STEM}.png"));
        if backdrop_path.is_file() {
            let bytes = read_asset(&backdrop_path)?;
            let image = decode_rgba8(&bytes).map_err(|e| {
                VizageError::missing_asset(format!("{}: {e}", backdrop_path.display()))
            })?;
            atlas = atlas.with_backdrop(image);
        }

        tracing::info!(
            sprites = atlas.sheets.iter().map(|s| s.manifest.len()).sum::<usize>(),
            backdrop = atlas.backdrop.is_some(),
            "sprite atlas ready"
        );
        Ok(atlas)
    }

    /// Attach a backdrop image composited under every layer when enabled.
    pub fn with_backdrop(mut self, image: RgbaImage) -> Self {
        self.backdrop = Some(Arc::new(image));
        self
    }

    /// Sheet for `category`.
    pub fn sheet(&self, category: PartCategory) -> &SpriteSheet {
        &self.sheets[category.index()]
    }

    /// Optional straight-alpha backdrop.
    pub fn backdrop(&self) -> Option<&RgbaImage> {
        self.backdrop.as_deref()
    }

    /// Part keys of `category` in manifest order.
    pub fn part_keys(&self, category: PartCategory) -> Vec<&str> {
        self.sheet(category)
            .manifest
            .entries()
            .iter()
            .map(SpriteEntry::part_key)
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/atlas.rs"]
mod tests;
