use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{VizageError, VizageResult};

const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "webp", "gif"];

/// Named rectangular region inside a category's sprite sheet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpriteEntry {
    /// Unique (per category) file name, e.g. `hair01.png`.
    pub file_name: String,
    /// Left edge in sheet pixels.
    pub x: u32,
    /// Top edge in sheet pixels.
    pub y: u32,
    /// Region width in pixels.
    pub width: u32,
    /// Region height in pixels.
    pub height: u32,
}

impl SpriteEntry {
    /// Part key used by selections: the file name without its image extension.
    pub fn part_key(&self) -> &str {
        strip_image_extension(&self.file_name)
    }
}

/// Strip a trailing image extension (`.png`, `.jpg`, `.jpeg`, `.webp`, `.gif`; any case).
pub fn strip_image_extension(file_name: &str) -> &str {
    match file_name.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && IMAGE_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known)) =>
        {
            stem
        }
        _ => file_name,
    }
}

/// Ordered sprite entries for one part category.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpriteManifest {
    entries: Vec<SpriteEntry>,
}

impl SpriteManifest {
    /// Build a manifest, rejecting duplicate file names and empty regions.
    pub fn new(entries: Vec<SpriteEntry>) -> VizageResult<Self> {
        let mut seen = HashSet::with_capacity(entries.len());
        for e in &entries {
            if !seen.insert(e.file_name.as_str()) {
                return Err(VizageError::missing_asset(format!(
                    "corrupt manifest: duplicate fileName '{}'",
                    e.file_name
                )));
            }
            if e.width == 0 || e.height == 0 {
                return Err(VizageError::missing_asset(format!(
                    "corrupt manifest: '{}' has an empty region",
                    e.file_name
                )));
            }
        }
        Ok(Self { entries })
    }

    /// Parse a JSON array of [`SpriteEntry`] records.
    pub fn from_json(bytes: &[u8]) -> VizageResult<Self> {
        let entries: Vec<SpriteEntry> = serde_json::from_slice(bytes)
            .map_err(|e| VizageError::missing_asset(format!("corrupt manifest: {e}")))?;
        Self::new(entries)
    }

    /// Entries in manifest order.
    pub fn entries(&self) -> &[SpriteEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact, case-sensitive lookup by part key.
    pub fn find(&self, part_key: &str) -> Option<&SpriteEntry> {
        self.entries.iter().find(|e| e.part_key() == part_key)
    }

    /// First entry whose part key starts with `prefix`, ignoring ASCII case.
    pub fn first_with_prefix(&self, prefix: &str) -> Option<&SpriteEntry> {
        self.entries.iter().find(|e| {
            let key = e.part_key();
            key.len() >= prefix.len()
                && key.is_char_boundary(prefix.len())
                && key[..prefix.len()].eq_ignore_ascii_case(prefix)
        })
    }

    /// Fail unless every region lies within a `width x height` sheet.
    pub(crate) fn check_bounds(&self, width: u32, height: u32) -> VizageResult<()> {
        for e in &self.entries {
            let right = u64::from(e.x) + u64::from(e.width);
            let bottom = u64::from(e.y) + u64::from(e.height);
            if right > u64::from(width) || bottom > u64::from(height) {
                return Err(VizageError::missing_asset(format!(
                    "corrupt manifest: '{}' ({},{} {}x{}) exceeds sheet {width}x{height}",
                    e.file_name, e.x, e.y, e.width, e.height
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/manifest.rs"]
mod tests;
