use serde::{Deserialize, Serialize};

use crate::assets::atlas::{PartCategory, SpriteAtlas};
use crate::assets::manifest::SpriteEntry;
use crate::foundation::core::Rgb8;
use crate::foundation::error::{VizageError, VizageResult};
use crate::portrait::layer::LayerKind;
use crate::portrait::selection::{PortraitSelection, Tints};

const HEAD_PREFIX: &str = "head";
const EAR_PREFIX: &str = "ear";
const NECK_PREFIX: &str = "neck";

/// What to do with a non-empty part key that has no manifest entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PartPolicy {
    /// Log a warning and omit the layer.
    #[default]
    Lenient,
    /// Fail the render with [`VizageError::UnresolvedPart`].
    Strict,
}

/// A layer that resolved to a sprite region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlannedLayer<'a> {
    /// Draw step.
    pub layer: LayerKind,
    /// Region in the layer's sheet.
    pub entry: &'a SpriteEntry,
    /// Tint for this layer.
    pub tint: Rgb8,
}

/// Maps part keys onto manifest regions of a [`SpriteAtlas`].
#[derive(Clone, Copy, Debug)]
pub struct PartResolver<'a> {
    atlas: &'a SpriteAtlas,
}

impl<'a> PartResolver<'a> {
    /// Resolver over `atlas`.
    pub fn new(atlas: &'a SpriteAtlas) -> Self {
        Self { atlas }
    }

    /// Exact, case-sensitive lookup. `""` and unknown keys resolve to `None`.
    pub fn resolve(&self, category: PartCategory, part_key: &str) -> Option<&'a SpriteEntry> {
        if part_key.is_empty() {
            return None;
        }
        self.atlas.sheet(category).manifest().find(part_key)
    }

    /// First head-sheet entry whose key starts with `head` (any case).
    pub fn default_head(&self) -> Option<&'a SpriteEntry> {
        self.first_head_sheet_entry(HEAD_PREFIX)
    }

    /// First head-sheet entry whose key starts with `ear` (any case).
    pub fn default_ears(&self) -> Option<&'a SpriteEntry> {
        self.first_head_sheet_entry(EAR_PREFIX)
    }

    /// Canonical neck sprite: the first head-sheet entry whose key starts with `neck`.
    pub fn neck(&self) -> Option<&'a SpriteEntry> {
        self.first_head_sheet_entry(NECK_PREFIX)
    }

    fn first_head_sheet_entry(&self, prefix: &str) -> Option<&'a SpriteEntry> {
        self.atlas
            .sheet(PartCategory::Head)
            .manifest()
            .first_with_prefix(prefix)
    }

    /// Copy of `sel` with empty `head`/`ears` replaced by the atlas defaults.
    pub fn apply_defaults(&self, sel: &PortraitSelection) -> PortraitSelection {
        let mut out = sel.clone();
        if out.head.is_empty()
            && let Some(e) = self.default_head()
        {
            out.head = e.part_key().to_owned();
        }
        if out.ears.is_empty()
            && let Some(e) = self.default_ears()
        {
            out.ears = e.part_key().to_owned();
        }
        out
    }

    /// Resolve every layer of `order`, dropping the ones without a region.
    ///
    /// Defaults are not applied here; callers decide via [`PartResolver::apply_defaults`].
    pub fn plan(
        &self,
        sel: &PortraitSelection,
        tints: Tints,
        order: &[LayerKind],
        policy: PartPolicy,
    ) -> VizageResult<Vec<PlannedLayer<'a>>> {
        let mut out = Vec::with_capacity(order.len());
        for &layer in order {
            let tint = tints.for_channel(layer.tint_channel());
            let (key, entry) = match layer.selection_key(sel) {
                None => (NECK_PREFIX, self.neck()),
                Some("") => {
                    tracing::trace!(layer = layer.as_str(), "layer omitted");
                    continue;
                }
                Some(key) => (key, self.resolve(layer.category(), key)),
            };

            match entry {
                Some(entry) => out.push(PlannedLayer { layer, entry, tint }),
                None => {
                    let msg = format!(
                        "layer '{}' part '{key}' not found in '{}' manifest",
                        layer.as_str(),
                        layer.category()
                    );
                    match policy {
                        PartPolicy::Lenient => {
                            tracing::warn!(layer = layer.as_str(), part = key, "unresolved part omitted");
                        }
                        PartPolicy::Strict => return Err(VizageError::unresolved_part(msg)),
                    }
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/portrait/resolve.rs"]
mod tests;
