use std::borrow::Cow;
use std::sync::Arc;

use image::RgbaImage;
use image::imageops::{self, FilterType};
use serde::{Deserialize, Serialize};

use crate::assets::atlas::SpriteAtlas;
use crate::assets::manifest::SpriteEntry;
use crate::foundation::error::{VizageError, VizageResult};
use crate::foundation::math::premultiply_rgba8_in_place;
use crate::portrait::layer::{DRAW_ORDER, LayerKind};
use crate::portrait::resolve::{PartPolicy, PartResolver};
use crate::portrait::selection::PortraitSelection;
use crate::render::blend::{over_in_place, tint_layer_in_place};
use crate::render::image::PortraitImage;

/// Largest accepted output edge, in pixels.
pub const MAX_OUTPUT_SIZE: u32 = 8192;

/// Resampling filter used when scaling sprite regions to the output size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SampleFilter {
    /// Nearest neighbour. Fast, blocky.
    Nearest,
    /// Lanczos with a window of 3. Slow, smooth.
    #[default]
    Lanczos3,
}

impl SampleFilter {
    fn filter_type(self) -> FilterType {
        match self {
            SampleFilter::Nearest => FilterType::Nearest,
            SampleFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Compositing options shared by every renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompositorOpts {
    /// Handling of part keys missing from their manifest.
    pub part_policy: PartPolicy,
    /// Fill empty `head`/`ears` with the atlas defaults.
    pub default_head_and_ears: bool,
    /// Draw the atlas backdrop (if any) under the seven layers.
    pub backdrop: bool,
}

impl Default for CompositorOpts {
    fn default() -> Self {
        Self {
            part_policy: PartPolicy::Lenient,
            default_head_and_ears: true,
            backdrop: false,
        }
    }
}

/// Reject output sizes outside `1..=MAX_OUTPUT_SIZE`.
pub fn validate_output_size(size: u32) -> VizageResult<()> {
    if size == 0 || size > MAX_OUTPUT_SIZE {
        return Err(VizageError::validation(format!(
            "output size must be in 1..={MAX_OUTPUT_SIZE}, got {size}"
        )));
    }
    Ok(())
}

/// Seven-layer hard-light tint compositor over a shared [`SpriteAtlas`].
#[derive(Clone, Debug)]
pub struct Compositor {
    atlas: Arc<SpriteAtlas>,
    opts: CompositorOpts,
    filter: SampleFilter,
}

impl Compositor {
    /// Compositor over `atlas` resampling sprites with `filter`.
    pub fn new(atlas: Arc<SpriteAtlas>, opts: CompositorOpts, filter: SampleFilter) -> Self {
        Self {
            atlas,
            opts,
            filter,
        }
    }

    /// Active options.
    pub fn opts(&self) -> CompositorOpts {
        self.opts
    }

    /// Resampling filter.
    pub fn filter(&self) -> SampleFilter {
        self.filter
    }

    /// Render `sel` as a `size x size` premultiplied image on a transparent background.
    pub fn render(&self, sel: &PortraitSelection, size: u32) -> VizageResult<PortraitImage> {
        self.render_layers(sel, size, &DRAW_ORDER)
    }

    #[tracing::instrument(skip(self, sel, order), fields(filter = ?self.filter))]
    pub(crate) fn render_layers(
        &self,
        sel: &PortraitSelection,
        size: u32,
        order: &[LayerKind],
    ) -> VizageResult<PortraitImage> {
        validate_output_size(size)?;
        let tints = sel.tints()?;

        let resolver = PartResolver::new(&self.atlas);
        let sel = if self.opts.default_head_and_ears {
            Cow::Owned(resolver.apply_defaults(sel))
        } else {
            Cow::Borrowed(sel)
        };
        let plan = resolver.plan(&sel, tints, order, self.opts.part_policy)?;

        let mut canvas = PortraitImage::transparent(size, size);
        let filter = self.filter.filter_type();

        if self.opts.backdrop
            && let Some(backdrop) = self.atlas.backdrop()
            && backdrop.width() > 0
            && backdrop.height() > 0
        {
            let mut layer = backdrop.clone();
            premultiply_rgba8_in_place(&mut layer);
            let layer = scale_premultiplied(layer, size, filter);
            over_in_place(&mut canvas.data, &layer)?;
            tracing::debug!("backdrop drawn");
        }

        for step in &plan {
            let sheet = self.atlas.sheet(step.layer.category());
            let mut layer = sample_region(sheet.image(), step.entry, size, filter);
            tint_layer_in_place(&mut layer, step.tint);
            over_in_place(&mut canvas.data, &layer)?;
            tracing::debug!(
                layer = step.layer.as_str(),
                part = step.entry.part_key(),
                "layer drawn"
            );
        }

        Ok(canvas)
    }
}

/// Crop `entry` out of a straight-alpha sheet, premultiply and scale to `size x size`.
fn sample_region(
    sheet: &RgbaImage,
    entry: &SpriteEntry,
    size: u32,
    filter: FilterType,
) -> Vec<u8> {
    let mut region = imageops::crop_imm(sheet, entry.x, entry.y, entry.width, entry.height).to_image();
    premultiply_rgba8_in_place(&mut region);
    scale_premultiplied(region, size, filter)
}

fn scale_premultiplied(image: RgbaImage, size: u32, filter: FilterType) -> Vec<u8> {
    if image.dimensions() == (size, size) {
        return image.into_raw();
    }
    let mut out = imageops::resize(&image, size, size, filter).into_raw();
    // Ringing filters can push color past alpha.
    for px in out.chunks_exact_mut(4) {
        let a = px[3];
        for c in &mut px[..3] {
            *c = (*c).min(a);
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
