use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::assets::atlas::SpriteAtlas;
use crate::foundation::error::VizageResult;
use crate::portrait::selection::PortraitSelection;
use crate::render::compositor::{Compositor, CompositorOpts, SampleFilter};
use crate::render::image::PortraitImage;

/// A renderer turning a [`PortraitSelection`] into a square [`PortraitImage`].
///
/// Implementations share only the read-only atlas, so one renderer may serve many threads.
pub trait PortraitRenderer: Send + Sync {
    /// Render `sel` at `size x size`.
    fn render(&self, sel: &PortraitSelection, size: u32) -> VizageResult<PortraitImage>;

    /// Which renderer this is.
    fn kind(&self) -> RendererKind;
}

/// Available renderer kinds.
///
/// Both follow the same layer contract; they differ only in resampling quality.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RendererKind {
    /// Interactive preview (nearest-neighbour resampling).
    Preview,
    /// Offline batch generation (Lanczos resampling).
    #[default]
    Batch,
}

impl RendererKind {
    fn filter(self) -> SampleFilter {
        match self {
            RendererKind::Preview => SampleFilter::Nearest,
            RendererKind::Batch => SampleFilter::Lanczos3,
        }
    }
}

/// Interactive renderer.
#[derive(Clone, Debug)]
pub struct PreviewRenderer {
    compositor: Compositor,
}

impl PreviewRenderer {
    /// Preview renderer over `atlas`.
    pub fn new(atlas: Arc<SpriteAtlas>, opts: CompositorOpts) -> Self {
        Self {
            compositor: Compositor::new(atlas, opts, RendererKind::Preview.filter()),
        }
    }

    /// Render and encode as PNG bytes.
    pub fn render_png(&self, sel: &PortraitSelection, size: u32) -> VizageResult<Vec<u8>> {
        self.compositor.render(sel, size)?.encode_png()
    }

    /// Render and encode as a PNG data URL.
    pub fn render_data_url(&self, sel: &PortraitSelection, size: u32) -> VizageResult<String> {
        self.compositor.render(sel, size)?.to_data_url()
    }
}

impl PortraitRenderer for PreviewRenderer {
    fn render(&self, sel: &PortraitSelection, size: u32) -> VizageResult<PortraitImage> {
        self.compositor.render(sel, size)
    }

    fn kind(&self) -> RendererKind {
        RendererKind::Preview
    }
}

/// Batch renderer.
#[derive(Clone, Debug)]
pub struct BatchRenderer {
    compositor: Compositor,
}

impl BatchRenderer {
    /// Batch renderer over `atlas`.
    pub fn new(atlas: Arc<SpriteAtlas>, opts: CompositorOpts) -> Self {
        Self {
            compositor: Compositor::new(atlas, opts, RendererKind::Batch.filter()),
        }
    }
}

impl PortraitRenderer for BatchRenderer {
    fn render(&self, sel: &PortraitSelection, size: u32) -> VizageResult<PortraitImage> {
        self.compositor.render(sel, size)
    }

    fn kind(&self) -> RendererKind {
        RendererKind::Batch
    }
}

/// Create a renderer implementation.
pub fn create_renderer(
    kind: RendererKind,
    atlas: Arc<SpriteAtlas>,
    opts: CompositorOpts,
) -> Box<dyn PortraitRenderer> {
    match kind {
        RendererKind::Preview => Box::new(PreviewRenderer::new(atlas, opts)),
        RendererKind::Batch => Box::new(BatchRenderer::new(atlas, opts)),
    }
}
