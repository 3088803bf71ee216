//! Vizage renders layered character portraits from tinted sprite sheets.
//!
//! A portrait is seven sprite layers (back hair, neck, ears, head, facial hair, brows, front hair)
//! sampled from shared sheets, tinted with a hard-light blend, masked back to each sprite's alpha
//! and painted back to front onto a transparent canvas. The public API is renderer-oriented:
//!
//! - Load a [`SpriteAtlas`] once and share it behind an `Arc`
//! - Create a [`PreviewRenderer`] or [`BatchRenderer`] (or [`create_renderer`])
//! - Render single [`PortraitSelection`]s, or stream many through a [`BatchSession`] into a
//!   [`PortraitSink`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod foundation;

/// Output encoding and batch sinks.
pub mod encode;
pub(crate) mod portrait;
pub(crate) mod render;
/// Batch rendering sessions.
pub mod session;

#[cfg(test)]
#[path = "../tests/unit/fixture.rs"]
pub(crate) mod test_fixture;

pub use crate::foundation::core::Rgb8;
pub use crate::foundation::error::{VizageError, VizageResult};

pub use crate::assets::atlas::{BACKDROP_STEM, PartCategory, SpriteAtlas, SpriteSheet, load_category};
pub use crate::assets::color::parse_hex_color;
pub use crate::assets::manifest::{SpriteEntry, SpriteManifest};
pub use crate::encode::png::PNG_MAGIC;
pub use crate::encode::sink::{DirectorySink, InMemorySink, JsonLinesSink, PortraitSink, SinkConfig};
pub use crate::portrait::config::PortraitConfig;
pub use crate::portrait::layer::{DRAW_ORDER, LayerKind, TintChannel};
pub use crate::portrait::resolve::{PartPolicy, PartResolver, PlannedLayer};
pub use crate::portrait::sampler::SelectionSampler;
pub use crate::portrait::selection::{PortraitSelection, Tints};
pub use crate::render::backend::{
    BatchRenderer, PortraitRenderer, PreviewRenderer, RendererKind, create_renderer,
};
pub use crate::render::compositor::{
    Compositor, CompositorOpts, MAX_OUTPUT_SIZE, SampleFilter, validate_output_size,
};
pub use crate::render::image::PortraitImage;
pub use crate::render::thumbnail::reduce as reduce_thumbnail;
pub use crate::session::batch::{
    BatchEntry, BatchItem, BatchIter, BatchOpts, BatchSession, BatchStats, EncodedPortrait,
};
