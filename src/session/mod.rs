//! Batch rendering sessions.

/// Ordered, streaming batch generation over a [`crate::PortraitRenderer`].
pub mod batch;
