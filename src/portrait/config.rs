use serde::{Deserialize, Serialize};

use crate::assets::decode::decode_portrait;
use crate::foundation::error::{VizageError, VizageResult};
use crate::portrait::selection::PortraitSelection;
use crate::render::thumbnail::reduce;

/// Persisted portrait record.
///
/// `thumbnail` is always a PNG data URL. `full_size_image` is a data URL or, for records written
/// next to their images, a relative file name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortraitConfig {
    /// Display name; uniqueness is up to the store.
    pub name: String,
    /// Selection that produced the images. Empty for uploads.
    #[serde(default)]
    pub config: PortraitSelection,
    /// Thumbnail PNG data URL.
    pub thumbnail: String,
    /// Full-size image reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_size_image: Option<String>,
    /// Set for user-uploaded images that were never composited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded: Option<bool>,
}

impl PortraitConfig {
    /// Whether the record can be re-rendered from its selection.
    pub fn is_editable(&self) -> bool {
        !self.uploaded.unwrap_or(false)
    }

    /// Selection to reopen in an editor. Uploaded records have none.
    pub fn selection_for_edit(&self) -> VizageResult<&PortraitSelection> {
        if !self.is_editable() {
            return Err(VizageError::validation(format!(
                "portrait '{}' was uploaded and has no editable configuration",
                self.name
            )));
        }
        Ok(&self.config)
    }

    /// Build a record from an uploaded image, bypassing the compositor.
    #[tracing::instrument(skip(bytes), fields(bytes = bytes.len()))]
    pub fn from_upload(name: &str, bytes: &[u8], thumbnail_size: u32) -> VizageResult<Self> {
        let image = decode_portrait(bytes)?;
        let thumb = reduce(&image, thumbnail_size)?;
        Ok(Self {
            name: name.to_owned(),
            config: PortraitSelection::default(),
            thumbnail: thumb.to_data_url()?,
            full_size_image: Some(image.to_data_url()?),
            uploaded: Some(true),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/portrait/config.rs"]
mod tests;
