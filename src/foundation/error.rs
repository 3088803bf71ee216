/// Convenience result type used across Vizage.
pub type VizageResult<T> = Result<T, VizageError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum VizageError {
    /// Invalid caller input (output size, colors, empty batch, ...).
    #[error("validation error: {0}")]
    Validation(String),

    /// A sprite manifest or sprite sheet is missing or corrupt.
    #[error("missing asset: {0}")]
    MissingAsset(String),

    /// A non-empty part key has no manifest entry (strict mode only).
    #[error("unresolved part: {0}")]
    UnresolvedPart(String),

    /// The final raster could not be encoded or decoded.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Internal pipeline failure while rendering.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VizageError {
    /// Build a [`VizageError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`VizageError::MissingAsset`] value.
    pub fn missing_asset(msg: impl Into<String>) -> Self {
        Self::MissingAsset(msg.into())
    }

    /// Build a [`VizageError::UnresolvedPart`] value.
    pub fn unresolved_part(msg: impl Into<String>) -> Self {
        Self::UnresolvedPart(msg.into())
    }

    /// Build a [`VizageError::Encoding`] value.
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Build a [`VizageError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`VizageError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for VizageError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
