//! Output encoding and batch sinks.
//!
//! Sinks consume finished portraits in input order and are used by `BatchSession::render_into`.

/// PNG encoding and `data:` URLs.
pub mod png;
/// Portrait sink trait and built-in sinks.
pub mod sink;
