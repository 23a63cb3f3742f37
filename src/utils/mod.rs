//! Small shared helpers: MIME detection and path normalization.

pub mod mime;
pub mod path;

pub use path::normalize_path;
