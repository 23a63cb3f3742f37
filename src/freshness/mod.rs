//! Mtime-based staleness detection.
//!
//! An artifact is fresh only when it exists and its modification time is
//! strictly newer than that of every dependency the last build read.

mod check;
mod mtime;

pub use check::is_fresh;
pub use mtime::get_mtime;
