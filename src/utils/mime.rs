//! MIME type detection for the static-file fallback.

use std::path::Path;

/// Common MIME type constants.
pub mod types {
    pub const HTML: &str = "text/html; charset=utf-8";
    pub const PLAIN: &str = "text/plain; charset=utf-8";
    pub const CSS: &str = "text/css; charset=utf-8";
    pub const JAVASCRIPT: &str = "text/javascript; charset=utf-8";
    pub const JSON: &str = "application/json";
    pub const OCTET_STREAM: &str = "application/octet-stream";
    pub const WASM: &str = "application/wasm";
    pub const PNG: &str = "image/png";
    pub const JPEG: &str = "image/jpeg";
    pub const GIF: &str = "image/gif";
    pub const SVG: &str = "image/svg+xml";
    pub const ICO: &str = "image/x-icon";
    pub const WOFF2: &str = "font/woff2";
}

/// Detect the MIME type from a file extension.
///
/// Source maps are JSON documents, hence the `map` entry.
pub fn from_path(path: &Path) -> &'static str {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return types::OCTET_STREAM;
    };

    match ext.to_ascii_lowercase().as_str() {
        "html" | "htm" => types::HTML,
        "txt" => types::PLAIN,
        "css" => types::CSS,
        "js" | "mjs" => types::JAVASCRIPT,
        "json" | "map" => types::JSON,
        "wasm" => types::WASM,
        "png" => types::PNG,
        "jpg" | "jpeg" => types::JPEG,
        "gif" => types::GIF,
        "svg" => types::SVG,
        "ico" => types::ICO,
        "woff2" => types::WOFF2,
        _ => types::OCTET_STREAM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn detects_script_types() {
        assert_eq!(from_path(&PathBuf::from("a.js")), types::JAVASCRIPT);
        assert_eq!(from_path(&PathBuf::from("a.mjs")), types::JAVASCRIPT);
        assert_eq!(from_path(&PathBuf::from("a.js.map")), types::JSON);
    }

    #[test]
    fn unknown_extension_is_octet_stream() {
        assert_eq!(from_path(&PathBuf::from("a.xyz")), types::OCTET_STREAM);
        assert_eq!(from_path(&PathBuf::from("no-extension")), types::OCTET_STREAM);
    }
}
