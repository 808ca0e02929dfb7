//! MIME type detection by file extension.
//!
//! Used when an upload arrives without a declared content type, and to label
//! sample images served over HTTP.

use std::path::Path;

use propscope_core::MediaType;

/// Detect MIME type by file extension.
pub fn detect_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png"          => "image/png",
        "gif"          => "image/gif",
        "webp"         => "image/webp",
        "svg"          => "image/svg+xml",
        "avif"         => "image/avif",
        "bmp"          => "image/bmp",
        "heic"         => "image/heic",
        "tiff" | "tif" => "image/tiff",
        _              => "application/octet-stream",
    }
}

/// The accepted media type for a file name, if it has one.
pub fn media_type_for_path(path: &Path) -> Option<MediaType> {
    MediaType::from_mime(detect_mime_type(path))
}
