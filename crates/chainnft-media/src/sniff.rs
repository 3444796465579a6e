//! MIME sniffing from magic bytes.

/// Fallback type when no signature matches.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Sniff the MIME type of a downloaded asset from its leading bytes.
pub fn sniff_content_type(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        return "image/png";
    }
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return "image/jpeg";
    }
    if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        return "image/gif";
    }
    if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return "image/webp";
    }
    if bytes.len() >= 12 && &bytes[4..8] == b"ftyp" {
        return "video/mp4";
    }
    if bytes.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
        return "video/webm";
    }
    if looks_like_svg(bytes) {
        return "image/svg+xml";
    }
    OCTET_STREAM
}

/// SVG has no binary signature; accept markup that opens with `<svg`, or an
/// XML prolog whose head contains an `<svg` tag.
fn looks_like_svg(bytes: &[u8]) -> bool {
    let Ok(text) = std::str::from_utf8(&bytes[..bytes.len().min(512)]) else {
        return false;
    };
    let trimmed = text.trim_start();
    trimmed.starts_with("<svg") || (trimmed.starts_with("<?xml") && trimmed.contains("<svg"))
}

/// File-extension suffix for a sniffed MIME type (empty when unknown).
pub fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/png" => ".png",
        "image/jpeg" => ".jpg",
        "image/gif" => ".gif",
        "image/webp" => ".webp",
        "image/svg+xml" => ".svg",
        "video/mp4" => ".mp4",
        "video/webm" => ".webm",
        _ => "",
    }
}

/// Only image types get resize-variant predictions.
pub fn is_image(content_type: &str) -> bool {
    content_type.starts_with("image/")
}
