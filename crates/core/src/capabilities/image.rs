//! Image targets, encoded through ffmpeg's image encoders.

use once_cell::sync::Lazy;
use std::collections::BTreeMap;

use super::{normalize_token, Domain, UnsupportedFormat};

/// Which encoder writes a target, and the extension of the produced file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDescriptor {
    pub encoder: &'static str,
    pub extension: &'static str,
    /// Formats that may hold animation keep every frame.
    pub animated: bool,
}

impl ImageDescriptor {
    const fn still(encoder: &'static str, extension: &'static str) -> Self {
        Self {
            encoder,
            extension,
            animated: false,
        }
    }

    const fn animated(encoder: &'static str, extension: &'static str) -> Self {
        Self {
            encoder,
            extension,
            animated: true,
        }
    }
}

static IMAGE_FORMATS: Lazy<BTreeMap<&'static str, ImageDescriptor>> = Lazy::new(|| {
    BTreeMap::from([
        ("jpeg", ImageDescriptor::still("mjpeg", "jpeg")),
        ("jpg", ImageDescriptor::still("mjpeg", "jpg")),
        ("png", ImageDescriptor::still("png", "png")),
        ("webp", ImageDescriptor::animated("libwebp", "webp")),
        ("bmp", ImageDescriptor::still("bmp", "bmp")),
        ("tiff", ImageDescriptor::still("tiff", "tiff")),
        // No HEIF encoder is assumed; HEIF/HEIC requests produce JPEG.
        ("heif", ImageDescriptor::still("mjpeg", "jpg")),
        ("heic", ImageDescriptor::still("mjpeg", "jpg")),
        ("avif", ImageDescriptor::still("libaom-av1", "avif")),
        ("gif", ImageDescriptor::animated("gif", "gif")),
    ])
});

/// Looks up the encoder for an image target.
pub fn descriptor(target: &str) -> Result<&'static ImageDescriptor, UnsupportedFormat> {
    let token = normalize_token(target);
    IMAGE_FORMATS
        .get(token.as_str())
        .ok_or_else(|| UnsupportedFormat::unknown_target(Domain::Image, token))
}

/// All image target tokens.
pub fn formats() -> Vec<&'static str> {
    IMAGE_FORMATS.keys().copied().collect()
}
