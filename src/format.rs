//! Selectable output formats and the names derived from them.
//!
//! Every format the user can pick maps to exactly three derived strings:
//!
//! | Format | Encoder name | Extension | MIME |
//! |---|---|---|---|
//! | `png` | `PNG` | `png` | `image/png` |
//! | `jpg` | `JPEG` | `jpg` | `image/jpeg` |
//! | `jpeg` | `JPEG` | `jpeg` | `image/jpeg` |
//! | `bmp` | `BMP` | `bmp` | `image/bmp` |
//! | `gif` | `GIF` | `gif` | `image/gif` |
//! | `tiff` | `TIFF` | `tiff` | `image/tiff` |
//! | `webp` | `WEBP` | `webp` | `image/webp` |
//!
//! `jpg` and `jpeg` are kept apart so the name the user picked is the one that
//! ends up in the file extension. Both share one encoder and one MIME type.

use image::ImageFormat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported format '{0}' (expected one of: png, jpg, jpeg, bmp, gif, tiff, webp)")]
pub struct FormatError(pub String);

/// A raster format the user can convert to or upload from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpg,
    Jpeg,
    Bmp,
    Gif,
    Tiff,
    #[serde(rename = "webp")]
    WebP,
}

impl OutputFormat {
    /// All selectable formats, in selector order. The first entry is the default.
    pub const ALL: [OutputFormat; 7] = [
        OutputFormat::Png,
        OutputFormat::Jpg,
        OutputFormat::Jpeg,
        OutputFormat::Bmp,
        OutputFormat::Gif,
        OutputFormat::Tiff,
        OutputFormat::WebP,
    ];

    /// Lowercase name as shown in the selector. Also the file extension.
    pub fn name(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpg => "jpg",
            Self::Jpeg => "jpeg",
            Self::Bmp => "bmp",
            Self::Gif => "gif",
            Self::Tiff => "tiff",
            Self::WebP => "webp",
        }
    }

    /// Uppercase name handed to the encoder. `jpg` collapses to `JPEG`.
    pub fn encoder_name(self) -> &'static str {
        match self {
            Self::Png => "PNG",
            Self::Jpg | Self::Jpeg => "JPEG",
            Self::Bmp => "BMP",
            Self::Gif => "GIF",
            Self::Tiff => "TIFF",
            Self::WebP => "WEBP",
        }
    }

    pub fn extension(self) -> &'static str {
        self.name()
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpg | Self::Jpeg => "image/jpeg",
            Self::Bmp => "image/bmp",
            Self::Gif => "image/gif",
            Self::Tiff => "image/tiff",
            Self::WebP => "image/webp",
        }
    }

    pub fn is_jpeg(self) -> bool {
        matches!(self, Self::Jpg | Self::Jpeg)
    }

    /// The `image` crate format used to encode and decode this format.
    pub fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpg | Self::Jpeg => ImageFormat::Jpeg,
            Self::Bmp => ImageFormat::Bmp,
            Self::Gif => ImageFormat::Gif,
            Self::Tiff => ImageFormat::Tiff,
            Self::WebP => ImageFormat::WebP,
        }
    }

    /// Map a detected container format back to a selectable one.
    ///
    /// Formats the `image` crate can read but the selector does not offer
    /// (ICO, PNM, ...) return `None`; downloads then fall back to the default
    /// chosen from the pixel mode.
    pub fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Png => Some(Self::Png),
            ImageFormat::Jpeg => Some(Self::Jpeg),
            ImageFormat::Bmp => Some(Self::Bmp),
            ImageFormat::Gif => Some(Self::Gif),
            ImageFormat::Tiff => Some(Self::Tiff),
            ImageFormat::WebP => Some(Self::WebP),
            _ => None,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.encoder_name())
    }
}

impl FromStr for OutputFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().trim_start_matches('.');
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| FormatError(s.to_string()))
    }
}
