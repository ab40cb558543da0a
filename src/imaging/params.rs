//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which decides how a format should be written or how big an image should
//! become) and the [`backend`](super::backend) (which does the actual pixel
//! work). The separation lets tests swap in a recording mock backend without
//! changing operation logic.
//!
//! ## Types
//!
//! - [`Quality`] — Lossy encoding quality (1–100, default 70). Clamped on construction.
//! - [`PngCompression`] — Deflate effort for PNG output.
//! - [`ResampleFilter`] — Resampling kernel, serializable for config files.
//! - [`EncodingPolicy`] — Per-format settings the converter applies.
//! - [`EncodeParams`] — One fully-resolved encode call for the backend.
//! - [`ResampleParams`] — One fully-resolved resample call for the backend.

use image::codecs::png::CompressionType;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u8) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(70)
    }
}

/// Deflate effort for PNG output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PngCompression {
    Fast,
    Default,
    #[default]
    Best,
}

impl PngCompression {
    pub fn compression_type(self) -> CompressionType {
        match self {
            Self::Fast => CompressionType::Fast,
            Self::Default => CompressionType::Default,
            Self::Best => CompressionType::Best,
        }
    }
}

/// Resampling kernel used when resizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResampleFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl ResampleFilter {
    pub fn filter_type(self) -> FilterType {
        match self {
            Self::Nearest => FilterType::Nearest,
            Self::Triangle => FilterType::Triangle,
            Self::CatmullRom => FilterType::CatmullRom,
            Self::Gaussian => FilterType::Gaussian,
            Self::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// JPEG settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JpegPolicy {
    pub quality: Quality,
    /// Drop the alpha channel before encoding. When false, images with alpha
    /// are rejected instead.
    pub flatten_alpha: bool,
    /// Write a progressive (multi-scan) file instead of baseline.
    pub progressive: bool,
    /// Build Huffman tables from the image instead of using the standard ones.
    pub optimize: bool,
}

/// WebP settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WebpPolicy {
    pub quality: Quality,
    /// Encoder effort, 0 (fast) to 6 (smallest output).
    pub method: u8,
    pub lossless: bool,
}

/// GIF settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GifPolicy {
    /// NeuQuant sampling speed, 1 (best palette) to 30 (fastest).
    pub speed: u8,
}

/// Format-specific settings applied by the converter.
///
/// The defaults are the canonical policy: JPEG q70 progressive with
/// optimized Huffman tables, PNG best compression,
/// WebP q70 at maximum effort, GIF keeping every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodingPolicy {
    pub jpeg: JpegPolicy,
    pub png: PngCompression,
    pub webp: WebpPolicy,
    pub gif: GifPolicy,
}

impl Default for EncodingPolicy {
    fn default() -> Self {
        Self {
            jpeg: JpegPolicy {
                quality: Quality::new(70),
                flatten_alpha: true,
                progressive: true,
                optimize: true,
            },
            png: PngCompression::Best,
            webp: WebpPolicy {
                quality: Quality::new(70),
                method: 6,
                lossless: false,
            },
            gif: GifPolicy { speed: 10 },
        }
    }
}

/// Resize settings applied by the resizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizePolicy {
    /// Kernel for aspect-preserving (thumbnail) resizes.
    pub thumbnail_filter: ResampleFilter,
    /// Kernel for exact resizes.
    pub exact_filter: ResampleFilter,
    /// Largest output `width * height` the resizer will produce.
    pub max_pixels: u64,
}

impl Default for ResizePolicy {
    fn default() -> Self {
        Self {
            thumbnail_filter: ResampleFilter::Lanczos3,
            exact_filter: ResampleFilter::CatmullRom,
            max_pixels: 100_000_000,
        }
    }
}

/// A fully-resolved encode call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeParams {
    Jpeg {
        quality: Quality,
        flatten_alpha: bool,
        progressive: bool,
        optimize: bool,
    },
    Png {
        compression: PngCompression,
    },
    WebP {
        quality: Quality,
        method: u8,
        lossless: bool,
    },
    Gif {
        speed: u8,
        /// Write every animation frame rather than only the first.
        all_frames: bool,
    },
    Bmp,
    Tiff,
}

/// A fully-resolved resample call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResampleParams {
    pub width: u32,
    pub height: u32,
    pub filter: ResampleFilter,
}
