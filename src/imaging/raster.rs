//! In-memory image types passed between the pipeline stages.
//!
//! - [`DecodedImage`] — pixels plus the facts downstream steps need: pixel
//!   mode, size, the format it came from and, for animated GIFs, every frame.
//! - [`EncodedBuffer`] — bytes in one [`OutputFormat`], ready to download or
//!   to decode again for a preview.

use crate::format::OutputFormat;
use image::{ColorType, DynamicImage, Frame};
use serde::Serialize;
use std::fmt;

/// Pixel representation, collapsed to the four layouts that matter for
/// format decisions. Bit depth is available from the pixels themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PixelMode {
    #[serde(rename = "L")]
    Luma,
    #[serde(rename = "LA")]
    LumaAlpha,
    #[serde(rename = "RGB")]
    Rgb,
    #[serde(rename = "RGBA")]
    Rgba,
}

impl PixelMode {
    pub fn of(color: ColorType) -> Self {
        match (color.has_color(), color.has_alpha()) {
            (false, false) => Self::Luma,
            (false, true) => Self::LumaAlpha,
            (true, false) => Self::Rgb,
            (true, true) => Self::Rgba,
        }
    }

    pub fn has_alpha(self) -> bool {
        matches!(self, Self::LumaAlpha | Self::Rgba)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Luma => "L",
            Self::LumaAlpha => "LA",
            Self::Rgb => "RGB",
            Self::Rgba => "RGBA",
        }
    }
}

impl fmt::Display for PixelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded raster owned by one pipeline run.
#[derive(Clone)]
pub struct DecodedImage {
    pixels: DynamicImage,
    source_format: Option<OutputFormat>,
    frames: Option<Vec<Frame>>,
}

impl DecodedImage {
    pub fn new(pixels: DynamicImage, source_format: Option<OutputFormat>) -> Self {
        Self {
            pixels,
            source_format,
            frames: None,
        }
    }

    /// Attach animation frames. Single-frame lists are dropped: a one-frame
    /// animation is just a still image.
    pub fn with_frames(mut self, frames: Vec<Frame>) -> Self {
        self.frames = if frames.len() > 1 { Some(frames) } else { None };
        self
    }

    /// Replace the recorded source format, keeping pixels and frames.
    pub fn with_source_format(mut self, format: Option<OutputFormat>) -> Self {
        self.source_format = format;
        self
    }

    pub fn pixels(&self) -> &DynamicImage {
        &self.pixels
    }

    pub fn mode(&self) -> PixelMode {
        PixelMode::of(self.pixels.color())
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    pub fn source_format(&self) -> Option<OutputFormat> {
        self.source_format
    }

    /// Animation frames, present only for multi-frame sources.
    pub fn frames(&self) -> Option<&[Frame]> {
        self.frames.as_deref()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.as_ref().map_or(1, Vec::len)
    }
}

impl fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedImage")
            .field("mode", &self.mode())
            .field("width", &self.width())
            .field("height", &self.height())
            .field("source_format", &self.source_format)
            .field("frames", &self.frame_count())
            .finish()
    }
}

/// Encoded bytes tagged with the format they were written in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBuffer {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
}

impl EncodedBuffer {
    pub fn new(bytes: Vec<u8>, format: OutputFormat) -> Self {
        Self { bytes, format }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn extension(&self) -> &'static str {
        self.format.extension()
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}
