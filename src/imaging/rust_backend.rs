//! Pure Rust image processing backend (plus libwebp for lossy WebP).
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (PNG, JPEG, BMP, GIF, TIFF, WebP) | `image::ImageReader` with guessed format |
//! | Decode GIF animation | `image::codecs::gif::GifDecoder::into_frames` |
//! | Encode → JPEG | `jpeg_encoder::Encoder` (quality, progressive, optimized Huffman) |
//! | Encode → PNG | `PngEncoder::new_with_quality` (adaptive filter) |
//! | Encode → WebP | `webp::Encoder::encode_advanced` (quality + method) |
//! | Encode → GIF | `GifEncoder::encode_frames` |
//! | Encode → BMP, TIFF | `DynamicImage::write_to` |
//! | Resample | `DynamicImage::resize_exact` / `imageops::resize` per frame |
//!
//! Every encoder only accepts some pixel layouts. Images are normalized to
//! the closest layout the encoder takes (same channels, 8-bit) before
//! writing, so no (mode, format) pair fails for layout reasons alone.

use super::backend::{BackendError, ImageBackend};
use super::calculations::pixel_count;
use super::params::{EncodeParams, PngCompression, Quality, ResampleParams};
use super::raster::{DecodedImage, PixelMode};
use crate::format::OutputFormat;
use image::codecs::gif::{GifDecoder, GifEncoder, Repeat};
use image::codecs::png::{FilterType as PngFilter, PngEncoder};
use image::{AnimationDecoder, ColorType, DynamicImage, Frame, ImageFormat, ImageReader, imageops};
use std::borrow::Cow;
use std::io::Cursor;

const PNG_LAYOUTS: &[ColorType] = &[
    ColorType::L8,
    ColorType::La8,
    ColorType::Rgb8,
    ColorType::Rgba8,
    ColorType::L16,
    ColorType::La16,
    ColorType::Rgb16,
    ColorType::Rgba16,
];
const BMP_LAYOUTS: &[ColorType] = &[
    ColorType::L8,
    ColorType::La8,
    ColorType::Rgb8,
    ColorType::Rgba8,
];
const TIFF_LAYOUTS: &[ColorType] = &[
    ColorType::L8,
    ColorType::Rgb8,
    ColorType::Rgba8,
    ColorType::L16,
    ColorType::Rgb16,
    ColorType::Rgba16,
];

/// Production backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert to the 8-bit layout `target`.
fn convert_to(pixels: &DynamicImage, target: ColorType) -> DynamicImage {
    match target {
        ColorType::L8 => DynamicImage::ImageLuma8(pixels.to_luma8()),
        ColorType::La8 => DynamicImage::ImageLumaA8(pixels.to_luma_alpha8()),
        ColorType::Rgb8 => DynamicImage::ImageRgb8(pixels.to_rgb8()),
        _ => DynamicImage::ImageRgba8(pixels.to_rgba8()),
    }
}

/// Borrow the pixels if the encoder takes their layout, otherwise convert
/// to the closest 8-bit layout it does take.
fn normalize<'a>(pixels: &'a DynamicImage, accepts: &[ColorType]) -> Cow<'a, DynamicImage> {
    if accepts.contains(&pixels.color()) {
        return Cow::Borrowed(pixels);
    }
    let candidates: &[ColorType] = match PixelMode::of(pixels.color()) {
        PixelMode::Luma => &[ColorType::L8, ColorType::Rgb8],
        PixelMode::LumaAlpha => &[ColorType::La8, ColorType::Rgba8],
        PixelMode::Rgb => &[ColorType::Rgb8],
        PixelMode::Rgba => &[ColorType::Rgba8],
    };
    let target = candidates
        .iter()
        .copied()
        .find(|c| accepts.contains(c))
        .unwrap_or(ColorType::Rgba8);
    Cow::Owned(convert_to(pixels, target))
}

/// JPEG has no alpha channel: drop it when allowed, refuse otherwise.
fn jpeg_pixels(image: &DecodedImage, flatten_alpha: bool) -> Result<DynamicImage, BackendError> {
    let mode = image.mode();
    if mode.has_alpha() && !flatten_alpha {
        return Err(BackendError::UnsupportedMode {
            format: "JPEG",
            mode,
        });
    }
    Ok(match mode {
        PixelMode::Luma | PixelMode::LumaAlpha => convert_to(image.pixels(), ColorType::L8),
        PixelMode::Rgb | PixelMode::Rgba => convert_to(image.pixels(), ColorType::Rgb8),
    })
}

/// JPEG stores each side as a 16-bit value.
fn jpeg_dimensions(image: &DecodedImage) -> Result<(u16, u16), BackendError> {
    let (width, height) = image.dimensions();
    match (u16::try_from(width), u16::try_from(height)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(BackendError::ProcessingFailed(format!(
            "{width}x{height} exceeds the JPEG limit of 65535 pixels per side"
        ))),
    }
}

fn encode_jpeg(
    image: &DecodedImage,
    quality: Quality,
    flatten_alpha: bool,
    progressive: bool,
    optimize: bool,
) -> Result<Vec<u8>, BackendError> {
    let (width, height) = jpeg_dimensions(image)?;
    let pixels = jpeg_pixels(image, flatten_alpha)?;
    let color = match pixels.color() {
        ColorType::L8 => jpeg_encoder::ColorType::Luma,
        _ => jpeg_encoder::ColorType::Rgb,
    };

    let mut buf = Vec::new();
    let mut encoder = jpeg_encoder::Encoder::new(&mut buf, quality.value());
    encoder.set_progressive(progressive);
    encoder.set_optimized_huffman_tables(optimize);
    encoder
        .encode(pixels.as_bytes(), width, height, color)
        .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {e}")))?;
    Ok(buf)
}

fn encode_png(image: &DecodedImage, compression: PngCompression) -> Result<Vec<u8>, BackendError> {
    let pixels = normalize(image.pixels(), PNG_LAYOUTS);
    let mut buf = Vec::new();
    let encoder =
        PngEncoder::new_with_quality(&mut buf, compression.compression_type(), PngFilter::Adaptive);
    pixels.write_with_encoder(encoder)?;
    Ok(buf)
}

fn encode_webp(
    image: &DecodedImage,
    quality: Quality,
    method: u8,
    lossless: bool,
) -> Result<Vec<u8>, BackendError> {
    let mut config = webp::WebPConfig::new().map_err(|_| {
        BackendError::ProcessingFailed("libwebp rejected its default config".into())
    })?;
    config.quality = quality.value() as f32;
    config.method = method.min(6) as i32;
    config.lossless = lossless as i32;

    let (width, height) = image.dimensions();
    let encoded = if image.mode().has_alpha() {
        let rgba = image.pixels().to_rgba8();
        webp::Encoder::from_rgba(rgba.as_raw(), width, height).encode_advanced(&config)
    } else {
        let rgb = image.pixels().to_rgb8();
        webp::Encoder::from_rgb(rgb.as_raw(), width, height).encode_advanced(&config)
    };
    let memory = encoded
        .map_err(|e| BackendError::ProcessingFailed(format!("WebP encode failed: {e:?}")))?;
    Ok(memory.to_vec())
}

fn encode_gif(image: &DecodedImage, speed: u8, all_frames: bool) -> Result<Vec<u8>, BackendError> {
    let frames: Vec<Frame> = match image.frames() {
        Some(frames) if all_frames => frames.to_vec(),
        _ => vec![Frame::new(image.pixels().to_rgba8())],
    };
    let animated = frames.len() > 1;

    let mut buf = Vec::new();
    {
        // The trailer is written when the encoder drops
        let mut encoder = GifEncoder::new_with_speed(&mut buf, speed.clamp(1, 30) as i32);
        if animated {
            encoder.set_repeat(Repeat::Infinite)?;
        }
        encoder.encode_frames(frames)?;
    }
    Ok(buf)
}

fn encode_generic(
    image: &DecodedImage,
    format: ImageFormat,
    accepts: &[ColorType],
) -> Result<Vec<u8>, BackendError> {
    let pixels = normalize(image.pixels(), accepts);
    let mut buf = Vec::new();
    pixels.write_to(&mut Cursor::new(&mut buf), format)?;
    Ok(buf)
}

/// Read the format and dimensions from the header only.
fn inspect_header(bytes: &[u8]) -> Result<(ImageFormat, u32, u32), BackendError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| BackendError::UnknownFormat(e.to_string()))?;
    let format = reader
        .format()
        .ok_or_else(|| BackendError::UnknownFormat("no known signature".into()))?;
    let (width, height) = reader.into_dimensions()?;
    Ok((format, width, height))
}

impl ImageBackend for RustBackend {
    fn decode(&self, bytes: &[u8], max_pixels: u64) -> Result<DecodedImage, BackendError> {
        let (format, width, height) = inspect_header(bytes)?;
        if pixel_count(width, height) > max_pixels {
            return Err(BackendError::TooLarge {
                width,
                height,
                limit: max_pixels,
            });
        }

        let pixels = ImageReader::with_format(Cursor::new(bytes), format).decode()?;
        let decoded = DecodedImage::new(pixels, OutputFormat::from_image_format(format));

        if format == ImageFormat::Gif {
            let frames = GifDecoder::new(Cursor::new(bytes))?
                .into_frames()
                .collect_frames()?;
            return Ok(decoded.with_frames(frames));
        }
        Ok(decoded)
    }

    fn encode(&self, image: &DecodedImage, params: &EncodeParams) -> Result<Vec<u8>, BackendError> {
        match *params {
            EncodeParams::Jpeg {
                quality,
                flatten_alpha,
                progressive,
                optimize,
            } => encode_jpeg(image, quality, flatten_alpha, progressive, optimize),
            EncodeParams::Png { compression } => encode_png(image, compression),
            EncodeParams::WebP {
                quality,
                method,
                lossless,
            } => encode_webp(image, quality, method, lossless),
            EncodeParams::Gif { speed, all_frames } => encode_gif(image, speed, all_frames),
            EncodeParams::Bmp => encode_generic(image, ImageFormat::Bmp, BMP_LAYOUTS),
            EncodeParams::Tiff => encode_generic(image, ImageFormat::Tiff, TIFF_LAYOUTS),
        }
    }

    fn resample(
        &self,
        image: &DecodedImage,
        params: &ResampleParams,
    ) -> Result<DecodedImage, BackendError> {
        let filter = params.filter.filter_type();
        let pixels = image
            .pixels()
            .resize_exact(params.width, params.height, filter);
        let resized = DecodedImage::new(pixels, image.source_format());

        match image.frames() {
            Some(frames) => {
                let frames = frames
                    .iter()
                    .map(|frame| {
                        let buffer =
                            imageops::resize(frame.buffer(), params.width, params.height, filter);
                        Frame::from_parts(buffer, 0, 0, frame.delay())
                    })
                    .collect();
                Ok(resized.with_frames(frames))
            }
            None => Ok(resized),
        }
    }
}
