//! High-level image operations.
//!
//! These functions combine policy with backend execution. They decide what
//! the backend should do (which encoder settings, which target size, which
//! kernel), call it, and wrap failures into the three user-facing error
//! kinds of [`ImagingError`].
//!
//! None of them mutate their input. A failed resize therefore leaves the
//! caller holding the untouched original, which is what the pipeline falls
//! back to.

use super::backend::{BackendError, ImageBackend};
use super::calculations::{fit_within, pixel_count};
use super::params::{EncodeParams, EncodingPolicy, ResampleParams, ResizePolicy};
use super::raster::{DecodedImage, EncodedBuffer};
use crate::format::OutputFormat;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImagingError {
    #[error("could not load the image: {0}")]
    Decode(#[source] BackendError),
    #[error("error converting to {format}: {source}")]
    Conversion {
        format: OutputFormat,
        #[source]
        source: BackendError,
    },
    #[error("error resizing to {width}x{height}: {reason}")]
    Resize {
        width: u32,
        height: u32,
        reason: String,
    },
}

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, ImagingError>;

/// Target box for a resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeRequest {
    pub width: u32,
    pub height: u32,
    /// Fit inside the box keeping the aspect ratio instead of stretching.
    pub preserve_ratio: bool,
}

impl ResizeRequest {
    pub fn new(width: u32, height: u32, preserve_ratio: bool) -> Self {
        Self {
            width,
            height,
            preserve_ratio,
        }
    }
}

/// Decode uploaded bytes.
pub fn decode(backend: &impl ImageBackend, bytes: &[u8], max_pixels: u64) -> Result<DecodedImage> {
    backend
        .decode(bytes, max_pixels)
        .map_err(ImagingError::Decode)
}

/// Plan an encode without executing it.
///
/// Useful for testing which settings a format gets.
pub fn plan_encode(format: OutputFormat, policy: &EncodingPolicy) -> EncodeParams {
    match format {
        OutputFormat::Jpg | OutputFormat::Jpeg => EncodeParams::Jpeg {
            quality: policy.jpeg.quality,
            flatten_alpha: policy.jpeg.flatten_alpha,
            progressive: policy.jpeg.progressive,
            optimize: policy.jpeg.optimize,
        },
        OutputFormat::Png => EncodeParams::Png {
            compression: policy.png,
        },
        OutputFormat::WebP => EncodeParams::WebP {
            quality: policy.webp.quality,
            method: policy.webp.method,
            lossless: policy.webp.lossless,
        },
        OutputFormat::Gif => EncodeParams::Gif {
            speed: policy.gif.speed,
            all_frames: true,
        },
        OutputFormat::Bmp => EncodeParams::Bmp,
        OutputFormat::Tiff => EncodeParams::Tiff,
    }
}

/// Re-encode an image into `format` in memory.
///
/// Images with alpha headed for JPEG are flattened to opaque pixels first
/// (or rejected, when the policy disables flattening).
pub fn convert(
    backend: &impl ImageBackend,
    image: &DecodedImage,
    format: OutputFormat,
    policy: &EncodingPolicy,
) -> Result<EncodedBuffer> {
    let params = plan_encode(format, policy);
    tracing::debug!(?params, mode = %image.mode(), "encoding {}", format);

    let bytes = backend
        .encode(image, &params)
        .map_err(|source| ImagingError::Conversion { format, source })?;
    Ok(EncodedBuffer::new(bytes, format))
}

/// Format used to download an image that has no declared source format.
///
/// PNG keeps transparency; everything else goes out as JPEG.
pub fn default_download_format(image: &DecodedImage) -> OutputFormat {
    if image.mode().has_alpha() {
        OutputFormat::Png
    } else {
        OutputFormat::Jpeg
    }
}

/// Encode an image for download in its own format, or the default one.
pub fn encode_for_download(
    backend: &impl ImageBackend,
    image: &DecodedImage,
    policy: &EncodingPolicy,
) -> Result<EncodedBuffer> {
    let format = image
        .source_format()
        .unwrap_or_else(|| default_download_format(image));
    convert(backend, image, format, policy)
}

/// Plan a resize without executing it.
///
/// Returns `Ok(None)` when an aspect-preserving resize has nothing to do
/// because the image already fits the box.
pub fn plan_resize(
    dimensions: (u32, u32),
    request: &ResizeRequest,
    policy: &ResizePolicy,
) -> Result<Option<ResampleParams>> {
    let fail = |reason: String| ImagingError::Resize {
        width: request.width,
        height: request.height,
        reason,
    };

    if request.width == 0 || request.height == 0 {
        return Err(fail("width and height must be at least 1".into()));
    }

    let (target, filter) = if request.preserve_ratio {
        match fit_within(dimensions, (request.width, request.height)) {
            Some(size) => (size, policy.thumbnail_filter),
            None => return Ok(None),
        }
    } else {
        ((request.width, request.height), policy.exact_filter)
    };

    if pixel_count(target.0, target.1) > policy.max_pixels {
        return Err(fail(format!(
            "result would exceed the {} pixel limit",
            policy.max_pixels
        )));
    }

    Ok(Some(ResampleParams {
        width: target.0,
        height: target.1,
        filter,
    }))
}

/// Resize an image, either stretched to the exact box or fitted inside it.
///
/// The input is left untouched; on error the caller still owns it.
pub fn resize(
    backend: &impl ImageBackend,
    image: &DecodedImage,
    request: &ResizeRequest,
    policy: &ResizePolicy,
) -> Result<DecodedImage> {
    let Some(params) = plan_resize(image.dimensions(), request, policy)? else {
        tracing::debug!("image already fits {}x{}", request.width, request.height);
        return Ok(image.clone());
    };

    backend
        .resample(image, &params)
        .map_err(|e| ImagingError::Resize {
            width: request.width,
            height: request.height,
            reason: e.to_string(),
        })
}
