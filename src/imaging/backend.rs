//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three operations every backend must
//! support: decode, encode, and resample. Policy (which quality, which
//! kernel, when to flatten alpha) is decided upstream in
//! [`operations`](super::operations); a backend only executes the fully
//! resolved parameters it is handed.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate with libwebp for lossy WebP.

use super::params::{EncodeParams, ResampleParams};
use super::raster::{DecodedImage, PixelMode};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("unrecognized image data: {0}")]
    UnknownFormat(String),
    #[error("image is {width}x{height}, above the {limit} pixel limit")]
    TooLarge { width: u32, height: u32, limit: u64 },
    #[error("{format} cannot store pixel mode {mode}")]
    UnsupportedMode {
        format: &'static str,
        mode: PixelMode,
    },
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// Trait for image processing backends.
///
/// Implementations must never mutate the image they are given; every
/// operation returns a new value.
pub trait ImageBackend {
    /// Decode uploaded bytes. Images above `max_pixels` are rejected from
    /// the header, before the full decode.
    fn decode(&self, bytes: &[u8], max_pixels: u64) -> Result<DecodedImage, BackendError>;

    /// Encode an image in memory.
    fn encode(&self, image: &DecodedImage, params: &EncodeParams)
    -> Result<Vec<u8>, BackendError>;

    /// Resample to exactly the requested size, every frame included.
    fn resample(
        &self,
        image: &DecodedImage,
        params: &ResampleParams,
    ) -> Result<DecodedImage, BackendError>;
}
