//! Shared test utilities for the imagen test suite.
//!
//! Fixtures are generated in memory instead of read from disk, so every
//! test states the exact size and pixel mode it depends on.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let png = encode_fixture(&rgba_gradient(300, 200), ImageFormat::Png);
//! let outcome = run(&RustBackend::new(), &png, &request, &config).unwrap();
//! let artifact = find_artifact(&outcome, ArtifactKind::Converted);
//! assert_decodes_to(&artifact.buffer.bytes, (300, 200));
//! ```

use crate::naming::ArtifactKind;
use crate::pipeline::{DownloadArtifact, PipelineOutcome};
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, DynamicImage, Frame, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;

// =========================================================================
// Fixture images
// =========================================================================

/// RGB image with a horizontal/vertical gradient, so resamples are visible.
pub fn rgb_gradient(width: u32, height: u32) -> DynamicImage {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
        ])
    });
    DynamicImage::ImageRgb8(img)
}

/// RGBA gradient whose alpha falls off to the right.
pub fn rgba_gradient(width: u32, height: u32) -> DynamicImage {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            64,
            255 - (x * 255 / width.max(1)) as u8,
        ])
    });
    DynamicImage::ImageRgba8(img)
}

/// Encode a fixture with the `image` crate's stock encoder for `format`.
pub fn encode_fixture(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), format)
        .unwrap();
    bytes
}

/// Looping GIF with `frames` solid-color frames.
pub fn animated_gif(width: u32, height: u32, frames: usize) -> Vec<u8> {
    let mut bytes = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut bytes);
        encoder.set_repeat(Repeat::Infinite).unwrap();
        for i in 0..frames {
            let shade = (i * 255 / frames.max(1)) as u8;
            let buffer = RgbaImage::from_pixel(width, height, Rgba([shade, 255 - shade, 0, 255]));
            encoder
                .encode_frame(Frame::from_parts(
                    buffer,
                    0,
                    0,
                    Delay::from_numer_denom_ms(100, 1),
                ))
                .unwrap();
        }
    }
    bytes
}

// =========================================================================
// Outcome lookups — panic with a clear message on miss
// =========================================================================

/// Find the artifact of a given kind. Panics if not produced.
pub fn find_artifact(outcome: &PipelineOutcome, kind: ArtifactKind) -> &DownloadArtifact {
    outcome
        .downloads
        .iter()
        .find(|a| a.kind == kind)
        .unwrap_or_else(|| {
            let kinds: Vec<_> = outcome.downloads.iter().map(|a| a.kind).collect();
            panic!("artifact {kind:?} not produced. Available: {kinds:?}")
        })
}

/// Kinds of all produced artifacts, in order.
pub fn artifact_kinds(outcome: &PipelineOutcome) -> Vec<ArtifactKind> {
    outcome.downloads.iter().map(|a| a.kind).collect()
}

/// Decode bytes with the `image` crate and assert their size.
pub fn assert_decodes_to(bytes: &[u8], dimensions: (u32, u32)) -> DynamicImage {
    let image = image::load_from_memory(bytes)
        .unwrap_or_else(|e| panic!("buffer does not decode: {e}"));
    assert_eq!(
        (image.width(), image.height()),
        dimensions,
        "decoded size mismatch"
    );
    image
}
