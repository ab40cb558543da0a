//! Image processing on top of the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` (header checked first) |
//! | **Convert** | per-format encoders, libwebp for lossy WebP |
//! | **Resize exact** | `resize_exact`, Catmull-Rom |
//! | **Resize to fit** | [`fit_within`] + `resize_exact`, Lanczos3 |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Raster**: [`DecodedImage`] and [`EncodedBuffer`]
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining policy + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod raster;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use calculations::{fit_within, pixel_count};
pub use operations::{
    ImagingError, ResizeRequest, convert, decode, default_download_format, encode_for_download,
    resize,
};
pub use params::{
    EncodeParams, EncodingPolicy, GifPolicy, JpegPolicy, PngCompression, Quality, ResampleFilter,
    ResampleParams, ResizePolicy, WebpPolicy,
};
pub use raster::{DecodedImage, EncodedBuffer, PixelMode};
pub use rust_backend::RustBackend;
