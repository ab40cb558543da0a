//! # imagen
//!
//! A small image tool: take one uploaded image, optionally convert it to
//! another raster format, optionally resize it, and hand back the files to
//! download.
//!
//! # Architecture: One Pipeline
//!
//! Every combination of "convert" and "resize" goes through the same
//! function, [`pipeline::run`], driven by an explicit request:
//!
//! ```text
//! bytes → decode → convert? → resize? → encode downloads
//!                    │            │
//!                    └─ on failure the pipeline keeps the best image it has
//! ```
//!
//! At most two downloads come out of a run: the original or converted image,
//! and its resized version. Their names are fixed by [`naming`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`pipeline`] | Decode → convert → resize → downloads, with degraded fallbacks |
//! | [`imaging`] | Format conversion and resizing behind the [`imaging::ImageBackend`] trait |
//! | [`format`] | The seven selectable formats and their names, extensions and MIME types |
//! | [`naming`] | Download file names (`imagen_convertida.webp`, ...) |
//! | [`config`] | `imagen.toml` loading, merging over stock defaults, validation |
//! | [`output`] | CLI output formatting |
//! | [`preview`] | Self-contained HTML preview page rendered with Maud |
//!
//! # Design Decisions
//!
//! ## Pure-Rust Imaging, Plus libwebp
//!
//! Decoding, resizing and most encoders come from the `image` crate. Lossy
//! WebP with a quality setting is not something `image` can write, so WebP
//! output goes through the `webp` crate (bindings to libwebp).
//!
//! ## Failures Degrade, Decoding Aborts
//!
//! An upload that cannot be decoded ends the run. Anything after that (a
//! conversion the encoder rejects, a resize to zero pixels) is recorded in
//! [`pipeline::PipelineOutcome::errors`] and the user still gets every
//! download that could be produced.
//!
//! ## Thumbnails Never Upscale
//!
//! With the aspect ratio preserved, the target size is a bounding box. An
//! image that already fits is left alone; otherwise it shrinks until it
//! fits, rounding the free side to the closest aspect ratio
//! ([`imaging::fit_within`]).

pub mod config;
pub mod format;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod preview;

#[cfg(test)]
pub(crate) mod test_helpers;
