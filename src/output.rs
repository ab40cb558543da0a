//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Output leads with what the user got (image mode, size, downloads), with
//! file names and byte counts as indented context lines. Paths only appear
//! once files have actually been written.
//!
//! # Output Format
//!
//! ## Run
//!
//! ```text
//! Source
//!     RGBA 300x200 (PNG)
//! Stages
//!     no image → loaded → converted → resized → ready for download
//! Downloads
//! 001 Converted image → imagen_convertida.webp
//!     image/webp, 300x200, 5120 bytes
//! 002 Converted and resized image → imagen_convertida_redimensionada.webp
//!     image/webp, 150x100, 1830 bytes
//! ```
//!
//! Recoverable errors follow under an `Errors` header.
//!
//! ## Inspect
//!
//! ```text
//! photo.png
//!     Mode: RGBA
//!     Size: 300x200
//!     Format: PNG
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::format::OutputFormat;
use crate::imaging::DecodedImage;
use crate::pipeline::{PipelineOutcome, Stage};
use std::path::{Path, PathBuf};

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn size(width: u32, height: u32) -> String {
    format!("{}x{}", width, height)
}

fn stage_label(stage: Stage) -> &'static str {
    match stage {
        Stage::NoImage => "no image",
        Stage::Loaded => "loaded",
        Stage::Converted => "converted",
        Stage::Resized => "resized",
        Stage::ReadyForDownload => "ready for download",
    }
}

/// One-line image description: mode, size, format and frame count.
///
/// ```text
/// RGBA 300x200 (PNG)
/// RGB 40x20 (GIF, 3 frames)
/// L 10x10
/// ```
fn image_line(image: &DecodedImage) -> String {
    let mut line = format!("{} {}", image.mode(), size(image.width(), image.height()));
    match (image.source_format(), image.frame_count()) {
        (Some(format), 1) => line.push_str(&format!(" ({})", format)),
        (Some(format), n) => line.push_str(&format!(" ({}, {} frames)", format, n)),
        (None, 1) => {}
        (None, n) => line.push_str(&format!(" ({} frames)", n)),
    }
    line
}

// ============================================================================
// Run output
// ============================================================================

/// Format the result of a pipeline run.
pub fn format_run_output(outcome: &PipelineOutcome) -> Vec<String> {
    let mut lines = vec![
        "Source".to_string(),
        format!("{}{}", indent(1), image_line(&outcome.original)),
        "Stages".to_string(),
        format!(
            "{}{}",
            indent(1),
            outcome
                .stages
                .iter()
                .map(|s| stage_label(*s))
                .collect::<Vec<_>>()
                .join(" \u{2192} ")
        ),
    ];

    lines.push("Downloads".to_string());
    if outcome.downloads.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for (i, artifact) in outcome.downloads.iter().enumerate() {
        lines.push(format!(
            "{} {} \u{2192} {}",
            format_index(i + 1),
            artifact.kind.label(),
            artifact.file_name
        ));
        lines.push(format!(
            "{}{}, {}, {} bytes",
            indent(1),
            artifact.mime_type(),
            size(artifact.width, artifact.height),
            artifact.buffer.len()
        ));
    }

    if !outcome.errors.is_empty() {
        lines.push("Errors".to_string());
        for error in &outcome.errors {
            lines.push(format!("{}{}", indent(1), error));
        }
    }
    lines
}

/// Print run output to stdout.
pub fn print_run_output(outcome: &PipelineOutcome) {
    for line in format_run_output(outcome) {
        println!("{}", line);
    }
}

/// Format the list of files written to disk.
pub fn format_saved_files(written: &[PathBuf], preview: Option<&Path>) -> Vec<String> {
    let mut lines = vec![format!("Wrote {} downloads", written.len())];
    for path in written {
        lines.push(format!("{}{}", indent(1), path.display()));
    }
    if let Some(preview) = preview {
        lines.push(format!("Preview \u{2192} {}", preview.display()));
    }
    lines
}

/// Print the written files to stdout.
pub fn print_saved_files(written: &[PathBuf], preview: Option<&Path>) {
    for line in format_saved_files(written, preview) {
        println!("{}", line);
    }
}

// ============================================================================
// Inspect output
// ============================================================================

/// Format what is known about a decoded upload.
pub fn format_inspect_output(name: &str, image: &DecodedImage) -> Vec<String> {
    let format = image
        .source_format()
        .map_or_else(|| "unknown".to_string(), |f| f.to_string());
    let mut lines = vec![
        name.to_string(),
        format!("{}Mode: {}", indent(1), image.mode()),
        format!("{}Size: {}", indent(1), size(image.width(), image.height())),
        format!("{}Format: {}", indent(1), format),
    ];
    if image.frame_count() > 1 {
        lines.push(format!("{}Frames: {}", indent(1), image.frame_count()));
    }
    lines
}

pub fn print_inspect_output(name: &str, image: &DecodedImage) {
    for line in format_inspect_output(name, image) {
        println!("{}", line);
    }
}

// ============================================================================
// Formats output
// ============================================================================

/// Format the table of selectable output formats.
///
/// ```text
/// PNG   .png   image/png
/// JPG   .jpg   image/jpeg
/// ```
pub fn format_formats_list() -> Vec<String> {
    OutputFormat::ALL
        .iter()
        .map(|f| {
            format!(
                "{:<5} .{:<5} {}",
                f.name().to_uppercase(),
                f.extension(),
                f.mime_type()
            )
        })
        .collect()
}

pub fn print_formats_list() {
    for line in format_formats_list() {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImagenConfig;
    use crate::imaging::{ImageBackend, ResizeRequest, RustBackend};
    use crate::pipeline::{self, PipelineRequest};
    use crate::test_helpers::*;
    use image::{DynamicImage, ImageFormat};

    fn outcome(bytes: &[u8], convert: bool, resize: Option<ResizeRequest>) -> PipelineOutcome {
        let request = PipelineRequest {
            format: OutputFormat::WebP,
            convert,
            resize,
        };
        pipeline::run(&RustBackend::new(), bytes, &request, &ImagenConfig::default()).unwrap()
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    #[test]
    fn format_index_pads_to_three() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(999), "999");
    }

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    #[test]
    fn image_line_variants() {
        let plain = DecodedImage::new(DynamicImage::new_luma8(10, 10), None);
        assert_eq!(image_line(&plain), "L 10x10");

        let png = DecodedImage::new(DynamicImage::new_rgba8(300, 200), Some(OutputFormat::Png));
        assert_eq!(image_line(&png), "RGBA 300x200 (PNG)");
    }

    #[test]
    fn image_line_counts_frames() {
        let gif = RustBackend::new()
            .decode(&animated_gif(8, 4, 3), u64::MAX)
            .unwrap();
        assert_eq!(image_line(&gif), "RGBA 8x4 (GIF, 3 frames)");
    }

    // =========================================================================
    // Run output
    // =========================================================================

    #[test]
    fn run_output_lists_downloads_in_order() {
        let png = encode_fixture(&rgba_gradient(300, 200), ImageFormat::Png);
        let lines = format_run_output(&outcome(
            &png,
            true,
            Some(ResizeRequest::new(150, 150, true)),
        ));

        assert_eq!(lines[0], "Source");
        assert_eq!(lines[1], "    RGBA 300x200 (PNG)");
        assert_eq!(
            lines[3],
            "    no image \u{2192} loaded \u{2192} converted \u{2192} resized \u{2192} ready for download"
        );
        assert_eq!(lines[4], "Downloads");
        assert_eq!(lines[5], "001 Converted image \u{2192} imagen_convertida.webp");
        assert!(lines[6].starts_with("    image/webp, 300x200, "));
        assert_eq!(
            lines[7],
            "002 Converted and resized image \u{2192} imagen_convertida_redimensionada.webp"
        );
        assert!(lines[8].starts_with("    image/webp, 150x100, "));
        assert!(!lines.contains(&"Errors".to_string()));
    }

    #[test]
    fn run_output_shows_errors() {
        let png = encode_fixture(&rgb_gradient(20, 20), ImageFormat::Png);
        let lines = format_run_output(&outcome(&png, false, Some(ResizeRequest::new(0, 5, true))));

        let errors_at = lines.iter().position(|l| l == "Errors").unwrap();
        assert!(lines[errors_at + 1].starts_with("    "));
        assert!(lines[errors_at + 1].contains("0x5"));
    }

    #[test]
    fn saved_files_with_preview() {
        let written = vec![PathBuf::from("out/imagen_original.png")];
        let lines = format_saved_files(&written, Some(Path::new("out/preview.html")));
        assert_eq!(
            lines,
            vec![
                "Wrote 1 downloads".to_string(),
                "    out/imagen_original.png".to_string(),
                "Preview \u{2192} out/preview.html".to_string(),
            ]
        );
    }

    // =========================================================================
    // Inspect and formats
    // =========================================================================

    #[test]
    fn inspect_output_for_still_image() {
        let image = DecodedImage::new(DynamicImage::new_rgb8(64, 48), Some(OutputFormat::Jpeg));
        assert_eq!(
            format_inspect_output("photo.jpeg", &image),
            vec![
                "photo.jpeg",
                "    Mode: RGB",
                "    Size: 64x48",
                "    Format: JPEG",
            ]
        );
    }

    #[test]
    fn inspect_output_unknown_format() {
        let image = DecodedImage::new(DynamicImage::new_luma_a8(2, 2), None);
        let lines = format_inspect_output("x", &image);
        assert_eq!(lines[3], "    Format: unknown");
    }

    #[test]
    fn formats_list_has_every_selectable_format() {
        let lines = format_formats_list();
        assert_eq!(lines.len(), OutputFormat::ALL.len());
        assert_eq!(lines[0], "PNG   .png   image/png");
        assert!(lines.iter().any(|l| l.starts_with("JPG   .jpg   image/jpeg")));
        assert!(lines.iter().any(|l| l.starts_with("WEBP  .webp  image/webp")));
    }
}
