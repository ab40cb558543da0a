//! End-to-end pipeline scenarios through the public API.
//!
//! Fixtures are generated in memory; nothing is read from disk except what
//! the tests themselves write into a temp directory.

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use imagen::config::ImagenConfig;
use imagen::format::OutputFormat;
use imagen::imaging::{self, ImageBackend, ImagingError, PixelMode, ResizeRequest, RustBackend};
use imagen::naming::ArtifactKind;
use imagen::pipeline::{self, PipelineOutcome, PipelineRequest, Stage};
use std::io::Cursor;

fn rgba_fixture(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 128, ((x + y) % 256) as u8])
    }))
}

fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
    bytes
}

fn run(
    bytes: &[u8],
    format: OutputFormat,
    convert: bool,
    resize: Option<ResizeRequest>,
) -> PipelineOutcome {
    let request = PipelineRequest {
        format,
        convert,
        resize,
    };
    pipeline::run(&RustBackend::new(), bytes, &request, &ImagenConfig::default()).unwrap()
}

fn file_names(outcome: &PipelineOutcome) -> Vec<&str> {
    outcome
        .downloads
        .iter()
        .map(|a| a.file_name.as_str())
        .collect()
}

// =========================================================================
// Conversion
// =========================================================================

#[test]
fn every_mode_converts_to_every_format_and_keeps_its_size() {
    let base = rgba_fixture(37, 23);
    let sources = [
        (PixelMode::Luma, DynamicImage::ImageLuma8(base.to_luma8())),
        (PixelMode::LumaAlpha, DynamicImage::ImageLumaA8(base.to_luma_alpha8())),
        (PixelMode::Rgb, DynamicImage::ImageRgb8(base.to_rgb8())),
        (PixelMode::Rgba, base.clone()),
    ];
    let backend = RustBackend::new();
    let policy = ImagenConfig::default().encoding_policy();

    for (mode, pixels) in sources {
        let decoded = imaging::DecodedImage::new(pixels, None);
        assert_eq!(decoded.mode(), mode);
        for format in OutputFormat::ALL {
            let buffer = imaging::convert(&backend, &decoded, format, &policy)
                .unwrap_or_else(|e| panic!("{mode} → {format}: {e}"));
            let back = backend
                .decode(&buffer.bytes, u64::MAX)
                .unwrap_or_else(|e| panic!("{mode} → {format} does not decode: {e}"));
            assert_eq!(back.dimensions(), (37, 23), "{mode} → {format}");
        }
    }
}

#[test]
fn rgba_to_jpeg_has_no_alpha() {
    let png = encode(&rgba_fixture(40, 30), ImageFormat::Png);
    let outcome = run(&png, OutputFormat::Jpeg, true, None);

    let converted = outcome.converted.as_ref().unwrap();
    assert_eq!(converted.buffer.mime_type(), "image/jpeg");
    assert!(!converted.preview.mode().has_alpha());
    assert_eq!(file_names(&outcome), vec!["imagen_convertida.jpeg"]);
}

#[test]
fn converted_jpeg_is_progressive() {
    let png = encode(&rgba_fixture(64, 64), ImageFormat::Png);
    let outcome = run(&png, OutputFormat::Jpg, true, None);

    let bytes = &outcome.converted.as_ref().unwrap().buffer.bytes;
    // SOF2 starts a progressive frame, SOF0 a baseline one
    assert!(bytes.windows(2).any(|m| m == [0xFF, 0xC2]));
    assert!(!bytes.windows(2).any(|m| m == [0xFF, 0xC0]));
}

#[test]
fn rgba_to_jpeg_without_flattening_reports_conversion_error() {
    let mut config = ImagenConfig::default();
    config.jpeg.flatten_alpha = false;
    let png = encode(&rgba_fixture(8, 8), ImageFormat::Png);
    let request = PipelineRequest {
        format: OutputFormat::Jpg,
        convert: true,
        resize: None,
    };

    let outcome = pipeline::run(&RustBackend::new(), &png, &request, &config).unwrap();

    assert!(matches!(outcome.errors[..], [ImagingError::Conversion { .. }]));
    assert!(outcome.errors[0].to_string().starts_with("error converting to JPEG"));
    assert_eq!(file_names(&outcome), vec!["imagen_original.png"]);
}

// =========================================================================
// Resizing
// =========================================================================

#[test]
fn preserve_ratio_fits_inside_box() {
    let png = encode(&rgba_fixture(200, 400), ImageFormat::Png);
    let outcome = run(&png, OutputFormat::Png, false, Some(ResizeRequest::new(100, 100, true)));
    assert_eq!(outcome.resized.unwrap().dimensions(), (50, 100));
}

#[test]
fn exact_resize_ignores_ratio() {
    let png = encode(&rgba_fixture(200, 400), ImageFormat::Png);
    let outcome = run(&png, OutputFormat::Png, false, Some(ResizeRequest::new(50, 50, false)));
    assert_eq!(outcome.resized.unwrap().dimensions(), (50, 50));
}

#[test]
fn zero_dimension_is_a_resize_error_and_original_survives() {
    let png = encode(&rgba_fixture(64, 32), ImageFormat::Png);
    for (w, h) in [(0, 10), (10, 0)] {
        let outcome = run(&png, OutputFormat::Png, false, Some(ResizeRequest::new(w, h, true)));
        assert!(matches!(outcome.errors[..], [ImagingError::Resize { .. }]));
        assert!(outcome.resized.is_none());
        assert_eq!(outcome.original.dimensions(), (64, 32));
        assert_eq!(file_names(&outcome), vec!["imagen_original.png"]);
    }
}

// =========================================================================
// Full runs
// =========================================================================

#[test]
fn rgba_png_to_webp_then_thumbnail() {
    let png = encode(&rgba_fixture(300, 200), ImageFormat::Png);
    let outcome = run(
        &png,
        OutputFormat::WebP,
        true,
        Some(ResizeRequest::new(150, 150, true)),
    );

    let converted = outcome.converted.as_ref().unwrap();
    assert_eq!(converted.preview.source_format(), Some(OutputFormat::WebP));
    assert_eq!(converted.preview.dimensions(), (300, 200));
    assert_eq!(converted.preview.mode(), PixelMode::Rgba);

    let detected = image::guess_format(&converted.buffer.bytes).unwrap();
    assert_eq!(detected, ImageFormat::WebP);

    assert_eq!(outcome.resized.as_ref().unwrap().dimensions(), (150, 100));
    assert_eq!(
        file_names(&outcome),
        vec!["imagen_convertida.webp", "imagen_convertida_redimensionada.webp"]
    );
    assert_eq!(outcome.stage(), Stage::ReadyForDownload);
}

#[test]
fn four_download_variants() {
    let png = encode(&rgba_fixture(20, 20), ImageFormat::Png);
    let half = Some(ResizeRequest::new(10, 10, false));

    let cases = [
        (false, None, vec![ArtifactKind::Original]),
        (true, None, vec![ArtifactKind::Converted]),
        (false, half, vec![ArtifactKind::Original, ArtifactKind::Resized]),
        (true, half, vec![ArtifactKind::Converted, ArtifactKind::ConvertedResized]),
    ];
    for (convert, resize, expected) in cases {
        let outcome = run(&png, OutputFormat::Gif, convert, resize);
        let kinds: Vec<_> = outcome.downloads.iter().map(|a| a.kind).collect();
        assert_eq!(kinds, expected, "convert={convert} resize={resize:?}");
    }
}

#[test]
fn garbage_upload_fails_to_decode() {
    let request = PipelineRequest {
        format: OutputFormat::Png,
        convert: true,
        resize: Some(ResizeRequest::new(10, 10, true)),
    };
    let result = pipeline::run(
        &RustBackend::new(),
        b"definitely not an image",
        &request,
        &ImagenConfig::default(),
    );
    assert!(matches!(result, Err(ImagingError::Decode(_))));
}

#[test]
fn downloads_land_in_out_dir() {
    let tmp = tempfile::TempDir::new().unwrap();
    let png = encode(&rgba_fixture(30, 10), ImageFormat::Png);
    let outcome = run(&png, OutputFormat::Tiff, true, Some(ResizeRequest::new(15, 15, true)));

    let written = pipeline::save_downloads(&outcome, tmp.path()).unwrap();
    assert_eq!(written.len(), 2);

    let resized = image::open(tmp.path().join("imagen_convertida_redimensionada.tiff")).unwrap();
    assert_eq!((resized.width(), resized.height()), (15, 5));
}
