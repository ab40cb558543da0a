//! HTML preview page.
//!
//! Renders one self-contained `preview.html` showing the original upload
//! next to every download the pipeline produced. Images are embedded as
//! base64 `data:` URIs so the page opens from anywhere without the artifact
//! files beside it.
//!
//! ```text
//! ┌───────────────────────────────────────────┐
//! │ Original image        RGBA 300x200 (PNG)  │
//! │ [img]                                     │
//! ├───────────────────────────────────────────┤
//! │ Converted image  imagen_convertida.webp   │
//! │ [img]                        [Download]   │
//! └───────────────────────────────────────────┘
//! ```
//!
//! Uses [maud](https://maud.lambda.xyz/) so all interpolated text is escaped.

use crate::format::OutputFormat;
use crate::imaging::{self, EncodedBuffer, EncodingPolicy, ImageBackend};
use crate::pipeline::{DownloadArtifact, PipelineOutcome};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use maud::{DOCTYPE, Markup, html};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File name of the rendered page inside the output directory.
pub const PREVIEW_FILE: &str = "preview.html";

const CSS: &str = "\
body{font-family:system-ui,sans-serif;margin:2rem auto;max-width:60rem;padding:0 1rem;color:#222}
figure{margin:0 0 2rem;padding:1rem;border:1px solid #ddd;border-radius:6px}
figcaption{display:flex;justify-content:space-between;gap:1rem;margin-bottom:.5rem}
img{max-width:100%;height:auto;display:block}
.meta{color:#666;font-size:.9em}
.errors{color:#a00}";

/// Build a `data:` URI for encoded bytes.
pub fn data_uri(buffer: &EncodedBuffer) -> String {
    format!("data:{};base64,{}", buffer.mime_type(), STANDARD.encode(&buffer.bytes))
}

/// Renders the base HTML document structure
fn base_document(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (CSS) }
            }
            body {
                (content)
            }
        }
    }
}

fn artifact_figure(artifact: &DownloadArtifact) -> Markup {
    html! {
        figure.artifact {
            figcaption {
                strong { (artifact.kind.label()) }
                span.meta {
                    (artifact.width) "x" (artifact.height) ", " (artifact.buffer.len()) " bytes"
                }
                a href=(data_uri(&artifact.buffer)) download=(artifact.file_name) {
                    "Download " (artifact.file_name)
                }
            }
            img src=(data_uri(&artifact.buffer)) alt=(artifact.kind.label());
        }
    }
}

/// Render the preview page for a run.
///
/// `original` is the upload shown at the top. Browsers cannot show every
/// format (TIFF, mostly), so callers pass a PNG rendition for display.
pub fn render_preview(outcome: &PipelineOutcome, original: Option<&EncodedBuffer>) -> Markup {
    let source = &outcome.original;
    let content = html! {
        h1 { "Image preview" }
        figure.original {
            figcaption {
                strong { "Original image" }
                span.meta {
                    (source.mode()) " " (source.width()) "x" (source.height())
                    @if let Some(format) = source.source_format() {
                        " (" (format) ")"
                    }
                }
            }
            @if let Some(buffer) = original {
                img src=(data_uri(buffer)) alt="Original image";
            }
        }
        @for artifact in &outcome.downloads {
            (artifact_figure(artifact))
        }
        @if !outcome.errors.is_empty() {
            ul.errors {
                @for error in &outcome.errors {
                    li { (error.to_string()) }
                }
            }
        }
    };
    base_document("imagen preview", content)
}

/// Render and write `preview.html` into `dir`.
///
/// The original is re-encoded as PNG for display; if that fails the page is
/// still written without it.
pub fn write_preview(
    backend: &impl ImageBackend,
    outcome: &PipelineOutcome,
    policy: &EncodingPolicy,
    dir: &Path,
) -> io::Result<PathBuf> {
    let original = imaging::convert(backend, &outcome.original, OutputFormat::Png, policy)
        .map_err(|e| tracing::warn!("original left out of preview: {}", e))
        .ok();

    fs::create_dir_all(dir)?;
    let path = dir.join(PREVIEW_FILE);
    fs::write(&path, render_preview(outcome, original.as_ref()).into_string())?;
    tracing::info!(path = %path.display(), "preview written");
    Ok(path)
}
