//! The convert → resize → download pipeline.
//!
//! One function, [`run`], replaces the per-combination branching a UI would
//! otherwise need. It is driven by an explicit [`PipelineRequest`]
//! (`convert`, optional [`ResizeRequest`] with its preserve-ratio flag) and
//! produces a [`PipelineOutcome`] holding every intermediate image and the
//! downloads.
//!
//! ## Stages
//!
//! ```text
//! NoImage ─decode─▶ Loaded ─convert?─▶ Converted ─resize?─▶ Resized ─▶ ReadyForDownload
//!                     └───────────────resize?──────────────▶┘
//! ```
//!
//! A decode failure is the only error that ends a run. Every later failure
//! is recorded in [`PipelineOutcome::errors`] and the pipeline continues with
//! the best image it already has:
//!
//! - conversion fails → resize works on the original
//! - resize fails → no resized download, earlier downloads still stand
//! - a download fails to encode → only that download is missing
//!
//! ## Downloads
//!
//! | Converted | Resized | Downloads |
//! |---|---|---|
//! | no | no | `imagen_original` |
//! | yes | no | `imagen_convertida` |
//! | no | yes | `imagen_original`, `imagen_redimensionada` |
//! | yes | yes | `imagen_convertida`, `imagen_convertida_redimensionada` |

use crate::config::ImagenConfig;
use crate::format::OutputFormat;
use crate::imaging::{
    self, DecodedImage, EncodedBuffer, EncodingPolicy, ImageBackend, ImagingError, PixelMode,
    ResizeRequest,
};
use crate::naming::{ArtifactKind, download_file_name};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Imaging(#[from] ImagingError),
}

/// What the user asked for in one interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineRequest {
    /// Selected output format. Only used when `convert` is set.
    pub format: OutputFormat,
    pub convert: bool,
    /// Resize target, `None` when resizing is off.
    pub resize: Option<ResizeRequest>,
}

/// Position in the pipeline state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    NoImage,
    Loaded,
    Converted,
    Resized,
    ReadyForDownload,
}

/// A successful conversion: the encoded bytes and their decoded preview.
#[derive(Debug, Clone)]
pub struct ConvertedImage {
    pub buffer: EncodedBuffer,
    pub preview: DecodedImage,
}

/// One downloadable file.
#[derive(Debug, Clone)]
pub struct DownloadArtifact {
    pub kind: ArtifactKind,
    pub file_name: String,
    pub buffer: EncodedBuffer,
    pub width: u32,
    pub height: u32,
}

impl DownloadArtifact {
    fn new(kind: ArtifactKind, buffer: EncodedBuffer, dimensions: (u32, u32)) -> Self {
        Self {
            kind,
            file_name: download_file_name(kind, buffer.format),
            buffer,
            width: dimensions.0,
            height: dimensions.1,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        self.buffer.mime_type()
    }
}

/// Everything one run produced.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub original: DecodedImage,
    pub converted: Option<ConvertedImage>,
    pub resized: Option<DecodedImage>,
    pub downloads: Vec<DownloadArtifact>,
    /// Recoverable failures, in the order they happened.
    pub errors: Vec<ImagingError>,
    /// Stages reached, starting at [`Stage::NoImage`].
    pub stages: Vec<Stage>,
}

impl PipelineOutcome {
    fn loaded(original: DecodedImage) -> Self {
        Self {
            original,
            converted: None,
            resized: None,
            downloads: Vec::new(),
            errors: Vec::new(),
            stages: vec![Stage::NoImage, Stage::Loaded],
        }
    }

    /// The last stage reached.
    pub fn stage(&self) -> Stage {
        self.stages.last().copied().unwrap_or(Stage::NoImage)
    }

    fn advance(&mut self, stage: Stage) {
        tracing::debug!(?stage, "pipeline advanced");
        self.stages.push(stage);
    }

    fn record(&mut self, error: ImagingError) {
        tracing::warn!("{}", error);
        self.errors.push(error);
    }

    fn offer(
        &mut self,
        kind: ArtifactKind,
        image: &DecodedImage,
        policy: &EncodingPolicy,
        backend: &impl ImageBackend,
    ) {
        match imaging::encode_for_download(backend, image, policy) {
            Ok(buffer) => self.push_download(kind, buffer, image.dimensions()),
            Err(e) => self.record(e),
        }
    }

    fn push_download(&mut self, kind: ArtifactKind, buffer: EncodedBuffer, dimensions: (u32, u32)) {
        let artifact = DownloadArtifact::new(kind, buffer, dimensions);
        tracing::info!(
            file = %artifact.file_name,
            bytes = artifact.buffer.len(),
            "download ready"
        );
        self.downloads.push(artifact);
    }

    /// Serializable overview for `--json` output.
    pub fn summary(&self) -> PipelineSummary {
        PipelineSummary {
            source: ImageSummary::of(&self.original),
            stages: self.stages.clone(),
            downloads: self
                .downloads
                .iter()
                .map(|a| DownloadSummary {
                    kind: a.kind,
                    file_name: a.file_name.clone(),
                    mime_type: a.mime_type(),
                    bytes: a.buffer.len(),
                    width: a.width,
                    height: a.height,
                })
                .collect(),
            errors: self.errors.iter().map(ToString::to_string).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PipelineSummary {
    pub source: ImageSummary,
    pub stages: Vec<Stage>,
    pub downloads: Vec<DownloadSummary>,
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ImageSummary {
    pub mode: PixelMode,
    pub width: u32,
    pub height: u32,
    pub format: Option<OutputFormat>,
    pub frames: usize,
}

impl ImageSummary {
    pub fn of(image: &DecodedImage) -> Self {
        Self {
            mode: image.mode(),
            width: image.width(),
            height: image.height(),
            format: image.source_format(),
            frames: image.frame_count(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DownloadSummary {
    pub kind: ArtifactKind,
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: usize,
    pub width: u32,
    pub height: u32,
}

/// Convert, then decode the result again so later steps (and previews) see
/// exactly what the user will download.
fn convert_step(
    backend: &impl ImageBackend,
    image: &DecodedImage,
    format: OutputFormat,
    config: &ImagenConfig,
) -> Result<ConvertedImage, ImagingError> {
    let buffer = imaging::convert(backend, image, format, &config.encoding_policy())?;
    let preview = backend
        .decode(&buffer.bytes, u64::MAX)
        .map_err(|source| ImagingError::Conversion { format, source })?
        // Keep the selected name (jpg vs jpeg) for later downloads
        .with_source_format(Some(format));
    Ok(ConvertedImage { buffer, preview })
}

/// Run the pipeline on uploaded bytes.
///
/// Fails only when the bytes cannot be decoded; see the [module docs](self)
/// for how later failures degrade.
pub fn run(
    backend: &impl ImageBackend,
    bytes: &[u8],
    request: &PipelineRequest,
    config: &ImagenConfig,
) -> Result<PipelineOutcome, ImagingError> {
    let encoding = config.encoding_policy();
    let original = imaging::decode(backend, bytes, config.limits.max_pixels)?;
    tracing::info!(
        mode = %original.mode(),
        width = original.width(),
        height = original.height(),
        format = ?original.source_format(),
        "image loaded"
    );
    let mut outcome = PipelineOutcome::loaded(original);

    if request.convert {
        match convert_step(backend, &outcome.original, request.format, config) {
            Ok(converted) => {
                tracing::info!("converted to {}", request.format);
                outcome.converted = Some(converted);
                outcome.advance(Stage::Converted);
            }
            Err(e) => outcome.record(e),
        }
    }

    match outcome.converted.take() {
        Some(converted) => {
            outcome.push_download(
                ArtifactKind::Converted,
                converted.buffer.clone(),
                converted.preview.dimensions(),
            );
            outcome.converted = Some(converted);
        }
        None => {
            let original = outcome.original.clone();
            outcome.offer(ArtifactKind::Original, &original, &encoding, backend);
        }
    }

    if let Some(resize_request) = request.resize {
        let from_converted = outcome.converted.is_some();
        let input = match &outcome.converted {
            Some(converted) => &converted.preview,
            None => &outcome.original,
        };
        match imaging::resize(backend, input, &resize_request, &config.resize_policy()) {
            Ok(resized) => {
                tracing::info!(
                    width = resized.width(),
                    height = resized.height(),
                    "resized"
                );
                outcome.advance(Stage::Resized);
                let kind = ArtifactKind::resized_from(from_converted);
                outcome.offer(kind, &resized, &encoding, backend);
                outcome.resized = Some(resized);
            }
            Err(e) => outcome.record(e),
        }
    }

    if !outcome.downloads.is_empty() {
        outcome.advance(Stage::ReadyForDownload);
    }
    Ok(outcome)
}

/// Read an image file and run the pipeline on it.
pub fn run_file(
    backend: &impl ImageBackend,
    path: &Path,
    request: &PipelineRequest,
    config: &ImagenConfig,
) -> Result<PipelineOutcome, PipelineError> {
    let bytes = fs::read(path)?;
    Ok(run(backend, &bytes, request, config)?)
}

/// Write every download into `dir`, creating it if needed.
pub fn save_downloads(
    outcome: &PipelineOutcome,
    dir: &Path,
) -> Result<Vec<PathBuf>, PipelineError> {
    fs::create_dir_all(dir)?;
    outcome
        .downloads
        .iter()
        .map(|artifact| -> Result<PathBuf, PipelineError> {
            let path = dir.join(&artifact.file_name);
            fs::write(&path, &artifact.buffer.bytes)?;
            Ok(path)
        })
        .collect()
}
