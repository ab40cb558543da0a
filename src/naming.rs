//! Download file naming.
//!
//! Every artifact the pipeline produces is named `imagen_<stem>.<ext>`:
//!
//! | Artifact | Stem |
//! |---|---|
//! | Original, re-encoded in its own format | `original` |
//! | Converted to the selected format | `convertida` |
//! | Resized from the original | `redimensionada` |
//! | Resized from the converted image | `convertida_redimensionada` |
//!
//! The extension is the lowercase format name the image was written in.

use crate::format::OutputFormat;
use serde::Serialize;
use std::fmt;

/// Prefix shared by every download.
pub const FILE_PREFIX: &str = "imagen";

/// Which of the four possible downloads an artifact is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Original,
    Converted,
    Resized,
    ConvertedResized,
}

impl ArtifactKind {
    pub fn stem(self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::Converted => "convertida",
            Self::Resized => "redimensionada",
            Self::ConvertedResized => "convertida_redimensionada",
        }
    }

    /// Human label used in CLI output and the preview page.
    pub fn label(self) -> &'static str {
        match self {
            Self::Original => "Original image",
            Self::Converted => "Converted image",
            Self::Resized => "Resized image",
            Self::ConvertedResized => "Converted and resized image",
        }
    }

    /// Kind of the resized artifact, depending on what was resized.
    pub fn resized_from(converted: bool) -> Self {
        if converted {
            Self::ConvertedResized
        } else {
            Self::Resized
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stem())
    }
}

/// Build the download file name for an artifact.
///
/// - `(Original, Png)` → `"imagen_original.png"`
/// - `(Converted, Jpg)` → `"imagen_convertida.jpg"`
/// - `(ConvertedResized, WebP)` → `"imagen_convertida_redimensionada.webp"`
pub fn download_file_name(kind: ArtifactKind, format: OutputFormat) -> String {
    format!("{}_{}.{}", FILE_PREFIX, kind.stem(), format.extension())
}
