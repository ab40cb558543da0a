//! Configuration module.
//!
//! Handles loading, validating, and merging `imagen.toml`. The file is
//! optional and sparse: stock defaults are the base layer and any key in the
//! file overrides just that value.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [output]
//! default_format = "png"      # Format preselected when none is given
//!
//! [jpeg]
//! quality = 70                # 1-100
//! flatten_alpha = true        # Drop alpha instead of refusing RGBA input
//! progressive = true
//! optimize = true             # Image-specific Huffman tables
//!
//! [png]
//! compression = "best"        # best | default | fast
//!
//! [webp]
//! quality = 70                # 1-100
//! method = 6                  # Encoder effort, 0-6
//! lossless = false
//!
//! [gif]
//! speed = 10                  # Palette quantizer speed, 1-30
//!
//! [resize]
//! thumbnail_filter = "lanczos3"
//! exact_filter = "catmull-rom"
//!
//! [limits]
//! max_pixels = 100000000      # Largest image decoded or produced
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::format::OutputFormat;
use crate::imaging::{
    EncodingPolicy, GifPolicy, JpegPolicy, PngCompression, Quality, ResampleFilter, ResizePolicy,
    WebpPolicy,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "imagen.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Tool configuration loaded from `imagen.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagenConfig {
    /// Output selection defaults.
    pub output: OutputConfig,
    /// JPEG encoder settings.
    pub jpeg: JpegConfig,
    /// PNG encoder settings.
    pub png: PngConfig,
    /// WebP encoder settings.
    pub webp: WebpConfig,
    /// GIF encoder settings.
    pub gif: GifConfig,
    /// Resampling kernels.
    pub resize: ResizeConfig,
    /// Resource limits.
    pub limits: LimitsConfig,
}

impl ImagenConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.jpeg.quality) {
            return Err(ConfigError::Validation("jpeg.quality must be 1-100".into()));
        }
        if !(1..=100).contains(&self.webp.quality) {
            return Err(ConfigError::Validation("webp.quality must be 1-100".into()));
        }
        if self.webp.method > 6 {
            return Err(ConfigError::Validation("webp.method must be 0-6".into()));
        }
        if !(1..=30).contains(&self.gif.speed) {
            return Err(ConfigError::Validation("gif.speed must be 1-30".into()));
        }
        if self.limits.max_pixels == 0 {
            return Err(ConfigError::Validation(
                "limits.max_pixels must be non-zero".into(),
            ));
        }
        Ok(())
    }

    /// Encoder settings for the converter.
    pub fn encoding_policy(&self) -> EncodingPolicy {
        EncodingPolicy {
            jpeg: JpegPolicy {
                quality: Quality::new(self.jpeg.quality),
                flatten_alpha: self.jpeg.flatten_alpha,
                progressive: self.jpeg.progressive,
                optimize: self.jpeg.optimize,
            },
            png: self.png.compression,
            webp: WebpPolicy {
                quality: Quality::new(self.webp.quality),
                method: self.webp.method,
                lossless: self.webp.lossless,
            },
            gif: GifPolicy {
                speed: self.gif.speed,
            },
        }
    }

    /// Resampling settings for the resizer.
    pub fn resize_policy(&self) -> ResizePolicy {
        ResizePolicy {
            thumbnail_filter: self.resize.thumbnail_filter,
            exact_filter: self.resize.exact_filter,
            max_pixels: self.limits.max_pixels,
        }
    }
}

/// Output selection defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Format preselected when the user does not pick one.
    pub default_format: OutputFormat,
}

/// JPEG encoder settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JpegConfig {
    /// Encoding quality (1 = worst, 100 = best).
    pub quality: u8,
    /// Drop the alpha channel of RGBA/LA images instead of refusing them.
    pub flatten_alpha: bool,
    /// Write progressive JPEG.
    pub progressive: bool,
    /// Compute image-specific Huffman tables.
    pub optimize: bool,
}

impl Default for JpegConfig {
    fn default() -> Self {
        Self {
            quality: 70,
            flatten_alpha: true,
            progressive: true,
            optimize: true,
        }
    }
}

/// PNG encoder settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PngConfig {
    /// Deflate effort.
    pub compression: PngCompression,
}

/// WebP encoder settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WebpConfig {
    /// Encoding quality (1 = worst, 100 = best).
    pub quality: u8,
    /// Encoder effort, 0 (fastest) to 6 (smallest).
    pub method: u8,
    /// Encode losslessly; `quality` then trades speed for size.
    pub lossless: bool,
}

impl Default for WebpConfig {
    fn default() -> Self {
        Self {
            quality: 70,
            method: 6,
            lossless: false,
        }
    }
}

/// GIF encoder settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GifConfig {
    /// Palette quantizer speed, 1 (best palette) to 30 (fastest).
    pub speed: u8,
}

impl Default for GifConfig {
    fn default() -> Self {
        Self { speed: 10 }
    }
}

/// Resampling kernels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeConfig {
    /// Kernel used when the aspect ratio is preserved.
    pub thumbnail_filter: ResampleFilter,
    /// Kernel used for exact resizes.
    pub exact_filter: ResampleFilter,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            thumbnail_filter: ResampleFilter::Lanczos3,
            exact_filter: ResampleFilter::CatmullRom,
        }
    }
}

/// Resource limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    /// Largest `width * height` accepted on upload or produced by a resize.
    pub max_pixels: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_pixels: 100_000_000,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ImagenConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ImagenConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ImagenConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the given file.
///
/// A missing file yields the stock defaults. Present files are merged on
/// top of the defaults, unknown keys are rejected and the result validated.
pub fn load_config(path: &Path) -> Result<ImagenConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `imagen.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# imagen configuration
# ====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Format preselected when --format is not given.
# One of: png, jpg, jpeg, bmp, gif, tiff, webp
default_format = "png"

# ---------------------------------------------------------------------------
# JPEG
# ---------------------------------------------------------------------------
[jpeg]
# Encoding quality (1 = worst, 100 = best).
quality = 70

# JPEG has no alpha channel. When true, RGBA and LA images lose their alpha
# before encoding; when false, converting them to JPEG is an error.
flatten_alpha = true

# Progressive files load coarse-to-fine in browsers.
progressive = true

# Build Huffman tables from the image itself (smaller files, same pixels).
optimize = true

# ---------------------------------------------------------------------------
# PNG
# ---------------------------------------------------------------------------
[png]
# Deflate effort: best, default or fast.
compression = "best"

# ---------------------------------------------------------------------------
# WebP
# ---------------------------------------------------------------------------
[webp]
# Encoding quality (1 = worst, 100 = best).
quality = 70

# Encoder effort from 0 (fastest) to 6 (smallest file).
method = 6

# Encode losslessly instead of lossy.
lossless = false

# ---------------------------------------------------------------------------
# GIF
# ---------------------------------------------------------------------------
[gif]
# Palette quantizer speed from 1 (best colors) to 30 (fastest).
speed = 10

# ---------------------------------------------------------------------------
# Resize
# ---------------------------------------------------------------------------
[resize]
# Kernels: nearest, triangle, catmull-rom, gaussian, lanczos3.
# Used when the aspect ratio is kept.
thumbnail_filter = "lanczos3"
# Used when stretching to an exact size.
exact_filter = "catmull-rom"

# ---------------------------------------------------------------------------
# Limits
# ---------------------------------------------------------------------------
[limits]
# Largest width * height accepted on upload or produced by a resize.
max_pixels = 100000000
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(content: &str) -> (TempDir, std::path::PathBuf) {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&path, content).unwrap();
        (tmp, path)
    }

    #[test]
    fn default_config_is_valid() {
        ImagenConfig::default().validate().unwrap();
    }

    #[test]
    fn missing_file_yields_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("absent.toml")).unwrap();
        assert_eq!(config.jpeg.quality, 70);
        assert_eq!(config.output.default_format, OutputFormat::Png);
    }

    #[test]
    fn sparse_file_overrides_only_given_keys() {
        let (_tmp, path) = write_config(
            r#"
[webp]
quality = 85

[output]
default_format = "WEBP"
"#,
        );
        // Format names in config are lowercase only
        assert!(load_config(&path).is_err());

        let (_tmp, path) = write_config(
            r#"
[webp]
quality = 85

[output]
default_format = "webp"
"#,
        );
        let config = load_config(&path).unwrap();
        assert_eq!(config.webp.quality, 85);
        assert_eq!(config.webp.method, 6);
        assert_eq!(config.jpeg.quality, 70);
        assert_eq!(config.output.default_format, OutputFormat::WebP);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let (_tmp, path) = write_config("[jpeg]\nqualty = 80\n");
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn out_of_range_values_fail_validation() {
        for content in [
            "[jpeg]\nquality = 0\n",
            "[webp]\nquality = 101\n",
            "[webp]\nmethod = 7\n",
            "[gif]\nspeed = 31\n",
            "[limits]\nmax_pixels = 0\n",
        ] {
            let (_tmp, path) = write_config(content);
            assert!(
                matches!(load_config(&path), Err(ConfigError::Validation(_))),
                "{content}"
            );
        }
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let (_tmp, path) = write_config("[jpeg\nquality = 80\n");
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn merge_toml_keeps_unrelated_keys() {
        let base: toml::Value = toml::from_str("[a]\nx = 1\ny = 2\n").unwrap();
        let overlay: toml::Value = toml::from_str("[a]\ny = 3\n").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"]["x"].as_integer(), Some(1));
        assert_eq!(merged["a"]["y"].as_integer(), Some(3));
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        let value: toml::Value = toml::from_str(stock_config_toml()).unwrap();
        let config = resolve_config(stock_defaults_value(), Some(value)).unwrap();
        let defaults = ImagenConfig::default();
        assert_eq!(config.jpeg.quality, defaults.jpeg.quality);
        assert!(config.jpeg.progressive);
        assert!(config.jpeg.optimize);
        assert_eq!(config.webp.method, defaults.webp.method);
        assert_eq!(config.png.compression, defaults.png.compression);
        assert_eq!(config.resize.exact_filter, defaults.resize.exact_filter);
        assert_eq!(config.limits.max_pixels, defaults.limits.max_pixels);
    }

    #[test]
    fn policies_follow_config_values() {
        let (_tmp, path) = write_config(
            "[jpeg]\nquality = 90\nflatten_alpha = false\n[resize]\nexact_filter = \"nearest\"\n",
        );
        let config = load_config(&path).unwrap();
        let encoding = config.encoding_policy();
        assert_eq!(encoding.jpeg.quality.value(), 90);
        assert!(!encoding.jpeg.flatten_alpha);
        assert!(encoding.jpeg.progressive);
        let resize = config.resize_policy();
        assert_eq!(resize.exact_filter, ResampleFilter::Nearest);
        assert_eq!(resize.max_pixels, 100_000_000);
    }

    #[test]
    fn jpeg_progressive_and_optimize_can_be_turned_off() {
        let (_tmp, path) = write_config("[jpeg]\nprogressive = false\noptimize = false\n");
        let encoding = load_config(&path).unwrap().encoding_policy();
        assert!(!encoding.jpeg.progressive);
        assert!(!encoding.jpeg.optimize);
        assert_eq!(encoding.jpeg.quality.value(), 70);
    }
}
