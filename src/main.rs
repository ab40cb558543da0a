use clap::{Parser, Subcommand};
use imagen::format::OutputFormat;
use imagen::imaging::{self, ImageBackend, ResizeRequest, RustBackend};
use imagen::pipeline::{self, PipelineRequest};
use imagen::{config, output, preview};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "imagen")]
#[command(about = "Convert and resize an image, then save the downloads")]
#[command(long_about = "\
Convert and resize an image, then save the downloads

One input image goes through decode → convert → resize. Each step is
optional; failures after decoding are reported and the remaining
downloads are still written.

Downloads:

  imagen_original.<ext>                     no conversion
  imagen_convertida.<ext>                   converted to --format
  imagen_redimensionada.<ext>               resized original
  imagen_convertida_redimensionada.<ext>    resized converted image

Formats: png, jpg, jpeg, bmp, gif, tiff, webp (case-insensitive).

Run 'imagen gen-config' to generate a documented imagen.toml.")]
#[command(version)]
struct Cli {
    /// Config file (missing file means stock defaults)
    #[arg(long, default_value = config::DEFAULT_CONFIG_FILE, global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

/// Flags mirroring the convert/resize controls.
#[derive(clap::Args, Clone)]
struct RunArgs {
    /// Image to process
    input: PathBuf,

    /// Output format (defaults to output.default_format)
    #[arg(long)]
    format: Option<OutputFormat>,

    /// Convert to --format
    #[arg(long)]
    convert: bool,

    /// Resize to --width x --height
    #[arg(long)]
    resize: bool,

    /// Target width (defaults to the image width)
    #[arg(long)]
    width: Option<u32>,

    /// Target height (defaults to the image height)
    #[arg(long)]
    height: Option<u32>,

    /// Fit inside width x height instead of resizing exactly
    #[arg(long)]
    keep_ratio: bool,

    /// Directory the downloads are written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Also write preview.html
    #[arg(long)]
    preview: bool,

    /// Print a JSON summary instead of the text report
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Run the pipeline on one image and write the downloads
    Run(RunArgs),
    /// Print mode, size and format of an image
    Inspect {
        /// Image to inspect
        input: PathBuf,
    },
    /// List the selectable output formats
    Formats,
    /// Print a stock imagen.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "imagen=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => {
            let config = config::load_config(&cli.config)?;
            let backend = RustBackend::new();
            let bytes = std::fs::read(&args.input)?;

            let request = build_request(&backend, &bytes, &args, &config)?;
            let outcome = pipeline::run(&backend, &bytes, &request, &config)?;

            let written = pipeline::save_downloads(&outcome, &args.out_dir)?;
            let preview_path = if args.preview {
                Some(preview::write_preview(
                    &backend,
                    &outcome,
                    &config.encoding_policy(),
                    &args.out_dir,
                )?)
            } else {
                None
            };

            if args.json {
                println!("{}", serde_json::to_string_pretty(&outcome.summary())?);
            } else {
                output::print_run_output(&outcome);
                output::print_saved_files(&written, preview_path.as_deref());
            }
        }
        Command::Inspect { input } => {
            let config = config::load_config(&cli.config)?;
            let bytes = std::fs::read(&input)?;
            let image = imaging::decode(&RustBackend::new(), &bytes, config.limits.max_pixels)?;
            output::print_inspect_output(&display_name(&input), &image);
        }
        Command::Formats => {
            output::print_formats_list();
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Turn CLI flags into a pipeline request.
///
/// Width and height default to the source size, like the controls they
/// stand in for, so the image is decoded once up front only when resizing.
fn build_request(
    backend: &impl ImageBackend,
    bytes: &[u8],
    args: &RunArgs,
    config: &config::ImagenConfig,
) -> Result<PipelineRequest, imaging::ImagingError> {
    let resize = if args.resize {
        let (width, height) = match (args.width, args.height) {
            (Some(w), Some(h)) => (w, h),
            (w, h) => {
                let source = imaging::decode(backend, bytes, config.limits.max_pixels)?;
                (w.unwrap_or(source.width()), h.unwrap_or(source.height()))
            }
        };
        Some(ResizeRequest::new(width, height, args.keep_ratio))
    } else {
        None
    };

    Ok(PipelineRequest {
        format: args.format.unwrap_or(config.output.default_format),
        convert: args.convert,
        resize,
    })
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
