//! Classify command - predict the category of each image.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use photo_classify_adapters::{model_path, set_models_dir, FsImageSource};
use photo_classify_core::{
    AlphaMode, CandleClassifier, ChannelOrder, ClassificationRecord, ClassificationService,
    ClassifierConfig, ClassifyError, ImageSource, InputSpec, Pipeline, PixelLayout, ResultOutput,
};
use tracing::{debug, info, warn};

use super::ExitCode;
use crate::config::AppConfig;
use crate::output::{BatchProgress, JsonOutput, TextOutput};

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Display text, as shown in the label
    #[default]
    Text,
    /// JSON Lines (one JSON object per line)
    Jsonl,
    /// Single JSON array
    Json,
}

impl OutputFormat {
    fn from_config(s: &str) -> Option<Self> {
        match s {
            "text" => Some(Self::Text),
            "jsonl" => Some(Self::Jsonl),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Largest accepted model input edge.
const MAX_INPUT_SIZE: u32 = 4096;

/// Parse and validate a square input size.
fn parse_input_size(s: &str) -> Result<u32, String> {
    let value: u32 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid size"))?;
    if (1..=MAX_INPUT_SIZE).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not in 1..={MAX_INPUT_SIZE}"))
    }
}

/// Parse a direct-path channel order.
fn parse_layout(s: &str) -> Result<ChannelOrder, String> {
    s.parse()
}

/// Shared arguments for classification.
#[derive(Args, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct ClassifyArgs {
    /// Files or directories to classify
    pub paths: Vec<PathBuf>,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Feed the model a packed pixel buffer instead of the image
    #[arg(long)]
    pub direct: bool,

    /// Channel order of the direct-path buffer
    #[arg(long, value_parser = parse_layout)]
    pub layout: Option<ChannelOrder>,

    /// Premultiply color by alpha in the direct-path buffer
    #[arg(long)]
    pub premultiplied: bool,

    /// Square model input size in pixels
    #[arg(long, value_parser = parse_input_size)]
    pub input_size: Option<u32>,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print JSON output (only affects --format json)
    #[arg(long)]
    pub pretty: bool,

    /// Weights file (overrides the models directory)
    #[arg(long, value_name = "PATH")]
    pub model: Option<PathBuf>,

    /// Labels file (overrides the models directory)
    #[arg(long, value_name = "PATH")]
    pub labels: Option<PathBuf>,

    /// Custom models directory (overrides default and config)
    #[arg(long, value_name = "DIR")]
    pub models_dir: Option<PathBuf>,

    /// Show progress bar
    #[arg(long)]
    pub progress: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

impl ClassifyArgs {
    /// Apply configuration file values, respecting CLI precedence.
    ///
    /// Layering priority (lowest to highest):
    /// 1. Hardcoded defaults (in accessor methods)
    /// 2. Config file values (XDG, then project-local)
    /// 3. CLI arguments (already set on self)
    ///
    /// Invalid config values are ignored.
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        if !args.recursive {
            args.recursive = config.general.recursive.unwrap_or(false);
        }

        if !args.direct {
            args.direct = config.pipeline.mode.as_deref() == Some("direct");
        }
        if args.layout.is_none() {
            args.layout = config
                .pipeline
                .layout
                .as_deref()
                .and_then(|s| s.parse().ok());
        }
        if !args.premultiplied {
            args.premultiplied = config.pipeline.premultiplied.unwrap_or(false);
        }
        args.input_size = args.input_size.or_else(|| {
            config
                .pipeline
                .input_size
                .filter(|n| (1..=MAX_INPUT_SIZE).contains(n))
        });

        if args.format.is_none() {
            args.format = config
                .output
                .format
                .as_deref()
                .and_then(OutputFormat::from_config);
        }
        if !args.pretty {
            args.pretty = config.output.pretty.unwrap_or(false);
        }

        if args.model.is_none() {
            args.model.clone_from(&config.models.model);
        }
        if args.labels.is_none() {
            args.labels.clone_from(&config.models.labels);
        }
        if args.models_dir.is_none() {
            args.models_dir.clone_from(&config.models.dir);
        }

        args
    }

    /// Get input size with fallback to the default.
    fn input_size(&self) -> u32 {
        self.input_size.unwrap_or(InputSpec::DEFAULT_SIZE)
    }

    /// Get the direct-path pixel layout.
    fn pixel_layout(&self) -> PixelLayout {
        let alpha = if self.premultiplied {
            AlphaMode::Premultiplied
        } else {
            AlphaMode::Opaque
        };
        PixelLayout::new(self.layout.unwrap_or_default(), alpha)
    }

    /// Get output format with fallback to text.
    fn format(&self) -> OutputFormat {
        self.format.unwrap_or_default()
    }
}

/// Result of running the classify command.
#[allow(dead_code)] // Fields exposed for programmatic use
pub struct ClassifyResult {
    /// Number of images that produced a prediction.
    pub classified: usize,
    /// Number of images whose request failed.
    pub failed: usize,
    /// Exit code.
    pub exit_code: ExitCode,
}

/// Run the classify command.
///
/// Expects `args` to have been processed through `with_config()` first
/// to apply configuration file settings.
pub fn run(args: &ClassifyArgs) -> Result<ClassifyResult> {
    info!("Running classify command on {} paths", args.paths.len());

    if args.paths.is_empty() {
        anyhow::bail!("No paths specified");
    }

    if let Some(ref models_dir) = args.models_dir {
        debug!("Using custom models directory: {}", models_dir.display());
        set_models_dir(Some(models_dir.clone()));
    }

    let classifier = Arc::new(build_classifier(args)?);
    let pipeline = if args.direct {
        let input = InputSpec::square(args.input_size()).with_layout(args.pixel_layout());
        debug!("Direct path with {}x{} {} buffer", input.width, input.height, input.layout.order);
        Pipeline::direct(classifier, input)
    } else {
        Pipeline::mediated(classifier)
    };

    let source = FsImageSource::new(args.paths.clone(), args.recursive);
    process_images(&source, pipeline, args)
}

/// Build the candle classifier from explicit paths or the models directory.
fn build_classifier(args: &ClassifyArgs) -> Result<CandleClassifier> {
    let model = args
        .model
        .clone()
        .or_else(|| model_path("classifier"))
        .context("No classifier model configured")?;
    let labels = args
        .labels
        .clone()
        .or_else(|| model_path("labels"))
        .context("No labels file configured")?;

    for path in [&model, &labels] {
        if !path.exists() {
            info!(
                "{} not found. Run `photo-classify models fetch` or pass --model/--labels.",
                path.display()
            );
        }
    }

    let config = ClassifierConfig::new(model, labels).with_input_size(args.input_size());
    Ok(CandleClassifier::new(config))
}

/// Classify every image one request at a time and write the records.
fn process_images(
    source: &FsImageSource,
    pipeline: Pipeline,
    args: &ClassifyArgs,
) -> Result<ClassifyResult> {
    let files = source.collect_files();
    if files.is_empty() {
        warn!("No images found");
    }

    let format = args.format();
    let text = TextOutput::stdout(files.len() > 1);
    let json = JsonOutput::stdout();
    let output: &dyn ResultOutput = match format {
        OutputFormat::Text => &text,
        OutputFormat::Jsonl | OutputFormat::Json => &json,
    };

    let show_progress = !args.quiet && (args.progress || std::io::stderr().is_terminal());
    let progress = BatchProgress::new(files.len(), show_progress);

    let (service, mut state) = ClassificationService::new(pipeline);
    let mut records = Vec::new();
    let mut classified = 0usize;
    let mut failed = 0usize;

    // images() yields in collect_files() order
    for (path, loaded) in files.iter().zip(source.images()) {
        let path = path.display().to_string();
        progress.start(&path);

        let outcome = match loaded {
            Ok(raw) => {
                let request = service.submit(raw);
                debug!("Submitted {path} as request {request}");
                state
                    .wait_next()
                    .context("Classification service stopped")?
                    .outcome
                    .clone()
            }
            Err(e) => {
                warn!("Skipping {path}: {e:#}");
                Err(ClassifyError::InvalidImage)
            }
        };

        let record = ClassificationRecord::from_outcome(path, iso_timestamp(), &outcome);
        if record.is_error() {
            failed += 1;
        } else {
            classified += 1;
        }

        match format {
            OutputFormat::Text | OutputFormat::Jsonl => output.write(&record)?,
            OutputFormat::Json => records.push(record),
        }
        progress.advance();
    }

    if format == OutputFormat::Json {
        json.write_array(&records, args.pretty)?;
    }
    output.flush()?;

    progress.finish(classified, failed);
    info!("Classified {classified} image(s), {failed} failed");

    let exit_code = if failed > 0 {
        ExitCode::Failures
    } else {
        ExitCode::Success
    };

    Ok(ClassifyResult {
        classified,
        failed,
        exit_code,
    })
}

/// Generate ISO 8601 UTC timestamp (RFC 3339 format).
fn iso_timestamp() -> String {
    match time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339) {
        Ok(ts) => ts,
        Err(e) => {
            debug!("Timestamp format failed: {e}");
            String::from("1970-01-01T00:00:00Z")
        }
    }
}
