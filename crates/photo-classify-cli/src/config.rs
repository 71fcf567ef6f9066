//! Configuration file support for photo-classify.
//!
//! Supports TOML configuration from:
//! - XDG config: `~/.config/photo-classify/config.toml` (lowest priority)
//! - Project-local: `.photo-classify.toml` (searched up directory tree)
//! - CLI flags (highest priority, applied separately)

use std::path::{Path, PathBuf};

use photo_classify_core::ChannelOrder;
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General options.
    pub general: GeneralConfig,
    /// Inference pipeline settings.
    pub pipeline: PipelineConfig,
    /// Model settings.
    pub models: ModelsConfig,
    /// Output formatting settings.
    pub output: OutputConfig,
}

/// General configuration options.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Recurse into subdirectories by default.
    pub recursive: Option<bool>,
}

/// Inference pipeline configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Inference path: "mediated" or "direct".
    pub mode: Option<String>,
    /// Square model input size in pixels.
    pub input_size: Option<u32>,
    /// Direct-path buffer channel order: "bgra", "argb" or "rgba".
    pub layout: Option<String>,
    /// Premultiply color by alpha in the direct-path buffer.
    pub premultiplied: Option<bool>,
}

/// Model configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Custom models directory path.
    pub dir: Option<PathBuf>,
    /// Explicit weights file, bypassing the models directory.
    pub model: Option<PathBuf>,
    /// Explicit labels file, bypassing the models directory.
    pub labels: Option<PathBuf>,
}

/// Output formatting configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "text", "json" or "jsonl".
    pub format: Option<String>,
    /// Pretty-print JSON output.
    pub pretty: Option<bool>,
}

impl AppConfig {
    /// Load configuration from XDG and project-local files.
    ///
    /// Priority (lowest to highest):
    /// 1. XDG config: `~/.config/photo-classify/config.toml`
    /// 2. Project-local: `.photo-classify.toml` (searched up from cwd)
    ///
    /// Missing files are silently ignored. Invalid values are logged as warnings.
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(xdg_path) = xdg_config_path() {
            if xdg_path.exists() {
                info!("Loading XDG config: {}", xdg_path.display());
                if let Some(xdg_config) = load_file(&xdg_path) {
                    config = xdg_config;
                }
            } else {
                debug!("XDG config not found: {}", xdg_path.display());
            }
        }

        if let Some(project_path) = find_project_config() {
            info!("Loading project config: {}", project_path.display());
            if let Some(project_config) = load_file(&project_path) {
                config.merge(project_config);
            }
        }

        if let Err(e) = config.validate() {
            eprintln!("warning: {e}");
        }

        config
    }

    /// Validate configuration values are within acceptable ranges.
    fn validate(&self) -> Result<(), String> {
        if let Some(ref mode) = self.pipeline.mode {
            if mode != "mediated" && mode != "direct" {
                return Err(format!(
                    "pipeline.mode must be 'mediated' or 'direct', got '{mode}'"
                ));
            }
        }
        if let Some(size) = self.pipeline.input_size {
            if size == 0 {
                return Err("pipeline.input_size must be positive".to_string());
            }
        }
        if let Some(ref layout) = self.pipeline.layout {
            layout
                .parse::<ChannelOrder>()
                .map_err(|e| format!("pipeline.layout: {e}"))?;
        }
        if let Some(ref f) = self.output.format {
            if !matches!(f.as_str(), "text" | "json" | "jsonl") {
                return Err(format!(
                    "output.format must be 'text', 'json' or 'jsonl', got '{f}'"
                ));
            }
        }

        Ok(())
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` when present.
    fn merge(&mut self, other: Self) {
        self.general.recursive = other.general.recursive.or(self.general.recursive);

        self.pipeline.mode = other.pipeline.mode.or_else(|| self.pipeline.mode.take());
        self.pipeline.input_size = other.pipeline.input_size.or(self.pipeline.input_size);
        self.pipeline.layout = other.pipeline.layout.or_else(|| self.pipeline.layout.take());
        self.pipeline.premultiplied = other
            .pipeline
            .premultiplied
            .or(self.pipeline.premultiplied);

        self.models.dir = other.models.dir.or_else(|| self.models.dir.take());
        self.models.model = other.models.model.or_else(|| self.models.model.take());
        self.models.labels = other.models.labels.or_else(|| self.models.labels.take());

        self.output.format = other.output.format.or_else(|| self.output.format.take());
        self.output.pretty = other.output.pretty.or(self.output.pretty);
    }
}

/// Get the XDG config file path.
fn xdg_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("photo-classify").join("config.toml"))
}

/// Find project-local config by searching up from current directory.
fn find_project_config() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_in_parents(&cwd)
}

/// Search for `.photo-classify.toml` in the given directory and its parents.
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(".photo-classify.toml"))
        .find(|p| p.exists())
}

/// Load and parse a TOML config file.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return None;
        }
    };

    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!("Failed to parse config file {}: {}", path.display(), e);
            None
        }
    }
}
