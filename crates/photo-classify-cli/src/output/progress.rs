//! Batch progress bar using indicatif.

use indicatif::{ProgressBar, ProgressStyle};

/// Progress over a batch of images, drawn on stderr.
///
/// Hidden entirely when disabled, so callers never branch on it.
pub struct BatchProgress {
    bar: Option<ProgressBar>,
}

impl BatchProgress {
    /// Creates a progress bar for `total` images, or a hidden one.
    #[must_use]
    pub fn new(total: usize, enabled: bool) -> Self {
        if !enabled {
            return Self { bar: None };
        }

        let bar = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            bar.set_style(style.progress_chars("#>-"));
        }

        Self { bar: Some(bar) }
    }

    /// Marks the start of work on `path`.
    pub fn start(&self, path: &str) {
        if let Some(bar) = &self.bar {
            bar.set_message(path.to_string());
        }
    }

    /// Advances past one finished image.
    pub fn advance(&self) {
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    /// Finishes the bar with a summary.
    pub fn finish(&self, classified: usize, failed: usize) {
        if let Some(bar) = &self.bar {
            bar.finish_with_message(format!("Done: {classified} classified, {failed} failed"));
        }
    }
}
