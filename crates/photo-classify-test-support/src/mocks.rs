//! Mock implementations of core port traits.

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, PoisonError};

use photo_classify_core::domain::{
    Classification, ClassificationRecord, InferenceBuffer, InferenceError, NormalizedImage,
    RawImage,
};
use photo_classify_core::ports::{ImageClassifier, ImageSource, ResultOutput, ScoreModel};

/// Mock implementation of `ImageClassifier`.
///
/// Returns a fixed outcome and records the dimensions of each input.
pub struct MockClassifier {
    outcome: Result<Vec<Classification>, InferenceError>,
    inputs: Mutex<Vec<(u32, u32)>>,
}

impl MockClassifier {
    /// Creates a classifier that always returns `ranked`.
    #[must_use]
    pub fn returning(ranked: Vec<Classification>) -> Self {
        Self {
            outcome: Ok(ranked),
            inputs: Mutex::new(Vec::new()),
        }
    }

    /// Creates a classifier that always fails with `err`.
    #[must_use]
    pub fn failing(err: InferenceError) -> Self {
        Self {
            outcome: Err(err),
            inputs: Mutex::new(Vec::new()),
        }
    }

    /// Returns the number of times `classify` was called.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.inputs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns the `(width, height)` of every image passed in.
    #[must_use]
    pub fn input_sizes(&self) -> Vec<(u32, u32)> {
        self.inputs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ImageClassifier for MockClassifier {
    fn classify(&self, image: &NormalizedImage) -> Result<Vec<Classification>, InferenceError> {
        self.inputs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((image.width(), image.height()));
        self.outcome.clone()
    }
}

/// Mock implementation of `ScoreModel`.
///
/// Returns a fixed score mapping and captures every buffer it receives.
pub struct MockScoreModel {
    outcome: Result<HashMap<String, f32>, InferenceError>,
    buffers: Mutex<Vec<InferenceBuffer>>,
}

impl MockScoreModel {
    /// Creates a model that always returns the given scores.
    #[must_use]
    pub fn returning(scores: &[(&str, f32)]) -> Self {
        Self {
            outcome: Ok(scores
                .iter()
                .map(|(label, score)| ((*label).to_string(), *score))
                .collect()),
            buffers: Mutex::new(Vec::new()),
        }
    }

    /// Creates a model that always fails with `err`.
    #[must_use]
    pub fn failing(err: InferenceError) -> Self {
        Self {
            outcome: Err(err),
            buffers: Mutex::new(Vec::new()),
        }
    }

    /// Returns the number of times `predict` was called.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.buffers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns all captured buffers.
    #[must_use]
    pub fn buffers(&self) -> Vec<InferenceBuffer> {
        self.buffers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ScoreModel for MockScoreModel {
    fn predict(&self, buffer: &InferenceBuffer) -> Result<HashMap<String, f32>, InferenceError> {
        self.buffers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(buffer.clone());
        self.outcome.clone()
    }
}

/// Classifier that blocks every call until the gate is opened.
///
/// Used to hold background requests in flight while newer ones are submitted.
pub struct GatedClassifier {
    label: String,
    gate: Arc<(Mutex<bool>, Condvar)>,
    entered: Arc<(Mutex<usize>, Condvar)>,
}

impl GatedClassifier {
    /// Creates a closed gate answering with `label` at full confidence.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            gate: Arc::new((Mutex::new(false), Condvar::new())),
            entered: Arc::new((Mutex::new(0), Condvar::new())),
        }
    }

    /// Opens the gate and releases every blocked call.
    pub fn open(&self) {
        let (lock, cvar) = &*self.gate;
        *lock.lock().unwrap_or_else(PoisonError::into_inner) = true;
        cvar.notify_all();
    }

    /// Blocks until `n` calls have entered `classify`.
    pub fn wait_for_calls(&self, n: usize) {
        let (lock, cvar) = &*self.entered;
        let mut entered = lock.lock().unwrap_or_else(PoisonError::into_inner);
        while *entered < n {
            entered = cvar.wait(entered).unwrap_or_else(PoisonError::into_inner);
        }
    }
}

impl ImageClassifier for GatedClassifier {
    fn classify(&self, _image: &NormalizedImage) -> Result<Vec<Classification>, InferenceError> {
        {
            let (lock, cvar) = &*self.entered;
            *lock.lock().unwrap_or_else(PoisonError::into_inner) += 1;
            cvar.notify_all();
        }

        let (lock, cvar) = &*self.gate;
        let mut open = lock.lock().unwrap_or_else(PoisonError::into_inner);
        while !*open {
            open = cvar.wait(open).unwrap_or_else(PoisonError::into_inner);
        }

        Ok(vec![Classification::new(self.label.as_str(), 1.0)])
    }
}

/// Classifier whose every call panics with a fixed message.
pub struct PanickingClassifier {
    message: &'static str,
}

impl PanickingClassifier {
    /// Creates a classifier that panics with `message`.
    #[must_use]
    pub const fn new(message: &'static str) -> Self {
        Self { message }
    }
}

impl ImageClassifier for PanickingClassifier {
    fn classify(&self, _image: &NormalizedImage) -> Result<Vec<Classification>, InferenceError> {
        panic!("{}", self.message)
    }
}

/// Mock implementation of `ImageSource` for testing.
///
/// Yields pre-built images and tracks iteration for assertions.
pub struct MockImageSource {
    images: Vec<RawImage>,
    iteration_count: Arc<Mutex<usize>>,
}

impl MockImageSource {
    /// Creates a new mock source with the given images.
    #[must_use]
    pub fn new(images: Vec<RawImage>) -> Self {
        Self {
            images,
            iteration_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Returns the number of times the source has been iterated.
    #[must_use]
    pub fn iteration_count(&self) -> usize {
        *self
            .iteration_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl ImageSource for MockImageSource {
    fn images(&self) -> Box<dyn Iterator<Item = anyhow::Result<RawImage>> + Send + '_> {
        *self
            .iteration_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner) += 1;
        Box::new(self.images.iter().cloned().map(Ok))
    }

    fn count_hint(&self) -> Option<usize> {
        Some(self.images.len())
    }
}

/// Mock implementation of `ResultOutput` for testing.
///
/// Captures records for later assertions.
#[derive(Default)]
pub struct MockResultOutput {
    records: Mutex<Vec<ClassificationRecord>>,
    flush_count: Mutex<usize>,
}

impl MockResultOutput {
    /// Creates a new mock output.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all captured records.
    #[must_use]
    pub fn records(&self) -> Vec<ClassificationRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of times `flush()` was called.
    #[must_use]
    pub fn flush_count(&self) -> usize {
        *self
            .flush_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl ResultOutput for MockResultOutput {
    fn write(&self, record: &ClassificationRecord) -> anyhow::Result<()> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        Ok(())
    }

    fn flush(&self) -> anyhow::Result<()> {
        *self
            .flush_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }
}
