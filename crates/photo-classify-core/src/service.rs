//! Background classification with results handed back to the UI thread.
//!
//! Each submitted image runs on its own background thread. Outcomes travel
//! over a single-consumer channel to [`LabelState`], which is owned by the UI
//! thread and is the only place the displayed label changes.
//!
//! Overlapping requests are resolved by cancel-and-replace: only the most
//! recently submitted request may update the label. A superseded worker skips
//! the model call if it has not started yet, and its result is discarded
//! otherwise. A worker that panics still reports an execution failure, so every
//! current request ends with exactly one update.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;

use tracing::{debug, warn};

use crate::domain::{ClassifyError, PredictionResult, RawImage};
use crate::pipeline::{display_text, Pipeline, INITIAL_LABEL};

/// Identifier of a classification request, increasing per submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    /// Numeric value of the id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Message posted from a background task to the UI thread.
#[derive(Debug, Clone)]
pub struct LabelUpdate {
    /// Request that produced this update.
    pub request: RequestId,
    /// Prediction or failure.
    pub outcome: Result<PredictionResult, ClassifyError>,
    /// Display text for the outcome.
    pub text: String,
}

impl LabelUpdate {
    fn new(request: RequestId, outcome: Result<PredictionResult, ClassifyError>) -> Self {
        let text = display_text(&outcome);
        Self {
            request,
            outcome,
            text,
        }
    }
}

/// Submits classification requests to background tasks.
pub struct ClassificationService {
    pipeline: Arc<Pipeline>,
    updates: Sender<LabelUpdate>,
    latest: Arc<AtomicU64>,
}

impl ClassificationService {
    /// Creates a service and the UI-side state that receives its updates.
    #[must_use]
    pub fn new(pipeline: Pipeline) -> (Self, LabelState) {
        let (tx, rx) = mpsc::channel();
        let latest = Arc::new(AtomicU64::new(0));

        let service = Self {
            pipeline: Arc::new(pipeline),
            updates: tx,
            latest: Arc::clone(&latest),
        };
        let state = LabelState {
            text: INITIAL_LABEL.to_string(),
            last: None,
            updates: rx,
            latest,
        };

        (service, state)
    }

    /// Starts classifying `raw` on a background thread.
    ///
    /// The new request supersedes any request still in flight. If the thread
    /// cannot be spawned the failure is posted as an update like any other
    /// outcome.
    pub fn submit(&self, raw: RawImage) -> RequestId {
        let id = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let request = RequestId(id);
        debug!("Submitting {} as request {request}", raw.source);

        let pipeline = Arc::clone(&self.pipeline);
        let latest = Arc::clone(&self.latest);
        let updates = self.updates.clone();

        let spawned = thread::Builder::new()
            .name(format!("classify-{id}"))
            .spawn(move || {
                if let Some(update) = run_request(&pipeline, &latest, request, raw) {
                    // The receiver only disappears when the UI shuts down.
                    let _ = updates.send(update);
                }
            });

        if let Err(e) = spawned {
            warn!("Failed to spawn classification task: {e}");
            let outcome = Err(ClassifyError::Execution(e.to_string()));
            let _ = self.updates.send(LabelUpdate::new(request, outcome));
        }

        request
    }

    /// Returns the id of the most recently submitted request, if any.
    #[must_use]
    pub fn latest(&self) -> Option<RequestId> {
        match self.latest.load(Ordering::SeqCst) {
            0 => None,
            id => Some(RequestId(id)),
        }
    }
}

/// Runs one request on the calling thread.
///
/// Returns `None` if a newer request was submitted before or during inference.
/// A panic inside the pipeline becomes an execution failure for this request.
fn run_request(
    pipeline: &Pipeline,
    latest: &AtomicU64,
    request: RequestId,
    raw: RawImage,
) -> Option<LabelUpdate> {
    if latest.load(Ordering::SeqCst) != request.0 {
        debug!("Request {request} superseded before inference");
        return None;
    }

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| pipeline.run(raw)))
        .unwrap_or_else(|payload| {
            let message = panic_message(payload.as_ref());
            warn!("Classification task for request {request} panicked: {message}");
            Err(ClassifyError::Execution(message))
        });

    if latest.load(Ordering::SeqCst) != request.0 {
        debug!("Discarding result of superseded request {request}");
        return None;
    }
    Some(LabelUpdate::new(request, outcome))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "classification task panicked".to_string())
}

/// Observed label owned by the UI thread.
pub struct LabelState {
    text: String,
    last: Option<LabelUpdate>,
    updates: Receiver<LabelUpdate>,
    latest: Arc<AtomicU64>,
}

impl LabelState {
    /// Current display text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Most recently applied update.
    #[must_use]
    pub const fn last_update(&self) -> Option<&LabelUpdate> {
        self.last.as_ref()
    }

    /// Blocks until an update for the latest request arrives and applies it.
    ///
    /// Stale updates are dropped. Returns `None` once the service is gone and
    /// no more updates can arrive.
    pub fn wait_next(&mut self) -> Option<&LabelUpdate> {
        loop {
            let update = self.updates.recv().ok()?;
            if self.is_current(&update) {
                return Some(self.apply(update));
            }
            debug!("Dropping stale update for request {}", update.request);
        }
    }

    /// Applies every update that is ready without blocking.
    ///
    /// Returns the number of updates applied.
    pub fn drain(&mut self) -> usize {
        let mut applied = 0;
        loop {
            match self.updates.try_recv() {
                Ok(update) if self.is_current(&update) => {
                    self.apply(update);
                    applied += 1;
                }
                Ok(update) => {
                    debug!("Dropping stale update for request {}", update.request);
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return applied,
            }
        }
    }

    fn is_current(&self, update: &LabelUpdate) -> bool {
        update.request.0 == self.latest.load(Ordering::SeqCst)
    }

    fn apply(&mut self, update: LabelUpdate) -> &LabelUpdate {
        self.text.clone_from(&update.text);
        self.last.insert(update)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use image::DynamicImage;

    use super::*;
    use crate::domain::{Classification, InferenceError, NormalizedImage};
    use crate::ports::ImageClassifier;

    #[derive(Default)]
    struct CountingClassifier {
        calls: AtomicUsize,
    }

    impl ImageClassifier for CountingClassifier {
        fn classify(
            &self,
            _image: &NormalizedImage,
        ) -> Result<Vec<Classification>, InferenceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![Classification::new("bagel", 0.5)])
        }
    }

    fn pixel() -> RawImage {
        RawImage::new("synthetic://pixel", DynamicImage::new_rgb8(1, 1))
    }

    #[test]
    fn test_superseded_request_skips_model() {
        let classifier = Arc::new(CountingClassifier::default());
        let pipeline = Pipeline::mediated(classifier.clone());
        let latest = AtomicU64::new(2);

        assert!(run_request(&pipeline, &latest, RequestId(1), pixel()).is_none());
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);

        let update = run_request(&pipeline, &latest, RequestId(2), pixel());
        assert_eq!(update.map(|u| u.request), Some(RequestId(2)));
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_panic_message_payloads() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42_u8), "classification task panicked");
    }

    #[test]
    fn test_request_id_display() {
        assert_eq!(RequestId(7).to_string(), "#7");
        assert_eq!(RequestId(7).get(), 7);
    }

    #[test]
    fn test_update_text_matches_outcome() {
        let update = LabelUpdate::new(RequestId(1), Err(ClassifyError::InvalidImage));
        assert_eq!(update.text, "Invalid image.");
    }
}
