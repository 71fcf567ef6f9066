//! Classification service tests: background tasks and label handoff.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use photo_classify_core::{
    Classification, ClassificationRecord, ClassificationService, ClassifyError, ImageSource,
    Pipeline, RecordStatus, ResultOutput, INITIAL_LABEL,
};
use photo_classify_test_support::{
    GatedClassifier, MockClassifier, MockImageSource, MockResultOutput, PanickingClassifier,
    SyntheticImageBuilder,
};

#[test]
fn test_initial_label() {
    let pipeline = Pipeline::mediated(Arc::new(MockClassifier::returning(vec![])));
    let (service, state) = ClassificationService::new(pipeline);

    assert_eq!(state.text(), INITIAL_LABEL);
    assert_eq!(state.text(), "Select an image to classify");
    assert!(state.last_update().is_none());
    assert!(service.latest().is_none());
}

#[test]
fn test_update_delivered_to_label_state() {
    let classifier = Arc::new(MockClassifier::returning(vec![Classification::new(
        "pizza", 0.87,
    )]));
    let (service, mut state) = ClassificationService::new(Pipeline::mediated(classifier));

    let request = service.submit(SyntheticImageBuilder::solid(16, 16, [1, 2, 3]));
    let update = state.wait_next().expect("update");

    assert_eq!(update.request, request);
    assert_eq!(update.text, "Prediction: pizza\nConfidence: 87%");
    assert_eq!(state.text(), "Prediction: pizza\nConfidence: 87%");
}

#[test]
fn test_failure_delivered_to_label_state() {
    let classifier = Arc::new(MockClassifier::returning(vec![]));
    let (service, mut state) = ClassificationService::new(Pipeline::mediated(classifier));

    service.submit(SyntheticImageBuilder::empty());
    let update = state.wait_next().expect("update");

    assert_eq!(update.outcome, Err(ClassifyError::InvalidImage));
    assert_eq!(state.text(), "Invalid image.");
}

#[test]
fn test_request_ids_increase() {
    let classifier = Arc::new(MockClassifier::returning(vec![Classification::new("a", 1.0)]));
    let (service, mut state) = ClassificationService::new(Pipeline::mediated(classifier));

    let first = service.submit(SyntheticImageBuilder::solid(4, 4, [0, 0, 0]));
    state.wait_next().expect("first update");
    let second = service.submit(SyntheticImageBuilder::solid(4, 4, [0, 0, 0]));
    state.wait_next().expect("second update");

    assert!(second > first);
    assert_eq!(service.latest(), Some(second));
}

#[test]
fn test_latest_request_wins() {
    let classifier = Arc::new(GatedClassifier::new("latest"));
    let (service, mut state) =
        ClassificationService::new(Pipeline::mediated(classifier.clone()));

    let first = service.submit(SyntheticImageBuilder::solid(4, 4, [0, 0, 0]));
    classifier.wait_for_calls(1);
    let second = service.submit(SyntheticImageBuilder::solid(4, 4, [0, 0, 0]));
    classifier.wait_for_calls(2);
    classifier.open();

    let update = state.wait_next().expect("update");
    assert_eq!(update.request, second);
    assert_ne!(update.request, first);

    // Dropping the service closes the channel once all workers are done.
    drop(service);
    assert!(state.wait_next().is_none());
    assert_eq!(state.text(), "Prediction: latest\nConfidence: 100%");
}

#[test]
fn test_drain_without_updates() {
    let pipeline = Pipeline::mediated(Arc::new(MockClassifier::returning(vec![])));
    let (_service, mut state) = ClassificationService::new(pipeline);

    assert_eq!(state.drain(), 0);
    assert_eq!(state.text(), INITIAL_LABEL);
}

#[test]
fn test_drain_applies_ready_update() {
    let classifier = Arc::new(MockClassifier::returning(vec![Classification::new(
        "ramen", 0.42,
    )]));
    let (service, mut state) = ClassificationService::new(Pipeline::mediated(classifier));

    let request = service.submit(SyntheticImageBuilder::solid(8, 8, [9, 9, 9]));
    let deadline = Instant::now() + Duration::from_secs(10);
    let mut applied = 0;
    while applied == 0 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
        applied = state.drain();
    }

    assert_eq!(applied, 1);
    assert_eq!(state.last_update().map(|u| u.request), Some(request));
    assert_eq!(state.text(), "Prediction: ramen\nConfidence: 42%");
    assert_eq!(state.drain(), 0);
}

#[test]
fn test_panicking_classifier_reports_failure() {
    let classifier = Arc::new(PanickingClassifier::new("weights corrupted"));
    let (service, mut state) = ClassificationService::new(Pipeline::mediated(classifier));

    let request = service.submit(SyntheticImageBuilder::solid(4, 4, [0, 0, 0]));
    let update = state.wait_next().expect("update after panic");

    assert_eq!(update.request, request);
    assert_eq!(
        update.outcome,
        Err(ClassifyError::Execution("weights corrupted".to_string()))
    );
    assert_eq!(state.text(), "Error: weights corrupted");

    // Exactly one update per request, even after a panic.
    drop(service);
    assert!(state.wait_next().is_none());
}

#[test]
fn test_batch_from_source_to_output() {
    let classifier = Arc::new(MockClassifier::returning(vec![Classification::new(
        "taco", 0.61,
    )]));
    let (service, mut state) = ClassificationService::new(Pipeline::mediated(classifier.clone()));
    let source = MockImageSource::new(vec![
        SyntheticImageBuilder::solid(8, 8, [1, 1, 1]),
        SyntheticImageBuilder::empty(),
        SyntheticImageBuilder::gradient(12, 6),
    ]);
    let output = MockResultOutput::new();

    assert_eq!(source.count_hint(), Some(3));
    for raw in source.images() {
        let raw = raw.unwrap();
        let path = raw.source.clone();
        service.submit(raw);
        let update = state.wait_next().expect("update");
        let record = ClassificationRecord::from_outcome(path, "t", &update.outcome);
        output.write(&record).unwrap();
    }
    output.flush().unwrap();

    let statuses: Vec<RecordStatus> = output.records().iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![RecordStatus::Ok, RecordStatus::Error, RecordStatus::Ok]
    );
    assert_eq!(output.records()[1].message, "Invalid image.");
    assert_eq!(output.records()[2].label.as_deref(), Some("taco"));
    assert_eq!(output.flush_count(), 1);
    assert_eq!(source.iteration_count(), 1);
    // The empty image never reaches the model.
    assert_eq!(classifier.call_count(), 2);
}
