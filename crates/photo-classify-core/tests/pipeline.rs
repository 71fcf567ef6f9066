//! Pipeline integration tests using mock models and synthetic images.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

use std::sync::Arc;

use photo_classify_core::pipeline::apply_orientation;
use photo_classify_core::{
    display_text, normalize_orientation, AlphaMode, ChannelOrder, Classification, ClassifyError,
    InferenceError, InferencePath, InputSpec, Orientation, PixelLayout, Pipeline, RawImage,
};
use image::DynamicImage;
use photo_classify_test_support::{MockClassifier, MockScoreModel, SyntheticImageBuilder};

// === Orientation Normalizer ===

#[test]
fn test_upright_is_pixel_identical() {
    let raw = SyntheticImageBuilder::gradient(17, 9);
    let before = raw.image.to_rgb8();

    let normalized = normalize_orientation(raw);
    assert_eq!(normalized.image().to_rgb8(), before);
}

#[test]
fn test_every_orientation_restores_upright_content() {
    let upright = SyntheticImageBuilder::quadrants(8, 6);

    for orientation in Orientation::ALL {
        let raw = SyntheticImageBuilder::stored_as(&upright, orientation);
        let normalized = normalize_orientation(raw);

        assert_eq!(normalized.orientation(), Orientation::Up);
        assert_eq!(
            normalized.image().to_rgb8(),
            upright.to_rgb8(),
            "content mismatch for {orientation:?}"
        );
    }
}

#[test]
fn test_normalize_matches_manual_rotation() {
    let stored = SyntheticImageBuilder::quadrants(8, 6);
    let raw = photo_classify_core::RawImage::with_orientation(
        "synthetic://manual",
        stored.clone(),
        Orientation::Right,
    );

    let normalized = normalize_orientation(raw);
    assert_eq!(normalized.image().to_rgb8(), stored.rotate90().to_rgb8());
    assert_eq!(
        apply_orientation(stored.clone(), Orientation::Right).to_rgb8(),
        stored.rotate90().to_rgb8()
    );
}

// === Mediated Path ===

#[test]
fn test_mediated_single_entry() {
    let classifier = Arc::new(MockClassifier::returning(vec![Classification::new(
        "pizza", 0.87,
    )]));
    let pipeline = Pipeline::mediated(classifier);

    let outcome = pipeline.run(SyntheticImageBuilder::solid(64, 64, [220, 180, 60]));
    assert_eq!(display_text(&outcome), "Prediction: pizza\nConfidence: 87%");
}

#[test]
fn test_mediated_takes_first_entry() {
    let classifier = Arc::new(MockClassifier::returning(vec![
        Classification::new("sushi", 0.6),
        Classification::new("pizza", 0.3),
    ]));
    let pipeline = Pipeline::mediated(classifier);

    let prediction = pipeline
        .run(SyntheticImageBuilder::solid(8, 8, [0, 0, 0]))
        .unwrap();
    assert_eq!(prediction.label(), "sushi");
}

#[test]
fn test_mediated_empty_list() {
    let pipeline = Pipeline::mediated(Arc::new(MockClassifier::returning(vec![])));
    let outcome = pipeline.run(SyntheticImageBuilder::solid(8, 8, [0, 0, 0]));

    assert_eq!(outcome, Err(ClassifyError::NoPrediction));
    assert_eq!(display_text(&outcome), "No prediction found.");
}

#[test]
fn test_mediated_load_failure() {
    let pipeline = Pipeline::mediated(Arc::new(MockClassifier::failing(InferenceError::Load(
        "no weights".into(),
    ))));
    let outcome = pipeline.run(SyntheticImageBuilder::solid(8, 8, [0, 0, 0]));

    assert_eq!(display_text(&outcome), "Failed to load model.");
}

#[test]
fn test_mediated_execution_failure() {
    let pipeline = Pipeline::mediated(Arc::new(MockClassifier::failing(
        InferenceError::Execution("tensor shape mismatch".into()),
    )));
    let outcome = pipeline.run(SyntheticImageBuilder::solid(8, 8, [0, 0, 0]));

    assert_eq!(display_text(&outcome), "Error: tensor shape mismatch");
}

#[test]
fn test_mediated_receives_upright_image() {
    let classifier = Arc::new(MockClassifier::returning(vec![Classification::new("a", 1.0)]));
    let pipeline = Pipeline::mediated(classifier.clone());

    let upright = SyntheticImageBuilder::quadrants(30, 20);
    let raw = SyntheticImageBuilder::stored_as(&upright, Orientation::Left);
    assert_eq!((raw.width, raw.height), (20, 30));

    pipeline.run(raw).unwrap();
    assert_eq!(classifier.input_sizes(), vec![(30, 20)]);
}

#[test]
fn test_invalid_image_skips_model() {
    let classifier = Arc::new(MockClassifier::returning(vec![Classification::new("a", 1.0)]));
    let pipeline = Pipeline::mediated(classifier.clone());

    let outcome = pipeline.run(SyntheticImageBuilder::empty());
    assert_eq!(display_text(&outcome), "Invalid image.");
    assert_eq!(classifier.call_count(), 0);
}

#[test]
fn test_repeated_runs_are_identical() {
    let classifier = Arc::new(MockClassifier::returning(vec![Classification::new(
        "taco", 0.42,
    )]));
    let pipeline = Pipeline::mediated(classifier);
    let raw = SyntheticImageBuilder::gradient(32, 32);

    let first = pipeline.run(raw.clone());
    let second = pipeline.run(raw);
    assert_eq!(first, second);
}

// === Direct Path ===

#[test]
fn test_direct_selects_maximum() {
    let model = Arc::new(MockScoreModel::returning(&[
        ("pizza", 0.2),
        ("sushi", 0.75),
        ("taco", 0.05),
    ]));
    let pipeline = Pipeline::direct(model, InputSpec::default());
    assert_eq!(pipeline.path(), InferencePath::Direct);

    let prediction = pipeline
        .run(SyntheticImageBuilder::solid(500, 300, [10, 20, 30]))
        .unwrap();
    assert_eq!(prediction.label(), "sushi");
    assert_eq!(prediction.percent(), 75);
}

#[test]
fn test_direct_buffer_matches_input_spec() {
    let model = Arc::new(MockScoreModel::returning(&[("a", 1.0)]));
    let layout = PixelLayout::new(ChannelOrder::Bgra, AlphaMode::Opaque);
    let pipeline = Pipeline::direct(model.clone(), InputSpec::square(32).with_layout(layout));

    pipeline
        .run(SyntheticImageBuilder::solid(100, 60, [10, 20, 30]))
        .unwrap();

    let buffers = model.buffers();
    assert_eq!(buffers.len(), 1);
    let buffer = &buffers[0];
    assert_eq!((buffer.width(), buffer.height()), (32, 32));
    assert_eq!(buffer.bytes_per_row(), 32 * 4);
    assert_eq!(&buffer.as_bytes()[..4], &[30, 20, 10, 255]);
}

#[test]
fn test_direct_zero_input_size_fails_resize() {
    let model = Arc::new(MockScoreModel::returning(&[("a", 1.0)]));
    let pipeline = Pipeline::direct(model.clone(), InputSpec::square(0));

    let outcome = pipeline.run(SyntheticImageBuilder::solid(8, 8, [0, 0, 0]));
    assert_eq!(display_text(&outcome), "Failed to resize image.");
    assert_eq!(model.call_count(), 0);
}

#[test]
fn test_direct_empty_pixels_with_stale_size_is_invalid() {
    let model = Arc::new(MockScoreModel::returning(&[("a", 1.0)]));
    let pipeline = Pipeline::direct(model.clone(), InputSpec::square(8));
    let raw = RawImage {
        width: 4,
        height: 4,
        ..RawImage::new("synthetic://stale", DynamicImage::new_rgb8(0, 0))
    };

    assert_eq!(pipeline.run(raw), Err(ClassifyError::InvalidImage));
    assert_eq!(model.call_count(), 0);
}

#[test]
fn test_direct_nan_score_ignored() {
    let model = Arc::new(MockScoreModel::returning(&[("a", f32::NAN), ("b", 0.9)]));
    let pipeline = Pipeline::direct(model, InputSpec::square(8));
    let outcome = pipeline.run(SyntheticImageBuilder::solid(8, 8, [0, 0, 0]));

    assert_eq!(display_text(&outcome), "Prediction: b\nConfidence: 90%");
}

#[test]
fn test_direct_empty_scores() {
    let pipeline = Pipeline::direct(Arc::new(MockScoreModel::returning(&[])), InputSpec::square(8));
    let outcome = pipeline.run(SyntheticImageBuilder::solid(8, 8, [0, 0, 0]));

    assert_eq!(display_text(&outcome), "Failed to process output dictionary.");
}

#[test]
fn test_direct_prediction_failure() {
    let pipeline = Pipeline::direct(
        Arc::new(MockScoreModel::failing(InferenceError::Execution(
            "bad input".into(),
        ))),
        InputSpec::square(8),
    );
    let outcome = pipeline.run(SyntheticImageBuilder::solid(8, 8, [0, 0, 0]));

    assert_eq!(display_text(&outcome), "Error: bad input");
}

#[test]
fn test_direct_premultiplied_layout() {
    let model = Arc::new(MockScoreModel::returning(&[("a", 1.0)]));
    let layout = PixelLayout::new(ChannelOrder::Argb, AlphaMode::Premultiplied);
    let pipeline = Pipeline::direct(model.clone(), InputSpec::square(4).with_layout(layout));

    pipeline
        .run(SyntheticImageBuilder::translucent(4, 4, [255, 0, 0, 0]))
        .unwrap();

    let buffers = model.buffers();
    assert_eq!(&buffers[0].as_bytes()[..4], &[0, 0, 0, 0]);
}
