//! Test support utilities for photo-classify.
//!
//! Provides mocks of every port, synthetic image builders, and generated
//! model files for exercising the classification pipeline.
//!
//! # Example
//!
//! ```
//! use photo_classify_core::{Classification, Pipeline};
//! use photo_classify_test_support::{MockClassifier, SyntheticImageBuilder};
//! use std::sync::Arc;
//!
//! let classifier = Arc::new(MockClassifier::returning(vec![Classification::new("pizza", 0.87)]));
//! let pipeline = Pipeline::mediated(classifier);
//!
//! let result = pipeline.run(SyntheticImageBuilder::solid(32, 32, [200, 40, 40]));
//! assert_eq!(result.map(|p| p.percent()), Ok(87));
//! ```

mod builders;
mod fixtures;
mod mocks;

pub use builders::SyntheticImageBuilder;
pub use fixtures::ModelFixture;
pub use mocks::{
    GatedClassifier, MockClassifier, MockImageSource, MockResultOutput, MockScoreModel,
    PanickingClassifier,
};
