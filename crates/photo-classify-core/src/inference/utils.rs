//! Shared inference utilities.

use crate::domain::Classification;

/// Per-channel RGB mean of the ImageNet training set.
pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
/// Per-channel RGB standard deviation of the ImageNet training set.
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Pairs labels with probabilities, highest first.
///
/// Extra labels or probabilities beyond the shorter list are ignored.
#[must_use]
pub fn rank(labels: &[String], probs: &[f32]) -> Vec<Classification> {
    let mut ranked: Vec<Classification> = labels
        .iter()
        .zip(probs)
        .map(|(label, p)| Classification::new(label.as_str(), *p))
        .collect();
    ranked.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    ranked
}
