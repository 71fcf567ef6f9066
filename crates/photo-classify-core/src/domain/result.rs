//! Prediction results and output records.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ClassifyError;

/// One entry of a ranked classification list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Class label.
    pub label: String,
    /// Model-reported probability (0.0 to 1.0).
    pub confidence: f32,
}

impl Classification {
    /// Creates a ranked entry.
    #[must_use]
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// The highest-scoring class for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    label: String,
    confidence: f32,
}

impl PredictionResult {
    /// Creates a prediction.
    #[must_use]
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }

    /// Predicted class label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Probability of the predicted class (0.0 to 1.0).
    #[must_use]
    pub const fn confidence(&self) -> f32 {
        self.confidence
    }

    /// Confidence rounded to the nearest whole percentage point.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn percent(&self) -> u32 {
        (self.confidence * 100.0).round().clamp(0.0, 100.0) as u32
    }
}

impl From<Classification> for PredictionResult {
    fn from(c: Classification) -> Self {
        Self::new(c.label, c.confidence)
    }
}

impl fmt::Display for PredictionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Prediction: {}\nConfidence: {}%",
            self.label,
            self.percent()
        )
    }
}

/// Whether a request produced a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    /// A prediction was produced.
    Ok,
    /// The request failed.
    Error,
}

/// Serializable outcome of classifying one image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationRecord {
    /// Path of the classified image.
    pub path: String,
    /// Timestamp of classification (ISO 8601).
    pub timestamp: String,
    /// Outcome status.
    pub status: RecordStatus,
    /// Predicted label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Predicted confidence (0.0 to 1.0).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    /// Confidence as a rounded percentage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent: Option<u32>,
    /// Human-readable display text.
    pub message: String,
}

impl ClassificationRecord {
    /// Builds a record from a pipeline outcome.
    #[must_use]
    pub fn from_outcome(
        path: impl Into<String>,
        timestamp: impl Into<String>,
        outcome: &Result<PredictionResult, ClassifyError>,
    ) -> Self {
        let (status, label, confidence, percent, message) = match outcome {
            Ok(p) => (
                RecordStatus::Ok,
                Some(p.label().to_string()),
                Some(p.confidence()),
                Some(p.percent()),
                p.to_string(),
            ),
            Err(e) => (RecordStatus::Error, None, None, None, e.to_string()),
        };
        Self {
            path: path.into(),
            timestamp: timestamp.into(),
            status,
            label,
            confidence,
            percent,
            message,
        }
    }

    /// Returns true if the request failed.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.status == RecordStatus::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_format() {
        let result = PredictionResult::new("pizza", 0.87);
        assert_eq!(result.to_string(), "Prediction: pizza\nConfidence: 87%");
    }

    #[test]
    fn test_percent_rounding() {
        assert_eq!(PredictionResult::new("a", 0.875).percent(), 88);
        assert_eq!(PredictionResult::new("a", 0.004).percent(), 0);
        assert_eq!(PredictionResult::new("a", 1.0).percent(), 100);
    }

    #[test]
    fn test_record_from_prediction() {
        let outcome = Ok(PredictionResult::new("sushi", 0.75));
        let record = ClassificationRecord::from_outcome("a.jpg", "t", &outcome);
        assert_eq!(record.status, RecordStatus::Ok);
        assert_eq!(record.label.as_deref(), Some("sushi"));
        assert_eq!(record.percent, Some(75));
        assert_eq!(record.message, "Prediction: sushi\nConfidence: 75%");
        assert!(!record.is_error());
    }

    #[test]
    fn test_record_from_failure() {
        let outcome = Err(ClassifyError::NoPrediction);
        let record = ClassificationRecord::from_outcome("a.jpg", "t", &outcome);
        assert!(record.is_error());
        assert_eq!(record.message, "No prediction found.");
        assert!(record.label.is_none());
    }

    #[test]
    fn test_record_skips_missing_fields() {
        let record = ClassificationRecord {
            path: "a.jpg".into(),
            timestamp: "1970-01-01T00:00:00Z".into(),
            status: RecordStatus::Error,
            label: None,
            confidence: None,
            percent: None,
            message: "Invalid image.".into(),
        };
        let json = serde_json::to_string(&record).unwrap_or_default();
        assert!(json.contains("\"status\":\"error\""));
        assert!(!json.contains("label"));
    }
}
