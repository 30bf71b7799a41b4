use std::sync::Arc;

use crate::classifier::{Classifier, POSITIVE_CLASS};
use crate::errors::{AppError, ResultExt};
use crate::features::FeatureBuilder;
use crate::models::{PredictionResult, RawInput};
use crate::risk::RiskBucketizer;

/// Scores one applicant: feature row, classifier, risk bucket.
///
/// Built once by the composition root and shared by reference.
#[derive(Clone)]
pub struct ScoringService {
    classifier: Arc<dyn Classifier>,
    builder: FeatureBuilder,
    bucketizer: RiskBucketizer,
}

impl ScoringService {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        builder: FeatureBuilder,
        bucketizer: RiskBucketizer,
    ) -> Self {
        Self {
            classifier,
            builder,
            bucketizer,
        }
    }

    pub fn model_name(&self) -> &str {
        self.classifier.name()
    }

    pub fn builder(&self) -> &FeatureBuilder {
        &self.builder
    }

    pub fn score(&self, input: &RawInput) -> Result<PredictionResult, AppError> {
        tracing::debug!("Scoring input: {:?}", input);

        let row = self.builder.build_checked(input)?;

        let proba = self
            .classifier
            .predict_proba(&row)
            .with_context(|| format!("classifier '{}' failed", self.classifier.name()))?;

        let probability = *proba.get(POSITIVE_CLASS).ok_or_else(|| {
            AppError::ModelError(format!(
                "classifier returned {} class probabilities, expected at least {}",
                proba.len(),
                POSITIVE_CLASS + 1
            ))
        })?;

        let risk = self
            .bucketizer
            .bucket(probability)
            .context("bucketing classifier output")?;

        Ok(PredictionResult { probability, risk })
    }
}
