use anyhow::Context;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::Path;

use crate::errors::AppError;
use crate::models::{FeatureRow, FEATURE_COLUMNS};

/// Scores a feature row.
///
/// Implementations return one probability per outcome class; the default
/// (positive) class is at index 1.
pub trait Classifier: Send + Sync {
    fn predict_proba(&self, row: &FeatureRow) -> Result<Vec<f64>, AppError>;

    /// Name reported alongside each prediction.
    fn name(&self) -> &str;
}

/// Index of the default class in `predict_proba` output.
pub const POSITIVE_CLASS: usize = 1;

/// Contribution of a numeric column: `weight * (value - center) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericTerm {
    pub weight: f64,
    #[serde(default)]
    pub center: f64,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_scale() -> f64 {
    1.0
}

/// Logistic scorecard loaded from a JSON artifact.
///
/// ```json
/// {
///   "model_name": "credit-scorecard",
///   "feature_names": ["loan_amnt", "term", "..."],
///   "intercept": -1.5,
///   "numeric": { "dti": { "weight": 0.4, "center": 15.0, "scale": 8.0 } },
///   "categorical": { "grade": { "A": -0.6, "B": 0.0 } }
/// }
/// ```
///
/// Categorical levels absent from the table contribute nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorecardModel {
    pub model_name: String,
    pub feature_names: Vec<String>,
    pub intercept: f64,
    #[serde(default)]
    pub numeric: BTreeMap<String, NumericTerm>,
    #[serde(default)]
    pub categorical: BTreeMap<String, BTreeMap<String, f64>>,
    #[serde(skip)]
    fingerprint: String,
}

/// SHA-256 of the artifact bytes, hex encoded.
pub fn compute_checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

impl ScorecardModel {
    /// Loads and validates the artifact at `path`.
    ///
    /// When `expected_sha256` is given the file must hash to it. Any failure is
    /// meant to abort startup.
    pub fn load(path: impl AsRef<Path>, expected_sha256: Option<&str>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read model artifact {}", path.display()))?;

        let fingerprint = compute_checksum(&bytes);
        if let Some(expected) = expected_sha256 {
            if !fingerprint.eq_ignore_ascii_case(expected.trim()) {
                anyhow::bail!(
                    "model artifact checksum mismatch for {}: expected {}, got {}",
                    path.display(),
                    expected.trim(),
                    fingerprint
                );
            }
        }

        let mut model: ScorecardModel = serde_json::from_slice(&bytes)
            .with_context(|| format!("failed to parse model artifact {}", path.display()))?;
        model.validate()?;
        model.fingerprint = fingerprint;

        tracing::info!(
            "Loaded model '{}' from {} (sha256 {})",
            model.model_name,
            path.display(),
            model.fingerprint
        );
        Ok(model)
    }

    /// Parses an artifact from a JSON string, hashing the string as the fingerprint.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let mut model: ScorecardModel =
            serde_json::from_str(json).context("failed to parse model artifact")?;
        model.validate()?;
        model.fingerprint = compute_checksum(json.as_bytes());
        Ok(model)
    }

    /// Checks the artifact against the feature row schema.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.feature_names.len() != FEATURE_COLUMNS.len() {
            anyhow::bail!(
                "model expects {} features, feature row has {}",
                self.feature_names.len(),
                FEATURE_COLUMNS.len()
            );
        }
        for (position, (trained, built)) in
            self.feature_names.iter().zip(FEATURE_COLUMNS).enumerate()
        {
            if trained != built {
                anyhow::bail!(
                    "feature {} is '{}' in the model but '{}' in the feature row",
                    position,
                    trained,
                    built
                );
            }
        }

        for (name, term) in &self.numeric {
            if !FEATURE_COLUMNS.contains(&name.as_str()) {
                anyhow::bail!("numeric term references unknown feature '{}'", name);
            }
            if !(term.scale.is_finite() && term.scale > 0.0) {
                anyhow::bail!("numeric term '{}' must have a positive scale", name);
            }
            if !(term.weight.is_finite() && term.center.is_finite()) {
                anyhow::bail!("numeric term '{}' has a non-finite coefficient", name);
            }
        }
        for name in self.categorical.keys() {
            if !FEATURE_COLUMNS.contains(&name.as_str()) {
                anyhow::bail!("categorical term references unknown feature '{}'", name);
            }
        }
        if !self.intercept.is_finite() {
            anyhow::bail!("intercept must be finite");
        }

        Ok(())
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Linear score (log-odds) of the row.
    pub fn decision_function(&self, row: &FeatureRow) -> Result<f64, AppError> {
        let mut score = self.intercept;

        for (name, value) in row.columns() {
            if let Some(term) = self.numeric.get(name) {
                let x = value.as_f64().ok_or_else(|| {
                    AppError::SchemaMismatch(format!(
                        "feature '{}' is text but the model treats it as numeric",
                        name
                    ))
                })?;
                score += term.weight * (x - term.center) / term.scale;
            }
            if let Some(levels) = self.categorical.get(name) {
                let level = value.as_str().ok_or_else(|| {
                    AppError::SchemaMismatch(format!(
                        "feature '{}' is numeric but the model treats it as categorical",
                        name
                    ))
                })?;
                score += levels.get(level).copied().unwrap_or(0.0);
            }
        }

        Ok(score)
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl Classifier for ScorecardModel {
    fn predict_proba(&self, row: &FeatureRow) -> Result<Vec<f64>, AppError> {
        let z = self.decision_function(row)?;
        if !z.is_finite() {
            return Err(AppError::ModelError(format!(
                "non-finite decision score {}",
                z
            )));
        }
        let p = sigmoid(z);
        Ok(vec![1.0 - p, p])
    }

    fn name(&self) -> &str {
        &self.model_name
    }
}
