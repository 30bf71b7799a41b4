use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::errors::AppError;

/// Human-facing risk label, ordered from least to most risky.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
pub enum RiskBucket {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskBucket::Low => "Low",
            RiskBucket::Medium => "Medium",
            RiskBucket::High => "High",
        };
        f.write_str(label)
    }
}

/// Lower bounds of the Medium and High buckets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskThresholds {
    medium: f64,
    high: f64,
}

impl RiskThresholds {
    pub const DEFAULT_MEDIUM: f64 = 0.3;
    pub const DEFAULT_HIGH: f64 = 0.7;

    /// Requires `0 < medium < high <= 1`.
    pub fn new(medium: f64, high: f64) -> Result<Self, AppError> {
        if !(medium > 0.0 && medium < high && high <= 1.0) {
            return Err(AppError::InvalidArgument(format!(
                "risk thresholds must satisfy 0 < medium < high <= 1, got medium={} high={}",
                medium, high
            )));
        }
        Ok(Self { medium, high })
    }

    pub fn medium(&self) -> f64 {
        self.medium
    }

    pub fn high(&self) -> f64 {
        self.high
    }
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            medium: Self::DEFAULT_MEDIUM,
            high: Self::DEFAULT_HIGH,
        }
    }
}

/// Maps a default probability to a [`RiskBucket`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskBucketizer {
    thresholds: RiskThresholds,
}

impl RiskBucketizer {
    pub fn new(thresholds: RiskThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> RiskThresholds {
        self.thresholds
    }

    /// Buckets `probability`, which must lie in [0, 1].
    pub fn bucket(&self, probability: f64) -> Result<RiskBucket, AppError> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(AppError::InvalidArgument(format!(
                "probability must be in [0, 1], got {}",
                probability
            )));
        }

        let bucket = if probability >= self.thresholds.high {
            RiskBucket::High
        } else if probability >= self.thresholds.medium {
            RiskBucket::Medium
        } else {
            RiskBucket::Low
        };
        Ok(bucket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_boundaries() {
        let b = RiskBucketizer::default();

        assert_eq!(b.bucket(0.0).unwrap(), RiskBucket::Low);
        assert_eq!(b.bucket(0.2999).unwrap(), RiskBucket::Low);
        assert_eq!(b.bucket(0.3).unwrap(), RiskBucket::Medium);
        assert_eq!(b.bucket(0.6999).unwrap(), RiskBucket::Medium);
        assert_eq!(b.bucket(0.7).unwrap(), RiskBucket::High);
        assert_eq!(b.bucket(1.0).unwrap(), RiskBucket::High);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let b = RiskBucketizer::default();

        assert!(matches!(b.bucket(-0.01), Err(AppError::InvalidArgument(_))));
        assert!(matches!(b.bucket(1.01), Err(AppError::InvalidArgument(_))));
        assert!(matches!(b.bucket(f64::NAN), Err(AppError::InvalidArgument(_))));
    }

    #[test]
    fn test_custom_thresholds() {
        let b = RiskBucketizer::new(RiskThresholds::new(0.1, 0.5).unwrap());

        assert_eq!(b.bucket(0.05).unwrap(), RiskBucket::Low);
        assert_eq!(b.bucket(0.1).unwrap(), RiskBucket::Medium);
        assert_eq!(b.bucket(0.5).unwrap(), RiskBucket::High);
    }

    #[test]
    fn test_invalid_thresholds() {
        assert!(RiskThresholds::new(0.0, 0.5).is_err());
        assert!(RiskThresholds::new(0.6, 0.5).is_err());
        assert!(RiskThresholds::new(0.5, 0.5).is_err());
        assert!(RiskThresholds::new(0.3, 1.2).is_err());
        assert!(RiskThresholds::new(f64::NAN, 0.5).is_err());
    }

    #[test]
    fn test_bucket_ordering_and_display() {
        assert!(RiskBucket::Low < RiskBucket::Medium);
        assert!(RiskBucket::Medium < RiskBucket::High);
        assert_eq!(RiskBucket::High.to_string(), "High");
        assert_eq!(
            serde_json::to_string(&RiskBucket::Medium).unwrap(),
            "\"Medium\""
        );
    }
}
