use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::risk::RiskBucket;

// ============ Applicant Input ============

/// Applicant attributes collected by the form.
///
/// Domain: `loan_amnt >= 1000`, `annual_inc >= 1000`, `int_rate` in [5, 30],
/// `installment >= 100`, `dti` in [0, 40], `credit_length` in [0, 40],
/// `revol_bal >= 0`, `delinq_2yrs` in {0, 1, 2, 3}.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RawInput {
    /// Requested loan amount.
    pub loan_amnt: f64,
    /// Annual income.
    pub annual_inc: f64,
    /// Interest rate in percent.
    pub int_rate: f64,
    /// Monthly installment.
    pub installment: f64,
    /// Debt-to-income ratio.
    pub dti: f64,
    /// Credit history length in years.
    pub credit_length: u32,
    /// Revolving balance.
    pub revol_bal: f64,
    /// Delinquencies in the last two years.
    pub delinq_2yrs: u8,
}

// ============ Feature Row ============

/// Ordered column names the classifier was trained on.
pub const FEATURE_COLUMNS: [&str; 26] = [
    "loan_amnt",
    "term",
    "int_rate",
    "installment",
    "grade",
    "sub_grade",
    "emp_length",
    "home_ownership",
    "annual_inc",
    "verification_status",
    "purpose",
    "dti",
    "delinq_2yrs",
    "inq_last_6mths",
    "open_acc",
    "pub_rec",
    "revol_bal",
    "revol_util",
    "total_acc",
    "credit_length",
    "income_to_loan",
    "installment_to_income",
    "credit_utilization",
    "has_delinquency",
    "credit_length_bin",
    "int_rate_bin",
];

/// A single cell of the feature row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Float(f64),
    Int(i64),
    Text(String),
}

impl FeatureValue {
    /// Numeric view of the cell; `None` for text.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FeatureValue::Float(v) => Some(*v),
            FeatureValue::Int(v) => Some(*v as f64),
            FeatureValue::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FeatureValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// The fixed-schema record consumed by the classifier.
///
/// Field declaration order is the schema order; serialization preserves it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRow {
    pub loan_amnt: f64,
    pub term: String,
    pub int_rate: f64,
    pub installment: f64,
    pub grade: String,
    pub sub_grade: String,
    pub emp_length: String,
    pub home_ownership: String,
    pub annual_inc: f64,
    pub verification_status: String,
    pub purpose: String,
    pub dti: f64,
    pub delinq_2yrs: i64,
    pub inq_last_6mths: i64,
    pub open_acc: i64,
    pub pub_rec: i64,
    pub revol_bal: f64,
    pub revol_util: f64,
    pub total_acc: i64,
    pub credit_length: i64,
    pub income_to_loan: f64,
    pub installment_to_income: f64,
    pub credit_utilization: f64,
    pub has_delinquency: i64,
    pub credit_length_bin: String,
    pub int_rate_bin: String,
}

impl FeatureRow {
    /// Returns `(name, value)` pairs in schema order.
    pub fn columns(&self) -> Vec<(&'static str, FeatureValue)> {
        use FeatureValue::{Float, Int, Text};

        vec![
            ("loan_amnt", Float(self.loan_amnt)),
            ("term", Text(self.term.clone())),
            ("int_rate", Float(self.int_rate)),
            ("installment", Float(self.installment)),
            ("grade", Text(self.grade.clone())),
            ("sub_grade", Text(self.sub_grade.clone())),
            ("emp_length", Text(self.emp_length.clone())),
            ("home_ownership", Text(self.home_ownership.clone())),
            ("annual_inc", Float(self.annual_inc)),
            ("verification_status", Text(self.verification_status.clone())),
            ("purpose", Text(self.purpose.clone())),
            ("dti", Float(self.dti)),
            ("delinq_2yrs", Int(self.delinq_2yrs)),
            ("inq_last_6mths", Int(self.inq_last_6mths)),
            ("open_acc", Int(self.open_acc)),
            ("pub_rec", Int(self.pub_rec)),
            ("revol_bal", Float(self.revol_bal)),
            ("revol_util", Float(self.revol_util)),
            ("total_acc", Int(self.total_acc)),
            ("credit_length", Int(self.credit_length)),
            ("income_to_loan", Float(self.income_to_loan)),
            ("installment_to_income", Float(self.installment_to_income)),
            ("credit_utilization", Float(self.credit_utilization)),
            ("has_delinquency", Int(self.has_delinquency)),
            ("credit_length_bin", Text(self.credit_length_bin.clone())),
            ("int_rate_bin", Text(self.int_rate_bin.clone())),
        ]
    }

    /// Looks up one column by name.
    pub fn get(&self, name: &str) -> Option<FeatureValue> {
        use FeatureValue::{Float, Int, Text};

        let value = match name {
            "loan_amnt" => Float(self.loan_amnt),
            "term" => Text(self.term.clone()),
            "int_rate" => Float(self.int_rate),
            "installment" => Float(self.installment),
            "grade" => Text(self.grade.clone()),
            "sub_grade" => Text(self.sub_grade.clone()),
            "emp_length" => Text(self.emp_length.clone()),
            "home_ownership" => Text(self.home_ownership.clone()),
            "annual_inc" => Float(self.annual_inc),
            "verification_status" => Text(self.verification_status.clone()),
            "purpose" => Text(self.purpose.clone()),
            "dti" => Float(self.dti),
            "delinq_2yrs" => Int(self.delinq_2yrs),
            "inq_last_6mths" => Int(self.inq_last_6mths),
            "open_acc" => Int(self.open_acc),
            "pub_rec" => Int(self.pub_rec),
            "revol_bal" => Float(self.revol_bal),
            "revol_util" => Float(self.revol_util),
            "total_acc" => Int(self.total_acc),
            "credit_length" => Int(self.credit_length),
            "income_to_loan" => Float(self.income_to_loan),
            "installment_to_income" => Float(self.installment_to_income),
            "credit_utilization" => Float(self.credit_utilization),
            "has_delinquency" => Int(self.has_delinquency),
            "credit_length_bin" => Text(self.credit_length_bin.clone()),
            "int_rate_bin" => Text(self.int_rate_bin.clone()),
            _ => return None,
        };
        Some(value)
    }
}

// ============ Schema Defaults ============

/// Placeholder values for the columns the form does not collect.
///
/// Every applicant gets identical values along these dimensions. Any key left
/// out of an override file keeps the value from `Default`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct SchemaDefaults {
    pub term: String,
    pub grade: String,
    pub sub_grade: String,
    pub emp_length: String,
    pub home_ownership: String,
    pub verification_status: String,
    pub purpose: String,
    pub inq_last_6mths: i64,
    pub open_acc: i64,
    pub pub_rec: i64,
    pub revol_util: f64,
    pub total_acc: i64,
    pub credit_length_bin: String,
    pub int_rate_bin: String,
}

impl Default for SchemaDefaults {
    fn default() -> Self {
        Self {
            term: " 36 months".to_string(),
            grade: "B".to_string(),
            sub_grade: "B2".to_string(),
            emp_length: "5 years".to_string(),
            home_ownership: "RENT".to_string(),
            verification_status: "Verified".to_string(),
            purpose: "debt_consolidation".to_string(),
            inq_last_6mths: 1,
            open_acc: 5,
            pub_rec: 0,
            revol_util: 30.0,
            total_acc: 20,
            credit_length_bin: "Medium".to_string(),
            int_rate_bin: "Medium".to_string(),
        }
    }
}

/// The four ratios derived from the raw input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedRatios {
    pub income_to_loan: f64,
    pub installment_to_income: f64,
    pub credit_utilization: f64,
    pub has_delinquency: i64,
}

// ============ Prediction ============

/// Default probability and its risk label. Recomputed per submission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    pub probability: f64,
    pub risk: RiskBucket,
}

impl PredictionResult {
    /// Probability rendered as a percentage with two decimals, e.g. `"12.34%"`.
    pub fn probability_percent(&self) -> String {
        format!("{:.2}%", self.probability * 100.0)
    }
}

/// Response body of `POST /api/v1/predict`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PredictionResponse {
    pub request_id: Uuid,
    /// Probability of default, in [0, 1].
    pub probability: f64,
    /// Probability as a percentage string.
    pub probability_percent: String,
    pub risk_category: RiskBucket,
    /// Name of the classifier that produced the score.
    pub model: String,
    pub scored_at: DateTime<Utc>,
}

/// Response body of `GET /api/v1/schema`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SchemaResponse {
    pub columns: Vec<String>,
    pub defaults: SchemaDefaults,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_defaults_partial_override() {
        let defaults: SchemaDefaults =
            serde_json::from_str(r#"{"grade": "C", "total_acc": 12}"#).unwrap();

        assert_eq!(defaults.grade, "C");
        assert_eq!(defaults.total_acc, 12);
        assert_eq!(defaults.sub_grade, "B2");
        assert_eq!(defaults.term, " 36 months");
    }

    #[test]
    fn test_probability_percent() {
        let result = PredictionResult {
            probability: 0.1234,
            risk: RiskBucket::Low,
        };
        assert_eq!(result.probability_percent(), "12.34%");
    }

    #[test]
    fn test_feature_value_views() {
        assert_eq!(FeatureValue::Int(3).as_f64(), Some(3.0));
        assert_eq!(FeatureValue::Text("B".into()).as_f64(), None);
        assert_eq!(FeatureValue::Text("B".into()).as_str(), Some("B"));
    }

    #[test]
    fn test_get_agrees_with_columns() {
        let row = crate::features::FeatureBuilder::default().build(&RawInput {
            loan_amnt: 12000.0,
            annual_inc: 48000.0,
            int_rate: 9.5,
            installment: 380.0,
            dti: 22.0,
            credit_length: 7,
            revol_bal: 3100.0,
            delinq_2yrs: 1,
        });

        for (name, value) in row.columns() {
            assert_eq!(row.get(name), Some(value), "column {}", name);
        }
        assert_eq!(row.get("fico_score"), None);
    }
}
