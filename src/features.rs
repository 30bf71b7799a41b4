/// Feature derivation for the credit classifier.
///
/// Turns the eight applicant attributes into the 26-column row the classifier
/// was trained on:
/// 1. Raw inputs pass through unchanged
/// 2. Four ratios are derived from them
/// 3. Columns the form does not collect come from `SchemaDefaults`
use crate::errors::AppError;
use crate::models::{DerivedRatios, FeatureRow, RawInput, SchemaDefaults};

/// Accepted range for every bounded numeric input, as `(field, min, max)`.
const NUMERIC_BOUNDS: [(&str, f64, f64); 7] = [
    ("loan_amnt", 1000.0, f64::MAX),
    ("annual_inc", 1000.0, f64::MAX),
    ("int_rate", 5.0, 30.0),
    ("installment", 100.0, f64::MAX),
    ("dti", 0.0, 40.0),
    ("credit_length", 0.0, 40.0),
    ("revol_bal", 0.0, f64::MAX),
];

/// Largest accepted `delinq_2yrs`.
pub const MAX_DELINQUENCIES: u8 = 3;

/// Computes the derived ratios.
///
/// The `+ 1` in each denominator keeps them strictly positive for any
/// non-negative input, at the cost of a small downward bias for low amounts.
pub fn derive_ratios(input: &RawInput) -> DerivedRatios {
    DerivedRatios {
        income_to_loan: input.annual_inc / (input.loan_amnt + 1.0),
        installment_to_income: input.installment / (input.annual_inc / 12.0 + 1.0),
        credit_utilization: input.revol_bal / (input.loan_amnt + 1.0),
        has_delinquency: if input.delinq_2yrs > 0 { 1 } else { 0 },
    }
}

/// Checks the input against the form's domain.
///
/// Returns the first violation as `BadRequest`, naming the field.
pub fn validate_input(input: &RawInput) -> Result<(), AppError> {
    let values = [
        input.loan_amnt,
        input.annual_inc,
        input.int_rate,
        input.installment,
        input.dti,
        f64::from(input.credit_length),
        input.revol_bal,
    ];

    for ((field, min, max), value) in NUMERIC_BOUNDS.iter().zip(values) {
        if !value.is_finite() {
            return Err(AppError::BadRequest(format!(
                "{} must be a finite number",
                field
            )));
        }
        if value < *min || value > *max {
            let message = if *max == f64::MAX {
                format!("{} must be at least {}, got {}", field, min, value)
            } else {
                format!("{} must be between {} and {}, got {}", field, min, max, value)
            };
            return Err(AppError::BadRequest(message));
        }
    }

    if input.delinq_2yrs > MAX_DELINQUENCIES {
        return Err(AppError::BadRequest(format!(
            "delinq_2yrs must be between 0 and {}, got {}",
            MAX_DELINQUENCIES, input.delinq_2yrs
        )));
    }

    Ok(())
}

/// Builds feature rows with an injected set of schema defaults.
#[derive(Debug, Clone, Default)]
pub struct FeatureBuilder {
    defaults: SchemaDefaults,
}

impl FeatureBuilder {
    pub fn new(defaults: SchemaDefaults) -> Self {
        Self { defaults }
    }

    pub fn defaults(&self) -> &SchemaDefaults {
        &self.defaults
    }

    /// Builds the row without validating the input.
    ///
    /// Total over the declared input domain; callers outside that domain should
    /// use [`FeatureBuilder::build_checked`].
    pub fn build(&self, input: &RawInput) -> FeatureRow {
        let ratios = derive_ratios(input);
        let d = &self.defaults;

        FeatureRow {
            loan_amnt: input.loan_amnt,
            term: d.term.clone(),
            int_rate: input.int_rate,
            installment: input.installment,
            grade: d.grade.clone(),
            sub_grade: d.sub_grade.clone(),
            emp_length: d.emp_length.clone(),
            home_ownership: d.home_ownership.clone(),
            annual_inc: input.annual_inc,
            verification_status: d.verification_status.clone(),
            purpose: d.purpose.clone(),
            dti: input.dti,
            delinq_2yrs: i64::from(input.delinq_2yrs),
            inq_last_6mths: d.inq_last_6mths,
            open_acc: d.open_acc,
            pub_rec: d.pub_rec,
            revol_bal: input.revol_bal,
            revol_util: d.revol_util,
            total_acc: d.total_acc,
            credit_length: i64::from(input.credit_length),
            income_to_loan: ratios.income_to_loan,
            installment_to_income: ratios.installment_to_income,
            credit_utilization: ratios.credit_utilization,
            has_delinquency: ratios.has_delinquency,
            credit_length_bin: d.credit_length_bin.clone(),
            int_rate_bin: d.int_rate_bin.clone(),
        }
    }

    /// Validates the input, then builds the row.
    pub fn build_checked(&self, input: &RawInput) -> Result<FeatureRow, AppError> {
        validate_input(input)?;
        Ok(self.build(input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FeatureValue, FEATURE_COLUMNS};

    fn sample_input() -> RawInput {
        RawInput {
            loan_amnt: 10000.0,
            annual_inc: 60000.0,
            int_rate: 12.0,
            installment: 300.0,
            dti: 15.0,
            credit_length: 10,
            revol_bal: 5000.0,
            delinq_2yrs: 0,
        }
    }

    #[test]
    fn test_columns_follow_schema_order() {
        let row = FeatureBuilder::default().build(&sample_input());
        let names: Vec<&str> = row.columns().iter().map(|(name, _)| *name).collect();

        assert_eq!(names, FEATURE_COLUMNS.to_vec());
    }

    #[test]
    fn test_derived_ratios_match_formulas() {
        let ratios = derive_ratios(&sample_input());

        assert_eq!(ratios.income_to_loan, 60000.0 / 10001.0);
        assert_eq!(ratios.installment_to_income, 300.0 / (60000.0 / 12.0 + 1.0));
        assert_eq!(ratios.credit_utilization, 5000.0 / 10001.0);
        assert_eq!(ratios.has_delinquency, 0);
    }

    #[test]
    fn test_default_placeholders_applied() {
        let row = FeatureBuilder::default().build(&sample_input());

        assert_eq!(row.term, " 36 months");
        assert_eq!(row.grade, "B");
        assert_eq!(row.home_ownership, "RENT");
        assert_eq!(row.revol_util, 30.0);
        assert_eq!(row.total_acc, 20);
        assert_eq!(row.get("int_rate_bin"), Some(FeatureValue::Text("Medium".into())));
    }

    #[test]
    fn test_injected_defaults_override() {
        let defaults = SchemaDefaults {
            grade: "A".to_string(),
            open_acc: 9,
            ..SchemaDefaults::default()
        };
        let row = FeatureBuilder::new(defaults).build(&sample_input());

        assert_eq!(row.grade, "A");
        assert_eq!(row.open_acc, 9);
        assert_eq!(row.sub_grade, "B2");
    }

    #[test]
    fn test_build_checked_accepts_domain_edges() {
        let input = RawInput {
            loan_amnt: 1000.0,
            annual_inc: 1000.0,
            int_rate: 30.0,
            installment: 100.0,
            dti: 0.0,
            credit_length: 40,
            revol_bal: 0.0,
            delinq_2yrs: 3,
        };
        assert!(FeatureBuilder::default().build_checked(&input).is_ok());
    }

    #[test]
    fn test_build_checked_rejects_out_of_range() {
        let builder = FeatureBuilder::default();

        let low_loan = RawInput {
            loan_amnt: 999.0,
            ..sample_input()
        };
        match builder.build_checked(&low_loan) {
            Err(AppError::BadRequest(msg)) => assert!(msg.contains("loan_amnt")),
            other => panic!("expected BadRequest, got {:?}", other),
        }

        let high_rate = RawInput {
            int_rate: 30.5,
            ..sample_input()
        };
        assert!(matches!(
            builder.build_checked(&high_rate),
            Err(AppError::BadRequest(msg)) if msg.contains("int_rate")
        ));

        let too_many = RawInput {
            delinq_2yrs: 4,
            ..sample_input()
        };
        assert!(matches!(
            builder.build_checked(&too_many),
            Err(AppError::BadRequest(msg)) if msg.contains("delinq_2yrs")
        ));
    }

    #[test]
    fn test_build_checked_rejects_nan() {
        let input = RawInput {
            dti: f64::NAN,
            ..sample_input()
        };
        assert!(matches!(
            FeatureBuilder::default().build_checked(&input),
            Err(AppError::BadRequest(msg)) if msg.contains("finite")
        ));
    }
}
