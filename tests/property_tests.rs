/// Property-based tests using proptest
/// Tests invariants that should hold for every input in the form's domain
use credit_risk_api::features::FeatureBuilder;
use credit_risk_api::models::RawInput;
use credit_risk_api::risk::RiskBucketizer;
use proptest::prelude::*;

fn raw_input() -> impl Strategy<Value = RawInput> {
    (
        1000.0f64..1_000_000.0,
        1000.0f64..5_000_000.0,
        5.0f64..=30.0,
        100.0f64..50_000.0,
        0.0f64..=40.0,
        0u32..=40,
        0.0f64..1_000_000.0,
        0u8..=3,
    )
        .prop_map(
            |(loan_amnt, annual_inc, int_rate, installment, dti, credit_length, revol_bal, delinq_2yrs)| {
                RawInput {
                    loan_amnt,
                    annual_inc,
                    int_rate,
                    installment,
                    dti,
                    credit_length,
                    revol_bal,
                    delinq_2yrs,
                }
            },
        )
}

// Property: derived ratios stay finite and the row stays valid
proptest! {
    #[test]
    fn derived_ratios_always_finite(input in raw_input()) {
        let row = FeatureBuilder::default().build(&input);

        prop_assert!(row.income_to_loan.is_finite());
        prop_assert!(row.installment_to_income.is_finite());
        prop_assert!(row.credit_utilization.is_finite());
        prop_assert!(row.income_to_loan > 0.0);
    }

    #[test]
    fn has_delinquency_iff_positive_count(input in raw_input()) {
        let row = FeatureBuilder::default().build(&input);
        let expected = if input.delinq_2yrs > 0 { 1 } else { 0 };

        prop_assert_eq!(row.has_delinquency, expected);
    }

    #[test]
    fn domain_inputs_pass_validation(input in raw_input()) {
        prop_assert!(FeatureBuilder::default().build_checked(&input).is_ok());
    }

    #[test]
    fn building_twice_is_identical(input in raw_input()) {
        let builder = FeatureBuilder::default();
        let first = builder.build(&input);
        let second = builder.build(&input);

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }
}

// Property: bucketing is monotonic and total over [0, 1]
proptest! {
    #[test]
    fn bucket_is_monotonic(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
        let bucketizer = RiskBucketizer::default();
        let (low, high) = if a <= b { (a, b) } else { (b, a) };

        prop_assert!(bucketizer.bucket(low).unwrap() <= bucketizer.bucket(high).unwrap());
    }

    #[test]
    fn bucket_rejects_values_above_one(p in 1.000_001f64..1000.0) {
        prop_assert!(RiskBucketizer::default().bucket(p).is_err());
    }

    #[test]
    fn bucket_rejects_negative_values(p in -1000.0f64..-0.000_001) {
        prop_assert!(RiskBucketizer::default().bucket(p).is_err());
    }
}
